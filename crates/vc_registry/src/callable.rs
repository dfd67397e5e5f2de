// -----------------------------------------------------------------------------
// Callable

/// A registered function that can be invoked with an argument tuple.
///
/// Implemented for every `Fn` with up to four parameters, so function
/// pointers, closures and `Box<dyn Fn ..>` can all be stored in a
/// [`Registry`](crate::Registry) and invoked through
/// [`Registry::run`](crate::Registry::run).
///
/// # Examples
///
/// ```
/// use vc_registry::Callable;
///
/// let add = |a: i32, b: i32| a + b;
/// assert_eq!(add.call((1, 2)), 3);
///
/// let answer: fn() -> i32 = || 42;
/// assert_eq!(answer.call(()), 42);
/// ```
pub trait Callable<Args> {
    type Output;

    fn call(&self, args: Args) -> Self::Output;
}

/// Call the target macro with growing parameter lists.
///
/// ```ignore
/// range_invoke!(my_macro, 2);
/// // eq  to ↓
/// my_macro!(0: []);
/// my_macro!(1: [0: P0]);
/// my_macro!(2: [0: P0, 1: P1]);
/// ```
macro_rules! range_invoke {
    ($macro:ident, 0) => {
        $macro!(0: []);
    };
    ($macro:ident, 1) => {
        range_invoke!($macro, 0);
        $macro!(1: [0: P0]);
    };
    ($macro:ident, 2) => {
        range_invoke!($macro, 1);
        $macro!(2: [0: P0, 1: P1]);
    };
    ($macro:ident, 3) => {
        range_invoke!($macro, 2);
        $macro!(3: [0: P0, 1: P1, 2: P2]);
    };
    ($macro:ident, 4) => {
        range_invoke!($macro, 3);
        $macro!(4: [0: P0, 1: P1, 2: P2, 3: P3]);
    };
}

macro_rules! impl_callable {
    ($num:literal: [$($idx:tt: $P:ident),*]) => {
        impl<Func, Out, $($P),*> Callable<($($P,)*)> for Func
        where
            Func: Fn($($P),*) -> Out,
        {
            type Output = Out;

            #[inline(always)]
            #[allow(unused_variables, clippy::unused_unit)]
            fn call(&self, args: ($($P,)*)) -> Out {
                (self)($(args.$idx),*)
            }
        }
    };
}

range_invoke!(impl_callable, 4);

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::{String, ToString};

    use super::Callable;

    #[test]
    fn call_by_arity() {
        let zero = || 0_u8;
        let one = |a: u8| a;
        let four = |a: u8, b: u8, c: u8, d: u8| a + b + c + d;

        assert_eq!(zero.call(()), 0);
        assert_eq!(one.call((7,)), 7);
        assert_eq!(four.call((1, 2, 3, 4)), 10);
    }

    #[test]
    fn call_boxed_and_borrowed() {
        let boxed: Box<dyn Fn(&str) -> String> = Box::new(|s| s.to_string());
        assert_eq!(boxed.call(("vc",)), "vc");

        let mut total = 0;
        let bump = |counter: &mut i32, by: i32| *counter += by;
        bump.call((&mut total, 5));
        bump.call((&mut total, 5));
        assert_eq!(total, 10);
    }
}
