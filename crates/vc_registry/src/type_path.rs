// -----------------------------------------------------------------------------
// TypePath

/// A static accessor to the canonical name of a type.
///
/// The canonical name is the key under which a type is registered and the
/// name written into archives, so it must be identical at save and load time.
/// [`core::any::type_name`] gives no such guarantee across compiler versions,
/// so names come from this trait instead.
///
/// # Methods
///
/// - [`type_path`]: The unique identifier of the type, cannot be duplicated.
/// - [`type_name`]: Type name without module path, may be duplicated.
///
/// We guarantee that these names do not have the prefix `::`.
/// Users should also ensure this when manually implementing it.
///
/// # Implementation
///
/// Use [`impl_type_path!`](crate::impl_type_path):
///
/// ```
/// use vc_registry::{TypePath, impl_type_path};
///
/// struct Circle;
/// struct Square;
///
/// // `module_path!()` of the invocation site, then the ident.
/// impl_type_path!(Circle);
///
/// // Pinned, survives moving the definition.
/// impl_type_path!(Square => "shapes::Square");
///
/// assert!(Circle::type_path().ends_with("::Circle"));
/// assert_eq!(Circle::type_name(), "Circle");
/// assert_eq!(Square::type_path(), "shapes::Square");
/// assert_eq!(Square::type_name(), "Square");
/// ```
///
/// [`type_path`]: TypePath::type_path
/// [`type_name`]: TypePath::type_name
pub trait TypePath: 'static {
    /// Returns the fully qualified path of the type.
    fn type_path() -> &'static str;

    /// Returns the last segment of [`type_path`](TypePath::type_path).
    fn type_name() -> &'static str {
        let path = Self::type_path();
        match path.rsplit_once("::") {
            Some((_, name)) => name,
            None => path,
        }
    }
}

// -----------------------------------------------------------------------------
// DynamicTypePath

/// Dynamic dispatch for [`TypePath`].
///
/// Automatically implemented for every `TypePath` type, usually used as a
/// supertrait so that `dyn Trait` objects can report the canonical name of
/// their concrete type.
///
/// ```
/// use vc_registry::{DynamicTypePath, impl_type_path};
///
/// trait Shape: DynamicTypePath {}
///
/// struct Circle;
/// impl_type_path!(Circle => "shapes::Circle");
/// impl Shape for Circle {}
///
/// let shape: &dyn Shape = &Circle;
/// assert_eq!(shape.reflect_type_path(), "shapes::Circle");
/// ```
pub trait DynamicTypePath {
    /// See [`TypePath::type_path`].
    fn reflect_type_path(&self) -> &'static str;

    /// See [`TypePath::type_name`].
    fn reflect_type_name(&self) -> &'static str;
}

impl<T: TypePath> DynamicTypePath for T {
    #[inline]
    fn reflect_type_path(&self) -> &'static str {
        T::type_path()
    }

    #[inline]
    fn reflect_type_name(&self) -> &'static str {
        T::type_name()
    }
}

// -----------------------------------------------------------------------------
// impl_type_path

/// Implement [`TypePath`] for a type.
///
/// - `impl_type_path!(Ident)`: the path is `module_path!()` of the invocation
///   site followed by the ident.
/// - `impl_type_path!(Type => "path::Type")`: the path is the given literal.
///
/// See [`TypePath`] for examples.
#[macro_export]
macro_rules! impl_type_path {
    ($ty:ident) => {
        impl $crate::TypePath for $ty {
            #[inline(always)]
            fn type_path() -> &'static str {
                ::core::concat!(::core::module_path!(), "::", ::core::stringify!($ty))
            }

            #[inline(always)]
            fn type_name() -> &'static str {
                ::core::stringify!($ty)
            }
        }
    };
    ($ty:ty => $path:literal) => {
        impl $crate::TypePath for $ty {
            #[inline(always)]
            fn type_path() -> &'static str {
                $path
            }
        }
    };
}

impl_type_path!(() => "()");
impl_type_path!(bool => "bool");
impl_type_path!(char => "char");
impl_type_path!(u8 => "u8");
impl_type_path!(u16 => "u16");
impl_type_path!(u32 => "u32");
impl_type_path!(u64 => "u64");
impl_type_path!(usize => "usize");
impl_type_path!(i8 => "i8");
impl_type_path!(i16 => "i16");
impl_type_path!(i32 => "i32");
impl_type_path!(i64 => "i64");
impl_type_path!(isize => "isize");
impl_type_path!(f32 => "f32");
impl_type_path!(f64 => "f64");
impl_type_path!(alloc::string::String => "alloc::string::String");

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::{DynamicTypePath, TypePath};

    mod shapes {
        pub struct Circle;
        crate::impl_type_path!(Circle);
    }

    #[test]
    fn type_path() {
        assert_eq!(String::type_path(), "alloc::string::String");
        assert_eq!(String::type_name(), "String");
        assert_eq!(<()>::type_name(), "()");
        assert_eq!(f64::type_path(), "f64");
    }

    #[test]
    fn module_path_is_used() {
        assert_eq!(
            shapes::Circle::type_path(),
            "vc_registry::type_path::tests::shapes::Circle"
        );
        assert_eq!(shapes::Circle::type_name(), "Circle");
        assert_eq!(
            shapes::Circle.reflect_type_path(),
            shapes::Circle::type_path()
        );
    }
}
