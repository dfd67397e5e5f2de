use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::vec::Vec;

use crate::archive::Archive;
use crate::codec::{OwnedScalar, Scalar};
use crate::error::Result;
use crate::values::{DateTime, Key, Tenor};

/// Upper bound on elements reserved ahead of loading a sequence.
///
/// The stored count is untrusted input; larger sequences still load,
/// they just grow as they go.
const PREALLOC_LIMIT: usize = 4096;

// -----------------------------------------------------------------------------
// Save & Load

/// A value that can be written to archive `A`.
///
/// Implemented for scalars, sequences, boxes and, through
/// [`impl_polymorphic_base!`](crate::impl_polymorphic_base), for boxed
/// polymorphic bases. Structs use [`impl_fields!`](crate::impl_fields).
pub trait Save<A: Archive> {
    fn save(&self, archive: &mut A) -> Result<()>;
}

/// A value that can be read back from archive `A`.
pub trait Load<A: Archive>: Sized {
    fn load(archive: &mut A) -> Result<Self>;
}

/// Write `value` into `archive`.
#[inline]
pub fn save<T: Save<A> + ?Sized, A: Archive>(value: &T, archive: &mut A) -> Result<()> {
    value.save(archive)
}

/// Read a `T` from `archive`.
#[inline]
pub fn load<T: Load<A>, A: Archive>(archive: &mut A) -> Result<T> {
    T::load(archive)
}

/// Read a `T` from `archive` into `value`.
///
/// On failure `value` is left unchanged.
#[inline]
pub fn load_into<T: Load<A>, A: Archive>(value: &mut T, archive: &mut A) -> Result<()> {
    *value = T::load(archive)?;
    Ok(())
}

// -----------------------------------------------------------------------------
// Scalars

/// Implement [`Save`] and [`Load`] for types that are
/// [`Scalar`](crate::codec::Scalar) and [`OwnedScalar`](crate::codec::OwnedScalar).
///
/// ```
/// use serde_json::Value;
/// use vc_archive::codec::{OwnedScalar, Scalar};
/// use vc_archive::{Result, StreamArchive, impl_scalar_dispatch, load, save};
///
/// #[derive(Debug, PartialEq)]
/// struct Celsius(f64);
///
/// impl Scalar for Celsius {
///     fn to_tree(&self) -> Result<Value> { self.0.to_tree() }
///     fn to_stream(&self, stream: &mut StreamArchive) -> Result<()> { self.0.to_stream(stream) }
/// }
///
/// impl OwnedScalar for Celsius {
///     fn from_tree(node: &Value) -> Result<Self> { f64::from_tree(node).map(Celsius) }
///     fn from_stream(stream: &mut StreamArchive) -> Result<Self> { f64::from_stream(stream).map(Celsius) }
/// }
///
/// impl_scalar_dispatch!(Celsius);
///
/// let mut tree = Value::Null;
/// save(&Celsius(21.5), &mut tree).unwrap();
/// assert_eq!(load::<Celsius, _>(&mut tree).unwrap(), Celsius(21.5));
/// ```
#[macro_export]
macro_rules! impl_scalar_dispatch {
    ($($ty:ty),+ $(,)?) => {$(
        impl<A: $crate::Archive> $crate::Save<A> for $ty {
            #[inline]
            fn save(&self, archive: &mut A) -> $crate::Result<()> {
                archive.push(self)
            }
        }

        impl<A: $crate::Archive> $crate::Load<A> for $ty {
            #[inline]
            fn load(archive: &mut A) -> $crate::Result<Self> {
                archive.read()
            }
        }
    )+};
}

impl_scalar_dispatch!(
    bool, char, u8, u16, u32, u64, i8, i16, i32, i64, f32, f64, String, (), DateTime, Key, Tenor,
);

impl<A: Archive> Save<A> for str {
    #[inline]
    fn save(&self, archive: &mut A) -> Result<()> {
        archive.push(self)
    }
}

impl<A: Archive, T: Scalar> Save<A> for Option<T> {
    #[inline]
    fn save(&self, archive: &mut A) -> Result<()> {
        archive.push(self)
    }
}

impl<A: Archive, T: OwnedScalar> Load<A> for Option<T> {
    #[inline]
    fn load(archive: &mut A) -> Result<Self> {
        archive.read()
    }
}

// -----------------------------------------------------------------------------
// References & Boxes

impl<A: Archive, T: Save<A> + ?Sized> Save<A> for &T {
    #[inline]
    fn save(&self, archive: &mut A) -> Result<()> {
        (**self).save(archive)
    }
}

impl<A: Archive, T: Save<A>> Save<A> for Box<T> {
    #[inline]
    fn save(&self, archive: &mut A) -> Result<()> {
        (**self).save(archive)
    }
}

impl<A: Archive, T: Load<A>> Load<A> for Box<T> {
    #[inline]
    fn load(archive: &mut A) -> Result<Self> {
        T::load(archive).map(Box::new)
    }
}

// -----------------------------------------------------------------------------
// Sequences

fn save_seq<'a, A, T, I>(archive: &mut A, len: usize, items: I) -> Result<()>
where
    A: Archive,
    T: Save<A> + 'a,
    I: Iterator<Item = &'a T>,
{
    archive.resize(len)?;
    for (index, item) in items.enumerate() {
        item.save(archive.element_mut(index)?)?;
    }
    Ok(())
}

fn load_seq<A, T>(archive: &mut A, len: usize, mut append: impl FnMut(T)) -> Result<()>
where
    A: Archive,
    T: Load<A>,
{
    for index in 0..len {
        append(T::load(archive.lookup_mut(index)?)?);
    }
    Ok(())
}

impl<A: Archive, T: Save<A>> Save<A> for [T] {
    #[inline]
    fn save(&self, archive: &mut A) -> Result<()> {
        save_seq(archive, self.len(), self.iter())
    }
}

impl<A: Archive, T: Save<A>, const N: usize> Save<A> for [T; N] {
    #[inline]
    fn save(&self, archive: &mut A) -> Result<()> {
        save_seq(archive, N, self.iter())
    }
}

impl<A: Archive, T: Save<A>> Save<A> for Vec<T> {
    #[inline]
    fn save(&self, archive: &mut A) -> Result<()> {
        save_seq(archive, self.len(), self.iter())
    }
}

impl<A: Archive, T: Load<A>> Load<A> for Vec<T> {
    fn load(archive: &mut A) -> Result<Self> {
        let len = archive.size()?;
        let mut items = Vec::with_capacity(len.min(PREALLOC_LIMIT));
        load_seq(archive, len, |item| items.push(item))?;
        Ok(items)
    }
}

impl<A: Archive, T: Save<A>> Save<A> for VecDeque<T> {
    #[inline]
    fn save(&self, archive: &mut A) -> Result<()> {
        save_seq(archive, self.len(), self.iter())
    }
}

impl<A: Archive, T: Load<A>> Load<A> for VecDeque<T> {
    fn load(archive: &mut A) -> Result<Self> {
        let len = archive.size()?;
        let mut items = VecDeque::with_capacity(len.min(PREALLOC_LIMIT));
        load_seq(archive, len, |item| items.push_back(item))?;
        Ok(items)
    }
}

// -----------------------------------------------------------------------------
// impl_fields

/// Implement [`Save`] and [`Load`] for a struct by listing its fields.
///
/// Fields are visited in the listed order. In a tree archive each field is
/// a member named after it; in a stream the fields follow each other.
/// Loading a tree requires every listed field to be present.
///
/// ```
/// use serde_json::{Value, json};
/// use vc_archive::{impl_fields, load, save};
///
/// #[derive(Debug, PartialEq)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl_fields!(Point { x, y });
///
/// let mut tree = Value::Null;
/// save(&Point { x: 1, y: 2 }, &mut tree).unwrap();
/// assert_eq!(tree, json!({ "x": 1, "y": 2 }));
/// assert_eq!(load::<Point, _>(&mut tree).unwrap(), Point { x: 1, y: 2 });
/// ```
#[macro_export]
macro_rules! impl_fields {
    ($ty:ident { $($field:ident),+ $(,)? }) => {
        impl<A: $crate::Archive> $crate::Save<A> for $ty {
            fn save(&self, archive: &mut A) -> $crate::Result<()> {
                $(
                    $crate::Save::<A>::save(
                        &self.$field,
                        $crate::Archive::element_mut(archive, ::core::stringify!($field))?,
                    )?;
                )+
                ::core::result::Result::Ok(())
            }
        }

        impl<A: $crate::Archive> $crate::Load<A> for $ty {
            fn load(archive: &mut A) -> $crate::Result<Self> {
                ::core::result::Result::Ok(Self {
                    $(
                        $field: $crate::Load::<A>::load(
                            $crate::Archive::lookup_mut(archive, ::core::stringify!($field))?,
                        )?,
                    )+
                })
            }
        }
    };
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::collections::VecDeque;
    use alloc::string::String;
    use alloc::vec::Vec;
    use alloc::{format, vec};

    use serde_json::{Value, json};

    use super::{load, load_into, save};
    use crate::archive::StreamArchive;
    use crate::error::ArchiveError;
    use crate::values::{DateTime, Tenor, TenorUnit};

    crate::archive_enum! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        enum Side {
            Buy,
            Sell,
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    crate::impl_fields!(Point { x, y });

    #[derive(Debug, PartialEq)]
    struct Trade {
        id: String,
        side: Side,
        tenor: Tenor,
        settled: Option<DateTime>,
        path: Vec<Point>,
        tags: VecDeque<String>,
        empty: Vec<u8>,
    }

    crate::impl_fields!(Trade {
        id,
        side,
        tenor,
        settled,
        path,
        tags,
        empty,
    });

    fn sample() -> Trade {
        Trade {
            id: "T-1".into(),
            side: Side::Sell,
            tenor: Tenor::new(3, TenorUnit::Month),
            settled: Some(DateTime::from_epoch_seconds(10.5)),
            path: vec![Point { x: 1, y: 2 }, Point { x: -3, y: 4 }],
            tags: VecDeque::from(["a".into(), "b".into()]),
            empty: Vec::new(),
        }
    }

    #[test]
    fn sequence_in_stream() {
        let mut stream = StreamArchive::new();
        save(&vec![1_i32, 2, 3], &mut stream).unwrap();
        assert_eq!(
            stream.as_bytes(),
            [3, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0]
        );
        assert_eq!(load::<Vec<i32>, _>(&mut stream).unwrap(), [1, 2, 3]);
        assert!(stream.is_empty());
    }

    #[test]
    fn sequence_in_tree() {
        let mut tree = Value::Null;
        save(&[5_u8, 6, 7], &mut tree).unwrap();
        assert_eq!(tree, json!([5, 6, 7]));
        assert_eq!(load::<Vec<u8>, _>(&mut tree).unwrap(), [5, 6, 7]);

        let mut tree = Value::Null;
        save(&Vec::<u8>::new(), &mut tree).unwrap();
        assert_eq!(tree, json!([]));
        assert!(load::<Vec<u8>, _>(&mut tree).unwrap().is_empty());
    }

    #[test]
    fn struct_in_tree() {
        let trade = sample();
        let mut tree = Value::Null;
        save(&trade, &mut tree).unwrap();

        assert_eq!(
            tree,
            json!({
                "id": "T-1",
                "side": "Sell",
                "tenor": "3M",
                "settled": 10.5,
                "path": [{ "x": 1, "y": 2 }, { "x": -3, "y": 4 }],
                "tags": ["a", "b"],
                "empty": [],
            })
        );
        assert_eq!(load::<Trade, _>(&mut tree).unwrap(), trade);
    }

    #[test]
    fn struct_in_stream() {
        let trade = sample();
        let mut stream = StreamArchive::new();
        save(&trade, &mut stream).unwrap();

        assert_eq!(load::<Trade, _>(&mut stream).unwrap(), trade);
        assert!(stream.is_empty());

        let mut point = Point::default();
        save(&Point { x: 7, y: 8 }, &mut stream).unwrap();
        load_into(&mut point, &mut stream).unwrap();
        assert_eq!(point, Point { x: 7, y: 8 });
    }

    #[test]
    fn order_is_preserved() {
        let words: Vec<String> = (0..100).rev().map(|i| format!("w{i}")).collect();

        let mut tree = Value::Null;
        save(&words, &mut tree).unwrap();
        assert_eq!(load::<Vec<String>, _>(&mut tree).unwrap(), words);

        let mut stream = StreamArchive::new();
        save(&words, &mut stream).unwrap();
        assert_eq!(load::<Vec<String>, _>(&mut stream).unwrap(), words);
    }

    #[test]
    fn missing_field_is_an_error() {
        let mut tree = json!({ "x": 1 });
        assert!(matches!(
            load::<Point, _>(&mut tree),
            Err(ArchiveError::MissingField(field)) if field == "y"
        ));
        // Loading never grows the source.
        assert_eq!(tree, json!({ "x": 1 }));
    }

    #[test]
    fn truncated_stream_is_an_error() {
        let mut stream = StreamArchive::new();
        save(&vec![1_i32, 2, 3], &mut stream).unwrap();
        let bytes = stream.as_bytes();
        let mut short = StreamArchive::from(&bytes[..bytes.len() - 1]);

        assert!(matches!(
            load::<Vec<i32>, _>(&mut short),
            Err(ArchiveError::Truncated { needed: 4, remaining: 3 })
        ));
    }

    #[test]
    fn nested_sequences_and_boxes() {
        let value = vec![vec![Box::new(1_u16)], vec![], vec![Box::new(2), Box::new(3)]];

        let mut tree = Value::Null;
        save(&value, &mut tree).unwrap();
        assert_eq!(tree, json!([[1], [], [2, 3]]));
        assert_eq!(load::<Vec<Vec<Box<u16>>>, _>(&mut tree).unwrap(), value);

        let mut stream = StreamArchive::new();
        save(&value, &mut stream).unwrap();
        assert_eq!(load::<Vec<Vec<Box<u16>>>, _>(&mut stream).unwrap(), value);
    }
}
