use alloc::string::ToString;

use bytes::{Buf, BufMut};
use serde_json::Value;

use crate::archive::StreamArchive;
use crate::error::{ArchiveError, Result};

// -----------------------------------------------------------------------------
// ArchiveEnum

/// A field-less enum with canonical variant names and `i32` discriminants.
///
/// Implemented by [`archive_enum!`](crate::archive_enum), which also makes
/// the enum a scalar for both archive formats.
pub trait ArchiveEnum: Copy + 'static {
    /// The enum's name, used in error messages.
    const TYPE_NAME: &'static str;

    /// The canonical name of this variant.
    fn name(self) -> &'static str;

    /// The variant with the given canonical name.
    fn from_name(name: &str) -> Option<Self>;

    /// The underlying discriminant.
    fn to_repr(self) -> i32;

    /// The variant with the given discriminant.
    fn from_repr(value: i32) -> Option<Self>;
}

/// Tree form of an enum: its variant name.
#[inline]
pub fn enum_to_tree<E: ArchiveEnum>(value: E) -> Result<Value> {
    Ok(Value::String(value.name().to_string()))
}

/// Decode an enum from a variant name, or from an integer discriminant.
pub fn enum_from_tree<E: ArchiveEnum>(node: &Value) -> Result<E> {
    match node {
        Value::String(name) => E::from_name(name).ok_or_else(|| ArchiveError::UnknownEnumName {
            ty: E::TYPE_NAME,
            name: name.clone(),
        }),
        Value::Number(number) => {
            let value = number
                .as_i64()
                .ok_or_else(|| ArchiveError::mismatch("integer", node))?;
            i32::try_from(value)
                .ok()
                .and_then(E::from_repr)
                .ok_or(ArchiveError::UnknownEnumValue {
                    ty: E::TYPE_NAME,
                    value,
                })
        }
        other => Err(ArchiveError::mismatch("enum name", other)),
    }
}

/// Stream form of an enum: its discriminant as an `i32`.
#[inline]
pub fn enum_to_stream<E: ArchiveEnum>(value: E, stream: &mut StreamArchive) -> Result<()> {
    stream.writer().put_i32_le(value.to_repr());
    Ok(())
}

/// Consume an `i32` discriminant from a stream.
pub fn enum_from_stream<E: ArchiveEnum>(stream: &mut StreamArchive) -> Result<E> {
    let value = stream.take(4)?.get_i32_le();
    E::from_repr(value).ok_or(ArchiveError::UnknownEnumValue {
        ty: E::TYPE_NAME,
        value: i64::from(value),
    })
}

// -----------------------------------------------------------------------------
// archive_enum

/// Declare a field-less enum that archives as a scalar.
///
/// The enum gets `#[repr(i32)]`, an [`ArchiveEnum`] implementation, the
/// [`Scalar`]/[`OwnedScalar`] codec and [`Save`]/[`Load`] for every archive.
/// It must derive `Clone` and `Copy`.
///
/// [`Scalar`]: crate::codec::Scalar
/// [`OwnedScalar`]: crate::codec::OwnedScalar
/// [`Save`]: crate::Save
/// [`Load`]: crate::Load
///
/// # Examples
///
/// ```
/// use serde_json::{Value, json};
/// use vc_archive::{StreamArchive, archive_enum, load, save};
///
/// archive_enum! {
///     #[derive(Debug, Clone, Copy, PartialEq, Eq)]
///     pub enum Color {
///         Red,
///         Green = 4,
///     }
/// }
///
/// let mut tree = Value::Null;
/// save(&Color::Green, &mut tree).unwrap();
/// assert_eq!(tree, json!("Green"));
///
/// let mut stream = StreamArchive::new();
/// save(&Color::Green, &mut stream).unwrap();
/// assert_eq!(stream.as_bytes(), [4, 0, 0, 0]);
/// assert_eq!(load::<Color, _>(&mut stream).unwrap(), Color::Green);
/// ```
#[macro_export]
macro_rules! archive_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $(= $discriminant:expr)?
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i32)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant $(= $discriminant)?,
            )+
        }

        impl $crate::codec::ArchiveEnum for $name {
            const TYPE_NAME: &'static str = ::core::stringify!($name);

            fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => ::core::stringify!($variant), )+
                }
            }

            fn from_name(name: &str) -> ::core::option::Option<Self> {
                match name {
                    $( ::core::stringify!($variant) => ::core::option::Option::Some(Self::$variant), )+
                    _ => ::core::option::Option::None,
                }
            }

            #[inline]
            fn to_repr(self) -> i32 {
                self as i32
            }

            fn from_repr(value: i32) -> ::core::option::Option<Self> {
                $(
                    if value == Self::$variant as i32 {
                        return ::core::option::Option::Some(Self::$variant);
                    }
                )+
                ::core::option::Option::None
            }
        }

        impl $crate::codec::Scalar for $name {
            #[inline]
            fn to_tree(&self) -> $crate::Result<$crate::__macro_exports::Value> {
                $crate::codec::enum_to_tree(*self)
            }

            #[inline]
            fn to_stream(&self, stream: &mut $crate::StreamArchive) -> $crate::Result<()> {
                $crate::codec::enum_to_stream(*self, stream)
            }
        }

        impl $crate::codec::OwnedScalar for $name {
            #[inline]
            fn from_tree(node: &$crate::__macro_exports::Value) -> $crate::Result<Self> {
                $crate::codec::enum_from_tree(node)
            }

            #[inline]
            fn from_stream(stream: &mut $crate::StreamArchive) -> $crate::Result<Self> {
                $crate::codec::enum_from_stream(stream)
            }
        }

        $crate::impl_scalar_dispatch!($name);
    };
}

// -----------------------------------------------------------------------------
// Tests
