//! How leaf values are represented in each archive format.
//!
//! | Value                | Tree                 | Stream                          |
//! |----------------------|----------------------|---------------------------------|
//! | integers, floats     | number               | little-endian bytes             |
//! | `bool`               | boolean              | one byte, `0` or `1`            |
//! | `char`               | one-character string | `u32` code point                |
//! | `String`, `str`      | string               | `u32` byte length + UTF-8       |
//! | `()`                 | `null`               | one `0` marker byte             |
//! | `Option<T>`          | `null` or `T`        | presence byte + `T`             |
//! | enums                | variant name         | `i32` discriminant              |
//! | `DateTime`           | epoch seconds        | `f64` epoch seconds             |
//! | `Key`, `Tenor`       | canonical string     | canonical string                |
//!
//! Borrowed text is write-only: `&str` and `Option<&str>` implement
//! [`Scalar`] but not [`OwnedScalar`], there is nothing to own the loaded text.
//!
//! A tree has a single null, so values whose tree form would be ambiguous are
//! rejected on save: non-finite floats, and a `Some` whose value is itself
//! null (`Some(None)`, `Some(())`). Streams store all of them.

use serde_json::Value;

use crate::archive::StreamArchive;
use crate::error::Result;

mod enums;
mod primitive;

pub use enums::{ArchiveEnum, enum_from_stream, enum_from_tree, enum_to_stream, enum_to_tree};

// -----------------------------------------------------------------------------
// Scalar

/// A leaf value that can be written to either archive format.
pub trait Scalar {
    /// The tree node representing this value.
    fn to_tree(&self) -> Result<Value>;

    /// Append this value to a stream.
    fn to_stream(&self, stream: &mut StreamArchive) -> Result<()>;
}

/// A leaf value that can be read back from either archive format.
///
/// Borrowed text cannot be loaded:
///
/// ```compile_fail
/// use vc_archive::{Archive, StreamArchive};
///
/// let mut stream = StreamArchive::new();
/// let _: &str = stream.read::<&str>().unwrap();
/// ```
///
/// Read an owned `String` instead:
///
/// ```
/// use vc_archive::{Archive, StreamArchive};
///
/// let mut stream = StreamArchive::new();
/// stream.push("text").unwrap();
/// assert_eq!(stream.read::<String>().unwrap(), "text");
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be read back from an archive",
    label = "cannot be loaded",
    note = "borrowed text has no owner after loading, read a `String` instead"
)]
pub trait OwnedScalar: Sized {
    /// Decode a tree node.
    fn from_tree(node: &Value) -> Result<Self>;

    /// Consume this value from the front of a stream.
    fn from_stream(stream: &mut StreamArchive) -> Result<Self>;
}

impl<T: Scalar + ?Sized> Scalar for &T {
    #[inline]
    fn to_tree(&self) -> Result<Value> {
        (**self).to_tree()
    }

    #[inline]
    fn to_stream(&self, stream: &mut StreamArchive) -> Result<()> {
        (**self).to_stream(stream)
    }
}
