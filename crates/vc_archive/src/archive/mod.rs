//! The format-agnostic archive contract.
//!
//! Serialization code is written once against [`Archive`] and instantiated
//! for the two formats:
//!
//! - [`serde_json::Value`]: an ordered tree document. Element access
//!   navigates to child nodes by key or index.
//! - [`StreamArchive`]: a flat little-endian byte stream. Element access
//!   returns the stream itself, so fields are written and read in sequence.
//!
//! Each format owns a process-wide [`SerializationRegistry`], mapping a
//! canonical type name to the save/load callback used for polymorphic values.

use alloc::string::String;

use vc_registry::Registry;

use crate::codec::{OwnedScalar, Scalar};
use crate::error::Result;
use crate::poly::Erased;

mod stream;
mod tree;

pub use stream::StreamArchive;

// -----------------------------------------------------------------------------
// Field names

/// Tree field holding the canonical type name of a polymorphic value.
pub const CLASS_NAME: &str = "Class";

/// Default tree field for an explicit container size.
pub const SIZE_NAME: &str = "Size";

// -----------------------------------------------------------------------------
// ArchiveKind & Slot

/// The two supported archive formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    Tree,
    Stream,
}

/// The address of a child element: a field name or a sequence position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot<'a> {
    Key(&'a str),
    Index(usize),
}

impl<'a> From<&'a str> for Slot<'a> {
    #[inline]
    fn from(key: &'a str) -> Self {
        Slot::Key(key)
    }
}

impl<'a> From<&'a String> for Slot<'a> {
    #[inline]
    fn from(key: &'a String) -> Self {
        Slot::Key(key.as_str())
    }
}

impl From<usize> for Slot<'_> {
    #[inline]
    fn from(index: usize) -> Self {
        Slot::Index(index)
    }
}

// -----------------------------------------------------------------------------
// Registry

/// Save/load callback stored in a [`SerializationRegistry`].
///
/// The [`Erased`] handle carries both the object and the direction.
pub type SaveLoadFn<A> = fn(&mut A, Erased<'_>) -> Result<()>;

/// Canonical type name to save/load callback, one per archive format.
pub type SerializationRegistry<A> = Registry<String, SaveLoadFn<A>>;

// -----------------------------------------------------------------------------
// Archive

/// A format-specific sink and source of serialized data.
///
/// Archives perform no internal locking; one archive instance belongs to
/// one save or load walk at a time.
pub trait Archive: Sized + 'static {
    /// Which format this is.
    const KIND: ArchiveKind;

    /// Write a scalar at the current position.
    fn push<T: Scalar + ?Sized>(&mut self, value: &T) -> Result<()>;

    /// Read a scalar from the current position.
    ///
    /// Borrowed text such as `&str` is rejected at compile time;
    /// read a `String` instead.
    fn read<T: OwnedScalar>(&mut self) -> Result<T>;

    /// Read a scalar from the current position into `value`.
    #[inline]
    fn pop<T: OwnedScalar>(&mut self, value: &mut T) -> Result<()> {
        *value = self.read()?;
        Ok(())
    }

    /// Record the canonical type name of the value at this position.
    fn push_class_name(&mut self, name: &str) -> Result<()>;

    /// Recover the canonical type name written by [`push_class_name`].
    ///
    /// A tree node without a usable `Class` field is not an error: a warning
    /// is logged and the name is empty.
    ///
    /// [`push_class_name`]: Archive::push_class_name
    fn pop_class_name(&mut self) -> Result<String>;

    /// Write an unsigned index under `field`. Streams ignore the field name.
    fn push_index(&mut self, field: &str, index: u32) -> Result<()>;

    /// Read an unsigned index from `field`. Streams ignore the field name.
    fn pop_index(&mut self, field: &str) -> Result<u32>;

    /// Shared access to an existing child element.
    fn element<'s>(&self, slot: impl Into<Slot<'s>>) -> Result<&Self>;

    /// Mutable access to a child element, creating it if absent.
    ///
    /// This is the accessor used while saving.
    fn element_mut<'s>(&mut self, slot: impl Into<Slot<'s>>) -> Result<&mut Self>;

    /// Mutable access to an existing child element.
    ///
    /// This is the accessor used while loading, the source is never grown.
    fn lookup_mut<'s>(&mut self, slot: impl Into<Slot<'s>>) -> Result<&mut Self>;

    /// Prepare for a container of `len` elements.
    fn resize(&mut self, len: usize) -> Result<()>;

    /// The number of elements of the container at this position.
    fn size(&mut self) -> Result<usize>;

    /// The save/load registry of this format.
    fn registry() -> &'static SerializationRegistry<Self>;
}
