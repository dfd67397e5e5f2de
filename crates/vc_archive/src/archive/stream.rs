use alloc::string::{String, ToString};
use alloc::vec::Vec;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::{Archive, ArchiveKind, SerializationRegistry, Slot};
use crate::codec::{OwnedScalar, Scalar};
use crate::error::{ArchiveError, Result};

static STREAM_REGISTRY: SerializationRegistry<StreamArchive> = SerializationRegistry::new();

// -----------------------------------------------------------------------------
// StreamArchive

/// A flat, directional byte archive.
///
/// Values are appended at the end and consumed from the front, so a stream is
/// written completely before it is read back. All multi-byte fields are
/// little-endian; lengths, sizes and indices are `u32`.
///
/// # Examples
///
/// ```
/// use vc_archive::{Archive, StreamArchive};
///
/// let mut stream = StreamArchive::new();
/// stream.push(&7_u16).unwrap();
/// stream.push("hi").unwrap();
/// assert_eq!(stream.as_bytes(), [7, 0, 2, 0, 0, 0, b'h', b'i']);
///
/// assert_eq!(stream.read::<u16>().unwrap(), 7);
/// assert_eq!(stream.read::<String>().unwrap(), "hi");
/// assert!(stream.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamArchive {
    buf: BytesMut,
}

impl StreamArchive {
    /// Create an empty stream.
    #[inline]
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
        }
    }

    /// Create an empty stream able to hold `capacity` bytes without reallocating.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// The bytes not consumed yet.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Convert the unread bytes into an immutable buffer.
    #[inline]
    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }

    /// Number of unread bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if every byte has been consumed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub(crate) fn writer(&mut self) -> &mut BytesMut {
        &mut self.buf
    }

    /// The buffer, once at least `needed` bytes are known to be readable.
    #[inline]
    pub(crate) fn take(&mut self, needed: usize) -> Result<&mut BytesMut> {
        let remaining = self.buf.remaining();
        if remaining < needed {
            return Err(ArchiveError::Truncated { needed, remaining });
        }
        Ok(&mut self.buf)
    }

    pub(crate) fn put_len(&mut self, len: usize) -> Result<()> {
        let len = u32::try_from(len).map_err(|_| ArchiveError::TooLong(len))?;
        self.buf.put_u32_le(len);
        Ok(())
    }

    pub(crate) fn get_len(&mut self) -> Result<usize> {
        let len = self.take(4)?.get_u32_le();
        Ok(len as usize)
    }

    pub(crate) fn put_str(&mut self, text: &str) -> Result<()> {
        self.put_len(text.len())?;
        self.buf.put_slice(text.as_bytes());
        Ok(())
    }

    pub(crate) fn get_string(&mut self) -> Result<String> {
        let len = self.get_len()?;
        let raw = self.take(len)?.split_to(len);
        match core::str::from_utf8(&raw) {
            Ok(text) => Ok(text.to_string()),
            Err(_) => Err(ArchiveError::InvalidUtf8),
        }
    }
}

impl From<&[u8]> for StreamArchive {
    #[inline]
    fn from(bytes: &[u8]) -> Self {
        Self {
            buf: BytesMut::from(bytes),
        }
    }
}

impl From<Vec<u8>> for StreamArchive {
    #[inline]
    fn from(bytes: Vec<u8>) -> Self {
        Self::from(bytes.as_slice())
    }
}

// -----------------------------------------------------------------------------
// Stream archive

impl Archive for StreamArchive {
    const KIND: ArchiveKind = ArchiveKind::Stream;

    #[inline]
    fn push<T: Scalar + ?Sized>(&mut self, value: &T) -> Result<()> {
        value.to_stream(self)
    }

    #[inline]
    fn read<T: OwnedScalar>(&mut self) -> Result<T> {
        T::from_stream(self)
    }

    #[inline]
    fn push_class_name(&mut self, name: &str) -> Result<()> {
        self.put_str(name)
    }

    #[inline]
    fn pop_class_name(&mut self) -> Result<String> {
        self.get_string()
    }

    #[inline]
    fn push_index(&mut self, _field: &str, index: u32) -> Result<()> {
        self.buf.put_u32_le(index);
        Ok(())
    }

    #[inline]
    fn pop_index(&mut self, _field: &str) -> Result<u32> {
        Ok(self.take(4)?.get_u32_le())
    }

    #[inline]
    fn element<'s>(&self, _slot: impl Into<Slot<'s>>) -> Result<&Self> {
        Ok(self)
    }

    #[inline]
    fn element_mut<'s>(&mut self, _slot: impl Into<Slot<'s>>) -> Result<&mut Self> {
        Ok(self)
    }

    #[inline]
    fn lookup_mut<'s>(&mut self, _slot: impl Into<Slot<'s>>) -> Result<&mut Self> {
        Ok(self)
    }

    #[inline]
    fn resize(&mut self, len: usize) -> Result<()> {
        self.put_len(len)
    }

    #[inline]
    fn size(&mut self) -> Result<usize> {
        self.get_len()
    }

    #[inline]
    fn registry() -> &'static SerializationRegistry<Self> {
        &STREAM_REGISTRY
    }
}

// -----------------------------------------------------------------------------
// Tests
