use alloc::string::{String, ToString};
use core::any::type_name;

use bytes::{Buf, BufMut};
use serde::Deserialize;
use serde_json::Value;

use super::{OwnedScalar, Scalar};
use crate::archive::StreamArchive;
use crate::error::{ArchiveError, Result};

// -----------------------------------------------------------------------------
// Numbers

macro_rules! impl_number {
    ($($ty:ty => $put:ident, $get:ident;)*) => {$(
        impl Scalar for $ty {
            #[inline]
            fn to_tree(&self) -> Result<Value> {
                // `serde_json` turns NaN and infinities into null.
                match Value::from(*self) {
                    Value::Null => Err(ArchiveError::NonFinite(::core::stringify!($ty))),
                    node => Ok(node),
                }
            }

            #[inline]
            fn to_stream(&self, stream: &mut StreamArchive) -> Result<()> {
                stream.writer().$put(*self);
                Ok(())
            }
        }

        impl OwnedScalar for $ty {
            fn from_tree(node: &Value) -> Result<Self> {
                if !node.is_number() {
                    return Err(ArchiveError::mismatch(::core::stringify!($ty), node));
                }
                // Range and sign checks come from serde.
                Ok(<$ty>::deserialize(node)?)
            }

            #[inline]
            fn from_stream(stream: &mut StreamArchive) -> Result<Self> {
                Ok(stream.take(size_of::<$ty>())?.$get())
            }
        }
    )*};
}

impl_number! {
    u8 => put_u8, get_u8;
    u16 => put_u16_le, get_u16_le;
    u32 => put_u32_le, get_u32_le;
    u64 => put_u64_le, get_u64_le;
    i8 => put_i8, get_i8;
    i16 => put_i16_le, get_i16_le;
    i32 => put_i32_le, get_i32_le;
    i64 => put_i64_le, get_i64_le;
    f32 => put_f32_le, get_f32_le;
    f64 => put_f64_le, get_f64_le;
}

// -----------------------------------------------------------------------------
// bool & char

impl Scalar for bool {
    #[inline]
    fn to_tree(&self) -> Result<Value> {
        Ok(Value::Bool(*self))
    }

    #[inline]
    fn to_stream(&self, stream: &mut StreamArchive) -> Result<()> {
        stream.writer().put_u8(u8::from(*self));
        Ok(())
    }
}

impl OwnedScalar for bool {
    fn from_tree(node: &Value) -> Result<Self> {
        node.as_bool()
            .ok_or_else(|| ArchiveError::mismatch("bool", node))
    }

    fn from_stream(stream: &mut StreamArchive) -> Result<Self> {
        match stream.take(1)?.get_u8() {
            0 => Ok(false),
            1 => Ok(true),
            byte => Err(ArchiveError::InvalidByte {
                expected: "bool",
                byte,
            }),
        }
    }
}

impl Scalar for char {
    #[inline]
    fn to_tree(&self) -> Result<Value> {
        Ok(Value::String(self.to_string()))
    }

    #[inline]
    fn to_stream(&self, stream: &mut StreamArchive) -> Result<()> {
        stream.writer().put_u32_le(u32::from(*self));
        Ok(())
    }
}

impl OwnedScalar for char {
    fn from_tree(node: &Value) -> Result<Self> {
        let text = node
            .as_str()
            .ok_or_else(|| ArchiveError::mismatch("char", node))?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Ok(ch),
            _ => Err(ArchiveError::Parse {
                ty: "char",
                input: text.to_string(),
            }),
        }
    }

    fn from_stream(stream: &mut StreamArchive) -> Result<Self> {
        let code = stream.take(4)?.get_u32_le();
        char::from_u32(code).ok_or(ArchiveError::InvalidChar(code))
    }
}

// -----------------------------------------------------------------------------
// Text

impl Scalar for str {
    #[inline]
    fn to_tree(&self) -> Result<Value> {
        Ok(Value::String(self.to_string()))
    }

    #[inline]
    fn to_stream(&self, stream: &mut StreamArchive) -> Result<()> {
        stream.put_str(self)
    }
}

impl Scalar for String {
    #[inline]
    fn to_tree(&self) -> Result<Value> {
        self.as_str().to_tree()
    }

    #[inline]
    fn to_stream(&self, stream: &mut StreamArchive) -> Result<()> {
        stream.put_str(self)
    }
}

impl OwnedScalar for String {
    fn from_tree(node: &Value) -> Result<Self> {
        match node {
            Value::String(text) => Ok(text.clone()),
            other => Err(ArchiveError::mismatch("string", other)),
        }
    }

    #[inline]
    fn from_stream(stream: &mut StreamArchive) -> Result<Self> {
        stream.get_string()
    }
}

// -----------------------------------------------------------------------------
// Unit & Option

impl Scalar for () {
    #[inline]
    fn to_tree(&self) -> Result<Value> {
        Ok(Value::Null)
    }

    #[inline]
    fn to_stream(&self, stream: &mut StreamArchive) -> Result<()> {
        stream.writer().put_u8(0);
        Ok(())
    }
}

impl OwnedScalar for () {
    /// The node carries no information and is not inspected.
    #[inline]
    fn from_tree(_node: &Value) -> Result<Self> {
        Ok(())
    }

    /// Consumes exactly the marker byte, whatever its value.
    #[inline]
    fn from_stream(stream: &mut StreamArchive) -> Result<Self> {
        stream.take(1)?.advance(1);
        Ok(())
    }
}

impl<T: Scalar> Scalar for Option<T> {
    /// `None` is null, so a `Some` whose value is also null is rejected.
    fn to_tree(&self) -> Result<Value> {
        match self {
            Some(value) => match value.to_tree()? {
                Value::Null => Err(ArchiveError::NullInSome(type_name::<T>())),
                node => Ok(node),
            },
            None => Ok(Value::Null),
        }
    }

    fn to_stream(&self, stream: &mut StreamArchive) -> Result<()> {
        match self {
            Some(value) => {
                stream.writer().put_u8(1);
                value.to_stream(stream)
            }
            None => {
                stream.writer().put_u8(0);
                Ok(())
            }
        }
    }
}

impl<T: OwnedScalar> OwnedScalar for Option<T> {
    fn from_tree(node: &Value) -> Result<Self> {
        match node {
            Value::Null => Ok(None),
            other => T::from_tree(other).map(Some),
        }
    }

    fn from_stream(stream: &mut StreamArchive) -> Result<Self> {
        match stream.take(1)?.get_u8() {
            0 => Ok(None),
            1 => T::from_stream(stream).map(Some),
            byte => Err(ArchiveError::InvalidByte {
                expected: "presence",
                byte,
            }),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
