use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use serde_json::{Map, Value};

use super::{Archive, ArchiveKind, CLASS_NAME, SerializationRegistry, Slot};
use crate::codec::{OwnedScalar, Scalar};
use crate::error::{ArchiveError, Result};

static TREE_REGISTRY: SerializationRegistry<Value> = SerializationRegistry::new();

// -----------------------------------------------------------------------------
// Tree archive

impl Archive for Value {
    const KIND: ArchiveKind = ArchiveKind::Tree;

    #[inline]
    fn push<T: Scalar + ?Sized>(&mut self, value: &T) -> Result<()> {
        *self = value.to_tree()?;
        Ok(())
    }

    #[inline]
    fn read<T: OwnedScalar>(&mut self) -> Result<T> {
        T::from_tree(self)
    }

    fn push_class_name(&mut self, name: &str) -> Result<()> {
        *self.element_mut(CLASS_NAME)? = Value::String(name.to_string());
        Ok(())
    }

    fn pop_class_name(&mut self) -> Result<String> {
        match self.get(CLASS_NAME) {
            Some(Value::String(name)) => Ok(name.clone()),
            Some(_) => {
                log::warn!("archive node `Class` field is not a string");
                Ok(String::new())
            }
            None => {
                log::warn!("archive node does not have a `Class` field");
                Ok(String::new())
            }
        }
    }

    fn push_index(&mut self, field: &str, index: u32) -> Result<()> {
        self.element_mut(field)?.push(&index)
    }

    fn pop_index(&mut self, field: &str) -> Result<u32> {
        u32::from_tree(self.element(field)?)
    }

    fn element<'s>(&self, slot: impl Into<Slot<'s>>) -> Result<&Self> {
        match (slot.into(), self) {
            (Slot::Key(key), Value::Object(map)) => map
                .get(key)
                .ok_or_else(|| ArchiveError::MissingField(key.to_string())),
            (Slot::Index(index), Value::Array(items)) => items
                .get(index)
                .ok_or_else(|| ArchiveError::MissingField(format!("[{index}]"))),
            (Slot::Key(_), other) => Err(ArchiveError::mismatch("object", other)),
            (Slot::Index(_), other) => Err(ArchiveError::mismatch("array", other)),
        }
    }

    fn element_mut<'s>(&mut self, slot: impl Into<Slot<'s>>) -> Result<&mut Self> {
        match slot.into() {
            Slot::Key(key) => {
                if self.is_null() {
                    *self = Value::Object(Map::new());
                }
                match self {
                    Value::Object(map) => Ok(map.entry(key).or_insert(Value::Null)),
                    other => Err(ArchiveError::mismatch("object", other)),
                }
            }
            Slot::Index(index) => {
                let len = index.checked_add(1).ok_or(ArchiveError::TooLong(index))?;
                if self.is_null() {
                    *self = Value::Array(Vec::new());
                }
                match self {
                    Value::Array(items) => {
                        if items.len() < len {
                            items.resize(len, Value::Null);
                        }
                        Ok(&mut items[index])
                    }
                    other => Err(ArchiveError::mismatch("array", other)),
                }
            }
        }
    }

    fn lookup_mut<'s>(&mut self, slot: impl Into<Slot<'s>>) -> Result<&mut Self> {
        match (slot.into(), self) {
            (Slot::Key(key), Value::Object(map)) => map
                .get_mut(key)
                .ok_or_else(|| ArchiveError::MissingField(key.to_string())),
            (Slot::Index(index), Value::Array(items)) => items
                .get_mut(index)
                .ok_or_else(|| ArchiveError::MissingField(format!("[{index}]"))),
            (Slot::Key(_), other) => Err(ArchiveError::mismatch("object", other)),
            (Slot::Index(_), other) => Err(ArchiveError::mismatch("array", other)),
        }
    }

    fn resize(&mut self, len: usize) -> Result<()> {
        // An empty container still has to persist as `[]`.
        match self {
            Value::Null => *self = Value::Array(Vec::with_capacity(len)),
            Value::Array(items) => items.reserve(len.saturating_sub(items.len())),
            _ => {}
        }
        Ok(())
    }

    fn size(&mut self) -> Result<usize> {
        Ok(match self {
            Value::Null => 0,
            Value::Array(items) => items.len(),
            Value::Object(map) => map.len(),
            _ => 1,
        })
    }

    #[inline]
    fn registry() -> &'static SerializationRegistry<Self> {
        &TREE_REGISTRY
    }
}

// -----------------------------------------------------------------------------
// Tests
