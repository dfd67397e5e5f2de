use alloc::string::{String, ToString};
use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::archive::StreamArchive;
use crate::codec::{OwnedScalar, Scalar};
use crate::error::{ArchiveError, Result};

// -----------------------------------------------------------------------------
// Key

/// An opaque, non-empty identifier.
///
/// Its canonical string form is the identifier itself.
///
/// # Examples
///
/// ```
/// use vc_archive::values::Key;
///
/// let key: Key = "EUR.OIS".parse().unwrap();
/// assert_eq!(key.as_str(), "EUR.OIS");
/// assert!("".parse::<Key>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(String);

impl Key {
    /// Create a key, rejecting the empty string.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(ArchiveError::Parse {
                ty: "Key",
                input: id,
            });
        }
        Ok(Self(id))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Key {
    type Err = ArchiveError;

    #[inline]
    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = String::deserialize(deserializer)?;
        Key::new(id).map_err(serde::de::Error::custom)
    }
}

impl Scalar for Key {
    #[inline]
    fn to_tree(&self) -> Result<Value> {
        Ok(Value::String(self.to_string()))
    }

    #[inline]
    fn to_stream(&self, stream: &mut StreamArchive) -> Result<()> {
        stream.put_str(&self.0)
    }
}

impl OwnedScalar for Key {
    #[inline]
    fn from_tree(node: &Value) -> Result<Self> {
        Key::new(String::from_tree(node)?)
    }

    #[inline]
    fn from_stream(stream: &mut StreamArchive) -> Result<Self> {
        Key::new(stream.get_string()?)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::Key;
    use crate::archive::{Archive, StreamArchive};
    use crate::error::ArchiveError;

    #[test]
    fn canonical_string() {
        let key = Key::new("USD.SOFR").unwrap();

        let mut node = Value::Null;
        node.push(&key).unwrap();
        assert_eq!(node, json!("USD.SOFR"));
        assert_eq!(node.read::<Key>().unwrap(), key);

        let mut stream = StreamArchive::new();
        stream.push(&key).unwrap();
        assert_eq!(stream.read::<Key>().unwrap(), key);

        assert_eq!(serde_json::to_value(&key).unwrap(), json!("USD.SOFR"));
    }

    #[test]
    fn empty_is_rejected() {
        let mut node = json!("");
        assert!(matches!(
            node.read::<Key>(),
            Err(ArchiveError::Parse { ty: "Key", .. })
        ));
        assert!(serde_json::from_value::<Key>(json!("")).is_err());
    }
}
