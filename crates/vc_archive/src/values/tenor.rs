use alloc::string::{String, ToString};
use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::archive::StreamArchive;
use crate::codec::{OwnedScalar, Scalar};
use crate::error::{ArchiveError, Result};

// -----------------------------------------------------------------------------
// TenorUnit

/// The unit of a [`Tenor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TenorUnit {
    Day,
    Week,
    Month,
    Year,
}

impl TenorUnit {
    /// The single-letter code of this unit: `D`, `W`, `M` or `Y`.
    #[inline]
    pub const fn code(self) -> char {
        match self {
            TenorUnit::Day => 'D',
            TenorUnit::Week => 'W',
            TenorUnit::Month => 'M',
            TenorUnit::Year => 'Y',
        }
    }

    /// Case-insensitive inverse of [`code`](Self::code).
    pub const fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_uppercase() {
            'D' => Some(TenorUnit::Day),
            'W' => Some(TenorUnit::Week),
            'M' => Some(TenorUnit::Month),
            'Y' => Some(TenorUnit::Year),
            _ => None,
        }
    }
}

// -----------------------------------------------------------------------------
// Tenor

/// A duration expressed as a count of calendar units, such as `3M` or `10Y`.
///
/// # Examples
///
/// ```
/// use vc_archive::values::{Tenor, TenorUnit};
///
/// let tenor: Tenor = "18m".parse().unwrap();
/// assert_eq!(tenor, Tenor::new(18, TenorUnit::Month));
/// assert_eq!(tenor.to_string(), "18M");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tenor {
    count: u32,
    unit: TenorUnit,
}

impl Tenor {
    #[inline]
    pub const fn new(count: u32, unit: TenorUnit) -> Self {
        Self { count, unit }
    }

    #[inline]
    pub const fn count(self) -> u32 {
        self.count
    }

    #[inline]
    pub const fn unit(self) -> TenorUnit {
        self.unit
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.count, self.unit.code())
    }
}

impl FromStr for Tenor {
    type Err = ArchiveError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ArchiveError::Parse {
            ty: "Tenor",
            input: s.to_string(),
        };

        let mut chars = s.chars();
        let unit = chars
            .next_back()
            .and_then(TenorUnit::from_code)
            .ok_or_else(invalid)?;
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let count = digits.parse::<u32>().map_err(|_| invalid())?;
        Ok(Self::new(count, unit))
    }
}

impl Serialize for Tenor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Tenor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

impl Scalar for Tenor {
    #[inline]
    fn to_tree(&self) -> Result<Value> {
        Ok(Value::String(self.to_string()))
    }

    #[inline]
    fn to_stream(&self, stream: &mut StreamArchive) -> Result<()> {
        stream.put_str(&self.to_string())
    }
}

impl OwnedScalar for Tenor {
    #[inline]
    fn from_tree(node: &Value) -> Result<Self> {
        String::from_tree(node)?.parse()
    }

    #[inline]
    fn from_stream(stream: &mut StreamArchive) -> Result<Self> {
        stream.get_string()?.parse()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use serde_json::{Value, json};

    use super::{Tenor, TenorUnit};
    use crate::archive::{Archive, StreamArchive};

    #[test]
    fn parse_and_display() {
        assert_eq!("3M".parse::<Tenor>().unwrap(), Tenor::new(3, TenorUnit::Month));
        assert_eq!("10y".parse::<Tenor>().unwrap().to_string(), "10Y");
        assert_eq!("0D".parse::<Tenor>().unwrap().count(), 0);

        for bad in ["", "M", "3", "3X", "-1W", "+2W", "1.5Y", "99999999999D"] {
            assert!(bad.parse::<Tenor>().is_err(), "{bad}");
        }
    }

    #[test]
    fn canonical_string_in_both_formats() {
        let tenor = Tenor::new(2, TenorUnit::Week);

        let mut node = Value::Null;
        node.push(&tenor).unwrap();
        assert_eq!(node, json!("2W"));
        assert_eq!(node.read::<Tenor>().unwrap(), tenor);

        let mut stream = StreamArchive::new();
        stream.push(&tenor).unwrap();
        assert_eq!(stream.as_bytes(), [2, 0, 0, 0, b'2', b'W']);
        assert_eq!(stream.read::<Tenor>().unwrap(), tenor);
    }
}
