use core::time::Duration;

use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::archive::StreamArchive;
use crate::codec::{OwnedScalar, Scalar};
use crate::error::{ArchiveError, Result};

// -----------------------------------------------------------------------------
// DateTime

/// A point in time, stored as seconds since the Unix epoch.
///
/// Archived as an `f64` in both formats. Non-finite values cannot be
/// stored in a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateTime(f64);

impl DateTime {
    /// The Unix epoch.
    pub const EPOCH: Self = Self(0.0);

    #[inline]
    pub const fn from_epoch_seconds(seconds: f64) -> Self {
        Self(seconds)
    }

    #[inline]
    pub const fn epoch_seconds(self) -> f64 {
        self.0
    }

    /// The current system time.
    #[inline]
    pub fn now() -> Self {
        Self::from(SystemTime::now())
    }

    /// Convert back to a [`SystemTime`].
    ///
    /// Returns `None` for non-finite values and for times the platform
    /// cannot represent.
    pub fn to_system_time(self) -> Option<SystemTime> {
        if !self.0.is_finite() {
            return None;
        }
        let offset = Duration::try_from_secs_f64(self.0.abs()).ok()?;
        if self.0 >= 0.0 {
            UNIX_EPOCH.checked_add(offset)
        } else {
            UNIX_EPOCH.checked_sub(offset)
        }
    }
}

impl From<SystemTime> for DateTime {
    fn from(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(after) => Self(after.as_secs_f64()),
            Err(before) => Self(-before.duration().as_secs_f64()),
        }
    }
}

impl From<f64> for DateTime {
    #[inline]
    fn from(seconds: f64) -> Self {
        Self(seconds)
    }
}

impl Scalar for DateTime {
    #[inline]
    fn to_tree(&self) -> Result<Value> {
        self.0.to_tree()
    }

    #[inline]
    fn to_stream(&self, stream: &mut StreamArchive) -> Result<()> {
        stream.writer().put_f64_le(self.0);
        Ok(())
    }
}

impl OwnedScalar for DateTime {
    fn from_tree(node: &Value) -> Result<Self> {
        node.as_f64()
            .map(Self)
            .ok_or_else(|| ArchiveError::mismatch("epoch seconds", node))
    }

    #[inline]
    fn from_stream(stream: &mut StreamArchive) -> Result<Self> {
        Ok(Self(stream.take(8)?.get_f64_le()))
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use core::time::Duration;

    use serde_json::{Value, json};
    use std::time::UNIX_EPOCH;

    use super::DateTime;
    use crate::archive::{Archive, StreamArchive};
    use crate::error::ArchiveError;

    #[test]
    fn numeric_in_both_formats() {
        let time = DateTime::from_epoch_seconds(1_700_000_000.25);

        let mut node = Value::Null;
        node.push(&time).unwrap();
        assert_eq!(node, json!(1_700_000_000.25));
        assert_eq!(node.read::<DateTime>().unwrap(), time);

        let mut stream = StreamArchive::new();
        stream.push(&time).unwrap();
        assert_eq!(stream.as_bytes(), 1_700_000_000.25_f64.to_le_bytes());
        assert_eq!(stream.read::<DateTime>().unwrap(), time);
    }

    #[test]
    fn non_finite_is_rejected_in_tree() {
        let mut node = Value::Null;
        assert!(matches!(
            node.push(&DateTime::from(f64::NAN)),
            Err(ArchiveError::NonFinite(_))
        ));
    }

    #[test]
    fn integer_nodes_are_accepted() {
        let mut node = json!(86400);
        assert_eq!(node.read::<DateTime>().unwrap().epoch_seconds(), 86400.0);
    }

    #[test]
    fn system_time() {
        let time = UNIX_EPOCH + Duration::from_secs(90);
        let date = DateTime::from(time);
        assert_eq!(date.epoch_seconds(), 90.0);
        assert_eq!(date.to_system_time(), Some(time));

        let before = DateTime::from(UNIX_EPOCH - Duration::from_secs(5));
        assert_eq!(before.epoch_seconds(), -5.0);

        assert_eq!(DateTime::from(f64::NAN).to_system_time(), None);
    }
}
