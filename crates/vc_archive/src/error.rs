use alloc::string::String;

use serde_json::Value;
use thiserror::Error;
use vc_registry::RegistryError;

// -----------------------------------------------------------------------------
// Error

/// Failures raised while saving or loading through an archive.
///
/// A failed load may leave the target partially populated,
/// nothing is rolled back.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ArchiveError {
    #[error("Archive node mismatch: expected {expected}, found {found}")]
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Stream truncated: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    #[error("Length {0} is out of range for the archive")]
    TooLong(usize),

    #[error("Archive node has no field `{0}`")]
    MissingField(String),

    #[error("Invalid {expected} byte {byte:#04x}")]
    InvalidByte { expected: &'static str, byte: u8 },

    #[error("Non-finite `{0}` has no tree representation")]
    NonFinite(&'static str),

    #[error("`Some` value of `{0}` would be stored as null and load back as `None`")]
    NullInSome(&'static str),

    #[error("Invalid character code {0:#x}")]
    InvalidChar(u32),

    #[error("String is not valid UTF-8")]
    InvalidUtf8,

    #[error("`{name}` is not a variant of `{ty}`")]
    UnknownEnumName { ty: &'static str, name: String },

    #[error("{value} is not a discriminant of `{ty}`")]
    UnknownEnumValue { ty: &'static str, value: i64 },

    #[error("Cannot parse `{input}` as `{ty}`")]
    Parse { ty: &'static str, input: String },

    #[error("Unknown polymorphic type `{0}`")]
    UnknownType(String),

    #[error("Object handle does not refer to a `{0}`")]
    Downcast(&'static str),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A `Result` whose error defaults to [`ArchiveError`].
pub type Result<T, E = ArchiveError> = core::result::Result<T, E>;

impl ArchiveError {
    /// A [`Mismatch`](Self::Mismatch) against the kind of `found`.
    #[inline]
    pub(crate) fn mismatch(expected: &'static str, found: &Value) -> Self {
        Self::Mismatch {
            expected,
            found: kind_name(found),
        }
    }
}

/// The name of a tree node's kind, for error messages.
pub(crate) fn kind_name(node: &Value) -> &'static str {
    match node {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
