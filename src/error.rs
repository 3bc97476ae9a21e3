//! Error types for amf-rs

use thiserror::Error;

/// Result type alias using the library's error type
pub type Result<T> = std::result::Result<T, AmfError>;

/// Which reference table a reference header pointed into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefTable {
    /// AMF3 string table
    String,
    /// Complex object table (both formats)
    Object,
    /// AMF3 trait table
    Trait,
}

impl std::fmt::Display for RefTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefTable::String => write!(f, "string"),
            RefTable::Object => write!(f, "object"),
            RefTable::Trait => write!(f, "trait"),
        }
    }
}

/// AMF encoding/decoding errors
#[derive(Debug, Error)]
pub enum AmfError {
    /// A leading marker byte that the active format does not define
    #[error("Unknown AMF marker: 0x{0:02x}")]
    UnknownMarker(u8),

    /// The buffer ended before a declared length was satisfied
    #[error("Truncated AMF input: needed {needed} bytes, {available} available")]
    TruncatedInput { needed: usize, available: usize },

    /// The value has no encoding in the active format
    #[error("Unrepresentable AMF value: {0}")]
    UnrepresentableValue(&'static str),

    /// A reference header pointed past the end of its table
    #[error("Unresolved AMF {table} reference: {index}")]
    UnresolvedReference { table: RefTable, index: usize },

    #[error("Invalid UTF-8 in AMF string")]
    InvalidUtf8,

    #[error("Invalid object end marker")]
    InvalidObjectEnd,

    #[error("AMF nesting too deep")]
    NestingTooDeep,

    /// An externalizable trait named an alias nobody registered
    #[error("No externalizable type registered for alias '{0}'")]
    UnknownExternalizable(String),

    /// Failure reported by an externalizable type's own hook
    #[error("External hook failed: {0}")]
    External(String),
}

impl AmfError {
    pub(crate) fn truncated(needed: usize, available: usize) -> Self {
        AmfError::TruncatedInput { needed, available }
    }
}
