use std::fmt;

use serde::{de, ser};
use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, NodeError>;

/// Errors produced while scanning, writing, mapping or digesting nodes.
///
/// Parser errors carry the byte offset at which they were detected. Errors
/// raised below a dictionary key or list index are wrapped in
/// [`NodeError::Context`] on their way out, so the outermost error names the
/// path to the offending value.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NodeError {
    /// The underlying reader or writer failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The input ended where another byte was required.
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEof { offset: u64 },

    /// A string payload was shorter than its length prefix.
    #[error("truncated string at offset {offset}: expected {expected} bytes, found {found}")]
    Truncated {
        offset: u64,
        expected: u64,
        found: u64,
    },

    /// A separator or terminator was missing.
    #[error("syntax error at offset {offset}: expected {expected}, found {}", describe_byte(*.found))]
    Syntax {
        offset: u64,
        expected: &'static str,
        found: Option<u8>,
    },

    /// The lookahead byte does not start any node.
    #[error("not a node at offset {offset}: {}", describe_byte(Some(*.found)))]
    NotANode { offset: u64, found: u8 },

    /// A dictionary key was not a string node.
    #[error("dictionary key at offset {offset} is not a string")]
    NonStringKey { offset: u64 },

    /// The same key appeared twice in one dictionary.
    #[error("duplicate dictionary key {}", String::from_utf8_lossy(.key))]
    DuplicateKey { key: Vec<u8> },

    /// The shape of a value does not fit the requested target.
    #[error("type mismatch: found {found}, expected {expected}")]
    TypeMismatch { found: String, expected: String },

    /// An integer does not fit the integral type it is converted to.
    #[error("integer {value} out of range for {target}")]
    IntegerOutOfRange { value: String, target: &'static str },

    /// Text could not be parsed as the requested scalar.
    #[error("malformed {target}: {text:?}")]
    MalformedScalar { target: &'static str, text: String },

    /// Lists and dictionaries were nested deeper than the configured limit.
    #[error("nesting deeper than {max_depth} levels")]
    NestingTooDeep { max_depth: usize },

    /// A string length prefix exceeded the configured limit.
    #[error("string length {length} exceeds limit of {max} bytes")]
    StringTooLong { length: i64, max: u64 },

    /// Input continued after a complete value.
    #[error("trailing data after value at offset {offset}")]
    TrailingData { offset: u64 },

    /// The session already failed; it refuses further work until cleared.
    #[error("session already failed; clear it before scanning again")]
    Poisoned,

    /// Message raised by a `Serialize` or `Deserialize` implementation.
    #[error("{0}")]
    Custom(String),

    /// An error raised below a dictionary key or list index.
    #[error("{location}: {source}")]
    Context {
        location: String,
        #[source]
        source: Box<NodeError>,
    },
}

/// Broad classification of a [`NodeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Reader or writer failure.
    Io,
    /// The input ended before an expected byte count was read.
    Truncation,
    /// Wrong start byte, missing separator or terminator, bad key.
    Syntax,
    /// Value shape and target shape are incompatible.
    TypeMismatch,
    /// Text that failed to parse as the requested number.
    MalformedScalar,
    /// The lookahead byte matches no grammar production.
    NotANode,
    /// A configured limit was exceeded.
    Limit,
    /// Anything else, including a poisoned session.
    Other,
}

impl NodeError {
    /// Classifies this error, looking through any [`NodeError::Context`]
    /// wrappers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            NodeError::Io(_) => ErrorKind::Io,
            NodeError::UnexpectedEof { .. } | NodeError::Truncated { .. } => {
                ErrorKind::Truncation
            }
            NodeError::Syntax { .. }
            | NodeError::NonStringKey { .. }
            | NodeError::DuplicateKey { .. }
            | NodeError::TrailingData { .. } => ErrorKind::Syntax,
            NodeError::NotANode { .. } => ErrorKind::NotANode,
            NodeError::TypeMismatch { .. } | NodeError::IntegerOutOfRange { .. } => {
                ErrorKind::TypeMismatch
            }
            NodeError::MalformedScalar { .. } => ErrorKind::MalformedScalar,
            NodeError::NestingTooDeep { .. } | NodeError::StringTooLong { .. } => ErrorKind::Limit,
            NodeError::Poisoned | NodeError::Custom(_) => ErrorKind::Other,
            NodeError::Context { source, .. } => source.kind(),
        }
    }

    /// Returns true if this is the "no more input" condition seen by a
    /// primitive that needed one more byte.
    pub fn is_end_of_input(&self) -> bool {
        matches!(self, NodeError::UnexpectedEof { .. })
    }

    /// Returns the innermost error below any context wrappers.
    pub fn root(&self) -> &NodeError {
        match self {
            NodeError::Context { source, .. } => source.root(),
            other => other,
        }
    }

    pub(crate) fn mismatch(found: impl Into<String>, expected: impl Into<String>) -> Self {
        NodeError::TypeMismatch {
            found: found.into(),
            expected: expected.into(),
        }
    }

    pub(crate) fn at_key(self, key: &[u8]) -> Self {
        NodeError::Context {
            location: format!("key {:?}", String::from_utf8_lossy(key)),
            source: Box::new(self),
        }
    }

    pub(crate) fn at_index(self, index: usize) -> Self {
        NodeError::Context {
            location: format!("index {index}"),
            source: Box::new(self),
        }
    }
}

fn describe_byte(byte: Option<u8>) -> String {
    match byte {
        Some(b) if b.is_ascii_graphic() => format!("'{}'", b as char),
        Some(b) => format!("byte 0x{b:02x}"),
        None => "end of input".to_string(),
    }
}

impl ser::Error for NodeError {
    fn custom<T>(msg: T) -> Self
    where
        T: fmt::Display,
    {
        NodeError::Custom(msg.to_string())
    }
}

impl de::Error for NodeError {
    fn custom<T>(msg: T) -> Self
    where
        T: fmt::Display,
    {
        NodeError::Custom(msg.to_string())
    }

    fn invalid_type(unexp: de::Unexpected<'_>, exp: &dyn de::Expected) -> Self {
        NodeError::mismatch(unexp.to_string(), exp.to_string())
    }

    fn invalid_value(unexp: de::Unexpected<'_>, exp: &dyn de::Expected) -> Self {
        NodeError::mismatch(unexp.to_string(), exp.to_string())
    }
}
