use crate::constants::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_STRING_LENGTH};

/// Resource limits applied while parsing.
///
/// The grammar itself puts no bound on nesting or string size, so a hostile
/// stream could otherwise exhaust the stack or memory.
///
/// # Examples
///
/// ```
/// use benode::{Limits, Parser};
///
/// let limits = Limits::default().with_max_depth(2);
/// let mut parser = Parser::with_limits(&b"llli1eeee"[..], limits);
/// assert!(parser.scan_required().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum nesting of lists and dictionaries.
    pub max_depth: usize,
    /// Maximum length of a single string payload in bytes.
    pub max_string_length: u64,
}

impl Limits {
    /// Limits that only stop at the numeric range of the fields.
    pub const fn unbounded() -> Self {
        Self {
            max_depth: usize::MAX,
            max_string_length: u64::MAX,
        }
    }

    /// Sets the maximum nesting depth.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the maximum string payload length.
    #[must_use]
    pub const fn with_max_string_length(mut self, max_string_length: u64) -> Self {
        self.max_string_length = max_string_length;
        self
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_string_length: DEFAULT_MAX_STRING_LENGTH,
        }
    }
}
