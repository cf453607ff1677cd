//! Wire constants and default limits.
//!
//! This module contains the byte values that make up the node grammar, the
//! digest size, and the defaults used by [`Limits`](crate::Limits).

// ============================================================================
// Grammar bytes
// ============================================================================

/// Starts an integer node (`i<decimal>e`)
pub const INTEGER_START: u8 = b'i';

/// Starts a list node (`l<nodes>e`)
pub const LIST_START: u8 = b'l';

/// Starts a dictionary node (`d<key><value>...e`)
pub const DICT_START: u8 = b'd';

/// Terminates integers, lists and dictionaries
pub const END: u8 = b'e';

/// Separates a string's length prefix from its payload
pub const STRING_SEPARATOR: u8 = b':';

/// Sign prefix accepted (and written) for negative integers
pub const MINUS: u8 = b'-';

// ============================================================================
// Digest
// ============================================================================

/// Size of a content digest in bytes (SHA-1)
pub const DIGEST_LEN: usize = 20;

// ============================================================================
// Default limits
// ============================================================================

/// Maximum nesting of lists and dictionaries accepted by default
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Maximum string payload accepted by default (64 MiB)
pub const DEFAULT_MAX_STRING_LENGTH: u64 = 64 * 1024 * 1024;
