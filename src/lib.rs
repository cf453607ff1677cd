//! benode - the node encoding
//!
//! This library reads, writes and maps the length-prefixed binary encoding
//! used by `.torrent` metadata files: integers, byte strings, lists and
//! dictionaries, nested to any depth.
//!
//! # Modules
//!
//! - [`node`] - byte scanner, recursive-descent parser and canonical writer
//! - [`mapper`] - serde-based mapping between node trees and native values
//! - [`digest`] - SHA-1 fingerprints of canonical encodings
//! - [`constants`] - wire bytes and default limits
//!
//! # Examples
//!
//! ```
//! use benode::{digest, from_slice, to_vec};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Info {
//!     name: String,
//!     #[serde(rename = "piece length")]
//!     piece_length: i64,
//! }
//!
//! let info: Info = from_slice(b"d4:name4:test12:piece lengthi16384ee").unwrap();
//! assert_eq!(info.piece_length, 16384);
//! assert_eq!(to_vec(&info).unwrap(), b"d4:name4:test12:piece lengthi16384ee");
//! assert_eq!(digest(&info).unwrap().as_bytes().len(), 20);
//! ```

pub mod constants;
pub mod digest;
mod error;
pub mod mapper;
pub mod node;

pub use digest::{digest, Digest};
pub use error::{ErrorKind, NodeError, Result};
pub use mapper::{
    from_node, from_reader, from_slice, to_node, to_vec, to_writer, unmarshal_all, Any,
    DecodeTarget, Decoder, NodeDeserializer, NodeSerializer,
};
pub use node::{
    decode, encode, scan_one, scan_required, write_node, Limits, Node, NodeKind, Parser, Scanner,
};
