//! Mapping between [`Node`](crate::Node) trees and native Rust values.
//!
//! The mapper is built on serde. Any type implementing `Serialize` can be
//! turned into a node tree with [`to_node`], and any type implementing
//! `Deserialize` can be filled from one with [`from_node`]. Struct fields are
//! matched to dictionary keys by their serde name, so the external key of a
//! field is declared with `#[serde(rename = "...")]`.
//!
//! | Rust | Node |
//! |------|------|
//! | integers, `bool` | Integer (`bool` as 0 or 1) |
//! | `str`, `String`, `char`, bytes | String |
//! | `f32`, `f64` | String holding the decimal text |
//! | `Vec<T>`, tuples, slices | List |
//! | structs, maps | Dictionary |
//! | `Option<T>` | the inner value; `None` fields are omitted |
//! | unit enum variant | String holding the variant name |
//! | other enum variants | one-entry Dictionary `{name: payload}` |
//!
//! Decoding is lenient where the conversion is unambiguous: integer nodes fill
//! text targets, and string nodes are parsed for numeric targets.
//!
//! # Examples
//!
//! ```
//! use benode::{from_slice, to_vec};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct FileEntry {
//!     length: i64,
//!     path: Vec<String>,
//!     #[serde(rename = "md5sum")]
//!     checksum: Option<String>,
//! }
//!
//! let entry = FileEntry {
//!     length: 1024,
//!     path: vec!["dir".into(), "file.txt".into()],
//!     checksum: None,
//! };
//! let bytes = to_vec(&entry).unwrap();
//! assert_eq!(bytes, b"d6:lengthi1024e4:pathl3:dir8:file.txtee");
//! assert_eq!(from_slice::<FileEntry>(&bytes).unwrap(), entry);
//! ```

mod any;
mod de;
mod ser;
mod session;

pub use any::Any;
pub use de::{from_node, from_reader, from_slice, NodeDeserializer};
pub use ser::{
    to_node, to_vec, to_writer, NodeSerializer, SerializeDict, SerializeList, SerializeVariant,
};
pub use session::{unmarshal_all, DecodeTarget, Decoder};
