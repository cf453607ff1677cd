//! The node encoding: parsing and canonical writing.
//!
//! The node encoding is a length-prefixed, self-describing binary format for
//! nested scalars, sequences and key/value structures. It is the format of
//! `.torrent` metadata files.
//!
//! # Data Types
//!
//! | Type | Format | Example |
//! |------|--------|---------|
//! | Integer | `i<number>e` | `i-42e` → -42 |
//! | String | `<length>:<data>` | `4:spam` → "spam" |
//! | List | `l<items>e` | `l4:spam4:eggse` → ["spam", "eggs"] |
//! | Dictionary | `d<key><value>...e` | `d3:cow3:mooe` → {"cow": "moo"} |
//!
//! # Examples
//!
//! ## Reading nodes from a stream
//!
//! ```
//! use benode::{Node, Parser};
//!
//! let mut parser = Parser::new(&b"l4:spam4:eggse"[..]);
//! let node = parser.scan_required().unwrap();
//! assert_eq!(
//!     node,
//!     Node::List(vec![Node::string("spam"), Node::string("eggs")])
//! );
//! ```
//!
//! ## Writing nodes
//!
//! ```
//! use benode::{decode, encode};
//!
//! // dictionary keys come out sorted, whatever order they came in
//! let node = decode(b"d4:spam4:eggs3:cow3:mooe").unwrap();
//! assert_eq!(encode(&node).unwrap(), b"d3:cow3:moo4:spam4:eggse");
//! ```
//!
//! # Error Handling
//!
//! - [`NodeError::UnexpectedEof`] / [`NodeError::Truncated`] - input ended early
//! - [`NodeError::Syntax`] - missing `:` or `e`, or no digits in an integer
//! - [`NodeError::NotANode`] - lookahead byte starts no node
//! - [`NodeError::NonStringKey`] / [`NodeError::DuplicateKey`] - bad dictionary
//! - [`NodeError::NestingTooDeep`] / [`NodeError::StringTooLong`] - [`Limits`]
//!
//! [`NodeError::UnexpectedEof`]: crate::NodeError::UnexpectedEof
//! [`NodeError::Truncated`]: crate::NodeError::Truncated
//! [`NodeError::Syntax`]: crate::NodeError::Syntax
//! [`NodeError::NotANode`]: crate::NodeError::NotANode
//! [`NodeError::NonStringKey`]: crate::NodeError::NonStringKey
//! [`NodeError::DuplicateKey`]: crate::NodeError::DuplicateKey
//! [`NodeError::NestingTooDeep`]: crate::NodeError::NestingTooDeep
//! [`NodeError::StringTooLong`]: crate::NodeError::StringTooLong

mod limits;
mod parse;
mod scanner;
mod value;
mod write;

pub use limits::Limits;
pub use parse::{decode, scan_one, scan_required, Parser};
pub use scanner::Scanner;
pub use value::{Node, NodeKind};
pub use write::{encode, write_node};

#[cfg(test)]
mod tests;
