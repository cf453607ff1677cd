use std::io::Write;

use super::value::Node;
use crate::constants::{DICT_START, END, INTEGER_START, LIST_START, STRING_SEPARATOR};
use crate::error::Result;

/// Encodes a node to a byte vector.
///
/// The output is canonical: dictionary entries are written in ascending byte
/// order of their keys, so logically equal trees always produce the same bytes.
/// - Integers: `i<number>e`
/// - Strings: `<length>:<data>`
/// - Lists: `l<items>e`
/// - Dictionaries: `d<key><value>...e`
///
/// # Errors
///
/// Returns an error if writing to the internal buffer fails.
///
/// # Examples
///
/// ```
/// use benode::{encode, Node};
/// use bytes::Bytes;
/// use std::collections::BTreeMap;
///
/// assert_eq!(encode(&Node::Integer(12345)).unwrap(), b"i12345e");
/// assert_eq!(encode(&Node::string("spam")).unwrap(), b"4:spam");
///
/// let mut dict = BTreeMap::new();
/// dict.insert(Bytes::from_static(b"spam"), Node::string("eggs"));
/// dict.insert(Bytes::from_static(b"cow"), Node::string("moo"));
/// assert_eq!(encode(&Node::Dictionary(dict)).unwrap(), b"d3:cow3:moo4:spam4:eggse");
/// ```
pub fn encode(node: &Node) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_node(node, &mut buf)?;
    Ok(buf)
}

/// Writes the canonical encoding of `node` to `writer`.
pub fn write_node<W: Write>(node: &Node, writer: &mut W) -> Result<()> {
    match node {
        Node::Integer(i) => {
            write!(writer, "{}{}{}", INTEGER_START as char, i, END as char)?;
        }
        Node::String(b) => write_string(b, writer)?,
        Node::List(l) => {
            writer.write_all(&[LIST_START])?;
            for item in l {
                write_node(item, writer)?;
            }
            writer.write_all(&[END])?;
        }
        Node::Dictionary(d) => {
            writer.write_all(&[DICT_START])?;
            for (key, val) in d {
                write_string(key, writer)?;
                write_node(val, writer)?;
            }
            writer.write_all(&[END])?;
        }
    }
    Ok(())
}

fn write_string<W: Write>(bytes: &[u8], writer: &mut W) -> Result<()> {
    write!(writer, "{}{}", bytes.len(), STRING_SEPARATOR as char)?;
    writer.write_all(bytes)?;
    Ok(())
}

impl Node {
    /// Writes the canonical encoding of this node to `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_node(self, writer)
    }
}
