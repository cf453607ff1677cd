//! Projection of native values onto [`Node`] trees.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::io;

use bytes::Bytes;
use serde::ser::{self, Impossible, Serialize};

use crate::error::{NodeError, Result};
use crate::node::{encode, write_node, Node};

/// Converts a native value into a node tree.
///
/// Maps and structs become dictionaries (struct fields keyed by their serde
/// name, so `#[serde(rename = "piece length")]` declares the external key),
/// sequences and tuples become lists, integers become integer nodes, and
/// text, bytes and floats become string nodes. `None` fields are left out of
/// their dictionary.
///
/// # Errors
///
/// [`NodeError::TypeMismatch`] for shapes with no wire form (`()`, a bare
/// `None`, non-scalar map keys) and [`NodeError::IntegerOutOfRange`] for
/// integers beyond `i64`.
///
/// # Examples
///
/// ```
/// use benode::{to_node, Node};
///
/// assert_eq!(to_node(&12345).unwrap(), Node::Integer(12345));
/// assert_eq!(to_node("spam").unwrap(), Node::string("spam"));
/// assert_eq!(to_node(&1.5f64).unwrap(), Node::string("1.5"));
/// ```
pub fn to_node<T>(value: &T) -> Result<Node>
where
    T: ?Sized + Serialize,
{
    value
        .serialize(NodeSerializer)?
        .ok_or_else(|| NodeError::mismatch("none", "a value with a wire form"))
}

/// Serializes a value straight to its canonical encoding.
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    encode(&to_node(value)?)
}

/// Serializes a value to a [`io::Write`].
pub fn to_writer<T, W>(mut writer: W, value: &T) -> Result<()>
where
    T: ?Sized + Serialize,
    W: io::Write,
{
    write_node(&to_node(value)?, &mut writer)
}

/// A [`Serializer`](ser::Serializer) whose output is a [`Node`].
///
/// The output is `None` only for [`Option::None`], which containers use to
/// skip the entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeSerializer;

fn integer<T>(v: T) -> Result<Option<Node>>
where
    T: Copy + ToString + TryInto<i64>,
{
    match v.try_into() {
        Ok(i) => Ok(Some(Node::Integer(i))),
        Err(_) => Err(NodeError::IntegerOutOfRange {
            value: v.to_string(),
            target: "i64",
        }),
    }
}

fn text(s: &str) -> Option<Node> {
    Some(Node::String(Bytes::copy_from_slice(s.as_bytes())))
}

fn single_entry(key: &'static str, value: Node) -> Option<Node> {
    let mut dict = BTreeMap::new();
    dict.insert(Bytes::from_static(key.as_bytes()), value);
    Some(Node::Dictionary(dict))
}

fn insert_entry(dict: &mut BTreeMap<Bytes, Node>, key: Bytes, value: Node) -> Result<()> {
    match dict.entry(key) {
        Entry::Vacant(entry) => {
            entry.insert(value);
            Ok(())
        }
        Entry::Occupied(entry) => Err(NodeError::DuplicateKey {
            key: entry.key().to_vec(),
        }),
    }
}

impl ser::Serializer for NodeSerializer {
    type Ok = Option<Node>;
    type Error = NodeError;

    type SerializeSeq = SerializeList;
    type SerializeTuple = SerializeList;
    type SerializeTupleStruct = SerializeList;
    type SerializeTupleVariant = SerializeVariant<SerializeList>;
    type SerializeMap = SerializeDict;
    type SerializeStruct = SerializeDict;
    type SerializeStructVariant = SerializeVariant<SerializeDict>;

    fn serialize_bool(self, v: bool) -> Result<Self::Ok> {
        Ok(Some(Node::Integer(i64::from(v))))
    }

    fn serialize_i8(self, v: i8) -> Result<Self::Ok> {
        integer(v)
    }

    fn serialize_i16(self, v: i16) -> Result<Self::Ok> {
        integer(v)
    }

    fn serialize_i32(self, v: i32) -> Result<Self::Ok> {
        integer(v)
    }

    fn serialize_i64(self, v: i64) -> Result<Self::Ok> {
        integer(v)
    }

    fn serialize_i128(self, v: i128) -> Result<Self::Ok> {
        integer(v)
    }

    fn serialize_u8(self, v: u8) -> Result<Self::Ok> {
        integer(v)
    }

    fn serialize_u16(self, v: u16) -> Result<Self::Ok> {
        integer(v)
    }

    fn serialize_u32(self, v: u32) -> Result<Self::Ok> {
        integer(v)
    }

    fn serialize_u64(self, v: u64) -> Result<Self::Ok> {
        integer(v)
    }

    fn serialize_u128(self, v: u128) -> Result<Self::Ok> {
        integer(v)
    }

    // no float type on the wire; the shortest text that parses back to the
    // same value
    fn serialize_f32(self, v: f32) -> Result<Self::Ok> {
        Ok(text(&format!("{v:?}")))
    }

    fn serialize_f64(self, v: f64) -> Result<Self::Ok> {
        Ok(text(&format!("{v:?}")))
    }

    fn serialize_char(self, v: char) -> Result<Self::Ok> {
        Ok(text(v.encode_utf8(&mut [0; 4])))
    }

    fn serialize_str(self, v: &str) -> Result<Self::Ok> {
        Ok(text(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Self::Ok> {
        Ok(Some(Node::String(Bytes::copy_from_slice(v))))
    }

    fn serialize_none(self) -> Result<Self::Ok> {
        Ok(None)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Self::Ok>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Self::Ok> {
        Err(NodeError::mismatch("unit", "a value with a wire form"))
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Self::Ok> {
        Err(NodeError::mismatch(
            format!("unit struct {name}"),
            "a value with a wire form",
        ))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok> {
        Ok(text(variant))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Self::Ok>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Self::Ok>
    where
        T: ?Sized + Serialize,
    {
        let value = to_node(value).map_err(|e| e.at_key(variant.as_bytes()))?;
        Ok(single_entry(variant, value))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(SerializeList {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Ok(SerializeVariant {
            variant,
            inner: self.serialize_seq(Some(len))?,
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(SerializeDict {
            entries: BTreeMap::new(),
            pending_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<Self::SerializeStruct> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Ok(SerializeVariant {
            variant,
            inner: self.serialize_map(Some(len))?,
        })
    }
}

/// Collects sequence elements into a list node.
#[derive(Debug)]
pub struct SerializeList {
    items: Vec<Node>,
}

impl SerializeList {
    fn push<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let index = self.items.len();
        let node = value
            .serialize(NodeSerializer)
            .and_then(|node| {
                node.ok_or_else(|| NodeError::mismatch("none", "a list element"))
            })
            .map_err(|e| e.at_index(index))?;
        self.items.push(node);
        Ok(())
    }

    fn finish(self) -> Node {
        Node::List(self.items)
    }
}

impl ser::SerializeSeq for SerializeList {
    type Ok = Option<Node>;
    type Error = NodeError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(Some(self.finish()))
    }
}

impl ser::SerializeTuple for SerializeList {
    type Ok = Option<Node>;
    type Error = NodeError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(Some(self.finish()))
    }
}

impl ser::SerializeTupleStruct for SerializeList {
    type Ok = Option<Node>;
    type Error = NodeError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(Some(self.finish()))
    }
}

/// Collects map entries or struct fields into a dictionary node.
#[derive(Debug)]
pub struct SerializeDict {
    entries: BTreeMap<Bytes, Node>,
    pending_key: Option<Bytes>,
}

impl SerializeDict {
    fn insert<T>(&mut self, key: Bytes, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match value.serialize(NodeSerializer) {
            Ok(Some(node)) => insert_entry(&mut self.entries, key, node),
            Ok(None) => Ok(()),
            Err(e) => Err(e.at_key(&key)),
        }
    }

    fn finish(self) -> Node {
        Node::Dictionary(self.entries)
    }
}

impl ser::SerializeMap for SerializeDict {
    type Ok = Option<Node>;
    type Error = NodeError;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.pending_key = Some(key.serialize(KeySerializer)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| NodeError::Custom("map value serialized before its key".into()))?;
        self.insert(key, value)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(Some(self.finish()))
    }
}

impl ser::SerializeStruct for SerializeDict {
    type Ok = Option<Node>;
    type Error = NodeError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.insert(Bytes::from_static(key.as_bytes()), value)
    }

    fn skip_field(&mut self, _key: &'static str) -> Result<()> {
        Ok(())
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(Some(self.finish()))
    }
}

/// Wraps a variant's payload in a one-entry dictionary keyed by the variant
/// name.
#[derive(Debug)]
pub struct SerializeVariant<S> {
    variant: &'static str,
    inner: S,
}

impl ser::SerializeTupleVariant for SerializeVariant<SerializeList> {
    type Ok = Option<Node>;
    type Error = NodeError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.inner.push(value)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(single_entry(self.variant, self.inner.finish()))
    }
}

impl ser::SerializeStructVariant for SerializeVariant<SerializeDict> {
    type Ok = Option<Node>;
    type Error = NodeError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.inner.insert(Bytes::from_static(key.as_bytes()), value)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(single_entry(self.variant, self.inner.finish()))
    }
}

/// Serializes dictionary keys to their byte content.
///
/// Text and bytes are used as-is and integers become their decimal text, which
/// the deserializer parses back for integral key types.
struct KeySerializer;

fn key_mismatch(found: &str) -> NodeError {
    NodeError::mismatch(found, "a string or integer dictionary key")
}

fn decimal_key<T: ToString>(v: T) -> Result<Bytes> {
    Ok(Bytes::from(v.to_string()))
}

impl ser::Serializer for KeySerializer {
    type Ok = Bytes;
    type Error = NodeError;

    type SerializeSeq = Impossible<Bytes, NodeError>;
    type SerializeTuple = Impossible<Bytes, NodeError>;
    type SerializeTupleStruct = Impossible<Bytes, NodeError>;
    type SerializeTupleVariant = Impossible<Bytes, NodeError>;
    type SerializeMap = Impossible<Bytes, NodeError>;
    type SerializeStruct = Impossible<Bytes, NodeError>;
    type SerializeStructVariant = Impossible<Bytes, NodeError>;

    fn serialize_bool(self, _v: bool) -> Result<Bytes> {
        Err(key_mismatch("bool"))
    }

    fn serialize_i8(self, v: i8) -> Result<Bytes> {
        decimal_key(v)
    }

    fn serialize_i16(self, v: i16) -> Result<Bytes> {
        decimal_key(v)
    }

    fn serialize_i32(self, v: i32) -> Result<Bytes> {
        decimal_key(v)
    }

    fn serialize_i64(self, v: i64) -> Result<Bytes> {
        decimal_key(v)
    }

    fn serialize_i128(self, v: i128) -> Result<Bytes> {
        decimal_key(v)
    }

    fn serialize_u8(self, v: u8) -> Result<Bytes> {
        decimal_key(v)
    }

    fn serialize_u16(self, v: u16) -> Result<Bytes> {
        decimal_key(v)
    }

    fn serialize_u32(self, v: u32) -> Result<Bytes> {
        decimal_key(v)
    }

    fn serialize_u64(self, v: u64) -> Result<Bytes> {
        decimal_key(v)
    }

    fn serialize_u128(self, v: u128) -> Result<Bytes> {
        decimal_key(v)
    }

    fn serialize_f32(self, _v: f32) -> Result<Bytes> {
        Err(key_mismatch("f32"))
    }

    fn serialize_f64(self, _v: f64) -> Result<Bytes> {
        Err(key_mismatch("f64"))
    }

    fn serialize_char(self, v: char) -> Result<Bytes> {
        Ok(Bytes::copy_from_slice(v.encode_utf8(&mut [0; 4]).as_bytes()))
    }

    fn serialize_str(self, v: &str) -> Result<Bytes> {
        Ok(Bytes::copy_from_slice(v.as_bytes()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Bytes> {
        Ok(Bytes::copy_from_slice(v))
    }

    fn serialize_none(self) -> Result<Bytes> {
        Err(key_mismatch("none"))
    }

    fn serialize_some<T>(self, value: &T) -> Result<Bytes>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Bytes> {
        Err(key_mismatch("unit"))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Bytes> {
        Err(key_mismatch("unit struct"))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Bytes> {
        Ok(Bytes::from_static(variant.as_bytes()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Bytes>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Bytes>
    where
        T: ?Sized + Serialize,
    {
        Err(key_mismatch("newtype variant"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(key_mismatch("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(key_mismatch("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(key_mismatch("tuple struct"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(key_mismatch("tuple variant"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(key_mismatch("map"))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(key_mismatch("struct"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(key_mismatch("struct variant"))
    }
}
