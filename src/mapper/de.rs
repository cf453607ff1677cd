//! Projection of [`Node`] trees onto native values.

use std::collections::btree_map;
use std::io::BufRead;
use std::str::FromStr;

use bytes::Bytes;
use serde::de::{self, DeserializeOwned, DeserializeSeed, IntoDeserializer, Visitor};
use serde::forward_to_deserialize_any;

use crate::error::{NodeError, Result};
use crate::node::{decode, Node, Parser};

/// Decodes a node tree into a native value.
///
/// The target type drives the conversion: integer nodes fill integral, float,
/// text and `bool` targets; string nodes fill text and byte targets and are
/// parsed for numeric targets; lists fill sequences; dictionaries fill maps
/// and structs. Struct fields are matched by their serde name and dictionary
/// keys with no matching field are ignored. Targets that accept anything (such
/// as [`Any`](crate::Any)) get the node's own shape.
///
/// # Errors
///
/// [`NodeError::TypeMismatch`] when the node cannot fill the target,
/// [`NodeError::MalformedScalar`] when text does not parse as the requested
/// number. Errors below a key or index are wrapped in
/// [`NodeError::Context`].
///
/// # Examples
///
/// ```
/// use benode::{decode, from_node};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Barn {
///     #[serde(rename = "cow")]
///     a: String,
///     #[serde(rename = "spam")]
///     b: String,
/// }
///
/// let node = decode(b"d3:cow3:moo4:spam4:eggse").unwrap();
/// let barn: Barn = from_node(&node).unwrap();
/// assert_eq!(barn.a, "moo");
/// assert_eq!(barn.b, "eggs");
/// ```
pub fn from_node<'de, T>(node: &'de Node) -> Result<T>
where
    T: de::Deserialize<'de>,
{
    T::deserialize(NodeDeserializer::new(node))
}

/// Parses a complete buffer and decodes it into a native value.
///
/// Fails with [`NodeError::TrailingData`] if bytes remain after the node.
pub fn from_slice<T>(data: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    from_node(&decode(data)?)
}

/// Reads one node from `reader` and decodes it into a native value.
///
/// The reader may still have bytes available when this function returns
/// successfully.
pub fn from_reader<T, R>(reader: R) -> Result<T>
where
    T: DeserializeOwned,
    R: BufRead,
{
    from_node(&Parser::new(reader).scan_required()?)
}

/// A [`Deserializer`](de::Deserializer) reading from a borrowed [`Node`].
#[derive(Debug, Clone, Copy)]
pub struct NodeDeserializer<'de> {
    node: &'de Node,
}

impl<'de> NodeDeserializer<'de> {
    pub fn new(node: &'de Node) -> Self {
        Self { node }
    }

    fn mismatch(&self, expected: &str) -> NodeError {
        NodeError::mismatch(self.node.kind().to_string(), expected)
    }

    fn integer<T>(&self, target: &'static str) -> Result<T>
    where
        T: TryFrom<i64> + FromStr,
    {
        match self.node {
            Node::Integer(i) => T::try_from(*i).map_err(|_| NodeError::IntegerOutOfRange {
                value: i.to_string(),
                target,
            }),
            Node::String(b) => parse_scalar(b, target),
            _ => Err(self.mismatch(target)),
        }
    }

    fn float<T>(&self, target: &'static str) -> Result<T>
    where
        T: FromStr,
    {
        match self.node {
            // integers widen through their decimal form
            Node::Integer(i) => parse_scalar(i.to_string().as_bytes(), target),
            Node::String(b) => parse_scalar(b, target),
            _ => Err(self.mismatch(target)),
        }
    }
}

fn parse_scalar<T: FromStr>(bytes: &[u8], target: &'static str) -> Result<T> {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| NodeError::MalformedScalar {
            target,
            text: String::from_utf8_lossy(bytes).into_owned(),
        })
}

fn utf8<'a>(bytes: &'a [u8]) -> Result<&'a str> {
    std::str::from_utf8(bytes).map_err(|_| NodeError::MalformedScalar {
        target: "utf-8 text",
        text: String::from_utf8_lossy(bytes).into_owned(),
    })
}

macro_rules! deserialize_integer {
    ($($method:ident => $visit:ident: $ty:ty,)*) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: Visitor<'de>,
            {
                visitor.$visit(self.integer::<$ty>(stringify!($ty))?)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for NodeDeserializer<'de> {
    type Error = NodeError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.node {
            Node::Integer(i) => visitor.visit_i64(*i),
            Node::String(b) => match std::str::from_utf8(b) {
                Ok(s) => visitor.visit_borrowed_str(s),
                Err(_) => visitor.visit_borrowed_bytes(b),
            },
            Node::List(l) => visitor.visit_seq(ListAccess::new(l)),
            Node::Dictionary(d) => visitor.visit_map(DictAccess::new(d)),
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.node {
            Node::Integer(0) => visitor.visit_bool(false),
            Node::Integer(1) => visitor.visit_bool(true),
            Node::Integer(i) => Err(NodeError::IntegerOutOfRange {
                value: i.to_string(),
                target: "bool",
            }),
            _ => Err(self.mismatch("bool")),
        }
    }

    deserialize_integer! {
        deserialize_i8 => visit_i8: i8,
        deserialize_i16 => visit_i16: i16,
        deserialize_i32 => visit_i32: i32,
        deserialize_i64 => visit_i64: i64,
        deserialize_i128 => visit_i128: i128,
        deserialize_u8 => visit_u8: u8,
        deserialize_u16 => visit_u16: u16,
        deserialize_u32 => visit_u32: u32,
        deserialize_u64 => visit_u64: u64,
        deserialize_u128 => visit_u128: u128,
    }

    fn deserialize_f32<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_f32(self.float("f32")?)
    }

    fn deserialize_f64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_f64(self.float("f64")?)
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.node {
            Node::String(b) => {
                let s = utf8(b)?;
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => visitor.visit_char(c),
                    _ => Err(NodeError::MalformedScalar {
                        target: "char",
                        text: s.to_string(),
                    }),
                }
            }
            _ => Err(self.mismatch("char")),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.node {
            Node::String(b) => visitor.visit_borrowed_str(utf8(b)?),
            Node::Integer(i) => visitor.visit_string(i.to_string()),
            _ => Err(self.mismatch("a string")),
        }
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.node {
            Node::String(b) => visitor.visit_borrowed_bytes(b),
            _ => Err(self.mismatch("a byte string")),
        }
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    // a present node always fills the option; absent dictionary keys are
    // what produce None
    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_unit<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        Err(self.mismatch("unit"))
    }

    fn deserialize_unit_struct<V>(self, name: &'static str, _visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        Err(self.mismatch(name))
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.node {
            Node::List(l) => visitor.visit_seq(ListAccess::new(l)),
            _ => Err(self.mismatch("a list")),
        }
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.node {
            Node::Dictionary(d) => visitor.visit_map(DictAccess::new(d)),
            _ => Err(self.mismatch("a dictionary")),
        }
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.node {
            Node::Dictionary(d) => visitor.visit_map(DictAccess::new(d)),
            _ => Err(self.mismatch(name)),
        }
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.node {
            Node::String(b) => visitor.visit_enum(utf8(b)?.into_deserializer()),
            Node::Dictionary(d) if d.len() == 1 => {
                let (variant, payload) = d
                    .iter()
                    .next()
                    .ok_or_else(|| self.mismatch(name))?;
                visitor.visit_enum(VariantAccess { variant, payload })
            }
            _ => Err(self.mismatch(name)),
        }
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

struct ListAccess<'de> {
    iter: std::iter::Enumerate<std::slice::Iter<'de, Node>>,
}

impl<'de> ListAccess<'de> {
    fn new(items: &'de [Node]) -> Self {
        Self {
            iter: items.iter().enumerate(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for ListAccess<'de> {
    type Error = NodeError;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((index, node)) => seed
                .deserialize(NodeDeserializer::new(node))
                .map(Some)
                .map_err(|e| e.at_index(index)),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct DictAccess<'de> {
    iter: btree_map::Iter<'de, Bytes, Node>,
    pending: Option<(&'de Bytes, &'de Node)>,
}

impl<'de> DictAccess<'de> {
    fn new(entries: &'de btree_map::BTreeMap<Bytes, Node>) -> Self {
        Self {
            iter: entries.iter(),
            pending: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for DictAccess<'de> {
    type Error = NodeError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.pending = Some((key, value));
                seed.deserialize(KeyDeserializer { key })
                    .map(Some)
                    .map_err(|e| e.at_key(key))
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: DeserializeSeed<'de>,
    {
        let (key, value) = self
            .pending
            .take()
            .ok_or_else(|| NodeError::Custom("dictionary value requested before its key".into()))?;
        seed.deserialize(NodeDeserializer::new(value))
            .map_err(|e| e.at_key(key))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct VariantAccess<'de> {
    variant: &'de Bytes,
    payload: &'de Node,
}

impl<'de> de::EnumAccess<'de> for VariantAccess<'de> {
    type Error = NodeError;
    type Variant = NodeDeserializer<'de>;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(KeyDeserializer { key: self.variant })?;
        Ok((variant, NodeDeserializer::new(self.payload)))
    }
}

impl<'de> de::VariantAccess<'de> for NodeDeserializer<'de> {
    type Error = NodeError;

    fn unit_variant(self) -> Result<()> {
        Err(self.mismatch("a unit variant name"))
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: DeserializeSeed<'de>,
    {
        seed.deserialize(self)
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        de::Deserializer::deserialize_seq(self, visitor)
    }

    fn struct_variant<V>(self, fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        de::Deserializer::deserialize_struct(self, "struct variant", fields, visitor)
    }
}

/// Deserializes a dictionary key from its byte content.
///
/// Keys are decoded as strings; integral and float targets parse the text.
struct KeyDeserializer<'de> {
    key: &'de Bytes,
}

impl<'de> KeyDeserializer<'de> {
    fn parse<T: FromStr>(&self, target: &'static str) -> Result<T> {
        parse_scalar(self.key, target)
    }
}

macro_rules! deserialize_key_number {
    ($($method:ident => $visit:ident: $ty:ty,)*) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: Visitor<'de>,
            {
                visitor.$visit(self.parse::<$ty>(stringify!($ty))?)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for KeyDeserializer<'de> {
    type Error = NodeError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match std::str::from_utf8(self.key) {
            Ok(s) => visitor.visit_borrowed_str(s),
            Err(_) => visitor.visit_borrowed_bytes(self.key),
        }
    }

    deserialize_key_number! {
        deserialize_i8 => visit_i8: i8,
        deserialize_i16 => visit_i16: i16,
        deserialize_i32 => visit_i32: i32,
        deserialize_i64 => visit_i64: i64,
        deserialize_i128 => visit_i128: i128,
        deserialize_u8 => visit_u8: u8,
        deserialize_u16 => visit_u16: u16,
        deserialize_u32 => visit_u32: u32,
        deserialize_u64 => visit_u64: u64,
        deserialize_u128 => visit_u128: u128,
        deserialize_f32 => visit_f32: f32,
        deserialize_f64 => visit_f64: f64,
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_borrowed_str(utf8(self.key)?)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    // binary keys reach the field visitor as bytes, which sends unknown
    // ones to the ignored branch
    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_any(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_enum(utf8(self.key)?.into_deserializer())
    }

    forward_to_deserialize_any! {
        bool char bytes byte_buf unit unit_struct seq tuple tuple_struct map
        struct ignored_any
    }
}
