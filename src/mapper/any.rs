use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A decoded value of whatever shape the input had.
///
/// This is the target to use when the shape is not known up front: integer
/// nodes stay integers, string nodes become text (or raw bytes when they are
/// not UTF-8), lists become sequences of `Any`, and dictionaries become maps
/// from their raw key bytes to `Any`.
///
/// # Examples
///
/// ```
/// use benode::{from_slice, Any};
///
/// let any: Any = from_slice(b"d3:agei42e4:tagsl1:a1:bee").unwrap();
/// assert_eq!(any.get("age").and_then(Any::as_integer), Some(42));
/// assert_eq!(any.get("tags").and_then(Any::as_list).map(|l| l.len()), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Any {
    Integer(i64),
    Text(String),
    /// A string node whose content is not valid UTF-8.
    Bytes(Vec<u8>),
    List(Vec<Any>),
    Map(BTreeMap<Bytes, Any>),
}

impl Any {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Any::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Any::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the raw content of a text or byte value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Any::Text(s) => Some(s.as_bytes()),
            Any::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Any]> {
        match self {
            Any::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<Bytes, Any>> {
        match self {
            Any::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Looks up a text key if this value is a map.
    pub fn get(&self, key: &str) -> Option<&Any> {
        self.get_bytes(key.as_bytes())
    }

    /// Looks up a key by its raw bytes if this value is a map.
    pub fn get_bytes(&self, key: &[u8]) -> Option<&Any> {
        self.as_map()?.get(key)
    }
}

impl From<i64> for Any {
    fn from(i: i64) -> Self {
        Any::Integer(i)
    }
}

impl From<&str> for Any {
    fn from(s: &str) -> Self {
        Any::Text(s.to_string())
    }
}

impl From<String> for Any {
    fn from(s: String) -> Self {
        Any::Text(s)
    }
}

impl Serialize for Any {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Any::Integer(i) => serializer.serialize_i64(*i),
            Any::Text(s) => serializer.serialize_str(s),
            Any::Bytes(b) => serializer.serialize_bytes(b),
            Any::List(l) => {
                let mut seq = serializer.serialize_seq(Some(l.len()))?;
                for item in l {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Any::Map(m) => {
                let mut map = serializer.serialize_map(Some(m.len()))?;
                for (k, v) in m {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Any {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AnyVisitor)
    }
}

struct AnyVisitor;

impl<'de> Visitor<'de> for AnyVisitor {
    type Value = Any;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any node value")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Any, E>
    where
        E: de::Error,
    {
        Ok(Any::Integer(i64::from(v)))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Any, E>
    where
        E: de::Error,
    {
        Ok(Any::Integer(v))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Any, E>
    where
        E: de::Error,
    {
        i64::try_from(v)
            .map(Any::Integer)
            .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Any, E>
    where
        E: de::Error,
    {
        Ok(Any::Text(format!("{v:?}")))
    }

    fn visit_str<E>(self, v: &str) -> Result<Any, E>
    where
        E: de::Error,
    {
        Ok(Any::Text(v.to_string()))
    }

    fn visit_string<E>(self, v: String) -> Result<Any, E>
    where
        E: de::Error,
    {
        Ok(Any::Text(v))
    }

    fn visit_bytes<E>(self, v: &[u8]) -> Result<Any, E>
    where
        E: de::Error,
    {
        Ok(match std::str::from_utf8(v) {
            Ok(s) => Any::Text(s.to_string()),
            Err(_) => Any::Bytes(v.to_vec()),
        })
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Any, D::Error>
    where
        D: Deserializer<'de>,
    {
        Any::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Any, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Any::List(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Any, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = BTreeMap::new();
        while let Some((key, value)) = map.next_entry::<Bytes, Any>()? {
            entries.insert(key, value);
        }
        Ok(Any::Map(entries))
    }
}
