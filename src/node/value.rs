use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;

/// One value of the node encoding.
///
/// A node tree is built either by the [`Parser`](crate::Parser) or by
/// [`to_node`](crate::to_node), children before parents, and owns all of its
/// children. Dictionary entries are keyed by the key's byte content and kept in
/// ascending byte order, which is also the order the writer emits them in.
///
/// # Examples
///
/// ```
/// use benode::Node;
///
/// // Creating nodes directly
/// let int = Node::Integer(42);
/// let string = Node::string("hello");
/// let list = Node::List(vec![Node::Integer(1), Node::Integer(2)]);
///
/// // Using From implementations
/// let int: Node = 42i64.into();
/// let string: Node = "hello".into();
///
/// assert_eq!(int.as_integer(), Some(42));
/// assert_eq!(string.as_str(), Some("hello"));
/// assert_eq!(list.as_list().map(|l| l.len()), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    /// An opaque byte string (text or raw binary).
    String(Bytes),
    /// A signed 64-bit integer.
    Integer(i64),
    /// An ordered sequence of nodes.
    List(Vec<Node>),
    /// Key/value entries, unique and ordered by key bytes.
    Dictionary(BTreeMap<Bytes, Node>),
}

/// The tag of a [`Node`], without its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    String,
    Integer,
    List,
    Dictionary,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NodeKind::String => "string node",
            NodeKind::Integer => "integer node",
            NodeKind::List => "list node",
            NodeKind::Dictionary => "dictionary node",
        })
    }
}

impl Node {
    /// Creates a string node from UTF-8 text.
    pub fn string(s: &str) -> Self {
        Node::String(Bytes::copy_from_slice(s.as_bytes()))
    }

    /// Returns the tag of this node.
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::String(_) => NodeKind::String,
            Node::Integer(_) => NodeKind::Integer,
            Node::List(_) => NodeKind::List,
            Node::Dictionary(_) => NodeKind::Dictionary,
        }
    }

    /// Returns the value as an integer, if it is one.
    ///
    /// ```
    /// use benode::Node;
    ///
    /// assert_eq!(Node::Integer(42).as_integer(), Some(42));
    /// assert_eq!(Node::string("42").as_integer(), None);
    /// ```
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Node::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the raw content of a string node.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Node::String(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the content of a string node if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Node]> {
        match self {
            Node::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&BTreeMap<Bytes, Node>> {
        match self {
            Node::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    /// Consumes the node and returns its entries, if it is a dictionary.
    pub fn into_dict(self) -> Option<BTreeMap<Bytes, Node>> {
        match self {
            Node::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    /// Looks up a key by content if this node is a dictionary.
    ///
    /// ```
    /// use benode::decode;
    ///
    /// let node = decode(b"d3:cow3:mooe").unwrap();
    /// assert_eq!(node.get(b"cow").and_then(|v| v.as_str()), Some("moo"));
    /// assert_eq!(node.get(b"spam"), None);
    /// ```
    pub fn get(&self, key: &[u8]) -> Option<&Node> {
        self.as_dict()?.get(key)
    }
}

impl From<i64> for Node {
    fn from(i: i64) -> Self {
        Node::Integer(i)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::string(s)
    }
}

impl From<Bytes> for Node {
    fn from(b: Bytes) -> Self {
        Node::String(b)
    }
}

impl From<Vec<Node>> for Node {
    fn from(l: Vec<Node>) -> Self {
        Node::List(l)
    }
}

impl From<BTreeMap<Bytes, Node>> for Node {
    fn from(d: BTreeMap<Bytes, Node>) -> Self {
        Node::Dictionary(d)
    }
}
