//! Fixed-size fingerprints of canonical encodings.
//!
//! A digest is the SHA-1 hash of a value's canonical encoding. Because the
//! writer always emits dictionary keys in sorted order, logically equal values
//! hash the same no matter how they were built or in what order their input
//! listed its keys. Hashing a torrent's `info` dictionary this way yields its
//! info hash.

use std::fmt;

use serde::Serialize;
use sha1::{Digest as _, Sha1};

use crate::constants::DIGEST_LEN;
use crate::error::{NodeError, Result};
use crate::mapper::to_node;
use crate::node::Node;

/// A 20-byte SHA-1 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// Hashes bytes that are already canonically encoded.
    pub fn of_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(data);
        Digest(hasher.finalize().into())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; DIGEST_LEN] = bytes.try_into().map_err(|_| NodeError::MalformedScalar {
            target: "digest",
            text: hex_encode(bytes),
        })?;
        Ok(Digest(arr))
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex_decode(s).ok_or_else(|| NodeError::MalformedScalar {
            target: "hex digest",
            text: s.to_string(),
        })?;
        Self::from_bytes(&bytes).map_err(|_| NodeError::MalformedScalar {
            target: "hex digest",
            text: s.to_string(),
        })
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex_encode(&self.0)
    }
}

impl From<[u8; DIGEST_LEN]> for Digest {
    fn from(bytes: [u8; DIGEST_LEN]) -> Self {
        Digest(bytes)
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Computes the digest of a native value's canonical encoding.
///
/// # Errors
///
/// Fails if the value cannot be converted to a node (see
/// [`to_node`](crate::to_node)).
///
/// # Examples
///
/// ```
/// use benode::{digest, Digest};
/// use std::collections::BTreeMap;
///
/// let mut fields = BTreeMap::new();
/// fields.insert("spam", "eggs");
/// fields.insert("cow", "moo");
///
/// let d = digest(&fields).unwrap();
/// assert_eq!(d, Digest::of_bytes(b"d3:cow3:moo4:spam4:eggse"));
/// assert_eq!(d.to_hex(), "d2c751227762e1a96a62baa71868456a3260f3db");
/// ```
pub fn digest<T>(value: &T) -> Result<Digest>
where
    T: ?Sized + Serialize,
{
    to_node(value)?.digest()
}

impl Node {
    /// Computes the digest of this node's canonical encoding.
    pub fn digest(&self) -> Result<Digest> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        let digest = Digest::of_bytes(&buf);
        tracing::trace!(len = buf.len(), %digest, "computed digest");
        Ok(digest)
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
        use std::fmt::Write;
        let _ = write!(s, "{:02x}", b);
        s
    })
}

fn hex_decode(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 || !s.is_ascii() {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use serde::Serialize;

    use super::*;
    use crate::node::decode;

    #[derive(Serialize)]
    struct Info {
        name: String,
        #[serde(rename = "piece length")]
        piece_length: i64,
        pieces: Bytes,
        length: i64,
    }

    fn info() -> Info {
        Info {
            name: "test.txt".into(),
            piece_length: 16384,
            pieces: Bytes::from(vec![0xab; 20]),
            length: 1024,
        }
    }

    #[test]
    fn test_empty_input_vector() {
        assert_eq!(
            Digest::of_bytes(b"").to_hex(),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
    }

    #[test]
    fn test_info_dictionary_vector() {
        let d = digest(&info()).unwrap();
        assert_eq!(d.to_hex(), "b7d3a4d262db6aafcea1dab9660d52b7b4eb38fb");
    }

    #[test]
    fn test_integer_vector() {
        assert_eq!(
            Node::Integer(42).digest().unwrap().to_hex(),
            "3ce69356df4222111c27b41cccf2164e6cced799"
        );
    }

    #[test]
    fn test_digest_is_stable() {
        assert_eq!(digest(&info()).unwrap(), digest(&info()).unwrap());
    }

    #[test]
    fn test_key_order_does_not_matter() {
        let sorted = decode(b"d3:cow3:moo4:spam4:eggse").unwrap();
        let unsorted = decode(b"d4:spam4:eggs3:cow3:mooe").unwrap();
        assert_eq!(sorted.digest().unwrap(), unsorted.digest().unwrap());
    }

    #[test]
    fn test_value_and_node_agree() {
        let node = to_node(&info()).unwrap();
        assert_eq!(node.digest().unwrap(), digest(&info()).unwrap());
    }

    #[test]
    fn test_different_values_differ() {
        let mut other = info();
        other.length = 1025;
        assert_ne!(digest(&info()).unwrap(), digest(&other).unwrap());
    }

    #[test]
    fn test_unencodable_value() {
        assert!(digest(&()).is_err());
    }

    #[test]
    fn test_hex_roundtrip() {
        let d = Digest::of_bytes(b"i42e");
        assert_eq!(Digest::from_hex(&d.to_hex()).unwrap(), d);
        assert_eq!(d.to_string(), d.to_hex());
        assert_eq!(format!("{:?}", d), format!("Digest({})", d.to_hex()));
    }

    #[test]
    fn test_invalid_hex() {
        assert!(Digest::from_hex("abc").is_err());
        assert!(Digest::from_hex("zz").is_err());
        assert!(Digest::from_hex("abcd").is_err());
        assert!(Digest::from_bytes(&[0; 19]).is_err());
        // even byte length, but a pair would split a multi-byte char
        assert!(Digest::from_hex("a\u{e9}\u{2026}").is_err());
    }
}
