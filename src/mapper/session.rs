use std::io::BufRead;

use serde::de::DeserializeOwned;

use super::de::from_node;
use crate::error::{NodeError, Result};
use crate::node::{Limits, Node, Parser};

/// A value that a decoded node can be written into.
///
/// Implemented for every [`DeserializeOwned`] type, so a heterogeneous list of
/// targets can be passed to [`unmarshal_all`] as `&mut dyn DecodeTarget`.
pub trait DecodeTarget {
    /// Replaces `self` with the value decoded from `node`.
    fn decode_from(&mut self, node: &Node) -> Result<()>;
}

impl<T: DeserializeOwned> DecodeTarget for T {
    fn decode_from(&mut self, node: &Node) -> Result<()> {
        *self = from_node(node)?;
        Ok(())
    }
}

/// Reads one node per target from `reader` and decodes each into its target.
///
/// Stops early without error when the input ends cleanly between nodes,
/// leaving the remaining targets untouched, and returns how many targets were
/// filled. A node cut off by the end of input is an error.
///
/// # Examples
///
/// ```
/// use benode::unmarshal_all;
///
/// let mut name = String::new();
/// let mut size = 0u64;
/// let filled = unmarshal_all(&b"4:spam"[..], &mut [&mut name, &mut size]).unwrap();
/// assert_eq!(filled, 1);
/// assert_eq!(name, "spam");
/// assert_eq!(size, 0);
/// ```
pub fn unmarshal_all<R: BufRead>(reader: R, targets: &mut [&mut dyn DecodeTarget]) -> Result<usize> {
    Decoder::new(reader).unmarshal_all(targets)
}

/// A decode session: a [`Parser`] plus the value mapper.
///
/// The session latches its first error like the parser does; call
/// [`Decoder::clear`] to keep reading after a failure.
///
/// # Examples
///
/// ```
/// use benode::Decoder;
///
/// let mut decoder = Decoder::new(&b"i1ei2ei3e"[..]);
/// let mut sum = 0i64;
/// while let Some(n) = decoder.next_value::<i64>().unwrap() {
///     sum += n;
/// }
/// assert_eq!(sum, 6);
/// ```
#[derive(Debug)]
pub struct Decoder<R> {
    parser: Parser<R>,
}

impl<R: BufRead> Decoder<R> {
    pub fn new(reader: R) -> Self {
        Self {
            parser: Parser::new(reader),
        }
    }

    pub fn with_limits(reader: R, limits: Limits) -> Self {
        Self {
            parser: Parser::with_limits(reader, limits),
        }
    }

    /// Reads the next node, or `None` at a clean end of input.
    pub fn next_node(&mut self) -> Result<Option<Node>> {
        let scanned = self.parser.scan_one();
        match &scanned {
            Ok(None) => tracing::debug!(offset = self.parser.offset(), "reached end of input"),
            Err(e) => tracing::debug!(offset = self.parser.offset(), error = %e, "decode session failed"),
            Ok(Some(_)) => {}
        }
        scanned
    }

    /// Reads the next node and decodes it, or returns `None` at a clean end of
    /// input.
    pub fn next_value<T: DeserializeOwned>(&mut self) -> Result<Option<T>> {
        match self.next_node()? {
            Some(node) => self.decode(&node).map(Some),
            None => Ok(None),
        }
    }

    /// Fills `targets` in order, one node each. See [`unmarshal_all`].
    pub fn unmarshal_all(&mut self, targets: &mut [&mut dyn DecodeTarget]) -> Result<usize> {
        for (filled, target) in targets.iter_mut().enumerate() {
            let Some(node) = self.next_node()? else {
                return Ok(filled);
            };
            if let Err(e) = (**target).decode_from(&node) {
                return Err(self.latch(e.at_index(filled)));
            }
        }
        Ok(targets.len())
    }

    /// Returns true once this session has failed.
    pub fn is_poisoned(&self) -> bool {
        self.parser.is_poisoned()
    }

    /// Resets the session's error latch.
    pub fn clear(&mut self) {
        self.parser.clear();
    }

    /// Number of bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.parser.offset()
    }

    pub fn into_inner(self) -> R {
        self.parser.into_inner()
    }

    fn decode<T: DeserializeOwned>(&mut self, node: &Node) -> Result<T> {
        from_node(node).map_err(|e| self.latch(e))
    }

    fn latch(&mut self, err: NodeError) -> NodeError {
        tracing::debug!(offset = self.parser.offset(), error = %err, "decode session failed");
        self.parser.scanner().fail(err)
    }
}
