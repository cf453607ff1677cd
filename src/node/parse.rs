use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::io::BufRead;

use super::limits::Limits;
use super::scanner::Scanner;
use super::value::Node;
use crate::constants::{DICT_START, END, INTEGER_START, LIST_START, MINUS, STRING_SEPARATOR};
use crate::error::{NodeError, Result};

/// Parses a complete buffer into a single node.
///
/// # Errors
///
/// Fails on malformed input, on an empty buffer, and with
/// [`NodeError::TrailingData`] if bytes remain after the node.
///
/// # Examples
///
/// ```
/// use benode::{decode, Node};
///
/// assert_eq!(decode(b"i-42e").unwrap(), Node::Integer(-42));
/// assert_eq!(decode(b"4:spam").unwrap(), Node::string("spam"));
/// assert!(decode(b"i42eextra").is_err());
/// ```
pub fn decode(data: &[u8]) -> Result<Node> {
    let mut parser = Parser::new(data);
    let node = parser.scan_required()?;

    let offset = parser.offset();
    if parser.scanner.try_peek()?.is_some() {
        return Err(NodeError::TrailingData { offset });
    }

    Ok(node)
}

/// Attempts to read one node from `reader`.
///
/// Returns `Ok(None)` on a clean end of input. See [`Parser::scan_one`].
pub fn scan_one<R: BufRead>(reader: R) -> Result<Option<Node>> {
    Parser::new(reader).scan_one()
}

/// Reads one node from `reader`, treating end of input as an error.
pub fn scan_required<R: BufRead>(reader: R) -> Result<Node> {
    Parser::new(reader).scan_required()
}

/// Recursive-descent parser producing [`Node`] trees from a byte stream.
///
/// A parser is one session: it owns its [`Scanner`] and the scanner's error
/// latch, and is meant to be driven from a single thread.
///
/// # Examples
///
/// ```
/// use benode::{Node, Parser};
///
/// let mut parser = Parser::new(&b"i1e4:spam"[..]);
/// assert_eq!(parser.scan_one().unwrap(), Some(Node::Integer(1)));
/// assert_eq!(parser.scan_one().unwrap(), Some(Node::string("spam")));
/// assert_eq!(parser.scan_one().unwrap(), None);
/// ```
#[derive(Debug)]
pub struct Parser<R> {
    scanner: Scanner<R>,
    limits: Limits,
}

impl<R: BufRead> Parser<R> {
    pub fn new(reader: R) -> Self {
        Self::with_limits(reader, Limits::default())
    }

    pub fn with_limits(reader: R, limits: Limits) -> Self {
        Self {
            scanner: Scanner::new(reader),
            limits,
        }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Number of bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.scanner.offset()
    }

    /// Returns true once this session has failed.
    pub fn is_poisoned(&self) -> bool {
        self.scanner.is_poisoned()
    }

    /// Resets the session's error latch.
    pub fn clear(&mut self) {
        self.scanner.clear();
    }

    pub fn scanner(&mut self) -> &mut Scanner<R> {
        &mut self.scanner
    }

    pub fn into_inner(self) -> R {
        self.scanner.into_inner()
    }

    /// Attempts to read exactly one top-level node.
    ///
    /// A clean end of input before the first byte of a node is not an error:
    /// the latch is cleared and `Ok(None)` is returned. A lookahead byte that
    /// starts no node yields [`NodeError::NotANode`] without consuming it. End
    /// of input anywhere inside the node is an error.
    pub fn scan_one(&mut self) -> Result<Option<Node>> {
        match self.scanner.peek() {
            Ok(_) => {}
            Err(e) if e.is_end_of_input() => {
                self.scanner.clear();
                return Ok(None);
            }
            Err(e) => return Err(e),
        }

        let node = self.parse_node(0)?;
        tracing::trace!(kind = %node.kind(), offset = self.offset(), "scanned node");
        Ok(Some(node))
    }

    /// Reads exactly one top-level node; end of input is an error.
    pub fn scan_required(&mut self) -> Result<Node> {
        self.parse_node(0)
    }

    fn parse_node(&mut self, depth: usize) -> Result<Node> {
        if depth > self.limits.max_depth {
            return Err(self.scanner.fail(NodeError::NestingTooDeep {
                max_depth: self.limits.max_depth,
            }));
        }

        let offset = self.offset();
        match self.scanner.peek()? {
            INTEGER_START => self.parse_integer(),
            LIST_START => self.parse_list(depth),
            DICT_START => self.parse_dict(depth),
            b'0'..=b'9' => self.parse_string(),
            found => Err(self.scanner.fail(NodeError::NotANode { offset, found })),
        }
    }

    fn parse_integer(&mut self) -> Result<Node> {
        self.expect(INTEGER_START, "'i'")?;

        let negative = self.scanner.try_peek()? == Some(MINUS);
        if negative {
            self.scanner.advance()?;
        }

        let start = self.offset();
        let magnitude = self.scanner.read_unsigned_decimal()?;
        if self.offset() == start {
            let found = self.scanner.try_peek()?;
            return Err(self.scanner.fail(NodeError::Syntax {
                offset: start,
                expected: "a digit",
                found,
            }));
        }

        self.expect(END, "'e'")?;

        let value = if negative {
            magnitude.wrapping_neg()
        } else {
            magnitude
        };
        Ok(Node::Integer(value))
    }

    fn parse_string(&mut self) -> Result<Node> {
        let length = self.scanner.read_unsigned_decimal()?;
        self.expect(STRING_SEPARATOR, "':'")?;

        let max = self.limits.max_string_length;
        let length = match u64::try_from(length) {
            Ok(length) if length <= max => length,
            _ => return Err(self.scanner.fail(NodeError::StringTooLong { length, max })),
        };

        Ok(Node::String(self.scanner.take(length)?))
    }

    fn parse_list(&mut self, depth: usize) -> Result<Node> {
        self.expect(LIST_START, "'l'")?;
        let mut list = Vec::new();

        while self.scanner.peek()? != END {
            list.push(self.parse_node(depth + 1)?);
        }

        self.scanner.advance()?;
        Ok(Node::List(list))
    }

    fn parse_dict(&mut self, depth: usize) -> Result<Node> {
        self.expect(DICT_START, "'d'")?;
        let mut dict = BTreeMap::new();

        while self.scanner.peek()? != END {
            let offset = self.offset();
            let key = match self.parse_node(depth + 1)? {
                Node::String(key) => key,
                _ => return Err(self.scanner.fail(NodeError::NonStringKey { offset })),
            };

            let value = self.parse_node(depth + 1)?;
            match dict.entry(key) {
                Entry::Vacant(entry) => {
                    entry.insert(value);
                }
                Entry::Occupied(entry) => {
                    let key = entry.key().to_vec();
                    return Err(self.scanner.fail(NodeError::DuplicateKey { key }));
                }
            }
        }

        self.scanner.advance()?;
        Ok(Node::Dictionary(dict))
    }

    fn expect(&mut self, byte: u8, expected: &'static str) -> Result<()> {
        let offset = self.offset();
        match self.scanner.try_peek()? {
            Some(b) if b == byte => {
                self.scanner.advance()?;
                Ok(())
            }
            found => Err(self.scanner.fail(NodeError::Syntax {
                offset,
                expected,
                found,
            })),
        }
    }
}
