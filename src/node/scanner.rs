use std::io::{self, BufRead, Read};

use bytes::Bytes;

use crate::error::{NodeError, Result};

/// Buffered byte primitives shared by one parse session.
///
/// The scanner latches: once any primitive (or the parser driving it through
/// [`Scanner::fail`]) reports an error, every further primitive refuses with
/// [`NodeError::Poisoned`] until [`Scanner::clear`] is called. The parser
/// clears the latch itself only for a clean end of input at a top-level node
/// boundary.
#[derive(Debug)]
pub struct Scanner<R> {
    reader: R,
    offset: u64,
    poisoned: bool,
}

impl<R: BufRead> Scanner<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            offset: 0,
            poisoned: false,
        }
    }

    /// Number of bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns true once an error has been latched.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Resets the error latch.
    pub fn clear(&mut self) {
        self.poisoned = false;
    }

    /// Latches `err` and hands it back for propagation.
    pub fn fail(&mut self, err: NodeError) -> NodeError {
        self.poisoned = true;
        err
    }

    /// Returns the next byte without consuming it, or `None` at the end of
    /// input.
    pub fn try_peek(&mut self) -> Result<Option<u8>> {
        self.check()?;
        loop {
            let next = self.reader.fill_buf().map(|buf| buf.first().copied());
            match next {
                Ok(next) => return Ok(next),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(self.fail(e.into())),
            }
        }
    }

    /// Returns the next byte without consuming it.
    ///
    /// # Errors
    ///
    /// [`NodeError::UnexpectedEof`] if the input is exhausted.
    pub fn peek(&mut self) -> Result<u8> {
        match self.try_peek()? {
            Some(b) => Ok(b),
            None => Err(self.fail(NodeError::UnexpectedEof {
                offset: self.offset,
            })),
        }
    }

    /// Consumes and returns the next byte.
    pub fn advance(&mut self) -> Result<u8> {
        let b = self.peek()?;
        self.reader.consume(1);
        self.offset += 1;
        Ok(b)
    }

    /// Consumes exactly `n` bytes.
    ///
    /// The buffer grows with the data actually read, so a bogus length prefix
    /// cannot force a large allocation up front.
    ///
    /// # Errors
    ///
    /// [`NodeError::Truncated`] if the input ends before `n` bytes were read.
    pub fn take(&mut self, n: u64) -> Result<Bytes> {
        self.check()?;
        let start = self.offset;
        let mut buf = Vec::new();
        let read = (&mut self.reader).take(n).read_to_end(&mut buf);
        let read = match read {
            Ok(read) => read as u64,
            Err(e) => return Err(self.fail(e.into())),
        };
        self.offset += read;

        if read < n {
            return Err(self.fail(NodeError::Truncated {
                offset: start,
                expected: n,
                found: read,
            }));
        }

        Ok(Bytes::from(buf))
    }

    /// Consumes a run of ASCII digits and returns its value.
    ///
    /// Stops at the first non-digit, or at the end of input, without consuming
    /// it. An empty run yields 0; callers that need at least one digit compare
    /// [`offset`](Self::offset) before and after. The accumulation wraps on
    /// overflow rather than checking it.
    pub fn read_unsigned_decimal(&mut self) -> Result<i64> {
        let mut value: i64 = 0;
        while let Some(b @ b'0'..=b'9') = self.try_peek()? {
            value = value.wrapping_mul(10).wrapping_add(i64::from(b - b'0'));
            self.reader.consume(1);
            self.offset += 1;
        }
        Ok(value)
    }

    /// Unwraps the scanner, returning the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn check(&self) -> Result<()> {
        if self.poisoned {
            return Err(NodeError::Poisoned);
        }
        Ok(())
    }
}
