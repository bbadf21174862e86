//! Bounded byte cursor over an in-memory capture buffer.
//!
//! Every decoder in this crate walks the buffer through [`Cursor`] instead of
//! keeping ad hoc position bookkeeping. Lookahead is done with [`Cursor::mark`]
//! and [`Cursor::reset`], so a decoder that rejects an item can put the stream
//! back exactly where the item started.

/// Result of a bounded read: the bytes that were actually available plus a
/// flag telling whether the request ran past the end of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Take<'a> {
    pub bytes: &'a [u8],
    pub truncated: bool,
}

/// Forward-only reader with explicit mark/rewind.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Current position, usable later with [`Cursor::reset`].
    pub fn mark(&self) -> usize {
        self.pos
    }

    /// Rewind (or fast-forward) to a previously marked position.
    pub fn reset(&mut self, mark: usize) {
        self.pos = mark.min(self.buf.len());
    }

    /// Next byte without consuming it.
    pub fn peek(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    pub fn read_byte(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    /// Read up to `n` bytes. Never panics: when fewer than `n` remain the
    /// available tail is returned with `truncated` set.
    pub fn read(&mut self, n: usize) -> Take<'a> {
        let end = self.pos.saturating_add(n).min(self.buf.len());
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Take { bytes, truncated: bytes.len() < n }
    }

    /// Bytes consumed since `mark`.
    pub fn since(&self, mark: usize) -> &'a [u8] {
        &self.buf[mark.min(self.pos)..self.pos]
    }
}
