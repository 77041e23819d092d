//! Bounded word cursors over caller-provided buffers.
//!
//! rANS encodes symbols in reverse, so the encoder fills its buffer from the
//! end toward the front. The decoder then walks the same words forward,
//! starting at the offset the encoder reports after its final flush.

use crate::error::{Error, Result};

/// Backward-moving output cursor.
///
/// Words are written at decreasing offsets. After the last flush,
/// [`WordWriter::position`] is the first word of the coded stream.
#[derive(Debug)]
pub struct WordWriter<'a, W> {
    buf: &'a mut [W],
    pos: usize,
}

impl<'a, W: Copy> WordWriter<'a, W> {
    /// Start a cursor at the end of `buf`.
    pub fn new(buf: &'a mut [W]) -> Self {
        let pos = buf.len();
        Self { buf, pos }
    }

    /// Write one word in front of everything written so far.
    ///
    /// # Errors
    /// Returns `Error::BufferOverflow` if the front of the buffer was reached.
    #[inline]
    pub fn put(&mut self, word: W) -> Result<()> {
        if self.pos == 0 {
            return Err(Error::BufferOverflow {
                capacity: self.buf.len(),
            });
        }
        self.pos -= 1;
        self.buf[self.pos] = word;
        Ok(())
    }

    /// Offset of the first valid word.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of words written so far.
    pub fn written(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// The words written so far, in stream order.
    pub fn as_slice(&self) -> &[W] {
        &self.buf[self.pos..]
    }
}

/// Forward-moving input cursor.
#[derive(Debug, Clone)]
pub struct WordReader<'a, W> {
    buf: &'a [W],
    pos: usize,
}

impl<'a, W: Copy> WordReader<'a, W> {
    /// Start a cursor at the beginning of `buf`.
    pub fn new(buf: &'a [W]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Read the next word and advance.
    ///
    /// # Errors
    /// Returns `Error::BufferUnderrun` when the input is exhausted.
    #[inline]
    pub fn next_word(&mut self) -> Result<W> {
        match self.buf.get(self.pos) {
            Some(&word) => {
                self.pos += 1;
                Ok(word)
            }
            None => Err(Error::BufferUnderrun { needed: 1 }),
        }
    }

    /// Offset of the next unread word.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of unread words.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }
}
