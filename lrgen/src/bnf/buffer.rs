//! A byte cursor over the grammar source.
//!
//! Internally buffers by line so errors can report where they happened.

use std::io::{BufRead, Error};

/// An iterator-like cursor over the bytes of the grammar source.
///
/// The reader built on top only ever needs one byte of lookahead, provided by
/// [`Buffer::peek`]. Line terminators are handed back explicitly as `\n` so
/// the reader can treat a newline as the end of a declaration.
pub struct Buffer<R> {
    /// Inner byte source
    inner: R,
    /// Current line being read, without its terminator
    ///
    /// This is [None] once the source is exhausted.
    line: Option<Vec<u8>>,
    /// Whether the current line ended with a terminator in the source
    terminated: bool,
    /// Current position along the line
    line_index: usize,
    /// Current line number (1-based, for error reporting)
    line_num: usize,
}

impl<R: BufRead> Buffer<R> {
    /// Constructor for Buffer, reading the first line eagerly
    pub fn new(inner: R) -> Result<Self, Error> {
        let mut buffer = Self {
            inner,
            line: None,
            terminated: false,
            line_index: 0,
            line_num: 0,
        };
        buffer.refill()?;
        Ok(buffer)
    }

    /// The 1-based number of the line the cursor is on
    pub fn line_number(&self) -> usize {
        self.line_num
    }

    /// Reads the next line into the buffer, stripping the terminator
    fn refill(&mut self) -> Result<(), Error> {
        let mut line = Vec::new();
        if self.inner.read_until(b'\n', &mut line)? == 0 {
            self.line = None;
        } else {
            self.terminated = line.last() == Some(&b'\n');
            if self.terminated {
                line.pop();
            }
            self.line = Some(line);
            self.line_index = 0;
            self.line_num += 1;
        }
        Ok(())
    }

    /// Gets the current byte without consuming it
    ///
    /// Between the end of one line and the start of the next this yields the
    /// `\n` stripped by [`Buffer::refill`]; [None] only ever means end of
    /// input.
    pub fn peek(&self) -> Option<u8> {
        let line = self.line.as_ref()?;

        if let Some(&b) = line.get(self.line_index) {
            Some(b)
        } else if self.terminated {
            Some(b'\n')
        } else {
            // a line without a terminator is the last one
            None
        }
    }

    /// Moves to the next byte in the buffer
    pub fn advance(&mut self) -> Result<(), Error> {
        let Some(line) = &self.line else {
            return Ok(());
        };

        // either move along the line or refresh the line buffer; note that
        // line_index == line.len() is the reinserted terminator position
        if self.line_index < line.len() {
            self.line_index += 1;
        } else {
            self.refill()?;
        }

        Ok(())
    }
}
