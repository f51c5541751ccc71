use std::io::{self, Read};

use crate::error::{DecodeError, Result};

/// Forward-only reader over a snapshot source.
///
/// The only lookahead is a single pushback byte filled by [`peek_byte`];
/// there is no seeking and no buffering beyond that slot, so slow sources
/// should be wrapped in a `BufReader` by the caller.
///
/// [`peek_byte`]: ByteCursor::peek_byte
#[derive(Debug)]
pub struct ByteCursor<R> {
    inner: R,
    pushback: Option<u8>,
    offset: u64,
}

impl<R: Read> ByteCursor<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pushback: None,
            offset: 0,
        }
    }

    /// Number of bytes consumed so far. A peeked byte is not counted.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Look at the next byte without consuming it. `None` means the source is exhausted.
    pub fn peek_byte(&mut self) -> Result<Option<u8>> {
        if self.pushback.is_none() {
            self.pushback = self.fill_one()?;
        }
        Ok(self.pushback)
    }

    /// Consume one byte; running out of input is [`DecodeError::Truncated`].
    pub fn read_byte(&mut self) -> Result<u8> {
        let b = match self.pushback.take() {
            Some(b) => b,
            None => self
                .fill_one()?
                .ok_or(DecodeError::Truncated { offset: self.offset })?,
        };
        self.offset += 1;
        Ok(b)
    }

    /// Fill `buf` completely or fail with [`DecodeError::Truncated`].
    pub fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut start = 0;
        if let Some(b) = buf.first_mut() {
            if let Some(p) = self.pushback.take() {
                *b = p;
                self.offset += 1;
                start = 1;
            }
        }
        let rest = &mut buf[start..];
        self.inner
            .read_exact(rest)
            .map_err(|e| DecodeError::from_io(e, self.offset))?;
        self.offset += rest.len() as u64;
        Ok(())
    }

    /// Consume exactly `n` bytes.
    ///
    /// Reads through `Read::take`, so a corrupt length does not allocate
    /// more than the source actually holds.
    pub fn read_bytes(&mut self, n: u64) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut remaining = n;
        if remaining > 0 {
            if let Some(p) = self.pushback.take() {
                out.push(p);
                self.offset += 1;
                remaining -= 1;
            }
        }
        let got = (&mut self.inner)
            .take(remaining)
            .read_to_end(&mut out)
            .map_err(|e| DecodeError::from_io(e, self.offset))?;
        self.offset += got as u64;
        if (got as u64) < remaining {
            return Err(DecodeError::Truncated {
                offset: self.offset,
            });
        }
        Ok(out)
    }

    fn fill_one(&mut self) -> Result<Option<u8>> {
        let mut b = [0u8; 1];
        loop {
            match self.inner.read(&mut b) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(b[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(DecodeError::from_io(e, self.offset)),
            }
        }
    }
}
