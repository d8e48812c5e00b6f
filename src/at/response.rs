//! Bounded response capture.
//!
//! A [`Capture`] holds at most [`MAX_CAPTURE_LEN`] bytes.  Bytes past
//! that limit are dropped and the capture is flagged as truncated; there
//! is no error and no growth.

use core::fmt;

use heapless::Vec;

/// Size of the capture buffer, including the slot kept for the
/// terminator.
pub const CAPTURE_BUF_SIZE: usize = 256;

/// Most payload bytes a single capture can hold.
pub const MAX_CAPTURE_LEN: usize = CAPTURE_BUF_SIZE - 1;

/// Byte that ends a response line.
pub const LINE_END: u8 = b'\n';

/// Bytes gathered by one `read_response` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capture {
    bytes: Vec<u8, CAPTURE_BUF_SIZE>,
    truncated: bool,
}

impl Capture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one byte.  Returns `false` once the capture is full.
    ///
    /// A capture that fills up exactly on the line end is complete, not
    /// truncated.
    pub(crate) fn push(&mut self, b: u8) -> bool {
        if self.bytes.len() >= MAX_CAPTURE_LEN {
            self.truncated = true;
            return false;
        }
        // Capacity is CAPTURE_BUF_SIZE, so this cannot fail below the limit.
        let _ = self.bytes.push(b);
        if self.bytes.len() >= MAX_CAPTURE_LEN && b != LINE_END {
            self.truncated = true;
        }
        true
    }

    pub(crate) fn is_full(&self) -> bool {
        self.bytes.len() >= MAX_CAPTURE_LEN
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Capture stopped because the buffer filled up, not because the
    /// line ended or time ran out.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Literal, case-sensitive substring search.
    pub fn contains(&self, token: &str) -> bool {
        contains_token(&self.bytes, token.as_bytes())
    }

    /// Diagnostic rendering (see [`Printable`]).
    pub fn printable(&self) -> Printable<'_> {
        Printable(&self.bytes)
    }
}

/// Literal substring search over raw bytes.  An empty needle matches.
pub fn contains_token(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// Renders printable ASCII as-is and every other byte as `[0xNN]`.
pub struct Printable<'a>(pub &'a [u8]);

impl fmt::Display for Printable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in self.0 {
            if (0x20..=0x7E).contains(&b) {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "[0x{:02x}]", b)?;
            }
        }
        Ok(())
    }
}
