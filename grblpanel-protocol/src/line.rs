//! Line framing for the grbl serial stream
//!
//! grbl terminates every report with CR, LF or both. A CAN byte (0x18)
//! abandons whatever has been received so far; the panel injects one before
//! switching to an overlay parser so half a status line is never handed to it.
//!
//! Lines longer than the buffer are truncated, not rejected: bytes past the
//! limit are dropped and the line is still dispatched at its terminator.

use heapless::Vec;

/// Size of the line buffer, including room for the terminator
pub const LINE_BUFFER_SIZE: usize = 256;

/// Longest line handed to a line handler
pub const MAX_LINE_LEN: usize = LINE_BUFFER_SIZE - 1;

const CR: u8 = b'\r';
const LF: u8 = b'\n';
const CAN: u8 = 0x18;

/// One complete report line, terminator removed
pub type Line = Vec<u8, MAX_LINE_LEN>;

/// Accumulates bytes into lines
#[derive(Debug, Clone, Default)]
pub struct LineFramer {
    buffer: Line,
}

impl LineFramer {
    /// Create an empty framer
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Drop the partially received line
    pub fn cancel(&mut self) {
        self.buffer.clear();
    }

    /// Number of bytes buffered for the current line
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Feed a single byte
    ///
    /// Returns the completed line when `byte` terminates a non-empty line.
    /// Empty lines (the LF of a CRLF pair) produce nothing.
    pub fn feed(&mut self, byte: u8) -> Option<Line> {
        match byte {
            CAN => {
                self.cancel();
                None
            }
            CR | LF => {
                if self.buffer.is_empty() {
                    return None;
                }
                Some(core::mem::take(&mut self.buffer))
            }
            _ => {
                // Past capacity the byte is dropped
                let _ = self.buffer.push(byte);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Feed bytes until a line completes, returning it and the bytes used
    fn feed_bytes(framer: &mut LineFramer, bytes: &[u8]) -> (Option<Line>, usize) {
        for (i, &byte) in bytes.iter().enumerate() {
            if let Some(line) = framer.feed(byte) {
                return (Some(line), i + 1);
            }
        }
        (None, bytes.len())
    }

    #[test]
    fn test_simple_line() {
        let mut framer = LineFramer::new();
        let (line, used) = feed_bytes(&mut framer, b"ok\r\n");
        assert_eq!(line.unwrap().as_slice(), b"ok");
        assert_eq!(used, 3);
        // The LF left over from CRLF is an empty line
        assert_eq!(framer.feed(b'\n'), None);
    }

    #[test]
    fn test_lf_only() {
        let mut framer = LineFramer::new();
        let (line, _) = feed_bytes(&mut framer, b"error:9\n");
        assert_eq!(line.unwrap().as_slice(), b"error:9");
    }

    #[test]
    fn test_cancel_byte_discards_partial_line() {
        let mut framer = LineFramer::new();
        let (line, _) = feed_bytes(&mut framer, b"<Idle|MPo\x18ok\r");
        assert_eq!(line.unwrap().as_slice(), b"ok");
    }

    #[test]
    fn test_cancel_method() {
        let mut framer = LineFramer::new();
        feed_bytes(&mut framer, b"<Run|WPos:1");
        assert_eq!(framer.pending(), 11);
        framer.cancel();
        assert_eq!(framer.pending(), 0);
    }

    #[test]
    fn test_overflow_truncates_and_still_dispatches() {
        let mut framer = LineFramer::new();
        for _ in 0..300 {
            assert!(framer.feed(b'a').is_none());
        }
        assert_eq!(framer.pending(), MAX_LINE_LEN);
        let line = framer.feed(b'\r').unwrap();
        assert_eq!(line.len(), MAX_LINE_LEN);
        assert_eq!(framer.pending(), 0);
    }

    #[test]
    fn test_two_lines_in_one_chunk() {
        let mut framer = LineFramer::new();
        let data = b"ok\r[MSG:Caution]\r";
        let (first, used) = feed_bytes(&mut framer, data);
        assert_eq!(first.unwrap().as_slice(), b"ok");
        let (second, _) = feed_bytes(&mut framer, &data[used..]);
        assert_eq!(second.unwrap().as_slice(), b"[MSG:Caution]");
    }

    proptest! {
        #[test]
        fn prop_never_exceeds_capacity(bytes in proptest::collection::vec(any::<u8>(), 0..1024)) {
            let mut framer = LineFramer::new();
            for byte in bytes {
                if let Some(line) = framer.feed(byte) {
                    prop_assert!(!line.is_empty());
                    prop_assert!(line.len() <= MAX_LINE_LEN);
                    prop_assert!(!line.contains(&CR) && !line.contains(&LF) && !line.contains(&CAN));
                }
                prop_assert!(framer.pending() <= MAX_LINE_LEN);
            }
        }

        #[test]
        fn prop_terminator_always_flushes(body in "[ -~]{1,200}") {
            let mut framer = LineFramer::new();
            let (line, _) = feed_bytes(&mut framer, body.as_bytes());
            prop_assert!(line.is_none());
            let line = framer.feed(b'\n');
            let line = line.unwrap();
            prop_assert_eq!(line.as_slice(), body.as_bytes());
            prop_assert_eq!(framer.pending(), 0);
        }
    }
}
