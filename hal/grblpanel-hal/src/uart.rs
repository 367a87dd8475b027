//! Serial link abstractions
//!
//! The panel polls the controller link cooperatively: reads never block,
//! writes complete before returning.

/// CAN (cancel) byte, abandons a partially received line
pub const CANCEL_BYTE: u8 = 0x18;

/// Serial transport to the motion controller
pub trait SerialPort {
    /// Error type for transmit operations
    type Error;

    /// Read one byte if one is available
    ///
    /// Never blocks. Returns `None` when the receive buffer is empty or
    /// the peripheral reported an error.
    fn try_read_byte(&mut self) -> Option<u8>;

    /// Write raw bytes (realtime commands, partial lines)
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Write a line followed by the line terminator
    fn write_line(&mut self, line: &str) -> Result<(), Self::Error> {
        self.write(line.as_bytes())?;
        self.write(b"\r")
    }

    /// Discard any partially buffered incoming line
    ///
    /// Implementations flush their receive buffer and arrange for the next
    /// byte returned by [`try_read_byte`](Self::try_read_byte) to be
    /// [`CANCEL_BYTE`], so the line framer drops what it holds.
    fn cancel_receive(&mut self);
}
