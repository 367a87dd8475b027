//! Serial port over the RP2040 buffered UART
//!
//! The interrupt handler fills the receive ring buffer; reads here only
//! take what is already there.

use embassy_rp::uart::{BufferedUart, Error};
use embedded_io::{Read, ReadReady, Write};
use grblpanel_hal::uart::{SerialPort, CANCEL_BYTE};

/// Non-blocking [`SerialPort`] on a [`BufferedUart`]
pub struct BufferedSerial {
    uart: BufferedUart,
    /// Deliver a CAN byte before anything else
    cancel_pending: bool,
}

impl BufferedSerial {
    pub fn new(uart: BufferedUart) -> Self {
        Self {
            uart,
            cancel_pending: false,
        }
    }

    fn read_available(&mut self) -> Option<u8> {
        match self.uart.read_ready() {
            Ok(true) => {}
            _ => return None,
        }
        let mut byte = [0u8; 1];
        match self.uart.read(&mut byte) {
            Ok(1) => Some(byte[0]),
            _ => None,
        }
    }
}

impl SerialPort for BufferedSerial {
    type Error = Error;

    fn try_read_byte(&mut self) -> Option<u8> {
        if self.cancel_pending {
            self.cancel_pending = false;
            return Some(CANCEL_BYTE);
        }
        self.read_available()
    }

    fn write(&mut self, data: &[u8]) -> Result<(), Error> {
        self.uart.write_all(data)
    }

    fn cancel_receive(&mut self) {
        while self.read_available().is_some() {}
        self.cancel_pending = true;
    }
}
