//! I2C master adapter
//!
//! Wraps any blocking `embedded-hal` 1.0 I2C bus, such as
//! `embassy_rp::i2c::I2c` in blocking mode.

use embedded_hal::i2c::I2c;
use grblpanel_hal::I2cBus;

pub struct I2cMaster<T> {
    bus: T,
}

impl<T: I2c> I2cMaster<T> {
    pub fn new(bus: T) -> Self {
        Self { bus }
    }
}

impl<T: I2c> I2cBus for I2cMaster<T> {
    type Error = T::Error;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.bus.write(address, data)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.bus.read(address, buf)
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.bus.write_read(address, write_data, read_buf)
    }
}
