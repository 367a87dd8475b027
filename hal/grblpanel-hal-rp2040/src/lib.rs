//! RP2040-specific HAL for the MPG/DRO panel firmware
//!
//! This crate provides RP2040 implementations of the `grblpanel-hal`
//! traits:
//! - Buffered UART serial port with receive cancel
//! - GPIO signal lines to the controller
//! - I2C master adapter
//! - embassy-time millisecond clock

#![no_std]

pub mod clock;
pub mod i2c;
pub mod signals;
pub mod uart;

pub use clock::EmbassyClock;
pub use i2c::I2cMaster;
pub use signals::{GpioSignals, SignalPins};
pub use uart::BufferedSerial;
