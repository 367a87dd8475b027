//! grblpanel Hardware Abstraction Layer
//!
//! This crate defines the collaborator traits the panel core talks to.
//! Chip-specific crates implement them; host tests implement them with
//! mocks. Nothing here knows about grbl.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  grblpanel-core (parser, MPG engine)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  grblpanel-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  grblpanel-   │       │  host mocks   │
//! │  hal-rp2040   │       │  (tests)      │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::SerialPort`] - Non-blocking byte source and line sink
//! - [`i2c::I2cBus`] - I2C master operations
//! - [`signals::SignalLines`] - Discrete control lines to the controller
//! - [`clock::Clock`] - Free-running millisecond tick

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod i2c;
pub mod signals;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use clock::Clock;
pub use i2c::I2cBus;
pub use signals::{Signal, SignalLines};
pub use uart::SerialPort;
