//! Board-agnostic core logic for the MPG/DRO panel firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Machine state snapshot and change tracking
//! - grbl report parser (status lines, parser-state echo, errors, alarms)
//! - Query multiplexer for settings, build info and SD file listings
//! - Synchronous acknowledgement wait
//! - MPG jog engine
//! - I2C binary status variant
//! - Configuration type definitions
//!
//! The serial link is driven cooperatively: [`link::GrblLink::poll`] drains
//! whatever bytes are available and returns. One report line is fully
//! parsed before the [`traits::PanelListener`] hears about it.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

#[macro_use]
mod fmt;

pub mod config;
pub mod i2c;
pub mod link;
pub mod mpg;
pub mod query;
pub mod report;
pub mod state;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use config::PanelConfig;
pub use i2c::I2cStatusLink;
pub use link::GrblLink;
pub use mpg::{MpgEngine, MpgPhase};
pub use query::{QueryKind, QueryResult};
pub use state::{ChangeFlags, MachineState, RunState};
pub use traits::{PanelListener, QuadratureSource};
