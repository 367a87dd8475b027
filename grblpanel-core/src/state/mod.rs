//! Machine state as seen by the panel
//!
//! The parser is the only writer. Readers inspect [`ChangeFlags`] to learn
//! which fields moved since the last listener callback.

pub mod changes;
pub mod machine;
pub mod run_state;

pub use changes::ChangeFlags;
pub use machine::{Coolant, MachineState, Overrides, Spindle, AXIS_LETTERS, N_AXIS};
pub use run_state::{Color, RunState, Status, ALARM_HOMING_REQUIRED};
