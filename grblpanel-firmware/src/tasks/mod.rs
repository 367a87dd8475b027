//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod encoder;
#[cfg(feature = "i2c-link")]
pub mod i2c_link;
#[cfg(not(feature = "i2c-link"))]
pub mod link;

pub use encoder::{encoder_task, EncoderPins};
#[cfg(feature = "i2c-link")]
pub use i2c_link::i2c_link_task;
#[cfg(not(feature = "i2c-link"))]
pub use link::link_task;
