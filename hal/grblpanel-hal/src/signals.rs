//! Discrete control lines to the motion controller
//!
//! Besides the serial link, the panel drives a few dedicated signal lines:
//! MPG mode select, feed hold, cycle start and limits override.

/// Momentary control signals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Signal {
    /// Pause motion
    FeedHold,
    /// Start or resume motion
    CycleStart,
    /// Temporarily ignore hard limits
    LimitsOverride,
}

/// Signal-line driver
pub trait SignalLines {
    /// Drive the MPG mode select line
    ///
    /// Asserting it asks the controller to hand the serial stream over
    /// to the panel.
    fn request_mpg_mode(&mut self, on: bool);

    /// Current level of the MPG mode select line
    fn mpg_mode_requested(&self) -> bool;

    /// Called when the controller confirms an MPG mode change
    ///
    /// Implementations switch keypad forwarding to or from the controller.
    fn mpg_mode_changed(&mut self, active: bool);

    /// Pulse a momentary signal
    fn pulse(&mut self, signal: Signal);
}
