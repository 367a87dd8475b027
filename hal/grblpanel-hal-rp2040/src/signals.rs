//! Signal lines on GPIO outputs
//!
//! All four lines are active low, matching the controller's pulled-up
//! control inputs.

use embassy_time::{block_for, Duration};
use embedded_hal::digital::OutputPin;
use grblpanel_hal::{Signal, SignalLines};

/// Length of a feed hold / cycle start / limits override pulse
pub const PULSE_US: u64 = 200;

/// Output pins, one per control line
pub struct SignalPins<P> {
    pub mpg_select: P,
    pub feed_hold: P,
    pub cycle_start: P,
    pub limits_override: P,
}

/// [`SignalLines`] on plain output pins
pub struct GpioSignals<P> {
    pins: SignalPins<P>,
    mpg_requested: bool,
    /// Keypad input goes to the controller instead of the panel
    forwarding: bool,
}

impl<P: OutputPin> GpioSignals<P> {
    /// Take the pins and release every line
    pub fn new(mut pins: SignalPins<P>) -> Self {
        let _ = pins.mpg_select.set_high();
        let _ = pins.feed_hold.set_high();
        let _ = pins.cycle_start.set_high();
        let _ = pins.limits_override.set_high();
        Self {
            pins,
            mpg_requested: false,
            forwarding: true,
        }
    }

    /// True while the controller owns the keypad
    pub fn is_forwarding(&self) -> bool {
        self.forwarding
    }
}

impl<P: OutputPin> SignalLines for GpioSignals<P> {
    fn request_mpg_mode(&mut self, on: bool) {
        self.mpg_requested = on;
        let _ = if on {
            self.pins.mpg_select.set_low()
        } else {
            self.pins.mpg_select.set_high()
        };
    }

    fn mpg_mode_requested(&self) -> bool {
        self.mpg_requested
    }

    fn mpg_mode_changed(&mut self, active: bool) {
        self.forwarding = !active;
    }

    fn pulse(&mut self, signal: Signal) {
        let pin = match signal {
            Signal::FeedHold => &mut self.pins.feed_hold,
            Signal::CycleStart => &mut self.pins.cycle_start,
            Signal::LimitsOverride => &mut self.pins.limits_override,
        };
        let _ = pin.set_low();
        block_for(Duration::from_micros(PULSE_US));
        let _ = pin.set_high();
    }
}
