//! Change flags
//!
//! One bit per displayed field. Parsers set a bit when a decoded value
//! differs from the stored one; the display redraws what is set and the
//! link clears the mask after every listener callback.

use bitflags::bitflags;

bitflags! {
    /// Fields changed since the mask was last cleared
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ChangeFlags: u32 {
        /// Run state, substate, text or color
        const STATE = 1 << 0;
        const X_POS = 1 << 1;
        const Y_POS = 1 << 2;
        const Z_POS = 1 << 3;
        /// Work offset, or the coordinate system it applies to
        const OFFSET = 1 << 4;
        const FEED = 1 << 5;
        /// Programmed spindle speed
        const RPM = 1 << 6;
        /// Measured spindle speed
        const RPM_ACTUAL = 1 << 7;
        const FEED_OVERRIDE = 1 << 8;
        const RAPID_OVERRIDE = 1 << 9;
        const SPINDLE_OVERRIDE = 1 << 10;
        /// Mist or flood
        const COOLANT = 1 << 11;
        /// Spindle on or direction
        const SPINDLE = 1 << 12;
        /// Asserted input pins
        const PINS = 1 << 13;
        const MPG_MODE = 1 << 14;
        /// Lathe X axis diameter / radius mode
        const X_DIAMETER = 1 << 15;
        /// G90 / G91
        const DISTANCE_MODE = 1 << 16;
        /// G20 / G21
        const UNITS = 1 << 17;
        const TOOL = 1 << 18;
        const ALARM = 1 << 19;
        const ERROR = 1 << 20;
        const MESSAGE = 1 << 21;
        /// Controller reset banner received
        const RESET = 1 << 22;
        /// Waiting for a `WCO:` field after switching to machine coordinates
        const AWAIT_OFFSET = 1 << 23;
        /// An acknowledgement wait started or finished
        const PENDING_ACK = 1 << 24;

        const POSITION = Self::X_POS.bits() | Self::Y_POS.bits() | Self::Z_POS.bits();
        const OVERRIDES = Self::FEED_OVERRIDE.bits()
            | Self::RAPID_OVERRIDE.bits()
            | Self::SPINDLE_OVERRIDE.bits();
    }
}

impl ChangeFlags {
    /// Position flag for an axis index (0 = X)
    pub fn position(axis: usize) -> Self {
        match axis {
            0 => Self::X_POS,
            1 => Self::Y_POS,
            2 => Self::Z_POS,
            _ => Self::empty(),
        }
    }
}

impl Default for ChangeFlags {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ChangeFlags {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "ChangeFlags({=u32:#x})", self.bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_flag_by_axis() {
        assert_eq!(ChangeFlags::position(0), ChangeFlags::X_POS);
        assert_eq!(ChangeFlags::position(2), ChangeFlags::Z_POS);
        assert!(ChangeFlags::position(7).is_empty());
    }

    #[test]
    fn test_composites() {
        assert!(ChangeFlags::POSITION.contains(ChangeFlags::Y_POS));
        assert!(ChangeFlags::OVERRIDES.contains(ChangeFlags::RAPID_OVERRIDE));
        assert!(!ChangeFlags::POSITION.intersects(ChangeFlags::OFFSET));
    }

    #[test]
    fn test_all_covers_every_field() {
        assert_eq!(ChangeFlags::all().bits().count_ones(), 25);
    }
}
