//! Machine state snapshot
//!
//! A single record rebuilt from the controller's reports. Only the parser
//! writes it; the display and the MPG engine read it between lines.

use heapless::String;

use super::changes::ChangeFlags;
use super::run_state::Status;

/// Number of axes shown and jogged
pub const N_AXIS: usize = 3;

/// Axis letters in report order
pub const AXIS_LETTERS: [char; N_AXIS] = ['X', 'Y', 'Z'];

/// Capacity of the asserted-pins text
pub const MAX_PINS_LEN: usize = 16;

/// Capacity of the controller message text
pub const MAX_MESSAGE_LEN: usize = 64;

/// Feed, rapid and spindle overrides in percent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Overrides {
    pub feed: u16,
    pub rapid: u16,
    pub spindle: u16,
}

impl Default for Overrides {
    fn default() -> Self {
        Self {
            feed: 100,
            rapid: 100,
            spindle: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Coolant {
    pub mist: bool,
    pub flood: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Spindle {
    pub on: bool,
    pub ccw: bool,
}

/// Everything the panel knows about the controller
#[derive(Debug, Clone)]
pub struct MachineState {
    pub status: Status,
    /// Machine or work coordinates, see `use_work_coordinates`
    pub position: [f32; N_AXIS],
    /// Work coordinate offset; zero while reporting work coordinates
    pub offset: [f32; N_AXIS],
    /// True when positions are reported as `WPos`
    pub use_work_coordinates: bool,
    /// The offset is current: a `WCO:` arrived since switching to `MPos`,
    /// or positions are reported as `WPos`
    pub offset_valid: bool,
    /// True while `offset_valid` is false and a full report was requested
    pub awaiting_offset: bool,
    pub feed_rate: f32,
    /// Programmed spindle speed
    pub spindle_rpm: f32,
    /// Measured spindle speed, when the controller reports one
    pub spindle_rpm_actual: f32,
    pub overrides: Overrides,
    pub coolant: Coolant,
    pub spindle: Spindle,
    /// Asserted input signals; `None` until a status report arrives,
    /// empty when none are asserted
    pub pins: Option<String<MAX_PINS_LEN>>,
    /// 0 means no alarm
    pub alarm: u8,
    /// 0 means no error
    pub error: u8,
    pub message: String<MAX_MESSAGE_LEN>,
    pub mpg_mode: bool,
    /// Lathe: X shown as diameter (G7)
    pub x_diameter_mode: bool,
    /// G90 when true, G91 when false
    pub distance_absolute: bool,
    /// G21 when true, G20 when false
    pub metric: bool,
    pub tool: u32,
    /// An acknowledgement wait is in progress
    pub pending_ack: bool,
    pub changes: ChangeFlags,
}

impl Default for MachineState {
    fn default() -> Self {
        Self::new()
    }
}

impl MachineState {
    /// Startup state: unknown run state, every field marked changed
    pub fn new() -> Self {
        Self {
            status: Status::default(),
            position: [0.0; N_AXIS],
            offset: [0.0; N_AXIS],
            use_work_coordinates: false,
            offset_valid: false,
            awaiting_offset: false,
            feed_rate: 0.0,
            spindle_rpm: 0.0,
            spindle_rpm_actual: 0.0,
            overrides: Overrides::default(),
            coolant: Coolant::default(),
            spindle: Spindle::default(),
            pins: None,
            alarm: 0,
            error: 0,
            message: String::new(),
            mpg_mode: false,
            x_diameter_mode: false,
            distance_absolute: true,
            metric: true,
            tool: 0,
            pending_ack: false,
            changes: ChangeFlags::all(),
        }
    }

    /// Work position of an axis regardless of the reporting mode
    pub fn work_position(&self, axis: usize) -> f32 {
        if self.use_work_coordinates {
            self.position[axis]
        } else {
            self.position[axis] - self.offset[axis]
        }
    }

    /// Take the accumulated change flags, leaving them empty
    pub fn take_changes(&mut self) -> ChangeFlags {
        core::mem::replace(&mut self.changes, ChangeFlags::empty())
    }

    pub(crate) fn set_error(&mut self, code: u8) {
        update(&mut self.error, code, &mut self.changes, ChangeFlags::ERROR);
    }

    pub(crate) fn set_alarm(&mut self, code: u8) {
        update(&mut self.alarm, code, &mut self.changes, ChangeFlags::ALARM);
    }

    /// Clear the error code; flags only if one was set
    pub(crate) fn clear_error(&mut self) {
        clear(&mut self.error, &mut self.changes, ChangeFlags::ERROR);
    }

    pub(crate) fn clear_alarm(&mut self) {
        clear(&mut self.alarm, &mut self.changes, ChangeFlags::ALARM);
    }

    pub(crate) fn set_message(&mut self, text: &str) {
        let mut message = String::new();
        push_truncated(&mut message, text);
        update(&mut self.message, message, &mut self.changes, ChangeFlags::MESSAGE);
    }

    pub(crate) fn clear_message(&mut self) {
        if !self.message.is_empty() {
            self.message.clear();
            self.changes |= ChangeFlags::MESSAGE;
        }
    }

    pub(crate) fn set_status(&mut self, status: Status) {
        update(&mut self.status, status, &mut self.changes, ChangeFlags::STATE);
    }

    pub(crate) fn set_position(&mut self, position: [f32; N_AXIS]) {
        for (axis, value) in position.into_iter().enumerate() {
            update(
                &mut self.position[axis],
                value,
                &mut self.changes,
                ChangeFlags::position(axis),
            );
        }
    }

    pub(crate) fn set_offset(&mut self, offset: [f32; N_AXIS]) {
        update(&mut self.offset, offset, &mut self.changes, ChangeFlags::OFFSET);
    }

    pub(crate) fn set_feed_rate(&mut self, feed: f32) {
        update(&mut self.feed_rate, feed, &mut self.changes, ChangeFlags::FEED);
    }

    pub(crate) fn set_spindle_rpm(&mut self, rpm: f32) {
        update(&mut self.spindle_rpm, rpm, &mut self.changes, ChangeFlags::RPM);
    }

    pub(crate) fn set_spindle_rpm_actual(&mut self, rpm: f32) {
        update(
            &mut self.spindle_rpm_actual,
            rpm,
            &mut self.changes,
            ChangeFlags::RPM_ACTUAL,
        );
    }

    pub(crate) fn set_overrides(&mut self, overrides: Overrides) {
        let changes = &mut self.changes;
        let current = &mut self.overrides;
        update(&mut current.feed, overrides.feed, changes, ChangeFlags::FEED_OVERRIDE);
        update(&mut current.rapid, overrides.rapid, changes, ChangeFlags::RAPID_OVERRIDE);
        update(
            &mut current.spindle,
            overrides.spindle,
            changes,
            ChangeFlags::SPINDLE_OVERRIDE,
        );
    }

    pub(crate) fn set_accessories(&mut self, coolant: Coolant, spindle: Spindle) {
        update(&mut self.coolant, coolant, &mut self.changes, ChangeFlags::COOLANT);
        update(&mut self.spindle, spindle, &mut self.changes, ChangeFlags::SPINDLE);
    }

    pub(crate) fn set_pins(&mut self, text: &str) {
        let mut pins = String::new();
        push_truncated(&mut pins, text);
        update(&mut self.pins, Some(pins), &mut self.changes, ChangeFlags::PINS);
    }

    /// Returns true if the mode changed
    pub(crate) fn set_mpg_mode(&mut self, on: bool) -> bool {
        update(&mut self.mpg_mode, on, &mut self.changes, ChangeFlags::MPG_MODE)
    }

    pub(crate) fn set_x_diameter_mode(&mut self, on: bool) {
        update(
            &mut self.x_diameter_mode,
            on,
            &mut self.changes,
            ChangeFlags::X_DIAMETER,
        );
    }

    pub(crate) fn set_distance_absolute(&mut self, absolute: bool) {
        update(
            &mut self.distance_absolute,
            absolute,
            &mut self.changes,
            ChangeFlags::DISTANCE_MODE,
        );
    }

    pub(crate) fn set_metric(&mut self, metric: bool) {
        update(&mut self.metric, metric, &mut self.changes, ChangeFlags::UNITS);
    }

    pub(crate) fn set_tool(&mut self, tool: u32) {
        update(&mut self.tool, tool, &mut self.changes, ChangeFlags::TOOL);
    }

    /// Switch between work and machine coordinate reporting
    ///
    /// Any switch marks the offset changed: the displayed positions mean
    /// something else now even if the offset value is the same. In work
    /// coordinates the offset is zero by definition; after a switch to
    /// machine coordinates it is zero and stale until the next `WCO:`.
    pub(crate) fn set_coordinate_mode(&mut self, work: bool) {
        if self.use_work_coordinates != work {
            self.use_work_coordinates = work;
            self.offset_valid = false;
            self.changes |= ChangeFlags::OFFSET;
            self.set_offset([0.0; N_AXIS]);
        }
        if work {
            self.offset_valid = true;
        }
    }

    /// Store a received work offset
    pub(crate) fn set_received_offset(&mut self, offset: [f32; N_AXIS]) {
        self.set_offset(offset);
        self.offset_valid = true;
    }

    /// Returns true if the flag was raised by this call
    pub(crate) fn set_awaiting_offset(&mut self, waiting: bool) -> bool {
        let raised = waiting && !self.awaiting_offset;
        update(
            &mut self.awaiting_offset,
            waiting,
            &mut self.changes,
            ChangeFlags::AWAIT_OFFSET,
        );
        raised
    }

    pub(crate) fn set_pending_ack(&mut self, pending: bool) {
        update(
            &mut self.pending_ack,
            pending,
            &mut self.changes,
            ChangeFlags::PENDING_ACK,
        );
    }
}

/// Store `value` and raise `flag` if it differs from the current value
///
/// Returns true if the field changed.
pub(crate) fn update<T: PartialEq>(
    field: &mut T,
    value: T,
    changes: &mut ChangeFlags,
    flag: ChangeFlags,
) -> bool {
    if *field != value {
        *field = value;
        *changes |= flag;
        true
    } else {
        false
    }
}

/// Reset a code to 0, raising `flag` only if it was set
///
/// Clearing an already-clear code is not a change: an `ok` after every
/// command would otherwise wake the display each time.
fn clear(field: &mut u8, changes: &mut ChangeFlags, flag: ChangeFlags) {
    if *field != 0 {
        *field = 0;
        *changes |= flag;
    }
}

/// Copy as much of `text` as fits, never splitting a character
pub(crate) fn push_truncated<const N: usize>(out: &mut String<N>, text: &str) {
    for ch in text.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::RunState;

    #[test]
    fn test_new_state_is_all_dirty() {
        let state = MachineState::new();
        assert_eq!(state.changes, ChangeFlags::all());
        assert_eq!(state.status.state, RunState::Unknown);
        assert_eq!(state.overrides, Overrides::default());
        assert!(state.pins.is_none());
    }

    #[test]
    fn test_update_only_flags_differences() {
        let mut state = MachineState::new();
        state.take_changes();

        state.set_feed_rate(0.0);
        assert!(state.changes.is_empty());

        state.set_feed_rate(150.0);
        assert_eq!(state.changes, ChangeFlags::FEED);
    }

    #[test]
    fn test_clear_flags_only_when_set() {
        let mut state = MachineState::new();
        state.take_changes();

        state.clear_error();
        state.clear_alarm();
        state.clear_message();
        assert!(state.changes.is_empty());

        state.set_error(9);
        state.set_message("Pgm End");
        state.take_changes();

        state.clear_error();
        state.clear_message();
        assert_eq!(state.changes, ChangeFlags::ERROR | ChangeFlags::MESSAGE);
        assert_eq!(state.error, 0);
        assert!(state.message.is_empty());
    }

    #[test]
    fn test_empty_pins_differs_from_unknown() {
        let mut state = MachineState::new();
        state.take_changes();
        state.set_pins("");
        assert_eq!(state.changes, ChangeFlags::PINS);
        assert_eq!(state.pins.as_deref(), Some(""));
    }

    #[test]
    fn test_coordinate_mode_switch_marks_offset() {
        let mut state = MachineState::new();
        state.take_changes();
        state.set_coordinate_mode(true);
        assert_eq!(state.changes, ChangeFlags::OFFSET);
        assert!(state.offset_valid);
        state.take_changes();
        state.set_coordinate_mode(true);
        assert!(state.changes.is_empty());
    }

    #[test]
    fn test_switch_to_machine_coordinates_invalidates_offset() {
        let mut state = MachineState::new();
        state.set_coordinate_mode(true);
        state.set_coordinate_mode(false);
        state.set_received_offset([1.0, 2.0, 3.0]);
        assert!(state.offset_valid);

        state.set_coordinate_mode(true);
        assert_eq!(state.offset, [0.0; N_AXIS]);
        state.set_coordinate_mode(false);
        assert!(!state.offset_valid);
    }

    #[test]
    fn test_work_position() {
        let mut state = MachineState::new();
        state.position = [10.0, 5.0, -2.0];
        state.offset = [4.0, 0.0, -3.0];
        assert_eq!(state.work_position(0), 6.0);
        assert_eq!(state.work_position(2), 1.0);

        state.use_work_coordinates = true;
        assert_eq!(state.work_position(0), 10.0);
    }

    #[test]
    fn test_message_truncated_to_capacity() {
        let mut state = MachineState::new();
        let long = "0123456789".repeat(10);
        state.set_message(&long);
        assert_eq!(state.message.len(), MAX_MESSAGE_LEN);
    }
}
