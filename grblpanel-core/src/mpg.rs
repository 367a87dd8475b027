//! MPG jog engine
//!
//! On every tick the live encoder counts are compared with the counts
//! captured at the last emitted move. Any difference becomes one `G1`
//! block covering every moved axis:
//!
//! ```text
//! counts: X +400, Y 0, Z -40   (400 counts/unit, ×1)
//! G90:    G1X11.000Z4.900F60     (base + delta)
//! G91:    G1X1.000Z-0.100F60     (delta)
//! ```
//!
//! Baselines are recaptured whenever MPG mode changes or the controller
//! becomes idle, so entering MPG mode never produces a jump.

use grblpanel_hal::SerialPort;
use grblpanel_protocol::MotionLine;

use crate::config::{PanelConfig, MULTIPLIER_COUNT};
use crate::state::{MachineState, RunState, AXIS_LETTERS, N_AXIS};
use crate::traits::QuadratureSource;

/// Outcome of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MpgPhase {
    /// Motion not allowed, or nothing moved
    Idle,
    /// Motion pending but not sent; retried next tick
    Computing,
    /// A jog line was written
    Emitted,
}

/// Jog state for one axis
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MpgAxis {
    /// Encoder count at the last emitted move
    pub last_raw_count: i32,
    /// Position the next absolute move is relative to
    pub base_value: f32,
    /// Frozen: wheel movement is absorbed, no motion
    pub locked: bool,
    pub step_multiplier: u16,
}

impl Default for MpgAxis {
    fn default() -> Self {
        Self {
            last_raw_count: 0,
            base_value: 0.0,
            locked: false,
            step_multiplier: 1,
        }
    }
}

/// Converts encoder motion into jog lines
#[derive(Debug, Clone)]
pub struct MpgEngine {
    axes: [MpgAxis; N_AXIS],
    counts_per_unit: [f32; N_AXIS],
    enabled: [bool; N_AXIS],
    multipliers: [u16; MULTIPLIER_COUNT],
    min_feed: u32,
    max_feed: u32,
    last_mpg_mode: bool,
    last_run_state: RunState,
    phase: MpgPhase,
}

fn abs(value: f32) -> f32 {
    if value < 0.0 {
        -value
    } else {
        value
    }
}

impl MpgEngine {
    pub fn new(config: &PanelConfig) -> Self {
        let mut counts_per_unit = [1.0; N_AXIS];
        let mut enabled = [false; N_AXIS];
        for (axis, axis_config) in config.axes.iter().enumerate() {
            counts_per_unit[axis] = axis_config.counts_per_unit;
            enabled[axis] = axis_config.enabled;
        }
        let axes = [MpgAxis {
            step_multiplier: config.step_multipliers[0],
            ..MpgAxis::default()
        }; N_AXIS];

        Self {
            axes,
            counts_per_unit,
            enabled,
            multipliers: config.step_multipliers,
            min_feed: config.min_feed,
            max_feed: config.max_feed,
            last_mpg_mode: false,
            last_run_state: RunState::Unknown,
            phase: MpgPhase::Idle,
        }
    }

    pub fn axis(&self, axis: usize) -> Option<&MpgAxis> {
        self.axes.get(axis)
    }

    /// Phase reported by the last tick
    pub fn phase(&self) -> MpgPhase {
        self.phase
    }

    /// Recapture every baseline from the live counts and positions
    pub fn reset<Q: QuadratureSource>(&mut self, source: &Q, state: &MachineState) {
        for (index, axis) in self.axes.iter_mut().enumerate() {
            axis.last_raw_count = source.count(index);
            axis.base_value = state.work_position(index);
        }
    }

    pub fn set_locked(&mut self, axis: usize, locked: bool) {
        if let Some(axis) = self.axes.get_mut(axis) {
            axis.locked = locked;
        }
    }

    /// Select a gain from the configured table; false if out of range
    pub fn select_multiplier(&mut self, axis: usize, index: usize) -> bool {
        match (self.axes.get_mut(axis), self.multipliers.get(index)) {
            (Some(axis), Some(&multiplier)) => {
                axis.step_multiplier = multiplier;
                true
            }
            _ => false,
        }
    }

    /// Run one tick
    ///
    /// `busy` holds motion off while a query or acknowledgement is
    /// outstanding, since the controller's `ok` for a jog line would be
    /// taken as the reply.
    pub fn tick<Q, S>(
        &mut self,
        source: &Q,
        state: &MachineState,
        serial: &mut S,
        busy: bool,
    ) -> MpgPhase
    where
        Q: QuadratureSource,
        S: SerialPort,
    {
        let run_state = state.status.state;
        let became_idle = run_state == RunState::Idle && self.last_run_state != RunState::Idle;
        if state.mpg_mode != self.last_mpg_mode || became_idle {
            self.reset(source, state);
        }
        self.last_mpg_mode = state.mpg_mode;
        self.last_run_state = run_state;

        if busy || !state.mpg_mode || state.awaiting_offset || !run_state.allows_jog() {
            self.absorb(source);
            self.phase = MpgPhase::Idle;
            return self.phase;
        }

        self.phase = self.emit(source, state, serial);
        self.phase
    }

    /// Follow the counters without moving
    fn absorb<Q: QuadratureSource>(&mut self, source: &Q) {
        for (index, axis) in self.axes.iter_mut().enumerate() {
            axis.last_raw_count = source.count(index);
        }
    }

    fn emit<Q, S>(&mut self, source: &Q, state: &MachineState, serial: &mut S) -> MpgPhase
    where
        Q: QuadratureSource,
        S: SerialPort,
    {
        let mut line = MotionLine::new();
        let mut moves: [Option<(i32, f32)>; N_AXIS] = [None; N_AXIS];
        let mut feed = f32::MAX;

        for index in 0..N_AXIS {
            let raw = source.count(index);
            let axis = &mut self.axes[index];
            if axis.locked || !self.enabled[index] {
                axis.last_raw_count = raw;
                continue;
            }
            let counts = raw.wrapping_sub(axis.last_raw_count);
            if counts == 0 {
                continue;
            }

            let multiplier = f32::from(axis.step_multiplier);
            let counts_per_unit = self.counts_per_unit[index];
            let delta = counts as f32 * multiplier / counts_per_unit;
            let target = if state.distance_absolute {
                axis.base_value + delta
            } else {
                delta
            };
            if line.axis(AXIS_LETTERS[index], target).is_err() {
                return MpgPhase::Computing;
            }
            moves[index] = Some((raw, delta));

            let axis_feed = abs(source.velocity(index)) * 60.0 * multiplier / counts_per_unit;
            feed = feed.min(axis_feed);
        }

        if line.axis_count() == 0 {
            return MpgPhase::Idle;
        }

        let feed = feed.clamp(self.min_feed as f32, self.max_feed as f32);
        if line.feed((feed + 0.5) as u32).is_err() {
            return MpgPhase::Computing;
        }

        if serial.write_line(line.as_str()).is_err() {
            warn!("jog line not sent");
            return MpgPhase::Computing;
        }
        trace!("jog {=str}", line.as_str());

        for (axis, moved) in self.axes.iter_mut().zip(moves) {
            if let Some((raw, delta)) = moved {
                axis.last_raw_count = raw;
                axis.base_value += delta;
            }
        }
        MpgPhase::Emitted
    }
}
