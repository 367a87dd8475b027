//! Settings dump overlay (`$$`)
//!
//! ```text
//! $22=1
//! $30=24000.000
//! ok
//! ```

use crate::report::scanner::{parse_f32, parse_u32, split_once};

/// Jog speeds (mm/min) and distances (mm) for the three jog gears
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JogSettings {
    pub step_speed: f32,
    pub slow_speed: f32,
    pub fast_speed: f32,
    pub step_distance: f32,
    pub slow_distance: f32,
    pub fast_distance: f32,
}

impl Default for JogSettings {
    fn default() -> Self {
        Self {
            step_speed: 100.0,
            slow_speed: 600.0,
            fast_speed: 3000.0,
            step_distance: 0.25,
            slow_distance: 500.0,
            fast_distance: 3000.0,
        }
    }
}

/// Controller settings the panel cares about
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    /// A complete dump has been received
    pub is_loaded: bool,
    pub legacy_rt_commands: bool,
    pub homing_enabled: bool,
    pub rpm_min: f32,
    pub rpm_max: f32,
    pub lathe_mode: bool,
    pub jog: JogSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            is_loaded: false,
            legacy_rt_commands: true,
            homing_enabled: false,
            rpm_min: 0.0,
            rpm_max: 1000.0,
            lathe_mode: false,
            jog: JogSettings::default(),
        }
    }
}

const LEGACY_RT_COMMANDS: u32 = 17;
const HOMING: u32 = 22;
const RPM_MAX: u32 = 30;
const RPM_MIN: u32 = 31;
const MODE: u32 = 32;
const JOG_STEP_SPEED: u32 = 50;
const JOG_SLOW_SPEED: u32 = 51;
const JOG_FAST_SPEED: u32 = 52;
const JOG_STEP_DISTANCE: u32 = 53;
const JOG_SLOW_DISTANCE: u32 = 54;
const JOG_FAST_DISTANCE: u32 = 55;

/// `$32` value selecting lathe mode
const MODE_LATHE: u32 = 2;

impl Settings {
    /// Apply a `$<id>=<value>` line
    ///
    /// Returns false if the line is not a setting. Unknown ids are
    /// accepted and dropped.
    pub fn parse_line(&mut self, line: &[u8]) -> bool {
        let Some(assignment) = line.strip_prefix(b"$") else {
            return false;
        };
        let Some((id, value)) = split_once(assignment, b'=') else {
            return false;
        };
        let (Some(id), Some(value)) = (parse_u32(id), parse_f32(value)) else {
            return false;
        };

        let jog = &mut self.jog;
        match id {
            LEGACY_RT_COMMANDS => self.legacy_rt_commands = value != 0.0,
            HOMING => self.homing_enabled = (value as u32) & 1 != 0,
            RPM_MAX => self.rpm_max = value,
            RPM_MIN => self.rpm_min = value,
            MODE => self.lathe_mode = value as u32 == MODE_LATHE,
            JOG_STEP_SPEED => jog.step_speed = value,
            JOG_SLOW_SPEED => jog.slow_speed = value,
            JOG_FAST_SPEED => jog.fast_speed = value,
            JOG_STEP_DISTANCE => jog.step_distance = value,
            JOG_SLOW_DISTANCE => jog.slow_distance = value,
            JOG_FAST_DISTANCE => jog.fast_distance = value,
            _ => {}
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_ids() {
        let mut settings = Settings::default();
        for line in [
            &b"$17=0"[..],
            b"$22=7",
            b"$30=24000.000",
            b"$31=1000",
            b"$32=2",
            b"$50=50.0",
            b"$55=250.5",
        ] {
            assert!(settings.parse_line(line));
        }
        assert!(!settings.legacy_rt_commands);
        assert!(settings.homing_enabled);
        assert_eq!(settings.rpm_max, 24000.0);
        assert_eq!(settings.rpm_min, 1000.0);
        assert!(settings.lathe_mode);
        assert_eq!(settings.jog.step_speed, 50.0);
        assert_eq!(settings.jog.fast_distance, 250.5);
        assert!(!settings.is_loaded);
    }

    #[test]
    fn test_homing_uses_bit_zero() {
        let mut settings = Settings::default();
        settings.parse_line(b"$22=6");
        assert!(!settings.homing_enabled);
    }

    #[test]
    fn test_unknown_id_accepted_and_ignored() {
        let mut settings = Settings::default();
        assert!(settings.parse_line(b"$999=1"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_non_settings_rejected() {
        let mut settings = Settings::default();
        assert!(!settings.parse_line(b"<Idle|MPos:0,0,0>"));
        assert!(!settings.parse_line(b"$N0="));
        assert!(!settings.parse_line(b"$22"));
        assert!(!settings.parse_line(b"ok"));
    }
}
