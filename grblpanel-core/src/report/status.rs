//! Realtime status report fields
//!
//! ```text
//! <Idle|MPos:0.000,0.000,0.000|FS:0,0|WCO:0.000,0.000,0.000>
//! <Hold:1|WPos:1.000,2.000,3.000|FS:100,1000,980|Ov:100,100,100|A:SFM|Pn:XZ>
//! ```
//!
//! Each field decoder compares the decoded value with the stored one and
//! raises the field's change flag only on difference. `A:` and `Pn:` are
//! left out by grbl when nothing is active, so a report without them is
//! decoded as if it carried them empty.

use super::scanner::{parse_code, parse_f32, parse_list, split_once, text, Scanner};
use super::Actions;
use crate::state::{
    Coolant, MachineState, Overrides, RunState, Spindle, Status, ALARM_HOMING_REQUIRED, N_AXIS,
};

/// Keys whose absence carries meaning
#[derive(Debug, Clone, Copy, Default)]
struct Observed {
    accessories: bool,
    pins: bool,
    offset: Option<[f32; N_AXIS]>,
}

/// Decode a status report body: the line without `<` and its final byte
///
/// `settings_loaded` gates the automatic MPG switch on a homing alarm.
pub fn parse_status(body: &[u8], state: &mut MachineState, settings_loaded: bool) -> Actions {
    let mut actions = Actions::empty();
    let mut tokens = Scanner::new(body, b'|');

    let Some(first) = tokens.next() else {
        return actions;
    };
    let status = match split_once(first, b':') {
        Some((name, substate)) => Status::from_name(name, parse_code(substate).unwrap_or(0)),
        None => Status::from_name(first, 0),
    };
    state.set_status(status);

    let mut observed = Observed::default();
    for token in tokens {
        let Some((key, value)) = split_once(token, b':') else {
            continue;
        };
        match key {
            b"MPos" => parse_position(value, false, state),
            b"WPos" => parse_position(value, true, state),
            b"WCO" => {
                let mut offset = [0.0; N_AXIS];
                if parse_list(value, &mut offset) == N_AXIS {
                    observed.offset = Some(offset);
                }
            }
            b"FS" => parse_feed_speed(value, state),
            b"F" => {
                if let Some(feed) = parse_f32(value) {
                    state.set_feed_rate(feed);
                }
            }
            b"Ov" => parse_overrides(value, state),
            b"A" => {
                observed.accessories = true;
                parse_accessories(value, state);
            }
            b"Pn" => {
                observed.pins = true;
                state.set_pins(text(value));
            }
            b"MPG" => {
                let on = parse_code(value).unwrap_or(0) != 0;
                if state.set_mpg_mode(on) {
                    info!("MPG mode {}", on);
                    actions |= Actions::MPG_MODE_CHANGED;
                }
            }
            _ => {}
        }
    }

    if !observed.accessories {
        parse_accessories(b"", state);
    }
    if !observed.pins {
        state.set_pins("");
    }

    // Work positions carry the offset already; a WCO only matters for MPos
    if let Some(offset) = observed.offset {
        if !state.use_work_coordinates {
            state.set_received_offset(offset);
        }
    }

    if state.offset_valid {
        state.set_awaiting_offset(false);
    } else if state.set_awaiting_offset(true) {
        debug!("work offset unknown, requesting full report");
        actions |= Actions::REQUEST_FULL_REPORT;
    }

    if state.status.state == RunState::Alarm
        && state.status.substate == ALARM_HOMING_REQUIRED
        && !settings_loaded
        && !state.mpg_mode
    {
        actions |= Actions::REQUEST_MPG_MODE;
    }

    actions
}

fn parse_position(value: &[u8], work: bool, state: &mut MachineState) {
    let mut position = [0.0; N_AXIS];
    if parse_list(value, &mut position) == N_AXIS {
        state.set_coordinate_mode(work);
        state.set_position(position);
    }
}

/// `FS:feed,rpm[,actual rpm]`
fn parse_feed_speed(value: &[u8], state: &mut MachineState) {
    let mut values = [0.0; 3];
    let count = parse_list(value, &mut values);
    if count >= 2 {
        state.set_feed_rate(values[0]);
        state.set_spindle_rpm(values[1]);
    }
    if count == 3 {
        state.set_spindle_rpm_actual(values[2]);
    }
}

/// `Ov:feed,rapid,spindle`
fn parse_overrides(value: &[u8], state: &mut MachineState) {
    let mut values = [0.0; 3];
    if parse_list(value, &mut values) == 3 {
        state.set_overrides(Overrides {
            feed: values[0] as u16,
            rapid: values[1] as u16,
            spindle: values[2] as u16,
        });
    }
}

/// `A:` letters; every flag starts cleared and only present letters set one
fn parse_accessories(letters: &[u8], state: &mut MachineState) {
    let mut coolant = Coolant::default();
    let mut spindle = Spindle::default();
    for &letter in letters {
        match letter {
            b'M' => coolant.mist = true,
            b'F' => coolant.flood = true,
            b'S' => {
                spindle.on = true;
                spindle.ccw = false;
            }
            b'C' => {
                spindle.on = true;
                spindle.ccw = true;
            }
            _ => {}
        }
    }
    state.set_accessories(coolant, spindle);
}
