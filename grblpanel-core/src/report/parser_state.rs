//! Parser-state echo (`[GC:...]`)
//!
//! The only source of the distance mode, units, lathe diameter mode and
//! tool number. Words are matched whole, so `G91.1` is not `G91`.

use super::scanner::{parse_u32, Scanner};
use crate::state::MachineState;

/// Decode the words after `GC:`
pub fn parse_parser_state(words: &[u8], state: &mut MachineState) {
    for word in Scanner::new(words, b' ') {
        match word {
            b"G90" => state.set_distance_absolute(true),
            b"G91" => state.set_distance_absolute(false),
            b"G7" => state.set_x_diameter_mode(true),
            b"G8" => state.set_x_diameter_mode(false),
            b"G20" => state.set_metric(false),
            b"G21" => state.set_metric(true),
            [b'T', number @ ..] => {
                if let Some(tool) = parse_u32(number) {
                    state.set_tool(tool);
                }
            }
            _ => {}
        }
    }
}
