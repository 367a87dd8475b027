//! grbl report classification
//!
//! The default line handler. A line is routed by its leading bytes:
//!
//! | Prefix    | Meaning                                  |
//! |-----------|------------------------------------------|
//! | `<`       | realtime status report                   |
//! | `[`       | parser state, message or other info      |
//! | `error:`  | error code for the last command          |
//! | `ALARM:`  | alarm code                               |
//! | `Grbl`    | reset banner                             |
//! | `ok`      | acknowledgement                          |
//!
//! Anything else is ignored. For `<` and `[` lines the first byte and the
//! last byte are dropped before decoding, whatever the last byte is.

pub mod parser_state;
pub mod scanner;
pub mod status;

use bitflags::bitflags;

use crate::state::{ChangeFlags, MachineState};
use parser_state::parse_parser_state;
use scanner::{parse_code, text};
use status::parse_status;

bitflags! {
    /// Side effects a decoded line asks the link to perform
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Actions: u8 {
        /// Send the full status report request (`0x87`)
        const REQUEST_FULL_REPORT = 1 << 0;
        /// Ask the controller to enter MPG mode
        const REQUEST_MPG_MODE = 1 << 1;
        /// The controller entered or left MPG mode
        const MPG_MODE_CHANGED = 1 << 2;
    }
}

/// What a line turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineKind {
    Status,
    ParserState,
    Message,
    /// `ok` with no acknowledgement wait in progress
    Ok,
    /// `ok` that satisfied an acknowledgement wait
    Acknowledged,
    Error(u8),
    Alarm(u8),
    /// Controller reset banner
    Reset,
    Ignored,
}

/// Result of classifying one line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classified {
    pub kind: LineKind,
    pub actions: Actions,
}

impl Classified {
    fn new(kind: LineKind) -> Self {
        Self {
            kind,
            actions: Actions::empty(),
        }
    }
}

/// Body of a bracketed line: first and last byte removed
fn strip_brackets(line: &[u8]) -> &[u8] {
    if line.len() >= 2 {
        &line[1..line.len() - 1]
    } else {
        &[]
    }
}

/// Classify one line and apply it to `state`
pub fn classify(line: &[u8], state: &mut MachineState, settings_loaded: bool) -> Classified {
    match line {
        [b'<', ..] => Classified {
            kind: LineKind::Status,
            actions: parse_status(strip_brackets(line), state, settings_loaded),
        },
        [b'[', ..] => {
            let body = strip_brackets(line);
            if let Some(words) = body.strip_prefix(b"GC:") {
                parse_parser_state(words, state);
                Classified::new(LineKind::ParserState)
            } else if let Some(message) = body.strip_prefix(b"MSG:") {
                state.set_message(text(message));
                Classified::new(LineKind::Message)
            } else {
                Classified::new(LineKind::Ignored)
            }
        }
        b"ok" => {
            if state.pending_ack {
                state.set_pending_ack(false);
                return Classified::new(LineKind::Acknowledged);
            }
            state.clear_error();
            state.clear_alarm();
            Classified::new(LineKind::Ok)
        }
        _ => {
            if let Some(code) = line.strip_prefix(b"error:") {
                let code = parse_code(code).unwrap_or(0);
                warn!("controller error {}", code);
                state.set_error(code);
                Classified::new(LineKind::Error(code))
            } else if let Some(code) = line.strip_prefix(b"ALARM:") {
                let code = parse_code(code).unwrap_or(0);
                warn!("controller alarm {}", code);
                state.set_alarm(code);
                Classified::new(LineKind::Alarm(code))
            } else if line.starts_with(b"Grbl") {
                info!("controller reset");
                state.changes |= ChangeFlags::RESET;
                state.clear_alarm();
                state.clear_error();
                state.clear_message();
                Classified::new(LineKind::Reset)
            } else {
                Classified::new(LineKind::Ignored)
            }
        }
    }
}
