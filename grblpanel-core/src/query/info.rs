//! Build info overlay (`$I`)
//!
//! ```text
//! [VER:1.1f.20230101:grblHAL MPG & DRO]
//! [OPT:VNMHSL,35,1024,3,0]
//! [NEWOPT:ENUMS,RT+,SD,TC]
//! ok
//! ```

use bitflags::bitflags;
use heapless::String;

use crate::report::scanner::{split_once, text, Scanner};
use crate::state::machine::push_truncated;

pub const MAX_VERSION_LEN: usize = 32;
pub const MAX_DESCRIPTION_LEN: usize = 64;

bitflags! {
    /// Capabilities announced in `[NEWOPT:]`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ControllerOptions: u8 {
        const SD_CARD = 1 << 0;
        const TOOL_CHANGE = 1 << 1;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ControllerOptions {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "ControllerOptions({=u8:#x})", self.bits())
    }
}

/// What the controller says about itself
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerInfo {
    pub version: String<MAX_VERSION_LEN>,
    pub description: String<MAX_DESCRIPTION_LEN>,
    pub options: ControllerOptions,
}

impl ControllerInfo {
    /// Apply a `[VER:]` or `[NEWOPT:]` line; returns false for anything else
    pub fn parse_line(&mut self, line: &[u8]) -> bool {
        let Some(body) = line.strip_prefix(b"[") else {
            return false;
        };
        let body = &body[..body.len().saturating_sub(1)];

        if let Some(version) = body.strip_prefix(b"VER:") {
            let (version, description) = split_once(version, b':').unwrap_or((version, &[]));
            self.version.clear();
            push_truncated(&mut self.version, text(version));
            self.description.clear();
            push_truncated(&mut self.description, text(description));
            true
        } else if let Some(options) = body.strip_prefix(b"NEWOPT:") {
            for option in Scanner::new(options, b',') {
                match option {
                    b"SD" => self.options |= ControllerOptions::SD_CARD,
                    b"TC" => self.options |= ControllerOptions::TOOL_CHANGE,
                    _ => {}
                }
            }
            true
        } else {
            false
        }
    }

    pub fn has_sd_card(&self) -> bool {
        self.options.contains(ControllerOptions::SD_CARD)
    }
}
