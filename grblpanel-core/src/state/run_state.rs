//! Controller run state
//!
//! The state name grbl reports is looked up in one table that yields the
//! state, its display text and its color together, so the three can never
//! disagree.

/// RGB565 display color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Color(pub u16);

impl Color {
    pub const WHITE: Color = Color(0xFFFF);
    pub const LIGHT_GREEN: Color = Color(0x87F0);
    pub const YELLOW: Color = Color(0xFFE0);
    pub const RED: Color = Color(0xF800);
    pub const LIGHT_BLUE: Color = Color(0xAEDC);
}

/// Controller run states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunState {
    /// Nothing received yet, or a name we do not know
    #[default]
    Unknown,
    Idle,
    Run,
    Jog,
    Hold,
    Alarm,
    /// G-code check mode
    Check,
    /// Safety door open
    Door,
    ToolChange,
    Home,
    Sleep,
}

/// Alarm substate: homing cycle required before motion
pub const ALARM_HOMING_REQUIRED: u8 = 11;

struct Entry {
    name: &'static str,
    state: RunState,
    color: Color,
}

#[rustfmt::skip]
const STATES: [Entry; 10] = [
    Entry { name: "Idle", state: RunState::Idle, color: Color::WHITE },
    Entry { name: "Run", state: RunState::Run, color: Color::LIGHT_GREEN },
    Entry { name: "Jog", state: RunState::Jog, color: Color::LIGHT_GREEN },
    Entry { name: "Hold", state: RunState::Hold, color: Color::YELLOW },
    Entry { name: "Alarm", state: RunState::Alarm, color: Color::RED },
    Entry { name: "Check", state: RunState::Check, color: Color::LIGHT_BLUE },
    Entry { name: "Door", state: RunState::Door, color: Color::YELLOW },
    Entry { name: "Tool", state: RunState::ToolChange, color: Color::LIGHT_BLUE },
    Entry { name: "Home", state: RunState::Home, color: Color::LIGHT_BLUE },
    Entry { name: "Sleep", state: RunState::Sleep, color: Color::LIGHT_BLUE },
];

const UNKNOWN: Entry = Entry {
    name: "Unknown",
    state: RunState::Unknown,
    color: Color::WHITE,
};

/// Run state as displayed: state, substate, text and color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    pub state: RunState,
    pub substate: u8,
    pub text: &'static str,
    pub color: Color,
}

impl Default for Status {
    fn default() -> Self {
        Self::from_entry(&UNKNOWN, 0)
    }
}

impl Status {
    fn from_entry(entry: &Entry, substate: u8) -> Self {
        Self {
            state: entry.state,
            substate,
            text: entry.name,
            color: entry.color,
        }
    }

    /// Look up the state name as reported on the wire
    pub fn from_name(name: &[u8], substate: u8) -> Self {
        let entry = STATES
            .iter()
            .find(|e| e.name.as_bytes() == name)
            .unwrap_or(&UNKNOWN);
        Self::from_entry(entry, substate)
    }

    /// Look up a binary state code (0 unknown, 1 idle ... 10 sleep)
    pub fn from_code(code: u8, substate: u8) -> Self {
        let entry = match code {
            1..=10 => &STATES[code as usize - 1],
            _ => &UNKNOWN,
        };
        Self::from_entry(entry, substate)
    }
}

impl RunState {
    /// States in which the panel may send jog motion
    pub fn allows_jog(self) -> bool {
        matches!(self, RunState::Idle | RunState::Jog | RunState::Run)
    }
}
