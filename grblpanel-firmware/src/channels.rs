//! Inter-task communication channels
//!
//! Defines the static channels used between the panel's Embassy tasks.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use heapless::String;

use grblpanel_core::{ChangeFlags, QueryKind};
use grblpanel_hal::Signal as ControlSignal;
use grblpanel_protocol::RealtimeCommand;

/// Channel capacity for panel commands
const COMMAND_CHANNEL_SIZE: usize = 8;

/// Longest command line sent with an acknowledgement wait
pub const MAX_COMMAND_LEN: usize = 64;

/// Requests from the keypad/UI side to the link task
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelCommand {
    /// Issue an out-of-band query
    Query(QueryKind),
    /// Send a single realtime byte
    Realtime(RealtimeCommand),
    /// Send a line and wait for its `ok`
    Execute(String<MAX_COMMAND_LEN>),
    /// Pulse a control line
    Pulse(ControlSignal),
    /// Drive the MPG mode select line
    MpgMode(bool),
    /// Stop or resume jogging one axis
    LockAxis { axis: usize, locked: bool },
    /// Pick a step multiplier for one axis
    Multiplier { axis: usize, index: usize },
}

/// Commands for the link task
pub static PANEL_COMMANDS: Channel<CriticalSectionRawMutex, PanelCommand, COMMAND_CHANNEL_SIZE> =
    Channel::new();

/// Change bits of the latest update, for the display
pub static STATE_CHANGES: Signal<CriticalSectionRawMutex, ChangeFlags> = Signal::new();
