//! Commands sent from the panel to the controller
//!
//! Commands are divided into two categories:
//! - Realtime commands: single bytes grbl acts on immediately, outside the line stream
//! - Line commands: `$` queries and G-code blocks, terminated like any other line

use core::fmt::Write;

use heapless::String;

/// Longest command line the panel assembles
pub const MAX_COMMAND_LEN: usize = 64;

/// Errors from assembling a command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// The line does not fit in [`MAX_COMMAND_LEN`] bytes
    LineTooLong,
}

/// Single-byte realtime commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum RealtimeCommand {
    /// Request a status report
    StatusReport = b'?',
    /// Cycle start / resume
    CycleStart = b'~',
    /// Feed hold
    FeedHold = b'!',
    /// Soft reset
    SoftReset = 0x18,
    /// Request a complete status report, including `WCO:` and `Ov:`
    StatusReportAll = 0x87,
}

impl RealtimeCommand {
    /// Wire format byte
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

/// `$` queries with multi-line replies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QueryCommand {
    /// `$$`: dump settings
    Settings,
    /// `$I`: build info and options
    Info,
    /// `$F`: list files on the SD card
    FileList,
    /// `$G`: echo the g-code parser state
    ParserState,
}

impl QueryCommand {
    /// Command text, without terminator
    pub fn as_str(self) -> &'static str {
        match self {
            QueryCommand::Settings => "$$",
            QueryCommand::Info => "$I",
            QueryCommand::FileList => "$F",
            QueryCommand::ParserState => "$G",
        }
    }
}

/// Builder for a single `G1` motion block
///
/// ```text
/// G1X1.000Y-0.250F600
/// ```
/// Axis words carry three decimals; the feed word is an integer. The `G1`
/// word is written with the first axis, so a block without axes is empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MotionLine {
    text: String<MAX_COMMAND_LEN>,
    axes: u8,
}

impl MotionLine {
    /// Start a new, empty block
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an axis word
    pub fn axis(&mut self, letter: char, value: f32) -> Result<(), CommandError> {
        if self.axes == 0 {
            self.text.push_str("G1").map_err(|_| CommandError::LineTooLong)?;
        }
        write!(self.text, "{}{:.3}", letter, value).map_err(|_| CommandError::LineTooLong)?;
        self.axes += 1;
        Ok(())
    }

    /// Append the feed word
    pub fn feed(&mut self, feed: u32) -> Result<(), CommandError> {
        write!(self.text, "F{}", feed).map_err(|_| CommandError::LineTooLong)
    }

    /// Number of axis words written so far
    pub fn axis_count(&self) -> u8 {
        self.axes
    }

    /// The assembled block
    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_realtime_bytes() {
        assert_eq!(RealtimeCommand::StatusReport.to_byte(), b'?');
        assert_eq!(RealtimeCommand::StatusReportAll.to_byte(), 0x87);
        assert_eq!(RealtimeCommand::SoftReset.to_byte(), 0x18);
    }

    #[test]
    fn test_query_text() {
        assert_eq!(QueryCommand::Settings.as_str(), "$$");
        assert_eq!(QueryCommand::Info.as_str(), "$I");
        assert_eq!(QueryCommand::FileList.as_str(), "$F");
        assert_eq!(QueryCommand::ParserState.as_str(), "$G");
    }

    #[test]
    fn test_motion_line_single_axis() {
        let mut line = MotionLine::new();
        line.axis('X', 1.0).unwrap();
        line.feed(600).unwrap();
        assert_eq!(line.as_str(), "G1X1.000F600");
        assert_eq!(line.axis_count(), 1);
    }

    #[test]
    fn test_motion_line_multi_axis() {
        let mut line = MotionLine::new();
        line.axis('X', 12.5).unwrap();
        line.axis('Z', -0.25).unwrap();
        line.feed(150).unwrap();
        assert_eq!(line.as_str(), "G1X12.500Z-0.250F150");
    }

    #[test]
    fn test_motion_line_starts_empty() {
        let line = MotionLine::new();
        assert_eq!(line.as_str(), "");
        assert_eq!(line.axis_count(), 0);
    }

    #[test]
    fn test_motion_line_too_long() {
        let mut line = MotionLine::new();
        let mut result = Ok(());
        for _ in 0..8 {
            result = line.axis('X', -12345.678);
            if result.is_err() {
                break;
            }
        }
        assert_eq!(result, Err(CommandError::LineTooLong));
    }
}
