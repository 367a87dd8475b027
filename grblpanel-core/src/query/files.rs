//! SD card file list overlay (`$F`)
//!
//! ```text
//! [FILE:/part1.gc|SIZE:2048]
//! [FILE:/fixtures/vise.nc|SIZE:911]
//! ok
//! ```

use heapless::{String, Vec};

use crate::report::scanner::{parse_u32, split_once, text, Scanner};
use crate::state::machine::push_truncated;

pub const MAX_FILES: usize = 32;
pub const MAX_FILE_NAME_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FileEntry {
    pub name: String<MAX_FILE_NAME_LEN>,
    pub size: u32,
}

/// Files reported by the controller, in listing order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileList {
    entries: Vec<FileEntry, MAX_FILES>,
}

impl FileList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Apply a `[FILE:<name>|SIZE:<bytes>]` line; returns false for anything else
    pub fn parse_line(&mut self, line: &[u8]) -> bool {
        let Some(body) = line.strip_prefix(b"[FILE:") else {
            return false;
        };
        let body = &body[..body.len().saturating_sub(1)];

        let mut fields = Scanner::new(body, b'|');
        let Some(name) = fields.next() else {
            return true;
        };
        let size = fields
            .filter_map(|field| split_once(field, b':'))
            .find(|(key, _)| *key == b"SIZE")
            .and_then(|(_, value)| parse_u32(value))
            .unwrap_or(0);

        let mut entry = FileEntry {
            name: String::new(),
            size,
        };
        push_truncated(&mut entry.name, text(name));
        if self.entries.push(entry).is_err() {
            warn!("file list full, dropping entry");
        }
        true
    }
}
