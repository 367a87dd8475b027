//! Out-of-band queries
//!
//! A query sends one command and collects the reply with an overlay parser
//! while the rest of the stream keeps flowing: any line the overlay does
//! not recognize goes to the default report classifier, so status reports
//! interleaved with the reply are not lost.
//!
//! ```text
//!            issue(kind)                    ok
//! Default ──────────────▶ Awaiting<kind> ──────▶ Default (+ completion)
//!    ▲                          │
//!    └── reset banner / error ──┘ (abandoned, no completion)
//! ```
//!
//! Only one query is outstanding at a time.

pub mod files;
pub mod info;
pub mod settings;

pub use files::{FileEntry, FileList, MAX_FILES, MAX_FILE_NAME_LEN};
pub use info::{ControllerInfo, ControllerOptions};
pub use settings::{JogSettings, Settings};

use grblpanel_protocol::QueryCommand;

/// Queries the panel can issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QueryKind {
    Settings,
    Info,
    FileList,
}

impl QueryKind {
    /// Command text sent to the controller
    pub fn command(self) -> QueryCommand {
        match self {
            QueryKind::Settings => QueryCommand::Settings,
            QueryKind::Info => QueryCommand::Info,
            QueryKind::FileList => QueryCommand::FileList,
        }
    }
}

/// Data handed to the completion callback
#[derive(Debug, Clone, Copy)]
pub enum QueryResult<'a> {
    Settings(&'a Settings),
    Info(&'a ControllerInfo),
    FileList(&'a FileList),
}

impl QueryResult<'_> {
    pub fn kind(&self) -> QueryKind {
        match self {
            QueryResult::Settings(_) => QueryKind::Settings,
            QueryResult::Info(_) => QueryKind::Info,
            QueryResult::FileList(_) => QueryKind::FileList,
        }
    }
}

/// Installed line handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    #[default]
    Default,
    AwaitingSettings,
    AwaitingInfo,
    AwaitingFileList,
}

impl Mode {
    fn awaiting(kind: QueryKind) -> Self {
        match kind {
            QueryKind::Settings => Mode::AwaitingSettings,
            QueryKind::Info => Mode::AwaitingInfo,
            QueryKind::FileList => Mode::AwaitingFileList,
        }
    }

    /// Query this mode is collecting the reply for
    pub fn query(self) -> Option<QueryKind> {
        match self {
            Mode::Default => None,
            Mode::AwaitingSettings => Some(QueryKind::Settings),
            Mode::AwaitingInfo => Some(QueryKind::Info),
            Mode::AwaitingFileList => Some(QueryKind::FileList),
        }
    }
}

/// What the installed handler made of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Overlay {
    /// Part of the reply
    Consumed,
    /// The reply's terminating `ok`; the default handler is back
    Complete(QueryKind),
    /// `error:` in place of the reply; the default handler is back
    Failed(QueryKind),
    /// Not for the overlay; hand it to the default classifier
    NotMine,
}

/// Overlay state and the results collected so far
#[derive(Debug, Clone, Default)]
pub struct QueryMux {
    mode: Mode,
    settings: Settings,
    info: ControllerInfo,
    files: FileList,
}

impl QueryMux {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// True when the default handler is installed
    pub fn is_idle(&self) -> bool {
        self.mode == Mode::Default
    }

    pub fn outstanding(&self) -> Option<QueryKind> {
        self.mode.query()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn info(&self) -> &ControllerInfo {
        &self.info
    }

    pub fn files(&self) -> &FileList {
        &self.files
    }

    /// Current data for `kind`, complete or not
    pub fn result(&self, kind: QueryKind) -> QueryResult<'_> {
        match kind {
            QueryKind::Settings => QueryResult::Settings(&self.settings),
            QueryKind::Info => QueryResult::Info(&self.info),
            QueryKind::FileList => QueryResult::FileList(&self.files),
        }
    }

    /// Install the overlay for `kind`
    ///
    /// Info and file list replies are rebuilt from scratch; settings are
    /// updated in place since a dump always carries every id.
    pub fn begin(&mut self, kind: QueryKind) {
        match kind {
            QueryKind::Settings => {}
            QueryKind::Info => self.info = ControllerInfo::default(),
            QueryKind::FileList => self.files.clear(),
        }
        self.mode = Mode::awaiting(kind);
    }

    /// Offer a line to the installed overlay
    pub fn handle(&mut self, line: &[u8]) -> Overlay {
        let Some(kind) = self.mode.query() else {
            return Overlay::NotMine;
        };

        if line == b"ok" {
            if kind == QueryKind::Settings {
                self.settings.is_loaded = true;
            }
            self.mode = Mode::Default;
            return Overlay::Complete(kind);
        }
        if line.starts_with(b"error:") {
            self.mode = Mode::Default;
            self.finish(kind);
            return Overlay::Failed(kind);
        }

        let mine = match kind {
            QueryKind::Settings => self.settings.parse_line(line),
            QueryKind::Info => self.info.parse_line(line),
            QueryKind::FileList => self.files.parse_line(line),
        };
        if mine {
            Overlay::Consumed
        } else {
            Overlay::NotMine
        }
    }

    /// Release per-query accumulation once the completion callback ran
    pub fn finish(&mut self, kind: QueryKind) {
        if kind == QueryKind::FileList {
            self.files.clear();
        }
    }

    /// Restore the default handler without completing
    pub fn abandon(&mut self) -> Option<QueryKind> {
        let kind = self.mode.query()?;
        self.mode = Mode::Default;
        self.finish(kind);
        Some(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mode_takes_nothing() {
        let mut mux = QueryMux::new();
        assert_eq!(mux.handle(b"ok"), Overlay::NotMine);
        assert_eq!(mux.handle(b"$22=1"), Overlay::NotMine);
        assert!(mux.is_idle());
    }

    #[test]
    fn test_settings_round() {
        let mut mux = QueryMux::new();
        mux.begin(QueryKind::Settings);
        assert_eq!(mux.mode(), Mode::AwaitingSettings);

        assert_eq!(mux.handle(b"$30=24000"), Overlay::Consumed);
        assert_eq!(mux.handle(b"<Idle|MPos:0,0,0>"), Overlay::NotMine);
        assert_eq!(mux.handle(b"ok"), Overlay::Complete(QueryKind::Settings));

        assert!(mux.is_idle());
        assert!(mux.settings().is_loaded);
        assert_eq!(mux.settings().rpm_max, 24000.0);
    }

    #[test]
    fn test_file_list_cleared_after_finish() {
        let mut mux = QueryMux::new();
        mux.begin(QueryKind::FileList);
        mux.handle(b"[FILE:a.nc|SIZE:1]");
        assert_eq!(mux.handle(b"ok"), Overlay::Complete(QueryKind::FileList));
        assert_eq!(mux.files().len(), 1);

        mux.finish(QueryKind::FileList);
        assert!(mux.files().is_empty());
    }

    #[test]
    fn test_info_rebuilt_on_begin() {
        let mut mux = QueryMux::new();
        mux.begin(QueryKind::Info);
        mux.handle(b"[NEWOPT:SD]");
        mux.handle(b"ok");
        assert!(mux.info().has_sd_card());

        mux.begin(QueryKind::Info);
        assert!(!mux.info().has_sd_card());
    }

    #[test]
    fn test_error_ends_query() {
        let mut mux = QueryMux::new();
        mux.begin(QueryKind::FileList);
        mux.handle(b"[FILE:a.nc|SIZE:1]");
        assert_eq!(mux.handle(b"error:60"), Overlay::Failed(QueryKind::FileList));
        assert!(mux.is_idle());
        assert!(mux.files().is_empty());
        assert_eq!(mux.handle(b"error:60"), Overlay::NotMine);
    }

    #[test]
    fn test_abandon() {
        let mut mux = QueryMux::new();
        assert_eq!(mux.abandon(), None);

        mux.begin(QueryKind::FileList);
        mux.handle(b"[FILE:a.nc|SIZE:1]");
        assert_eq!(mux.abandon(), Some(QueryKind::FileList));
        assert!(mux.is_idle());
        assert!(mux.files().is_empty());
    }

    #[test]
    fn test_result_kind() {
        let mux = QueryMux::new();
        assert_eq!(mux.result(QueryKind::Info).kind(), QueryKind::Info);
        assert_eq!(QueryKind::FileList.command().as_str(), "$F");
    }
}
