//! Display-side listener
//!
//! Rendering lives elsewhere; this forwards change bits to it and logs
//! what the operator would see. Follow-up queries are queued back to the
//! link task rather than issued from inside a callback.

use defmt::*;

use grblpanel_core::query::QueryResult;
use grblpanel_core::state::ChangeFlags;
use grblpanel_core::{MachineState, PanelListener, QueryKind};

use crate::channels::{PanelCommand, PANEL_COMMANDS, STATE_CHANGES};

#[derive(Default)]
pub struct DisplayListener {
    settings_loaded: bool,
}

impl DisplayListener {
    fn queue_query(&self, kind: QueryKind) {
        if PANEL_COMMANDS.try_send(PanelCommand::Query(kind)).is_err() {
            warn!("command queue full, {} query dropped", kind);
        }
    }
}

impl PanelListener for DisplayListener {
    fn on_update(&mut self, state: &MachineState, _line: &[u8]) {
        let changes = state.changes;
        if changes.is_empty() {
            return;
        }

        if changes.contains(ChangeFlags::STATE) {
            info!("state {}", state.status.state);
        }
        if changes.contains(ChangeFlags::ALARM) && state.alarm != 0 {
            warn!("alarm {}", state.alarm);
        }
        if changes.contains(ChangeFlags::MESSAGE) && !state.message.is_empty() {
            info!("message: {}", state.message.as_str());
        }
        if changes.contains(ChangeFlags::MPG_MODE) && state.mpg_mode && !self.settings_loaded {
            self.queue_query(QueryKind::Settings);
        }

        // Merge with bits the display has not picked up yet
        let pending = STATE_CHANGES.try_take().unwrap_or(ChangeFlags::empty());
        STATE_CHANGES.signal(pending | changes);
    }

    fn on_query_complete(&mut self, result: QueryResult<'_>) {
        match result {
            QueryResult::Settings(settings) => {
                if settings.is_loaded && !self.settings_loaded {
                    self.settings_loaded = true;
                    info!(
                        "settings loaded: homing {}, lathe {}, rpm {}..{}",
                        settings.homing_enabled,
                        settings.lathe_mode,
                        settings.rpm_min,
                        settings.rpm_max
                    );
                    self.queue_query(QueryKind::Info);
                }
            }
            QueryResult::Info(info) => {
                info!(
                    "controller {} {}",
                    info.version.as_str(),
                    info.description.as_str()
                );
            }
            QueryResult::FileList(files) => {
                info!("{} files on SD card", files.len());
                for entry in files.entries() {
                    debug!("  {} ({} bytes)", entry.name.as_str(), entry.size);
                }
            }
        }
    }

    fn on_query_abandoned(&mut self, kind: QueryKind) {
        warn!("{} query abandoned", kind);
        if kind == QueryKind::Settings {
            self.settings_loaded = false;
        }
    }
}
