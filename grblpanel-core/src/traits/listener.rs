//! Display-side callbacks

use crate::query::{QueryKind, QueryResult};
use crate::state::MachineState;

/// Receives the machine state after every processed line
///
/// The link clears `state.changes` when `on_update` returns, so a listener
/// that wants to batch redraws must merge the flags itself.
pub trait PanelListener {
    /// Called once per line with the line text and the updated state
    fn on_update(&mut self, state: &MachineState, line: &[u8]);

    /// A query finished, or was refused and answers with cached data
    fn on_query_complete(&mut self, result: QueryResult<'_>);

    /// A query was cut short by a controller reset
    fn on_query_abandoned(&mut self, kind: QueryKind) {
        let _ = kind;
    }
}
