//! Serial link to the controller
//!
//! [`GrblLink`] owns the serial port and everything that interprets the
//! bytes coming out of it:
//!
//! ```text
//! serial ─▶ LineFramer ─▶ QueryMux ──(not mine)──▶ report::classify
//!                            │                          │
//!                            ▼                          ▼
//!                     on_query_complete          MachineState + Actions
//!                                                       │
//!                                                       ▼
//!                                               PanelListener::on_update
//! ```
//!
//! Everything runs on the caller's thread. [`GrblLink::poll`] never blocks;
//! [`GrblLink::await_ack`] spins on `poll` until an `ok` or its timeout.

use grblpanel_hal::{clock::elapsed_ms, Clock, SerialPort, SignalLines};
use grblpanel_protocol::{LineFramer, QueryCommand, RealtimeCommand};

use crate::mpg::{MpgEngine, MpgPhase};
use crate::query::{QueryKind, QueryMux, Overlay};
use crate::report::{classify, Actions, LineKind};
use crate::state::MachineState;
use crate::traits::{PanelListener, QuadratureSource};

/// Acknowledgement wait progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum AckState {
    Idle,
    Waiting,
    Received,
    /// Cut short by a controller reset
    Failed,
}

/// Text protocol link to a grbl controller
pub struct GrblLink<S, G> {
    serial: S,
    signals: G,
    framer: LineFramer,
    queries: QueryMux,
    state: MachineState,
    ack: AckState,
    /// Lines sent without waiting whose `ok`/`error:` is still due
    unacked: u8,
    /// Parser state (`$G`) to be requested once the link is free
    parser_state_due: bool,
}

impl<S: SerialPort, G: SignalLines> GrblLink<S, G> {
    pub fn new(serial: S, signals: G) -> Self {
        Self {
            serial,
            signals,
            framer: LineFramer::new(),
            queries: QueryMux::new(),
            state: MachineState::new(),
            ack: AckState::Idle,
            unacked: 0,
            parser_state_due: false,
        }
    }

    /// Shared machine state, valid between calls
    pub fn state(&self) -> &MachineState {
        &self.state
    }

    pub fn queries(&self) -> &QueryMux {
        &self.queries
    }

    pub fn serial(&mut self) -> &mut S {
        &mut self.serial
    }

    pub fn signals(&mut self) -> &mut G {
        &mut self.signals
    }

    /// True while a reply is due that a query or ack wait could mistake
    /// for its own
    pub fn is_busy(&self) -> bool {
        !self.queries.is_idle() || self.state.pending_ack || self.unacked > 0
    }

    /// Drain available bytes and dispatch every completed line
    ///
    /// Returns the number of lines dispatched.
    pub fn poll<L: PanelListener>(&mut self, listener: &mut L) -> usize {
        let mut lines = 0;
        while let Some(byte) = self.serial.try_read_byte() {
            if let Some(line) = self.framer.feed(byte) {
                self.dispatch(&line, listener);
                lines += 1;
            }
        }
        if self.parser_state_due && self.queries.is_idle() && !self.state.pending_ack {
            self.request_parser_state();
        }
        lines
    }

    /// Send `$G`; the `[GC:...]` echo goes through the default classifier
    fn request_parser_state(&mut self) {
        self.parser_state_due = false;
        if self.serial.write_line(QueryCommand::ParserState.as_str()).is_err() {
            warn!("parser state request not sent");
            return;
        }
        self.unacked = self.unacked.saturating_add(1);
    }

    fn dispatch<L: PanelListener>(&mut self, line: &[u8], listener: &mut L) {
        let mut completed = None;
        match self.queries.handle(line) {
            Overlay::Consumed => {}
            Overlay::Complete(kind) => completed = Some(kind),
            Overlay::Failed(kind) => {
                warn!("query {} failed", kind);
                self.classify_line(line, listener);
                listener.on_query_abandoned(kind);
            }
            Overlay::NotMine => self.classify_line(line, listener),
        }

        if let Some(kind) = completed {
            info!("query {} complete", kind);
            listener.on_query_complete(self.queries.result(kind));
            self.queries.finish(kind);
        }

        if !self.state.pending_ack {
            listener.on_update(&self.state, line);
            self.state.take_changes();
        }
    }

    fn classify_line<L: PanelListener>(&mut self, line: &[u8], listener: &mut L) {
        let settings_loaded = self.queries.settings().is_loaded;
        let classified = classify(line, &mut self.state, settings_loaded);
        self.perform(classified.actions);
        match classified.kind {
            LineKind::Acknowledged => {
                if self.ack == AckState::Waiting {
                    self.ack = AckState::Received;
                }
            }
            LineKind::Ok | LineKind::Error(_) => {
                self.unacked = self.unacked.saturating_sub(1);
            }
            LineKind::Reset => self.reset(listener),
            _ => {}
        }
    }

    /// Controller reset: back to the default handler, fail any wait
    fn reset<L: PanelListener>(&mut self, listener: &mut L) {
        if let Some(kind) = self.queries.abandon() {
            warn!("query {} abandoned by reset", kind);
            listener.on_query_abandoned(kind);
        }
        if self.ack == AckState::Waiting {
            self.ack = AckState::Failed;
            self.state.set_pending_ack(false);
        }
        // Anything sent before the reset is never answered
        self.unacked = 0;
        self.parser_state_due = true;
    }

    fn perform(&mut self, actions: Actions) {
        if actions.contains(Actions::REQUEST_FULL_REPORT) {
            self.send_realtime(RealtimeCommand::StatusReportAll);
        }
        if actions.contains(Actions::MPG_MODE_CHANGED) {
            self.signals.mpg_mode_changed(self.state.mpg_mode);
            if self.state.mpg_mode {
                self.parser_state_due = true;
            }
        }
        if actions.contains(Actions::REQUEST_MPG_MODE) && !self.signals.mpg_mode_requested() {
            info!("homing required, switching to MPG mode");
            self.signals.request_mpg_mode(true);
        }
    }

    fn send_realtime(&mut self, command: RealtimeCommand) {
        if self.serial.write(&[command.to_byte()]).is_err() {
            warn!("realtime command {} not sent", command);
        }
    }

    /// Ask for a status report (`?`)
    pub fn request_status(&mut self) {
        self.send_realtime(RealtimeCommand::StatusReport);
    }

    /// Send a single-byte realtime command
    pub fn realtime(&mut self, command: RealtimeCommand) {
        self.send_realtime(command);
    }

    /// Issue an out-of-band query
    ///
    /// Requires MPG mode and an idle link (see [`is_busy`](Self::is_busy)).
    /// Otherwise the listener's `on_query_complete` runs right away with
    /// the data already held, and false is returned. The completion for an issued query
    /// arrives from a later `poll`.
    pub fn issue_query<L: PanelListener>(&mut self, kind: QueryKind, listener: &mut L) -> bool {
        if !self.state.mpg_mode || self.is_busy() {
            debug!("query {} refused", kind);
            listener.on_query_complete(self.queries.result(kind));
            return false;
        }

        self.framer.cancel();
        self.serial.cancel_receive();
        if self.serial.write_line(kind.command().as_str()).is_err() {
            warn!("query {} not sent", kind);
            listener.on_query_complete(self.queries.result(kind));
            return false;
        }

        info!("query {} issued", kind);
        self.queries.begin(kind);
        true
    }

    /// Send `command` and poll until it is acknowledged
    ///
    /// Lines received meanwhile update the state but the listener's
    /// `on_update` is held back until the wait ends, so the first update
    /// after it carries every change made during the wait. Returns false on
    /// timeout, on a controller reset, if the command could not be sent or
    /// if the link is busy.
    pub fn await_ack<C, L>(
        &mut self,
        command: &str,
        timeout_ms: u32,
        clock: &C,
        listener: &mut L,
    ) -> bool
    where
        C: Clock,
        L: PanelListener,
    {
        if self.is_busy() {
            warn!("ack wait refused, link busy");
            return false;
        }

        self.state.set_pending_ack(true);
        if self.serial.write_line(command).is_err() {
            self.state.set_pending_ack(false);
            return false;
        }

        self.ack = AckState::Waiting;
        let start = clock.now_ms();
        while self.ack == AckState::Waiting {
            if elapsed_ms(start, clock.now_ms()) >= timeout_ms {
                warn!("ack timeout after {} ms", timeout_ms);
                self.state.set_pending_ack(false);
                break;
            }
            self.poll(listener);
        }

        let received = self.ack == AckState::Received;
        self.ack = AckState::Idle;
        received
    }

    /// Run one MPG tick against this link's state and serial port
    pub fn jog<Q: QuadratureSource>(&mut self, engine: &mut MpgEngine, source: &Q) -> MpgPhase {
        let busy = !self.queries.is_idle() || self.state.pending_ack;
        let phase = engine.tick(source, &self.state, &mut self.serial, busy);
        if phase == MpgPhase::Emitted {
            self.unacked = self.unacked.saturating_add(1);
        }
        phase
    }
}
