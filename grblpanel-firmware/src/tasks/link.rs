//! Controller link task
//!
//! Owns the serial port. Every pass drains received lines, runs pending
//! panel commands, and on their own cadences sends the `?` status request
//! and ticks the MPG engine.

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_time::{Duration, Ticker};

use grblpanel_core::link::GrblLink;
use grblpanel_core::{MpgEngine, PanelConfig};
use grblpanel_hal::clock::elapsed_ms;
use grblpanel_hal::{Clock, SignalLines};
use grblpanel_hal_rp2040::{BufferedSerial, EmbassyClock, GpioSignals};

use super::encoder::ENCODERS;
use crate::channels::{PanelCommand, PANEL_COMMANDS};
use crate::display::DisplayListener;

/// Poll loop period
const POLL_INTERVAL_MS: u64 = 5;

type Link = GrblLink<BufferedSerial, GpioSignals<Output<'static>>>;

/// Link task - the panel's main loop
#[embassy_executor::task]
pub async fn link_task(
    serial: BufferedSerial,
    signals: GpioSignals<Output<'static>>,
    config: PanelConfig,
) {
    info!("Link task started");

    let mut link = GrblLink::new(serial, signals);
    let mut engine = MpgEngine::new(&config);
    let mut listener = DisplayListener::default();
    let clock = EmbassyClock;

    let mut last_status = clock.now_ms();
    let mut last_mpg = last_status;
    let mut ticker = Ticker::every(Duration::from_millis(POLL_INTERVAL_MS));
    // Query or acknowledged command held until the link is free
    let mut deferred: Option<PanelCommand> = None;

    loop {
        ticker.next().await;

        link.poll(&mut listener);

        if !link.is_busy() {
            if let Some(command) = deferred.take() {
                handle_command(command, &mut link, &mut engine, &mut listener, &config);
            }
        }
        while deferred.is_none() {
            let Ok(command) = PANEL_COMMANDS.try_receive() else {
                break;
            };
            if needs_idle_link(&command) && link.is_busy() {
                deferred = Some(command);
            } else {
                handle_command(command, &mut link, &mut engine, &mut listener, &config);
            }
        }

        let now = clock.now_ms();
        if elapsed_ms(last_status, now) >= config.status_poll_interval_ms {
            link.request_status();
            last_status = now;
        }
        if elapsed_ms(last_mpg, now) >= config.mpg_tick_interval_ms {
            link.jog(&mut engine, &ENCODERS);
            last_mpg = now;
        }
    }
}

/// Commands whose reply could be confused with another line's `ok`
fn needs_idle_link(command: &PanelCommand) -> bool {
    matches!(command, PanelCommand::Query(_) | PanelCommand::Execute(_))
}

fn handle_command(
    command: PanelCommand,
    link: &mut Link,
    engine: &mut MpgEngine,
    listener: &mut DisplayListener,
    config: &PanelConfig,
) {
    match command {
        PanelCommand::Query(kind) => {
            link.issue_query(kind, listener);
        }
        PanelCommand::Realtime(command) => link.realtime(command),
        PanelCommand::Execute(line) => {
            if !link.await_ack(&line, config.ack_timeout_ms, &EmbassyClock, listener) {
                warn!("'{}' not acknowledged", line.as_str());
            }
        }
        PanelCommand::Pulse(signal) => link.signals().pulse(signal),
        PanelCommand::MpgMode(on) => link.signals().request_mpg_mode(on),
        PanelCommand::LockAxis { axis, locked } => engine.set_locked(axis, locked),
        PanelCommand::Multiplier { axis, index } => {
            if !engine.select_multiplier(axis, index) {
                warn!("no multiplier {} for axis {}", index, axis);
            }
        }
    }
}
