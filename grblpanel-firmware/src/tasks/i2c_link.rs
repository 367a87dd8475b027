//! I2C status link task
//!
//! Status comes from the controller's binary packet instead of `?`
//! reports. There are no queries on this link; jog lines still go out on
//! the UART.

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_time::{Duration, Ticker};

use grblpanel_core::i2c::I2cStatusLink;
use grblpanel_core::{MpgEngine, PanelConfig};
use grblpanel_hal::i2c::CONTROLLER_ADDRESS;
use grblpanel_hal::SignalLines;
use grblpanel_hal_rp2040::{BufferedSerial, GpioSignals, I2cMaster};

use super::encoder::ENCODERS;
use crate::channels::{PanelCommand, PANEL_COMMANDS};
use crate::display::DisplayListener;

/// I2C status link task
#[embassy_executor::task]
pub async fn i2c_link_task(
    i2c: I2c<'static, I2C0, Blocking>,
    mut serial: BufferedSerial,
    signals: GpioSignals<Output<'static>>,
    config: PanelConfig,
) {
    info!("I2C link task started");

    let mut link = I2cStatusLink::new(I2cMaster::new(i2c), signals, CONTROLLER_ADDRESS);
    let mut engine = MpgEngine::new(&config);
    let mut listener = DisplayListener::default();

    // Jog on the MPG cadence, read status every few ticks
    let status_every = (config.status_poll_interval_ms / config.mpg_tick_interval_ms.max(1)).max(1);
    let mut ticks = 0u32;
    let mut ticker = Ticker::every(Duration::from_millis(config.mpg_tick_interval_ms as u64));

    loop {
        ticker.next().await;

        if ticks % status_every == 0 {
            if let Err(e) = link.poll(&mut listener) {
                warn!("status poll failed: {}", e);
            }
        }
        ticks = ticks.wrapping_add(1);

        while let Ok(command) = PANEL_COMMANDS.try_receive() {
            match command {
                PanelCommand::Pulse(signal) => link.signals().pulse(signal),
                PanelCommand::MpgMode(on) => link.signals().request_mpg_mode(on),
                PanelCommand::LockAxis { axis, locked } => engine.set_locked(axis, locked),
                PanelCommand::Multiplier { axis, index } => {
                    engine.select_multiplier(axis, index);
                }
                other => debug!("{} not available over I2C", other),
            }
        }

        engine.tick(&ENCODERS, link.state(), &mut serial, false);
    }
}
