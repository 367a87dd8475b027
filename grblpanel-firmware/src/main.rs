//! grblpanel - MPG & DRO front panel firmware
//!
//! Main firmware binary for RP2040-based panels. Core 0 runs the
//! controller link; core 1 does nothing but sample the jog wheels, so a
//! blocking acknowledgement wait on core 0 never loses counts.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{Executor, Spawner};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::multicore::{spawn_core1, Stack};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use grblpanel_core::PanelConfig;
use grblpanel_hal_rp2040::{BufferedSerial, GpioSignals, SignalPins};

mod channels;
mod display;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

// Core 1 runs its own executor on its own stack
static mut CORE1_STACK: Stack<4096> = Stack::new();
static EXECUTOR1: StaticCell<Executor> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("grblpanel firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = PanelConfig::default();
    info!(
        "MPG: tick {} ms, status every {} ms, multipliers {}",
        config.mpg_tick_interval_ms, config.status_poll_interval_ms, config.step_multipliers
    );

    // Jog wheels: X on GPIO6/7, Y on GPIO8/9, Z on GPIO10/11
    let encoder_pins = [
        (Input::new(p.PIN_6, Pull::Up), Input::new(p.PIN_7, Pull::Up)),
        (Input::new(p.PIN_8, Pull::Up), Input::new(p.PIN_9, Pull::Up)),
        (Input::new(p.PIN_10, Pull::Up), Input::new(p.PIN_11, Pull::Up)),
    ];

    #[allow(static_mut_refs)]
    spawn_core1(p.CORE1, unsafe { &mut CORE1_STACK }, move || {
        let executor1 = EXECUTOR1.init(Executor::new());
        executor1.run(|spawner| spawner.spawn(tasks::encoder_task(encoder_pins)).unwrap());
    });

    // Setup UART for the controller link
    let uart_config = UartConfig::default(); // 115200 baud default

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let serial = BufferedSerial::new(uart.into_buffered(Irqs, tx_buf, rx_buf));

    info!("UART initialized for controller link");

    // Control lines, all released (high) at start
    let signals = GpioSignals::new(SignalPins {
        mpg_select: Output::new(p.PIN_2, Level::High),
        feed_hold: Output::new(p.PIN_3, Level::High),
        cycle_start: Output::new(p.PIN_4, Level::High),
        limits_override: Output::new(p.PIN_5, Level::High),
    });

    #[cfg(not(feature = "i2c-link"))]
    spawner
        .spawn(tasks::link_task(serial, signals, config))
        .unwrap();

    #[cfg(feature = "i2c-link")]
    {
        use embassy_rp::i2c::{Config as I2cConfig, I2c};

        // I2C0: SDA GPIO20, SCL GPIO21
        let i2c = I2c::new_blocking(p.I2C0, p.PIN_21, p.PIN_20, I2cConfig::default());
        info!("I2C initialized for controller status");
        spawner
            .spawn(tasks::i2c_link_task(i2c, serial, signals, config))
            .unwrap();
    }

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
