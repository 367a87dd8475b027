//! Jog wheel counters
//!
//! Polls each axis's quadrature inputs and keeps a running count plus a
//! velocity estimate in atomics. The link task reads them through
//! [`QuadratureSource`] without locking.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::{Duration, Instant, Ticker};
use portable_atomic::{AtomicI32, AtomicU32, Ordering};

use grblpanel_core::state::N_AXIS;
use grblpanel_core::QuadratureSource;

/// Input sampling period
const POLL_INTERVAL_US: u64 = 250;

/// Window the velocity estimate is averaged over
const VELOCITY_WINDOW_MS: u64 = 50;

/// Count delta indexed by `previous << 2 | current`, each state `a << 1 | b`
///
/// Invalid double transitions count as zero.
const TRANSITIONS: [i8; 16] = [0, -1, 1, 0, 1, 0, 0, -1, -1, 0, 0, 1, 0, 1, -1, 0];

/// Full-resolution (x4) quadrature decoder
struct Decoder {
    last: u8,
}

impl Decoder {
    fn new(a: bool, b: bool) -> Self {
        Self {
            last: Self::state(a, b),
        }
    }

    fn state(a: bool, b: bool) -> u8 {
        ((a as u8) << 1) | b as u8
    }

    /// Feed the current pin levels, returning the count delta
    fn update(&mut self, a: bool, b: bool) -> i32 {
        let current = Self::state(a, b);
        let delta = TRANSITIONS[((self.last << 2) | current) as usize];
        self.last = current;
        delta as i32
    }
}

/// Counts and velocities shared with the link task
pub struct Encoders {
    counts: [AtomicI32; N_AXIS],
    /// f32 bits, counts per second
    velocity: [AtomicU32; N_AXIS],
}

impl Encoders {
    const fn new() -> Self {
        Self {
            counts: [AtomicI32::new(0), AtomicI32::new(0), AtomicI32::new(0)],
            velocity: [AtomicU32::new(0), AtomicU32::new(0), AtomicU32::new(0)],
        }
    }
}

impl QuadratureSource for Encoders {
    fn count(&self, axis: usize) -> i32 {
        self.counts
            .get(axis)
            .map_or(0, |count| count.load(Ordering::Relaxed))
    }

    fn velocity(&self, axis: usize) -> f32 {
        self.velocity
            .get(axis)
            .map_or(0.0, |v| f32::from_bits(v.load(Ordering::Relaxed)))
    }
}

/// Jog wheel state for all axes
pub static ENCODERS: Encoders = Encoders::new();

/// A and B inputs of one axis
pub type EncoderPins = (Input<'static>, Input<'static>);

/// Encoder task - samples every axis and publishes counts
#[embassy_executor::task]
pub async fn encoder_task(pins: [EncoderPins; N_AXIS]) {
    info!("Encoder task started");

    let mut decoders: [Decoder; N_AXIS] =
        core::array::from_fn(|i| Decoder::new(pins[i].0.is_high(), pins[i].1.is_high()));
    let mut window_start = Instant::now();
    let mut window_counts = [0i32; N_AXIS];

    let mut ticker = Ticker::every(Duration::from_micros(POLL_INTERVAL_US));

    loop {
        ticker.next().await;

        for (axis, (a, b)) in pins.iter().enumerate() {
            let delta = decoders[axis].update(a.is_high(), b.is_high());
            if delta != 0 {
                ENCODERS.counts[axis].fetch_add(delta, Ordering::Relaxed);
                window_counts[axis] += delta;
            }
        }

        let elapsed = window_start.elapsed();
        if elapsed >= Duration::from_millis(VELOCITY_WINDOW_MS) {
            let seconds = elapsed.as_micros() as f32 / 1_000_000.0;
            for (axis, counts) in window_counts.iter_mut().enumerate() {
                let velocity = *counts as f32 / seconds;
                ENCODERS.velocity[axis].store(velocity.to_bits(), Ordering::Relaxed);
                *counts = 0;
            }
            window_start = Instant::now();
        }
    }
}
