//! Host-side test doubles

use core::cell::Cell;
use std::collections::VecDeque;
use std::string::String;
use std::vec::Vec;

use grblpanel_hal::uart::CANCEL_BYTE;
use grblpanel_hal::{Clock, I2cBus, SerialPort, Signal, SignalLines};
use grblpanel_protocol::{StatusPacket, STATUS_PACKET_SIZE};

use crate::query::{ControllerInfo, QueryKind, QueryResult, Settings};
use crate::state::{ChangeFlags, MachineState};
use crate::traits::{PanelListener, QuadratureSource};

/// Scripted serial port
#[derive(Debug, Default)]
pub struct MockSerial {
    pub rx: VecDeque<u8>,
    pub tx: Vec<u8>,
    pub cancels: usize,
    pub fail_writes: bool,
}

impl MockSerial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    /// Queue a controller line with grbl's CRLF terminator
    pub fn push_line(&mut self, line: &str) {
        self.push_bytes(line.as_bytes());
        self.push_bytes(b"\r\n");
    }

    pub fn take_tx(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.tx)
    }

    /// Transmitted lines, terminators removed
    pub fn sent_lines(&self) -> Vec<String> {
        self.tx
            .split(|&b| b == b'\r')
            .filter(|line| !line.is_empty())
            .map(|line| String::from_utf8_lossy(line).into_owned())
            .collect()
    }
}

impl SerialPort for MockSerial {
    type Error = ();

    fn try_read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn write(&mut self, data: &[u8]) -> Result<(), ()> {
        if self.fail_writes {
            return Err(());
        }
        self.tx.extend_from_slice(data);
        Ok(())
    }

    fn cancel_receive(&mut self) {
        self.cancels += 1;
        self.rx.clear();
        self.rx.push_back(CANCEL_BYTE);
    }
}

/// Records signal-line activity
#[derive(Debug, Default)]
pub struct MockSignals {
    pub requested: bool,
    pub requests: Vec<bool>,
    pub mpg_changes: Vec<bool>,
    pub pulses: Vec<Signal>,
}

impl SignalLines for MockSignals {
    fn request_mpg_mode(&mut self, on: bool) {
        self.requested = on;
        self.requests.push(on);
    }

    fn mpg_mode_requested(&self) -> bool {
        self.requested
    }

    fn mpg_mode_changed(&mut self, active: bool) {
        self.mpg_changes.push(active);
    }

    fn pulse(&mut self, signal: Signal) {
        self.pulses.push(signal);
    }
}

/// Clock that advances by `step` on every read
#[derive(Debug)]
pub struct MockClock {
    now: Cell<u32>,
    step: u32,
}

impl MockClock {
    pub fn new(step: u32) -> Self {
        Self {
            now: Cell::new(0),
            step,
        }
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u32 {
        let now = self.now.get();
        self.now.set(now.wrapping_add(self.step));
        now
    }
}

/// Keeps everything the link reports
#[derive(Debug, Default)]
pub struct RecordingListener {
    /// Change flags and line text per `on_update`
    pub updates: Vec<(ChangeFlags, Vec<u8>)>,
    pub completed: Vec<QueryKind>,
    pub abandoned: Vec<QueryKind>,
    pub settings: Option<Settings>,
    pub info: Option<ControllerInfo>,
    pub files: Vec<(String, u32)>,
}

impl RecordingListener {
    pub fn lines(&self) -> Vec<String> {
        self.updates
            .iter()
            .map(|(_, line)| String::from_utf8_lossy(line).into_owned())
            .collect()
    }
}

impl PanelListener for RecordingListener {
    fn on_update(&mut self, state: &MachineState, line: &[u8]) {
        self.updates.push((state.changes, line.to_vec()));
    }

    fn on_query_complete(&mut self, result: QueryResult<'_>) {
        self.completed.push(result.kind());
        match result {
            QueryResult::Settings(settings) => self.settings = Some(*settings),
            QueryResult::Info(info) => self.info = Some(info.clone()),
            QueryResult::FileList(files) => {
                self.files = files
                    .entries()
                    .iter()
                    .map(|entry| (String::from(entry.name.as_str()), entry.size))
                    .collect();
            }
        }
    }

    fn on_query_abandoned(&mut self, kind: QueryKind) {
        self.abandoned.push(kind);
    }
}

/// Encoder counts and speeds set directly by the test
#[derive(Debug, Default)]
pub struct FakeQuadrature {
    pub counts: [i32; 3],
    pub velocity: [f32; 3],
}

impl QuadratureSource for FakeQuadrature {
    fn count(&self, axis: usize) -> i32 {
        self.counts[axis]
    }

    fn velocity(&self, axis: usize) -> f32 {
        self.velocity[axis]
    }
}

/// I2C bus that answers every read with one packet
#[derive(Debug)]
pub struct MockI2c {
    pub packet: [u8; STATUS_PACKET_SIZE],
    pub fail: bool,
    pub last_address: Option<u8>,
    pub last_register: Option<u8>,
}

impl MockI2c {
    pub fn with_packet(packet: &StatusPacket) -> Self {
        Self {
            packet: packet.encode(),
            fail: false,
            last_address: None,
            last_register: None,
        }
    }
}

impl I2cBus for MockI2c {
    type Error = ();

    fn write(&mut self, address: u8, _data: &[u8]) -> Result<(), ()> {
        self.last_address = Some(address);
        if self.fail {
            Err(())
        } else {
            Ok(())
        }
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), ()> {
        self.last_address = Some(address);
        if self.fail {
            return Err(());
        }
        let len = buf.len().min(self.packet.len());
        buf[..len].copy_from_slice(&self.packet[..len]);
        Ok(())
    }

    fn write_read(&mut self, address: u8, write_data: &[u8], read_buf: &mut [u8]) -> Result<(), ()> {
        self.last_register = write_data.first().copied();
        self.read(address, read_buf)
    }
}
