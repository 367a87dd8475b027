//! grbl wire protocol codecs
//!
//! This crate holds the byte-level pieces of the link between the panel
//! and a grbl motion controller:
//!
//! - [`line`]: accumulates the serial byte stream into report lines
//! - [`commands`]: realtime command bytes, query strings and the jog line writer
//! - [`packet`]: the fixed-layout binary status packet used over I2C
//!
//! grbl's text reports are human readable and loosely specified:
//! ```text
//! <Idle|MPos:0.000,0.000,0.000|FS:0,0|Ov:100,100,100>
//! [GC:G0 G54 G17 G21 G90 G94 M5 M9 T0 F0 S0]
//! ok
//! error:20
//! ALARM:11
//! ```
//! Interpreting them is the core crate's job; this crate only frames and
//! formats bytes.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod commands;
pub mod line;
pub mod packet;

pub use commands::{CommandError, MotionLine, QueryCommand, RealtimeCommand};
pub use line::{Line, LineFramer, LINE_BUFFER_SIZE, MAX_LINE_LEN};
pub use packet::{PacketError, StatusPacket, STATUS_PACKET_SIZE};
