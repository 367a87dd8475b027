//! I2C status link
//!
//! Binary variant of the serial link: the panel polls a fixed-layout
//! packet from the controller instead of parsing text reports. The decoded
//! packet goes through the same compare-and-flag setters as the text
//! parser. There are no queries and no acknowledgements on this link.

use grblpanel_hal::{I2cBus, SignalLines};
use grblpanel_protocol::{
    packet::{ACC_FLOOD, ACC_MIST, ACC_SPINDLE_CCW, ACC_SPINDLE_ON},
    PacketError, StatusPacket, STATUS_PACKET_SIZE,
};

use crate::state::{Coolant, MachineState, Overrides, Spindle, Status};
use crate::traits::PanelListener;

/// Register the status packet is read from
pub const STATUS_REGISTER: u8 = 0x00;

/// I2C status link errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cStatusError<E> {
    /// Bus transfer failed
    Bus(E),
    /// Packet did not decode
    Packet(PacketError),
}

/// Polls the controller's status packet
pub struct I2cStatusLink<B, G> {
    bus: B,
    signals: G,
    address: u8,
    state: MachineState,
}

impl<B: I2cBus, G: SignalLines> I2cStatusLink<B, G> {
    pub fn new(bus: B, signals: G, address: u8) -> Self {
        Self {
            bus,
            signals,
            address,
            state: MachineState::new(),
        }
    }

    pub fn state(&self) -> &MachineState {
        &self.state
    }

    pub fn signals(&mut self) -> &mut G {
        &mut self.signals
    }

    /// Read and apply one packet, then notify the listener
    ///
    /// On error the state is left untouched and the listener is not called.
    pub fn poll<L: PanelListener>(
        &mut self,
        listener: &mut L,
    ) -> Result<(), I2cStatusError<B::Error>> {
        let mut buf = [0u8; STATUS_PACKET_SIZE];
        if let Err(e) = self.bus.read_register(self.address, STATUS_REGISTER, &mut buf) {
            warn!("status packet read failed");
            return Err(I2cStatusError::Bus(e));
        }
        let packet = StatusPacket::decode(&buf).map_err(I2cStatusError::Packet)?;

        if apply_packet(&packet, &mut self.state) {
            info!("MPG mode {}", self.state.mpg_mode);
            self.signals.mpg_mode_changed(self.state.mpg_mode);
        }

        listener.on_update(&self.state, &buf);
        self.state.take_changes();
        Ok(())
    }
}

/// Apply a decoded packet; returns true if MPG mode changed
pub fn apply_packet(packet: &StatusPacket, state: &mut MachineState) -> bool {
    state.set_status(Status::from_code(packet.state, packet.substate));

    let work = packet.work_position();
    state.set_coordinate_mode(work);
    state.set_position(packet.position);
    if !work {
        state.set_received_offset(packet.offset);
    }
    state.set_awaiting_offset(false);

    state.set_feed_rate(packet.feed_rate);
    state.set_spindle_rpm(packet.spindle_rpm);
    state.set_overrides(Overrides {
        feed: packet.feed_override,
        rapid: packet.rapid_override,
        spindle: packet.spindle_override,
    });

    let bits = packet.accessories;
    state.set_accessories(
        Coolant {
            mist: bits & ACC_MIST != 0,
            flood: bits & ACC_FLOOD != 0,
        },
        Spindle {
            on: bits & ACC_SPINDLE_ON != 0,
            ccw: bits & ACC_SPINDLE_CCW != 0,
        },
    );

    state.set_alarm(packet.alarm);
    state.set_error(packet.error);
    state.set_x_diameter_mode(packet.x_diameter());
    state.set_distance_absolute(packet.absolute());
    state.set_mpg_mode(packet.mpg_mode())
}
