//! Binary status packet for the I2C link
//!
//! When the panel is attached over I2C the controller does not stream text
//! reports. Instead the panel reads a fixed 44 byte snapshot, little-endian:
//!
//! ```text
//! ┌───────┬──────┬───────┬─────┬──────────────┬───────┬───────┬──────┬──────┬──────────┬──────────┐
//! │ STATE │ SUB  │ FLAGS │ ACC │ OVR f/r/s    │ ALARM │ ERROR │ FEED │ RPM  │ POS xyz  │ WCO xyz  │
//! │ 1B    │ 1B   │ 1B    │ 1B  │ 3 × u16      │ 1B    │ 1B    │ f32  │ f32  │ 3 × f32  │ 3 × f32  │
//! └───────┴──────┴───────┴─────┴──────────────┴───────┴───────┴──────┴──────┴──────────┴──────────┘
//! ```

/// Size of an encoded status packet
pub const STATUS_PACKET_SIZE: usize = 44;

/// Highest valid run-state code
pub const STATE_CODE_MAX: u8 = 10;

// FLAGS bits
pub const FLAG_MPG_MODE: u8 = 0x01;
pub const FLAG_WORK_POSITION: u8 = 0x02;
pub const FLAG_X_DIAMETER: u8 = 0x04;
pub const FLAG_ABSOLUTE: u8 = 0x08;

// ACC bits
pub const ACC_MIST: u8 = 0x01;
pub const ACC_FLOOD: u8 = 0x02;
pub const ACC_SPINDLE_ON: u8 = 0x04;
pub const ACC_SPINDLE_CCW: u8 = 0x08;

/// Errors from decoding a status packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketError {
    /// Fewer than [`STATUS_PACKET_SIZE`] bytes
    TooShort,
    /// Run-state code above [`STATE_CODE_MAX`]
    UnknownState,
}

/// Decoded status packet
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusPacket {
    /// Run-state code (0 unknown, 1 idle ... 10 sleep)
    pub state: u8,
    pub substate: u8,
    /// `FLAG_*` bits
    pub flags: u8,
    /// `ACC_*` bits
    pub accessories: u8,
    pub feed_override: u16,
    pub rapid_override: u16,
    pub spindle_override: u16,
    pub alarm: u8,
    pub error: u8,
    pub feed_rate: f32,
    pub spindle_rpm: f32,
    pub position: [f32; 3],
    pub offset: [f32; 3],
}

fn u16_at(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn f32_at(bytes: &[u8], at: usize) -> f32 {
    f32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn xyz_at(bytes: &[u8], at: usize) -> [f32; 3] {
    [f32_at(bytes, at), f32_at(bytes, at + 4), f32_at(bytes, at + 8)]
}

impl StatusPacket {
    /// Decode a packet; extra trailing bytes are ignored
    pub fn decode(bytes: &[u8]) -> Result<Self, PacketError> {
        if bytes.len() < STATUS_PACKET_SIZE {
            return Err(PacketError::TooShort);
        }
        if bytes[0] > STATE_CODE_MAX {
            return Err(PacketError::UnknownState);
        }

        Ok(Self {
            state: bytes[0],
            substate: bytes[1],
            flags: bytes[2],
            accessories: bytes[3],
            feed_override: u16_at(bytes, 4),
            rapid_override: u16_at(bytes, 6),
            spindle_override: u16_at(bytes, 8),
            alarm: bytes[10],
            error: bytes[11],
            feed_rate: f32_at(bytes, 12),
            spindle_rpm: f32_at(bytes, 16),
            position: xyz_at(bytes, 20),
            offset: xyz_at(bytes, 32),
        })
    }

    /// Encode into the wire layout (for testing or simulation)
    pub fn encode(&self) -> [u8; STATUS_PACKET_SIZE] {
        let mut out = [0u8; STATUS_PACKET_SIZE];
        out[0] = self.state;
        out[1] = self.substate;
        out[2] = self.flags;
        out[3] = self.accessories;
        out[4..6].copy_from_slice(&self.feed_override.to_le_bytes());
        out[6..8].copy_from_slice(&self.rapid_override.to_le_bytes());
        out[8..10].copy_from_slice(&self.spindle_override.to_le_bytes());
        out[10] = self.alarm;
        out[11] = self.error;
        out[12..16].copy_from_slice(&self.feed_rate.to_le_bytes());
        out[16..20].copy_from_slice(&self.spindle_rpm.to_le_bytes());
        for (i, v) in self.position.iter().chain(self.offset.iter()).enumerate() {
            let at = 20 + i * 4;
            out[at..at + 4].copy_from_slice(&v.to_le_bytes());
        }
        out
    }

    pub fn mpg_mode(&self) -> bool {
        self.flags & FLAG_MPG_MODE != 0
    }

    pub fn work_position(&self) -> bool {
        self.flags & FLAG_WORK_POSITION != 0
    }

    pub fn x_diameter(&self) -> bool {
        self.flags & FLAG_X_DIAMETER != 0
    }

    pub fn absolute(&self) -> bool {
        self.flags & FLAG_ABSOLUTE != 0
    }
}
