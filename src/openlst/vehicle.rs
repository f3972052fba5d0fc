//! Packets exchanged between the flight radio and the spacecraft bus.
//!
//! The vehicle packet shares the client packet's 7-byte little-endian
//! header layout, but its wire length field counts the length byte itself:
//! `length = HEADER_LEN + len(data)`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Attached sync marker preceding each vehicle packet.
pub const ASM: [u8; 2] = [0x22, 0x69];

/// Vehicle packet header length in bytes
pub const HEADER_LEN: usize = 7;

/// Contents of a vehicle packet header. Multi-byte fields are
/// little-endian.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VehiclePacketHeader {
    /// Wire length field: counts the whole packet including this byte.
    pub length: u8,
    pub hardware_id: u16,
    pub sequence_number: u16,
    pub destination: u8,
    pub command_number: u8,
}

impl VehiclePacketHeader {
    /// Smallest legal wire length value (a packet with no data).
    pub const MIN_LENGTH: u8 = HEADER_LEN as u8;
    /// Largest legal wire length value, bounded by the radio's buffers.
    pub const MAX_LENGTH: u8 = 251;

    pub fn validate(&self) -> Result<()> {
        if self.length < Self::MIN_LENGTH || self.length > Self::MAX_LENGTH {
            return Err(Error::FieldOutOfRange {
                field: "length",
                value: self.length.into(),
                min: Self::MIN_LENGTH.into(),
                max: Self::MAX_LENGTH.into(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut bs = [0u8; HEADER_LEN];
        bs[0] = self.length;
        bs[1..3].copy_from_slice(&self.hardware_id.to_le_bytes());
        bs[3..5].copy_from_slice(&self.sequence_number.to_le_bytes());
        bs[5] = self.destination;
        bs[6] = self.command_number;
        bs
    }

    /// # Errors
    /// [`Error::HeaderDecode`] if `dat` is not exactly [`HEADER_LEN`] bytes.
    pub fn decode(dat: &[u8]) -> Result<Self> {
        if dat.len() != HEADER_LEN {
            return Err(Error::HeaderDecode(format!(
                "expected {} header bytes, got {}",
                HEADER_LEN,
                dat.len()
            )));
        }

        Ok(VehiclePacketHeader {
            length: dat[0],
            hardware_id: u16::from_le_bytes([dat[1], dat[2]]),
            sequence_number: u16::from_le_bytes([dat[3], dat[4]]),
            destination: dat[5],
            command_number: dat[6],
        })
    }
}

/// A vehicle packet: header followed by command data.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct VehiclePacket {
    pub header: VehiclePacketHeader,
    pub data: Vec<u8>,
}

impl VehiclePacket {
    /// Constructs a packet from header fields and data, setting the header
    /// length field from the data length.
    ///
    /// The result should still be checked with [`VehiclePacket::validate`];
    /// oversized data will produce an invalid length field.
    #[must_use]
    pub fn new(header: VehiclePacketHeader, data: Vec<u8>) -> Self {
        let mut p = VehiclePacket { header, data };
        p.header.length = (HEADER_LEN + p.data.len()) as u8;
        p
    }

    /// Validates header ranges and the length field against the carried
    /// data.
    pub fn validate(&self) -> Result<()> {
        self.header.validate()?;
        if usize::from(self.header.length) != HEADER_LEN + self.data.len() {
            return Err(Error::LengthMismatch);
        }
        Ok(())
    }

    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_LEN + self.data.len());
        buf.extend_from_slice(&self.header.encode());
        buf.extend_from_slice(&self.data);
        buf
    }

    /// # Errors
    /// [`Error::HeaderDecode`] if `dat` cannot hold a full header.
    pub fn decode(dat: &[u8]) -> Result<Self> {
        if dat.len() < HEADER_LEN {
            return Err(Error::HeaderDecode("insufficient data".into()));
        }

        Ok(VehiclePacket {
            header: VehiclePacketHeader::decode(&dat[..HEADER_LEN])?,
            data: dat[HEADER_LEN..].to_vec(),
        })
    }
}
