//! CSP version 1 packets with the 32-bit big-endian header.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// field lengths (# bits)
const FLEN_PRIO: u32 = 2;
const FLEN_ADDR: u32 = 5;
const FLEN_PORT: u32 = 6;

/// Contents of a CSPv1 packet header.
///
/// The trailing 8 flag bits are reserved and always encoded as zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PacketHeader {
    /// 2 bits, conventionally 0 (critical) through 3 (low).
    pub priority: u8,
    /// 5 bits: 0-31
    pub source: u8,
    /// 5 bits: 0-31
    pub destination: u8,
    /// 6 bits: 0-63
    pub destination_port: u8,
    /// 6 bits: 0-63
    pub source_port: u8,
}

impl PacketHeader {
    /// Header length in bytes
    pub const LEN: usize = 4;

    /// Check all fields against their declared bit widths.
    pub fn validate(&self) -> Result<()> {
        if self.priority > 3 {
            return Err(Error::FieldOutOfRange {
                field: "priority",
                value: self.priority.into(),
                min: 0,
                max: 3,
            });
        }
        if self.source > 31 {
            return Err(Error::FieldOutOfRange {
                field: "source",
                value: self.source.into(),
                min: 0,
                max: 31,
            });
        }
        if self.destination > 31 {
            return Err(Error::FieldOutOfRange {
                field: "destination",
                value: self.destination.into(),
                min: 0,
                max: 31,
            });
        }
        if self.destination_port > 63 {
            return Err(Error::FieldOutOfRange {
                field: "destination_port",
                value: self.destination_port.into(),
                min: 0,
                max: 63,
            });
        }
        if self.source_port > 63 {
            return Err(Error::FieldOutOfRange {
                field: "source_port",
                value: self.source_port.into(),
                min: 0,
                max: 63,
            });
        }
        Ok(())
    }

    /// Pack the header fields MSB-first into the 32-bit wire form.
    ///
    /// Fields are masked to their bit widths; call [`PacketHeader::validate`]
    /// first to reject out-of-range values instead of truncating them.
    #[must_use]
    pub fn encode(&self) -> [u8; Self::LEN] {
        let mut hdr: u32 = 0;
        let mut cursor = 0;

        cursor += FLEN_PRIO;
        hdr |= u32::from(self.priority & 0x03) << (32 - cursor);

        cursor += FLEN_ADDR;
        hdr |= u32::from(self.source & 0x1f) << (32 - cursor);

        cursor += FLEN_ADDR;
        hdr |= u32::from(self.destination & 0x1f) << (32 - cursor);

        cursor += FLEN_PORT;
        hdr |= u32::from(self.destination_port & 0x3f) << (32 - cursor);

        cursor += FLEN_PORT;
        hdr |= u32::from(self.source_port & 0x3f) << (32 - cursor);

        // remaining 8 flag bits stay zero

        hdr.to_be_bytes()
    }

    /// Decode the 32-bit wire form.
    ///
    /// # Errors
    /// [`Error::HeaderDecode`] if `dat` is not exactly [`PacketHeader::LEN`]
    /// bytes.
    pub fn decode(dat: &[u8]) -> Result<Self> {
        if dat.len() != Self::LEN {
            return Err(Error::HeaderDecode(format!(
                "expected {} header bytes, got {}",
                Self::LEN,
                dat.len()
            )));
        }

        let hdr = u32::from_be_bytes([dat[0], dat[1], dat[2], dat[3]]);
        let mut offset = 0;

        let priority = ((hdr << offset) >> (32 - FLEN_PRIO)) as u8;
        offset += FLEN_PRIO;

        let source = ((hdr << offset) >> (32 - FLEN_ADDR)) as u8;
        offset += FLEN_ADDR;

        let destination = ((hdr << offset) >> (32 - FLEN_ADDR)) as u8;
        offset += FLEN_ADDR;

        let destination_port = ((hdr << offset) >> (32 - FLEN_PORT)) as u8;
        offset += FLEN_PORT;

        let source_port = ((hdr << offset) >> (32 - FLEN_PORT)) as u8;

        // flag bits are reserved and ignored

        Ok(PacketHeader {
            priority,
            source,
            destination,
            destination_port,
            source_port,
        })
    }
}

/// A CSPv1 packet: header followed by payload data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub header: PacketHeader,
    pub data: Vec<u8>,
}

impl Packet {
    /// Encode header and data into wire bytes.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(PacketHeader::LEN + self.data.len());
        buf.extend_from_slice(&self.header.encode());
        buf.extend_from_slice(&self.data);
        buf
    }

    /// Decode wire bytes into a packet.
    ///
    /// # Errors
    /// [`Error::HeaderDecode`] if `dat` cannot hold a full header.
    pub fn decode(dat: &[u8]) -> Result<Self> {
        if dat.len() < PacketHeader::LEN {
            return Err(Error::HeaderDecode("insufficient data".into()));
        }

        Ok(Packet {
            header: PacketHeader::decode(&dat[..PacketHeader::LEN])?,
            data: dat[PacketHeader::LEN..].to_vec(),
        })
    }
}
