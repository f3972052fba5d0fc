//! CSP version 2 packets with the 48-bit big-endian header.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// field lengths (# bits)
const FLEN_PRIO: u32 = 2;
const FLEN_ADDR: u32 = 14;
const FLEN_PORT: u32 = 6;

/// Contents of a CSPv2 packet header.
///
/// Unlike v1, the destination address precedes the source address on the
/// wire. The trailing 6 flag bits are reserved and always encoded as zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PacketHeader {
    /// 2 bits, conventionally 0 (critical) through 3 (low).
    pub priority: u8,
    /// 14 bits: 0-16383
    pub destination: u16,
    /// 14 bits: 0-16383
    pub source: u16,
    /// 6 bits: 0-63
    pub destination_port: u8,
    /// 6 bits: 0-63
    pub source_port: u8,
}

impl PacketHeader {
    /// Header length in bytes
    pub const LEN: usize = 6;

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
        if self.destination > 16383 {
            return Err(Error::FieldOutOfRange {
                field: "destination",
                value: self.destination.into(),
                min: 0,
                max: 16383,
            });
        }
        if self.source > 16383 {
            return Err(Error::FieldOutOfRange {
                field: "source",
                value: self.source.into(),
                min: 0,
                max: 16383,
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

    /// Pack the header fields MSB-first into the 48-bit wire form.
    ///
    /// The 48 bits are staged in a `u64` and the two high bytes discarded.
    /// Fields are masked to their bit widths; call
    /// [`PacketHeader::validate`] first to reject out-of-range values.
    #[must_use]
    pub fn encode(&self) -> [u8; Self::LEN] {
        let mut hdr: u64 = 0;
        let mut cursor = 64 - 48;

        cursor += FLEN_PRIO;
        hdr |= u64::from(self.priority & 0x03) << (64 - cursor);

        cursor += FLEN_ADDR;
        hdr |= u64::from(self.destination & 0x3fff) << (64 - cursor);

        cursor += FLEN_ADDR;
        hdr |= u64::from(self.source & 0x3fff) << (64 - cursor);

        cursor += FLEN_PORT;
        hdr |= u64::from(self.destination_port & 0x3f) << (64 - cursor);

        cursor += FLEN_PORT;
        hdr |= u64::from(self.source_port & 0x3f) << (64 - cursor);

        // remaining 6 flag bits stay zero

        let bs = hdr.to_be_bytes();
        [bs[2], bs[3], bs[4], bs[5], bs[6], bs[7]]
    }

    /// Decode the 48-bit wire form.
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

        // pad the 6 wire bytes up to a u64
        let hdr = u64::from_be_bytes([0, 0, dat[0], dat[1], dat[2], dat[3], dat[4], dat[5]]);
        let mut offset = 64 - 48;

        let priority = ((hdr << offset) >> (64 - FLEN_PRIO)) as u8;
        offset += FLEN_PRIO;

        let destination = ((hdr << offset) >> (64 - FLEN_ADDR)) as u16;
        offset += FLEN_ADDR;

        let source = ((hdr << offset) >> (64 - FLEN_ADDR)) as u16;
        offset += FLEN_ADDR;

        let destination_port = ((hdr << offset) >> (64 - FLEN_PORT)) as u8;
        offset += FLEN_PORT;

        let source_port = ((hdr << offset) >> (64 - FLEN_PORT)) as u8;

        // flag bits are reserved and ignored

        Ok(PacketHeader {
            priority,
            destination,
            source,
            destination_port,
            source_port,
        })
    }
}

/// A CSPv2 packet: header followed by payload data.
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
