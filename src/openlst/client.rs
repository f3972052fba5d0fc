//! Packets exchanged between client software and the ground-side radio.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Attached sync marker preceding each client packet.
pub const ASM: [u8; 2] = [0x22, 0x69];

/// Client packet header length in bytes
pub const HEADER_LEN: usize = 7;

/// Contents of a client packet header. All multi-byte fields are
/// little-endian.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClientPacketHeader {
    /// Wire length field: counts header and data bytes but not itself.
    pub length: u8,
    pub hardware_id: u16,
    pub sequence_number: u16,
    pub destination: u8,
    pub command_number: u8,
}

impl ClientPacketHeader {
    /// Smallest legal wire length value (a packet with no data).
    pub const MIN_LENGTH: u8 = (HEADER_LEN - 1) as u8;
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

        Ok(ClientPacketHeader {
            length: dat[0],
            hardware_id: u16::from_le_bytes([dat[1], dat[2]]),
            sequence_number: u16::from_le_bytes([dat[3], dat[4]]),
            destination: dat[5],
            command_number: dat[6],
        })
    }
}

/// A client packet: header followed by command data.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ClientPacket {
    pub header: ClientPacketHeader,
    pub data: Vec<u8>,
}

impl ClientPacket {
    /// Constructs a packet from header fields and data, setting the header
    /// length field from the data length.
    ///
    /// The result should still be checked with [`ClientPacket::validate`];
    /// oversized data will produce an invalid length field.
    #[must_use]
    pub fn new(header: ClientPacketHeader, data: Vec<u8>) -> Self {
        let mut p = ClientPacket { header, data };
        p.header.length = (HEADER_LEN + p.data.len()).wrapping_sub(1) as u8;
        p
    }

    /// Validates header ranges and the length field against the carried
    /// data.
    pub fn validate(&self) -> Result<()> {
        self.header.validate()?;
        if usize::from(self.header.length) != HEADER_LEN + self.data.len() - 1 {
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

        Ok(ClientPacket {
            header: ClientPacketHeader::decode(&dat[..HEADER_LEN])?,
            data: dat[HEADER_LEN..].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_encode() {
        let hdr = ClientPacketHeader {
            length: 10,
            hardware_id: 755,
            sequence_number: 12,
            destination: 212,
            command_number: 57,
        };
        hdr.validate().expect("header should validate");
        assert_eq!(hdr.encode(), [0x0a, 0xf3, 0x02, 0x0c, 0x00, 0xd4, 0x39]);
    }

    #[test]
    fn header_decode() {
        let got = ClientPacketHeader::decode(&[0x0d, 0xff, 0x03, 0x04, 0x00, 0xfd, 0x38]).unwrap();
        let want = ClientPacketHeader {
            length: 13,
            hardware_id: 1023,
            sequence_number: 4,
            destination: 253,
            command_number: 56,
        };
        assert_eq!(got, want);
    }

    #[test]
    fn header_validate_length_bounds() {
        let hdr = ClientPacketHeader {
            length: 5,
            ..Default::default()
        };
        assert!(hdr.validate().is_err());

        let hdr = ClientPacketHeader {
            length: 252,
            ..Default::default()
        };
        assert!(hdr.validate().is_err());
    }

    #[test]
    fn packet_roundtrip() {
        let p = ClientPacket::new(
            ClientPacketHeader {
                hardware_id: 755,
                sequence_number: 12,
                destination: 212,
                command_number: 57,
                ..Default::default()
            },
            vec![0x0a, 0x0b, 0x0c, 0x0d],
        );
        p.validate().expect("packet should validate");
        assert_eq!(p.header.length, 10);

        let wire = p.encode();
        assert_eq!(wire.len(), HEADER_LEN + 4);

        let got = ClientPacket::decode(&wire).unwrap();
        assert_eq!(got, p);
        got.validate().expect("decoded packet should validate");
    }

    #[test]
    fn packet_validate_rejects_length_mismatch() {
        let mut p = ClientPacket::new(Default::default(), vec![0x01, 0x02]);
        p.header.length += 1;
        assert!(matches!(p.validate(), Err(Error::LengthMismatch)));
    }

    #[test]
    fn packet_decode_rejects_truncated() {
        assert!(ClientPacket::decode(&[0x0a, 0xf3]).is_err());
    }
}
