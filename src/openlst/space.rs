//! Packets crossing the OpenLST RF link.
//!
//! A space packet carries a little-endian header and trailing footer around
//! the command data. The footer's CRC-16 is computed with the CC1110's
//! bit-serial algorithm over everything except the CRC bytes themselves, and
//! its two bytes are stored in reversed order inside the otherwise
//! little-endian footer.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::crc::cc1110_checksum;
use crate::{Error, Result};

/// Preamble transmitted ahead of the sync marker.
pub const PREAMBLE: [u8; 4] = [0xaa, 0xaa, 0xaa, 0xaa];

/// Attached sync marker preceding each space packet.
pub const ASM: [u8; 4] = [0xd3, 0x91, 0xd3, 0x91];

/// Space packet header length in bytes
pub const HEADER_LEN: usize = 6;

/// Space packet footer length in bytes
pub const FOOTER_LEN: usize = 4;

/// Contents of a space packet header. Multi-byte fields are little-endian.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpacePacketHeader {
    /// Wire length field: counts header, data and footer bytes but not
    /// itself.
    pub length: u8,
    /// Also known as "flags". Nominally 0 or 1, but observed radio traffic
    /// uses other values, so the full 8-bit range is accepted.
    pub port: u8,
    pub sequence_number: u16,
    pub destination: u8,
    pub command_number: u8,
}

impl SpacePacketHeader {
    /// Smallest legal wire length value (a packet with no data).
    pub const MIN_LENGTH: u8 = (HEADER_LEN + FOOTER_LEN - 1) as u8;
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
        bs[1] = self.port;
        bs[2..4].copy_from_slice(&self.sequence_number.to_le_bytes());
        bs[4] = self.destination;
        bs[5] = self.command_number;
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

        Ok(SpacePacketHeader {
            length: dat[0],
            port: dat[1],
            sequence_number: u16::from_le_bytes([dat[2], dat[3]]),
            destination: dat[4],
            command_number: dat[5],
        })
    }
}

/// Contents of a space packet footer.
///
/// `crc16` holds the checksum in big-endian order as produced by
/// [`cc1110_checksum`]; encoding reverses the two bytes for the wire.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpacePacketFooter {
    pub hardware_id: u16,
    pub crc16: [u8; 2],
}

impl SpacePacketFooter {
    #[must_use]
    pub fn encode(&self) -> [u8; FOOTER_LEN] {
        let mut bs = [0u8; FOOTER_LEN];
        bs[0..2].copy_from_slice(&self.hardware_id.to_le_bytes());
        // CRC bytes are stored reversed on the wire
        bs[2] = self.crc16[1];
        bs[3] = self.crc16[0];
        bs
    }

    /// # Errors
    /// [`Error::HeaderDecode`] if `dat` is not exactly [`FOOTER_LEN`] bytes.
    pub fn decode(dat: &[u8]) -> Result<Self> {
        if dat.len() != FOOTER_LEN {
            return Err(Error::HeaderDecode(format!(
                "expected {} footer bytes, got {}",
                FOOTER_LEN,
                dat.len()
            )));
        }

        Ok(SpacePacketFooter {
            hardware_id: u16::from_le_bytes([dat[0], dat[1]]),
            // undo the on-wire byte reversal
            crc16: [dat[3], dat[2]],
        })
    }
}

/// A space packet: header, command data and footer.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SpacePacket {
    pub header: SpacePacketHeader,
    pub data: Vec<u8>,
    pub footer: SpacePacketFooter,
}

impl SpacePacket {
    /// Constructs a packet from header fields, data and footer fields,
    /// setting the header length field and the footer CRC automatically.
    ///
    /// The result should still be checked with [`SpacePacket::validate`];
    /// oversized data will produce an invalid length field.
    #[must_use]
    pub fn new(header: SpacePacketHeader, data: Vec<u8>, footer: SpacePacketFooter) -> Self {
        let mut p = SpacePacket {
            header,
            data,
            footer,
        };
        p.header.length = (HEADER_LEN + p.data.len() + FOOTER_LEN).wrapping_sub(1) as u8;
        p.footer.crc16 = p.compute_crc16();
        p
    }

    /// Validates header ranges, the length field against the carried data,
    /// and the footer checksum.
    pub fn validate(&self) -> Result<()> {
        self.header.validate()?;
        if usize::from(self.header.length) != HEADER_LEN + self.data.len() + FOOTER_LEN - 1 {
            return Err(Error::LengthMismatch);
        }
        if self.footer.crc16 != self.compute_crc16() {
            return Err(Error::CrcMismatch);
        }
        Ok(())
    }

    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_LEN + self.data.len() + FOOTER_LEN);
        buf.extend_from_slice(&self.header.encode());
        buf.extend_from_slice(&self.data);
        buf.extend_from_slice(&self.footer.encode());
        buf
    }

    /// # Errors
    /// [`Error::HeaderDecode`] if `dat` cannot hold a header and footer.
    pub fn decode(dat: &[u8]) -> Result<Self> {
        if dat.len() < HEADER_LEN + FOOTER_LEN {
            return Err(Error::HeaderDecode("insufficient data".into()));
        }

        Ok(SpacePacket {
            header: SpacePacketHeader::decode(&dat[..HEADER_LEN])?,
            data: dat[HEADER_LEN..dat.len() - FOOTER_LEN].to_vec(),
            footer: SpacePacketFooter::decode(&dat[dat.len() - FOOTER_LEN..])?,
        })
    }

    /// CC1110 checksum over header, data and hardware id (all wire bytes
    /// except the CRC itself).
    fn compute_crc16(&self) -> [u8; 2] {
        let bs = self.encode();
        cc1110_checksum(&bs[..bs.len() - 2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_encode() {
        let hdr = SpacePacketHeader {
            length: 27,
            port: 0,
            sequence_number: 1134,
            destination: 23,
            command_number: 132,
        };
        hdr.validate().expect("header should validate");
        assert_eq!(hdr.encode(), [0x1b, 0x00, 0x6e, 0x04, 0x17, 0x84]);
    }

    #[test]
    fn header_decode() {
        let got = SpacePacketHeader::decode(&[0x0d, 0x01, 0x04, 0x00, 0xfd, 0x38]).unwrap();
        let want = SpacePacketHeader {
            length: 13,
            port: 1,
            sequence_number: 4,
            destination: 253,
            command_number: 56,
        };
        assert_eq!(got, want);
    }

    #[test]
    fn header_accepts_full_port_range() {
        // gr-openlst emits "flags" values like 192
        let hdr = SpacePacketHeader {
            length: 13,
            port: 192,
            ..Default::default()
        };
        hdr.validate().expect("header should validate");
    }

    #[test]
    fn footer_encode() {
        let ftr = SpacePacketFooter {
            hardware_id: 2047,
            crc16: [0x01, 0x02],
        };
        assert_eq!(ftr.encode(), [0xff, 0x07, 0x02, 0x01]);
    }

    #[test]
    fn footer_decode() {
        let got = SpacePacketFooter::decode(&[0x0e, 0x01, 0x0b, 0x0a]).unwrap();
        let want = SpacePacketFooter {
            hardware_id: 270,
            crc16: [0x0a, 0x0b],
        };
        assert_eq!(got, want);
    }

    #[test]
    fn packet_roundtrip() {
        let p = SpacePacket::new(
            SpacePacketHeader {
                port: 1,
                sequence_number: 4000,
                destination: 253,
                command_number: 56,
                ..Default::default()
            },
            vec![0xde, 0xad, 0xbe, 0xef],
            SpacePacketFooter {
                hardware_id: 12,
                ..Default::default()
            },
        );
        p.validate().expect("packet should validate");
        assert_eq!(usize::from(p.header.length), HEADER_LEN + 4 + FOOTER_LEN - 1);

        let wire = p.encode();
        let got = SpacePacket::decode(&wire).unwrap();
        assert_eq!(got, p);
        got.validate().expect("decoded packet should validate");
    }

    #[test]
    fn packet_validate_rejects_bad_crc() {
        let mut p = SpacePacket::new(
            SpacePacketHeader::default(),
            vec![0x01, 0x02],
            SpacePacketFooter::default(),
        );
        p.footer.crc16[0] ^= 0xff;
        assert!(matches!(p.validate(), Err(Error::CrcMismatch)));
    }

    #[test]
    fn packet_validate_rejects_oversized_data() {
        let p = SpacePacket::new(
            SpacePacketHeader {
                port: 1,
                sequence_number: 4000,
                destination: 253,
                command_number: 56,
                ..Default::default()
            },
            vec![0u8; 1024],
            SpacePacketFooter {
                hardware_id: 12,
                ..Default::default()
            },
        );
        assert!(p.validate().is_err());
    }

    #[test]
    fn crc_survives_wire_roundtrip() {
        let p = SpacePacket::new(
            SpacePacketHeader {
                port: 1,
                sequence_number: 99,
                destination: 7,
                command_number: 3,
                ..Default::default()
            },
            vec![0x10, 0x20, 0x30],
            SpacePacketFooter {
                hardware_id: 2047,
                ..Default::default()
            },
        );

        let got = SpacePacket::decode(&p.encode()).unwrap();
        assert_eq!(got.footer.crc16, p.footer.crc16);
        got.validate().expect("checksum should verify after decode");
    }
}
