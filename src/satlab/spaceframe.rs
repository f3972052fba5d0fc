//! The Satlab Spaceframe: a type/length header, a zero-padded payload and an
//! optional CRC-32c trailer, optionally delimited by the CCSDS attached sync
//! marker.

use crc::Crc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::adapter::Adapter;
use crate::crc::{CRC32C, CRC32_TRAILER_LEN};
use crate::{Error, Result};

/// Spaceframe attached sync marker.
pub const ASM: [u8; 4] = [0x1a, 0xcf, 0xfc, 0x1d];

/// Spaceframe header length in bytes
pub const HEADER_LEN: usize = 2;

// field lengths (# bits)
const FLEN_RES: u32 = 1;
const FLEN_TYPE: u32 = 4;
const FLEN_LENGTH: u32 = 11;

const SPACEFRAME_CRC: Crc<u32> = Crc::<u32>::new(&CRC32C);

/// The 4-bit Spaceframe payload type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpaceframeType(pub u8);

impl SpaceframeType {
    /// CSP payload, the only type currently supported.
    pub const CSP: SpaceframeType = SpaceframeType(0);
}

impl Default for SpaceframeType {
    fn default() -> Self {
        Self::CSP
    }
}

/// Contents of a Spaceframe header: a reserved bit, the payload type and the
/// pre-padding payload length.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpaceframeHeader {
    pub frame_type: SpaceframeType,
    pub length: u16,
}

impl SpaceframeHeader {
    pub fn validate(&self) -> Result<()> {
        if self.frame_type != SpaceframeType::CSP {
            return Err(Error::TypeMismatch);
        }

        // datasheet is explicit about this limit
        if self.length > 1024 {
            return Err(Error::FieldOutOfRange {
                field: "length",
                value: self.length.into(),
                min: 0,
                max: 1024,
            });
        }

        Ok(())
    }

    /// Pack the header fields MSB-first into the 16-bit wire form.
    #[must_use]
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut hdr: u16 = 0;
        let mut cursor = 0;

        // reserved bit stays zero
        cursor += FLEN_RES;

        cursor += FLEN_TYPE;
        hdr |= u16::from(self.frame_type.0 & 0x0f) << (16 - cursor);

        cursor += FLEN_LENGTH;
        hdr |= (self.length & 0x7ff) << (16 - cursor);

        hdr.to_be_bytes()
    }

    /// Decode the 16-bit wire form.
    ///
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

        let hdr = u16::from_be_bytes([dat[0], dat[1]]);
        let mut offset = 0;

        // reserved bit is ignored
        offset += FLEN_RES;

        let frame_type = SpaceframeType(((hdr << offset) >> (16 - FLEN_TYPE)) as u8);
        offset += FLEN_TYPE;

        let length = (hdr << offset) >> (16 - FLEN_LENGTH);

        Ok(SpaceframeHeader { frame_type, length })
    }
}

/// Frame geometry and feature selection for a Spaceframe link.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpaceframeConfig {
    pub frame_type: SpaceframeType,

    /// Fixed payload region size; shorter payloads are zero-padded up to it.
    pub payload_data_size: usize,

    /// Prepend/strip the [`ASM`]. Typically the marker is handled out of
    /// band by the frame layer, so this defaults to off.
    pub with_asm: bool,

    /// Append a CRC-32c trailer on enframe and require it on deframe.
    pub with_crc: bool,
}

impl SpaceframeConfig {
    /// Total on-wire frame size produced by [`SpaceframeConfig::enframe`].
    #[must_use]
    pub fn frame_size(&self) -> usize {
        let mut n = HEADER_LEN + self.payload_data_size;
        if self.with_asm {
            n += ASM.len();
        }
        if self.with_crc {
            n += CRC32_TRAILER_LEN;
        }
        n
    }

    /// Build a frame around `msg`: header, payload zero-padded to
    /// `payload_data_size`, then the optional CRC trailer and ASM.
    ///
    /// # Errors
    /// [`Error::PayloadTooLarge`] if `msg` exceeds the payload region;
    /// header validation errors if the configured type or resulting length
    /// field is invalid.
    pub fn enframe(&self, msg: &[u8]) -> Result<Vec<u8>> {
        if msg.len() > self.payload_data_size {
            return Err(Error::PayloadTooLarge {
                actual: msg.len(),
                limit: self.payload_data_size,
            });
        }

        let hdr = SpaceframeHeader {
            frame_type: self.frame_type,
            length: msg.len() as u16,
        };
        hdr.validate()?;

        let mut frm = Vec::with_capacity(self.frame_size());
        if self.with_asm {
            frm.extend_from_slice(&ASM);
        }
        let body = frm.len();

        frm.extend_from_slice(&hdr.encode());
        frm.extend_from_slice(msg);
        frm.resize(body + HEADER_LEN + self.payload_data_size, 0);

        if self.with_crc {
            let ck = SPACEFRAME_CRC.checksum(&frm[body..]).to_be_bytes();
            frm.extend_from_slice(&ck);
        }

        Ok(frm)
    }

    /// Verify a frame's envelope and extract the payload bytes recorded by
    /// its header.
    ///
    /// # Errors
    /// [`Error::LengthMismatch`] if `frm` is not exactly
    /// [`SpaceframeConfig::frame_size`] bytes or the header length field
    /// overruns the frame; [`Error::AsmMismatch`] / [`Error::CrcMismatch`]
    /// for the configured envelope checks; [`Error::TypeMismatch`] and
    /// header validation errors for a bad header.
    pub fn deframe(&self, frm: &[u8]) -> Result<Vec<u8>> {
        if frm.len() != self.frame_size() {
            return Err(Error::LengthMismatch);
        }

        let mut body = frm;
        if self.with_asm {
            if body[..ASM.len()] != ASM {
                return Err(Error::AsmMismatch);
            }
            body = &body[ASM.len()..];
        }

        if self.with_crc {
            let (data, got) = body.split_at(body.len() - CRC32_TRAILER_LEN);
            if got != SPACEFRAME_CRC.checksum(data).to_be_bytes() {
                return Err(Error::CrcMismatch);
            }
            body = data;
        }

        let hdr = SpaceframeHeader::decode(&body[..HEADER_LEN])?;
        hdr.validate()?;
        if hdr.frame_type != self.frame_type {
            return Err(Error::TypeMismatch);
        }

        let end = HEADER_LEN + hdr.length as usize;
        if end > body.len() {
            return Err(Error::LengthMismatch);
        }

        Ok(body[HEADER_LEN..end].to_vec())
    }
}

/// [`Adapter`] over [`SpaceframeConfig::enframe`] /
/// [`SpaceframeConfig::deframe`].
pub struct SpaceframeAdapter {
    cfg: SpaceframeConfig,
}

impl SpaceframeAdapter {
    #[must_use]
    pub fn new(cfg: SpaceframeConfig) -> Self {
        SpaceframeAdapter { cfg }
    }
}

impl Adapter for SpaceframeAdapter {
    fn wrap(&self, msg: &[u8]) -> Result<Vec<u8>> {
        self.cfg.enframe(msg)
    }

    fn unwrap(&self, msg: &[u8]) -> Result<Vec<u8>> {
        self.cfg.deframe(msg)
    }

    fn wrapped_size(&self, n: usize) -> Result<usize> {
        if n > self.cfg.payload_data_size {
            return Err(Error::PayloadTooLarge {
                actual: n,
                limit: self.cfg.payload_data_size,
            });
        }
        Ok(self.cfg.frame_size())
    }
}
