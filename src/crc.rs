//! CRC trailer adapters and checksum helpers.
//!
//! The table-driven CRC-16 and CRC-32 adapters append a big-endian checksum
//! trailer while wrapping and verify-and-strip it while unwrapping. The
//! parameter set is caller-supplied as a [`crc::Algorithm`], so any published
//! polynomial variant can be used.

use crc::Crc;

use crate::adapter::Adapter;
use crate::{Error, Result};

pub use crc::Algorithm;

/// Castagnoli CRC-32. Kept here for convenience, as it is not obvious to
/// all that "CRC32c" maps to the Castagnoli algorithm.
pub const CRC32C: Algorithm<u32> = crc::CRC_32_ISCSI;

/// The ubiquitous IEEE 802.3 CRC-32.
pub const CRC32_IEEE: Algorithm<u32> = crc::CRC_32_ISO_HDLC;

/// CRC-16 trailer length in bytes
pub const CRC16_TRAILER_LEN: usize = 2;

/// CRC-32 trailer length in bytes
pub const CRC32_TRAILER_LEN: usize = 4;

/// Appends and verifies 2-byte big-endian CRC-16 trailers.
pub struct Crc16Adapter {
    table: Crc<u16>,
}

impl Crc16Adapter {
    /// # Errors
    /// [`Error::Config`] if the algorithm's polynomial is unset.
    pub fn new(algorithm: &'static Algorithm<u16>) -> Result<Self> {
        if algorithm.poly == 0 {
            return Err(Error::Config("CRC algorithm must be set".into()));
        }
        Ok(Crc16Adapter {
            table: Crc::<u16>::new(algorithm),
        })
    }

    fn checksum(&self, v: &[u8]) -> [u8; CRC16_TRAILER_LEN] {
        self.table.checksum(v).to_be_bytes()
    }
}

impl Adapter for Crc16Adapter {
    fn wrap(&self, msg: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(msg.len() + CRC16_TRAILER_LEN);
        out.extend_from_slice(msg);
        out.extend_from_slice(&self.checksum(msg));
        Ok(out)
    }

    fn unwrap(&self, msg: &[u8]) -> Result<Vec<u8>> {
        if msg.len() <= CRC16_TRAILER_LEN {
            return Err(Error::NotEnoughData {
                actual: msg.len(),
                minimum: CRC16_TRAILER_LEN + 1,
            });
        }

        let (data, got) = msg.split_at(msg.len() - CRC16_TRAILER_LEN);
        if got != self.checksum(data) {
            return Err(Error::CrcMismatch);
        }
        Ok(data.to_vec())
    }

    fn wrapped_size(&self, n: usize) -> Result<usize> {
        Ok(n + CRC16_TRAILER_LEN)
    }
}

/// Appends and verifies 4-byte big-endian CRC-32 trailers.
///
/// [`CRC32C`] is the variant used by the Satlab Spaceframe; [`CRC32_IEEE`]
/// is also common on transceiver links.
pub struct Crc32Adapter {
    table: Crc<u32>,
}

impl Crc32Adapter {
    /// # Errors
    /// [`Error::Config`] if the algorithm's polynomial is unset.
    pub fn new(algorithm: &'static Algorithm<u32>) -> Result<Self> {
        if algorithm.poly == 0 {
            return Err(Error::Config("CRC algorithm must be set".into()));
        }
        Ok(Crc32Adapter {
            table: Crc::<u32>::new(algorithm),
        })
    }

    fn checksum(&self, v: &[u8]) -> [u8; CRC32_TRAILER_LEN] {
        self.table.checksum(v).to_be_bytes()
    }
}

impl Adapter for Crc32Adapter {
    fn wrap(&self, msg: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(msg.len() + CRC32_TRAILER_LEN);
        out.extend_from_slice(msg);
        out.extend_from_slice(&self.checksum(msg));
        Ok(out)
    }

    fn unwrap(&self, msg: &[u8]) -> Result<Vec<u8>> {
        if msg.len() <= CRC32_TRAILER_LEN {
            return Err(Error::NotEnoughData {
                actual: msg.len(),
                minimum: CRC32_TRAILER_LEN + 1,
            });
        }

        let (data, got) = msg.split_at(msg.len() - CRC32_TRAILER_LEN);
        if got != self.checksum(data) {
            return Err(Error::CrcMismatch);
        }
        Ok(data.to_vec())
    }

    fn wrapped_size(&self, n: usize) -> Result<usize> {
        Ok(n + CRC32_TRAILER_LEN)
    }
}

/// CRC-16 in the manner of the CC1110 radio: bit-serial, init 0xFFFF,
/// polynomial 0x8005, MSB-first, no reflection, no final XOR.
///
/// Returns the checksum in big-endian byte order. Documented in TI app note
/// SWRA111; the OpenLST space packet stores these two bytes reversed inside
/// its little-endian footer.
#[must_use]
pub fn cc1110_checksum(dat: &[u8]) -> [u8; 2] {
    let mut ck: u16 = 0xffff;
    for &byte in dat {
        let mut b = byte;
        for _ in 0..8 {
            if (((ck & 0x8000) >> 8) ^ u16::from(b & 0x80)) > 0 {
                ck = (ck << 1) ^ 0x8005;
            } else {
                ck <<= 1;
            }
            b <<= 1;
        }
    }
    ck.to_be_bytes()
}
