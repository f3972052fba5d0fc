//! Symmetric byte-to-byte codecs composable into a framing pipeline.
//!
//! Adapters are applied in order while sending and in reverse order while
//! receiving, typically in support of symmetric capabilities such as packet
//! headers or CRC checksums. Implementations must be stateless per call so a
//! configured adapter can be shared across frames and tasks.

use crate::csp;
use crate::{Error, Result};

/// A symmetric wrap/unwrap codec with a size function.
///
/// Contract: `unwrap(wrap(x)) == x` for every `x` accepted by `wrap`, and
/// `wrap(x).len() == wrapped_size(x.len())`. The size function lets senders
/// pre-check whether a payload fits a frame without trial-wrapping.
pub trait Adapter: Send + Sync {
    /// Given a payload, wrap it in the appropriate envelope.
    fn wrap(&self, msg: &[u8]) -> Result<Vec<u8>>;

    /// Given a complete message, strip and verify the expected envelope.
    fn unwrap(&self, msg: &[u8]) -> Result<Vec<u8>>;

    /// Given a payload size, calculate the length of the wrapped message.
    fn wrapped_size(&self, n: usize) -> Result<usize>;
}

/// Prepends a fixed CSPv1 header while wrapping and strips it while
/// unwrapping.
///
/// The header fields are configured once for the link; the header decoded
/// during unwrap is checked for well-formedness and then discarded, as
/// routing is assumed to be handled upstream.
pub struct CspV1Adapter {
    header: csp::v1::PacketHeader,
    max_data_size: usize,
}

impl CspV1Adapter {
    /// # Errors
    /// [`Error::FieldOutOfRange`] if any header field exceeds its bit width.
    pub fn new(header: csp::v1::PacketHeader, max_data_size: usize) -> Result<Self> {
        header.validate()?;
        Ok(CspV1Adapter {
            header,
            max_data_size,
        })
    }

    fn max_packet_size(&self) -> usize {
        csp::v1::PacketHeader::LEN + self.max_data_size
    }
}

impl Adapter for CspV1Adapter {
    fn wrap(&self, msg: &[u8]) -> Result<Vec<u8>> {
        if msg.len() > self.max_data_size {
            return Err(Error::PayloadTooLarge {
                actual: msg.len(),
                limit: self.max_data_size,
            });
        }

        let pkt = csp::v1::Packet {
            header: self.header,
            data: msg.to_vec(),
        };
        Ok(pkt.encode())
    }

    fn unwrap(&self, msg: &[u8]) -> Result<Vec<u8>> {
        if msg.len() > self.max_packet_size() {
            return Err(Error::PayloadTooLarge {
                actual: msg.len(),
                limit: self.max_packet_size(),
            });
        }

        let pkt = csp::v1::Packet::decode(msg)?;
        Ok(pkt.data)
    }

    fn wrapped_size(&self, n: usize) -> Result<usize> {
        if n > self.max_data_size {
            return Err(Error::PayloadTooLarge {
                actual: n,
                limit: self.max_data_size,
            });
        }
        Ok(n + csp::v1::PacketHeader::LEN)
    }
}

/// [`CspV1Adapter`]'s counterpart for the 48-bit CSPv2 header.
pub struct CspV2Adapter {
    header: csp::v2::PacketHeader,
    max_data_size: usize,
}

impl CspV2Adapter {
    /// # Errors
    /// [`Error::FieldOutOfRange`] if any header field exceeds its bit width.
    pub fn new(header: csp::v2::PacketHeader, max_data_size: usize) -> Result<Self> {
        header.validate()?;
        Ok(CspV2Adapter {
            header,
            max_data_size,
        })
    }

    fn max_packet_size(&self) -> usize {
        csp::v2::PacketHeader::LEN + self.max_data_size
    }
}

impl Adapter for CspV2Adapter {
    fn wrap(&self, msg: &[u8]) -> Result<Vec<u8>> {
        if msg.len() > self.max_data_size {
            return Err(Error::PayloadTooLarge {
                actual: msg.len(),
                limit: self.max_data_size,
            });
        }

        let pkt = csp::v2::Packet {
            header: self.header,
            data: msg.to_vec(),
        };
        Ok(pkt.encode())
    }

    fn unwrap(&self, msg: &[u8]) -> Result<Vec<u8>> {
        if msg.len() > self.max_packet_size() {
            return Err(Error::PayloadTooLarge {
                actual: msg.len(),
                limit: self.max_packet_size(),
            });
        }

        let pkt = csp::v2::Packet::decode(msg)?;
        Ok(pkt.data)
    }

    fn wrapped_size(&self, n: usize) -> Result<usize> {
        if n > self.max_data_size {
            return Err(Error::PayloadTooLarge {
                actual: n,
                limit: self.max_data_size,
            });
        }
        Ok(n + csp::v2::PacketHeader::LEN)
    }
}
