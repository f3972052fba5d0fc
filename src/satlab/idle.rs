//! Idle frames keep a transceiver's transmit chain fed when there is no
//! application data to send.

use rand::RngCore;

use super::{SpaceframeConfig, ASM};
use crate::{Error, Result};

/// Builds an idle frame carrying an all-zeros payload.
///
/// This is a valid Spaceframe: any configured features such as the CRC-32c
/// trailer are applied as usual, and a receiver will deliver the zero-filled
/// payload.
pub fn idle_frame_zeros(cfg: &SpaceframeConfig) -> Result<Vec<u8>> {
    cfg.enframe(&vec![0u8; cfg.payload_data_size])
}

/// Builds an idle frame from pseudorandom data.
///
/// This is NOT a valid Spaceframe: only the leading [`ASM`] is real, and the
/// remainder of the frame is random, so configured features such as the CRC
/// trailer will not verify and the receiving end discards the frame.
pub fn idle_frame_random(cfg: &SpaceframeConfig) -> Result<Vec<u8>> {
    let size = cfg.frame_size();
    if size < ASM.len() {
        return Err(Error::Config(
            "frame too small to carry the sync marker".into(),
        ));
    }

    let mut frm = vec![0u8; size];
    frm[..ASM.len()].copy_from_slice(&ASM);
    rand::thread_rng().fill_bytes(&mut frm[ASM.len()..]);

    Ok(frm)
}
