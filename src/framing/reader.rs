//! Byte-stream scanning for framed data.

use std::io::{ErrorKind, Read};

use crate::{Error, Result};

/// Reads framed regions out of a continuous byte source.
///
/// The start of a frame is identified by seeking through the source for the
/// occurrence of a sync marker; the frame itself is then consumed with an
/// exact-length read. Data ahead of a marker is discarded, which is what
/// lets a receiver resynchronize after garbage or a partially lost frame.
pub struct FrameReader<R> {
    source: R,
    sync_marker: Vec<u8>,

    // sliding window over the upcoming stream; buf[..len] is valid
    buf: Vec<u8>,
    len: usize,
}

impl<R> FrameReader<R>
where
    R: Read,
{
    /// Creates a reader holding a buffer of twice `max_frame_size`, the
    /// largest framed region (marker included) expected from this source.
    pub fn new(source: R, sync_marker: &[u8], max_frame_size: usize) -> Self {
        FrameReader {
            source,
            sync_marker: sync_marker.to_vec(),
            buf: vec![0u8; 2 * max_frame_size],
            len: 0,
        }
    }

    /// Advances past any non-frame data until the buffered stream begins
    /// with the sync marker. Blocks until a marker is seen, the source is
    /// depleted, or the source fails.
    ///
    /// # Errors
    /// [`Error::EndOfStream`] if the source reports EOF before a marker is
    /// found; [`Error::Io`] on any other source failure.
    pub fn seek(&mut self) -> Result<()> {
        let marker_len = self.sync_marker.len();

        loop {
            // buffer at least enough data to check for the marker, then
            // search everything currently buffered
            self.fill(marker_len)?;

            if let Some(idx) = self.find_marker() {
                if idx >= 1 {
                    self.discard(idx);
                }
                return Ok(());
            }

            // no marker; drop everything except a trailing partial marker
            // that may complete on the next read
            self.discard(self.len - marker_len + 1);
        }
    }

    /// Fills `dst` exactly, issuing as many source reads as required.
    ///
    /// # Errors
    /// [`Error::EndOfStream`] if the source is depleted before `dst` is
    /// full; [`Error::Io`] on any other source failure.
    pub fn read(&mut self, dst: &mut [u8]) -> Result<()> {
        if dst.len() > self.buf.len() {
            // the buffer only pre-sizes for the expected frame length;
            // grow for larger exact reads
            self.buf.resize(dst.len(), 0);
        }

        self.fill(dst.len())?;
        dst.copy_from_slice(&self.buf[..dst.len()]);
        self.discard(dst.len());

        Ok(())
    }

    fn find_marker(&self) -> Option<usize> {
        self.buf[..self.len]
            .windows(self.sync_marker.len())
            .position(|w| w == self.sync_marker)
    }

    // Read from the source until at least `target` bytes are buffered.
    fn fill(&mut self, target: usize) -> Result<()> {
        while self.len < target {
            match self.source.read(&mut self.buf[self.len..]) {
                // Ok(0) with a non-empty buffer means EOF per the Read
                // contract
                Ok(0) => return Err(Error::EndOfStream),
                Ok(n) => self.len += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(Error::Io(err)),
            }
        }
        Ok(())
    }

    // Drop n leading bytes from the buffer.
    fn discard(&mut self, n: usize) {
        self.buf.copy_within(n..self.len, 0);
        self.len -= n;
    }
}
