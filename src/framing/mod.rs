//! Frame-level sending and receiving over injected byte transports.
//!
//! # Example
//! ```no_run
//! use satcom::crc::{Crc32Adapter, CRC32C};
//! use satcom::framing::{FrameConfig, FrameReceiver, FrameSender};
//! use satcom::satlab::{SpaceframeAdapter, SpaceframeConfig};
//!
//! let cfg = FrameConfig {
//!     sync_marker: satcom::satlab::ASM.to_vec(),
//!     frame_size: 223,
//!     adapters: vec![
//!         Box::new(SpaceframeAdapter::new(SpaceframeConfig {
//!             payload_data_size: 217,
//!             ..Default::default()
//!         })),
//!         Box::new(Crc32Adapter::new(&CRC32C).unwrap()),
//!     ],
//! };
//!
//! let downlink = std::fs::File::open("downlink.dat").unwrap();
//! let receiver = FrameReceiver::new(cfg, downlink).unwrap();
//! let (_cancel_tx, cancel_rx) = crossbeam::channel::bounded::<()>(0);
//! let handle = receiver.spawn(cancel_rx);
//! for msg in handle.messages.iter() {
//!     println!("recovered {} bytes", msg.len());
//! }
//! handle.join();
//! ```

mod reader;

pub use reader::FrameReader;

use std::io::{Read, Write};
use std::thread::{self, JoinHandle};

use crossbeam::channel::{bounded, Receiver, Sender, TryRecvError};
use crossbeam::select;
use tracing::debug;

use crate::adapter::Adapter;
use crate::{Error, Result};

/// Frame geometry and the adapter chain shared by one side of a link.
///
/// Created once and reused for every frame. Adapters are applied in order
/// on the way out and in reverse order on the way in.
pub struct FrameConfig {
    /// Byte sequence designating the start of a frame.
    pub sync_marker: Vec<u8>,

    /// Size of fully encoded frames, NOT including the sync marker. Either
    /// a constant message size is used or an adapter (such as the
    /// Spaceframe's padding) produces one.
    pub frame_size: usize,

    /// Codecs applied while converting messages to and from frames.
    pub adapters: Vec<Box<dyn Adapter>>,
}

impl FrameConfig {
    /// # Errors
    /// [`Error::Config`] on an empty sync marker or zero frame size.
    pub fn validate(&self) -> Result<()> {
        if self.sync_marker.is_empty() {
            return Err(Error::Config("sync marker must be provided".into()));
        }
        if self.frame_size == 0 {
            return Err(Error::Config("frame size must be greater than 0".into()));
        }
        Ok(())
    }

    /// On-wire frame size (excluding the sync marker) for an `n`-byte
    /// payload, folded through the adapter chain without trial-wrapping.
    pub fn wrapped_size(&self, n: usize) -> Result<usize> {
        let mut size = n;
        for ad in &self.adapters {
            size = ad.wrapped_size(size)?;
        }
        Ok(size)
    }
}

/// Wraps messages into frames and writes them to a byte sink.
pub struct FrameSender<W> {
    cfg: FrameConfig,
    dst: W,
}

impl<W> FrameSender<W>
where
    W: Write,
{
    /// # Errors
    /// [`Error::Config`] if `cfg` is invalid.
    pub fn new(cfg: FrameConfig, dst: W) -> Result<Self> {
        cfg.validate()?;
        Ok(FrameSender { cfg, dst })
    }

    /// Folds `msg` through the adapter chain, prepends the sync marker and
    /// writes the whole frame to the sink in a single call.
    ///
    /// No padding is applied beyond what adapters perform, so callers
    /// wanting constant-size frames need an adapter that pads (or must
    /// pre-pad themselves).
    ///
    /// # Errors
    /// [`Error::PayloadTooLarge`] if the wrapped bytes exceed the
    /// configured frame size; [`Error::WriteShort`] if the sink accepts
    /// fewer bytes than offered; adapter and transport errors otherwise.
    pub fn send(&mut self, msg: &[u8]) -> Result<()> {
        let mut frm = msg.to_vec();
        for ad in &self.cfg.adapters {
            frm = ad.wrap(&frm)?;
        }

        if frm.len() > self.cfg.frame_size {
            return Err(Error::PayloadTooLarge {
                actual: frm.len(),
                limit: self.cfg.frame_size,
            });
        }

        let mut out = Vec::with_capacity(self.cfg.sync_marker.len() + frm.len());
        out.extend_from_slice(&self.cfg.sync_marker);
        out.extend_from_slice(&frm);

        let n = self.dst.write(&out)?;
        if n != out.len() {
            return Err(Error::WriteShort {
                wrote: n,
                expected: out.len(),
            });
        }

        Ok(())
    }
}

/// Recovers messages from a noisy frame stream.
///
/// The receive loop seeks the next sync marker, reads one frame, unwinds
/// the adapter chain and delivers the payload. Frames that fail to decode
/// are reported on the optional error channel and the loop resumes at the
/// next marker, so a corrupt frame never stops reception.
pub struct FrameReceiver<R> {
    cfg: FrameConfig,
    reader: FrameReader<R>,
}

impl<R> FrameReceiver<R>
where
    R: Read,
{
    /// # Errors
    /// [`Error::Config`] if `cfg` is invalid.
    pub fn new(cfg: FrameConfig, src: R) -> Result<Self> {
        cfg.validate()?;
        let max_frame_size = cfg.sync_marker.len() + cfg.frame_size;
        let reader = FrameReader::new(src, &cfg.sync_marker, max_frame_size);
        Ok(FrameReceiver { cfg, reader })
    }

    /// Runs the receive loop on the calling thread until the source is
    /// depleted or `cancel` is signaled (by sending a unit or dropping the
    /// senders).
    ///
    /// Recovered messages go to `messages`; per-frame failures go to
    /// `errors` when provided. Both sends block until the consumer takes
    /// the value, so the consumer MUST drain the channels to keep
    /// reception moving. Cancellation is honored at loop boundaries and
    /// during channel sends, but does not unblock an in-flight transport
    /// read; close the transport to force one to return.
    pub fn receive(
        &mut self,
        cancel: &Receiver<()>,
        messages: &Sender<Vec<u8>>,
        errors: Option<&Sender<Error>>,
    ) {
        let want = self.cfg.sync_marker.len() + self.cfg.frame_size;

        loop {
            match cancel.try_recv() {
                Ok(()) | Err(TryRecvError::Disconnected) => {
                    debug!("receive canceled");
                    return;
                }
                Err(TryRecvError::Empty) => {}
            }

            let msg = match self.read_frame(want) {
                Ok(msg) => msg,
                Err(Error::EndOfStream) => {
                    debug!("source depleted");
                    return;
                }
                Err(err) => {
                    debug!(%err, "skipping frame");
                    if let Some(errors) = errors {
                        select! {
                            send(errors, err) -> res => {
                                if res.is_err() {
                                    return;
                                }
                            }
                            recv(cancel) -> _ => return,
                        }
                    }
                    continue;
                }
            };

            select! {
                send(messages, msg) -> res => {
                    if res.is_err() {
                        // consumer went away
                        return;
                    }
                }
                recv(cancel) -> _ => return,
            }
        }
    }

    // Seek to the next marker, read the framed region exactly, strip the
    // marker and unwind the adapter chain.
    fn read_frame(&mut self, want: usize) -> Result<Vec<u8>> {
        self.reader.seek()?;

        let mut frm = vec![0u8; want];
        self.reader.read(&mut frm)?;

        let mut msg = frm.split_off(self.cfg.sync_marker.len());
        for ad in self.cfg.adapters.iter().rev() {
            msg = ad.unwrap(&msg)?;
        }

        Ok(msg)
    }
}

impl<R> FrameReceiver<R>
where
    R: Read + Send + 'static,
{
    /// Runs [`FrameReceiver::receive`] on a background thread, delivering
    /// over rendezvous channels.
    ///
    /// The worker owns the channel senders and drops them on exit, so the
    /// returned receivers disconnect once the loop terminates.
    #[must_use]
    pub fn spawn(mut self, cancel: Receiver<()>) -> ReceiveHandle {
        let (msg_tx, msg_rx) = bounded(0);
        let (err_tx, err_rx) = bounded(0);

        let handle = thread::Builder::new()
            .name("frame_receiver".into())
            .spawn(move || self.receive(&cancel, &msg_tx, Some(&err_tx)))
            .expect("failed to spawn frame receiver thread");

        ReceiveHandle {
            messages: msg_rx,
            errors: err_rx,
            handle,
        }
    }
}

/// Handle to a background receive loop started with
/// [`FrameReceiver::spawn`].
pub struct ReceiveHandle {
    /// Recovered payloads, in stream order.
    pub messages: Receiver<Vec<u8>>,
    /// Per-frame decode and transport failures, in stream order relative
    /// to the messages.
    pub errors: Receiver<Error>,
    handle: JoinHandle<()>,
}

impl ReceiveHandle {
    /// Waits for the receive loop to exit.
    ///
    /// # Panics
    /// If the receiver thread panicked.
    pub fn join(self) {
        self.handle
            .join()
            .unwrap_or_else(|err| panic!("frame receiver thread panicked: {err:?}"));
    }
}
