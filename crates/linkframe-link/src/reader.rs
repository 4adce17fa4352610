use std::io::{ErrorKind, Read};

use bytes::{Buf, Bytes, BytesMut};
use linkframe_codec::{Checksum, Control, Decoded, Decoder, Fcs16};
use tracing::{trace, warn};

use crate::error::{LinkError, Result};
use crate::LinkConfig;

const INITIAL_BUFFER_CAPACITY: usize = 2 * 1024;
const READ_CHUNK_SIZE: usize = 2 * 1024;

/// A frame received from the link: control descriptor plus payload.
#[derive(Debug, Clone)]
pub struct ReceivedFrame {
    pub control: Control,
    pub payload: Bytes,
}

/// Reads complete frames from any `Read` stream.
///
/// Handles partial reads internally; callers always get complete,
/// checksum-validated frames. Corrupt frames surface as
/// [`LinkError::Corrupt`] after their bytes have been discarded, so the
/// caller can NACK and keep reading.
pub struct FrameReader<T, C: Checksum = Fcs16> {
    inner: T,
    buf: BytesMut,
    scratch: Vec<u8>,
    decoder: Decoder<C>,
    config: LinkConfig,
}

impl<T: Read, C: Checksum> FrameReader<T, C> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, LinkConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: LinkConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            scratch: vec![0u8; config.max_payload_size + C::WIDTH],
            decoder: Decoder::new(),
            config,
        }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Err(LinkError::ConnectionClosed)` when EOF is reached.
    pub fn read_frame(&mut self) -> Result<ReceivedFrame> {
        loop {
            while !self.buf.is_empty() {
                match self.decoder.decode(&self.buf, &mut self.scratch)? {
                    Decoded::Pending { consumed } => {
                        self.buf.advance(consumed);
                        break;
                    }
                    Decoded::Frame {
                        consumed,
                        control,
                        payload_len,
                    } => {
                        self.buf.advance(consumed);
                        let payload = Bytes::copy_from_slice(&self.scratch[..payload_len]);
                        trace!(
                            kind = ?control.kind,
                            seq_no = control.seq_no,
                            len = payload_len,
                            "frame received"
                        );
                        return Ok(ReceivedFrame { control, payload });
                    }
                    Decoded::Corrupt { discard } => {
                        self.buf.advance(discard);
                        warn!(discarded = discard, "corrupt frame discarded");
                        return Err(LinkError::Corrupt { discarded: discard });
                    }
                }
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(LinkError::Io(err)),
            };

            if read == 0 {
                return Err(LinkError::ConnectionClosed);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current link configuration.
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }
}
