use std::io::{ErrorKind, Write};
use std::marker::PhantomData;

use bytes::BytesMut;
use linkframe_codec::{encode_frame, Checksum, Control, Fcs16};
use tracing::trace;

use crate::error::{LinkError, Result};
use crate::LinkConfig;

const INITIAL_BUFFER_CAPACITY: usize = 2 * 1024;

/// Writes complete frames to any `Write` stream.
pub struct FrameWriter<T, C: Checksum = Fcs16> {
    inner: T,
    buf: BytesMut,
    config: LinkConfig,
    _checksum: PhantomData<C>,
}

impl<T: Write, C: Checksum> FrameWriter<T, C> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, LinkConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: LinkConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            _checksum: PhantomData,
        }
    }

    /// Encode and send one frame (blocking).
    pub fn send(&mut self, control: Control, payload: &[u8]) -> Result<()> {
        if payload.len() > self.config.max_payload_size {
            return Err(LinkError::PayloadTooLarge {
                size: payload.len(),
                max: self.config.max_payload_size,
            });
        }

        self.buf.clear();
        encode_frame::<C>(control, payload, &mut self.buf);
        trace!(
            kind = ?control.kind,
            seq_no = control.seq_no,
            wire_len = self.buf.len(),
            "frame sent"
        );

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(LinkError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(LinkError::Io(err)),
            }
        }

        self.flush()
    }

    /// Send a data frame with the given send-sequence number.
    pub fn send_data(&mut self, seq_no: u8, payload: &[u8]) -> Result<()> {
        self.send(Control::data(seq_no), payload)
    }

    /// Acknowledge a receive-sequence number.
    pub fn send_ack(&mut self, seq_no: u8) -> Result<()> {
        self.send(Control::ack(seq_no), &[])
    }

    /// Reject a receive-sequence number, requesting retransmission.
    pub fn send_nack(&mut self, seq_no: u8) -> Result<()> {
        self.send(Control::nack(seq_no), &[])
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(LinkError::Io(err)),
            }
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

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current link configuration.
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }
}
