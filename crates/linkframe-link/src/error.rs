use linkframe_codec::CodecError;

/// Errors that can occur during framed link I/O.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// A delimited frame failed its checksum or was degenerate. The
    /// reported bytes have already been discarded from the stream; the next
    /// read resumes scanning immediately. Retransmission policy (e.g.
    /// sending a NACK) is the application's call.
    #[error("corrupt frame discarded ({discarded} bytes)")]
    Corrupt { discarded: usize },

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// A codec-level error (output buffer exhausted).
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// An I/O error occurred while reading or writing frames.
    #[error("link I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream was closed before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, LinkError>;
