//! Blocking framed I/O over any `Read`/`Write` stream.
//!
//! This layer wires the linkframe codec to real byte streams such as a
//! serial port or a socket. [`FrameReader`] accumulates partial reads and
//! hands back complete, validated frames; [`FrameWriter`] encodes and
//! writes frames whole. The codec itself never does I/O, so each direction
//! of a link is just a stream plus its own decoder state.

pub mod error;
pub mod reader;
pub mod writer;

pub use error::{LinkError, Result};
pub use reader::{FrameReader, ReceivedFrame};
pub use writer::FrameWriter;

/// Configuration for framed link I/O.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Maximum payload size in bytes accepted per frame. Default: 4096.
    pub max_payload_size: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            max_payload_size: 4096,
        }
    }
}
