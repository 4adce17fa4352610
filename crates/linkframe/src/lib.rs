//! HDLC-style byte framing for serial and other constrained links.
//!
//! linkframe turns arbitrary payloads into delimited, checksum-protected
//! frames and reconstructs them from byte streams delivered in arbitrarily
//! small pieces: the classic UART situation where a full HDLC stack is
//! overkill but framing, escaping, and error detection are not.
//!
//! # Crate Structure
//!
//! - [`fcs`] — frame check sequence accumulators (CRC-16/X-25, CRC-32)
//! - [`codec`] — escape/frame codec and the incremental decoder
//! - [`link`] — blocking framed I/O over `Read`/`Write` streams

/// Re-export checksum types.
pub mod fcs {
    pub use linkframe_fcs::*;
}

/// Re-export codec types.
pub mod codec {
    pub use linkframe_codec::*;
}

/// Re-export link I/O types.
pub mod link {
    pub use linkframe_link::*;
}
