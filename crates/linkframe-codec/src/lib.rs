//! HDLC-style byte-stuffed framing codec.
//!
//! This is the core of linkframe: it turns a payload into a delimited,
//! checksum-protected frame, and reconstructs frames from a raw byte stream
//! delivered in arbitrarily small pieces. Three frame kinds are supported
//! (data, ack, nack), each carrying a 3-bit sequence number in an HDLC-style
//! control byte. Full HDLC (U-frames, addressing, flow control) is out of
//! scope.
//!
//! - [`encode_frame`] / [`encode_frame_into`] — stateless frame encoding
//! - [`Decoder`] — incremental decoder with explicit, snapshottable state
//! - [`Control`] / [`FrameKind`] — control field model
//!
//! The checksum is pluggable via [`Checksum`]; [`Fcs16`] (CRC-16/X-25) is
//! the default and [`Fcs32`] the wide alternative.

pub mod control;
pub mod decode;
pub mod encode;
pub mod error;
pub mod escape;

pub use control::{Control, FrameKind, SEQ_NO_MAX};
pub use decode::{Decoded, Decoder, DecoderState};
pub use encode::{encode_frame, encode_frame_into, max_encoded_len, ADDRESS};
pub use error::{CodecError, Result};
pub use escape::{ESCAPE, ESCAPE_XOR, FLAG};

pub use linkframe_fcs::{Checksum, Fcs16, Fcs32};
