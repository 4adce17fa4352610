//! Byte-stuffing transform.
//!
//! Two byte values are reserved on the wire: [`FLAG`] delimits frames and
//! [`ESCAPE`] introduces a stuffed literal. Neither may appear inside a frame
//! body, so the encoder replaces them with `ESCAPE` followed by the value
//! XORed with [`ESCAPE_XOR`]. Decoding needs one bit of look-behind state
//! (whether the previous byte was `ESCAPE`), carried by the caller so the
//! transform stays resumable across chunk boundaries.

use bytes::{BufMut, BytesMut};

/// Frame start/end delimiter.
pub const FLAG: u8 = 0x7E;

/// Escape marker introducing a stuffed literal.
pub const ESCAPE: u8 = 0x7D;

/// Mask XORed onto an escaped byte.
pub const ESCAPE_XOR: u8 = 0x20;

/// Whether a byte must be stuffed before it can appear in a frame body.
pub fn needs_escape(value: u8) -> bool {
    value == FLAG || value == ESCAPE
}

/// Encoded size of one body byte: 2 when stuffed, 1 otherwise.
pub fn escaped_len(value: u8) -> usize {
    if needs_escape(value) {
        2
    } else {
        1
    }
}

/// Append one body byte, stuffing it if needed. Emits 1 or 2 bytes.
pub fn escape_into(value: u8, dst: &mut BytesMut) {
    if needs_escape(value) {
        dst.put_u8(ESCAPE);
        dst.put_u8(value ^ ESCAPE_XOR);
    } else {
        dst.put_u8(value);
    }
}

/// One step of the unstuffing transform.
///
/// Returns the decoded byte, or `None` when `value` is the escape marker
/// itself (in which case `escape_pending` is set and the next byte completes
/// the literal). `FLAG` bytes must never reach this function; the decoder
/// intercepts them as delimiters first.
pub fn unescape_step(value: u8, escape_pending: &mut bool) -> Option<u8> {
    if value == ESCAPE {
        *escape_pending = true;
        None
    } else if *escape_pending {
        *escape_pending = false;
        Some(value ^ ESCAPE_XOR)
    } else {
        Some(value)
    }
}
