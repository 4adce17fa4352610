//! Frame encoder.
//!
//! A frame on the wire is:
//!
//! ```text
//! FLAG  escaped(ADDRESS)  escaped(CONTROL)  escaped(PAYLOAD)*  escaped(FCS, LE, inverted)  FLAG
//! ```
//!
//! The payload section is present only for data frames; an empty payload is
//! a legal, minimal frame. Encoding is stateless per call.

use bytes::{BufMut, BytesMut};
use linkframe_fcs::Checksum;

use crate::control::{Control, FrameKind};
use crate::error::{CodecError, Result};
use crate::escape::{escape_into, escaped_len, needs_escape, ESCAPE, ESCAPE_XOR, FLAG};

/// Fixed all-station (broadcast) address carried by every frame.
pub const ADDRESS: u8 = 0xFF;

/// Worst-case encoded size of a frame: two flags plus every body byte
/// (address, control, payload, checksum) needing an escape pair.
pub fn max_encoded_len<C: Checksum>(payload_len: usize) -> usize {
    2 + 2 * (2 + payload_len + C::WIDTH)
}

/// Encode a frame, appending it to a growable buffer.
///
/// Payload bytes are folded in only for [`FrameKind::Data`]; supervisory
/// frames ignore `payload` entirely.
pub fn encode_frame<C: Checksum>(control: Control, payload: &[u8], dst: &mut BytesMut) {
    dst.reserve(4 + C::WIDTH + payload.len());
    dst.put_u8(FLAG);

    let mut fcs = C::step(C::INIT, ADDRESS);
    escape_into(ADDRESS, dst);

    let ctrl = control.pack();
    fcs = C::step(fcs, ctrl);
    escape_into(ctrl, dst);

    if control.kind == FrameKind::Data {
        for &byte in payload {
            fcs = C::step(fcs, byte);
            escape_into(byte, dst);
        }
    }

    fcs ^= C::INVERT_MASK;
    for &byte in &fcs.to_le_bytes()[..C::WIDTH] {
        escape_into(byte, dst);
    }

    dst.put_u8(FLAG);
}

/// Encode a frame into a caller-owned buffer.
///
/// Returns the number of bytes written. The exact encoded length is computed
/// up front, so an undersized buffer is reported without any partial write.
pub fn encode_frame_into<C: Checksum>(
    control: Control,
    payload: &[u8],
    dest: &mut [u8],
) -> Result<usize> {
    let ctrl = control.pack();
    let body: &[u8] = if control.kind == FrameKind::Data {
        payload
    } else {
        &[]
    };

    let mut fcs = C::step(C::INIT, ADDRESS);
    fcs = C::step(fcs, ctrl);
    for &byte in body {
        fcs = C::step(fcs, byte);
    }
    fcs ^= C::INVERT_MASK;
    let fcs_bytes = fcs.to_le_bytes();
    let fcs_bytes = &fcs_bytes[..C::WIDTH];

    let mut needed = 2 + escaped_len(ADDRESS) + escaped_len(ctrl);
    for &byte in body.iter().chain(fcs_bytes) {
        needed += escaped_len(byte);
    }
    if dest.len() < needed {
        return Err(CodecError::BufferTooSmall {
            needed,
            capacity: dest.len(),
        });
    }

    let mut at = 0;
    dest[at] = FLAG;
    at += 1;
    for &byte in [ADDRESS, ctrl].iter().chain(body).chain(fcs_bytes) {
        if needs_escape(byte) {
            dest[at] = ESCAPE;
            at += 1;
            dest[at] = byte ^ ESCAPE_XOR;
        } else {
            dest[at] = byte;
        }
        at += 1;
    }
    dest[at] = FLAG;
    at += 1;

    Ok(at)
}
