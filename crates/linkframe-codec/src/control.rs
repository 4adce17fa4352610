//! Control field bit-packing.
//!
//! The codec supports three frame kinds packed into a single HDLC-style
//! control byte: information frames carrying data, and two supervisory
//! frames carrying acknowledgments. Full HDLC distinguishes more supervisory
//! types (receive-not-ready, selective-reject) and a whole family of
//! unnumbered frames; this codec deliberately folds all of those into
//! [`FrameKind::Nack`] on decode and never produces them on encode.

// Control field bit positions.
const SUPERVISORY_BIT: u8 = 0;
const SEND_SEQ_SHIFT: u8 = 1;
const S_TYPE_SHIFT: u8 = 2;
const POLL_BIT: u8 = 4;
const RECV_SEQ_SHIFT: u8 = 5;

// Supervisory type sub-field values.
const TYPE_RECEIVE_READY: u8 = 0;
const TYPE_REJECT: u8 = 2;

/// Sequence numbers occupy 3 bits.
pub const SEQ_NO_MAX: u8 = 0x07;

/// The three supported frame kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Information frame carrying a payload.
    Data,
    /// Receive-ready supervisory frame acknowledging a sequence number.
    Ack,
    /// Reject supervisory frame requesting retransmission.
    Nack,
}

/// Decoded control field: frame kind plus a 3-bit sequence number.
///
/// For [`FrameKind::Data`] the sequence number is the sender's
/// send-sequence; for `Ack`/`Nack` it is the receive-sequence being
/// (n)acked. The control byte only has room for one number per frame, so a
/// decoded `Data` descriptor never carries the peer's receive-sequence;
/// that is a known asymmetry of the three-kind model, not a defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Control {
    pub kind: FrameKind,
    pub seq_no: u8,
}

impl Control {
    /// Create a control descriptor. `seq_no` bits above the low 3 are
    /// silently truncated when the field is packed.
    pub fn new(kind: FrameKind, seq_no: u8) -> Self {
        Self { kind, seq_no }
    }

    /// Data frame descriptor.
    pub fn data(seq_no: u8) -> Self {
        Self::new(FrameKind::Data, seq_no)
    }

    /// Acknowledgment descriptor.
    pub fn ack(seq_no: u8) -> Self {
        Self::new(FrameKind::Ack, seq_no)
    }

    /// Negative-acknowledgment descriptor.
    pub fn nack(seq_no: u8) -> Self {
        Self::new(FrameKind::Nack, seq_no)
    }

    /// Pack the descriptor into a control byte.
    ///
    /// Data frames always carry the poll bit (protocol parameter: this
    /// codec does not piggy-back acknowledgments, so every data frame
    /// solicits a response).
    pub fn pack(self) -> u8 {
        let seq = self.seq_no & SEQ_NO_MAX;
        match self.kind {
            FrameKind::Data => (seq << SEND_SEQ_SHIFT) | (1 << POLL_BIT),
            FrameKind::Ack => (seq << RECV_SEQ_SHIFT) | (1 << SUPERVISORY_BIT),
            FrameKind::Nack => {
                (seq << RECV_SEQ_SHIFT)
                    | (TYPE_REJECT << S_TYPE_SHIFT)
                    | (1 << SUPERVISORY_BIT)
            }
        }
    }

    /// Unpack a control byte into a descriptor.
    ///
    /// Every supervisory type other than receive-ready decodes as `Nack`.
    pub fn unpack(value: u8) -> Self {
        if value & (1 << SUPERVISORY_BIT) != 0 {
            let kind = if (value >> S_TYPE_SHIFT) & 0x03 == TYPE_RECEIVE_READY {
                FrameKind::Ack
            } else {
                FrameKind::Nack
            };
            Self::new(kind, (value >> RECV_SEQ_SHIFT) & SEQ_NO_MAX)
        } else {
            Self::new(FrameKind::Data, (value >> SEND_SEQ_SHIFT) & SEQ_NO_MAX)
        }
    }
}
