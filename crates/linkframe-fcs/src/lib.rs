//! Frame check sequence accumulators.
//!
//! The framing codec folds every frame byte (except the delimiters) into a
//! running checksum one byte at a time, so the accumulator must be resumable
//! across arbitrarily split input. This crate defines that contract as the
//! [`Checksum`] trait and ships the two standard HDLC accumulators:
//!
//! - [`Fcs16`] — CRC-16/X-25 (the PPP frame check sequence), the default
//! - [`Fcs32`] — CRC-32, for links that want the wider check
//!
//! Both follow the usual wire convention: the sender inverts the final
//! accumulator value before transmission, and a receiver that folds the
//! transmitted (inverted) checksum bytes back into the running value ends up
//! at a fixed residual, [`Checksum::GOOD`], for any intact frame.

/// A resumable, byte-at-a-time checksum accumulator.
///
/// Values are carried as `u32` regardless of width; narrower accumulators
/// keep the unused high bits zero.
pub trait Checksum {
    /// Seed for a fresh accumulator.
    const INIT: u32;

    /// Residual value of a valid frame (data plus transmitted checksum).
    const GOOD: u32;

    /// Mask XORed onto the final value before transmission.
    const INVERT_MASK: u32;

    /// Width of the checksum on the wire, in bytes.
    const WIDTH: usize;

    /// Fold one byte into the running checksum.
    fn step(current: u32, byte: u8) -> u32;
}

/// CRC-16/X-25, bit-reflected, polynomial 0x8408.
///
/// This is the 16-bit FCS from RFC 1662 (PPP in HDLC-like framing).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fcs16;

impl Checksum for Fcs16 {
    const INIT: u32 = 0xFFFF;
    const GOOD: u32 = 0xF0B8;
    const INVERT_MASK: u32 = 0xFFFF;
    const WIDTH: usize = 2;

    fn step(current: u32, byte: u8) -> u32 {
        let mut fcs = (current as u16) ^ u16::from(byte);
        for _ in 0..8 {
            if fcs & 1 != 0 {
                fcs = (fcs >> 1) ^ 0x8408;
            } else {
                fcs >>= 1;
            }
        }
        u32::from(fcs)
    }
}

/// CRC-32, bit-reflected, polynomial 0xEDB88320.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fcs32;

impl Checksum for Fcs32 {
    const INIT: u32 = 0xFFFF_FFFF;
    const GOOD: u32 = 0xDEBB_20E3;
    const INVERT_MASK: u32 = 0xFFFF_FFFF;
    const WIDTH: usize = 4;

    fn step(current: u32, byte: u8) -> u32 {
        let mut fcs = current ^ u32::from(byte);
        for _ in 0..8 {
            if fcs & 1 != 0 {
                fcs = (fcs >> 1) ^ 0xEDB8_8320;
            } else {
                fcs >>= 1;
            }
        }
        fcs
    }
}

/// Fold a whole slice into a running checksum.
pub fn fold<C: Checksum>(mut current: u32, bytes: &[u8]) -> u32 {
    for &byte in bytes {
        current = C::step(current, byte);
    }
    current
}
