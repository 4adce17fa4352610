/// Errors that can occur during frame encoding/decoding.
///
/// Incomplete or corrupt frames are not errors at this level; the decoder
/// reports them through [`crate::Decoded`] so the caller can keep scanning.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The caller-supplied output buffer cannot hold the result.
    ///
    /// `needed` is exact when encoding. The decoder cannot know a frame's
    /// full size before its terminator arrives, so on the decode side
    /// `needed` is only a lower bound on the capacity to retry with.
    #[error("output buffer too small (need at least {needed} bytes, capacity {capacity})")]
    BufferTooSmall { needed: usize, capacity: usize },
}

pub type Result<T> = std::result::Result<T, CodecError>;
