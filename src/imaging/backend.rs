//! Icon processing backend trait and shared types.
//!
//! The [`IconBackend`] trait defines the two operations every backend must
//! support: identify and post_process.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the recording `MockBackend` in this module's test code.

use super::params::IconParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode image: {0}")]
    Decode(String),
    #[error("failed to encode PNG: {0}")]
    Encode(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for icon processing backends.
///
/// Backends work on encoded bytes in and encoded bytes out, so the rest of
/// the codebase never touches pixels. Implementations must be `Sync` because
/// batches may run on a rayon pool.
pub trait IconBackend: Sync {
    /// Decode just enough of `bytes` to report the raster size.
    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, BackendError>;

    /// Run the full pipeline and return PNG bytes of exactly
    /// `params.size × params.size`.
    fn post_process(&self, bytes: &[u8], params: &IconParams) -> Result<Vec<u8>, BackendError>;
}
