//! High-level icon operations.
//!
//! These functions combine source loading with backend execution and own the
//! fallback rule: a source that cannot be loaded, decoded or re-encoded is
//! passed through unchanged instead of failing the caller.

use super::backend::{BackendError, IconBackend};
use super::params::IconParams;
use crate::source::{IconSource, png_data_uri};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl IconBackend, bytes: &[u8]) -> Result<(u32, u32)> {
    let dims = backend.identify(bytes)?;
    Ok((dims.width, dims.height))
}

/// Run the pipeline over already-loaded bytes and return PNG bytes.
pub fn render_icon(
    backend: &impl IconBackend,
    bytes: &[u8],
    params: &IconParams,
) -> Result<Vec<u8>> {
    backend.post_process(bytes, params)
}

/// Outcome of [`post_process_icon`].
#[derive(Debug, Clone, PartialEq)]
pub struct PostProcessed {
    /// A PNG data URI on success, otherwise the source that was passed in.
    pub image: IconSource,
    /// Why processing was skipped; `None` when `image` is the processed icon.
    pub fallback: Option<String>,
}

impl PostProcessed {
    pub fn is_processed(&self) -> bool {
        self.fallback.is_none()
    }
}

/// Post-process one icon source into a masked, sharpened PNG data URI.
///
/// Never fails. Any error resolves to the original reference, with the
/// reason recorded in [`PostProcessed::fallback`].
pub fn post_process_icon(
    backend: &impl IconBackend,
    source: &IconSource,
    params: &IconParams,
) -> PostProcessed {
    let rendered = source
        .load()
        .map_err(|e| e.to_string())
        .and_then(|bytes| render_icon(backend, &bytes, params).map_err(|e| e.to_string()));

    match rendered {
        Ok(png) => PostProcessed {
            image: IconSource::DataUri(png_data_uri(&png)),
            fallback: None,
        },
        Err(reason) => PostProcessed {
            image: source.clone(),
            fallback: Some(reason),
        },
    }
}
