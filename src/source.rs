//! Icon source references: where the raster bytes for an icon come from.
//!
//! A reference is either a filesystem path or an inline
//! `data:<mime>;base64,<payload>` URI, which is what image generators hand
//! back. `http(s)://` references are recognised so they can be reported, but
//! fetching is not supported; loading them fails and the icon falls back.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed data URI: {0}")]
    MalformedDataUri(String),
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("unsupported source: {0}")]
    Unsupported(String),
}

/// A reference to a source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconSource {
    /// Full `data:` URI, kept verbatim.
    DataUri(String),
    /// `http://` or `https://` URL.
    Remote(String),
    File(PathBuf),
}

impl IconSource {
    /// Classify `reference`. Relative paths are resolved against `base_dir`.
    pub fn parse(reference: &str, base_dir: &Path) -> Self {
        let trimmed = reference.trim();
        if has_scheme(trimmed, "data:") {
            return IconSource::DataUri(trimmed.to_string());
        }
        if has_scheme(trimmed, "http://") || has_scheme(trimmed, "https://") {
            return IconSource::Remote(trimmed.to_string());
        }
        let path = Path::new(trimmed);
        if path.is_absolute() {
            IconSource::File(path.to_path_buf())
        } else {
            IconSource::File(base_dir.join(path))
        }
    }

    /// Read the raw encoded bytes behind this reference.
    pub fn load(&self) -> Result<Vec<u8>, SourceError> {
        match self {
            IconSource::DataUri(uri) => decode_data_uri(uri),
            IconSource::Remote(url) => Err(SourceError::Unsupported(format!(
                "remote sources are not fetched: {url}"
            ))),
            IconSource::File(path) => std::fs::read(path).map_err(|source| SourceError::Io {
                path: path.clone(),
                source,
            }),
        }
    }

    /// Short human-readable description. Data URIs are summarised, never printed in full.
    pub fn label(&self) -> String {
        match self {
            IconSource::DataUri(uri) => {
                let header = uri.split_once(',').map_or(uri.as_str(), |(h, _)| h);
                let payload = uri.len().saturating_sub(header.len() + 1);
                // base64 inflates by 4/3
                format!("{header} ({})", format_size(payload as u64 * 3 / 4))
            }
            IconSource::Remote(url) => url.clone(),
            IconSource::File(path) => path.display().to_string(),
        }
    }

    pub fn is_data_uri(&self) -> bool {
        matches!(self, IconSource::DataUri(_))
    }
}

impl fmt::Display for IconSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

fn has_scheme(reference: &str, scheme: &str) -> bool {
    reference
        .get(..scheme.len())
        .is_some_and(|s| s.eq_ignore_ascii_case(scheme))
}

/// Decode the payload of a `data:<mime>;base64,<payload>` URI.
fn decode_data_uri(uri: &str) -> Result<Vec<u8>, SourceError> {
    let (meta, payload) = uri
        .split_once(',')
        .ok_or_else(|| SourceError::MalformedDataUri("missing comma".to_string()))?;
    if !meta.contains(";base64") {
        return Err(SourceError::Unsupported(
            "data URI without base64 encoding".to_string(),
        ));
    }
    let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(STANDARD.decode(cleaned)?)
}

/// Encode PNG bytes as a `data:image/png;base64,...` URI.
pub fn png_data_uri(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MiB", bytes as f64 / (1024.0 * 1024.0))
    }
}
