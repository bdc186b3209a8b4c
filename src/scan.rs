//! Source discovery: turn the `--source` input into a list of named icons.
//!
//! Two layouts are accepted:
//!
//! ```text
//! artwork/                      # Directory: one icon per image file
//! ├── config.toml               # Optional configuration
//! ├── Instagram.png             # → icon "Instagram"
//! ├── Google Maps.jpg           # → icon "Google Maps"
//! └── .DS_Store                 # hidden, skipped
//! ```
//!
//! ```json
//! [
//!   { "name": "Instagram", "source": "art/instagram.png" },
//!   { "name": "Maps", "source": "data:image/png;base64,iVBORw0..." }
//! ]
//! ```
//!
//! In a source list, relative paths are resolved against the list's
//! directory, and `source` may also be a data URI as returned by an image
//! generator.
//!
//! ## Validation
//!
//! - Names must be non-empty after trimming
//! - No two icons may share a name, since names become file names

use crate::imaging::rust_backend::supported_input_extensions;
use crate::source::IconSource;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Invalid source list: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Source not found: {0}")]
    NotFound(PathBuf),
    #[error("Duplicate icon name: {0}")]
    DuplicateName(String),
    #[error("Icon #{0} in the source list has an empty name")]
    EmptyName(usize),
}

/// One icon to process, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct IconEntry {
    pub name: String,
    pub source: IconSource,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ListedSource {
    name: String,
    source: String,
}

/// Scan a directory or a JSON source list.
pub fn scan(input: &Path) -> Result<Vec<IconEntry>, ScanError> {
    if input.is_dir() {
        scan_directory(input)
    } else if input.is_file() {
        read_source_list(input)
    } else {
        Err(ScanError::NotFound(input.to_path_buf()))
    }
}

/// Collect the image files directly inside `dir`, sorted by file name.
pub fn scan_directory(dir: &Path) -> Result<Vec<IconEntry>, ScanError> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()))
    {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_image(entry.path()) {
            continue;
        }
        let Some(stem) = entry.path().file_stem() else {
            continue;
        };
        entries.push(IconEntry {
            name: stem.to_string_lossy().into_owned(),
            source: IconSource::File(entry.path().to_path_buf()),
        });
    }
    check_unique(&entries)?;
    Ok(entries)
}

/// Read a JSON array of `{ "name", "source" }` objects.
pub fn read_source_list(path: &Path) -> Result<Vec<IconEntry>, ScanError> {
    let content = std::fs::read_to_string(path)?;
    let listed: Vec<ListedSource> = serde_json::from_str(&content)?;
    let base_dir = path.parent().unwrap_or(Path::new("."));

    let entries = listed
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let name = item.name.trim();
            if name.is_empty() {
                return Err(ScanError::EmptyName(i + 1));
            }
            Ok(IconEntry {
                name: name.to_string(),
                source: IconSource::parse(&item.source, base_dir),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    check_unique(&entries)?;
    Ok(entries)
}

fn check_unique(entries: &[IconEntry]) -> Result<(), ScanError> {
    let mut seen = HashSet::new();
    for entry in entries {
        if !seen.insert(entry.name.as_str()) {
            return Err(ScanError::DuplicateName(entry.name.clone()));
        }
    }
    Ok(())
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|n| n.to_string_lossy().starts_with('.'))
}

fn is_image(path: &Path) -> bool {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    supported_input_extensions().contains(&ext.as_str())
}
