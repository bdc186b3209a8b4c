//! Batch post-processing of named icons.
//!
//! Takes the entries found by [`scan`](crate::scan) and runs every source
//! through the icon pipeline, writing one PNG per icon plus a manifest.
//!
//! ## Output Structure
//!
//! ```text
//! processed/
//! ├── manifest.json            # IconManifest: one entry per input, in order
//! ├── .cache-manifest.json     # Processing cache (see crate::cache)
//! └── icons/
//!     ├── Instagram.png
//!     └── Google_Maps.png
//! ```
//!
//! ## Fallback
//!
//! A source that cannot be decoded never fails the batch. Its original bytes
//! are written in place of the processed icon and the entry is marked
//! `processed: false` with the reason. A source that cannot even be loaded
//! gets no file at all. A batch of N sources always yields N entries.
//!
//! ## Parallel Processing
//!
//! Icons run on the global [rayon](https://docs.rs/rayon) pool, which the CLI
//! sizes from `processing.max_processes` (one thread unless configured). Each
//! icon owns its buffers; results are collected in input order.

use crate::cache::{self, CacheManifest, CacheStats};
use crate::imaging::{IconBackend, IconParams, RustBackend, render_icon};
use crate::naming::icon_archive_path;
use crate::scan::IconEntry;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Name of the processed manifest within the output directory.
pub const MANIFEST_FILENAME: &str = "manifest.json";

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Icons {0:?} and {1:?} would both be written to {2}")]
    FileNameCollision(String, String, String),
}

/// Written to `<output>/manifest.json` after a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconManifest {
    pub size: u32,
    /// Sharpening amount, `None` when the pass was disabled.
    pub sharpen: Option<f32>,
    pub entries: Vec<ProcessedIcon>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedIcon {
    pub name: String,
    /// Human-readable source label (path, URL or summarised data URI).
    pub source: String,
    /// Path relative to the output directory, when a file was written.
    pub file: Option<String>,
    pub processed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

/// How one icon's output came to be.
#[derive(Debug, Clone, PartialEq)]
pub enum IconStatus {
    /// Rendered by the pipeline in this run.
    Encoded,
    /// Output already on disk from an earlier run.
    Cached,
    /// Earlier output for the same content copied to a new name.
    Copied,
    /// Pipeline skipped; original passed through.
    Fallback { reason: String },
}

/// Progress events sent while a batch runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessEvent {
    BatchStarted {
        total: usize,
        size: u32,
    },
    IconFinished {
        /// 1-based position in the input.
        index: usize,
        name: String,
        source: String,
        status: IconStatus,
    },
}

#[derive(Debug)]
pub struct ProcessResult {
    pub manifest: IconManifest,
    pub cache_stats: CacheStats,
}

pub fn process(
    entries: &[IconEntry],
    output_dir: &Path,
    params: &IconParams,
    use_cache: bool,
    events: Option<Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    let backend = RustBackend::new();
    process_with_backend(&backend, entries, output_dir, params, use_cache, events)
}

/// Process icons using a specific backend (allows testing with mock).
pub fn process_with_backend(
    backend: &impl IconBackend,
    entries: &[IconEntry],
    output_dir: &Path,
    params: &IconParams,
    use_cache: bool,
    events: Option<Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    check_file_names(entries)?;
    std::fs::create_dir_all(output_dir.join("icons"))?;

    let cache = Mutex::new(if use_cache {
        CacheManifest::load(output_dir)
    } else {
        CacheManifest::empty()
    });
    let params_hash = cache::hash_icon_params(params);
    let targets: HashSet<String> = entries
        .iter()
        .map(|e| icon_archive_path(&e.name))
        .collect();

    if let Some(tx) = &events {
        tx.send(ProcessEvent::BatchStarted {
            total: entries.len(),
            size: params.size.pixels(),
        })
        .ok();
    }

    let results: Vec<(ProcessedIcon, IconStatus)> = entries
        .par_iter()
        .enumerate()
        .map(|(i, entry)| -> Result<_, ProcessError> {
            let (icon, status) = process_one(
                backend,
                entry,
                output_dir,
                params,
                &params_hash,
                &cache,
                &targets,
            )?;
            if let Some(tx) = &events {
                tx.send(ProcessEvent::IconFinished {
                    index: i + 1,
                    name: icon.name.clone(),
                    source: icon.source.clone(),
                    status: status.clone(),
                })
                .ok();
            }
            Ok((icon, status))
        })
        .collect::<Result<_, ProcessError>>()?;

    let mut cache_stats = CacheStats::default();
    let mut manifest_entries = Vec::with_capacity(results.len());
    for (icon, status) in results {
        match status {
            IconStatus::Encoded => cache_stats.miss(),
            IconStatus::Cached => cache_stats.hit(),
            IconStatus::Copied => cache_stats.copy(),
            IconStatus::Fallback { .. } => cache_stats.fallback(),
        }
        manifest_entries.push(icon);
    }

    let manifest = IconManifest {
        size: params.size.pixels(),
        sharpen: params.sharpening.map(|s| s.amount),
        entries: manifest_entries,
    };
    std::fs::write(
        output_dir.join(MANIFEST_FILENAME),
        serde_json::to_string_pretty(&manifest)?,
    )?;

    let cache = cache.into_inner().unwrap_or_else(|e| e.into_inner());
    cache.save(output_dir)?;

    Ok(ProcessResult {
        manifest,
        cache_stats,
    })
}

/// Read a previously written processed manifest.
pub fn read_manifest(output_dir: &Path) -> Result<IconManifest, ProcessError> {
    let content = std::fs::read_to_string(output_dir.join(MANIFEST_FILENAME))?;
    Ok(serde_json::from_str(&content)?)
}

fn process_one(
    backend: &impl IconBackend,
    entry: &IconEntry,
    output_dir: &Path,
    params: &IconParams,
    params_hash: &str,
    cache: &Mutex<CacheManifest>,
    targets: &HashSet<String>,
) -> Result<(ProcessedIcon, IconStatus), ProcessError> {
    let rel_path = icon_archive_path(&entry.name);
    let out_path = output_dir.join(&rel_path);
    let mut icon = ProcessedIcon {
        name: entry.name.clone(),
        source: entry.source.label(),
        file: None,
        processed: false,
        fallback: None,
    };

    let bytes = match entry.source.load() {
        Ok(bytes) => bytes,
        Err(e) => {
            let reason = e.to_string();
            icon.fallback = Some(reason.clone());
            return Ok((icon, IconStatus::Fallback { reason }));
        }
    };
    let source_hash = cache::hash_bytes(&bytes);

    // Another icon's file may be rewritten by this batch while we copy it.
    let cached = lock(cache)
        .find_cached(&source_hash, params_hash, output_dir)
        .filter(|stored| *stored == rel_path || !targets.contains(stored));
    if let Some(stored) = cached {
        let status = if stored == rel_path {
            IconStatus::Cached
        } else {
            std::fs::copy(output_dir.join(&stored), &out_path)?;
            IconStatus::Copied
        };
        lock(cache).insert(rel_path.clone(), source_hash, params_hash.to_string());
        icon.file = Some(rel_path);
        icon.processed = true;
        return Ok((icon, status));
    }

    match render_icon(backend, &bytes, params) {
        Ok(png) => {
            std::fs::write(&out_path, png)?;
            lock(cache).insert(rel_path.clone(), source_hash, params_hash.to_string());
            icon.file = Some(rel_path);
            icon.processed = true;
            Ok((icon, IconStatus::Encoded))
        }
        Err(e) => {
            lock(cache).remove(&rel_path);
            std::fs::write(&out_path, &bytes)?;
            let reason = e.to_string();
            icon.file = Some(rel_path);
            icon.fallback = Some(reason.clone());
            Ok((icon, IconStatus::Fallback { reason }))
        }
    }
}

fn lock(cache: &Mutex<CacheManifest>) -> std::sync::MutexGuard<'_, CacheManifest> {
    cache.lock().unwrap_or_else(|e| e.into_inner())
}

/// Distinct names can sanitize to the same file; refuse before writing anything.
fn check_file_names(entries: &[IconEntry]) -> Result<(), ProcessError> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for entry in entries {
        let path = icon_archive_path(&entry.name);
        if let Some(first) = seen.get(&path) {
            return Err(ProcessError::FileNameCollision(
                first.to_string(),
                entry.name.clone(),
                path,
            ));
        }
        seen.insert(path, &entry.name);
    }
    Ok(())
}
