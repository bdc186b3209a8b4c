//! Processing cache for repeated batch runs.
//!
//! Resampling a large generated image and rendering the anti-aliased mask
//! dominates a batch. Re-running `process` after adding one icon should not
//! redo the other forty, so outputs are remembered by content.
//!
//! ## Cache keys
//!
//! Lookups use `source_hash` + `params_hash`, never the icon name. Renaming
//! an icon therefore reuses its previous output (copied to the new file name)
//! instead of re-rendering it.
//!
//! - **`source_hash`**: SHA-256 of the encoded source bytes, whether they
//!   came from a file or a data URI.
//! - **`params_hash`**: SHA-256 of every [`IconParams`] field that affects
//!   pixels: size, sharpening, radius ratio, curvature, mask samples and
//!   resample filter.
//!
//! A hit requires a matching entry **and** the previously written file still
//! on disk. Output paths follow icon names, so a path is routinely rewritten
//! with other content: every write drops the path's previous entry first.
//! Fallback outputs are never recorded, so a source that failed to decode is
//! retried on the next run.
//!
//! ## Storage
//!
//! `<output_dir>/.cache-manifest.json`, next to the icons it describes.
//! `--no-cache` starts from an empty manifest; old files are overwritten.

use crate::imaging::{IconParams, Resample};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::Path;

const MANIFEST_FILENAME: &str = ".cache-manifest.json";

/// Bump to invalidate every existing cache when key computation changes.
const MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    pub source_hash: String,
    pub params_hash: String,
}

/// On-disk map from output path (relative to the output directory) to the
/// content that produced it.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CacheManifest {
    pub version: u32,
    pub entries: HashMap<String, CacheEntry>,
    /// `"{source_hash}:{params_hash}"` → output path. Rebuilt on load.
    #[serde(skip)]
    by_content: HashMap<String, String>,
}

fn content_key(source_hash: &str, params_hash: &str) -> String {
    format!("{source_hash}:{params_hash}")
}

impl CacheManifest {
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: HashMap::new(),
            by_content: HashMap::new(),
        }
    }

    /// Load from `output_dir`. Missing, corrupt or outdated manifests load as empty.
    pub fn load(output_dir: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(output_dir.join(MANIFEST_FILENAME)) else {
            return Self::empty();
        };
        let Ok(mut manifest) = serde_json::from_str::<Self>(&content) else {
            return Self::empty();
        };
        if manifest.version != MANIFEST_VERSION {
            return Self::empty();
        }
        manifest.by_content = manifest
            .entries
            .iter()
            .map(|(path, e)| (content_key(&e.source_hash, &e.params_hash), path.clone()))
            .collect();
        manifest
    }

    pub fn save(&self, output_dir: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(output_dir.join(MANIFEST_FILENAME), json)
    }

    /// Stored output path for this content, if the file is still on disk.
    ///
    /// The path may differ from where the caller wants the icon now; copying
    /// it over is the caller's job.
    pub fn find_cached(
        &self,
        source_hash: &str,
        params_hash: &str,
        output_dir: &Path,
    ) -> Option<String> {
        let stored = self.by_content.get(&content_key(source_hash, params_hash))?;
        output_dir.join(stored).exists().then(|| stored.clone())
    }

    /// Record that `output_path` holds the render of this content.
    ///
    /// An older entry for the same content under another path is dropped.
    pub fn insert(&mut self, output_path: String, source_hash: String, params_hash: String) {
        // The path is about to hold new content; it no longer serves the old one.
        self.remove(&output_path);
        let key = content_key(&source_hash, &params_hash);
        if let Some(old_path) = self.by_content.get(&key)
            && *old_path != output_path
        {
            self.entries.remove(old_path.as_str());
        }
        self.by_content.insert(key, output_path.clone());
        self.entries.insert(
            output_path,
            CacheEntry {
                source_hash,
                params_hash,
            },
        );
    }

    /// Forget what `output_path` holds, before it is overwritten with
    /// something the cache must not hand out.
    pub fn remove(&mut self, output_path: &str) {
        if let Some(old) = self.entries.remove(output_path) {
            let key = content_key(&old.source_hash, &old.params_hash);
            if self.by_content.get(&key).is_some_and(|p| p == output_path) {
                self.by_content.remove(&key);
            }
        }
    }
}

/// SHA-256 of encoded source bytes, as hex.
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// SHA-256 of the parameters that change rendered pixels, as hex.
pub fn hash_icon_params(params: &IconParams) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"icon\0");
    hasher.update(params.size.pixels().to_le_bytes());
    match params.sharpening {
        Some(s) => {
            hasher.update(b"\x01");
            hasher.update(s.amount.to_le_bytes());
        }
        None => hasher.update(b"\x00"),
    }
    hasher.update(params.geometry.radius_ratio.to_le_bytes());
    hasher.update(params.geometry.curvature.to_le_bytes());
    hasher.update(params.mask_samples.to_le_bytes());
    hasher.update([resample_tag(params.resample)]);
    format!("{:x}", hasher.finalize())
}

fn resample_tag(resample: Resample) -> u8 {
    match resample {
        Resample::Nearest => 0,
        Resample::Triangle => 1,
        Resample::CatmullRom => 2,
        Resample::Gaussian => 3,
        Resample::Lanczos3 => 4,
    }
}

/// Per-batch tally of how each icon was produced.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub copies: u32,
    pub misses: u32,
    pub fallbacks: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn copy(&mut self) {
        self.copies += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn fallback(&mut self) {
        self.fallbacks += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.copies + self.misses + self.fallbacks
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.hits > 0 {
            parts.push(format!("{} cached", self.hits));
        }
        if self.copies > 0 {
            parts.push(format!("{} copied", self.copies));
        }
        parts.push(format!("{} encoded", self.misses));
        if self.fallbacks > 0 {
            parts.push(format!("{} fallback", self.fallbacks));
        }

        if parts.len() == 1 {
            f.write_str(&parts[0])
        } else {
            write!(f, "{} ({} total)", parts.join(", "), self.total())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{IconSize, MaskGeometry, Sharpening};
    use std::fs;
    use tempfile::TempDir;

    fn write_icon(dir: &Path, rel: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "png").unwrap();
    }

    // =========================================================================
    // CacheManifest
    // =========================================================================

    #[test]
    fn hit_requires_entry_and_file() {
        let tmp = TempDir::new().unwrap();
        let mut m = CacheManifest::empty();
        m.insert("icons/Maps.png".into(), "src".into(), "prm".into());

        assert_eq!(m.find_cached("src", "prm", tmp.path()), None);

        write_icon(tmp.path(), "icons/Maps.png");
        assert_eq!(
            m.find_cached("src", "prm", tmp.path()),
            Some("icons/Maps.png".to_string())
        );
    }

    #[test]
    fn reinserting_a_path_forgets_its_old_content() {
        let tmp = TempDir::new().unwrap();
        write_icon(tmp.path(), "icons/A.png");
        let mut m = CacheManifest::empty();
        m.insert("icons/A.png".into(), "red".into(), "prm".into());
        m.insert("icons/A.png".into(), "blue".into(), "prm".into());

        assert_eq!(m.find_cached("red", "prm", tmp.path()), None);
        assert_eq!(
            m.find_cached("blue", "prm", tmp.path()),
            Some("icons/A.png".to_string())
        );
        assert_eq!(m.entries.len(), 1);
    }

    #[test]
    fn removed_path_is_no_longer_a_hit() {
        let tmp = TempDir::new().unwrap();
        write_icon(tmp.path(), "icons/A.png");
        let mut m = CacheManifest::empty();
        m.insert("icons/A.png".into(), "red".into(), "prm".into());
        m.remove("icons/A.png");

        assert_eq!(m.find_cached("red", "prm", tmp.path()), None);
        assert!(m.entries.is_empty());
        // unknown paths are ignored
        m.remove("icons/B.png");
    }

    #[test]
    fn removing_stale_path_keeps_newer_owner_of_content() {
        let tmp = TempDir::new().unwrap();
        write_icon(tmp.path(), "icons/B.png");
        let mut m = CacheManifest::empty();
        m.insert("icons/A.png".into(), "red".into(), "prm".into());
        m.insert("icons/B.png".into(), "red".into(), "prm".into());
        m.remove("icons/A.png");

        assert_eq!(
            m.find_cached("red", "prm", tmp.path()),
            Some("icons/B.png".to_string())
        );
    }

    #[test]
    fn miss_on_different_hashes() {
        let tmp = TempDir::new().unwrap();
        write_icon(tmp.path(), "icons/A.png");
        let mut m = CacheManifest::empty();
        m.insert("icons/A.png".into(), "s".into(), "p".into());

        assert_eq!(m.find_cached("other", "p", tmp.path()), None);
        assert_eq!(m.find_cached("s", "other", tmp.path()), None);
    }

    #[test]
    fn renamed_icon_finds_previous_output() {
        let tmp = TempDir::new().unwrap();
        write_icon(tmp.path(), "icons/Old_Name.png");
        let mut m = CacheManifest::empty();
        m.insert("icons/Old_Name.png".into(), "s".into(), "p".into());

        // Same content requested under a new name still resolves to the old file.
        assert_eq!(
            m.find_cached("s", "p", tmp.path()).as_deref(),
            Some("icons/Old_Name.png")
        );

        m.insert("icons/New_Name.png".into(), "s".into(), "p".into());
        assert!(!m.entries.contains_key("icons/Old_Name.png"));
        assert!(m.entries.contains_key("icons/New_Name.png"));
    }

    #[test]
    fn save_and_load_rebuilds_content_lookup() {
        let tmp = TempDir::new().unwrap();
        let mut m = CacheManifest::empty();
        m.insert("icons/A.png".into(), "s1".into(), "p1".into());
        m.insert("icons/B.png".into(), "s2".into(), "p2".into());
        m.save(tmp.path()).unwrap();
        write_icon(tmp.path(), "icons/B.png");

        let loaded = CacheManifest::load(tmp.path());
        assert_eq!(loaded.entries.len(), 2);
        assert_eq!(
            loaded.find_cached("s2", "p2", tmp.path()).as_deref(),
            Some("icons/B.png")
        );
        assert_eq!(loaded.by_content.get("s1:p1").map(String::as_str), Some("icons/A.png"));
    }

    #[test]
    fn load_tolerates_missing_corrupt_and_outdated() {
        let tmp = TempDir::new().unwrap();
        assert!(CacheManifest::load(tmp.path()).entries.is_empty());

        fs::write(tmp.path().join(MANIFEST_FILENAME), "not json").unwrap();
        assert!(CacheManifest::load(tmp.path()).entries.is_empty());

        let json = format!(
            r#"{{"version": {}, "entries": {{"a": {{"source_hash":"h","params_hash":"p"}}}}}}"#,
            MANIFEST_VERSION + 1
        );
        fs::write(tmp.path().join(MANIFEST_FILENAME), json).unwrap();
        assert!(CacheManifest::load(tmp.path()).entries.is_empty());
    }

    // =========================================================================
    // Hashes
    // =========================================================================

    #[test]
    fn hash_bytes_is_sha256_hex() {
        assert_eq!(
            hash_bytes(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn params_hash_is_stable() {
        let p = IconParams::default();
        assert_eq!(hash_icon_params(&p), hash_icon_params(&p.clone()));
    }

    #[test]
    fn params_hash_tracks_every_pixel_affecting_field() {
        let base = IconParams::default();
        let variants = [
            IconParams::new(IconSize::LARGE),
            IconParams {
                sharpening: None,
                ..base.clone()
            },
            IconParams {
                sharpening: Some(Sharpening::new(0.8).unwrap()),
                ..base.clone()
            },
            IconParams {
                geometry: MaskGeometry {
                    radius_ratio: 0.25,
                    ..MaskGeometry::ios()
                },
                ..base.clone()
            },
            IconParams {
                geometry: MaskGeometry {
                    curvature: 1.0,
                    ..MaskGeometry::ios()
                },
                ..base.clone()
            },
            IconParams {
                mask_samples: 1,
                ..base.clone()
            },
            IconParams {
                resample: Resample::Nearest,
                ..base.clone()
            },
        ];
        let base_hash = hash_icon_params(&base);
        for v in &variants {
            assert_ne!(hash_icon_params(v), base_hash, "{v:?}");
        }
    }

    // =========================================================================
    // CacheStats
    // =========================================================================

    #[test]
    fn stats_display_encoded_only() {
        let s = CacheStats {
            misses: 3,
            ..CacheStats::default()
        };
        assert_eq!(s.to_string(), "3 encoded");
    }

    #[test]
    fn stats_display_mixed() {
        let s = CacheStats {
            hits: 3,
            copies: 2,
            misses: 1,
            fallbacks: 1,
        };
        assert_eq!(s.to_string(), "3 cached, 2 copied, 1 encoded, 1 fallback (7 total)");
    }

    #[test]
    fn stats_counters() {
        let mut s = CacheStats::default();
        s.hit();
        s.copy();
        s.miss();
        s.fallback();
        assert_eq!(s.total(), 4);
    }
}
