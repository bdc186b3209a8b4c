//! Centralized filename rules for icons and archives.
//!
//! Icon names are user-facing app names ("Google Maps", "App Store") and may
//! contain characters that are awkward in paths. Every place that turns a
//! name into a filename goes through [`sanitize_file_stem`] so the processed
//! directory, the archive and the manifest always agree.
//!
//! - `"Google Maps"` → `icons/Google_Maps.png`
//! - `"AC/DC"` → `icons/AC_DC.png`
//! - `"Bob's  \"Notes\""` → `icons/Bob_s_Notes_.png`

use crate::imaging::IconSize;

/// Replace every run of whitespace, `/`, `\`, `'` or `"` with a single `_`.
pub fn sanitize_file_stem(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        if c.is_whitespace() || matches!(c, '/' | '\\' | '\'' | '"') {
            if !in_run {
                out.push('_');
                in_run = true;
            }
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

/// Path of an icon inside the processed directory and the archive.
pub fn icon_archive_path(name: &str) -> String {
    format!("icons/{}.png", sanitize_file_stem(name))
}

/// Download name for a single processed icon, e.g. `Google_Maps_512px.png`.
pub fn single_icon_filename(name: &str, size: IconSize) -> String {
    format!("{}_{}px.png", sanitize_file_stem(name), size.pixels())
}

/// Archive name, e.g. `iconforge_neon_512px.zip`.
pub fn archive_filename(theme: &str, size: IconSize) -> String {
    format!(
        "iconforge_{}_{}px.zip",
        sanitize_file_stem(theme),
        size.pixels()
    )
}
