//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is organised around icons, not files. Each icon is shown by its
//! positional index and app name, with the source it came from as an
//! indented `Source:` line underneath.
//!
//! # Output Format
//!
//! ## Scan / Check
//!
//! ```text
//! Icons (2)
//! 001 Instagram
//!     Source: artwork/Instagram.png
//!     1024x1024
//! 002 Maps
//!     Source: data:image/png;base64 (2.1 KiB)
//!     unreadable: failed to decode image: ...
//! ```
//!
//! ## Process
//!
//! ```text
//! Icons (2, 512px)
//!     001 Instagram
//!         Source: artwork/Instagram.png
//!         encoded
//!     002 Maps
//!         Source: data:image/png;base64 (2.1 KiB)
//!         fallback: failed to decode image: ...
//! ```
//!
//! ## Package
//!
//! ```text
//! Packaged 2 icons → dist/iconforge_custom_512px.zip
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::imaging::{IconSize, PostProcessed};
use crate::package::PackageSummary;
use crate::process::{IconStatus, ProcessEvent};
use crate::scan::IconEntry;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

fn status_line(status: &IconStatus) -> String {
    match status {
        IconStatus::Encoded => "encoded".to_string(),
        IconStatus::Cached => "cached".to_string(),
        IconStatus::Copied => "copied".to_string(),
        IconStatus::Fallback { reason } => format!("fallback: {reason}"),
    }
}

// ============================================================================
// Scan
// ============================================================================

pub fn format_scan_output(entries: &[IconEntry]) -> Vec<String> {
    let mut lines = vec![format!("Icons ({})", entries.len())];
    for (i, entry) in entries.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), entry.name));
        lines.push(format!("{}Source: {}", indent(1), entry.source.label()));
    }
    lines
}

pub fn print_scan_output(entries: &[IconEntry]) {
    for line in format_scan_output(entries) {
        println!("{}", line);
    }
}

/// Scan output with the probed dimensions (or the probe error) per icon.
pub fn format_check_output(entries: &[IconEntry], probes: &[Result<(u32, u32), String>]) -> Vec<String> {
    let mut lines = vec![format!("Icons ({})", entries.len())];
    for (i, (entry, probe)) in entries.iter().zip(probes).enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), entry.name));
        lines.push(format!("{}Source: {}", indent(1), entry.source.label()));
        match probe {
            Ok((w, h)) if w != h => {
                lines.push(format!("{}{w}x{h} (cropped to square)", indent(1)))
            }
            Ok((w, h)) => lines.push(format!("{}{w}x{h}", indent(1))),
            Err(reason) => lines.push(format!("{}unreadable: {reason}", indent(1))),
        }
    }
    let unreadable = probes.iter().filter(|p| p.is_err()).count();
    if unreadable > 0 {
        lines.push(String::new());
        lines.push(format!(
            "{} will fall back to the original",
            plural(unreadable, "icon")
        ));
    }
    lines
}

pub fn print_check_output(entries: &[IconEntry], probes: &[Result<(u32, u32), String>]) {
    for line in format_check_output(entries, probes) {
        println!("{}", line);
    }
}

// ============================================================================
// Process
// ============================================================================

pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::BatchStarted { total, size } => {
            vec![format!("Icons ({}, {}px)", total, size)]
        }
        ProcessEvent::IconFinished {
            index,
            name,
            source,
            status,
        } => vec![
            format!("{}{} {}", indent(1), format_index(*index), name),
            format!("{}Source: {}", indent(2), source),
            format!("{}{}", indent(2), status_line(status)),
        ],
    }
}

/// Single-icon result, as printed by the `icon` command.
///
/// ```text
/// Instagram.png (512px)
///     processed → Instagram_512px.png
/// ```
pub fn format_icon_result(
    label: &str,
    size: IconSize,
    result: &PostProcessed,
    written: Option<&Path>,
) -> Vec<String> {
    let mut lines = vec![format!("{label} ({size})")];
    let outcome = match &result.fallback {
        None => "processed".to_string(),
        Some(reason) => format!("fallback: {reason}"),
    };
    match written {
        Some(path) => lines.push(format!("{}{outcome} → {}", indent(1), path.display())),
        None => lines.push(format!("{}{outcome}", indent(1))),
    }
    lines
}

pub fn print_icon_result(label: &str, size: IconSize, result: &PostProcessed, written: Option<&Path>) {
    for line in format_icon_result(label, size, result, written) {
        eprintln!("{}", line);
    }
}

// ============================================================================
// Package
// ============================================================================

pub fn format_package_summary(summary: &PackageSummary) -> Vec<String> {
    let mut lines = vec![format!(
        "Packaged {} → {}",
        plural(summary.icon_count, "icon"),
        summary.archive.display()
    )];
    if summary.skipped > 0 {
        lines.push(format!(
            "{}skipped {} with no output",
            indent(1),
            plural(summary.skipped, "icon")
        ));
    }
    lines
}

pub fn print_package_summary(summary: &PackageSummary) {
    for line in format_package_summary(summary) {
        println!("{}", line);
    }
}
