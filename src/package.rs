//! Archive packaging: bundle a processed directory into a single zip.
//!
//! ```text
//! iconforge_neon_512px.zip
//! ├── icons/
//! │   ├── Instagram.png
//! │   └── Google_Maps.png
//! ├── manifest.json          # theme, size and the app → icon table
//! └── SETUP_GUIDE.md         # how to put the icons on a home screen
//! ```
//!
//! Entries without a file (sources that could not be loaded) are listed in
//! neither `icons/` nor `allApps` and are counted as skipped.
//!
//! Each `allApps` item carries the app's launch URL scheme when it is a
//! known app, and `null` otherwise.

use crate::process::{IconManifest, ProcessedIcon};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use zip::ZipWriter;
use zip::write::FileOptions;

/// Format version of the archived `manifest.json`.
pub const ARCHIVE_MANIFEST_VERSION: &str = "2.0";

/// Launch URL schemes of well-known apps, keyed by display name.
static URL_SCHEMES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("Phone", "tel://"),
        ("Messages", "sms://"),
        ("Mail", "mailto://"),
        ("Safari", "x-web-search://"),
        ("Camera", "camera://"),
        ("Photos", "photos-redirect://"),
        ("Maps", "maps://"),
        ("Clock", "clock-alarm://"),
        ("Weather", "weather://"),
        ("Notes", "mobilenotes://"),
        ("Reminders", "x-apple-reminderkit://"),
        ("Calendar", "calshow://"),
        ("Settings", "App-prefs://"),
        ("App Store", "itms-apps://"),
        ("Music", "music://"),
        ("Podcasts", "podcasts://"),
        ("FaceTime", "facetime://"),
        ("Contacts", "contacts://"),
        ("Files", "shareddocuments://"),
        ("Health", "x-apple-health://"),
        ("Wallet", "shoebox://"),
        ("Calculator", "calc://"),
        ("Shortcuts", "shortcuts://"),
        ("Instagram", "instagram://"),
        ("WhatsApp", "whatsapp://"),
        ("Telegram", "tg://"),
        ("Twitter", "twitter://"),
        ("YouTube", "youtube://"),
        ("Spotify", "spotify://"),
        ("Netflix", "netflix://"),
        ("TikTok", "snssdk1233://"),
        ("Snapchat", "snapchat://"),
        ("LinkedIn", "linkedin://"),
        ("Chrome", "googlechrome://"),
        ("Gmail", "googlegmail://"),
        ("Slack", "slack://"),
        ("Notion", "notion://"),
        ("Discord", "discord://"),
        ("Uber", "uber://"),
        ("Amazon", "com.amazon.mobile.shopping://"),
        ("Reddit", "reddit://"),
        ("Pinterest", "pinterest://"),
        ("Google Maps", "comgooglemaps://"),
        ("Google Drive", "googledrive://"),
        ("Google Photos", "googlephotos://"),
        ("Swiggy", "swiggy://"),
        ("Zomato", "zomato://"),
        ("PayTM", "paytm://"),
        ("PhonePe", "phonepe://"),
        ("GPay", "gpay://"),
        ("Flipkart", "flipkart://"),
        ("Myntra", "myntra://"),
        ("Zerodha", "kite://"),
        ("Groww", "groww://"),
        ("CRED", "cred://"),
        ("Ola", "olacabs://"),
        ("Rapido", "rapido://"),
        ("Dunzo", "dunzo://"),
        ("Books", "ibooks://"),
        ("Home", "com.apple.home://"),
        ("Stocks", "stocks://"),
        ("Voice Memos", "voicememos://"),
        ("Fitness", "fitnessapp://"),
        ("Translate", "translate://"),
        ("Compass", "compass://"),
        ("Tips", "com.apple.tips://"),
        ("Watch", "itms-watchs://"),
        ("Find My", "findmy://"),
        ("Measure", "measure://"),
        ("Magnifier", "magnifier://"),
        ("X", "twitter://"),
        ("Threads", "barcelona://"),
        ("Signal", "sgnl://"),
        ("Zoom", "zoomus://"),
        ("Microsoft Teams", "msteams://"),
        ("Outlook", "ms-outlook://"),
        ("OneNote", "onenote://"),
        ("Excel", "ms-excel://"),
        ("Word", "ms-word://"),
        ("PowerPoint", "ms-powerpoint://"),
    ])
});

/// The URL scheme that opens `app`, if it is a known app.
pub fn url_scheme(app: &str) -> Option<&'static str> {
    URL_SCHEMES.get(app).copied()
}

#[derive(Error, Debug)]
pub enum PackageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Icon file listed in the manifest is missing: {0}")]
    MissingIcon(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackageSummary {
    pub archive: PathBuf,
    pub icon_count: usize,
    /// Entries that had no file to bundle.
    pub skipped: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ArchiveManifest<'a> {
    version: &'static str,
    generated: String,
    theme: &'a str,
    icon_size: u32,
    /// True when every bundled icon went through the pipeline.
    post_processed: bool,
    all_apps: Vec<AppIcon<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AppIcon<'a> {
    app: &'a str,
    icon: &'a str,
    url_scheme: Option<&'static str>,
}

/// Write `archive_path` from the icons in `output_dir` described by `manifest`.
pub fn package(
    manifest: &IconManifest,
    output_dir: &Path,
    archive_path: &Path,
    theme: &str,
) -> Result<PackageSummary, PackageError> {
    let bundled: Vec<(&ProcessedIcon, &str)> = manifest
        .entries
        .iter()
        .filter_map(|e| e.file.as_deref().map(|f| (e, f)))
        .collect();

    // Check everything up front so a missing icon leaves no partial archive.
    for (_, file) in &bundled {
        let path = output_dir.join(file);
        if !path.is_file() {
            return Err(PackageError::MissingIcon(path));
        }
    }

    if let Some(parent) = archive_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let generated = Utc::now();
    let mut zip = ZipWriter::new(File::create(archive_path)?);
    let deflated = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (_, file) in &bundled {
        let data = std::fs::read(output_dir.join(file))?;
        zip.start_file(*file, deflated)?;
        zip.write_all(&data)?;
    }

    let archive_manifest = ArchiveManifest {
        version: ARCHIVE_MANIFEST_VERSION,
        generated: generated.to_rfc3339(),
        theme,
        icon_size: manifest.size,
        post_processed: !bundled.is_empty() && bundled.iter().all(|(e, _)| e.processed),
        all_apps: bundled
            .iter()
            .map(|(e, file)| AppIcon {
                app: &e.name,
                icon: file,
                url_scheme: url_scheme(&e.name),
            })
            .collect(),
    };
    zip.start_file("manifest.json", deflated)?;
    zip.write_all(serde_json::to_string_pretty(&archive_manifest)?.as_bytes())?;

    zip.start_file("SETUP_GUIDE.md", deflated)?;
    zip.write_all(setup_guide(manifest, theme, generated).as_bytes())?;

    zip.finish()?;

    Ok(PackageSummary {
        archive: archive_path.to_path_buf(),
        icon_count: bundled.len(),
        skipped: manifest.entries.len() - bundled.len(),
    })
}

/// Step-by-step instructions for installing the icons as home screen shortcuts.
pub fn setup_guide(manifest: &IconManifest, theme: &str, generated: DateTime<Utc>) -> String {
    let post_processed = match manifest.sharpen {
        Some(_) => "yes (rounded corners + sharpen)",
        None => "yes (rounded corners)",
    };
    let fallbacks: Vec<&str> = manifest
        .entries
        .iter()
        .filter(|e| e.file.is_some() && !e.processed)
        .map(|e| e.name.as_str())
        .collect();

    let mut lines = vec![
        "# Icon Setup Guide".to_string(),
        String::new(),
        format!("## Theme: {theme}"),
        format!("Generated: {}", generated.format("%Y-%m-%d %H:%M UTC")),
        format!(
            "Icon size: {0}x{0}px | Post-processed: {post_processed}",
            manifest.size
        ),
    ];
    if !fallbacks.is_empty() {
        lines.push(format!("Unprocessed originals: {}", fallbacks.join(", ")));
    }
    lines.extend(
        [
            "",
            "---",
            "",
            "## Step 1: Transfer to iPhone",
            "- AirDrop this zip to your iPhone, or save it to iCloud Drive",
            "- Open it in the Files app and unzip",
            "",
            "## Step 2: Save Icons to Photos",
            "- Open the icons/ folder, select all, then Share > Save to Photos",
            "",
            "## Step 3: Create a Shortcut per App",
            "1. Open the Shortcuts app and tap +",
            "2. Add Action > search \"Open App\" > select it",
            "3. Tap \"App\" and pick the target app",
            "4. Tap the name at the top > \"Add to Home Screen\"",
            "5. Tap the icon > \"Choose Photo\" > select the matching icon",
            "6. Name it (or leave it blank) and tap \"Add\"",
            "",
            "## Step 4: Clean Up Original Icons",
            "- Long press the original app > Remove from Home Screen (not Delete)",
            "- It stays available in the App Library",
            "",
            "## Icons",
        ]
        .into_iter()
        .map(String::from),
    );
    let bundled: Vec<(&str, &str)> = manifest
        .entries
        .iter()
        .filter_map(|e| e.file.as_deref().map(|f| (e.name.as_str(), f)))
        .collect();
    for (name, file) in &bundled {
        lines.push(format!("- {name}: {file}"));
    }
    lines.push(String::new());
    lines.push("## URL Schemes (for advanced Shortcut users)".to_string());
    for (name, _) in &bundled {
        let scheme = url_scheme(name).unwrap_or("search App Store for URL scheme");
        lines.push(format!("- {name}: {scheme}"));
    }
    lines.push(String::new());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Read;
    use tempfile::TempDir;

    fn icon(name: &str, file: Option<&str>, processed: bool) -> ProcessedIcon {
        ProcessedIcon {
            name: name.to_string(),
            source: format!("{name}.png"),
            file: file.map(String::from),
            processed,
            fallback: (!processed).then(|| "failed to decode image: bad".to_string()),
        }
    }

    fn manifest(entries: Vec<ProcessedIcon>) -> IconManifest {
        IconManifest {
            size: 512,
            sharpen: Some(0.3),
            entries,
        }
    }

    fn write_icons(out: &Path, files: &[&str]) {
        fs::create_dir_all(out.join("icons")).unwrap();
        for f in files {
            fs::write(out.join(f), format!("png:{f}")).unwrap();
        }
    }

    fn read_entry(archive: &Path, name: &str) -> String {
        let mut zip = zip::ZipArchive::new(File::open(archive).unwrap()).unwrap();
        let mut file = zip.by_name(name).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        content
    }

    fn entry_names(archive: &Path) -> Vec<String> {
        let mut zip = zip::ZipArchive::new(File::open(archive).unwrap()).unwrap();
        let mut names: Vec<String> = (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn archive_contains_icons_manifest_and_guide() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("processed");
        write_icons(&out, &["icons/Instagram.png", "icons/Google_Maps.png"]);
        let m = manifest(vec![
            icon("Instagram", Some("icons/Instagram.png"), true),
            icon("Google Maps", Some("icons/Google_Maps.png"), true),
        ]);
        let archive = tmp.path().join("bundle.zip");

        let summary = package(&m, &out, &archive, "neon").unwrap();

        assert_eq!(summary.icon_count, 2);
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.archive, archive);
        assert_eq!(
            entry_names(&archive),
            vec![
                "SETUP_GUIDE.md",
                "icons/Google_Maps.png",
                "icons/Instagram.png",
                "manifest.json"
            ]
        );
        assert_eq!(
            read_entry(&archive, "icons/Instagram.png"),
            "png:icons/Instagram.png"
        );
    }

    #[test]
    fn archive_manifest_fields() {
        let tmp = TempDir::new().unwrap();
        write_icons(tmp.path(), &["icons/Maps.png"]);
        let m = manifest(vec![icon("Maps", Some("icons/Maps.png"), true)]);
        let archive = tmp.path().join("a.zip");
        package(&m, tmp.path(), &archive, "neon").unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&read_entry(&archive, "manifest.json")).unwrap();
        assert_eq!(json["version"], "2.0");
        assert_eq!(json["theme"], "neon");
        assert_eq!(json["iconSize"], 512);
        assert_eq!(json["postProcessed"], true);
        assert_eq!(json["allApps"][0]["app"], "Maps");
        assert_eq!(json["allApps"][0]["icon"], "icons/Maps.png");
        let generated = json["generated"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(generated).is_ok());
    }

    #[test]
    fn archive_manifest_url_schemes() {
        let tmp = TempDir::new().unwrap();
        write_icons(tmp.path(), &["icons/Instagram.png", "icons/Homebrew_App.png"]);
        let m = manifest(vec![
            icon("Instagram", Some("icons/Instagram.png"), true),
            icon("Homebrew App", Some("icons/Homebrew_App.png"), true),
        ]);
        let archive = tmp.path().join("a.zip");
        package(&m, tmp.path(), &archive, "neon").unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&read_entry(&archive, "manifest.json")).unwrap();
        let apps = json["allApps"].as_array().unwrap();
        assert_eq!(apps[0]["urlScheme"], "instagram://");
        // unknown apps still carry the key
        assert!(apps[1].as_object().unwrap().contains_key("urlScheme"));
        assert!(apps[1]["urlScheme"].is_null());
    }

    #[test]
    fn url_scheme_lookup() {
        assert_eq!(url_scheme("Google Maps"), Some("comgooglemaps://"));
        assert_eq!(url_scheme("App Store"), Some("itms-apps://"));
        assert_eq!(url_scheme("X"), Some("twitter://"));
        assert_eq!(url_scheme("maps"), None);
        assert_eq!(url_scheme("Homebrew App"), None);
    }

    #[test]
    fn entries_without_file_are_skipped() {
        let tmp = TempDir::new().unwrap();
        write_icons(tmp.path(), &["icons/A.png"]);
        let m = manifest(vec![
            icon("A", Some("icons/A.png"), true),
            icon("B", None, false),
        ]);
        let archive = tmp.path().join("a.zip");

        let summary = package(&m, tmp.path(), &archive, "custom").unwrap();
        assert_eq!(summary.icon_count, 1);
        assert_eq!(summary.skipped, 1);

        let json: serde_json::Value =
            serde_json::from_str(&read_entry(&archive, "manifest.json")).unwrap();
        assert_eq!(json["allApps"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn fallback_icon_marks_archive_not_post_processed() {
        let tmp = TempDir::new().unwrap();
        write_icons(tmp.path(), &["icons/A.png", "icons/B.png"]);
        let m = manifest(vec![
            icon("A", Some("icons/A.png"), true),
            icon("B", Some("icons/B.png"), false),
        ]);
        let archive = tmp.path().join("a.zip");
        package(&m, tmp.path(), &archive, "custom").unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&read_entry(&archive, "manifest.json")).unwrap();
        assert_eq!(json["postProcessed"], false);
        assert!(read_entry(&archive, "SETUP_GUIDE.md").contains("Unprocessed originals: B"));
    }

    #[test]
    fn missing_icon_file_is_error_and_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let m = manifest(vec![icon("Gone", Some("icons/Gone.png"), true)]);
        let archive = tmp.path().join("a.zip");

        let result = package(&m, tmp.path(), &archive, "custom");
        assert!(matches!(result, Err(PackageError::MissingIcon(_))));
        assert!(!archive.exists());
    }

    #[test]
    fn archive_parent_directory_is_created() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("dist/nested/a.zip");
        package(&manifest(vec![]), tmp.path(), &archive, "custom").unwrap();
        assert!(archive.is_file());
    }

    #[test]
    fn setup_guide_lists_theme_size_and_icons() {
        let m = manifest(vec![icon("Maps", Some("icons/Maps.png"), true)]);
        let guide = setup_guide(&m, "neon", Utc::now());
        assert!(guide.contains("## Theme: neon"));
        assert!(guide.contains("Icon size: 512x512px"));
        assert!(guide.contains("rounded corners + sharpen"));
        assert!(guide.contains("Open the Shortcuts app"));
        assert!(guide.contains("- Maps: icons/Maps.png"));
        assert!(!guide.contains("Unprocessed originals"));
    }

    #[test]
    fn setup_guide_lists_url_schemes() {
        let m = manifest(vec![
            icon("Maps", Some("icons/Maps.png"), true),
            icon("Homebrew App", Some("icons/Homebrew_App.png"), false),
            icon("Gone", None, false),
        ]);
        let guide = setup_guide(&m, "neon", Utc::now());
        let section = guide
            .split("## URL Schemes (for advanced Shortcut users)\n")
            .nth(1)
            .unwrap();
        assert_eq!(
            section.lines().collect::<Vec<_>>(),
            vec![
                "- Maps: maps://",
                "- Homebrew App: search App Store for URL scheme",
            ]
        );
    }
}
