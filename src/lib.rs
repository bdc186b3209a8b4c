//! # iconforge
//!
//! Turns generated app artwork into home screen icons: every source is
//! cropped to a centered square, resampled to the icon size, clipped to a
//! continuous-curvature rounded square and lightly sharpened.
//!
//! # Architecture: Batch Pipeline
//!
//! ```text
//! 1. Scan      artwork/ or icons.json  →  Vec<IconEntry>
//! 2. Process   entries                 →  processed/icons/*.png + manifest.json
//! 3. Package   processed/              →  iconforge_<theme>_<size>px.zip
//! ```
//!
//! Each icon goes through the same five steps:
//!
//! ```text
//! decode → square crop + resample → corner mask → sharpen → PNG
//! ```
//!
//! An icon that cannot be decoded is never fatal. The original bytes are
//! passed through and the reason is recorded, so a batch of N sources always
//! yields N results.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Finds icon sources in a directory or a JSON source list |
//! | [`source`] | Icon references: file paths, base64 data URIs, remote URLs |
//! | [`process`] | Runs a batch through the pipeline, writes icons and the manifest |
//! | [`package`] | Zips processed icons with a manifest and setup guide |
//! | [`imaging`] | Geometry, mask rasterizer, compositor, sharpening and the backend |
//! | [`cache`] | Content-addressed cache that skips unchanged icons |
//! | [`config`] | `config.toml` loading, validation and merging |
//! | [`naming`] | Filename rules shared by the processed directory and the archive |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, resampling and PNG encoding use the `image` crate. The corner
//! mask and sharpening filter are small enough to implement directly over
//! `RgbaImage` buffers, which keeps the output deterministic and the binary
//! free of system libraries.
//!
//! ## Event Stream Over Logging
//!
//! Progress is reported as typed [`process::ProcessEvent`]s on a channel and
//! rendered by [`output`]. Library code never prints.

pub mod cache;
pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod package;
pub mod process;
pub mod scan;
pub mod source;
