//! Pure Rust icon backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Step | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP) | `image::ImageReader` with format sniffing |
//! | Square crop + scale | [`square_crop`] (`crop_imm` + `imageops::resize`) |
//! | Corner mask | [`CornerMask`] + [`apply_corner_mask`] |
//! | Sharpening | [`sharpen`] (4-neighbor, two buffers) |
//! | Encode → PNG | `image::ImageFormat::Png` |

use super::backend::{BackendError, Dimensions, IconBackend};
use super::compositor::square_crop;
use super::geometry::CornerMask;
use super::mask::apply_corner_mask;
use super::params::IconParams;
use super::sharpen::sharpen;
use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};
use std::io::Cursor;
use std::sync::LazyLock;

/// Extensions whose decoders are compiled in.
const ICON_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("png", ImageFormat::Png),
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    ICON_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-step mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, BackendError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(BackendError::Io)
}

/// Decode an in-memory image of any compiled-in format.
fn load_image(bytes: &[u8]) -> Result<DynamicImage, BackendError> {
    reader(bytes)?
        .decode()
        .map_err(|e| BackendError::Decode(e.to_string()))
}

fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, BackendError> {
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .map_err(|e| BackendError::Encode(e.to_string()))?;
    Ok(out)
}

impl IconBackend for RustBackend {
    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, BackendError> {
        let (width, height) = reader(bytes)?
            .into_dimensions()
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(Dimensions { width, height })
    }

    fn post_process(&self, bytes: &[u8], params: &IconParams) -> Result<Vec<u8>, BackendError> {
        let source = load_image(bytes)?;
        if source.width() == 0 || source.height() == 0 {
            return Err(BackendError::ProcessingFailed(
                "source image has no pixels".to_string(),
            ));
        }

        let mut icon = square_crop(&source, params.size, params.resample);
        let mask = CornerMask::new(params.size, params.geometry);
        apply_corner_mask(&mut icon, &mask, params.mask_samples);

        let icon = match params.sharpening {
            Some(sharpening) => sharpen(&icon, sharpening),
            None => icon,
        };

        encode_png(&icon)
    }
}
