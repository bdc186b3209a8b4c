//! Icon post-processing, pure Rust.
//!
//! | Stage | Module |
//! |---|---|
//! | **Decode** | `image::ImageReader` with format sniffing |
//! | **Square crop + scale** | [`compositor`] |
//! | **Corner outline** | [`geometry`] |
//! | **Corner mask** | [`mask`] (scanline fill, destination-in) |
//! | **Sharpen** | [`sharpen`] (4-neighbor, two buffers) |
//! | **Encode** | PNG |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for crop and curve math (unit testable)
//! - **Parameters**: Data structures describing an icon invocation
//! - **Stages**: geometry, compositor, mask, sharpen; pure raster transforms
//! - **Backend**: [`IconBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining loading, backend and fallback

pub mod backend;
mod calculations;
pub mod compositor;
pub mod geometry;
pub mod mask;
pub mod operations;
mod params;
pub mod rust_backend;
pub mod sharpen;

pub use backend::{BackendError, Dimensions, IconBackend};
pub use calculations::{SquareCrop, calculate_square_crop};
pub use geometry::CornerMask;
pub use operations::{PostProcessed, get_dimensions, post_process_icon, render_icon};
pub use params::{IconParams, IconSize, MaskGeometry, ParamError, Resample, Sharpening};
pub use rust_backend::RustBackend;
