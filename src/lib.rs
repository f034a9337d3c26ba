//! A library that turns an arbitrary RGBA image into stylized low-resolution,
//! color-reduced "pixel art".
//!
//! `eightbit` runs a three stage pipeline: block pixelation (box downsampling),
//! palette derivation via k-means clustering over the opaque pixels, and
//! nearest-palette remapping with optional Floyd–Steinberg error diffusion.
//! The quantized working raster is then magnified back to the original
//! dimensions with a nearest-neighbor upscale so block edges stay crisp.
//!
//! # Features
//! To reduce dependencies and compile times, `eightbit` has `cargo` features
//! that can be turned off or on:
//! - `pipelines`: exposes the [`PixelArtPipeline`] builder struct that serves as the high-level API.
//! - `image`: enables integration with the [`image`] crate.
//!
//! # High-Level API
//! To get started with the high-level API, see [`PixelArtPipeline`].
//! Here is a quick example:
//! ```no_run
//! # use eightbit::{PixelArtPipeline, Raster, BlockSize, PaletteSize};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = image::open("some image")?.into_rgba8();
//! let raster = Raster::from(&img);
//!
//! let mut pipeline = PixelArtPipeline::new(&raster);
//! pipeline
//!     .block_size(BlockSize::try_from(8)?) // collapse 8x8 blocks into one pixel
//!     .palette_size(PaletteSize::try_from(16)?) // reduce to a 16 color palette
//!     .dither(true);
//!
//! // Run the pipeline to get an RgbaImage back at the original dimensions
//! let pixel_art = pipeline.pixel_art_image();
//! # Ok(())
//! # }
//! ```
//!
//! If you only have raw parameter values (e.g., straight from UI sliders),
//! [`render_pixel_art`] validates them and runs the whole pipeline in one call.

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::unwrap_in_result,
    clippy::expect_used,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice,
    missing_docs,
    clippy::missing_docs_in_private_items,
    rustdoc::all,
    clippy::float_cmp_const,
    clippy::lossy_float_literal
)]
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::many_single_char_names,
    clippy::missing_panics_doc,
    clippy::unreadable_literal
)]

mod pixelate;
mod raster;
mod types;

pub mod dither;
pub mod kmeans;

#[cfg(feature = "pipelines")]
mod api;

pub use dither::FloydSteinberg;
pub use pixelate::{pixelate, upscale, working_dimensions};
pub use raster::Raster;
pub use types::*;

#[cfg(feature = "pipelines")]
pub use api::*;

/// The maximum supported number of palette colors is `256`.
pub const MAX_COLORS: u16 = u8::MAX as u16 + 1;
