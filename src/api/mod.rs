//! Contains the types and functions for the high level pipeline builder API.

mod pipeline;

pub use pipeline::PixelArtPipeline;

use crate::{BlockSize, InvalidParameter, PaletteSize, Raster};

/// Runs the whole pixel art pipeline with raw parameter values.
///
/// This is a convenience wrapper around [`PixelArtPipeline`] for callers that
/// receive parameters straight from a UI: `block_size` and `palette_size` are
/// validated here, and every valid combination produces a well-formed raster
/// of the input's dimensions (fully transparent if the input has no opaque
/// pixels).
///
/// # Errors
/// Returns [`InvalidParameter`] if `block_size` or `palette_size` is `0`,
/// or if `palette_size` exceeds [`MAX_COLORS`](crate::MAX_COLORS).
///
/// # Examples
/// ```
/// # use eightbit::{render_pixel_art, Raster};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let raster = Raster::from_rgba_bytes(2, 2, &[10, 20, 30, 255].repeat(4))?;
/// let art = render_pixel_art(&raster, 2, 8, true)?;
/// assert_eq!((art.width(), art.height()), (2, 2));
///
/// assert!(render_pixel_art(&raster, 0, 8, true).is_err());
/// # Ok(())
/// # }
/// ```
pub fn render_pixel_art(
    raster: &Raster,
    block_size: u32,
    palette_size: u16,
    dither: bool,
) -> Result<Raster, InvalidParameter> {
    let block_size = BlockSize::try_from(block_size)?;
    let palette_size = PaletteSize::try_from(palette_size)?;

    let mut pipeline = PixelArtPipeline::new(raster);
    pipeline
        .block_size(block_size)
        .palette_size(palette_size)
        .dither(dither);

    Ok(pipeline.pixel_art())
}
