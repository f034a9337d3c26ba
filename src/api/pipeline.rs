//! Contains the [`PixelArtPipeline`] builder struct for the high level API.

use crate::{
    dither::{self, FloydSteinberg},
    kmeans, pixelate, upscale, working_dimensions, BlockSize, EmptyPalette, PaletteSize, Raster,
};
use palette::Srgb;

#[cfg(feature = "image")]
use image::RgbaImage;

/// A builder struct to turn a raster into pixel art.
///
/// The pipeline holds no state between runs: every output method recomputes
/// pixelation, palette, and remapping from scratch, so parameter changes
/// simply mean calling a setter and running again.
///
/// # Examples
/// To start, create a [`PixelArtPipeline`] from a [`Raster`]:
/// ```
/// # use eightbit::{PixelArtPipeline, Raster};
/// let raster = Raster::new(64, 64);
/// let mut pipeline = PixelArtPipeline::new(&raster);
/// ```
///
/// Then, you can change the effect parameters:
/// ```
/// # use eightbit::{PixelArtPipeline, Raster, BlockSize, PaletteSize, InvalidParameter};
/// # fn main() -> Result<(), InvalidParameter> {
/// # let raster = Raster::new(64, 64);
/// # let mut pipeline = PixelArtPipeline::new(&raster);
/// pipeline
///     .block_size(BlockSize::try_from(4)?)
///     .palette_size(PaletteSize::try_from(32)?)
///     .dither(false)
///     .seed(42);
/// # Ok(())
/// # }
/// ```
///
/// Finally, run the pipeline:
/// ```
/// # use eightbit::{PixelArtPipeline, Raster};
/// # let raster = Raster::new(64, 64);
/// # let pipeline = PixelArtPipeline::new(&raster);
/// let art = pipeline.pixel_art();
/// assert_eq!((art.width(), art.height()), (64, 64));
/// ```
///
/// Instead of the full-size result you can also get the quantized working
/// raster (one pixel per block) via [`PixelArtPipeline::working_raster`],
/// or just the derived palette via [`PixelArtPipeline::palette`].
#[must_use]
#[derive(Debug, Clone)]
pub struct PixelArtPipeline<'a> {
    /// The input raster.
    raster: &'a Raster,
    /// The edge length of the square blocks to collapse.
    block_size: BlockSize,
    /// The number of colors to derive for the palette.
    k: PaletteSize,
    /// Whether or not to perform dithering while remapping.
    dither: bool,
    /// The error diffusion factor to use when dithering.
    dither_error_diffusion: f32,
    /// The seed value for the random number generator.
    seed: u64,
}

impl<'a> PixelArtPipeline<'a> {
    /// Creates a new [`PixelArtPipeline`] with default options.
    pub fn new(raster: &'a Raster) -> Self {
        Self {
            raster,
            block_size: BlockSize::default(),
            k: PaletteSize::default(),
            dither: true,
            dither_error_diffusion: FloydSteinberg::DEFAULT_ERROR_DIFFUSION,
            seed: 0,
        }
    }

    /// Sets the block size, the edge length in source pixels of each square
    /// block collapsed into one working-raster pixel.
    ///
    /// The default block size is `8`.
    pub fn block_size(&mut self, block_size: BlockSize) -> &mut Self {
        self.block_size = block_size;
        self
    }

    /// Sets the palette size which determines the (maximum) number of colors
    /// to have in the palette.
    ///
    /// The default palette size is `16`.
    pub fn palette_size(&mut self, size: PaletteSize) -> &mut Self {
        self.k = size;
        self
    }

    /// Sets whether or not to perform Floyd–Steinberg dithering while
    /// remapping pixels onto the palette.
    ///
    /// The default value is `true`.
    pub fn dither(&mut self, dither: bool) -> &mut Self {
        self.dither = dither;
        self
    }

    /// Sets the error diffusion factor for the dither.
    ///
    /// A value of `1.0` diffuses all error to the neighboring pixels.
    /// The given `diffusion` should be in the range `0.0..=1.0`,
    /// otherwise the default error diffusion will be used as a fallback.
    ///
    /// The default value is [`FloydSteinberg::DEFAULT_ERROR_DIFFUSION`].
    pub fn dither_error_diffusion(&mut self, diffusion: f32) -> &mut Self {
        self.dither_error_diffusion = diffusion;
        self
    }

    /// Sets the seed value for the random number generator used to re-seed
    /// empty k-means clusters.
    ///
    /// The default seed is `0`.
    pub fn seed(&mut self, seed: u64) -> &mut Self {
        self.seed = seed;
        self
    }

    /// Creates the ditherer specified by the current options.
    fn ditherer(&self) -> Option<FloydSteinberg> {
        if self.dither {
            Some(
                FloydSteinberg::with_error_diffusion(self.dither_error_diffusion)
                    .unwrap_or_default(),
            )
        } else {
            None
        }
    }

    /// Runs the pipeline up to palette derivation and returns the palette.
    ///
    /// # Errors
    /// Returns [`EmptyPalette`] if the pixelated raster has no opaque pixels.
    pub fn palette(&self) -> Result<Vec<Srgb<u8>>, EmptyPalette> {
        let working = pixelate(self.raster, self.block_size);
        kmeans::palette(&working, self.k, self.seed)
    }

    /// Pixelates, derives the palette, and remaps, returning the quantized
    /// working raster (one pixel per block, before upscaling).
    ///
    /// If the input has no opaque pixels, the result is a fully transparent
    /// raster of the working dimensions.
    #[must_use]
    pub fn working_raster(&self) -> Raster {
        self.quantized_working().unwrap_or_else(|EmptyPalette| {
            let (width, height) =
                working_dimensions(self.raster.width(), self.raster.height(), self.block_size);
            Raster::new(width, height)
        })
    }

    /// Runs the whole pipeline and returns the pixel art raster at the
    /// input's original dimensions.
    ///
    /// The quantized working raster is magnified back up with nearest-neighbor
    /// sampling. If the input has no opaque pixels, the result is a fully
    /// transparent raster of the original dimensions.
    #[must_use]
    pub fn pixel_art(&self) -> Raster {
        let (width, height) = (self.raster.width(), self.raster.height());
        match self.quantized_working() {
            Ok(working) => upscale(&working, width, height),
            Err(EmptyPalette) => Raster::new(width, height),
        }
    }

    /// Pixelates, derives the palette, and remaps with the configured ditherer.
    fn quantized_working(&self) -> Result<Raster, EmptyPalette> {
        let mut working = pixelate(self.raster, self.block_size);
        let palette = kmeans::palette(&working, self.k, self.seed)?;

        match self.ditherer() {
            Some(ditherer) => ditherer.remap(&mut working, &palette),
            None => dither::remap(&mut working, &palette),
        }

        Ok(working)
    }
}

#[cfg(feature = "image")]
impl<'a> PixelArtPipeline<'a> {
    /// Runs the whole pipeline and returns the pixel art as an [`RgbaImage`]
    /// at the input's original dimensions.
    #[must_use]
    pub fn pixel_art_image(&self) -> RgbaImage {
        self.pixel_art().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;
    use crate::render_pixel_art;
    use palette::{Srgb, Srgba};

    #[test]
    fn checkerboard_round_trips_exactly() {
        // 4x4 red/blue checkerboard, K = 2, block size 1, no dithering:
        // the palette is exactly {red, blue} and remapping reproduces the input
        let red = Srgba::new(255, 0, 0, 255);
        let blue = Srgba::new(0, 0, 255, 255);
        let source = checkerboard(4, 4, red, blue);

        let mut pipeline = PixelArtPipeline::new(&source);
        pipeline
            .block_size(BlockSize::ONE)
            .palette_size(PaletteSize::from_clamped(2))
            .dither(false);

        #[allow(clippy::unwrap_used)]
        let mut palette = pipeline.palette().unwrap();
        palette.sort_by_key(|c| c.blue);
        assert_eq!(palette, vec![Srgb::new(255, 0, 0), Srgb::new(0, 0, 255)]);

        assert_eq!(pipeline.pixel_art(), source);
    }

    #[test]
    fn transparent_input_yields_transparent_output() {
        let source = solid_raster(10, 10, Srgba::new(200, 100, 50, 0));
        let pipeline = PixelArtPipeline::new(&source);

        assert_eq!(pipeline.palette(), Err(EmptyPalette));

        let art = pipeline.pixel_art();
        assert_eq!((art.width(), art.height()), (10, 10));
        assert!(art.pixels().iter().all(|p| p.alpha == 0));

        let working = pipeline.working_raster();
        assert_eq!((working.width(), working.height()), (1, 1));
        assert!(working.pixels().iter().all(|p| p.alpha == 0));
    }

    #[test]
    fn output_has_original_dimensions() {
        let source = test_raster(50, 33);
        for block in [1u32, 2, 7, 50, 100] {
            let mut pipeline = PixelArtPipeline::new(&source);
            #[allow(clippy::unwrap_used)]
            pipeline.block_size(BlockSize::try_from(block).unwrap());
            let art = pipeline.pixel_art();
            assert_eq!((art.width(), art.height()), (50, 33));
        }
    }

    #[test]
    fn output_rgb_comes_from_the_palette() {
        let source = test_raster(40, 40);
        let mut pipeline = PixelArtPipeline::new(&source);
        #[allow(clippy::unwrap_used)]
        pipeline
            .block_size(BlockSize::try_from(4).unwrap())
            .palette_size(PaletteSize::try_from(8).unwrap());

        #[allow(clippy::unwrap_used)]
        let palette = pipeline.palette().unwrap();
        let art = pipeline.pixel_art();
        assert!(art
            .pixels()
            .iter()
            .all(|p| palette.contains(&Srgb::new(p.red, p.green, p.blue))));
    }

    #[test]
    fn repeated_runs_are_identical() {
        let source = test_raster(30, 20);
        let mut pipeline = PixelArtPipeline::new(&source);
        pipeline.seed(9);
        assert_eq!(pipeline.pixel_art(), pipeline.pixel_art());
        assert_eq!(pipeline.working_raster(), pipeline.working_raster());
    }

    #[test]
    fn render_pixel_art_validates_parameters() {
        let source = test_raster(8, 8);
        assert!(render_pixel_art(&source, 0, 8, false).is_err());
        assert!(render_pixel_art(&source, 2, 0, false).is_err());
        assert!(render_pixel_art(&source, 2, 257, false).is_err());

        #[allow(clippy::unwrap_used)]
        let art = render_pixel_art(&source, 2, 8, true).unwrap();
        assert_eq!((art.width(), art.height()), (8, 8));
    }

    #[test]
    fn out_of_range_diffusion_falls_back_to_default() {
        let source = test_raster(16, 16);
        let mut pipeline = PixelArtPipeline::new(&source);
        pipeline.dither_error_diffusion(2.0);

        let mut expected = PixelArtPipeline::new(&source);
        expected.dither_error_diffusion(FloydSteinberg::DEFAULT_ERROR_DIFFUSION);

        assert_eq!(pipeline.pixel_art(), expected.pixel_art());
    }
}
