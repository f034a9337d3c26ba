//! Contains the owned RGBA raster type that flows through the pipeline.

use crate::DimensionMismatch;
use palette::{
    cast::{ComponentsAs, IntoComponents},
    Srgba,
};
#[cfg(feature = "image")]
use image::RgbaImage;

/// An owned rectangular buffer of RGBA pixels in row-major order.
///
/// The invariant `pixels.len() == width * height` (that is, one
/// [`Srgba<u8>`] per pixel, or `width * height * 4` bytes) is checked at
/// construction, so all pixel access within the crate is bounds safe.
///
/// Ownership of a [`Raster`] transfers between pipeline stages; no stage
/// mutates a raster it does not currently own.
///
/// # Examples
/// From raw RGBA bytes (row-major, `R,G,B,A` channel order):
/// ```
/// # use eightbit::{Raster, DimensionMismatch};
/// # fn main() -> Result<(), DimensionMismatch> {
/// let bytes = [255, 0, 0, 255, 0, 0, 255, 255];
/// let raster = Raster::from_rgba_bytes(2, 1, &bytes)?;
/// assert_eq!(raster.pixel(1, 0).blue, 255);
/// # Ok(())
/// # }
/// ```
///
/// From an image (needs the `image` feature to be enabled):
/// ```no_run
/// # use eightbit::Raster;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let img = image::open("some image")?.into_rgba8();
/// let raster = Raster::from(&img);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    /// The width of the raster in pixels.
    width: u32,
    /// The height of the raster in pixels.
    height: u32,
    /// The pixel buffer in row-major order, `width * height` long.
    pixels: Vec<Srgba<u8>>,
}

impl Raster {
    /// Creates a fully transparent (all channels zero) raster of the given dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Srgba::new(0, 0, 0, 0); width as usize * height as usize],
        }
    }

    /// Creates a [`Raster`] from a pixel buffer in row-major order.
    ///
    /// # Errors
    /// Returns [`DimensionMismatch`] if `pixels.len() != width * height`.
    pub fn from_pixels(
        width: u32,
        height: u32,
        pixels: Vec<Srgba<u8>>,
    ) -> Result<Self, DimensionMismatch> {
        let expected = width as usize * height as usize;
        if pixels.len() == expected {
            Ok(Self { width, height, pixels })
        } else {
            Err(DimensionMismatch { expected, actual: pixels.len() })
        }
    }

    /// Creates a [`Raster`] from raw RGBA bytes in row-major order
    /// with `R,G,B,A` channel order.
    ///
    /// # Errors
    /// Returns [`DimensionMismatch`] if `bytes.len() != width * height * 4`.
    pub fn from_rgba_bytes(
        width: u32,
        height: u32,
        bytes: &[u8],
    ) -> Result<Self, DimensionMismatch> {
        let expected = width as usize * height as usize * 4;
        if bytes.len() == expected {
            let pixels: &[Srgba<u8>] = bytes.components_as();
            Ok(Self { width, height, pixels: pixels.to_vec() })
        } else {
            Err(DimensionMismatch { expected, actual: bytes.len() })
        }
    }

    /// Returns the width of the raster in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the raster in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Returns the pixel buffer in row-major order.
    #[must_use]
    pub fn pixels(&self) -> &[Srgba<u8>] {
        &self.pixels
    }

    /// Returns the pixel buffer mutably.
    pub(crate) fn pixels_mut(&mut self) -> &mut [Srgba<u8>] {
        &mut self.pixels
    }

    /// Returns the pixel at `(x, y)`.
    ///
    /// Panics if `x >= width` or `y >= height`.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Srgba<u8> {
        self.pixels[self.index(x, y)]
    }

    /// Replaces the pixel at `(x, y)`.
    ///
    /// Panics if `x >= width` or `y >= height`.
    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: Srgba<u8>) {
        let i = self.index(x, y);
        self.pixels[i] = pixel;
    }

    /// Converts `(x, y)` to a buffer index, checking both coordinates.
    fn index(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) out of bounds for a {}x{} raster",
            self.width,
            self.height
        );
        y as usize * self.width as usize + x as usize
    }

    /// Consumes the raster and returns its raw RGBA bytes in row-major order.
    #[must_use]
    pub fn into_rgba_bytes(self) -> Vec<u8> {
        self.pixels.into_components()
    }
}

#[cfg(feature = "image")]
impl From<&RgbaImage> for Raster {
    fn from(image: &RgbaImage) -> Self {
        let pixels: &[Srgba<u8>] = image.as_raw().as_slice().components_as();
        Self {
            width: image.width(),
            height: image.height(),
            pixels: pixels.to_vec(),
        }
    }
}

#[cfg(feature = "image")]
impl From<Raster> for RgbaImage {
    fn from(raster: Raster) -> Self {
        let (width, height) = (raster.width, raster.height);
        #[allow(clippy::expect_used)]
        {
            // the buffer is width * height * 4 bytes by the Raster invariant
            RgbaImage::from_vec(width, height, raster.into_rgba_bytes()).expect("matching buffer")
        }
    }
}
