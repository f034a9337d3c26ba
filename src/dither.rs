//! Contains nearest-palette remapping, with and without error diffusion.

use crate::Raster;
use palette::{cast::AsArrays, Srgb, Srgba};
use std::array;

/// Floyd–Steinberg dithering.
///
/// Remapping a raster through [`FloydSteinberg::remap`] walks the pixels in
/// row-major order, adds the error accumulated for each pixel before matching
/// it against the palette, and spreads the resulting quantization error to the
/// not-yet-visited neighbors: `7/16` to the right, `3/16` down-left, `5/16`
/// down, and `1/16` down-right. Error that would land outside the raster is
/// dropped.
#[derive(Debug, Clone, Copy)]
pub struct FloydSteinberg(f32);

impl FloydSteinberg {
    /// The default error diffusion factor, which diffuses the entire
    /// quantization error of each pixel.
    pub const DEFAULT_ERROR_DIFFUSION: f32 = 1.0;

    /// Creates a new [`FloydSteinberg`] with the default error diffusion factor.
    #[must_use]
    pub const fn new() -> Self {
        Self(Self::DEFAULT_ERROR_DIFFUSION)
    }

    /// Creates a new [`FloydSteinberg`] with the given error diffusion factor.
    ///
    /// For example, a factor of `1.0` diffuses all of the error to the neighboring pixels.
    ///
    /// This will return `None` if `error_diffusion` is not in the range `0.0..=1.0`.
    #[must_use]
    pub fn with_error_diffusion(error_diffusion: f32) -> Option<Self> {
        if (0.0..=1.0).contains(&error_diffusion) {
            Some(Self(error_diffusion))
        } else {
            None
        }
    }

    /// Gets the error diffusion factor for this [`FloydSteinberg`].
    #[must_use]
    pub const fn error_diffusion(&self) -> f32 {
        self.0
    }
}

impl Default for FloydSteinberg {
    fn default() -> Self {
        Self::new()
    }
}

/// Squared euclidean distance between two points.
fn squared_distance(x: [f32; 3], y: [f32; 3]) -> f32 {
    let mut dist = 0.0;
    for c in 0..3 {
        let d = x[c] - y[c];
        dist += d * d;
    }
    dist
}

/// Returns the index of the palette entry nearest to `point`.
///
/// Ties are broken by the first minimum found, so palette order decides.
pub(crate) fn nearest(palette: &[[f32; 3]], point: [f32; 3]) -> usize {
    let mut min_index = 0;
    let mut min_distance = f32::INFINITY;
    for (i, &entry) in palette.iter().enumerate() {
        let distance = squared_distance(entry, point);
        if distance < min_distance {
            min_distance = distance;
            min_index = i;
        }
    }
    min_index
}

/// Converts a palette of 8-bit colors into `f32` triples for distance math.
fn palette_components(palette: &[Srgb<u8>]) -> Vec<[f32; 3]> {
    palette
        .as_arrays()
        .iter()
        .map(|c| c.map(f32::from))
        .collect()
}

/// The RGB channels of a pixel as `f32`s.
fn components(pixel: Srgba<u8>) -> [f32; 3] {
    [
        f32::from(pixel.red),
        f32::from(pixel.green),
        f32::from(pixel.blue),
    ]
}

/// Replaces a pixel's RGB channels with a palette entry, leaving alpha untouched.
fn write_quantized(pixel: &mut Srgba<u8>, entry: Srgb<u8>) {
    *pixel = Srgba::new(entry.red, entry.green, entry.blue, pixel.alpha);
}

/// Replaces every pixel's RGB with its nearest palette color.
///
/// All pixels are remapped regardless of their alpha value; the alpha channel
/// itself is never changed. Does nothing if the palette is empty.
pub fn remap(raster: &mut Raster, palette: &[Srgb<u8>]) {
    if palette.is_empty() {
        return;
    }

    let palette_f = palette_components(palette);
    for pixel in raster.pixels_mut() {
        let i = nearest(&palette_f, components(*pixel));
        write_quantized(pixel, palette[i]);
    }
}

/// Multiplies `other` by a scalar, `alpha`, and adds the result to `arr`.
#[inline]
fn arr_mul_add_assign(arr: &mut [f32; 3], alpha: f32, other: [f32; 3]) {
    for i in 0..3 {
        arr[i] += alpha * other[i];
    }
}

/// Propagates, stores, and applies the dither error to the pixels.
///
/// Holds the accumulated error for the current row and the next row; each row
/// is padded by one cell on both sides so edge pixels can propagate without
/// bounds checks, with the padding cells discarded at the end of the row.
struct ErrorBuf<'a> {
    /// The width of a row of pixels.
    width: usize,
    /// The propagated error for the current row of pixels.
    this_err: &'a mut [[f32; 3]],
    /// The propagated error for the next row of pixels.
    next_err: &'a mut [[f32; 3]],
}

impl<'a> ErrorBuf<'a> {
    /// Create the backing buffer for a new `ErrorBuf`.
    fn new_buf(width: usize) -> Vec<[f32; 3]> {
        vec![[0.0; 3]; 2 * (width + 2)]
    }

    /// Create a new `ErrorBuf` using the given `buf`.
    fn new(width: usize, buf: &'a mut [[f32; 3]]) -> Self {
        let (this_err, next_err) = buf.split_at_mut(width + 2);
        Self { width, this_err, next_err }
    }

    /// Propagate a pixel's error with the Floyd–Steinberg kernel.
    #[inline]
    fn propagate(&mut self, i: usize, err: [f32; 3]) {
        arr_mul_add_assign(&mut self.this_err[i + 2], 7.0 / 16.0, err);
        arr_mul_add_assign(&mut self.next_err[i], 3.0 / 16.0, err);
        arr_mul_add_assign(&mut self.next_err[i + 1], 5.0 / 16.0, err);
        arr_mul_add_assign(&mut self.next_err[i + 2], 1.0 / 16.0, err);
    }

    /// Apply the accumulated error to this pixel.
    #[inline]
    fn apply(&self, i: usize, point: &mut [f32; 3]) {
        let err = self.this_err[i + 1];
        for c in 0..3 {
            point[c] += err[c];
        }
    }

    /// Swap and clear the error buffers for the next row of pixels.
    fn next_row(&mut self) {
        std::mem::swap(&mut self.this_err, &mut self.next_err);
        self.next_err.fill([0.0; 3]);
    }
}

impl FloydSteinberg {
    /// Replaces every pixel's RGB with its nearest palette color,
    /// diffusing the quantization error to neighboring pixels.
    ///
    /// The raster is processed in a single row-major forward pass. Like
    /// [`remap`], all pixels are remapped regardless of alpha and the alpha
    /// channel is never changed. Does nothing if the palette is empty.
    pub fn remap(&self, raster: &mut Raster, palette: &[Srgb<u8>]) {
        let &FloydSteinberg(diffusion) = self;

        if palette.is_empty() || raster.pixels().is_empty() {
            return;
        }

        let width = raster.width() as usize;
        let palette_f = palette_components(palette);
        let mut buf = ErrorBuf::new_buf(width);
        let mut error = ErrorBuf::new(width, &mut buf);

        for row in raster.pixels_mut().chunks_exact_mut(width) {
            for (i, pixel) in row.iter_mut().enumerate() {
                let mut point = components(*pixel);
                error.apply(i, &mut point);

                let nearest = nearest(&palette_f, point);
                write_quantized(pixel, palette[nearest]);

                let err = array::from_fn(|c| diffusion * (point[c] - palette_f[nearest][c]));
                error.propagate(i, err);
            }
            error.next_row();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;
    use crate::Raster;

    #[test]
    fn nearest_breaks_ties_by_palette_order() {
        let palette = [[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [0.0, 0.0, 0.0]];
        // equidistant between entries 0 and 1; entry 2 duplicates entry 0
        assert_eq!(nearest(&palette, [5.0, 0.0, 0.0]), 0);
        assert_eq!(nearest(&palette, [5.1, 0.0, 0.0]), 1);
    }

    #[test]
    fn interior_error_is_fully_distributed() {
        let width = 3;
        let mut buf = ErrorBuf::new_buf(width);
        let mut error = ErrorBuf::new(width, &mut buf);

        error.propagate(1, [16.0, 32.0, -16.0]);

        assert_eq!(error.this_err[3], [7.0, 14.0, -7.0]);
        assert_eq!(error.next_err[1], [3.0, 6.0, -3.0]);
        assert_eq!(error.next_err[2], [5.0, 10.0, -5.0]);
        assert_eq!(error.next_err[3], [1.0, 2.0, -1.0]);

        // 7/16 + 3/16 + 5/16 + 1/16 of the residual, nothing more
        let total: f32 = error.this_err[3][0]
            + error.next_err[1][0]
            + error.next_err[2][0]
            + error.next_err[3][0];
        assert_eq!(total, 16.0);
    }

    #[test]
    fn edge_error_lands_in_padding() {
        let width = 2;
        let mut buf = ErrorBuf::new_buf(width);
        let mut error = ErrorBuf::new(width, &mut buf);

        // last pixel of the row: right and down-right fall off the raster
        error.propagate(width - 1, [16.0, 16.0, 16.0]);
        assert_eq!(error.this_err[width + 1], [7.0, 7.0, 7.0]);
        assert_eq!(error.next_err[width + 1], [1.0, 1.0, 1.0]);

        // the padding cells are never applied to a pixel and are cleared
        // once their row is left behind
        error.next_row();
        assert_eq!(error.this_err[width + 1], [1.0, 1.0, 1.0]);
        assert!(error.next_err.iter().all(|&e| e == [0.0; 3]));
        error.next_row();
        assert!(error.this_err.iter().all(|&e| e == [0.0; 3]));
        assert!(error.next_err.iter().all(|&e| e == [0.0; 3]));
    }

    #[test]
    fn output_pixels_come_from_the_palette() {
        let palette = test_colors(16);
        let mut raster = test_raster(32, 24);

        FloydSteinberg::new().remap(&mut raster, &palette);
        assert!(raster
            .pixels()
            .iter()
            .all(|p| palette.contains(&Srgb::new(p.red, p.green, p.blue))));

        let mut raster = test_raster(32, 24);
        remap(&mut raster, &palette);
        assert!(raster
            .pixels()
            .iter()
            .all(|p| palette.contains(&Srgb::new(p.red, p.green, p.blue))));
    }

    #[test]
    fn alpha_is_preserved() {
        let palette = test_colors(4);
        let mut pixels = test_raster(8, 8).pixels().to_vec();
        for (i, p) in pixels.iter_mut().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let alpha = (i * 11 % 256) as u8;
            *p = Srgba::new(p.red, p.green, p.blue, alpha);
        }
        #[allow(clippy::unwrap_used)]
        let original = Raster::from_pixels(8, 8, pixels).unwrap();

        let mut dithered = original.clone();
        FloydSteinberg::new().remap(&mut dithered, &palette);
        let mut plain = original.clone();
        remap(&mut plain, &palette);

        for (out, og) in dithered.pixels().iter().zip(original.pixels()) {
            assert_eq!(out.alpha, og.alpha);
        }
        for (out, og) in plain.pixels().iter().zip(original.pixels()) {
            assert_eq!(out.alpha, og.alpha);
        }
    }

    #[test]
    fn requantization_is_idempotent() {
        let palette = test_colors(8);
        let mut raster = test_raster(16, 16);
        remap(&mut raster, &palette);

        // every pixel is already an exact palette match
        let again = {
            let mut r = raster.clone();
            remap(&mut r, &palette);
            r
        };
        assert_eq!(raster, again);

        // with full diffusion the residuals are all zero, so dithering
        // an exact-match raster must not disturb it either
        let dithered = {
            let mut r = raster.clone();
            FloydSteinberg::new().remap(&mut r, &palette);
            r
        };
        assert_eq!(raster, dithered);
    }

    #[test]
    fn empty_palette_is_a_no_op() {
        let original = test_raster(6, 6);
        let mut raster = original.clone();
        remap(&mut raster, &[]);
        FloydSteinberg::new().remap(&mut raster, &[]);
        assert_eq!(raster, original);
    }

    #[test]
    fn single_row_and_column_rasters() {
        let palette = test_colors(4);
        let ditherer = FloydSteinberg::new();

        let mut row = test_raster(16, 1);
        ditherer.remap(&mut row, &palette);
        let mut column = test_raster(1, 16);
        ditherer.remap(&mut column, &palette);
        let mut single = test_raster(1, 1);
        ditherer.remap(&mut single, &palette);

        assert!(row
            .pixels()
            .iter()
            .chain(column.pixels())
            .chain(single.pixels())
            .all(|p| palette.contains(&Srgb::new(p.red, p.green, p.blue))));
    }

    #[test]
    fn dithering_spreads_error_on_gradients() {
        // a flat mid-gray against a black/white palette: plain remap collapses
        // to a single color, dithering alternates to approximate the tone
        let palette = [Srgb::new(0, 0, 0), Srgb::new(255, 255, 255)];
        let source = solid_raster(8, 8, Srgba::new(128, 128, 128, 255));

        let mut plain = source.clone();
        remap(&mut plain, &palette);
        let first = plain.pixel(0, 0);
        assert!(plain.pixels().iter().all(|&p| p == first));

        let mut dithered = source;
        FloydSteinberg::new().remap(&mut dithered, &palette);
        let blacks = dithered.pixels().iter().filter(|p| p.red == 0).count();
        let whites = dithered.pixels().iter().filter(|p| p.red == 255).count();
        assert_eq!(blacks + whites, 64);
        assert!(blacks > 0 && whites > 0);
    }
}
