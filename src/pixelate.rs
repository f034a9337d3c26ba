//! Contains the block pixelation (downsampling) and nearest-neighbor upscaling steps.

use crate::{BlockSize, Raster};
use palette::Srgba;

/// Returns the dimensions of the working raster produced by [`pixelate`]
/// for a source of the given dimensions:
/// `max(1, floor(dim / block_size))` per axis.
#[must_use]
pub fn working_dimensions(width: u32, height: u32, block_size: BlockSize) -> (u32, u32) {
    let size = block_size.into_inner();
    ((width / size).max(1), (height / size).max(1))
}

/// Downsamples the source raster into a working raster where each pixel is
/// the box-filtered average of its source block.
///
/// The working raster is `max(1, floor(width / block_size))` by
/// `max(1, floor(height / block_size))` pixels. Block edges are mapped
/// proportionally so the blocks tile the entire source; all four channels
/// are averaged with rounding.
#[must_use]
pub fn pixelate(source: &Raster, block_size: BlockSize) -> Raster {
    let (width, height) = (source.width(), source.height());
    let (out_width, out_height) = working_dimensions(width, height, block_size);

    if source.pixels().is_empty() {
        return Raster::new(out_width, out_height);
    }

    let mut pixels = Vec::with_capacity(out_width as usize * out_height as usize);
    for by in 0..out_height {
        let y0 = block_edge(by, height, out_height);
        let y1 = block_edge(by + 1, height, out_height);
        for bx in 0..out_width {
            let x0 = block_edge(bx, width, out_width);
            let x1 = block_edge(bx + 1, width, out_width);
            pixels.push(box_average(source, x0..x1, y0..y1));
        }
    }

    #[allow(clippy::expect_used)]
    {
        // one pixel was pushed per working-raster coordinate
        Raster::from_pixels(out_width, out_height, pixels).expect("matching buffer")
    }
}

/// Maps a working-raster coordinate to the source coordinate where its block starts.
#[allow(clippy::cast_possible_truncation)]
fn block_edge(block: u32, source_dim: u32, out_dim: u32) -> u32 {
    (u64::from(block) * u64::from(source_dim) / u64::from(out_dim)) as u32
}

/// Averages all four channels of the source pixels in the given block.
#[allow(clippy::cast_possible_truncation)]
fn box_average(
    source: &Raster,
    xs: std::ops::Range<u32>,
    ys: std::ops::Range<u32>,
) -> Srgba<u8> {
    let mut sums = [0u64; 4];
    for y in ys.clone() {
        for x in xs.clone() {
            let p = source.pixel(x, y);
            sums[0] += u64::from(p.red);
            sums[1] += u64::from(p.green);
            sums[2] += u64::from(p.blue);
            sums[3] += u64::from(p.alpha);
        }
    }

    let count = u64::from(xs.end - xs.start) * u64::from(ys.end - ys.start);
    let [r, g, b, a] = sums.map(|sum| ((sum + count / 2) / count) as u8);
    Srgba::new(r, g, b, a)
}

/// Magnifies the working raster back to the given dimensions using
/// nearest-neighbor sampling, keeping block edges crisp.
#[must_use]
pub fn upscale(working: &Raster, width: u32, height: u32) -> Raster {
    let (in_width, in_height) = (working.width(), working.height());
    if in_width == 0 || in_height == 0 {
        return Raster::new(width, height);
    }

    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        let sy = nearest_source(y, in_height, height);
        for x in 0..width {
            let sx = nearest_source(x, in_width, width);
            pixels.push(working.pixel(sx, sy));
        }
    }

    #[allow(clippy::expect_used)]
    {
        // one pixel was pushed per output coordinate
        Raster::from_pixels(width, height, pixels).expect("matching buffer")
    }
}

/// Maps an output coordinate back to the working-raster coordinate it samples.
#[allow(clippy::cast_possible_truncation)]
fn nearest_source(out: u32, source_dim: u32, out_dim: u32) -> u32 {
    (u64::from(out) * u64::from(source_dim) / u64::from(out_dim)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;
    use palette::Srgba;

    #[test]
    fn working_dimension_formula() {
        for (w, h, s, expected) in [
            (100, 60, 1, (100, 60)),
            (100, 60, 7, (14, 8)),
            (100, 60, 60, (1, 1)),
            (100, 60, 1000, (1, 1)),
            (5, 11, 2, (2, 5)),
        ] {
            #[allow(clippy::unwrap_used)]
            let block_size = BlockSize::try_from(s).unwrap();
            assert_eq!(working_dimensions(w, h, block_size), expected);
            let working = pixelate(&test_raster(w, h), block_size);
            assert_eq!((working.width(), working.height()), expected);
        }
    }

    #[test]
    fn oversized_block_on_tiny_raster() {
        let source = solid_raster(1, 1, Srgba::new(9, 8, 7, 255));
        #[allow(clippy::unwrap_used)]
        let working = pixelate(&source, BlockSize::try_from(5).unwrap());
        assert_eq!((working.width(), working.height()), (1, 1));
        assert_eq!(working.pixel(0, 0), Srgba::new(9, 8, 7, 255));
    }

    #[test]
    fn block_size_one_is_identity() {
        let source = test_raster(13, 7);
        assert_eq!(pixelate(&source, BlockSize::ONE), source);
    }

    #[test]
    fn solid_input_stays_solid() {
        let source = solid_raster(16, 16, Srgba::new(50, 100, 150, 200));
        #[allow(clippy::unwrap_used)]
        let working = pixelate(&source, BlockSize::try_from(4).unwrap());
        assert!(working
            .pixels()
            .iter()
            .all(|&p| p == Srgba::new(50, 100, 150, 200)));
    }

    #[test]
    fn averages_within_blocks() {
        // 2x2 source collapsed into one pixel
        #[allow(clippy::unwrap_used)]
        let source = crate::Raster::from_pixels(
            2,
            2,
            vec![
                Srgba::new(0, 0, 0, 255),
                Srgba::new(255, 0, 0, 255),
                Srgba::new(0, 255, 0, 255),
                Srgba::new(0, 0, 255, 255),
            ],
        )
        .unwrap();
        #[allow(clippy::unwrap_used)]
        let working = pixelate(&source, BlockSize::try_from(2).unwrap());
        // each channel sums to 255 over 4 pixels, so rounds to 64
        assert_eq!(working.pixel(0, 0), Srgba::new(64, 64, 64, 255));
    }

    #[test]
    fn upscale_repeats_blocks() {
        #[allow(clippy::unwrap_used)]
        let working = crate::Raster::from_pixels(
            2,
            1,
            vec![Srgba::new(255, 0, 0, 255), Srgba::new(0, 0, 255, 255)],
        )
        .unwrap();
        let out = upscale(&working, 4, 2);
        assert_eq!((out.width(), out.height()), (4, 2));
        for y in 0..2 {
            assert_eq!(out.pixel(0, y), Srgba::new(255, 0, 0, 255));
            assert_eq!(out.pixel(1, y), Srgba::new(255, 0, 0, 255));
            assert_eq!(out.pixel(2, y), Srgba::new(0, 0, 255, 255));
            assert_eq!(out.pixel(3, y), Srgba::new(0, 0, 255, 255));
        }
    }

    #[test]
    fn upscale_uses_only_working_pixels() {
        let working = test_raster(3, 3);
        let out = upscale(&working, 10, 10);
        for y in 0..10 {
            for x in 0..10 {
                assert!(working.pixels().contains(&out.pixel(x, y)));
            }
        }
    }
}
