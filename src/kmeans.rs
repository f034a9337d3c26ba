//! Palette derivation via k-means clustering.
//!
//! The palette is built from the working raster's opaque pixels only
//! (alpha above [`OPAQUE_ALPHA_THRESHOLD`]). Centroids are seeded
//! deterministically from the first pixels in scan order and refined for a
//! fixed number of Lloyd iterations with no convergence check, so identical
//! inputs and seeds always produce identical palettes. A cluster that loses
//! all of its members is re-seeded with a pixel drawn uniformly at random
//! from the full collected set, which is the only place randomness enters;
//! the random number generator is seeded from an explicit `u64`.

use crate::{dither::nearest, EmptyPalette, PaletteSize, Raster};
use palette::Srgb;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoroshiro128PlusPlus;

/// Pixels must have an alpha value above this to count as opaque and
/// participate in palette building.
pub const OPAQUE_ALPHA_THRESHOLD: u8 = 128;

/// The fixed number of k-means iterations to run.
pub const ITERATIONS: u32 = 10;

/// Derives a palette of (at most) `k` colors from the raster's opaque pixels.
///
/// The returned palette has exactly `k` entries whenever the raster has at
/// least `k` opaque pixels; otherwise one entry per opaque pixel. Entries are
/// not guaranteed to be unique, since distinct clusters can converge.
///
/// `seed` drives the re-seeding of clusters that end an iteration empty and
/// has no other effect; re-running with the same raster, `k`, and `seed`
/// gives the same palette.
///
/// # Errors
/// Returns [`EmptyPalette`] if the raster has no opaque pixels.
pub fn palette(
    raster: &Raster,
    k: PaletteSize,
    seed: u64,
) -> Result<Vec<Srgb<u8>>, EmptyPalette> {
    let pixels = raster
        .pixels()
        .iter()
        .filter(|p| p.alpha > OPAQUE_ALPHA_THRESHOLD)
        .map(|p| [f32::from(p.red), f32::from(p.green), f32::from(p.blue)])
        .collect::<Vec<_>>();

    if pixels.is_empty() {
        return Err(EmptyPalette);
    }

    let k = usize::from(k.into_inner()).min(pixels.len());
    let mut centroids = pixels[..k].to_vec();
    let mut rng = Xoroshiro128PlusPlus::seed_from_u64(seed);

    let mut assignments = vec![0usize; pixels.len()];
    let mut sums = vec![[0.0f64; 3]; k];
    let mut counts = vec![0u32; k];

    for _ in 0..ITERATIONS {
        for (assignment, &pixel) in assignments.iter_mut().zip(&pixels) {
            *assignment = nearest(&centroids, pixel);
        }

        sums.fill([0.0; 3]);
        counts.fill(0);
        for (&assignment, pixel) in assignments.iter().zip(&pixels) {
            let sum = &mut sums[assignment];
            for (s, &c) in sum.iter_mut().zip(pixel) {
                *s += f64::from(c);
            }
            counts[assignment] += 1;
        }

        for ((centroid, sum), &count) in centroids.iter_mut().zip(&sums).zip(&counts) {
            if count == 0 {
                *centroid = pixels[rng.gen_range(0..pixels.len())];
            } else {
                #[allow(clippy::cast_possible_truncation)]
                {
                    *centroid = sum.map(|s| (s / f64::from(count)) as f32);
                }
            }
        }
    }

    Ok(centroids
        .into_iter()
        .map(|centroid| {
            let [r, g, b] = centroid.map(round_channel);
            Srgb::new(r, g, b)
        })
        .collect())
}

/// Rounds a centroid channel to the nearest integer and clamps it to `0..=255`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
