//! Contains the validated parameter types and error types used across the crate.

use crate::MAX_COLORS;
use std::{error::Error, fmt::Display};

/// An error type for parameter values that are rejected before any processing begins.
///
/// Both the block size and the palette size must be at least `1`,
/// and the palette size must not exceed [`MAX_COLORS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidParameter {
    /// A block size of `0` was given.
    ZeroBlockSize,
    /// A palette size of `0` was given.
    ZeroPaletteSize,
    /// A palette size above [`MAX_COLORS`] was given.
    AboveMaxColors,
}

impl Display for InvalidParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroBlockSize => write!(f, "block size must be at least 1"),
            Self::ZeroPaletteSize => write!(f, "palette size must be at least 1"),
            Self::AboveMaxColors => {
                write!(f, "above the maximum palette size of {MAX_COLORS}")
            }
        }
    }
}

impl Error for InvalidParameter {}

/// An error type for when a pixel or byte buffer does not match
/// the raster dimensions it was given alongside.
///
/// This indicates a caller contract violation and is reported
/// before any processing takes place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionMismatch {
    /// The buffer length implied by the given width and height.
    pub expected: usize,
    /// The actual buffer length.
    pub actual: usize,
}

impl Display for DimensionMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "expected a buffer of {} elements but got {}",
            self.expected, self.actual
        )
    }
}

impl Error for DimensionMismatch {}

/// An error type for when an image has no opaque pixels,
/// so no palette can be derived from it.
///
/// The high-level pipeline handles this case by returning a fully
/// transparent raster with the dimensions of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyPalette;

impl Display for EmptyPalette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "the image has no opaque pixels to build a palette from")
    }
}

impl Error for EmptyPalette {}

/// The edge length, in source pixels, of each square block that is
/// collapsed into a single working-raster pixel.
///
/// This is a simple new type wrapper around `u32` with the invariant
/// that it must be at least `1`.
///
/// # Examples
/// Use `try_into` or [`BlockSize::try_from`] to create [`BlockSize`]s:
/// ```
/// # use eightbit::{BlockSize, InvalidParameter};
/// # fn main() -> Result<(), InvalidParameter> {
/// let size = BlockSize::try_from(8)?;
/// let size: BlockSize = 8.try_into()?;
/// assert!(BlockSize::try_from(0).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct BlockSize(u32);

impl BlockSize {
    /// A block size of `1`, which leaves the raster dimensions unchanged.
    pub const ONE: Self = Self(1);

    /// Gets the inner `u32` value.
    #[must_use]
    pub const fn into_inner(self) -> u32 {
        self.0
    }
}

impl Default for BlockSize {
    fn default() -> Self {
        Self(8)
    }
}

impl From<BlockSize> for u32 {
    fn from(val: BlockSize) -> Self {
        val.into_inner()
    }
}

impl TryFrom<u32> for BlockSize {
    type Error = InvalidParameter;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if value == 0 {
            Err(InvalidParameter::ZeroBlockSize)
        } else {
            Ok(Self(value))
        }
    }
}

impl Display for BlockSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.into_inner())
    }
}

/// The number of colors to derive for the palette.
///
/// This is a simple new type wrapper around `u16` with the invariant that it
/// must be in the range `1..=MAX_COLORS`.
///
/// The derived palette can end up with fewer colors than this only when the
/// image has fewer opaque pixels than the requested size.
///
/// # Examples
/// Use `try_into`, [`PaletteSize::try_from`], or [`PaletteSize::from_clamped`]
/// to create [`PaletteSize`]s:
/// ```
/// # use eightbit::{PaletteSize, InvalidParameter};
/// # fn main() -> Result<(), InvalidParameter> {
/// let size = PaletteSize::try_from(128)?;
/// let size: PaletteSize = 128.try_into()?;
/// let size = PaletteSize::from_clamped(1024);
/// assert!(PaletteSize::try_from(0).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PaletteSize(u16);

impl PaletteSize {
    /// The maximum supported palette size (given by [`MAX_COLORS`]).
    pub const MAX: Self = Self(MAX_COLORS);

    /// Gets the inner `u16` value.
    #[must_use]
    pub const fn into_inner(self) -> u16 {
        self.0
    }

    /// Creates a [`PaletteSize`] by clamping the given `u16` into the range `1..=MAX_COLORS`.
    #[must_use]
    pub const fn from_clamped(value: u16) -> Self {
        if value == 0 {
            Self(1)
        } else if value <= MAX_COLORS {
            Self(value)
        } else {
            Self(MAX_COLORS)
        }
    }
}

impl Default for PaletteSize {
    fn default() -> Self {
        Self(16)
    }
}

impl From<PaletteSize> for u16 {
    fn from(val: PaletteSize) -> Self {
        val.into_inner()
    }
}

impl TryFrom<u16> for PaletteSize {
    type Error = InvalidParameter;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Err(InvalidParameter::ZeroPaletteSize),
            1..=MAX_COLORS => Ok(Self(value)),
            _ => Err(InvalidParameter::AboveMaxColors),
        }
    }
}

impl Display for PaletteSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.into_inner())
    }
}
