//! Monochrome pixel grid.
//!
//! Samples are stored as 8-bit luminance so gray or anti-aliased input can be
//! drawn directly; a pixel counts as lit when it is brighter than the
//! midpoint of the sample range.
//!
//! # Example
//!
//! ```
//! use hanover_flipdot::PixelGrid;
//!
//! let mut grid = PixelGrid::new(4, 3);
//! grid.set(1, 2, true);
//! assert!(grid.is_lit(1, 2));
//!
//! let rotated = grid.rotated_180();
//! assert!(rotated.is_lit(2, 0));
//! assert!(grid.is_lit(1, 2)); // source untouched
//! ```

use crate::error::{FlipdotError, Result};

/// Luminance above which a sample is considered lit.
pub const LIT_THRESHOLD: u8 = 127;

/// Luminance stored for a lit pixel by [`PixelGrid::set`].
pub const ON: u8 = 0xFF;

/// Luminance stored for a dark pixel by [`PixelGrid::set`].
pub const OFF: u8 = 0x00;

/// Rectangular grid of luminance samples, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl PixelGrid {
    /// Create a blank (all dark) grid.
    ///
    /// # Panics
    ///
    /// Panics if `width * height` overflows `usize`.
    pub fn new(width: usize, height: usize) -> Self {
        let len = width
            .checked_mul(height)
            .expect("grid dimensions overflow usize");
        Self {
            width,
            height,
            pixels: vec![OFF; len],
        }
    }

    /// Wrap an existing row-major luminance buffer.
    ///
    /// Fails with `DimensionMismatch` if the buffer is not `width * height` long,
    /// or `InvalidImage` if that product overflows.
    pub fn from_luma(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self> {
        let len = width.checked_mul(height).ok_or_else(|| {
            FlipdotError::InvalidImage(format!("{}x{} grid is too large", width, height))
        })?;
        if pixels.len() != len {
            return Err(FlipdotError::DimensionMismatch {
                expected_width: width,
                expected_height: height,
                actual_width: pixels.len(),
                actual_height: 1,
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build a grid by evaluating `f(x, y)` for every pixel.
    ///
    /// Panics under the same condition as [`new`](Self::new).
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> bool,
    {
        let mut grid = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                if f(x, y) {
                    grid.pixels[y * width + x] = ON;
                }
            }
        }
        grid
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// Raw luminance at `(x, y)`, or `None` when out of range.
    pub fn level(&self, x: usize, y: usize) -> Option<u8> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Whether `(x, y)` is lit. Out-of-range pixels are dark.
    #[inline]
    pub fn is_lit(&self, x: usize, y: usize) -> bool {
        self.level(x, y).is_some_and(|l| l > LIT_THRESHOLD)
    }

    /// Turn a pixel fully on or off. Returns `false` if out of range.
    pub fn set(&mut self, x: usize, y: usize, on: bool) -> bool {
        self.set_level(x, y, if on { ON } else { OFF })
    }

    /// Store an arbitrary luminance. Returns `false` if out of range.
    pub fn set_level(&mut self, x: usize, y: usize, level: u8) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.pixels[i] = level;
                true
            }
            None => false,
        }
    }

    /// Set every pixel to the same state.
    pub fn fill(&mut self, on: bool) {
        self.pixels.fill(if on { ON } else { OFF });
    }

    /// Row-major luminance samples.
    #[inline]
    pub fn as_luma(&self) -> &[u8] {
        &self.pixels
    }

    /// Number of lit pixels.
    pub fn lit_count(&self) -> usize {
        self.pixels.iter().filter(|&&l| l > LIT_THRESHOLD).count()
    }

    /// Return a copy rotated by 180 degrees.
    ///
    /// Pixel `(x, y)` of the result holds `(width-1-x, height-1-y)` of `self`.
    pub fn rotated_180(&self) -> Self {
        let mut pixels = self.pixels.clone();
        pixels.reverse();
        Self {
            width: self.width,
            height: self.height,
            pixels,
        }
    }
}

#[cfg(feature = "image")]
impl From<&image::GrayImage> for PixelGrid {
    fn from(img: &image::GrayImage) -> Self {
        Self {
            width: img.width() as usize,
            height: img.height() as usize,
            pixels: img.as_raw().clone(),
        }
    }
}
