//! Per-sign facts and image preparation.
//!
//! A [`SignDescriptor`] knows a sign's bus address, panel size and mounting
//! orientation. It validates images against that size and turns them into
//! ready-to-send image frames.
//!
//! # Example
//!
//! ```
//! use hanover_flipdot::{Orientation, SignDescriptor};
//!
//! let sign = SignDescriptor::new(1, 86, 7, Orientation::Upright).unwrap();
//! let image = sign.create_image();
//!
//! let frame = sign.to_frame(Some(&image)).unwrap();
//! assert_eq!(frame[0], 0x02);
//! ```

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::codec::BitmapCodec;
use crate::error::{FlipdotError, Result};
use crate::grid::PixelGrid;
use crate::protocol::{Frame, MAX_IMAGE_LEN};

/// How a panel is physically mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Logical top-left is the panel's top-left.
    #[default]
    Upright,
    /// Panel is mounted upside-down; images are rotated 180° before sending.
    Inverted,
}

impl Orientation {
    #[inline]
    pub fn is_flipped(self) -> bool {
        self == Self::Inverted
    }
}

impl From<bool> for Orientation {
    fn from(flip: bool) -> Self {
        if flip {
            Self::Inverted
        } else {
            Self::Upright
        }
    }
}

/// Immutable description of one sign on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignDescriptor {
    address: u8,
    width: usize,
    height: usize,
    orientation: Orientation,
}

impl SignDescriptor {
    /// Create a descriptor.
    ///
    /// Fails with `InvalidDescriptor` if either dimension is zero or the
    /// encoded image would not fit the frame's 16-bit length field.
    pub fn new(address: u8, width: usize, height: usize, orientation: Orientation) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(FlipdotError::InvalidDescriptor(format!(
                "width and height must be positive, got {}x{}",
                width, height
            )));
        }

        let fits = width
            .checked_mul(BitmapCodec::bytes_per_column(height))
            .is_some_and(|len| len <= MAX_IMAGE_LEN);
        if !fits {
            return Err(FlipdotError::InvalidDescriptor(format!(
                "a {}x{} image exceeds the maximum frame size",
                width, height
            )));
        }

        Ok(Self {
            address,
            width,
            height,
            orientation,
        })
    }

    #[inline]
    pub fn address(&self) -> u8 {
        self.address
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Encoded image size in bytes.
    #[inline]
    pub fn image_len(&self) -> usize {
        BitmapCodec::encoded_len(self.width, self.height)
    }

    /// Blank image matching this sign's size.
    pub fn create_image(&self) -> PixelGrid {
        PixelGrid::new(self.width, self.height)
    }

    /// Check that an image was supplied and matches the sign size.
    ///
    /// Returns the image itself on success.
    pub fn validate<'a>(&self, image: Option<&'a PixelGrid>) -> Result<&'a PixelGrid> {
        let image = image.ok_or(FlipdotError::MissingImage)?;
        if image.dimensions() != (self.width, self.height) {
            return Err(FlipdotError::DimensionMismatch {
                expected_width: self.width,
                expected_height: self.height,
                actual_width: image.width(),
                actual_height: image.height(),
            });
        }
        Ok(image)
    }

    /// Apply the mounting orientation.
    ///
    /// Upright signs get the image back borrowed and untouched; inverted
    /// signs get an owned, rotated copy.
    pub fn orient<'a>(&self, image: &'a PixelGrid) -> Cow<'a, PixelGrid> {
        match self.orientation {
            Orientation::Upright => Cow::Borrowed(image),
            Orientation::Inverted => Cow::Owned(image.rotated_180()),
        }
    }

    /// Validate, orient, encode and frame an image for this sign.
    pub fn to_frame(&self, image: Option<&PixelGrid>) -> Result<Vec<u8>> {
        let image = self.validate(image)?;
        let oriented = self.orient(image);
        let encoded = BitmapCodec::encode(&oriented, self.width, self.height, false)?;
        Ok(Frame::write_image(self.address, &encoded)?.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{verify_checksum, ETX, STX};

    #[test]
    fn test_new_valid() {
        let sign = SignDescriptor::new(1, 86, 7, Orientation::Upright).unwrap();
        assert_eq!(sign.address(), 1);
        assert_eq!(sign.width(), 86);
        assert_eq!(sign.height(), 7);
        assert_eq!(sign.orientation(), Orientation::Upright);
        assert_eq!(sign.image_len(), 86);
    }

    #[test]
    fn test_new_large_inverted() {
        let sign = SignDescriptor::new(2, 200, 50, Orientation::Inverted).unwrap();
        assert!(sign.orientation().is_flipped());
        assert_eq!(sign.image_len(), 200 * 7);
    }

    #[test]
    fn test_new_rejects_zero_dimensions() {
        for (w, h) in [(0, 7), (86, 0), (0, 0)] {
            let err = SignDescriptor::new(1, w, h, Orientation::Upright).unwrap_err();
            assert!(matches!(err, FlipdotError::InvalidDescriptor(_)));
        }
    }

    #[test]
    fn test_new_rejects_oversized_image() {
        let err = SignDescriptor::new(1, 70_000, 8, Orientation::Upright).unwrap_err();
        assert!(matches!(err, FlipdotError::InvalidDescriptor(_)));

        let err = SignDescriptor::new(1, usize::MAX, 16, Orientation::Upright).unwrap_err();
        assert!(matches!(err, FlipdotError::InvalidDescriptor(_)));
    }

    #[test]
    fn test_orientation_from_bool() {
        assert_eq!(Orientation::from(true), Orientation::Inverted);
        assert_eq!(Orientation::from(false), Orientation::Upright);
        assert_eq!(Orientation::default(), Orientation::Upright);
    }

    #[test]
    fn test_create_image() {
        for (w, h) in [(10, 5), (86, 7), (200, 50)] {
            let sign = SignDescriptor::new(1, w, h, Orientation::Upright).unwrap();
            let image = sign.create_image();
            assert_eq!(image.dimensions(), (w, h));
            assert_eq!(image.lit_count(), 0);
        }
    }

    #[test]
    fn test_validate() {
        let sign = SignDescriptor::new(1, 86, 7, Orientation::Upright).unwrap();

        assert!(sign.validate(Some(&PixelGrid::new(86, 7))).is_ok());
        assert!(matches!(
            sign.validate(None),
            Err(FlipdotError::MissingImage)
        ));
        assert!(matches!(
            sign.validate(Some(&PixelGrid::new(100, 7))),
            Err(FlipdotError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            sign.validate(Some(&PixelGrid::new(86, 10))),
            Err(FlipdotError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_orient_upright_borrows() {
        let sign = SignDescriptor::new(1, 86, 7, Orientation::Upright).unwrap();
        let mut image = sign.create_image();
        image.set(0, 0, true);

        let oriented = sign.orient(&image);
        assert!(matches!(oriented, Cow::Borrowed(_)));
        assert!(oriented.is_lit(0, 0));
    }

    #[test]
    fn test_orient_inverted_rotates_copy() {
        let sign = SignDescriptor::new(1, 86, 7, Orientation::Inverted).unwrap();
        let mut image = sign.create_image();
        image.set(0, 0, true);
        image.set_level(85, 6, 0);

        let oriented = sign.orient(&image);
        assert!(matches!(oriented, Cow::Owned(_)));
        assert!(oriented.is_lit(85, 6));
        assert!(!oriented.is_lit(0, 0));

        // Original untouched
        assert!(image.is_lit(0, 0));
    }

    #[test]
    fn test_to_frame_blank_8x8() {
        let sign = SignDescriptor::new(1, 8, 8, Orientation::Upright).unwrap();
        let frame = sign.to_frame(Some(&sign.create_image())).unwrap();

        assert_eq!(frame.len(), 24);
        assert_eq!(frame[0], STX);
        assert_eq!(&frame[1..3], b"11");
        assert_eq!(&frame[5..21], b"0000000000000000");
        assert_eq!(frame[21], ETX);
        assert!(verify_checksum(&frame));
    }

    #[test]
    fn test_to_frame_inverted_pixel() {
        let sign = SignDescriptor::new(1, 8, 8, Orientation::Inverted).unwrap();
        let mut image = sign.create_image();
        image.set(0, 0, true);

        let frame = sign.to_frame(Some(&image)).unwrap();
        // Column 7, vertical index 0 -> last image byte is 0x01
        assert_eq!(&frame[5..21], b"0000000000000001");
    }

    #[test]
    fn test_to_frame_propagates_errors() {
        let sign = SignDescriptor::new(1, 8, 8, Orientation::Upright).unwrap();
        assert!(matches!(
            sign.to_frame(None),
            Err(FlipdotError::MissingImage)
        ));
        assert!(matches!(
            sign.to_frame(Some(&PixelGrid::new(8, 7))),
            Err(FlipdotError::DimensionMismatch { .. })
        ));
    }
}
