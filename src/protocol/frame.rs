//! Frame type and builders.
//!
//! A [`Frame`] is built, encoded and dropped; the controller never keeps one
//! around. Test commands are broadcast and always encode to the same six
//! bytes; image frames carry a little-endian length followed by the image
//! rendered as uppercase ASCII-hex.
//!
//! # Example
//!
//! ```
//! use hanover_flipdot::protocol::{Frame, verify_checksum};
//!
//! let start = Frame::start_test_signs().encode();
//! assert_eq!(start, b"\x0230\x039A");
//!
//! let image = Frame::write_image(1, &[0x00, 0xFF]).unwrap().encode();
//! assert_eq!(&image[..5], b"\x0211\x02\x00");
//! assert_eq!(&image[5..9], b"00FF");
//! assert!(verify_checksum(&image));
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use super::wire_format::{
    checksum, checksum_hex, command, BROADCAST_ADDRESS, CHECKSUM_LEN, ETX, IMAGE_LENGTH_FIELD,
    MAX_IMAGE_LEN, STX,
};
use crate::error::{FlipdotError, Result};

/// Kind of frame sent to the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Start the test sequence on every sign.
    TestStart,
    /// Stop the test sequence on every sign.
    TestStop,
    /// Write an image to one sign.
    WriteImage,
}

impl CommandKind {
    /// Command code character.
    #[inline]
    pub fn code(self) -> u8 {
        match self {
            Self::TestStart => command::START_TEST_SIGNS,
            Self::TestStop => command::STOP_TEST_SIGNS,
            Self::WriteImage => command::WRITE_IMAGE,
        }
    }

    /// Whether this command ignores the address and goes to every sign.
    #[inline]
    pub fn is_broadcast(self) -> bool {
        matches!(self, Self::TestStart | Self::TestStop)
    }
}

/// A frame ready to be encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    kind: CommandKind,
    address: u8,
    payload: Bytes,
}

impl Frame {
    /// Broadcast "start test signs" frame.
    pub fn start_test_signs() -> Self {
        Self {
            kind: CommandKind::TestStart,
            address: BROADCAST_ADDRESS,
            payload: Bytes::new(),
        }
    }

    /// Broadcast "stop test signs" frame.
    pub fn stop_test_signs() -> Self {
        Self {
            kind: CommandKind::TestStop,
            address: BROADCAST_ADDRESS,
            payload: Bytes::new(),
        }
    }

    /// Image frame for the sign at `address`.
    ///
    /// `image` is the packed output of [`BitmapCodec`](crate::codec::BitmapCodec).
    /// Fails with `InvalidImage` if the image is empty or longer than the
    /// length field allows.
    pub fn write_image(address: u8, image: &[u8]) -> Result<Self> {
        Ok(Self {
            kind: CommandKind::WriteImage,
            address,
            payload: image_payload(image)?,
        })
    }

    #[inline]
    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    #[inline]
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Payload bytes between the command field and ETX.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Command code followed by the uppercase hex digits of the address.
    pub fn command_field(&self) -> Vec<u8> {
        let mut field = vec![self.kind.code()];
        field.extend_from_slice(format!("{:X}", self.address).as_bytes());
        field
    }

    /// Encode to wire bytes, checksum included.
    pub fn encode(&self) -> Vec<u8> {
        let command_field = self.command_field();
        let mut buf = Vec::with_capacity(
            1 + command_field.len() + self.payload.len() + 1 + CHECKSUM_LEN,
        );
        buf.push(STX);
        buf.extend_from_slice(&command_field);
        buf.extend_from_slice(&self.payload);
        buf.push(ETX);

        let sum = checksum(&buf[1..]);
        buf.extend_from_slice(&checksum_hex(sum));
        buf
    }
}

/// Build the image payload: 2-byte little-endian length, then ASCII-hex image.
pub fn image_payload(image: &[u8]) -> Result<Bytes> {
    if image.is_empty() {
        return Err(FlipdotError::InvalidImage("image is empty".to_string()));
    }
    if image.len() > MAX_IMAGE_LEN {
        return Err(FlipdotError::InvalidImage(format!(
            "image of {} bytes exceeds maximum {}",
            image.len(),
            MAX_IMAGE_LEN
        )));
    }

    let mut buf = BytesMut::with_capacity(IMAGE_LENGTH_FIELD + image.len() * 2);
    buf.put_u16_le(image.len() as u16);
    buf.put_slice(hex::encode_upper(image).as_bytes());
    Ok(buf.freeze())
}

/// Build a complete frame as a single byte vector.
///
/// Test commands are broadcast, so `address` and `image` are ignored for
/// them. `WriteImage` without an image fails with `InvalidImage`.
///
/// # Example
///
/// ```
/// use hanover_flipdot::protocol::{build_frame, CommandKind};
///
/// let stop = build_frame(CommandKind::TestStop, 0, None).unwrap();
/// assert_eq!(stop, vec![0x02, b'C', b'0', 0x03, b'8', b'A']);
///
/// assert!(build_frame(CommandKind::WriteImage, 1, None).is_err());
/// ```
pub fn build_frame(kind: CommandKind, address: u8, image: Option<&[u8]>) -> Result<Vec<u8>> {
    let frame = match kind {
        CommandKind::TestStart => Frame::start_test_signs(),
        CommandKind::TestStop => Frame::stop_test_signs(),
        CommandKind::WriteImage => {
            let image = image.ok_or_else(|| {
                FlipdotError::InvalidImage("no image supplied".to_string())
            })?;
            Frame::write_image(address, image)?
        }
    };
    Ok(frame.encode())
}
