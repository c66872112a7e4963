//! Wire format constants and checksum.
//!
//! Every frame has the shape:
//! ```text
//! ┌─────┬──────────────┬──────────┬─────┬──────────┐
//! │ STX │ Command      │ Payload  │ ETX │ Checksum │
//! │ 0x02│ code + addr  │ optional │ 0x03│ 2 hex    │
//! └─────┴──────────────┴──────────┴─────┴──────────┘
//! ```
//!
//! The checksum is the two's complement of the byte sum of everything after
//! STX up to and including ETX, rendered as two uppercase ASCII-hex digits.

/// Start-of-frame marker.
pub const STX: u8 = 0x02;

/// End-of-frame marker.
pub const ETX: u8 = 0x03;

/// Length of the ASCII-hex checksum trailer.
pub const CHECKSUM_LEN: usize = 2;

/// Address used by commands addressed to every sign on the bus.
pub const BROADCAST_ADDRESS: u8 = 0;

/// Length of the little-endian image length field in an image payload.
pub const IMAGE_LENGTH_FIELD: usize = 2;

/// Largest image payload the length field can describe.
pub const MAX_IMAGE_LEN: usize = u16::MAX as usize;

/// Command codes (first character of the command field).
pub mod command {
    /// Start the built-in test sequence on all signs.
    pub const START_TEST_SIGNS: u8 = b'3';
    /// Stop the built-in test sequence on all signs.
    pub const STOP_TEST_SIGNS: u8 = b'C';
    /// Write an image to one sign.
    pub const WRITE_IMAGE: u8 = b'1';
}

/// Compute the checksum over `body` (the bytes after STX, through ETX).
///
/// # Example
///
/// ```
/// use hanover_flipdot::protocol::checksum;
///
/// assert_eq!(checksum(b"30\x03"), 0x9A);
/// assert_eq!(checksum(b"C0\x03"), 0x8A);
/// ```
#[inline]
pub fn checksum(body: &[u8]) -> u8 {
    let sum = body.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    (!sum).wrapping_add(1)
}

/// Render a checksum as two uppercase ASCII-hex digits.
#[inline]
pub fn checksum_hex(value: u8) -> [u8; CHECKSUM_LEN] {
    let digits = hex::encode_upper([value]);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(digits.as_bytes());
    out
}

/// Check that a complete frame ends with the checksum of its body.
///
/// Returns `false` for anything too short to be a frame or not starting
/// with STX.
pub fn verify_checksum(frame: &[u8]) -> bool {
    if frame.len() < 1 + 1 + CHECKSUM_LEN || frame[0] != STX {
        return false;
    }
    let body_end = frame.len() - CHECKSUM_LEN;
    let body = &frame[1..body_end];
    body.last() == Some(&ETX) && checksum_hex(checksum(body)) == frame[body_end..]
}
