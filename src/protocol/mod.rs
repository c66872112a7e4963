//! Protocol module - wire format, checksum and frame building.
//!
//! This module implements the Hanover framing:
//! - STX / ETX delimited frames with an ASCII-hex checksum trailer
//! - Broadcast test commands and addressed image frames
//!
//! Devices are write-mostly, so there is no decoder: response bytes are only
//! observed by the controller, never parsed.

mod frame;
mod wire_format;

pub use frame::{build_frame, image_payload, CommandKind, Frame};
pub use wire_format::{
    checksum, checksum_hex, command, verify_checksum, BROADCAST_ADDRESS, CHECKSUM_LEN, ETX,
    IMAGE_LENGTH_FIELD, MAX_IMAGE_LEN, STX,
};
