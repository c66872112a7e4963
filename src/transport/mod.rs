//! Transport module - the byte stream signs are reached through.
//!
//! The controller only needs a duplex async byte stream. Anything that
//! implements tokio's `AsyncRead + AsyncWrite` works as a [`SignPort`]: a
//! serial port stream, a `tokio::io::DuplexStream`, a TCP connection to a
//! serial bridge, or the scripted [`MemoryPort`].
//!
//! Opening and configuring the physical line is left to the caller. Hanover
//! signs expect [`BAUD_RATE`] baud, [`DATA_BITS`] data bits, no parity and
//! [`STOP_BITS`] stop bit.

mod memory;

pub use memory::{MemoryPort, MemoryPortHandle, Reply};

use tokio::io::{AsyncRead, AsyncWrite};

/// Line speed of the sign bus.
pub const BAUD_RATE: u32 = 4800;

/// Data bits per character.
pub const DATA_BITS: u8 = 8;

/// Stop bits per character.
pub const STOP_BITS: u8 = 1;

/// A duplex byte stream a controller can own.
///
/// Blanket-implemented for every `AsyncRead + AsyncWrite + Send + Unpin + 'static` type.
pub trait SignPort: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

impl<T> SignPort for T where T: AsyncRead + AsyncWrite + Send + Unpin + 'static {}
