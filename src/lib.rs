//! # hanover-flipdot
//!
//! Controller for Hanover flip-dot signs on a shared serial bus.
//!
//! Signs are registered by name with a bus address, a panel size and an
//! orientation. Images are monochrome [`PixelGrid`]s that get packed into
//! column-major bitmaps, hex-encoded and framed with a checksum before they
//! are written to the port.
//!
//! ## Architecture
//!
//! - **Grid / codec**: pixel buffer and the column-major bitmap packing
//! - **Protocol**: STX/ETX framing, command codes, checksum
//! - **Sign**: per-sign descriptors and the name registry
//! - **Controller**: write-then-read exchanges over any async byte stream
//!
//! ## Example
//!
//! ```
//! use hanover_flipdot::transport::MemoryPort;
//! use hanover_flipdot::HanoverController;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> hanover_flipdot::Result<()> {
//! # let port = MemoryPort::new()
//! #     .with_reply(hanover_flipdot::transport::Reply::Eof)
//! #     .with_reply(hanover_flipdot::transport::Reply::Eof);
//! let mut controller = HanoverController::<MemoryPort>::builder()
//!     .sign("front", 1, 86, 7, false)
//!     .build(port)?;
//!
//! controller.start_test_signs().await?;
//!
//! let mut image = controller.create_image("front")?;
//! image.set(3, 2, true);
//! controller.draw("front", &image).await?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod grid;
pub mod protocol;
pub mod sign;
pub mod transport;

mod controller;

pub use config::{ControllerConfig, SignConfig};
pub use controller::{ControllerBuilder, ExchangeOutcome, HanoverController};
pub use error::{FlipdotError, Result};
pub use grid::PixelGrid;
pub use sign::{Orientation, SignDescriptor, SignRegistry};
