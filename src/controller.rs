//! Controller builder and exchange loop.
//!
//! The [`ControllerBuilder`] collects signs and exchange settings; the
//! [`HanoverController`] owns the port and performs exchanges:
//! 1. Build the frame (resolving and validating first for images)
//! 2. Write it in a single call; a short write fails the exchange
//! 3. Race a read for the sign's answer against the timeout
//! 4. Report what happened as an [`ExchangeOutcome`]
//!
//! The read is diagnostic only. Whether bytes arrive, the stream ends, the
//! read fails or the timeout fires, the exchange succeeds. At most one read is
//! in flight: a read that loses the race is kept and raced again by the next
//! exchange. If it finished in between, its result is a late response and is
//! dropped before a fresh read starts.
//!
//! # Example
//!
//! ```
//! use hanover_flipdot::transport::MemoryPort;
//! use hanover_flipdot::HanoverController;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let port = MemoryPort::new().with_reply(hanover_flipdot::transport::Reply::Eof);
//! let handle = port.handle();
//!
//! let mut controller = HanoverController::<MemoryPort>::builder()
//!     .sign("front", 1, 86, 7, false)
//!     .build(port)?;
//!
//! let mut image = controller.create_image("front")?;
//! image.set(0, 0, true);
//! controller.draw("front", &image).await?;
//!
//! assert_eq!(handle.written()[0], 0x02);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::config::{
    ControllerConfig, SignConfig, DEFAULT_RESPONSE_BUFFER_SIZE, DEFAULT_RESPONSE_TIMEOUT,
};
use crate::error::{FlipdotError, Result};
use crate::grid::PixelGrid;
use crate::protocol::Frame;
use crate::sign::{SignDescriptor, SignRegistry};
use crate::transport::SignPort;

/// What the read half of an exchange observed.
///
/// Every variant is a successful exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// The sign answered with these bytes.
    Response(Bytes),
    /// The stream reported end-of-data before the timeout.
    NoData,
    /// The read failed; the error is kept for diagnostics only.
    ReadFailed(String),
    /// Nothing arrived before the timeout.
    TimedOut,
}

impl ExchangeOutcome {
    /// Response bytes, if any arrived.
    pub fn response(&self) -> Option<&[u8]> {
        match self {
            Self::Response(data) => Some(data),
            _ => None,
        }
    }

    #[inline]
    pub fn is_timed_out(&self) -> bool {
        matches!(self, Self::TimedOut)
    }
}

/// Builder for configuring and creating a [`HanoverController`].
pub struct ControllerBuilder {
    signs: Vec<SignConfig>,
    response_timeout: Duration,
    response_buffer_size: usize,
}

impl ControllerBuilder {
    /// Create a new builder with default settings and no signs.
    pub fn new() -> Self {
        Self {
            signs: Vec::new(),
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            response_buffer_size: DEFAULT_RESPONSE_BUFFER_SIZE,
        }
    }

    /// Start from a loaded configuration.
    pub fn from_config(config: ControllerConfig) -> Self {
        Self {
            response_timeout: config.response_timeout(),
            response_buffer_size: config.response_buffer_size,
            signs: config.signs,
        }
    }

    /// Add a sign to register at build time.
    pub fn sign(mut self, name: &str, address: u8, width: usize, height: usize, flip: bool) -> Self {
        self.signs
            .push(SignConfig::new(name, address, width, height, flip));
        self
    }

    /// Set how long each exchange waits for response bytes.
    ///
    /// Default: 2 seconds
    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Set the maximum response bytes read per exchange.
    ///
    /// Default: 128
    pub fn response_buffer_size(mut self, size: usize) -> Self {
        self.response_buffer_size = size;
        self
    }

    /// Build the controller around `port`, registering every sign.
    ///
    /// Fails on the first sign that is invalid or has a duplicate name.
    pub fn build<P: SignPort>(self, port: P) -> Result<HanoverController<P>> {
        let mut controller = HanoverController::new(port);
        controller.response_timeout = self.response_timeout;
        controller.response_buffer_size = self.response_buffer_size.max(1);

        for config in &self.signs {
            let sign = SignDescriptor::try_from(config)?;
            controller.register(&config.name, sign)?;
        }

        Ok(controller)
    }
}

impl Default for ControllerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives the signs attached to one port.
///
/// Exchanges take `&mut self`, so a single controller never has two frames in
/// flight. To share one between tasks, wrap it in an async lock such as
/// `Arc<tokio::sync::Mutex<HanoverController<P>>>`; writes from separate
/// controllers on the same physical line would interleave on the wire.
pub struct HanoverController<P: SignPort> {
    /// Registered signs.
    registry: SignRegistry,
    /// Write side of the port.
    writer: WriteHalf<P>,
    /// Read side of the port, shared with in-flight read tasks.
    reader: Arc<Mutex<ReadHalf<P>>>,
    /// How long to wait for response bytes.
    response_timeout: Duration,
    /// Maximum response bytes read per exchange.
    response_buffer_size: usize,
    /// Read left running by an exchange that timed out.
    pending_read: Option<JoinHandle<std::io::Result<Bytes>>>,
}

impl<P: SignPort> HanoverController<P> {
    /// Create a controller with default settings and no signs.
    pub fn new(port: P) -> Self {
        let (reader, writer) = tokio::io::split(port);
        Self {
            registry: SignRegistry::new(),
            writer,
            reader: Arc::new(Mutex::new(reader)),
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            response_buffer_size: DEFAULT_RESPONSE_BUFFER_SIZE,
            pending_read: None,
        }
    }

    /// Create a new controller builder.
    pub fn builder() -> ControllerBuilder {
        ControllerBuilder::new()
    }

    /// Registered signs.
    pub fn registry(&self) -> &SignRegistry {
        &self.registry
    }

    /// Configured response timeout.
    pub fn response_timeout(&self) -> Duration {
        self.response_timeout
    }

    /// Create and register a sign.
    pub fn add_sign(
        &mut self,
        name: &str,
        address: u8,
        width: usize,
        height: usize,
        flip: bool,
    ) -> Result<()> {
        let sign = SignDescriptor::new(address, width, height, flip.into())?;
        self.register(name, sign)
    }

    /// Register an existing descriptor under `name`.
    pub fn register(&mut self, name: &str, sign: SignDescriptor) -> Result<()> {
        self.registry.register(name, sign)?;
        tracing::info!(
            "Registered sign {:?} at address {} ({}x{}, {:?})",
            name,
            sign.address(),
            sign.width(),
            sign.height(),
            sign.orientation()
        );
        Ok(())
    }

    /// Look up a sign; an empty name selects the only registered sign.
    pub fn sign(&self, name: &str) -> Result<&SignDescriptor> {
        self.registry.resolve(name)
    }

    /// Blank image sized for the named sign.
    pub fn create_image(&self, name: &str) -> Result<PixelGrid> {
        Ok(self.registry.resolve(name)?.create_image())
    }

    /// Broadcast the start of the test sequence.
    pub async fn start_test_signs(&mut self) -> Result<ExchangeOutcome> {
        self.run_test(true).await
    }

    /// Broadcast the end of the test sequence.
    pub async fn stop_test_signs(&mut self) -> Result<ExchangeOutcome> {
        self.run_test(false).await
    }

    /// Start or stop the test sequence on every sign.
    pub async fn run_test(&mut self, start: bool) -> Result<ExchangeOutcome> {
        let frame = if start {
            Frame::start_test_signs()
        } else {
            Frame::stop_test_signs()
        };
        self.exchange(&frame.encode()).await
    }

    /// Draw an image on the named sign.
    pub async fn draw(&mut self, name: &str, image: &PixelGrid) -> Result<ExchangeOutcome> {
        self.draw_image(name, Some(image)).await
    }

    /// Draw an optional image on the named sign.
    ///
    /// `None` fails with `MissingImage`. Resolution and validation errors are
    /// returned before anything is written to the port.
    pub async fn draw_image(
        &mut self,
        name: &str,
        image: Option<&PixelGrid>,
    ) -> Result<ExchangeOutcome> {
        let frame = self.registry.resolve(name)?.to_frame(image)?;
        self.exchange(&frame).await
    }

    /// Write a frame, then observe the response for up to the timeout.
    async fn exchange(&mut self, frame: &[u8]) -> Result<ExchangeOutcome> {
        tracing::debug!("Sending packet: {}", hex::encode_upper(frame));

        let written = self.writer.write(frame).await?;
        if written != frame.len() {
            return Err(FlipdotError::ShortWrite {
                written,
                expected: frame.len(),
            });
        }
        self.writer.flush().await?;
        tracing::trace!("Wrote {} bytes to port", written);

        Ok(self.read_response().await)
    }

    /// Race the in-flight read against the response timeout.
    async fn read_response(&mut self) -> ExchangeOutcome {
        let mut read_task = match self.pending_read.take() {
            Some(task) if !task.is_finished() => task,
            stale => {
                if stale.is_some() {
                    tracing::debug!("Dropping late response from an earlier exchange");
                }
                self.spawn_read()
            }
        };

        match tokio::time::timeout(self.response_timeout, &mut read_task).await {
            Ok(Ok(Ok(data))) if data.is_empty() => {
                tracing::debug!("No data received from read operation");
                ExchangeOutcome::NoData
            }
            Ok(Ok(Ok(data))) => {
                tracing::debug!("Received response: {}", hex::encode_upper(&data));
                ExchangeOutcome::Response(data)
            }
            Ok(Ok(Err(e))) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                tracing::debug!("No data received from read operation");
                ExchangeOutcome::NoData
            }
            Ok(Ok(Err(e))) => {
                tracing::warn!("Failed to read response: {}", e);
                ExchangeOutcome::ReadFailed(e.to_string())
            }
            Ok(Err(e)) => {
                tracing::warn!("Response read task failed: {}", e);
                ExchangeOutcome::ReadFailed(e.to_string())
            }
            Err(_) => {
                tracing::warn!(
                    "Read operation timed out after {:?}",
                    self.response_timeout
                );
                self.pending_read = Some(read_task);
                ExchangeOutcome::TimedOut
            }
        }
    }

    fn spawn_read(&self) -> JoinHandle<std::io::Result<Bytes>> {
        let reader = self.reader.clone();
        let capacity = self.response_buffer_size;

        tokio::spawn(async move {
            let mut reader = reader.lock().await;
            let mut buf = vec![0u8; capacity];
            let n = reader.read(&mut buf).await?;
            buf.truncate(n);
            Ok::<_, std::io::Error>(Bytes::from(buf))
        })
    }
}

impl<P: SignPort> Drop for HanoverController<P> {
    fn drop(&mut self) {
        if let Some(task) = self.pending_read.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{MemoryPort, Reply};

    const START: &[u8] = &[0x02, b'3', b'0', 0x03, b'9', b'A'];
    const STOP: &[u8] = &[0x02, b'C', b'0', 0x03, b'8', b'A'];

    #[test]
    fn test_builder_defaults() {
        let builder = ControllerBuilder::new();
        assert_eq!(builder.response_timeout, Duration::from_secs(2));
        assert_eq!(builder.response_buffer_size, 128);
        assert!(builder.signs.is_empty());
    }

    #[test]
    fn test_builder_configuration() {
        let builder = HanoverController::<MemoryPort>::builder()
            .sign("a", 1, 86, 7, false)
            .sign("b", 2, 28, 16, true)
            .response_timeout(Duration::from_millis(250))
            .response_buffer_size(32);

        assert_eq!(builder.signs.len(), 2);
        assert_eq!(builder.response_timeout, Duration::from_millis(250));
        assert_eq!(builder.response_buffer_size, 32);
    }

    #[tokio::test]
    async fn test_build_registers_signs() {
        let controller = ControllerBuilder::new()
            .sign("a", 1, 86, 7, false)
            .sign("b", 2, 28, 16, true)
            .response_timeout(Duration::from_millis(250))
            .build(MemoryPort::new())
            .unwrap();

        assert_eq!(controller.registry().len(), 2);
        assert_eq!(controller.sign("b").unwrap().address(), 2);
        assert_eq!(controller.response_timeout(), Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_build_rejects_duplicate_sign() {
        let result = ControllerBuilder::new()
            .sign("a", 1, 86, 7, false)
            .sign("a", 2, 86, 7, false)
            .build(MemoryPort::new());
        assert!(matches!(result, Err(FlipdotError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_build_from_config() {
        let config = ControllerConfig {
            response_timeout_ms: 100,
            response_buffer_size: 8,
            signs: vec![SignConfig::new("front", 1, 86, 7, false)],
        };
        let controller = ControllerBuilder::from_config(config)
            .build(MemoryPort::new())
            .unwrap();

        assert_eq!(controller.response_timeout(), Duration::from_millis(100));
        assert!(controller.registry().contains("front"));
    }

    #[tokio::test]
    async fn test_add_sign_validation() {
        let mut controller = HanoverController::new(MemoryPort::new());
        controller.add_sign("test1", 1, 86, 7, false).unwrap();

        assert!(matches!(
            controller.add_sign("test1", 2, 86, 7, false),
            Err(FlipdotError::AlreadyExists(_))
        ));
        assert!(matches!(
            controller.add_sign("test2", 3, 0, 0, false),
            Err(FlipdotError::InvalidDescriptor(_))
        ));
        assert_eq!(controller.sign("test1").unwrap().address(), 1);
        assert!(!controller.registry().contains("test2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_and_stop_bytes() {
        let port = MemoryPort::new();
        let handle = port.handle();
        let mut controller = HanoverController::new(port);

        controller.start_test_signs().await.unwrap();
        assert_eq!(handle.written(), START);

        handle.clear_written();
        controller.stop_test_signs().await.unwrap();
        assert_eq!(handle.written(), STOP);
    }

    #[tokio::test(start_paused = true)]
    async fn test_test_frames_independent_of_signs() {
        let port = MemoryPort::new();
        let handle = port.handle();
        let mut controller = ControllerBuilder::new()
            .sign("a", 9, 86, 7, true)
            .build(port)
            .unwrap();

        controller.run_test(true).await.unwrap();
        assert_eq!(handle.written(), START);
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_sign_times_out_successfully() {
        let mut controller = HanoverController::new(MemoryPort::new());
        let outcome = controller.start_test_signs().await.unwrap();
        assert!(outcome.is_timed_out());
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_sign_keeps_one_read_in_flight() {
        let port = MemoryPort::new();
        let handle = port.handle();
        let mut controller = HanoverController::new(port);

        for _ in 0..50 {
            let outcome = controller.start_test_signs().await.unwrap();
            assert!(outcome.is_timed_out());
            assert!(Arc::strong_count(&controller.reader) <= 2);
        }

        handle.push_reply(Reply::Data(vec![0x06]));
        let outcome = controller.stop_test_signs().await.unwrap();
        assert_eq!(outcome.response(), Some(&[0x06][..]));
        assert!(controller.pending_read.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_finished_late_read_is_dropped() {
        let port = MemoryPort::new();
        let handle = port.handle();
        let mut controller = HanoverController::new(port);

        assert!(controller.start_test_signs().await.unwrap().is_timed_out());

        handle.push_reply(Reply::Data(vec![0xEE]));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(controller.pending_read.as_ref().is_some_and(|t| t.is_finished()));

        handle.push_reply(Reply::Data(vec![0x06]));
        let outcome = controller.stop_test_signs().await.unwrap();
        assert_eq!(outcome.response(), Some(&[0x06][..]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_aborts_pending_read() {
        let port = MemoryPort::new();
        let mut controller = HanoverController::new(port);
        assert!(controller.start_test_signs().await.unwrap().is_timed_out());

        let reader = controller.reader.clone();
        drop(controller);
        tokio::time::sleep(Duration::from_millis(1)).await;

        assert!(reader.try_lock().is_ok());
    }

    #[tokio::test]
    async fn test_response_is_reported() {
        let port = MemoryPort::new().with_reply(Reply::Data(vec![0x06, 0x30]));
        let mut controller = HanoverController::new(port);

        let outcome = controller.start_test_signs().await.unwrap();
        assert_eq!(outcome.response(), Some(&[0x06, 0x30][..]));
    }

    #[tokio::test]
    async fn test_response_truncated_to_buffer_size() {
        let port = MemoryPort::new().with_reply(Reply::Data(vec![0xAA; 10]));
        let mut controller = ControllerBuilder::new()
            .response_buffer_size(4)
            .build(port)
            .unwrap();

        let outcome = controller.start_test_signs().await.unwrap();
        assert_eq!(outcome.response().map(<[u8]>::len), Some(4));
    }

    #[tokio::test]
    async fn test_end_of_stream_is_success() {
        let port = MemoryPort::new().with_reply(Reply::Eof);
        let mut controller = HanoverController::new(port);
        assert_eq!(
            controller.stop_test_signs().await.unwrap(),
            ExchangeOutcome::NoData
        );
    }

    #[tokio::test]
    async fn test_read_error_is_success() {
        let port = MemoryPort::new().with_reply(Reply::Error(std::io::ErrorKind::Other));
        let mut controller = HanoverController::new(port);
        let outcome = controller.start_test_signs().await.unwrap();
        assert!(matches!(outcome, ExchangeOutcome::ReadFailed(_)));
    }

    #[tokio::test]
    async fn test_short_write_fails() {
        let port = MemoryPort::new().with_write_limit(4);
        let mut controller = HanoverController::new(port);

        let err = controller.start_test_signs().await.unwrap_err();
        assert!(err.is_transport());
        assert!(matches!(
            err,
            FlipdotError::ShortWrite {
                written: 4,
                expected: 6
            }
        ));
    }

    #[tokio::test]
    async fn test_write_error_fails() {
        let port = MemoryPort::new().with_write_error(std::io::ErrorKind::BrokenPipe);
        let mut controller = HanoverController::new(port);

        let err = controller.start_test_signs().await.unwrap_err();
        assert!(matches!(err, FlipdotError::Transport(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_draw_writes_image_frame() {
        let port = MemoryPort::new();
        let handle = port.handle();
        let mut controller = HanoverController::new(port);
        controller.add_sign("test", 1, 8, 8, false).unwrap();

        let image = controller.create_image("test").unwrap();
        controller.draw("test", &image).await.unwrap();

        let written = handle.written();
        assert_eq!(written.len(), 24);
        assert_eq!(&written[..3], &[0x02, b'1', b'1']);
    }

    #[tokio::test]
    async fn test_draw_validation_errors_skip_transport() {
        let port = MemoryPort::new();
        let handle = port.handle();
        let mut controller = HanoverController::new(port);
        controller.add_sign("test", 1, 86, 7, false).unwrap();

        let wrong = PixelGrid::new(100, 100);
        assert!(matches!(
            controller.draw("test", &wrong).await,
            Err(FlipdotError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            controller.draw_image("test", None).await,
            Err(FlipdotError::MissingImage)
        ));
        assert!(matches!(
            controller.draw("nonexistent", &PixelGrid::new(86, 7)).await,
            Err(FlipdotError::NotFound(_))
        ));

        assert_eq!(handle.write_calls(), 0);
    }

    #[tokio::test]
    async fn test_create_image_unknown_sign() {
        let controller = HanoverController::new(MemoryPort::new());
        assert!(matches!(
            controller.create_image("nope"),
            Err(FlipdotError::NotFound(_))
        ));
    }
}
