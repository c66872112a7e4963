//! Scripted in-memory port.
//!
//! [`MemoryPort`] stands in for a serial line in tests and demos. Everything
//! written is recorded; reads are answered from a queue of scripted
//! [`Reply`] values. With nothing queued a read stays pending, which is how a
//! silent sign behaves. A cloneable [`MemoryPortHandle`] keeps access to the
//! recorded bytes and the script after the port has been moved into a
//! controller.
//!
//! # Example
//!
//! ```
//! use hanover_flipdot::transport::{MemoryPort, Reply};
//!
//! let port = MemoryPort::new().with_reply(Reply::Data(vec![0x06]));
//! let handle = port.handle();
//! assert_eq!(handle.pending_replies(), 1);
//! assert!(handle.written().is_empty());
//! ```

use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll, Waker};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// One scripted answer to a read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Bytes handed to the reader (split across reads if the buffer is small).
    Data(Vec<u8>),
    /// End of stream: the read completes with zero bytes.
    Eof,
    /// The read fails with this error kind.
    Error(io::ErrorKind),
}

#[derive(Debug, Default)]
struct PortState {
    written: Vec<u8>,
    write_calls: usize,
    replies: VecDeque<Reply>,
    read_waker: Option<Waker>,
    write_limit: Option<usize>,
    write_error: Option<io::ErrorKind>,
}

fn lock(state: &Mutex<PortState>) -> MutexGuard<'_, PortState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory duplex port with scripted replies.
#[derive(Debug, Default)]
pub struct MemoryPort {
    state: Arc<Mutex<PortState>>,
}

/// Inspection and scripting handle for a [`MemoryPort`].
#[derive(Debug, Clone)]
pub struct MemoryPortHandle {
    state: Arc<Mutex<PortState>>,
}

impl MemoryPort {
    /// Create a port with no scripted replies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply.
    pub fn with_reply(self, reply: Reply) -> Self {
        lock(&self.state).replies.push_back(reply);
        self
    }

    /// Accept at most `limit` bytes per write call.
    pub fn with_write_limit(self, limit: usize) -> Self {
        lock(&self.state).write_limit = Some(limit);
        self
    }

    /// Fail every write with `kind`.
    pub fn with_write_error(self, kind: io::ErrorKind) -> Self {
        lock(&self.state).write_error = Some(kind);
        self
    }

    /// Get a handle sharing this port's state.
    pub fn handle(&self) -> MemoryPortHandle {
        MemoryPortHandle {
            state: self.state.clone(),
        }
    }
}

impl MemoryPortHandle {
    /// All bytes written so far.
    pub fn written(&self) -> Vec<u8> {
        lock(&self.state).written.clone()
    }

    /// Number of write calls that reached the port.
    pub fn write_calls(&self) -> usize {
        lock(&self.state).write_calls
    }

    /// Forget recorded bytes and write calls.
    pub fn clear_written(&self) {
        let mut state = lock(&self.state);
        state.written.clear();
        state.write_calls = 0;
    }

    /// Queue a reply, waking a read that is already waiting.
    pub fn push_reply(&self, reply: Reply) {
        let waker = {
            let mut state = lock(&self.state);
            state.replies.push_back(reply);
            state.read_waker.take()
        };
        if let Some(waker) = waker {
            waker.wake();
        }
    }

    /// Replies not yet consumed by a read.
    pub fn pending_replies(&self) -> usize {
        lock(&self.state).replies.len()
    }
}

impl AsyncRead for MemoryPort {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let mut state = lock(&self.state);
        match state.replies.pop_front() {
            Some(Reply::Data(mut data)) => {
                let n = data.len().min(buf.remaining());
                buf.put_slice(&data[..n]);
                if n < data.len() {
                    state.replies.push_front(Reply::Data(data.split_off(n)));
                }
                Poll::Ready(Ok(()))
            }
            Some(Reply::Eof) => Poll::Ready(Ok(())),
            Some(Reply::Error(kind)) => Poll::Ready(Err(io::Error::new(kind, "scripted read error"))),
            None => {
                state.read_waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

impl AsyncWrite for MemoryPort {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let mut state = lock(&self.state);
        state.write_calls += 1;
        if let Some(kind) = state.write_error {
            return Poll::Ready(Err(io::Error::new(kind, "scripted write error")));
        }
        let n = state.write_limit.map_or(buf.len(), |limit| limit.min(buf.len()));
        state.written.extend_from_slice(&buf[..n]);
        Poll::Ready(Ok(n))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
