use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use bytes::Bytes;
use tracing::trace;

use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// In-memory transport pair.
///
/// Each endpoint feeds the other's inbox. `recv_chunk` blocks until a chunk
/// arrives or the peer endpoint is dropped, so a pair can serve either a
/// single-threaded send-then-receive test or a two-thread broker/worker
/// arrangement.
pub struct LoopbackTransport {
    outbox: Arc<ChunkQueue>,
    inbox: Arc<ChunkQueue>,
}

struct ChunkQueue {
    state: Mutex<QueueState>,
    ready: Condvar,
}

struct QueueState {
    chunks: VecDeque<Bytes>,
    open: bool,
}

impl ChunkQueue {
    fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                chunks: VecDeque::new(),
                open: true,
            }),
            ready: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn close(&self) {
        self.lock().open = false;
        self.ready.notify_all();
    }
}

impl LoopbackTransport {
    /// Create a connected pair of endpoints.
    pub fn pair() -> (Self, Self) {
        let a = Arc::new(ChunkQueue::new());
        let b = Arc::new(ChunkQueue::new());
        (
            Self {
                outbox: Arc::clone(&a),
                inbox: Arc::clone(&b),
            },
            Self {
                outbox: b,
                inbox: a,
            },
        )
    }
}

impl Transport for LoopbackTransport {
    fn send(&mut self, buf: &[u8]) -> Result<usize> {
        let mut state = self.outbox.lock();
        if !state.open {
            return Err(TransportError::Closed);
        }
        state.chunks.push_back(Bytes::copy_from_slice(buf));
        drop(state);
        self.outbox.ready.notify_one();
        trace!(bytes = buf.len(), "loopback sent");
        Ok(buf.len())
    }

    fn recv_chunk(&mut self) -> Result<Option<Bytes>> {
        let mut state = self.inbox.lock();
        loop {
            if let Some(chunk) = state.chunks.pop_front() {
                trace!(bytes = chunk.len(), "loopback received chunk");
                return Ok(Some(chunk));
            }
            if !state.open {
                return Ok(None);
            }
            state = self
                .inbox
                .ready
                .wait(state)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }
}

impl Drop for LoopbackTransport {
    fn drop(&mut self) {
        // The peer's receives drain what we already sent, then see EOF; the
        // peer's sends fail immediately.
        self.outbox.close();
        self.inbox.close();
    }
}
