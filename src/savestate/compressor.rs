//! Background Savestate Compressor
//!
//! A single worker thread drains a bounded queue of savestate handles and
//! rewrites each version 6 buffer as version 7 in place. Submitting moves
//! the buffer into a [`SavestateHandle`]; from then on the simulation only
//! reads it through the handle.
//!
//! The queue is a tokio `mpsc` channel driven from plain threads:
//! `try_send` on the producer side, `blocking_recv` in the worker. A full
//! queue just leaves the buffer uncompressed.

use std::sync::{Arc, PoisonError, RwLock};
use std::thread::{self, JoinHandle};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::CompressorConfig;

use super::{compress, VERSION_COMPRESSED};

/// Shared, read-only view of a submitted savestate.
///
/// The bytes are always a valid savestate: version 6 until the worker gets
/// to them, version 7 afterwards.
#[derive(Clone, Debug)]
pub struct SavestateHandle(Arc<RwLock<Vec<u8>>>);

impl SavestateHandle {
    fn new(bytes: Vec<u8>) -> Self {
        Self(Arc::new(RwLock::new(bytes)))
    }

    /// Run `f` over the current bytes.
    pub fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        let guard = self.0.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Copy of the current bytes.
    pub fn to_vec(&self) -> Vec<u8> {
        self.with_bytes(<[u8]>::to_vec)
    }

    /// Current size in bytes.
    pub fn len(&self) -> usize {
        self.with_bytes(<[u8]>::len)
    }

    /// Whether the buffer is empty (never true for a real savestate).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the worker has rewritten this buffer.
    pub fn is_compressed(&self) -> bool {
        self.with_bytes(|b| b.first() == Some(&VERSION_COMPRESSED))
    }

    fn compress_in_place(&self) {
        let result = self.with_bytes(compress);
        match result {
            Ok(compressed) => {
                let mut guard = self.0.write().unwrap_or_else(PoisonError::into_inner);
                *guard = compressed;
            }
            Err(e) => warn!(error = %e, "savestate compression failed, keeping uncompressed buffer"),
        }
    }
}

/// Owner of the compression worker.
///
/// Dropping it closes the queue, lets the worker finish what is queued and
/// joins the thread.
#[derive(Debug)]
pub struct SavestateCompressor {
    sender: Option<mpsc::Sender<SavestateHandle>>,
    worker: Option<JoinHandle<()>>,
}

impl SavestateCompressor {
    /// Start the worker thread.
    pub fn new(config: &CompressorConfig) -> std::io::Result<Self> {
        let (sender, mut receiver) = mpsc::channel::<SavestateHandle>(config.queue_capacity.max(1));

        let worker = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || {
                let mut compressed = 0u64;
                while let Some(handle) = receiver.blocking_recv() {
                    handle.compress_in_place();
                    compressed += 1;
                }
                debug!(compressed, "savestate compressor stopped");
            })?;

        debug!(capacity = config.queue_capacity, thread = %config.thread_name, "savestate compressor started");
        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    /// Hand a savestate to the worker.
    ///
    /// The returned handle is usable immediately, whether or not the buffer
    /// has been compressed yet.
    pub fn submit(&self, bytes: Vec<u8>) -> SavestateHandle {
        let handle = SavestateHandle::new(bytes);
        if let Some(sender) = &self.sender {
            if let Err(e) = sender.try_send(handle.clone()) {
                debug!(error = %e, "compressor queue unavailable, savestate stays uncompressed");
            }
        }
        handle
    }

    /// Wrap a savestate without queueing it.
    pub fn keep_uncompressed(bytes: Vec<u8>) -> SavestateHandle {
        SavestateHandle::new(bytes)
    }

    /// Finish queued work and stop the worker.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("savestate compressor thread panicked");
            }
        }
    }
}

impl Drop for SavestateCompressor {
    fn drop(&mut self) {
        self.stop();
    }
}
