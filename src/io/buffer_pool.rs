//! Scoped scratch buffer allocation
//!
//! Scratch buffers are rented from an [`ArrayPool`] and handed out wrapped in
//! a [`PooledBuffer`], which gives the storage back when it goes out of scope.
//! Every exit path (including early returns on validation failures) releases
//! the buffer exactly once.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use log::trace;

/// Allocation service for byte scratch buffers
pub trait ArrayPool: Send + Sync {
    /// Rent a buffer holding at least `min_len` bytes
    fn rent(&self, min_len: usize) -> Vec<u8>;

    /// Return a previously rented buffer
    fn give_back(&self, buffer: Vec<u8>);
}

impl dyn ArrayPool + '_ {
    /// Rent a buffer wrapped in a guard that releases it on drop
    pub fn rent_scoped(&self, len: usize) -> PooledBuffer<'_> {
        PooledBuffer::new(self, len)
    }
}

/// A rented buffer that is returned to its pool when dropped
///
/// Derefs to exactly the requested length, even if the pool handed out
/// a larger allocation.
pub struct PooledBuffer<'a> {
    pool: &'a dyn ArrayPool,
    storage: Option<Vec<u8>>,
    requested_length: usize,
}

impl<'a> PooledBuffer<'a> {
    /// Rent `len` bytes from `pool`
    pub fn new(pool: &'a dyn ArrayPool, len: usize) -> Self {
        let mut storage = pool.rent(len);
        if storage.len() < len {
            storage.resize(len, 0);
        }

        PooledBuffer {
            pool,
            storage: Some(storage),
            requested_length: len,
        }
    }

    /// The number of usable bytes
    pub fn requested_length(&self) -> usize {
        self.requested_length
    }

    /// Give the buffer back now instead of at the end of the scope
    pub fn release(self) {
        drop(self);
    }
}

impl Deref for PooledBuffer<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match &self.storage {
            Some(storage) => &storage[..self.requested_length],
            None => &[],
        }
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        match &mut self.storage {
            Some(storage) => &mut storage[..self.requested_length],
            None => &mut [],
        }
    }
}

impl std::fmt::Debug for PooledBuffer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledBuffer")
            .field("requested_length", &self.requested_length)
            .finish()
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        if let Some(storage) = self.storage.take() {
            self.pool.give_back(storage);
        }
    }
}

/// Pool that allocates fresh zeroed buffers and frees them on return
#[derive(Debug, Default, Clone, Copy)]
pub struct HeapPool;

impl ArrayPool for HeapPool {
    fn rent(&self, min_len: usize) -> Vec<u8> {
        vec![0u8; min_len]
    }

    fn give_back(&self, _buffer: Vec<u8>) {}
}

/// Pool that keeps returned buffers around for reuse
///
/// Also tracks how many buffers are currently rented, which makes leaks
/// visible in tests.
#[derive(Debug, Default)]
pub struct RecyclingPool {
    free: Mutex<Vec<Vec<u8>>>,
    outstanding: AtomicUsize,
    max_retained: usize,
}

impl RecyclingPool {
    /// Create a pool that retains at most `max_retained` free buffers
    pub fn new(max_retained: usize) -> Self {
        RecyclingPool {
            free: Mutex::new(Vec::new()),
            outstanding: AtomicUsize::new(0),
            max_retained,
        }
    }

    /// Number of buffers rented and not yet returned
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// Number of free buffers held for reuse
    pub fn retained(&self) -> usize {
        self.free.lock().map(|free| free.len()).unwrap_or(0)
    }
}

impl ArrayPool for RecyclingPool {
    fn rent(&self, min_len: usize) -> Vec<u8> {
        self.outstanding.fetch_add(1, Ordering::SeqCst);

        let reused = self.free.lock().ok().and_then(|mut free| {
            let index = free.iter().position(|buffer| buffer.capacity() >= min_len)?;
            Some(free.swap_remove(index))
        });

        match reused {
            Some(mut buffer) => {
                trace!("Reusing pooled buffer of capacity {} for {} bytes", buffer.capacity(), min_len);
                buffer.clear();
                buffer.resize(min_len, 0);
                buffer
            }
            None => vec![0u8; min_len],
        }
    }

    fn give_back(&self, buffer: Vec<u8>) {
        self.outstanding.fetch_sub(1, Ordering::SeqCst);

        if let Ok(mut free) = self.free.lock() {
            if free.len() < self.max_retained {
                free.push(buffer);
            }
        }
    }
}
