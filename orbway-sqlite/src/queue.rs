//! The bounded producer/consumer queue between the simulation workers and
//! the writer thread.
//!
//! One mutex, two condition variables: producers wait on `not_full`,
//! the consumer waits on `not_empty`. All waits are timed so a requested
//! stop is observed within roughly one polling interval even if a wake-up
//! is lost.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::Duration;

use orbway::backend::UpdateBatch;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct UpdateQueue {
    capacity: usize,
    batches: Mutex<VecDeque<UpdateBatch>>,
    not_full: Condvar,
    not_empty: Condvar,
    pub stop: AtomicBool,
}

impl UpdateQueue {
    pub fn new(capacity: usize) -> UpdateQueue {
        UpdateQueue {
            capacity,
            batches: Mutex::new(VecDeque::new()),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            stop: AtomicBool::new(false),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.batches.lock().expect("update queue poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enqueue a batch, blocking while the queue is at capacity. A batch
    /// arriving after shutdown was requested is silently dropped.
    pub fn push(&self, batch: UpdateBatch) {
        let mut batches = self.batches.lock().expect("update queue poisoned");
        while batches.len() >= self.capacity && !self.stop.load(Ordering::SeqCst) {
            let (guard, _timeout) = self
                .not_full
                .wait_timeout(batches, POLL_INTERVAL)
                .expect("update queue poisoned");
            batches = guard;
        }
        if self.stop.load(Ordering::SeqCst) {
            return;
        }
        batches.push_back(batch);
        self.not_empty.notify_one();
    }

    /// Dequeue the oldest batch; `None` after one polling interval without
    /// data, or once shutdown is requested.
    pub fn pop(&self) -> Option<UpdateBatch> {
        let batches = self.batches.lock().expect("update queue poisoned");
        let (mut batches, _timeout) = self
            .not_empty
            .wait_timeout(batches, POLL_INTERVAL)
            .expect("update queue poisoned");
        if self.stop.load(Ordering::SeqCst) {
            return None;
        }
        let batch = batches.pop_front()?;
        self.not_full.notify_all();
        Some(batch)
    }

    /// Block up to `timeout` for the consumer to make progress.
    pub fn wait_for_drain(&self, timeout: Duration) {
        let batches = self.batches.lock().expect("update queue poisoned");
        if batches.is_empty() {
            return;
        }
        let _ = self
            .not_full
            .wait_timeout(batches, timeout)
            .expect("update queue poisoned");
    }

    pub fn notify_all(&self) {
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }
}
