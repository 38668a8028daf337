use std::sync::{Condvar, Mutex, MutexGuard};

/// A bounded pool of worker-identity slots.
///
/// At most `total` slots exist at any time, numbered `0..total`. A worker
/// takes exclusive ownership of one id for the duration of its unit of
/// work via [`occupy`](SlotPool::occupy); the id selects the worker's
/// per-thread scratch memory, independently of how the active backend
/// numbers its own execution contexts.
///
/// One mutex guards the free list; one condvar parks `occupy` callers
/// when the pool is empty and `resize` while it drains.
pub struct SlotPool {
    state: Mutex<SlotState>,
    available: Condvar,
}

struct SlotState {
    free: Vec<usize>,
    total: usize,
}

impl SlotPool {
    /// Create a pool with slot ids `0..count`
    pub fn new(count: usize) -> Self {
        SlotPool {
            state: Mutex::new(SlotState {
                free: (0..count).rev().collect(),
                total: count,
            }),
            available: Condvar::new(),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, SlotState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Block until a slot id is free, then take exclusive ownership of
    /// it. Ids come out ascending from 0 when the pool is idle.
    pub fn occupy(&self) -> SlotGuard<'_> {
        let mut state = self.lock_state();
        loop {
            if let Some(id) = state.free.pop() {
                return SlotGuard { pool: self, id };
            }
            state = self
                .available
                .wait(state)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    fn release(&self, id: usize) {
        let mut state = self.lock_state();
        state.free.push(id);
        drop(state);
        self.available.notify_one();
    }

    /// Replace the pool with fresh ids `0..count`, blocking until every
    /// outstanding slot has been released first.
    ///
    /// While draining, each wakeup is forwarded with another notify so a
    /// release signal meant for a blocked `occupy` caller is never
    /// swallowed here.
    pub fn resize(&self, count: usize) {
        let mut state = self.lock_state();
        while state.free.len() < state.total {
            self.available.notify_one();
            state = self
                .available
                .wait(state)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
        state.free = (0..count).rev().collect();
        state.total = count;
        drop(state);
        self.available.notify_all();
    }

    /// Pool size currently in effect
    pub fn total(&self) -> usize {
        self.lock_state().total
    }

    /// Slots free right now (diagnostic; stale by the time it returns)
    pub fn free_count(&self) -> usize {
        self.lock_state().free.len()
    }
}

/// Exclusive ownership of one slot id. Releasing happens in `Drop`, so
/// the slot returns to the pool on every exit path.
pub struct SlotGuard<'a> {
    pool: &'a SlotPool,
    id: usize,
}

impl SlotGuard<'_> {
    pub fn id(&self) -> usize {
        self.id
    }
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.pool.release(self.id);
    }
}
