use std::sync::atomic::{AtomicUsize, Ordering};

use crate::batch::{Batch, Board, PlayRecord, RunMode};

/// One batch's shared work source: an atomic cursor over the deduplicated
/// board indices, plus read access to the inputs the solve step needs.
///
/// Built per run and dropped when the run finishes. Competing workers
/// call [`next`](WorkQueue::next) until it is exhausted; the cursor is the
/// only mutable state, so handing out an index never blocks beyond the
/// fetch-add itself. Results do not pass through the queue; workers
/// write them straight into the batch's slots.
pub struct WorkQueue<'a> {
    mode: RunMode,
    batch: &'a Batch,
    uniques: Vec<usize>,
    traces: Option<&'a [PlayRecord]>,
    cursor: AtomicUsize,
}

impl<'a> WorkQueue<'a> {
    pub fn new(
        mode: RunMode,
        batch: &'a Batch,
        uniques: Vec<usize>,
        traces: Option<&'a [PlayRecord]>,
    ) -> Self {
        WorkQueue {
            mode,
            batch,
            uniques,
            traces,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Claim the next unassigned board index, in unique-set order.
    /// Returns `None` forever once the set is exhausted; no index is
    /// handed out twice or skipped.
    pub fn next(&self) -> Option<usize> {
        let at = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.uniques.get(at).copied()
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn batch(&self) -> &Batch {
        self.batch
    }

    pub fn board(&self, index: usize) -> &Board {
        self.batch.board(index)
    }

    /// The play trace for a board, when this run carries traces
    pub fn trace(&self, index: usize) -> Option<&PlayRecord> {
        self.traces.and_then(|traces| traces.get(index))
    }

    /// Number of boards that will actually be solved
    pub fn unique_count(&self) -> usize {
        self.uniques.len()
    }
}
