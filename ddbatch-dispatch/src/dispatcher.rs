use std::thread;

use ddbatch_search::{analyse_play, calc_table, solve, validate_trace, Workspace, WorkspacePool};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::backend::Backend;
use crate::batch::{Batch, BoardResult, PlayRecord, RunMode};
use crate::dedup::detect_duplicates;
use crate::queue::WorkQueue;
use crate::report::DispatcherInfo;
use crate::slots::SlotPool;
use crate::DispatchError;

/// Memory budget assumed when the caller never registered one, in MB
pub const DEFAULT_MEMORY_MB: usize = 256;

/// The batch entry point: owns the run configuration (worker count,
/// memory budget, active backend) together with the slot pool and the
/// per-slot search workspaces sized from that configuration.
///
/// Configuration calls take `&mut self` while [`run`](Dispatcher::run)
/// takes `&self`, so reconfiguring mid-batch is a borrow error rather
/// than a runtime hazard. Created once by the host application at setup;
/// there is no global instance.
pub struct Dispatcher {
    num_threads: usize,
    memory_mb: usize,
    active: Backend,
    slots: SlotPool,
    workspaces: WorkspacePool,
}

impl Dispatcher {
    /// A single-threaded dispatcher with the default memory budget and
    /// the best compiled backend
    pub fn new() -> Self {
        Dispatcher {
            num_threads: 1,
            memory_mb: DEFAULT_MEMORY_MB,
            active: Backend::default_backend(),
            slots: SlotPool::new(1),
            workspaces: WorkspacePool::new(1, DEFAULT_MEMORY_MB),
        }
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    pub fn memory_mb(&self) -> usize {
        self.memory_mb
    }

    pub fn active_backend(&self) -> Backend {
        self.active
    }

    /// Set the worker count and memory budget for subsequent runs.
    ///
    /// Rejects a zero thread count, leaving the previous configuration in
    /// effect. Otherwise resizes the slot pool (waiting for any
    /// still-outstanding slots to drain first) and rebuilds the
    /// per-slot workspaces from the new budget. Call between batches.
    pub fn register_params(
        &mut self,
        num_threads: usize,
        memory_mb: usize,
    ) -> Result<(), DispatchError> {
        if num_threads < 1 {
            return Err(DispatchError::ThreadCount(num_threads));
        }

        self.slots.resize(num_threads);
        self.num_threads = num_threads;
        self.memory_mb = memory_mb;
        self.workspaces = WorkspacePool::new(num_threads, memory_mb);
        log::debug!(
            "registered {} threads, {} MB budget",
            num_threads,
            memory_mb
        );
        Ok(())
    }

    /// Switch the backend used by subsequent runs, by registry code.
    ///
    /// An unknown or not-compiled-in code is rejected and the previously
    /// active backend stays in effect.
    pub fn prefer_backend(&mut self, code: u32) -> Result<(), DispatchError> {
        let backend = Backend::from_code(code).ok_or(DispatchError::UnknownBackend(code))?;
        self.set_backend(backend)
    }

    /// Switch the backend used by subsequent runs
    pub fn set_backend(&mut self, backend: Backend) -> Result<(), DispatchError> {
        if !backend.compiled_in() {
            return Err(DispatchError::BackendNotCompiled(backend));
        }
        self.active = backend;
        Ok(())
    }

    /// Solve or tabulate every board of a batch.
    ///
    /// On success every board's result slot is populated, duplicates
    /// included, via their representatives. On any error the batch's
    /// contents are not to be trusted.
    pub fn run(&self, mode: RunMode, batch: &Batch) -> Result<(), DispatchError> {
        if mode == RunMode::Play {
            return Err(DispatchError::MissingTraces);
        }
        self.run_batch(mode, batch, None)
    }

    /// Analyse a recorded play for every board of a batch. `plays` holds
    /// one trace per board, in batch order.
    pub fn run_with_plays(
        &self,
        batch: &Batch,
        plays: &[PlayRecord],
    ) -> Result<(), DispatchError> {
        self.run_batch(RunMode::Play, batch, Some(plays))
    }

    /// Diagnostic self-report; informational only
    pub fn info(&self) -> DispatcherInfo {
        let (small, large) = self.workspaces.size_split();
        DispatcherInfo::probe(
            self.num_threads,
            self.memory_mb,
            small,
            large,
            self.active,
        )
    }

    fn run_batch(
        &self,
        mode: RunMode,
        batch: &Batch,
        traces: Option<&[PlayRecord]>,
    ) -> Result<(), DispatchError> {
        self.check_inputs(mode, batch, traces)?;
        if batch.is_empty() {
            return Ok(());
        }

        let (uniques, crossrefs) = detect_duplicates(mode, batch, traces);
        log::debug!(
            "dispatching {} boards ({} unique) on {} via {}",
            batch.len(),
            uniques.len(),
            self.num_threads,
            self.active.label()
        );

        let queue = WorkQueue::new(mode, batch, uniques, traces);
        self.dispatch(&queue)?;
        copy_back(batch, &crossrefs);
        Ok(())
    }

    /// Reject bad inputs before any worker starts, so the per-board
    /// solve step cannot fail mid-batch
    fn check_inputs(
        &self,
        mode: RunMode,
        batch: &Batch,
        traces: Option<&[PlayRecord]>,
    ) -> Result<(), DispatchError> {
        if !batch.is_fresh() {
            return Err(DispatchError::BatchReused);
        }
        for (index, board) in batch.boards().iter().enumerate() {
            board
                .deal
                .check()
                .map_err(|reason| DispatchError::InvalidBoard { board: index, reason })?;
        }
        if mode == RunMode::Play {
            let traces = traces.ok_or(DispatchError::MissingTraces)?;
            if traces.len() != batch.len() {
                return Err(DispatchError::TraceCount {
                    boards: batch.len(),
                    traces: traces.len(),
                });
            }
            for (index, (board, record)) in batch.boards().iter().zip(traces).enumerate() {
                validate_trace(&board.deal, board.strain, board.leader, &record.cards)
                    .map_err(|reason| DispatchError::InvalidTrace { board: index, reason })?;
            }
        }
        Ok(())
    }

    /// Drive the worker loop to completion with the active backend.
    /// Every backend starts exactly `num_threads` logical workers (one
    /// for `Basic`) and returns only after all of them have finished.
    fn dispatch(&self, queue: &WorkQueue) -> Result<(), DispatchError> {
        match self.active {
            Backend::Basic => {
                self.worker(queue);
                Ok(())
            }
            Backend::Thread => self.run_native(queue),
            Backend::Hybrid => self.run_hybrid(queue),
            #[cfg(feature = "parallel")]
            Backend::Pool => self.run_pool(queue),
            #[cfg(feature = "parallel")]
            Backend::ParIter => self.run_par_iter(queue),
            #[cfg(not(feature = "parallel"))]
            Backend::Pool | Backend::ParIter => {
                Err(DispatchError::BackendNotCompiled(self.active))
            }
        }
    }

    /// The unit of work every backend runs: take a slot (its id selects
    /// the workspace; a backend's own worker numbering is irrelevant,
    /// since pools reuse execution contexts), then drain the queue. The
    /// slot returns to the pool when the guard drops, on every exit
    /// path.
    fn worker(&self, queue: &WorkQueue) {
        let slot = self.slots.occupy();
        let mut workspace = self.workspaces.checkout(slot.id());
        while let Some(board_no) = queue.next() {
            solve_single(&mut workspace, queue, board_no);
        }
    }

    fn run_native(&self, queue: &WorkQueue) -> Result<(), DispatchError> {
        let mut spawn_error = None;
        thread::scope(|scope| {
            for k in 0..self.num_threads {
                let builder = thread::Builder::new().name(format!("ddbatch-worker-{}", k));
                if let Err(error) = builder.spawn_scoped(scope, || self.worker(queue)) {
                    spawn_error = Some(error);
                    break;
                }
            }
        });
        match spawn_error {
            None => Ok(()),
            Some(error) => {
                log::warn!("worker spawn failed: {}", error);
                Err(DispatchError::Spawn(error.to_string()))
            }
        }
    }

    /// Like `Thread`, but the first worker runs inline on the calling
    /// thread instead of being spawned
    fn run_hybrid(&self, queue: &WorkQueue) -> Result<(), DispatchError> {
        let mut spawn_error = None;
        thread::scope(|scope| {
            for k in 1..self.num_threads {
                let builder = thread::Builder::new().name(format!("ddbatch-worker-{}", k));
                if let Err(error) = builder.spawn_scoped(scope, || self.worker(queue)) {
                    spawn_error = Some(error);
                    break;
                }
            }
            self.worker(queue);
        });
        match spawn_error {
            None => Ok(()),
            Some(error) => {
                log::warn!("worker spawn failed: {}", error);
                Err(DispatchError::Spawn(error.to_string()))
            }
        }
    }

    #[cfg(feature = "parallel")]
    fn run_pool(&self, queue: &WorkQueue) -> Result<(), DispatchError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.num_threads)
            .thread_name(|i| format!("ddbatch-pool-{}", i))
            .build()
            .map_err(|error| DispatchError::Spawn(error.to_string()))?;
        pool.scope(|scope| {
            for _ in 0..self.num_threads {
                scope.spawn(|_| self.worker(queue));
            }
        });
        Ok(())
    }

    /// Bulk construct on the shared rayon pool: one task per configured
    /// worker, with actual parallelism left to the pool. Slot ids keep
    /// workspace selection correct either way.
    #[cfg(feature = "parallel")]
    fn run_par_iter(&self, queue: &WorkQueue) -> Result<(), DispatchError> {
        (0..self.num_threads)
            .into_par_iter()
            .for_each(|_| self.worker(queue));
        Ok(())
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Solve one board into its result slot, per the run mode
fn solve_single(workspace: &mut Workspace, queue: &WorkQueue, board_no: usize) {
    let board = queue.board(board_no);
    let result = match queue.mode() {
        RunMode::Solve => BoardResult::Tricks(solve(
            workspace,
            &board.deal,
            board.strain,
            board.leader,
            board.target,
        )),
        RunMode::Calc => BoardResult::Table(calc_table(workspace, &board.deal)),
        RunMode::Play => {
            let Some(record) = queue.trace(board_no) else {
                debug_assert!(false, "traces checked before dispatch");
                return;
            };
            BoardResult::Play(analyse_play(
                workspace,
                &board.deal,
                board.strain,
                board.leader,
                &record.cards,
            ))
        }
    };
    queue.batch().set_result(board_no, result);
}

/// Fill every duplicate board's slot from its representative. Runs
/// single-threaded, strictly after all workers have joined.
fn copy_back(batch: &Batch, crossrefs: &[usize]) {
    for index in 0..batch.len() {
        let representative = crossrefs[index];
        if representative == index {
            continue;
        }
        if let Some(result) = batch.result(representative) {
            batch.set_result(index, result.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Board;
    use ddbatch_core::{Card, Deal, Rank, Seat, Strain, Suit};

    fn one_winner_deal() -> Deal {
        let mut deal = Deal::new();
        deal.north.add_card(Card::new(Suit::Spades, Rank::Ace));
        deal.north.add_card(Card::new(Suit::Hearts, Rank::Two));
        deal.east.add_card(Card::new(Suit::Spades, Rank::King));
        deal.east.add_card(Card::new(Suit::Hearts, Rank::Three));
        deal.south.add_card(Card::new(Suit::Spades, Rank::Two));
        deal.south.add_card(Card::new(Suit::Hearts, Rank::Four));
        deal.west.add_card(Card::new(Suit::Spades, Rank::Three));
        deal.west.add_card(Card::new(Suit::Hearts, Rank::Five));
        deal
    }

    #[test]
    fn test_register_params_rejects_zero_threads() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register_params(4, 128).unwrap();

        let result = dispatcher.register_params(0, 128);
        assert_eq!(result, Err(DispatchError::ThreadCount(0)));
        // Configuration unchanged
        assert_eq!(dispatcher.num_threads(), 4);
        assert_eq!(dispatcher.memory_mb(), 128);
    }

    #[test]
    fn test_prefer_backend_rejects_unknown_code() {
        let mut dispatcher = Dispatcher::new();
        let before = dispatcher.active_backend();

        assert_eq!(
            dispatcher.prefer_backend(99),
            Err(DispatchError::UnknownBackend(99))
        );
        assert_eq!(dispatcher.active_backend(), before);
    }

    #[test]
    fn test_prefer_backend_switches() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.prefer_backend(Backend::Basic.code()).unwrap();
        assert_eq!(dispatcher.active_backend(), Backend::Basic);
    }

    #[test]
    fn test_run_rejects_invalid_board() {
        let dispatcher = Dispatcher::new();
        let mut batch = Batch::new();
        let mut deal = one_winner_deal();
        deal.west.add_card(Card::new(Suit::Clubs, Rank::Two));
        batch
            .push(Board::new(deal, Strain::NoTrump, Seat::North))
            .unwrap();

        match dispatcher.run(RunMode::Solve, &batch) {
            Err(DispatchError::InvalidBoard { board: 0, .. }) => {}
            other => panic!("expected InvalidBoard, got {:?}", other),
        }
    }

    #[test]
    fn test_run_rejects_play_without_traces() {
        let dispatcher = Dispatcher::new();
        let batch = Batch::new();
        assert_eq!(
            dispatcher.run(RunMode::Play, &batch),
            Err(DispatchError::MissingTraces)
        );
    }

    #[test]
    fn test_run_rejects_trace_count_mismatch() {
        let dispatcher = Dispatcher::new();
        let mut batch = Batch::new();
        batch
            .push(Board::new(one_winner_deal(), Strain::NoTrump, Seat::North))
            .unwrap();

        assert_eq!(
            dispatcher.run_with_plays(&batch, &[]),
            Err(DispatchError::TraceCount {
                boards: 1,
                traces: 0
            })
        );
    }

    #[test]
    fn test_run_rejects_illegal_trace() {
        let dispatcher = Dispatcher::new();
        let mut batch = Batch::new();
        batch
            .push(Board::new(one_winner_deal(), Strain::NoTrump, Seat::North))
            .unwrap();
        // North does not hold the spade king
        let plays = vec![PlayRecord::new(vec![Card::new(Suit::Spades, Rank::King)])];

        match dispatcher.run_with_plays(&batch, &plays) {
            Err(DispatchError::InvalidTrace { board: 0, .. }) => {}
            other => panic!("expected InvalidTrace, got {:?}", other),
        }
    }

    #[test]
    fn test_run_rejects_reused_batch() {
        let dispatcher = Dispatcher::new();
        let mut batch = Batch::new();
        batch
            .push(Board::new(one_winner_deal(), Strain::NoTrump, Seat::North))
            .unwrap();

        dispatcher.run(RunMode::Solve, &batch).unwrap();
        assert_eq!(
            dispatcher.run(RunMode::Solve, &batch),
            Err(DispatchError::BatchReused)
        );
    }

    #[test]
    fn test_empty_batch_succeeds() {
        let dispatcher = Dispatcher::new();
        let batch = Batch::new();
        assert!(dispatcher.run(RunMode::Solve, &batch).is_ok());
    }

    #[test]
    fn test_copy_back_fills_duplicates() {
        let mut batch = Batch::new();
        for _ in 0..3 {
            batch
                .push(Board::new(one_winner_deal(), Strain::NoTrump, Seat::North))
                .unwrap();
        }
        batch.set_result(1, BoardResult::Tricks(5));
        copy_back(&batch, &[1, 1, 1]);

        assert_eq!(batch.result(0), Some(&BoardResult::Tricks(5)));
        assert_eq!(batch.result(2), Some(&BoardResult::Tricks(5)));
    }

    #[test]
    fn test_info_reflects_configuration() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register_params(3, 96).unwrap();
        let info = dispatcher.info();
        assert_eq!(info.threads, 3);
        assert_eq!(info.memory_mb, 96);
        assert_eq!(info.workspaces_small + info.workspaces_large, 3);
        assert_eq!(info.active, dispatcher.active_backend());
        assert!(info.compiled.contains(&Backend::Basic));
        // The formatted report mentions the active backend
        assert!(info.to_string().contains(info.active.label()));
    }
}
