//! Batch dispatch layer for the ddbatch double-dummy solver.
//!
//! A caller builds a [`Batch`] of boards, and [`Dispatcher::run`] fans the
//! work out across worker threads, solves each distinct board exactly
//! once, and broadcasts results to duplicate boards, producing the same
//! output buffer no matter which concurrency [`Backend`] is active.
//!
//! The moving parts:
//!
//! - [`SlotPool`] hands out exclusive worker-identity slots, bounding
//!   concurrency to the configured thread count regardless of how many
//!   execution contexts the active backend creates.
//! - [`WorkQueue`] is one batch's shared cursor over the deduplicated
//!   board indices.
//! - Duplicate detection groups boards with identical solve-relevant
//!   content before dispatch; copy-back fills duplicate slots afterwards.
//! - [`Backend`] selects the execution model: inline, native threads, a
//!   hybrid of both, or (with the default `parallel` feature) a dedicated
//!   thread pool or data-parallel iteration.
//!
//! Results land in the batch's write-once slots. A run that returns an
//! error leaves the batch untrustworthy as a whole; there is no partial
//! success.

mod backend;
mod batch;
mod dedup;
mod dispatcher;
mod queue;
mod report;
mod slots;

pub use backend::Backend;
pub use batch::{Batch, Board, BoardResult, PlayRecord, RunMode, MAX_BOARDS};
pub use ddbatch_search::TrickTable;
pub use dedup::detect_duplicates;
pub use dispatcher::{Dispatcher, DEFAULT_MEMORY_MB};
pub use queue::WorkQueue;
pub use report::DispatcherInfo;
pub use slots::{SlotGuard, SlotPool};

/// Errors surfaced by the dispatch layer.
///
/// Configuration errors (`ThreadCount`, `UnknownBackend`,
/// `BackendNotCompiled`) are rejected before any batch state changes; the
/// previous configuration stays in effect. Everything else marks the
/// whole batch as failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// Thread count below one
    ThreadCount(usize),
    /// Backend code outside the registry
    UnknownBackend(u32),
    /// Backend known but not compiled into this build
    BackendNotCompiled(Backend),
    /// OS-level failure starting a worker
    Spawn(String),
    /// Batch already holds `MAX_BOARDS` boards
    BatchFull(usize),
    /// Batch already carries results from an earlier run
    BatchReused,
    /// A board is not a valid solver input
    InvalidBoard { board: usize, reason: String },
    /// Play analysis needs one trace per board
    TraceCount { boards: usize, traces: usize },
    /// A play trace is illegal for its board
    InvalidTrace { board: usize, reason: String },
    /// Play analysis was requested without a trace buffer
    MissingTraces,
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            DispatchError::ThreadCount(n) => {
                write!(f, "thread count must be at least 1, got {}", n)
            }
            DispatchError::UnknownBackend(code) => {
                write!(f, "no backend with code {}", code)
            }
            DispatchError::BackendNotCompiled(backend) => {
                write!(f, "backend {} is not compiled into this build", backend.label())
            }
            DispatchError::Spawn(msg) => write!(f, "failed to start worker: {}", msg),
            DispatchError::BatchFull(limit) => {
                write!(f, "batch is full ({} boards)", limit)
            }
            DispatchError::BatchReused => {
                write!(f, "batch already carries results; build a fresh batch per run")
            }
            DispatchError::InvalidBoard { board, reason } => {
                write!(f, "board {}: {}", board, reason)
            }
            DispatchError::TraceCount { boards, traces } => {
                write!(
                    f,
                    "play analysis needs one trace per board: {} boards, {} traces",
                    boards, traces
                )
            }
            DispatchError::InvalidTrace { board, reason } => {
                write!(f, "trace for board {}: {}", board, reason)
            }
            DispatchError::MissingTraces => {
                write!(f, "play analysis requires a trace buffer; use run_with_plays")
            }
        }
    }
}

impl std::error::Error for DispatchError {}
