use std::sync::OnceLock;

use ddbatch_core::{Card, Deal, Seat, Strain};
use ddbatch_search::TrickTable;

use crate::DispatchError;

/// Ceiling on boards per batch
pub const MAX_BOARDS: usize = 200;

/// Which per-board operation a batch run performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Tricks for one strain and opening leader
    Solve,
    /// Full 5x4 double-dummy table
    Calc,
    /// Trick count after every card of a recorded play
    Play,
}

/// One solve request: immutable input data, identified by its index
/// within the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub deal: Deal,
    pub strain: Strain,
    pub leader: Seat,
    /// Optional trick goal; narrows the solve to a window test
    pub target: Option<u8>,
}

impl Board {
    pub fn new(deal: Deal, strain: Strain, leader: Seat) -> Self {
        Board {
            deal,
            strain,
            leader,
            target: None,
        }
    }

    pub fn with_target(mut self, target: u8) -> Self {
        self.target = Some(target);
        self
    }
}

/// A recorded play sequence for one board, supplied alongside the batch
/// in play-analysis mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayRecord {
    pub cards: Vec<Card>,
}

impl PlayRecord {
    pub fn new(cards: Vec<Card>) -> Self {
        PlayRecord { cards }
    }
}

/// The outcome written into a board's result slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardResult {
    /// Declaring-side tricks (solve mode)
    Tricks(u8),
    /// Full table (calc mode)
    Table(TrickTable),
    /// Declaring-side tricks before the first card and after each card
    /// of the trace (play mode)
    Play(Vec<u8>),
}

/// An ordered batch of boards with one preallocated, write-once result
/// slot per board.
///
/// The structure never changes during a run; workers write result slots
/// for the board indices they were assigned, and the slots for duplicate
/// boards are filled by copy-back after all workers finish. Slots are
/// write-once, so a batch serves exactly one run.
#[derive(Debug, Default)]
pub struct Batch {
    boards: Vec<Board>,
    results: Vec<OnceLock<BoardResult>>,
}

impl Batch {
    pub fn new() -> Self {
        Batch::default()
    }

    /// Append a board, up to [`MAX_BOARDS`]
    pub fn push(&mut self, board: Board) -> Result<(), DispatchError> {
        if self.boards.len() >= MAX_BOARDS {
            return Err(DispatchError::BatchFull(MAX_BOARDS));
        }
        self.boards.push(board);
        self.results.push(OnceLock::new());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.boards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    pub fn board(&self, index: usize) -> &Board {
        &self.boards[index]
    }

    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    /// The result for a board, once its slot has been written
    pub fn result(&self, index: usize) -> Option<&BoardResult> {
        self.results[index].get()
    }

    /// True while no slot has been written
    pub(crate) fn is_fresh(&self) -> bool {
        self.results.iter().all(|slot| slot.get().is_none())
    }

    /// Write a board's slot. Each slot is written at most once per run:
    /// by the worker that solved the board, or by copy-back for a
    /// duplicate.
    pub(crate) fn set_result(&self, index: usize, result: BoardResult) {
        self.results[index].set(result).ok();
    }
}
