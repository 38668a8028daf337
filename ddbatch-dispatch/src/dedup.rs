use rustc_hash::FxHashMap;

use ddbatch_core::{DealFingerprint, Seat, Strain};

use crate::batch::{Batch, PlayRecord, RunMode};

/// Solve-relevant content of one board, normalized so order-of-insertion
/// differences between equal deals disappear
#[derive(PartialEq, Eq, Hash)]
enum ContentKey {
    Solve {
        fingerprint: DealFingerprint,
        strain: Strain,
        leader: Seat,
        target: Option<u8>,
    },
    Calc {
        fingerprint: DealFingerprint,
    },
    Play {
        fingerprint: DealFingerprint,
        strain: Strain,
        leader: Seat,
        trace: Vec<u8>,
    },
}

fn content_key(
    mode: RunMode,
    batch: &Batch,
    traces: Option<&[PlayRecord]>,
    index: usize,
) -> ContentKey {
    let board = batch.board(index);
    match mode {
        RunMode::Solve => ContentKey::Solve {
            fingerprint: board.deal.fingerprint(),
            strain: board.strain,
            leader: board.leader,
            target: board.target,
        },
        // A table covers every strain and leader, so only the cards matter
        RunMode::Calc => ContentKey::Calc {
            fingerprint: board.deal.fingerprint(),
        },
        // Boards are interchangeable only when the whole recorded
        // sequence matches; a shared prefix is not enough, since the
        // result has one entry per card of this board's own trace
        RunMode::Play => ContentKey::Play {
            fingerprint: board.deal.fingerprint(),
            strain: board.strain,
            leader: board.leader,
            trace: traces
                .and_then(|traces| traces.get(index))
                .map(|record| record.cards.iter().map(|c| c.to_index()).collect())
                .unwrap_or_default(),
        },
    }
}

/// Group boards with identical solve-relevant content.
///
/// Returns the representatives (first occurrence of each content class,
/// in batch order) and the crossref map sending every index to its
/// class's representative. Solving only the representatives and
/// broadcasting through the map is observably identical to solving every
/// board, provided the solve step is pure in its declared inputs, which
/// is a precondition this pass cannot check.
///
/// Runs single-threaded before dispatch; workers need the unique set to
/// be stable.
pub fn detect_duplicates(
    mode: RunMode,
    batch: &Batch,
    traces: Option<&[PlayRecord]>,
) -> (Vec<usize>, Vec<usize>) {
    let mut uniques = Vec::new();
    let mut crossrefs = Vec::with_capacity(batch.len());
    let mut first_seen: FxHashMap<ContentKey, usize> = FxHashMap::default();

    for index in 0..batch.len() {
        let key = content_key(mode, batch, traces, index);
        match first_seen.get(&key) {
            Some(&representative) => crossrefs.push(representative),
            None => {
                first_seen.insert(key, index);
                uniques.push(index);
                crossrefs.push(index);
            }
        }
    }

    (uniques, crossrefs)
}
