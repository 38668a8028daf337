use rustc_hash::FxHashSet;

use ddbatch_core::{Card, Deal, Seat, Strain};

use crate::state::GameState;
use crate::table::{Bounds, TransTable};
use crate::workspace::Workspace;

/// Double-dummy tricks for every strain and declarer.
///
/// `tricks[strain][declarer]` is the number of tricks the declarer's side
/// takes with the declarer on lead, under optimal play by both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrickTable {
    tricks: [[u8; 4]; 5],
}

impl TrickTable {
    pub fn new() -> Self {
        TrickTable::default()
    }

    pub fn set(&mut self, strain: Strain, declarer: Seat, tricks: u8) {
        self.tricks[strain as usize][declarer as usize] = tricks;
    }

    pub fn get(&self, strain: Strain, declarer: Seat) -> u8 {
        self.tricks[strain as usize][declarer as usize]
    }
}

/// Tricks taken by the opening leader's side under optimal play.
///
/// A `target` narrows the search to a one-trick window around the goal:
/// the answer is exact on whichever side of the target the position falls,
/// which is enough to know whether the goal is met. `None` (or a target of
/// zero) solves exactly.
pub fn solve(
    ws: &mut Workspace,
    deal: &Deal,
    strain: Strain,
    leader: Seat,
    target: Option<u8>,
) -> u8 {
    ws.tt.begin_board();
    let state = GameState::new(deal, strain, leader);
    solve_state(&state, target, &mut ws.tt)
}

/// Full double-dummy table: every strain, every declarer on lead
pub fn calc_table(ws: &mut Workspace, deal: &Deal) -> TrickTable {
    let mut table = TrickTable::new();
    for strain in Strain::ALL {
        for declarer in Seat::ALL {
            ws.tt.begin_board();
            let state = GameState::new(deal, strain, declarer);
            let tricks = solve_state(&state, None, &mut ws.tt);
            table.set(strain, declarer, tricks);
        }
    }
    table
}

/// Declaring-side tricks under optimal play of the remainder, before the
/// first trace card and after every card played.
///
/// The returned vector has `trace.len() + 1` entries; a drop between
/// consecutive entries marks the played card as an error. The trace must
/// be legal for the deal (see [`validate_trace`]).
pub fn analyse_play(
    ws: &mut Workspace,
    deal: &Deal,
    strain: Strain,
    leader: Seat,
    trace: &[Card],
) -> Vec<u8> {
    ws.tt.begin_board();
    let mut state = GameState::new(deal, strain, leader);
    let mut scores = Vec::with_capacity(trace.len() + 1);
    scores.push(solve_state(&state, None, &mut ws.tt));
    for &card in trace {
        let played = state.play_card(card);
        debug_assert!(played, "trace must be validated before analysis");
        scores.push(solve_state(&state, None, &mut ws.tt));
    }
    scores
}

/// Check that a recorded play sequence is legal for the deal: every card
/// held by the seat due to play it, no card twice, follow-suit respected.
pub fn validate_trace(
    deal: &Deal,
    strain: Strain,
    leader: Seat,
    trace: &[Card],
) -> Result<(), String> {
    if trace.len() > deal.cards_per_hand() * 4 {
        return Err(format!(
            "trace holds {} cards but the deal only has {}",
            trace.len(),
            deal.cards_per_hand() * 4
        ));
    }

    let mut seen: FxHashSet<u8> = FxHashSet::default();
    let mut state = GameState::new(deal, strain, leader);
    for (i, &card) in trace.iter().enumerate() {
        if !seen.insert(card.to_index()) {
            return Err(format!("card {} appears twice (position {})", card, i));
        }
        let player = state.next_player();
        if !state.play_card(card) {
            return Err(format!(
                "card {} is not a legal play for {} (position {})",
                card,
                player.to_char(),
                i
            ));
        }
    }
    Ok(())
}

/// Exact or window-bounded value of a state
fn solve_state(state: &GameState, target: Option<u8>, tt: &mut TransTable) -> u8 {
    let total = state.tricks_won() + state.tricks_remaining();
    let (alpha, beta) = match target {
        Some(t) if t > 0 => {
            let t = t.min(total);
            (t - 1, t)
        }
        _ => (0, total),
    };
    search(state, alpha, beta, tt)
}

/// Alpha-beta over declaring-side tricks, fail-hard, with bounds cached at
/// trick boundaries. Cached bounds are relative to the position (tricks
/// still available), so transpositions reached with different running
/// scores share entries.
fn search(state: &GameState, mut alpha: u8, mut beta: u8, tt: &mut TransTable) -> u8 {
    if state.is_terminal() {
        return state.tricks_won();
    }

    let boundary = state.trick_open();
    let mut hash = 0u64;
    if boundary {
        hash = state.position_hash();
        let cached = tt.probe(hash, state.tricks_remaining());
        let lower = state.tricks_won() + cached.lower;
        let upper = state.tricks_won() + cached.upper;
        if lower >= beta {
            return lower;
        }
        if upper <= alpha {
            return upper;
        }
        if lower == upper {
            return lower;
        }
        alpha = alpha.max(lower);
        beta = beta.min(upper);
    }

    let value = if state.declaring_side_to_move() {
        let mut value = alpha;
        for card in state.ordered_moves() {
            let mut next = state.clone();
            next.play_card(card);
            let score = search(&next, value, beta, tt);
            value = value.max(score);
            if value >= beta {
                break;
            }
        }
        value
    } else {
        let mut value = beta;
        for card in state.ordered_moves() {
            let mut next = state.clone();
            next.play_card(card);
            let score = search(&next, alpha, value, tt);
            value = value.min(score);
            if value <= alpha {
                break;
            }
        }
        value
    };

    if boundary {
        let won = state.tricks_won();
        let mut bounds = tt.probe(hash, state.tricks_remaining());
        let relative = value.saturating_sub(won);
        if value >= beta {
            bounds.lower = bounds.lower.max(relative);
        } else if value <= alpha {
            bounds.upper = bounds.upper.min(relative);
        } else {
            bounds = Bounds::new(relative, relative);
        }
        tt.store(hash, bounds);
    }

    value
}
