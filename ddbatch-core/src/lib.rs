//! Core bridge types for the ddbatch double-dummy solver.
//!
//! Cards, hands, seats and deals, plus the content fingerprint that the
//! batch layer uses to recognize identical solve requests. Deals are not
//! required to hold 13 cards per hand: endgame positions with equal,
//! shorter hands are valid solver inputs.

mod card;
mod deal;
mod hand;
mod strain;

pub use card::{Card, Rank, Suit};
pub use deal::{Deal, DealFingerprint, Seat};
pub use hand::Hand;
pub use strain::Strain;
