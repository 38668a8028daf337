use ddbatch_core::{Card, Deal, Seat, Strain, Suit};

/// The trick currently on the table
#[derive(Clone, Debug)]
pub(crate) struct Trick {
    cards_played: Vec<(Seat, Card)>,
    leader: Seat,
}

impl Trick {
    fn new(leader: Seat) -> Self {
        Trick {
            cards_played: Vec::with_capacity(4),
            leader,
        }
    }

    /// The suit led, once a card is down
    fn suit_led(&self) -> Option<Suit> {
        self.cards_played.first().map(|(_, card)| card.suit)
    }

    /// Winner of a completed trick
    fn winner(&self, trump: Option<Suit>) -> Option<Seat> {
        if self.cards_played.len() < 4 {
            return None;
        }

        let suit_led = self.suit_led()?;
        let mut winning = self.cards_played[0];
        for &(seat, card) in &self.cards_played[1..] {
            if beats(card, winning.1, suit_led, trump) {
                winning = (seat, card);
            }
        }
        Some(winning.0)
    }
}

/// Check if `card` beats `other` given the suit led and the trump suit
fn beats(card: Card, other: Card, suit_led: Suit, trump: Option<Suit>) -> bool {
    if let Some(trump) = trump {
        if card.suit == trump && other.suit != trump {
            return true;
        }
        if other.suit == trump && card.suit != trump {
            return false;
        }
    }

    if card.suit == suit_led && other.suit != suit_led {
        return true;
    }
    if other.suit == suit_led && card.suit != suit_led {
        return false;
    }

    card.suit == other.suit && card.rank > other.rank
}

/// Exact play state: remaining cards, trick in progress, and the running
/// trick count for the declaring side (the opening leader's partnership).
#[derive(Clone)]
pub(crate) struct GameState {
    hands: [Vec<Card>; 4],
    trick: Trick,
    trump: Option<Suit>,
    declaring: Seat,
    tricks_won: u8,
    tricks_played: u8,
    total_tricks: u8,
}

impl GameState {
    pub(crate) fn new(deal: &Deal, strain: Strain, leader: Seat) -> Self {
        let mut hands: [Vec<Card>; 4] = Default::default();
        for seat in Seat::ALL {
            hands[seat as usize] = deal.hand(seat).cards().to_vec();
        }
        let total_tricks = deal.cards_per_hand() as u8;

        GameState {
            hands,
            trick: Trick::new(leader),
            trump: strain.trump(),
            declaring: leader,
            tricks_won: 0,
            tricks_played: 0,
            total_tricks,
        }
    }

    /// The seat due to play the next card
    pub(crate) fn next_player(&self) -> Seat {
        match self.trick.cards_played.last() {
            None => self.trick.leader,
            Some(&(seat, _)) => seat.next(),
        }
    }

    /// True when the declaring side is due to play
    pub(crate) fn declaring_side_to_move(&self) -> bool {
        self.declaring.same_side(self.next_player())
    }

    /// True between tricks (no card down on the current trick)
    pub(crate) fn trick_open(&self) -> bool {
        self.trick.cards_played.is_empty()
    }

    pub(crate) fn is_terminal(&self) -> bool {
        self.tricks_played >= self.total_tricks
    }

    pub(crate) fn tricks_won(&self) -> u8 {
        self.tricks_won
    }

    pub(crate) fn tricks_remaining(&self) -> u8 {
        self.total_tricks - self.tricks_played
    }

    /// Legal cards for the player to act: follow suit when possible,
    /// otherwise anything
    pub(crate) fn legal_moves(&self) -> Vec<Card> {
        let hand = &self.hands[self.next_player() as usize];

        if let Some(suit_led) = self.trick.suit_led() {
            let following: Vec<Card> = hand
                .iter()
                .filter(|c| c.suit == suit_led)
                .copied()
                .collect();
            if !following.is_empty() {
                return following;
            }
        }

        hand.clone()
    }

    /// Legal moves ordered high-to-low within each suit, with touching
    /// cards collapsed: holding both the K and the Q makes them
    /// interchangeable, so each run of adjacent ranks is searched once.
    pub(crate) fn ordered_moves(&self) -> Vec<Card> {
        let mut moves = self.legal_moves();
        moves.sort_by(|a, b| {
            b.suit
                .cmp(&a.suit)
                .then_with(|| b.rank.cmp(&a.rank))
        });

        let mut kept: Vec<Card> = Vec::with_capacity(moves.len());
        for card in moves {
            if let Some(prev) = kept.last_mut() {
                if prev.suit == card.suit && prev.rank as u8 == card.rank as u8 + 1 {
                    // Equivalent to the card just kept; replace so the run
                    // keeps collapsing
                    *prev = card;
                    continue;
                }
            }
            kept.push(card);
        }
        kept
    }

    /// Play a card for the seat to act; returns false if the card is not
    /// a legal move.
    pub(crate) fn play_card(&mut self, card: Card) -> bool {
        if !self.legal_moves().contains(&card) {
            return false;
        }
        let player = self.next_player();
        let hand = &mut self.hands[player as usize];
        let pos = match hand.iter().position(|&c| c == card) {
            Some(pos) => pos,
            None => return false,
        };
        hand.remove(pos);

        self.trick.cards_played.push((player, card));

        if self.trick.cards_played.len() == 4 {
            let winner = self
                .trick
                .winner(self.trump)
                .expect("four cards played");
            if self.declaring.same_side(winner) {
                self.tricks_won += 1;
            }
            self.tricks_played += 1;
            self.trick = Trick::new(winner);
        }

        true
    }

    /// Position hash for the transposition table. Only meaningful between
    /// tricks; excludes the running trick count so cached bounds are
    /// relative to the position, not the path into it.
    pub(crate) fn position_hash(&self) -> u64 {
        const SEAT_RAND: [u64; 4] = [
            0x9b8b4567327b23c7,
            0x643c986966334873,
            0x74b0dc5119495cff,
            0x2ae8944a625558ec,
        ];

        let mut hash = (self.trick.leader as u64).wrapping_mul(0x9e3779b97f4a7c15);
        for seat in Seat::ALL {
            let mask: u64 = self.hands[seat as usize]
                .iter()
                .fold(0u64, |m, c| m | (1u64 << c.to_index()));
            hash ^= mask
                .wrapping_add(SEAT_RAND[seat as usize])
                .wrapping_mul(SEAT_RAND[(seat as usize + 1) % 4]);
        }
        hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddbatch_core::Rank;

    fn deal(cards: [&[(Suit, Rank)]; 4]) -> Deal {
        let mut deal = Deal::new();
        for (seat, hand) in Seat::ALL.into_iter().zip(cards) {
            for &(suit, rank) in hand {
                deal.hand_mut(seat).add_card(Card::new(suit, rank));
            }
        }
        deal
    }

    #[test]
    fn test_trick_winner_follows_suit() {
        let d = deal([
            &[(Suit::Hearts, Rank::Ace)],
            &[(Suit::Hearts, Rank::King)],
            &[(Suit::Hearts, Rank::Queen)],
            &[(Suit::Hearts, Rank::Jack)],
        ]);
        let mut state = GameState::new(&d, Strain::NoTrump, Seat::North);
        for card in [
            Card::new(Suit::Hearts, Rank::Ace),
            Card::new(Suit::Hearts, Rank::King),
            Card::new(Suit::Hearts, Rank::Queen),
            Card::new(Suit::Hearts, Rank::Jack),
        ] {
            assert!(state.play_card(card));
        }
        assert!(state.is_terminal());
        assert_eq!(state.tricks_won(), 1);
    }

    #[test]
    fn test_trump_beats_plain_suit() {
        let d = deal([
            &[(Suit::Hearts, Rank::Ace)],
            &[(Suit::Clubs, Rank::Two)],
            &[(Suit::Hearts, Rank::Three)],
            &[(Suit::Hearts, Rank::Four)],
        ]);
        let mut state = GameState::new(&d, Strain::Clubs, Seat::North);
        assert!(state.play_card(Card::new(Suit::Hearts, Rank::Ace)));
        assert!(state.play_card(Card::new(Suit::Clubs, Rank::Two)));
        assert!(state.play_card(Card::new(Suit::Hearts, Rank::Three)));
        assert!(state.play_card(Card::new(Suit::Hearts, Rank::Four)));
        // East ruffed North's ace
        assert_eq!(state.tricks_won(), 0);
    }

    #[test]
    fn test_must_follow_suit() {
        let d = deal([
            &[(Suit::Spades, Rank::Two), (Suit::Hearts, Rank::Two)],
            &[(Suit::Spades, Rank::Three), (Suit::Hearts, Rank::Three)],
            &[(Suit::Spades, Rank::Four), (Suit::Hearts, Rank::Four)],
            &[(Suit::Spades, Rank::Five), (Suit::Hearts, Rank::Five)],
        ]);
        let mut state = GameState::new(&d, Strain::NoTrump, Seat::North);
        assert!(state.play_card(Card::new(Suit::Spades, Rank::Two)));
        // East holds a spade, so a heart is not legal
        assert!(!state.play_card(Card::new(Suit::Hearts, Rank::Three)));
        assert!(state.play_card(Card::new(Suit::Spades, Rank::Three)));
    }

    #[test]
    fn test_ordered_moves_collapse_touching() {
        let d = deal([
            &[
                (Suit::Spades, Rank::Ace),
                (Suit::Spades, Rank::King),
                (Suit::Spades, Rank::Ten),
            ],
            &[
                (Suit::Spades, Rank::Queen),
                (Suit::Hearts, Rank::Two),
                (Suit::Hearts, Rank::Three),
            ],
            &[
                (Suit::Spades, Rank::Two),
                (Suit::Clubs, Rank::Two),
                (Suit::Clubs, Rank::Three),
            ],
            &[
                (Suit::Spades, Rank::Three),
                (Suit::Diamonds, Rank::Two),
                (Suit::Diamonds, Rank::Three),
            ],
        ]);
        let state = GameState::new(&d, Strain::NoTrump, Seat::North);
        // A and K touch: only the lower survives the collapse, the ten
        // stays separate
        let moves = state.ordered_moves();
        assert_eq!(
            moves,
            vec![
                Card::new(Suit::Spades, Rank::King),
                Card::new(Suit::Spades, Rank::Ten),
            ]
        );
    }

    #[test]
    fn test_position_hash_ignores_path() {
        // Two different orders of the same two completed tricks reach the
        // same remaining position with the same leader
        let d = deal([
            &[(Suit::Hearts, Rank::Ace), (Suit::Spades, Rank::Ace)],
            &[(Suit::Hearts, Rank::Two), (Suit::Spades, Rank::Two)],
            &[(Suit::Hearts, Rank::Three), (Suit::Spades, Rank::Three)],
            &[(Suit::Hearts, Rank::Four), (Suit::Spades, Rank::Four)],
        ]);
        let mut a = GameState::new(&d, Strain::NoTrump, Seat::North);
        for card in [
            Card::new(Suit::Hearts, Rank::Ace),
            Card::new(Suit::Hearts, Rank::Two),
            Card::new(Suit::Hearts, Rank::Three),
            Card::new(Suit::Hearts, Rank::Four),
        ] {
            assert!(a.play_card(card));
        }

        let b = {
            let mut deal2 = Deal::new();
            deal2.north.add_card(Card::new(Suit::Spades, Rank::Ace));
            deal2.east.add_card(Card::new(Suit::Spades, Rank::Two));
            deal2.south.add_card(Card::new(Suit::Spades, Rank::Three));
            deal2.west.add_card(Card::new(Suit::Spades, Rank::Four));
            GameState::new(&deal2, Strain::NoTrump, Seat::North)
        };

        assert_eq!(a.position_hash(), b.position_hash());
    }
}
