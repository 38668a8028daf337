use crate::{Card, Hand};

/// The four seats at the table, clockwise from North
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Seat {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Seat {
    /// All seats in clockwise order
    pub const ALL: [Seat; 4] = [Seat::North, Seat::East, Seat::South, Seat::West];

    /// Convert from index (0-3)
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Seat::North),
            1 => Some(Seat::East),
            2 => Some(Seat::South),
            3 => Some(Seat::West),
            _ => None,
        }
    }

    /// Seat as a character (N, E, S, W)
    pub fn to_char(&self) -> char {
        match self {
            Seat::North => 'N',
            Seat::East => 'E',
            Seat::South => 'S',
            Seat::West => 'W',
        }
    }

    /// Parse a seat character (case-insensitive)
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'N' => Some(Seat::North),
            'E' => Some(Seat::East),
            'S' => Some(Seat::South),
            'W' => Some(Seat::West),
            _ => None,
        }
    }

    /// Next seat clockwise
    pub fn next(&self) -> Seat {
        match self {
            Seat::North => Seat::East,
            Seat::East => Seat::South,
            Seat::South => Seat::West,
            Seat::West => Seat::North,
        }
    }

    /// Partner across the table
    pub fn partner(&self) -> Seat {
        match self {
            Seat::North => Seat::South,
            Seat::South => Seat::North,
            Seat::East => Seat::West,
            Seat::West => Seat::East,
        }
    }

    /// True when `other` is this seat or its partner
    pub fn same_side(&self, other: Seat) -> bool {
        *self == other || self.partner() == other
    }
}

/// Per-seat 52-bit card masks; equal fingerprints mean equal deals
/// regardless of the order cards were added to the hands.
pub type DealFingerprint = [u64; 4];

/// A complete deal: one hand per seat. Hands must hold pairwise disjoint
/// cards and equal counts to be a valid solver input; `check()` verifies
/// both.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Deal {
    pub north: Hand,
    pub east: Hand,
    pub south: Hand,
    pub west: Hand,
}

impl Deal {
    /// Create a new empty deal
    pub fn new() -> Self {
        Deal::default()
    }

    /// Get a reference to a hand by seat
    pub fn hand(&self, seat: Seat) -> &Hand {
        match seat {
            Seat::North => &self.north,
            Seat::East => &self.east,
            Seat::South => &self.south,
            Seat::West => &self.west,
        }
    }

    /// Get a mutable reference to a hand by seat
    pub fn hand_mut(&mut self, seat: Seat) -> &mut Hand {
        match seat {
            Seat::North => &mut self.north,
            Seat::East => &mut self.east,
            Seat::South => &mut self.south,
            Seat::West => &mut self.west,
        }
    }

    /// Which seat holds `card`, if any
    pub fn holder(&self, card: Card) -> Option<Seat> {
        Seat::ALL.into_iter().find(|&s| self.hand(s).has_card(card))
    }

    /// Cards per hand (all hands must agree; see `check`)
    pub fn cards_per_hand(&self) -> usize {
        self.north.len()
    }

    /// Content fingerprint: the four hand masks in seat order
    pub fn fingerprint(&self) -> DealFingerprint {
        [
            self.north.mask(),
            self.east.mask(),
            self.south.mask(),
            self.west.mask(),
        ]
    }

    /// Validate the deal as a solver input: equal hand sizes and no card
    /// held twice.
    pub fn check(&self) -> Result<(), String> {
        let n = self.north.len();
        for seat in Seat::ALL {
            let len = self.hand(seat).len();
            if len != n {
                return Err(format!(
                    "unequal hands: {} holds {} cards, North holds {}",
                    seat.to_char(),
                    len,
                    n
                ));
            }
        }
        let fp = self.fingerprint();
        let mut seen = 0u64;
        for (i, mask) in fp.iter().enumerate() {
            if seen & mask != 0 {
                let dup = seen & mask;
                let card = Card::from_index(dup.trailing_zeros() as u8)
                    .map(|c| c.to_string())
                    .unwrap_or_default();
                return Err(format!(
                    "card {} held by two seats (second is {})",
                    card,
                    Seat::ALL[i].to_char()
                ));
            }
            if mask.count_ones() as usize != self.hand(Seat::ALL[i]).len() {
                return Err(format!(
                    "hand {} holds a repeated card",
                    Seat::ALL[i].to_char()
                ));
            }
            seen |= mask;
        }
        Ok(())
    }

    /// Sort all four hands for display
    pub fn sort_all_hands(&mut self) {
        self.north.sort();
        self.east.sort();
        self.south.sort();
        self.west.sort();
    }
}
