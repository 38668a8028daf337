use crate::ParseError;
use ddbatch_core::{Card, Deal, Hand, Rank, Seat, Suit};

/// Parse a deal in oneline format:
/// `n AKQT3.J6.KJ42.95 e 652.AK42.AQ87.T4 s J74.QT95.T.AK863 w 98.873.9653.QJ72`
pub fn parse_oneline(input: &str) -> Result<Deal, ParseError> {
    let parts: Vec<&str> = input.trim().split_whitespace().collect();

    if parts.len() != 8 {
        return Err(ParseError::new(format!(
            "expected 8 fields (4 seat letters + 4 hands), got {}",
            parts.len()
        )));
    }

    let mut deal = Deal::new();
    for i in 0..4 {
        let seat = parse_seat_field(parts[i * 2])?;
        let hand = parse_hand(parts[i * 2 + 1])?;
        *deal.hand_mut(seat) = hand;
    }

    Ok(deal)
}

/// Format a deal in oneline format
pub fn format_oneline(deal: &Deal) -> String {
    let mut out = String::new();
    for seat in Seat::ALL {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push(seat.to_char().to_ascii_lowercase());
        out.push(' ');
        out.push_str(&format_hand(deal.hand(seat)));
    }
    out
}

fn parse_seat_field(s: &str) -> Result<Seat, ParseError> {
    let mut chars = s.chars();
    match (chars.next().and_then(Seat::from_char), chars.next()) {
        (Some(seat), None) => Ok(seat),
        _ => Err(ParseError::new(format!("invalid seat letter: {:?}", s))),
    }
}

/// Parse a hand in `Spades.Hearts.Diamonds.Clubs` layout; an empty segment
/// is a void suit.
pub(crate) fn parse_hand(s: &str) -> Result<Hand, ParseError> {
    let segments: Vec<&str> = s.split('.').collect();
    if segments.len() != 4 {
        return Err(ParseError::new(format!(
            "expected 4 dot-separated suits, got {} in {:?}",
            segments.len(),
            s
        )));
    }

    let mut hand = Hand::new();
    let suits = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];
    for (&suit, segment) in suits.iter().zip(segments) {
        for c in segment.chars() {
            let rank = Rank::from_char(c)
                .ok_or_else(|| ParseError::new(format!("invalid rank character: {:?}", c)))?;
            hand.add_card(Card::new(suit, rank));
        }
    }

    Ok(hand)
}

/// Format a hand in `Spades.Hearts.Diamonds.Clubs` layout
pub(crate) fn format_hand(hand: &Hand) -> String {
    let suits = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];
    let segments: Vec<String> = suits
        .iter()
        .map(|&suit| {
            let mut cards = hand.cards_in_suit(suit);
            cards.sort_by(|a, b| b.rank.cmp(&a.rank));
            cards.iter().map(|c| c.rank.to_char()).collect()
        })
        .collect();
    segments.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_oneline() {
        let input = "n AKQT3.J6.KJ42.95 e 652.AK42.AQ87.T4 s J74.QT95.T.AK863 w 98.873.9653.QJ72";
        let deal = parse_oneline(input).unwrap();

        let north = deal.hand(Seat::North);
        assert_eq!(north.len(), 13);
        assert_eq!(north.suit_length(Suit::Spades), 5);
        assert_eq!(north.suit_length(Suit::Hearts), 2);
        assert_eq!(north.suit_length(Suit::Diamonds), 4);
        assert_eq!(north.suit_length(Suit::Clubs), 2);
        assert!(deal.check().is_ok());
    }

    #[test]
    fn test_parse_void_suit() {
        let input = "n AKQT3.J6.KJ42.95 e 652.AK42.AQ87.T4 s .QJ8.Q95432.AQ97 w J74.T953.T6.K863";
        let deal = parse_oneline(input).unwrap();
        let south = deal.hand(Seat::South);
        assert_eq!(south.suit_length(Suit::Spades), 0);
        assert_eq!(south.len(), 13);
    }

    #[test]
    fn test_round_trip() {
        let input = "n A754.7642.KJ2.A9 e QT.AK95.87.K8652 s K93.J83.QT6543.T w J862.QT.A9.QJ743";
        let deal = parse_oneline(input).unwrap();
        let reparsed = parse_oneline(&format_oneline(&deal)).unwrap();
        assert_eq!(deal, reparsed);
    }

    #[test]
    fn test_rejects_bad_field_count() {
        assert!(parse_oneline("n AKQT3.J6.KJ42.95").is_err());
    }

    #[test]
    fn test_rejects_bad_rank() {
        let input = "n AKQX3.J6.KJ42.95 e 652.AK42.AQ87.T4 s J74.QT95.T.AK863 w 98.873.9653.QJ72";
        assert!(parse_oneline(input).is_err());
    }
}
