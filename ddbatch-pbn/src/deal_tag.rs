use crate::oneline::{format_hand, parse_hand};
use crate::ParseError;
use ddbatch_core::{Deal, Seat};

/// Parse a PBN `Deal` tag value:
/// `N:AKQT3.J6.KJ42.95 652.AK42.AQ87.T4 J74.QT95.T.AK863 98.873.9653.QJ72`
///
/// The letter before the colon names the seat holding the first hand; the
/// remaining hands follow clockwise.
pub fn parse_deal_tag(input: &str) -> Result<Deal, ParseError> {
    let trimmed = input.trim();
    let (first, hands_str) = trimmed
        .split_once(':')
        .ok_or_else(|| ParseError::new("missing ':' after the first seat letter"))?;

    let mut seat = parse_first_seat(first)?;

    let hands: Vec<&str> = hands_str.split_whitespace().collect();
    if hands.len() != 4 {
        return Err(ParseError::new(format!(
            "expected 4 hands after the seat prefix, got {}",
            hands.len()
        )));
    }

    let mut deal = Deal::new();
    for hand_str in hands {
        *deal.hand_mut(seat) = parse_hand(hand_str)?;
        seat = seat.next();
    }

    Ok(deal)
}

/// Format a deal as a PBN `Deal` tag value, North first
pub fn format_deal_tag(deal: &Deal) -> String {
    let mut out = String::from("N:");
    let mut seat = Seat::North;
    for i in 0..4 {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format_hand(deal.hand(seat)));
        seat = seat.next();
    }
    out
}

fn parse_first_seat(s: &str) -> Result<Seat, ParseError> {
    let mut chars = s.chars();
    match (chars.next().and_then(Seat::from_char), chars.next()) {
        (Some(seat), None) => Ok(seat),
        _ => Err(ParseError::new(format!("invalid first-seat letter: {:?}", s))),
    }
}
