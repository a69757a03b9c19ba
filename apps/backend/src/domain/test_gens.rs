// Proptest generators for domain types.

use proptest::prelude::*;

use crate::domain::{Card, Suit};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(256);
    ProptestConfig::with_cases(cases)
}

pub fn suit() -> impl Strategy<Value = Suit> {
    prop_oneof![
        Just(Suit::Spades),
        Just(Suit::Hearts),
        Just(Suit::Clubs),
        Just(Suit::Diamonds),
    ]
}

pub fn card() -> impl Strategy<Value = Card> {
    (0u8..32).prop_map(|id| Card::new(id).unwrap())
}

/// A hand of 1..=8 distinct cards, in random order.
pub fn hand() -> impl Strategy<Value = Vec<Card>> {
    Just(Card::deck().to_vec())
        .prop_shuffle()
        .prop_flat_map(|deck| (1usize..=8).prop_map(move |n| deck[..n].to_vec()))
}

/// Four distinct cards for one complete move.
pub fn four_distinct_cards() -> impl Strategy<Value = Vec<Card>> {
    Just(Card::deck().to_vec())
        .prop_shuffle()
        .prop_map(|deck| deck[..4].to_vec())
}
