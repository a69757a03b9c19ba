//! Deterministic shuffle and deal for the 32-card deck.
//!
//! `shuffle` is a pure function of a 32-bit seed so any round can be
//! replayed from its stored seed. Fresh seeds come from the OS CSPRNG.

use crate::domain::cards::{Card, DECK_SIZE};
use crate::domain::SEATS;

pub const HAND_SIZE: usize = DECK_SIZE / SEATS;

/// Cards shown to the caller before trump is chosen.
pub const PREVIEW_SIZE: usize = 4;

/// 32-bit linear congruential generator (Numerical Recipes constants).
struct Lcg {
    state: u32,
}

impl Lcg {
    fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    fn next(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(1_664_525)
            .wrapping_add(1_013_904_223);
        self.state
    }

    /// Uniform-ish index in `0..bound`; modulo taken in 64 bits.
    fn next_index(&mut self, bound: usize) -> usize {
        (u64::from(self.next()) % bound as u64) as usize
    }
}

/// Fisher-Yates shuffle of the id-ordered deck, last index down to 1.
pub fn shuffle(seed: u32) -> [Card; DECK_SIZE] {
    let mut deck = Card::deck();
    let mut rng = Lcg::new(seed);
    for i in (1..DECK_SIZE).rev() {
        let j = rng.next_index(i + 1);
        deck.swap(i, j);
    }
    deck
}

/// Deal a permutation round-robin: position `p` goes to seat `p % 4`.
pub fn deal(permutation: &[Card; DECK_SIZE]) -> [Vec<Card>; SEATS] {
    let mut hands: [Vec<Card>; SEATS] = std::array::from_fn(|_| Vec::with_capacity(HAND_SIZE));
    for (position, card) in permutation.iter().enumerate() {
        hands[position % SEATS].push(*card);
    }
    hands
}

/// Shuffle then deal in one step.
pub fn deal_hands(seed: u32) -> [Vec<Card>; SEATS] {
    deal(&shuffle(seed))
}

/// First cards of `seat`'s hand in deal order.
pub fn preview(hand: &[Card]) -> &[Card] {
    &hand[..hand.len().min(PREVIEW_SIZE)]
}

/// Source of per-round seeds. Production draws from the OS; tests pin them.
pub trait SeedSource: Send + Sync {
    fn next_seed(&self) -> u32;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct OsSeedSource;

impl SeedSource for OsSeedSource {
    fn next_seed(&self) -> u32 {
        rand::random::<u32>()
    }
}

/// Always returns the same seed.
#[derive(Debug, Clone, Copy)]
pub struct FixedSeedSource(pub u32);

impl SeedSource for FixedSeedSource {
    fn next_seed(&self) -> u32 {
        self.0
    }
}
