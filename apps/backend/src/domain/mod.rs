//! Domain layer: pure game logic types and helpers.

pub mod cards;
pub mod dealing;
pub mod player_view;
pub mod round;
pub mod scoring;
pub mod seats;
pub mod session;
pub mod tricks;

#[cfg(test)]
mod test_gens;
#[cfg(test)]
mod tests_props_legality;
#[cfg(test)]
mod tests_round;
#[cfg(test)]
mod tests_scoring;
#[cfg(test)]
mod tests_session;
#[cfg(test)]
mod tests_tricks;

// Re-exports for ergonomics
pub use cards::{Card, CardFace, Rank, Suit};
pub use dealing::{deal_hands, shuffle, FixedSeedSource, OsSeedSource, SeedSource};
pub use player_view::RoundView;
pub use round::{PlayOutcome, RoundState, RoundStatus};
pub use scoring::{settle_round, MoveWins, RoundSettlement};
pub use seats::{Seat, Team, SEATS};
pub use session::{GameRules, Player, SessionState, SessionStatus};
pub use tricks::MovePlay;
