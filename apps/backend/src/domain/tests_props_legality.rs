/// Property-based tests for follow-suit legality rules
use proptest::prelude::*;

use crate::domain::cards::hand_has_suit;
use crate::domain::test_gens;
use crate::domain::tricks::{is_legal_play, legal_cards};

proptest! {
    #![proptest_config(test_gens::proptest_config())]

    /// Holding the led suit, only cards of that suit are legal.
    #[test]
    fn prop_must_follow_when_able(
        lead in test_gens::suit(),
        hand in test_gens::hand(),
    ) {
        prop_assume!(hand_has_suit(&hand, lead));
        let legal = legal_cards(&hand, Some(lead));
        prop_assert!(!legal.is_empty());
        for card in &legal {
            prop_assert_eq!(card.suit(), lead);
        }
        let in_suit = hand.iter().filter(|c| c.suit() == lead).count();
        prop_assert_eq!(legal.len(), in_suit);
    }

    /// Void in the led suit, the whole hand is legal.
    #[test]
    fn prop_void_hand_plays_anything(
        lead in test_gens::suit(),
        hand in test_gens::hand(),
    ) {
        prop_assume!(!hand_has_suit(&hand, lead));
        prop_assert_eq!(legal_cards(&hand, Some(lead)), hand.clone());
    }

    /// Leading a move never restricts the hand.
    #[test]
    fn prop_leading_is_unrestricted(hand in test_gens::hand()) {
        for card in &hand {
            prop_assert!(is_legal_play(&hand, *card, None));
        }
    }
}
