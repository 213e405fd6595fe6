//! Property tests for the scoring pipeline and hand construction (pure
//! domain, no actors).

include!("common/proptest_prelude.rs");

use std::collections::HashSet;

use backend::domain::cards::{Category, QualityTier, RoleCard, RoleLens, SpecialCard, SynergyCard};
use backend::domain::hands::{build_role_hand, draw_synergy_hand, sample_categories};
use backend::domain::scoring::{
    lens_multiplier_pct, score_submission, ScoreInput, GUARANTEED_SCORE_TOTAL,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn any_category() -> impl Strategy<Value = Category> {
    (0..Category::ALL.len()).prop_map(|i| Category::ALL[i])
}

fn any_lens() -> impl Strategy<Value = RoleLens> {
    (0..RoleLens::ALL.len()).prop_map(|i| RoleLens::ALL[i])
}

fn any_quality() -> impl Strategy<Value = QualityTier> {
    prop_oneof![
        Just(QualityTier::Perfect),
        Just(QualityTier::Good),
        Just(QualityTier::NotApplicable),
    ]
}

fn any_pool() -> impl Strategy<Value = Vec<RoleCard>> {
    prop::collection::vec(prop::array::uniform6(any_quality()), 1..24).prop_map(|qualities| {
        qualities
            .into_iter()
            .enumerate()
            .map(|(i, quality)| RoleCard {
                id: i as i64 + 1,
                name: format!("Role {}", i + 1),
                quality,
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(proptest_prelude_config())]

    /// Property: scoring is a pure function; same inputs, same breakdown.
    #[test]
    fn prop_scoring_is_deterministic(
        quality in any_quality(),
        synergy in 0u8..=30,
        lens in any_lens(),
        category in any_category(),
        rank in 1u8..=8,
    ) {
        let input = ScoreInput {
            quality,
            synergy_bonus_pct: synergy,
            lens,
            category,
            rank,
            special: None,
        };
        prop_assert_eq!(score_submission(&input), score_submission(&input));
    }

    /// Property: the guaranteed-score card bypasses the pipeline entirely,
    /// whatever else was in play that round.
    #[test]
    fn prop_guaranteed_score_bypasses_pipeline(
        quality in any_quality(),
        synergy in 0u8..=30,
        lens in any_lens(),
        category in any_category(),
        rank in 1u8..=8,
    ) {
        let input = ScoreInput {
            quality,
            synergy_bonus_pct: synergy,
            lens,
            category,
            rank,
            special: Some(SpecialCard::GuaranteedScore),
        };
        let breakdown = score_submission(&input);
        prop_assert_eq!(breakdown.total, GUARANTEED_SCORE_TOTAL);
        prop_assert_eq!(breakdown.synergy_bonus_pct, 0);
        prop_assert_eq!(breakdown.lens_multiplier_pct, 100);
        prop_assert_eq!(breakdown.speed_bonus_pct, 0);
    }

    /// Property: locking in earlier never scores less, all else equal.
    #[test]
    fn prop_speed_bonus_is_monotonic(
        quality in any_quality(),
        synergy in 0u8..=30,
        lens in any_lens(),
        category in any_category(),
        earlier in 1u8..=7,
        gap in 1u8..=7,
    ) {
        let later = earlier.saturating_add(gap);
        let score_at = |rank: u8| {
            score_submission(&ScoreInput {
                quality,
                synergy_bonus_pct: synergy,
                lens,
                category,
                rank,
                special: None,
            })
            .total
        };
        prop_assert!(score_at(earlier) >= score_at(later));
    }

    /// Property: a bigger synergy bonus never scores less, all else equal.
    #[test]
    fn prop_synergy_never_hurts(
        quality in any_quality(),
        lens in any_lens(),
        category in any_category(),
        rank in 1u8..=8,
        low in 0u8..=15,
        bump in 1u8..=15,
    ) {
        let score_with = |synergy: u8| {
            score_submission(&ScoreInput {
                quality,
                synergy_bonus_pct: synergy,
                lens,
                category,
                rank,
                special: None,
            })
            .total
        };
        prop_assert!(score_with(low + bump) >= score_with(low));
    }

    /// Property: reuse adds a flat bonus before the multipliers, so it can
    /// only help relative to the same standard play.
    #[test]
    fn prop_reuse_flat_bonus_helps(
        quality in any_quality(),
        synergy in 0u8..=30,
        lens in any_lens(),
        category in any_category(),
        rank in 1u8..=8,
    ) {
        let base_input = ScoreInput {
            quality,
            synergy_bonus_pct: synergy,
            lens,
            category,
            rank,
            special: None,
        };
        let reuse_input = ScoreInput {
            special: Some(SpecialCard::ReusePreviousRole),
            ..base_input
        };
        prop_assert!(score_submission(&reuse_input).total > score_submission(&base_input).total);
    }

    /// Property: the role hand always contains every perfect card in the
    /// pool, never a not-applicable one, and never a duplicate.
    #[test]
    fn prop_role_hand_tier_rules(
        pool in any_pool(),
        category in any_category(),
        hand_size in 1usize..=8,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let hand = build_role_hand(&pool, category, hand_size, &mut rng);

        let perfect_ids: HashSet<i64> = pool
            .iter()
            .filter(|c| c.quality_for(category) == QualityTier::Perfect)
            .map(|c| c.id)
            .collect();
        let hand_ids: HashSet<i64> = hand.iter().map(|c| c.id).collect();

        prop_assert_eq!(hand_ids.len(), hand.len(), "no duplicates in hand");
        prop_assert!(perfect_ids.is_subset(&hand_ids), "all perfects dealt");
        for card in &hand {
            prop_assert!(card.quality_for(category) != QualityTier::NotApplicable);
        }
        // Good cards only fill the remaining slots.
        prop_assert!(hand.len() <= hand_size.max(perfect_ids.len()));
    }

    /// Property: synergy hands are distinct draws from the deck.
    #[test]
    fn prop_synergy_hand_distinct(
        deck_size in 1usize..=12,
        hand_size in 1usize..=6,
        seed in any::<u64>(),
    ) {
        let deck: Vec<SynergyCard> = (0..deck_size)
            .map(|i| SynergyCard {
                id: i as i64 + 100,
                name: format!("Synergy {i}"),
                bonus_pct: (i as u8 % 3 + 1) * 10,
            })
            .collect();
        let mut rng = StdRng::seed_from_u64(seed);
        let hand = draw_synergy_hand(&deck, hand_size, &mut rng);

        prop_assert_eq!(hand.len(), hand_size.min(deck.len()));
        let ids: HashSet<i64> = hand.iter().map(|c| c.id).collect();
        prop_assert_eq!(ids.len(), hand.len());
    }

    /// Property: per-game categories are distinct and sized to the request.
    #[test]
    fn prop_sampled_categories_distinct(
        n in 1usize..=6,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let categories = sample_categories(n, &mut rng);
        prop_assert_eq!(categories.len(), n);
        let set: HashSet<Category> = categories.iter().copied().collect();
        prop_assert_eq!(set.len(), categories.len());
    }
}

#[test]
fn lens_table_never_penalizes_and_favors_home_category() {
    for (i, &lens) in RoleLens::ALL.iter().enumerate() {
        for (j, &category) in Category::ALL.iter().enumerate() {
            let pct = lens_multiplier_pct(lens, category);
            assert!(pct >= 100, "{lens:?} x {category:?} must not penalize");
            if i == j {
                assert_eq!(pct, 150, "{lens:?} home multiplier");
            }
        }
    }
}
