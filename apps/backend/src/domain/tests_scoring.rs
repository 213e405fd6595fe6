use crate::domain::cards::{Category, QualityTier, RoleLens, SpecialCard};
use crate::domain::scoring::{
    lens_multiplier_pct, score_submission, speed_bonus_pct, ScoreBreakdown, ScoreInput,
    GUARANTEED_SCORE_TOTAL, REUSE_FLAT_BONUS,
};

fn standard_input() -> ScoreInput {
    ScoreInput {
        quality: QualityTier::Perfect,
        synergy_bonus_pct: 20,
        lens: RoleLens::Visionary,
        category: Category::Design,
        rank: 1,
        special: None,
    }
}

#[test]
fn standard_pipeline_order_is_synergy_then_lens_then_speed() {
    // base 100, +20% synergy = 120, x1.5 lens = 180, +15% speed = 207
    let breakdown = score_submission(&standard_input());
    assert_eq!(breakdown.base, 100);
    assert_eq!(breakdown.synergy_bonus_pct, 20);
    assert_eq!(breakdown.lens_multiplier_pct, 150);
    assert_eq!(breakdown.speed_bonus_pct, 15);
    assert_eq!(breakdown.total, 207);
}

#[test]
fn scoring_is_deterministic_for_identical_inputs() {
    let input = standard_input();
    assert_eq!(score_submission(&input), score_submission(&input));
}

#[test]
fn guaranteed_score_ignores_synergy_lens_and_rank() {
    // Lens would be 1.5x, synergy 20%, rank 1: formula result would be 207.
    let mut input = standard_input();
    input.special = Some(SpecialCard::GuaranteedScore);
    let breakdown = score_submission(&input);
    assert_eq!(breakdown.total, GUARANTEED_SCORE_TOTAL);
    assert_eq!(breakdown.synergy_bonus_pct, 0);
    assert_eq!(breakdown.speed_bonus_pct, 0);
}

#[test]
fn reuse_previous_role_adds_flat_bonus_before_multipliers() {
    let input = ScoreInput {
        quality: QualityTier::Good,
        synergy_bonus_pct: 10,
        lens: RoleLens::Builder,
        category: Category::Engineering,
        rank: 2,
        special: Some(SpecialCard::ReusePreviousRole),
    };
    // (60 + 25) * 1.10 = 93.5, x1.5 = 140.25, x1.10 = 154.275 -> 154
    let breakdown = score_submission(&input);
    assert_eq!(breakdown.special_flat, REUSE_FLAT_BONUS);
    assert_eq!(breakdown.total, 154);
}

#[test]
fn rank_four_and_beyond_get_no_speed_bonus() {
    assert_eq!(speed_bonus_pct(1), 15);
    assert_eq!(speed_bonus_pct(2), 10);
    assert_eq!(speed_bonus_pct(3), 5);
    assert_eq!(speed_bonus_pct(4), 0);
    assert_eq!(speed_bonus_pct(17), 0);
}

#[test]
fn lens_table_is_never_below_neutral() {
    for lens in RoleLens::ALL {
        for category in Category::ALL {
            assert!(lens_multiplier_pct(lens, category) >= 100);
        }
    }
}

#[test]
fn every_lens_has_a_home_category() {
    for lens in RoleLens::ALL {
        let best = Category::ALL
            .iter()
            .map(|&c| lens_multiplier_pct(lens, c))
            .max()
            .unwrap();
        assert_eq!(best, 150, "lens {lens:?} should peak at 1.5x");
    }
}

#[test]
fn zero_breakdown_is_all_zeroes() {
    let z = ScoreBreakdown::zero();
    assert_eq!(z.total, 0);
    assert_eq!(z.base, 0);
    assert_eq!(z.special_flat, 0);
}
