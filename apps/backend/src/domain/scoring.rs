//! Pure scoring engine.
//!
//! Everything here is a deterministic function of its inputs so that round
//! results can be audited and replayed. All tunables are fixed constants;
//! the lens multiplier table is a read-only 6x6 lookup in percent
//! fixed-point (100 = 1.0x, all entries >= 100).

use serde::{Deserialize, Serialize};

use crate::domain::cards::{Category, QualityTier, RoleLens, SpecialCard, CATEGORY_COUNT, LENS_COUNT};

/// Base points per quality tier. Three discrete tiers, no interpolation.
pub const BASE_PERFECT: i32 = 100;
pub const BASE_GOOD: i32 = 60;
pub const BASE_OTHER: i32 = 25;

/// The fixed "perfect score" paid out by the guaranteed-score card.
pub const GUARANTEED_SCORE_TOTAL: i32 = 250;

/// Flat bonus added to base when reusing the previous round's role.
pub const REUSE_FLAT_BONUS: i32 = 25;

pub fn base_for(quality: QualityTier) -> i32 {
    match quality {
        QualityTier::Perfect => BASE_PERFECT,
        QualityTier::Good => BASE_GOOD,
        QualityTier::NotApplicable => BASE_OTHER,
    }
}

/// Speed bonus percentage by lock-in rank; 4th and beyond get nothing.
pub fn speed_bonus_pct(rank: u8) -> u8 {
    match rank {
        1 => 15,
        2 => 10,
        3 => 5,
        _ => 0,
    }
}

/// Lens x category multiplier table, percent fixed-point.
///
/// Each lens is strongest in its home category (1.5x), has one or two
/// adjacent affinities, and is neutral (1.0x) elsewhere. Row order follows
/// [`RoleLens::ALL`], column order follows [`Category::ALL`].
static LENS_MULTIPLIER_TABLE: [[u16; CATEGORY_COUNT]; LENS_COUNT] = [
    // Design Engineering Research Strategy Communication Operations
    [150, 100, 110, 125, 110, 100], // Visionary
    [110, 150, 100, 100, 100, 125], // Builder
    [100, 125, 150, 110, 100, 100], // Scholar
    [125, 100, 110, 150, 100, 110], // Strategist
    [100, 100, 100, 110, 150, 125], // Diplomat
    [100, 125, 100, 100, 110, 150], // Operator
];

pub fn lens_multiplier_pct(lens: RoleLens, category: Category) -> u16 {
    LENS_MULTIPLIER_TABLE[lens.index()][category.index()]
}

/// Auditable score components. Fixed shape by design: every field is always
/// present so two breakdowns for the same inputs compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base: i32,
    pub special_flat: i32,
    pub synergy_bonus_pct: u8,
    pub lens_multiplier_pct: u16,
    pub speed_bonus_pct: u8,
    pub total: i32,
}

impl ScoreBreakdown {
    /// The no-selection (deadline auto-zero) breakdown.
    pub fn zero() -> Self {
        Self {
            base: 0,
            special_flat: 0,
            synergy_bonus_pct: 0,
            lens_multiplier_pct: 100,
            speed_bonus_pct: 0,
            total: 0,
        }
    }
}

/// Inputs for scoring a single lock-in.
///
/// For a reuse-previous-role play, `quality` is the quality of the reused
/// role card at its *original* round's category; synergy, lens and speed all
/// come from the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreInput {
    pub quality: QualityTier,
    pub synergy_bonus_pct: u8,
    pub lens: RoleLens,
    pub category: Category,
    pub rank: u8,
    pub special: Option<SpecialCard>,
}

/// Compute the score breakdown for one submission.
///
/// Pipeline: base (+ special flat bonus) -> synergy % -> lens multiplier ->
/// speed % -> round to nearest integer. The guaranteed-score card bypasses
/// the pipeline entirely and pays the fixed maximum.
pub fn score_submission(input: &ScoreInput) -> ScoreBreakdown {
    if input.special == Some(SpecialCard::GuaranteedScore) {
        return ScoreBreakdown {
            base: GUARANTEED_SCORE_TOTAL,
            special_flat: 0,
            synergy_bonus_pct: 0,
            lens_multiplier_pct: 100,
            speed_bonus_pct: 0,
            total: GUARANTEED_SCORE_TOTAL,
        };
    }

    let base = base_for(input.quality);
    let special_flat = match input.special {
        Some(SpecialCard::ReusePreviousRole) => REUSE_FLAT_BONUS,
        _ => 0,
    };
    let lens_pct = lens_multiplier_pct(input.lens, input.category);
    let speed_pct = speed_bonus_pct(input.rank);

    let with_synergy =
        f64::from(base + special_flat) * (1.0 + f64::from(input.synergy_bonus_pct) / 100.0);
    let with_lens = with_synergy * f64::from(lens_pct) / 100.0;
    let with_speed = with_lens * (1.0 + f64::from(speed_pct) / 100.0);

    ScoreBreakdown {
        base,
        special_flat,
        synergy_bonus_pct: input.synergy_bonus_pct,
        lens_multiplier_pct: lens_pct,
        speed_bonus_pct: speed_pct,
        total: with_speed.round() as i32,
    }
}
