//! Card and lens vocabulary for the game.
//!
//! Content (role/synergy/challenge cards) is owned by the content catalog;
//! these are the value types the engine passes around. Categories and lenses
//! are fixed enums because the lens multiplier table is a fixed 6x6 lookup.

use serde::{Deserialize, Serialize};

pub const CATEGORY_COUNT: usize = 6;
pub const LENS_COUNT: usize = 6;

/// The challenge categories a game can draw rounds from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Design,
    Engineering,
    Research,
    Strategy,
    Communication,
    Operations,
}

impl Category {
    pub const ALL: [Category; CATEGORY_COUNT] = [
        Category::Design,
        Category::Engineering,
        Category::Research,
        Category::Strategy,
        Category::Communication,
        Category::Operations,
    ];

    pub fn index(self) -> usize {
        match self {
            Category::Design => 0,
            Category::Engineering => 1,
            Category::Research => 2,
            Category::Strategy => 3,
            Category::Communication => 4,
            Category::Operations => 5,
        }
    }
}

/// How well a role card fits a category.
///
/// `NotApplicable` cards are never dealt into a hand for that category; the
/// tier still carries a (low) base score so reuse plays stay well-defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    Perfect,
    Good,
    NotApplicable,
}

/// The per-game strategic lens a participant commits to in round 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleLens {
    Visionary,
    Builder,
    Scholar,
    Strategist,
    Diplomat,
    Operator,
}

impl RoleLens {
    pub const ALL: [RoleLens; LENS_COUNT] = [
        RoleLens::Visionary,
        RoleLens::Builder,
        RoleLens::Scholar,
        RoleLens::Strategist,
        RoleLens::Diplomat,
        RoleLens::Operator,
    ];

    pub fn index(self) -> usize {
        match self {
            RoleLens::Visionary => 0,
            RoleLens::Builder => 1,
            RoleLens::Scholar => 2,
            RoleLens::Strategist => 3,
            RoleLens::Diplomat => 4,
            RoleLens::Operator => 5,
        }
    }
}

/// Single-use alternatives to a standard role+synergy submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialCard {
    GuaranteedScore,
    ReusePreviousRole,
}

/// A role card with a quality rating per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCard {
    pub id: i64,
    pub name: String,
    pub quality: [QualityTier; CATEGORY_COUNT],
}

impl RoleCard {
    pub fn quality_for(&self, category: Category) -> QualityTier {
        self.quality[category.index()]
    }
}

/// A synergy card granting an additive percentage uplift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynergyCard {
    pub id: i64,
    pub name: String,
    pub bonus_pct: u8,
}

/// A challenge prompt for one round, flavor for the round's category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeCard {
    pub id: i64,
    pub category: Category,
    pub prompt: String,
}
