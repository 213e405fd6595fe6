//! In-memory seeded catalog.
//!
//! Stands in for the external content service: same lookup contract, content
//! fixed at construction. Tests use it directly; production wires it in
//! until a remote catalog client exists.

use async_trait::async_trait;

use super::{CatalogError, ContentCatalog};
use crate::domain::cards::{
    Category, ChallengeCard, QualityTier, RoleCard, SynergyCard, CATEGORY_COUNT,
};

pub struct SeedCatalog {
    roles: Vec<RoleCard>,
    synergies: Vec<SynergyCard>,
    challenges: Vec<ChallengeCard>,
}

fn role(id: i64, name: &str, perfect: &[Category], good: &[Category]) -> RoleCard {
    let mut quality = [QualityTier::NotApplicable; CATEGORY_COUNT];
    for &c in perfect {
        quality[c.index()] = QualityTier::Perfect;
    }
    for &c in good {
        quality[c.index()] = QualityTier::Good;
    }
    RoleCard {
        id,
        name: name.to_string(),
        quality,
    }
}

fn synergy(id: i64, name: &str, bonus_pct: u8) -> SynergyCard {
    SynergyCard {
        id,
        name: name.to_string(),
        bonus_pct,
    }
}

fn challenge(id: i64, category: Category, prompt: &str) -> ChallengeCard {
    ChallengeCard {
        id,
        category,
        prompt: prompt.to_string(),
    }
}

impl SeedCatalog {
    pub fn new() -> Self {
        use Category::{Communication, Design, Engineering, Operations, Research, Strategy};

        // Two perfect roles per category; every role is good in two others.
        let roles = vec![
            role(1, "Sketch Artist", &[Design], &[Communication, Research]),
            role(2, "Systems Stylist", &[Design], &[Engineering, Strategy]),
            role(3, "Pipeline Plumber", &[Engineering], &[Operations, Design]),
            role(4, "Refactoring Surgeon", &[Engineering], &[Research, Strategy]),
            role(5, "Field Interviewer", &[Research], &[Communication, Design]),
            role(6, "Data Spelunker", &[Research], &[Engineering, Strategy]),
            role(7, "Roadmap Cartographer", &[Strategy], &[Design, Operations]),
            role(8, "Risk Bookmaker", &[Strategy], &[Research, Engineering]),
            role(9, "Crowd Translator", &[Communication], &[Design, Strategy]),
            role(10, "Bridge Builder", &[Communication], &[Operations, Research]),
            role(11, "Logistics Maestro", &[Operations], &[Engineering, Communication]),
            role(12, "Firefighting Captain", &[Operations], &[Strategy, Communication]),
        ];

        let synergies = vec![
            synergy(101, "Coffee Run", 10),
            synergy(102, "Pair Up", 15),
            synergy(103, "War Room", 20),
            synergy(104, "Standing Ovation", 25),
            synergy(105, "All-Nighter", 30),
            synergy(106, "Rubber Duck", 12),
        ];

        let challenges = vec![
            challenge(201, Design, "Rebrand the product overnight"),
            challenge(202, Design, "Make the settings page lovable"),
            challenge(203, Engineering, "Ship the migration without downtime"),
            challenge(204, Engineering, "Halve the build time"),
            challenge(205, Research, "Find out why users leave at step 3"),
            challenge(206, Research, "Validate the pricing hypothesis"),
            challenge(207, Strategy, "Pick the one market to win first"),
            challenge(208, Strategy, "Outmaneuver the fast-follower"),
            challenge(209, Communication, "Announce the delay gracefully"),
            challenge(210, Communication, "Win over the skeptical board"),
            challenge(211, Operations, "Survive the launch-day traffic"),
            challenge(212, Operations, "Untangle the on-call rotation"),
        ];

        Self {
            roles,
            synergies,
            challenges,
        }
    }
}

impl Default for SeedCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentCatalog for SeedCatalog {
    async fn challenge_cards(&self, category: Category) -> Result<Vec<ChallengeCard>, CatalogError> {
        Ok(self
            .challenges
            .iter()
            .filter(|c| c.category == category)
            .cloned()
            .collect())
    }

    async fn role_cards_by_quality(
        &self,
        category: Category,
        tiers: &[QualityTier],
    ) -> Result<Vec<RoleCard>, CatalogError> {
        Ok(self
            .roles
            .iter()
            .filter(|c| tiers.contains(&c.quality_for(category)))
            .cloned()
            .collect())
    }

    async fn synergy_cards(&self) -> Result<Vec<SynergyCard>, CatalogError> {
        Ok(self.synergies.clone())
    }
}
