//! Heuristic seat filler.
//!
//! Plays a recognisably sensible game: best-quality role card for the round's
//! category, a random synergy draw, and an occasional special card. The lens
//! is a plain random assignment. Seedable so fixtures replay identically.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use super::trait_def::{AiError, SeatFiller, SeatView};
use crate::domain::cards::{QualityTier, RoleLens};
use crate::domain::state::SelectionInput;

pub struct HeuristicFiller {
    rng: Mutex<StdRng>,
    /// Chance in percent of spending an available special card per round.
    special_chance_pct: u8,
}

impl HeuristicFiller {
    pub const NAME: &'static str = "HeuristicFiller";
    pub const VERSION: &'static str = "1.1.0";

    pub fn new(seed: Option<u64>, special_chance_pct: u8) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng: Mutex::new(rng),
            special_chance_pct: special_chance_pct.min(100),
        }
    }

    fn lock_rng(&self) -> Result<std::sync::MutexGuard<'_, StdRng>, AiError> {
        self.rng
            .lock()
            .map_err(|e| AiError::Internal(format!("RNG lock poisoned: {e}")))
    }
}

impl SeatFiller for HeuristicFiller {
    fn choose_lens(&self, options: &[RoleLens]) -> Result<RoleLens, AiError> {
        if options.is_empty() {
            return Err(AiError::InvalidSelection("no lens options offered".into()));
        }
        // Round categories are unknown at lens time, so the lens is a random
        // draw; the heuristic only kicks in once a category is on the table.
        let mut rng = self.lock_rng()?;
        options
            .choose(&mut *rng)
            .copied()
            .ok_or_else(|| AiError::Internal("failed to choose lens".into()))
    }

    fn choose_selection(&self, view: &SeatView) -> Result<SelectionInput, AiError> {
        let mut rng = self.lock_rng()?;
        let spend_special = rng.random_range(0..100u8) < self.special_chance_pct;

        if spend_special && view.guaranteed_available {
            return Ok(SelectionInput {
                role_card_id: None,
                synergy_card_id: None,
                use_guaranteed_score: true,
                use_reuse_previous_role: false,
            });
        }

        let synergy_id = view.synergy_hand.choose(&mut *rng).map(|c| c.id);

        if spend_special && view.reuse_available && view.has_previous_role {
            return Ok(SelectionInput {
                role_card_id: None,
                synergy_card_id: synergy_id,
                use_guaranteed_score: false,
                use_reuse_previous_role: true,
            });
        }

        let perfects: Vec<_> = view
            .role_hand
            .iter()
            .filter(|c| c.quality_for(view.category) == QualityTier::Perfect)
            .collect();
        let role_id = if perfects.is_empty() {
            view.role_hand.choose(&mut *rng).map(|c| c.id)
        } else {
            perfects.choose(&mut *rng).map(|c| c.id)
        };
        let role_id =
            role_id.ok_or_else(|| AiError::InvalidSelection("empty role hand".into()))?;

        Ok(SelectionInput {
            role_card_id: Some(role_id),
            synergy_card_id: synergy_id,
            use_guaranteed_score: false,
            use_reuse_previous_role: false,
        })
    }
}
