//! Random seat filler - picks uniformly among legal choices.
//!
//! Reference implementation of [`SeatFiller`](super::SeatFiller) and the
//! baseline opponent in tests. Demonstrates the expected patterns: interior
//! mutability behind a `Mutex`, optional seeding for determinism, and no
//! panics on empty inputs.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use super::trait_def::{AiError, SeatFiller, SeatView};
use crate::domain::cards::RoleLens;
use crate::domain::state::SelectionInput;

pub struct RandomFiller {
    /// `Mutex` because trait methods take `&self` but the RNG needs `&mut`.
    rng: Mutex<StdRng>,
}

impl RandomFiller {
    pub const NAME: &'static str = "RandomFiller";
    pub const VERSION: &'static str = "1.0.0";

    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl SeatFiller for RandomFiller {
    fn choose_lens(&self, options: &[RoleLens]) -> Result<RoleLens, AiError> {
        if options.is_empty() {
            return Err(AiError::InvalidSelection("no lens options offered".into()));
        }
        let mut rng = self
            .rng
            .lock()
            .map_err(|e| AiError::Internal(format!("RNG lock poisoned: {e}")))?;
        options
            .choose(&mut *rng)
            .copied()
            .ok_or_else(|| AiError::Internal("failed to choose lens".into()))
    }

    fn choose_selection(&self, view: &SeatView) -> Result<SelectionInput, AiError> {
        if view.role_hand.is_empty() {
            return Err(AiError::InvalidSelection("empty role hand".into()));
        }
        let mut rng = self
            .rng
            .lock()
            .map_err(|e| AiError::Internal(format!("RNG lock poisoned: {e}")))?;

        // One-in-five chance to spend an available special card.
        if view.guaranteed_available && rng.random_bool(0.2) {
            return Ok(SelectionInput {
                role_card_id: None,
                synergy_card_id: None,
                use_guaranteed_score: true,
                use_reuse_previous_role: false,
            });
        }

        let role = view
            .role_hand
            .choose(&mut *rng)
            .ok_or_else(|| AiError::Internal("failed to choose role card".into()))?;
        let synergy = view.synergy_hand.choose(&mut *rng);

        if view.reuse_available && view.has_previous_role && rng.random_bool(0.2) {
            return Ok(SelectionInput {
                role_card_id: None,
                synergy_card_id: synergy.map(|c| c.id),
                use_guaranteed_score: false,
                use_reuse_previous_role: true,
            });
        }

        Ok(SelectionInput {
            role_card_id: Some(role.id),
            synergy_card_id: synergy.map(|c| c.id),
            use_guaranteed_score: false,
            use_reuse_previous_role: false,
        })
    }
}
