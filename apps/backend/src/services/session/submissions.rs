//! Submission validation and lock-in.
//!
//! Rank assignment happens inside the actor, so it is strictly server
//! receipt order even for submissions that arrive in the same millisecond.

use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::cards::{Category, QualityTier, SpecialCard};
use crate::domain::scoring::{score_submission, ScoreInput};
use crate::domain::state::{
    Participant, RoundSubmission, Selection, SelectionInput, SessionPhase,
};
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind};
use crate::ws::protocol::EventEnvelope;

use super::actor::SessionActor;
use super::commands::LockInReceipt;

impl SessionActor {
    pub(super) fn on_submit(
        &mut self,
        participant_id: Uuid,
        input: SelectionInput,
    ) -> Result<LockInReceipt, DomainError> {
        match self.phase {
            SessionPhase::RoundInProgress => {}
            SessionPhase::RoundReveal | SessionPhase::Complete => {
                return Err(DomainError::RoundClosed)
            }
            _ => {
                return Err(DomainError::conflict(
                    ConflictKind::PhaseMismatch,
                    "no round in progress",
                ))
            }
        }

        let round = self.round;
        let idx = self
            .participants
            .iter()
            .position(|p| p.id == participant_id)
            .ok_or_else(|| {
                DomainError::not_found(NotFoundKind::Participant, "participant not in this session")
            })?;
        let Some(record_idx) = self.rounds.len().checked_sub(1) else {
            return Err(DomainError::RoundClosed);
        };
        if self.rounds[record_idx].submission_for(participant_id).is_some() {
            return Err(DomainError::conflict(
                ConflictKind::AlreadyLockedIn,
                "already locked in this round",
            ));
        }
        let category = self.rounds[record_idx].category;

        let validated = validate_selection(&self.participants[idx], &input, category)?;

        // Mutations only after every check has passed.
        let lens = {
            let p = &mut self.participants[idx];
            match validated.special {
                Some(SpecialCard::GuaranteedScore) => p.guaranteed_available = false,
                Some(SpecialCard::ReusePreviousRole) => p.reuse_available = false,
                None => {}
            }
            if let Selection::Standard { role_card_id, .. } = validated.selection {
                p.last_role_play = Some((role_card_id, validated.quality));
            }
            p.lens.ok_or_else(|| {
                DomainError::validation("participant has no role lens assigned")
            })?
        };

        let rank = self.next_rank;
        self.next_rank += 1;

        let breakdown = score_submission(&ScoreInput {
            quality: validated.quality,
            synergy_bonus_pct: validated.synergy_bonus_pct,
            lens,
            category,
            rank,
            special: validated.special,
        });

        self.rounds[record_idx].submissions.push(RoundSubmission {
            participant_id,
            round,
            selection: validated.selection,
            rank: Some(rank),
            breakdown,
            locked_at: OffsetDateTime::now_utc(),
        });

        // Rank only; the selection stays hidden until the reveal.
        self.publish(EventEnvelope::ParticipantLockedIn {
            participant_id,
            rank,
        });

        self.maybe_resolve();
        Ok(LockInReceipt { round, rank })
    }

    /// Resolve early once every active participant has locked in.
    pub(super) fn maybe_resolve(&mut self) {
        if self.phase != SessionPhase::RoundInProgress {
            return;
        }
        let Some(record) = self.rounds.last() else {
            return;
        };
        let all_in = self
            .participants
            .iter()
            .filter(|p| p.is_active())
            .all(|p| record.submission_for(p.id).is_some());
        if all_in {
            self.resolve_round();
        }
    }
}

#[derive(Debug)]
struct ValidatedSelection {
    selection: Selection,
    quality: QualityTier,
    synergy_bonus_pct: u8,
    special: Option<SpecialCard>,
}

/// Check a raw selection against the participant's hand and special-card
/// state. Pure with respect to the participant; consumption happens later.
fn validate_selection(
    p: &Participant,
    input: &SelectionInput,
    category: Category,
) -> Result<ValidatedSelection, DomainError> {
    if input.use_guaranteed_score && input.use_reuse_previous_role {
        return Err(DomainError::InvalidCombination);
    }

    if input.use_guaranteed_score {
        if !p.guaranteed_available {
            return Err(DomainError::CardExhausted(SpecialCard::GuaranteedScore));
        }
        return Ok(ValidatedSelection {
            selection: Selection::GuaranteedScore,
            quality: QualityTier::NotApplicable,
            synergy_bonus_pct: 0,
            special: Some(SpecialCard::GuaranteedScore),
        });
    }

    if input.use_reuse_previous_role {
        if !p.reuse_available {
            return Err(DomainError::CardExhausted(SpecialCard::ReusePreviousRole));
        }
        let Some((_, quality)) = p.last_role_play else {
            return Err(DomainError::conflict(
                ConflictKind::NoPreviousRole,
                "no previous standard role play to reuse",
            ));
        };
        let synergy_bonus_pct = match input.synergy_card_id {
            Some(id) => synergy_bonus(p, id)?,
            None => 0,
        };
        return Ok(ValidatedSelection {
            selection: Selection::ReusePreviousRole {
                synergy_card_id: input.synergy_card_id,
            },
            quality,
            synergy_bonus_pct,
            special: Some(SpecialCard::ReusePreviousRole),
        });
    }

    let role_card_id = input
        .role_card_id
        .ok_or_else(|| DomainError::validation("a role card is required"))?;
    let synergy_card_id = input
        .synergy_card_id
        .ok_or_else(|| DomainError::validation("a synergy card is required"))?;

    let role = p
        .role_hand
        .iter()
        .find(|c| c.id == role_card_id)
        .ok_or_else(|| DomainError::validation("role card not in hand"))?;
    let synergy_bonus_pct = synergy_bonus(p, synergy_card_id)?;

    Ok(ValidatedSelection {
        selection: Selection::Standard {
            role_card_id,
            synergy_card_id,
        },
        quality: role.quality_for(category),
        synergy_bonus_pct,
        special: None,
    })
}

fn synergy_bonus(p: &Participant, synergy_card_id: i64) -> Result<u8, DomainError> {
    p.synergy_hand
        .iter()
        .find(|c| c.id == synergy_card_id)
        .map(|c| c.bonus_pct)
        .ok_or_else(|| DomainError::validation("synergy card not in hand"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cards::{RoleCard, SynergyCard, CATEGORY_COUNT};
    use crate::domain::state::ParticipantKind;

    fn participant() -> Participant {
        let mut quality = [QualityTier::NotApplicable; CATEGORY_COUNT];
        quality[Category::Design.index()] = QualityTier::Perfect;
        quality[Category::Research.index()] = QualityTier::Good;
        let mut p = Participant::new(Uuid::new_v4(), "tester".into(), ParticipantKind::Human);
        p.role_hand = vec![RoleCard {
            id: 7,
            name: "role".into(),
            quality,
        }];
        p.synergy_hand = vec![SynergyCard {
            id: 42,
            name: "syn".into(),
            bonus_pct: 20,
        }];
        p
    }

    fn standard_input() -> SelectionInput {
        SelectionInput {
            role_card_id: Some(7),
            synergy_card_id: Some(42),
            ..SelectionInput::default()
        }
    }

    #[test]
    fn standard_selection_uses_quality_for_round_category() {
        let p = participant();
        let v = validate_selection(&p, &standard_input(), Category::Design).unwrap();
        assert_eq!(v.quality, QualityTier::Perfect);
        assert_eq!(v.synergy_bonus_pct, 20);
        assert!(v.special.is_none());

        let v = validate_selection(&p, &standard_input(), Category::Research).unwrap();
        assert_eq!(v.quality, QualityTier::Good);
    }

    #[test]
    fn both_specials_is_invalid_combination() {
        let p = participant();
        let input = SelectionInput {
            use_guaranteed_score: true,
            use_reuse_previous_role: true,
            ..SelectionInput::default()
        };
        assert!(matches!(
            validate_selection(&p, &input, Category::Design),
            Err(DomainError::InvalidCombination)
        ));
    }

    #[test]
    fn consumed_special_is_card_exhausted() {
        let mut p = participant();
        p.guaranteed_available = false;
        let input = SelectionInput {
            use_guaranteed_score: true,
            ..SelectionInput::default()
        };
        assert!(matches!(
            validate_selection(&p, &input, Category::Design),
            Err(DomainError::CardExhausted(SpecialCard::GuaranteedScore))
        ));
    }

    #[test]
    fn reuse_without_history_is_rejected() {
        let p = participant();
        let input = SelectionInput {
            use_reuse_previous_role: true,
            ..SelectionInput::default()
        };
        match validate_selection(&p, &input, Category::Design) {
            Err(DomainError::StateConflict(ConflictKind::NoPreviousRole, _)) => {}
            other => panic!("expected NoPreviousRole, got {other:?}"),
        }
    }

    #[test]
    fn reuse_keeps_original_round_quality() {
        let mut p = participant();
        p.last_role_play = Some((7, QualityTier::Perfect));
        let input = SelectionInput {
            synergy_card_id: Some(42),
            use_reuse_previous_role: true,
            ..SelectionInput::default()
        };
        // Round category is one the card is useless for; quality still comes
        // from the original play.
        let v = validate_selection(&p, &input, Category::Operations).unwrap();
        assert_eq!(v.quality, QualityTier::Perfect);
        assert_eq!(v.synergy_bonus_pct, 20);
        assert_eq!(v.special, Some(SpecialCard::ReusePreviousRole));
    }

    #[test]
    fn cards_outside_the_hand_are_rejected() {
        let p = participant();
        let input = SelectionInput {
            role_card_id: Some(999),
            synergy_card_id: Some(42),
            ..SelectionInput::default()
        };
        assert!(matches!(
            validate_selection(&p, &input, Category::Design),
            Err(DomainError::Validation(_))
        ));

        let input = SelectionInput {
            role_card_id: Some(7),
            synergy_card_id: Some(999),
            ..SelectionInput::default()
        };
        assert!(matches!(
            validate_selection(&p, &input, Category::Design),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn standard_selection_requires_both_cards() {
        let p = participant();
        let input = SelectionInput {
            role_card_id: Some(7),
            ..SelectionInput::default()
        };
        assert!(matches!(
            validate_selection(&p, &input, Category::Design),
            Err(DomainError::Validation(_))
        ));
    }
}
