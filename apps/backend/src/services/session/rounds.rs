//! Round lifecycle: begin, lens selection, round start, deadline handling,
//! resolution and completion.

use std::time::Duration;

use rand::seq::IndexedRandom;
use rand::Rng;
use time::OffsetDateTime;
use tokio::time::Instant;
use uuid::Uuid;

use crate::ai::SeatView;
use crate::domain::cards::RoleLens;
use crate::domain::hands::{build_role_hand, draw_synergy_hand};
use crate::domain::scoring::ScoreBreakdown;
use crate::domain::state::{
    leaderboard, Participant, ParticipantKind, ParticipantSummary, PresenceStatus, RoundRecord,
    RoundSubmission, Selection, SessionPhase,
};
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind};
use crate::services::rooms::{LifecycleEvent, SessionArchive};
use crate::ws::protocol::{DealtHand, EventEnvelope, RevealEntry};

use super::actor::SessionActor;
use super::commands::SessionCommand;

/// Static pool of AI seat names, cycled per session.
const AI_NAMES: &[&str] = &[
    "Nova", "Pixel", "Echo", "Juno", "Vesper", "Quill", "Mango", "Sprocket",
];

impl SessionActor {
    /// Top up AI seats, open role-lens selection.
    pub(super) fn on_begin(&mut self) {
        if !matches!(
            self.phase,
            SessionPhase::AwaitingPlayers | SessionPhase::Intermission
        ) {
            return;
        }
        self.top_up_ai();
        self.phase = SessionPhase::RoleSelect;
        self.round = 0;
        self.deadline = Some(Instant::now() + self.cfg.lens_select_deadline);
        self.publish(EventEnvelope::LensSelectStarted {
            options: RoleLens::ALL.to_vec(),
            deadline_ms: self.cfg.lens_select_deadline.as_millis() as u64,
        });

        let ai_ids: Vec<Uuid> = self
            .participants
            .iter()
            .filter(|p| p.kind == ParticipantKind::Ai)
            .map(|p| p.id)
            .collect();
        for id in ai_ids {
            self.schedule_ai_lens(id);
        }
    }

    pub(super) fn top_up_ai(&mut self) {
        while self.active_count() < self.cfg.min_seats {
            let name = AI_NAMES[self.ai_count % AI_NAMES.len()];
            self.ai_count += 1;
            let id = Uuid::new_v4();
            let mut participant =
                Participant::new(id, format!("{name} (AI)"), ParticipantKind::Ai);
            if self.round > 0 {
                // Joined after the lens round; the lens is assigned on the spot.
                participant.lens = RoleLens::ALL.choose(&mut self.rng).copied();
            }
            let summary = ParticipantSummary::from(&participant);
            self.participants.push(participant);
            self.publish(EventEnvelope::ParticipantJoined {
                participant: summary,
            });
            self.hub
                .track_presence(&self.topic(), id, PresenceStatus::Active);
        }
    }

    pub(super) fn on_select_lens(
        &mut self,
        participant_id: Uuid,
        lens: RoleLens,
    ) -> Result<(), DomainError> {
        if self.phase != SessionPhase::RoleSelect {
            return Err(DomainError::conflict(
                ConflictKind::PhaseMismatch,
                "lens selection is only open during round 0",
            ));
        }
        let p = self
            .participants
            .iter_mut()
            .find(|p| p.id == participant_id)
            .ok_or_else(|| {
                DomainError::not_found(NotFoundKind::Participant, "participant not in this session")
            })?;
        if p.lens.is_some() {
            return Err(DomainError::conflict(
                ConflictKind::LensAlreadySet,
                "role lens is immutable once chosen",
            ));
        }
        p.lens = Some(lens);
        if self.all_lenses_set() {
            self.start_round(1);
        }
        Ok(())
    }

    pub(super) fn all_lenses_set(&self) -> bool {
        self.participants
            .iter()
            .filter(|p| p.is_active())
            .all(|p| p.lens.is_some())
    }

    pub(super) fn on_deadline(&mut self) {
        self.deadline = None;
        match self.phase {
            SessionPhase::RoleSelect => {
                // Undecided participants get a random lens, the game moves on.
                for p in self.participants.iter_mut().filter(|p| p.lens.is_none()) {
                    p.lens = RoleLens::ALL.choose(&mut self.rng).copied();
                }
                self.start_round(1);
            }
            SessionPhase::RoundInProgress => self.resolve_round(),
            SessionPhase::RoundReveal => self.start_round(self.round + 1),
            _ => {}
        }
    }

    pub(super) fn start_round(&mut self, round: u8) {
        let Some(&category) = self.setup.categories.get((round - 1) as usize) else {
            self.complete();
            return;
        };
        if round > 1 {
            // AI top-up only ever happens between rounds.
            self.top_up_ai();
        }

        self.round = round;
        self.phase = SessionPhase::RoundInProgress;
        self.next_rank = 1;

        let pool = self
            .setup
            .role_pools
            .get(&category)
            .cloned()
            .unwrap_or_default();
        let Some(challenge) = self
            .setup
            .challenges
            .get(&category)
            .and_then(|cards| cards.choose(&mut self.rng))
            .cloned()
        else {
            // Session setup refuses empty challenge lists, so this means the
            // setup is corrupt. Abort loudly rather than run a silent round.
            tracing::error!(
                session_id = %self.id,
                category = ?category,
                "no challenge card available for round, aborting session"
            );
            self.abort();
            return;
        };

        let mut hands = Vec::new();
        for p in self.participants.iter_mut().filter(|p| p.is_active()) {
            p.role_hand = build_role_hand(&pool, category, self.cfg.role_hand_size, &mut self.rng);
            p.synergy_hand =
                draw_synergy_hand(&self.setup.synergy_deck, self.cfg.synergy_hand_size, &mut self.rng);
            hands.push(DealtHand {
                participant_id: p.id,
                role_hand: p.role_hand.clone(),
                synergy_hand: p.synergy_hand.clone(),
            });
        }

        self.rounds.push(RoundRecord {
            round,
            category,
            challenge: challenge.clone(),
            submissions: Vec::new(),
            resolved: false,
        });
        self.deadline = Some(Instant::now() + self.cfg.round_deadline);

        self.publish(EventEnvelope::RoundStarted {
            round,
            category,
            challenge,
            deadline_ms: self.cfg.round_deadline.as_millis() as u64,
            hands,
        });

        self.schedule_ai_submits(round);
    }

    pub(super) fn schedule_ai_lens(&mut self, participant_id: Uuid) {
        let lens = self
            .filler
            .choose_lens(&RoleLens::ALL)
            .unwrap_or(RoleLens::Visionary);
        let delay = self.ai_delay(self.cfg.lens_select_deadline);
        let tx = self.self_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(SessionCommand::AiSelectLens {
                participant_id,
                lens,
            });
        });
    }

    fn schedule_ai_submits(&mut self, round: u8) {
        let category = match self.rounds.last() {
            Some(r) => r.category,
            None => return,
        };

        let mut decided = Vec::new();
        for p in self.participants.iter().filter(|p| p.is_active()) {
            if p.kind != ParticipantKind::Ai {
                continue;
            }
            let view = SeatView {
                category,
                role_hand: p.role_hand.clone(),
                synergy_hand: p.synergy_hand.clone(),
                guaranteed_available: p.guaranteed_available,
                reuse_available: p.reuse_available,
                has_previous_role: p.last_role_play.is_some(),
            };
            match self.filler.choose_selection(&view) {
                Ok(input) => decided.push((p.id, input)),
                Err(err) => tracing::warn!(
                    session_id = %self.id,
                    participant_id = %p.id,
                    error = %err,
                    "seat filler failed to choose, seat will auto-zero"
                ),
            }
        }

        for (participant_id, input) in decided {
            let delay = self.ai_delay(self.cfg.round_deadline);
            let tx = self.self_tx.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = tx.send(SessionCommand::AiSubmit {
                    participant_id,
                    round,
                    input,
                });
            });
        }
    }

    /// Jittered AI delay, always strictly inside the current phase window so
    /// an AI can never cause a round overrun.
    fn ai_delay(&mut self, window: Duration) -> Duration {
        let margin = window.saturating_sub(window / 10);
        let hi = self.cfg.ai_delay_max.min(margin).max(Duration::from_millis(1));
        let lo = self.cfg.ai_delay_min.min(hi);
        let ms = self
            .rng
            .random_range(lo.as_millis() as u64..=hi.as_millis() as u64);
        Duration::from_millis(ms)
    }

    /// Resolve the current round: auto-zero the missing, reveal everything,
    /// update totals, then either pause before the next round or complete.
    pub(super) fn resolve_round(&mut self) {
        let round = self.round;
        let Some(idx) = self.rounds.len().checked_sub(1) else {
            return;
        };

        let missing: Vec<Uuid> = self
            .participants
            .iter()
            .filter(|p| p.is_active())
            .filter(|p| self.rounds[idx].submission_for(p.id).is_none())
            .map(|p| p.id)
            .collect();
        for participant_id in missing {
            self.rounds[idx].submissions.push(RoundSubmission {
                participant_id,
                round,
                selection: Selection::NoSelection,
                rank: None,
                breakdown: ScoreBreakdown::zero(),
                locked_at: OffsetDateTime::now_utc(),
            });
            // A missed deadline demotes presence to away.
            if let Some(p) = self
                .participants
                .iter_mut()
                .find(|p| p.id == participant_id)
            {
                if p.presence == PresenceStatus::Active {
                    p.presence = PresenceStatus::Away;
                }
            }
            self.hub
                .track_presence(&self.topic(), participant_id, PresenceStatus::Away);
        }

        self.rounds[idx].resolved = true;

        // Cumulative totals only move at resolution, never per lock-in.
        for sub in self.rounds[idx].submissions.clone() {
            if let Some(p) = self
                .participants
                .iter_mut()
                .find(|p| p.id == sub.participant_id)
            {
                p.score_total += i64::from(sub.breakdown.total);
            }
        }

        let results: Vec<RevealEntry> = self.rounds[idx]
            .submissions
            .iter()
            .map(|sub| {
                let (display_name, score_total) = self
                    .participants
                    .iter()
                    .find(|p| p.id == sub.participant_id)
                    .map(|p| (p.display_name.clone(), p.score_total))
                    .unwrap_or_default();
                RevealEntry {
                    participant_id: sub.participant_id,
                    display_name,
                    selection: sub.selection.clone(),
                    rank: sub.rank,
                    breakdown: sub.breakdown,
                    score_total,
                }
            })
            .collect();

        // Reveal and leaderboard go out back to back after every score is
        // known; subscribers never see a partial round.
        self.publish(EventEnvelope::RoundRevealed { round, results });
        self.publish(EventEnvelope::LeaderboardUpdated {
            entries: leaderboard(&self.participants),
        });

        if round >= self.cfg.rounds_per_game {
            self.complete();
        } else {
            self.phase = SessionPhase::RoundReveal;
            self.deadline = Some(Instant::now() + self.cfg.reveal_delay);
        }
    }

    fn complete(&mut self) {
        self.phase = SessionPhase::Complete;
        self.deadline = None;
        self.stopping = true;

        let board = leaderboard(&self.participants);
        self.publish(EventEnvelope::SessionEnded {
            session_id: self.id,
            aborted: false,
            leaderboard: board.clone(),
        });
        self.record_outcome(&board, false);

        let continuing_humans: Vec<(Uuid, String)> = self
            .participants
            .iter()
            .filter(|p| p.kind == ParticipantKind::Human && p.is_active())
            .map(|p| (p.id, p.display_name.clone()))
            .collect();
        let archive = SessionArchive {
            session_id: self.id,
            room_id: self.room_id,
            game_number: self.game_number,
            aborted: false,
            leaderboard: board,
        };
        let _ = self.lifecycle.send(LifecycleEvent::SessionComplete {
            room_id: self.room_id,
            session_id: self.id,
            archive,
            continuing_humans,
        });
        self.hub.retire_topic(&self.topic());
    }
}
