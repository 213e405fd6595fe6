use std::sync::Arc;

use rand::rngs::StdRng;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::ai::{registry, HeuristicFiller, SeatFiller};
use crate::config::EngineConfig;
use crate::domain::state::{
    leaderboard, Participant, ParticipantKind, ParticipantSummary, PresenceStatus, RoomId,
    RoundRecord, SessionPhase,
};
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind};
use crate::services::progression::{GameOutcome, ProgressionSink};
use crate::services::rooms::{LifecycleEvent, SessionArchive};
use crate::ws::protocol::EventEnvelope;
use crate::ws::{Topic, TopicHub};

use super::commands::{LeaveOutcome, SessionCommand, SessionStatus};
use super::SessionSetup;

pub(super) struct SessionActor {
    pub(super) id: Uuid,
    pub(super) room_id: RoomId,
    pub(super) game_number: i64,
    pub(super) cfg: EngineConfig,
    pub(super) setup: SessionSetup,
    pub(super) hub: Arc<TopicHub>,
    pub(super) progression: Arc<dyn ProgressionSink>,
    pub(super) lifecycle: mpsc::UnboundedSender<LifecycleEvent>,
    pub(super) self_tx: mpsc::UnboundedSender<SessionCommand>,
    rx: mpsc::UnboundedReceiver<SessionCommand>,

    pub(super) phase: SessionPhase,
    /// 0 = role-lens selection, 1..=N = scored rounds.
    pub(super) round: u8,
    pub(super) participants: Vec<Participant>,
    pub(super) rounds: Vec<RoundRecord>,
    /// The single live deadline; which transition it fires depends on `phase`.
    pub(super) deadline: Option<Instant>,
    pub(super) next_rank: u8,
    pub(super) rng: StdRng,
    pub(super) filler: Box<dyn SeatFiller + Send + Sync>,
    pub(super) ai_count: usize,
    pub(super) stopping: bool,
}

impl SessionActor {
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        id: Uuid,
        room_id: RoomId,
        game_number: i64,
        initial_phase: SessionPhase,
        cfg: EngineConfig,
        setup: SessionSetup,
        rng: StdRng,
        hub: Arc<TopicHub>,
        progression: Arc<dyn ProgressionSink>,
        lifecycle: mpsc::UnboundedSender<LifecycleEvent>,
        self_tx: mpsc::UnboundedSender<SessionCommand>,
        rx: mpsc::UnboundedReceiver<SessionCommand>,
    ) -> Self {
        let filler = make_filler(&cfg);
        Self {
            id,
            room_id,
            game_number,
            cfg,
            setup,
            hub,
            progression,
            lifecycle,
            self_tx,
            rx,
            phase: initial_phase,
            round: 0,
            participants: Vec::new(),
            rounds: Vec::new(),
            deadline: None,
            next_rank: 1,
            rng,
            filler,
            ai_count: 0,
            stopping: false,
        }
    }

    pub(super) fn topic(&self) -> Topic {
        Topic::Session { id: self.id }
    }

    pub(super) fn publish(&self, event: EventEnvelope) {
        self.hub.publish(&self.topic(), event);
    }

    pub(super) async fn run(mut self) {
        info!(
            session_id = %self.id,
            room_id = self.room_id,
            game_number = self.game_number,
            "session actor started"
        );
        loop {
            let deadline = self.deadline;
            tokio::select! {
                biased;
                // Deadline first: a round is force-resolved before any
                // submission that raced past expiry is looked at.
                _ = Self::until(deadline) => self.on_deadline(),
                cmd = self.rx.recv() => match cmd {
                    Some(cmd) => self.handle(cmd),
                    None => break,
                },
            }
            if self.stopping {
                break;
            }
        }
        info!(session_id = %self.id, "session actor stopped");
    }

    async fn until(deadline: Option<Instant>) {
        match deadline {
            Some(d) => tokio::time::sleep_until(d).await,
            None => std::future::pending().await,
        }
    }

    fn handle(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::Join {
                player_id,
                display_name,
                kind,
                reply,
            } => {
                let _ = reply.send(self.on_join(player_id, display_name, kind));
            }
            SessionCommand::Begin => self.on_begin(),
            SessionCommand::SelectLens {
                participant_id,
                lens,
                reply,
            } => {
                let _ = reply.send(self.on_select_lens(participant_id, lens));
            }
            SessionCommand::Submit {
                participant_id,
                input,
                reply,
            } => {
                let _ = reply.send(self.on_submit(participant_id, input));
            }
            SessionCommand::Leave {
                participant_id,
                reply,
            } => {
                let _ = reply.send(self.on_leave(participant_id));
            }
            SessionCommand::Status { reply } => {
                let _ = reply.send(self.status());
            }
            SessionCommand::Leaderboard { reply } => {
                let _ = reply.send(leaderboard(&self.participants));
            }
            SessionCommand::Terminate => self.abort(),
            SessionCommand::AiSelectLens {
                participant_id,
                lens,
            } => {
                if self.phase == SessionPhase::RoleSelect {
                    if let Err(err) = self.on_select_lens(participant_id, lens) {
                        debug!(
                            session_id = %self.id,
                            participant_id = %participant_id,
                            error = %err,
                            "AI lens pick dropped"
                        );
                    }
                }
            }
            SessionCommand::AiSubmit {
                participant_id,
                round,
                input,
            } => {
                // Stale timers from an earlier round are dropped, never scored.
                if self.phase == SessionPhase::RoundInProgress && round == self.round {
                    if let Err(err) = self.on_submit(participant_id, input) {
                        debug!(
                            session_id = %self.id,
                            participant_id = %participant_id,
                            round,
                            error = %err,
                            "AI submission dropped"
                        );
                    }
                }
            }
        }
    }

    fn on_join(
        &mut self,
        player_id: Uuid,
        display_name: String,
        kind: ParticipantKind,
    ) -> Result<ParticipantSummary, DomainError> {
        match self.phase {
            SessionPhase::AwaitingPlayers
            | SessionPhase::Intermission
            | SessionPhase::RoleSelect => {}
            _ => {
                return Err(DomainError::conflict(
                    ConflictKind::PhaseMismatch,
                    "game already in progress, join at next intermission",
                ))
            }
        }

        if let Some(existing) = self.participants.iter_mut().find(|p| p.id == player_id) {
            existing.presence = PresenceStatus::Active;
            let summary = ParticipantSummary::from(&*existing);
            self.hub
                .track_presence(&self.topic(), player_id, PresenceStatus::Active);
            return Ok(summary);
        }

        let participant = Participant::new(player_id, display_name, kind);
        let summary = ParticipantSummary::from(&participant);
        self.participants.push(participant);
        self.publish(EventEnvelope::ParticipantJoined {
            participant: summary.clone(),
        });
        self.hub
            .track_presence(&self.topic(), player_id, PresenceStatus::Active);

        if self.phase == SessionPhase::RoleSelect && kind == ParticipantKind::Ai {
            self.schedule_ai_lens(player_id);
        }
        Ok(summary)
    }

    fn on_leave(&mut self, participant_id: Uuid) -> Result<LeaveOutcome, DomainError> {
        let Some(idx) = self
            .participants
            .iter()
            .position(|p| p.id == participant_id)
        else {
            return Err(DomainError::not_found(
                NotFoundKind::Participant,
                "participant not in this session",
            ));
        };

        if self.participants[idx].presence == PresenceStatus::Disconnected {
            return Ok(LeaveOutcome {
                was_active: false,
                humans_remaining: self.humans_remaining(),
            });
        }

        self.participants[idx].presence = PresenceStatus::Disconnected;
        self.publish(EventEnvelope::ParticipantLeft { participant_id });
        self.hub
            .track_presence(&self.topic(), participant_id, PresenceStatus::Disconnected);

        let humans_remaining = self.humans_remaining();
        if humans_remaining == 0 {
            self.abort();
        } else if self.phase == SessionPhase::RoundInProgress {
            // The leaver no longer blocks resolution.
            self.maybe_resolve();
        } else if self.phase == SessionPhase::RoleSelect && self.all_lenses_set() {
            self.start_round(1);
        }

        Ok(LeaveOutcome {
            was_active: true,
            humans_remaining,
        })
    }

    pub(super) fn humans_remaining(&self) -> usize {
        self.participants
            .iter()
            .filter(|p| p.kind == ParticipantKind::Human && p.is_active())
            .count()
    }

    pub(super) fn active_count(&self) -> usize {
        self.participants.iter().filter(|p| p.is_active()).count()
    }

    fn status(&self) -> SessionStatus {
        let record = self.rounds.last();
        let locked_in = match (self.phase, record) {
            (SessionPhase::RoundInProgress, Some(r)) => r
                .submissions
                .iter()
                .map(|s| s.participant_id)
                .collect(),
            _ => Vec::new(),
        };
        SessionStatus {
            session_id: self.id,
            room_id: self.room_id,
            game_number: self.game_number,
            phase: self.phase,
            round: self.round,
            rounds_total: self.cfg.rounds_per_game,
            category: record.map(|r| r.category),
            challenge: record.map(|r| r.challenge.clone()),
            participants: self.participants.iter().map(ParticipantSummary::from).collect(),
            locked_in,
            deadline_ms: self
                .deadline
                .map(|d| d.saturating_duration_since(Instant::now()).as_millis() as u64),
        }
    }

    /// Terminate the session regardless of progress.
    pub(super) fn abort(&mut self) {
        if self.phase == SessionPhase::Complete {
            return;
        }
        self.phase = SessionPhase::Complete;
        self.deadline = None;
        self.stopping = true;

        let board = leaderboard(&self.participants);
        self.publish(EventEnvelope::SessionEnded {
            session_id: self.id,
            aborted: true,
            leaderboard: board.clone(),
        });
        self.record_outcome(&board, true);

        let archive = SessionArchive {
            session_id: self.id,
            room_id: self.room_id,
            game_number: self.game_number,
            aborted: true,
            leaderboard: board,
        };
        let _ = self.lifecycle.send(LifecycleEvent::SessionAborted {
            room_id: self.room_id,
            session_id: self.id,
            archive,
        });
        self.hub.retire_topic(&self.topic());
    }

    pub(super) fn record_outcome(
        &self,
        board: &[crate::domain::state::LeaderboardEntry],
        aborted: bool,
    ) {
        let human_ids: Vec<Uuid> = self
            .participants
            .iter()
            .filter(|p| p.kind == ParticipantKind::Human)
            .map(|p| p.id)
            .collect();
        let outcome = GameOutcome {
            session_id: self.id,
            room_id: self.room_id,
            game_number: self.game_number,
            rounds_played: self.rounds.iter().filter(|r| r.resolved).count() as u8,
            aborted,
            entries: board
                .iter()
                .filter(|e| human_ids.contains(&e.participant_id))
                .cloned()
                .collect(),
        };
        self.progression.record_game(&outcome);
    }
}

fn make_filler(cfg: &EngineConfig) -> Box<dyn SeatFiller + Send + Sync> {
    if cfg.ai_filler != HeuristicFiller::NAME {
        if let Some(factory) = registry::by_name(&cfg.ai_filler) {
            return (factory.make)(None);
        }
        tracing::warn!(
            filler = %cfg.ai_filler,
            "unknown seat filler configured, falling back to heuristic"
        );
    }
    Box::new(HeuristicFiller::new(None, cfg.ai_special_chance_pct))
}
