//! Session actor command surface.
//!
//! Every mutation of a running game, human or AI, enters through one of
//! these commands; the actor's mailbox is the round's single serialization
//! point, which is what makes lock-in ranks race-free.

use serde::Serialize;
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::domain::cards::{Category, ChallengeCard, RoleLens};
use crate::domain::state::{
    LeaderboardEntry, ParticipantKind, ParticipantSummary, SelectionInput, SessionPhase,
};
use crate::errors::DomainError;

pub enum SessionCommand {
    Join {
        player_id: Uuid,
        display_name: String,
        kind: ParticipantKind,
        reply: oneshot::Sender<Result<ParticipantSummary, DomainError>>,
    },
    /// Start the game: top up AI seats, then open role-lens selection.
    Begin,
    SelectLens {
        participant_id: Uuid,
        lens: RoleLens,
        reply: oneshot::Sender<Result<(), DomainError>>,
    },
    Submit {
        participant_id: Uuid,
        input: SelectionInput,
        reply: oneshot::Sender<Result<LockInReceipt, DomainError>>,
    },
    Leave {
        participant_id: Uuid,
        reply: oneshot::Sender<Result<LeaveOutcome, DomainError>>,
    },
    Status {
        reply: oneshot::Sender<SessionStatus>,
    },
    Leaderboard {
        reply: oneshot::Sender<Vec<LeaderboardEntry>>,
    },
    /// Abort regardless of progress (room manager only).
    Terminate,
    /// Delayed AI lens pick, scheduled by the actor itself.
    AiSelectLens { participant_id: Uuid, lens: RoleLens },
    /// Delayed AI submission; dropped silently if the round moved on.
    AiSubmit {
        participant_id: Uuid,
        round: u8,
        input: SelectionInput,
    },
}

/// What a successful lock-in tells the submitter: its rank, nothing about
/// anyone else's selection.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LockInReceipt {
    pub round: u8,
    pub rank: u8,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct LeaveOutcome {
    /// False when the participant was already disconnected (idempotent leave).
    pub was_active: bool,
    pub humans_remaining: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub session_id: Uuid,
    pub room_id: i64,
    pub game_number: i64,
    pub phase: SessionPhase,
    /// 0 during role-lens selection, 1..=N during scored rounds.
    pub round: u8,
    pub rounds_total: u8,
    pub category: Option<Category>,
    pub challenge: Option<ChallengeCard>,
    pub participants: Vec<ParticipantSummary>,
    /// Participants locked in for the current round, in rank order.
    pub locked_in: Vec<Uuid>,
    pub deadline_ms: Option<u64>,
}
