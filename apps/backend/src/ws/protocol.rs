use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::cards::{Category, ChallengeCard, RoleCard, RoleLens, SynergyCard};
use crate::domain::scoring::ScoreBreakdown;
use crate::domain::state::{
    LeaderboardEntry, ParticipantSummary, PresenceStatus, RoomPhase, Selection,
};

pub const PROTOCOL_VERSION: i32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Topic {
    #[serde(rename_all = "snake_case")]
    Room { id: i64 },
    #[serde(rename_all = "snake_case")]
    Session { id: Uuid },
}

/// One participant's private deal, published inside `RoundStarted`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealtHand {
    pub participant_id: Uuid,
    pub role_hand: Vec<RoleCard>,
    pub synergy_hand: Vec<SynergyCard>,
}

/// Full per-participant result revealed after a round resolves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealEntry {
    pub participant_id: Uuid,
    pub display_name: String,
    pub selection: Selection,
    pub rank: Option<u8>,
    pub breakdown: ScoreBreakdown,
    pub score_total: i64,
}

/// Events fanned out through the topic hub.
///
/// During an in-progress round only rank-order is public
/// (`ParticipantLockedIn` carries no selection); full breakdowns appear in
/// `RoundRevealed` once the round resolves.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventEnvelope {
    RoomStatusChanged {
        room_id: i64,
        phase: RoomPhase,
    },
    SessionStarted {
        room_id: i64,
        session_id: Uuid,
    },
    ParticipantJoined {
        participant: ParticipantSummary,
    },
    ParticipantLeft {
        participant_id: Uuid,
    },
    PresenceChanged {
        participant_id: Uuid,
        presence: PresenceStatus,
    },
    LensSelectStarted {
        options: Vec<RoleLens>,
        deadline_ms: u64,
    },
    RoundStarted {
        round: u8,
        category: Category,
        challenge: ChallengeCard,
        deadline_ms: u64,
        hands: Vec<DealtHand>,
    },
    ParticipantLockedIn {
        participant_id: Uuid,
        rank: u8,
    },
    RoundRevealed {
        round: u8,
        results: Vec<RevealEntry>,
    },
    LeaderboardUpdated {
        entries: Vec<LeaderboardEntry>,
    },
    SessionEnded {
        session_id: Uuid,
        aborted: bool,
        leaderboard: Vec<LeaderboardEntry>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    Hello { protocol: i32 },
    Subscribe { topic: Topic },
    Unsubscribe { topic: Topic },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    HelloAck {
        protocol: i32,
    },

    Ack {
        message: &'static str,
    },

    /// Presence snapshot, sent once right after a subscribe ack; deltas
    /// arrive as `PresenceChanged` events afterwards.
    Presence {
        topic: Topic,
        participants: Vec<PresenceEntry>,
    },

    Event {
        topic: Topic,
        event: EventEnvelope,
    },

    Error {
        code: ErrorCode,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceEntry {
    pub participant_id: Uuid,
    pub presence: PresenceStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    BadProtocol,
    BadRequest,
    /// Receiver fell behind the topic stream; resync over HTTP.
    Lagged,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::BadProtocol => "bad_protocol",
            ErrorCode::BadRequest => "bad_request",
            ErrorCode::Lagged => "lagged",
        }
    }
}
