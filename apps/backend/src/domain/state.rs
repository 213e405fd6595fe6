use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::cards::{Category, ChallengeCard, RoleCard, RoleLens, SpecialCard, SynergyCard};
use crate::domain::scoring::ScoreBreakdown;

/// Room identifiers come from seeded configuration, not a database.
pub type RoomId = i64;

/// Lifecycle phases of a perpetual room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomPhase {
    Dormant,
    Active,
    Intermission,
}

/// Phases of one game session.
///
/// `Intermission` is the reveal-display pause between a scored round's reveal
/// and the next round start; room-level intermission between games is tracked
/// by [`RoomPhase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    AwaitingPlayers,
    RoleSelect,
    RoundInProgress,
    RoundReveal,
    Intermission,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantKind {
    Human,
    Ai,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceStatus {
    Active,
    Away,
    Disconnected,
}

/// One seat in a game session.
///
/// Humans keep a stable id across the sessions of a room; AI seats get a
/// fresh id per session. Disconnected participants stay in the roster so
/// historical round results keep their attribution.
#[derive(Debug, Clone)]
pub struct Participant {
    pub id: Uuid,
    pub display_name: String,
    pub kind: ParticipantKind,
    /// Set once during round 0, immutable afterwards.
    pub lens: Option<RoleLens>,
    /// Current round's role hand; replaced at every round start.
    pub role_hand: Vec<RoleCard>,
    /// Current round's synergy hand; replaced at every round start.
    pub synergy_hand: Vec<SynergyCard>,
    pub guaranteed_available: bool,
    pub reuse_available: bool,
    /// Last standard role play: (role card id, quality at that round's
    /// category). This is what a reuse-previous-role submission reuses.
    pub last_role_play: Option<(i64, crate::domain::cards::QualityTier)>,
    pub score_total: i64,
    pub presence: PresenceStatus,
}

impl Participant {
    pub fn new(id: Uuid, display_name: String, kind: ParticipantKind) -> Self {
        Self {
            id,
            display_name,
            kind,
            lens: None,
            role_hand: Vec::new(),
            synergy_hand: Vec::new(),
            guaranteed_available: true,
            reuse_available: true,
            last_role_play: None,
            score_total: 0,
            presence: PresenceStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.presence != PresenceStatus::Disconnected
    }
}

/// Public roster entry, safe to broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantSummary {
    pub id: Uuid,
    pub display_name: String,
    pub kind: ParticipantKind,
    pub presence: PresenceStatus,
}

impl From<&Participant> for ParticipantSummary {
    fn from(p: &Participant) -> Self {
        Self {
            id: p.id,
            display_name: p.display_name.clone(),
            kind: p.kind,
            presence: p.presence,
        }
    }
}

/// A normalized, validated round selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Selection {
    Standard {
        role_card_id: i64,
        synergy_card_id: i64,
    },
    GuaranteedScore,
    ReusePreviousRole {
        synergy_card_id: Option<i64>,
    },
    /// Deadline auto-zero; never submitted by a client.
    NoSelection,
}

impl Selection {
    pub fn special_card(&self) -> Option<SpecialCard> {
        match self {
            Selection::GuaranteedScore => Some(SpecialCard::GuaranteedScore),
            Selection::ReusePreviousRole { .. } => Some(SpecialCard::ReusePreviousRole),
            _ => None,
        }
    }
}

/// Raw selection payload as submitted over the wire (human or AI).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionInput {
    pub role_card_id: Option<i64>,
    pub synergy_card_id: Option<i64>,
    #[serde(default)]
    pub use_guaranteed_score: bool,
    #[serde(default)]
    pub use_reuse_previous_role: bool,
}

/// Immutable record of one participant's lock-in for one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSubmission {
    pub participant_id: Uuid,
    pub round: u8,
    pub selection: Selection,
    /// Lock-in rank by server receipt order; `None` for auto-zero entries.
    pub rank: Option<u8>,
    pub breakdown: ScoreBreakdown,
    #[serde(with = "time::serde::rfc3339")]
    pub locked_at: OffsetDateTime,
}

/// Everything recorded for one round of a session.
///
/// Category and challenge are fixed before the round opens; a round without
/// them cannot exist.
#[derive(Debug, Clone)]
pub struct RoundRecord {
    pub round: u8,
    pub category: Category,
    pub challenge: ChallengeCard,
    /// Submissions in server receipt order (auto-zeroes appended at resolve).
    pub submissions: Vec<RoundSubmission>,
    pub resolved: bool,
}

impl RoundRecord {
    pub fn submission_for(&self, participant_id: Uuid) -> Option<&RoundSubmission> {
        self.submissions
            .iter()
            .find(|s| s.participant_id == participant_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub participant_id: Uuid,
    pub display_name: String,
    pub kind: ParticipantKind,
    pub total: i64,
    /// Competition ranking: ties share a rank, next rank skips.
    pub rank: u32,
}

/// Build a leaderboard from the roster, highest total first.
pub fn leaderboard(participants: &[Participant]) -> Vec<LeaderboardEntry> {
    let mut sorted: Vec<&Participant> = participants.iter().collect();
    sorted.sort_by(|a, b| b.score_total.cmp(&a.score_total).then(a.id.cmp(&b.id)));

    let mut entries = Vec::with_capacity(sorted.len());
    let mut last_total: Option<i64> = None;
    let mut last_rank = 0u32;
    for (pos, p) in sorted.iter().enumerate() {
        let rank = match last_total {
            Some(t) if t == p.score_total => last_rank,
            _ => pos as u32 + 1,
        };
        last_total = Some(p.score_total);
        last_rank = rank;
        entries.push(LeaderboardEntry {
            participant_id: p.id,
            display_name: p.display_name.clone(),
            kind: p.kind,
            total: p.score_total,
            rank,
        });
    }
    entries
}
