//! Pure domain types and logic: cards, session state, hand construction and
//! the scoring engine. Nothing in this module does IO or owns tasks.

pub mod cards;
pub mod hands;
pub mod scoring;
pub mod state;

#[cfg(test)]
mod tests_hands;
#[cfg(test)]
mod tests_scoring;

pub use cards::{
    Category, ChallengeCard, QualityTier, RoleCard, RoleLens, SpecialCard, SynergyCard,
    CATEGORY_COUNT, LENS_COUNT,
};
pub use scoring::{score_submission, ScoreBreakdown, ScoreInput};
pub use state::{
    leaderboard, LeaderboardEntry, Participant, ParticipantKind, ParticipantSummary,
    PresenceStatus, RoomId, RoomPhase, RoundRecord, RoundSubmission, Selection, SelectionInput,
    SessionPhase,
};
