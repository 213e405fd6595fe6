//! Transport-agnostic error taxonomy for the orchestration engine.
//!
//! Services and the session actor return `DomainError`; HTTP handlers return
//! `Result<T, crate::error::AppError>` and convert via the provided
//! `From<DomainError> for AppError` implementation.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::domain::SpecialCard;

/// Missing-resource kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Room,
    Session,
    Participant,
    Card,
}

/// Phase/state conflicts (action is valid in general, but not right now).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    /// A second submission in the same round.
    AlreadyLockedIn,
    /// Lens selection outside round 0, or changing an already-set lens.
    LensAlreadySet,
    /// Action does not match the current room/session phase.
    PhaseMismatch,
    /// Reuse-previous-role with no prior standard submission to reuse.
    NoPreviousRole,
}

/// Central domain error type, mirroring the engine's error taxonomy.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Input validation failure (malformed selection, card not in hand).
    Validation(String),
    /// Missing resource in domain terms.
    NotFound(NotFoundKind, String),
    /// Action invalid for the current phase or participant state.
    StateConflict(ConflictKind, String),
    /// Special card already consumed in this game session.
    CardExhausted(SpecialCard),
    /// Both special cards named in a single submission.
    InvalidCombination,
    /// Room is at its configured capacity.
    RoomFull,
    /// Content catalog dependency down at session-creation time.
    ContentUnavailable(String),
    /// Submission arrived after the round was resolved or the session ended.
    RoundClosed,
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation(d) => write!(f, "validation error: {d}"),
            DomainError::NotFound(kind, d) => write!(f, "not found {kind:?}: {d}"),
            DomainError::StateConflict(kind, d) => write!(f, "state conflict {kind:?}: {d}"),
            DomainError::CardExhausted(card) => write!(f, "special card already used: {card:?}"),
            DomainError::InvalidCombination => {
                write!(f, "cannot combine both special cards in one submission")
            }
            DomainError::RoomFull => write!(f, "room is full"),
            DomainError::ContentUnavailable(d) => write!(f, "content catalog unavailable: {d}"),
            DomainError::RoundClosed => write!(f, "round already resolved"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn validation(detail: impl Into<String>) -> Self {
        Self::Validation(detail.into())
    }

    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }

    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::StateConflict(kind, detail.into())
    }
}
