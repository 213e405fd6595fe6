//! Seat-filler trait definition.

use std::fmt;

use crate::domain::cards::{Category, RoleCard, RoleLens, SynergyCard};
use crate::domain::state::SelectionInput;
use crate::error::AppError;

/// Errors that can occur during seat-filler decision-making.
#[derive(Debug)]
pub enum AiError {
    /// Filler encountered an internal error
    Internal(String),
    /// Filler produced a selection the round would reject
    InvalidSelection(String),
}

impl fmt::Display for AiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiError::Internal(msg) => write!(f, "seat filler internal error: {msg}"),
            AiError::InvalidSelection(msg) => write!(f, "seat filler invalid selection: {msg}"),
        }
    }
}

impl std::error::Error for AiError {}

impl From<AiError> for AppError {
    fn from(err: AiError) -> Self {
        AppError::internal(format!("seat filler error: {err}"))
    }
}

/// Everything a seat filler is allowed to see when picking a submission:
/// its own hands and special-card availability, never other participants'
/// hands or pending selections.
pub struct SeatView {
    pub category: Category,
    pub role_hand: Vec<RoleCard>,
    pub synergy_hand: Vec<SynergyCard>,
    pub guaranteed_available: bool,
    pub reuse_available: bool,
    /// Whether a previous standard submission exists to reuse.
    pub has_previous_role: bool,
}

/// Trait for AI seat fillers.
///
/// Implementations receive only the seat-local view and must produce a
/// selection the round validator would accept.
pub trait SeatFiller: Send + Sync {
    /// Choose a role lens from the offered options.
    fn choose_lens(&self, options: &[RoleLens]) -> Result<RoleLens, AiError>;

    /// Choose a round submission for the dealt view.
    fn choose_selection(&self, view: &SeatView) -> Result<SelectionInput, AiError>;
}
