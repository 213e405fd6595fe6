//! Progression sink boundary.
//!
//! Long-term XP/analytics storage is an external collaborator; the engine
//! only pushes completed-game outcomes through this trait. AI seats never
//! earn progression, so outcomes carry human entries only.

use std::sync::Mutex;

use tracing::info;
use uuid::Uuid;

use crate::domain::state::{LeaderboardEntry, RoomId};

#[derive(Debug, Clone)]
pub struct GameOutcome {
    pub session_id: Uuid,
    pub room_id: RoomId,
    pub game_number: i64,
    pub rounds_played: u8,
    pub aborted: bool,
    /// Final standings, humans only.
    pub entries: Vec<LeaderboardEntry>,
}

pub trait ProgressionSink: Send + Sync {
    fn record_game(&self, outcome: &GameOutcome);
}

/// Default sink: structured log lines, one per human participant.
pub struct LogProgressionSink;

impl ProgressionSink for LogProgressionSink {
    fn record_game(&self, outcome: &GameOutcome) {
        for entry in &outcome.entries {
            info!(
                session_id = %outcome.session_id,
                room_id = outcome.room_id,
                game_number = outcome.game_number,
                rounds_played = outcome.rounds_played,
                aborted = outcome.aborted,
                participant_id = %entry.participant_id,
                display_name = %entry.display_name,
                total = entry.total,
                rank = entry.rank,
                "game outcome recorded"
            );
        }
    }
}

/// Test sink that captures outcomes for assertions.
pub struct CollectingSink {
    outcomes: Mutex<Vec<GameOutcome>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(Vec::new()),
        }
    }

    pub fn outcomes(&self) -> Vec<GameOutcome> {
        self.outcomes.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

impl Default for CollectingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressionSink for CollectingSink {
    fn record_game(&self, outcome: &GameOutcome) {
        if let Ok(mut guard) = self.outcomes.lock() {
            guard.push(outcome.clone());
        }
    }
}
