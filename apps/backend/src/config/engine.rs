//! Engine tunables.
//!
//! Deadlines, seat thresholds, hand sizes and retry policies are
//! configuration, never hard-coded at use sites. Production reads the
//! environment; tests construct configs directly.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::cards::CATEGORY_COUNT;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Scored rounds per game (N). Also the size of the per-game category
    /// list, so it is capped at the number of categories.
    pub rounds_per_game: u8,
    /// Seats below which the AI seat-filler tops a session up.
    pub min_seats: usize,
    /// Role cards dealt per hand (all perfects still always included).
    pub role_hand_size: usize,
    pub synergy_hand_size: usize,
    pub lens_select_deadline: Duration,
    pub round_deadline: Duration,
    /// Reveal-display pause between a round's reveal and the next round.
    pub reveal_delay: Duration,
    /// Room-level pause between two games of the same room.
    pub intermission: Duration,
    pub ai_delay_min: Duration,
    pub ai_delay_max: Duration,
    /// Chance (percent) that an AI spends an available special card.
    pub ai_special_chance_pct: u8,
    /// Registered seat-filler name used for AI seats.
    pub ai_filler: String,
    pub catalog_retry_attempts: u32,
    pub catalog_retry_base: Duration,
    /// Number of perpetual rooms seeded at startup.
    pub room_count: i64,
    pub room_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rounds_per_game: 5,
            min_seats: 3,
            role_hand_size: 5,
            synergy_hand_size: 3,
            lens_select_deadline: Duration::from_secs(20),
            round_deadline: Duration::from_secs(45),
            reveal_delay: Duration::from_secs(6),
            intermission: Duration::from_secs(10),
            ai_delay_min: Duration::from_millis(800),
            ai_delay_max: Duration::from_millis(4000),
            ai_special_chance_pct: 10,
            ai_filler: "HeuristicFiller".to_string(),
            catalog_retry_attempts: 3,
            catalog_retry_base: Duration::from_millis(100),
            room_count: 4,
            room_capacity: 8,
        }
    }
}

impl EngineConfig {
    /// Read config from `ENGINE_*` environment variables, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            rounds_per_game: env_or("ENGINE_ROUNDS_PER_GAME", d.rounds_per_game)
                .min(CATEGORY_COUNT as u8),
            min_seats: env_or("ENGINE_MIN_SEATS", d.min_seats),
            role_hand_size: env_or("ENGINE_ROLE_HAND_SIZE", d.role_hand_size),
            synergy_hand_size: env_or("ENGINE_SYNERGY_HAND_SIZE", d.synergy_hand_size),
            lens_select_deadline: secs_or("ENGINE_LENS_SELECT_SECS", d.lens_select_deadline),
            round_deadline: secs_or("ENGINE_ROUND_SECS", d.round_deadline),
            reveal_delay: secs_or("ENGINE_REVEAL_SECS", d.reveal_delay),
            intermission: secs_or("ENGINE_INTERMISSION_SECS", d.intermission),
            ai_delay_min: millis_or("ENGINE_AI_DELAY_MIN_MS", d.ai_delay_min),
            ai_delay_max: millis_or("ENGINE_AI_DELAY_MAX_MS", d.ai_delay_max),
            ai_special_chance_pct: env_or("ENGINE_AI_SPECIAL_CHANCE_PCT", d.ai_special_chance_pct),
            ai_filler: env::var("ENGINE_AI_FILLER").unwrap_or(d.ai_filler),
            catalog_retry_attempts: env_or("ENGINE_CATALOG_RETRY_ATTEMPTS", d.catalog_retry_attempts),
            catalog_retry_base: millis_or("ENGINE_CATALOG_RETRY_BASE_MS", d.catalog_retry_base),
            room_count: env_or("ENGINE_ROOM_COUNT", d.room_count),
            room_capacity: env_or("ENGINE_ROOM_CAPACITY", d.room_capacity),
        }
    }

    /// Short deadlines suited to paused-clock integration tests.
    pub fn for_tests() -> Self {
        Self {
            rounds_per_game: 3,
            min_seats: 3,
            lens_select_deadline: Duration::from_millis(500),
            round_deadline: Duration::from_millis(1000),
            reveal_delay: Duration::from_millis(100),
            intermission: Duration::from_millis(200),
            ai_delay_min: Duration::from_millis(10),
            ai_delay_max: Duration::from_millis(50),
            catalog_retry_attempts: 2,
            catalog_retry_base: Duration::from_millis(5),
            room_count: 2,
            room_capacity: 4,
            ..Self::default()
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn secs_or(key: &str, default: Duration) -> Duration {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}

fn millis_or(key: &str, default: Duration) -> Duration {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}
