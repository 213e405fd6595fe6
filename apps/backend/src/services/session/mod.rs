//! Game session orchestration.
//!
//! One tokio task per running game. All game mutations flow through the
//! actor's mailbox ([`commands::SessionCommand`]); round deadlines live
//! inside the actor's `select!` loop, so there is no stale-timer race
//! between a deadline and an in-flight submission.

mod actor;
pub mod commands;
mod rounds;
mod submissions;

use std::collections::HashMap;
use std::sync::Arc;

use rand::rngs::StdRng;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::catalog::{with_retry, ContentCatalog};
use crate::config::EngineConfig;
use crate::domain::cards::{
    Category, ChallengeCard, QualityTier, RoleCard, RoleLens, SynergyCard,
};
use crate::domain::hands::sample_categories;
use crate::domain::state::{
    LeaderboardEntry, ParticipantKind, ParticipantSummary, RoomId, SelectionInput, SessionPhase,
};
use crate::errors::domain::NotFoundKind;
use crate::errors::DomainError;
use crate::services::progression::ProgressionSink;
use crate::services::rooms::LifecycleEvent;
use crate::ws::TopicHub;

pub use commands::{LeaveOutcome, LockInReceipt, SessionStatus};

use commands::SessionCommand;

/// Everything a session pulls from the content catalog, loaded once at
/// creation. In-progress sessions never call back into the catalog.
pub struct SessionSetup {
    /// Ordered category list, one per scored round, no duplicates.
    pub categories: Vec<Category>,
    /// Playable (perfect or good) role cards per category.
    pub role_pools: HashMap<Category, Vec<RoleCard>>,
    pub synergy_deck: Vec<SynergyCard>,
    pub challenges: HashMap<Category, Vec<ChallengeCard>>,
}

/// Load a session's card setup, retrying catalog lookups with bounded
/// backoff. Exhaustion maps to `ContentUnavailable`.
pub async fn load_setup(
    catalog: &dyn ContentCatalog,
    cfg: &EngineConfig,
    rng: &mut StdRng,
) -> Result<SessionSetup, DomainError> {
    let unavailable = |e: crate::catalog::CatalogError| DomainError::ContentUnavailable(e.to_string());

    let categories = sample_categories(cfg.rounds_per_game as usize, rng);

    let mut role_pools = HashMap::new();
    let mut challenges = HashMap::new();
    for &category in &categories {
        let pool = with_retry(cfg.catalog_retry_attempts, cfg.catalog_retry_base, || {
            catalog.role_cards_by_quality(category, &[QualityTier::Perfect, QualityTier::Good])
        })
        .await
        .map_err(unavailable)?;
        if pool.is_empty() {
            return Err(DomainError::ContentUnavailable(format!(
                "no playable role cards for {category:?}"
            )));
        }

        let cards = with_retry(cfg.catalog_retry_attempts, cfg.catalog_retry_base, || {
            catalog.challenge_cards(category)
        })
        .await
        .map_err(unavailable)?;
        if cards.is_empty() {
            return Err(DomainError::ContentUnavailable(format!(
                "no challenge cards for {category:?}"
            )));
        }

        role_pools.insert(category, pool);
        challenges.insert(category, cards);
    }

    let synergy_deck = with_retry(cfg.catalog_retry_attempts, cfg.catalog_retry_base, || {
        catalog.synergy_cards()
    })
    .await
    .map_err(unavailable)?;
    if synergy_deck.is_empty() {
        return Err(DomainError::ContentUnavailable(
            "no synergy cards in catalog".into(),
        ));
    }

    Ok(SessionSetup {
        categories,
        role_pools,
        synergy_deck,
        challenges,
    })
}

/// Cheap handle to a running session actor.
#[derive(Clone)]
pub struct SessionHandle {
    pub id: Uuid,
    pub room_id: RoomId,
    pub game_number: i64,
    tx: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    fn gone() -> DomainError {
        DomainError::not_found(NotFoundKind::Session, "session has ended")
    }

    async fn ask<T>(
        &self,
        cmd: SessionCommand,
        rx: oneshot::Receiver<T>,
    ) -> Result<T, DomainError> {
        self.tx.send(cmd).map_err(|_| Self::gone())?;
        rx.await.map_err(|_| Self::gone())
    }

    pub async fn join(
        &self,
        player_id: Uuid,
        display_name: String,
        kind: ParticipantKind,
    ) -> Result<ParticipantSummary, DomainError> {
        let (reply, rx) = oneshot::channel();
        self.ask(
            SessionCommand::Join {
                player_id,
                display_name,
                kind,
                reply,
            },
            rx,
        )
        .await?
    }

    pub fn begin(&self) {
        let _ = self.tx.send(SessionCommand::Begin);
    }

    pub async fn select_lens(
        &self,
        participant_id: Uuid,
        lens: RoleLens,
    ) -> Result<(), DomainError> {
        let (reply, rx) = oneshot::channel();
        self.ask(
            SessionCommand::SelectLens {
                participant_id,
                lens,
                reply,
            },
            rx,
        )
        .await?
    }

    /// Submit a round selection. A dead actor means the round can no longer
    /// accept anything, which is exactly `RoundClosed`.
    pub async fn submit(
        &self,
        participant_id: Uuid,
        input: SelectionInput,
    ) -> Result<LockInReceipt, DomainError> {
        let (reply, rx) = oneshot::channel();
        let cmd = SessionCommand::Submit {
            participant_id,
            input,
            reply,
        };
        self.tx.send(cmd).map_err(|_| DomainError::RoundClosed)?;
        rx.await.map_err(|_| DomainError::RoundClosed)?
    }

    pub async fn leave(&self, participant_id: Uuid) -> Result<LeaveOutcome, DomainError> {
        let (reply, rx) = oneshot::channel();
        self.ask(
            SessionCommand::Leave {
                participant_id,
                reply,
            },
            rx,
        )
        .await?
    }

    pub async fn status(&self) -> Result<SessionStatus, DomainError> {
        let (reply, rx) = oneshot::channel();
        self.ask(SessionCommand::Status { reply }, rx).await
    }

    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, DomainError> {
        let (reply, rx) = oneshot::channel();
        self.ask(SessionCommand::Leaderboard { reply }, rx).await
    }

    pub fn terminate(&self) {
        let _ = self.tx.send(SessionCommand::Terminate);
    }
}

/// Spawn a session actor and return its handle.
///
/// `initial_phase` is `AwaitingPlayers` for a session created by a
/// dormant-room join, `Intermission` for the next game pre-created while the
/// room idles between games.
#[allow(clippy::too_many_arguments)]
pub fn spawn_session(
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
) -> SessionHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let actor = actor::SessionActor::new(
        id,
        room_id,
        game_number,
        initial_phase,
        cfg,
        setup,
        rng,
        hub,
        progression,
        lifecycle,
        tx.clone(),
        rx,
    );
    tokio::spawn(actor.run());
    SessionHandle {
        id,
        room_id,
        game_number,
        tx,
    }
}
