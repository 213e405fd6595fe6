#![allow(dead_code)]

// tests/common/mod.rs

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use backend::catalog::{CatalogError, ContentCatalog, SeedCatalog};
use backend::config::EngineConfig;
use backend::domain::cards::{Category, ChallengeCard, QualityTier, RoleCard, SynergyCard};
use backend::domain::state::{RoomPhase, SelectionInput, SessionPhase};
use backend::services::progression::CollectingSink;
use backend::services::rooms::RoomService;
use backend::ws::protocol::EventEnvelope;
use backend::ws::TopicHub;
use tokio::sync::broadcast;
use uuid::Uuid;

// Logging is auto-installed for every test binary that pulls in this module.
#[ctor::ctor]
fn init_logging() {
    let filter = std::env::var("TEST_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .map(tracing_subscriber::EnvFilter::new)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .without_time()
        .try_init()
        .ok();
}

/// A fully wired engine against the seed catalog, with a collecting
/// progression sink for outcome assertions.
pub struct TestEngine {
    pub rooms: Arc<RoomService>,
    pub hub: Arc<TopicHub>,
    pub sink: Arc<CollectingSink>,
}

pub fn start_engine() -> TestEngine {
    start_engine_with(EngineConfig::for_tests())
}

pub fn start_engine_with(cfg: EngineConfig) -> TestEngine {
    let hub = Arc::new(TopicHub::new());
    let sink = Arc::new(CollectingSink::new());
    let rooms = RoomService::start(cfg, Arc::new(SeedCatalog::new()), hub.clone(), sink.clone());
    TestEngine { rooms, hub, sink }
}

/// Catalog stub whose every lookup fails, for outage-path tests.
pub struct FailingCatalog;

#[async_trait]
impl ContentCatalog for FailingCatalog {
    async fn challenge_cards(
        &self,
        _category: Category,
    ) -> Result<Vec<ChallengeCard>, CatalogError> {
        Err(CatalogError::Unavailable("catalog offline".into()))
    }

    async fn role_cards_by_quality(
        &self,
        _category: Category,
        _tiers: &[QualityTier],
    ) -> Result<Vec<RoleCard>, CatalogError> {
        Err(CatalogError::Unavailable("catalog offline".into()))
    }

    async fn synergy_cards(&self) -> Result<Vec<SynergyCard>, CatalogError> {
        Err(CatalogError::Unavailable("catalog offline".into()))
    }
}

pub fn guaranteed_selection() -> SelectionInput {
    SelectionInput {
        role_card_id: None,
        synergy_card_id: None,
        use_guaranteed_score: true,
        use_reuse_previous_role: false,
    }
}

pub fn standard_selection(role_card_id: i64, synergy_card_id: i64) -> SelectionInput {
    SelectionInput {
        role_card_id: Some(role_card_id),
        synergy_card_id: Some(synergy_card_id),
        use_guaranteed_score: false,
        use_reuse_previous_role: false,
    }
}

/// Receive events until `pick` accepts one. The timeout registers a timer so
/// a missing event fails fast under a paused clock instead of hanging.
pub async fn recv_until<F, T>(rx: &mut broadcast::Receiver<EventEnvelope>, mut pick: F) -> T
where
    F: FnMut(EventEnvelope) -> Option<T>,
{
    tokio::time::timeout(Duration::from_secs(60), async {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Some(found) = pick(event) {
                        return found;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => {
                    panic!("topic stream closed before the expected event")
                }
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

pub async fn wait_for_session_phase(
    engine: &TestEngine,
    session_id: Uuid,
    phase: SessionPhase,
) {
    for _ in 0..10_000 {
        if let Ok(status) = engine.rooms.session_status(session_id).await {
            if status.phase == phase {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("session {session_id} never reached {phase:?}");
}

pub async fn wait_for_room_phase(engine: &TestEngine, room_id: i64, phase: RoomPhase) {
    for _ in 0..10_000 {
        let status = engine
            .rooms
            .room_status(room_id)
            .await
            .expect("room must exist");
        if status.phase == phase {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("room {room_id} never reached {phase:?}");
}
