//! Room lifecycle manager.
//!
//! Rooms are seeded from configuration at startup and never destroyed. Each
//! room owns at most one live session; lifecycle transitions arrive on a
//! single dispatcher channel so room state has one writer.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use dashmap::DashMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tokio::sync::{mpsc, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog::ContentCatalog;
use crate::config::EngineConfig;
use crate::domain::cards::RoleLens;
use crate::domain::state::{
    LeaderboardEntry, ParticipantKind, RoomId, RoomPhase, SelectionInput, SessionPhase,
};
use crate::errors::domain::{DomainError, NotFoundKind};
use crate::services::progression::ProgressionSink;
use crate::services::session::{
    load_setup, spawn_session, LeaveOutcome, LockInReceipt, SessionHandle, SessionStatus,
};
use crate::ws::protocol::EventEnvelope;
use crate::ws::{Topic, TopicHub};

const ROOM_NAMES: &[&str] = &[
    "The Loft",
    "The Workshop",
    "The Annex",
    "The Rooftop",
    "The Basement",
    "The Atrium",
];

/// Final record of a finished session; kept so leaderboards survive the
/// actor and late submissions can be told the round is closed.
#[derive(Debug, Clone)]
pub struct SessionArchive {
    pub session_id: Uuid,
    pub room_id: RoomId,
    pub game_number: i64,
    pub aborted: bool,
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// Events session actors and timers push at the room dispatcher.
pub enum LifecycleEvent {
    SessionComplete {
        room_id: RoomId,
        session_id: Uuid,
        archive: SessionArchive,
        continuing_humans: Vec<(Uuid, String)>,
    },
    SessionAborted {
        room_id: RoomId,
        session_id: Uuid,
        archive: SessionArchive,
    },
    IntermissionElapsed {
        room_id: RoomId,
        epoch: u64,
    },
}

struct RoomInner {
    phase: RoomPhase,
    current_session: Option<Uuid>,
    /// Sequential game number, incremented per session created.
    game_counter: i64,
    games_played: i64,
    /// Identity -> stable per-room player id.
    roster: HashMap<String, Uuid>,
    /// Humans currently seated (or waiting in the upcoming session).
    connected: HashSet<Uuid>,
    /// Joiners parked until the next intermission.
    queued: Vec<(Uuid, String)>,
    /// Guards stale intermission timers after an abort.
    intermission_epoch: u64,
}

pub struct Room {
    pub id: RoomId,
    pub name: String,
    inner: Mutex<RoomInner>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinPhase {
    Joined,
    QueuedForIntermission,
}

#[derive(Debug, Clone, Serialize)]
pub struct JoinReceipt {
    pub player_id: Uuid,
    /// Absent while queued for the next intermission.
    pub session_id: Option<Uuid>,
    pub join_phase: JoinPhase,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomStatus {
    pub room_id: RoomId,
    pub name: String,
    pub phase: RoomPhase,
    pub game_number: i64,
    pub games_played: i64,
    pub unique_players: usize,
    pub connected_humans: usize,
    pub queued_joiners: usize,
    pub session_id: Option<Uuid>,
}

pub struct RoomService {
    cfg: EngineConfig,
    catalog: Arc<dyn ContentCatalog>,
    hub: Arc<TopicHub>,
    progression: Arc<dyn ProgressionSink>,
    rooms: DashMap<RoomId, Arc<Room>>,
    sessions: DashMap<Uuid, SessionHandle>,
    archives: DashMap<Uuid, SessionArchive>,
    lifecycle_tx: mpsc::UnboundedSender<LifecycleEvent>,
}

impl RoomService {
    /// Seed the configured rooms and start the lifecycle dispatcher.
    pub fn start(
        cfg: EngineConfig,
        catalog: Arc<dyn ContentCatalog>,
        hub: Arc<TopicHub>,
        progression: Arc<dyn ProgressionSink>,
    ) -> Arc<Self> {
        let (lifecycle_tx, lifecycle_rx) = mpsc::unbounded_channel();
        let service = Arc::new(Self {
            cfg,
            catalog,
            hub,
            progression,
            rooms: DashMap::new(),
            sessions: DashMap::new(),
            archives: DashMap::new(),
            lifecycle_tx,
        });

        for id in 1..=service.cfg.room_count {
            let name = ROOM_NAMES
                .get((id - 1) as usize % ROOM_NAMES.len())
                .unwrap_or(&"The Room")
                .to_string();
            service.rooms.insert(
                id,
                Arc::new(Room {
                    id,
                    name,
                    inner: Mutex::new(RoomInner {
                        phase: RoomPhase::Dormant,
                        current_session: None,
                        game_counter: 0,
                        games_played: 0,
                        roster: HashMap::new(),
                        connected: HashSet::new(),
                        queued: Vec::new(),
                        intermission_epoch: 0,
                    }),
                }),
            );
        }
        info!(rooms = service.cfg.room_count, "rooms seeded");

        let dispatcher = service.clone();
        tokio::spawn(dispatcher.dispatch(lifecycle_rx));
        service
    }

    fn room(&self, room_id: RoomId) -> Result<Arc<Room>, DomainError> {
        self.rooms
            .get(&room_id)
            .map(|r| r.clone())
            .ok_or_else(|| DomainError::not_found(NotFoundKind::Room, "no such room"))
    }

    fn session(&self, session_id: Uuid) -> Option<SessionHandle> {
        self.sessions.get(&session_id).map(|h| h.clone())
    }

    fn publish_room(&self, room_id: RoomId, event: EventEnvelope) {
        self.hub.publish(&Topic::Room { id: room_id }, event);
    }

    /// Create the room's next session. Caller holds the room lock, which is
    /// what keeps session creation single-flight per room.
    async fn create_session(
        &self,
        inner: &mut RoomInner,
        room_id: RoomId,
        initial_phase: SessionPhase,
    ) -> Result<SessionHandle, DomainError> {
        let mut rng = StdRng::from_os_rng();
        let setup = load_setup(self.catalog.as_ref(), &self.cfg, &mut rng).await?;

        inner.game_counter += 1;
        let session_id = Uuid::new_v4();
        let handle = spawn_session(
            session_id,
            room_id,
            inner.game_counter,
            initial_phase,
            self.cfg.clone(),
            setup,
            rng,
            self.hub.clone(),
            self.progression.clone(),
            self.lifecycle_tx.clone(),
        );
        self.sessions.insert(session_id, handle.clone());
        inner.current_session = Some(session_id);
        self.publish_room(
            room_id,
            EventEnvelope::SessionStarted {
                room_id,
                session_id,
            },
        );
        Ok(handle)
    }

    pub async fn join_room(
        &self,
        room_id: RoomId,
        identity: &str,
    ) -> Result<JoinReceipt, DomainError> {
        let room = self.room(room_id)?;
        let mut inner = room.inner.lock().await;

        let player_id = *inner
            .roster
            .entry(identity.to_string())
            .or_insert_with(Uuid::new_v4);
        let already_present = inner.connected.contains(&player_id)
            || inner.queued.iter().any(|(id, _)| *id == player_id);
        if !already_present
            && inner.connected.len() + inner.queued.len() >= self.cfg.room_capacity
        {
            return Err(DomainError::RoomFull);
        }

        match inner.phase {
            RoomPhase::Dormant => {
                // Catalog exhaustion leaves the room dormant; the join fails
                // with ContentUnavailable and nothing was spawned.
                let handle = self
                    .create_session(&mut inner, room_id, SessionPhase::AwaitingPlayers)
                    .await?;
                if let Err(err) = handle
                    .join(player_id, identity.to_string(), ParticipantKind::Human)
                    .await
                {
                    self.sessions.remove(&handle.id);
                    handle.terminate();
                    inner.current_session = None;
                    return Err(err);
                }
                inner.phase = RoomPhase::Active;
                inner.connected.insert(player_id);
                self.publish_room(
                    room_id,
                    EventEnvelope::RoomStatusChanged {
                        room_id,
                        phase: RoomPhase::Active,
                    },
                );
                handle.begin();
                Ok(JoinReceipt {
                    player_id,
                    session_id: Some(handle.id),
                    join_phase: JoinPhase::Joined,
                })
            }
            RoomPhase::Active | RoomPhase::Intermission => {
                let handle = inner
                    .current_session
                    .and_then(|sid| self.session(sid))
                    .ok_or_else(|| {
                        DomainError::not_found(NotFoundKind::Session, "room has no live session")
                    })?;
                match handle
                    .join(player_id, identity.to_string(), ParticipantKind::Human)
                    .await
                {
                    Ok(_) => {
                        inner.connected.insert(player_id);
                        Ok(JoinReceipt {
                            player_id,
                            session_id: Some(handle.id),
                            join_phase: JoinPhase::Joined,
                        })
                    }
                    Err(DomainError::StateConflict(_, _)) => {
                        // Mid-round: park the caller for the next intermission.
                        if !inner.queued.iter().any(|(id, _)| *id == player_id) {
                            inner.queued.push((player_id, identity.to_string()));
                        }
                        Ok(JoinReceipt {
                            player_id,
                            session_id: None,
                            join_phase: JoinPhase::QueuedForIntermission,
                        })
                    }
                    Err(err) => Err(err),
                }
            }
        }
    }

    /// Idempotent: leaving a room you are not in returns `false`.
    pub async fn leave_room(&self, room_id: RoomId, identity: &str) -> Result<bool, DomainError> {
        let room = self.room(room_id)?;
        let to_leave = {
            let mut inner = room.inner.lock().await;
            let Some(&player_id) = inner.roster.get(identity) else {
                return Ok(false);
            };
            let was_queued = inner.queued.iter().any(|(id, _)| *id == player_id);
            inner.queued.retain(|(id, _)| *id != player_id);
            let was_connected = inner.connected.remove(&player_id);
            if !was_connected && !was_queued {
                return Ok(false);
            }
            inner
                .current_session
                .and_then(|sid| self.session(sid))
                .filter(|_| was_connected)
                .map(|h| (h, player_id))
        };

        if let Some((handle, player_id)) = to_leave {
            // NotFound just means the actor is already gone.
            let _ = handle.leave(player_id).await;
        }
        Ok(true)
    }

    pub async fn room_status(&self, room_id: RoomId) -> Result<RoomStatus, DomainError> {
        let room = self.room(room_id)?;
        let inner = room.inner.lock().await;
        Ok(RoomStatus {
            room_id,
            name: room.name.clone(),
            phase: inner.phase,
            game_number: inner.game_counter,
            games_played: inner.games_played,
            unique_players: inner.roster.len(),
            connected_humans: inner.connected.len(),
            queued_joiners: inner.queued.len(),
            session_id: inner.current_session,
        })
    }

    pub async fn select_lens(
        &self,
        session_id: Uuid,
        participant_id: Uuid,
        lens: RoleLens,
    ) -> Result<(), DomainError> {
        match self.session(session_id) {
            Some(handle) => handle.select_lens(participant_id, lens).await,
            None if self.archives.contains_key(&session_id) => Err(DomainError::conflict(
                crate::errors::ConflictKind::PhaseMismatch,
                "session has ended",
            )),
            None => Err(DomainError::not_found(
                NotFoundKind::Session,
                "no such session",
            )),
        }
    }

    pub async fn submit(
        &self,
        session_id: Uuid,
        participant_id: Uuid,
        input: SelectionInput,
    ) -> Result<LockInReceipt, DomainError> {
        match self.session(session_id) {
            Some(handle) => handle.submit(participant_id, input).await,
            // An archived session can never accept another lock-in.
            None if self.archives.contains_key(&session_id) => Err(DomainError::RoundClosed),
            None => Err(DomainError::not_found(
                NotFoundKind::Session,
                "no such session",
            )),
        }
    }

    pub async fn leave_session(
        &self,
        session_id: Uuid,
        participant_id: Uuid,
    ) -> Result<LeaveOutcome, DomainError> {
        match self.session(session_id) {
            Some(handle) => handle.leave(participant_id).await,
            None if self.archives.contains_key(&session_id) => Ok(LeaveOutcome {
                was_active: false,
                humans_remaining: 0,
            }),
            None => Err(DomainError::not_found(
                NotFoundKind::Session,
                "no such session",
            )),
        }
    }

    pub async fn session_status(&self, session_id: Uuid) -> Result<SessionStatus, DomainError> {
        match self.session(session_id) {
            Some(handle) => handle.status().await,
            None => Err(DomainError::not_found(
                NotFoundKind::Session,
                "no such session",
            )),
        }
    }

    pub async fn leaderboard(
        &self,
        session_id: Uuid,
    ) -> Result<Vec<LeaderboardEntry>, DomainError> {
        if let Some(handle) = self.session(session_id) {
            return handle.leaderboard().await;
        }
        self.archives
            .get(&session_id)
            .map(|a| a.leaderboard.clone())
            .ok_or_else(|| DomainError::not_found(NotFoundKind::Session, "no such session"))
    }

    async fn dispatch(self: Arc<Self>, mut rx: mpsc::UnboundedReceiver<LifecycleEvent>) {
        while let Some(event) = rx.recv().await {
            match event {
                LifecycleEvent::SessionComplete {
                    room_id,
                    session_id,
                    archive,
                    continuing_humans,
                } => {
                    self.on_session_complete(room_id, session_id, archive, continuing_humans)
                        .await;
                }
                LifecycleEvent::SessionAborted {
                    room_id,
                    session_id,
                    archive,
                } => {
                    self.on_session_aborted(room_id, session_id, archive).await;
                }
                LifecycleEvent::IntermissionElapsed { room_id, epoch } => {
                    self.on_intermission_elapsed(room_id, epoch).await;
                }
            }
        }
    }

    async fn on_session_complete(
        &self,
        room_id: RoomId,
        session_id: Uuid,
        archive: SessionArchive,
        continuing_humans: Vec<(Uuid, String)>,
    ) {
        self.archives.insert(session_id, archive);
        self.sessions.remove(&session_id);
        let Ok(room) = self.room(room_id) else { return };
        let mut inner = room.inner.lock().await;
        inner.games_played += 1;

        let queued = std::mem::take(&mut inner.queued);
        let joiners: Vec<(Uuid, String)> = continuing_humans.into_iter().chain(queued).collect();
        if joiners.is_empty() {
            self.go_dormant(&mut inner, room_id);
            return;
        }

        // Pre-create the next game so intermission joiners land somewhere.
        match self
            .create_session(&mut inner, room_id, SessionPhase::Intermission)
            .await
        {
            Ok(handle) => {
                for (player_id, name) in joiners {
                    if handle
                        .join(player_id, name, ParticipantKind::Human)
                        .await
                        .is_ok()
                    {
                        inner.connected.insert(player_id);
                    }
                }
                inner.phase = RoomPhase::Intermission;
                inner.intermission_epoch += 1;
                let epoch = inner.intermission_epoch;
                self.publish_room(
                    room_id,
                    EventEnvelope::RoomStatusChanged {
                        room_id,
                        phase: RoomPhase::Intermission,
                    },
                );

                let tx = self.lifecycle_tx.clone();
                let pause = self.cfg.intermission;
                tokio::spawn(async move {
                    tokio::time::sleep(pause).await;
                    let _ = tx.send(LifecycleEvent::IntermissionElapsed { room_id, epoch });
                });
            }
            Err(err) => {
                warn!(room_id, error = %err, "next session creation failed, room going dormant");
                self.go_dormant(&mut inner, room_id);
            }
        }
    }

    async fn on_session_aborted(&self, room_id: RoomId, session_id: Uuid, archive: SessionArchive) {
        self.archives.insert(session_id, archive);
        self.sessions.remove(&session_id);
        let Ok(room) = self.room(room_id) else { return };
        let mut inner = room.inner.lock().await;
        inner.games_played += 1;
        inner.connected.clear();
        inner.intermission_epoch += 1; // invalidates any pending timer

        let queued = std::mem::take(&mut inner.queued);
        if queued.is_empty() {
            self.go_dormant(&mut inner, room_id);
            return;
        }

        // Queued joiners reactivate the room immediately.
        match self
            .create_session(&mut inner, room_id, SessionPhase::AwaitingPlayers)
            .await
        {
            Ok(handle) => {
                for (player_id, name) in queued {
                    if handle
                        .join(player_id, name, ParticipantKind::Human)
                        .await
                        .is_ok()
                    {
                        inner.connected.insert(player_id);
                    }
                }
                inner.phase = RoomPhase::Active;
                self.publish_room(
                    room_id,
                    EventEnvelope::RoomStatusChanged {
                        room_id,
                        phase: RoomPhase::Active,
                    },
                );
                handle.begin();
            }
            Err(err) => {
                warn!(room_id, error = %err, "reactivation failed, room going dormant");
                self.go_dormant(&mut inner, room_id);
            }
        }
    }

    async fn on_intermission_elapsed(&self, room_id: RoomId, epoch: u64) {
        let Ok(room) = self.room(room_id) else { return };
        let mut inner = room.inner.lock().await;
        if inner.phase != RoomPhase::Intermission || inner.intermission_epoch != epoch {
            return;
        }
        inner.phase = RoomPhase::Active;
        self.publish_room(
            room_id,
            EventEnvelope::RoomStatusChanged {
                room_id,
                phase: RoomPhase::Active,
            },
        );
        if let Some(handle) = inner.current_session.and_then(|sid| self.session(sid)) {
            handle.begin();
        }
    }

    fn go_dormant(&self, inner: &mut RoomInner, room_id: RoomId) {
        inner.phase = RoomPhase::Dormant;
        inner.current_session = None;
        self.publish_room(
            room_id,
            EventEnvelope::RoomStatusChanged {
                room_id,
                phase: RoomPhase::Dormant,
            },
        );
    }
}
