//! In-process topic hub.
//!
//! One `tokio::sync::broadcast` channel per topic. Every topic has a single
//! writer (the room dispatcher for room topics, the session actor for session
//! topics), so subscribers observe events in publish order. Publishing to a
//! topic with no subscribers is a no-op, not an error.

use std::collections::HashMap;

use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use crate::domain::state::PresenceStatus;
use crate::ws::protocol::{EventEnvelope, PresenceEntry, Topic};

/// Per-topic buffer; a subscriber this far behind gets a lag error and must
/// resync over HTTP.
const CHANNEL_CAPACITY: usize = 256;

pub struct TopicHub {
    channels: DashMap<Topic, broadcast::Sender<EventEnvelope>>,
    presence: DashMap<Topic, HashMap<Uuid, PresenceStatus>>,
}

impl TopicHub {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
            presence: DashMap::new(),
        }
    }

    pub fn subscribe(&self, topic: &Topic) -> broadcast::Receiver<EventEnvelope> {
        self.channels
            .entry(topic.clone())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    pub fn publish(&self, topic: &Topic, event: EventEnvelope) {
        let sender = self
            .channels
            .entry(topic.clone())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone();
        // Err means no live receivers right now; the event is still "sent"
        // from the publisher's point of view.
        let _ = sender.send(event);
    }

    /// Record a presence change and publish the delta on the topic.
    pub fn track_presence(&self, topic: &Topic, participant_id: Uuid, presence: PresenceStatus) {
        self.presence
            .entry(topic.clone())
            .or_default()
            .insert(participant_id, presence);
        self.publish(
            topic,
            EventEnvelope::PresenceChanged {
                participant_id,
                presence,
            },
        );
    }

    pub fn forget_presence(&self, topic: &Topic, participant_id: Uuid) {
        if let Some(mut map) = self.presence.get_mut(topic) {
            map.remove(&participant_id);
        }
    }

    pub fn presence_snapshot(&self, topic: &Topic) -> Vec<PresenceEntry> {
        let mut entries: Vec<PresenceEntry> = self
            .presence
            .get(topic)
            .map(|map| {
                map.iter()
                    .map(|(&participant_id, &presence)| PresenceEntry {
                        participant_id,
                        presence,
                    })
                    .collect()
            })
            .unwrap_or_default();
        entries.sort_by_key(|e| e.participant_id);
        entries
    }

    /// Drop a finished topic. Existing receivers drain whatever was already
    /// published, then see the stream end.
    pub fn retire_topic(&self, topic: &Topic) {
        self.channels.remove(topic);
        self.presence.remove(topic);
        debug!(?topic, "topic retired");
    }
}

impl Default for TopicHub {
    fn default() -> Self {
        Self::new()
    }
}
