//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

use super::types::{ConnectionEvent, PlaybackEvent, SessionEvent, StatsEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Animation steps of the round being played back
    Playback,
    /// Session lifecycle, controls and notices
    Session,
    /// Push channel health
    Connection,
    /// Aggregates and history refreshed from the backend
    Stats,
}

impl Topic {
    pub const ALL: [Topic; 4] = [
        Topic::Playback,
        Topic::Session,
        Topic::Connection,
        Topic::Stats,
    ];
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Playback(PlaybackEvent),
    Session(SessionEvent),
    Connection(ConnectionEvent),
    Stats(StatsEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Playback(_) => Topic::Playback,
            Event::Session(_) => Topic::Session,
            Event::Connection(_) => Topic::Connection,
            Event::Stats(_) => Topic::Stats,
        }
    }
}

impl From<PlaybackEvent> for Event {
    fn from(event: PlaybackEvent) -> Self {
        Event::Playback(event)
    }
}

impl From<SessionEvent> for Event {
    fn from(event: SessionEvent) -> Self {
        Event::Session(event)
    }
}

impl From<ConnectionEvent> for Event {
    fn from(event: ConnectionEvent) -> Self {
        Event::Connection(event)
    }
}

impl From<StatsEvent> for Event {
    fn from(event: StatsEvent) -> Self {
        Event::Stats(event)
    }
}

struct Channels {
    playback: broadcast::Sender<Event>,
    session: broadcast::Sender<Event>,
    connection: broadcast::Sender<Event>,
    stats: broadcast::Sender<Event>,
}

impl Channels {
    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Playback => &self.playback,
            Topic::Session => &self.session,
            Topic::Connection => &self.connection,
            Topic::Stats => &self.stats,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Publishing never blocks; a lagging subscriber
/// loses the oldest events of its topic.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<Channels>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            channels: Arc::new(Channels {
                playback: broadcast::channel(capacity).0,
                session: broadcast::channel(capacity).0,
                connection: broadcast::channel(capacity).0,
                stats: broadcast::channel(capacity).0,
            }),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: impl Into<Event>) {
        let event = event.into();
        let topic = event.topic();
        if self.channels.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.channels.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    ///
    /// Returns receivers for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_reach_only_their_topic() {
        let bus = EventBus::with_capacity(8);
        let mut playback = bus.subscribe(Topic::Playback);
        let mut connection = bus.subscribe(Topic::Connection);

        bus.publish(PlaybackEvent::StatusCleared);
        bus.publish(ConnectionEvent::Connected);

        assert!(matches!(
            playback.recv().await.unwrap(),
            Event::Playback(PlaybackEvent::StatusCleared)
        ));
        assert!(matches!(
            connection.recv().await.unwrap(),
            Event::Connection(ConnectionEvent::Connected)
        ));
        assert!(playback.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        let bus = EventBus::new();
        bus.publish(StatsEvent::Overview(Default::default()));
        assert_eq!(bus.subscribe_multiple(&Topic::ALL).len(), 4);
    }
}
