use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::core::matcher::MatchResult;

/// Notification pushed to connected sockets after each enrollment or check.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttendanceEvent {
    Enrolled {
        name: String,
        at: DateTime<Utc>,
    },
    Matched {
        name: String,
        distance: f32,
        at: DateTime<Utc>,
    },
    NoMatch {
        at: DateTime<Utc>,
    },
}

impl AttendanceEvent {
    pub fn enrolled(name: impl Into<String>) -> Self {
        AttendanceEvent::Enrolled { name: name.into(), at: Utc::now() }
    }

    pub fn from_match(result: &MatchResult) -> Self {
        match result {
            MatchResult::Match { identity, distance } => AttendanceEvent::Matched {
                name: identity.clone(),
                distance: *distance,
                at: Utc::now(),
            },
            MatchResult::NoMatch => AttendanceEvent::NoMatch { at: Utc::now() },
        }
    }
}

/// Fan-out of attendance events. Publishing never blocks; a slow subscriber
/// loses the oldest events once it falls `capacity` behind.
#[derive(Debug, Clone)]
pub struct EventHub {
    sender: broadcast::Sender<AttendanceEvent>,
}

impl EventHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, event: AttendanceEvent) {
        // Err only means nobody is listening
        if self.sender.send(event).is_err() {
            tracing::trace!("No socket subscribers for event");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AttendanceEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
