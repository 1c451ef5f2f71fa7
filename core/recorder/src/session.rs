// Path and File Name : /home/netsnare/rebuild/core/recorder/src/session.rs
// Author: Qv9Xw2LpTzK4dRmY7cHgUeB1nJf8oAiS5kWxZ3tMqD0
// Details of functionality of this file: Captured interaction types - frames, session records and the per-session synchronized handle

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use netsnare_emulation::Protocol;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "INPUT")]
    Input,
    #[serde(rename = "OUTPUT")]
    Output,
}

/// One captured input/output event, timed relative to session start.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub relative_time_ms: i64,
    pub direction: Direction,
    pub data: String,
}

/// A captured attacker interaction. Immutable once `closed` is set; frames
/// are appended only through the owning handle.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: Uuid,
    pub actor_id: Option<Uuid>,
    pub attacker_ip: String,
    pub protocol: Protocol,
    pub start_time: DateTime<Utc>,
    pub frames: Vec<Frame>,
    pub closed: bool,
}

impl SessionRecord {
    /// Duration derived from the last frame's relative time.
    pub fn duration_seconds(&self) -> f64 {
        self.frames
            .last()
            .map(|f| f.relative_time_ms as f64 / 1000.0)
            .unwrap_or(0.0)
    }
}

/// Per-session synchronization boundary: one mutex per session so a slow
/// peer never serializes frame capture for other connections.
#[derive(Debug)]
pub struct SessionHandle {
    id: Uuid,
    inner: Mutex<SessionRecord>,
}

impl SessionHandle {
    pub fn new(protocol: Protocol, attacker_ip: String, actor_id: Option<Uuid>) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            inner: Mutex::new(SessionRecord {
                id,
                actor_id,
                attacker_ip,
                protocol,
                start_time: Utc::now(),
                frames: Vec::new(),
                closed: false,
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn record_input(&self, data: &str) {
        self.record(Direction::Input, data);
    }

    pub fn record_output(&self, data: &str) {
        self.record(Direction::Output, data);
    }

    fn record(&self, direction: Direction, data: &str) {
        let mut record = self.inner.lock();
        if record.closed {
            return;
        }
        let relative_time_ms = (Utc::now() - record.start_time).num_milliseconds();
        record.frames.push(Frame {
            relative_time_ms,
            direction,
            data: data.to_string(),
        });
    }

    /// Seal the session. Further frame writes are dropped.
    pub fn close(&self) {
        self.inner.lock().closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    pub fn snapshot(&self) -> SessionRecord {
        self.inner.lock().clone()
    }
}
