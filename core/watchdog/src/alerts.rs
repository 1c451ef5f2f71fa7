// Path and File Name : /home/netsnare/rebuild/core/watchdog/src/alerts.rs
// Author: Qv9Xw2LpTzK4dRmY7cHgUeB1nJf8oAiS5kWxZ3tMqD0
// Details of functionality of this file: Append-only alert log - one row per accepted alert after throttling

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LogLevel {
    #[serde(rename = "INFO")]
    Info,
    #[serde(rename = "WARNING")]
    Warning,
    #[serde(rename = "CRITICAL")]
    Critical,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRow {
    pub actor_id: Option<Uuid>,
    pub level: LogLevel,
    pub process: String,
    pub message: String,
    pub source_ip: String,
    pub timestamp: DateTime<Utc>,
}

/// Append-only log of accepted alerts and status events.
pub struct AlertLog {
    rows: RwLock<Vec<LogRow>>,
}

impl AlertLog {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }

    pub fn append(&self, row: LogRow) {
        self.rows.write().push(row);
    }

    /// Newest-first view of the most recent rows.
    pub fn recent(&self, limit: usize) -> Vec<LogRow> {
        let rows = self.rows.read();
        rows.iter().rev().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

impl Default for AlertLog {
    fn default() -> Self {
        Self::new()
    }
}
