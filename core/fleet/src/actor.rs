// Path and File Name : /home/netsnare/rebuild/core/fleet/src/actor.rs
// Author: Qv9Xw2LpTzK4dRmY7cHgUeB1nJf8oAiS5kWxZ3tMqD0
// Details of functionality of this file: Fleet entity types - enrolled actors, pending enrollment candidates and edge scan reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorStatus {
    #[serde(rename = "ONLINE")]
    Online,
    #[serde(rename = "OFFLINE")]
    Offline,
    #[serde(rename = "COMPROMISED")]
    Compromised,
    #[serde(rename = "MAINTENANCE")]
    Maintenance,
    #[serde(rename = "UNREACHABLE")]
    Unreachable,
}

/// An enrolled edge deception device. Identified externally by its stable
/// hardware id; mutated by every heartbeat, scan and status transition.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: Uuid,
    pub hardware_id: String,
    pub gateway_id: Option<String>,
    pub name: String,
    pub local_ip: String,
    pub status: ActorStatus,
    pub last_seen: DateTime<Utc>,
    pub os_version: String,
    pub agent_version: String,
    pub wifi_present: bool,
    pub bluetooth_present: bool,
    pub scanning_enabled: bool,
    pub cpu_percent: f64,
    pub mem_percent: f64,
    pub temperature_c: f64,
    pub tcp_sentinel_enabled: bool,
}

/// An enrollment candidate awaiting operator approval. At most one exists
/// per hardware id at any time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingActor {
    pub id: Uuid,
    pub hardware_id: String,
    pub detected_ip: String,
    pub detected_at: DateTime<Utc>,
    pub os_version: String,
}

/// Telemetry and capability report from one edge recon cycle.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub cpu: f64,
    pub ram: f64,
    pub temp: f64,
    #[serde(default)]
    pub wifi_networks: Vec<String>,
    #[serde(default)]
    pub bluetooth_devices: Vec<String>,
    pub version: Option<String>,
}
