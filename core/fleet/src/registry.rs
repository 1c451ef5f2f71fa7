// Path and File Name : /home/netsnare/rebuild/core/fleet/src/registry.rs
// Author: Qv9Xw2LpTzK4dRmY7cHgUeB1nJf8oAiS5kWxZ3tMqD0
// Details of functionality of this file: Fleet registry - hardware-id based enrollment, heartbeat liveness and actor status transitions

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::actor::{Actor, ActorStatus, PendingActor, ScanReport};
use crate::errors::FleetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EnrollmentStatus {
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "APPROVED")]
    Approved,
}

/// Outcome of one heartbeat: PENDING while awaiting approval, APPROVED with
/// the actor id and the fleet's target agent version afterwards.
#[derive(Debug, Clone)]
pub struct HeartbeatDecision {
    pub status: EnrollmentStatus,
    pub actor_id: Option<Uuid>,
    pub latest_version: Option<String>,
}

/// Registry of record for the fleet. Actors are held behind per-entity
/// mutexes; the keyed maps are only locked for lookup and insertion so one
/// slow actor mutation never blocks the rest of the fleet.
pub struct FleetRegistry {
    actors: RwLock<HashMap<Uuid, Arc<Mutex<Actor>>>>,
    hardware_index: RwLock<HashMap<String, Uuid>>,
    pending: RwLock<HashMap<String, PendingActor>>,
    target_agent_version: String,
}

impl FleetRegistry {
    pub fn new(target_agent_version: String) -> Self {
        Self {
            actors: RwLock::new(HashMap::new()),
            hardware_index: RwLock::new(HashMap::new()),
            pending: RwLock::new(HashMap::new()),
            target_agent_version,
        }
    }

    /// Heartbeat state machine: UNREGISTERED -> PENDING -> APPROVED.
    ///
    /// Unknown hardware ids get at most one PendingActor no matter how many
    /// heartbeats arrive before approval. Known actors refresh liveness;
    /// COMPROMISED is sticky and never cleared by routine traffic.
    pub fn heartbeat(
        &self,
        hardware_id: &str,
        observed_ip: &str,
        os_version: Option<&str>,
    ) -> HeartbeatDecision {
        let known = self.hardware_index.read().get(hardware_id).copied();

        if let Some(actor_id) = known {
            if let Some(handle) = self.actors.read().get(&actor_id).cloned() {
                let mut actor = handle.lock();
                actor.last_seen = Utc::now();
                if !observed_ip.is_empty() {
                    actor.local_ip = observed_ip.to_string();
                }
                if let Some(os) = os_version {
                    if !os.is_empty() && !os.eq_ignore_ascii_case("unknown") {
                        actor.os_version = os.to_string();
                    }
                }
                if actor.status != ActorStatus::Compromised {
                    actor.status = ActorStatus::Online;
                }
                return HeartbeatDecision {
                    status: EnrollmentStatus::Approved,
                    actor_id: Some(actor_id),
                    latest_version: Some(self.target_agent_version.clone()),
                };
            }
        }

        let mut pending = self.pending.write();
        pending
            .entry(hardware_id.to_string())
            .or_insert_with(|| {
                info!("New enrollment candidate: hardware_id={}", hardware_id);
                PendingActor {
                    id: Uuid::new_v4(),
                    hardware_id: hardware_id.to_string(),
                    detected_ip: observed_ip.to_string(),
                    detected_at: Utc::now(),
                    os_version: os_version.unwrap_or("unknown").to_string(),
                }
            });

        HeartbeatDecision {
            status: EnrollmentStatus::Pending,
            actor_id: None,
            latest_version: None,
        }
    }

    /// Approve an enrollment candidate: create the Actor (ONLINE, fresh
    /// liveness) and delete the PendingActor. Fails with no partial state if
    /// the candidate no longer exists.
    pub fn approve(
        &self,
        pending_id: Uuid,
        gateway_id: Option<String>,
        name: String,
    ) -> Result<Uuid, FleetError> {
        let candidate = {
            let mut pending = self.pending.write();
            let key = pending
                .iter()
                .find(|(_, p)| p.id == pending_id)
                .map(|(k, _)| k.clone())
                .ok_or(FleetError::PendingNotFound(pending_id))?;
            pending
                .remove(&key)
                .ok_or(FleetError::PendingNotFound(pending_id))?
        };

        let actor = Actor {
            id: Uuid::new_v4(),
            hardware_id: candidate.hardware_id.clone(),
            gateway_id,
            name,
            local_ip: candidate.detected_ip,
            status: ActorStatus::Online,
            last_seen: Utc::now(),
            os_version: candidate.os_version,
            agent_version: "unknown".to_string(),
            wifi_present: false,
            bluetooth_present: false,
            scanning_enabled: true,
            cpu_percent: 0.0,
            mem_percent: 0.0,
            temperature_c: 0.0,
            tcp_sentinel_enabled: false,
        };
        let actor_id = actor.id;

        self.actors
            .write()
            .insert(actor_id, Arc::new(Mutex::new(actor)));
        self.hardware_index
            .write()
            .insert(candidate.hardware_id.clone(), actor_id);
        // A heartbeat racing the approval may have re-created a candidate for
        // the same hardware id; it is stale now that the actor exists.
        self.pending
            .write()
            .retain(|hw, _| hw != &candidate.hardware_id);

        info!(
            "Enrollment approved: hardware_id={} actor_id={}",
            candidate.hardware_id, actor_id
        );
        Ok(actor_id)
    }

    /// Reject an enrollment candidate outright.
    pub fn reject(&self, pending_id: Uuid) -> Result<(), FleetError> {
        let mut pending = self.pending.write();
        let key = pending
            .iter()
            .find(|(_, p)| p.id == pending_id)
            .map(|(k, _)| k.clone())
            .ok_or(FleetError::PendingNotFound(pending_id))?;
        pending.remove(&key);
        info!("Enrollment rejected: pending_id={}", pending_id);
        Ok(())
    }

    pub fn list_pending(&self) -> Vec<PendingActor> {
        let mut listed: Vec<PendingActor> = self.pending.read().values().cloned().collect();
        listed.sort_by_key(|p| p.detected_at);
        listed
    }

    pub fn get(&self, actor_id: Uuid) -> Option<Actor> {
        self.actors
            .read()
            .get(&actor_id)
            .map(|handle| handle.lock().clone())
    }

    pub fn list(&self) -> Vec<Actor> {
        self.actors
            .read()
            .values()
            .map(|handle| handle.lock().clone())
            .collect()
    }

    /// Refresh liveness for a known actor (command poll, scan report).
    /// Same sticky-compromise rule as the heartbeat path.
    pub fn touch(&self, actor_id: Uuid) -> Result<(), FleetError> {
        let handle = self
            .actors
            .read()
            .get(&actor_id)
            .cloned()
            .ok_or(FleetError::ActorNotFound(actor_id))?;
        let mut actor = handle.lock();
        actor.last_seen = Utc::now();
        if actor.status != ActorStatus::Compromised {
            actor.status = ActorStatus::Online;
        }
        Ok(())
    }

    /// Record one edge recon cycle: telemetry, capability flags and the
    /// self-reported agent version.
    pub fn record_scan(&self, actor_id: Uuid, report: &ScanReport) -> Result<(), FleetError> {
        let handle = self
            .actors
            .read()
            .get(&actor_id)
            .cloned()
            .ok_or(FleetError::ActorNotFound(actor_id))?;
        let mut actor = handle.lock();
        actor.cpu_percent = report.cpu;
        actor.mem_percent = report.ram;
        actor.temperature_c = report.temp;
        actor.wifi_present = !report.wifi_networks.is_empty();
        actor.bluetooth_present = !report.bluetooth_devices.is_empty();
        if let Some(version) = &report.version {
            if !version.is_empty() {
                actor.agent_version = version.clone();
            }
        }
        actor.last_seen = Utc::now();
        if actor.status != ActorStatus::Compromised {
            actor.status = ActorStatus::Online;
        }
        debug!(
            "Scan recorded: actor_id={} wifi={} bluetooth={}",
            actor_id,
            report.wifi_networks.len(),
            report.bluetooth_devices.len()
        );
        Ok(())
    }

    /// Force COMPROMISED regardless of current status.
    pub fn set_compromised(&self, actor_id: Uuid) -> Result<(), FleetError> {
        let handle = self
            .actors
            .read()
            .get(&actor_id)
            .cloned()
            .ok_or(FleetError::ActorNotFound(actor_id))?;
        let mut actor = handle.lock();
        if actor.status != ActorStatus::Compromised {
            warn!("Actor {} marked COMPROMISED", actor_id);
        }
        actor.status = ActorStatus::Compromised;
        Ok(())
    }

    /// Operator acknowledgement: the only path that clears COMPROMISED.
    pub fn acknowledge(&self, actor_id: Uuid) -> Result<(), FleetError> {
        let handle = self
            .actors
            .read()
            .get(&actor_id)
            .cloned()
            .ok_or(FleetError::ActorNotFound(actor_id))?;
        let mut actor = handle.lock();
        if actor.status == ActorStatus::Compromised {
            actor.status = ActorStatus::Online;
            info!("Actor {} acknowledged, status reset to ONLINE", actor_id);
        }
        Ok(())
    }

    /// Watchdog sweep: ONLINE actors whose liveness is older than the
    /// threshold go OFFLINE. Never downgrades COMPROMISED.
    pub fn mark_offline_stale(&self, threshold: Duration) -> Vec<Uuid> {
        let cutoff = Utc::now() - threshold;
        let handles: Vec<Arc<Mutex<Actor>>> = self.actors.read().values().cloned().collect();
        let mut transitioned = Vec::new();
        for handle in handles {
            let mut actor = handle.lock();
            if actor.status == ActorStatus::Online && actor.last_seen < cutoff {
                actor.status = ActorStatus::Offline;
                transitioned.push(actor.id);
                warn!("Actor {} went OFFLINE (last seen {})", actor.id, actor.last_seen);
            }
        }
        transitioned
    }

    /// Best-effort reverse lookup of an actor by its local address. Used by
    /// direct listeners: a relayed connection arrives from the relaying
    /// actor's address, not the true attacker's.
    pub fn resolve_by_ip(&self, ip: &str) -> Option<Uuid> {
        self.actors
            .read()
            .values()
            .find(|handle| handle.lock().local_ip == ip)
            .map(|handle| handle.lock().id)
    }

    /// ONLINE actors with scanning enabled - the recon scheduler's targets.
    pub fn scan_targets(&self) -> Vec<Uuid> {
        self.actors
            .read()
            .values()
            .filter_map(|handle| {
                let actor = handle.lock();
                (actor.status == ActorStatus::Online && actor.scanning_enabled).then_some(actor.id)
            })
            .collect()
    }

    /// Operator deletion. The self-uninstall command is enqueued by the
    /// caller beforehand; removal itself carries no side effects.
    pub fn remove(&self, actor_id: Uuid) -> Result<Actor, FleetError> {
        let handle = self
            .actors
            .write()
            .remove(&actor_id)
            .ok_or(FleetError::ActorNotFound(actor_id))?;
        let actor = handle.lock().clone();
        self.hardware_index
            .write()
            .retain(|_, id| *id != actor_id);
        info!("Actor {} removed from fleet", actor_id);
        Ok(actor)
    }

    /// Test/support hook: rewind an actor's liveness clock.
    pub fn backdate_last_seen(&self, actor_id: Uuid, age: Duration) -> Result<(), FleetError> {
        let handle = self
            .actors
            .read()
            .get(&actor_id)
            .cloned()
            .ok_or(FleetError::ActorNotFound(actor_id))?;
        handle.lock().last_seen = Utc::now() - age;
        Ok(())
    }
}
