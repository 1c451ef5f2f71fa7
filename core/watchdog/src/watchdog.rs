// Path and File Name : /home/netsnare/rebuild/core/watchdog/src/watchdog.rs
// Author: Qv9Xw2LpTzK4dRmY7cHgUeB1nJf8oAiS5kWxZ3tMqD0
// Details of functionality of this file: Periodic status watchdog and compromise escalation - offline sweep, controller-side alert dedup, acknowledgement

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use netsnare_fleet::{FleetError, FleetRegistry};

use crate::alerts::{AlertLog, LogLevel, LogRow};

/// Dedup key for alert throttling: (source address, targeted local port).
/// Alerts that carry no port share the zero slot per source.
type AlertKey = (String, u16);

/// Watchdog of record for actor status. The dedup window lives here, on the
/// controller, so the guarantee holds no matter which edge implementation
/// originates the alert.
pub struct Watchdog {
    fleet: Arc<FleetRegistry>,
    log: Arc<AlertLog>,
    offline_after: chrono::Duration,
    throttle_window: chrono::Duration,
    recent_alerts: Mutex<HashMap<AlertKey, DateTime<Utc>>>,
}

impl Watchdog {
    pub fn new(
        fleet: Arc<FleetRegistry>,
        log: Arc<AlertLog>,
        offline_after: Duration,
        throttle_window: Duration,
    ) -> Self {
        Self {
            fleet,
            log,
            offline_after: chrono::Duration::from_std(offline_after)
                .unwrap_or_else(|_| chrono::Duration::minutes(10)),
            throttle_window: chrono::Duration::from_std(throttle_window)
                .unwrap_or_else(|_| chrono::Duration::seconds(60)),
            recent_alerts: Mutex::new(HashMap::new()),
        }
    }

    /// One watchdog pass: stale ONLINE actors go OFFLINE. COMPROMISED is
    /// sticky and never downgraded here.
    pub fn sweep(&self) -> Vec<Uuid> {
        self.fleet.mark_offline_stale(self.offline_after)
    }

    pub async fn run(self: Arc<Self>, tick: Duration) {
        info!("Watchdog running every {}s", tick.as_secs());
        let mut ticker = tokio::time::interval(tick);
        loop {
            ticker.tick().await;
            self.sweep();
        }
    }

    /// Ingest an alert from the edge (or from a trap interaction).
    ///
    /// Repeats keyed by (source_ip, port) inside the throttle window are
    /// suppressed to a single log row. An accepted alert appends exactly one
    /// CRITICAL row and forces the actor COMPROMISED regardless of its
    /// current status. Returns false when the alert was suppressed.
    pub fn report_alert(
        &self,
        actor_id: Option<Uuid>,
        source_ip: &str,
        port: Option<u16>,
        kind: &str,
        details: &str,
    ) -> bool {
        let key: AlertKey = (source_ip.to_string(), port.unwrap_or(0));
        let now = Utc::now();

        {
            let mut recent = self.recent_alerts.lock();
            if let Some(last) = recent.get(&key) {
                if now - *last < self.throttle_window {
                    return false;
                }
            }
            recent.insert(key, now);
            let window = self.throttle_window;
            recent.retain(|_, seen| now - *seen < window);
        }

        warn!(
            "Alert accepted: kind={} source_ip={} actor_id={:?}",
            kind, source_ip, actor_id
        );
        self.log.append(LogRow {
            actor_id,
            level: LogLevel::Critical,
            process: kind.to_string(),
            message: details.to_string(),
            source_ip: source_ip.to_string(),
            timestamp: now,
        });

        if let Some(actor_id) = actor_id {
            // An alert for an already-deleted actor still leaves its log row.
            if let Err(e) = self.fleet.set_compromised(actor_id) {
                warn!("Alert references unknown actor: {}", e);
            }
        }
        true
    }

    /// Operator acknowledgement: the explicit COMPROMISED -> ONLINE reset.
    pub fn acknowledge(&self, actor_id: Uuid) -> Result<(), FleetError> {
        self.fleet.acknowledge(actor_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use netsnare_fleet::ActorStatus;

    fn fixture(throttle: Duration) -> (Arc<FleetRegistry>, Arc<AlertLog>, Watchdog) {
        let fleet = Arc::new(FleetRegistry::new("1.0.0".to_string()));
        let log = Arc::new(AlertLog::new());
        let watchdog = Watchdog::new(
            fleet.clone(),
            log.clone(),
            Duration::from_secs(600),
            throttle,
        );
        (fleet, log, watchdog)
    }

    fn enroll(fleet: &FleetRegistry) -> Uuid {
        fleet.heartbeat("AA:BB:CC", "10.0.0.5", None);
        let pending_id = fleet.list_pending()[0].id;
        fleet.approve(pending_id, None, "Node1".to_string()).unwrap()
    }

    #[test]
    fn test_alert_forces_compromised_and_logs_one_row() {
        let (fleet, log, watchdog) = fixture(Duration::from_secs(60));
        let actor_id = enroll(&fleet);

        assert!(watchdog.report_alert(
            Some(actor_id),
            "1.2.3.4",
            Some(21),
            "TRAP_TRIGGERED",
            "FTP decoy login attempt",
        ));

        assert_eq!(log.len(), 1);
        let row = &log.recent(10)[0];
        assert_eq!(row.level, LogLevel::Critical);
        assert_eq!(row.source_ip, "1.2.3.4");
        assert_eq!(
            fleet.get(actor_id).unwrap().status,
            ActorStatus::Compromised
        );

        // Routine liveness traffic must not clear the compromise.
        fleet.heartbeat("AA:BB:CC", "10.0.0.5", None);
        assert_eq!(
            fleet.get(actor_id).unwrap().status,
            ActorStatus::Compromised
        );
    }

    #[test]
    fn test_duplicate_alerts_within_window_are_suppressed() {
        let (fleet, log, watchdog) = fixture(Duration::from_secs(60));
        let actor_id = enroll(&fleet);

        assert!(watchdog.report_alert(Some(actor_id), "1.2.3.4", Some(23), "TRAP", "x"));
        assert!(!watchdog.report_alert(Some(actor_id), "1.2.3.4", Some(23), "TRAP", "x"));
        assert_eq!(log.len(), 1);

        // A different port is a different dedup key.
        assert!(watchdog.report_alert(Some(actor_id), "1.2.3.4", Some(6379), "TRAP", "x"));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_alerts_outside_window_are_accepted_again() {
        let (_fleet, log, watchdog) = fixture(Duration::from_millis(0));

        assert!(watchdog.report_alert(None, "1.2.3.4", None, "TRAP", "x"));
        // Zero-length window: the repeat is already outside it.
        assert!(watchdog.report_alert(None, "1.2.3.4", None, "TRAP", "x"));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_alert_for_unknown_actor_still_logged() {
        let (_fleet, log, watchdog) = fixture(Duration::from_secs(60));
        assert!(watchdog.report_alert(
            Some(Uuid::new_v4()),
            "1.2.3.4",
            None,
            "TRAP",
            "orphan alert",
        ));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_sweep_and_acknowledge_round_trip() {
        let (fleet, _log, watchdog) = fixture(Duration::from_secs(60));
        let actor_id = enroll(&fleet);

        fleet
            .backdate_last_seen(actor_id, chrono::Duration::minutes(11))
            .unwrap();
        assert_eq!(watchdog.sweep(), vec![actor_id]);
        assert_eq!(fleet.get(actor_id).unwrap().status, ActorStatus::Offline);

        watchdog.report_alert(Some(actor_id), "1.2.3.4", None, "TRAP", "x");
        assert_eq!(
            fleet.get(actor_id).unwrap().status,
            ActorStatus::Compromised
        );

        // Compromised wins over the sweep even while stale.
        assert!(watchdog.sweep().is_empty());

        watchdog.acknowledge(actor_id).unwrap();
        assert_eq!(fleet.get(actor_id).unwrap().status, ActorStatus::Online);
    }
}
