// Path and File Name : /home/netsnare/rebuild/core/fleet/src/tests/enrollment_tests.rs
// Author: Qv9Xw2LpTzK4dRmY7cHgUeB1nJf8oAiS5kWxZ3tMqD0
// Details of functionality of this file: Tests for enrollment - pending candidate idempotence, approval atomicity, rejection

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use crate::{ActorStatus, EnrollmentStatus, FleetRegistry};

    fn registry() -> FleetRegistry {
        FleetRegistry::new("1.0.0".to_string())
    }

    #[test]
    fn test_unknown_heartbeat_creates_one_pending_actor() {
        let fleet = registry();

        let first = fleet.heartbeat("AA:BB:CC", "10.0.0.5", Some("Debian 12"));
        assert_eq!(first.status, EnrollmentStatus::Pending);
        assert!(first.actor_id.is_none());

        // Second heartbeat before approval must not duplicate the candidate.
        let second = fleet.heartbeat("AA:BB:CC", "10.0.0.5", Some("Debian 12"));
        assert_eq!(second.status, EnrollmentStatus::Pending);
        assert_eq!(fleet.list_pending().len(), 1);

        let pending = &fleet.list_pending()[0];
        assert_eq!(pending.hardware_id, "AA:BB:CC");
        assert_eq!(pending.detected_ip, "10.0.0.5");
        assert_eq!(pending.os_version, "Debian 12");
    }

    #[test]
    fn test_approval_creates_online_actor_and_clears_pending() {
        let fleet = registry();
        fleet.heartbeat("AA:BB:CC", "10.0.0.5", None);
        let pending_id = fleet.list_pending()[0].id;

        let actor_id = fleet
            .approve(pending_id, Some("gw-1".to_string()), "Node1".to_string())
            .unwrap();

        assert!(fleet.list_pending().is_empty());
        let actor = fleet.get(actor_id).unwrap();
        assert_eq!(actor.status, ActorStatus::Online);
        assert_eq!(actor.hardware_id, "AA:BB:CC");
        assert_eq!(actor.gateway_id.as_deref(), Some("gw-1"));
        assert_eq!(actor.name, "Node1");
        assert_eq!(actor.local_ip, "10.0.0.5");
    }

    #[test]
    fn test_approving_unknown_pending_id_has_no_side_effects() {
        let fleet = registry();
        fleet.heartbeat("AA:BB:CC", "10.0.0.5", None);

        let result = fleet.approve(Uuid::new_v4(), None, "Ghost".to_string());
        assert!(result.is_err());
        assert_eq!(fleet.list_pending().len(), 1);
        assert!(fleet.list().is_empty());
    }

    #[test]
    fn test_heartbeat_after_approval_reports_approved() {
        let fleet = registry();
        fleet.heartbeat("AA:BB:CC", "10.0.0.5", None);
        let pending_id = fleet.list_pending()[0].id;
        let actor_id = fleet.approve(pending_id, None, "Node1".to_string()).unwrap();

        let decision = fleet.heartbeat("AA:BB:CC", "10.0.0.5", Some("Debian 12"));
        assert_eq!(decision.status, EnrollmentStatus::Approved);
        assert_eq!(decision.actor_id, Some(actor_id));
        assert_eq!(decision.latest_version.as_deref(), Some("1.0.0"));

        let actor = fleet.get(actor_id).unwrap();
        assert_eq!(actor.os_version, "Debian 12");
    }

    #[test]
    fn test_heartbeat_ignores_unknown_os_report() {
        let fleet = registry();
        fleet.heartbeat("AA:BB:CC", "10.0.0.5", Some("Debian 12"));
        let pending_id = fleet.list_pending()[0].id;
        let actor_id = fleet.approve(pending_id, None, "Node1".to_string()).unwrap();

        fleet.heartbeat("AA:BB:CC", "10.0.0.5", Some("unknown"));
        assert_eq!(fleet.get(actor_id).unwrap().os_version, "Debian 12");

        fleet.heartbeat("AA:BB:CC", "10.0.0.5", Some(""));
        assert_eq!(fleet.get(actor_id).unwrap().os_version, "Debian 12");
    }

    #[test]
    fn test_rejection_deletes_candidate_without_actor() {
        let fleet = registry();
        fleet.heartbeat("DD:EE:FF", "10.0.0.6", None);
        let pending_id = fleet.list_pending()[0].id;

        fleet.reject(pending_id).unwrap();
        assert!(fleet.list_pending().is_empty());
        assert!(fleet.list().is_empty());

        // Rejection is not terminal for the hardware id: the next heartbeat
        // re-enters the pending state.
        let decision = fleet.heartbeat("DD:EE:FF", "10.0.0.6", None);
        assert_eq!(decision.status, EnrollmentStatus::Pending);
        assert_eq!(fleet.list_pending().len(), 1);
    }

    #[test]
    fn test_concurrent_unknown_heartbeats_yield_one_candidate() {
        use std::sync::Arc;

        let fleet = Arc::new(registry());
        let mut workers = Vec::new();
        for _ in 0..8 {
            let fleet = fleet.clone();
            workers.push(std::thread::spawn(move || {
                for _ in 0..25 {
                    fleet.heartbeat("AA:BB:CC", "10.0.0.5", None);
                }
            }));
        }
        for worker in workers {
            worker.join().unwrap();
        }
        assert_eq!(fleet.list_pending().len(), 1);
    }
}
