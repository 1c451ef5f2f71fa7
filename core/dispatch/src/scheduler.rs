// Path and File Name : /home/netsnare/rebuild/core/dispatch/src/scheduler.rs
// Author: Qv9Xw2LpTzK4dRmY7cHgUeB1nJf8oAiS5kWxZ3tMqD0
// Details of functionality of this file: Wireless recon scheduler - fixed-interval enqueue of scan jobs for eligible actors

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use netsnare_fleet::FleetRegistry;

use crate::queue::DispatchQueue;

/// Recon command executed by the edge agent on its next poll cycle.
pub const SCAN_COMMAND: &str = "wireless-scan";

/// Enqueued before operator deletion so the edge agent removes itself.
pub const UNINSTALL_COMMAND: &str = "self-uninstall";

/// Fixed-interval scheduler: every tick, one scan job per ONLINE actor with
/// scanning enabled. A failed tick is skipped, never fatal.
pub struct ReconScheduler {
    fleet: Arc<FleetRegistry>,
    queue: Arc<DispatchQueue>,
    interval: Duration,
}

impl ReconScheduler {
    pub fn new(fleet: Arc<FleetRegistry>, queue: Arc<DispatchQueue>, interval: Duration) -> Self {
        Self {
            fleet,
            queue,
            interval,
        }
    }

    /// One scheduling pass. Returns the number of jobs enqueued.
    pub fn tick(&self) -> usize {
        let targets = self.fleet.scan_targets();
        for actor_id in &targets {
            self.queue.enqueue(*actor_id, SCAN_COMMAND.to_string());
        }
        if !targets.is_empty() {
            debug!("Recon tick enqueued {} scan jobs", targets.len());
        }
        targets.len()
    }

    pub async fn run(self) {
        info!(
            "Recon scheduler running every {}s",
            self.interval.as_secs()
        );
        let mut ticker = tokio::time::interval(self.interval);
        // The immediate first tick would race actor enrollment at startup.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            self.tick();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use netsnare_fleet::FleetRegistry;

    #[test]
    fn test_tick_enqueues_one_scan_job_per_eligible_actor() {
        let fleet = Arc::new(FleetRegistry::new("1.0.0".to_string()));
        let queue = Arc::new(DispatchQueue::new());

        fleet.heartbeat("AA:BB:CC", "10.0.0.5", None);
        let pending_id = fleet.list_pending()[0].id;
        let actor_id = fleet.approve(pending_id, None, "Node1".to_string()).unwrap();

        let scheduler =
            ReconScheduler::new(fleet.clone(), queue.clone(), Duration::from_secs(120));
        assert_eq!(scheduler.tick(), 1);

        let job = queue.poll(actor_id).unwrap();
        assert_eq!(job.command, SCAN_COMMAND);
    }

    #[test]
    fn test_tick_with_no_eligible_actors_is_a_noop() {
        let fleet = Arc::new(FleetRegistry::new("1.0.0".to_string()));
        let queue = Arc::new(DispatchQueue::new());
        let scheduler = ReconScheduler::new(fleet, queue, Duration::from_secs(120));
        assert_eq!(scheduler.tick(), 0);
    }
}
