// Path and File Name : /home/netsnare/rebuild/core/dispatch/src/queue.rs
// Author: Qv9Xw2LpTzK4dRmY7cHgUeB1nJf8oAiS5kWxZ3tMqD0
// Details of functionality of this file: Per-actor command job FIFO - single in-flight dispatch bound enforced under the actor queue lock

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::DispatchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "RUNNING")]
    Running,
    #[serde(rename = "COMPLETED")]
    Completed,
    #[serde(rename = "FAILED")]
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// One unit of work dispatched to one actor. Status is monotone
/// PENDING -> RUNNING -> {COMPLETED, FAILED}; no job regresses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandJob {
    pub id: Uuid,
    pub actor_id: Uuid,
    pub command: String,
    pub status: JobStatus,
    pub output: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Command dispatch queue: one FIFO per actor, one job in flight per actor.
///
/// Polling flips the handed-out job to RUNNING under the actor's queue lock,
/// so two concurrent polls can never receive the same job. The edge agent's
/// own RUNNING report is accepted as an idempotent refresh, and late or
/// out-of-order terminal reports are recorded rather than fenced - the
/// caller is unattended, unreliable infrastructure.
pub struct DispatchQueue {
    queues: RwLock<HashMap<Uuid, Arc<Mutex<Vec<CommandJob>>>>>,
    job_index: RwLock<HashMap<Uuid, Uuid>>,
}

impl DispatchQueue {
    pub fn new() -> Self {
        Self {
            queues: RwLock::new(HashMap::new()),
            job_index: RwLock::new(HashMap::new()),
        }
    }

    fn actor_queue(&self, actor_id: Uuid) -> Arc<Mutex<Vec<CommandJob>>> {
        if let Some(queue) = self.queues.read().get(&actor_id) {
            return queue.clone();
        }
        self.queues
            .write()
            .entry(actor_id)
            .or_insert_with(|| Arc::new(Mutex::new(Vec::new())))
            .clone()
    }

    /// Append a PENDING job to the actor's FIFO.
    pub fn enqueue(&self, actor_id: Uuid, command: String) -> Uuid {
        let now = Utc::now();
        let job = CommandJob {
            id: Uuid::new_v4(),
            actor_id,
            command,
            status: JobStatus::Pending,
            output: None,
            created_at: now,
            updated_at: now,
        };
        let job_id = job.id;

        let queue = self.actor_queue(actor_id);
        queue.lock().push(job);
        self.job_index.write().insert(job_id, actor_id);

        info!("Job {} enqueued for actor {}", job_id, actor_id);
        job_id
    }

    /// Hand out at most one job: the oldest PENDING entry, atomically marked
    /// RUNNING. Returns none while another job is still in flight.
    pub fn poll(&self, actor_id: Uuid) -> Option<CommandJob> {
        let queue = self.actor_queue(actor_id);
        let mut jobs = queue.lock();

        if jobs.iter().any(|j| j.status == JobStatus::Running) {
            return None;
        }

        let job = jobs.iter_mut().find(|j| j.status == JobStatus::Pending)?;
        job.status = JobStatus::Running;
        job.updated_at = Utc::now();
        debug!("Job {} dispatched to actor {}", job.id, actor_id);
        Some(job.clone())
    }

    /// Record a status report from the executing actor.
    ///
    /// Terminal statuses are always accepted and overwrite the job's output.
    /// RUNNING refreshes are accepted unless the job is already terminal.
    /// Regressing a job back to PENDING is refused.
    pub fn report(
        &self,
        job_id: Uuid,
        status: JobStatus,
        output: Option<String>,
    ) -> Result<(), DispatchError> {
        let actor_id = self
            .job_index
            .read()
            .get(&job_id)
            .copied()
            .ok_or(DispatchError::JobNotFound(job_id))?;

        let queue = self.actor_queue(actor_id);
        let mut jobs = queue.lock();
        let job = jobs
            .iter_mut()
            .find(|j| j.id == job_id)
            .ok_or(DispatchError::JobNotFound(job_id))?;

        match status {
            JobStatus::Pending => {
                return Err(DispatchError::InvalidTransition(
                    job_id,
                    "jobs cannot regress to PENDING".to_string(),
                ));
            }
            JobStatus::Running => {
                if job.status.is_terminal() {
                    warn!("Ignoring RUNNING report for terminal job {}", job_id);
                    return Ok(());
                }
                job.status = JobStatus::Running;
            }
            terminal => {
                job.status = terminal;
                if output.is_some() {
                    job.output = output;
                }
                info!("Job {} reported {:?}", job_id, terminal);
            }
        }
        job.updated_at = Utc::now();
        Ok(())
    }

    pub fn get(&self, job_id: Uuid) -> Option<CommandJob> {
        let actor_id = self.job_index.read().get(&job_id).copied()?;
        let queue = self.actor_queue(actor_id);
        let jobs = queue.lock();
        jobs.iter().find(|j| j.id == job_id).cloned()
    }

    /// All jobs for one actor, newest first.
    pub fn list_for(&self, actor_id: Uuid) -> Vec<CommandJob> {
        let queue = self.actor_queue(actor_id);
        let mut listed: Vec<CommandJob> = queue.lock().clone();
        listed.reverse();
        listed
    }
}

impl Default for DispatchQueue {
    fn default() -> Self {
        Self::new()
    }
}
