// Path and File Name : /home/netsnare/rebuild/core/dispatch/src/lib.rs
// Author: Qv9Xw2LpTzK4dRmY7cHgUeB1nJf8oAiS5kWxZ3tMqD0
// Details of functionality of this file: Library root for the dispatch crate - command job queue and the wireless recon scheduler

mod errors;
mod queue;
mod scheduler;

pub use errors::DispatchError;
pub use queue::{CommandJob, DispatchQueue, JobStatus};
pub use scheduler::{ReconScheduler, SCAN_COMMAND, UNINSTALL_COMMAND};
