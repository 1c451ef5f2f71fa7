// Path and File Name : /home/netsnare/rebuild/core/dispatch/src/errors.rs
// Author: Qv9Xw2LpTzK4dRmY7cHgUeB1nJf8oAiS5kWxZ3tMqD0
// Details of functionality of this file: Error types for the dispatch crate

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Command job not found: {0}")]
    JobNotFound(Uuid),
    #[error("Invalid status transition for job {0}: {1}")]
    InvalidTransition(Uuid, String),
}
