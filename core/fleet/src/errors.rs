// Path and File Name : /home/netsnare/rebuild/core/fleet/src/errors.rs
// Author: Qv9Xw2LpTzK4dRmY7cHgUeB1nJf8oAiS5kWxZ3tMqD0
// Details of functionality of this file: Error types for the fleet crate

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum FleetError {
    #[error("Pending enrollment not found: {0}")]
    PendingNotFound(Uuid),
    #[error("Actor not found: {0}")]
    ActorNotFound(Uuid),
}
