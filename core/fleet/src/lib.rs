// Path and File Name : /home/netsnare/rebuild/core/fleet/src/lib.rs
// Author: Qv9Xw2LpTzK4dRmY7cHgUeB1nJf8oAiS5kWxZ3tMqD0
// Details of functionality of this file: Library root for the fleet crate - actor types, enrollment state machine and the fleet registry

mod actor;
mod errors;
mod registry;
mod tests;

pub use actor::{Actor, ActorStatus, PendingActor, ScanReport};
pub use errors::FleetError;
pub use registry::{EnrollmentStatus, FleetRegistry, HeartbeatDecision};
