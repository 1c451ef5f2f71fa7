// Path and File Name : /home/netsnare/rebuild/core/listeners/src/lib.rs
// Author: Qv9Xw2LpTzK4dRmY7cHgUeB1nJf8oAiS5kWxZ3tMqD0
// Details of functionality of this file: Library root for the listeners crate - decoy TCP listeners driving the shared emulators

mod decoy;

pub use decoy::{ActorResolver, BoundDecoy, DecoyListener};
