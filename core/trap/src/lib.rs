// Path and File Name : /home/netsnare/rebuild/core/trap/src/lib.rs
// Author: Qv9Xw2LpTzK4dRmY7cHgUeB1nJf8oAiS5kWxZ3tMqD0
// Details of functionality of this file: Library root for the trap crate - edge-relayed trap sessions evaluated centrally

mod engine;

pub use engine::{TrapEngine, TrapReply};
