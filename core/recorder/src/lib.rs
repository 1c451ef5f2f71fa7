// Path and File Name : /home/netsnare/rebuild/core/recorder/src/lib.rs
// Author: Qv9Xw2LpTzK4dRmY7cHgUeB1nJf8oAiS5kWxZ3tMqD0
// Details of functionality of this file: Library root for the session recorder - captured interaction types and the bounded history ring

mod history;
mod session;

pub use history::SessionHistory;
pub use session::{Direction, Frame, SessionHandle, SessionRecord};

/// Default retention of the history ring (most recent sessions, insertion order).
pub const DEFAULT_SESSION_CAPACITY: usize = 50;
