// Path and File Name : /home/netsnare/rebuild/core/watchdog/src/lib.rs
// Author: Qv9Xw2LpTzK4dRmY7cHgUeB1nJf8oAiS5kWxZ3tMqD0
// Details of functionality of this file: Library root for the watchdog crate - alert log rows and the periodic status watchdog

mod alerts;
mod watchdog;

pub use alerts::{AlertLog, LogLevel, LogRow};
pub use watchdog::Watchdog;
