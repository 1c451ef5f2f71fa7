// Path and File Name : /home/netsnare/rebuild/core/api/src/lib.rs
// Author: Qv9Xw2LpTzK4dRmY7cHgUeB1nJf8oAiS5kWxZ3tMqD0
// Details of functionality of this file: Library root for the api crate - configuration, shared state and the HTTP boundary router

pub mod config;
pub mod routes;
pub mod server;
mod tests;

pub use config::CoreConfig;
pub use server::{build_router, CoreState};
