// Path and File Name : /home/netsnare/rebuild/core/api/src/main.rs
// Author: Qv9Xw2LpTzK4dRmY7cHgUeB1nJf8oAiS5kWxZ3tMqD0
// Details of functionality of this file: Main entrypoint for the NetSnare controller - config load, service startup, fail-closed on boot errors

use std::process;

use tracing::{error, info};

use netsnare_api::{server, CoreConfig};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("NetSnare controller starting...");

    let config = match CoreConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = server::run(config).await {
        error!("Controller error: {}", e);
        process::exit(1);
    }
}
