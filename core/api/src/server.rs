// Path and File Name : /home/netsnare/rebuild/core/api/src/server.rs
// Author: Qv9Xw2LpTzK4dRmY7cHgUeB1nJf8oAiS5kWxZ3tMqD0
// Details of functionality of this file: Controller assembly - shared state, router construction, decoy/watchdog/scheduler startup and HTTP serving

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::info;

use netsnare_dispatch::{DispatchQueue, ReconScheduler};
use netsnare_emulation::Protocol;
use netsnare_fleet::FleetRegistry;
use netsnare_listeners::{ActorResolver, DecoyListener};
use netsnare_recorder::SessionHistory;
use netsnare_trap::TrapEngine;
use netsnare_watchdog::{AlertLog, Watchdog};

use crate::config::CoreConfig;
use crate::routes;

/// Shared controller state handed to every handler.
#[derive(Clone)]
pub struct CoreState {
    pub fleet: Arc<FleetRegistry>,
    pub queue: Arc<DispatchQueue>,
    pub history: Arc<SessionHistory>,
    pub trap: Arc<TrapEngine>,
    pub watchdog: Arc<Watchdog>,
    pub log: Arc<AlertLog>,
}

impl CoreState {
    pub fn new(config: &CoreConfig) -> Self {
        let fleet = Arc::new(FleetRegistry::new(config.agent_version.clone()));
        let queue = Arc::new(DispatchQueue::new());
        let history = Arc::new(SessionHistory::new(config.session_capacity));
        let trap = Arc::new(TrapEngine::new(history.clone()));
        let log = Arc::new(AlertLog::new());
        let watchdog = Arc::new(Watchdog::new(
            fleet.clone(),
            log.clone(),
            config.offline_after,
            config.alert_throttle,
        ));
        Self {
            fleet,
            queue,
            history,
            trap,
            watchdog,
            log,
        }
    }
}

pub fn build_router(state: CoreState) -> Router {
    Router::new()
        .route("/trap/init", post(routes::trap_init))
        .route("/trap/interact", post(routes::trap_interact))
        .route("/agent/heartbeat", post(routes::agent_heartbeat))
        .route("/agent/commands/:actor_id", get(routes::agent_poll_commands))
        .route("/agent/result", post(routes::agent_report_result))
        .route("/agent/scan", post(routes::agent_report_scan))
        .route("/agent/alert", post(routes::agent_report_alert))
        .route("/operator/commands", post(routes::operator_enqueue_command))
        .route(
            "/operator/commands/:actor_id",
            get(routes::operator_list_commands),
        )
        .route(
            "/operator/enrollments",
            get(routes::operator_list_enrollments),
        )
        .route(
            "/operator/enrollments/:pending_id/approve",
            post(routes::operator_approve_enrollment),
        )
        .route(
            "/operator/enrollments/:pending_id/reject",
            post(routes::operator_reject_enrollment),
        )
        .route("/operator/actors", get(routes::operator_list_actors))
        .route(
            "/operator/actors/:actor_id/acknowledge",
            post(routes::operator_acknowledge_actor),
        )
        .route(
            "/operator/actors/:actor_id",
            delete(routes::operator_delete_actor),
        )
        .route("/sessions", get(routes::sessions_list))
        .route("/sessions/:session_id", delete(routes::sessions_delete))
        // The operator dashboard is an external collaborator on another origin.
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start every concurrent unit: three decoy listeners (bind failure is
/// logged, never fatal), the watchdog, the recon scheduler and the HTTP
/// boundary.
pub async fn run(config: CoreConfig) -> anyhow::Result<()> {
    let state = CoreState::new(&config);

    let resolver: Arc<dyn ActorResolver> = state.fleet.clone();
    let decoys = [
        (Protocol::Ftp, config.ftp_port),
        (Protocol::Telnet, config.telnet_port),
        (Protocol::Redis, config.redis_port),
    ];
    for (protocol, port) in decoys {
        let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;
        DecoyListener::new(
            protocol,
            addr,
            state.history.clone(),
            resolver.clone(),
            config.idle_timeout,
        )
        .spawn();
    }

    tokio::spawn(state.watchdog.clone().run(config.watchdog_tick));
    // Abandoned trap sessions have no socket close to clean them up; sweep
    // them on the watchdog cadence with the same idle budget as the decoys.
    {
        let trap = state.trap.clone();
        let idle = config.idle_timeout;
        let mut ticker = tokio::time::interval(config.watchdog_tick);
        tokio::spawn(async move {
            loop {
                ticker.tick().await;
                trap.expire_idle(idle);
            }
        });
    }
    tokio::spawn(
        ReconScheduler::new(state.fleet.clone(), state.queue.clone(), config.recon_tick).run(),
    );

    let listener = tokio::net::TcpListener::bind(&config.api_addr).await?;
    info!("NetSnare controller listening on {}", config.api_addr);
    axum::serve(
        listener,
        build_router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
