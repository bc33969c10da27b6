//! Pomodoro Sync - A drift-free work/break countdown service
//!
//! This is the main entry point for the pomodoro-sync application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use pomodoro_sync::{
    api::create_router,
    config::Config,
    services::AppCollaborators,
    state::{BreakTasks, TimerEngine},
    tasks::EngineTask,
    timing::spawn_timing_process,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("pomodoro_sync={},tower_http=info", config.log_level()))
        .init();

    info!("Starting pomodoro-sync server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, work={}min, break={}min, timing={}",
          config.host, config.port, config.work_minutes, config.break_minutes, config.timing);

    // Bring up the timing process, falling back to in-context if the worker fails
    let timing = spawn_timing_process(config.timing, config.cadence())?;

    let break_tasks = Arc::new(BreakTasks::new());
    let collaborators = Arc::new(AppCollaborators::new(
        config.work_end_sound.clone(),
        config.break_end_sound.clone(),
        Arc::clone(&break_tasks),
    ));

    // Start the engine task and get the state shared with the HTTP layer
    let engine = TimerEngine::new(config.durations());
    let (state, _engine_task) = EngineTask::new(engine, timing, collaborators, config.cadence())
        .spawn(config.port, config.host.clone(), break_tasks);

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timer/start-work   - Start or resume the work countdown");
    info!("  POST /timer/start-break  - Start or resume the break countdown");
    info!("  POST /timer/pause        - Pause the running countdown");
    info!("  POST /timer/reset        - Reset to a fresh work phase");
    info!("  PUT  /config             - Edit work/break minutes");
    info!("  GET  /status             - Current timer snapshot");
    info!("  GET  /events             - Snapshot stream (server-sent events)");
    info!("  GET  /stats/export       - Download today's statistics");
    info!("  GET  /health             - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
