//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json,
    },
};
use futures::stream::{self, Stream, StreamExt};
use tracing::{error, info, warn};

use crate::{
    error::DispatchError,
    state::{AppState, BreakTask, Intent, Phase, Stats},
};
use super::responses::{
    ApiResponse, DurationUpdate, ErrorResponse, HealthResponse, NewBreakTask, StatusResponse,
};

type IntentResult = Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)>;

/// Dispatch an intent and turn the verdict into a response
async fn run_intent(state: &AppState, intent: Intent, done: &str) -> IntentResult {
    match state.dispatch(intent).await {
        Ok(timer) => {
            info!("{}", done);
            Ok(Json(ApiResponse::ok(done.to_string(), timer)))
        }
        Err(DispatchError::Rejected(rejected)) => {
            warn!("Intent rejected: {}", rejected);
            Err((
                StatusCode::CONFLICT,
                Json(ApiResponse::rejected(rejected.to_string(), state.snapshot())),
            ))
        }
        Err(e @ DispatchError::EngineUnavailable) => {
            error!("Failed to dispatch intent: {}", e);
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse::rejected(e.to_string(), state.snapshot())),
            ))
        }
    }
}

/// Handle POST /timer/start-work
pub async fn start_work_handler(State(state): State<Arc<AppState>>) -> IntentResult {
    run_intent(&state, Intent::StartWork, "Work countdown started").await
}

/// Handle POST /timer/start-break
pub async fn start_break_handler(State(state): State<Arc<AppState>>) -> IntentResult {
    run_intent(&state, Intent::StartBreak, "Break countdown started").await
}

/// Handle POST /timer/pause
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> IntentResult {
    run_intent(&state, Intent::Pause, "Countdown paused").await
}

/// Handle POST /timer/reset
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> IntentResult {
    run_intent(&state, Intent::Reset, "Timer reset").await
}

/// Handle PUT /config - Edit work and/or break duration
pub async fn config_handler(
    State(state): State<Arc<AppState>>,
    Json(update): Json<DurationUpdate>,
) -> IntentResult {
    let edits = [
        (Phase::Work, update.work_minutes),
        (Phase::Break, update.break_minutes),
    ];

    let mut problems = Vec::new();
    let mut latest = None;
    for (phase, input) in edits {
        let Some(input) = input else { continue };
        match state.dispatch(Intent::SetDuration { phase, input }).await {
            Ok(timer) => latest = Some(timer),
            Err(DispatchError::Rejected(rejected)) => problems.push(rejected.to_string()),
            Err(e @ DispatchError::EngineUnavailable) => {
                error!("Failed to update durations: {}", e);
                return Err((
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(ApiResponse::rejected(e.to_string(), state.snapshot())),
                ));
            }
        }
    }

    // A rejected edit is still stored (it disables start). Its verdict carries no
    // snapshot, but the engine publishes before answering, so the watch is current.
    let timer = match latest {
        Some(timer) if problems.is_empty() => timer,
        _ => state.snapshot(),
    };
    if problems.is_empty() {
        Ok(Json(ApiResponse::ok("Durations updated".to_string(), timer)))
    } else {
        warn!("Invalid duration input: {}", problems.join("; "));
        Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::rejected(problems.join("; "), timer)),
        ))
    }
}

/// Handle GET /status - Return current timer status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        timer: state.snapshot(),
        break_suggestion: state.break_suggestion(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /events - Stream every published snapshot as server-sent events
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut updates = state.subscribe();
    let current = updates.borrow_and_update().clone();

    let following = stream::unfold(updates, |mut updates| async move {
        updates.changed().await.ok()?;
        let snapshot = updates.borrow_and_update().clone();
        Some((snapshot, updates))
    });

    let events = stream::once(async move { current })
        .chain(following)
        .filter_map(|snapshot| async move {
            match Event::default().event("timer").json_data(&snapshot) {
                Ok(event) => Some(Ok(event)),
                Err(e) => {
                    warn!("Failed to encode snapshot event: {}", e);
                    None
                }
            }
        });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Handle GET /stats
pub async fn stats_handler(State(state): State<Arc<AppState>>) -> Json<Stats> {
    Json(state.snapshot().engine.stats)
}

/// Handle GET /stats/export - Plain-text statistics download
pub async fn stats_export_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let stats = state.snapshot().engine.stats;
    info!("Exporting stats for {}", stats.date);

    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", stats.report_file_name()),
            ),
        ],
        stats.report(),
    )
}

/// Handle GET /break-tasks
pub async fn list_break_tasks_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BreakTask>>, StatusCode> {
    state.break_tasks.list().map(Json).map_err(|e| {
        error!("Failed to list break tasks: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Handle POST /break-tasks
pub async fn add_break_task_handler(
    State(state): State<Arc<AppState>>,
    Json(new_task): Json<NewBreakTask>,
) -> Result<(StatusCode, Json<BreakTask>), (StatusCode, Json<ErrorResponse>)> {
    state
        .break_tasks
        .add(&new_task.text)
        .map(|task| (StatusCode::CREATED, Json(task)))
        .map_err(|e| (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e))))
}

/// Handle DELETE /break-tasks/:id
pub async fn delete_break_task_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> StatusCode {
    match state.break_tasks.remove(id) {
        Ok(true) => StatusCode::NO_CONTENT,
        Ok(false) => StatusCode::NOT_FOUND,
        Err(e) => {
            error!("Failed to remove break task {}: {}", id, e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
