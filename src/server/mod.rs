use anyhow::{Context, Result};
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::mpsc::UnboundedSender;
use tower_http::cors::CorsLayer;

use crate::events::{self, DirectorEvent};
use crate::jobs::{self, JobForm};

pub mod outbox;

pub use outbox::*;

/// Shared state for the director-facing HTTP endpoints
#[derive(Clone)]
pub struct ReceiverState {
    pub events: UnboundedSender<DirectorEvent>,
    pub outbox: RequestOutbox,
}

pub fn router(state: ReceiverState) -> Router {
    Router::new()
        .route("/v1/events", post(handle_events))
        .route("/v1/agents", post(handle_agents))
        .route("/v1/jobs", post(handle_jobs))
        .route("/v1/requests", get(handle_requests))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind the receiver socket without serving yet, so bind errors surface
/// before the terminal UI takes over the screen.
pub async fn bind_receiver(listen_addr: &str) -> Result<TcpListener> {
    let listener = TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", listen_addr))?;
    tracing::info!("Director receiver listening on http://{}", listen_addr);
    Ok(listener)
}

pub async fn serve_receiver(listener: TcpListener, state: ReceiverState) -> Result<()> {
    axum::serve(listener, router(state)).await?;
    Ok(())
}

pub async fn start_receiver(listen_addr: &str, state: ReceiverState) -> Result<()> {
    let listener = bind_receiver(listen_addr).await?;
    serve_receiver(listener, state).await
}

async fn handle_events(State(state): State<ReceiverState>, body: Bytes) -> StatusCode {
    tracing::debug!("Received events: {} bytes", body.len());

    match events::parse_events(&body) {
        Ok(parsed) => {
            for event in parsed {
                tracing::debug!("  event={}", event.name());
                if state.events.send(event).is_err() {
                    tracing::error!("Event consumer has shut down");
                    return StatusCode::SERVICE_UNAVAILABLE;
                }
            }
            StatusCode::OK
        }
        Err(e) => {
            tracing::error!("Failed to parse events: {:#}", e);
            StatusCode::BAD_REQUEST
        }
    }
}

#[derive(Debug, Deserialize)]
struct AddAgentForm {
    #[serde(default)]
    ip: String,
}

async fn handle_agents(State(state): State<ReceiverState>, body: Bytes) -> Response {
    let request = serde_json::from_slice::<AddAgentForm>(&body)
        .ok()
        .and_then(|form| OutboundRequest::add_agent(&form.ip));

    match request {
        Some(request) => {
            tracing::info!("Queued add-agent request: {:?}", request);
            state.outbox.push(request);
            StatusCode::OK.into_response()
        }
        None => {
            tracing::error!("Rejected add-agent form without an ip");
            (StatusCode::BAD_REQUEST, "ip is required").into_response()
        }
    }
}

async fn handle_jobs(State(state): State<ReceiverState>, body: Bytes) -> Response {
    let job = serde_json::from_slice::<JobForm>(&body)
        .context("Job form is not valid JSON")
        .and_then(|form| jobs::create_job(&form, Utc::now()));

    match job {
        Ok(job) => {
            tracing::info!("Queued job {} for submission", job.job_id);
            state.outbox.push(OutboundRequest::SubmitJob { job: job.clone() });
            (StatusCode::OK, Json(job)).into_response()
        }
        Err(e) => {
            tracing::error!("Rejected job form: {:#}", e);
            (StatusCode::BAD_REQUEST, format!("{:#}", e)).into_response()
        }
    }
}

async fn handle_requests(State(state): State<ReceiverState>) -> Json<Vec<OutboundRequest>> {
    Json(state.outbox.drain())
}
