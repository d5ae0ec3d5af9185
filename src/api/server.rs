//! HTTP server implementation for the API

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use super::models::*;
use crate::config::Config;
use crate::error::TutorError;
use crate::pipeline::{StudyRequest, Tutor};
use crate::transcript::TranscriptFetcher;

/// Shared application state. Everything inside is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub tutor: Arc<Tutor>,
    pub fetcher: Arc<TranscriptFetcher>,
    pub config: Arc<Config>,
}

impl IntoResponse for TutorError {
    fn into_response(self) -> Response {
        let status = match &self {
            TutorError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            TutorError::TranscriptNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorBody {
            detail: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Configure and start the HTTP server
pub async fn start_http_server(state: AppState, port: u16) -> Result<()> {
    info!("Starting HTTP server on port {}", port);

    let cors = cors_layer(&state.config.server.allowed_origins);

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/api/health", get(health_handler))
        .route("/generate", post(generate_handler))
        .route("/generate/timed", post(timed_generate_handler))
        .route("/summarize", post(summarize_handler))
        .route("/proofread", post(proofread_handler))
        .route("/translate", post(translate_handler))
        .route("/transcript/:video_id", get(transcript_handler))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("API server listening on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if allowed_origins.iter().any(|o| o == "*") {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

/// Health check exposing the pinned model binding
async fn health_handler(State(state): State<AppState>) -> Json<HealthOut> {
    let binding = state.tutor.binding();
    Json(HealthOut {
        ok: true,
        api_version: binding.api_version.clone(),
        model: binding.model.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

async fn generate_handler(
    State(state): State<AppState>,
    Json(payload): Json<GenerateIn>,
) -> Result<Json<GenerateOut>, TutorError> {
    let request = StudyRequest {
        video_url: payload.video_url,
        title: payload.title,
        transcript: payload.transcript,
        num_questions: payload.num_questions,
        difficulty: payload.difficulty,
    };

    let pack = state.tutor.generate_study_pack(&request).await?;
    Ok(Json(pack.into()))
}

async fn timed_generate_handler(
    State(state): State<AppState>,
    Json(payload): Json<TimedGenerateIn>,
) -> Result<Json<TimedGenerateOut>, TutorError> {
    let lesson = state
        .tutor
        .generate_timed_lesson(
            &payload.video_id,
            &payload.title,
            &payload.transcript,
            payload.num_questions,
            &payload.difficulty,
        )
        .await?;
    Ok(Json(lesson.into()))
}

async fn summarize_handler(
    State(state): State<AppState>,
    Json(payload): Json<SummarizeIn>,
) -> Result<Json<SummarizeOut>, TutorError> {
    let summary = state.tutor.summarize(&payload.text).await?;
    Ok(Json(SummarizeOut { summary }))
}

async fn proofread_handler(
    State(state): State<AppState>,
    Json(payload): Json<ProofreadIn>,
) -> Result<Json<ProofreadOut>, TutorError> {
    let corrected_text = state.tutor.proofread(&payload.text).await?;
    Ok(Json(ProofreadOut { corrected_text }))
}

async fn translate_handler(
    State(state): State<AppState>,
    Json(payload): Json<TranslateIn>,
) -> Result<Json<TranslateOut>, TutorError> {
    let translation = state
        .tutor
        .translate(&payload.text, &payload.target_language)
        .await?;
    Ok(Json(translation.into()))
}

async fn transcript_handler(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> Result<Json<TranscriptOut>, TutorError> {
    let transcript = state.fetcher.fetch(&video_id).await?;
    Ok(Json(TranscriptOut {
        video_id,
        transcript,
    }))
}
