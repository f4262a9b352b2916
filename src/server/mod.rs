//! HTTP surface: the four workflow pages plus a health probe.
//!
//! - `GET  /`: known/ignored counts and the text form
//! - `POST /`: candidates for the submitted `text`
//! - `POST /save-words`: persist the mark-up, list the unknown words
//! - `POST /upload-spaced-repetition`: enrich and upload `unknown_words`
//! - `GET  /health`: liveness
//!
//! Store and upstream clients block, so every handler runs its work on the
//! blocking pool under a [`RequestContext`] bounded by the request timeout.
//! Any failure answers 500 with a fixed body; the cause only goes to the log.

pub mod html;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::FormRejection;
use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::trace::TraceLayer;

use crate::context::RequestContext;
use crate::error::{LexiError, LexiResult};
use crate::filter::prepare_candidates;
use crate::markup::Markup;
use crate::pipeline::{EnrichmentPipeline, Stage, StageTracker};
use crate::store::WordStore;
use crate::tokenize::extract_words;

/// Body of every failed response.
pub const GENERIC_FAILURE_BODY: &str = "something went wrong";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn WordStore>,
    pub pipeline: Arc<EnrichmentPipeline>,
    /// Budget for one request, upstream calls included.
    pub request_timeout: Duration,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(html::INDEX_PATH, get(index).post(submit_text))
        .route(html::SAVE_WORDS_PATH, post(save_words))
        .route(html::UPLOAD_PATH, post(upload))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ── Errors ────────────────────────────────────────────────────────────────

/// Why a handler failed. Always rendered as [`GENERIC_FAILURE_BODY`].
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Lexi(#[from] LexiError),

    #[error("blocking worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        AppError::Lexi(LexiError::BadRequest {
            message: rejection.body_text(),
        })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Lexi(e) => {
                let code = miette::Diagnostic::code(e).map(|c| c.to_string());
                tracing::error!(code = code.as_deref().unwrap_or("-"), "request failed: {e}");
            }
            AppError::Worker(e) => tracing::error!("request failed: {e}"),
        }
        (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE_BODY).into_response()
    }
}

/// Run blocking `work` under a fresh request context.
///
/// If the deadline fires, or the request future is dropped, the context is
/// cancelled and the worker stops at its next suspension point.
async fn run_blocking<T, F>(timeout: Duration, work: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&RequestContext) -> LexiResult<T> + Send + 'static,
{
    let ctx = RequestContext::with_timeout(timeout);
    let guard = ctx.cancel_on_drop();
    let worker_ctx = ctx.clone();
    let task = tokio::task::spawn_blocking(move || work(&worker_ctx));

    match tokio::time::timeout(timeout, task).await {
        Ok(joined) => {
            guard.disarm();
            Ok(joined??)
        }
        Err(_) => {
            drop(guard);
            Err(LexiError::DeadlineExceeded {
                stage: "request".into(),
            }
            .into())
        }
    }
}

// ── Forms ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TextForm {
    text: String,
}

#[derive(Debug, Deserialize)]
struct UnknownWordsForm {
    unknown_words: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let store = Arc::clone(&state.store);
    let (known, ignored) = run_blocking(state.request_timeout, move |ctx| {
        ctx.check("counting words")?;
        Ok((store.count_known()?, store.count_ignored()?))
    })
    .await?;
    Ok(Html(html::index_page(known, ignored)))
}

async fn submit_text(
    State(state): State<AppState>,
    form: Result<Form<TextForm>, FormRejection>,
) -> Result<Html<String>, AppError> {
    let mut stages = StageTracker::start(Stage::Parsing, 0);
    let Form(form) = stages.track(form.map_err(AppError::from))?;

    stages.advance(Stage::Filtering);
    let store = Arc::clone(&state.store);
    let words = stages.track(
        run_blocking(state.request_timeout, move |ctx| {
            prepare_candidates(store.as_ref(), ctx, &form.text)
        })
        .await,
    )?;

    stages.set_words(words.len());
    stages.advance(Stage::Presenting);
    Ok(Html(html::candidates_page(&words)))
}

async fn save_words(
    State(state): State<AppState>,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Result<Html<String>, AppError> {
    let mut stages = StageTracker::start(Stage::Parsing, 0);
    let Form(pairs) = stages.track(form.map_err(AppError::from))?;

    stages.set_words(pairs.len());
    stages.advance(Stage::Marking);
    let markup = Markup::from_pairs(pairs);
    let store = Arc::clone(&state.store);
    let unknown = stages.track(
        run_blocking(state.request_timeout, move |ctx| {
            markup.save(store.as_ref(), ctx)
        })
        .await,
    )?;

    Ok(Html(html::unknown_page(&unknown)))
}

async fn upload(
    State(state): State<AppState>,
    form: Result<Form<UnknownWordsForm>, FormRejection>,
) -> Result<Html<String>, AppError> {
    let Form(form) = form?;
    let words = extract_words(&form.unknown_words);
    tracing::info!(words = words.len(), "enrichment requested");

    let pipeline = Arc::clone(&state.pipeline);
    let uploaded = run_blocking(state.request_timeout, move |ctx| pipeline.run(ctx, &words)).await?;
    Ok(Html(html::result_page(uploaded.len())))
}
