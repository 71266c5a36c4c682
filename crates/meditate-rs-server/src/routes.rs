use crate::error::ApiError;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{info, warn};
use meditate_rs_core::{INPUT_FORMAT_MESSAGE, MeditationError};
use meditate_rs_protocol::{
    GenerateMeditationRequest, MeditationId, MeditationView, SaveMeditationRequest,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Instant;
use tower_http::services::ServeDir;

const DEFAULT_LIST_LIMIT: usize = 20;
const MAX_LIST_LIMIT: usize = 100;

/// Build the application router over `state`.
pub fn build_router(state: AppState) -> Router {
    let audio = ServeDir::new(state.audio_dir());
    Router::new()
        .route("/health", get(health))
        .route("/api/generate-meditation", post(generate_meditation))
        .route("/api/meditations", get(list_meditations))
        .route("/api/meditation/{id}", get(get_meditation))
        .route("/api/meditation/{id}/save", post(save_meditation))
        .route("/api/reset-db", post(reset_db))
        .nest_service(state.audio_route(), audio)
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();
    let response = next.run(request).await;
    info!(
        "request handled (method={}, path={}, status={}, elapsed_ms={})",
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn generate_meditation(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<MeditationView>), ApiError> {
    let request = parse_generate_request(&body)?;
    let record = state.orchestrator().generate(&request).await?;
    Ok((StatusCode::CREATED, Json(record.to_view())))
}

/// An empty or `null` body carries no parameters; anything else must be an object.
fn parse_generate_request(body: &[u8]) -> Result<GenerateMeditationRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::NoData);
    }
    let value: Value = serde_json::from_slice(body).map_err(|err| {
        warn!("unreadable generation request: {err}");
        input_format()
    })?;
    match value {
        Value::Null => Err(ApiError::NoData),
        Value::Object(_) => serde_json::from_value(value).map_err(|err| {
            warn!("malformed generation request: {err}");
            input_format()
        }),
        _ => Err(input_format()),
    }
}

fn input_format() -> ApiError {
    ApiError::Meditation(MeditationError::InputFormat(
        INPUT_FORMAT_MESSAGE.to_string(),
    ))
}

async fn get_meditation(
    State(state): State<AppState>,
    Path(id): Path<MeditationId>,
) -> Result<Json<MeditationView>, ApiError> {
    let record = state.store().get(id)?.ok_or(ApiError::NotFound)?;
    Ok(Json(record.to_view()))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    limit: Option<usize>,
}

async fn list_meditations(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<MeditationView>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIST_LIMIT);
    let records = state.store().list_recent(limit)?;
    Ok(Json(records.iter().map(|record| record.to_view()).collect()))
}

async fn save_meditation(
    State(state): State<AppState>,
    Path(id): Path<MeditationId>,
    body: Bytes,
) -> Result<Json<MeditationView>, ApiError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        SaveMeditationRequest::default()
    } else {
        serde_json::from_slice::<SaveMeditationRequest>(&body).map_err(|err| {
            warn!("malformed save request (id={id}, err={err})");
            input_format()
        })?
    };
    let record = state
        .store()
        .set_saved(id, request.saved)?
        .ok_or(ApiError::NotFound)?;
    info!("meditation save flag updated (id={}, saved={})", id, record.is_saved);
    Ok(Json(record.to_view()))
}

async fn reset_db(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.store().reset().map_err(|err| {
        warn!("database reset failed: {err}");
        ApiError::Reset(err)
    })?;
    info!("database reset");
    Ok(Json(json!({ "message": "Database reset successfully" })))
}

#[cfg(test)]
mod tests {
    use super::parse_generate_request;
    use crate::error::ApiError;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn empty_and_null_bodies_carry_no_data() {
        assert!(matches!(parse_generate_request(b""), Err(ApiError::NoData)));
        assert!(matches!(parse_generate_request(b" null "), Err(ApiError::NoData)));
    }

    #[test]
    fn non_object_bodies_are_input_format_errors() {
        for body in [&b"[1, 2]"[..], b"\"calm\"", b"{not json"] {
            let err = parse_generate_request(body).expect_err("malformed");
            assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
            assert_eq!(
                err.body().error,
                "Invalid input format. Please refresh and try again."
            );
        }
    }

    #[test]
    fn object_body_keeps_raw_selections() {
        let request = parse_generate_request(br#"{"emotions":["Calm"],"goals":null}"#)
            .expect("request");
        assert_eq!(request.emotions, json!(["Calm"]));
        assert_eq!(request.goals, json!(null));
        assert_eq!(request.title, None);
    }
}
