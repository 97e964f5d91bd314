use std::sync::Arc;

use anyhow::Result;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info};

use crate::analysis::{dispatch, OperationKind, TextAnalysisProvider};
use crate::environment;
use crate::input::{normalize, validate, RequestBody};
use crate::TARGET_WEB_REQUEST;

pub const BASE_PATH: &str = "/apis/v1/entity";

const INVALID_FORMAT_MESSAGE: &str =
    "Invalid data format. The input must be a non-empty array of strings.";
const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again later.";

/// The two failure classes the HTTP surface distinguishes. Provider detail
/// never crosses this boundary; it is logged at the dispatch seam instead.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{}", INVALID_FORMAT_MESSAGE)]
    Shape,
    #[error("{}", GENERIC_FAILURE_MESSAGE)]
    Provider,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Shape => StatusCode::BAD_REQUEST,
            ApiError::Provider => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn TextAnalysisProvider>,
}

/// Form-encoded bodies carry the sentence shape only.
#[derive(Deserialize)]
struct SentenceForm {
    sentence: String,
}

/// Builds the router: four analysis operations under the base path, each
/// reachable via POST and a GET alias, plus a root service descriptor.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route(
            &format!("{BASE_PATH}/RecognizeEntities"),
            post(recognize_entities).get(recognize_entities),
        )
        .route(
            &format!("{BASE_PATH}/RecognizePiiEntities"),
            post(recognize_pii_entities).get(recognize_pii_entities),
        )
        .route(
            &format!("{BASE_PATH}/ExtractKeyPhrase"),
            post(extract_key_phrase).get(extract_key_phrase),
        )
        .route(
            &format!("{BASE_PATH}/RecognizeEntityLinking"),
            post(recognize_entity_linking).get(recognize_entity_linking),
        )
        .layer(cors)
        .with_state(state)
}

/// Main application loop, setting up and running the Axum-based API server.
pub async fn api_loop(state: AppState) -> Result<()> {
    let app = router(state);

    let addr = format!("0.0.0.0:{}", environment::listen_port());
    let listener = TcpListener::bind(&addr).await?;

    info!("Entity gateway listening on http://{}", addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

async fn index() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "operations": [
            format!("{BASE_PATH}/RecognizeEntities"),
            format!("{BASE_PATH}/RecognizePiiEntities"),
            format!("{BASE_PATH}/ExtractKeyPhrase"),
            format!("{BASE_PATH}/RecognizeEntityLinking"),
        ],
    }))
}

async fn recognize_entities(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    analyze_request(state, headers, body, OperationKind::EntityRecognition).await
}

async fn recognize_pii_entities(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    analyze_request(state, headers, body, OperationKind::PiiEntityRecognition).await
}

async fn extract_key_phrase(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    analyze_request(state, headers, body, OperationKind::KeyPhraseExtraction).await
}

async fn recognize_entity_linking(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    analyze_request(state, headers, body, OperationKind::EntityLinking).await
}

/// The shared pipeline behind every operation: parse, normalize, validate,
/// dispatch. Shape failures short-circuit before any provider call.
async fn analyze_request(
    state: AppState,
    headers: HeaderMap,
    body: Bytes,
    kind: OperationKind,
) -> Result<Json<Value>, ApiError> {
    let raw = parse_body(&headers, &body)?;
    let documents = normalize(raw);

    debug!(
        target: TARGET_WEB_REQUEST,
        "Normalized {} payload: {:?}",
        kind.as_str(),
        documents
    );

    if !validate(&documents) {
        return Err(ApiError::Shape);
    }

    // validate() guarantees every element is a string.
    let documents: Vec<String> = documents
        .into_iter()
        .filter_map(|document| match document {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect();

    let result = dispatch(state.provider.as_ref(), kind, &documents)
        .await
        .map_err(|_| ApiError::Provider)?;

    Ok(Json(result))
}

/// Accepts JSON bodies and form-encoded `sentence` bodies. Anything else is
/// attempted as JSON; an unparseable body is a shape error, not a 500.
fn parse_body(headers: &HeaderMap, body: &Bytes) -> Result<RequestBody, ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    if content_type.starts_with("application/x-www-form-urlencoded") {
        let form: SentenceForm =
            serde_urlencoded::from_bytes(body).map_err(|_| ApiError::Shape)?;
        return Ok(RequestBody::Sentence {
            sentence: form.sentence,
        });
    }

    serde_json::from_slice(body).map_err(|_| ApiError::Shape)
}
