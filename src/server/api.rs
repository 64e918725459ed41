use axum::extract::{ Path, State };
use axum::http::{ HeaderMap, StatusCode };
use axum::response::{ IntoResponse, Response };
use axum::routing::{ get, post };
use axum::{ Json, Router };
use log::{ error, info };
use serde::{ Deserialize, Serialize };
use serde_json::json;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{ Any, CorsLayer };

use crate::agent::HealthAgent;
use crate::audio;
use crate::config::language;
use crate::llm::chat::ImagePart;
use crate::models::alert::HealthAlert;
use crate::models::chat::{ Conversation, Message };

const DEFAULT_SESSION: &str = "default";

#[derive(Clone)]
struct AppState {
    agent: Arc<HealthAgent>,
    alerts: Arc<Vec<HealthAlert>>,
    api_key: Option<String>,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into() }
    }

    fn unauthorized() -> Self {
        Self { status: StatusCode::UNAUTHORIZED, message: "Invalid or missing API key".into() }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, message: message.into() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(
            json!({
            "error": {
                "message": self.message,
                "code": self.status.as_str()
            }
        })
        );
        (self.status, body).into_response()
    }
}

#[derive(Deserialize)]
struct ChatApiRequest {
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    message: String,
    #[serde(default)]
    image: Option<ImageUpload>,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Deserialize)]
struct ImageUpload {
    data: String,
    mime_type: String,
}

#[derive(Serialize)]
struct ChatApiResponse {
    message: Message,
}

#[derive(Deserialize)]
struct SpeakRequest {
    text: String,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Serialize)]
struct SpeakResponse {
    /// base64 little-endian PCM16.
    audio: String,
    sample_rate: u32,
    channels: u16,
}

pub async fn start_http_server(
    addr: &str,
    agent: Arc<HealthAgent>,
    alerts: Arc<Vec<HealthAlert>>,
    api_key: Option<String>
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = addr.parse::<SocketAddr>()?;
    info!("Starting HTTP API server on: http://{}", addr);

    let state = AppState { agent, alerts, api_key };

    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    let app = Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/api/speak", post(speak_handler))
        .route("/api/alerts", get(alerts_handler))
        .route("/api/languages", get(languages_handler))
        .route("/api/history/{session_id}", get(history_handler))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e);
        e
    })?;
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

fn authorize(expected: Option<&str>, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(expected) = expected else {
        return Ok(());
    };
    let presented = headers.get("x-api-key").and_then(|value| value.to_str().ok());
    if presented == Some(expected) {
        Ok(())
    } else {
        Err(ApiError::unauthorized())
    }
}

fn validate_language(language: &Option<String>) -> Result<Option<&str>, ApiError> {
    match language.as_deref() {
        None => Ok(None),
        Some(code) if language::is_supported(code) => Ok(Some(code)),
        Some(code) => Err(ApiError::bad_request(format!("Unsupported language code: {}", code))),
    }
}

async fn chat_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ChatApiRequest>
) -> Result<Json<ChatApiResponse>, ApiError> {
    authorize(state.api_key.as_deref(), &headers)?;

    if request.message.trim().is_empty() && request.image.is_none() {
        return Err(ApiError::bad_request("Message text and image are both empty"));
    }
    let language = validate_language(&request.language)?;

    let session_id = request.session_id.as_deref().unwrap_or(DEFAULT_SESSION);
    let image = request.image.map(|upload| ImagePart {
        data: upload.data,
        mime_type: upload.mime_type,
    });

    let message = state.agent
        .chat(session_id, &request.message, image, language).await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(Json(ChatApiResponse { message }))
}

async fn speak_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SpeakRequest>
) -> Result<Json<SpeakResponse>, ApiError> {
    authorize(state.api_key.as_deref(), &headers)?;

    if request.text.trim().is_empty() {
        return Err(ApiError::bad_request("Nothing to speak"));
    }
    let language = validate_language(&request.language)?;

    let payload = state.agent
        .synthesize(&request.text, language).await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(
        Json(SpeakResponse {
            audio: payload,
            sample_rate: audio::SAMPLE_RATE,
            channels: audio::CHANNELS,
        })
    )
}

async fn alerts_handler(
    State(state): State<AppState>,
    headers: HeaderMap
) -> Result<Json<Vec<HealthAlert>>, ApiError> {
    authorize(state.api_key.as_deref(), &headers)?;
    Ok(Json(state.alerts.as_ref().clone()))
}

async fn languages_handler(
    State(state): State<AppState>,
    headers: HeaderMap
) -> Result<Json<Vec<language::Language>>, ApiError> {
    authorize(state.api_key.as_deref(), &headers)?;
    Ok(Json(language::SUPPORTED_LANGUAGES.clone()))
}

async fn history_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(session_id): Path<String>
) -> Result<Json<Conversation>, ApiError> {
    authorize(state.api_key.as_deref(), &headers)?;
    let conversation = state.agent
        .conversation(&session_id).await
        .map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(Json(conversation))
}
