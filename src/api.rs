//! Messaging endpoint and HTTP server
//!
//! Real-time clients connect to `/ws` and exchange JSON events:
//! `{"event": "message", "data": "<query>"}` in, `{"event": "response", "data": "<answer>"}` out.
//! A bare text frame is treated as a message. Each connection handles its
//! messages one at a time: answer, reply, then speak.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::AssistantError;
use crate::models::AgentResponse;
use crate::pipeline::Pipeline;
use crate::speech::SpeechSynthesizer;
use crate::Result;

/// =============================
/// Wire Events
/// =============================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    Message(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    Response(String),
}

/// Decode an inbound text frame
pub fn parse_client_frame(text: &str) -> Result<ClientEvent> {
    if text.trim_start().starts_with('{') {
        serde_json::from_str(text)
            .map_err(|e| AssistantError::ProtocolError(format!("Invalid event: {}", e)))
    } else {
        Ok(ClientEvent::Message(text.to_string()))
    }
}

/// Destination for outbound events
#[async_trait::async_trait]
pub trait EventSink: Send {
    async fn emit(&mut self, event: ServerEvent) -> Result<()>;
}

#[async_trait::async_trait]
impl EventSink for WebSocket {
    async fn emit(&mut self, event: ServerEvent) -> Result<()> {
        let payload = serde_json::to_string(&event)?;
        self.send(Message::Text(payload))
            .await
            .map_err(|e| AssistantError::ProtocolError(format!("Failed to send event: {}", e)))
    }
}

#[async_trait::async_trait]
impl EventSink for Vec<ServerEvent> {
    async fn emit(&mut self, event: ServerEvent) -> Result<()> {
        self.push(event);
        Ok(())
    }
}

/// =============================
/// Messaging Endpoint
/// =============================

#[derive(Clone)]
pub struct MessagingEndpoint {
    pipeline: Arc<Pipeline>,
    speaker: Arc<dyn SpeechSynthesizer>,
    // One output device: utterances from every connection and route play in turn
    speech_lock: Arc<Mutex<()>>,
}

impl MessagingEndpoint {
    pub fn new(pipeline: Arc<Pipeline>, speaker: Arc<dyn SpeechSynthesizer>) -> Self {
        Self {
            pipeline,
            speaker,
            speech_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Speak `text`, waiting for any utterance already playing to finish
    pub async fn speak(&self, text: &str) -> Result<()> {
        let _playing = self.speech_lock.lock().await;
        self.speaker.speak(text).await
    }

    /// Answer `query`, emit the reply, then speak it.
    ///
    /// A pipeline failure emits nothing. A speech failure is returned after
    /// the reply has already been delivered.
    pub async fn handle_message<S>(&self, query: &str, sink: &mut S) -> Result<AgentResponse>
    where
        S: EventSink + ?Sized,
    {
        info!(%query, "Received query");

        let response = self.pipeline.run(query).await?;

        sink.emit(ServerEvent::Response(response.text.clone())).await?;
        info!("Response emitted");

        self.speak(&response.text).await?;
        Ok(response)
    }
}

/// =============================
/// Request / Response Models
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct AskRequest {
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Clone)]
pub struct ApiState {
    pub endpoint: MessagingEndpoint,
}

fn status_for(error: &AssistantError) -> StatusCode {
    match error {
        AssistantError::SymbolNotFound(_) | AssistantError::PriceUnavailable(_) => {
            StatusCode::NOT_FOUND
        }
        AssistantError::MalformedClassification(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AssistantError::LlmError(_)
        | AssistantError::MarketDataError(_)
        | AssistantError::HttpError(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// =============================
/// Handlers
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn ask(
    State(state): State<ApiState>,
    Json(req): Json<AskRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    info!("Received ask request: {}", req.query);

    match state.endpoint.pipeline.run(&req.query).await {
        Ok(response) => {
            let endpoint = state.endpoint.clone();
            let text = response.text.clone();
            tokio::spawn(async move {
                if let Err(e) = endpoint.speak(&text).await {
                    warn!("Speech failed after reply: {}", e);
                }
            });

            (
                StatusCode::OK,
                Json(ApiResponse::success(serde_json::json!({
                    "answer": response.text,
                    "quote": response.quote,
                }))),
            )
        }
        Err(e) => {
            error!("Ask request failed: {}", e);
            (
                status_for(&e),
                Json(ApiResponse::error(format!("Query failed: {}", e))),
            )
        }
    }
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<ApiState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.endpoint))
}

async fn handle_socket(mut socket: WebSocket, endpoint: MessagingEndpoint) {
    let connection_id = Uuid::new_v4();

    async move {
        info!("Client connected");

        while let Some(frame) = socket.recv().await {
            let frame = match frame {
                Ok(frame) => frame,
                Err(e) => {
                    warn!("WebSocket receive failed: {}", e);
                    break;
                }
            };

            let query = match frame {
                Message::Text(text) => match parse_client_frame(&text) {
                    Ok(ClientEvent::Message(query)) => query,
                    Err(e) => {
                        warn!("Ignoring frame: {}", e);
                        continue;
                    }
                },
                Message::Close(_) => break,
                _ => continue,
            };

            if let Err(e) = endpoint.handle_message(&query, &mut socket).await {
                error!("Request failed: {}", e);
            }
        }

        info!("Client disconnected");
    }
    .instrument(info_span!("ws", %connection_id))
    .await
}

/// =============================
/// Router
/// =============================

pub fn create_router(endpoint: MessagingEndpoint) -> Router {
    let state = ApiState { endpoint };

    Router::new()
        .route("/health", get(health))
        .route("/ws", get(ws_handler))
        .route("/api/ask", post(ask))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    endpoint: MessagingEndpoint,
    addr: &str,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(endpoint);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("API Server listening on http://{}", addr);
    info!("WebSocket endpoint: ws://{}/ws", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
