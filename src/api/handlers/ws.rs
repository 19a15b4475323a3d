//! WebSocket chat endpoint
//!
//! Each inbound text frame is one chat request. The socket answers with
//! zero or more install progress frames followed by exactly one `result`
//! or `error` frame.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    app::AppState,
    models::{ChatOutcome, ChatRequest, FailureKind, ModelEvent, ModelId, ProgressCallback},
};

/// Outbound WebSocket frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Frame {
    Installing {
        model: ModelId,
    },
    Installed {
        model: ModelId,
    },
    InstallFailed {
        model: ModelId,
        message: String,
    },
    Result {
        model: ModelId,
        text: String,
        pulled: bool,
    },
    Error {
        kind: FailureKind,
        message: String,
    },
}

impl From<ModelEvent> for Frame {
    fn from(event: ModelEvent) -> Self {
        match event {
            ModelEvent::Installing(model) => Frame::Installing { model },
            ModelEvent::Installed(model) => Frame::Installed { model },
            ModelEvent::InstallFailed { model, message } => Frame::InstallFailed { model, message },
        }
    }
}

impl From<ChatOutcome> for Frame {
    fn from(outcome: ChatOutcome) -> Self {
        match outcome {
            ChatOutcome::Ready {
                model,
                response,
                pulled,
            } => Frame::Result {
                model,
                text: response,
                pulled,
            },
            ChatOutcome::Error { kind, message } => Frame::Error { kind, message },
        }
    }
}

impl Frame {
    /// Text to put on the wire, or `None` if this frame has no rendering.
    ///
    /// Plain mode reproduces the status strings older clients match on. The
    /// `install_failed` progress frame already carries the failure there, so
    /// the trailing install error frame is dropped. Malformed requests get no
    /// reply in plain mode.
    pub fn render(&self, plain_text: bool) -> Option<String> {
        if !plain_text {
            return match serde_json::to_string(self) {
                Ok(json) => Some(json),
                Err(e) => {
                    warn!("Failed to encode frame: {}", e);
                    None
                }
            };
        }

        match self {
            Frame::Installing { model } => Some(format!(
                "Model {} is not installed. Pulling it now, this may take a few minutes...",
                model
            )),
            Frame::Installed { model } => {
                Some(format!("Successfully pulled model {}. Ready to use!", model))
            }
            Frame::InstallFailed { message, .. } => Some(message.clone()),
            Frame::Result { text, .. } => Some(text.clone()),
            Frame::Error {
                kind: FailureKind::InstallFailed | FailureKind::BadRequest,
                ..
            } => None,
            Frame::Error { message, .. } => Some(format!("Error generating response: {}", message)),
        }
    }
}

/// GET /api/chat/ws
pub async fn chat_socket(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    info!("WebSocket client connected");
    let plain_text = state.config.server.plain_text_frames;
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Frame>();

    let writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let Some(text) = frame.render(plain_text) else {
                continue;
            };
            if let Err(e) = sink.send(Message::Text(text)).await {
                debug!("WebSocket write failed: {}", e);
                break;
            }
        }
    });

    while let Some(message) = stream.next().await {
        let payload = match message {
            Ok(Message::Text(text)) => text,
            Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(_) => {
                    let _ = tx.send(Frame::Error {
                        kind: FailureKind::BadRequest,
                        message: "binary frame is not valid UTF-8".to_string(),
                    });
                    continue;
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                debug!("WebSocket read failed: {}", e);
                break;
            }
        };

        let request: ChatRequest = match serde_json::from_str(&payload) {
            Ok(request) => request,
            Err(e) => {
                warn!("Malformed WebSocket frame: {}", e);
                let _ = tx.send(Frame::Error {
                    kind: FailureKind::BadRequest,
                    message: e.to_string(),
                });
                continue;
            }
        };

        let progress_tx = tx.clone();
        let progress: ProgressCallback = Arc::new(move |event: ModelEvent| {
            let _ = progress_tx.send(Frame::from(event));
        });

        let outcome = state.coordinator.chat(request, Some(progress)).await;
        if tx.send(Frame::from(outcome)).is_err() {
            break;
        }
    }

    drop(tx);
    let _ = writer.await;
    info!("WebSocket client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_typed_frames() {
        let frame = Frame::from(ModelEvent::Installing(ModelId::from("phi3:mini")));
        let value: serde_json::Value =
            serde_json::from_str(&frame.render(false).unwrap()).unwrap();
        assert_eq!(value, json!({"type": "installing", "model": "phi3:mini"}));

        let frame = Frame::from(ChatOutcome::Ready {
            model: ModelId::from("phi3:mini"),
            response: "hi".to_string(),
            pulled: true,
        });
        let value: serde_json::Value =
            serde_json::from_str(&frame.render(false).unwrap()).unwrap();
        assert_eq!(
            value,
            json!({"type": "result", "model": "phi3:mini", "text": "hi", "pulled": true})
        );
    }

    #[test]
    fn test_plain_text_frames() {
        let model = ModelId::from("phi3:mini");
        assert_eq!(
            Frame::Installing {
                model: model.clone()
            }
            .render(true)
            .unwrap(),
            "Model phi3:mini is not installed. Pulling it now, this may take a few minutes..."
        );
        assert_eq!(
            Frame::Installed {
                model: model.clone()
            }
            .render(true)
            .unwrap(),
            "Successfully pulled model phi3:mini. Ready to use!"
        );
        assert_eq!(
            Frame::Result {
                model,
                text: "hello".to_string(),
                pulled: false
            }
            .render(true)
            .unwrap(),
            "hello"
        );
        assert_eq!(
            Frame::Error {
                kind: FailureKind::Timeout,
                message: "Generation timed out after 60s".to_string()
            }
            .render(true)
            .unwrap(),
            "Error generating response: Generation timed out after 60s"
        );
        assert_eq!(
            Frame::Error {
                kind: FailureKind::InstallFailed,
                message: "Failed to pull model x".to_string()
            }
            .render(true),
            None
        );
        assert_eq!(
            Frame::Error {
                kind: FailureKind::BadRequest,
                message: "expected value at line 1 column 1".to_string()
            }
            .render(true),
            None
        );
    }
}
