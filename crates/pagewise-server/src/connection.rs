//! Per-connection handler: read a request frame, answer it, repeat.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;

use crate::assistant::Assistant;
use crate::protocol::Response;

type WsStream = tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>;

/// Handle a single WebSocket connection. Requests on one connection are
/// answered in the order they arrive.
pub async fn handle_connection(ws: WsStream, addr: SocketAddr, assistant: Arc<Assistant>) {
    let (mut sink, mut stream) = ws.split();
    tracing::info!(peer = %addr, "Client connected");

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                let response = assistant.handle_text(text.as_str()).await;
                if send_response(&mut sink, &response).await.is_err() {
                    break;
                }
            }
            Ok(Message::Binary(_)) => {
                let response = Response::error("Expected a JSON text frame");
                if send_response(&mut sink, &response).await.is_err() {
                    break;
                }
            }
            Ok(Message::Ping(data)) => {
                let _ = sink.send(Message::Pong(data)).await;
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(peer = %addr, error = %e, "WS error");
                break;
            }
        }
    }

    tracing::info!(peer = %addr, "Client disconnected");
}

/// Send a Response as a JSON text frame.
async fn send_response(
    sink: &mut futures_util::stream::SplitSink<WsStream, Message>,
    response: &Response,
) -> Result<(), tokio_tungstenite::tungstenite::Error> {
    sink.send(Message::Text(response.to_json().into())).await
}
