//! WebSocket upgrade handler.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use chathub_core::error::AppError;
use chathub_core::types::UserId;
use chathub_realtime::connection::heartbeat::run_heartbeat;
use chathub_realtime::message::types::OutboundEvent;
use chathub_realtime::{OutboundFrame, SessionHandle};

use crate::error::ApiResult;
use crate::state::AppState;

/// How long the writer gets to flush its close frame.
const WRITER_DRAIN: Duration = Duration::from_secs(5);

/// Query parameters for the upgrade.
#[derive(Debug, Default, serde::Deserialize)]
pub struct WsQuery {
    /// Bearer token proving the connecting user.
    pub token: Option<String>,
}

/// GET /ws?token={jwt}: WebSocket upgrade
pub async fn ws_handler(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> ApiResult<Response> {
    if state.realtime.is_shutting_down() {
        return Err(AppError::service_unavailable("Server is shutting down").into());
    }

    // Authenticate before upgrade
    let token_user = match query.token.as_deref().filter(|t| !t.is_empty()) {
        Some(token) => {
            let claims = state
                .jwt_decoder
                .decode(token)
                .map_err(|_| AppError::authentication("Token is not valid"))?;
            Some(claims.user_id())
        }
        None if state.config.realtime.require_token => {
            return Err(AppError::authentication("No token, authorization denied").into());
        }
        None => None,
    };

    Ok(ws.on_upgrade(move |socket| handle_ws_connection(state, token_user, socket)))
}

/// Drives an established socket until either side hangs up.
async fn handle_ws_connection(state: AppState, token_user: Option<UserId>, socket: WebSocket) {
    let broker = Arc::clone(&state.realtime.broker);
    let (handle, mut outbound_rx) = broker.connect(token_user);
    let session_id = handle.id;
    let cancel = handle.cancellation();
    let (mut ws_tx, mut ws_rx) = socket.split();

    let heartbeat = tokio::spawn(run_heartbeat(
        Arc::clone(&handle),
        state.realtime.heartbeat_config(),
    ));

    // Outbound forwarder
    let writer_cancel = cancel.clone();
    let writer = tokio::spawn(async move {
        loop {
            let frame = tokio::select! {
                _ = writer_cancel.cancelled() => break,
                frame = outbound_rx.recv() => match frame {
                    Some(frame) => frame,
                    None => break,
                },
            };
            let message = match frame {
                OutboundFrame::Text(text) => Message::Text(text.into()),
                OutboundFrame::Ping => Message::Ping(Default::default()),
            };
            if ws_tx.send(message).await.is_err() {
                break;
            }
        }
        let _ = ws_tx.send(Message::Close(None)).await;
    });

    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => break,
            next = ws_rx.next() => next,
        };

        match next {
            Some(Ok(Message::Text(text))) => {
                broker.handle_frame(session_id, text.as_str()).await;
            }
            Some(Ok(Message::Binary(_))) => reject_binary(&handle),
            Some(Ok(Message::Pong(_))) | Some(Ok(Message::Ping(_))) => handle.touch(),
            Some(Ok(Message::Close(_))) | None => break,
            Some(Err(e)) => {
                warn!(session_id = %session_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    // Cleanup
    broker.disconnect(session_id);
    heartbeat.abort();
    if tokio::time::timeout(WRITER_DRAIN, writer).await.is_err() {
        debug!(session_id = %session_id, "Writer did not drain in time");
    }

    info!(
        session_id = %session_id,
        user_id = ?handle.user_id(),
        "WebSocket connection closed"
    );
}

fn reject_binary(handle: &SessionHandle) {
    handle.touch();
    handle.send_event(&OutboundEvent::error(&AppError::validation(
        "Binary frames are not supported",
    )));
}
