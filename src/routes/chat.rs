use axum::{
    extract::{
        ws::{
            rejection::WebSocketUpgradeRejection, Message as WsMessage, WebSocket,
            WebSocketUpgrade,
        },
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    config::get_config,
    dto::chat_dto::{HistoryQuery, InboundFrame, MarkReadResponse, SendMessagePayload, SocketAuthQuery},
    error::{Error, Result},
    middleware::auth::{Claims, TokenKind},
    routes::extract::{ApiJson, ApiPath, ApiQuery},
    services::chat_service::ChatService,
    utils::token::decode_token,
    AppState,
};

#[axum::debug_handler]
pub async fn list_contacts(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let contacts = state.chat_service.list_contacts(claims.account_id()?).await?;
    Ok(Json(contacts))
}

#[utoipa::path(
    get,
    path = "/api/chat/messages/{other_id}",
    params(
        ("other_id" = Uuid, Path, description = "Counterparty account ID"),
        ("limit" = Option<i64>, Query, description = "Most recent messages to return")
    ),
    responses(
        (status = 200, description = "Conversation history, oldest first"),
        (status = 400, description = "Counterparty is the caller"),
        (status = 404, description = "Counterparty not found")
    )
)]
#[axum::debug_handler]
pub async fn get_messages(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(other_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<HistoryQuery>,
) -> Result<impl IntoResponse> {
    let messages = state
        .chat_service
        .fetch_history(claims.account_id()?, other_id, query.limit)
        .await?;
    Ok(Json(messages))
}

#[axum::debug_handler]
pub async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(other_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<SendMessagePayload>,
) -> Result<impl IntoResponse> {
    let message = state
        .chat_service
        .send(claims.account_id()?, other_id, &payload.message)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

#[axum::debug_handler]
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(other_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse> {
    let updated = state
        .chat_service
        .mark_read(claims.account_id()?, other_id)
        .await?;
    Ok(Json(MarkReadResponse {
        message: "Messages marked as read".to_string(),
        updated,
    }))
}

#[axum::debug_handler]
pub async fn unread_count(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let count = state.chat_service.unread_count(claims.account_id()?).await?;
    Ok(Json(json!({ "unread_count": count })))
}

/// Live channel for one conversation. Browsers cannot set headers on a
/// WebSocket handshake, so the access token travels in `?token=`. It is
/// checked before the upgrade headers.
#[axum::debug_handler]
pub async fn chat_socket(
    State(state): State<AppState>,
    ApiPath(other_id): ApiPath<Uuid>,
    ApiQuery(auth): ApiQuery<SocketAuthQuery>,
    ws: std::result::Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response> {
    let token = auth
        .token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::Unauthorized("missing_token".to_string()))?;
    let claims = decode_token(token, &get_config().jwt_secret, TokenKind::Access)?;
    let self_id = claims.account_id()?;

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return Ok(rejection.into_response()),
    };
    state.chat_service.ensure_counterparty(self_id, other_id).await?;

    let chat = state.chat_service.clone();
    Ok(ws.on_upgrade(move |socket| run_socket(socket, chat, self_id, other_id)))
}

async fn run_socket(socket: WebSocket, chat: ChatService, self_id: Uuid, other_id: Uuid) {
    let mut subscription = chat.subscribe(self_id, other_id);
    let group = subscription.key();
    tracing::info!(%group, account_id = %self_id, "chat socket connected");

    let (mut sink, mut stream) = socket.split();
    let (notice_tx, mut notice_rx) = mpsc::channel::<String>(16);

    let mut push_task = tokio::spawn(async move {
        loop {
            let outgoing = tokio::select! {
                frame = subscription.recv() => match frame {
                    Some(frame) => match serde_json::to_string(&frame) {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::error!(error = %e, "failed to encode chat frame");
                            continue;
                        }
                    },
                    None => break,
                },
                notice = notice_rx.recv() => match notice {
                    Some(text) => text,
                    None => break,
                },
            };
            if sink.send(WsMessage::Text(outgoing)).await.is_err() {
                break;
            }
        }
    });

    loop {
        let text = tokio::select! {
            incoming = stream.next() => match incoming {
                Some(Ok(WsMessage::Text(text))) => text,
                Some(Ok(WsMessage::Binary(data))) => match String::from_utf8(data) {
                    Ok(text) => text,
                    Err(_) => {
                        let _ = notice_tx.send(error_frame("Frames must be UTF-8 JSON")).await;
                        continue;
                    }
                },
                Some(Ok(WsMessage::Close(_))) | None => break,
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    tracing::debug!(error = %e, "chat socket read failed");
                    break;
                }
            },
            _ = &mut push_task => break,
        };

        if let Err(err) = handle_inbound(&chat, self_id, other_id, &text).await {
            tracing::warn!(%group, error = %err, "chat frame rejected");
            let _ = notice_tx.send(error_frame(&err.public_message())).await;
        }
    }

    push_task.abort();
    tracing::info!(%group, account_id = %self_id, "chat socket closed");
}

/// Persists one client frame. The frame must name the socket's own pair.
async fn handle_inbound(chat: &ChatService, self_id: Uuid, other_id: Uuid, text: &str) -> Result<()> {
    let frame: InboundFrame = serde_json::from_str(text)?;
    if frame.sender_id != self_id || frame.receiver_id != other_id {
        return Err(Error::Forbidden(
            "Frame does not belong to this conversation".to_string(),
        ));
    }
    chat.send(self_id, other_id, &frame.message).await?;
    Ok(())
}

fn error_frame(message: &str) -> String {
    json!({ "error": message }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::chat_hub::ChatHub;
    use sqlx::postgres::PgPoolOptions;

    fn offline_chat() -> ChatService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        ChatService::new(pool, ChatHub::default())
    }

    fn frame(sender_id: Uuid, receiver_id: Uuid) -> String {
        json!({ "message": "hello", "sender_id": sender_id, "receiver_id": receiver_id }).to_string()
    }

    #[tokio::test]
    async fn frames_for_another_pair_are_refused_before_persisting() {
        let chat = offline_chat();
        let (me, other, stranger) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut listener = chat.subscribe(other, me);

        let spoofed_sender = handle_inbound(&chat, me, other, &frame(stranger, other)).await;
        assert!(matches!(spoofed_sender, Err(Error::Forbidden(_))));

        let wrong_receiver = handle_inbound(&chat, me, other, &frame(me, stranger)).await;
        assert!(matches!(wrong_receiver, Err(Error::Forbidden(_))));

        let mut pending = tokio_test::task::spawn(listener.recv());
        tokio_test::assert_pending!(pending.poll());
    }

    #[tokio::test]
    async fn malformed_frames_are_bad_requests() {
        let chat = offline_chat();
        let err = handle_inbound(&chat, Uuid::new_v4(), Uuid::new_v4(), "not json")
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let notice: serde_json::Value = serde_json::from_str(&error_frame(&err.public_message())).unwrap();
        assert!(notice["error"].is_string());
    }
}
