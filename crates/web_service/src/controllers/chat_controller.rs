use actix_web::{
    web::{self, Data, Json, Path},
    HttpResponse, Result,
};
use log::info;

use crate::{
    error::AppError,
    models::{ClearSessionResponse, HistoryResponse, SendMessageRequestBody},
    server::AppState,
};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/sessions/{session_id}/messages",
        web::post().to(send_message),
    )
    .route(
        "/sessions/{session_id}/messages/stream",
        web::post().to(send_message_stream),
    )
    .route(
        "/sessions/{session_id}/messages",
        web::get().to(get_history),
    )
    .route("/sessions/{session_id}", web::delete().to(clear_session));
}

pub async fn send_message(
    session_id: Path<String>,
    body: Json<SendMessageRequestBody>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let response = app_state
        .chat_service()
        .process_message(&session_id, &body)
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Streaming endpoint for chat messages using Server-Sent Events
pub async fn send_message_stream(
    session_id: Path<String>,
    body: Json<SendMessageRequestBody>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Streaming message for session: {}", session_id);
    let sse_stream = app_state
        .chat_service()
        .process_message_stream(&session_id, &body)
        .await?;

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("cache-control", "no-cache"))
        .insert_header(("x-accel-buffering", "no"))
        .streaming(sse_stream))
}

pub async fn get_history(
    session_id: Path<String>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let messages = app_state.store.get(&session_id);
    Ok(HttpResponse::Ok().json(HistoryResponse {
        session_id: session_id.into_inner(),
        messages,
    }))
}

pub async fn clear_session(
    session_id: Path<String>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    app_state.store.clear(&session_id);
    info!("Cleared session: {}", session_id);
    Ok(HttpResponse::Ok().json(ClearSessionResponse {
        session_id: session_id.into_inner(),
        cleared: true,
    }))
}
