use {
    axum::{
        Json,
        extract::{Path, State},
    },
    serde::Deserialize,
    serde_json::{Value, json},
};

use {
    waygate_common::types::validate_session_id,
    waygate_media::MediaSource,
    waygate_outbound::SendPayload,
    waygate_session::{SessionSnapshot, SessionState},
};

use crate::{AppState, error::ApiError};

type ApiResult = Result<Json<Value>, ApiError>;

// ── Session administration ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub session_id: String,
}

pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> ApiResult {
    validate_session_id(&req.session_id)?;

    let (snapshot, is_new) = state.registry.create(&req.session_id).await;
    let response = if is_new {
        json!({
            "message": "session created",
            "session_id": req.session_id,
            "status": "initializing",
        })
    } else if snapshot.state == SessionState::Connected {
        json!({
            "message": "session already connected",
            "session_id": req.session_id,
            "status": "connected",
            "phone": snapshot.identity.map(|i| i.phone_number),
        })
    } else {
        json!({
            "message": "session already exists",
            "session_id": req.session_id,
            "status": "existing",
        })
    };
    Ok(Json(response))
}

pub async fn pairing_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult {
    let snapshot = state
        .registry
        .get(&session_id)
        .await
        .ok_or_else(|| waygate_common::Error::NotFound(session_id.clone()))?;

    let response = match state.registry.pairing_artifact(&session_id) {
        Some(qr) => json!({
            "qr": qr,
            "status": "qr_ready",
            "message": "scan the code with the device",
        }),
        None if snapshot.state == SessionState::Connected => {
            let identity = snapshot.identity;
            json!({
                "status": "connected",
                "phone": identity.as_ref().map(|i| i.phone_number.clone()),
                "name": identity.and_then(|i| i.display_name),
            })
        },
        None => json!({
            "status": "waiting",
            "message": "waiting for a pairing code",
        }),
    };
    Ok(Json(response))
}

pub async fn session_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<Value> {
    let Some(snapshot) = state.registry.get(&session_id).await else {
        return Json(json!({ "status": "disconnected" }));
    };

    let response = match snapshot.state {
        SessionState::Connected => {
            let mut body = json!({
                "status": "connected",
                "phone": snapshot.identity.as_ref().map(|i| i.phone_number.clone()),
                "name": snapshot.identity.and_then(|i| i.display_name),
            });
            if snapshot.degraded
                && let Some(map) = body.as_object_mut()
            {
                map.insert("degraded".into(), Value::Bool(true));
            }
            body
        },
        _ if state.registry.pairing_artifact(&session_id).is_some() => json!({ "status": "qr" }),
        _ => json!({ "status": "pending" }),
    };
    Json(response)
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult {
    state.registry.delete(&session_id).await?;
    Ok(Json(json!({ "message": "session deleted" })))
}

pub async fn logout_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult {
    state.registry.logout(&session_id).await?;
    Ok(Json(json!({ "message": "logged out" })))
}

pub async fn list_sessions(State(state): State<AppState>) -> Json<Value> {
    let sessions: Vec<Value> = state
        .registry
        .list()
        .await
        .into_iter()
        .map(session_summary)
        .collect();
    Json(json!({ "total": sessions.len(), "sessions": sessions }))
}

fn session_summary(snapshot: SessionSnapshot) -> Value {
    let status = match snapshot.state {
        SessionState::Connected => "connected",
        _ => "pending",
    };
    json!({
        "session_id": snapshot.id,
        "status": status,
        "phone": snapshot.identity.as_ref().map(|i| i.phone_number.clone()),
        "name": snapshot.identity.and_then(|i| i.display_name),
    })
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": state.registry.list().await.len(),
    }))
}

// ── Message dispatch ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct TextMessageRequest {
    pub session_id: String,
    pub to: String,
    pub message: String,
}

#[derive(Deserialize)]
pub struct ImageMessageRequest {
    pub session_id: String,
    pub to: String,
    /// Remote URL or inline base64.
    pub image: String,
    pub caption: Option<String>,
}

#[derive(Deserialize)]
pub struct VideoMessageRequest {
    pub session_id: String,
    pub to: String,
    pub video: String,
    pub caption: Option<String>,
}

#[derive(Deserialize)]
pub struct AudioMessageRequest {
    pub session_id: String,
    pub to: String,
    pub audio: String,
    pub mimetype: Option<String>,
}

#[derive(Deserialize)]
pub struct DocumentMessageRequest {
    pub session_id: String,
    pub to: String,
    pub document: String,
    pub filename: Option<String>,
    pub mimetype: Option<String>,
}

#[derive(Deserialize)]
pub struct ContactCard {
    pub name: String,
    pub number: String,
}

#[derive(Deserialize)]
pub struct ContactMessageRequest {
    pub session_id: String,
    pub to: String,
    pub contact: ContactCard,
}

/// Envelope form: the payload kind is selected by a `type` field.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SendMessageRequest {
    Text(TextMessageRequest),
    Image(ImageMessageRequest),
    Video(VideoMessageRequest),
    Audio(AudioMessageRequest),
    Document(DocumentMessageRequest),
    Contact(ContactMessageRequest),
}

pub async fn send_message(
    State(state): State<AppState>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult {
    match req {
        SendMessageRequest::Text(req) => dispatch_text(state, req).await,
        SendMessageRequest::Image(req) => dispatch_image(state, req).await,
        SendMessageRequest::Video(req) => dispatch_video(state, req).await,
        SendMessageRequest::Audio(req) => dispatch_audio(state, req).await,
        SendMessageRequest::Document(req) => dispatch_document(state, req).await,
        SendMessageRequest::Contact(req) => dispatch_contact(state, req).await,
    }
}

pub async fn send_text(
    State(state): State<AppState>,
    Json(req): Json<TextMessageRequest>,
) -> ApiResult {
    dispatch_text(state, req).await
}

pub async fn send_image(
    State(state): State<AppState>,
    Json(req): Json<ImageMessageRequest>,
) -> ApiResult {
    dispatch_image(state, req).await
}

pub async fn send_video(
    State(state): State<AppState>,
    Json(req): Json<VideoMessageRequest>,
) -> ApiResult {
    dispatch_video(state, req).await
}

pub async fn send_audio(
    State(state): State<AppState>,
    Json(req): Json<AudioMessageRequest>,
) -> ApiResult {
    dispatch_audio(state, req).await
}

pub async fn send_document(
    State(state): State<AppState>,
    Json(req): Json<DocumentMessageRequest>,
) -> ApiResult {
    dispatch_document(state, req).await
}

pub async fn send_contact(
    State(state): State<AppState>,
    Json(req): Json<ContactMessageRequest>,
) -> ApiResult {
    dispatch_contact(state, req).await
}

async fn dispatch_text(state: AppState, req: TextMessageRequest) -> ApiResult {
    dispatch(
        &state,
        &req.session_id,
        &req.to,
        SendPayload::Text { body: req.message },
    )
    .await
}

async fn dispatch_image(state: AppState, req: ImageMessageRequest) -> ApiResult {
    dispatch(
        &state,
        &req.session_id,
        &req.to,
        SendPayload::Image {
            media: MediaSource::parse(&req.image),
            caption: req.caption,
        },
    )
    .await
}

async fn dispatch_video(state: AppState, req: VideoMessageRequest) -> ApiResult {
    dispatch(
        &state,
        &req.session_id,
        &req.to,
        SendPayload::Video {
            media: MediaSource::parse(&req.video),
            caption: req.caption,
        },
    )
    .await
}

async fn dispatch_audio(state: AppState, req: AudioMessageRequest) -> ApiResult {
    dispatch(
        &state,
        &req.session_id,
        &req.to,
        SendPayload::Audio {
            media: MediaSource::parse(&req.audio),
            mimetype: req.mimetype,
        },
    )
    .await
}

async fn dispatch_document(state: AppState, req: DocumentMessageRequest) -> ApiResult {
    dispatch(
        &state,
        &req.session_id,
        &req.to,
        SendPayload::Document {
            media: MediaSource::parse(&req.document),
            filename: req.filename,
            mimetype: req.mimetype,
        },
    )
    .await
}

async fn dispatch_contact(state: AppState, req: ContactMessageRequest) -> ApiResult {
    dispatch(
        &state,
        &req.session_id,
        &req.to,
        SendPayload::Contact {
            name: req.contact.name,
            number: req.contact.number,
        },
    )
    .await
}

async fn dispatch(
    state: &AppState,
    session_id: &str,
    to: &str,
    payload: SendPayload,
) -> ApiResult {
    let message_id = state.dispatcher.send(session_id, to, payload).await?;
    Ok(Json(json!({
        "success": true,
        "message_id": message_id.0,
    })))
}
