use axum::{Json, extract::State};

use lanbox_types::api::{PostChatRequest, SuccessResponse};
use lanbox_types::models::{ChatMessage, NewChatMessage};

use crate::error::{ApiError, Result};
use crate::extract::Payload;
use crate::{AppState, with_store};

/// GET /chat — the whole log in store order.
pub async fn list_messages(State(state): State<AppState>) -> Result<Json<Vec<ChatMessage>>> {
    let messages = with_store(&state, |store| store.find_chat()).await?;
    Ok(Json(messages))
}

/// POST /chat — appends a message. Both fields must be present and non-empty.
pub async fn post_message(
    State(state): State<AppState>,
    Payload(req): Payload<PostChatRequest>,
) -> Result<Json<SuccessResponse>> {
    let message = match (req.user, req.text) {
        (Some(user), Some(text)) if !user.is_empty() && !text.is_empty() => {
            NewChatMessage { user, text }
        }
        _ => return Err(ApiError::BadRequest("Invalid message".into())),
    };

    with_store(&state, move |store| store.insert_chat(message)).await?;

    Ok(Json(SuccessResponse { success: true }))
}
