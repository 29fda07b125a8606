use axum::{Json, extract::State};
use tracing::{info, warn};

use lanbox_types::api::{CredentialsRequest, MessageResponse};
use lanbox_types::models::{NewUser, UserAccount};

use crate::error::{ApiError, Result};
use crate::extract::Payload;
use crate::{AppState, with_store};

/// GET /users — every account, passwords included.
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserAccount>>> {
    let users = with_store(&state, |store| store.find_users()).await?;
    Ok(Json(users))
}

/// POST /register — stores the account as given. No uniqueness check.
pub async fn register(
    State(state): State<AppState>,
    Payload(req): Payload<CredentialsRequest>,
) -> Result<Json<MessageResponse>> {
    let user = NewUser {
        username: req.username,
        password: req.password,
    };

    let account = with_store(&state, move |store| store.insert_user(user)).await?;
    info!(
        "Registered user {} ({})",
        account.username.as_deref().unwrap_or("<none>"),
        account.id
    );

    Ok(Json(MessageResponse::new("User created")))
}

/// POST /login — first account matching both username and password.
pub async fn login(
    State(state): State<AppState>,
    Payload(req): Payload<CredentialsRequest>,
) -> Result<Json<UserAccount>> {
    let (Some(username), Some(password)) = (req.username, req.password) else {
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    };

    let lookup = username.clone();
    let user = with_store(&state, move |store| store.find_user(&lookup, &password)).await?;

    match user {
        Some(user) => Ok(Json(user)),
        None => {
            warn!("Failed login for {}", username);
            Err(ApiError::Unauthorized("Invalid credentials".into()))
        }
    }
}
