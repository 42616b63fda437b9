use crate::dtos::{LoginRequest, MeResponse};
use crate::middleware::AuthUser;
use crate::services::{jwt::TokenResponse, Role};
use crate::startup::AppState;
use crate::utils::{verify_password, Password};
use axum::{extract::State, Json};
use secrecy::ExposeSecret;
use service_core::error::AppError;
use validator::Validate;

fn invalid_credentials() -> AppError {
    AppError::Unauthorized(anyhow::anyhow!("Invalid email or password"))
}

/// Argon2 verification is CPU-bound; keep it off the async workers.
async fn verify(password: &Password, hash: String) -> Result<bool, AppError> {
    let password = password.clone();
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("Password check failed: {}", e)))
}

/// Exchange root or agent credentials for an access token.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    payload.validate()?;

    let email = payload.email.trim().to_lowercase();
    let password = Password::new(payload.password);

    if email == state.config.root.email.to_lowercase() {
        let hash = state.config.root.password_hash.expose_secret().clone();
        if !verify(&password, hash).await? {
            tracing::warn!(role = "root", "Login failed");
            return Err(invalid_credentials());
        }

        let token = state
            .jwt
            .issue("root", &state.config.root.email, Role::Root)
            .map_err(AppError::InternalError)?;
        tracing::info!(role = "root", "Login succeeded");
        return Ok(Json(token));
    }

    let agent = state
        .db
        .get_agent_by_email(&email)
        .await?
        .filter(|agent| agent.active)
        .ok_or_else(invalid_credentials)?;

    if !verify(&password, agent.password_hash.clone()).await? {
        tracing::warn!(agent_id = %agent.agent_id, "Login failed");
        return Err(invalid_credentials());
    }

    let token = state
        .jwt
        .issue(&agent.agent_id.to_string(), &agent.email, Role::Agent)
        .map_err(AppError::InternalError)?;

    tracing::info!(agent_id = %agent.agent_id, role = "agent", "Login succeeded");

    Ok(Json(token))
}

pub async fn me(AuthUser(claims): AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        sub: claims.sub,
        email: claims.email,
        role: claims.role,
        exp: claims.exp,
    })
}
