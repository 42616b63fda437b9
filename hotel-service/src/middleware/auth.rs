use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use service_core::error::AppError;

use crate::services::{Claims, Role};
use crate::startup::AppState;

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn decode(state: &AppState, token: &str) -> Result<Claims, AppError> {
    state.jwt.validate(token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected access token");
        AppError::Unauthorized(anyhow::anyhow!("Invalid or expired token"))
    })
}

/// Middleware to require a valid back-office token.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers()).ok_or_else(|| {
        AppError::Unauthorized(anyhow::anyhow!("Missing or invalid Authorization header"))
    })?;

    let claims = decode(&state, token)?;

    // Store claims in request extensions so handlers can access them
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Public routes: attach claims when a token is sent, pass anonymous requests through.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(token) = bearer_token(req.headers()) {
        let claims = decode(&state, token)?;
        req.extensions_mut().insert(claims);
    }

    Ok(next.run(req).await)
}

/// Authenticated caller (root or agent).
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Authentication required")))
    }
}

/// Caller holding the root role; agents get 403.
#[derive(Debug, Clone)]
pub struct RootUser(pub Claims);

#[axum::async_trait]
impl<S> FromRequestParts<S> for RootUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;
        if claims.role != Role::Root {
            return Err(AppError::Forbidden(anyhow::anyhow!(
                "This operation requires the root role"
            )));
        }
        Ok(RootUser(claims))
    }
}

/// Caller if a valid token was presented on a public route.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<Claims>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<Claims>().cloned()))
    }
}

impl MaybeUser {
    pub fn is_root(&self) -> bool {
        self.0.as_ref().is_some_and(|c| c.role == Role::Root)
    }

    pub fn is_staff(&self) -> bool {
        self.0.is_some()
    }
}
