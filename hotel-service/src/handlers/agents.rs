use crate::dtos::{
    AgentResponse, CreateAgentRequest, ListResponse, PageParams, UpdateAgentRequest,
};
use crate::middleware::RootUser;
use crate::models::{CreateAgent, UpdateAgent};
use crate::startup::AppState;
use crate::utils::{hash_password, Password};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

fn agent_not_found(agent_id: Uuid) -> AppError {
    AppError::NotFound(anyhow::anyhow!("Agent {} not found", agent_id))
}

async fn hash(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&Password::new(password)))
        .await
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("Password hashing failed: {}", e)))?
        .map_err(AppError::InternalError)
}

pub async fn list_agents(
    State(state): State<AppState>,
    _root: RootUser,
    Query(params): Query<PageParams>,
) -> Result<Json<ListResponse<AgentResponse>>, AppError> {
    params.validate()?;
    let page = params.pagination();

    let agents = state
        .db
        .list_agents(page.limit(), page.offset())
        .await?
        .into_iter()
        .map(AgentResponse::from)
        .collect();

    Ok(Json(ListResponse::new(agents, page)))
}

pub async fn create_agent(
    State(state): State<AppState>,
    _root: RootUser,
    Json(payload): Json<CreateAgentRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let input = CreateAgent {
        name: payload.name,
        email: payload.email.trim().to_lowercase(),
        phone: payload.phone,
        password_hash: hash(payload.password).await?,
    };
    let agent = state.db.create_agent(&input).await?;

    Ok((StatusCode::CREATED, Json(AgentResponse::from(agent))))
}

pub async fn get_agent(
    State(state): State<AppState>,
    _root: RootUser,
    Path(agent_id): Path<Uuid>,
) -> Result<Json<AgentResponse>, AppError> {
    state
        .db
        .get_agent(agent_id)
        .await?
        .map(|agent| Json(agent.into()))
        .ok_or_else(|| agent_not_found(agent_id))
}

pub async fn update_agent(
    State(state): State<AppState>,
    _root: RootUser,
    Path(agent_id): Path<Uuid>,
    Json(payload): Json<UpdateAgentRequest>,
) -> Result<Json<AgentResponse>, AppError> {
    payload.validate()?;

    let password_hash = match payload.password {
        Some(password) => Some(hash(password).await?),
        None => None,
    };
    let input = UpdateAgent {
        name: payload.name,
        email: payload.email.map(|e| e.trim().to_lowercase()),
        phone: payload.phone,
        password_hash,
        active: payload.active,
    };

    state
        .db
        .update_agent(agent_id, &input)
        .await?
        .map(|agent| Json(agent.into()))
        .ok_or_else(|| agent_not_found(agent_id))
}

pub async fn delete_agent(
    State(state): State<AppState>,
    _root: RootUser,
    Path(agent_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.db.delete_agent(agent_id).await? {
        return Err(agent_not_found(agent_id));
    }
    Ok(StatusCode::NO_CONTENT)
}
