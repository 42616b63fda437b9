use super::Database;
use crate::models::{Agent, CreateAgent, UpdateAgent};
use crate::services::metrics::DB_QUERY_DURATION;
use service_core::error::AppError;
use tracing::{info, instrument};
use uuid::Uuid;

const AGENT_COLUMNS: &str =
    "agent_id, name, email, phone, password_hash, active, created_utc, updated_utc";

impl Database {
    /// Create an agent account.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create_agent(&self, input: &CreateAgent) -> Result<Agent, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_agent"])
            .start_timer();

        let agent = sqlx::query_as::<_, Agent>(&format!(
            r#"
            INSERT INTO agents (agent_id, name, email, phone, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            AGENT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_db("Failed to create agent", e))?;

        timer.observe_duration();

        info!(agent_id = %agent.agent_id, "Agent created");

        Ok(agent)
    }

    /// Get agent by ID.
    #[instrument(skip(self), fields(agent_id = %agent_id))]
    pub async fn get_agent(&self, agent_id: Uuid) -> Result<Option<Agent>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_agent"])
            .start_timer();

        let agent = sqlx::query_as::<_, Agent>(&format!(
            "SELECT {} FROM agents WHERE agent_id = $1",
            AGENT_COLUMNS
        ))
        .bind(agent_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get agent: {}", e)))?;

        timer.observe_duration();

        Ok(agent)
    }

    /// Get agent by login email (case-insensitive).
    #[instrument(skip(self, email))]
    pub async fn get_agent_by_email(&self, email: &str) -> Result<Option<Agent>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_agent_by_email"])
            .start_timer();

        let agent = sqlx::query_as::<_, Agent>(&format!(
            "SELECT {} FROM agents WHERE LOWER(email) = LOWER($1)",
            AGENT_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get agent: {}", e)))?;

        timer.observe_duration();

        Ok(agent)
    }

    /// List agents by name.
    #[instrument(skip(self))]
    pub async fn list_agents(&self, limit: i64, offset: i64) -> Result<Vec<Agent>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_agents"])
            .start_timer();

        let agents = sqlx::query_as::<_, Agent>(&format!(
            "SELECT {} FROM agents ORDER BY name, agent_id LIMIT $1 OFFSET $2",
            AGENT_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list agents: {}", e)))?;

        timer.observe_duration();

        Ok(agents)
    }

    /// Update an agent; unset fields keep their value.
    #[instrument(skip(self, input), fields(agent_id = %agent_id))]
    pub async fn update_agent(
        &self,
        agent_id: Uuid,
        input: &UpdateAgent,
    ) -> Result<Option<Agent>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_agent"])
            .start_timer();

        let agent = sqlx::query_as::<_, Agent>(&format!(
            r#"
            UPDATE agents
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                password_hash = COALESCE($5, password_hash),
                active = COALESCE($6, active),
                updated_utc = NOW()
            WHERE agent_id = $1
            RETURNING {}
            "#,
            AGENT_COLUMNS
        ))
        .bind(agent_id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.password_hash)
        .bind(input.active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_db("Failed to update agent", e))?;

        timer.observe_duration();

        if agent.is_some() {
            info!(agent_id = %agent_id, "Agent updated");
        }

        Ok(agent)
    }

    /// Delete an agent; reservations they booked keep a NULL `created_by`.
    #[instrument(skip(self), fields(agent_id = %agent_id))]
    pub async fn delete_agent(&self, agent_id: Uuid) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_agent"])
            .start_timer();

        let result = sqlx::query("DELETE FROM agents WHERE agent_id = $1")
            .bind(agent_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_db("Failed to delete agent", e))?;

        timer.observe_duration();

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(agent_id = %agent_id, "Agent deleted");
        }

        Ok(deleted)
    }
}
