use super::Database;
use crate::models::{CreateRoom, Room, UpdateRoom};
use crate::services::metrics::DB_QUERY_DURATION;
use service_core::error::AppError;
use tracing::{info, instrument};
use uuid::Uuid;

const ROOM_COLUMNS: &str = r#"
    room_id, number, room_type, capacity, price, description, image_url, active,
    created_utc, updated_utc
"#;

impl Database {
    /// Create a room.
    #[instrument(skip(self, input), fields(number = %input.number))]
    pub async fn create_room(&self, input: &CreateRoom) -> Result<Room, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_room"])
            .start_timer();

        let room = sqlx::query_as::<_, Room>(&format!(
            r#"
            INSERT INTO rooms (room_id, number, room_type, capacity, price, description, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            ROOM_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&input.number)
        .bind(input.room_type.as_str())
        .bind(input.capacity)
        .bind(input.price)
        .bind(&input.description)
        .bind(&input.image_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_db("Failed to create room", e))?;

        timer.observe_duration();

        info!(room_id = %room.room_id, number = %room.number, "Room created");

        Ok(room)
    }

    /// Get room by ID.
    #[instrument(skip(self), fields(room_id = %room_id))]
    pub async fn get_room(&self, room_id: Uuid) -> Result<Option<Room>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_room"])
            .start_timer();

        let room = sqlx::query_as::<_, Room>(&format!(
            "SELECT {} FROM rooms WHERE room_id = $1",
            ROOM_COLUMNS
        ))
        .bind(room_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get room: {}", e)))?;

        timer.observe_duration();

        Ok(room)
    }

    /// List rooms ordered by number.
    #[instrument(skip(self))]
    pub async fn list_rooms(
        &self,
        active_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Room>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_rooms"])
            .start_timer();

        let rooms = sqlx::query_as::<_, Room>(&format!(
            r#"
            SELECT {}
            FROM rooms
            WHERE ($1 = FALSE OR active = TRUE)
            ORDER BY number
            LIMIT $2 OFFSET $3
            "#,
            ROOM_COLUMNS
        ))
        .bind(active_only)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list rooms: {}", e)))?;

        timer.observe_duration();

        Ok(rooms)
    }

    /// Update a room; unset fields keep their value.
    #[instrument(skip(self, input), fields(room_id = %room_id))]
    pub async fn update_room(
        &self,
        room_id: Uuid,
        input: &UpdateRoom,
    ) -> Result<Option<Room>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_room"])
            .start_timer();

        let room = sqlx::query_as::<_, Room>(&format!(
            r#"
            UPDATE rooms
            SET number = COALESCE($2, number),
                room_type = COALESCE($3, room_type),
                capacity = COALESCE($4, capacity),
                price = COALESCE($5, price),
                description = COALESCE($6, description),
                image_url = COALESCE($7, image_url),
                active = COALESCE($8, active),
                updated_utc = NOW()
            WHERE room_id = $1
            RETURNING {}
            "#,
            ROOM_COLUMNS
        ))
        .bind(room_id)
        .bind(&input.number)
        .bind(input.room_type.map(|t| t.as_str()))
        .bind(input.capacity)
        .bind(input.price)
        .bind(&input.description)
        .bind(&input.image_url)
        .bind(input.active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_db("Failed to update room", e))?;

        timer.observe_duration();

        if room.is_some() {
            info!(room_id = %room_id, "Room updated");
        }

        Ok(room)
    }

    /// Delete a room. Rooms with reservations are kept (409).
    #[instrument(skip(self), fields(room_id = %room_id))]
    pub async fn delete_room(&self, room_id: Uuid) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_room"])
            .start_timer();

        let result = sqlx::query("DELETE FROM rooms WHERE room_id = $1")
            .bind(room_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_db("Failed to delete room", e))?;

        timer.observe_duration();

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(room_id = %room_id, "Room deleted");
        }

        Ok(deleted)
    }
}
