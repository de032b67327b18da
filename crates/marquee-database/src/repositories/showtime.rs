//! Showtime repository implementation.

use sqlx::PgPool;

use marquee_core::error::{AppError, ErrorKind};
use marquee_core::result::AppResult;
use marquee_core::types::id::{ShowtimeId, TheaterId};
use marquee_entity::showtime::{CreateShowtime, Showtime};

/// Repository for showtime reads and counter maintenance.
///
/// Showtime creation belongs to the (out-of-scope) catalog layer; `create`
/// exists for seeding. The availability counter is only ever adjusted through
/// the guarded statements here, inside a booking or cancellation unit of
/// work, or overwritten by the reconciler.
#[derive(Debug, Clone)]
pub struct ShowtimeRepository {
    pool: PgPool,
}

impl ShowtimeRepository {
    /// Create a new showtime repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a showtime by ID.
    pub async fn find_by_id(&self, id: ShowtimeId) -> AppResult<Option<Showtime>> {
        sqlx::query_as::<_, Showtime>("SELECT * FROM showtimes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find showtime", e))
    }

    /// List all showtime IDs. Used by the reconcile-all CLI path.
    pub async fn list_ids(&self) -> AppResult<Vec<ShowtimeId>> {
        sqlx::query_scalar::<_, ShowtimeId>("SELECT id FROM showtimes ORDER BY start_time")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list showtimes", e))
    }

    /// Create a new showtime with a full availability counter.
    pub async fn create(&self, data: &CreateShowtime) -> AppResult<Showtime> {
        sqlx::query_as::<_, Showtime>(
            "INSERT INTO showtimes \
             (movie_id, theater_id, start_time, end_time, price_cents, theater_capacity, available_seats) \
             VALUES ($1, $2, $3, $4, $5, $6, $6) RETURNING *",
        )
        .bind(data.movie_id)
        .bind(data.theater_id)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(data.price_cents)
        .bind(data.theater_capacity)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create showtime", e))
    }

    /// Adjust the availability counter by `delta`, keeping it inside
    /// `[0, theater_capacity]`. Returns the new value.
    ///
    /// The bounds guard is part of the statement so the counter can never be
    /// pushed out of range by interleaved writers; a refused adjustment means
    /// the counter has drifted from the ticket set and needs reconciliation.
    pub async fn adjust_available_seats(&self, id: ShowtimeId, delta: i32) -> AppResult<i32> {
        let updated: Option<i32> = sqlx::query_scalar(
            "UPDATE showtimes \
             SET available_seats = available_seats + $2, updated_at = NOW() \
             WHERE id = $1 \
               AND available_seats + $2 >= 0 \
               AND available_seats + $2 <= theater_capacity \
             RETURNING available_seats",
        )
        .bind(id)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to adjust available seats", e)
        })?;

        updated.ok_or_else(|| {
            AppError::internal(format!(
                "Availability counter for showtime {id} refused adjustment by {delta}; \
                 counter requires reconciliation"
            ))
        })
    }

    /// Overwrite the availability counter. Reconciler use only.
    pub async fn set_available_seats(&self, id: ShowtimeId, value: i32) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE showtimes SET available_seats = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to set available seats", e)
        })?;

        Ok(result.rows_affected() > 0)
    }

    /// Look up a theater's physical capacity.
    pub async fn theater_capacity(&self, theater_id: TheaterId) -> AppResult<Option<i32>> {
        sqlx::query_scalar::<_, i32>("SELECT capacity FROM theaters WHERE id = $1")
            .bind(theater_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find theater capacity", e)
            })
    }
}
