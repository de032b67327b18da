//! Seat claim repository implementation.
//!
//! Every conditional transition is a single guarded statement, so the check
//! and the write cannot be interleaved by another request. The unique
//! constraint on `(showtime_id, seat_row, seat_number)` makes claim creation
//! race-proof regardless.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use marquee_core::error::{AppError, ErrorKind};
use marquee_core::result::AppResult;
use marquee_core::types::id::{CustomerId, SeatClaimId, ShowtimeId};
use marquee_entity::seat::{ClaimUpdate, SeatClaim, SeatId, SeatStatus};

/// Repository for seat claim rows.
#[derive(Debug, Clone)]
pub struct SeatClaimRepository {
    pool: PgPool,
}

impl SeatClaimRepository {
    /// Create a new seat claim repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a fresh claim in the given status, unless the pair already has
    /// a row. Returns `None` when the unique constraint absorbed the insert.
    pub async fn insert_if_absent(
        &self,
        showtime: ShowtimeId,
        seat: &SeatId,
        status: SeatStatus,
        customer: CustomerId,
        lock_expires_at: Option<DateTime<Utc>>,
    ) -> AppResult<Option<SeatClaim>> {
        sqlx::query_as::<_, SeatClaim>(
            "INSERT INTO seat_claims \
             (showtime_id, seat_row, seat_number, status, customer_id, lock_expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT ON CONSTRAINT seat_claims_showtime_seat_key DO NOTHING \
             RETURNING *",
        )
        .bind(showtime)
        .bind(&seat.row)
        .bind(&seat.number)
        .bind(status)
        .bind(customer)
        .bind(lock_expires_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert seat claim", e))
    }

    /// Move an existing claim to `booked` for `customer`, if it is currently
    /// takeable: available, reserved-but-expired, or reserved by the same
    /// customer. Returns `None` when the guard rejected the transition.
    pub async fn book_existing(
        &self,
        showtime: ShowtimeId,
        seat: &SeatId,
        customer: CustomerId,
    ) -> AppResult<Option<SeatClaim>> {
        sqlx::query_as::<_, SeatClaim>(
            "UPDATE seat_claims \
             SET status = 'booked', customer_id = $4, lock_expires_at = NULL, \
                 version = version + 1, updated_at = NOW() \
             WHERE showtime_id = $1 AND seat_row = $2 AND seat_number = $3 \
               AND (status = 'available' \
                    OR (status = 'reserved' \
                        AND (lock_expires_at <= NOW() OR customer_id = $4))) \
             RETURNING *",
        )
        .bind(showtime)
        .bind(&seat.row)
        .bind(&seat.number)
        .bind(customer)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to book seat claim", e))
    }

    /// Move an existing claim to `reserved` with a fresh expiry, under the
    /// same takeability guard as [`book_existing`]. Re-acquisition by the
    /// current holder extends the hold.
    pub async fn reserve_existing(
        &self,
        showtime: ShowtimeId,
        seat: &SeatId,
        customer: CustomerId,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Option<SeatClaim>> {
        sqlx::query_as::<_, SeatClaim>(
            "UPDATE seat_claims \
             SET status = 'reserved', customer_id = $4, lock_expires_at = $5, \
                 version = version + 1, updated_at = NOW() \
             WHERE showtime_id = $1 AND seat_row = $2 AND seat_number = $3 \
               AND (status = 'available' \
                    OR (status = 'reserved' \
                        AND (lock_expires_at <= NOW() OR customer_id = $4))) \
             RETURNING *",
        )
        .bind(showtime)
        .bind(&seat.row)
        .bind(&seat.number)
        .bind(customer)
        .bind(expires_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to reserve seat claim", e))
    }

    /// Release a claim back to `available`, only while it sits in `from`
    /// status and is owned by `customer`. Returns whether a row changed.
    pub async fn release_if_owner(
        &self,
        showtime: ShowtimeId,
        seat: &SeatId,
        customer: CustomerId,
        from: SeatStatus,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE seat_claims \
             SET status = 'available', customer_id = NULL, lock_expires_at = NULL, \
                 version = version + 1, updated_at = NOW() \
             WHERE showtime_id = $1 AND seat_row = $2 AND seat_number = $3 \
               AND status = $4 AND customer_id = $5",
        )
        .bind(showtime)
        .bind(&seat.row)
        .bind(&seat.number)
        .bind(from)
        .bind(customer)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to release seat claim", e)
        })?;

        Ok(result.rows_affected() > 0)
    }

    /// Apply a full-state patch, guarded by the expected version. Returns
    /// `None` when the stored version has moved on.
    pub async fn update_with_version(
        &self,
        claim_id: SeatClaimId,
        update: &ClaimUpdate,
        expected_version: i64,
    ) -> AppResult<Option<SeatClaim>> {
        sqlx::query_as::<_, SeatClaim>(
            "UPDATE seat_claims \
             SET status = $2, customer_id = $3, lock_expires_at = $4, \
                 version = version + 1, updated_at = NOW() \
             WHERE id = $1 AND version = $5 \
             RETURNING *",
        )
        .bind(claim_id)
        .bind(update.status)
        .bind(update.customer_id)
        .bind(update.lock_expires_at)
        .bind(expected_version)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update seat claim", e)
        })
    }

    /// Find a claim by its unique pair.
    pub async fn find_by_pair(
        &self,
        showtime: ShowtimeId,
        seat: &SeatId,
    ) -> AppResult<Option<SeatClaim>> {
        sqlx::query_as::<_, SeatClaim>(
            "SELECT * FROM seat_claims \
             WHERE showtime_id = $1 AND seat_row = $2 AND seat_number = $3",
        )
        .bind(showtime)
        .bind(&seat.row)
        .bind(&seat.number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find seat claim", e))
    }

    /// Find a claim by ID.
    pub async fn find_by_id(&self, claim_id: SeatClaimId) -> AppResult<Option<SeatClaim>> {
        sqlx::query_as::<_, SeatClaim>("SELECT * FROM seat_claims WHERE id = $1")
            .bind(claim_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find seat claim", e)
            })
    }

    /// Count booked claims for a showtime.
    pub async fn count_booked(&self, showtime: ShowtimeId) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM seat_claims WHERE showtime_id = $1 AND status = 'booked'",
        )
        .bind(showtime)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count booked claims", e)
        })
    }
}
