//! Ticket repository implementation.

use sqlx::PgPool;

use marquee_core::error::{AppError, ErrorKind};
use marquee_core::result::AppResult;
use marquee_core::types::id::{CustomerId, ShowtimeId, TicketId};
use marquee_entity::booking::TicketView;
use marquee_entity::seat::SeatId;
use marquee_entity::ticket::{CreateTicket, Ticket, TicketStatus};

/// Repository for ticket rows.
#[derive(Debug, Clone)]
pub struct TicketRepository {
    pool: PgPool,
}

impl TicketRepository {
    /// Create a new ticket repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new ticket.
    pub async fn create(&self, data: &CreateTicket) -> AppResult<Ticket> {
        sqlx::query_as::<_, Ticket>(
            "INSERT INTO tickets \
             (showtime_id, customer_id, claim_id, seat_row, seat_number, price_cents, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(data.showtime_id)
        .bind(data.customer_id)
        .bind(data.claim_id)
        .bind(&data.seat_row)
        .bind(&data.seat_number)
        .bind(data.price_cents)
        .bind(data.status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create ticket", e))
    }

    /// Find a ticket by ID.
    pub async fn find_by_id(&self, id: TicketId) -> AppResult<Option<Ticket>> {
        sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find ticket", e))
    }

    /// Find the active (non-cancelled) ticket covering a seat, if any.
    pub async fn find_active_by_seat(
        &self,
        showtime: ShowtimeId,
        seat: &SeatId,
    ) -> AppResult<Option<Ticket>> {
        sqlx::query_as::<_, Ticket>(
            "SELECT * FROM tickets \
             WHERE showtime_id = $1 AND seat_row = $2 AND seat_number = $3 \
               AND status != 'cancelled' \
             LIMIT 1",
        )
        .bind(showtime)
        .bind(&seat.row)
        .bind(&seat.number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find active ticket", e))
    }

    /// List a customer's tickets joined with their payment status, newest
    /// first. A fresh query each call.
    pub async fn views_by_customer(&self, customer: CustomerId) -> AppResult<Vec<TicketView>> {
        sqlx::query_as::<_, TicketView>(
            "SELECT t.id, t.showtime_id, t.seat_row, t.seat_number, t.price_cents, \
                    t.status, t.purchased_at, p.status AS payment_status \
             FROM tickets t \
             LEFT JOIN payments p ON p.ticket_id = t.id \
             WHERE t.customer_id = $1 \
             ORDER BY t.purchased_at DESC",
        )
        .bind(customer)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list tickets", e))
    }

    /// Transition a ticket's status. Returns whether a row changed.
    pub async fn set_status(&self, id: TicketId, status: TicketStatus) -> AppResult<bool> {
        let result =
            sqlx::query("UPDATE tickets SET status = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(status)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to update ticket status", e)
                })?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a ticket row.
    ///
    /// Compensating rollback only; cancellation is a status transition.
    pub async fn delete(&self, id: TicketId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM tickets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete ticket", e))?;

        Ok(result.rows_affected() > 0)
    }

    /// Count active (non-cancelled) tickets for a showtime.
    pub async fn count_active_by_showtime(&self, showtime: ShowtimeId) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tickets WHERE showtime_id = $1 AND status != 'cancelled'",
        )
        .bind(showtime)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count active tickets", e)
        })
    }
}
