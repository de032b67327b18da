//! Payment repository implementation.

use sqlx::PgPool;

use marquee_core::error::{AppError, ErrorKind};
use marquee_core::result::AppResult;
use marquee_core::types::id::{PaymentId, TicketId};
use marquee_entity::payment::{CreatePayment, Payment, PaymentStatus};

/// Repository for payment rows.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    /// Create a new payment repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new payment record.
    pub async fn create(&self, data: &CreatePayment) -> AppResult<Payment> {
        sqlx::query_as::<_, Payment>(
            "INSERT INTO payments (ticket_id, amount_cents, method, status) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(data.ticket_id)
        .bind(data.amount_cents)
        .bind(data.method)
        .bind(data.status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create payment", e))
    }

    /// Find the payment settling a ticket, if any.
    pub async fn find_by_ticket(&self, ticket_id: TicketId) -> AppResult<Option<Payment>> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE ticket_id = $1")
            .bind(ticket_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find payment", e))
    }

    /// Transition the payment for a ticket to a new settlement state.
    /// Returns whether a row changed.
    pub async fn set_status_by_ticket(
        &self,
        ticket_id: TicketId,
        status: PaymentStatus,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE payments SET status = $2, updated_at = NOW() WHERE ticket_id = $1",
        )
        .bind(ticket_id)
        .bind(status)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update payment status", e)
        })?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a payment row.
    ///
    /// Compensating rollback only; cancellation marks the payment refunded.
    pub async fn delete(&self, id: PaymentId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete payment", e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}
