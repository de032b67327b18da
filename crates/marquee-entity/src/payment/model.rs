//! Payment entity model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use marquee_core::types::id::{PaymentId, TicketId};

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_method", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    /// Paid at the box office.
    Cash,
    /// Paid by card at the box office.
    Card,
    /// Paid through the online booking flow.
    Online,
}

/// Settlement state of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    /// Capture not yet attempted.
    Pending,
    /// Funds captured.
    Completed,
    /// Capture failed.
    Failed,
    /// Funds returned after cancellation.
    Refunded,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Failed => write!(f, "FAILED"),
            Self::Refunded => write!(f, "REFUNDED"),
        }
    }
}

/// The financial status record associated 1:1 with a ticket.
///
/// No payment gateway is modeled; the booking flow records the capture as
/// already settled and the cancellation flow flips it to refunded.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    /// Unique payment identifier.
    pub id: PaymentId,
    /// The ticket this payment settles.
    pub ticket_id: TicketId,
    /// Amount in cents; equals the showtime's price at booking time.
    pub amount_cents: i64,
    /// How the payment was made.
    pub method: PaymentMethod,
    /// Current settlement state.
    pub status: PaymentStatus,
    /// When the payment was recorded.
    pub paid_at: DateTime<Utc>,
    /// When the payment row was created.
    pub created_at: DateTime<Utc>,
    /// When the payment row was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a new payment record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePayment {
    /// The ticket this payment settles.
    pub ticket_id: TicketId,
    /// Amount in cents.
    pub amount_cents: i64,
    /// How the payment was made.
    pub method: PaymentMethod,
    /// Initial settlement state.
    pub status: PaymentStatus,
}
