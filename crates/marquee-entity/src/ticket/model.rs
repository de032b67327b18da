//! Ticket entity model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use marquee_core::AppError;
use marquee_core::types::id::{CustomerId, SeatClaimId, ShowtimeId, TicketId};

use crate::seat::SeatId;

/// Lifecycle state of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ticket_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    /// Created but not yet confirmed.
    Pending,
    /// Purchased; the seat claim is booked.
    Confirmed,
    /// Cancelled; the seat claim has been released.
    ///
    /// Cancellation is a status transition, never a row deletion, so seat
    /// collision history and reporting stay consistent.
    Cancelled,
}

impl TicketStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether a ticket in this status still occupies its seat.
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(AppError::validation(format!(
                "Invalid ticket status: '{s}'. Expected one of: pending, confirmed, cancelled"
            ))),
        }
    }
}

/// A customer's purchased right to occupy one seat at one showtime.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    /// Unique ticket identifier.
    pub id: TicketId,
    /// The showtime this ticket is for.
    pub showtime_id: ShowtimeId,
    /// The purchasing customer.
    pub customer_id: CustomerId,
    /// The seat claim backing this ticket.
    pub claim_id: SeatClaimId,
    /// Row label, denormalized from the claim for queries and views.
    pub seat_row: String,
    /// Seat number, denormalized from the claim.
    pub seat_number: String,
    /// Price charged in cents; equals the showtime's price at booking time.
    pub price_cents: i64,
    /// Current lifecycle state.
    pub status: TicketStatus,
    /// When the ticket was purchased.
    pub purchased_at: DateTime<Utc>,
    /// When the ticket row was created.
    pub created_at: DateTime<Utc>,
    /// When the ticket row was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Whether the ticket still occupies its seat.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// The seat identity this ticket covers.
    pub fn seat(&self) -> SeatId {
        SeatId::new(self.seat_row.clone(), self.seat_number.clone())
    }
}

/// Data required to create a new ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTicket {
    /// The showtime this ticket is for.
    pub showtime_id: ShowtimeId,
    /// The purchasing customer.
    pub customer_id: CustomerId,
    /// The seat claim backing this ticket.
    pub claim_id: SeatClaimId,
    /// Row label of the covered seat.
    pub seat_row: String,
    /// Seat number of the covered seat.
    pub seat_number: String,
    /// Price charged in cents.
    pub price_cents: i64,
    /// Initial lifecycle state.
    pub status: TicketStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_activity() {
        assert!(TicketStatus::Pending.is_active());
        assert!(TicketStatus::Confirmed.is_active());
        assert!(!TicketStatus::Cancelled.is_active());
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!(
            "confirmed".parse::<TicketStatus>().unwrap(),
            TicketStatus::Confirmed
        );
        assert_eq!(
            "CANCELLED".parse::<TicketStatus>().unwrap(),
            TicketStatus::Cancelled
        );
        assert!("refunded".parse::<TicketStatus>().is_err());
    }
}
