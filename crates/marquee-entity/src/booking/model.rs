//! Booking request, confirmation, and ticket view types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use marquee_core::types::id::{ShowtimeId, TicketId};

use crate::payment::{Payment, PaymentStatus};
use crate::seat::SeatId;
use crate::ticket::{Ticket, TicketStatus};

/// Inbound request to book one seat for one showtime.
///
/// Seat identifiers are free-form; only their shape is validated.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BookingRequest {
    /// The showtime to book.
    pub showtime_id: ShowtimeId,
    /// Row label of the requested seat.
    #[validate(length(min = 1, max = 8, message = "seat row must be 1-8 characters"))]
    pub seat_row: String,
    /// Seat number of the requested seat.
    #[validate(length(min = 1, max = 8, message = "seat number must be 1-8 characters"))]
    pub seat_number: String,
}

impl BookingRequest {
    /// The seat identity being requested.
    pub fn seat(&self) -> SeatId {
        SeatId::new(self.seat_row.clone(), self.seat_number.clone())
    }
}

/// The composed result of a successful booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfirmation {
    /// The confirmed ticket.
    pub ticket: Ticket,
    /// The settled payment record.
    pub payment: Payment,
}

/// One element of a customer's ticket listing: the ticket flattened together
/// with its payment's settlement state.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TicketView {
    /// Ticket identifier.
    pub id: TicketId,
    /// The showtime the ticket is for.
    pub showtime_id: ShowtimeId,
    /// Row label of the covered seat.
    pub seat_row: String,
    /// Seat number of the covered seat.
    pub seat_number: String,
    /// Price charged in cents.
    pub price_cents: i64,
    /// Ticket lifecycle state.
    pub status: TicketStatus,
    /// When the ticket was purchased.
    pub purchased_at: DateTime<Utc>,
    /// Settlement state of the associated payment, if one exists.
    pub payment_status: Option<PaymentStatus>,
}

impl TicketView {
    /// Human-readable seat label, e.g. "A1".
    pub fn seat_label(&self) -> String {
        format!("{}{}", self.seat_row, self.seat_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape_validation() {
        let ok = BookingRequest {
            showtime_id: ShowtimeId::new(),
            seat_row: "A".to_string(),
            seat_number: "12".to_string(),
        };
        assert!(ok.validate().is_ok());

        let empty_row = BookingRequest {
            seat_row: String::new(),
            ..ok.clone()
        };
        assert!(empty_row.validate().is_err());

        let oversized = BookingRequest {
            seat_number: "123456789".to_string(),
            ..ok
        };
        assert!(oversized.validate().is_err());
    }

    #[test]
    fn test_seat_label() {
        let view = TicketView {
            id: TicketId::new(),
            showtime_id: ShowtimeId::new(),
            seat_row: "B".to_string(),
            seat_number: "7".to_string(),
            price_cents: 1000,
            status: TicketStatus::Confirmed,
            purchased_at: Utc::now(),
            payment_status: Some(PaymentStatus::Completed),
        };
        assert_eq!(view.seat_label(), "B7");
    }
}
