//! Seat claim entity model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use marquee_core::types::id::{CustomerId, SeatClaimId, ShowtimeId};

/// Identity of one physical seat within a theater: row plus number.
///
/// Seat identifiers are free-form strings; they are not validated against a
/// seat map (a 50-seat theater will accept a claim for "Z99").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeatId {
    /// Row label, e.g. "A".
    pub row: String,
    /// Seat number within the row, e.g. "1".
    pub number: String,
}

impl SeatId {
    /// Create a seat identity from row and number.
    pub fn new(row: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            row: row.into(),
            number: number.into(),
        }
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row, self.number)
    }
}

/// Lifecycle state of a seat claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "seat_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    /// No active claim; the seat can be taken.
    Available,
    /// Held under a time-boxed lock while a booking is in progress.
    Reserved,
    /// Exclusively owned by a confirmed ticket.
    Booked,
}

impl SeatStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Reserved => "reserved",
            Self::Booked => "booked",
        }
    }
}

impl fmt::Display for SeatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The exclusive-ownership record binding one seat to one showtime.
///
/// At most one claim row exists per `(showtime, seat)` pair; the pair is a
/// unique key at the storage layer. The `version` counter increases on every
/// mutation and guards optimistic updates.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SeatClaim {
    /// Unique claim identifier.
    pub id: SeatClaimId,
    /// The showtime this claim belongs to.
    pub showtime_id: ShowtimeId,
    /// Row label of the claimed seat.
    pub seat_row: String,
    /// Seat number of the claimed seat.
    pub seat_number: String,
    /// Current lifecycle state.
    pub status: SeatStatus,
    /// The customer holding the claim, if any.
    pub customer_id: Option<CustomerId>,
    /// Monotonically increasing version for optimistic writes.
    pub version: i64,
    /// When a pessimistic hold expires, if one is active.
    pub lock_expires_at: Option<DateTime<Utc>>,
    /// When the claim row was created.
    pub created_at: DateTime<Utc>,
    /// When the claim row was last updated.
    pub updated_at: DateTime<Utc>,
}

impl SeatClaim {
    /// The seat identity of this claim.
    pub fn seat(&self) -> SeatId {
        SeatId::new(self.seat_row.clone(), self.seat_number.clone())
    }

    /// Whether the claim is booked.
    pub fn is_booked(&self) -> bool {
        matches!(self.status, SeatStatus::Booked)
    }

    /// Whether the claim carries a hold that is still live at `now`.
    ///
    /// Expiry is evaluated by timestamp comparison at the point of use; an
    /// expired hold makes the seat logically free without any sweep.
    pub fn hold_active(&self, now: DateTime<Utc>) -> bool {
        matches!(self.status, SeatStatus::Reserved)
            && self.lock_expires_at.is_some_and(|expires| expires > now)
    }

    /// Whether the given customer currently owns this claim.
    pub fn held_by(&self, customer: CustomerId) -> bool {
        self.customer_id == Some(customer)
    }
}

/// Full-state patch applied to a claim by a version-guarded update.
///
/// All three mutable fields are always written; the claim's `version` is
/// incremented by the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimUpdate {
    /// New lifecycle state.
    pub status: SeatStatus,
    /// New owning customer, if any.
    pub customer_id: Option<CustomerId>,
    /// New hold expiry, if any.
    pub lock_expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim(status: SeatStatus, expires: Option<DateTime<Utc>>) -> SeatClaim {
        let now = Utc::now();
        SeatClaim {
            id: SeatClaimId::new(),
            showtime_id: ShowtimeId::new(),
            seat_row: "A".to_string(),
            seat_number: "1".to_string(),
            status,
            customer_id: Some(CustomerId::new()),
            version: 1,
            lock_expires_at: expires,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_seat_id_display() {
        assert_eq!(SeatId::new("A", "12").to_string(), "A12");
    }

    #[test]
    fn test_hold_expiry_is_evaluated_at_read_time() {
        let now = Utc::now();
        let live = claim(
            SeatStatus::Reserved,
            Some(now + chrono::Duration::minutes(10)),
        );
        assert!(live.hold_active(now));
        // The same claim is logically free once the TTL has passed.
        assert!(!live.hold_active(now + chrono::Duration::minutes(11)));
    }

    #[test]
    fn test_booked_claim_has_no_hold() {
        let now = Utc::now();
        let booked = claim(SeatStatus::Booked, None);
        assert!(booked.is_booked());
        assert!(!booked.hold_active(now));
    }

    #[test]
    fn test_held_by() {
        let c = claim(SeatStatus::Booked, None);
        let owner = c.customer_id.expect("owner set");
        assert!(c.held_by(owner));
        assert!(!c.held_by(CustomerId::new()));
    }
}
