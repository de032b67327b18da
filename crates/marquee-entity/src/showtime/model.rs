//! Showtime entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use marquee_core::types::id::{MovieId, ShowtimeId, TheaterId};

/// A scheduled screening of a movie in a specific theater.
///
/// `available_seats` is a denormalized counter over the showtime's active
/// tickets. It is mutated only by the booking core (decrement on booking,
/// increment on cancellation) and by the availability reconciler.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Showtime {
    /// Unique showtime identifier.
    pub id: ShowtimeId,
    /// The movie being screened.
    pub movie_id: MovieId,
    /// The theater hosting the screening.
    pub theater_id: TheaterId,
    /// When the screening starts.
    pub start_time: DateTime<Utc>,
    /// When the screening ends.
    pub end_time: DateTime<Utc>,
    /// Ticket price in cents.
    pub price_cents: i64,
    /// Physical seat capacity of the theater, denormalized at creation time.
    pub theater_capacity: i32,
    /// Seats not covered by an active ticket.
    ///
    /// Invariant: `0 <= available_seats <= theater_capacity`.
    pub available_seats: i32,
    /// When the showtime was created.
    pub created_at: DateTime<Utc>,
    /// When the showtime was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Showtime {
    /// Time remaining until the screening starts, relative to `now`.
    ///
    /// Negative once the screening has started.
    pub fn time_until_start(&self, now: DateTime<Utc>) -> chrono::Duration {
        self.start_time - now
    }

    /// Whether any seats remain available according to the counter.
    pub fn has_availability(&self) -> bool {
        self.available_seats > 0
    }

    /// The counter value implied by the given number of active tickets.
    pub fn expected_available(&self, active_tickets: i64) -> i32 {
        self.theater_capacity - active_tickets as i32
    }

    /// Whether the stored counter agrees with the active-ticket count.
    pub fn availability_consistent(&self, active_tickets: i64) -> bool {
        self.available_seats == self.expected_available(active_tickets)
    }
}

/// Data required to create a new showtime.
///
/// Showtime management belongs to the (out-of-scope) catalog layer; this
/// input type exists for seeding and tests. `available_seats` starts at the
/// theater capacity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateShowtime {
    /// The movie being screened.
    pub movie_id: MovieId,
    /// The theater hosting the screening.
    pub theater_id: TheaterId,
    /// When the screening starts.
    pub start_time: DateTime<Utc>,
    /// When the screening ends.
    pub end_time: DateTime<Utc>,
    /// Ticket price in cents.
    pub price_cents: i64,
    /// Physical seat capacity of the theater.
    pub theater_capacity: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn showtime(capacity: i32, available: i32) -> Showtime {
        let now = Utc::now();
        Showtime {
            id: ShowtimeId::new(),
            movie_id: MovieId::new(),
            theater_id: TheaterId::new(),
            start_time: now + chrono::Duration::hours(6),
            end_time: now + chrono::Duration::hours(8),
            price_cents: 1250,
            theater_capacity: capacity,
            available_seats: available,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_availability_consistency() {
        let st = showtime(100, 97);
        assert!(st.availability_consistent(3));
        assert!(!st.availability_consistent(2));
        assert_eq!(st.expected_available(3), 97);
    }

    #[test]
    fn test_time_until_start() {
        let st = showtime(50, 50);
        let now = st.start_time - chrono::Duration::hours(2);
        assert_eq!(st.time_until_start(now), chrono::Duration::hours(2));
        let after = st.start_time + chrono::Duration::minutes(1);
        assert!(st.time_until_start(after) < chrono::Duration::zero());
    }
}
