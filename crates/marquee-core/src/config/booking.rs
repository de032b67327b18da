//! Booking policy configuration.

use serde::{Deserialize, Serialize};

/// Booking policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    /// How long a pessimistic seat hold stays valid, in minutes.
    #[serde(default = "default_seat_hold_ttl")]
    pub seat_hold_ttl_minutes: i64,
    /// Cancellations are rejected when the showtime starts within this many
    /// hours. Fixed policy, no per-request override.
    #[serde(default = "default_cancellation_cutoff")]
    pub cancellation_cutoff_hours: i64,
    /// How many times a version-conflicted claim write is retried before the
    /// conflict is surfaced to the caller.
    #[serde(default = "default_max_conflict_retries")]
    pub max_conflict_retries: u32,
}

impl BookingConfig {
    /// The seat hold TTL as a [`chrono::Duration`].
    pub fn seat_hold_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.seat_hold_ttl_minutes)
    }

    /// The cancellation cutoff as a [`chrono::Duration`].
    pub fn cancellation_cutoff(&self) -> chrono::Duration {
        chrono::Duration::hours(self.cancellation_cutoff_hours)
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            seat_hold_ttl_minutes: default_seat_hold_ttl(),
            cancellation_cutoff_hours: default_cancellation_cutoff(),
            max_conflict_retries: default_max_conflict_retries(),
        }
    }
}

fn default_seat_hold_ttl() -> i64 {
    15
}

fn default_cancellation_cutoff() -> i64 {
    2
}

fn default_max_conflict_retries() -> u32 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BookingConfig::default();
        assert_eq!(config.seat_hold_ttl(), chrono::Duration::minutes(15));
        assert_eq!(config.cancellation_cutoff(), chrono::Duration::hours(2));
        assert_eq!(config.max_conflict_retries, 3);
    }
}
