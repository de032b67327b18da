//! Availability reconciliation between the counter and ground truth.
//!
//! Detects and corrects drift caused by crashes, failed compensations, or
//! bugs. The schedule that invokes this (startup recovery, periodic job)
//! lives outside the booking core.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use marquee_core::error::AppError;
use marquee_core::result::AppResult;
use marquee_core::types::id::ShowtimeId;
use marquee_ledger::SeatLedger;

use crate::store::BookingStore;

/// Outcome of reconciling one showtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftReport {
    /// The reconciled showtime.
    pub showtime_id: ShowtimeId,
    /// Authoritative theater capacity.
    pub theater_capacity: i32,
    /// Counter value found in the store.
    pub stored_available: i32,
    /// Counter value implied by the active tickets.
    pub expected_available: i32,
    /// Active (non-cancelled) tickets.
    pub active_tickets: i64,
    /// Booked claims in the seat ledger.
    pub booked_claims: u32,
    /// Whether the stored counter disagreed with ground truth.
    pub drift_detected: bool,
    /// Whether the counter was overwritten with the expected value.
    pub healed: bool,
}

/// Reconciles showtime availability counters with the ticket set.
#[derive(Clone)]
pub struct AvailabilityReconciler {
    /// Ticket and showtime persistence.
    store: Arc<dyn BookingStore>,
    /// Seat ledger, cross-checked against the ticket count.
    ledger: Arc<dyn SeatLedger>,
}

impl std::fmt::Debug for AvailabilityReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvailabilityReconciler").finish()
    }
}

impl AvailabilityReconciler {
    /// Creates a new availability reconciler.
    pub fn new(store: Arc<dyn BookingStore>, ledger: Arc<dyn SeatLedger>) -> Self {
        Self { store, ledger }
    }

    /// Performs a full reconciliation cycle for one showtime:
    ///
    /// 1. Recompute `capacity - active tickets` from ground truth.
    /// 2. Compare with the stored counter.
    /// 3. If they disagree, overwrite the counter and report the drift.
    /// 4. Cross-check the ledger's booked-claim count against the tickets.
    pub async fn reconcile_showtime(&self, id: ShowtimeId) -> AppResult<DriftReport> {
        let showtime = self
            .store
            .get_showtime(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Showtime {id} not found")))?;

        // Prefer the directory's capacity over the denormalized copy.
        let capacity = self
            .store
            .theater_capacity(showtime.theater_id)
            .await?
            .unwrap_or(showtime.theater_capacity);

        let active_tickets = self.store.count_active_tickets(id).await?;
        let booked_claims = self.ledger.booked_count(id).await?;

        let expected = capacity - active_tickets as i32;
        let drift_detected = showtime.available_seats != expected;
        let mut healed = false;

        if drift_detected {
            warn!(
                showtime = %id,
                stored = showtime.available_seats,
                expected,
                active_tickets,
                "Availability drift detected, healing counter"
            );
            healed = self.store.set_available_seats(id, expected).await?;
            if healed {
                info!(showtime = %id, available_seats = expected, "Availability counter healed");
            }
        }

        if i64::from(booked_claims) != active_tickets {
            warn!(
                showtime = %id,
                booked_claims,
                active_tickets,
                "Booked claims diverge from active tickets"
            );
        }

        Ok(DriftReport {
            showtime_id: id,
            theater_capacity: capacity,
            stored_available: showtime.available_seats,
            expected_available: expected,
            active_tickets,
            booked_claims,
            drift_detected,
            healed,
        })
    }
}
