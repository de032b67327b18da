//! In-memory seat ledger for single-node deployments and tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{info, warn};

use marquee_core::error::AppError;
use marquee_core::result::AppResult;
use marquee_core::types::id::{CustomerId, SeatClaimId, ShowtimeId};
use marquee_entity::seat::{ClaimUpdate, SeatClaim, SeatId, SeatStatus};

use crate::ledger::SeatLedger;

/// In-memory seat ledger backed by a sharded concurrent map.
///
/// The `(showtime, seat)` pair is the map key, so the structural uniqueness
/// the ledger contract requires holds by construction. Conditional
/// transitions run under the map's per-shard entry lock, which makes each
/// check-and-write atomic with respect to other callers of the same seat.
///
/// Suitable for single-node deployments only.
#[derive(Debug, Clone, Default)]
pub struct MemorySeatLedger {
    /// All claim rows, keyed by their unique pair.
    claims: Arc<DashMap<(ShowtimeId, SeatId), SeatClaim>>,
}

impl MemorySeatLedger {
    /// Creates an empty in-memory seat ledger.
    pub fn new() -> Self {
        Self::default()
    }

    fn new_claim(
        showtime: ShowtimeId,
        seat: &SeatId,
        status: SeatStatus,
        customer: CustomerId,
        lock_expires_at: Option<chrono::DateTime<Utc>>,
    ) -> SeatClaim {
        let now = Utc::now();
        SeatClaim {
            id: SeatClaimId::new(),
            showtime_id: showtime,
            seat_row: seat.row.clone(),
            seat_number: seat.number.clone(),
            status,
            customer_id: Some(customer),
            version: 1,
            lock_expires_at,
            created_at: now,
            updated_at: now,
        }
    }
}

#[async_trait]
impl SeatLedger for MemorySeatLedger {
    async fn claim_seat(
        &self,
        showtime: ShowtimeId,
        seat: &SeatId,
        customer: CustomerId,
    ) -> AppResult<SeatClaim> {
        let now = Utc::now();

        match self.claims.entry((showtime, seat.clone())) {
            Entry::Vacant(slot) => {
                let claim =
                    Self::new_claim(showtime, seat, SeatStatus::Booked, customer, None);
                slot.insert(claim.clone());
                info!(showtime = %showtime, seat = %seat, customer = %customer, "Seat claimed");
                Ok(claim)
            }
            Entry::Occupied(mut slot) => {
                let claim = slot.get_mut();
                match claim.status {
                    SeatStatus::Booked => Err(AppError::seat_conflict(format!(
                        "Seat {seat} is already booked"
                    ))),
                    SeatStatus::Reserved
                        if claim.hold_active(now) && !claim.held_by(customer) =>
                    {
                        Err(AppError::seat_conflict(format!(
                            "Seat {seat} is currently being booked by another customer"
                        )))
                    }
                    // Available, expired hold, or the customer's own hold.
                    _ => {
                        claim.status = SeatStatus::Booked;
                        claim.customer_id = Some(customer);
                        claim.lock_expires_at = None;
                        claim.version += 1;
                        claim.updated_at = now;
                        info!(
                            showtime = %showtime,
                            seat = %seat,
                            customer = %customer,
                            version = claim.version,
                            "Seat claim revived as booked"
                        );
                        Ok(claim.clone())
                    }
                }
            }
        }
    }

    async fn acquire_lock(
        &self,
        showtime: ShowtimeId,
        seat: &SeatId,
        customer: CustomerId,
        ttl: chrono::Duration,
    ) -> AppResult<SeatClaim> {
        let now = Utc::now();
        let expires = now + ttl;

        match self.claims.entry((showtime, seat.clone())) {
            Entry::Vacant(slot) => {
                let claim = Self::new_claim(
                    showtime,
                    seat,
                    SeatStatus::Reserved,
                    customer,
                    Some(expires),
                );
                slot.insert(claim.clone());
                info!(showtime = %showtime, seat = %seat, customer = %customer, "Seat hold acquired");
                Ok(claim)
            }
            Entry::Occupied(mut slot) => {
                let claim = slot.get_mut();
                match claim.status {
                    SeatStatus::Booked => Err(AppError::seat_conflict(format!(
                        "Seat {seat} is already booked"
                    ))),
                    SeatStatus::Reserved
                        if claim.hold_active(now) && !claim.held_by(customer) =>
                    {
                        Err(AppError::seat_conflict(format!(
                            "Seat {seat} is locked by another customer"
                        )))
                    }
                    _ => {
                        claim.status = SeatStatus::Reserved;
                        claim.customer_id = Some(customer);
                        claim.lock_expires_at = Some(expires);
                        claim.version += 1;
                        claim.updated_at = now;
                        Ok(claim.clone())
                    }
                }
            }
        }
    }

    async fn release_lock(
        &self,
        showtime: ShowtimeId,
        seat: &SeatId,
        customer: CustomerId,
    ) -> AppResult<bool> {
        if let Some(mut slot) = self.claims.get_mut(&(showtime, seat.clone())) {
            if matches!(slot.status, SeatStatus::Reserved) && slot.held_by(customer) {
                slot.status = SeatStatus::Available;
                slot.customer_id = None;
                slot.lock_expires_at = None;
                slot.version += 1;
                slot.updated_at = Utc::now();
                info!(showtime = %showtime, seat = %seat, customer = %customer, "Seat hold released");
                return Ok(true);
            }
        }

        warn!(
            showtime = %showtime,
            seat = %seat,
            customer = %customer,
            "Attempted to release a hold not owned by the caller"
        );
        Ok(false)
    }

    async fn update_with_version(
        &self,
        claim_id: SeatClaimId,
        update: ClaimUpdate,
        expected_version: i64,
    ) -> AppResult<SeatClaim> {
        let key = self
            .claims
            .iter()
            .find(|entry| entry.value().id == claim_id)
            .map(|entry| entry.key().clone());

        let Some(key) = key else {
            return Err(AppError::not_found(format!("Seat claim {claim_id} not found")));
        };

        let Some(mut slot) = self.claims.get_mut(&key) else {
            return Err(AppError::not_found(format!("Seat claim {claim_id} not found")));
        };

        // The version guard is the real check; the lookup above only located
        // the key, and a concurrent writer in between is caught here.
        if slot.version != expected_version {
            return Err(AppError::stale_write(format!(
                "Seat claim {claim_id} is at version {} (expected {expected_version})",
                slot.version
            )));
        }

        slot.status = update.status;
        slot.customer_id = update.customer_id;
        slot.lock_expires_at = update.lock_expires_at;
        slot.version += 1;
        slot.updated_at = Utc::now();
        Ok(slot.clone())
    }

    async fn release_claim(
        &self,
        showtime: ShowtimeId,
        seat: &SeatId,
        customer: CustomerId,
    ) -> AppResult<bool> {
        if let Some(mut slot) = self.claims.get_mut(&(showtime, seat.clone())) {
            if slot.is_booked() && slot.held_by(customer) {
                slot.status = SeatStatus::Available;
                slot.customer_id = None;
                slot.lock_expires_at = None;
                slot.version += 1;
                slot.updated_at = Utc::now();
                info!(showtime = %showtime, seat = %seat, customer = %customer, "Seat claim released");
                return Ok(true);
            }
        }

        warn!(
            showtime = %showtime,
            seat = %seat,
            customer = %customer,
            "Attempted to release a claim not booked by the caller"
        );
        Ok(false)
    }

    async fn find_claim(
        &self,
        showtime: ShowtimeId,
        seat: &SeatId,
    ) -> AppResult<Option<SeatClaim>> {
        Ok(self
            .claims
            .get(&(showtime, seat.clone()))
            .map(|entry| entry.value().clone()))
    }

    async fn booked_count(&self, showtime: ShowtimeId) -> AppResult<u32> {
        let count = self
            .claims
            .iter()
            .filter(|entry| entry.showtime_id == showtime && entry.is_booked())
            .count();
        Ok(count as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_core::error::ErrorKind;

    fn seat(label: (&str, &str)) -> SeatId {
        SeatId::new(label.0, label.1)
    }

    #[tokio::test]
    async fn test_claim_then_conflict() {
        let ledger = MemorySeatLedger::new();
        let showtime = ShowtimeId::new();
        let a1 = seat(("A", "1"));

        let claim = ledger
            .claim_seat(showtime, &a1, CustomerId::new())
            .await
            .unwrap();
        assert_eq!(claim.status, SeatStatus::Booked);
        assert_eq!(claim.version, 1);

        let err = ledger
            .claim_seat(showtime, &a1, CustomerId::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::SeatConflict);
    }

    #[tokio::test]
    async fn test_same_customer_is_rejected_like_anyone_else() {
        let ledger = MemorySeatLedger::new();
        let showtime = ShowtimeId::new();
        let customer = CustomerId::new();
        let a1 = seat(("A", "1"));

        ledger.claim_seat(showtime, &a1, customer).await.unwrap();
        let err = ledger.claim_seat(showtime, &a1, customer).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::SeatConflict);
    }

    #[tokio::test]
    async fn test_same_seat_on_other_showtime_is_independent() {
        let ledger = MemorySeatLedger::new();
        let a1 = seat(("A", "1"));

        ledger
            .claim_seat(ShowtimeId::new(), &a1, CustomerId::new())
            .await
            .unwrap();
        ledger
            .claim_seat(ShowtimeId::new(), &a1, CustomerId::new())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_lock_blocks_other_customers_until_expiry() {
        let ledger = MemorySeatLedger::new();
        let showtime = ShowtimeId::new();
        let holder = CustomerId::new();
        let other = CustomerId::new();
        let b2 = seat(("B", "2"));

        ledger
            .acquire_lock(showtime, &b2, holder, chrono::Duration::minutes(15))
            .await
            .unwrap();

        let err = ledger
            .acquire_lock(showtime, &b2, other, chrono::Duration::minutes(15))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::SeatConflict);

        let err = ledger.claim_seat(showtime, &b2, other).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::SeatConflict);
    }

    #[tokio::test]
    async fn test_expired_lock_is_logically_free() {
        let ledger = MemorySeatLedger::new();
        let showtime = ShowtimeId::new();
        let other = CustomerId::new();
        let b2 = seat(("B", "2"));

        // A hold that is already expired when the next caller arrives.
        ledger
            .acquire_lock(showtime, &b2, CustomerId::new(), chrono::Duration::zero())
            .await
            .unwrap();

        let claim = ledger.claim_seat(showtime, &b2, other).await.unwrap();
        assert_eq!(claim.status, SeatStatus::Booked);
        assert!(claim.held_by(other));
    }

    #[tokio::test]
    async fn test_holder_can_claim_own_reservation() {
        let ledger = MemorySeatLedger::new();
        let showtime = ShowtimeId::new();
        let customer = CustomerId::new();
        let c3 = seat(("C", "3"));

        let held = ledger
            .acquire_lock(showtime, &c3, customer, chrono::Duration::minutes(15))
            .await
            .unwrap();
        assert_eq!(held.status, SeatStatus::Reserved);

        let booked = ledger.claim_seat(showtime, &c3, customer).await.unwrap();
        assert_eq!(booked.status, SeatStatus::Booked);
        assert_eq!(booked.version, held.version + 1);
        assert!(booked.lock_expires_at.is_none());
    }

    #[tokio::test]
    async fn test_release_lock_requires_ownership() {
        let ledger = MemorySeatLedger::new();
        let showtime = ShowtimeId::new();
        let holder = CustomerId::new();
        let d4 = seat(("D", "4"));

        ledger
            .acquire_lock(showtime, &d4, holder, chrono::Duration::minutes(15))
            .await
            .unwrap();

        // A late caller cannot free someone else's hold.
        let released = ledger
            .release_lock(showtime, &d4, CustomerId::new())
            .await
            .unwrap();
        assert!(!released);

        let claim = ledger.find_claim(showtime, &d4).await.unwrap().unwrap();
        assert_eq!(claim.status, SeatStatus::Reserved);

        let released = ledger.release_lock(showtime, &d4, holder).await.unwrap();
        assert!(released);
    }

    #[tokio::test]
    async fn test_update_with_version_detects_stale_writes() {
        let ledger = MemorySeatLedger::new();
        let showtime = ShowtimeId::new();
        let customer = CustomerId::new();
        let e5 = seat(("E", "5"));

        let claim = ledger
            .acquire_lock(showtime, &e5, customer, chrono::Duration::minutes(15))
            .await
            .unwrap();

        let update = ClaimUpdate {
            status: SeatStatus::Booked,
            customer_id: Some(customer),
            lock_expires_at: None,
        };

        let updated = ledger
            .update_with_version(claim.id, update.clone(), claim.version)
            .await
            .unwrap();
        assert_eq!(updated.status, SeatStatus::Booked);
        assert_eq!(updated.version, claim.version + 1);

        // Retrying against the version we originally read must fail.
        let err = ledger
            .update_with_version(claim.id, update, claim.version)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::StaleWrite);
    }

    #[tokio::test]
    async fn test_release_claim_then_rebook() {
        let ledger = MemorySeatLedger::new();
        let showtime = ShowtimeId::new();
        let first = CustomerId::new();
        let second = CustomerId::new();
        let f6 = seat(("F", "6"));

        ledger.claim_seat(showtime, &f6, first).await.unwrap();
        assert_eq!(ledger.booked_count(showtime).await.unwrap(), 1);

        let released = ledger.release_claim(showtime, &f6, first).await.unwrap();
        assert!(released);
        assert_eq!(ledger.booked_count(showtime).await.unwrap(), 0);

        let claim = ledger.claim_seat(showtime, &f6, second).await.unwrap();
        assert!(claim.held_by(second));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_claims_have_exactly_one_winner() {
        let ledger = MemorySeatLedger::new();
        let showtime = ShowtimeId::new();
        let g7 = seat(("G", "7"));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let ledger = ledger.clone();
                let seat = g7.clone();
                tokio::spawn(async move {
                    ledger.claim_seat(showtime, &seat, CustomerId::new()).await
                })
            })
            .collect();

        let results = futures::future::join_all(tasks).await;
        let mut wins = 0;
        let mut conflicts = 0;
        for result in results {
            match result.expect("task panicked") {
                Ok(_) => wins += 1,
                Err(e) if e.kind == ErrorKind::SeatConflict => conflicts += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(wins, 1);
        assert_eq!(conflicts, 15);
        assert_eq!(ledger.booked_count(showtime).await.unwrap(), 1);
    }
}
