//! PostgreSQL-backed seat ledger.

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};

use marquee_core::error::AppError;
use marquee_core::result::AppResult;
use marquee_core::types::id::{CustomerId, SeatClaimId, ShowtimeId};
use marquee_entity::seat::{ClaimUpdate, SeatClaim, SeatId, SeatStatus};
use marquee_ledger::SeatLedger;

use crate::repositories::seat_claim::SeatClaimRepository;

/// Seat ledger backed by the `seat_claims` table.
///
/// Claim creation rides on the unique `(showtime_id, seat_row, seat_number)`
/// constraint: a lost insert race surfaces as a deterministic seat-conflict
/// error, never a second row. All in-place transitions are single guarded
/// statements, so no check-then-act window exists at the storage layer.
#[derive(Debug, Clone)]
pub struct PgSeatLedger {
    repo: SeatClaimRepository,
}

impl PgSeatLedger {
    /// Create a Postgres seat ledger over the given repository.
    pub fn new(repo: SeatClaimRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl SeatLedger for PgSeatLedger {
    async fn claim_seat(
        &self,
        showtime: ShowtimeId,
        seat: &SeatId,
        customer: CustomerId,
    ) -> AppResult<SeatClaim> {
        // Insert-if-absent first: the constraint absorbs concurrent inserts
        // and exactly one caller gets the row back.
        if let Some(claim) = self
            .repo
            .insert_if_absent(showtime, seat, SeatStatus::Booked, customer, None)
            .await?
        {
            info!(showtime = %showtime, seat = %seat, customer = %customer, "Seat claimed");
            return Ok(claim);
        }

        // The pair already has a row; take it over only if it is takeable.
        if let Some(claim) = self.repo.book_existing(showtime, seat, customer).await? {
            info!(
                showtime = %showtime,
                seat = %seat,
                customer = %customer,
                version = claim.version,
                "Seat claim revived as booked"
            );
            return Ok(claim);
        }

        Err(AppError::seat_conflict(format!(
            "Seat {seat} is already booked"
        )))
    }

    async fn acquire_lock(
        &self,
        showtime: ShowtimeId,
        seat: &SeatId,
        customer: CustomerId,
        ttl: chrono::Duration,
    ) -> AppResult<SeatClaim> {
        let expires_at = Utc::now() + ttl;

        if let Some(claim) = self
            .repo
            .insert_if_absent(showtime, seat, SeatStatus::Reserved, customer, Some(expires_at))
            .await?
        {
            info!(showtime = %showtime, seat = %seat, customer = %customer, "Seat hold acquired");
            return Ok(claim);
        }

        if let Some(claim) = self
            .repo
            .reserve_existing(showtime, seat, customer, expires_at)
            .await?
        {
            return Ok(claim);
        }

        Err(AppError::seat_conflict(format!(
            "Seat {seat} is locked by another customer"
        )))
    }

    async fn release_lock(
        &self,
        showtime: ShowtimeId,
        seat: &SeatId,
        customer: CustomerId,
    ) -> AppResult<bool> {
        let released = self
            .repo
            .release_if_owner(showtime, seat, customer, SeatStatus::Reserved)
            .await?;

        if released {
            info!(showtime = %showtime, seat = %seat, customer = %customer, "Seat hold released");
        } else {
            warn!(
                showtime = %showtime,
                seat = %seat,
                customer = %customer,
                "Attempted to release a hold not owned by the caller"
            );
        }

        Ok(released)
    }

    async fn update_with_version(
        &self,
        claim_id: SeatClaimId,
        update: ClaimUpdate,
        expected_version: i64,
    ) -> AppResult<SeatClaim> {
        if let Some(claim) = self
            .repo
            .update_with_version(claim_id, &update, expected_version)
            .await?
        {
            return Ok(claim);
        }

        // Distinguish a stale version from a missing row.
        match self.repo.find_by_id(claim_id).await? {
            Some(current) => Err(AppError::stale_write(format!(
                "Seat claim {claim_id} is at version {} (expected {expected_version})",
                current.version
            ))),
            None => Err(AppError::not_found(format!(
                "Seat claim {claim_id} not found"
            ))),
        }
    }

    async fn release_claim(
        &self,
        showtime: ShowtimeId,
        seat: &SeatId,
        customer: CustomerId,
    ) -> AppResult<bool> {
        let released = self
            .repo
            .release_if_owner(showtime, seat, customer, SeatStatus::Booked)
            .await?;

        if released {
            info!(showtime = %showtime, seat = %seat, customer = %customer, "Seat claim released");
        } else {
            warn!(
                showtime = %showtime,
                seat = %seat,
                customer = %customer,
                "Attempted to release a claim not booked by the caller"
            );
        }

        Ok(released)
    }

    async fn find_claim(
        &self,
        showtime: ShowtimeId,
        seat: &SeatId,
    ) -> AppResult<Option<SeatClaim>> {
        self.repo.find_by_pair(showtime, seat).await
    }

    async fn booked_count(&self, showtime: ShowtimeId) -> AppResult<u32> {
        Ok(self.repo.count_booked(showtime).await? as u32)
    }
}
