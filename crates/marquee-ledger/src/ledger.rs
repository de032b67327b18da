//! Seat ledger trait.

use async_trait::async_trait;

use marquee_core::AppResult;
use marquee_core::types::id::{CustomerId, SeatClaimId, ShowtimeId};
use marquee_entity::seat::{ClaimUpdate, SeatClaim, SeatId};

/// Exclusive seat-claim acquisition for one showtime.
///
/// Implementations must guarantee that for any `(showtime, seat)` pair at
/// most one claim exists and at most one caller can move it to `Booked`:
/// when two callers race, exactly one wins and the other receives a
/// deterministic seat-conflict error, never a silent overwrite. The pair is
/// a unique key at the storage layer, which backstops the lock/version
/// protocol even if a caller skips it.
///
/// Two implementations are provided: PostgreSQL (unique index plus guarded
/// single-statement updates) and in-memory (sharded map, single-node
/// deployments and tests).
#[async_trait]
pub trait SeatLedger: Send + Sync + std::fmt::Debug {
    /// Atomically claim a seat as `Booked` for `customer`.
    ///
    /// The primary booking path: creates the claim row if the pair has never
    /// been claimed, or revives an existing row that is `Available`, expired
    /// `Reserved`, or `Reserved` by this same customer. Every other state is
    /// a seat-conflict error.
    async fn claim_seat(
        &self,
        showtime: ShowtimeId,
        seat: &SeatId,
        customer: CustomerId,
    ) -> AppResult<SeatClaim>;

    /// Acquire a pessimistic time-boxed hold (`Reserved`) on a seat.
    ///
    /// Succeeds only if no live hold is owned by another customer; a hold
    /// whose TTL has passed is treated as free at acquisition time, without
    /// any background sweep. Re-acquisition by the current holder extends
    /// the expiry.
    async fn acquire_lock(
        &self,
        showtime: ShowtimeId,
        seat: &SeatId,
        customer: CustomerId,
        ttl: chrono::Duration,
    ) -> AppResult<SeatClaim>;

    /// Release a hold, only if `customer` currently owns it.
    ///
    /// Returns `true` if a hold was released. A release attempt against a
    /// hold owned by someone else (or no hold at all) is a logged no-op, so
    /// a late caller cannot free a seat out from under the current holder.
    async fn release_lock(
        &self,
        showtime: ShowtimeId,
        seat: &SeatId,
        customer: CustomerId,
    ) -> AppResult<bool>;

    /// Apply a full-state patch to a claim, guarded by its version.
    ///
    /// The patch is applied and the version incremented only if the stored
    /// version still equals `expected_version`; otherwise a stale-write
    /// error tells the caller to reread and retry.
    async fn update_with_version(
        &self,
        claim_id: SeatClaimId,
        update: ClaimUpdate,
        expected_version: i64,
    ) -> AppResult<SeatClaim>;

    /// Release a booked claim back to `Available`, only if `customer` owns it.
    ///
    /// Used by cancellation and by booking rollback. Returns `true` if the
    /// claim was released; a miss is logged and reported as `false`.
    async fn release_claim(
        &self,
        showtime: ShowtimeId,
        seat: &SeatId,
        customer: CustomerId,
    ) -> AppResult<bool>;

    /// Look up the claim for a `(showtime, seat)` pair, if one exists.
    async fn find_claim(&self, showtime: ShowtimeId, seat: &SeatId)
    -> AppResult<Option<SeatClaim>>;

    /// Count booked claims for a showtime. Used by the reconciler.
    async fn booked_count(&self, showtime: ShowtimeId) -> AppResult<u32>;
}
