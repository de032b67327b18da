//! Booking lifecycle service: book, hold, cancel, and list flows.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use validator::Validate;

use marquee_core::config::booking::BookingConfig;
use marquee_core::error::AppError;
use marquee_core::result::AppResult;
use marquee_core::types::id::{CustomerId, TicketId};
use marquee_entity::booking::{BookingConfirmation, BookingRequest, TicketView};
use marquee_entity::payment::{CreatePayment, Payment, PaymentMethod, PaymentStatus};
use marquee_entity::seat::{SeatClaim, SeatId};
use marquee_entity::showtime::Showtime;
use marquee_entity::ticket::{CreateTicket, Ticket, TicketStatus};
use marquee_ledger::SeatLedger;

use crate::context::RequestContext;
use crate::store::BookingStore;

/// Orchestrates the booking and cancellation flows.
///
/// Both flows are all-or-nothing from the caller's perspective: any failure
/// after the first write triggers compensating actions in reverse order, and
/// a compensation that itself fails is logged as an inconsistency for the
/// reconciler to heal. Partial application is never an observable outcome.
#[derive(Clone)]
pub struct BookingService {
    /// Ticket, payment, and showtime persistence.
    store: Arc<dyn BookingStore>,
    /// Exclusive seat-claim acquisition.
    ledger: Arc<dyn SeatLedger>,
    /// Booking policy configuration.
    config: BookingConfig,
}

impl std::fmt::Debug for BookingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingService")
            .field("config", &self.config)
            .finish()
    }
}

impl BookingService {
    /// Creates a new booking service.
    pub fn new(
        store: Arc<dyn BookingStore>,
        ledger: Arc<dyn SeatLedger>,
        config: BookingConfig,
    ) -> Self {
        Self {
            store,
            ledger,
            config,
        }
    }

    /// Performs the complete booking flow:
    ///
    /// 1. Require an authenticated customer
    /// 2. Validate the request shape
    /// 3. Load the showtime
    /// 4. Advisory check for an existing active ticket on the seat
    /// 5. Claim the seat (the authoritative collision check)
    /// 6. Create the confirmed ticket at the showtime's price
    /// 7. Create the settled payment record
    /// 8. Decrement the availability counter
    ///
    /// Rolls back everything created after step 5 on any later failure. The
    /// check in step 4 is a fast path only: two requests can both pass it
    /// before either writes, which is exactly why step 5 goes through the
    /// seat ledger's structural uniqueness.
    pub async fn book_ticket(
        &self,
        ctx: &RequestContext,
        request: &BookingRequest,
    ) -> AppResult<BookingConfirmation> {
        // Step 1: caller identity
        let customer = ctx.require_customer()?;

        // Step 2: request shape
        request
            .validate()
            .map_err(|e| AppError::validation(format!("Invalid booking request: {e}")))?;
        let seat = request.seat();

        // Step 3: showtime lookup
        let showtime = self
            .store
            .get_showtime(request.showtime_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Showtime {} not found", request.showtime_id))
            })?;

        // Step 4: advisory duplicate check
        if self
            .store
            .find_active_ticket(showtime.id, &seat)
            .await?
            .is_some()
        {
            return Err(AppError::seat_conflict(format!(
                "Seat {seat} is already booked"
            )));
        }

        // Step 5: exclusive claim, retrying bounded version conflicts
        let claim = self.claim_with_retry(&showtime, &seat, customer).await?;

        // Steps 6-8, with the claim released again if any of them fail
        match self.finalize_booking(&showtime, &claim, customer).await {
            Ok(confirmation) => {
                info!(
                    customer = %customer,
                    showtime = %showtime.id,
                    seat = %seat,
                    ticket = %confirmation.ticket.id,
                    "Booking confirmed"
                );
                Ok(confirmation)
            }
            Err(e) => {
                error!(
                    customer = %customer,
                    showtime = %showtime.id,
                    seat = %seat,
                    error = %e,
                    "Booking failed after seat claim, rolling back"
                );
                self.release_claim_or_log(&showtime, &seat, customer).await;
                Err(e)
            }
        }
    }

    /// Performs the complete cancellation flow:
    ///
    /// 1. Require the authenticated owner of the ticket
    /// 2. Reject tickets that are already cancelled
    /// 3. Enforce the cancellation cutoff against the showtime start
    /// 4. Mark the ticket cancelled (status transition, never a delete)
    /// 5. Release the seat claim back to available
    /// 6. Mark the payment refunded
    /// 7. Increment the availability counter
    ///
    /// Steps 4-7 are compensated as a group: a failure re-books the claim,
    /// restores the payment, and flips the ticket back to confirmed.
    pub async fn cancel_booking(&self, ctx: &RequestContext, ticket_id: TicketId) -> AppResult<()> {
        // Step 1: ownership folded into the lookup, so someone else's ticket
        // is indistinguishable from a missing one.
        let customer = ctx.require_customer()?;
        let ticket = self
            .store
            .find_ticket(ticket_id)
            .await?
            .filter(|t| t.customer_id == customer)
            .ok_or_else(|| AppError::not_found(format!("Ticket {ticket_id} not found")))?;

        // Step 2: repeat cancellations
        if !ticket.is_active() {
            return Err(AppError::invalid_operation(format!(
                "Ticket {ticket_id} is already cancelled"
            )));
        }

        // Step 3: cutoff policy
        let showtime = self
            .store
            .get_showtime(ticket.showtime_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Showtime {} not found", ticket.showtime_id))
            })?;

        if showtime.time_until_start(Utc::now()) <= self.config.cancellation_cutoff() {
            return Err(AppError::invalid_operation(format!(
                "Cannot cancel a booking less than {} hours before the showtime",
                self.config.cancellation_cutoff_hours
            )));
        }

        // Step 4: status transition
        if !self
            .store
            .set_ticket_status(ticket.id, TicketStatus::Cancelled)
            .await?
        {
            return Err(AppError::internal(format!(
                "Ticket {ticket_id} vanished during cancellation"
            )));
        }

        // Steps 5-7, compensated as a group
        if let Err(e) = self.finalize_cancellation(&ticket, customer).await {
            error!(
                customer = %customer,
                ticket = %ticket.id,
                error = %e,
                "Cancellation failed mid-flight, reverting"
            );
            self.revert_cancellation(&ticket, customer).await;
            return Err(e);
        }

        info!(
            customer = %customer,
            ticket = %ticket.id,
            showtime = %ticket.showtime_id,
            seat = %ticket.seat(),
            "Booking cancelled"
        );
        Ok(())
    }

    /// Lists the caller's tickets with their payment status.
    ///
    /// A fresh query each call; the sequence is finite and not restartable.
    pub async fn user_tickets(&self, ctx: &RequestContext) -> AppResult<Vec<TicketView>> {
        let customer = ctx.require_customer()?;
        self.store.ticket_views_for_customer(customer).await
    }

    /// Places a time-boxed hold on a seat ahead of payment.
    ///
    /// The hold expires on its own after the configured TTL, so an abandoned
    /// checkout never starves the seat. Booking the held seat afterwards goes
    /// through [`Self::book_ticket`] as usual; the ledger lets the holder
    /// take over their own reservation.
    pub async fn hold_seat(
        &self,
        ctx: &RequestContext,
        request: &BookingRequest,
    ) -> AppResult<SeatClaim> {
        let customer = ctx.require_customer()?;
        request
            .validate()
            .map_err(|e| AppError::validation(format!("Invalid hold request: {e}")))?;
        let seat = request.seat();

        let showtime = self
            .store
            .get_showtime(request.showtime_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Showtime {} not found", request.showtime_id))
            })?;

        let claim = self
            .ledger
            .acquire_lock(showtime.id, &seat, customer, self.config.seat_hold_ttl())
            .await?;

        info!(
            customer = %customer,
            showtime = %showtime.id,
            seat = %seat,
            expires_at = ?claim.lock_expires_at,
            "Seat held"
        );
        Ok(claim)
    }

    /// Releases a hold the caller owns. Someone else's hold is untouched.
    pub async fn release_hold(
        &self,
        ctx: &RequestContext,
        request: &BookingRequest,
    ) -> AppResult<bool> {
        let customer = ctx.require_customer()?;
        let seat = request.seat();
        self.ledger
            .release_lock(request.showtime_id, &seat, customer)
            .await
    }

    /// Claim the seat, retrying stale-write conflicts a bounded number of
    /// times before surfacing a seat conflict.
    async fn claim_with_retry(
        &self,
        showtime: &Showtime,
        seat: &SeatId,
        customer: CustomerId,
    ) -> AppResult<SeatClaim> {
        let mut last_message = String::new();

        for attempt in 0..=self.config.max_conflict_retries {
            match self.ledger.claim_seat(showtime.id, seat, customer).await {
                Ok(claim) => return Ok(claim),
                Err(e) if e.is_retryable() => {
                    warn!(
                        showtime = %showtime.id,
                        seat = %seat,
                        attempt,
                        error = %e,
                        "Seat claim hit a stale write, retrying"
                    );
                    last_message = e.message;
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::seat_conflict(format!(
            "Seat {seat} could not be claimed: {last_message}"
        )))
    }

    /// Booking steps 6-8. Each failure unwinds what this method created;
    /// the caller unwinds the claim.
    async fn finalize_booking(
        &self,
        showtime: &Showtime,
        claim: &SeatClaim,
        customer: CustomerId,
    ) -> AppResult<BookingConfirmation> {
        // Step 6: ticket at the showtime's current price
        let ticket = self
            .store
            .create_ticket(&CreateTicket {
                showtime_id: showtime.id,
                customer_id: customer,
                claim_id: claim.id,
                seat_row: claim.seat_row.clone(),
                seat_number: claim.seat_number.clone(),
                price_cents: showtime.price_cents,
                status: TicketStatus::Confirmed,
            })
            .await?;

        // Step 7: stand-in capture, recorded as already settled
        let payment = match self
            .store
            .create_payment(&CreatePayment {
                ticket_id: ticket.id,
                amount_cents: showtime.price_cents,
                method: PaymentMethod::Online,
                status: PaymentStatus::Completed,
            })
            .await
        {
            Ok(payment) => payment,
            Err(e) => {
                self.delete_ticket_or_log(&ticket).await;
                return Err(e);
            }
        };

        // Step 8: counter, guarded inside the store
        if let Err(e) = self.store.adjust_available_seats(showtime.id, -1).await {
            self.delete_payment_or_log(&payment).await;
            self.delete_ticket_or_log(&ticket).await;
            return Err(e);
        }

        Ok(BookingConfirmation { ticket, payment })
    }

    /// Cancellation steps 5-7.
    async fn finalize_cancellation(&self, ticket: &Ticket, customer: CustomerId) -> AppResult<()> {
        let seat = ticket.seat();

        // Step 5: free the seat
        let released = self
            .ledger
            .release_claim(ticket.showtime_id, &seat, customer)
            .await?;
        if !released {
            warn!(
                ticket = %ticket.id,
                seat = %seat,
                "No booked claim found to release during cancellation"
            );
        }

        // Step 6: refund
        let refunded = self
            .store
            .set_payment_status(ticket.id, PaymentStatus::Refunded)
            .await?;
        if !refunded {
            warn!(
                ticket = %ticket.id,
                "No payment found to refund during cancellation"
            );
        }

        // Step 7: counter
        self.store
            .adjust_available_seats(ticket.showtime_id, 1)
            .await?;

        Ok(())
    }

    /// Best-effort reverse of a partially applied cancellation: re-book the
    /// claim, restore the payment, flip the ticket back to confirmed. Every
    /// failure here is an inconsistency the reconciler has to heal.
    async fn revert_cancellation(&self, ticket: &Ticket, customer: CustomerId) {
        let seat = ticket.seat();

        if let Err(e) = self
            .ledger
            .claim_seat(ticket.showtime_id, &seat, customer)
            .await
        {
            error!(
                ticket = %ticket.id,
                seat = %seat,
                error = %e,
                "Failed to re-book seat claim while reverting cancellation; reconciliation required"
            );
        }

        if let Err(e) = self
            .store
            .set_payment_status(ticket.id, PaymentStatus::Completed)
            .await
        {
            error!(
                ticket = %ticket.id,
                error = %e,
                "Failed to restore payment while reverting cancellation; reconciliation required"
            );
        }

        if let Err(e) = self
            .store
            .set_ticket_status(ticket.id, TicketStatus::Confirmed)
            .await
        {
            error!(
                ticket = %ticket.id,
                error = %e,
                "Failed to restore ticket while reverting cancellation; reconciliation required"
            );
        }
    }

    async fn release_claim_or_log(
        &self,
        showtime: &Showtime,
        seat: &SeatId,
        customer: CustomerId,
    ) {
        match self.ledger.release_claim(showtime.id, seat, customer).await {
            Ok(true) => {}
            Ok(false) => error!(
                showtime = %showtime.id,
                seat = %seat,
                "Rollback found no claim to release; reconciliation required"
            ),
            Err(e) => error!(
                showtime = %showtime.id,
                seat = %seat,
                error = %e,
                "Rollback failed to release seat claim; reconciliation required"
            ),
        }
    }

    async fn delete_ticket_or_log(&self, ticket: &Ticket) {
        match self.store.delete_ticket(ticket.id).await {
            Ok(true) => {}
            Ok(false) => error!(
                ticket = %ticket.id,
                "Rollback found no ticket to delete; reconciliation required"
            ),
            Err(e) => error!(
                ticket = %ticket.id,
                error = %e,
                "Rollback failed to delete ticket; reconciliation required"
            ),
        }
    }

    async fn delete_payment_or_log(&self, payment: &Payment) {
        match self.store.delete_payment(payment.id).await {
            Ok(true) => {}
            Ok(false) => error!(
                payment = %payment.id,
                "Rollback found no payment to delete; reconciliation required"
            ),
            Err(e) => error!(
                payment = %payment.id,
                error = %e,
                "Rollback failed to delete payment; reconciliation required"
            ),
        }
    }
}
