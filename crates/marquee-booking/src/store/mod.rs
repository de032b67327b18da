//! Storage boundary consumed by the booking orchestrator.

pub mod memory;
pub mod postgres;

pub use memory::MemoryBookingStore;
pub use postgres::PgBookingStore;

use async_trait::async_trait;

use marquee_core::result::AppResult;
use marquee_core::types::id::{CustomerId, PaymentId, ShowtimeId, TheaterId, TicketId};
use marquee_entity::booking::TicketView;
use marquee_entity::payment::{CreatePayment, Payment, PaymentStatus};
use marquee_entity::seat::SeatId;
use marquee_entity::showtime::Showtime;
use marquee_entity::ticket::{CreateTicket, Ticket, TicketStatus};

/// Storage operations the booking orchestrator needs from its collaborators.
///
/// Any persistent store offering atomic conditional writes satisfies this
/// contract. Two implementations are provided: PostgreSQL (production) and
/// in-memory (single-node deployments and tests).
///
/// The availability counter methods must be guarded writes: an adjustment
/// that would leave `[0, theater_capacity]` fails instead of clamping, and
/// `set_available_seats` is reserved for the reconciler.
#[async_trait]
pub trait BookingStore: Send + Sync + std::fmt::Debug {
    /// Look up a showtime by ID.
    async fn get_showtime(&self, id: ShowtimeId) -> AppResult<Option<Showtime>>;

    /// Look up a theater's physical capacity.
    async fn theater_capacity(&self, id: TheaterId) -> AppResult<Option<i32>>;

    /// Adjust a showtime's availability counter by `delta`, bounds-guarded.
    /// Returns the new value.
    async fn adjust_available_seats(&self, id: ShowtimeId, delta: i32) -> AppResult<i32>;

    /// Overwrite a showtime's availability counter. Reconciler use only.
    async fn set_available_seats(&self, id: ShowtimeId, value: i32) -> AppResult<bool>;

    /// Find the active (non-cancelled) ticket covering a seat, if any.
    async fn find_active_ticket(
        &self,
        showtime: ShowtimeId,
        seat: &SeatId,
    ) -> AppResult<Option<Ticket>>;

    /// Create a ticket.
    async fn create_ticket(&self, data: &CreateTicket) -> AppResult<Ticket>;

    /// Look up a ticket by ID.
    async fn find_ticket(&self, id: TicketId) -> AppResult<Option<Ticket>>;

    /// Transition a ticket's status. Returns whether a row changed.
    async fn set_ticket_status(&self, id: TicketId, status: TicketStatus) -> AppResult<bool>;

    /// Delete a ticket. Compensating rollback only.
    async fn delete_ticket(&self, id: TicketId) -> AppResult<bool>;

    /// List a customer's tickets with payment status, newest first.
    async fn ticket_views_for_customer(
        &self,
        customer: CustomerId,
    ) -> AppResult<Vec<TicketView>>;

    /// Count active (non-cancelled) tickets for a showtime.
    async fn count_active_tickets(&self, showtime: ShowtimeId) -> AppResult<i64>;

    /// Create a payment record.
    async fn create_payment(&self, data: &CreatePayment) -> AppResult<Payment>;

    /// Look up the payment settling a ticket.
    async fn find_payment_by_ticket(&self, ticket: TicketId) -> AppResult<Option<Payment>>;

    /// Transition a ticket's payment to a new settlement state. Returns
    /// whether a row changed.
    async fn set_payment_status(
        &self,
        ticket: TicketId,
        status: PaymentStatus,
    ) -> AppResult<bool>;

    /// Delete a payment. Compensating rollback only.
    async fn delete_payment(&self, id: PaymentId) -> AppResult<bool>;
}
