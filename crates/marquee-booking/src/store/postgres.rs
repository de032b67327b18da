//! PostgreSQL booking store, delegating to the repositories.

use std::sync::Arc;

use async_trait::async_trait;

use marquee_core::result::AppResult;
use marquee_core::types::id::{CustomerId, PaymentId, ShowtimeId, TheaterId, TicketId};
use marquee_database::repositories::payment::PaymentRepository;
use marquee_database::repositories::showtime::ShowtimeRepository;
use marquee_database::repositories::ticket::TicketRepository;
use marquee_entity::booking::TicketView;
use marquee_entity::payment::{CreatePayment, Payment, PaymentStatus};
use marquee_entity::seat::SeatId;
use marquee_entity::showtime::Showtime;
use marquee_entity::ticket::{CreateTicket, Ticket, TicketStatus};

use super::BookingStore;

/// Production booking store backed by PostgreSQL repositories.
#[derive(Debug, Clone)]
pub struct PgBookingStore {
    showtimes: Arc<ShowtimeRepository>,
    tickets: Arc<TicketRepository>,
    payments: Arc<PaymentRepository>,
}

impl PgBookingStore {
    /// Creates a Postgres booking store over the given repositories.
    pub fn new(
        showtimes: Arc<ShowtimeRepository>,
        tickets: Arc<TicketRepository>,
        payments: Arc<PaymentRepository>,
    ) -> Self {
        Self {
            showtimes,
            tickets,
            payments,
        }
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn get_showtime(&self, id: ShowtimeId) -> AppResult<Option<Showtime>> {
        self.showtimes.find_by_id(id).await
    }

    async fn theater_capacity(&self, id: TheaterId) -> AppResult<Option<i32>> {
        self.showtimes.theater_capacity(id).await
    }

    async fn adjust_available_seats(&self, id: ShowtimeId, delta: i32) -> AppResult<i32> {
        self.showtimes.adjust_available_seats(id, delta).await
    }

    async fn set_available_seats(&self, id: ShowtimeId, value: i32) -> AppResult<bool> {
        self.showtimes.set_available_seats(id, value).await
    }

    async fn find_active_ticket(
        &self,
        showtime: ShowtimeId,
        seat: &SeatId,
    ) -> AppResult<Option<Ticket>> {
        self.tickets.find_active_by_seat(showtime, seat).await
    }

    async fn create_ticket(&self, data: &CreateTicket) -> AppResult<Ticket> {
        self.tickets.create(data).await
    }

    async fn find_ticket(&self, id: TicketId) -> AppResult<Option<Ticket>> {
        self.tickets.find_by_id(id).await
    }

    async fn set_ticket_status(&self, id: TicketId, status: TicketStatus) -> AppResult<bool> {
        self.tickets.set_status(id, status).await
    }

    async fn delete_ticket(&self, id: TicketId) -> AppResult<bool> {
        self.tickets.delete(id).await
    }

    async fn ticket_views_for_customer(
        &self,
        customer: CustomerId,
    ) -> AppResult<Vec<TicketView>> {
        self.tickets.views_by_customer(customer).await
    }

    async fn count_active_tickets(&self, showtime: ShowtimeId) -> AppResult<i64> {
        self.tickets.count_active_by_showtime(showtime).await
    }

    async fn create_payment(&self, data: &CreatePayment) -> AppResult<Payment> {
        self.payments.create(data).await
    }

    async fn find_payment_by_ticket(&self, ticket: TicketId) -> AppResult<Option<Payment>> {
        self.payments.find_by_ticket(ticket).await
    }

    async fn set_payment_status(
        &self,
        ticket: TicketId,
        status: PaymentStatus,
    ) -> AppResult<bool> {
        self.payments.set_status_by_ticket(ticket, status).await
    }

    async fn delete_payment(&self, id: PaymentId) -> AppResult<bool> {
        self.payments.delete(id).await
    }
}
