//! In-memory booking store for single-node deployments and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use marquee_core::error::AppError;
use marquee_core::result::AppResult;
use marquee_core::types::id::{
    CustomerId, PaymentId, ShowtimeId, TheaterId, TicketId,
};
use marquee_entity::booking::TicketView;
use marquee_entity::payment::{CreatePayment, Payment, PaymentStatus};
use marquee_entity::seat::SeatId;
use marquee_entity::showtime::{CreateShowtime, Showtime};
use marquee_entity::ticket::{CreateTicket, Ticket, TicketStatus};

use super::BookingStore;

/// Internal state for the memory-based booking store.
#[derive(Debug, Default)]
struct InnerState {
    theaters: HashMap<TheaterId, i32>,
    showtimes: HashMap<ShowtimeId, Showtime>,
    tickets: HashMap<TicketId, Ticket>,
    payments: HashMap<PaymentId, Payment>,
}

/// In-memory booking store using a Tokio mutex for thread safety.
///
/// Each trait method takes the lock once, so the counter guard and the write
/// it protects are atomic with respect to other callers.
///
/// Suitable for single-node deployments only.
#[derive(Debug, Clone, Default)]
pub struct MemoryBookingStore {
    state: Arc<Mutex<InnerState>>,
}

impl MemoryBookingStore {
    /// Creates an empty memory-based booking store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a theater and its capacity.
    pub async fn add_theater(&self, id: TheaterId, capacity: i32) {
        self.state.lock().await.theaters.insert(id, capacity);
    }

    /// Creates a showtime with a full availability counter.
    pub async fn add_showtime(&self, data: &CreateShowtime) -> Showtime {
        let now = Utc::now();
        let showtime = Showtime {
            id: ShowtimeId::new(),
            movie_id: data.movie_id,
            theater_id: data.theater_id,
            start_time: data.start_time,
            end_time: data.end_time,
            price_cents: data.price_cents,
            theater_capacity: data.theater_capacity,
            available_seats: data.theater_capacity,
            created_at: now,
            updated_at: now,
        };
        self.state
            .lock()
            .await
            .showtimes
            .insert(showtime.id, showtime.clone());
        showtime
    }
}

#[async_trait]
impl BookingStore for MemoryBookingStore {
    async fn get_showtime(&self, id: ShowtimeId) -> AppResult<Option<Showtime>> {
        Ok(self.state.lock().await.showtimes.get(&id).cloned())
    }

    async fn theater_capacity(&self, id: TheaterId) -> AppResult<Option<i32>> {
        Ok(self.state.lock().await.theaters.get(&id).copied())
    }

    async fn adjust_available_seats(&self, id: ShowtimeId, delta: i32) -> AppResult<i32> {
        let mut state = self.state.lock().await;
        let showtime = state
            .showtimes
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Showtime {id} not found")))?;

        let next = showtime.available_seats + delta;
        if next < 0 || next > showtime.theater_capacity {
            return Err(AppError::internal(format!(
                "Availability counter for showtime {id} refused adjustment by {delta}; \
                 counter requires reconciliation"
            )));
        }

        showtime.available_seats = next;
        showtime.updated_at = Utc::now();
        Ok(next)
    }

    async fn set_available_seats(&self, id: ShowtimeId, value: i32) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        match state.showtimes.get_mut(&id) {
            Some(showtime) => {
                showtime.available_seats = value;
                showtime.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_active_ticket(
        &self,
        showtime: ShowtimeId,
        seat: &SeatId,
    ) -> AppResult<Option<Ticket>> {
        let state = self.state.lock().await;
        Ok(state
            .tickets
            .values()
            .find(|t| {
                t.showtime_id == showtime
                    && t.seat_row == seat.row
                    && t.seat_number == seat.number
                    && t.is_active()
            })
            .cloned())
    }

    async fn create_ticket(&self, data: &CreateTicket) -> AppResult<Ticket> {
        let now = Utc::now();
        let ticket = Ticket {
            id: TicketId::new(),
            showtime_id: data.showtime_id,
            customer_id: data.customer_id,
            claim_id: data.claim_id,
            seat_row: data.seat_row.clone(),
            seat_number: data.seat_number.clone(),
            price_cents: data.price_cents,
            status: data.status,
            purchased_at: now,
            created_at: now,
            updated_at: now,
        };
        self.state
            .lock()
            .await
            .tickets
            .insert(ticket.id, ticket.clone());
        Ok(ticket)
    }

    async fn find_ticket(&self, id: TicketId) -> AppResult<Option<Ticket>> {
        Ok(self.state.lock().await.tickets.get(&id).cloned())
    }

    async fn set_ticket_status(&self, id: TicketId, status: TicketStatus) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        match state.tickets.get_mut(&id) {
            Some(ticket) => {
                ticket.status = status;
                ticket.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_ticket(&self, id: TicketId) -> AppResult<bool> {
        Ok(self.state.lock().await.tickets.remove(&id).is_some())
    }

    async fn ticket_views_for_customer(
        &self,
        customer: CustomerId,
    ) -> AppResult<Vec<TicketView>> {
        let state = self.state.lock().await;
        let mut views: Vec<TicketView> = state
            .tickets
            .values()
            .filter(|t| t.customer_id == customer)
            .map(|t| TicketView {
                id: t.id,
                showtime_id: t.showtime_id,
                seat_row: t.seat_row.clone(),
                seat_number: t.seat_number.clone(),
                price_cents: t.price_cents,
                status: t.status,
                purchased_at: t.purchased_at,
                payment_status: state
                    .payments
                    .values()
                    .find(|p| p.ticket_id == t.id)
                    .map(|p| p.status),
            })
            .collect();
        views.sort_by(|a, b| b.purchased_at.cmp(&a.purchased_at));
        Ok(views)
    }

    async fn count_active_tickets(&self, showtime: ShowtimeId) -> AppResult<i64> {
        let state = self.state.lock().await;
        Ok(state
            .tickets
            .values()
            .filter(|t| t.showtime_id == showtime && t.is_active())
            .count() as i64)
    }

    async fn create_payment(&self, data: &CreatePayment) -> AppResult<Payment> {
        let now = Utc::now();
        let payment = Payment {
            id: PaymentId::new(),
            ticket_id: data.ticket_id,
            amount_cents: data.amount_cents,
            method: data.method,
            status: data.status,
            paid_at: now,
            created_at: now,
            updated_at: now,
        };
        self.state
            .lock()
            .await
            .payments
            .insert(payment.id, payment.clone());
        Ok(payment)
    }

    async fn find_payment_by_ticket(&self, ticket: TicketId) -> AppResult<Option<Payment>> {
        let state = self.state.lock().await;
        Ok(state
            .payments
            .values()
            .find(|p| p.ticket_id == ticket)
            .cloned())
    }

    async fn set_payment_status(
        &self,
        ticket: TicketId,
        status: PaymentStatus,
    ) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        match state.payments.values_mut().find(|p| p.ticket_id == ticket) {
            Some(payment) => {
                payment.status = status;
                payment.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_payment(&self, id: PaymentId) -> AppResult<bool> {
        Ok(self.state.lock().await.payments.remove(&id).is_some())
    }
}
