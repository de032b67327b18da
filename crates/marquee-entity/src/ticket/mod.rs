//! Ticket entity.

pub mod model;

pub use model::{CreateTicket, Ticket, TicketStatus};
