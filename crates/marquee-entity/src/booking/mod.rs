//! Booking request and view types.

pub mod model;

pub use model::{BookingConfirmation, BookingRequest, TicketView};
