//! Repository implementations for the booking tables.

pub mod payment;
pub mod seat_claim;
pub mod showtime;
pub mod ticket;
