//! Seat claim entity and seat identity.

pub mod model;

pub use model::{ClaimUpdate, SeatClaim, SeatId, SeatStatus};
