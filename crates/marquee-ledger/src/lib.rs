//! # marquee-ledger
//!
//! The Seat Ledger: exclusive seat-claim acquisition for Marquee. Guarantees
//! at most one booked claim per `(showtime, seat)` pair under concurrent
//! access, via an insert-if-absent primary path plus pessimistic time-boxed
//! holds and optimistic version guards for in-place transitions.

pub mod ledger;
pub mod memory;

pub use ledger::SeatLedger;
pub use memory::MemorySeatLedger;
