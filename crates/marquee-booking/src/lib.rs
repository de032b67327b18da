//! # marquee-booking
//!
//! The booking orchestrator for Marquee: turns a booking request into a
//! confirmed ticket (or a well-defined rejection) as a single logical unit
//! of work, reverses bookings under the cancellation policy, and keeps the
//! showtime availability counter consistent with the set of active tickets.

pub mod context;
pub mod reconcile;
pub mod service;
pub mod store;

pub use context::RequestContext;
pub use reconcile::{AvailabilityReconciler, DriftReport};
pub use service::BookingService;
pub use store::BookingStore;
