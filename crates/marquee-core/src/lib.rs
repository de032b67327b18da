//! # marquee-core
//!
//! Core crate for Marquee, the seat-booking and inventory core of a
//! movie-theater ticketing platform. Contains configuration schemas, typed
//! identifiers, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Marquee crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
