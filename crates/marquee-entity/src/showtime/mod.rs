//! Showtime entity.

pub mod model;

pub use model::{CreateShowtime, Showtime};
