//! Payment entity.

pub mod model;

pub use model::{CreatePayment, Payment, PaymentMethod, PaymentStatus};
