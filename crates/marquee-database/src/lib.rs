//! # marquee-database
//!
//! PostgreSQL plumbing for Marquee: connection pool management, the
//! migration runner, repositories for the booking tables, and the
//! Postgres-backed seat ledger.

pub mod connection;
pub mod ledger;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use ledger::PgSeatLedger;
