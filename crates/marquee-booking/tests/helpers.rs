//! Shared test helpers for booking flow tests.

use std::sync::Arc;

use chrono::{Duration, Utc};

use marquee_booking::store::MemoryBookingStore;
use marquee_booking::{BookingService, BookingStore};
use marquee_core::config::booking::BookingConfig;
use marquee_core::types::id::{MovieId, TheaterId};
use marquee_entity::booking::BookingRequest;
use marquee_entity::showtime::{CreateShowtime, Showtime};
use marquee_ledger::MemorySeatLedger;

/// Test application context wiring the booking service over the in-memory
/// store and ledger.
pub struct TestApp {
    /// The store behind the service, for direct inspection.
    pub store: MemoryBookingStore,
    /// The ledger behind the service, for direct inspection.
    pub ledger: MemorySeatLedger,
    /// The service under test.
    pub service: BookingService,
}

impl TestApp {
    /// Create a new test application with default booking policy.
    pub fn new() -> Self {
        let store = MemoryBookingStore::new();
        let ledger = MemorySeatLedger::new();
        let service = BookingService::new(
            Arc::new(store.clone()),
            Arc::new(ledger.clone()),
            BookingConfig::default(),
        );
        Self {
            store,
            ledger,
            service,
        }
    }

    /// Create a test application over an externally built store, so tests
    /// can wrap the store with fault injection.
    pub fn with_store(store: Arc<dyn BookingStore>, inner: MemoryBookingStore) -> Self {
        let ledger = MemorySeatLedger::new();
        let service =
            BookingService::new(store, Arc::new(ledger.clone()), BookingConfig::default());
        Self {
            store: inner,
            ledger,
            service,
        }
    }

    /// Seed a theater and a showtime starting `starts_in` from now.
    pub async fn seed_showtime(&self, capacity: i32, starts_in: Duration) -> Showtime {
        let theater_id = TheaterId::new();
        self.store.add_theater(theater_id, capacity).await;
        self.store
            .add_showtime(&CreateShowtime {
                movie_id: MovieId::new(),
                theater_id,
                start_time: Utc::now() + starts_in,
                end_time: Utc::now() + starts_in + Duration::hours(2),
                price_cents: 1500,
                theater_capacity: capacity,
            })
            .await
    }

    /// Current availability counter for a showtime.
    pub async fn available_seats(&self, showtime: &Showtime) -> i32 {
        self.store
            .get_showtime(showtime.id)
            .await
            .expect("store read")
            .expect("showtime exists")
            .available_seats
    }
}

/// A booking request for one seat of the given showtime.
pub fn request(showtime: &Showtime, row: &str, number: &str) -> BookingRequest {
    BookingRequest {
        showtime_id: showtime.id,
        seat_row: row.to_string(),
        seat_number: number.to_string(),
    }
}
