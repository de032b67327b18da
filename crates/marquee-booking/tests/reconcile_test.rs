//! Availability reconciliation tests: the counter invariant and drift healing.

mod helpers;

use std::sync::Arc;

use chrono::Duration;

use marquee_booking::reconcile::AvailabilityReconciler;
use marquee_booking::{BookingStore, RequestContext};
use marquee_core::types::id::CustomerId;

use helpers::{TestApp, request};

fn reconciler(app: &TestApp) -> AvailabilityReconciler {
    AvailabilityReconciler::new(Arc::new(app.store.clone()), Arc::new(app.ledger.clone()))
}

#[tokio::test]
async fn test_counter_invariant_holds_across_bookings_and_cancellations() {
    let app = TestApp::new();
    let showtime = app.seed_showtime(100, Duration::hours(6)).await;
    let ctx = RequestContext::authenticated(CustomerId::new());

    let first = app
        .service
        .book_ticket(&ctx, &request(&showtime, "A", "1"))
        .await
        .unwrap();
    app.service
        .book_ticket(&ctx, &request(&showtime, "A", "2"))
        .await
        .unwrap();
    app.service
        .book_ticket(&ctx, &request(&showtime, "B", "1"))
        .await
        .unwrap();
    app.service
        .cancel_booking(&ctx, first.ticket.id)
        .await
        .unwrap();

    // available == capacity - active after any sequence of operations.
    let active = app.store.count_active_tickets(showtime.id).await.unwrap();
    let current = app
        .store
        .get_showtime(showtime.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(active, 2);
    assert!(current.availability_consistent(active));

    let report = reconciler(&app)
        .reconcile_showtime(showtime.id)
        .await
        .unwrap();
    assert!(!report.drift_detected);
    assert!(!report.healed);
    assert_eq!(report.active_tickets, 2);
    assert_eq!(report.booked_claims, 2);
    assert_eq!(report.expected_available, 98);
}

#[tokio::test]
async fn test_drift_is_detected_and_healed() {
    let app = TestApp::new();
    let showtime = app.seed_showtime(100, Duration::hours(6)).await;
    let ctx = RequestContext::authenticated(CustomerId::new());

    app.service
        .book_ticket(&ctx, &request(&showtime, "A", "1"))
        .await
        .unwrap();

    // Corrupt the counter behind the orchestrator's back.
    app.store
        .set_available_seats(showtime.id, 95)
        .await
        .unwrap();

    let report = reconciler(&app)
        .reconcile_showtime(showtime.id)
        .await
        .unwrap();
    assert!(report.drift_detected);
    assert!(report.healed);
    assert_eq!(report.stored_available, 95);
    assert_eq!(report.expected_available, 99);

    assert_eq!(app.available_seats(&showtime).await, 99);

    // A second pass finds nothing to do.
    let report = reconciler(&app)
        .reconcile_showtime(showtime.id)
        .await
        .unwrap();
    assert!(!report.drift_detected);
}

#[tokio::test]
async fn test_reconcile_unknown_showtime_is_not_found() {
    let app = TestApp::new();
    let err = reconciler(&app)
        .reconcile_showtime(marquee_core::types::id::ShowtimeId::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, marquee_core::error::ErrorKind::NotFound);
}
