//! Cancellation flow tests: cutoff policy, ownership, and status semantics.

mod helpers;

use chrono::Duration;

use marquee_booking::{BookingStore, RequestContext};
use marquee_core::error::ErrorKind;
use marquee_core::types::id::{CustomerId, TicketId};
use marquee_entity::payment::PaymentStatus;
use marquee_entity::seat::SeatStatus;
use marquee_entity::ticket::TicketStatus;
use marquee_ledger::SeatLedger;

use helpers::{TestApp, request};

#[tokio::test]
async fn test_cancellation_restores_seat_and_counter() {
    let app = TestApp::new();
    let showtime = app.seed_showtime(60, Duration::hours(6)).await;
    let customer = CustomerId::new();
    let ctx = RequestContext::authenticated(customer);

    let confirmation = app
        .service
        .book_ticket(&ctx, &request(&showtime, "D", "4"))
        .await
        .unwrap();
    assert_eq!(app.available_seats(&showtime).await, 59);

    app.service
        .cancel_booking(&ctx, confirmation.ticket.id)
        .await
        .unwrap();

    assert_eq!(app.available_seats(&showtime).await, 60);
    let claim = app
        .ledger
        .find_claim(showtime.id, &confirmation.ticket.seat())
        .await
        .unwrap()
        .expect("claim row remains");
    assert_eq!(claim.status, SeatStatus::Available);
}

#[tokio::test]
async fn test_cancellation_cutoff_boundary() {
    let app = TestApp::new();
    let customer = CustomerId::new();
    let ctx = RequestContext::authenticated(customer);

    // One minute outside the cutoff: cancellable.
    let outside = app
        .seed_showtime(30, Duration::hours(2) + Duration::minutes(1))
        .await;
    let confirmation = app
        .service
        .book_ticket(&ctx, &request(&outside, "A", "1"))
        .await
        .unwrap();
    app.service
        .cancel_booking(&ctx, confirmation.ticket.id)
        .await
        .expect("cancellation outside the cutoff succeeds");

    // Exactly at the cutoff: permanently disallowed.
    let at_cutoff = app.seed_showtime(30, Duration::hours(2)).await;
    let confirmation = app
        .service
        .book_ticket(&ctx, &request(&at_cutoff, "A", "1"))
        .await
        .unwrap();
    let err = app
        .service
        .cancel_booking(&ctx, confirmation.ticket.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidOperation);

    // Well inside the cutoff.
    let inside = app.seed_showtime(30, Duration::minutes(30)).await;
    let confirmation = app
        .service
        .book_ticket(&ctx, &request(&inside, "A", "1"))
        .await
        .unwrap();
    let err = app
        .service
        .cancel_booking(&ctx, confirmation.ticket.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidOperation);

    // The rejected cancellations left everything in place.
    assert_eq!(app.available_seats(&inside).await, 29);
    let ticket = app
        .store
        .find_ticket(confirmation.ticket.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ticket.status, TicketStatus::Confirmed);
}

#[tokio::test]
async fn test_cancellation_requires_ownership() {
    let app = TestApp::new();
    let showtime = app.seed_showtime(40, Duration::hours(6)).await;
    let owner = RequestContext::authenticated(CustomerId::new());
    let stranger = RequestContext::authenticated(CustomerId::new());

    let confirmation = app
        .service
        .book_ticket(&owner, &request(&showtime, "B", "2"))
        .await
        .unwrap();

    // Someone else's ticket reads as missing, not as forbidden.
    let err = app
        .service
        .cancel_booking(&stranger, confirmation.ticket.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let ticket = app
        .store
        .find_ticket(confirmation.ticket.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ticket.status, TicketStatus::Confirmed);
}

#[tokio::test]
async fn test_cancelling_twice_is_rejected() {
    let app = TestApp::new();
    let showtime = app.seed_showtime(40, Duration::hours(6)).await;
    let ctx = RequestContext::authenticated(CustomerId::new());

    let confirmation = app
        .service
        .book_ticket(&ctx, &request(&showtime, "C", "3"))
        .await
        .unwrap();
    app.service
        .cancel_booking(&ctx, confirmation.ticket.id)
        .await
        .unwrap();

    let err = app
        .service
        .cancel_booking(&ctx, confirmation.ticket.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidOperation);

    // The counter was restored exactly once.
    assert_eq!(app.available_seats(&showtime).await, 40);
}

#[tokio::test]
async fn test_cancelled_ticket_is_kept_not_deleted() {
    let app = TestApp::new();
    let showtime = app.seed_showtime(40, Duration::hours(6)).await;
    let ctx = RequestContext::authenticated(CustomerId::new());

    let confirmation = app
        .service
        .book_ticket(&ctx, &request(&showtime, "E", "5"))
        .await
        .unwrap();
    app.service
        .cancel_booking(&ctx, confirmation.ticket.id)
        .await
        .unwrap();

    // The row survives as history, with the payment refunded.
    let ticket = app
        .store
        .find_ticket(confirmation.ticket.id)
        .await
        .unwrap()
        .expect("cancelled ticket is retained");
    assert_eq!(ticket.status, TicketStatus::Cancelled);

    let views = app.service.user_tickets(&ctx).await.unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].status, TicketStatus::Cancelled);
    assert_eq!(views[0].payment_status, Some(PaymentStatus::Refunded));
}

#[tokio::test]
async fn test_cancelling_unknown_ticket_is_not_found() {
    let app = TestApp::new();
    let ctx = RequestContext::authenticated(CustomerId::new());

    let err = app
        .service
        .cancel_booking(&ctx, TicketId::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}
