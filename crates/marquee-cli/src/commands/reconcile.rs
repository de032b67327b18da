//! Availability reconciliation commands.

use std::sync::Arc;

use clap::Args;
use tabled::Tabled;

use marquee_booking::reconcile::{AvailabilityReconciler, DriftReport};
use marquee_booking::store::PgBookingStore;
use marquee_core::error::AppError;
use marquee_core::types::id::ShowtimeId;
use marquee_database::PgSeatLedger;
use marquee_database::repositories::payment::PaymentRepository;
use marquee_database::repositories::seat_claim::SeatClaimRepository;
use marquee_database::repositories::showtime::ShowtimeRepository;
use marquee_database::repositories::ticket::TicketRepository;

use crate::output::{self, OutputFormat};

/// Arguments for the reconcile command
#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// Reconcile a single showtime by ID
    #[arg(long, conflicts_with = "all")]
    pub showtime: Option<ShowtimeId>,

    /// Reconcile every showtime
    #[arg(long)]
    pub all: bool,
}

/// One row of the drift report table
#[derive(Debug, serde::Serialize, Tabled)]
struct DriftRow {
    /// Showtime ID
    showtime: String,
    /// Stored counter value
    stored: i32,
    /// Expected counter value
    expected: i32,
    /// Active tickets
    tickets: i64,
    /// Booked claims
    claims: u32,
    /// Whether drift was found
    drift: bool,
    /// Whether the counter was healed
    healed: bool,
}

impl From<&DriftReport> for DriftRow {
    fn from(report: &DriftReport) -> Self {
        Self {
            showtime: report.showtime_id.to_string(),
            stored: report.stored_available,
            expected: report.expected_available,
            tickets: report.active_tickets,
            claims: report.booked_claims,
            drift: report.drift_detected,
            healed: report.healed,
        }
    }
}

/// Execute reconcile commands
pub async fn execute(
    args: &ReconcileArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let pool = super::create_db_pool(&config).await?;

    let showtime_repo = Arc::new(ShowtimeRepository::new(pool.clone()));
    let ticket_repo = Arc::new(TicketRepository::new(pool.clone()));
    let payment_repo = Arc::new(PaymentRepository::new(pool.clone()));
    let claim_repo = SeatClaimRepository::new(pool.clone());

    let store = Arc::new(PgBookingStore::new(
        Arc::clone(&showtime_repo),
        ticket_repo,
        payment_repo,
    ));
    let ledger = Arc::new(PgSeatLedger::new(claim_repo));
    let reconciler = AvailabilityReconciler::new(store, ledger);

    let ids = if args.all {
        showtime_repo.list_ids().await?
    } else {
        match args.showtime {
            Some(id) => vec![id],
            None => {
                return Err(AppError::validation(
                    "Pass either --showtime <uuid> or --all",
                ));
            }
        }
    };

    let mut reports = Vec::with_capacity(ids.len());
    for id in ids {
        reports.push(reconciler.reconcile_showtime(id).await?);
    }

    let rows: Vec<DriftRow> = reports.iter().map(DriftRow::from).collect();
    output::print_list(&rows, format);

    let drifted = reports.iter().filter(|r| r.drift_detected).count();
    if drifted == 0 {
        output::print_success("All counters consistent.");
    } else {
        output::print_warning(&format!("{drifted} counter(s) drifted and were healed."));
    }

    Ok(())
}
