use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use serde::Serialize;

use venue_checkin::cli::{Cli, Command};
use venue_checkin::config::Config;
use venue_checkin::db::create_pool;
use venue_checkin::error::AppError;
use venue_checkin::logging::init_logging;
use venue_checkin::repository::SqliteStore;
use venue_checkin::scheduler::run_status_checks;
use venue_checkin::services::{AppStateHandle, SystemClock, TracingNotifier};
use venue_checkin::venue::provider::{Clock, NotificationTrigger};
use venue_checkin::venue::{
    format_elapsed, AppState, CheckInLifecycleEngine, CheckInService, Collaborators,
    LifecycleLock, VenueInfo,
};

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_logging("info");

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        match &err {
            AppError::CheckIn(refused) if refused.is_user_error() => {
                tracing::warn!(code = refused.error_code(), "{}", refused);
            }
            _ => tracing::error!("{}", err),
        }
        eprintln!("error: {}", err);
        std::process::exit(err.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = Config::from_env()
        .and_then(|config| cli.apply_overrides(config))
        .map_err(AppError::Config)?;

    tracing::debug!("Starting with config: {:?}", config);

    let pool = create_pool(&config.database_url).await?;
    let store = Arc::new(SqliteStore::new(pool));

    let initial_state = match cli.command {
        Command::Check { app_state } | Command::Run { app_state, .. } => app_state,
        _ => AppState::Active,
    };
    let app_state = AppStateHandle::new(initial_state);
    let clock = Arc::new(SystemClock);
    let notifier = Arc::new(TracingNotifier);

    let deps = Collaborators {
        venues: store.clone(),
        reminders: store,
        notifier: notifier.clone(),
        app_state: Arc::new(app_state),
        clock: clock.clone(),
        lock: LifecycleLock::new(),
    };
    let service = CheckInService::new(deps.clone());
    let engine = Arc::new(CheckInLifecycleEngine::new(config.check_in, deps));

    match cli.command {
        Command::CheckIn { venue_id, name } => {
            let record = service.start_check_in(VenueInfo::new(venue_id, name)).await?;
            print_json(&record)?;
        }
        Command::CheckOut => {
            let record = service.confirm_check_out().await?;
            println!(
                "Checked out of {} after {}",
                record.name,
                format_elapsed(record.elapsed(clock.now()))
            );
        }
        Command::Cancel => {
            service.cancel_check_in().await?;
            println!("Check-in cancelled");
        }
        Command::Status => match service.get_current_venue().await? {
            Some(record) => println!(
                "Checked in at {} for {}",
                record.name,
                format_elapsed(record.elapsed(clock.now()))
            ),
            None => println!("Not checked in"),
        },
        Command::History => {
            print_json(&service.get_visited().await?)?;
        }
        Command::ClearHistory => {
            service.clear_history().await?;
            println!("History cleared");
        }
        Command::Check { .. } => {
            let outcome = engine.check_status().await?;
            println!(
                "reminder sent: {}, checked out: {}",
                outcome.reminder_sent,
                outcome.checked_out.is_some()
            );
        }
        Command::Run { .. } => {
            run_status_checks(engine, config.status_check_interval_seconds).await;
        }
        Command::NotifyExposure => {
            notifier.send_exposure_alert();
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
