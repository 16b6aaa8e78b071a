pub mod api;
pub mod booking_edit;
pub mod choices;
pub mod cli;
pub mod clipboard;
pub mod closure;
pub mod config;
pub mod controller;
pub mod datetime;
pub mod grid;
pub mod logging;
pub mod notify;
pub mod prefs;
pub mod quick_booking;
pub mod recurrence;
pub mod reschedule;
pub mod shortcuts;
pub mod view;

use std::ffi::OsString;
use std::fs;

use anyhow::Context;
use clap::Parser;

pub use api::{
  ApiError,
  ApiResult,
  BookingApi,
  FlowOutcome
};
pub use config::CalendarConfig;
pub use controller::{
  CalendarController,
  CalendarHost,
  DateClickAction,
  EventClickAction,
  KeyAction
};

/// Entry point of `bookgrid-check`.
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli = cli::CheckCli::parse_from(raw_args);

  let configured = match &cli.config {
    | Some(path) => {
      let raw = fs::read_to_string(path)
        .with_context(|| {
          format!("failed to read {}", path.display())
        })?;
      CalendarConfig::peek_log_level(&raw)
    }
    | None => None
  };
  logging::init_tracing(logging::adjust_level(
    configured.unwrap_or(tracing::Level::INFO),
    cli.verbose,
    cli.quiet
  ))?;
  tracing::info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting bookgrid-check"
  );

  let config = match &cli.config {
    | Some(path) => CalendarConfig::load(path)?,
    | None => CalendarConfig::embedded()
  };
  print!("{}", cli::summary(&config));
  Ok(())
}
