use std::fmt::Write as _;
use std::path::PathBuf;

use clap::{
  ArgAction,
  Parser
};

use crate::config::CalendarConfig;

#[derive(Parser, Debug, Clone)]
#[command(
  name = "bookgrid-check",
  version,
  about = "Validates a booking calendar config \
           and prints the settings the page \
           will run with"
)]
pub struct CheckCli {
  #[arg(
    short = 'v',
    long = "verbose",
    action = ArgAction::Count
  )]
  pub verbose: u8,

  #[arg(
    short = 'q',
    long = "quiet",
    action = ArgAction::Count
  )]
  pub quiet: u8,

  /// TOML file to check; the bundled
  /// defaults when omitted.
  #[arg(long = "config")]
  pub config: Option<PathBuf>
}

fn on_off(enabled: bool) -> &'static str {
  if enabled { "on" } else { "off" }
}

/// Human-readable report of a sanitized
/// config.
pub fn summary(config: &CalendarConfig) -> String {
  let endpoints = &config.endpoints;
  let mut out = String::new();
  let rows = [
    (
      "timezone",
      config.resolve_timezone().name().to_string()
    ),
    ("log level", config.log_level().to_string()),
    (
      "closures",
      on_off(config.capabilities.manage_closures)
        .to_string()
    ),
    (
      "copy shortcuts",
      on_off(config.capabilities.copy_shortcuts)
        .to_string()
    ),
    (
      "slots",
      format!(
        "{}-{} every {} min",
        config.slot_min_time().format("%H:%M"),
        config.slot_max_time().format("%H:%M"),
        config.grid.slot_minutes
      )
    ),
    (
      "frequencies",
      config
        .frequencies()
        .iter()
        .map(|frequency| frequency.as_key())
        .collect::<Vec<_>>()
        .join(", ")
    ),
    ("booking feed", endpoints.booking_feed.clone()),
    ("closure feed", endpoints.closure_feed.clone()),
    (
      "closure create",
      endpoints.closure_create.clone()
    ),
    ("duplicate", endpoints.duplicate.clone()),
    ("update time", endpoints.update_time.clone()),
    ("quick create", endpoints.quick_create.clone()),
    (
      "specialists",
      endpoints.specialists_for_service.clone()
    ),
    (
      "cabinets",
      endpoints.available_cabinets.clone()
    )
  ];

  for (label, value) in rows {
    let value = if value.is_empty() {
      "-".to_string()
    } else {
      value
    };
    let _ = writeln!(out, "{label:<16}{value}");
  }
  out
}
