use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use chrono::{
  NaiveDateTime,
  NaiveTime,
  Utc
};
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::Level;

use crate::datetime::{
  TimeOfDay,
  truncate_to_minute
};
use crate::recurrence::Frequency;

const DEFAULT_CONFIG_TOML: &str =
  include_str!("../bookgrid.toml");

const DEFAULT_TIMEZONE: &str =
  "Europe/Moscow";

fn config_true() -> bool {
  true
}

fn default_version() -> u32 {
  1
}

fn default_closure_form_fields()
-> Vec<String> {
  ["cabinet", "start_time", "end_time", "reason"]
    .iter()
    .map(|field| (*field).to_string())
    .collect()
}

fn default_locale() -> String {
  "ru".to_string()
}

fn default_slot_min_time() -> String {
  "08:00".to_string()
}

fn default_slot_max_time() -> String {
  "22:00".to_string()
}

fn default_slot_minutes() -> u32 {
  30
}

fn default_month_click_hour() -> u32 {
  9
}

fn default_notice_dismiss_ms() -> u64 {
  2_000
}

fn default_initial_resize_ms() -> u64 {
  100
}

fn default_width_resize_ms() -> u64 {
  200
}

fn default_frequencies() -> Vec<String> {
  Frequency::ALL
    .iter()
    .map(|frequency| {
      frequency.as_key().to_string()
    })
    .collect()
}

fn default_specialists_url() -> String {
  "/api/specialists-for-service/".to_string()
}

fn default_cabinets_url() -> String {
  "/api/available-cabinets/".to_string()
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_occurrences() -> u32 {
  2
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CalendarConfig {
  #[serde(default = "default_version")]
  pub version:             u32,
  #[serde(default)]
  pub timezone:            Option<String>,
  #[serde(
    default = "default_closure_form_fields"
  )]
  pub closure_form_fields: Vec<String>,
  #[serde(default)]
  pub capabilities:        Capabilities,
  #[serde(default)]
  pub endpoints:           Endpoints,
  #[serde(default)]
  pub grid:                GridConfig,
  #[serde(default)]
  pub timing:              TimingConfig,
  #[serde(default)]
  pub recurrence:          RecurrenceConfig,
  #[serde(default)]
  pub logging:             LoggingConfig
}

/// Operator permissions rendered into
/// the page.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Deserialize,
)]
pub struct Capabilities {
  #[serde(default)]
  pub manage_closures: bool,
  #[serde(default)]
  pub copy_shortcuts:  bool
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Endpoints {
  #[serde(default)]
  pub booking_feed:        String,
  #[serde(default)]
  pub closure_feed:        String,
  #[serde(default)]
  pub closure_create:      String,
  #[serde(default)]
  pub closure_delete_base: String,
  #[serde(default)]
  pub duplicate:           String,
  #[serde(default)]
  pub update_time:         String,
  #[serde(default)]
  pub quick_create:        String,
  #[serde(default)]
  pub booking_edit_base:   String,
  #[serde(default = "default_specialists_url")]
  pub specialists_for_service: String,
  #[serde(default = "default_cabinets_url")]
  pub available_cabinets:  String
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GridConfig {
  #[serde(default = "default_locale")]
  pub locale:           String,
  #[serde(default = "default_slot_min_time")]
  pub slot_min_time:    String,
  #[serde(default = "default_slot_max_time")]
  pub slot_max_time:    String,
  #[serde(default = "default_slot_minutes")]
  pub slot_minutes:     u32,
  #[serde(
    default = "default_month_click_hour"
  )]
  pub month_click_hour: u32,
  #[serde(default = "config_true")]
  pub start_editable:   bool
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Deserialize,
)]
pub struct TimingConfig {
  #[serde(
    default = "default_notice_dismiss_ms"
  )]
  pub notice_dismiss_ms: u64,
  #[serde(
    default = "default_initial_resize_ms"
  )]
  pub initial_resize_ms: u64,
  #[serde(
    default = "default_width_resize_ms"
  )]
  pub width_resize_ms:   u64
}

/// `level` is the default verbosity of
/// the crate's own spans and events.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
  #[serde(default = "default_log_level")]
  pub level: String
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecurrenceConfig {
  #[serde(default = "default_frequencies")]
  pub frequencies:         Vec<String>,
  #[serde(default = "default_occurrences")]
  pub default_occurrences: u32
}

impl Default for CalendarConfig {
  fn default() -> Self {
    Self {
      version:             default_version(),
      timezone:            Some(
        DEFAULT_TIMEZONE.to_string()
      ),
      closure_form_fields:
        default_closure_form_fields(),
      capabilities:
        Capabilities::default(),
      endpoints:           Endpoints::default(),
      grid:                GridConfig::default(),
      timing:              TimingConfig::default(),
      recurrence:
        RecurrenceConfig::default(),
      logging:             LoggingConfig::default()
    }
  }
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: default_log_level()
    }
  }
}

impl Default for Endpoints {
  fn default() -> Self {
    Self {
      booking_feed:        "/calendar/feed/"
        .to_string(),
      closure_feed:        String::new(),
      closure_create:      String::new(),
      closure_delete_base:
        "/calendar/closures/".to_string(),
      duplicate:           String::new(),
      update_time:
        "/booking/update-time/".to_string(),
      quick_create:
        "/booking/quick-create/".to_string(),
      booking_edit_base:   "/booking/"
        .to_string(),
      specialists_for_service:
        default_specialists_url(),
      available_cabinets:  default_cabinets_url()
    }
  }
}

impl Default for GridConfig {
  fn default() -> Self {
    Self {
      locale:           default_locale(),
      slot_min_time:    default_slot_min_time(),
      slot_max_time:    default_slot_max_time(),
      slot_minutes:     default_slot_minutes(),
      month_click_hour:
        default_month_click_hour(),
      start_editable:   true
    }
  }
}

impl Default for TimingConfig {
  fn default() -> Self {
    Self {
      notice_dismiss_ms:
        default_notice_dismiss_ms(),
      initial_resize_ms:
        default_initial_resize_ms(),
      width_resize_ms:
        default_width_resize_ms()
    }
  }
}

impl Default for RecurrenceConfig {
  fn default() -> Self {
    Self {
      frequencies:         default_frequencies(),
      default_occurrences: default_occurrences()
    }
  }
}

impl CalendarConfig {
  /// Parses and sanitizes a TOML document.
  pub fn from_toml_str(
    raw: &str
  ) -> anyhow::Result<Self> {
    let mut config =
      toml::from_str::<CalendarConfig>(raw)
        .context(
          "failed to parse calendar config"
        )?;
    config.sanitize();
    Ok(config)
  }

  #[tracing::instrument]
  pub fn load(
    path: &Path
  ) -> anyhow::Result<Self> {
    let raw = fs::read_to_string(path)
      .with_context(|| {
        format!(
          "failed to read {}",
          path.display()
        )
      })?;
    let config = Self::from_toml_str(&raw)
      .with_context(|| {
        format!(
          "invalid calendar config in {}",
          path.display()
        )
      })?;
    tracing::info!(
      version = config.version,
      timezone = ?config.timezone,
      "loaded calendar config"
    );
    Ok(config)
  }

  /// The `[logging] level` of a raw
  /// document, readable before a
  /// subscriber is installed.
  pub fn peek_log_level(raw: &str) -> Option<Level> {
    #[derive(Deserialize)]
    struct Peek {
      #[serde(default)]
      logging: Option<LoggingConfig>
    }

    let peek = toml::from_str::<Peek>(raw).ok()?;
    parse_level(&peek.logging?.level)
  }

  /// The bundled defaults. Never fails; a
  /// broken bundle logs and falls back to
  /// built-in values.
  pub fn embedded() -> Self {
    match Self::from_toml_str(
      DEFAULT_CONFIG_TOML
    ) {
      | Ok(config) => {
        tracing::info!(
          version = config.version,
          timezone = ?config.timezone,
          "loaded embedded calendar config"
        );
        config
      }
      | Err(error) => {
        tracing::error!(
          error = %format!("{error:#}"),
          "failed parsing embedded calendar \
           config; using defaults"
        );
        let mut config = Self::default();
        config.sanitize();
        config
      }
    }
  }

  /// Replaces out-of-range values with
  /// defaults and turns off capabilities
  /// whose endpoints are missing.
  pub fn sanitize(&mut self) {
    let grid = &mut self.grid;
    if grid.locale.trim().is_empty() {
      grid.locale = default_locale();
    }
    if parse_clock(&grid.slot_min_time)
      .is_none()
    {
      tracing::warn!(
        value = %grid.slot_min_time,
        "invalid slot_min_time; using default"
      );
      grid.slot_min_time =
        default_slot_min_time();
    }
    if parse_clock(&grid.slot_max_time)
      .is_none()
    {
      tracing::warn!(
        value = %grid.slot_max_time,
        "invalid slot_max_time; using default"
      );
      grid.slot_max_time =
        default_slot_max_time();
    }
    if parse_clock(&grid.slot_max_time)
      <= parse_clock(&grid.slot_min_time)
    {
      tracing::warn!(
        "slot range is empty; using defaults"
      );
      grid.slot_min_time =
        default_slot_min_time();
      grid.slot_max_time =
        default_slot_max_time();
    }
    if grid.slot_minutes == 0
      || grid.slot_minutes > 240
    {
      grid.slot_minutes =
        default_slot_minutes();
    }
    if grid.month_click_hour > 23 {
      grid.month_click_hour =
        default_month_click_hour();
    }

    if self.timing.notice_dismiss_ms == 0 {
      self.timing.notice_dismiss_ms =
        default_notice_dismiss_ms();
    }

    let known: Vec<String> = self
      .recurrence
      .frequencies
      .iter()
      .filter(|raw| {
        let valid =
          Frequency::from_key(raw).is_some();
        if !valid {
          tracing::warn!(
            frequency = %raw,
            "dropping unknown recurrence \
             frequency"
          );
        }
        valid
      })
      .map(|raw| raw.trim().to_string())
      .collect();
    self.recurrence.frequencies =
      if known.is_empty() {
        default_frequencies()
      } else {
        known
      };
    if self.recurrence.default_occurrences
      == 0
    {
      self.recurrence.default_occurrences =
        default_occurrences();
    }

    if parse_level(&self.logging.level).is_none()
    {
      tracing::warn!(
        value = %self.logging.level,
        "invalid log level; using default"
      );
      self.logging.level = default_log_level();
    }

    if self.closure_form_fields.is_empty() {
      self.closure_form_fields =
        default_closure_form_fields();
    }

    let endpoints = &mut self.endpoints;
    if endpoints.booking_feed.trim().is_empty()
    {
      endpoints.booking_feed =
        Endpoints::default().booking_feed;
    }
    if endpoints
      .closure_delete_base
      .trim()
      .is_empty()
    {
      endpoints.closure_delete_base =
        Endpoints::default()
          .closure_delete_base;
    }
    if endpoints
      .specialists_for_service
      .trim()
      .is_empty()
    {
      endpoints.specialists_for_service =
        default_specialists_url();
    }
    if endpoints.available_cabinets.trim().is_empty()
    {
      endpoints.available_cabinets =
        default_cabinets_url();
    }
    if !endpoints.closure_delete_base.ends_with('/')
    {
      endpoints.closure_delete_base.push('/');
    }

    if self.capabilities.manage_closures
      && (endpoints.closure_feed.trim().is_empty()
        || endpoints
          .closure_create
          .trim()
          .is_empty())
    {
      tracing::warn!(
        "closure endpoints missing; \
         disabling closure management"
      );
      self.capabilities.manage_closures =
        false;
    }
    if self.capabilities.copy_shortcuts
      && endpoints.duplicate.trim().is_empty()
    {
      tracing::warn!(
        "duplicate endpoint missing; \
         disabling copy shortcuts"
      );
      self.capabilities.copy_shortcuts = false;
    }
  }

  pub fn closure_delete_url(
    &self,
    closure_id: &str
  ) -> String {
    format!(
      "{}{closure_id}/delete/",
      self.endpoints.closure_delete_base
    )
  }

  pub fn booking_edit_url(
    &self,
    booking_id: &str
  ) -> String {
    let base = self
      .endpoints
      .booking_edit_base
      .trim_end_matches('/');
    format!("{base}/{booking_id}/?modal=1")
  }

  /// The full-page booking view, used
  /// when the editor cannot load in place.
  pub fn booking_page_url(
    &self,
    booking_id: &str
  ) -> String {
    let base = self
      .endpoints
      .booking_edit_base
      .trim_end_matches('/');
    format!("{base}/{booking_id}/")
  }

  pub fn log_level(&self) -> Level {
    parse_level(&self.logging.level)
      .unwrap_or(Level::INFO)
  }

  pub fn slot_min_time(&self) -> NaiveTime {
    parse_clock(&self.grid.slot_min_time)
      .unwrap_or(NaiveTime::MIN)
  }

  pub fn slot_max_time(&self) -> NaiveTime {
    parse_clock(&self.grid.slot_max_time)
      .unwrap_or(NaiveTime::MIN)
  }

  /// Time of day given to date-only clicks
  /// without a clipboard buffer.
  pub fn month_click_time(&self) -> TimeOfDay {
    TimeOfDay::new(self.grid.month_click_hour, 0)
      .unwrap_or(TimeOfDay {
        hour:   9,
        minute: 0
      })
  }

  pub fn frequencies(&self) -> Vec<Frequency> {
    self
      .recurrence
      .frequencies
      .iter()
      .filter_map(|raw| {
        Frequency::from_key(raw)
      })
      .collect()
  }

  pub fn notice_dismiss(&self) -> Duration {
    Duration::from_millis(
      self.timing.notice_dismiss_ms
    )
  }

  pub fn initial_resize(&self) -> Duration {
    Duration::from_millis(
      self.timing.initial_resize_ms
    )
  }

  pub fn width_resize(&self) -> Duration {
    Duration::from_millis(
      self.timing.width_resize_ms
    )
  }

  pub fn resolve_timezone(&self) -> Tz {
    self
      .timezone
      .as_deref()
      .and_then(parse_timezone)
      .or_else(|| {
        parse_timezone(DEFAULT_TIMEZONE)
      })
      .unwrap_or(chrono_tz::UTC)
  }

  /// The host's wall-clock minute; the
  /// configured zone stands in only when
  /// the host cannot read its clock.
  pub fn local_minute(
    &self,
    wall_clock: Option<NaiveDateTime>
  ) -> NaiveDateTime {
    truncate_to_minute(wall_clock.unwrap_or_else(|| {
      Utc::now()
        .with_timezone(&self.resolve_timezone())
        .naive_local()
    }))
  }
}

fn parse_clock(raw: &str) -> Option<NaiveTime> {
  let trimmed = raw.trim();
  NaiveTime::parse_from_str(trimmed, "%H:%M")
    .or_else(|_| {
      NaiveTime::parse_from_str(
        trimmed, "%H:%M:%S"
      )
    })
    .ok()
}

fn parse_level(raw: &str) -> Option<Level> {
  raw.trim().parse::<Level>().ok()
}

fn parse_timezone(raw: &str) -> Option<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return None;
  }

  match trimmed.parse::<Tz>() {
    | Ok(tz) => Some(tz),
    | Err(error) => {
      tracing::error!(
        timezone = %trimmed,
        error = %error,
        "invalid timezone id"
      );
      None
    }
  }
}
