use bookgrid_shared::{
  EventKind,
  EventProps
};
use chrono::{
  NaiveDate,
  NaiveDateTime,
  NaiveTime
};

use crate::view::{
  ViewType,
  WidthMode
};

pub const CLOSURE_EVENT_CLASS: &str =
  "cabinet-closure-event";

/// Read-only event as rendered by the
/// grid. Times are local wall-clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
  pub id:    String,
  pub start: NaiveDateTime,
  pub end:   Option<NaiveDateTime>,
  pub title: String,
  pub props: EventProps
}

impl CalendarEvent {
  pub fn kind(&self) -> EventKind {
    self.props.kind
  }

  pub fn is_booking(&self) -> bool {
    self.kind() == EventKind::Booking
  }

  pub fn series_id(&self) -> Option<&str> {
    self.props.series_id.as_deref()
  }
}

/// A click on an empty grid slot.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct DateClick {
  pub at:   NaiveDateTime,
  pub view: ViewType
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSource {
  pub url:        String,
  pub class_name: Option<String>
}

/// Construction options handed to the
/// host's grid factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridOptions {
  pub initial_view:     ViewType,
  pub initial_date:     NaiveDate,
  pub locale:           String,
  pub event_sources:    Vec<EventSource>,
  pub slot_min_time:    NaiveTime,
  pub slot_max_time:    NaiveTime,
  pub slot_minutes:     u32,
  pub start_editable:   bool,
  pub duration_editable: bool
}

/// What the grid currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridView {
  pub view_type:   ViewType,
  pub anchor_date: NaiveDate,
  pub title:       String
}

/// Imperative surface of the external
/// calendar widget.
pub trait CalendarGrid {
  fn current_view(&self) -> Option<GridView>;
  fn change_view(&self, view: ViewType);
  /// Drops a custom multi-day range so
  /// the next view uses its own span.
  fn clear_visible_range(&self);
  fn prev(&self);
  fn next(&self);
  fn today(&self);
  fn refetch_events(&self);
  fn update_size(&self);
}

/// Page elements derived from the view
/// state.
pub trait PageChrome {
  fn set_range_title(&self, title: &str);
  fn highlight_view(&self, active: ViewType);
  fn apply_width_mode(&self, mode: WidthMode);
}

/// Right inset given to booking blocks in
/// the multi-column time grids, leaving
/// room to click the free part of a slot.
pub fn booking_right_inset(
  kind: EventKind,
  view: ViewType
) -> Option<&'static str> {
  match (kind, view) {
    | (
      EventKind::Booking,
      ViewType::Week | ViewType::Day
    ) => Some("25%"),
    | _ => None
  }
}
