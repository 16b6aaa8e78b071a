use chrono::NaiveDate;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
)]
pub enum ViewType {
  Month,
  Week,
  ThreeDay,
  #[default]
  Day
}

impl ViewType {
  pub const ALL: [ViewType; 4] = [
    ViewType::Month,
    ViewType::Week,
    ViewType::ThreeDay,
    ViewType::Day
  ];

  /// Identifier shared with the grid
  /// widget and the persisted state.
  pub fn as_key(self) -> &'static str {
    match self {
      | ViewType::Month => "dayGridMonth",
      | ViewType::Week => "timeGridWeek",
      | ViewType::ThreeDay => {
        "timeGridThreeDay"
      }
      | ViewType::Day => "timeGridDay"
    }
  }

  pub fn from_key(
    raw: &str
  ) -> Option<Self> {
    match raw.trim() {
      | "dayGridMonth" => {
        Some(ViewType::Month)
      }
      | "timeGridWeek" => {
        Some(ViewType::Week)
      }
      | "timeGridThreeDay" => {
        Some(ViewType::ThreeDay)
      }
      | "timeGridDay" => {
        Some(ViewType::Day)
      }
      | _ => None
    }
  }

  /// Month cells carry no time of day.
  pub fn is_date_only(self) -> bool {
    matches!(self, ViewType::Month)
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
)]
pub enum WidthMode {
  #[default]
  Standard,
  Wide,
  Fullscreen
}

impl WidthMode {
  pub fn as_key(self) -> &'static str {
    match self {
      | WidthMode::Standard => "standard",
      | WidthMode::Wide => "wide",
      | WidthMode::Fullscreen => {
        "fullscreen"
      }
    }
  }

  pub fn from_key(
    raw: &str
  ) -> Option<Self> {
    match raw.trim() {
      | "standard" => {
        Some(WidthMode::Standard)
      }
      | "wide" => Some(WidthMode::Wide),
      | "fullscreen" => {
        Some(WidthMode::Fullscreen)
      }
      | _ => None
    }
  }

  #[must_use]
  pub fn next(self) -> Self {
    match self {
      | WidthMode::Standard => {
        WidthMode::Wide
      }
      | WidthMode::Wide => {
        WidthMode::Fullscreen
      }
      | WidthMode::Fullscreen => {
        WidthMode::Standard
      }
    }
  }

  pub fn page_class(
    self
  ) -> Option<&'static str> {
    match self {
      | WidthMode::Standard => None,
      | WidthMode::Wide => {
        Some("calendar-wide")
      }
      | WidthMode::Fullscreen => {
        Some("calendar-fullscreen")
      }
    }
  }

  /// Toggle button text and icon; the
  /// button announces the next mode.
  pub fn toggle_label(
    self
  ) -> (&'static str, &'static str) {
    match self {
      | WidthMode::Standard => {
        ("Wide mode", "bi bi-arrows-expand")
      }
      | WidthMode::Wide => (
        "Fullscreen",
        "bi bi-arrows-fullscreen"
      ),
      | WidthMode::Fullscreen => (
        "Standard mode",
        "bi bi-arrows-collapse"
      )
    }
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct ViewState {
  pub view_type:   ViewType,
  pub anchor_date: NaiveDate
}

impl ViewState {
  pub fn new(
    view_type: ViewType,
    anchor_date: NaiveDate
  ) -> Self {
    Self {
      view_type,
      anchor_date
    }
  }
}
