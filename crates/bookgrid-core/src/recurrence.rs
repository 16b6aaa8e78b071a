use std::collections::BTreeSet;
use std::sync::OnceLock;

use bookgrid_shared::RecurrenceArgs;
use chrono::NaiveDate;
use regex::Regex;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
)]
pub enum Frequency {
  #[default]
  Daily,
  Weekly,
  Monthly,
  Yearly
}

impl Frequency {
  pub const ALL: [Frequency; 4] = [
    Frequency::Daily,
    Frequency::Weekly,
    Frequency::Monthly,
    Frequency::Yearly
  ];

  pub fn as_key(self) -> &'static str {
    match self {
      | Frequency::Daily => "daily",
      | Frequency::Weekly => "weekly",
      | Frequency::Monthly => "monthly",
      | Frequency::Yearly => "yearly"
    }
  }

  pub fn from_key(
    raw: &str
  ) -> Option<Self> {
    match raw.trim() {
      | "daily" => Some(Frequency::Daily),
      | "weekly" => Some(Frequency::Weekly),
      | "monthly" => {
        Some(Frequency::Monthly)
      }
      | "yearly" => Some(Frequency::Yearly),
      | _ => None
    }
  }

  pub fn unit_label(self) -> &'static str {
    match self {
      | Frequency::Daily => "days",
      | Frequency::Weekly => "weeks",
      | Frequency::Monthly => "months",
      | Frequency::Yearly => "years"
    }
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
pub enum EndCondition {
  #[default]
  Count,
  Until
}

impl EndCondition {
  pub fn as_key(self) -> &'static str {
    match self {
      | EndCondition::Count => "count",
      | EndCondition::Until => "until"
    }
  }

  pub fn from_key(
    raw: &str
  ) -> Option<Self> {
    match raw.trim() {
      | "count" => Some(EndCondition::Count),
      | "until" => Some(EndCondition::Until),
      | _ => None
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceDraft {
  pub enabled:          bool,
  pub frequency:        Frequency,
  pub interval:         u32,
  /// Monday = 0.
  pub active_weekdays:  BTreeSet<u8>,
  pub end_condition:    EndCondition,
  pub occurrence_count: u32,
  pub until_date:       Option<NaiveDate>,
  /// Raw text as typed by the operator.
  pub excluded_input:   String,
  pub excluded_dates:   Vec<String>
}

/// Visibility of the recurrence panel's
/// parts.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct RecurrencePanel {
  pub visible:          bool,
  pub interval_label:   &'static str,
  pub weekdays_visible: bool,
  pub count_visible:    bool,
  pub until_visible:    bool
}

/// Recurrence sub-panel of the quick
/// booking form.
#[derive(Debug, Clone)]
pub struct RecurrenceBuilder {
  frequencies:         Vec<Frequency>,
  default_occurrences: u32,
  draft:               RecurrenceDraft
}

impl RecurrenceBuilder {
  /// `frequencies` lists the form's
  /// options in display order.
  pub fn new(
    frequencies: Vec<Frequency>,
    default_occurrences: u32
  ) -> Self {
    let frequencies = if frequencies.is_empty()
    {
      vec![Frequency::default()]
    } else {
      frequencies
    };
    let default_occurrences =
      default_occurrences.max(1);
    let draft = Self::default_draft(
      frequencies[0],
      default_occurrences
    );
    Self {
      frequencies,
      default_occurrences,
      draft
    }
  }

  fn default_draft(
    frequency: Frequency,
    occurrence_count: u32
  ) -> RecurrenceDraft {
    RecurrenceDraft {
      enabled: false,
      frequency,
      interval: 1,
      active_weekdays: BTreeSet::new(),
      end_condition: EndCondition::Count,
      occurrence_count,
      until_date: None,
      excluded_input: String::new(),
      excluded_dates: Vec::new()
    }
  }

  pub fn draft(&self) -> &RecurrenceDraft {
    &self.draft
  }

  pub fn frequencies(&self) -> &[Frequency] {
    &self.frequencies
  }

  pub fn reset(&mut self) {
    self.draft = Self::default_draft(
      self.frequencies[0],
      self.default_occurrences
    );
  }

  pub fn set_enabled(
    &mut self,
    enabled: bool
  ) {
    self.draft.enabled = enabled;
    if !enabled {
      self.draft.excluded_input.clear();
      self.draft.excluded_dates.clear();
    }
  }

  pub fn on_frequency_change(
    &mut self,
    frequency: Frequency
  ) {
    self.draft.frequency = frequency;
  }

  pub fn on_end_condition_change(
    &mut self,
    end_condition: EndCondition
  ) {
    self.draft.end_condition = end_condition;
  }

  pub fn set_interval(
    &mut self,
    interval: u32
  ) {
    self.draft.interval = interval.max(1);
  }

  pub fn set_occurrence_count(
    &mut self,
    count: u32
  ) {
    self.draft.occurrence_count = count.max(1);
  }

  pub fn set_until_date(
    &mut self,
    until: Option<NaiveDate>
  ) {
    self.draft.until_date = until;
  }

  /// Returns whether the day is now on.
  pub fn toggle_weekday(
    &mut self,
    weekday: u8
  ) -> bool {
    if weekday > 6 {
      return false;
    }
    if self.draft.active_weekdays.remove(&weekday)
    {
      false
    } else {
      self.draft.active_weekdays.insert(weekday);
      true
    }
  }

  /// Keeps the raw input and its
  /// normalized form together.
  pub fn set_excluded_input(
    &mut self,
    raw: &str
  ) {
    self.draft.excluded_input = raw.to_string();
    self.draft.excluded_dates =
      normalize_excluded_dates(raw);
  }

  pub fn panel(&self) -> RecurrencePanel {
    let draft = &self.draft;
    RecurrencePanel {
      visible:          draft.enabled,
      interval_label:   draft.frequency.unit_label(),
      weekdays_visible: draft.frequency
        == Frequency::Weekly,
      count_visible:    draft.end_condition
        == EndCondition::Count,
      until_visible:    draft.end_condition
        == EndCondition::Until
    }
  }

  /// Form fields for submission; `None`
  /// while recurrence is off.
  pub fn form_fields(
    &self
  ) -> Option<RecurrenceArgs> {
    let draft = &self.draft;
    if !draft.enabled {
      return None;
    }

    let weekdays =
      if draft.frequency == Frequency::Weekly {
        draft
          .active_weekdays
          .iter()
          .copied()
          .collect()
      } else {
        Vec::new()
      };
    let (occurrences, end_date) =
      match draft.end_condition {
        | EndCondition::Count => {
          (Some(draft.occurrence_count), None)
        }
        | EndCondition::Until => (
          None,
          draft.until_date.map(|date| {
            date.format("%Y-%m-%d").to_string()
          })
        )
      };

    Some(RecurrenceArgs {
      recurrence_enabled: true,
      recurrence_frequency: draft
        .frequency
        .as_key()
        .to_string(),
      recurrence_interval: draft.interval,
      recurrence_weekdays: weekdays,
      recurrence_end_type: draft
        .end_condition
        .as_key()
        .to_string(),
      recurrence_occurrences: occurrences,
      recurrence_end_date: end_date,
      recurrence_excluded_dates:
        excluded_dates_field(
          &draft.excluded_dates
        )
    })
  }
}

fn iso_date_re() -> Option<&'static Regex> {
  static ISO_DATE: OnceLock<Option<Regex>> =
    OnceLock::new();
  ISO_DATE
    .get_or_init(|| {
      Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$")
        .ok()
    })
    .as_ref()
}

fn local_date_re() -> Option<&'static Regex> {
  static LOCAL_DATE: OnceLock<Option<Regex>> =
    OnceLock::new();
  LOCAL_DATE
    .get_or_init(|| {
      Regex::new(
        r"^(\d{1,2})\.(\d{1,2})\.(\d{4})$"
      )
      .ok()
    })
    .as_ref()
}

/// Reads one excluded-date token as
/// `YYYY-MM-DD` or `DD.MM.YYYY` (slashes
/// count as dots). The parts must name a
/// real calendar day.
fn parse_excluded_date(
  token: &str
) -> Option<NaiveDate> {
  let token = token.replace('/', ".");
  let (year, month, day) = if let Some(caps) =
    iso_date_re()?.captures(&token)
  {
    (
      caps[1].parse().ok()?,
      caps[2].parse().ok()?,
      caps[3].parse().ok()?
    )
  } else {
    let caps = local_date_re()?.captures(&token)?;
    (
      caps[3].parse().ok()?,
      caps[2].parse().ok()?,
      caps[1].parse().ok()?
    )
  };
  NaiveDate::from_ymd_opt(year, month, day)
}

/// Splits on commas and converts every
/// readable token to ISO form. Other
/// tokens are dropped; order and
/// duplicates are kept.
pub fn normalize_excluded_dates(
  raw: &str
) -> Vec<String> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|token| !token.is_empty())
    .filter_map(|token| {
      let date = parse_excluded_date(token);
      if date.is_none() {
        tracing::debug!(
          token,
          "dropping unreadable excluded date"
        );
      }
      date
    })
    .map(|date| date.format("%Y-%m-%d").to_string())
    .collect()
}

/// Hidden-field encoding: a JSON array,
/// or empty when nothing is excluded.
pub fn excluded_dates_field(
  dates: &[String]
) -> String {
  if dates.is_empty() {
    return String::new();
  }
  serde_json::to_string(dates)
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn builder() -> RecurrenceBuilder {
    RecurrenceBuilder::new(
      vec![
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Yearly,
      ],
      2
    )
  }

  #[test]
  fn normalizes_mixed_formats_in_order() {
    assert_eq!(
      normalize_excluded_dates(
        "01.03.2025, 2025-04-02, bogus"
      ),
      vec!["2025-03-01", "2025-04-02"]
    );
  }

  #[test]
  fn pads_short_local_dates_and_accepts_slashes(
  ) {
    assert_eq!(
      normalize_excluded_dates(
        "1.3.2025,5/11/2025 , ,2025-1-02"
      ),
      vec!["2025-03-01", "2025-11-05"]
    );
  }

  #[test]
  fn drops_tokens_that_are_not_calendar_days(
  ) {
    let cases = [
      ("99.99.2025", Vec::<&str>::new()),
      ("31.02.2025", vec![]),
      ("2025-13-40", vec![]),
      ("29.02.2023, 29.02.2024", vec!["2024-02-29"]),
      ("2025-04-31,30.04.2025", vec!["2025-04-30"]),
      ("1.3/2025", vec!["2025-03-01"]),
      ("2025/04/02", vec![]),
      ("01-03-2025, 1.3.25", vec![]),
      (",,, ,05.05.2025,", vec!["2025-05-05"]),
      ("05.05.2025 06.05.2025", vec![]),
    ];

    for (raw, expected) in cases {
      assert_eq!(
        normalize_excluded_dates(raw),
        expected,
        "{raw}"
      );
    }
  }

  #[test]
  fn builder_keeps_only_real_days() {
    let mut builder = builder();
    builder.set_enabled(true);
    builder.set_excluded_input(
      "31.02.2025, 10/06/2025, tomorrow"
    );

    assert_eq!(
      builder.draft().excluded_input,
      "31.02.2025, 10/06/2025, tomorrow"
    );
    assert_eq!(
      builder.draft().excluded_dates,
      vec!["2025-06-10".to_string()]
    );
    let fields =
      builder.form_fields().expect("enabled");
    assert_eq!(
      fields.recurrence_excluded_dates,
      r#"["2025-06-10"]"#
    );

    builder.set_excluded_input("99.99.2025");
    let fields =
      builder.form_fields().expect("enabled");
    assert_eq!(fields.recurrence_excluded_dates, "");
  }

  #[test]
  fn keeps_duplicates() {
    assert_eq!(
      normalize_excluded_dates(
        "2025-04-02, 02.04.2025"
      ),
      vec!["2025-04-02", "2025-04-02"]
    );
    assert!(normalize_excluded_dates("").is_empty());
  }

  #[test]
  fn disabling_clears_raw_and_normalized_together(
  ) {
    let mut builder = builder();
    builder.set_enabled(true);
    builder.set_excluded_input("01.03.2025");
    assert_eq!(
      builder.draft().excluded_dates.len(),
      1
    );

    builder.set_enabled(false);
    assert!(builder.draft().excluded_input.is_empty());
    assert!(builder.draft().excluded_dates.is_empty());
    assert!(!builder.panel().visible);
  }

  #[test]
  fn weekdays_show_only_for_weekly() {
    let mut builder = builder();
    builder.set_enabled(true);
    for frequency in builder.frequencies().to_vec() {
      builder.on_frequency_change(frequency);
      let panel = builder.panel();
      assert_eq!(
        panel.weekdays_visible,
        frequency == Frequency::Weekly
      );
      assert_eq!(
        panel.interval_label,
        frequency.unit_label()
      );
    }
  }

  #[test]
  fn exactly_one_end_field_is_visible() {
    let mut builder = builder();
    for end in [
      EndCondition::Count,
      EndCondition::Until
    ] {
      builder.on_end_condition_change(end);
      let panel = builder.panel();
      assert!(
        panel.count_visible ^ panel.until_visible
      );
    }
  }

  #[test]
  fn reset_restores_defaults() {
    let mut builder = builder();
    builder.set_enabled(true);
    builder.on_frequency_change(Frequency::Weekly);
    builder.toggle_weekday(2);
    builder.set_occurrence_count(9);
    builder.on_end_condition_change(
      EndCondition::Until
    );
    builder.set_excluded_input("2025-04-02");

    builder.reset();
    let draft = builder.draft();
    assert!(!draft.enabled);
    assert_eq!(draft.frequency, Frequency::Daily);
    assert_eq!(draft.occurrence_count, 2);
    assert_eq!(draft.end_condition, EndCondition::Count);
    assert!(draft.active_weekdays.is_empty());
    assert!(draft.excluded_dates.is_empty());
  }

  #[test]
  fn form_fields_follow_the_end_condition() {
    let mut builder = builder();
    assert_eq!(builder.form_fields(), None);

    builder.set_enabled(true);
    builder.on_frequency_change(Frequency::Weekly);
    builder.toggle_weekday(4);
    builder.toggle_weekday(0);
    builder.set_excluded_input("01.03.2025");
    let counted =
      builder.form_fields().expect("enabled");
    assert_eq!(counted.recurrence_weekdays, vec![0, 4]);
    assert_eq!(counted.recurrence_occurrences, Some(2));
    assert_eq!(counted.recurrence_end_date, None);
    assert_eq!(
      counted.recurrence_excluded_dates,
      r#"["2025-03-01"]"#
    );

    builder.on_end_condition_change(
      EndCondition::Until
    );
    builder.set_until_date(NaiveDate::from_ymd_opt(
      2025, 9, 30
    ));
    let until =
      builder.form_fields().expect("enabled");
    assert_eq!(until.recurrence_occurrences, None);
    assert_eq!(
      until.recurrence_end_date.as_deref(),
      Some("2025-09-30")
    );
    assert_eq!(until.recurrence_end_type, "until");
  }

  #[test]
  fn out_of_range_weekdays_are_ignored() {
    let mut builder = builder();
    assert!(!builder.toggle_weekday(7));
    assert!(builder.toggle_weekday(6));
    assert!(!builder.toggle_weekday(6));
    assert!(builder.draft().active_weekdays.is_empty());
  }
}
