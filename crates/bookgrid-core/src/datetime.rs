use chrono::{
  DateTime,
  Duration,
  Local,
  NaiveDate,
  NaiveDateTime,
  NaiveTime,
  TimeZone,
  Timelike
};

/// Wire format of every mutation
/// endpoint: local wall-clock time,
/// minute precision, no zone suffix.
pub const LOCAL_MINUTE_FORMAT: &str =
  "%Y-%m-%dT%H:%M";

const PERIOD_FORMAT: &str =
  "%d %B, %H:%M";

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct TimeOfDay {
  pub hour:   u32,
  pub minute: u32
}

impl TimeOfDay {
  pub fn new(
    hour: u32,
    minute: u32
  ) -> Option<Self> {
    (hour < 24 && minute < 60)
      .then_some(Self { hour, minute })
  }

  pub fn of(at: NaiveDateTime) -> Self {
    Self {
      hour:   at.hour(),
      minute: at.minute()
    }
  }

  pub fn on(
    self,
    date: NaiveDate
  ) -> NaiveDateTime {
    let time = NaiveTime::from_hms_opt(
      self.hour,
      self.minute,
      0
    )
    .unwrap_or(NaiveTime::MIN);
    date.and_time(time)
  }
}

#[must_use]
pub fn encode_local_minute(
  at: NaiveDateTime
) -> String {
  at.format(LOCAL_MINUTE_FORMAT)
    .to_string()
}

/// Accepts the minute encoding plus the
/// second-precision and space-separated
/// variants the backend forms accept.
pub fn parse_local_minute(
  raw: &str
) -> Option<NaiveDateTime> {
  let trimmed = raw.trim();
  [
    LOCAL_MINUTE_FORMAT,
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S"
  ]
  .iter()
  .find_map(|format| {
    NaiveDateTime::parse_from_str(
      trimmed, format
    )
    .ok()
  })
}

/// Stored anchor dates: plain ISO dates,
/// or full RFC 3339 timestamps written
/// by older clients, read in the local
/// zone.
pub fn parse_stored_date(
  raw: &str
) -> Option<NaiveDate> {
  parse_stored_date_in(raw, &Local)
}

/// Timestamps land on the calendar day
/// they show in `zone`, not their UTC day.
pub fn parse_stored_date_in<Z>(
  raw: &str,
  zone: &Z
) -> Option<NaiveDate>
where
  Z: TimeZone
{
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return None;
  }

  if let Ok(date) =
    NaiveDate::parse_from_str(
      trimmed, "%Y-%m-%d"
    )
  {
    return Some(date);
  }

  DateTime::parse_from_rfc3339(trimmed)
    .ok()
    .map(|stamp| {
      stamp.with_timezone(zone).date_naive()
    })
}

#[must_use]
pub fn truncate_to_minute(
  at: NaiveDateTime
) -> NaiveDateTime {
  at.with_second(0)
    .and_then(|at| at.with_nanosecond(0))
    .unwrap_or(at)
}

#[must_use]
pub fn add_hours(
  at: NaiveDateTime,
  hours: i64
) -> NaiveDateTime {
  at.checked_add_signed(Duration::hours(
    hours
  ))
  .unwrap_or(at)
}

#[must_use]
pub fn format_period(
  start: NaiveDateTime,
  end: Option<NaiveDateTime>
) -> String {
  let start_text =
    start.format(PERIOD_FORMAT);
  match end {
    | Some(end) => {
      format!(
        "{start_text} – {}",
        end.format(PERIOD_FORMAT)
      )
    }
    | None => start_text.to_string()
  }
}

#[cfg(test)]
mod tests {
  use chrono::{
    FixedOffset,
    Utc
  };

  use super::*;

  fn at(
    y: i32,
    m: u32,
    d: u32,
    h: u32,
    min: u32
  ) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
      .and_then(|date| {
        date.and_hms_opt(h, min, 0)
      })
      .expect("valid datetime")
  }

  #[test]
  fn encodes_zero_padded_local_minutes(
  ) {
    assert_eq!(
      encode_local_minute(at(
        2025, 6, 1, 14, 30
      )),
      "2025-06-01T14:30"
    );
    assert_eq!(
      encode_local_minute(at(
        2025, 1, 9, 7, 5
      )),
      "2025-01-09T07:05"
    );
  }

  #[test]
  fn encoding_drops_seconds() {
    let with_seconds =
      NaiveDate::from_ymd_opt(2025, 3, 4)
        .and_then(|date| {
          date.and_hms_opt(8, 15, 59)
        })
        .expect("valid datetime");
    assert_eq!(
      encode_local_minute(with_seconds),
      "2025-03-04T08:15"
    );
    assert_eq!(
      truncate_to_minute(with_seconds),
      at(2025, 3, 4, 8, 15)
    );
  }

  #[test]
  fn parses_backend_datetime_variants() {
    let expected = at(2025, 6, 1, 14, 30);
    for raw in [
      "2025-06-01T14:30",
      "2025-06-01T14:30:00",
      "2025-06-01 14:30",
      " 2025-06-01 14:30:00 "
    ] {
      assert_eq!(
        parse_local_minute(raw),
        Some(expected),
        "{raw}"
      );
    }
    assert_eq!(
      parse_local_minute("tomorrow"),
      None
    );
  }

  #[test]
  fn stored_dates_accept_legacy_timestamps(
  ) {
    let expected =
      NaiveDate::from_ymd_opt(2025, 6, 1)
        .expect("valid date");
    assert_eq!(
      parse_stored_date("2025-06-01"),
      Some(expected)
    );
    assert_eq!(
      parse_stored_date_in(
        "2025-06-01T09:00:00.000Z",
        &Utc
      ),
      Some(expected)
    );
    assert_eq!(
      parse_stored_date("garbage"),
      None
    );
    assert_eq!(parse_stored_date(""), None);
  }

  #[test]
  fn legacy_timestamps_use_the_local_day() {
    let moscow = FixedOffset::east_opt(3 * 3600)
      .expect("valid offset");
    let new_york =
      FixedOffset::west_opt(4 * 3600)
        .expect("valid offset");

    // saved by toISOString() at 00:30 in
    // Moscow
    assert_eq!(
      parse_stored_date_in(
        "2025-05-31T21:30:00.000Z",
        &moscow
      ),
      NaiveDate::from_ymd_opt(2025, 6, 1)
    );
    assert_eq!(
      parse_stored_date_in(
        "2025-06-01T02:00:00Z",
        &new_york
      ),
      NaiveDate::from_ymd_opt(2025, 5, 31)
    );
    assert_eq!(
      parse_stored_date_in("2025-06-01", &moscow),
      NaiveDate::from_ymd_opt(2025, 6, 1)
    );
  }

  #[test]
  fn time_of_day_moves_to_another_date() {
    let source = at(2025, 6, 1, 10, 45);
    let target =
      NaiveDate::from_ymd_opt(2025, 6, 9)
        .expect("valid date");
    assert_eq!(
      TimeOfDay::of(source).on(target),
      at(2025, 6, 9, 10, 45)
    );
    assert_eq!(TimeOfDay::new(24, 0), None);
  }

  #[test]
  fn formats_closure_periods() {
    assert_eq!(
      format_period(
        at(2025, 6, 5, 10, 0),
        Some(at(2025, 6, 5, 11, 30))
      ),
      "05 June, 10:00 – 05 June, 11:30"
    );
  }
}
