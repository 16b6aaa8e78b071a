use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use bookgrid_shared::{
  ClosureCreateArgs,
  ClosureIdArg,
  EventKind
};
use chrono::NaiveDateTime;

use crate::api::{
  BookingApi,
  FlowOutcome,
  FlowText,
  settle
};
use crate::datetime::{
  add_hours,
  encode_local_minute,
  format_period,
  truncate_to_minute
};
use crate::grid::{
  CalendarEvent,
  CalendarGrid
};
use crate::notify::Notify;
use crate::quick_booking::{
  BusyGuard,
  FormDialog
};

const CREATE_TEXT: FlowText = FlowText {
  success_title:     "Success",
  warning_title:     "Success with warning",
  success_message:   "Cabinet closure created",
  failure_message:   "Could not create the closure",
  transport_message: "An error occurred while creating the cabinet closure"
};

const DELETE_TEXT: FlowText = FlowText {
  success_title:     "Success",
  warning_title:     "Success with warning",
  success_message:   "Cabinet closure deleted",
  failure_message:   "Could not delete the cabinet closure",
  transport_message: "An error occurred while deleting the cabinet closure"
};

/// Error key for messages not tied to a
/// single field.
pub const NON_FIELD_ERRORS: &str = "__all__";

/// Start/end picker pair. The end never
/// precedes the start.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct LinkedRange {
  start: NaiveDateTime,
  end:   NaiveDateTime
}

impl LinkedRange {
  /// One hour from `anchor`, seconds
  /// zeroed.
  pub fn seed(anchor: NaiveDateTime) -> Self {
    let start = truncate_to_minute(anchor);
    Self {
      start,
      end: add_hours(start, 1)
    }
  }

  pub fn start(&self) -> NaiveDateTime {
    self.start
  }

  pub fn end(&self) -> NaiveDateTime {
    self.end
  }

  /// Lower bound of the end picker.
  pub fn min_end(&self) -> NaiveDateTime {
    self.start
  }

  pub fn set_start(
    &mut self,
    start: NaiveDateTime
  ) {
    self.start = start;
    if self.end <= start {
      self.end = add_hours(start, 1);
    }
  }

  pub fn set_end(
    &mut self,
    end: NaiveDateTime
  ) {
    self.end = end.max(self.start);
  }
}

/// Closure-creation form contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosureDraft {
  pub cabinet: String,
  pub range:   LinkedRange,
  pub reason:  String
}

impl ClosureDraft {
  pub fn open(anchor: NaiveDateTime) -> Self {
    Self {
      cabinet: String::new(),
      range:   LinkedRange::seed(anchor),
      reason:  String::new()
    }
  }

  pub fn to_args(&self) -> ClosureCreateArgs {
    ClosureCreateArgs {
      cabinet:    self.cabinet.trim().to_string(),
      start_time: encode_local_minute(
        self.range.start()
      ),
      end_time:   encode_local_minute(
        self.range.end()
      ),
      reason:     self.reason.trim().to_string()
    }
  }
}

/// Server field errors arranged for the
/// closure dialog.
#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub struct ErrorLayout {
  pub fields:  BTreeMap<String, String>,
  pub general: Option<String>
}

impl ErrorLayout {
  /// Messages for `known_fields` go beside
  /// their input; everything else is
  /// joined into the general region.
  pub fn build(
    errors: &BTreeMap<String, Vec<String>>,
    known_fields: &[String]
  ) -> Self {
    let mut fields = BTreeMap::new();
    let mut general = Vec::new();

    for (field, messages) in errors {
      let text = messages.join(" ");
      if text.trim().is_empty() {
        continue;
      }
      if field != NON_FIELD_ERRORS
        && known_fields.contains(field)
      {
        fields.insert(field.clone(), text);
      } else if field == NON_FIELD_ERRORS {
        general.insert(0, text);
      } else {
        general.push(text);
      }
    }

    Self {
      fields,
      general: (!general.is_empty())
        .then(|| general.join(" "))
    }
  }

  pub fn is_empty(&self) -> bool {
    self.fields.is_empty()
      && self.general.is_none()
  }
}

/// Closure creation dialog.
pub trait ClosureFormView: FormDialog {
  fn clear_errors(&self);
  fn show_errors(&self, layout: &ErrorLayout);
}

/// What the delete confirmation shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosureDeletePrompt {
  pub closure_id: String,
  pub cabinet:    String,
  pub period:     String
}

/// Closure deletion confirmation dialog.
pub trait ConfirmDialog: FormDialog {
  fn show_prompt(
    &self,
    prompt: &ClosureDeletePrompt
  );
}

/// Closure awaiting confirmation, shared
/// between the click handler and the
/// delete flow.
#[derive(Debug, Clone, Default)]
pub struct PendingClosureDeletion(
  Rc<RefCell<Option<String>>>
);

impl PendingClosureDeletion {
  pub fn set(&self, closure_id: &str) {
    *self.0.borrow_mut() =
      Some(closure_id.to_string());
  }

  pub fn get(&self) -> Option<String> {
    self.0.borrow().clone()
  }

  pub fn take(&self) -> Option<String> {
    self.0.borrow_mut().take()
  }

  pub fn is_pending(&self) -> bool {
    self.0.borrow().is_some()
  }
}

/// Records a pending deletion when the
/// event is a deletable closure and the
/// operator may manage closures.
pub fn prompt_delete(
  event: &CalendarEvent,
  can_manage: bool,
  pending: &PendingClosureDeletion
) -> Option<ClosureDeletePrompt> {
  if !can_manage
    || event.kind() != EventKind::Closure
    || !event.props.can_delete
  {
    return None;
  }

  pending.set(&event.id);
  Some(ClosureDeletePrompt {
    closure_id: event.id.clone(),
    cabinet:    event
      .props
      .cabinet
      .clone()
      .unwrap_or_default(),
    period:     format_period(
      event.start,
      event.end
    )
  })
}

/// Posts the closure form. Rejections are
/// shown on the dialog, which stays open.
#[tracing::instrument(
  skip_all,
  fields(cabinet = %args.cabinet)
)]
pub async fn submit_create<A, G, F, N>(
  api: &A,
  grid: &G,
  form: &F,
  notifier: &N,
  args: ClosureCreateArgs,
  known_fields: &[String]
) -> FlowOutcome
where
  A: BookingApi,
  G: CalendarGrid,
  F: ClosureFormView + ?Sized,
  N: Notify
{
  let _busy = BusyGuard::engage(form);
  form.clear_errors();

  let result = api.create_closure(&args).await;
  let (outcome, notice) =
    settle(&result, &CREATE_TEXT);

  if outcome.is_success() {
    form.close();
    notifier.notify(notice);
    grid.refetch_events();
    return outcome;
  }

  if let Ok(response) = &result {
    let layout = ErrorLayout::build(
      &response.errors,
      known_fields
    );
    if !layout.is_empty() {
      form.show_errors(&layout);
    }
  }
  notifier.notify(notice);
  outcome
}

/// Deletes the pending closure, if any.
/// The pending handle is cleared however
/// the request ends.
pub async fn confirm_delete<A, G, C, N>(
  api: &A,
  grid: &G,
  dialog: &C,
  notifier: &N,
  pending: &PendingClosureDeletion
) -> Option<FlowOutcome>
where
  A: BookingApi,
  G: CalendarGrid,
  C: ConfirmDialog + ?Sized,
  N: Notify
{
  let closure_id = pending.get()?;
  let _clear = ClearPending(pending);
  Some(
    delete_closure(
      api, grid, dialog, notifier,
      closure_id
    )
    .await
  )
}

struct ClearPending<'p>(
  &'p PendingClosureDeletion
);

impl Drop for ClearPending<'_> {
  fn drop(&mut self) {
    self.0.take();
  }
}

#[tracing::instrument(
  skip(api, grid, dialog, notifier)
)]
async fn delete_closure<A, G, C, N>(
  api: &A,
  grid: &G,
  dialog: &C,
  notifier: &N,
  closure_id: String
) -> FlowOutcome
where
  A: BookingApi,
  G: CalendarGrid,
  C: ConfirmDialog + ?Sized,
  N: Notify
{
  let _busy = BusyGuard::engage(dialog);

  let result = api
    .delete_closure(&ClosureIdArg {
      closure_id
    })
    .await;
  let (outcome, notice) =
    settle(&result, &DELETE_TEXT);

  if outcome.is_success() {
    dialog.close();
    notifier.notify(notice);
    grid.refetch_events();
  } else {
    notifier.notify(notice);
  }
  outcome
}

#[cfg(test)]
mod tests {
  use bookgrid_shared::EventProps;
  use chrono::NaiveDate;

  use super::*;

  fn at(
    d: u32,
    h: u32,
    min: u32,
    s: u32
  ) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, d)
      .and_then(|date| {
        date.and_hms_opt(h, min, s)
      })
      .expect("valid datetime")
  }

  fn closure(
    can_delete: bool
  ) -> CalendarEvent {
    CalendarEvent {
      id:    "12".to_string(),
      start: at(5, 10, 0, 0),
      end:   Some(at(5, 11, 30, 0)),
      title: "Closed".to_string(),
      props: EventProps {
        kind: EventKind::Closure,
        can_delete,
        cabinet: Some("Sauna".to_string()),
        ..EventProps::default()
      }
    }
  }

  #[test]
  fn seeding_zeroes_seconds_and_spans_an_hour(
  ) {
    let range = LinkedRange::seed(at(5, 9, 17, 42));
    assert_eq!(range.start(), at(5, 9, 17, 0));
    assert_eq!(range.end(), at(5, 10, 17, 0));
    assert_eq!(range.min_end(), range.start());
  }

  #[test]
  fn moving_start_past_end_pushes_the_end() {
    let mut range =
      LinkedRange::seed(at(5, 9, 0, 0));

    range.set_start(at(5, 9, 30, 0));
    assert_eq!(range.end(), at(5, 10, 0, 0));

    range.set_start(at(5, 10, 0, 0));
    assert_eq!(range.end(), at(5, 11, 0, 0));
  }

  #[test]
  fn end_before_start_is_clamped() {
    let mut range =
      LinkedRange::seed(at(5, 9, 0, 0));
    range.set_end(at(5, 8, 0, 0));
    assert_eq!(range.end(), at(5, 9, 0, 0));
  }

  #[test]
  fn draft_encodes_local_minutes() {
    let mut draft =
      ClosureDraft::open(at(5, 9, 0, 0));
    draft.cabinet = "4".to_string();
    draft.reason = " repairs ".to_string();

    let args = draft.to_args();
    assert_eq!(args.start_time, "2025-06-05T09:00");
    assert_eq!(args.end_time, "2025-06-05T10:00");
    assert_eq!(args.reason, "repairs");
  }

  #[test]
  fn unknown_and_general_errors_share_a_region(
  ) {
    let mut errors = BTreeMap::new();
    errors.insert(
      "start_time".to_string(),
      vec!["Required".to_string()]
    );
    errors.insert(
      NON_FIELD_ERRORS.to_string(),
      vec!["Overlaps a booking".to_string()]
    );
    errors.insert(
      "zone".to_string(),
      vec!["Unknown zone".to_string()]
    );
    let known = vec![
      "cabinet".to_string(),
      "start_time".to_string()
    ];

    let layout = ErrorLayout::build(&errors, &known);
    assert_eq!(
      layout.fields.get("start_time").map(String::as_str),
      Some("Required")
    );
    assert_eq!(
      layout.general.as_deref(),
      Some("Overlaps a booking Unknown zone")
    );
  }

  #[test]
  fn prompt_requires_capability_and_permission(
  ) {
    let pending = PendingClosureDeletion::default();

    assert_eq!(
      prompt_delete(&closure(true), false, &pending),
      None
    );
    assert_eq!(
      prompt_delete(&closure(false), true, &pending),
      None
    );
    assert!(!pending.is_pending());

    let prompt =
      prompt_delete(&closure(true), true, &pending)
        .expect("prompt");
    assert_eq!(prompt.cabinet, "Sauna");
    assert_eq!(
      prompt.period,
      "05 June, 10:00 – 05 June, 11:30"
    );
    assert_eq!(pending.get().as_deref(), Some("12"));
  }

  #[test]
  fn bookings_are_never_closure_prompts() {
    let pending = PendingClosureDeletion::default();
    let mut booking = closure(true);
    booking.props.kind = EventKind::Booking;
    assert_eq!(
      prompt_delete(&booking, true, &pending),
      None
    );
  }
}
