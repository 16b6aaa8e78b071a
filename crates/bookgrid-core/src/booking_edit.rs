use crate::api::{
  BookingApi,
  FlowOutcome,
  FlowText,
  settle
};
use crate::grid::CalendarGrid;
use crate::notify::Notify;
use crate::quick_booking::{
  BusyGuard,
  FormDialog
};

const TEXT: FlowText = FlowText {
  success_title:     "Success",
  warning_title:     "Success with warning",
  success_message:   "Booking updated",
  failure_message:   "Could not save the booking",
  transport_message: "Could not save the changes. Try again later."
};

/// The editor dialog around a
/// server-rendered booking form.
pub trait BookingEditView: FormDialog {
  /// Swaps in the form markup the server
  /// sent back with its validation errors.
  fn replace_form(&self, html: &str);
}

/// One submit of the booking editor form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingEditSubmission {
  pub booking_id: String,
  pub action:     String,
  pub fields:     Vec<(String, String)>
}

impl BookingEditSubmission {
  /// `form_action` is the form's own
  /// `action`; a blank one falls back to
  /// the booking page.
  pub fn new(
    booking_id: impl Into<String>,
    form_action: Option<&str>,
    fallback_action: impl Into<String>,
    fields: Vec<(String, String)>
  ) -> Self {
    let action = form_action
      .map(str::trim)
      .filter(|action| !action.is_empty())
      .map(str::to_string)
      .unwrap_or_else(|| fallback_action.into());
    Self {
      booking_id: booking_id.into(),
      action,
      fields
    }
  }
}

/// Posts the editor form in place. A
/// rejection keeps the dialog open with
/// the re-rendered form; a success closes
/// it and reloads the events.
#[tracing::instrument(
  skip_all,
  fields(booking_id = %submission.booking_id)
)]
pub async fn submit_booking_edit<A, G, D, N>(
  api: &A,
  grid: &G,
  dialog: &D,
  notifier: &N,
  submission: BookingEditSubmission
) -> FlowOutcome
where
  A: BookingApi,
  G: CalendarGrid,
  D: BookingEditView + ?Sized,
  N: Notify
{
  let _busy = BusyGuard::engage(dialog);
  tracing::debug!(
    action = %submission.action,
    fields = submission.fields.len(),
    "saving booking"
  );

  let result = api
    .submit_booking_form(
      &submission.action,
      &submission.fields
    )
    .await;
  let (outcome, notice) =
    settle(&result, &TEXT);

  match (&result, outcome) {
    | (_, FlowOutcome::Confirmed)
    | (_, FlowOutcome::ConfirmedWithWarning) => {
      dialog.close();
      grid.refetch_events();
      notifier.notify(notice);
    }
    | (Ok(response), FlowOutcome::Rejected) => {
      if let Some(html) = &response.html {
        dialog.replace_form(html);
      }
      // field errors render inside the
      // returned form
      if response.error.is_some()
        || response.html.is_none()
      {
        notifier.notify(notice);
      }
    }
    | _ => notifier.notify(notice)
  }
  outcome
}
