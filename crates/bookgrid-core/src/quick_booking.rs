use bookgrid_shared::QuickBookingArgs;
use chrono::NaiveDateTime;

use crate::api::{
  BookingApi,
  FlowOutcome,
  FlowText,
  settle
};
use crate::datetime::encode_local_minute;
use crate::grid::{
  CalendarGrid,
  DateClick
};
use crate::notify::Notify;
use crate::recurrence::RecurrenceBuilder;

const TEXT: FlowText = FlowText {
  success_title:     "Success",
  warning_title:     "Success with warning",
  success_message:   "Booking created",
  failure_message:   "Could not create the booking",
  transport_message: "An error occurred while creating the booking"
};

/// Modal form surface shared by the
/// quick-entry and closure dialogs.
pub trait FormDialog {
  /// Disables the submit control while a
  /// request is in flight.
  fn set_busy(&self, busy: bool);
  fn close(&self);
}

/// Re-enables the submit control however
/// the flow ends.
pub(crate) struct BusyGuard<'d, D>
where
  D: FormDialog + ?Sized
{
  dialog: &'d D
}

impl<'d, D> BusyGuard<'d, D>
where
  D: FormDialog + ?Sized
{
  pub(crate) fn engage(
    dialog: &'d D
  ) -> Self {
    dialog.set_busy(true);
    Self { dialog }
  }
}

impl<D> Drop for BusyGuard<'_, D>
where
  D: FormDialog + ?Sized
{
  fn drop(&mut self) {
    self.dialog.set_busy(false);
  }
}

/// Slot a quick booking starts from.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct QuickBookingSeed {
  pub start:     NaiveDateTime,
  pub date_only: bool
}

impl QuickBookingSeed {
  pub fn from_click(
    click: DateClick,
    start: NaiveDateTime
  ) -> Self {
    Self {
      start,
      date_only: click.view.is_date_only()
    }
  }

  pub fn display_label(&self) -> String {
    if self.date_only {
      self.start.format("%d.%m.%Y").to_string()
    } else {
      self
        .start
        .format("%d.%m.%Y %H:%M")
        .to_string()
    }
  }

  pub fn start_field(&self) -> String {
    encode_local_minute(self.start)
  }
}

/// Field state of the quick-entry form.
#[derive(Debug, Clone)]
pub struct QuickBookingForm {
  pub seed:              Option<QuickBookingSeed>,
  pub service_variant:   String,
  pub specialist:        String,
  pub cabinet:           String,
  pub guest_name:        String,
  pub guest_room_number: String,
  pub recurrence:        RecurrenceBuilder
}

impl QuickBookingForm {
  pub fn new(
    recurrence: RecurrenceBuilder
  ) -> Self {
    Self {
      seed: None,
      service_variant: String::new(),
      specialist: String::new(),
      cabinet: String::new(),
      guest_name: String::new(),
      guest_room_number: String::new(),
      recurrence
    }
  }

  /// Starts a fresh entry: every field and
  /// the recurrence panel go back to their
  /// defaults.
  pub fn open(
    &mut self,
    seed: QuickBookingSeed
  ) {
    self.seed = Some(seed);
    self.service_variant.clear();
    self.specialist.clear();
    self.cabinet.clear();
    self.guest_name.clear();
    self.guest_room_number.clear();
    self.recurrence.reset();
    tracing::debug!(
      start = %seed.start_field(),
      "quick booking form opened"
    );
  }

  /// `None` until the form was opened on a
  /// slot.
  pub fn to_args(
    &self
  ) -> Option<QuickBookingArgs> {
    let seed = self.seed?;
    let cabinet = self.cabinet.trim();
    Some(QuickBookingArgs {
      service_variant: self
        .service_variant
        .trim()
        .to_string(),
      specialist: self
        .specialist
        .trim()
        .to_string(),
      cabinet: (!cabinet.is_empty())
        .then(|| cabinet.to_string()),
      guest_name: self
        .guest_name
        .trim()
        .to_string(),
      guest_room_number: self
        .guest_room_number
        .trim()
        .to_string(),
      start_datetime: seed.start_field(),
      recurrence: self.recurrence.form_fields()
    })
  }
}

/// Posts the quick-entry form. The form
/// closes once the request settles.
#[tracing::instrument(
  skip_all,
  fields(start = %args.start_datetime)
)]
pub async fn submit_quick_booking<A, G, D, N>(
  api: &A,
  grid: &G,
  dialog: &D,
  notifier: &N,
  args: QuickBookingArgs
) -> FlowOutcome
where
  A: BookingApi,
  G: CalendarGrid,
  D: FormDialog + ?Sized,
  N: Notify
{
  let _busy = BusyGuard::engage(dialog);
  tracing::debug!(
    recurring = args.recurrence.is_some(),
    "creating booking"
  );

  let result =
    api.quick_create_booking(&args).await;
  let (outcome, notice) =
    settle(&result, &TEXT);

  dialog.close();
  notifier.notify(notice);
  if outcome != FlowOutcome::TransportFailed
  {
    grid.refetch_events();
  }
  outcome
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;
  use crate::recurrence::Frequency;
  use crate::view::ViewType;

  fn at(
    h: u32,
    min: u32
  ) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 1)
      .and_then(|date| {
        date.and_hms_opt(h, min, 0)
      })
      .expect("valid datetime")
  }

  fn form() -> QuickBookingForm {
    QuickBookingForm::new(
      RecurrenceBuilder::new(
        vec![Frequency::Daily, Frequency::Weekly],
        2
      )
    )
  }

  #[test]
  fn labels_depend_on_the_view() {
    let month = QuickBookingSeed::from_click(
      DateClick {
        at:   at(0, 0),
        view: ViewType::Month
      },
      at(9, 0)
    );
    let day = QuickBookingSeed::from_click(
      DateClick {
        at:   at(14, 30),
        view: ViewType::Day
      },
      at(14, 30)
    );

    assert_eq!(month.display_label(), "01.06.2025");
    assert_eq!(month.start_field(), "2025-06-01T09:00");
    assert_eq!(
      day.display_label(),
      "01.06.2025 14:30"
    );
  }

  #[test]
  fn opening_clears_previous_input() {
    let mut form = form();
    form.guest_name = "Ivanova".to_string();
    form.recurrence.set_enabled(true);

    form.open(QuickBookingSeed {
      start:     at(10, 0),
      date_only: false
    });
    assert!(form.guest_name.is_empty());
    assert!(!form.recurrence.draft().enabled);
  }

  #[test]
  fn args_need_an_opened_form() {
    let mut form = form();
    assert_eq!(form.to_args(), None);

    form.open(QuickBookingSeed {
      start:     at(10, 0),
      date_only: false
    });
    form.service_variant = "3".to_string();
    form.guest_name = " Ivanova ".to_string();
    form.cabinet = "  ".to_string();

    let args = form.to_args().expect("opened");
    assert_eq!(args.guest_name, "Ivanova");
    assert_eq!(args.cabinet, None);
    assert_eq!(args.start_datetime, "2025-06-01T10:00");
    assert_eq!(args.recurrence, None);

    form.recurrence.set_enabled(true);
    let recurring = form.to_args().expect("opened");
    assert!(recurring.recurrence.is_some());
  }
}
