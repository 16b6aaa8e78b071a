use bookgrid_shared::BookingTimeArgs;
use chrono::NaiveDateTime;

use crate::api::{
  BookingApi,
  FlowOutcome,
  FlowText,
  settle
};
use crate::datetime::encode_local_minute;
use crate::grid::CalendarGrid;
use crate::notify::Notify;

const TEXT: FlowText = FlowText {
  success_title:     "Success",
  warning_title:     "Success with warning",
  success_message:   "Booking time updated",
  failure_message:   "Could not update the booking time",
  transport_message: "An error occurred while updating the booking time"
};

/// A finished drag gesture. `revert`
/// restores the pre-drag position.
pub struct DropEvent<R>
where
  R: FnOnce()
{
  pub booking_id: String,
  pub new_start:  NaiveDateTime,
  pub revert:     R
}

/// Undoes the optimistic move unless the
/// server confirmed it. Fires at most
/// once, including when the flow is
/// dropped before settling.
struct RevertGuard<'g, G, R>
where
  G: CalendarGrid,
  R: FnOnce()
{
  grid:   &'g G,
  revert: Option<R>
}

impl<G, R> RevertGuard<'_, G, R>
where
  G: CalendarGrid,
  R: FnOnce()
{
  fn confirm(mut self) {
    self.revert = None;
  }
}

impl<G, R> Drop for RevertGuard<'_, G, R>
where
  G: CalendarGrid,
  R: FnOnce()
{
  fn drop(&mut self) {
    if let Some(revert) = self.revert.take()
    {
      revert();
      self.grid.refetch_events();
    }
  }
}

#[tracing::instrument(
  skip_all,
  fields(booking_id = %gesture.booking_id)
)]
pub async fn reschedule<A, G, N, R>(
  api: &A,
  grid: &G,
  notifier: &N,
  gesture: DropEvent<R>
) -> FlowOutcome
where
  A: BookingApi,
  G: CalendarGrid,
  N: Notify,
  R: FnOnce()
{
  let DropEvent {
    booking_id,
    new_start,
    revert
  } = gesture;
  let guard = RevertGuard {
    grid,
    revert: Some(revert)
  };

  let args = BookingTimeArgs {
    booking_id,
    start_datetime: encode_local_minute(
      new_start
    )
  };
  tracing::debug!(
    start = %args.start_datetime,
    "rescheduling booking"
  );

  let result =
    api.update_booking_time(&args).await;
  let (outcome, notice) =
    settle(&result, &TEXT);

  if outcome.is_success() {
    guard.confirm();
  } else {
    drop(guard);
  }
  notifier.notify(notice);
  outcome
}
