use bookgrid_shared::BookingTimeArgs;
use chrono::{
  DateTime,
  NaiveDateTime,
  Utc
};

use crate::api::{
  BookingApi,
  FlowOutcome,
  FlowText,
  settle
};
use crate::datetime::{
  TimeOfDay,
  encode_local_minute
};
use crate::grid::{
  CalendarEvent,
  CalendarGrid,
  DateClick
};
use crate::notify::{
  Notice,
  Notify
};
use crate::shortcuts::{
  KeyPress,
  Shortcut,
  ShortcutRouter
};

const TEXT: FlowText = FlowText {
  success_title:     "Done",
  warning_title:     "Done with warning",
  success_message:   "Booking copied",
  failure_message:   "Could not copy the booking",
  transport_message: "An error occurred while copying the booking"
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardBuffer {
  pub booking_id:  String,
  pub title:       String,
  pub copied_at:   DateTime<Utc>,
  pub source_time: TimeOfDay
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum ClipboardState {
  Idle,
  Copied
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicationRequest {
  pub booking_id: String,
  pub target:     NaiveDateTime
}

impl DuplicationRequest {
  pub fn args(&self) -> BookingTimeArgs {
    BookingTimeArgs {
      booking_id:     self.booking_id.clone(),
      start_datetime: encode_local_minute(
        self.target
      )
    }
  }
}

/// Result of a keyboard shortcut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortcutEffect {
  Ignored,
  Notice(Notice),
  Paste(DuplicationRequest)
}

impl ShortcutEffect {
  /// Whether the host should swallow the
  /// key event.
  pub fn is_handled(&self) -> bool {
    !matches!(self, ShortcutEffect::Ignored)
  }
}

/// Copy/paste duplication state machine
/// over `{Idle, Copied}` plus the hover
/// candidate and the last clicked slot.
#[derive(Debug, Clone)]
pub struct ClipboardEngine {
  router:        ShortcutRouter,
  month_default: TimeOfDay,
  hover:         Option<CalendarEvent>,
  buffer:        Option<ClipboardBuffer>,
  slot:          Option<NaiveDateTime>
}

impl ClipboardEngine {
  pub fn new(
    router: ShortcutRouter,
    month_default: TimeOfDay
  ) -> Self {
    Self {
      router,
      month_default,
      hover: None,
      buffer: None,
      slot: None
    }
  }

  pub fn state(&self) -> ClipboardState {
    if self.buffer.is_some() {
      ClipboardState::Copied
    } else {
      ClipboardState::Idle
    }
  }

  pub fn buffer(
    &self
  ) -> Option<&ClipboardBuffer> {
    self.buffer.as_ref()
  }

  pub fn slot_selection(
    &self
  ) -> Option<NaiveDateTime> {
    self.slot
  }

  pub fn hover_candidate(
    &self
  ) -> Option<&CalendarEvent> {
    self.hover.as_ref()
  }

  pub fn router(&self) -> &ShortcutRouter {
    &self.router
  }

  pub fn hover_enter(
    &mut self,
    event: &CalendarEvent
  ) {
    if event.is_booking() {
      self.hover = Some(event.clone());
    }
  }

  pub fn hover_leave(
    &mut self,
    event_id: &str
  ) {
    if self
      .hover
      .as_ref()
      .is_some_and(|hovered| {
        hovered.id == event_id
      })
    {
      self.hover = None;
    }
  }

  /// Records the clicked slot. Date-only
  /// clicks take the buffered time of day,
  /// or the default hour without a buffer.
  pub fn select_slot(
    &mut self,
    click: DateClick
  ) -> NaiveDateTime {
    let target = if click.view.is_date_only()
    {
      let time = self
        .buffer
        .as_ref()
        .map_or(self.month_default, |buffer| {
          buffer.source_time
        });
      time.on(click.at.date())
    } else {
      click.at
    };
    self.slot = Some(target);
    target
  }

  /// Click on an empty slot: with an active
  /// buffer this pastes right away.
  pub fn click(
    &mut self,
    click: DateClick
  ) -> Option<DuplicationRequest> {
    let target = self.select_slot(click);
    self.buffer.as_ref().map(|buffer| {
      DuplicationRequest {
        booking_id: buffer.booking_id.clone(),
        target
      }
    })
  }

  pub fn handle_key(
    &mut self,
    press: &KeyPress,
    text_entry_focused: bool,
    now: DateTime<Utc>
  ) -> ShortcutEffect {
    match self
      .router
      .route(press, text_entry_focused)
    {
      | Some(shortcut) => {
        self.apply(shortcut, now)
      }
      | None => ShortcutEffect::Ignored
    }
  }

  pub fn apply(
    &mut self,
    shortcut: Shortcut,
    now: DateTime<Utc>
  ) -> ShortcutEffect {
    match shortcut {
      | Shortcut::Copy => self.copy(now),
      | Shortcut::Paste => self.paste(),
      | Shortcut::Cancel => self.cancel()
    }
  }

  pub fn copy(
    &mut self,
    now: DateTime<Utc>
  ) -> ShortcutEffect {
    let Some(candidate) = self.hover.as_ref()
    else {
      return ShortcutEffect::Ignored;
    };

    if candidate.series_id().is_some() {
      tracing::debug!(
        booking_id = %candidate.id,
        "refusing to copy a series booking"
      );
      return ShortcutEffect::Notice(
        Notice::error(
          "Copy unavailable",
          "Bookings that belong to a series \
           cannot be copied"
        )
      );
    }

    let title = if candidate.title.trim().is_empty()
    {
      "Booking".to_string()
    } else {
      candidate.title.clone()
    };
    let buffer = ClipboardBuffer {
      booking_id: candidate.id.clone(),
      title,
      copied_at: now,
      source_time: TimeOfDay::of(
        candidate.start
      )
    };
    tracing::debug!(
      booking_id = %buffer.booking_id,
      "copied booking to clipboard"
    );
    self.buffer = Some(buffer);

    ShortcutEffect::Notice(Notice::success(
      "Copied",
      format!(
        "Select a slot and press {} to paste",
        self.router.paste_label()
      )
    ))
  }

  pub fn paste(&self) -> ShortcutEffect {
    let Some(buffer) = self.buffer.as_ref()
    else {
      return ShortcutEffect::Notice(
        Notice::error(
          "Nothing copied",
          format!(
            "Hover a booking and press {} \
             first",
            self.router.copy_label()
          )
        )
      );
    };
    let Some(target) = self.slot else {
      return ShortcutEffect::Notice(
        Notice::error(
          "No slot selected",
          format!(
            "Click a free time slot, then \
             press {}",
            self.router.paste_label()
          )
        )
      );
    };

    ShortcutEffect::Paste(DuplicationRequest {
      booking_id: buffer.booking_id.clone(),
      target
    })
  }

  pub fn cancel(&mut self) -> ShortcutEffect {
    if self.buffer.take().is_none() {
      return ShortcutEffect::Ignored;
    }
    tracing::debug!("clipboard cleared");
    ShortcutEffect::Notice(Notice::success(
      "Clipboard cleared",
      format!(
        "Copy a booking with {}",
        self.router.copy_label()
      )
    ))
  }
}

/// Sends a duplication request. Nothing
/// was drawn ahead of time, so failures
/// only report.
#[tracing::instrument(
  skip_all,
  fields(booking_id = %request.booking_id)
)]
pub async fn duplicate<A, G, N>(
  api: &A,
  grid: &G,
  notifier: &N,
  request: DuplicationRequest
) -> FlowOutcome
where
  A: BookingApi,
  G: CalendarGrid,
  N: Notify
{
  let args = request.args();
  tracing::debug!(
    target_start = %args.start_datetime,
    "duplicating booking"
  );

  let result =
    api.duplicate_booking(&args).await;
  let (outcome, notice) =
    settle(&result, &TEXT);
  if outcome.is_success() {
    grid.refetch_events();
  }
  notifier.notify(notice);
  outcome
}
