use bookgrid_shared::{
  ClosureCreateArgs,
  EventKind
};
use chrono::{
  DateTime,
  NaiveDate,
  NaiveDateTime,
  Utc
};

use crate::clipboard::{
  ClipboardEngine,
  DuplicationRequest,
  ShortcutEffect
};
use crate::closure::{
  ClosureDeletePrompt,
  ClosureDraft,
  LinkedRange,
  PendingClosureDeletion,
  prompt_delete
};
use crate::config::CalendarConfig;
use crate::grid::{
  CLOSURE_EVENT_CLASS,
  CalendarEvent,
  CalendarGrid,
  DateClick,
  EventSource,
  GridOptions,
  PageChrome
};
use crate::notify::{
  Notify,
  Timers
};
use crate::prefs::{
  KeyValueStore,
  PreferenceStore
};
use crate::quick_booking::{
  QuickBookingForm,
  QuickBookingSeed
};
use crate::recurrence::RecurrenceBuilder;
use crate::shortcuts::{
  KeyPress,
  ShortcutRouter
};
use crate::view::{
  ViewState,
  ViewType,
  WidthMode
};

/// Collaborators a page host plugs into
/// the controller.
pub trait CalendarHost {
  type Grid: CalendarGrid + Clone + 'static;
  type Store: KeyValueStore;
  type Chrome: PageChrome;
  type Timers: Timers;
  type Notifier: Notify + Clone + 'static;
}

/// Everything the page remembers between
/// events.
#[derive(Debug, Clone)]
pub struct SessionState {
  pub view:             ViewState,
  pub width_mode:       WidthMode,
  pub clipboard:        ClipboardEngine,
  pub pending_deletion: PendingClosureDeletion,
  pub quick_booking:    QuickBookingForm,
  pub closure_draft:    Option<ClosureDraft>
}

/// What the host does after an event
/// click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventClickAction {
  EditBooking {
    booking_id: String,
    url:        String
  },
  PromptClosureDelete(ClosureDeletePrompt),
  Ignore
}

/// What the host does after a click on
/// an empty slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateClickAction {
  Duplicate(DuplicationRequest),
  QuickBooking(QuickBookingSeed)
}

/// Outcome of a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
  Ignored,
  /// Consumed; the host suppresses the
  /// browser default.
  Handled,
  Duplicate(DuplicationRequest)
}

/// Grid construction options for a
/// restored view state.
pub fn grid_options(
  config: &CalendarConfig,
  view: ViewState
) -> GridOptions {
  let mut event_sources = vec![EventSource {
    url:        config
      .endpoints
      .booking_feed
      .clone(),
    class_name: None
  }];
  if config.capabilities.manage_closures {
    event_sources.push(EventSource {
      url:        config
        .endpoints
        .closure_feed
        .clone(),
      class_name: Some(
        CLOSURE_EVENT_CLASS.to_string()
      )
    });
  }

  GridOptions {
    initial_view: view.view_type,
    initial_date: view.anchor_date,
    locale: config.grid.locale.clone(),
    event_sources,
    slot_min_time: config.slot_min_time(),
    slot_max_time: config.slot_max_time(),
    slot_minutes: config.grid.slot_minutes,
    start_editable: config.grid.start_editable,
    duration_editable: false
  }
}

pub struct CalendarController<H>
where
  H: CalendarHost
{
  config:   CalendarConfig,
  prefs:    PreferenceStore<H::Store>,
  chrome:   H::Chrome,
  timers:   H::Timers,
  notifier: H::Notifier,
  grid:     H::Grid,
  session:  SessionState
}

impl<H> CalendarController<H>
where
  H: CalendarHost
{
  /// Restores persisted state, mounts the
  /// grid through `mount`, and syncs the
  /// page chrome.
  #[allow(clippy::too_many_arguments)]
  pub fn initialize<M>(
    config: CalendarConfig,
    prefs: PreferenceStore<H::Store>,
    chrome: H::Chrome,
    timers: H::Timers,
    notifier: H::Notifier,
    router: ShortcutRouter,
    today: NaiveDate,
    mount: M
  ) -> Self
  where
    M: FnOnce(GridOptions) -> H::Grid
  {
    let view = prefs.load_view_state(today);
    let width_mode = prefs.load_width_mode();
    chrome.apply_width_mode(width_mode);

    let grid =
      mount(grid_options(&config, view));
    tracing::info!(
      view = view.view_type.as_key(),
      anchor = %view.anchor_date,
      closures = config.capabilities.manage_closures,
      copy_shortcuts = config.capabilities.copy_shortcuts,
      "calendar grid mounted"
    );

    let resize_grid = grid.clone();
    timers.defer(
      config.initial_resize(),
      Box::new(move || resize_grid.update_size())
    );

    let session = SessionState {
      view,
      width_mode,
      clipboard: ClipboardEngine::new(
        router,
        config.month_click_time()
      ),
      pending_deletion:
        PendingClosureDeletion::default(),
      quick_booking: QuickBookingForm::new(
        RecurrenceBuilder::new(
          config.frequencies(),
          config.recurrence.default_occurrences
        )
      ),
      closure_draft: None
    };

    let controller = Self {
      config,
      prefs,
      chrome,
      timers,
      notifier,
      grid,
      session
    };
    controller.refresh_chrome();
    controller
  }

  pub fn config(&self) -> &CalendarConfig {
    &self.config
  }

  pub fn grid(&self) -> &H::Grid {
    &self.grid
  }

  pub fn notifier(&self) -> &H::Notifier {
    &self.notifier
  }

  pub fn prefs(
    &self
  ) -> &PreferenceStore<H::Store> {
    &self.prefs
  }

  pub fn session(&self) -> &SessionState {
    &self.session
  }

  pub fn pending_deletion(
    &self
  ) -> PendingClosureDeletion {
    self.session.pending_deletion.clone()
  }

  pub fn quick_booking_mut(
    &mut self
  ) -> &mut QuickBookingForm {
    &mut self.session.quick_booking
  }

  pub fn copy_label(&self) -> &'static str {
    self.session.clipboard.router().copy_label()
  }

  pub fn switch_view(&mut self, view: ViewType) {
    tracing::debug!(
      from = self.session.view.view_type.as_key(),
      to = view.as_key(),
      "switching calendar view"
    );
    self.grid.clear_visible_range();
    self.grid.change_view(view);
    self.session.view.view_type = view;
    self.sync_from_grid();
  }

  pub fn toggle_width_mode(&mut self) -> WidthMode {
    let mode = self.session.width_mode.next();
    self.session.width_mode = mode;
    self.chrome.apply_width_mode(mode);
    self.prefs.save_width_mode(mode);
    tracing::debug!(
      mode = mode.as_key(),
      "width mode toggled"
    );

    let grid = self.grid.clone();
    self.timers.defer(
      self.config.width_resize(),
      Box::new(move || grid.update_size())
    );
    mode
  }

  /// Pages backward for negative steps and
  /// forward for positive ones.
  pub fn navigate(&mut self, step: i32) {
    for _ in 0..step.unsigned_abs() {
      if step < 0 {
        self.grid.prev();
      } else {
        self.grid.next();
      }
    }
    self.sync_from_grid();
  }

  pub fn go_to_today(&mut self) {
    self.grid.today();
    self.sync_from_grid();
  }

  pub fn on_dates_set(&mut self) {
    self.sync_from_grid();
  }

  pub fn on_event_click(
    &mut self,
    event: &CalendarEvent
  ) -> EventClickAction {
    if event.kind() == EventKind::Closure {
      return match prompt_delete(
        event,
        self.config.capabilities.manage_closures,
        &self.session.pending_deletion
      ) {
        | Some(prompt) => {
          EventClickAction::PromptClosureDelete(
            prompt
          )
        }
        | None => EventClickAction::Ignore
      };
    }

    self.prefs.save_view_state(&self.session.view);
    EventClickAction::EditBooking {
      booking_id: event.id.clone(),
      url:        self
        .config
        .booking_edit_url(&event.id)
    }
  }

  pub fn on_date_click(
    &mut self,
    click: DateClick
  ) -> DateClickAction {
    let clipboard = &mut self.session.clipboard;
    if self.config.capabilities.copy_shortcuts
      && let Some(request) = clipboard.click(click)
    {
      tracing::debug!(
        booking_id = %request.booking_id,
        "pasting on slot click"
      );
      return DateClickAction::Duplicate(request);
    }

    let start = clipboard.select_slot(click);
    let seed =
      QuickBookingSeed::from_click(click, start);
    self.session.quick_booking.open(seed);
    DateClickAction::QuickBooking(seed)
  }

  pub fn on_event_hover(
    &mut self,
    event: &CalendarEvent
  ) {
    if self.config.capabilities.copy_shortcuts {
      self.session.clipboard.hover_enter(event);
    }
  }

  pub fn on_event_leave(
    &mut self,
    event_id: &str
  ) {
    if self.config.capabilities.copy_shortcuts {
      self.session.clipboard.hover_leave(event_id);
    }
  }

  /// Routes a key press through the
  /// clipboard engine and presents any
  /// resulting notice.
  pub fn on_key(
    &mut self,
    press: &KeyPress,
    text_entry_focused: bool,
    now: DateTime<Utc>
  ) -> KeyAction {
    if !self.config.capabilities.copy_shortcuts {
      return KeyAction::Ignored;
    }

    match self.session.clipboard.handle_key(
      press,
      text_entry_focused,
      now
    ) {
      | ShortcutEffect::Ignored => {
        KeyAction::Ignored
      }
      | ShortcutEffect::Notice(notice) => {
        self.notifier.notify(notice);
        KeyAction::Handled
      }
      | ShortcutEffect::Paste(request) => {
        KeyAction::Duplicate(request)
      }
    }
  }

  /// Only bookings move; anything else is
  /// put back by the host.
  pub fn accepts_drop(
    &self,
    event: &CalendarEvent
  ) -> bool {
    event.is_booking()
  }

  /// Seeds the closure dialog; `None`
  /// without the closure capability.
  pub fn open_closure_create(
    &mut self,
    anchor: NaiveDateTime
  ) -> Option<LinkedRange> {
    if !self.config.capabilities.manage_closures {
      return None;
    }
    let draft = ClosureDraft::open(anchor);
    let range = draft.range;
    self.session.closure_draft = Some(draft);
    Some(range)
  }

  pub fn on_closure_start_change(
    &mut self,
    start: NaiveDateTime
  ) -> Option<LinkedRange> {
    let draft =
      self.session.closure_draft.as_mut()?;
    draft.range.set_start(start);
    Some(draft.range)
  }

  pub fn on_closure_end_change(
    &mut self,
    end: NaiveDateTime
  ) -> Option<LinkedRange> {
    let draft =
      self.session.closure_draft.as_mut()?;
    draft.range.set_end(end);
    Some(draft.range)
  }

  pub fn closure_create_args(
    &mut self,
    cabinet: &str,
    reason: &str
  ) -> Option<ClosureCreateArgs> {
    let draft =
      self.session.closure_draft.as_mut()?;
    draft.cabinet = cabinet.to_string();
    draft.reason = reason.to_string();
    Some(draft.to_args())
  }

  fn sync_from_grid(&mut self) {
    if let Some(current) =
      self.grid.current_view()
    {
      self.session.view = ViewState::new(
        current.view_type,
        current.anchor_date
      );
    }
    self.prefs.save_view_state(&self.session.view);
    self.refresh_chrome();
  }

  fn refresh_chrome(&self) {
    if let Some(current) =
      self.grid.current_view()
    {
      self.chrome.set_range_title(&current.title);
    }
    self
      .chrome
      .highlight_view(self.session.view.view_type);
  }
}
