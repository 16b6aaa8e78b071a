use std::cell::{
  Cell,
  RefCell
};
use std::rc::Rc;

use bookgrid_core::booking_edit::{
  BookingEditSubmission,
  submit_booking_edit
};
use bookgrid_core::choices::{
  load_cabinets,
  load_specialists,
  reset_choices
};
use bookgrid_core::clipboard::{
  DuplicationRequest,
  duplicate
};
use bookgrid_core::closure::{
  ClosureFormView,
  ConfirmDialog,
  LinkedRange,
  confirm_delete,
  submit_create
};
use bookgrid_core::config::CalendarConfig;
use bookgrid_core::controller::{
  CalendarController,
  CalendarHost,
  DateClickAction,
  EventClickAction,
  KeyAction
};
use bookgrid_core::datetime::{
  encode_local_minute,
  parse_local_minute
};
use bookgrid_core::grid::{
  CLOSURE_EVENT_CLASS,
  booking_right_inset
};
use bookgrid_core::notify::NotificationPresenter;
use bookgrid_core::prefs::PreferenceStore;
use bookgrid_core::quick_booking::{
  QuickBookingSeed,
  submit_quick_booking
};
use bookgrid_core::recurrence::{
  EndCondition,
  Frequency,
  RecurrenceBuilder
};
use bookgrid_core::reschedule::{
  DropEvent,
  reschedule
};
use bookgrid_core::shortcuts::{
  KeyPress,
  Platform,
  ShortcutRouter
};
use bookgrid_core::view::ViewType;
use bookgrid_shared::EventKind;
use chrono::{
  NaiveDate,
  NaiveDateTime,
  Utc
};
use gloo::events::{
  EventListener,
  EventListenerOptions,
  EventListenerPhase
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
  Element,
  FormData,
  HtmlFormElement,
  HtmlInputElement,
  HtmlSelectElement,
  HtmlTextAreaElement,
  KeyboardEvent
};

use crate::api::FetchApi;
use crate::dom::{
  self,
  ClosureDeleteDialog,
  ClosureForm,
  DomChrome,
  EditorDialog,
  ModalForm,
  ResultOverlay,
  SelectChoices
};
use crate::fullcalendar::{
  self,
  Callback,
  FullCalendarGrid
};
use crate::storage::LocalStorageStore;
use crate::timers::GlooTimers;

const QUICK_MODAL: &str = "quickBookingModal";
const QUICK_FORM: &str = "quickBookingForm";
const CLOSURE_MODAL: &str = "cabinetClosureModal";
const CLOSURE_FORM: &str = "cabinetClosureForm";
const DELETE_MODAL: &str = "closureDeleteModal";
const EDIT_MODAL: &str = "bookingEditModal";
const EDIT_BODY: &str = "bookingEditModalBody";
const SPECIALISTS: SelectChoices =
  SelectChoices("specialist");
const CABINETS: SelectChoices = SelectChoices("cabinet");
const LOADING: &str = "<div class=\"text-center py-4\">\
                       <span class=\"spinner-border\"></span>\
                       </div>";

pub type Presenter =
  NotificationPresenter<ResultOverlay, GlooTimers>;

/// Browser bindings for every controller
/// collaborator.
pub struct WebHost;

impl CalendarHost for WebHost {
  type Chrome = DomChrome;
  type Grid = FullCalendarGrid;
  type Notifier = Rc<Presenter>;
  type Store = LocalStorageStore;
  type Timers = GlooTimers;
}

type Controller = CalendarController<WebHost>;

pub struct App {
  config:        Rc<CalendarConfig>,
  api:           FetchApi,
  controller:    RefCell<Option<Controller>>,
  quick_form:    ModalForm,
  closure_form:  ClosureForm,
  delete_dialog: ClosureDeleteDialog,
  edit_pending:  Cell<bool>
}

impl App {
  /// Mounts the grid into `calendar` and
  /// binds every page control.
  pub fn start(
    config: CalendarConfig,
    calendar: &Element
  ) -> Rc<Self> {
    let shared = Rc::new(config.clone());
    let app = Rc::new(Self {
      api: FetchApi::new(Rc::clone(&shared)),
      config: shared,
      controller: RefCell::new(None),
      quick_form: ModalForm::new(
        QUICK_MODAL,
        "#quickBookingForm button[type=\"submit\"]",
        "Creating..."
      ),
      closure_form: ClosureForm(ModalForm::new(
        CLOSURE_MODAL,
        "#cabinetClosureForm button[type=\"submit\"]",
        "Saving..."
      )),
      delete_dialog: ClosureDeleteDialog(
        ModalForm::new(
          DELETE_MODAL,
          "#confirmClosureDeleteBtn",
          "Deleting..."
        )
      ),
      edit_pending: Cell::new(false)
    });

    let notifier = Rc::new(Presenter::new(
      ResultOverlay,
      GlooTimers,
      config.notice_dismiss()
    ));
    let router =
      ShortcutRouter::new(Platform::detect(
        &navigator_platform()
      ));
    let today = config.local_minute(browser_now()).date();
    let callbacks = grid_callbacks(&app);
    let controller = Controller::initialize(
      config,
      PreferenceStore::new(LocalStorageStore::open()),
      DomChrome,
      GlooTimers,
      notifier,
      router,
      today,
      |options| {
        FullCalendarGrid::mount(
          calendar, &options, callbacks
        )
      }
    );
    *app.controller.borrow_mut() = Some(controller);

    bind_toolbar(&app);
    bind_keyboard(&app);
    bind_quick_booking(&app);
    bind_closures(&app);
    app
  }

  /// Runs `action` against the controller;
  /// `None` while it is already borrowed
  /// further up the stack.
  fn with_controller<R>(
    &self,
    action: impl FnOnce(&mut Controller) -> R
  ) -> Option<R> {
    let Ok(mut slot) =
      self.controller.try_borrow_mut()
    else {
      tracing::trace!(
        "skipping re-entrant page callback"
      );
      return None;
    };
    slot.as_mut().map(action)
  }

  /// Grid and notifier for a flow that
  /// outlives the current callback.
  fn flow_handles(
    &self
  ) -> Option<(FullCalendarGrid, Rc<Presenter>)> {
    self.with_controller(|controller| {
      (
        controller.grid().clone(),
        Rc::clone(controller.notifier())
      )
    })
  }
}

fn navigator_platform() -> String {
  web_sys::window()
    .and_then(|window| {
      window.navigator().platform().ok()
    })
    .unwrap_or_default()
}

fn grid_callbacks(
  app: &Rc<App>
) -> Vec<(&'static str, Callback)> {
  let bind = |handler: fn(&Rc<App>, &JsValue)| {
    let app = Rc::clone(app);
    Callback::new(move |info: JsValue| {
      handler(&app, &info);
    })
  };

  vec![
    ("eventClick", bind(on_event_click)),
    ("dateClick", bind(on_date_click)),
    ("eventDrop", bind(on_event_drop)),
    ("eventMouseEnter", bind(on_event_enter)),
    ("eventMouseLeave", bind(on_event_leave)),
    ("datesSet", bind(on_dates_set)),
    (
      "eventDidMount",
      Callback::new(|info: JsValue| {
        style_mounted_event(&info);
      })
    ),
  ]
}

fn on_event_click(app: &Rc<App>, info: &JsValue) {
  fullcalendar::prevent_default(info);
  let Some(event) = fullcalendar::info_event(info)
  else {
    return;
  };

  match app.with_controller(|controller| {
    controller.on_event_click(&event)
  }) {
    | Some(EventClickAction::EditBooking {
      booking_id,
      url
    }) => open_booking_editor(app, booking_id, url),
    | Some(EventClickAction::PromptClosureDelete(
      prompt
    )) => app.delete_dialog.show_prompt(&prompt),
    | Some(EventClickAction::Ignore) | None => {}
  }
}

fn on_date_click(app: &Rc<App>, info: &JsValue) {
  let Some(click) =
    fullcalendar::info_date_click(info)
  else {
    return;
  };

  match app.with_controller(|controller| {
    controller.on_date_click(click)
  }) {
    | Some(DateClickAction::Duplicate(request)) => {
      fullcalendar::prevent_default(info);
      spawn_duplicate(app, request);
    }
    | Some(DateClickAction::QuickBooking(seed)) => {
      open_quick_booking(app, seed);
    }
    | None => {}
  }
}

fn on_event_drop(app: &Rc<App>, info: &JsValue) {
  let revert = fullcalendar::info_revert(info);
  let undo = move || {
    if let Some(revert) = &revert
      && let Err(error) = revert.call0(&JsValue::NULL)
    {
      tracing::warn!(
        error = ?error,
        "grid refused to revert a drop"
      );
    }
  };

  let Some(event) = fullcalendar::info_event(info)
  else {
    undo();
    return;
  };
  let accepted = app
    .with_controller(|controller| {
      controller.accepts_drop(&event)
    })
    .unwrap_or(false);
  let handles = accepted
    .then(|| app.flow_handles())
    .flatten();
  let Some((grid, notifier)) = handles else {
    undo();
    return;
  };

  let gesture = DropEvent {
    booking_id: event.id,
    new_start:  event.start,
    revert:     undo
  };
  let app = Rc::clone(app);
  spawn_local(async move {
    reschedule(&app.api, &grid, &notifier, gesture)
      .await;
  });
}

fn on_event_enter(app: &Rc<App>, info: &JsValue) {
  if let Some(event) = fullcalendar::info_event(info)
  {
    app.with_controller(|controller| {
      controller.on_event_hover(&event);
    });
  }
}

fn on_event_leave(app: &Rc<App>, info: &JsValue) {
  if let Some(event) = fullcalendar::info_event(info)
  {
    app.with_controller(|controller| {
      controller.on_event_leave(&event.id);
    });
  }
}

fn on_dates_set(app: &Rc<App>, _info: &JsValue) {
  app.with_controller(Controller::on_dates_set);
}

/// Marks closures and insets bookings in
/// the time grids; runs before the
/// controller exists.
fn style_mounted_event(info: &JsValue) {
  let (Some(event), Some(element)) = (
    fullcalendar::info_event(info),
    fullcalendar::info_element(info)
  ) else {
    return;
  };
  let style = element.style();

  if event.kind() == EventKind::Closure {
    let _ =
      element.class_list().add_1(CLOSURE_EVENT_CLASS);
    let _ = style.remove_property("right");
    return;
  }

  match fullcalendar::info_view_type(info).and_then(
    |view| booking_right_inset(event.kind(), view)
  ) {
    | Some(inset) => {
      let current = style
        .get_property_value("right")
        .unwrap_or_default();
      if current.is_empty() || current == "0%" {
        let _ = style.set_property("right", inset);
      }
    }
    | None => {
      let _ = style.remove_property("right");
    }
  }
}

fn spawn_duplicate(
  app: &Rc<App>,
  request: DuplicationRequest
) {
  let Some((grid, notifier)) = app.flow_handles()
  else {
    return;
  };
  let app = Rc::clone(app);
  spawn_local(async move {
    duplicate(&app.api, &grid, &notifier, request)
      .await;
  });
}

fn open_booking_editor(
  app: &Rc<App>,
  booking_id: String,
  url: String
) {
  let Some(body) = dom::by_id(EDIT_BODY) else {
    tracing::warn!(
      booking_id = %booking_id,
      "booking editor element missing"
    );
    return;
  };
  body.set_inner_html(LOADING);
  dom::show_modal(EDIT_MODAL);

  let app = Rc::clone(app);
  spawn_local(async move {
    match app.api.booking_editor(&url).await {
      | Ok(html) => {
        body.set_inner_html(&html);
        bind_editor_form(&app, &booking_id, &body);
      }
      | Err(error) => {
        tracing::error!(
          booking_id = %booking_id,
          %error,
          "failed to load booking editor"
        );
        let id = String::from(
          js_sys::encode_uri_component(&booking_id)
        );
        dom::show_editor_failure(
          &body,
          &app.config.booking_page_url(&id)
        );
      }
    }
  });
}

/// Text fields of `form` in document
/// order; file inputs are left out.
fn form_pairs(
  form: &HtmlFormElement
) -> Vec<(String, String)> {
  let Ok(data) = FormData::new_with_form(form) else {
    return Vec::new();
  };
  let Ok(Some(entries)) = js_sys::try_iter(&data)
  else {
    return Vec::new();
  };
  entries
    .filter_map(Result::ok)
    .filter_map(|entry| {
      let pair =
        entry.dyn_into::<js_sys::Array>().ok()?;
      Some((
        pair.get(0).as_string()?,
        pair.get(1).as_string()?
      ))
    })
    .collect()
}

/// Takes over submit of the editor form
/// currently inside `body`; again after
/// every re-render.
fn bind_editor_form(
  app: &Rc<App>,
  booking_id: &str,
  body: &Element
) {
  let Some(form) = body
    .query_selector("form")
    .ok()
    .flatten()
    .and_then(|form| {
      form.dyn_into::<HtmlFormElement>().ok()
    })
  else {
    return;
  };
  if form.get_attribute("data-ajax").as_deref()
    == Some("true")
  {
    return;
  }
  let _ = form.set_attribute("data-ajax", "true");

  let app = Rc::clone(app);
  let booking_id = booking_id.to_string();
  let body = body.clone();
  let target = form.clone();
  on(&form, "submit", move |event| {
    event.prevent_default();
    if app.edit_pending.get() {
      return;
    }
    let Some((grid, notifier)) = app.flow_handles()
    else {
      return;
    };
    let submission = BookingEditSubmission::new(
      booking_id.as_str(),
      target.get_attribute("action").as_deref(),
      app.config.booking_page_url(&booking_id),
      form_pairs(&target)
    );
    let dialog = EditorDialog {
      form: ModalForm::new(
        EDIT_MODAL,
        "#bookingEditModalBody button[type=\"submit\"]",
        "Saving..."
      ),
      body: body.clone()
    };

    app.edit_pending.set(true);
    let app = Rc::clone(&app);
    let booking_id = booking_id.clone();
    spawn_local(async move {
      submit_booking_edit(
        &app.api,
        &grid,
        &dialog,
        &notifier,
        submission
      )
      .await;
      app.edit_pending.set(false);
      bind_editor_form(&app, &booking_id, &dialog.body);
    });
  });
}

fn on(
  element: &Element,
  event_type: &'static str,
  handler: impl FnMut(&web_sys::Event) + 'static
) {
  EventListener::new(element, event_type, handler)
    .forget();
}

fn on_click_id(
  app: &Rc<App>,
  id: &str,
  action: fn(&mut Controller)
) {
  let Some(element) = dom::by_id(id) else {
    return;
  };
  let app = Rc::clone(app);
  on(&element, "click", move |_| {
    app.with_controller(action);
  });
}

fn bind_toolbar(app: &Rc<App>) {
  on_click_id(app, "calendar-prev-btn", |controller| {
    controller.navigate(-1);
  });
  on_click_id(app, "calendar-next-btn", |controller| {
    controller.navigate(1);
  });
  on_click_id(
    app,
    "calendar-today-btn",
    Controller::go_to_today
  );
  on_click_id(app, "toggle-width-btn", |controller| {
    controller.toggle_width_mode();
  });

  for button in dom::query_all("[data-view-switch]") {
    let Some(view) = button
      .get_attribute("data-view-switch")
      .and_then(|key| ViewType::from_key(&key))
    else {
      continue;
    };
    let app = Rc::clone(app);
    on(&button, "click", move |_| {
      app.with_controller(|controller| {
        controller.switch_view(view);
      });
    });
  }
}

fn bind_keyboard(app: &Rc<App>) {
  if !app.config.capabilities.copy_shortcuts {
    return;
  }
  let Some(document) = dom::document() else {
    return;
  };

  let app = Rc::clone(app);
  let options = EventListenerOptions {
    phase:   EventListenerPhase::Capture,
    passive: false
  };
  EventListener::new_with_options(
    &document,
    "keydown",
    options,
    move |event| {
      let Some(key) =
        event.dyn_ref::<KeyboardEvent>()
      else {
        return;
      };
      let press = KeyPress {
        key:   key.key(),
        ctrl:  key.ctrl_key(),
        meta:  key.meta_key(),
        shift: key.shift_key(),
        alt:   key.alt_key()
      };
      let focused = dom::text_entry_focused();

      match app.with_controller(|controller| {
        controller.on_key(&press, focused, Utc::now())
      }) {
        | Some(KeyAction::Handled) => {
          event.prevent_default();
        }
        | Some(KeyAction::Duplicate(request)) => {
          event.prevent_default();
          spawn_duplicate(&app, request);
        }
        | Some(KeyAction::Ignored) | None => {}
      }
    }
  )
  .forget();
}

fn element_value(element: &Element) -> String {
  if let Some(input) =
    element.dyn_ref::<HtmlInputElement>()
  {
    input.value()
  } else if let Some(select) =
    element.dyn_ref::<HtmlSelectElement>()
  {
    select.value()
  } else if let Some(area) =
    element.dyn_ref::<HtmlTextAreaElement>()
  {
    area.value()
  } else {
    String::new()
  }
}

fn set_element_value(element: &Element, value: &str) {
  if let Some(input) =
    element.dyn_ref::<HtmlInputElement>()
  {
    input.set_value(value);
  } else if let Some(select) =
    element.dyn_ref::<HtmlSelectElement>()
  {
    select.set_value(value);
  }
}

fn form_by_id(id: &str) -> Option<HtmlFormElement> {
  dom::by_id(id)?.dyn_into().ok()
}

/// Current value of one named form field.
fn form_field(
  form: &HtmlFormElement,
  name: &str
) -> String {
  FormData::new_with_form(form)
    .ok()
    .and_then(|data| data.get(name).as_string())
    .unwrap_or_default()
}

fn open_quick_booking(
  app: &Rc<App>,
  seed: QuickBookingSeed
) {
  dom::set_text(
    "selectedDateTime",
    &seed.display_label()
  );
  if let Some(form) = form_by_id(QUICK_FORM) {
    form.reset();
  }
  reset_choices(&SPECIALISTS, &CABINETS);
  if let Some(start) = dom::input_by_id("start_datetime")
  {
    start.set_value(&seed.start_field());
  }
  render_recurrence(app);
  dom::show_modal(QUICK_MODAL);
}

/// Pushes the recurrence draft back into
/// the sub-panel controls.
fn render_recurrence(app: &Rc<App>) {
  let Some((panel, draft)) =
    app.with_controller(|controller| {
      let recurrence =
        &controller.quick_booking_mut().recurrence;
      (recurrence.panel(), recurrence.draft().clone())
    })
  else {
    return;
  };

  for (role, hidden) in [
    ("quick-recurrence-settings", !panel.visible),
    (
      "quick-recurrence-weekdays",
      !panel.weekdays_visible
    ),
    (
      "quick-recurrence-count-field",
      !panel.count_visible
    ),
    (
      "quick-recurrence-until-field",
      !panel.until_visible
    )
  ] {
    if let Some(block) =
      dom::query(&format!("[data-role=\"{role}\"]"))
    {
      dom::set_hidden(&block, hidden);
    }
  }
  if let Some(label) = dom::query(
    "[data-role=\"quick-recurrence-interval-label\"]"
  ) {
    label.set_text_content(Some(panel.interval_label));
  }

  if let Some(toggle) =
    dom::input_by_id("quick_recurrence_enabled")
  {
    toggle.set_checked(draft.enabled);
  }
  for (id, value) in [
    (
      "quick_recurrence_frequency",
      draft.frequency.as_key().to_string()
    ),
    (
      "quick_recurrence_end_type",
      draft.end_condition.as_key().to_string()
    ),
    (
      "quick_recurrence_interval",
      draft.interval.to_string()
    ),
    (
      "quick_recurrence_occurrences",
      draft.occurrence_count.to_string()
    )
  ] {
    if let Some(control) = dom::by_id(id) {
      set_element_value(&control, &value);
    }
  }
  if let Some(display) = dom::query(
    "[data-role=\"quick-recurrence-excluded-display\"]"
  ) {
    set_element_value(&display, &draft.excluded_input);
  }
}

fn bind_recurrence<F>(
  app: &Rc<App>,
  element: Element,
  event_type: &'static str,
  update: F
) where
  F: Fn(&mut RecurrenceBuilder, &Element) + 'static
{
  let app = Rc::clone(app);
  let target = element.clone();
  on(&element, event_type, move |_| {
    app.with_controller(|controller| {
      update(
        &mut controller.quick_booking_mut().recurrence,
        &target
      );
    });
    render_recurrence(&app);
  });
}

fn bind_quick_booking(app: &Rc<App>) {
  if let Some(toggle) =
    dom::by_id("quick_recurrence_enabled")
  {
    bind_recurrence(app, toggle, "change", |builder, el| {
      let checked = el
        .dyn_ref::<HtmlInputElement>()
        .is_some_and(HtmlInputElement::checked);
      builder.set_enabled(checked);
    });
  }
  if let Some(select) =
    dom::by_id("quick_recurrence_frequency")
  {
    bind_recurrence(app, select, "change", |builder, el| {
      if let Some(frequency) =
        Frequency::from_key(&element_value(el))
      {
        builder.on_frequency_change(frequency);
      }
    });
  }
  if let Some(select) =
    dom::by_id("quick_recurrence_end_type")
  {
    bind_recurrence(app, select, "change", |builder, el| {
      if let Some(end) =
        EndCondition::from_key(&element_value(el))
      {
        builder.on_end_condition_change(end);
      }
    });
  }
  if let Some(input) =
    dom::by_id("quick_recurrence_interval")
  {
    bind_recurrence(app, input, "change", |builder, el| {
      if let Ok(interval) =
        element_value(el).trim().parse()
      {
        builder.set_interval(interval);
      }
    });
  }
  if let Some(input) =
    dom::by_id("quick_recurrence_occurrences")
  {
    bind_recurrence(app, input, "change", |builder, el| {
      if let Ok(count) = element_value(el).trim().parse()
      {
        builder.set_occurrence_count(count);
      }
    });
  }
  if let Some(input) =
    dom::by_id("quick_recurrence_end_date")
  {
    bind_recurrence(app, input, "change", |builder, el| {
      builder.set_until_date(
        NaiveDate::parse_from_str(
          element_value(el).trim(),
          "%Y-%m-%d"
        )
        .ok()
      );
    });
  }
  for checkbox in dom::query_all(
    "[data-role=\"quick-recurrence-weekdays\"] \
     input[type=\"checkbox\"]"
  ) {
    bind_recurrence(
      app,
      checkbox,
      "change",
      |builder, el| {
        if let Ok(weekday) =
          element_value(el).trim().parse()
        {
          builder.toggle_weekday(weekday);
        }
      }
    );
  }
  if let Some(display) = dom::query(
    "[data-role=\"quick-recurrence-excluded-display\"]"
  ) {
    bind_recurrence(app, display, "change", |builder, el| {
      builder.set_excluded_input(&element_value(el));
    });
  }

  bind_lookups(app);

  if let Some(cancel) = dom::query(
    "[data-action=\"quick-booking-cancel\"]"
  ) {
    on(&cancel, "click", |_| {
      dom::hide_modal(QUICK_MODAL);
    });
  }

  let Some(form) = form_by_id(QUICK_FORM) else {
    return;
  };
  let app = Rc::clone(app);
  let fields = form.clone();
  on(&form, "submit", move |event| {
    event.prevent_default();
    let args = app
      .with_controller(|controller| {
        let draft = controller.quick_booking_mut();
        draft.service_variant =
          form_field(&fields, "service_variant");
        draft.specialist =
          form_field(&fields, "specialist");
        draft.cabinet = form_field(&fields, "cabinet");
        draft.guest_name =
          form_field(&fields, "guest_name");
        draft.guest_room_number =
          form_field(&fields, "guest_room_number");
        draft.to_args()
      })
      .flatten();
    let (Some(args), Some((grid, notifier))) =
      (args, app.flow_handles())
    else {
      tracing::warn!(
        "quick booking submitted without a slot"
      );
      return;
    };

    let app = Rc::clone(&app);
    spawn_local(async move {
      submit_quick_booking(
        &app.api,
        &grid,
        &app.quick_form,
        &notifier,
        args
      )
      .await;
    });
  });
}

fn control_value(id: &str) -> String {
  dom::by_id(id)
    .map(|element| element_value(&element))
    .unwrap_or_default()
}

fn refresh_cabinets(app: &Rc<App>) {
  let app = Rc::clone(app);
  spawn_local(async move {
    load_cabinets(
      &app.api,
      &CABINETS,
      &control_value("service_variant"),
      &control_value("specialist"),
      &control_value("start_datetime")
    )
    .await;
  });
}

/// Specialists follow the service; cabinets
/// follow the specialist and the slot.
fn bind_lookups(app: &Rc<App>) {
  if let Some(service) = dom::by_id("service_variant") {
    let app = Rc::clone(app);
    let target = service.clone();
    on(&service, "change", move |_| {
      let app = Rc::clone(&app);
      let service_variant_id = element_value(&target);
      spawn_local(async move {
        load_specialists(
          &app.api,
          &SPECIALISTS,
          &CABINETS,
          &service_variant_id
        )
        .await;
      });
    });
  }
  if let Some(specialist) = dom::by_id("specialist") {
    let app = Rc::clone(app);
    on(&specialist, "change", move |_| {
      refresh_cabinets(&app);
    });
  }
  if let Some(modal) = dom::by_id(QUICK_MODAL) {
    let app = Rc::clone(app);
    on(&modal, "shown.bs.modal", move |_| {
      refresh_cabinets(&app);
    });
  }
}

fn write_closure_range(range: LinkedRange) {
  if let Some(start) = dom::input_by_id("id_start_time")
  {
    start.set_value(&encode_local_minute(range.start()));
  }
  if let Some(end) = dom::input_by_id("id_end_time") {
    end.set_min(&encode_local_minute(range.min_end()));
    end.set_value(&encode_local_minute(range.end()));
  }
}

/// Wall-clock minute of the browser.
fn browser_now() -> Option<NaiveDateTime> {
  fullcalendar::naive_from_js(&js_sys::Date::new_0())
}

fn local_now(config: &CalendarConfig) -> NaiveDateTime {
  config.local_minute(browser_now())
}

fn bind_closure_bound(
  app: &Rc<App>,
  id: &str,
  change: fn(
    &mut Controller,
    NaiveDateTime
  ) -> Option<LinkedRange>
) {
  let Some(input) = dom::by_id(id) else {
    return;
  };
  let app = Rc::clone(app);
  let target = input.clone();
  on(&input, "change", move |_| {
    let Some(at) =
      parse_local_minute(&element_value(&target))
    else {
      return;
    };
    if let Some(range) = app
      .with_controller(|controller| {
        change(controller, at)
      })
      .flatten()
    {
      write_closure_range(range);
    }
  });
}

fn bind_closures(app: &Rc<App>) {
  if !app.config.capabilities.manage_closures {
    return;
  }

  if let Some(open) = dom::query(
    "[data-action=\"open-closure-modal\"]"
  ) {
    let app = Rc::clone(app);
    on(&open, "click", move |_| {
      let now = local_now(&app.config);
      let Some(range) = app
        .with_controller(|controller| {
          let anchor = controller
            .session()
            .clipboard
            .slot_selection()
            .unwrap_or(now);
          controller.open_closure_create(anchor)
        })
        .flatten()
      else {
        return;
      };
      app.closure_form.clear_errors();
      if let Some(form) = form_by_id(CLOSURE_FORM) {
        form.reset();
      }
      write_closure_range(range);
      dom::show_modal(CLOSURE_MODAL);
    });
  }

  bind_closure_bound(
    app,
    "id_start_time",
    Controller::on_closure_start_change
  );
  bind_closure_bound(
    app,
    "id_end_time",
    Controller::on_closure_end_change
  );

  if let Some(modal) = dom::by_id(CLOSURE_MODAL) {
    let app = Rc::clone(app);
    on(&modal, "hidden.bs.modal", move |_| {
      if let Some(form) = form_by_id(CLOSURE_FORM) {
        form.reset();
      }
      app.closure_form.clear_errors();
    });
  }

  if let Some(form) = form_by_id(CLOSURE_FORM) {
    let app = Rc::clone(app);
    let fields = form.clone();
    on(&form, "submit", move |event| {
      event.prevent_default();
      let cabinet = form_field(&fields, "cabinet");
      let reason = form_field(&fields, "reason");
      let args = app
        .with_controller(|controller| {
          controller.closure_create_args(&cabinet, &reason)
        })
        .flatten();
      let (Some(args), Some((grid, notifier))) =
        (args, app.flow_handles())
      else {
        return;
      };

      let app = Rc::clone(&app);
      spawn_local(async move {
        submit_create(
          &app.api,
          &grid,
          &app.closure_form,
          &notifier,
          args,
          &app.config.closure_form_fields
        )
        .await;
      });
    });
  }

  if let Some(confirm) =
    dom::by_id("confirmClosureDeleteBtn")
  {
    let app = Rc::clone(app);
    on(&confirm, "click", move |_| {
      let (Some(pending), Some((grid, notifier))) = (
        app.with_controller(|controller| {
          controller.pending_deletion()
        }),
        app.flow_handles()
      ) else {
        return;
      };

      let app = Rc::clone(&app);
      spawn_local(async move {
        confirm_delete(
          &app.api,
          &grid,
          &app.delete_dialog,
          &notifier,
          &pending
        )
        .await;
      });
    });
  }
}
