use bookgrid_core::grid::{
  CalendarEvent,
  CalendarGrid,
  DateClick,
  GridOptions,
  GridView
};
use bookgrid_core::view::ViewType;
use bookgrid_shared::EventProps;
use chrono::{
  NaiveDate,
  NaiveDateTime
};
use js_sys::{
  Date,
  Function,
  Object,
  Reflect
};
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
  Element,
  HtmlElement
};

#[wasm_bindgen(js_namespace = FullCalendar)]
extern "C" {
  #[derive(Clone)]
  pub type Calendar;

  #[wasm_bindgen(constructor)]
  fn new(
    element: &Element,
    options: &JsValue
  ) -> Calendar;

  #[wasm_bindgen(method)]
  fn render(this: &Calendar);

  #[wasm_bindgen(method, js_name = changeView)]
  fn change_view(this: &Calendar, view: &str);

  #[wasm_bindgen(method)]
  fn prev(this: &Calendar);

  #[wasm_bindgen(method)]
  fn next(this: &Calendar);

  #[wasm_bindgen(method)]
  fn today(this: &Calendar);

  #[wasm_bindgen(method, js_name = refetchEvents)]
  fn refetch_events(this: &Calendar);

  #[wasm_bindgen(method, js_name = updateSize)]
  fn update_size(this: &Calendar);

  #[wasm_bindgen(method, js_name = setOption)]
  fn set_option(
    this: &Calendar,
    name: &str,
    value: &JsValue
  );

  #[wasm_bindgen(method, js_name = getDate)]
  fn get_date(this: &Calendar) -> Date;

  #[wasm_bindgen(method, getter)]
  fn view(this: &Calendar) -> JsValue;
}

pub type Callback = Closure<dyn FnMut(JsValue)>;

/// Whether the FullCalendar bundle is on
/// the page.
pub fn is_loaded() -> bool {
  Reflect::has(
    &js_sys::global(),
    &JsValue::from_str("FullCalendar")
  )
  .unwrap_or(false)
}

fn get(target: &JsValue, key: &str) -> JsValue {
  Reflect::get(target, &JsValue::from_str(key))
    .unwrap_or(JsValue::UNDEFINED)
}

fn get_string(
  target: &JsValue,
  key: &str
) -> Option<String> {
  get(target, key).as_string()
}

/// Wall-clock reading of a JS date in the
/// browser's zone.
pub fn naive_from_js(
  date: &Date
) -> Option<NaiveDateTime> {
  let year =
    i32::try_from(date.get_full_year()).ok()?;
  NaiveDate::from_ymd_opt(
    year,
    date.get_month() + 1,
    date.get_date()
  )?
  .and_hms_opt(
    date.get_hours(),
    date.get_minutes(),
    0
  )
}

fn date_field(
  target: &JsValue,
  key: &str
) -> Option<NaiveDateTime> {
  get(target, key)
    .dyn_into::<Date>()
    .ok()
    .and_then(|date| naive_from_js(&date))
}

/// Reads a FullCalendar `EventApi`.
pub fn event_from_js(
  event: &JsValue
) -> Option<CalendarEvent> {
  let id = get_string(event, "id")?;
  let start = date_field(event, "start")?;
  let raw_props = get(event, "extendedProps");
  let props = if raw_props.is_object() {
    serde_wasm_bindgen::from_value::<EventProps>(
      raw_props
    )
    .unwrap_or_else(|error| {
      tracing::warn!(
        event_id = %id,
        %error,
        "unreadable event properties"
      );
      EventProps::default()
    })
  } else {
    EventProps::default()
  };

  Some(CalendarEvent {
    id,
    start,
    end: date_field(event, "end"),
    title: get_string(event, "title")
      .unwrap_or_default(),
    props
  })
}

/// `info.event` of an event callback.
pub fn info_event(
  info: &JsValue
) -> Option<CalendarEvent> {
  event_from_js(&get(info, "event"))
}

pub fn info_view_type(
  info: &JsValue
) -> Option<ViewType> {
  get_string(&get(info, "view"), "type")
    .and_then(|key| ViewType::from_key(&key))
}

pub fn info_date_click(
  info: &JsValue
) -> Option<DateClick> {
  Some(DateClick {
    at:   date_field(info, "date")?,
    view: info_view_type(info)?
  })
}

pub fn info_revert(
  info: &JsValue
) -> Option<Function> {
  get(info, "revert").dyn_into().ok()
}

pub fn info_element(
  info: &JsValue
) -> Option<HtmlElement> {
  get(info, "el").dyn_into().ok()
}

pub fn prevent_default(info: &JsValue) {
  if let Ok(event) = get(info, "jsEvent")
    .dyn_into::<web_sys::Event>()
  {
    event.prevent_default();
  }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsEventSource<'a> {
  url:        &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  class_name: Option<&'a str>
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsDuration {
  days: u32
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsCustomView {
  #[serde(rename = "type")]
  kind:     &'static str,
  duration: JsDuration
}

#[derive(Serialize)]
struct JsViews {
  #[serde(rename = "timeGridThreeDay")]
  three_day: JsCustomView
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsTimeFormat {
  hour:   &'static str,
  minute: &'static str,
  hour12: bool
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsOptions<'a> {
  initial_view:            &'a str,
  initial_date:            String,
  locale:                  &'a str,
  header_toolbar:          bool,
  now_indicator:           bool,
  height:                  &'static str,
  event_display:           &'static str,
  all_day_slot:            bool,
  editable:                bool,
  event_start_editable:    bool,
  event_duration_editable: bool,
  slot_min_time:           String,
  slot_max_time:           String,
  slot_duration:           String,
  event_time_format:       JsTimeFormat,
  views:                   JsViews,
  event_sources:           Vec<JsEventSource<'a>>
}

fn options_object(options: &GridOptions) -> Object {
  let slot_hours = options.slot_minutes / 60;
  let slot_minutes = options.slot_minutes % 60;
  let js = JsOptions {
    initial_view:            options
      .initial_view
      .as_key(),
    initial_date:            options
      .initial_date
      .to_string(),
    locale:                  &options.locale,
    header_toolbar:          false,
    now_indicator:           true,
    height:                  "auto",
    event_display:           "block",
    all_day_slot:            false,
    editable:                options.start_editable,
    event_start_editable:    options.start_editable,
    event_duration_editable: options
      .duration_editable,
    slot_min_time:           options
      .slot_min_time
      .format("%H:%M:%S")
      .to_string(),
    slot_max_time:           options
      .slot_max_time
      .format("%H:%M:%S")
      .to_string(),
    slot_duration:           format!(
      "{slot_hours:02}:{slot_minutes:02}:00"
    ),
    event_time_format:       JsTimeFormat {
      hour:   "2-digit",
      minute: "2-digit",
      hour12: false
    },
    views:                   JsViews {
      three_day: JsCustomView {
        kind:     "timeGrid",
        duration: JsDuration { days: 3 }
      }
    },
    event_sources:           options
      .event_sources
      .iter()
      .map(|source| JsEventSource {
        url:        &source.url,
        class_name: source.class_name.as_deref()
      })
      .collect()
  };

  let serializer =
    serde_wasm_bindgen::Serializer::json_compatible();
  match js.serialize(&serializer) {
    | Ok(value) => value.unchecked_into(),
    | Err(error) => {
      tracing::error!(
        %error,
        "failed to encode grid options"
      );
      Object::new()
    }
  }
}

/// The FullCalendar instance behind the
/// controller.
#[derive(Clone)]
pub struct FullCalendarGrid(Calendar);

impl FullCalendarGrid {
  /// Builds and renders the widget; every
  /// callback is leaked for the page's
  /// lifetime.
  pub fn mount(
    element: &Element,
    options: &GridOptions,
    callbacks: Vec<(&'static str, Callback)>
  ) -> Self {
    let js_options = options_object(options);
    for (name, callback) in callbacks {
      if let Err(error) = Reflect::set(
        &js_options,
        &JsValue::from_str(name),
        callback.as_ref()
      ) {
        tracing::error!(
          callback = name,
          error = ?error,
          "failed to bind grid callback"
        );
      }
      callback.forget();
    }

    let calendar = Calendar::new(element, &js_options);
    calendar.render();
    Self(calendar)
  }
}

impl CalendarGrid for FullCalendarGrid {
  fn current_view(&self) -> Option<GridView> {
    let view = self.0.view();
    let view_type = get_string(&view, "type")
      .and_then(|key| ViewType::from_key(&key))?;
    let anchor_date =
      naive_from_js(&self.0.get_date())?.date();
    Some(GridView {
      view_type,
      anchor_date,
      title: get_string(&view, "title")
        .unwrap_or_default()
    })
  }

  fn change_view(&self, view: ViewType) {
    self.0.change_view(view.as_key());
  }

  fn clear_visible_range(&self) {
    self.0.set_option("visibleRange", &JsValue::NULL);
  }

  fn prev(&self) {
    self.0.prev();
  }

  fn next(&self) {
    self.0.next();
  }

  fn today(&self) {
    self.0.today();
  }

  fn refetch_events(&self) {
    self.0.refetch_events();
  }

  fn update_size(&self) {
    self.0.update_size();
  }
}
