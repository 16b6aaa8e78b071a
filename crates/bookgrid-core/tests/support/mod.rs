#![allow(dead_code)]

use std::cell::{
  Cell,
  RefCell
};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use bookgrid_core::api::{
  ApiError,
  ApiResult,
  BookingApi
};
use bookgrid_core::booking_edit::BookingEditView;
use bookgrid_core::choices::{
  Choice,
  ChoiceList
};
use bookgrid_core::closure::{
  ClosureDeletePrompt,
  ClosureFormView,
  ConfirmDialog,
  ErrorLayout
};
use bookgrid_core::controller::CalendarHost;
use bookgrid_core::grid::{
  CalendarGrid,
  GridOptions,
  GridView,
  PageChrome
};
use bookgrid_core::notify::{
  Notice,
  Notify,
  Timers
};
use bookgrid_core::prefs::MemoryStore;
use bookgrid_core::quick_booking::FormDialog;
use bookgrid_core::view::{
  ViewType,
  WidthMode
};
use bookgrid_shared::{
  AvailableCabinets,
  BookingTimeArgs,
  CabinetQuery,
  ClosureCreateArgs,
  ClosureIdArg,
  MutationResponse,
  QuickBookingArgs,
  SpecialistOption
};
use chrono::{
  Days,
  Months,
  NaiveDate,
  NaiveDateTime
};

pub fn date(
  y: i32,
  m: u32,
  d: u32
) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d)
    .expect("valid date")
}

pub fn at(
  y: i32,
  m: u32,
  d: u32,
  h: u32,
  min: u32
) -> NaiveDateTime {
  date(y, m, d)
    .and_hms_opt(h, min, 0)
    .expect("valid datetime")
}

pub fn accepted() -> ApiResult {
  Ok(MutationResponse {
    success: true,
    ..MutationResponse::default()
  })
}

pub fn rejected(error: &str) -> ApiResult {
  Ok(MutationResponse {
    success: false,
    error: Some(error.to_string()),
    ..MutationResponse::default()
  })
}

pub fn unreachable_server() -> ApiResult {
  Err(ApiError::Transport(
    "connection refused".to_string()
  ))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
  UpdateTime(BookingTimeArgs),
  Duplicate(BookingTimeArgs),
  QuickCreate(QuickBookingArgs),
  CreateClosure(ClosureCreateArgs),
  DeleteClosure(ClosureIdArg),
  EditForm {
    action: String,
    fields: Vec<(String, String)>
  },
  Specialists(String),
  Cabinets(CabinetQuery)
}

/// Records every request and answers
/// from a queue; an empty queue accepts.
#[derive(Default)]
pub struct FakeApi {
  pub requests: RefCell<Vec<Request>>,
  responses:    RefCell<VecDeque<ApiResult>>,
  specialists:
    RefCell<VecDeque<Result<Vec<SpecialistOption>, ApiError>>>,
  cabinets:
    RefCell<VecDeque<Result<AvailableCabinets, ApiError>>>
}

impl FakeApi {
  pub fn answering(result: ApiResult) -> Self {
    let api = Self::default();
    api.push(result);
    api
  }

  pub fn push(&self, result: ApiResult) {
    self.responses.borrow_mut().push_back(result);
  }

  pub fn push_specialists(
    &self,
    result: Result<Vec<SpecialistOption>, ApiError>
  ) {
    self.specialists.borrow_mut().push_back(result);
  }

  pub fn push_cabinets(
    &self,
    result: Result<AvailableCabinets, ApiError>
  ) {
    self.cabinets.borrow_mut().push_back(result);
  }

  pub fn request_count(&self) -> usize {
    self.requests.borrow().len()
  }

  fn answer(
    &self,
    request: Request
  ) -> ApiResult {
    self.requests.borrow_mut().push(request);
    self
      .responses
      .borrow_mut()
      .pop_front()
      .unwrap_or_else(accepted)
  }
}

impl BookingApi for FakeApi {
  async fn update_booking_time(
    &self,
    args: &BookingTimeArgs
  ) -> ApiResult {
    self.answer(Request::UpdateTime(args.clone()))
  }

  async fn duplicate_booking(
    &self,
    args: &BookingTimeArgs
  ) -> ApiResult {
    self.answer(Request::Duplicate(args.clone()))
  }

  async fn quick_create_booking(
    &self,
    args: &QuickBookingArgs
  ) -> ApiResult {
    self.answer(Request::QuickCreate(args.clone()))
  }

  async fn create_closure(
    &self,
    args: &ClosureCreateArgs
  ) -> ApiResult {
    self.answer(Request::CreateClosure(
      args.clone()
    ))
  }

  async fn delete_closure(
    &self,
    args: &ClosureIdArg
  ) -> ApiResult {
    self.answer(Request::DeleteClosure(
      args.clone()
    ))
  }

  async fn submit_booking_form(
    &self,
    action: &str,
    fields: &[(String, String)]
  ) -> ApiResult {
    self.answer(Request::EditForm {
      action: action.to_string(),
      fields: fields.to_vec()
    })
  }

  async fn specialists_for_service(
    &self,
    service_variant_id: &str
  ) -> Result<Vec<SpecialistOption>, ApiError> {
    self.requests.borrow_mut().push(
      Request::Specialists(
        service_variant_id.to_string()
      )
    );
    self
      .specialists
      .borrow_mut()
      .pop_front()
      .unwrap_or_else(|| Ok(Vec::new()))
  }

  async fn available_cabinets(
    &self,
    query: &CabinetQuery
  ) -> Result<AvailableCabinets, ApiError> {
    self
      .requests
      .borrow_mut()
      .push(Request::Cabinets(query.clone()));
    self
      .cabinets
      .borrow_mut()
      .pop_front()
      .unwrap_or_else(|| Ok(AvailableCabinets::default()))
  }
}

#[derive(Default)]
pub struct GridState {
  pub view:           RefCell<Option<GridView>>,
  pub today:          Cell<Option<NaiveDate>>,
  pub refetches:      Cell<usize>,
  pub resizes:        Cell<usize>,
  pub range_clears:   Cell<usize>,
  pub options:        RefCell<Option<GridOptions>>
}

/// Grid that pages by whole views and
/// titles itself `<view key> <anchor>`.
#[derive(Clone, Default)]
pub struct FakeGrid(pub Rc<GridState>);

impl FakeGrid {
  pub fn mount(options: GridOptions) -> Self {
    let grid = Self::default();
    grid.set_view(
      options.initial_view,
      options.initial_date
    );
    *grid.0.options.borrow_mut() = Some(options);
    grid
  }

  pub fn refetches(&self) -> usize {
    self.0.refetches.get()
  }

  pub fn anchor(&self) -> Option<NaiveDate> {
    self
      .0
      .view
      .borrow()
      .as_ref()
      .map(|view| view.anchor_date)
  }

  fn set_view(
    &self,
    view_type: ViewType,
    anchor_date: NaiveDate
  ) {
    *self.0.view.borrow_mut() = Some(GridView {
      view_type,
      anchor_date,
      title: format!(
        "{} {anchor_date}",
        view_type.as_key()
      )
    });
  }

  fn shift(&self, forward: bool) {
    let Some(current) = self.current_view()
    else {
      return;
    };
    let anchor = current.anchor_date;
    let moved = match (current.view_type, forward) {
      | (ViewType::Month, true) => {
        anchor.checked_add_months(Months::new(1))
      }
      | (ViewType::Month, false) => {
        anchor.checked_sub_months(Months::new(1))
      }
      | (view, true) => {
        anchor.checked_add_days(Days::new(span(view)))
      }
      | (view, false) => {
        anchor.checked_sub_days(Days::new(span(view)))
      }
    };
    if let Some(moved) = moved {
      self.set_view(current.view_type, moved);
    }
  }
}

fn span(view: ViewType) -> u64 {
  match view {
    | ViewType::Week => 7,
    | ViewType::ThreeDay => 3,
    | ViewType::Day | ViewType::Month => 1
  }
}

impl CalendarGrid for FakeGrid {
  fn current_view(&self) -> Option<GridView> {
    self.0.view.borrow().clone()
  }

  fn change_view(&self, view: ViewType) {
    if let Some(anchor) = self.anchor() {
      self.set_view(view, anchor);
    }
  }

  fn clear_visible_range(&self) {
    self
      .0
      .range_clears
      .set(self.0.range_clears.get() + 1);
  }

  fn prev(&self) {
    self.shift(false);
  }

  fn next(&self) {
    self.shift(true);
  }

  fn today(&self) {
    if let (Some(today), Some(current)) =
      (self.0.today.get(), self.current_view())
    {
      self.set_view(current.view_type, today);
    }
  }

  fn refetch_events(&self) {
    self.0.refetches.set(self.0.refetches.get() + 1);
  }

  fn update_size(&self) {
    self.0.resizes.set(self.0.resizes.get() + 1);
  }
}

#[derive(Clone, Default)]
pub struct RecordingNotifier(
  pub Rc<RefCell<Vec<Notice>>>
);

impl RecordingNotifier {
  pub fn notices(&self) -> Vec<Notice> {
    self.0.borrow().clone()
  }

  pub fn last(&self) -> Option<Notice> {
    self.0.borrow().last().cloned()
  }
}

impl Notify for RecordingNotifier {
  fn notify(&self, notice: Notice) {
    self.0.borrow_mut().push(notice);
  }
}

#[derive(Clone, Default)]
pub struct FakeChrome(pub Rc<ChromeState>);

#[derive(Default)]
pub struct ChromeState {
  pub titles:      RefCell<Vec<String>>,
  pub highlighted: RefCell<Vec<ViewType>>,
  pub width_modes: RefCell<Vec<WidthMode>>
}

impl FakeChrome {
  pub fn last_title(&self) -> Option<String> {
    self.0.titles.borrow().last().cloned()
  }

  pub fn last_highlight(&self) -> Option<ViewType> {
    self.0.highlighted.borrow().last().copied()
  }

  pub fn last_width_mode(&self) -> Option<WidthMode> {
    self.0.width_modes.borrow().last().copied()
  }
}

impl PageChrome for FakeChrome {
  fn set_range_title(&self, title: &str) {
    self.0.titles.borrow_mut().push(title.to_string());
  }

  fn highlight_view(&self, active: ViewType) {
    self.0.highlighted.borrow_mut().push(active);
  }

  fn apply_width_mode(&self, mode: WidthMode) {
    self.0.width_modes.borrow_mut().push(mode);
  }
}

pub struct TimerHandle {
  cancelled: Rc<Cell<bool>>
}

impl Drop for TimerHandle {
  fn drop(&mut self) {
    self.cancelled.set(true);
  }
}

type Task = (
  Duration,
  Rc<Cell<bool>>,
  Box<dyn FnOnce()>
);

/// Timers fired by hand.
#[derive(Default)]
pub struct ManualTimers {
  tasks: RefCell<Vec<Task>>
}

impl ManualTimers {
  pub fn delays(&self) -> Vec<Duration> {
    self
      .tasks
      .borrow()
      .iter()
      .map(|(delay, _, _)| *delay)
      .collect()
  }

  pub fn fire_all(&self) -> usize {
    let tasks: Vec<Task> =
      self.tasks.borrow_mut().drain(..).collect();
    let mut fired = 0;
    for (_, cancelled, task) in tasks {
      if !cancelled.get() {
        task();
        fired += 1;
      }
    }
    fired
  }
}

/// Local wrapper so the foreign `Timers`
/// trait can be implemented for shared timers.
#[derive(Clone)]
pub struct SharedTimers(pub Rc<ManualTimers>);

impl Timers for SharedTimers {
  type Handle = TimerHandle;

  fn schedule(
    &self,
    delay: Duration,
    task: Box<dyn FnOnce()>
  ) -> TimerHandle {
    let cancelled = Rc::new(Cell::new(false));
    self.0.tasks.borrow_mut().push((
      delay,
      Rc::clone(&cancelled),
      task
    ));
    TimerHandle { cancelled }
  }

  fn defer(
    &self,
    delay: Duration,
    task: Box<dyn FnOnce()>
  ) {
    self.0.tasks.borrow_mut().push((
      delay,
      Rc::new(Cell::new(false)),
      task
    ));
  }
}

/// Dialog double for every modal form.
#[derive(Default)]
pub struct FakeDialog {
  pub busy:    RefCell<Vec<bool>>,
  pub closed:  Cell<usize>,
  pub cleared: Cell<usize>,
  pub errors:  RefCell<Vec<ErrorLayout>>,
  pub prompts: RefCell<Vec<ClosureDeletePrompt>>
}

impl FakeDialog {
  pub fn is_busy(&self) -> bool {
    self.busy.borrow().last().copied().unwrap_or(false)
  }
}

impl FormDialog for FakeDialog {
  fn set_busy(&self, busy: bool) {
    self.busy.borrow_mut().push(busy);
  }

  fn close(&self) {
    self.closed.set(self.closed.get() + 1);
  }
}

impl ClosureFormView for FakeDialog {
  fn clear_errors(&self) {
    self.cleared.set(self.cleared.get() + 1);
  }

  fn show_errors(&self, layout: &ErrorLayout) {
    self.errors.borrow_mut().push(layout.clone());
  }
}

/// Booking editor double; keeps every
/// form it was handed.
#[derive(Default)]
pub struct FakeEditor {
  pub dialog: FakeDialog,
  pub forms:  RefCell<Vec<String>>
}

impl FormDialog for FakeEditor {
  fn set_busy(&self, busy: bool) {
    self.dialog.set_busy(busy);
  }

  fn close(&self) {
    self.dialog.close();
  }
}

impl BookingEditView for FakeEditor {
  fn replace_form(&self, html: &str) {
    self.forms.borrow_mut().push(html.to_string());
  }
}

/// What a select control currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectState {
  pub placeholder: String,
  pub choices:     Vec<Choice>,
  pub disabled:    bool
}

#[derive(Default)]
pub struct FakeSelect {
  pub history: RefCell<Vec<SelectState>>
}

impl FakeSelect {
  pub fn current(&self) -> SelectState {
    self.history.borrow().last().cloned().unwrap_or_default()
  }

  pub fn values(&self) -> Vec<String> {
    self
      .current()
      .choices
      .into_iter()
      .map(|choice| choice.value)
      .collect()
  }
}

impl ChoiceList for FakeSelect {
  fn show_loading(&self, label: &str) {
    self.history.borrow_mut().push(SelectState {
      placeholder: label.to_string(),
      choices:     Vec::new(),
      disabled:    true
    });
  }

  fn fill(
    &self,
    placeholder: &str,
    choices: &[Choice]
  ) {
    self.history.borrow_mut().push(SelectState {
      placeholder: placeholder.to_string(),
      choices:     choices.to_vec(),
      disabled:    false
    });
  }
}

impl ConfirmDialog for FakeDialog {
  fn show_prompt(
    &self,
    prompt: &ClosureDeletePrompt
  ) {
    self.prompts.borrow_mut().push(prompt.clone());
  }
}

pub struct TestHost;

impl CalendarHost for TestHost {
  type Chrome = FakeChrome;
  type Grid = FakeGrid;
  type Notifier = RecordingNotifier;
  type Store = MemoryStore;
  type Timers = SharedTimers;
}
