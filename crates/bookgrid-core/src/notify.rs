use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum NoticeTone {
  Success,
  Warning,
  Error
}

impl NoticeTone {
  pub fn header_class(
    self
  ) -> &'static str {
    match self {
      | NoticeTone::Success => {
        "modal-header bg-success text-white"
      }
      | NoticeTone::Warning => {
        "modal-header bg-warning text-dark"
      }
      | NoticeTone::Error => {
        "modal-header bg-danger text-white"
      }
    }
  }
}

/// One status message for the result
/// overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
  pub title:   String,
  pub message: String,
  /// Soft-conflict explanation attached
  /// to an accepted mutation.
  pub warning: Option<String>,
  pub success: bool
}

impl Notice {
  pub fn success(
    title: impl Into<String>,
    message: impl Into<String>
  ) -> Self {
    Self {
      title:   title.into(),
      message: message.into(),
      warning: None,
      success: true
    }
  }

  pub fn error(
    title: impl Into<String>,
    message: impl Into<String>
  ) -> Self {
    Self {
      title:   title.into(),
      message: message.into(),
      warning: None,
      success: false
    }
  }

  #[must_use]
  pub fn with_warning(
    mut self,
    warning: Option<&str>
  ) -> Self {
    self.warning =
      warning.map(str::to_string);
    self
  }

  pub fn tone(&self) -> NoticeTone {
    match (self.success, &self.warning) {
      | (false, _) => NoticeTone::Error,
      | (true, Some(_)) => {
        NoticeTone::Warning
      }
      | (true, None) => NoticeTone::Success
    }
  }
}

pub trait Notify {
  fn notify(&self, notice: Notice);
}

impl<N: Notify + ?Sized> Notify for Rc<N> {
  fn notify(&self, notice: Notice) {
    (**self).notify(notice);
  }
}

/// The overlay element the presenter
/// drives.
pub trait Overlay {
  /// Removes backdrops and body state
  /// left behind by earlier dialogs.
  fn clear_backdrops(&self);
  fn show(&self, notice: &Notice);
  fn hide(&self);
}

/// Host timer facility. Dropping a
/// handle cancels its task.
pub trait Timers {
  type Handle;

  fn schedule(
    &self,
    delay: Duration,
    task: Box<dyn FnOnce()>
  ) -> Self::Handle;

  /// Fire-and-forget variant.
  fn defer(
    &self,
    delay: Duration,
    task: Box<dyn FnOnce()>
  );
}

pub struct NotificationPresenter<O, T>
where
  T: Timers
{
  overlay:       Rc<O>,
  timers:        T,
  dismiss_after: Duration,
  pending:       RefCell<Option<T::Handle>>
}

impl<O, T> NotificationPresenter<O, T>
where
  O: Overlay + 'static,
  T: Timers
{
  pub fn new(
    overlay: O,
    timers: T,
    dismiss_after: Duration
  ) -> Self {
    Self {
      overlay: Rc::new(overlay),
      timers,
      dismiss_after,
      pending: RefCell::new(None)
    }
  }

  pub fn overlay(&self) -> &O {
    &self.overlay
  }

  pub fn has_pending_dismissal(
    &self
  ) -> bool {
    self.pending.borrow().is_some()
  }

  pub fn show(&self, notice: &Notice) {
    // superseded timer is cancelled by
    // dropping its handle
    drop(self.pending.borrow_mut().take());

    self.overlay.clear_backdrops();
    self.overlay.show(notice);
    tracing::debug!(
      title = %notice.title,
      tone = ?notice.tone(),
      "showing result notice"
    );

    let overlay = Rc::clone(&self.overlay);
    let handle = self.timers.schedule(
      self.dismiss_after,
      Box::new(move || overlay.hide())
    );
    *self.pending.borrow_mut() =
      Some(handle);
  }
}

impl<O, T> Notify
  for NotificationPresenter<O, T>
where
  O: Overlay + 'static,
  T: Timers
{
  fn notify(&self, notice: Notice) {
    self.show(&notice);
  }
}
