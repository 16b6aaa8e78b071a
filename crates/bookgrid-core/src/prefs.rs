use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;

use crate::datetime::parse_stored_date;
use crate::view::{
  ViewState,
  ViewType,
  WidthMode
};

pub const VIEW_STORAGE_KEY: &str =
  "calendarView";
pub const DATE_STORAGE_KEY: &str =
  "calendarDate";
pub const WIDTH_MODE_STORAGE_KEY: &str =
  "calendarWidthMode";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageError(pub String);

impl fmt::Display for StorageError {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    write!(
      f,
      "preference storage unavailable: \
       {}",
      self.0
    )
  }
}

impl std::error::Error for StorageError {}

/// Persistent client key-value store,
/// e.g. the browser's `localStorage`.
pub trait KeyValueStore {
  fn get_item(
    &self,
    key: &str
  ) -> Result<Option<String>, StorageError>;

  fn set_item(
    &self,
    key: &str,
    value: &str
  ) -> Result<(), StorageError>;
}

/// In-memory store; the fallback when
/// the host has no persistent storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
  items: RefCell<BTreeMap<String, String>>
}

impl KeyValueStore for MemoryStore {
  fn get_item(
    &self,
    key: &str
  ) -> Result<Option<String>, StorageError>
  {
    Ok(self.items.borrow().get(key).cloned())
  }

  fn set_item(
    &self,
    key: &str,
    value: &str
  ) -> Result<(), StorageError> {
    self
      .items
      .borrow_mut()
      .insert(key.to_string(), value.to_string());
    Ok(())
  }
}

/// Typed, best-effort view preferences.
/// Every failure is logged and replaced
/// by a default; nothing here errors.
#[derive(Debug)]
pub struct PreferenceStore<S> {
  store: S
}

impl<S: KeyValueStore> PreferenceStore<S> {
  pub fn new(store: S) -> Self {
    Self { store }
  }

  pub fn store(&self) -> &S {
    &self.store
  }

  pub fn load_view_state(
    &self,
    today: NaiveDate
  ) -> ViewState {
    let view_type = self
      .read(VIEW_STORAGE_KEY)
      .as_deref()
      .and_then(ViewType::from_key)
      .unwrap_or_default();
    let anchor_date = self
      .read(DATE_STORAGE_KEY)
      .as_deref()
      .and_then(parse_stored_date)
      .unwrap_or(today);

    tracing::debug!(
      view = view_type.as_key(),
      %anchor_date,
      "restored calendar view state"
    );
    ViewState::new(view_type, anchor_date)
  }

  pub fn save_view_state(
    &self,
    state: &ViewState
  ) {
    self.write(
      VIEW_STORAGE_KEY,
      state.view_type.as_key()
    );
    self.write(
      DATE_STORAGE_KEY,
      &state
        .anchor_date
        .format("%Y-%m-%d")
        .to_string()
    );
  }

  pub fn load_width_mode(&self) -> WidthMode {
    self
      .read(WIDTH_MODE_STORAGE_KEY)
      .as_deref()
      .and_then(WidthMode::from_key)
      .unwrap_or_default()
  }

  pub fn save_width_mode(
    &self,
    mode: WidthMode
  ) {
    self.write(
      WIDTH_MODE_STORAGE_KEY,
      mode.as_key()
    );
  }

  fn read(
    &self,
    key: &str
  ) -> Option<String> {
    match self.store.get_item(key) {
      | Ok(value) => value,
      | Err(error) => {
        tracing::warn!(
          key,
          %error,
          "unable to read calendar \
           preference"
        );
        None
      }
    }
  }

  fn write(
    &self,
    key: &str,
    value: &str
  ) {
    if let Err(error) =
      self.store.set_item(key, value)
    {
      tracing::warn!(
        key,
        %error,
        "unable to persist calendar \
         preference"
      );
    }
  }
}
