use bookgrid_core::prefs::{
  KeyValueStore,
  StorageError
};

/// `window.localStorage`; reads come back
/// empty and writes fail when the browser
/// refuses storage.
pub struct LocalStorageStore {
  storage: Option<web_sys::Storage>
}

impl LocalStorageStore {
  pub fn open() -> Self {
    let storage = web_sys::window().and_then(
      |window| {
        window
          .local_storage()
          .ok()
          .flatten()
      }
    );
    if storage.is_none() {
      tracing::warn!(
        "localStorage unavailable; \
         preferences will not persist"
      );
    }
    Self { storage }
  }
}

impl KeyValueStore for LocalStorageStore {
  fn get_item(
    &self,
    key: &str
  ) -> Result<Option<String>, StorageError> {
    let Some(storage) = &self.storage else {
      return Ok(None);
    };
    storage.get_item(key).map_err(|error| {
      StorageError(format!("{error:?}"))
    })
  }

  fn set_item(
    &self,
    key: &str,
    value: &str
  ) -> Result<(), StorageError> {
    let Some(storage) = &self.storage else {
      return Err(StorageError(
        "localStorage unavailable".to_string()
      ));
    };
    storage.set_item(key, value).map_err(
      |error| {
        StorageError(format!("{error:?}"))
      }
    )
  }
}
