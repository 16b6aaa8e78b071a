use bookgrid_core::config::CalendarConfig;
use web_sys::HtmlElement;

/// Applies the server-rendered flags,
/// URLs and log level on `#calendar-page` over the
/// embedded defaults.
pub fn overlay_page_data(
  config: &mut CalendarConfig,
  page: &HtmlElement
) {
  let data = page.dataset();
  let flag = |key: &str| {
    data.get(key).map(|value| value == "true")
  };

  if let Some(enabled) = flag("canManageClosures") {
    config.capabilities.manage_closures = enabled;
  }
  if let Some(enabled) = flag("copyShortcutsEnabled")
  {
    config.capabilities.copy_shortcuts = enabled;
  }

  let endpoints = &mut config.endpoints;
  for (key, slot) in [
    ("closureFeedUrl", &mut endpoints.closure_feed),
    (
      "closureCreateUrl",
      &mut endpoints.closure_create
    ),
    (
      "duplicateBookingUrl",
      &mut endpoints.duplicate
    )
  ] {
    if let Some(url) = data
      .get(key)
      .map(|url| url.trim().to_string())
      .filter(|url| !url.is_empty())
    {
      *slot = url;
    }
  }

  if let Some(level) = data
    .get("logLevel")
    .filter(|level| !level.trim().is_empty())
  {
    config.logging.level = level;
  }

  config.sanitize();
}
