mod api;
mod app;
mod dom;
mod fullcalendar;
mod page;
mod storage;
mod timers;

use bookgrid_core::config::CalendarConfig;
use wasm_bindgen::JsCast;

fn main() {
  console_error_panic_hook::set_once();

  let mut config = CalendarConfig::embedded();
  if let Some(page) = dom::by_id(dom::PAGE_ID)
    .and_then(|page| {
      page.dyn_into::<web_sys::HtmlElement>().ok()
    })
  {
    page::overlay_page_data(&mut config, &page);
  }

  let mut layer = wasm_tracing::WasmLayerConfig::new();
  layer.set_max_level(config.log_level());
  let _ =
    wasm_tracing::set_as_global_default_with_config(layer);

  tracing::info!(
    level = %config.log_level(),
    closures = config.capabilities.manage_closures,
    copy_shortcuts = config.capabilities.copy_shortcuts,
    "starting booking calendar"
  );

  let Some(calendar) = dom::by_id("calendar") else {
    tracing::warn!(
      "no #calendar element; calendar disabled"
    );
    return;
  };
  if !fullcalendar::is_loaded() {
    tracing::error!(
      "FullCalendar bundle missing; calendar \
       disabled"
    );
    return;
  }

  // grid and page listeners keep the app
  // alive
  app::App::start(config, &calendar);
}
