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
use bookgrid_core::grid::PageChrome;
use bookgrid_core::notify::{
  Notice,
  Overlay
};
use bookgrid_core::quick_booking::FormDialog;
use bookgrid_core::view::{
  ViewType,
  WidthMode
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
  Document,
  Element,
  HtmlButtonElement,
  HtmlElement,
  HtmlInputElement,
  HtmlSelectElement
};

pub const PAGE_ID: &str = "calendar-page";
const WIDTH_CLASSES: [&str; 2] =
  ["calendar-wide", "calendar-fullscreen"];
const SPINNER: &str = "<span class=\"spinner-border \
                       spinner-border-sm\"></span> ";

#[wasm_bindgen]
extern "C" {
  #[wasm_bindgen(js_namespace = bootstrap)]
  type Modal;

  #[wasm_bindgen(
    static_method_of = Modal,
    js_namespace = bootstrap,
    js_name = getOrCreateInstance
  )]
  fn get_or_create_instance(
    element: &Element
  ) -> Modal;

  #[wasm_bindgen(method)]
  fn show(this: &Modal);

  #[wasm_bindgen(method)]
  fn hide(this: &Modal);
}

pub fn document() -> Option<Document> {
  web_sys::window()
    .and_then(|window| window.document())
}

pub fn by_id(id: &str) -> Option<Element> {
  document()?.get_element_by_id(id)
}

pub fn input_by_id(
  id: &str
) -> Option<HtmlInputElement> {
  by_id(id)?.dyn_into().ok()
}

pub fn query(selector: &str) -> Option<Element> {
  document()?.query_selector(selector).ok()?
}

pub fn query_all(selector: &str) -> Vec<Element> {
  let Some(nodes) = document()
    .and_then(|document| {
      document.query_selector_all(selector).ok()
    })
  else {
    return Vec::new();
  };
  (0..nodes.length())
    .filter_map(|index| nodes.item(index))
    .filter_map(|node| node.dyn_into().ok())
    .collect()
}

/// True while typing into an input,
/// textarea or editable region.
pub fn text_entry_focused() -> bool {
  let Some(active) = document()
    .and_then(|document| document.active_element())
  else {
    return false;
  };
  if matches!(
    active.tag_name().as_str(),
    "INPUT" | "TEXTAREA"
  ) {
    return true;
  }
  active
    .dyn_ref::<HtmlElement>()
    .is_some_and(HtmlElement::is_content_editable)
}

pub fn set_text(id: &str, text: &str) {
  if let Some(element) = by_id(id) {
    element.set_text_content(Some(text));
  }
}

pub fn set_hidden(element: &Element, hidden: bool) {
  let _ = element
    .class_list()
    .toggle_with_force("d-none", hidden);
}

pub fn show_modal(id: &str) {
  match by_id(id) {
    | Some(element) => {
      Modal::get_or_create_instance(&element).show();
    }
    | None => {
      tracing::warn!(id, "modal element missing");
    }
  }
}

pub fn hide_modal(id: &str) {
  if let Some(element) = by_id(id) {
    Modal::get_or_create_instance(&element).hide();
  }
}

/// Toolbar title, view switch buttons and
/// page width classes.
pub struct DomChrome;

impl PageChrome for DomChrome {
  fn set_range_title(&self, title: &str) {
    set_text("calendar-current-range", title);
  }

  fn highlight_view(&self, active: ViewType) {
    for button in query_all("[data-view-switch]") {
      let selected = button
        .get_attribute("data-view-switch")
        .as_deref()
        == Some(active.as_key());
      let classes = button.class_list();
      let _ =
        classes.toggle_with_force("active", selected);
      let _ = classes
        .toggle_with_force("btn-primary", selected);
      let _ = classes.toggle_with_force(
        "btn-outline-primary",
        !selected
      );
    }
  }

  fn apply_width_mode(&self, mode: WidthMode) {
    if let Some(page) = by_id(PAGE_ID) {
      let classes = page.class_list();
      for class in WIDTH_CLASSES {
        let _ = classes.remove_1(class);
      }
      if let Some(class) = mode.page_class() {
        let _ = classes.add_1(class);
      }
    }
    if let Some(button) = by_id("toggle-width-btn") {
      let (text, icon) = mode.toggle_label();
      button.set_inner_html(&format!(
        "<i class=\"{icon}\"></i> {text}"
      ));
    }
  }
}

/// The `#resultModal` status dialog.
pub struct ResultOverlay;

impl Overlay for ResultOverlay {
  fn clear_backdrops(&self) {
    for backdrop in query_all(".modal-backdrop") {
      backdrop.remove();
    }
    if let Some(body) =
      document().and_then(|document| document.body())
    {
      let _ = body.class_list().remove_1("modal-open");
      let _ =
        body.style().remove_property("padding-right");
    }
  }

  fn show(&self, notice: &Notice) {
    set_text("resultTitle", &notice.title);
    if let Some(header) = by_id("resultHeader") {
      header.set_class_name(
        notice.tone().header_class()
      );
    }
    if let (Some(body), Some(document)) =
      (by_id("resultBody"), document())
    {
      body.set_text_content(None);
      for (text, class) in [
        (Some(notice.message.as_str()), None),
        (notice.warning.as_deref(), Some("mt-2"))
      ] {
        let Some(text) = text else {
          continue;
        };
        if let Ok(paragraph) =
          document.create_element("p")
        {
          if let Some(class) = class {
            paragraph.set_class_name(class);
          }
          paragraph.set_text_content(Some(text));
          let _ = body.append_child(&paragraph);
        }
      }
    }
    show_modal("resultModal");
  }

  fn hide(&self) {
    hide_modal("resultModal");
  }
}

/// A bootstrap modal wrapping a form with
/// one submit button.
#[derive(Clone)]
pub struct ModalForm {
  modal_id:   &'static str,
  button:     Option<HtmlButtonElement>,
  idle_label: String,
  busy_label: &'static str
}

impl ModalForm {
  pub fn new(
    modal_id: &'static str,
    button_selector: &str,
    busy_label: &'static str
  ) -> Self {
    let button = query(button_selector)
      .and_then(|element| element.dyn_into().ok());
    let idle_label = button
      .as_ref()
      .map(|button: &HtmlButtonElement| {
        button.inner_html()
      })
      .unwrap_or_default();
    Self {
      modal_id,
      button,
      idle_label,
      busy_label
    }
  }
}

impl FormDialog for ModalForm {
  fn set_busy(&self, busy: bool) {
    let Some(button) = &self.button else {
      return;
    };
    button.set_disabled(busy);
    if busy {
      button.set_inner_html(&format!(
        "{SPINNER}{}",
        self.busy_label
      ));
    } else {
      button.set_inner_html(&self.idle_label);
    }
  }

  fn close(&self) {
    hide_modal(self.modal_id);
  }
}

/// Cabinet closure creation dialog.
#[derive(Clone)]
pub struct ClosureForm(pub ModalForm);

impl FormDialog for ClosureForm {
  fn set_busy(&self, busy: bool) {
    self.0.set_busy(busy);
  }

  fn close(&self) {
    self.0.close();
  }
}

impl ClosureFormView for ClosureForm {
  fn clear_errors(&self) {
    for block in
      query_all("[data-role^=\"closure-error-\"]")
    {
      set_hidden(&block, true);
      block.set_text_content(None);
    }
  }

  fn show_errors(&self, layout: &ErrorLayout) {
    for (field, message) in &layout.fields {
      if let Some(block) = query(&format!(
        "[data-role=\"closure-error-{field}\"]"
      )) {
        block.set_text_content(Some(message));
        set_hidden(&block, false);
      }
    }
    if let (Some(general), Some(block)) = (
      &layout.general,
      query("[data-role=\"closure-error-non-field\"]")
    ) {
      block.set_text_content(Some(general));
      set_hidden(&block, false);
    }
  }
}

/// Delete confirmation for one closure.
#[derive(Clone)]
pub struct ClosureDeleteDialog(pub ModalForm);

impl FormDialog for ClosureDeleteDialog {
  fn set_busy(&self, busy: bool) {
    self.0.set_busy(busy);
  }

  fn close(&self) {
    self.0.close();
  }
}

impl ConfirmDialog for ClosureDeleteDialog {
  fn show_prompt(
    &self,
    prompt: &ClosureDeletePrompt
  ) {
    set_text("closureDeleteCabinetName", &prompt.cabinet);
    set_text("closureDeletePeriod", &prompt.period);
    show_modal(self.0.modal_id);
  }
}

/// The booking editor modal around the
/// server-rendered form in `body`.
pub struct EditorDialog {
  pub form: ModalForm,
  pub body: Element
}

impl FormDialog for EditorDialog {
  fn set_busy(&self, busy: bool) {
    self.form.set_busy(busy);
  }

  fn close(&self) {
    self.form.close();
  }
}

impl BookingEditView for EditorDialog {
  fn replace_form(&self, html: &str) {
    self.body.set_inner_html(html);
  }
}

/// Shown in place of an editor form that
/// failed to load.
pub fn show_editor_failure(body: &Element, href: &str) {
  let Some(document) = document() else {
    return;
  };
  body.set_text_content(None);
  let (Ok(alert), Ok(link)) = (
    document.create_element("div"),
    document.create_element("a")
  ) else {
    return;
  };
  alert.set_class_name("alert alert-danger mb-0");
  link.set_class_name("alert-link");
  let _ = link.set_attribute("href", href);
  link.set_text_content(Some("Open it on a separate page"));

  let _ = alert.append_with_str_1("Could not load the form. ");
  let _ = alert.append_child(&link);
  let _ = alert.append_with_str_1(".");
  let _ = body.append_child(&alert);
}

/// A `<select>` refilled from a lookup.
#[derive(Clone, Copy)]
pub struct SelectChoices(pub &'static str);

impl SelectChoices {
  fn select(&self) -> Option<HtmlSelectElement> {
    by_id(self.0)?.dyn_into().ok()
  }

  fn replace(
    &self,
    disabled: bool,
    options: &[(&str, &str)]
  ) {
    let (Some(select), Some(document)) =
      (self.select(), document())
    else {
      return;
    };
    select.set_text_content(None);
    for (value, label) in options {
      if let Ok(option) =
        document.create_element("option")
      {
        let _ = option.set_attribute("value", value);
        option.set_text_content(Some(label));
        let _ = select.append_child(&option);
      }
    }
    select.set_disabled(disabled);
  }
}

impl ChoiceList for SelectChoices {
  fn show_loading(&self, label: &str) {
    self.replace(true, &[("", label)]);
  }

  fn fill(
    &self,
    placeholder: &str,
    choices: &[Choice]
  ) {
    let options: Vec<(&str, &str)> =
      std::iter::once(("", placeholder))
        .chain(choices.iter().map(|choice| {
          (choice.value.as_str(), choice.label.as_str())
        }))
        .collect();
    self.replace(false, &options);
  }
}
