use std::rc::Rc;

use bookgrid_core::api::{
  ApiError,
  ApiResult,
  BookingApi,
  CSRF_COOKIE,
  CSRF_HEADER,
  cookie_value
};
use bookgrid_core::config::CalendarConfig;
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
use gloo::net::http::{
  Request,
  Response
};
use serde::{
  Deserialize,
  Serialize
};
use serde_json::Value;
use wasm_bindgen::{
  JsCast,
  JsValue
};
use web_sys::FormData;

const AJAX_HEADER: &str = "X-Requested-With";
const AJAX_VALUE: &str = "XMLHttpRequest";

/// Body of a refused lookup.
#[derive(Debug, Default, Deserialize)]
struct LookupError {
  #[serde(default)]
  error: Option<String>
}

/// Partial-page payload of the booking
/// editor.
#[derive(Debug, Deserialize)]
struct EditorPayload {
  #[serde(default)]
  html:  Option<String>,
  #[serde(default)]
  error: Option<String>
}

/// Mutation endpoints over `fetch`.
#[derive(Clone)]
pub struct FetchApi {
  config:     Rc<CalendarConfig>,
  csrf_token: Option<String>
}

impl FetchApi {
  pub fn new(config: Rc<CalendarConfig>) -> Self {
    let csrf_token = read_csrf_token();
    if csrf_token.is_none() {
      tracing::warn!(
        cookie = CSRF_COOKIE,
        "no CSRF cookie; mutations will be \
         refused by the server"
      );
    }
    Self { config, csrf_token }
  }

  async fn post_form<T>(
    &self,
    url: &str,
    payload: &T
  ) -> ApiResult
  where
    T: Serialize + ?Sized
  {
    let body = form_data(payload)?;
    self.send_form(url, body).await
  }

  async fn send_form(
    &self,
    url: &str,
    body: FormData
  ) -> ApiResult {
    let mut request = Request::post(url)
      .header(AJAX_HEADER, AJAX_VALUE);
    if let Some(token) = &self.csrf_token {
      request = request.header(CSRF_HEADER, token);
    }
    let response = request
      .body(body)
      .map_err(transport)?
      .send()
      .await
      .map_err(transport)?;
    read_mutation(response).await
  }

  /// Loads the booking editor markup from
  /// its partial-page URL.
  pub async fn booking_editor(
    &self,
    url: &str
  ) -> Result<String, ApiError> {
    let response = Request::get(url)
      .header(AJAX_HEADER, AJAX_VALUE)
      .send()
      .await
      .map_err(transport)?;
    let ok = response.ok();
    let payload = response
      .json::<EditorPayload>()
      .await
      .map_err(|error| {
        ApiError::Decode(error.to_string())
      })?;
    match (ok, payload.html) {
      | (true, Some(html)) => Ok(html),
      | _ => Err(ApiError::Decode(
        payload.error.unwrap_or_else(|| {
          "booking editor unavailable"
            .to_string()
        })
      ))
    }
  }
}

impl BookingApi for FetchApi {
  async fn submit_booking_form(
    &self,
    action: &str,
    fields: &[(String, String)]
  ) -> ApiResult {
    let body = FormData::new().map_err(js_error)?;
    for (name, value) in fields {
      body
        .append_with_str(name, value)
        .map_err(js_error)?;
    }
    self.send_form(action, body).await
  }

  async fn specialists_for_service(
    &self,
    service_variant_id: &str
  ) -> Result<Vec<SpecialistOption>, ApiError> {
    let response = Request::get(
      &self.config.endpoints.specialists_for_service
    )
    .query([("service_variant_id", service_variant_id)])
    .send()
    .await
    .map_err(transport)?;

    if response.ok() {
      return response
        .json::<Vec<SpecialistOption>>()
        .await
        .map_err(|error| {
          ApiError::Decode(error.to_string())
        });
    }
    let status = response.status();
    let refused = response
      .json::<LookupError>()
      .await
      .unwrap_or_default();
    Err(ApiError::Decode(refused.error.unwrap_or_else(
      || format!("status {status}")
    )))
  }

  async fn available_cabinets(
    &self,
    query: &CabinetQuery
  ) -> Result<AvailableCabinets, ApiError> {
    let response = Request::get(
      &self.config.endpoints.available_cabinets
    )
    .query([
      ("service_variant_id", &query.service_variant_id),
      ("specialist_id", &query.specialist_id),
      ("datetime", &query.datetime)
    ])
    .send()
    .await
    .map_err(transport)?;

    // refusals come back as 4xx with an
    // `error` body
    let status = response.status();
    response
      .json::<AvailableCabinets>()
      .await
      .map_err(|error| {
        ApiError::Decode(format!(
          "status {status}: {error}"
        ))
      })
  }

  async fn update_booking_time(
    &self,
    args: &BookingTimeArgs
  ) -> ApiResult {
    self
      .post_form(
        &self.config.endpoints.update_time,
        args
      )
      .await
  }

  async fn duplicate_booking(
    &self,
    args: &BookingTimeArgs
  ) -> ApiResult {
    self
      .post_form(
        &self.config.endpoints.duplicate,
        args
      )
      .await
  }

  async fn quick_create_booking(
    &self,
    args: &QuickBookingArgs
  ) -> ApiResult {
    self
      .post_form(
        &self.config.endpoints.quick_create,
        args
      )
      .await
  }

  async fn create_closure(
    &self,
    args: &ClosureCreateArgs
  ) -> ApiResult {
    self
      .post_form(
        &self.config.endpoints.closure_create,
        args
      )
      .await
  }

  async fn delete_closure(
    &self,
    args: &ClosureIdArg
  ) -> ApiResult {
    // the id travels in the path; the body
    // is empty
    let url = self
      .config
      .closure_delete_url(&args.closure_id);
    self
      .post_form(&url, &serde_json::Map::new())
      .await
  }
}

fn transport(error: gloo::net::Error) -> ApiError {
  ApiError::Transport(error.to_string())
}

fn js_error(error: JsValue) -> ApiError {
  ApiError::Transport(format!("{error:?}"))
}

/// Non-2xx answers still carry a mutation
/// body; they never count as success.
async fn read_mutation(
  response: Response
) -> ApiResult {
  let ok = response.ok();
  let status = response.status();
  let mut decoded = response
    .json::<MutationResponse>()
    .await
    .map_err(|error| {
      ApiError::Decode(format!(
        "status {status}: {error}"
      ))
    })?;
  if !ok && decoded.success {
    tracing::warn!(
      status,
      "error status with a success body"
    );
    decoded.success = false;
  }
  Ok(decoded)
}

fn field_text(value: &Value) -> String {
  match value {
    | Value::String(text) => text.clone(),
    | Value::Bool(flag) => flag.to_string(),
    | other => other.to_string()
  }
}

/// Flattens a serializable struct into a
/// multipart form; lists repeat their
/// field name, nulls are left out.
fn form_data<T>(
  payload: &T
) -> Result<FormData, ApiError>
where
  T: Serialize + ?Sized
{
  let value = serde_json::to_value(payload)
    .map_err(|error| {
      ApiError::Transport(format!(
        "failed to encode form: {error}"
      ))
    })?;
  let form = FormData::new().map_err(js_error)?;
  let Value::Object(fields) = value else {
    return Ok(form);
  };

  for (name, value) in fields {
    match value {
      | Value::Null => {}
      | Value::Array(items) => {
        for item in items {
          form
            .append_with_str(
              &name,
              &field_text(&item)
            )
            .map_err(js_error)?;
        }
      }
      | other => {
        form
          .append_with_str(
            &name,
            &field_text(&other)
          )
          .map_err(js_error)?;
      }
    }
  }
  Ok(form)
}

fn read_csrf_token() -> Option<String> {
  let cookies = web_sys::window()
    .and_then(|window| window.document())
    .and_then(|document| {
      document
        .dyn_into::<web_sys::HtmlDocument>()
        .ok()
    })
    .and_then(|document| document.cookie().ok())?;
  let raw = cookie_value(&cookies, CSRF_COOKIE)?;
  js_sys::decode_uri_component(raw)
    .ok()
    .map(String::from)
}
