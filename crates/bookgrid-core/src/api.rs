use std::fmt;

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

use crate::notify::Notice;

pub const CSRF_COOKIE: &str = "csrftoken";
pub const CSRF_HEADER: &str = "X-CSRFToken";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
  /// Request never produced a response.
  Transport(String),
  /// Response body was not a mutation
  /// result.
  Decode(String)
}

impl fmt::Display for ApiError {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    match self {
      | ApiError::Transport(detail) => {
        write!(f, "request failed: {detail}")
      }
      | ApiError::Decode(detail) => {
        write!(
          f,
          "unreadable response: {detail}"
        )
      }
    }
  }
}

impl std::error::Error for ApiError {}

pub type ApiResult =
  Result<MutationResponse, ApiError>;

/// Backend endpoints. Mutations post a
/// form body with the CSRF header and
/// resolve to the structured result;
/// lookups are plain GETs.
#[allow(async_fn_in_trait)]
pub trait BookingApi {
  async fn update_booking_time(
    &self,
    args: &BookingTimeArgs
  ) -> ApiResult;

  async fn duplicate_booking(
    &self,
    args: &BookingTimeArgs
  ) -> ApiResult;

  async fn quick_create_booking(
    &self,
    args: &QuickBookingArgs
  ) -> ApiResult;

  async fn create_closure(
    &self,
    args: &ClosureCreateArgs
  ) -> ApiResult;

  async fn delete_closure(
    &self,
    args: &ClosureIdArg
  ) -> ApiResult;

  /// Posts the fields of a server-rendered
  /// form to its `action`.
  async fn submit_booking_form(
    &self,
    action: &str,
    fields: &[(String, String)]
  ) -> ApiResult;

  async fn specialists_for_service(
    &self,
    service_variant_id: &str
  ) -> Result<Vec<SpecialistOption>, ApiError>;

  async fn available_cabinets(
    &self,
    query: &CabinetQuery
  ) -> Result<AvailableCabinets, ApiError>;
}

/// How an asynchronous flow settled.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum FlowOutcome {
  Confirmed,
  ConfirmedWithWarning,
  Rejected,
  TransportFailed
}

impl FlowOutcome {
  pub fn is_success(self) -> bool {
    matches!(
      self,
      FlowOutcome::Confirmed
        | FlowOutcome::ConfirmedWithWarning
    )
  }
}

/// User-facing wording of one mutation
/// flow.
#[derive(Debug, Clone, Copy)]
pub struct FlowText {
  pub success_title:   &'static str,
  pub warning_title:   &'static str,
  pub success_message: &'static str,
  pub failure_message: &'static str,
  pub transport_message: &'static str
}

/// Maps a settled request onto its
/// outcome and the notice to present.
pub fn settle(
  result: &ApiResult,
  text: &FlowText
) -> (FlowOutcome, Notice) {
  match result {
    | Ok(response) if response.success => {
      let message = response
        .message
        .clone()
        .filter(|message| {
          !message.trim().is_empty()
        })
        .unwrap_or_else(|| {
          text.success_message.to_string()
        });
      match response.warning_text() {
        | Some(warning) => (
          FlowOutcome::ConfirmedWithWarning,
          Notice::success(
            text.warning_title,
            message
          )
          .with_warning(Some(warning))
        ),
        | None => (
          FlowOutcome::Confirmed,
          Notice::success(
            text.success_title,
            message
          )
        )
      }
    }
    | Ok(response) => {
      tracing::warn!(
        error = ?response.error,
        fields = response.errors.len(),
        "mutation rejected by server"
      );
      (
        FlowOutcome::Rejected,
        Notice::error(
          "Error",
          rejection_message(
            response,
            text.failure_message
          )
        )
      )
    }
    | Err(error) => {
      tracing::error!(
        %error,
        "mutation request failed"
      );
      (
        FlowOutcome::TransportFailed,
        Notice::error(
          "Error",
          text.transport_message
        )
      )
    }
  }
}

fn rejection_message(
  response: &MutationResponse,
  fallback: &str
) -> String {
  if !response.errors.is_empty() {
    return response
      .errors
      .values()
      .flatten()
      .map(String::as_str)
      .collect::<Vec<_>>()
      .join(" ");
  }

  response
    .error
    .as_deref()
    .or(response.message.as_deref())
    .map(str::trim)
    .filter(|message| !message.is_empty())
    .unwrap_or(fallback)
    .to_string()
}

/// Looks a cookie up in a
/// `document.cookie` style string.
pub fn cookie_value<'a>(
  cookies: &'a str,
  name: &str
) -> Option<&'a str> {
  cookies
    .split(';')
    .map(str::trim)
    .find_map(|pair| {
      let (key, value) =
        pair.split_once('=')?;
      (key == name).then_some(value)
    })
}
