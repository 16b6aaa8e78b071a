use bookgrid_shared::{
  AvailableCabinets,
  CabinetQuery
};

use crate::api::BookingApi;

pub const SELECT_SERVICE_FIRST: &str =
  "Select a service first";
pub const SELECT_SLOT_FIRST: &str =
  "Select a service, specialist and time first";
pub const SELECT_SPECIALIST_FIRST: &str =
  "Select a specialist and time first";
pub const LOADING: &str = "Loading...";
pub const SPECIALIST_PLACEHOLDER: &str =
  "Select a specialist";
pub const CABINET_PLACEHOLDER: &str =
  "-- Select a cabinet (optional) --";
pub const NO_CABINETS: &str =
  "No cabinets available";
pub const LOAD_FAILED: &str = "Failed to load";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
  pub value: String,
  pub label: String
}

/// A select control filled from a lookup.
pub trait ChoiceList {
  /// Disables the control behind a single
  /// placeholder option.
  fn show_loading(&self, label: &str);

  /// Enables the control with an empty
  /// `placeholder` option followed by
  /// `choices`.
  fn fill(
    &self,
    placeholder: &str,
    choices: &[Choice]
  );
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum LookupOutcome {
  /// A required selection was missing; no
  /// request went out.
  Skipped,
  Loaded(usize),
  /// The server answered with an
  /// explanation instead of choices.
  Refused,
  Failed
}

/// Puts both lookups back to their
/// pre-selection state.
pub fn reset_choices<S, C>(
  specialists: &S,
  cabinets: &C
) where
  S: ChoiceList + ?Sized,
  C: ChoiceList + ?Sized
{
  specialists.fill(SELECT_SERVICE_FIRST, &[]);
  cabinets.fill(SELECT_SLOT_FIRST, &[]);
}

/// Refills the specialist list for the
/// chosen service; the cabinet list waits
/// for a specialist again.
#[tracing::instrument(skip(api, specialists, cabinets))]
pub async fn load_specialists<A, S, C>(
  api: &A,
  specialists: &S,
  cabinets: &C,
  service_variant_id: &str
) -> LookupOutcome
where
  A: BookingApi,
  S: ChoiceList + ?Sized,
  C: ChoiceList + ?Sized
{
  let service_variant_id =
    service_variant_id.trim();
  if service_variant_id.is_empty() {
    reset_choices(specialists, cabinets);
    return LookupOutcome::Skipped;
  }

  specialists.show_loading(LOADING);
  match api
    .specialists_for_service(service_variant_id)
    .await
  {
    | Ok(found) => {
      let choices: Vec<Choice> = found
        .into_iter()
        .map(|specialist| Choice {
          value: specialist.id,
          label: specialist.full_name
        })
        .collect();
      tracing::debug!(
        count = choices.len(),
        "specialists loaded"
      );
      specialists
        .fill(SPECIALIST_PLACEHOLDER, &choices);
      cabinets.fill(SELECT_SPECIALIST_FIRST, &[]);
      LookupOutcome::Loaded(choices.len())
    }
    | Err(error) => {
      tracing::warn!(
        %error,
        "failed to load specialists"
      );
      specialists.fill(LOAD_FAILED, &[]);
      LookupOutcome::Failed
    }
  }
}

/// Refills the cabinet list once service,
/// specialist and start are all known.
#[tracing::instrument(skip(api, cabinets))]
pub async fn load_cabinets<A, C>(
  api: &A,
  cabinets: &C,
  service_variant_id: &str,
  specialist_id: &str,
  start_datetime: &str
) -> LookupOutcome
where
  A: BookingApi,
  C: ChoiceList + ?Sized
{
  let query = CabinetQuery {
    service_variant_id: service_variant_id
      .trim()
      .to_string(),
    specialist_id:      specialist_id
      .trim()
      .to_string(),
    datetime:           start_datetime
      .trim()
      .to_string()
  };
  if query.service_variant_id.is_empty()
    || query.specialist_id.is_empty()
    || query.datetime.is_empty()
  {
    cabinets.fill(SELECT_SLOT_FIRST, &[]);
    return LookupOutcome::Skipped;
  }

  cabinets.show_loading(LOADING);
  match api.available_cabinets(&query).await {
    | Ok(AvailableCabinets {
      error: Some(error),
      ..
    }) => {
      tracing::debug!(%error, "no cabinets offered");
      cabinets.fill(&error, &[]);
      LookupOutcome::Refused
    }
    | Ok(AvailableCabinets {
      cabinets: found,
      error: None
    }) => {
      if found.is_empty() {
        cabinets.fill(NO_CABINETS, &[]);
        return LookupOutcome::Loaded(0);
      }
      let choices: Vec<Choice> = found
        .into_iter()
        .map(|cabinet| Choice {
          value: cabinet.id,
          label: cabinet.name
        })
        .collect();
      cabinets.fill(CABINET_PLACEHOLDER, &choices);
      LookupOutcome::Loaded(choices.len())
    }
    | Err(error) => {
      tracing::warn!(
        %error,
        "failed to load cabinets"
      );
      cabinets.fill(LOAD_FAILED, &[]);
      LookupOutcome::Failed
    }
  }
}
