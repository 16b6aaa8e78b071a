use std::collections::BTreeMap;

use serde::{
  Deserialize,
  Deserializer,
  Serialize
};

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
  #[default]
  Booking,
  Closure
}

/// `extendedProps` of a feed entry, as
/// the grid hands it back on callbacks.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
pub struct EventProps {
  #[serde(
    rename = "eventType",
    default
  )]
  pub kind:       EventKind,
  #[serde(
    rename = "seriesId",
    default,
    deserialize_with = "de_opt_id"
  )]
  pub series_id:  Option<String>,
  #[serde(
    rename = "canDelete",
    default
  )]
  pub can_delete: bool,
  #[serde(default)]
  pub cabinet:    Option<String>,
  #[serde(default)]
  pub reason:     Option<String>
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
  Number(i64),
  Float(f64),
  Text(String)
}

/// Series ids are positive; `0`, blank and
/// null all mean "not in a series".
fn de_opt_id<'de, D>(
  deserializer: D
) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>
{
  let raw =
    Option::<RawId>::deserialize(
      deserializer
    )?;
  let id = raw.map(|id| match id {
    | RawId::Number(value) => {
      value.to_string()
    }
    | RawId::Float(value) => {
      format!("{value:.0}")
    }
    | RawId::Text(value) => {
      value.trim().to_string()
    }
  });
  Ok(id.filter(|id| {
    !id.is_empty() && id != "0" && id != "-0"
  }))
}

fn de_id<'de, D>(
  deserializer: D
) -> Result<String, D::Error>
where
  D: Deserializer<'de>
{
  Ok(match RawId::deserialize(deserializer)? {
    | RawId::Number(value) => value.to_string(),
    | RawId::Float(value) => format!("{value:.0}"),
    | RawId::Text(value) => value.trim().to_string()
  })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FieldMessages {
  One(String),
  Many(Vec<String>)
}

fn de_field_errors<'de, D>(
  deserializer: D
) -> Result<
  BTreeMap<String, Vec<String>>,
  D::Error
>
where
  D: Deserializer<'de>
{
  let raw = Option::<
    BTreeMap<String, FieldMessages>
  >::deserialize(deserializer)?;
  Ok(
    raw
      .unwrap_or_default()
      .into_iter()
      .map(|(field, messages)| {
        let messages = match messages {
          | FieldMessages::One(one) => {
            vec![one]
          }
          | FieldMessages::Many(
            many
          ) => many
        };
        (field, messages)
      })
      .collect()
  )
}

/// Structured result of every mutation
/// endpoint.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
pub struct MutationResponse {
  #[serde(default)]
  pub success: bool,
  #[serde(default)]
  pub message: Option<String>,
  #[serde(default)]
  pub warning: Option<String>,
  #[serde(default)]
  pub error:   Option<String>,
  #[serde(
    default,
    deserialize_with = "de_field_errors"
  )]
  pub errors:
    BTreeMap<String, Vec<String>>,
  /// Re-rendered form markup returned by
  /// form-backed endpoints.
  #[serde(default)]
  pub html:    Option<String>
}

impl MutationResponse {
  pub fn warning_text(
    &self
  ) -> Option<&str> {
    self
      .warning
      .as_deref()
      .map(str::trim)
      .filter(|text| !text.is_empty())
  }
}

/// Form body of the reschedule and
/// duplicate endpoints.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct BookingTimeArgs {
  pub booking_id:     String,
  pub start_datetime: String
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
pub struct RecurrenceArgs {
  pub recurrence_enabled:        bool,
  pub recurrence_frequency:      String,
  pub recurrence_interval:       u32,
  #[serde(default)]
  pub recurrence_weekdays:       Vec<u8>,
  pub recurrence_end_type:       String,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub recurrence_occurrences:
    Option<u32>,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub recurrence_end_date:
    Option<String>,
  #[serde(default)]
  pub recurrence_excluded_dates: String
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
pub struct QuickBookingArgs {
  pub service_variant:   String,
  pub specialist:        String,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub cabinet:           Option<String>,
  pub guest_name:        String,
  #[serde(default)]
  pub guest_room_number: String,
  pub start_datetime:    String,
  #[serde(flatten)]
  pub recurrence:
    Option<RecurrenceArgs>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
pub struct ClosureCreateArgs {
  pub cabinet:    String,
  pub start_time: String,
  pub end_time:   String,
  #[serde(default)]
  pub reason:     String
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct ClosureIdArg {
  pub closure_id: String
}

/// One entry of the specialists-for-service
/// lookup.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct SpecialistOption {
  #[serde(deserialize_with = "de_id")]
  pub id:        String,
  #[serde(default)]
  pub full_name: String
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct CabinetOption {
  #[serde(deserialize_with = "de_id")]
  pub id:   String,
  #[serde(default)]
  pub name: String
}

/// Body of the available-cabinets lookup;
/// refusals carry only `error`.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
pub struct AvailableCabinets {
  #[serde(default)]
  pub cabinets: Vec<CabinetOption>,
  #[serde(default)]
  pub error:    Option<String>
}

/// Query string of the available-cabinets
/// lookup.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct CabinetQuery {
  pub service_variant_id: String,
  pub specialist_id:      String,
  pub datetime:           String
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn decodes_field_errors_in_both_shapes(
  ) {
    let response: MutationResponse =
      serde_json::from_str(
        r#"{"success": false, "errors": {"start_time": ["obrigatory"], "__all__": "overlap"}}"#
      )
      .expect("decode response");

    assert!(!response.success);
    assert_eq!(
      response.errors["start_time"],
      vec!["obrigatory".to_string()]
    );
    assert_eq!(
      response.errors["__all__"],
      vec!["overlap".to_string()]
    );
  }

  #[test]
  fn blank_warning_is_not_a_warning() {
    let response: MutationResponse =
      serde_json::from_str(
        r#"{"success": true, "message": "OK", "warning": "  "}"#
      )
      .expect("decode response");

    assert_eq!(
      response.message.as_deref(),
      Some("OK")
    );
    assert_eq!(
      response.warning_text(),
      None
    );
  }

  #[test]
  fn event_props_accept_numeric_series_ids(
  ) {
    let props: EventProps =
      serde_json::from_str(
        r#"{"eventType": "booking", "seriesId": 42, "cabinet": "Sauna"}"#
      )
      .expect("decode props");
    assert_eq!(
      props.series_id.as_deref(),
      Some("42")
    );
    assert!(!props.can_delete);

    let closure: EventProps =
      serde_json::from_str(
        r#"{"eventType": "closure", "seriesId": null, "canDelete": true}"#
      )
      .expect("decode props");
    assert_eq!(
      closure.kind,
      EventKind::Closure
    );
    assert_eq!(closure.series_id, None);
    assert!(closure.can_delete);
  }

  #[test]
  fn lookup_entries_accept_numeric_ids() {
    let specialists: Vec<SpecialistOption> =
      serde_json::from_str(
        r#"[{"id": 4, "full_name": "Petrova A."}, {"id": "9", "full_name": "Sidorov B."}]"#
      )
      .expect("decode specialists");
    assert_eq!(specialists[0].id, "4");
    assert_eq!(specialists[1].full_name, "Sidorov B.");

    let cabinets: AvailableCabinets =
      serde_json::from_str(
        r#"{"cabinets": [{"id": 2, "name": "Sauna"}]}"#
      )
      .expect("decode cabinets");
    assert_eq!(cabinets.cabinets[0].id, "2");
    assert_eq!(cabinets.error, None);

    let refused: AvailableCabinets =
      serde_json::from_str(
        r#"{"error": "No matching cabinets"}"#
      )
      .expect("decode refusal");
    assert!(refused.cabinets.is_empty());
    assert_eq!(
      refused.error.as_deref(),
      Some("No matching cabinets")
    );
  }

  #[test]
  fn rejected_forms_carry_their_markup() {
    let response: MutationResponse =
      serde_json::from_str(
        r#"{"success": false, "html": "<form></form>", "errors": {"guest_name": ["required"]}}"#
      )
      .expect("decode response");
    assert_eq!(
      response.html.as_deref(),
      Some("<form></form>")
    );
    assert_eq!(response.error, None);
  }

  #[test]
  fn zero_series_ids_mean_no_series() {
    for raw in [
      r#"{"seriesId": 0}"#,
      r#"{"seriesId": 0.0}"#,
      r#"{"seriesId": "0"}"#,
      r#"{"seriesId": " "}"#,
      r#"{}"#
    ] {
      let props: EventProps =
        serde_json::from_str(raw)
          .expect("decode props");
      assert_eq!(props.series_id, None, "{raw}");
    }

    let props: EventProps =
      serde_json::from_str(
        r#"{"seriesId": "10"}"#
      )
      .expect("decode props");
    assert_eq!(
      props.series_id.as_deref(),
      Some("10")
    );
  }

  #[test]
  fn disabled_recurrence_is_left_out_of_the_form(
  ) {
    let args = QuickBookingArgs {
      service_variant: "3".to_string(),
      specialist: "7".to_string(),
      guest_name: "Ivanova".to_string(),
      start_datetime: "2025-06-01T09:00"
        .to_string(),
      ..QuickBookingArgs::default()
    };

    let value = serde_json::to_value(&args)
      .expect("encode args");
    assert!(
      value
        .get("recurrence_frequency")
        .is_none()
    );
    assert!(value.get("cabinet").is_none());
    assert_eq!(
      value["start_datetime"],
      "2025-06-01T09:00"
    );
  }
}
