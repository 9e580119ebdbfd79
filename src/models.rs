//! Domain models mirroring the JSON documents served by the regatta API. The
//! field names on the wire are Portuguese (`nome`, `embarcacoes`, ...), so the
//! structs carry serde renames and keep idiomatic Rust names everywhere else.
//! Request bodies live in separate payload types: a record that was never
//! persisted has no id, and the payloads make it impossible to invent one.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Calendar date format used in forms and request bodies.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
/// Calendar date format used on list cards.
pub const DISPLAY_DATE_FORMAT: &str = "%m/%d/%Y";

/// One collection exposed by the remote service. The list view, the delete
/// dialog and the HTTP client are written against this trait once and then
/// instantiated for athletes and events.
pub trait Resource: Clone + fmt::Debug + DeserializeOwned + Send + 'static {
    /// Request body used for create and update calls.
    type Payload: Serialize + Clone + fmt::Debug + Send + Sync + 'static;

    /// Collection segment below `/api/`.
    const PATH: &'static str;
    /// Lowercase noun used in prompts and status messages.
    const NOUN: &'static str;

    /// Server-assigned identity.
    fn id(&self) -> &str;

    /// Name shown in card titles and confirmation prompts.
    fn display_name(&self) -> &str;

    /// Secondary lines rendered below the card title.
    fn card_details(&self) -> Vec<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Athlete document as returned by `GET /api/atletas`.
pub struct Athlete {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "nome")]
    pub name: String,
    /// National identifier, kept formatted (`000.000.000-00`).
    pub cpf: String,
    #[serde(rename = "embarcacoes", default)]
    pub vessels: Vec<Vessel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A vessel owned by exactly one athlete. The id is only present once the
/// server has persisted it.
pub struct Vessel {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "codigo")]
    pub code: String,
}

impl Resource for Athlete {
    type Payload = AthletePayload;

    const PATH: &'static str = "atletas";
    const NOUN: &'static str = "athlete";

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn card_details(&self) -> Vec<String> {
        vec![
            format!("CPF: {}", self.cpf),
            format!("Vessels: {}", self.vessels.len()),
        ]
    }
}

impl fmt::Display for Athlete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Body of `POST /api/atletas` and `PUT /api/atletas/{id}`.
pub struct AthletePayload {
    #[serde(rename = "nome")]
    pub name: String,
    pub cpf: String,
    #[serde(rename = "embarcacoes")]
    pub vessels: Vec<VesselPayload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Vessel entry inside an athlete payload. Existing vessels echo their id so
/// updates keep the server-side identity.
pub struct VesselPayload {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "codigo")]
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Event document as returned by `GET /api/eventos`. Dates stay as the raw
/// ISO 8601 strings the server sent; see [`format_display_date`].
pub struct Event {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "dataEvento")]
    pub event_date: String,
    #[serde(rename = "inicioInscricoes")]
    pub registration_start: String,
    #[serde(rename = "fimInscricoes")]
    pub registration_end: String,
}

impl Event {
    /// `MM/DD/YYYY - MM/DD/YYYY` registration window for list cards.
    pub fn registration_window(&self) -> String {
        format!(
            "{} - {}",
            format_display_date(&self.registration_start),
            format_display_date(&self.registration_end)
        )
    }
}

impl Resource for Event {
    type Payload = EventPayload;

    const PATH: &'static str = "eventos";
    const NOUN: &'static str = "event";

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn card_details(&self) -> Vec<String> {
        vec![
            format!("Date: {}", format_display_date(&self.event_date)),
            format!("Registration: {}", self.registration_window()),
        ]
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Body of `POST /api/eventos` and `PUT /api/eventos/{id}`.
pub struct EventPayload {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "dataEvento")]
    pub event_date: String,
    #[serde(rename = "inicioInscricoes")]
    pub registration_start: String,
    #[serde(rename = "fimInscricoes")]
    pub registration_end: String,
}

/// Interpret a wire date as a UTC calendar date. Both bare dates and full
/// RFC 3339 timestamps are accepted.
pub fn parse_wire_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT) {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|stamp| stamp.with_timezone(&Utc).date_naive())
}

/// Render a wire date as `MM/DD/YYYY`, falling back to the raw text when the
/// value cannot be parsed.
pub fn format_display_date(raw: &str) -> String {
    match parse_wire_date(raw) {
        Some(date) => date.format(DISPLAY_DATE_FORMAT).to_string(),
        None => raw.to_string(),
    }
}

/// Render a wire date as `YYYY-MM-DD` for editing.
pub fn format_form_date(raw: &str) -> String {
    match parse_wire_date(raw) {
        Some(date) => date.format(ISO_DATE_FORMAT).to_string(),
        None => raw.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn athlete_deserializes_from_wire_shape() {
        let json = r#"{
            "_id": "a1",
            "nome": "Jane Doe",
            "cpf": "123.456.789-00",
            "embarcacoes": [{"_id": "v1", "nome": "Swift", "codigo": "BR-12"}],
            "__v": 0
        }"#;
        let athlete: Athlete = serde_json::from_str(json).unwrap();
        assert_eq!(athlete.id, "a1");
        assert_eq!(athlete.name, "Jane Doe");
        assert_eq!(athlete.vessels.len(), 1);
        assert_eq!(athlete.vessels[0].id.as_deref(), Some("v1"));
        assert_eq!(athlete.vessels[0].code, "BR-12");
    }

    #[test]
    fn new_vessels_are_sent_without_an_id() {
        let payload = AthletePayload {
            name: "Jane Doe".into(),
            cpf: "123.456.789-00".into(),
            vessels: vec![
                VesselPayload {
                    id: None,
                    name: "Swift".into(),
                    code: "BR-12".into(),
                },
                VesselPayload {
                    id: Some("v9".into()),
                    name: "Gale".into(),
                    code: "BR-13".into(),
                },
            ],
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "nome": "Jane Doe",
                "cpf": "123.456.789-00",
                "embarcacoes": [
                    {"nome": "Swift", "codigo": "BR-12"},
                    {"_id": "v9", "nome": "Gale", "codigo": "BR-13"}
                ]
            })
        );
    }

    #[test]
    fn event_card_formats_dates_in_utc() {
        let event = Event {
            id: "e1".into(),
            name: "Regatta".into(),
            event_date: "2024-06-01T00:00:00.000Z".into(),
            registration_start: "2024-05-01".into(),
            registration_end: "2024-05-20T00:00:00.000Z".into(),
        };
        assert_eq!(
            event.card_details(),
            vec![
                "Date: 06/01/2024".to_string(),
                "Registration: 05/01/2024 - 05/20/2024".to_string(),
            ]
        );
    }

    #[test]
    fn form_dates_strip_the_time_component() {
        assert_eq!(format_form_date("2024-06-01T00:00:00.000Z"), "2024-06-01");
        assert_eq!(format_form_date("2024-06-01"), "2024-06-01");
        assert_eq!(format_form_date("soon"), "soon");
        assert_eq!(format_display_date("soon"), "soon");
    }

    #[test]
    fn athlete_card_shows_vessel_count() {
        let athlete = Athlete {
            id: "a1".into(),
            name: "Jane Doe".into(),
            cpf: "123.456.789-00".into(),
            vessels: vec![
                Vessel {
                    id: Some("v1".into()),
                    name: "Swift".into(),
                    code: "BR-12".into(),
                },
                Vessel {
                    id: Some("v2".into()),
                    name: "Gale".into(),
                    code: "BR-13".into(),
                },
            ],
        };
        assert_eq!(
            athlete.card_details(),
            vec!["CPF: 123.456.789-00".to_string(), "Vessels: 2".to_string()]
        );
    }
}
