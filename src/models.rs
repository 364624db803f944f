use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub location_info: Option<BaseLocation>,
    pub venue_type: Option<LookUp>,
    pub file_image_url: Option<String>,
    pub url: String,
    pub created_by: Option<BaseUser>,
    pub modified_by: Option<BaseUser>,
    #[serde(deserialize_with = "backend_timestamp")]
    pub date_created: DateTime<Utc>,
    // backend contract spells it this way
    #[serde(
        rename = "dateModifed",
        alias = "dateModified",
        deserialize_with = "backend_timestamp"
    )]
    pub date_modified: DateTime<Utc>,
}

/// Accepts RFC 3339 as well as the offset-free form the service writes
/// (`2024-03-01T12:00:00.1234567`), which is taken as UTC.
fn backend_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_backend_timestamp(&raw).map_err(serde::de::Error::custom)
}

pub fn parse_backend_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    trimmed
        .parse::<NaiveDateTime>()
        .map(|naive| naive.and_utc())
        .map_err(|err| format!("invalid timestamp {trimmed:?}: {err}"))
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BaseLocation {
    pub id: i64,
    pub line_one: String,
    pub line_two: Option<String>,
    pub city: String,
    pub zip: Option<String>,
    pub state: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BaseUser {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub mi: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LookUp {
    pub id: i64,
    pub name: String,
}

/// A select option built from a [`LookUp`] row.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct VenueTypeOption {
    pub key: i64,
    pub value: String,
    pub label: String,
}

impl From<&LookUp> for VenueTypeOption {
    fn from(item: &LookUp) -> Self {
        Self {
            key: item.id,
            value: item.id.to_string(),
            label: item.name.clone(),
        }
    }
}

/// Descriptive fields handed back by the location picker.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Location {
    pub line_one: String,
    pub line_two: Option<String>,
    pub city: String,
    pub zip: Option<String>,
    pub state_id: Option<i64>,
    pub location_type_id: Option<i64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLocation {
    pub id: i64,
    #[serde(flatten)]
    pub location: Location,
}

impl ResolvedLocation {
    pub fn new(location: Location, id: i64) -> Self {
        Self { id, location }
    }

    pub fn is_resolved(&self) -> bool {
        self.id != 0
    }

    /// "1 Main St Suite 4, Springfield"
    pub fn display_line(&self) -> String {
        let second = self
            .location
            .line_two
            .as_deref()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| format!(" {line}"))
            .unwrap_or_default();
        format!(
            "{}{}, {}",
            self.location.line_one, second, self.location.city
        )
    }
}

/// In-progress form values. `venue_type_id` keeps the raw select value so the
/// schema can report a non-numeric choice; `None` means nothing is selected.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct VenueDraft {
    pub name: String,
    pub description: String,
    pub venue_type_id: Option<String>,
    pub file_id: i64,
    pub url: String,
}

impl VenueDraft {
    pub fn has_file(&self) -> bool {
        self.file_id != 0
    }
}

/// Body of the create-venue call.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VenueAddRequest {
    pub name: String,
    pub description: String,
    pub location_id: i64,
    pub venue_type_id: i64,
    pub file_id: i64,
    pub url: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct FileUploadItem {
    pub id: Option<i64>,
    pub url: Option<String>,
    pub name: Option<String>,
}

/// Completion payload of the file upload widget; only the first item counts.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct FileUploadResponse {
    #[serde(default)]
    pub items: Vec<FileUploadItem>,
}

impl FileUploadResponse {
    pub fn first_id(&self) -> Option<i64> {
        self.items.first().and_then(|item| item.id)
    }
}
