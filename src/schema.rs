//! Field rules for the venue form.
//!
//! The schema is a static table. [`validate`] walks it in order and reports at
//! most one message per field; it never touches the network.

use std::fmt;

use serde::Serialize;

use crate::models::VenueDraft;

pub const NAME_MAX_CHARS: usize = 255;
pub const DESCRIPTION_MAX_CHARS: usize = 4000;
pub const URL_MAX_CHARS: usize = 255;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    Description,
    VenueTypeId,
    Url,
}

impl Field {
    pub fn path(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Description => "description",
            Field::VenueTypeId => "venueTypeId",
            Field::Url => "url",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Constraint {
    Text { max_chars: usize },
    PositiveInteger,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: Field,
    pub required_message: &'static str,
    pub constraint: Constraint,
}

pub const VENUE_FORM_SCHEMA: [FieldRule; 4] = [
    FieldRule {
        field: Field::Name,
        required_message: "Venue name is required",
        constraint: Constraint::Text {
            max_chars: NAME_MAX_CHARS,
        },
    },
    FieldRule {
        field: Field::Description,
        required_message: "Venue description is required",
        constraint: Constraint::Text {
            max_chars: DESCRIPTION_MAX_CHARS,
        },
    },
    FieldRule {
        field: Field::VenueTypeId,
        required_message: "Venue is required",
        constraint: Constraint::PositiveInteger,
    },
    FieldRule {
        field: Field::Url,
        required_message: "Venue url is required",
        constraint: Constraint::Text {
            max_chars: URL_MAX_CHARS,
        },
    },
];

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    errors: Vec<(Field, String)>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_for(&self, field: Field) -> Option<&str> {
        self.errors
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, message)| message.as_str())
    }

    pub fn fields(&self) -> Vec<Field> {
        self.errors.iter().map(|(field, _)| *field).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.errors
            .iter()
            .map(|(field, message)| (*field, message.as_str()))
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

pub fn validate(draft: &VenueDraft) -> ValidationReport {
    let mut report = ValidationReport::default();
    for rule in VENUE_FORM_SCHEMA.iter() {
        if let Err(message) = check(rule, raw_value(draft, rule.field)) {
            report.errors.push((rule.field, message));
        }
    }
    report
}

/// Parses a select value the way the schema does, yielding the integer id.
pub fn parse_venue_type_id(raw: &str) -> Result<i64, String> {
    let path = Field::VenueTypeId.path();
    let trimmed = raw.trim();
    if let Ok(id) = trimmed.parse::<i64>() {
        return if id > 0 {
            Ok(id)
        } else {
            Err(format!("{path} must be a positive number"))
        };
    }

    // Not a plain integer literal: "2.0", "1e3", or something that only the
    // float grammar reads. Exactness is only guaranteed below 2^53.
    let number: f64 = trimmed
        .parse()
        .ok()
        .filter(|n: &f64| n.is_finite())
        .ok_or_else(|| format!("{path} must be a number"))?;
    if number <= 0.0 {
        return Err(format!("{path} must be a positive number"));
    }
    // i64::MAX rounds up to 2^63 as a float, so anything at or past it overflows
    if number >= i64::MAX as f64 {
        return Err(format!(
            "{path} must be less than or equal to {}",
            i64::MAX
        ));
    }
    if number.fract() != 0.0 || number > MAX_EXACT_FLOAT_INTEGER {
        return Err(format!("{path} must be an integer"));
    }
    Ok(number as i64)
}

const MAX_EXACT_FLOAT_INTEGER: f64 = 9_007_199_254_740_992.0;

fn raw_value(draft: &VenueDraft, field: Field) -> Option<&str> {
    match field {
        Field::Name => Some(draft.name.as_str()),
        Field::Description => Some(draft.description.as_str()),
        Field::VenueTypeId => draft.venue_type_id.as_deref(),
        Field::Url => Some(draft.url.as_str()),
    }
}

fn check(rule: &FieldRule, value: Option<&str>) -> Result<(), String> {
    let value = match value {
        Some(v) if !v.is_empty() => v,
        _ => return Err(rule.required_message.to_string()),
    };

    match rule.constraint {
        Constraint::Text { max_chars } => {
            if value.chars().count() > max_chars {
                Err(format!(
                    "{} must be at most {max_chars} characters",
                    rule.field
                ))
            } else {
                Ok(())
            }
        }
        Constraint::PositiveInteger => {
            if value.trim().is_empty() {
                return Err(rule.required_message.to_string());
            }
            parse_venue_type_id(value).map(|_| ())
        }
    }
}
