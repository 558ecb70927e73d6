use chrono::NaiveDateTime;
use serde_json::{Map, Value};

use crate::errors::FetchError;

// ============ LabKey Query Definition ============

pub const SCHEMA_NAME: &str = "gel_rare_diseases";
pub const QUERY_NAME: &str = "participant_identifier";

/// Column holding the GeL participant ID; the lookup filters on it.
pub const IDENTIFIER_COLUMN: &str = "participant_id";
/// NHS number.
pub const PERSON_IDENTIFIER_COLUMN: &str = "person_identifier";
pub const DATE_OF_BIRTH_COLUMN: &str = "date_of_birth";
pub const FORENAMES_COLUMN: &str = "forenames";
pub const SURNAME_COLUMN: &str = "surname";
/// Text description of the person identifier (e.g. "nhsNumber").
pub const PERSON_IDENTIFIER_TYPE_COLUMN: &str = "person_identifier_type";

pub const SELECTED_COLUMNS: [&str; 6] = [
    IDENTIFIER_COLUMN,
    PERSON_IDENTIFIER_COLUMN,
    DATE_OF_BIRTH_COLUMN,
    FORENAMES_COLUMN,
    SURNAME_COLUMN,
    PERSON_IDENTIFIER_TYPE_COLUMN,
];

/// Format LabKey uses for `date_of_birth`.
pub const RAW_DATE_FORMAT: &str = "%Y/%m/%d %H:%M:%S";
pub const OUTPUT_DATE_FORMAT: &str = "%d/%m/%Y";

// ============ Query ============

/// Basic-auth credential pair. Only complete pairs are representable.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// A lookup of one participant, optionally authenticated.
#[derive(Debug, Clone)]
pub struct Query {
    identifier: String,
    credentials: Option<Credentials>,
}

impl Query {
    /// Validates the inputs of a lookup.
    ///
    /// Basic authentication is used only when both `username` and `password`
    /// are given. Supplying exactly one of them is rejected.
    pub fn new(
        identifier: impl Into<String>,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<Self, FetchError> {
        let identifier = identifier.into();
        if identifier.is_empty() {
            return Err(FetchError::InvalidQuery(
                "participant ID must not be empty".to_string(),
            ));
        }

        let credentials = match (username, password) {
            (Some(username), Some(password)) => Some(Credentials { username, password }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(FetchError::InvalidQuery(
                    "username given without a password".to_string(),
                ))
            }
            (None, Some(_)) => {
                return Err(FetchError::InvalidQuery(
                    "password given without a username".to_string(),
                ))
            }
        };

        Ok(Self {
            identifier,
            credentials,
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Query-string parameters understood by `selectRows.api`.
    pub fn params(&self) -> Vec<(String, String)> {
        vec![
            ("schemaName".to_string(), SCHEMA_NAME.to_string()),
            ("query.queryName".to_string(), QUERY_NAME.to_string()),
            ("query.columns".to_string(), SELECTED_COLUMNS.join(",")),
            (
                format!("query.{}~eq", IDENTIFIER_COLUMN),
                self.identifier.clone(),
            ),
        ]
    }
}

// ============ Record ============

/// The single participant row, reshaped for output.
#[derive(Debug, Clone)]
pub struct Record {
    /// Forenames and surname separated by one space.
    pub full_name: String,
    /// Date of birth as `DD/MM/YYYY`.
    pub date_of_birth: String,
    /// NHS number.
    pub identifier_number: String,
    /// Response body as received.
    pub raw: Value,
}

impl Record {
    /// Validates a `selectRows` response and derives the record from its only row.
    pub fn from_response(identifier: &str, raw: Value) -> Result<Self, FetchError> {
        let row_count = raw.get("rowCount").and_then(Value::as_i64).ok_or_else(|| {
            FetchError::TransportError("response has no integer rowCount field".to_string())
        })?;

        if row_count != 1 {
            return Err(FetchError::MultipleOrNoMatch {
                identifier: identifier.to_string(),
                row_count,
            });
        }

        let row = raw
            .get("rows")
            .and_then(Value::as_array)
            .and_then(|rows| rows.first())
            .and_then(Value::as_object)
            .ok_or_else(|| {
                FetchError::MalformedRecord("rowCount is 1 but no row object was returned".into())
            })?;

        let forenames = field(row, FORENAMES_COLUMN)?;
        let surname = field(row, SURNAME_COLUMN)?;
        let date_of_birth = normalize_date_of_birth(field(row, DATE_OF_BIRTH_COLUMN)?)?;
        let identifier_number = field(row, PERSON_IDENTIFIER_COLUMN)?.to_string();

        Ok(Self {
            full_name: format!("{} {}", forenames, surname),
            date_of_birth,
            identifier_number,
            raw,
        })
    }

    /// `name,dob,nhs_number` without a trailing newline.
    pub fn format_line(&self) -> String {
        [
            self.full_name.as_str(),
            self.date_of_birth.as_str(),
            self.identifier_number.as_str(),
        ]
        .join(",")
    }

    /// Pretty-printed response body, for diagnostics.
    pub fn format_raw(&self) -> String {
        serde_json::to_string_pretty(&self.raw).unwrap_or_else(|_| self.raw.to_string())
    }
}

fn field<'a>(row: &'a Map<String, Value>, name: &str) -> Result<&'a str, FetchError> {
    match row.get(name) {
        Some(Value::String(value)) => Ok(value.as_str()),
        Some(other) => Err(FetchError::MalformedRecord(format!(
            "field '{}' is not a string: {}",
            name, other
        ))),
        None => Err(FetchError::MalformedRecord(format!(
            "field '{}' missing from row",
            name
        ))),
    }
}

/// Converts a LabKey `YYYY/MM/DD HH:MM:SS` timestamp to `DD/MM/YYYY`.
pub fn normalize_date_of_birth(raw: &str) -> Result<String, FetchError> {
    let parsed = NaiveDateTime::parse_from_str(raw, RAW_DATE_FORMAT).map_err(|e| {
        FetchError::MalformedRecord(format!("unparseable date_of_birth '{}': {}", raw, e))
    })?;
    Ok(parsed.date().format(OUTPUT_DATE_FORMAT).to_string())
}
