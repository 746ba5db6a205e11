use serde::{Deserialize, Deserializer};

use crate::error::CoreError;

/// All project primary keys are PostgreSQL UUIDs.
pub type DbId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar dates without a time component (`YYYY-MM-DD`).
pub type Date = chrono::NaiveDate;

/// Parse a path identifier into a [`DbId`].
///
/// Malformed input yields [`CoreError::InvalidIdentifier`] so callers can
/// answer 400 before touching the database.
pub fn parse_id(raw: &str) -> Result<DbId, CoreError> {
    uuid::Uuid::parse_str(raw)
        .map_err(|_| CoreError::InvalidIdentifier(format!("'{raw}' is not a valid UUID")))
}

/// Parse a client-supplied date.
///
/// Accepts `YYYY-MM-DD` or an ISO-8601 datetime (`2025-02-01T19:00:00Z`,
/// with or without offset). A datetime keeps the calendar date as written;
/// the offset is not applied.
pub fn parse_date(raw: &str) -> Result<Date, CoreError> {
    let raw = raw.trim();
    if let Ok(date) = Date::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.date_naive());
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.date());
    }
    Err(CoreError::Validation(format!(
        "'{raw}' is not a valid ISO-8601 date"
    )))
}

/// `deserialize_with` adapter for [`parse_date`].
pub fn deserialize_date<'de, D>(deserializer: D) -> Result<Date, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(serde::de::Error::custom)
}

/// `deserialize_with` adapter for optional dates. Pair with `#[serde(default)]`.
pub fn deserialize_opt_date<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| parse_date(&raw))
        .transpose()
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parses_hyphenated_uuid() {
        let id = parse_id("8d7f1f6e-2f61-4a2c-9c3a-3c2a7a9c1a11").unwrap();
        assert_eq!(id.to_string(), "8d7f1f6e-2f61-4a2c-9c3a-3c2a7a9c1a11");
    }

    #[test]
    fn rejects_numeric_id() {
        assert_matches!(parse_id("42"), Err(CoreError::InvalidIdentifier(msg)) if msg.contains("42"));
    }

    #[test]
    fn rejects_empty_id() {
        assert_matches!(parse_id(""), Err(CoreError::InvalidIdentifier(_)));
    }

    fn ymd(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn plain_date_parses() {
        assert_eq!(parse_date("2025-02-01").unwrap(), ymd(2025, 2, 1));
    }

    #[test]
    fn utc_datetime_keeps_its_date() {
        assert_eq!(parse_date("2025-02-01T19:00:00Z").unwrap(), ymd(2025, 2, 1));
        assert_eq!(parse_date("2025-02-01T19:00:00.250Z").unwrap(), ymd(2025, 2, 1));
    }

    #[test]
    fn offset_datetime_keeps_date_as_written() {
        assert_eq!(parse_date("2025-02-01T23:30:00-05:00").unwrap(), ymd(2025, 2, 1));
    }

    #[test]
    fn datetime_without_offset_parses() {
        assert_eq!(parse_date("2025-02-01T08:15:00").unwrap(), ymd(2025, 2, 1));
    }

    #[test]
    fn garbage_date_is_a_validation_error() {
        assert_matches!(parse_date("01/02/2025"), Err(CoreError::Validation(msg)) if msg.contains("01/02/2025"));
        assert_matches!(parse_date("2025-02-30"), Err(CoreError::Validation(_)));
    }
}
