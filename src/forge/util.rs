use chrono::{DateTime, Utc};

use crate::error::Result;

/// Parse an RFC 3339 timestamp returned by the API into UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}
