/// Due date normalization
///
/// Due dates are stored as second-precision date-times without a time zone,
/// in UTC. Accepted inputs:
///
/// | Input | Stored |
/// |---|---|
/// | `2025-11-19T18:30:00.000Z` | `2025-11-19 18:30:00` |
/// | `2025-11-19T20:30:00+02:00` | `2025-11-19 18:30:00` |
/// | `2025-11-19T18:30:00` | `2025-11-19 18:30:00` |
/// | `2025-11-19 18:30:00` | `2025-11-19 18:30:00` |
/// | `2025-11-19` | `2025-11-19 00:00:00` |
/// | empty or absent | null |

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};

use super::FieldError;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses an optional due date into its stored form
///
/// # Errors
///
/// Returns a `dueDate` field error for anything that is neither empty nor one
/// of the accepted formats.
pub fn normalize_due_date(raw: Option<&str>) -> Result<Option<NaiveDateTime>, FieldError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_utc())
        .ok()
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| FieldError::new("dueDate", "Invalid due date"))?;

    Ok(parsed.with_nanosecond(0))
}
