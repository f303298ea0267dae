//! Logged entry model and wipe-count input validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::time_utils::{from_backend_time, Time};

/// Upper bound on wipes accepted for a single entry.
pub const MAX_WIPES_PER_ENTRY: u64 = 100;

/// One logged visit. Append-only: never edited or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub number_of_wipes: u64,
    /// Nanoseconds since the Unix epoch
    pub timestamp: Time,
}

impl Entry {
    pub fn recorded_at(&self) -> DateTime<Utc> {
        from_backend_time(self.timestamp)
    }
}

/// Wipe count as submitted by the form: a JSON number or the raw text field.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WipeCountInput {
    Number(i64),
    Text(String),
}

/// Parse and range-check a wipe count before anything reaches the backend.
pub fn parse_wipe_count(input: &WipeCountInput) -> Result<u64, AppError> {
    let invalid = || AppError::Validation("Please enter a valid number of wipes".to_string());

    let wipes = match input {
        WipeCountInput::Number(n) => *n,
        WipeCountInput::Text(raw) => raw.trim().parse::<i64>().map_err(|_| invalid())?,
    };

    let wipes = u64::try_from(wipes).map_err(|_| invalid())?;
    if wipes > MAX_WIPES_PER_ENTRY {
        return Err(AppError::Validation(
            "That seems like a lot of wipes! Please enter a reasonable number.".to_string(),
        ));
    }
    Ok(wipes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(raw: &str) -> WipeCountInput {
        WipeCountInput::Text(raw.to_string())
    }

    #[test]
    fn test_parse_accepts_range_bounds() {
        assert_eq!(parse_wipe_count(&WipeCountInput::Number(0)).unwrap(), 0);
        assert_eq!(parse_wipe_count(&text(" 100 ")).unwrap(), 100);
    }

    #[test]
    fn test_parse_rejects_negative_and_garbage() {
        for input in [WipeCountInput::Number(-1), text(""), text("three"), text("2.5")] {
            let err = parse_wipe_count(&input).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{input:?}");
        }
    }

    #[test]
    fn test_parse_rejects_too_many() {
        let err = parse_wipe_count(&WipeCountInput::Number(101)).unwrap_err();
        assert!(err.to_string().contains("a lot of wipes"));
    }

    #[test]
    fn test_input_accepts_number_or_string() {
        let n: WipeCountInput = serde_json::from_str("7").unwrap();
        let s: WipeCountInput = serde_json::from_str("\"7\"").unwrap();
        assert_eq!(parse_wipe_count(&n).unwrap(), 7);
        assert_eq!(parse_wipe_count(&s).unwrap(), 7);
    }
}
