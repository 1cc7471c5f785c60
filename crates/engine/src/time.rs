use crate::error::RuntimeError;

/// Parse a timestamp string to epoch milliseconds, accepting either an
/// RFC3339/ISO-8601 string or a bare integer count of milliseconds since the
/// Unix epoch. Per `SPEC_FULL.md` §9's open-question decision, both forms
/// are treated as equivalent instants; RFC3339 is attempted first.
pub fn parse_timestamp_ms(value: &str) -> Result<i64, RuntimeError> {
    if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.timestamp_millis());
    }
    if let Ok(ms) = value.trim().parse::<i64>() {
        return Ok(ms);
    }
    Err(RuntimeError::InvalidTimestamp {
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfc3339() {
        let ms = parse_timestamp_ms("2024-01-01T00:00:00Z").unwrap();
        assert_eq!(ms, 1_704_067_200_000);
    }

    #[test]
    fn test_parse_epoch_ms() {
        assert_eq!(parse_timestamp_ms("1704067200000").unwrap(), 1_704_067_200_000);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_timestamp_ms("not-a-timestamp").is_err());
    }
}
