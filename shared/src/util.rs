/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Format a Unix-millis timestamp as RFC 3339 (the remote wire format)
pub fn millis_to_rfc3339(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .unwrap_or_default()
        .to_rfc3339()
}

/// Parse an RFC 3339 timestamp into Unix millis.
///
/// Remote rows carry ISO strings; local records store i64 millis.
pub fn rfc3339_to_millis(s: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_roundtrip() {
        let millis = 1_705_900_000_000;
        let iso = millis_to_rfc3339(millis);
        assert_eq!(rfc3339_to_millis(&iso), Some(millis));
    }

    #[test]
    fn rfc3339_rejects_garbage() {
        assert_eq!(rfc3339_to_millis("not a date"), None);
    }
}
