use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{Deserialize, Deserializer};

/// A post timestamp.
pub type Timestamp = DateTime<FixedOffset>;

/// Parses a date that is either a full RFC 3339 timestamp or a bare
/// `YYYY-MM-DD` date, which is taken as midnight UTC. A timestamp without an
/// offset is taken as UTC.
pub fn parse_date(date: &str) -> Result<Timestamp, chrono::ParseError> {
    if !(date.contains('T') || date.contains(' ')) {
        return DateTime::parse_from_rfc3339(&format!("{date}T00:00:00+00:00"));
    }

    let date = date.replacen(' ', "T", 1);
    DateTime::parse_from_rfc3339(&date)
        .or_else(|err| DateTime::parse_from_rfc3339(&format!("{date}+00:00")).map_err(|_| err))
}

/// Formats a timestamp the way sitemaps expect (`2024-01-20T00:00:00+00:00`).
pub fn format_w3c(date: &Timestamp) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Formats a timestamp the way RSS 2.0 expects.
pub fn format_rfc2822(date: &Timestamp) -> String {
    date.to_rfc2822()
}

pub fn from_toml_datetime<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum DatetimeOrString {
        Datetime(toml::value::Datetime),
        String(String),
    }

    let text = match DatetimeOrString::deserialize(deserializer)? {
        DatetimeOrString::Datetime(datetime) => datetime.to_string(),
        DatetimeOrString::String(string) => string,
    };

    parse_date(&text).map_err(D::Error::custom)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_bare_date() {
        let date = parse_date("2024-01-20").unwrap();

        assert_eq!(format_w3c(&date), "2024-01-20T00:00:00+00:00");
    }

    #[test]
    fn test_parse_timestamp_keeps_offset() {
        let date = parse_date("2024-03-15T09:30:00-05:00").unwrap();

        assert_eq!(format_w3c(&date), "2024-03-15T09:30:00-05:00");
        assert_eq!(format_rfc2822(&date), "Fri, 15 Mar 2024 09:30:00 -0500");
    }

    #[test]
    fn test_parse_toml_style_timestamp() {
        let date = parse_date("2024-03-01 09:30:00Z").unwrap();

        assert_eq!(format_w3c(&date), "2024-03-01T09:30:00+00:00");
    }

    #[test]
    fn test_parse_local_timestamp_as_utc() {
        let date = parse_date("2024-03-01T09:30:00").unwrap();

        assert_eq!(format_w3c(&date), "2024-03-01T09:30:00+00:00");
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_date("yesterday").is_err());
    }
}
