//! Configuration for the token provider

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

/// A calendar-relative time offset.
///
/// Offsets go through `chrono` arithmetic rather than raw second counts so
/// that month-length semantics follow the host calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOffset {
    Seconds(i64),
    Minutes(i64),
    Hours(i64),
    Days(i64),
    Weeks(i64),
    Months(u32),
}

impl TimeOffset {
    /// Applies the offset to an instant. Saturates at the calendar bounds
    /// instead of overflowing.
    pub fn apply(&self, to: DateTime<Utc>) -> DateTime<Utc> {
        let shifted = match self {
            TimeOffset::Seconds(n) => to.checked_add_signed(Duration::seconds(*n)),
            TimeOffset::Minutes(n) => to.checked_add_signed(Duration::minutes(*n)),
            TimeOffset::Hours(n) => to.checked_add_signed(Duration::hours(*n)),
            TimeOffset::Days(n) => to.checked_add_signed(Duration::days(*n)),
            TimeOffset::Weeks(n) => to.checked_add_signed(Duration::weeks(*n)),
            TimeOffset::Months(n) => to.checked_add_months(Months::new(*n)),
        };
        shifted.unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// JWT audience claim: a single value or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for Audience {
    fn from(value: &str) -> Self {
        Audience::One(value.to_string())
    }
}

impl From<Vec<String>> for Audience {
    fn from(value: Vec<String>) -> Self {
        Audience::Many(value)
    }
}

/// Configuration for the token provider
///
/// Everything here is plain scalar state; the provider holds no other
/// mutable state. `test_timestamp` pins the provider clock for tests and
/// is injected per instance rather than shared process-wide.
#[derive(Debug, Clone)]
pub struct TokenProviderConfig {
    /// Offset from issuance to the `nbf` claim
    pub not_before: TimeOffset,
    /// Offset from issuance to the access token's `exp` claim
    pub time_to_live: TimeOffset,
    /// Offset from issuance to the refresh token's expiry
    pub refresh_token_time_to_live: TimeOffset,
    /// `iss` claim, omitted when unset
    pub issuer: Option<String>,
    /// `aud` claim, omitted when unset
    pub audience: Option<Audience>,
    /// Clock-skew tolerance in seconds for time-claim checks
    pub leeway: i64,
    /// Whether to emit the `exi` (seconds-to-expiry) claim
    pub add_expires_in: bool,
    /// Staged rollout: only the first N ciphers sign new tokens
    pub available_keys: Option<usize>,
    /// Pinned clock for deterministic tests
    pub test_timestamp: Option<i64>,
}

impl Default for TokenProviderConfig {
    fn default() -> Self {
        Self {
            not_before: TimeOffset::Seconds(0),
            time_to_live: TimeOffset::Minutes(5),
            refresh_token_time_to_live: TimeOffset::Weeks(2),
            issuer: None,
            audience: None,
            leeway: 0,
            add_expires_in: false,
            available_keys: None,
            test_timestamp: None,
        }
    }
}

impl TokenProviderConfig {
    pub fn not_before(mut self, offset: TimeOffset) -> Self {
        self.not_before = offset;
        self
    }

    pub fn time_to_live(mut self, offset: TimeOffset) -> Self {
        self.time_to_live = offset;
        self
    }

    pub fn refresh_token_time_to_live(mut self, offset: TimeOffset) -> Self {
        self.refresh_token_time_to_live = offset;
        self
    }

    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn audience(mut self, audience: impl Into<Audience>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn leeway(mut self, seconds: i64) -> Self {
        self.leeway = seconds;
        self
    }

    pub fn add_expires_in_claim(mut self, value: bool) -> Self {
        self.add_expires_in = value;
        self
    }

    pub fn available_keys(mut self, keys: usize) -> Self {
        self.available_keys = Some(keys);
        self
    }

    pub fn test_timestamp(mut self, value: Option<i64>) -> Self {
        self.test_timestamp = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_offsets() {
        let base = Utc.timestamp_opt(1000, 0).unwrap();

        assert_eq!(TimeOffset::Seconds(30).apply(base).timestamp(), 1030);
        assert_eq!(TimeOffset::Minutes(2).apply(base).timestamp(), 1120);
        assert_eq!(TimeOffset::Hours(1).apply(base).timestamp(), 4600);
        assert_eq!(TimeOffset::Days(1).apply(base).timestamp(), 1000 + 86_400);
        assert_eq!(
            TimeOffset::Weeks(2).apply(base).timestamp(),
            1000 + 14 * 86_400
        );
    }

    #[test]
    fn test_month_offset_follows_calendar() {
        // Jan 31 + 1 month clamps to Feb 28 in a non-leap year.
        let base = Utc.with_ymd_and_hms(2023, 1, 31, 12, 0, 0).unwrap();
        let shifted = TimeOffset::Months(1).apply(base);
        assert_eq!(shifted, Utc.with_ymd_and_hms(2023, 2, 28, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_negative_offset() {
        let base = Utc.timestamp_opt(1000, 0).unwrap();
        assert_eq!(TimeOffset::Seconds(-100).apply(base).timestamp(), 900);
    }

    #[test]
    fn test_default_config() {
        let config = TokenProviderConfig::default();

        assert_eq!(config.not_before, TimeOffset::Seconds(0));
        assert_eq!(config.time_to_live, TimeOffset::Minutes(5));
        assert_eq!(config.refresh_token_time_to_live, TimeOffset::Weeks(2));
        assert_eq!(config.leeway, 0);
        assert!(!config.add_expires_in);
        assert!(config.issuer.is_none());
        assert!(config.available_keys.is_none());
        assert!(config.test_timestamp.is_none());
    }

    #[test]
    fn test_fluent_configuration() {
        let config = TokenProviderConfig::default()
            .issuer("tokensmith")
            .audience("api")
            .time_to_live(TimeOffset::Minutes(2))
            .leeway(60)
            .add_expires_in_claim(true)
            .available_keys(1)
            .test_timestamp(Some(1000));

        assert_eq!(config.issuer.as_deref(), Some("tokensmith"));
        assert_eq!(config.audience, Some(Audience::One("api".to_string())));
        assert_eq!(config.time_to_live, TimeOffset::Minutes(2));
        assert_eq!(config.leeway, 60);
        assert!(config.add_expires_in);
        assert_eq!(config.available_keys, Some(1));
        assert_eq!(config.test_timestamp, Some(1000));
    }

    #[test]
    fn test_audience_serialization() {
        let one = serde_json::to_value(Audience::One("api".to_string())).unwrap();
        assert_eq!(one, serde_json::json!("api"));

        let many =
            serde_json::to_value(Audience::Many(vec!["a".to_string(), "b".to_string()]))
                .unwrap();
        assert_eq!(many, serde_json::json!(["a", "b"]));
    }
}
