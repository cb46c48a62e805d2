use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_URL: &str = "https://jsonplaceholder.typicode.com/posts/1";
/// One error per day, expressed per minute.
pub const DEFAULT_FREQUENCY_PER_MINUTE: f64 = 1.0 / (24.0 * 60.0);
pub const DEFAULT_TOTAL_ERRORS: i64 = 4;
pub const DEFAULT_WINDOW_DAYS: i64 = 4;

/// Construction options. Every field is optional; see [`InjectorOptions::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InjectorOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    /// Errors per minute. `0` means a single immediate failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f64>,
    /// Rate-mode failure budget. Zero or negative never fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl InjectorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    pub fn frequency(mut self, per_minute: f64) -> Self {
        self.frequency = Some(per_minute);
        self
    }

    pub fn total(mut self, total: i64) -> Self {
        self.total = Some(total);
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Overlay `other` on top of `self`: fields set in `other` win.
    pub fn merge(self, other: InjectorOptions) -> Self {
        Self {
            start: other.start.or(self.start),
            end: other.end.or(self.end),
            frequency: other.frequency.or(self.frequency),
            total: other.total.or(self.total),
            url: other.url.or(self.url),
        }
    }

    /// Fill in defaults relative to `now`, the construction instant.
    ///
    /// The default end is four days after `now`, not after an explicit start.
    /// Values are taken as given: an inverted window or a negative frequency
    /// is kept and handled by the schedule.
    pub fn resolve(self, now: DateTime<Utc>) -> InjectorConfig {
        InjectorConfig {
            start: self.start.unwrap_or(now),
            end: self
                .end
                .unwrap_or_else(|| now + Duration::days(DEFAULT_WINDOW_DAYS)),
            frequency: self.frequency.unwrap_or(DEFAULT_FREQUENCY_PER_MINUTE),
            total: self.total.unwrap_or(DEFAULT_TOTAL_ERRORS),
            url: self.url.unwrap_or_else(|| DEFAULT_URL.to_string()),
        }
    }
}

/// A fully resolved configuration snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjectorConfig {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub frequency: f64,
    pub total: i64,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(secs)
    }

    #[test]
    fn resolve_fills_defaults_from_construction_time() {
        let now = instant(1_700_000_000);
        let config = InjectorOptions::new().resolve(now);

        assert_eq!(config.start, now);
        assert_eq!(config.end, now + Duration::days(4));
        assert_eq!(config.frequency, 1.0 / 1440.0);
        assert_eq!(config.total, 4);
        assert_eq!(config.url, DEFAULT_URL);
    }

    #[test]
    fn default_end_ignores_explicit_start() {
        let now = instant(1_700_000_000);
        let config = InjectorOptions::new()
            .start(now + Duration::days(10))
            .resolve(now);

        assert_eq!(config.end, now + Duration::days(4));
        assert!(config.start > config.end);
    }

    #[test]
    fn merge_prefers_overlay_values() {
        let base = InjectorOptions::new().frequency(2.0).total(7).url("http://a");
        let overlay = InjectorOptions::new().total(1);

        let merged = base.merge(overlay);
        assert_eq!(merged.frequency, Some(2.0));
        assert_eq!(merged.total, Some(1));
        assert_eq!(merged.url.as_deref(), Some("http://a"));
    }

    #[test]
    fn negative_total_is_taken_as_given() {
        let options: InjectorOptions = serde_json::from_str(r#"{"frequency": 1.0, "total": -1}"#)
            .expect("negative total deserializes");
        assert_eq!(options.resolve(instant(0)).total, -1);
    }
}
