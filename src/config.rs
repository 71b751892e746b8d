use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, Result};
use crate::quantity::Quantity;

/// ledger engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// how long an arrival notification stays visible
    pub notification_window_secs: i64,
    /// rate used when a submission does not name one
    pub default_rate_per_day: Quantity,
    /// screenshots shown before "show all"
    pub gallery_page_size: usize,
    /// longest member segment in a stored attachment name
    pub attachment_name_max_len: usize,
    /// offset of the display timezone, used to decide what "today" is
    pub utc_offset_secs: i32,
    /// use targeted changes instead of a full rewrite when the store allows it
    pub prefer_transactional_replace: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            notification_window_secs: 30,
            default_rate_per_day: Quantity::from_qi(1_000),
            gallery_page_size: 5,
            attachment_name_max_len: 50,
            utc_offset_secs: 0,
            prefer_transactional_replace: true,
        }
    }
}

impl LedgerConfig {
    /// load from json, missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: LedgerConfig = serde_json::from_str(json).map_err(|e| {
            LedgerError::InvalidConfiguration {
                message: e.to_string(),
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.notification_window_secs <= 0 {
            return Err(LedgerError::InvalidConfiguration {
                message: format!(
                    "notification_window_secs must be positive, got {}",
                    self.notification_window_secs
                ),
            });
        }
        if self.default_rate_per_day.is_zero() {
            return Err(LedgerError::InvalidConfiguration {
                message: "default_rate_per_day must be greater than zero".to_string(),
            });
        }
        if self.gallery_page_size == 0 {
            return Err(LedgerError::InvalidConfiguration {
                message: "gallery_page_size must be at least 1".to_string(),
            });
        }
        if self.timezone().is_none() {
            return Err(LedgerError::InvalidConfiguration {
                message: format!("utc_offset_secs out of range: {}", self.utc_offset_secs),
            });
        }
        Ok(())
    }

    pub fn notification_window(&self) -> Duration {
        Duration::seconds(self.notification_window_secs)
    }

    pub fn timezone(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_secs)
    }

    /// calendar date of `now` in the display timezone
    pub fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        match self.timezone() {
            Some(tz) => now.with_timezone(&tz).date_naive(),
            None => now.date_naive(),
        }
    }

    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_defaults_are_valid() {
        let config = LedgerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.notification_window(), Duration::seconds(30));
        assert_eq!(config.default_rate_per_day.format(), "1sx");
    }

    #[test]
    fn test_from_json_partial() {
        let config = LedgerConfig::from_json(r#"{ "gallery_page_size": 10, "utc_offset_secs": 3600 }"#).unwrap();
        assert_eq!(config.gallery_page_size, 10);
        assert_eq!(config.notification_window_secs, 30);

        let late = Utc.with_ymd_and_hms(2024, 3, 1, 23, 30, 0).unwrap();
        assert_eq!(config.local_date(late), NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        assert!(matches!(
            LedgerConfig::from_json(r#"{ "notification_window_secs": 0 }"#),
            Err(LedgerError::InvalidConfiguration { .. })
        ));
        assert!(matches!(
            LedgerConfig::from_json("not json"),
            Err(LedgerError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let config = LedgerConfig::default();
        let json = config.to_json_pretty().unwrap();
        assert_eq!(LedgerConfig::from_json(&json).unwrap(), config);
    }
}
