//! Client configuration

use std::time::Duration;

use crate::SdkError;

/// Connection and timing settings for [`GenieHome`](crate::GenieHome)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenieConfig {
    /// API root, e.g. `http://localhost:8000/api`
    pub base_url: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    /// How often a mounted music card samples playback progress
    pub progress_interval: Duration,
    /// How often an insights feed refetches usage insights
    pub insights_interval: Duration,
}

impl Default for GenieConfig {
    fn default() -> Self {
        Self {
            base_url: genie_api::DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(10),
            progress_interval: Duration::from_millis(250),
            insights_interval: Duration::from_secs(30),
        }
    }
}

impl GenieConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::default().with_base_url(base_url)
    }

    /// Defaults, overridden by `GENIE_API_URL`, `GENIE_PROGRESS_INTERVAL_MS`
    /// and `GENIE_INSIGHTS_INTERVAL_MS`
    pub fn from_env() -> Result<Self, SdkError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SdkError> {
        let mut config = Self::default();
        if let Some(url) = lookup("GENIE_API_URL") {
            config = config.with_base_url(url);
        }
        if let Some(ms) = lookup("GENIE_PROGRESS_INTERVAL_MS") {
            config = config.with_progress_interval(millis("GENIE_PROGRESS_INTERVAL_MS", &ms)?);
        }
        if let Some(ms) = lookup("GENIE_INSIGHTS_INTERVAL_MS") {
            config = config.with_insights_interval(millis("GENIE_INSIGHTS_INTERVAL_MS", &ms)?);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn with_insights_interval(mut self, interval: Duration) -> Self {
        self.insights_interval = interval;
        self
    }

    pub fn validate(&self) -> Result<(), SdkError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(SdkError::Config(format!(
                "base URL must be http(s): {}",
                self.base_url
            )));
        }
        if self.progress_interval.is_zero() {
            return Err(SdkError::Config(
                "progress interval must be greater than zero".to_string(),
            ));
        }
        if self.insights_interval.is_zero() {
            return Err(SdkError::Config(
                "insights interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn millis(key: &str, value: &str) -> Result<Duration, SdkError> {
    value
        .trim()
        .parse()
        .map(Duration::from_millis)
        .map_err(|_| SdkError::Config(format!("{} is not a number: {}", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = GenieConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000/api");
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.read_timeout, Duration::from_secs(10));
        assert_eq!(config.progress_interval, Duration::from_millis(250));
        assert_eq!(config.insights_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_env_overrides() {
        let config = GenieConfig::from_lookup(lookup(&[
            ("GENIE_API_URL", "http://10.0.0.5:9000/api"),
            ("GENIE_PROGRESS_INTERVAL_MS", "100"),
            ("GENIE_INSIGHTS_INTERVAL_MS", "5000"),
        ]))
        .unwrap();
        assert_eq!(config.insights_interval, Duration::from_secs(5));
        assert_eq!(config.base_url, "http://10.0.0.5:9000/api");
        assert_eq!(config.progress_interval, Duration::from_millis(100));
    }

    #[test]
    fn test_env_rejects_bad_values() {
        assert!(matches!(
            GenieConfig::from_lookup(lookup(&[("GENIE_PROGRESS_INTERVAL_MS", "soon")])),
            Err(SdkError::Config(_))
        ));
        assert!(matches!(
            GenieConfig::from_lookup(lookup(&[("GENIE_INSIGHTS_INTERVAL_MS", "0")])),
            Err(SdkError::Config(_))
        ));
        assert!(matches!(
            GenieConfig::from_lookup(lookup(&[("GENIE_API_URL", "localhost:8000")])),
            Err(SdkError::Config(_))
        ));
    }
}
