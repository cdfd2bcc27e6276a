//! Client configuration.
//!
//! Defaults: one attempt per request (no retries), 1s connect and 3s read
//! timeout, membership refresh every 5s.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::executor::RetryPolicy;
use crate::refresher::{LivenessCheck, DEFAULT_REFRESH_INTERVAL};
use crate::transport::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Initial endpoints, e.g. `http://10.0.0.10:2379`.
    pub locations: Vec<String>,

    /// Retries after the first attempt before giving up.
    pub retry_count: u32,

    /// How long, in milliseconds, a request may keep failing over.
    pub retry_duration_ms: u64,

    pub connect_timeout_ms: u64,

    pub read_timeout_ms: u64,

    /// Whether to keep the endpoint list in sync with `/v2/members`.
    pub update_locations: bool,

    pub refresh_interval_ms: u64,

    pub liveness: LivenessCheck,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            locations: Vec::new(),
            retry_count: 0,
            retry_duration_ms: 0,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT.as_millis() as u64,
            read_timeout_ms: DEFAULT_READ_TIMEOUT.as_millis() as u64,
            update_locations: true,
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL.as_millis() as u64,
            liveness: LivenessCheck::default(),
        }
    }
}

impl ClientConfig {
    /// Defaults for everything but the endpoint list.
    pub fn new<S: Into<String>>(locations: impl IntoIterator<Item = S>) -> Self {
        Self {
            locations: locations.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| Error::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the client cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.locations.is_empty() {
            return Err(Error::NoEndpoints);
        }
        if self.update_locations && self.refresh_interval_ms == 0 {
            return Err(Error::Config {
                message: "refresh_interval_ms must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Failover attempts after the first one.
    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    /// Time after which no further failover attempt is started.
    pub fn with_retry_duration(mut self, duration: Duration) -> Self {
        self.retry_duration_ms = duration.as_millis() as u64;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Whether [`EtcdClient::start`](crate::EtcdClient::start) refreshes membership.
    pub fn with_update_locations(mut self, enabled: bool) -> Self {
        self.update_locations = enabled;
        self
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn with_liveness(mut self, liveness: LivenessCheck) -> Self {
        self.liveness = liveness;
        self
    }

    /// Retry budget derived from `retry_count` and `retry_duration_ms`.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_count, Duration::from_millis(self.retry_duration_ms))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}
