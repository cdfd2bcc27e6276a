//! Request dispatch with failover across endpoints.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;

use crate::classify::{classify, Outcome};
use crate::endpoints::EndpointSet;
use crate::error::{Error, Result};
use crate::operation::Operation;
use crate::transport::Transport;
use crate::types::{HttpRequest, HttpResponse};

/// Bounds on how long a request keeps failing over.
///
/// After a transport failure another attempt is made only while both hold:
/// fewer than `max_retries + 1` attempts have been made, and less than
/// `max_duration` has passed since the first attempt started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub max_duration: Duration,
}

impl RetryPolicy {
    /// Up to `max_retries` further attempts, all started within `max_duration`.
    pub fn new(max_retries: u32, max_duration: Duration) -> Self {
        Self {
            max_retries,
            max_duration,
        }
    }

    /// Single attempt, no failover.
    pub fn none() -> Self {
        Self::default()
    }

    fn allows_retry(&self, failed_attempts: u32, elapsed: Duration) -> bool {
        failed_attempts <= self.max_retries && elapsed < self.max_duration
    }
}

/// Drives one logical operation to a response, one attempt at a time.
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
    endpoints: Arc<EndpointSet>,
    policy: Mutex<RetryPolicy>,
}

impl RequestExecutor {
    /// Create an executor sending through `transport` to `endpoints`.
    pub fn new(
        transport: Arc<dyn Transport>,
        endpoints: Arc<EndpointSet>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            endpoints,
            policy: Mutex::new(policy),
        }
    }

    /// The retry budget the next call will run under.
    pub fn policy(&self) -> RetryPolicy {
        *self.policy.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the retry budget. Calls already in their attempt loop keep
    /// the policy they started with.
    pub fn set_policy(&self, policy: RetryPolicy) {
        *self.policy.lock().unwrap_or_else(PoisonError::into_inner) = policy;
    }

    /// Endpoint set shared with the membership refresher.
    pub fn endpoints(&self) -> &Arc<EndpointSet> {
        &self.endpoints
    }

    /// Transport used for every attempt, and for liveness probes.
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Execute `operation` and decode the 2xx body into `T`.
    pub fn execute<T: DeserializeOwned>(&self, operation: &Operation) -> Result<T> {
        let (request, response) = self.dispatch(operation)?;
        response.json().map_err(|e| Error::Decode {
            url: request.url.to_string(),
            message: e.to_string(),
        })
    }

    /// Run the attempt loop and return the successful exchange.
    ///
    /// An error status from any endpoint is returned at once. A transport
    /// failure moves the endpoint cursor past the endpoint that failed and,
    /// budget permitting, tries again; once the budget is spent the last
    /// transport failure is returned.
    pub fn dispatch(&self, operation: &Operation) -> Result<(HttpRequest, HttpResponse)> {
        let policy = self.policy();
        let started = Instant::now();
        let mut failed_attempts: u32 = 0;

        loop {
            let endpoint = self.endpoints.current();
            let request = operation.request(&endpoint)?;
            let result = self.transport.execute(&request);

            match classify(&request, result) {
                Outcome::Success(response) => return Ok((request, response)),
                Outcome::Fatal(error) => return Err(error),
                Outcome::Retryable(error) => {
                    log::debug!("Failed to execute {}, retrying if possible: {}", request, error);
                    self.endpoints.advance_from(&endpoint);
                    failed_attempts = failed_attempts.saturating_add(1);

                    if !policy.allows_retry(failed_attempts, started.elapsed()) {
                        return Err(Error::Transport(error));
                    }
                }
            }
        }
    }
}
