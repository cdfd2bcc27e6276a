//! Keeps the endpoint list in step with cluster membership.
//!
//! Each cycle lists the members through the executor, probes every advertised
//! client URL once, and swaps the live ones into the [`EndpointSet`]. A cycle
//! that finds nothing, or fails outright, leaves the current list alone.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use etcdv2_types::MemberList;

use crate::endpoints::EndpointSet;
use crate::error::Result;
use crate::executor::RequestExecutor;
use crate::operation::{join_segment, Operation};
use crate::schedule::PeriodicTask;
use crate::types::{HttpRequest, HttpResponse};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(5000);

const PROBE_PATH: &str = "version";
const THREAD_NAME: &str = "etcd-member-refresh";

/// What a probe of `<client-url>/version` has to return to count as live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LivenessCheck {
    /// Any 2xx answer.
    #[default]
    AnySuccess,
    /// A 2xx answer with an empty body.
    EmptyBody,
}

impl LivenessCheck {
    /// Judge a `/version` response that arrived at all.
    pub fn is_live(self, response: &HttpResponse) -> bool {
        match self {
            LivenessCheck::AnySuccess => response.is_success(),
            LivenessCheck::EmptyBody => response.is_success() && !response.has_body(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The endpoint list now holds exactly these addresses.
    Replaced(Vec<Url>),
    /// No advertised URL passed its probe; the list was left alone.
    NoLiveEndpoints,
}

pub struct MembershipRefresher {
    executor: Arc<RequestExecutor>,
    liveness: LivenessCheck,
}

impl MembershipRefresher {
    /// Refresher over the executor's endpoint set and transport.
    pub fn new(executor: Arc<RequestExecutor>, liveness: LivenessCheck) -> Self {
        Self { executor, liveness }
    }

    fn endpoints(&self) -> &EndpointSet {
        self.executor.endpoints()
    }

    /// Run one refresh cycle, reporting failures to the caller.
    pub fn refresh(&self) -> Result<RefreshOutcome> {
        let members: MemberList = self.executor.execute(&Operation::list_members())?;

        let live: Vec<Url> = members
            .client_urls()
            .filter_map(|client_url| self.probe(client_url))
            .collect();

        if live.is_empty() || !self.endpoints().replace(live.clone()) {
            log::debug!("not updating locations because no live location was found");
            return Ok(RefreshOutcome::NoLiveEndpoints);
        }

        log::info!(
            "updated etcd locations to [{}]",
            live.iter().map(Url::as_str).collect::<Vec<_>>().join(", ")
        );
        Ok(RefreshOutcome::Replaced(live))
    }

    /// Run one refresh cycle, logging instead of failing.
    pub fn run_once(&self) {
        if let Err(e) = self.refresh() {
            log::error!("Could not update etcd cluster members: {}", e);
        }
    }

    /// Single attempt against one client URL, outside the retry loop.
    fn probe(&self, client_url: &str) -> Option<Url> {
        let location = match Url::parse(client_url) {
            Ok(location) => location,
            Err(e) => {
                log::debug!("ignoring URI {} because it does not parse: {}", client_url, e);
                return None;
            }
        };
        let probe_url = match join_segment(&location, PROBE_PATH) {
            Ok(url) => url,
            Err(e) => {
                log::debug!("ignoring URI {}: {}", client_url, e);
                return None;
            }
        };

        match self.executor.transport().execute(&HttpRequest::get(probe_url)) {
            Ok(response) if self.liveness.is_live(&response) => Some(location),
            Ok(response) => {
                log::debug!(
                    "ignoring URI {} because the probe answered {} {}",
                    client_url,
                    response.status,
                    response.status_text
                );
                None
            }
            Err(e) => {
                log::debug!("ignoring URI {} because of error: {}", client_url, e);
                None
            }
        }
    }

    /// Run [`run_once`](Self::run_once) every `period` on a background thread.
    pub fn spawn(self, period: Duration) -> Result<PeriodicTask> {
        let task = PeriodicTask::spawn(THREAD_NAME, period, move || self.run_once())?;
        Ok(task)
    }
}
