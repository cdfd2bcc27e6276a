use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use url::Url;

use etcdv2_types::{MemberList, Response};

use crate::config::ClientConfig;
use crate::endpoints::EndpointSet;
use crate::error::{Error, Result};
use crate::executor::{RequestExecutor, RetryPolicy};
use crate::operation::{KeyOperation, Operation, Precondition, Ttl};
use crate::refresher::{MembershipRefresher, RefreshOutcome};
use crate::schedule::PeriodicTask;
use crate::transport::{ReqwestTransport, Transport};

/// Blocking client for the etcd v2 keys and members API.
///
/// Requests go to one endpoint at a time and fail over to the next one on
/// network errors, within the configured retry budget. Errors reported by
/// etcd itself are returned straight away.
///
/// After [`start`](Self::start) a background thread refreshes the endpoint
/// list from cluster membership until [`shutdown`](Self::shutdown) or drop.
///
/// # Example
///
/// ```ignore
/// use etcdv2_client::{ClientConfig, EtcdClient, Ttl};
///
/// let config = ClientConfig::new(["http://10.0.0.10:2379", "http://10.0.0.11:2379"])
///     .with_retry_count(2)
///     .with_retry_duration(Duration::from_secs(10));
/// let client = EtcdClient::new(config)?;
/// client.start()?;
///
/// client.put_with_ttl("service/leader", "node-1", Ttl::Seconds(30))?;
/// let leader = client.get("service/leader")?.node.value;
/// ```
pub struct EtcdClient {
    executor: Arc<RequestExecutor>,
    config: ClientConfig,
    refresher: Mutex<Option<PeriodicTask>>,
}

impl EtcdClient {
    /// Create a client that talks HTTP through reqwest.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.connect_timeout(), config.read_timeout())
            .map_err(|e| Error::Config {
                message: format!("cannot build HTTP client: {}", e),
            })?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client over a caller-supplied transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        let endpoints = Arc::new(EndpointSet::parse(&config.locations)?);
        let executor = RequestExecutor::new(transport, endpoints, config.retry_policy());

        Ok(Self {
            executor: Arc::new(executor),
            config,
            refresher: Mutex::new(None),
        })
    }

    /// Shorthand for a client on a single endpoint with default settings.
    pub fn connect(location: &str) -> Result<Self> {
        Self::new(ClientConfig::new([location]))
    }

    /// Start the membership refresher if `update_locations` is enabled.
    ///
    /// Calling this on a client that is already refreshing does nothing.
    pub fn start(&self) -> Result<()> {
        if !self.config.update_locations {
            return Ok(());
        }
        let mut refresher = self.refresher.lock().unwrap_or_else(PoisonError::into_inner);
        if refresher.as_ref().is_some_and(PeriodicTask::is_running) {
            return Ok(());
        }
        let task = MembershipRefresher::new(Arc::clone(&self.executor), self.config.liveness)
            .spawn(self.config.refresh_interval())?;
        *refresher = Some(task);
        Ok(())
    }

    /// Stop the membership refresher without waiting for a cycle in flight.
    pub fn shutdown(&self) {
        let mut refresher = self.refresher.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(mut task) = refresher.take() {
            task.stop();
        }
    }

    /// Whether the membership refresher thread is live.
    pub fn is_refreshing(&self) -> bool {
        self.refresher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(PeriodicTask::is_running)
    }

    /// Run one membership refresh cycle on the calling thread.
    pub fn refresh_members(&self) -> Result<RefreshOutcome> {
        MembershipRefresher::new(Arc::clone(&self.executor), self.config.liveness).refresh()
    }

    /// The configuration the client was built from.
    ///
    /// Retry settings changed later through the setters are not reflected
    /// here; see [`retry_policy`](Self::retry_policy).
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The retry budget the next request will run under.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.executor.policy()
    }

    /// Number of failover attempts after the first one.
    pub fn retry_count(&self) -> u32 {
        self.retry_policy().max_retries
    }

    /// Change the number of failover attempts for subsequent requests.
    pub fn set_retry_count(&self, retry_count: u32) {
        let policy = self.retry_policy();
        self.executor
            .set_policy(RetryPolicy::new(retry_count, policy.max_duration));
    }

    /// Time after which no further failover attempt is started.
    pub fn retry_duration(&self) -> Duration {
        self.retry_policy().max_duration
    }

    /// Change the failover time budget for subsequent requests.
    pub fn set_retry_duration(&self, retry_duration: Duration) {
        let policy = self.retry_policy();
        self.executor
            .set_policy(RetryPolicy::new(policy.max_retries, retry_duration));
    }

    /// Endpoints currently in rotation.
    pub fn locations(&self) -> Vec<Url> {
        self.executor.endpoints().addresses()
    }

    /// The endpoint the next request will be sent to.
    pub fn current_location(&self) -> Url {
        self.executor.endpoints().current()
    }

    /// Run any keyspace operation built with [`KeyOperation`].
    pub fn execute(&self, operation: KeyOperation) -> Result<Response> {
        self.executor.execute(&operation.build())
    }

    /// Read `key`.
    pub fn get(&self, key: &str) -> Result<Response> {
        self.execute(KeyOperation::get(key))
    }

    /// Read `key`, including all children when `recursive` is set.
    pub fn get_recursive(&self, key: &str, recursive: bool) -> Result<Response> {
        self.execute(KeyOperation::get(key).recursive(recursive))
    }

    /// Set `key` to `value`. A replaced node is returned as `prev_node`.
    pub fn put(&self, key: &str, value: &str) -> Result<Response> {
        self.execute(KeyOperation::put(key).value(value))
    }

    /// Set `key` to `value` with a ttl; [`Ttl::Unset`] clears an existing one.
    pub fn put_with_ttl(&self, key: &str, value: &str, ttl: impl Into<Ttl>) -> Result<Response> {
        self.execute(KeyOperation::put(key).value(value).ttl(ttl))
    }

    /// Delete `key`. The removed node is returned as `prev_node`.
    pub fn delete(&self, key: &str) -> Result<Response> {
        self.execute(KeyOperation::delete(key))
    }

    /// Create an in-order key below the directory `key`.
    pub fn create(&self, key: &str, value: &str) -> Result<Response> {
        self.execute(KeyOperation::post(key).value(value))
    }

    /// Set `key` to `value` if `precondition` holds.
    pub fn compare_and_swap(
        &self,
        key: &str,
        value: &str,
        precondition: Precondition,
    ) -> Result<Response> {
        self.execute(KeyOperation::put(key).value(value).precondition(precondition))
    }

    /// [`compare_and_swap`](Self::compare_and_swap) that also sets the ttl.
    pub fn compare_and_swap_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: impl Into<Ttl>,
        precondition: Precondition,
    ) -> Result<Response> {
        self.execute(
            KeyOperation::put(key)
                .value(value)
                .ttl(ttl)
                .precondition(precondition),
        )
    }

    /// Delete `key` if its modified index matches.
    pub fn compare_and_delete_index(&self, key: &str, prev_index: u64) -> Result<Response> {
        self.execute(KeyOperation::delete(key).prev_index(prev_index))
    }

    /// Delete `key` if its value matches.
    pub fn compare_and_delete_value(&self, key: &str, prev_value: &str) -> Result<Response> {
        self.execute(KeyOperation::delete(key).prev_value(prev_value))
    }

    /// Create the directory `key`.
    pub fn put_dir(&self, key: &str) -> Result<Response> {
        self.execute(KeyOperation::put(key).dir())
    }

    /// Create or update the directory `key` with a ttl; [`Ttl::Unset`] clears it.
    pub fn put_dir_with_ttl(&self, key: &str, ttl: impl Into<Ttl>) -> Result<Response> {
        self.execute(KeyOperation::put(key).dir_ttl(ttl))
    }

    /// Delete an empty directory.
    pub fn delete_dir(&self, key: &str) -> Result<Response> {
        self.execute(KeyOperation::delete(key).dir())
    }

    /// Delete the directory `key` and, when `recursive` is set, its contents.
    pub fn delete_dir_recursive(&self, key: &str, recursive: bool) -> Result<Response> {
        self.execute(KeyOperation::delete(key).dir().recursive(recursive))
    }

    /// List cluster members and their advertised URLs.
    pub fn list_members(&self) -> Result<MemberList> {
        self.executor.execute(&Operation::list_members())
    }
}

impl Drop for EtcdClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}
