//! # etcdv2-client
//!
//! Blocking client for the etcd v2 HTTP API that survives members failing
//! or moving.
//!
//! ## Request dispatch
//!
//! Every operation goes to one endpoint at a time. When an endpoint gives no
//! response (refused, timed out, broken read) the client moves on to the next
//! one, round-robin, until the retry budget runs out:
//!
//! ```ignore
//! use etcdv2_client::{ClientConfig, EtcdClient};
//!
//! let config = ClientConfig::new(["http://h1:2379", "http://h2:2379"])
//!     .with_retry_count(1)
//!     .with_retry_duration(Duration::from_secs(30));
//! let client = EtcdClient::new(config)?;
//!
//! let response = client.get("sample")?;
//! ```
//!
//! Any HTTP response ends the loop. A non-2xx answer comes back as
//! [`Error::Etcd`], carrying etcd's [`EtcdError`] when the body decodes.
//!
//! ## Operations
//!
//! The named methods on [`EtcdClient`] cover the common cases. Anything else
//! can be described with a [`KeyOperation`]:
//!
//! ```ignore
//! use etcdv2_client::{KeyOperation, Ttl};
//!
//! client.execute(
//!     KeyOperation::put("locks/job")
//!         .value("worker-3")
//!         .ttl(Ttl::Seconds(15))
//!         .prev_exist(false),
//! )?;
//! ```
//!
//! ## Membership refresh
//!
//! [`EtcdClient::start`] spawns a thread that lists `/v2/members` every
//! refresh interval, probes each advertised client URL, and replaces the
//! endpoint list with the ones that answered. [`EtcdClient::shutdown`] (or
//! dropping the client) stops it.

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod executor;
pub mod operation;
pub mod refresher;
pub mod schedule;
pub mod transport;
pub mod types;

mod classify;

pub use client::EtcdClient;
pub use config::ClientConfig;
pub use endpoints::EndpointSet;
pub use error::{Error, Result, TransportError};
pub use executor::{RequestExecutor, RetryPolicy};
pub use operation::{KeyOperation, Operation, Precondition, Ttl};
pub use refresher::{LivenessCheck, MembershipRefresher, RefreshOutcome};
pub use schedule::PeriodicTask;
pub use transport::{ReqwestTransport, Transport};
pub use types::{HttpRequest, HttpResponse, Method};

pub use etcdv2_types::{codes, EtcdError, Member, MemberList, Node, Response};
