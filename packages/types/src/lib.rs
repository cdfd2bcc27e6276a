//! # etcdv2-types
//!
//! Data shapes exchanged with the etcd v2 HTTP API.
//!
//! These are plain serde types. They carry no behavior beyond a few
//! convenience accessors; the request/retry logic lives in `etcdv2-client`.
//!
//! - [`Response`] / [`Node`] for the `/v2/keys` namespace
//! - [`MemberList`] / [`Member`] for `/v2/members`
//! - [`EtcdError`] and the [`codes`] it may carry for non-2xx answers

pub mod codes;
pub mod error;
pub mod member;
pub mod node;

pub use error::EtcdError;
pub use member::{Member, MemberList};
pub use node::{Node, Response};
