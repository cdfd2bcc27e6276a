//! Operation descriptors.
//!
//! An [`Operation`] says what to ask (method, path below the endpoint, query,
//! form body) without saying whom. The executor turns it into an
//! [`HttpRequest`] once per attempt, against whichever endpoint is current.
//!
//! [`KeyOperation`] is the builder for everything under `/v2/keys`.

use std::time::Duration;

use url::Url;

use crate::endpoints;
use crate::error::{Error, Result};
use crate::types::{HttpRequest, Method};

const KEYSPACE: [&str; 2] = ["v2", "keys"];
const MEMBERSPACE: [&str; 2] = ["v2", "members"];

/// Time-to-live of a key or directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    Seconds(u64),
    /// Clear an existing ttl. Sent as an empty `ttl` parameter.
    Unset,
}

impl Ttl {
    /// Negative values (conventionally `-1`) mean [`Ttl::Unset`].
    pub fn from_raw(ttl: i64) -> Self {
        u64::try_from(ttl).map_or(Ttl::Unset, Ttl::Seconds)
    }

    fn render(self) -> String {
        match self {
            Ttl::Seconds(seconds) => seconds.to_string(),
            Ttl::Unset => String::new(),
        }
    }
}

impl From<u64> for Ttl {
    fn from(seconds: u64) -> Self {
        Ttl::Seconds(seconds)
    }
}

/// Whole seconds, rounded up so a sub-second ttl never becomes `ttl=0`.
impl From<Duration> for Ttl {
    fn from(duration: Duration) -> Self {
        let partial = u64::from(duration.subsec_nanos() > 0);
        Ttl::Seconds(duration.as_secs().saturating_add(partial))
    }
}

/// Condition etcd checks before applying a write or delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    /// `true`: the key must exist (update). `false`: it must not (create).
    PrevExist(bool),
    /// The key's current modified index.
    PrevIndex(u64),
    /// The key's current value.
    PrevValue(String),
}

impl Precondition {
    fn query_pair(&self) -> (String, String) {
        match self {
            Precondition::PrevExist(exist) => ("prevExist".to_string(), exist.to_string()),
            Precondition::PrevIndex(index) => ("prevIndex".to_string(), index.to_string()),
            Precondition::PrevValue(value) => ("prevValue".to_string(), value.clone()),
        }
    }
}

/// A fully described request, independent of the endpoint it goes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    method: Method,
    segments: Vec<String>,
    query: Vec<(String, String)>,
    form: Vec<(String, String)>,
}

impl Operation {
    /// `GET /v2/members`.
    pub fn list_members() -> Self {
        Self {
            method: Method::GET,
            segments: MEMBERSPACE.iter().map(|s| s.to_string()).collect(),
            query: Vec::new(),
            form: Vec::new(),
        }
    }

    /// Build the concrete request against `endpoint`.
    pub fn request(&self, endpoint: &Url) -> Result<HttpRequest> {
        let mut url = endpoint.clone();
        url.set_query(None);
        url.set_fragment(None);

        url.path_segments_mut()
            .map_err(|_| Error::InvalidEndpoint {
                url: endpoint.to_string(),
            })?
            .pop_if_empty()
            .extend(&self.segments);

        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &self.query {
                pairs.append_pair(name, value);
            }
        }

        Ok(HttpRequest {
            method: self.method,
            url,
            form: self.form.clone(),
        })
    }
}

/// Append `segment` below `base`, e.g. `/version` on a member's client URL.
pub(crate) fn join_segment(base: &Url, segment: &str) -> Result<Url> {
    endpoints::validate(base)?;
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| Error::InvalidEndpoint {
            url: base.to_string(),
        })?
        .pop_if_empty()
        .push(segment);
    Ok(url)
}

/// Builder for `/v2/keys` operations.
///
/// Query parameters always render in the order `recursive`, `dir`, `ttl`,
/// then the precondition, whatever order the setters were called in. The form
/// body carries `value`, or `dir` and `dir_ttl` when a directory is written.
///
/// ```ignore
/// let op = KeyOperation::put("config/port")
///     .value("8080")
///     .ttl(Ttl::Seconds(60))
///     .prev_exist(true);
/// client.execute(op)?;
///
/// let dir = KeyOperation::put("jobs").dir_ttl(Ttl::Seconds(300));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyOperation {
    method: Method,
    key: String,
    value: Option<String>,
    dir: bool,
    recursive: Option<bool>,
    ttl: Option<Ttl>,
    dir_ttl: Option<Ttl>,
    precondition: Option<Precondition>,
}

impl KeyOperation {
    fn new(method: Method, key: impl Into<String>) -> Self {
        Self {
            method,
            key: key.into(),
            value: None,
            dir: false,
            recursive: None,
            ttl: None,
            dir_ttl: None,
            precondition: None,
        }
    }

    /// Read `key`.
    pub fn get(key: impl Into<String>) -> Self {
        Self::new(Method::GET, key)
    }

    /// Write `key`, usually together with [`value`](Self::value) or [`dir`](Self::dir).
    pub fn put(key: impl Into<String>) -> Self {
        Self::new(Method::PUT, key)
    }

    /// Create an in-order child below the directory `key`.
    pub fn post(key: impl Into<String>) -> Self {
        Self::new(Method::POST, key)
    }

    /// Remove `key`. With [`dir`](Self::dir) only an empty directory is removed.
    pub fn delete(key: impl Into<String>) -> Self {
        Self::new(Method::DELETE, key)
    }

    /// Value sent in the form body.
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Operate on a directory.
    ///
    /// Writes send `dir=true` in the body. Deletes send it as a query
    /// parameter, unless `recursive` is set, which already implies it.
    pub fn dir(mut self) -> Self {
        self.dir = true;
        self
    }

    /// Write a directory with a ttl in the body; [`Ttl::Unset`] clears it.
    pub fn dir_ttl(mut self, ttl: impl Into<Ttl>) -> Self {
        self.dir = true;
        self.dir_ttl = Some(ttl.into());
        self
    }

    /// Include children on reads; remove contents on directory deletes.
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = Some(recursive);
        self
    }

    /// Key ttl, sent as a query parameter.
    pub fn ttl(mut self, ttl: impl Into<Ttl>) -> Self {
        self.ttl = Some(ttl.into());
        self
    }

    /// Make the write or delete conditional. A later call replaces an earlier one.
    pub fn precondition(mut self, precondition: Precondition) -> Self {
        self.precondition = Some(precondition);
        self
    }

    pub fn prev_exist(self, exist: bool) -> Self {
        self.precondition(Precondition::PrevExist(exist))
    }

    pub fn prev_index(self, index: u64) -> Self {
        self.precondition(Precondition::PrevIndex(index))
    }

    pub fn prev_value(self, value: impl Into<String>) -> Self {
        self.precondition(Precondition::PrevValue(value.into()))
    }

    /// Freeze the builder into an endpoint-independent [`Operation`].
    pub fn build(self) -> Operation {
        let mut segments: Vec<String> = KEYSPACE.iter().map(|s| s.to_string()).collect();
        segments.extend(
            self.key
                .split('/')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string),
        );

        let dir_in_query = self.dir && self.method == Method::DELETE;
        let dir_in_body = self.dir && matches!(self.method, Method::PUT | Method::POST);

        let mut query = Vec::new();
        if let Some(recursive) = self.recursive {
            query.push(("recursive".to_string(), recursive.to_string()));
        }
        if dir_in_query && self.recursive.is_none() {
            query.push(("dir".to_string(), "true".to_string()));
        }
        if let Some(ttl) = self.ttl {
            query.push(("ttl".to_string(), ttl.render()));
        }
        if let Some(precondition) = &self.precondition {
            query.push(precondition.query_pair());
        }

        let mut form = Vec::new();
        if let Some(value) = self.value {
            form.push(("value".to_string(), value));
        }
        if dir_in_body {
            form.push(("dir".to_string(), "true".to_string()));
            if let Some(ttl) = self.dir_ttl {
                form.push(("ttl".to_string(), ttl.render()));
            }
        }

        Operation {
            method: self.method,
            segments,
            query,
            form,
        }
    }
}

impl From<KeyOperation> for Operation {
    fn from(op: KeyOperation) -> Self {
        op.build()
    }
}
