use etcdv2_types::EtcdError;

/// Failure to get any HTTP response out of an endpoint.
///
/// Produced by a [`Transport`](crate::Transport) when the connection could
/// not be established, timed out, or broke while reading. These are the only
/// failures that move a request on to the next endpoint.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("connection to {url} failed: {message}")]
    Connect { url: String, message: String },

    #[error("request to {url} timed out: {message}")]
    Timeout { url: String, message: String },

    #[error("request to {url} failed: {message}")]
    Io { url: String, message: String },
}

impl TransportError {
    /// The request URL that got no response.
    pub fn url(&self) -> &str {
        match self {
            TransportError::Connect { url, .. }
            | TransportError::Timeout { url, .. }
            | TransportError::Io { url, .. } => url,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// etcd answered with a non-2xx status.
    ///
    /// `error` is `None` when the body could not be decoded as an etcd error.
    #[error("{message}")]
    Etcd {
        status: u16,
        error: Option<EtcdError>,
        message: String,
    },

    /// No endpoint produced a response within the retry budget.
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("no etcd endpoints configured")]
    NoEndpoints,

    #[error("URL parse error: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid endpoint: {url}")]
    InvalidEndpoint { url: String },

    #[error("invalid configuration: {message}")]
    Config { message: String },

    #[error("failed to start background refresh: {0}")]
    Spawn(#[from] std::io::Error),
}

impl Error {
    /// Whether another endpoint could have served the request: the failure
    /// came from the network, not from etcd.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// The structured error etcd returned, if any.
    pub fn etcd_error(&self) -> Option<&EtcdError> {
        match self {
            Error::Etcd { error, .. } => error.as_ref(),
            _ => None,
        }
    }

    /// Shorthand for the etcd error code, see [`etcdv2_types::codes`].
    pub fn error_code(&self) -> Option<i32> {
        self.etcd_error().map(|error| error.error_code)
    }

    /// HTTP status of an etcd error response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Etcd { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
