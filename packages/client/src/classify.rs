//! Splits the outcome of one attempt into success, fatal and retryable.
//!
//! Any HTTP response ends the retry loop: the node that answered speaks for
//! the whole cluster, so a different node would say the same thing. Only the
//! absence of a response is worth another endpoint.

use etcdv2_types::EtcdError;

use crate::error::{Error, TransportError};
use crate::types::{HttpRequest, HttpResponse};

#[derive(Debug)]
pub(crate) enum Outcome {
    Success(HttpResponse),
    Fatal(Error),
    Retryable(TransportError),
}

pub(crate) fn classify(
    request: &HttpRequest,
    result: Result<HttpResponse, TransportError>,
) -> Outcome {
    match result {
        Ok(response) if response.is_success() => Outcome::Success(response),
        Ok(response) => Outcome::Fatal(application_error(request, &response)),
        Err(error) => Outcome::Retryable(error),
    }
}

/// Build the error for a non-2xx answer, decoding etcd's error body if it has one.
pub(crate) fn application_error(request: &HttpRequest, response: &HttpResponse) -> Error {
    let error = response.json::<EtcdError>().ok();
    let mut message = format!(
        "Failed to execute {}: {} {}",
        request, response.status, response.status_text
    );
    if let Some(error) = &error {
        message.push_str(&format!(" ({})", error));
    }
    Error::Etcd {
        status: response.status,
        error,
        message,
    }
}
