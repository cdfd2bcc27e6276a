//! The ordered set of cluster endpoints and the round-robin cursor into it.

use std::sync::{Mutex, MutexGuard, PoisonError};

use url::Url;

use crate::error::{Error, Result};

/// Addresses plus cursor, always replaced or advanced together.
#[derive(Debug, Clone)]
struct Snapshot {
    addresses: Vec<Url>,
    cursor: usize,
}

/// Endpoint list shared by foreground requests and the membership refresher.
///
/// The list is never empty and the cursor always points into it.
#[derive(Debug)]
pub struct EndpointSet {
    state: Mutex<Snapshot>,
}

impl EndpointSet {
    /// Build a set positioned at the first address.
    ///
    /// Fails with [`Error::NoEndpoints`] on an empty list and with
    /// [`Error::InvalidEndpoint`] on anything but an http(s) base URL.
    pub fn new(addresses: Vec<Url>) -> Result<Self> {
        if addresses.is_empty() {
            return Err(Error::NoEndpoints);
        }
        for address in &addresses {
            validate(address)?;
        }
        Ok(Self {
            state: Mutex::new(Snapshot {
                addresses,
                cursor: 0,
            }),
        })
    }

    /// Parse `scheme://host:port` style locations.
    pub fn parse<S: AsRef<str>>(locations: &[S]) -> Result<Self> {
        let addresses = locations
            .iter()
            .map(|location| Url::parse(location.as_ref()).map_err(Error::from))
            .collect::<Result<Vec<_>>>()?;
        Self::new(addresses)
    }

    fn lock(&self) -> MutexGuard<'_, Snapshot> {
        // The snapshot is consistent after every statement, so a panic
        // elsewhere cannot leave it torn.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The endpoint the next attempt should go to.
    pub fn current(&self) -> Url {
        let state = self.lock();
        state.addresses[state.cursor].clone()
    }

    /// Move the cursor to the next endpoint, wrapping at the end.
    pub fn advance(&self) {
        let mut state = self.lock();
        state.cursor = (state.cursor + 1) % state.addresses.len();
    }

    /// Advance past `failed`, but only if it is still the current endpoint.
    ///
    /// Returns `false` when another caller already moved on, or a refresh
    /// swapped the list, since the failed attempt started.
    pub fn advance_from(&self, failed: &Url) -> bool {
        let mut state = self.lock();
        if state.addresses[state.cursor] != *failed {
            return false;
        }
        state.cursor = (state.cursor + 1) % state.addresses.len();
        true
    }

    /// Swap in a new endpoint list and start over at its first entry.
    ///
    /// An empty list, or one containing an unusable address, is ignored and
    /// `false` is returned.
    pub fn replace(&self, addresses: Vec<Url>) -> bool {
        if addresses.is_empty() || addresses.iter().any(|address| validate(address).is_err()) {
            return false;
        }
        let mut state = self.lock();
        *state = Snapshot {
            addresses,
            cursor: 0,
        };
        true
    }

    /// Copy of the endpoint list, in rotation order.
    pub fn addresses(&self) -> Vec<Url> {
        self.lock().addresses.clone()
    }

    /// Number of endpoints in rotation. Never zero.
    pub fn len(&self) -> usize {
        self.lock().addresses.len()
    }

    /// Always `false`; kept alongside [`len`](Self::len).
    pub fn is_empty(&self) -> bool {
        self.lock().addresses.is_empty()
    }
}

/// Endpoints have to be http(s) URLs we can append path segments to.
pub(crate) fn validate(address: &Url) -> Result<()> {
    let usable = matches!(address.scheme(), "http" | "https") && !address.cannot_be_a_base();
    if usable {
        Ok(())
    } else {
        Err(Error::InvalidEndpoint {
            url: address.to_string(),
        })
    }
}
