//! Per-API-key client cache for multi-tenant deployments.

use std::{
    collections::{hash_map::Entry, HashMap},
    fmt,
    sync::{PoisonError, RwLock},
};

use crate::{
    client::{resolve_base_url, resolve_timeout, Client, Config},
    errors::{Error, Result},
};

/// Hands out one [`Client`] per API key.
///
/// Every client shares the factory's base URL, timeout, user agent and
/// transport; only the API key differs. Repeated calls with the same key,
/// from any thread, return handles to the same client.
pub struct ClientFactory {
    base: Config,
    clients: RwLock<HashMap<String, Client>>,
}

impl ClientFactory {
    /// Validates the shared settings up front. The config's API key is ignored.
    pub fn new(base: Config) -> Result<Self> {
        resolve_base_url(base.base_url.as_deref())?;
        resolve_timeout(base.timeout)?;
        Ok(Self {
            base: Config {
                api_key: None,
                ..base
            },
            clients: RwLock::new(HashMap::new()),
        })
    }

    /// Returns the cached client for `api_key`, building it on first use.
    pub fn create_client(&self, api_key: &str) -> Result<Client> {
        if api_key.trim().is_empty() {
            return Err(Error::InvalidInput("API key is required".to_string()));
        }

        if let Some(client) = self
            .clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(api_key)
        {
            return Ok(client.clone());
        }

        let mut clients = self
            .clients
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match clients.entry(api_key.to_string()) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                let client = Client::new(self.base.clone().with_api_key(api_key))?;
                #[cfg(feature = "tracing")]
                tracing::debug!(base_url = client.base_url(), "cached new emailit client");
                Ok(entry.insert(client).clone())
            }
        }
    }

    /// Number of cached clients.
    pub fn len(&self) -> usize {
        self.clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every cached client. Safe to call more than once.
    ///
    /// Handles already given out keep working; the factory simply stops
    /// holding them, so their connection pools close once the last handle goes.
    pub fn shutdown(&self) {
        let drained: Vec<Client> = self
            .clients
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .map(|(_, client)| client)
            .collect();
        #[cfg(feature = "tracing")]
        if !drained.is_empty() {
            tracing::debug!(count = drained.len(), "released cached emailit clients");
        }
        drop(drained);
    }
}

impl Drop for ClientFactory {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for ClientFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientFactory")
            .field("base_url", &self.base.base_url)
            .field("timeout", &self.base.timeout)
            .field("clients", &self.len())
            .finish()
    }
}
