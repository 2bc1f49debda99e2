// Shared transport configuration for building reqwest::Client instances.
//
// Every API class builds its own client from the same `TransportConfig`,
// so user agent and timeout live here instead of in each API module.

use std::time::Duration;

use crate::error::Error;

const USER_AGENT: &str = concat!("iobuilt-client/", env!("CARGO_PKG_VERSION"));

/// Shared transport configuration for building HTTP clients.
///
/// `timeout` is `None` by default: a request that never answers keeps its
/// caller waiting, matching the backend contract of one attempt per call.
#[derive(Debug, Clone, Default)]
pub struct TransportConfig {
    pub timeout: Option<Duration>,
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        builder
            .build()
            .map_err(|e| Error::ClientBuild(e.to_string()))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
