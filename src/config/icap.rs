//! Probed ICAP service configuration.

use std::time::Duration;

use super::parse::{env_non_empty, env_parse, env_timeout, Env};
use super::ConfigError;
use crate::icap::{
    IcapClient, ProbeTarget, RequestBuilder, DEFAULT_HTTP_USER_AGENT, DEFAULT_ICAP_USER_AGENT,
};

/// ICAP probe configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct IcapConfig {
    /// ICAP service host (default: localhost).
    pub host: String,
    /// ICAP service port (default: 1344).
    pub port: u16,
    /// REQMOD path returning statistics (default: info?view=text).
    pub service: String,
    /// OPTIONS path used for health (default: gw_rebuild).
    pub options_service: String,
    /// Service name in workload labels (default: gw_rebuild).
    pub stats_service: String,
    /// User-Agent on ICAP requests.
    pub icap_user_agent: String,
    /// User-Agent on the embedded HTTP request.
    pub http_user_agent: String,
    /// Connect deadline.
    pub connect_timeout: Duration,
    /// Write and read deadline.
    pub read_timeout: Duration,
}

impl IcapConfig {
    /// Load configuration from environment variables.
    pub fn from_env(env: Env<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            host: env_non_empty(env, "ICAP_HOST", "localhost")?,
            port: env_parse(env, "ICAP_PORT", 1344)?,
            service: env_non_empty(env, "SERVICE", "info?view=text")?,
            options_service: env_non_empty(env, "OPTIONS_SERVICE", "gw_rebuild")?,
            stats_service: env_non_empty(env, "STATS_SERVICE", "gw_rebuild")?,
            icap_user_agent: env_non_empty(env, "ICAP_USER_AGENT", DEFAULT_ICAP_USER_AGENT)?,
            http_user_agent: env_non_empty(env, "HTTP_USER_AGENT", DEFAULT_HTTP_USER_AGENT)?,
            connect_timeout: env_timeout(env, "CONNECT_TIMEOUT", "5s")?,
            read_timeout: env_timeout(env, "READ_TIMEOUT", "10s")?,
        })
    }

    pub fn target(&self) -> ProbeTarget {
        ProbeTarget::new(self.host.clone(), self.port)
    }

    /// Client with the configured agents and deadlines.
    pub fn client(&self) -> IcapClient {
        let builder = RequestBuilder::new()
            .with_icap_user_agent(self.icap_user_agent.clone())
            .with_http_user_agent(self.http_user_agent.clone());

        IcapClient::new(builder)
            .with_connect_timeout(self.connect_timeout)
            .with_read_timeout(self.read_timeout)
    }
}
