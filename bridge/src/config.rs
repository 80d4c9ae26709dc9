use std::net::SocketAddr;
use std::str::FromStr;
use std::time;

use envconfig::Envconfig;

#[derive(Envconfig, Clone)]
pub struct Config {
    /// Meta Pixel (dataset) id the events are reported against.
    pub meta_pixel_id: String,

    /// CAPI access token. Never logged or echoed by any endpoint.
    pub meta_access_token: String,

    #[envconfig(default = "v18.0")]
    pub meta_api_version: String,

    /// Overridable so tests can point the sender at a local mock server.
    #[envconfig(default = "https://graph.facebook.com")]
    pub meta_api_host: String,

    #[envconfig(default = "127.0.0.1:3000")]
    pub address: SocketAddr,

    /// Total timeout for the single outbound CAPI attempt.
    #[envconfig(default = "10000")]
    pub request_timeout: EnvMsDuration,

    #[envconfig(default = "false")]
    pub debug: bool,

    // Used for integration tests
    #[envconfig(default = "true")]
    pub export_prometheus: bool,
}

impl Config {
    /// The fully-qualified CAPI events endpoint for this pixel.
    pub fn capi_events_url(&self) -> String {
        format!(
            "{}/{}/{}/events",
            self.meta_api_host, self.meta_api_version, self.meta_pixel_id
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EnvMsDuration(pub time::Duration);

#[derive(Debug, PartialEq, Eq)]
pub struct ParseEnvMsDurationError;

impl FromStr for EnvMsDuration {
    type Err = ParseEnvMsDurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ms = s.parse::<u64>().map_err(|_| ParseEnvMsDurationError)?;

        Ok(EnvMsDuration(time::Duration::from_millis(ms)))
    }
}
