use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("invalid value for {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

pub const DEFAULT_LISTEN: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 7310);

pub const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 30;

/// Resolved relay configuration. Read from the environment once at startup
/// and handed to the processor as plain values.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Substring filter on extracted URI paths. None forwards every path.
    pub target_path_filter: Option<String>,

    /// Workflow endpoint receiving one POST per eligible path.
    pub notify_endpoint: String,

    /// Address the ingest server binds to.
    pub listen: SocketAddr,

    /// Timeout applied to each outbound notification request.
    pub notify_timeout: Duration,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // An empty TARGET_DIRECTORY means "no filter", not "match everything
        // trivially".
        let target_path_filter = lookup("TARGET_DIRECTORY").filter(|v| !v.is_empty());

        let notify_endpoint = lookup("LOGIC_APP_URL")
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("LOGIC_APP_URL"))?;

        let listen = match lookup("RELAY_LISTEN").filter(|v| !v.is_empty()) {
            Some(raw) => raw.parse().map_err(|e: std::net::AddrParseError| {
                ConfigError::Invalid {
                    var: "RELAY_LISTEN",
                    message: e.to_string(),
                }
            })?,
            None => DEFAULT_LISTEN,
        };

        let notify_timeout = match lookup("NOTIFY_TIMEOUT_SECS").filter(|v| !v.is_empty()) {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|e: std::num::ParseIntError| {
                    ConfigError::Invalid {
                        var: "NOTIFY_TIMEOUT_SECS",
                        message: e.to_string(),
                    }
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_NOTIFY_TIMEOUT_SECS),
        };

        Ok(Self {
            target_path_filter,
            notify_endpoint,
            listen,
            notify_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_full_configuration() {
        let config = RelayConfig::from_lookup(lookup_from(&[
            ("TARGET_DIRECTORY", "/exports/"),
            ("LOGIC_APP_URL", "https://workflows.example.com/trigger"),
            ("RELAY_LISTEN", "0.0.0.0:9000"),
            ("NOTIFY_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.target_path_filter.as_deref(), Some("/exports/"));
        assert_eq!(config.notify_endpoint, "https://workflows.example.com/trigger");
        assert_eq!(config.listen.to_string(), "0.0.0.0:9000");
        assert_eq!(config.notify_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_defaults_apply_when_optional_vars_absent() {
        let config = RelayConfig::from_lookup(lookup_from(&[(
            "LOGIC_APP_URL",
            "https://workflows.example.com/trigger",
        )]))
        .unwrap();

        assert!(config.target_path_filter.is_none());
        assert_eq!(config.listen, DEFAULT_LISTEN);
        assert_eq!(
            config.notify_timeout,
            Duration::from_secs(DEFAULT_NOTIFY_TIMEOUT_SECS)
        );
    }

    #[test]
    fn test_missing_endpoint_is_an_error() {
        let result = RelayConfig::from_lookup(lookup_from(&[("TARGET_DIRECTORY", "/x/")]));
        assert!(matches!(result, Err(ConfigError::Missing("LOGIC_APP_URL"))));
    }

    #[test]
    fn test_empty_filter_treated_as_unset() {
        let config = RelayConfig::from_lookup(lookup_from(&[
            ("TARGET_DIRECTORY", ""),
            ("LOGIC_APP_URL", "https://workflows.example.com/trigger"),
        ]))
        .unwrap();

        assert!(config.target_path_filter.is_none());
    }

    #[test]
    fn test_invalid_listen_address() {
        let result = RelayConfig::from_lookup(lookup_from(&[
            ("LOGIC_APP_URL", "https://workflows.example.com/trigger"),
            ("RELAY_LISTEN", "not-an-address"),
        ]));

        let err = result.unwrap_err();
        assert!(err.to_string().contains("RELAY_LISTEN"));
    }
}
