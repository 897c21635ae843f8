use std::{env, net::SocketAddr};

use thiserror::Error;

pub const DEFAULT_BIND_PORT: u16 = 8054;
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub bind_port: u16,
    pub rpc_path: String,
    pub max_body_bytes: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("BIND_PORT must be a valid u16")]
    InvalidPort,
    #[error("XMLRPC_PATH must start with '/'")]
    InvalidPath,
    #[error("MAX_BODY_BYTES must be a positive integer")]
    InvalidMaxBodyBytes,
    #[error("invalid bind address or port")]
    InvalidSocket,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1".to_string());
        let bind_port = lookup("BIND_PORT")
            .map(|value| value.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort))
            .transpose()?
            .unwrap_or(DEFAULT_BIND_PORT);
        let rpc_path = lookup("XMLRPC_PATH")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| "/".to_string());
        if !rpc_path.starts_with('/') {
            return Err(ConfigError::InvalidPath);
        }
        let max_body_bytes = lookup("MAX_BODY_BYTES")
            .map(|value| {
                value
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .filter(|bytes| *bytes > 0)
                    .ok_or(ConfigError::InvalidMaxBodyBytes)
            })
            .transpose()?
            .unwrap_or(DEFAULT_MAX_BODY_BYTES);

        let config = Self {
            bind_addr,
            bind_port,
            rpc_path,
            max_body_bytes,
        };

        let _ = config.bind_socket()?;
        Ok(config)
    }

    pub fn bind_socket(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.bind_port)
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidSocket)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn parse_defaults() {
        let config = config_from(&[]).expect("config should parse");
        assert_eq!(config.bind_addr, "127.0.0.1");
        assert_eq!(config.bind_port, 8054);
        assert_eq!(config.rpc_path, "/");
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
    }

    #[test]
    fn parse_overrides() {
        let config = config_from(&[
            ("BIND_ADDR", "0.0.0.0"),
            ("BIND_PORT", "9000"),
            ("XMLRPC_PATH", "/RPC2"),
            ("MAX_BODY_BYTES", "4096"),
        ])
        .expect("config should parse");

        assert_eq!(
            config.bind_socket().expect("socket"),
            "0.0.0.0:9000".parse().expect("valid socket")
        );
        assert_eq!(config.rpc_path, "/RPC2");
        assert_eq!(config.max_body_bytes, 4096);
    }

    #[test]
    fn invalid_port_fails() {
        let err = config_from(&[("BIND_PORT", "70000")]).expect_err("expected invalid port");
        assert!(matches!(err, ConfigError::InvalidPort));
    }

    #[test]
    fn relative_path_fails() {
        let err = config_from(&[("XMLRPC_PATH", "RPC2")]).expect_err("expected invalid path");
        assert!(matches!(err, ConfigError::InvalidPath));
    }

    #[test]
    fn zero_body_limit_fails() {
        let err = config_from(&[("MAX_BODY_BYTES", "0")]).expect_err("expected invalid limit");
        assert!(matches!(err, ConfigError::InvalidMaxBodyBytes));
    }

    #[test]
    fn invalid_bind_addr_fails() {
        let err = config_from(&[("BIND_ADDR", "not an address")]).expect_err("expected invalid socket");
        assert!(matches!(err, ConfigError::InvalidSocket));
    }
}
