//! Application configuration.
//!
//! Values come from the process environment, which `main` seeds from a
//! `.env` file via `dotenvy`. Every variable is optional.
//!
//! | Variable           | Default                  |
//! |--------------------|--------------------------|
//! | `SWIFTCODES_HOST`  | `0.0.0.0`                |
//! | `SWIFTCODES_PORT`  | `8080`                   |
//! | `SWIFTCODES_DATA`  | `data/swift_codes.csv`   |
//! | `SWIFTCODES_STORE` | `.swiftcodes/store.json` |

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::store::DEFAULT_STORE_PATH;

pub const HOST_VAR: &str = "SWIFTCODES_HOST";
pub const PORT_VAR: &str = "SWIFTCODES_PORT";
pub const DATA_VAR: &str = "SWIFTCODES_DATA";
pub const STORE_VAR: &str = "SWIFTCODES_STORE";

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default CSV feed location.
pub const DEFAULT_DATA_PATH: &str = "data/swift_codes.csv";

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "swiftcodes=info,tower_http=info";

/// Runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: IpAddr,
    pub port: u16,
    /// CSV feed loaded by `load` and `serve --load`
    pub data_path: PathBuf,
    /// Store snapshot file
    pub store_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
        }
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut settings = Self::default();

        if let Some(host) = get(HOST_VAR) {
            settings.host = host.trim().parse().map_err(|e: std::net::AddrParseError| {
                ConfigError::InvalidValue {
                    key: HOST_VAR.to_string(),
                    value: host.clone(),
                    reason: e.to_string(),
                }
            })?;
        }

        if let Some(port) = get(PORT_VAR) {
            settings.port = port.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidValue {
                    key: PORT_VAR.to_string(),
                    value: port.clone(),
                    reason: e.to_string(),
                }
            })?;
        }

        if let Some(data) = get(DATA_VAR) {
            settings.data_path = PathBuf::from(data);
        }

        if let Some(store) = get(STORE_VAR) {
            settings.store_path = PathBuf::from(store);
        }

        Ok(settings)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.socket_addr().port(), 8080);
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            (HOST_VAR, "127.0.0.1"),
            (PORT_VAR, " 3000 "),
            (DATA_VAR, "feeds/codes.csv"),
            (STORE_VAR, "/tmp/store.json"),
        ]))
        .unwrap();

        assert_eq!(settings.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(settings.data_path, PathBuf::from("feeds/codes.csv"));
        assert_eq!(settings.store_path, PathBuf::from("/tmp/store.json"));
    }

    #[test]
    fn test_empty_values_use_defaults() {
        let settings = Settings::from_lookup(lookup(&[(PORT_VAR, ""), (HOST_VAR, "  ")])).unwrap();
        assert_eq!(settings.port, DEFAULT_PORT);
    }

    #[test]
    fn test_invalid_port() {
        let err = Settings::from_lookup(lookup(&[(PORT_VAR, "eighty")])).unwrap_err();
        assert!(err.to_string().contains(PORT_VAR));
        assert!(err.to_string().contains("eighty"));
    }

    #[test]
    fn test_invalid_host() {
        assert!(Settings::from_lookup(lookup(&[(HOST_VAR, "not-an-ip")])).is_err());
    }
}
