//! Client options and `host:port` address parsing.
//!
//! Everything a handle needs comes in through `new_client(address, password)`;
//! there are no config files or environment variables.  The logical database
//! index is fixed at 0.
//!
//! | Address            | Host          | Port   |
//! |--------------------|---------------|--------|
//! | `""`               | `localhost`   | 6379   |
//! | `"cache"`          | `cache`       | 6379   |
//! | `"cache:6380"`     | `cache`       | 6380   |
//! | `"[::1]:7000"`     | `::1`         | 7000   |

use redis::{ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use thiserror::Error;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 6379;
pub const DEFAULT_DB: i64 = 0;

// ── Errors ────────────────────────────────────────────────────────────────────

/// An address that could not be turned into a connection target.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid port {port:?} in address {addr:?}")]
    InvalidPort { addr: String, port: String },

    #[error("unterminated '[' in address {addr:?}")]
    UnterminatedBracket { addr: String },

    #[error("invalid address {addr:?}: {reason}")]
    Rejected { addr: String, reason: String },
}

// ── ClientOptions ─────────────────────────────────────────────────────────────

/// Arguments of a `new_client` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    pub addr: String,
    /// Empty means no `AUTH`.
    pub password: String,
    pub db: i64,
}

impl ClientOptions {
    pub fn new(addr: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            password: password.into(),
            db: DEFAULT_DB,
        }
    }

    /// Resolve the address into `(host, port)`.
    pub fn host_port(&self) -> Result<(String, u16), ConfigError> {
        parse_addr(&self.addr)
    }

    /// Build the `redis` connection target.  Does not touch the network.
    pub fn connection_info(&self) -> Result<ConnectionInfo, ConfigError> {
        let (host, port) = self.host_port()?;
        let password = (!self.password.is_empty()).then(|| self.password.clone());
        Ok(ConnectionInfo {
            addr: ConnectionAddr::Tcp(host, port),
            redis: RedisConnectionInfo {
                db: self.db,
                password,
                ..Default::default()
            },
        })
    }
}

// ── Address parsing ───────────────────────────────────────────────────────────

/// Split `addr` into host and port.
///
/// The port is taken after the last `:` unless the host is a bracketed IPv6
/// literal; a bare IPv6 literal without brackets is read as a host with no
/// port.
pub fn parse_addr(addr: &str) -> Result<(String, u16), ConfigError> {
    let addr = addr.trim();
    if addr.is_empty() {
        return Ok((DEFAULT_HOST.to_owned(), DEFAULT_PORT));
    }

    if let Some(rest) = addr.strip_prefix('[') {
        let Some((host, tail)) = rest.split_once(']') else {
            return Err(ConfigError::UnterminatedBracket { addr: addr.to_owned() });
        };
        let port = match tail.strip_prefix(':') {
            Some(p) => parse_port(addr, p)?,
            None if tail.is_empty() => DEFAULT_PORT,
            None => return Err(invalid_port(addr, tail)),
        };
        return Ok((host.to_owned(), port));
    }

    match addr.rsplit_once(':') {
        // more than one colon without brackets: bare IPv6 host
        Some((host, _)) if host.contains(':') => Ok((addr.to_owned(), DEFAULT_PORT)),
        Some((host, port)) => {
            let host = if host.is_empty() { DEFAULT_HOST } else { host };
            Ok((host.to_owned(), parse_port(addr, port)?))
        }
        None => Ok((addr.to_owned(), DEFAULT_PORT)),
    }
}

fn parse_port(addr: &str, port: &str) -> Result<u16, ConfigError> {
    if port.is_empty() {
        return Ok(DEFAULT_PORT);
    }
    match port.parse::<u16>() {
        Ok(0) | Err(_) => Err(invalid_port(addr, port)),
        Ok(p) => Ok(p),
    }
}

fn invalid_port(addr: &str, port: &str) -> ConfigError {
    ConfigError::InvalidPort {
        addr: addr.to_owned(),
        port: port.to_owned(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
