use failure::Fail;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8402";
const DEFAULT_DB_PATH: &str = "/data/plates.db";
const DEFAULT_CYCLE_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Fail)]
pub enum ConfigError {
    #[fail(display = "{} is not a valid socket address: {:?}", var, value)]
    InvalidAddr { var: &'static str, value: String },
    #[fail(display = "{} must be a positive number of milliseconds, got {:?}", var, value)]
    InvalidTimeout { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    /// Upper bound on one resolve-and-log cycle.
    pub cycle_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        Config::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen = lookup("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = listen.parse().map_err(|_| ConfigError::InvalidAddr {
            var: "LISTEN_ADDR",
            value: listen.clone(),
        })?;

        let cycle_timeout = match lookup("CYCLE_TIMEOUT_MS") {
            None => Duration::from_millis(DEFAULT_CYCLE_TIMEOUT_MS),
            Some(value) => match value.parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => {
                    return Err(ConfigError::InvalidTimeout {
                        var: "CYCLE_TIMEOUT_MS",
                        value,
                    })
                }
            },
        };

        Ok(Config {
            listen_addr,
            db_path: lookup("DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
            cycle_timeout,
        })
    }
}
