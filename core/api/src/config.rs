// Path and File Name : /home/netsnare/rebuild/core/api/src/config.rs
// Author: Qv9Xw2LpTzK4dRmY7cHgUeB1nJf8oAiS5kWxZ3tMqD0
// Details of functionality of this file: ENV-only controller configuration - decoy ports, timers and fleet target version, fail-closed on invalid values

use std::time::Duration;

use anyhow::{Context, Result};

/// Controller configuration. ENV-only with documented defaults; invalid
/// numeric values fail startup instead of being silently replaced.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub api_addr: String,
    pub ftp_port: u16,
    pub telnet_port: u16,
    pub redis_port: u16,
    pub session_capacity: usize,
    pub idle_timeout: Duration,
    pub offline_after: Duration,
    pub watchdog_tick: Duration,
    pub alert_throttle: Duration,
    pub recon_tick: Duration,
    pub agent_version: String,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env_or(key, default)
        .parse::<T>()
        .with_context(|| format!("Invalid value for {}", key))
}

impl CoreConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api_addr: env_or("NETSNARE_API_ADDR", "0.0.0.0:8080"),
            ftp_port: env_parse("NETSNARE_FTP_PORT", "21")?,
            telnet_port: env_parse("NETSNARE_TELNET_PORT", "23")?,
            redis_port: env_parse("NETSNARE_REDIS_PORT", "6379")?,
            session_capacity: env_parse("NETSNARE_SESSION_CAPACITY", "50")?,
            idle_timeout: Duration::from_secs(env_parse("NETSNARE_IDLE_TIMEOUT_SECS", "300")?),
            offline_after: Duration::from_secs(env_parse("NETSNARE_OFFLINE_AFTER_SECS", "600")?),
            watchdog_tick: Duration::from_secs(env_parse("NETSNARE_WATCHDOG_TICK_SECS", "5")?),
            alert_throttle: Duration::from_secs(env_parse("NETSNARE_ALERT_THROTTLE_SECS", "60")?),
            recon_tick: Duration::from_secs(env_parse("NETSNARE_RECON_TICK_SECS", "120")?),
            agent_version: env_or("NETSNARE_AGENT_VERSION", "1.0.0"),
        })
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            api_addr: "0.0.0.0:8080".to_string(),
            ftp_port: 21,
            telnet_port: 23,
            redis_port: 6379,
            session_capacity: 50,
            idle_timeout: Duration::from_secs(300),
            offline_after: Duration::from_secs(600),
            watchdog_tick: Duration::from_secs(5),
            alert_throttle: Duration::from_secs(60),
            recon_tick: Duration::from_secs(120),
            agent_version: "1.0.0".to_string(),
        }
    }
}
