//! Probe configuration data model and validation

use crate::config::EnvManager;
use crate::defaults;
use crate::types::{AppError, DnsConfig, IpFamily, OutputFormat, Result, TlsVersion};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

/// Upper bound for any configured timeout, in seconds
pub const MAX_TIMEOUT_SECS: u64 = 300;

/// Upper bound for the response buffer capacity
pub const MAX_CONTENT_LIMIT: usize = 256 * 1024 * 1024;

/// Everything a single probe run needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Target URL
    pub url: String,

    /// Address families the connector may use
    #[serde(default)]
    pub ip_family: IpFamily,

    /// Send timeout applied to the connected socket
    #[serde(default = "default_wait_time")]
    pub wait_time_seconds: u64,

    /// Substring that must appear in the response; empty always passes
    #[serde(default)]
    pub check_string: String,

    /// Write the whole response to stdout before the report
    #[serde(default)]
    pub print_content: bool,

    /// Enable per-phase debug tracing
    #[serde(default)]
    pub debug: bool,

    /// Port override; the scheme's port when unset
    #[serde(default)]
    pub port: Option<u16>,

    /// Name servers to query instead of the system resolver
    #[serde(default)]
    pub dns_servers: Vec<String>,

    /// TLS protocol version the session is pinned to
    #[serde(default)]
    pub tls_version: TlsVersion,

    /// Skip server certificate verification
    #[serde(default)]
    pub insecure: bool,

    /// Deadline for each connect attempt; OS default when unset
    #[serde(default)]
    pub connect_timeout_seconds: Option<u64>,

    /// Deadline for each read; unbounded when unset
    #[serde(default)]
    pub read_timeout_seconds: Option<u64>,

    /// Response buffer capacity in bytes
    #[serde(default = "default_max_content")]
    pub max_content_bytes: usize,

    /// Value of the User-Agent header
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Report rendering
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Colored error output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            ip_family: IpFamily::Any,
            wait_time_seconds: default_wait_time(),
            check_string: String::new(),
            print_content: false,
            debug: false,
            port: None,
            dns_servers: Vec::new(),
            tls_version: TlsVersion::default(),
            insecure: false,
            connect_timeout_seconds: None,
            read_timeout_seconds: None,
            max_content_bytes: default_max_content(),
            user_agent: default_user_agent(),
            output_format: OutputFormat::default(),
            enable_color: default_enable_color(),
        }
    }
}

impl ProbeConfig {
    /// Create a configuration for `url` with default values
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Send timeout as Duration
    pub fn wait_time(&self) -> Duration {
        Duration::from_secs(self.wait_time_seconds)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_seconds.map(Duration::from_secs)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_seconds.map(Duration::from_secs)
    }

    /// Which resolver the probe should use
    pub fn dns_config(&self) -> Result<DnsConfig> {
        if self.dns_servers.is_empty() {
            return Ok(DnsConfig::System);
        }
        let servers = self
            .dns_servers
            .iter()
            .map(|s| {
                IpAddr::from_str(s)
                    .map_err(|e| AppError::config(format!("Invalid DNS server '{}': {}", s, e)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(DnsConfig::Custom { servers })
    }

    /// Validate the configuration and return the first problem found
    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(AppError::config("Target URL cannot be empty"));
        }

        if self.wait_time_seconds == 0 {
            return Err(AppError::config("Wait time must be greater than 0"));
        }
        if self.wait_time_seconds > MAX_TIMEOUT_SECS {
            return Err(AppError::config(format!("Wait time cannot exceed {} seconds", MAX_TIMEOUT_SECS)));
        }

        for (name, value) in [
            ("Connect timeout", self.connect_timeout_seconds),
            ("Read timeout", self.read_timeout_seconds),
        ] {
            match value {
                Some(0) => return Err(AppError::config(format!("{} must be greater than 0", name))),
                Some(secs) if secs > MAX_TIMEOUT_SECS => {
                    return Err(AppError::config(format!(
                        "{} cannot exceed {} seconds",
                        name, MAX_TIMEOUT_SECS
                    )))
                }
                _ => {}
            }
        }

        if self.port == Some(0) {
            return Err(AppError::config("Port must be between 1 and 65535"));
        }

        if self.max_content_bytes < defaults::STATUS_PROBE_LEN {
            return Err(AppError::config(format!(
                "Content limit must be at least {} bytes",
                defaults::STATUS_PROBE_LEN
            )));
        }
        if self.max_content_bytes > MAX_CONTENT_LIMIT {
            return Err(AppError::config(format!(
                "Content limit cannot exceed {} bytes",
                MAX_CONTENT_LIMIT
            )));
        }

        if self.user_agent.trim().is_empty() {
            return Err(AppError::config("User agent cannot be empty"));
        }
        if self.user_agent.contains(|c| c == '\r' || c == '\n') {
            return Err(AppError::config("User agent cannot contain line breaks"));
        }

        self.dns_config()?;

        Ok(())
    }

    /// Apply `HTTPPROBE_*` environment variables on top of this configuration.
    /// Each value is checked by [`EnvManager::validate_env_var`] before use.
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Some(family) = env_var("HTTPPROBE_IP_FAMILY")? {
            self.ip_family = family.parse()?;
        }

        if let Some(wait) = env_var("HTTPPROBE_WAIT_TIME")? {
            self.wait_time_seconds = parse_env("HTTPPROBE_WAIT_TIME", &wait)?;
        }

        if let Some(check) = env_var("HTTPPROBE_CHECK_STRING")? {
            self.check_string = check;
        }

        if let Some(port) = env_var("HTTPPROBE_PORT")? {
            self.port = Some(parse_env("HTTPPROBE_PORT", &port)?);
        }

        if let Some(servers) = env_var("HTTPPROBE_DNS_SERVERS")? {
            self.dns_servers = servers
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Some(version) = env_var("HTTPPROBE_TLS_VERSION")? {
            self.tls_version = version.parse()?;
        }

        if let Some(insecure) = env_var("HTTPPROBE_INSECURE")? {
            self.insecure = parse_env("HTTPPROBE_INSECURE", &insecure)?;
        }

        if let Some(timeout) = env_var("HTTPPROBE_CONNECT_TIMEOUT")? {
            self.connect_timeout_seconds = Some(parse_env("HTTPPROBE_CONNECT_TIMEOUT", &timeout)?);
        }

        if let Some(timeout) = env_var("HTTPPROBE_READ_TIMEOUT")? {
            self.read_timeout_seconds = Some(parse_env("HTTPPROBE_READ_TIMEOUT", &timeout)?);
        }

        if let Some(limit) = env_var("HTTPPROBE_MAX_CONTENT")? {
            self.max_content_bytes = parse_env("HTTPPROBE_MAX_CONTENT", &limit)?;
        }

        if let Some(user_agent) = env_var("HTTPPROBE_USER_AGENT")? {
            self.user_agent = user_agent;
        }

        if let Some(format) = env_var("HTTPPROBE_FORMAT")? {
            self.output_format = format.parse()?;
        }

        Ok(())
    }
}

/// Read and validate one environment variable; `None` when unset
fn env_var(key: &str) -> Result<Option<String>> {
    match std::env::var(key) {
        Ok(value) => {
            EnvManager::validate_env_var(key, &value)?;
            Ok(Some(value))
        }
        Err(_) => Ok(None),
    }
}

fn parse_env<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))
}

fn default_wait_time() -> u64 {
    defaults::DEFAULT_WAIT_TIME.as_secs()
}

fn default_max_content() -> usize {
    defaults::DEFAULT_MAX_CONTENT
}

fn default_user_agent() -> String {
    defaults::DEFAULT_USER_AGENT.to_string()
}

fn default_enable_color() -> bool {
    defaults::DEFAULT_ENABLE_COLOR
}
