//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env from the current directory if it exists
    pub fn load_env_file(debug: bool) -> Result<()> {
        Self::load_from_path(Path::new(".env"), debug).map(|_| ())
    }

    /// Load an env file; returns whether one was found. Variables already set
    /// in the process environment win over the file.
    pub fn load_from_path(path: &Path, debug: bool) -> Result<bool> {
        if !path.exists() {
            if debug {
                eprintln!("No {} file found, using defaults and CLI arguments", path.display());
            }
            return Ok(false);
        }

        dotenv::from_path(path)
            .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;

        if debug {
            eprintln!("Loaded configuration from {}", path.display());
        }
        Ok(true)
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        match key {
            "HTTPPROBE_WAIT_TIME" | "HTTPPROBE_CONNECT_TIMEOUT" | "HTTPPROBE_READ_TIMEOUT" => {
                let secs: u64 = value.trim().parse()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
                if secs == 0 || secs > 300 {
                    return Err(AppError::config(format!("{} must be between 1 and 300, got: {}", key, secs)));
                }
            }
            "HTTPPROBE_PORT" => {
                let port: u16 = value.trim().parse()
                    .map_err(|e| AppError::config(format!("Invalid HTTPPROBE_PORT value '{}': {}", value, e)))?;
                if port == 0 {
                    return Err(AppError::config("HTTPPROBE_PORT must be between 1 and 65535"));
                }
            }
            "HTTPPROBE_DNS_SERVERS" => {
                for server in value.split(',') {
                    let server = server.trim();
                    if !server.is_empty() {
                        server.parse::<std::net::IpAddr>()
                            .map_err(|e| AppError::config(format!("Invalid HTTPPROBE_DNS_SERVERS entry '{}': {}", server, e)))?;
                    }
                }
            }
            "HTTPPROBE_INSECURE" => {
                value.trim().parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid HTTPPROBE_INSECURE value '{}': {}", value, e)))?;
            }
            "HTTPPROBE_MAX_CONTENT" => {
                value.trim().parse::<usize>()
                    .map_err(|e| AppError::config(format!("Invalid HTTPPROBE_MAX_CONTENT value '{}': {}", value, e)))?;
            }
            _ => {
                // Unknown environment variable, ignore
            }
        }

        Ok(())
    }

    /// Supported environment variables with descriptions
    pub fn supported_env_vars() -> Vec<(&'static str, &'static str)> {
        vec![
            ("HTTPPROBE_IP_FAMILY", "Address family: any, ipv4 or ipv6"),
            ("HTTPPROBE_WAIT_TIME", "Send timeout in seconds (1-300)"),
            ("HTTPPROBE_CHECK_STRING", "Substring the response must contain"),
            ("HTTPPROBE_PORT", "Port override for the target"),
            ("HTTPPROBE_DNS_SERVERS", "Comma-separated name server IPs"),
            ("HTTPPROBE_TLS_VERSION", "TLS version: 1.2 or 1.3"),
            ("HTTPPROBE_INSECURE", "Skip certificate verification (true/false)"),
            ("HTTPPROBE_CONNECT_TIMEOUT", "Per-attempt connect timeout in seconds"),
            ("HTTPPROBE_READ_TIMEOUT", "Per-read timeout in seconds"),
            ("HTTPPROBE_MAX_CONTENT", "Response buffer capacity in bytes"),
            ("HTTPPROBE_USER_AGENT", "User-Agent header value"),
            ("HTTPPROBE_FORMAT", "Report format: line or json"),
            ("HTTPPROBE_LOG_FORMAT", "Debug log format: console, json or compact"),
        ]
    }
}
