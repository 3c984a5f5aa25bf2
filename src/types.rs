//! Type definitions and aliases

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Address family of a resolved candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressFamily {
    V4,
    V6,
}

impl AddressFamily {
    /// Family of a socket address
    pub fn of(addr: &SocketAddr) -> Self {
        match addr {
            SocketAddr::V4(_) => Self::V4,
            SocketAddr::V6(_) => Self::V6,
        }
    }
}

/// Which address families the connector may try
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpFamily {
    /// Both families, in resolver order
    #[default]
    Any,
    /// Skip every IPv6 candidate
    Ipv4,
    /// Skip every IPv4 candidate
    Ipv6,
}

impl IpFamily {
    /// Build the filter from the two force flags
    pub fn from_flags(force_ipv4: bool, force_ipv6: bool) -> Result<Self> {
        match (force_ipv4, force_ipv6) {
            (true, true) => Err(AppError::config("IPv4 and IPv6 cannot both be forced")),
            (true, false) => Ok(Self::Ipv4),
            (false, true) => Ok(Self::Ipv6),
            (false, false) => Ok(Self::Any),
        }
    }

    /// Whether a candidate of `family` is eligible under this filter
    pub fn allows(&self, family: AddressFamily) -> bool {
        match self {
            Self::Any => true,
            Self::Ipv4 => family == AddressFamily::V4,
            Self::Ipv6 => family == AddressFamily::V6,
        }
    }
}

impl FromStr for IpFamily {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "any" | "" => Ok(Self::Any),
            "4" | "ipv4" | "v4" => Ok(Self::Ipv4),
            "6" | "ipv6" | "v6" => Ok(Self::Ipv6),
            _ => Err(AppError::config(format!("Invalid IP family: {}", s))),
        }
    }
}

/// The single TLS protocol version a session is pinned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TlsVersion {
    #[default]
    #[serde(rename = "1.2")]
    Tls12,
    #[serde(rename = "1.3")]
    Tls13,
}

impl FromStr for TlsVersion {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().trim_start_matches("tlsv").trim_start_matches("tls") {
            "1.2" | "12" => Ok(Self::Tls12),
            "1.3" | "13" => Ok(Self::Tls13),
            _ => Err(AppError::config(format!("Unsupported TLS version: {} (expected 1.2 or 1.3)", s))),
        }
    }
}

impl fmt::Display for TlsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tls12 => write!(f, "TLSv1.2"),
            Self::Tls13 => write!(f, "TLSv1.3"),
        }
    }
}

/// DNS configuration variants supported by the probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DnsConfig {
    /// Use the platform's name-resolution facility
    System,
    /// Query the given name servers directly
    Custom { servers: Vec<IpAddr> },
}

impl DnsConfig {
    /// Get a human-readable name for this DNS configuration
    pub fn name(&self) -> String {
        match self {
            DnsConfig::System => "system".to_string(),
            DnsConfig::Custom { servers } => {
                let list: Vec<String> = servers.iter().map(|s| s.to_string()).collect();
                format!("custom ({})", list.join(", "))
            }
        }
    }
}

/// How the final report is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One line of five numbers
    #[default]
    Line,
    /// One JSON object
    Json,
}

impl FromStr for OutputFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "line" | "plain" => Ok(Self::Line),
            "json" => Ok(Self::Json),
            _ => Err(AppError::config(format!("Invalid output format: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_filter() {
        assert!(IpFamily::Any.allows(AddressFamily::V4));
        assert!(IpFamily::Any.allows(AddressFamily::V6));
        assert!(IpFamily::Ipv4.allows(AddressFamily::V4));
        assert!(!IpFamily::Ipv4.allows(AddressFamily::V6));
        assert!(!IpFamily::Ipv6.allows(AddressFamily::V4));
    }

    #[test]
    fn test_family_from_flags() {
        assert_eq!(IpFamily::from_flags(false, false).unwrap(), IpFamily::Any);
        assert_eq!(IpFamily::from_flags(true, false).unwrap(), IpFamily::Ipv4);
        assert_eq!(IpFamily::from_flags(false, true).unwrap(), IpFamily::Ipv6);
        assert!(IpFamily::from_flags(true, true).is_err());
    }

    #[test]
    fn test_address_family_of() {
        let v4: SocketAddr = "127.0.0.1:80".parse().unwrap();
        let v6: SocketAddr = "[::1]:443".parse().unwrap();
        assert_eq!(AddressFamily::of(&v4), AddressFamily::V4);
        assert_eq!(AddressFamily::of(&v6), AddressFamily::V6);
    }

    #[test]
    fn test_tls_version_parsing() {
        assert_eq!("1.2".parse::<TlsVersion>().unwrap(), TlsVersion::Tls12);
        assert_eq!("TLSv1.3".parse::<TlsVersion>().unwrap(), TlsVersion::Tls13);
        assert_eq!("tls1.2".parse::<TlsVersion>().unwrap(), TlsVersion::Tls12);
        assert!("1.1".parse::<TlsVersion>().is_err());
        assert_eq!(TlsVersion::default(), TlsVersion::Tls12);
        assert_eq!(TlsVersion::Tls13.to_string(), "TLSv1.3");
    }

    #[test]
    fn test_dns_config_name() {
        assert_eq!(DnsConfig::System.name(), "system");
        let custom = DnsConfig::Custom { servers: vec!["1.1.1.1".parse().unwrap()] };
        assert_eq!(custom.name(), "custom (1.1.1.1)");
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("LINE".parse::<OutputFormat>().unwrap(), OutputFormat::Line);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
