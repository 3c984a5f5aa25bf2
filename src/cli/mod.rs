//! Command-line interface

use crate::types::{IpFamily, OutputFormat, Result, TlsVersion};
use clap::{ArgAction, Parser};

/// Measure DNS, connect, first-byte and transfer time of one HTTP(S) GET
#[derive(Parser, Debug, Clone)]
#[command(name = "httpprobe")]
#[command(version, long_version = crate::LONG_VERSION, about, long_about = None)]
pub struct Cli {
    /// Target URL (http:// or https://)
    pub url: String,

    /// Enable debug output on stderr
    #[arg(short, long)]
    pub debug: bool,

    /// Use IPv4 addresses only
    #[arg(short = '4', long = "ipv4", conflicts_with = "ipv6")]
    pub ipv4: bool,

    /// Use IPv6 addresses only
    #[arg(short = '6', long = "ipv6")]
    pub ipv6: bool,

    /// Print the received content before the report
    #[arg(short, long = "print")]
    pub print_content: bool,

    /// Send timeout in seconds
    #[arg(short, long = "wait", value_name = "SECONDS", value_parser = parse_duration)]
    pub wait_time: Option<u64>,

    /// Fail unless the response contains this string
    #[arg(short = 'r', long = "check", value_name = "STRING")]
    pub check_string: Option<String>,

    /// Connect to this port instead of the scheme default
    #[arg(long)]
    pub port: Option<u16>,

    /// Resolve through this name server (can be used multiple times)
    #[arg(long = "dns-server", value_name = "IP", action = ArgAction::Append)]
    pub dns_servers: Vec<String>,

    /// TLS protocol version for https targets (1.2 or 1.3)
    #[arg(long, value_name = "VERSION", value_parser = parse_tls_version)]
    pub tls_version: Option<TlsVersion>,

    /// Skip server certificate verification
    #[arg(short = 'k', long)]
    pub insecure: bool,

    /// Connect timeout per address, in seconds
    #[arg(long, value_name = "SECONDS", value_parser = parse_duration)]
    pub connect_timeout: Option<u64>,

    /// Read timeout, in seconds
    #[arg(long, value_name = "SECONDS", value_parser = parse_duration)]
    pub read_timeout: Option<u64>,

    /// Maximum number of response bytes to read
    #[arg(long = "max-content", value_name = "BYTES")]
    pub max_content: Option<usize>,

    /// User-Agent header value
    #[arg(long, value_name = "AGENT")]
    pub user_agent: Option<String>,

    /// Report format (line or json)
    #[arg(long, value_name = "FORMAT", value_parser = parse_output_format)]
    pub format: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Address family selected by `-4` / `-6`
    pub fn ip_family(&self) -> Result<Option<IpFamily>> {
        if !self.ipv4 && !self.ipv6 {
            return Ok(None);
        }
        IpFamily::from_flags(self.ipv4, self.ipv6).map(Some)
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        !self.no_color && supports_color()
    }
}

/// Parse duration from seconds string
fn parse_duration(s: &str) -> std::result::Result<u64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid duration: {}", s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid duration: {}", s))
        .and_then(|secs| {
            if secs == 0 {
                Err("Duration must be greater than 0".to_string())
            } else if secs > 300 {
                Err("Duration cannot exceed 300 seconds".to_string())
            } else {
                Ok(secs)
            }
        })
}

fn parse_tls_version(s: &str) -> std::result::Result<TlsVersion, String> {
    s.parse().map_err(|e: crate::AppError| e.to_string())
}

fn parse_output_format(s: &str) -> std::result::Result<OutputFormat, String> {
    s.parse().map_err(|e: crate::AppError| e.to_string())
}

/// Check if the terminal supports color output
pub fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    // Default to true on Unix-like systems, false on Windows
    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_basic() {
        let cli = Cli::parse_from(["httpprobe", "http://example.com/"]);
        assert_eq!(cli.url, "http://example.com/");
        assert!(!cli.debug);
        assert!(!cli.print_content);
        assert!(cli.wait_time.is_none());
        assert!(cli.check_string.is_none());
        assert_eq!(cli.ip_family().unwrap(), None);
    }

    #[test]
    fn test_cli_parsing_short_flags() {
        let cli = Cli::parse_from([
            "httpprobe", "-d", "-4", "-p", "-w", "10", "-r", "Welcome", "-k",
            "https://example.com/index.html",
        ]);

        assert!(cli.debug);
        assert!(cli.print_content);
        assert!(cli.insecure);
        assert_eq!(cli.wait_time, Some(10));
        assert_eq!(cli.check_string.as_deref(), Some("Welcome"));
        assert_eq!(cli.ip_family().unwrap(), Some(IpFamily::Ipv4));
    }

    #[test]
    fn test_cli_parsing_long_options() {
        let cli = Cli::parse_from([
            "httpprobe",
            "--port", "8443",
            "--dns-server", "1.1.1.1",
            "--dns-server", "8.8.8.8",
            "--tls-version", "1.3",
            "--connect-timeout", "3",
            "--read-timeout", "7",
            "--max-content", "1024",
            "--user-agent", "probe/1.0",
            "--format", "json",
            "--no-color",
            "https://example.com/",
        ]);

        assert_eq!(cli.port, Some(8443));
        assert_eq!(cli.dns_servers, vec!["1.1.1.1", "8.8.8.8"]);
        assert_eq!(cli.tls_version, Some(TlsVersion::Tls13));
        assert_eq!(cli.connect_timeout, Some(3));
        assert_eq!(cli.read_timeout, Some(7));
        assert_eq!(cli.max_content, Some(1024));
        assert_eq!(cli.user_agent.as_deref(), Some("probe/1.0"));
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert!(!cli.use_colors());
    }

    #[test]
    fn test_ipv4_and_ipv6_conflict() {
        let result = Cli::try_parse_from(["httpprobe", "-4", "-6", "http://example.com/"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_url_is_required() {
        assert!(Cli::try_parse_from(["httpprobe", "-d"]).is_err());
    }

    #[test]
    fn test_invalid_tls_version_rejected() {
        let result = Cli::try_parse_from(["httpprobe", "--tls-version", "1.1", "https://example.com/"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_duration_parsing() {
        assert_eq!(parse_duration("5").unwrap(), 5);
        assert_eq!(parse_duration("300").unwrap(), 300);
        assert!(parse_duration("0").is_err());
        assert!(parse_duration("301").is_err());
        assert!(parse_duration("abc").is_err());
        assert!(parse_duration("+5").is_err());
        assert!(parse_duration("-5").is_err());
    }
}
