//! Error handling for the HTTP probe
//!
//! Every pipeline stage returns [`Result`]; the first failure travels up with
//! `?` to `main`, which is the only place that turns it into an exit code.

use thiserror::Error;

/// Fatal error kinds of a probe run
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid options, environment values or `.env` contents
    #[error("Configuration error: {0}")]
    Config(String),

    /// URL does not start with `http://` or `https://`
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    /// URL could not be decomposed (e.g. unterminated IPv6 literal)
    #[error("Malformed URL: {0}")]
    MalformedUrl(String),

    /// Name resolution failed or returned no addresses
    #[error("DNS resolution error: {0}")]
    Resolution(String),

    /// No candidate address accepted a TCP connection
    #[error("Connect error: {0}")]
    Connect(String),

    /// TLS context setup or handshake failed
    #[error("TLS error: {0}")]
    Tls(String),

    /// Sending the request failed
    #[error("Write error: {0}")]
    Write(String),

    /// The server closed the connection without sending anything
    #[error("Empty response: {0}")]
    EmptyResponse(String),

    /// The status line is not a 200
    #[error("Unexpected status: {0}")]
    Status(String),

    /// The configured check string is not in the response
    #[error("Check string not found: {0}")]
    CheckFailed(String),

    /// I/O errors outside the probe pipeline (stdout, files)
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new unsupported scheme error
    pub fn unsupported_scheme<S: Into<String>>(message: S) -> Self {
        Self::UnsupportedScheme(message.into())
    }

    /// Create a new malformed URL error
    pub fn malformed_url<S: Into<String>>(message: S) -> Self {
        Self::MalformedUrl(message.into())
    }

    /// Create a new DNS resolution error
    pub fn resolution<S: Into<String>>(message: S) -> Self {
        Self::Resolution(message.into())
    }

    /// Create a new connect error
    pub fn connect<S: Into<String>>(message: S) -> Self {
        Self::Connect(message.into())
    }

    /// Create a new TLS error
    pub fn tls<S: Into<String>>(message: S) -> Self {
        Self::Tls(message.into())
    }

    /// Create a new write error
    pub fn write<S: Into<String>>(message: S) -> Self {
        Self::Write(message.into())
    }

    /// Create a new empty response error
    pub fn empty_response<S: Into<String>>(message: S) -> Self {
        Self::EmptyResponse(message.into())
    }

    /// Create a new status error
    pub fn status<S: Into<String>>(message: S) -> Self {
        Self::Status(message.into())
    }

    /// Create a new check string error
    pub fn check_failed<S: Into<String>>(message: S) -> Self {
        Self::CheckFailed(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::UnsupportedScheme(_) => "SCHEME",
            Self::MalformedUrl(_) => "URL",
            Self::Resolution(_) => "DNS",
            Self::Connect(_) => "CONNECT",
            Self::Tls(_) => "TLS",
            Self::Write(_) => "WRITE",
            Self::EmptyResponse(_) => "EMPTY",
            Self::Status(_) => "STATUS",
            Self::CheckFailed(_) => "CHECK",
            Self::Io(_) => "IO",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::UnsupportedScheme(_) | Self::MalformedUrl(_) => 1,
            Self::Resolution(_) => 2,
            Self::Connect(_) => 3,
            Self::Tls(_) => 4,
            Self::Write(_) => 5,
            Self::EmptyResponse(_) => 6,
            Self::Status(_) => 7,
            Self::CheckFailed(_) => 8,
            Self::Io(_) => 9,
            Self::Internal(_) => 99,
        }
    }

    /// Short hint printed under `--debug`
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::Config(_) => "Check the command line arguments and any HTTPPROBE_* variables or .env file.",
            Self::UnsupportedScheme(_) => "Only URLs starting with http:// or https:// (lowercase) are supported.",
            Self::MalformedUrl(_) => "IPv6 hosts must be written in brackets, e.g. http://[::1]/path.",
            Self::Resolution(_) => "Check that the host name exists, or try --dns-server 8.8.8.8.",
            Self::Connect(_) => "The host did not accept a TCP connection; check -4/-6, --port and firewalls.",
            Self::Tls(_) => "Try --tls-version 1.3, or --insecure for self-signed certificates.",
            Self::Write(_) => "The connection was reset while sending; raise -w if the peer is slow.",
            Self::EmptyResponse(_) => "The server closed the connection without answering.",
            Self::Status(_) => "Only a 200 response counts as success; run with -p to see the reply.",
            Self::CheckFailed(_) => "Run with -p to inspect the response content.",
            Self::Io(_) => "Check that stdout is writable.",
            Self::Internal(_) => "This is likely a bug. Please report it with the error details.",
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::UnsupportedScheme(_) | Self::MalformedUrl(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::Resolution(_) | Self::Connect(_) | Self::Tls(_) | Self::Write(_) => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::EmptyResponse(_) | Self::Status(_) | Self::CheckFailed(_) => {
                    format!("[{}] {}", category.magenta().bold(), message.magenta())
                }
                Self::Io(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

// Standard library error conversions
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::config(format!("Integer parse error: {}", error))
    }
}

impl From<std::net::AddrParseError> for AppError {
    fn from(error: std::net::AddrParseError) -> Self {
        Self::config(format!("IP address parse error: {}", error))
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

impl From<rustls::Error> for AppError {
    fn from(error: rustls::Error) -> Self {
        Self::tls(error.to_string())
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Error reporter for user feedback on stderr
pub struct ErrorReporter {
    pub use_color: bool,
    pub verbose: bool,
}

impl ErrorReporter {
    /// Create a new error reporter
    pub fn new(use_color: bool, verbose: bool) -> Self {
        Self { use_color, verbose }
    }

    /// Render an error the way [`ErrorReporter::report_error`] prints it
    pub fn render(&self, error: &AppError) -> String {
        let mut out = error.format_for_console(self.use_color);
        if self.verbose {
            out.push_str("\n\nSuggestion: ");
            out.push_str(error.suggestion());
        }
        out
    }

    /// Report an error to the user
    pub fn report_error(&self, error: &AppError) {
        eprintln!("{}", self.render(error));
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}
