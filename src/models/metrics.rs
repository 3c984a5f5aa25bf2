//! Timing metrics and probe report data models

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Below this, a duration prints as `0.0000` and is treated as zero.
const ZERO_ROUNDING_SECS: f64 = 0.00005;

/// Phase-local timings of one probe; each value is the time since the
/// previous phase boundary, not since the probe started
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Timings {
    /// Name resolution
    pub dns: Duration,

    /// TCP connect, across every candidate tried
    pub connect: Duration,

    /// Handshake (if HTTPS), request write and the first response read
    pub first_byte: Duration,

    /// Remainder of the response after the first read
    pub total: Duration,

    /// TLS handshake alone; already contained in `first_byte`
    pub tls_handshake: Option<Duration>,
}

impl Timings {
    pub fn dns_secs(&self) -> f64 {
        self.dns.as_secs_f64()
    }

    pub fn connect_secs(&self) -> f64 {
        self.connect.as_secs_f64()
    }

    pub fn first_byte_secs(&self) -> f64 {
        self.first_byte.as_secs_f64()
    }

    pub fn total_secs(&self) -> f64 {
        self.total.as_secs_f64()
    }
}

/// Bytes per second over the body-read phase. A phase that rounds to zero
/// reports the content length itself rather than dividing by zero.
pub fn transfer_rate(content_length: usize, total: Duration) -> f64 {
    let secs = total.as_secs_f64();
    if secs < ZERO_ROUNDING_SECS {
        content_length as f64
    } else {
        content_length as f64 / secs
    }
}

/// Outcome of a successful probe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeReport {
    /// Target URL as probed
    pub url: String,

    /// Address the connection was established to
    pub peer: SocketAddr,

    /// Phase timings
    pub timings: Timings,

    /// Bytes read, status line and headers included
    pub content_length: usize,

    /// Whether reading stopped because the buffer was full
    pub truncated: bool,

    /// Raw response bytes; only rendered with content printing
    #[serde(skip)]
    pub content: Vec<u8>,
}

impl ProbeReport {
    /// Transfer rate in bytes per second
    pub fn transfer_rate(&self) -> f64 {
        transfer_rate(self.content_length, self.timings.total)
    }
}
