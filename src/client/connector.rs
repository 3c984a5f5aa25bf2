//! TCP connection to the first reachable candidate

use crate::{
    dns::Candidate,
    error::{AppError, Result},
    logging::NetworkLogger,
    types::IpFamily,
};
use std::{
    net::{SocketAddr, TcpStream},
    time::Duration,
};

/// Socket options applied to the connected stream
#[derive(Debug, Clone, Copy)]
pub struct ConnectOptions {
    /// Family filter; `Any` tries every candidate
    pub family: IpFamily,
    /// Send timeout set on the chosen socket
    pub wait_time: Duration,
    /// Deadline for each connect attempt; OS default when `None`
    pub connect_timeout: Option<Duration>,
}

/// An established TCP stream and the address it reached
#[derive(Debug)]
pub struct Connection {
    pub stream: TcpStream,
    pub peer: SocketAddr,
}

/// Try candidates in order; the first that connects wins and ends the
/// search. Filtered candidates are skipped and failed sockets are dropped
/// before moving on. Socket options are applied only to the winner, and a
/// failure there fails the probe rather than trying the next address.
pub fn connect(candidates: &[Candidate], options: &ConnectOptions, log: &NetworkLogger) -> Result<Connection> {
    let mut last_error = None;
    let mut attempted = 0usize;

    for candidate in candidates {
        if !options.family.allows(candidate.family()) {
            log.log_skipped(&candidate.addr);
            continue;
        }

        attempted += 1;
        match attempt(&candidate.addr, options) {
            Ok(stream) => {
                log.log_connection(&candidate.addr, true, None);
                configure(&stream, options).map_err(|e| {
                    AppError::connect(format!("Can't set socket options on {}: {}", candidate.addr, e))
                })?;
                return Ok(Connection {
                    stream,
                    peer: candidate.addr,
                });
            }
            Err(e) => {
                log.log_connection(&candidate.addr, false, Some(&e.to_string()));
                last_error = Some(format!("{}: {}", candidate.addr, e));
            }
        }
    }

    Err(match last_error {
        Some(detail) => AppError::connect(format!("Can't connect to any address ({})", detail)),
        None if attempted == 0 && !candidates.is_empty() => AppError::connect(format!(
            "No address matches the {:?} filter",
            options.family
        )),
        None => AppError::connect("No addresses to connect to"),
    })
}

fn attempt(addr: &SocketAddr, options: &ConnectOptions) -> std::io::Result<TcpStream> {
    match options.connect_timeout {
        Some(timeout) => TcpStream::connect_timeout(addr, timeout),
        None => TcpStream::connect(addr),
    }
}

// std has no unconnected TcpStream, so the send timeout lands after connect.
fn configure(stream: &TcpStream, options: &ConnectOptions) -> std::io::Result<()> {
    stream.set_write_timeout(Some(options.wait_time))?;
    stream.set_nodelay(true)
}
