//! Byte stream to the server, plaintext or TLS

use super::connector::Connection;
use crate::{
    error::{AppError, Result},
    timing::Stopwatch,
};
use rustls::{ClientConfig, ClientConnection, StreamOwned};
use std::{
    io::{self, Read, Write},
    net::TcpStream,
    sync::Arc,
    time::Duration,
};

/// Lifecycle of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Closed,
    Connected,
    Handshaking,
    Established,
}

/// The stream the request is written to and the response read from
pub enum Transport {
    Plain(TcpStream),
    Tls(Box<StreamOwned<ClientConnection, TcpStream>>),
}

impl Transport {
    pub fn is_tls(&self) -> bool {
        matches!(self, Transport::Tls(_))
    }

    /// Negotiated protocol version, TLS only
    pub fn protocol_version(&self) -> Option<rustls::ProtocolVersion> {
        match self {
            Transport::Plain(_) => None,
            Transport::Tls(stream) => stream.conn.protocol_version(),
        }
    }
}

impl Read for Transport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Transport::Plain(stream) => stream.read(buf),
            Transport::Tls(stream) => stream.read(buf),
        }
    }
}

impl Write for Transport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Transport::Plain(stream) => stream.write(buf),
            Transport::Tls(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Transport::Plain(stream) => stream.flush(),
            Transport::Tls(stream) => stream.flush(),
        }
    }
}

/// How to turn a TCP connection into a transport
pub struct TransportSetup<'a> {
    /// TLS configuration and server name when the target is https
    pub tls: Option<(Arc<ClientConfig>, &'a str)>,
    pub read_timeout: Option<Duration>,
}

/// A transport ready for the request plus the handshake time, if any
pub struct Established {
    pub transport: Transport,
    pub state: ConnectionState,
    pub handshake: Option<Duration>,
}

/// Wrap the connection and, for TLS, drive the handshake to completion
pub fn establish(connection: Connection, setup: TransportSetup<'_>) -> Result<Established> {
    let Connection { stream, .. } = connection;
    stream.set_read_timeout(setup.read_timeout)?;

    let Some((config, host)) = setup.tls else {
        return Ok(Established {
            transport: Transport::Plain(stream),
            state: ConnectionState::Established,
            handshake: None,
        });
    };

    let server_name = super::tls::server_name(host)?;
    let conn = ClientConnection::new(config, server_name)
        .map_err(|e| AppError::tls(format!("Can't create TLS session: {}", e)))?;
    let mut tls = StreamOwned::new(conn, stream);

    let mut watch = Stopwatch::start();
    while tls.conn.is_handshaking() {
        tls.conn
            .complete_io(&mut tls.sock)
            .map_err(|e| AppError::tls(format!("TLS handshake failed: {}", e)))?;
    }
    let handshake = watch.lap();

    Ok(Established {
        transport: Transport::Tls(Box::new(tls)),
        state: ConnectionState::Established,
        handshake: Some(handshake),
    })
}
