//! Probe pipeline
//!
//! One probe walks `Idle → Resolving → Connecting → (Handshaking) →
//! Requesting → ReadingHeader → ReadingBody → Validating` and ends in `Done`
//! or `Failed`. The first error ends the run and nothing is reported. Every
//! phase boundary is a stopwatch lap, so each timing only covers its own
//! phase.

pub mod validator;

use crate::{
    client::{
        self, connect, establish, tls, ConnectOptions, ConnectionState, ResponseBuffer, TransportSetup,
    },
    dns::{self, NameResolver},
    error::{AppError, Result},
    logging::{Logger, NetworkLogger},
    models::{ProbeConfig, ProbeReport, Timings},
    target::Target,
    timing::Stopwatch,
};
use serde::Serialize;

/// Where a probe is in its pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProbeState {
    Idle,
    Resolving,
    Connecting,
    Handshaking,
    Requesting,
    ReadingHeader,
    ReadingBody,
    Validating,
    Done,
    Failed,
}

/// Context threaded through the stages of one probe
pub struct ProbeSession {
    config: ProbeConfig,
    stopwatch: Stopwatch,
    logger: Logger,
    state: ProbeState,
    connection: ConnectionState,
    timings: Timings,
}

impl ProbeSession {
    /// Session logging as the configuration asks
    pub fn new(config: ProbeConfig) -> Self {
        let logger = Logger::with_config("PROBE", &config);
        Self::with_logger(config, logger)
    }

    pub fn with_logger(config: ProbeConfig, logger: Logger) -> Self {
        Self {
            config,
            stopwatch: Stopwatch::start(),
            logger,
            state: ProbeState::Idle,
            connection: ConnectionState::Closed,
            timings: Timings::default(),
        }
    }

    pub fn state(&self) -> ProbeState {
        self.state
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Run the probe with the resolver the configuration selects
    pub fn run(&mut self) -> Result<ProbeReport> {
        let resolver = match self.config.dns_config().and_then(|c| dns::resolver_for(&c)) {
            Ok(resolver) => resolver,
            Err(e) => return self.finish(Err(e)),
        };
        self.run_with(resolver.as_ref())
    }

    /// Run the probe against an explicit resolver
    pub fn run_with(&mut self, resolver: &dyn NameResolver) -> Result<ProbeReport> {
        if self.state != ProbeState::Idle {
            return Err(AppError::internal("A probe session runs only once"));
        }
        let result = self.execute(resolver);
        self.finish(result)
    }

    fn finish(&mut self, result: Result<ProbeReport>) -> Result<ProbeReport> {
        self.connection = ConnectionState::Closed;
        match &result {
            Ok(report) => {
                self.transition(ProbeState::Done);
                self.logger
                    .debug("Probe finished")
                    .timing(&report.timings)
                    .field("content_length", report.content_length)
                    .field("truncated", report.truncated)
                    .log();
            }
            Err(e) => {
                self.transition(ProbeState::Failed);
                self.logger.debug(&format!("Probe failed: {}", e)).error_info(e).log();
            }
        }
        result
    }

    fn transition(&mut self, next: ProbeState) {
        self.logger
            .trace(&format!("{:?} -> {:?}", self.state, next))
            .log();
        self.state = next;
    }

    fn execute(&mut self, resolver: &dyn NameResolver) -> Result<ProbeReport> {
        let target = Target::parse(&self.config.url)?;
        let port = self.config.port.unwrap_or_else(|| target.default_port());
        let tls_config = if target.is_tls() {
            Some(tls::client_config(self.config.tls_version, self.config.insecure)?)
        } else {
            None
        };
        let net = NetworkLogger::new(&self.logger);

        crate::log_debug!(self.logger, "Probing {} (host {}, port {}, path {})", target, target.host, port, target.path);

        self.stopwatch = Stopwatch::start();

        self.transition(ProbeState::Resolving);
        let candidates = dns::resolve(resolver, &target.host, port)?;
        self.timings.dns = self.stopwatch.lap();
        net.log_dns_resolution(&target.host, &resolver.name(), candidates.len(), self.timings.dns);

        self.transition(ProbeState::Connecting);
        let options = ConnectOptions {
            family: self.config.ip_family,
            wait_time: self.config.wait_time(),
            connect_timeout: self.config.connect_timeout(),
        };
        let connection = connect(&candidates, &options, &net)?;
        self.timings.connect = self.stopwatch.lap();
        self.connection = ConnectionState::Connected;
        let peer = connection.peer;

        if tls_config.is_some() {
            self.transition(ProbeState::Handshaking);
            self.connection = ConnectionState::Handshaking;
            crate::log_debug!(self.logger, "Starting {} handshake with {}", self.config.tls_version, peer);
        }
        let established = establish(
            connection,
            TransportSetup {
                tls: tls_config.map(|config| (config, target.host.as_str())),
                read_timeout: self.config.read_timeout(),
            },
        )?;
        self.connection = established.state;
        self.timings.tls_handshake = established.handshake;
        let mut transport = established.transport;
        if let (Some(version), Some(handshake)) = (transport.protocol_version(), established.handshake) {
            crate::log_debug!(self.logger, "Negotiated {:?} in {:.4}s", version, handshake.as_secs_f64());
        }

        self.transition(ProbeState::Requesting);
        let request = client::build_request(&target, &self.config.user_agent);
        let written = client::send_request(&mut transport, request.as_bytes())?;
        if written < request.len() {
            crate::log_warn!(self.logger, "Short write: {} of {} request bytes sent", written, request.len());
        }
        net.log_transfer("Sent", written);

        self.transition(ProbeState::ReadingHeader);
        let mut buffer = ResponseBuffer::with_capacity(self.config.max_content_bytes);
        client::read_status(&mut transport, &mut buffer)?;
        self.timings.first_byte = self.stopwatch.lap();

        self.transition(ProbeState::ReadingBody);
        let outcome = client::read_body(&mut transport, &mut buffer);
        self.timings.total = self.stopwatch.lap();
        drop(transport);
        self.connection = ConnectionState::Closed;
        net.log_transfer("Received", buffer.len());
        if outcome.truncated {
            crate::log_debug!(self.logger, "Response buffer full at {} bytes, stopped reading", buffer.len());
        }

        self.transition(ProbeState::Validating);
        validator::validate(buffer.as_bytes(), &self.config.check_string)?;
        if !self.config.check_string.is_empty() {
            crate::log_debug!(self.logger, "Found '{}' in response", self.config.check_string);
        }

        Ok(ProbeReport {
            url: self.config.url.clone(),
            peer,
            timings: self.timings,
            content_length: buffer.len(),
            truncated: outcome.truncated,
            content: buffer.into_bytes(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tls::test_server;
    use crate::dns::StaticResolver;
    use crate::types::{IpFamily, TlsVersion};
    use std::io::{Read, Write};
    use std::net::{IpAddr, Ipv4Addr, TcpListener};
    use std::thread::{self, JoinHandle};

    const HOST: &str = "probe.test";

    fn resolver() -> StaticResolver {
        StaticResolver::new().with_host(HOST, vec![IpAddr::V4(Ipv4Addr::LOCALHOST)])
    }

    /// Accept one connection, capture the request, answer with `response`
    fn serve_once(response: Vec<u8>) -> (u16, JoinHandle<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut request = vec![0u8; 4096];
            let n = socket.read(&mut request).unwrap();
            request.truncate(n);
            socket.write_all(&response).unwrap();
            request
        });
        (port, handle)
    }

    fn config_for(port: u16, path: &str) -> ProbeConfig {
        let mut config = ProbeConfig::new(format!("http://{}{}", HOST, path));
        config.port = Some(port);
        config
    }

    fn session(config: ProbeConfig) -> ProbeSession {
        ProbeSession::with_logger(config, Logger::quiet("TEST"))
    }

    #[test]
    fn test_successful_probe() {
        let response = b"HTTP/1.0 200 OK\r\nContent-Length: 5\r\n\r\nhello".to_vec();
        let length = response.len();
        let (port, server) = serve_once(response);

        let mut config = config_for(port, "/index.html");
        config.check_string = "hello".to_string();
        let mut session = session(config);
        let report = session.run_with(&resolver()).unwrap();

        assert_eq!(session.state(), ProbeState::Done);
        assert_eq!(session.connection_state(), ConnectionState::Closed);
        assert_eq!(report.content_length, length);
        assert!(!report.truncated);
        assert!(report.transfer_rate() > 0.0);
        assert!(report.timings.tls_handshake.is_none());
        assert_eq!(report.peer.port(), port);

        let request = String::from_utf8(server.join().unwrap()).unwrap();
        assert_eq!(
            request,
            "GET /index.html HTTP/1.0\r\nHost: probe.test\r\nUser-Agent: curl/7.29.0\r\nConnection: close\r\n\r\n"
        );
    }

    #[test]
    fn test_server_error_fails_probe() {
        let (port, server) = serve_once(b"HTTP/1.0 500 Internal Server Error\r\n\r\n".to_vec());
        let mut session = session(config_for(port, "/"));

        let err = session.run_with(&resolver()).unwrap_err();
        assert_eq!(err.exit_code(), 7);
        assert_eq!(session.state(), ProbeState::Failed);
        server.join().unwrap();
    }

    #[test]
    fn test_check_string_missing() {
        let (port, server) = serve_once(b"HTTP/1.0 200 OK\r\n\r\nhello".to_vec());
        let mut config = config_for(port, "/");
        config.check_string = "goodbye".to_string();

        let err = session(config).run_with(&resolver()).unwrap_err();
        assert_eq!(err.exit_code(), 8);
        server.join().unwrap();
    }

    #[test]
    fn test_empty_response() {
        let (port, server) = serve_once(Vec::new());
        let err = session(config_for(port, "/")).run_with(&resolver()).unwrap_err();
        assert_eq!(err.exit_code(), 6);
        server.join().unwrap();
    }

    #[test]
    fn test_endless_response_stops_at_capacity() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request);
            let _ = socket.write_all(b"HTTP/1.0 200 OK\r\n\r\n");
            let chunk = [b'x'; 8192];
            // Never closes on its own; stops once the client hangs up.
            while socket.write_all(&chunk).is_ok() {}
        });

        let mut config = config_for(port, "/");
        config.max_content_bytes = 64 * 1024;
        let report = session(config).run_with(&resolver()).unwrap();

        assert!(report.truncated);
        assert_eq!(report.content_length, 64 * 1024);
        server.join().unwrap();
    }

    #[test]
    fn test_family_filter_excludes_every_candidate() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let mut config = config_for(port, "/");
        config.ip_family = IpFamily::Ipv6;

        let mut session = session(config);
        let err = session.run_with(&resolver()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert_eq!(session.state(), ProbeState::Failed);
    }

    #[test]
    fn test_unknown_host() {
        let err = session(config_for(80, "/")).run_with(&StaticResolver::new()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_unsupported_scheme_fails_before_network() {
        let config = ProbeConfig::new("ftp://probe.test/");
        let mut session = session(config);
        let err = session.run_with(&resolver()).unwrap_err();
        assert_eq!(err.category(), "SCHEME");
        assert_eq!(session.state(), ProbeState::Failed);
    }

    #[test]
    fn test_tls_against_plaintext_server() {
        let (port, server) = serve_once(b"HTTP/1.0 400 Bad Request\r\n\r\n".to_vec());
        let mut config = ProbeConfig::new(format!("https://{}/", HOST));
        config.port = Some(port);
        config.insecure = true;
        config.read_timeout_seconds = Some(5);

        let err = session(config).run_with(&resolver()).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        server.join().unwrap();
    }

    fn https_config(port: u16) -> ProbeConfig {
        let mut config = ProbeConfig::new(format!("https://{}/secure", HOST));
        config.port = Some(port);
        config.insecure = true;
        config.read_timeout_seconds = Some(5);
        config
    }

    #[test]
    fn test_https_probe_over_tls12() {
        let response = b"HTTP/1.0 200 OK\r\nContent-Type: text/plain\r\n\r\nsecure hello".to_vec();
        let length = response.len();
        let (port, server) = test_server::serve_once(TlsVersion::Tls12, response);

        let mut config = https_config(port);
        config.check_string = "secure hello".to_string();
        let mut session = session(config);
        let report = session.run_with(&resolver()).unwrap();

        assert_eq!(session.state(), ProbeState::Done);
        assert_eq!(report.content_length, length);
        assert!(!report.truncated);
        assert!(report.timings.tls_handshake.is_some());

        let request = String::from_utf8(server.join().unwrap().unwrap()).unwrap();
        assert!(request.starts_with("GET /secure HTTP/1.0\r\nHost: probe.test\r\n"));
    }

    #[test]
    fn test_default_tls_pin_rejects_tls13_only_server() {
        let (port, server) = test_server::serve_once(TlsVersion::Tls13, b"HTTP/1.0 200 OK\r\n\r\n".to_vec());

        let mut session = session(https_config(port));
        let err = session.run_with(&resolver()).unwrap_err();

        assert_eq!(err.exit_code(), 4);
        assert_eq!(session.state(), ProbeState::Failed);
        assert!(server.join().unwrap().is_none());
    }

    #[test]
    fn test_session_runs_once() {
        let mut session = session(ProbeConfig::new("ftp://x/"));
        let _ = session.run_with(&resolver());
        let err = session.run_with(&resolver()).unwrap_err();
        assert_eq!(err.exit_code(), 99);
    }
}
