//! Name resolution into ordered connection candidates

use crate::{
    error::{AppError, Result},
    types::{AddressFamily, DnsConfig},
};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};
use trust_dns_resolver::{
    config::{LookupIpStrategy, NameServerConfig, Protocol, ResolverConfig, ResolverOpts},
    Resolver,
};

/// One address the connector may try
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub addr: SocketAddr,
}

impl Candidate {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }

    pub fn family(&self) -> AddressFamily {
        AddressFamily::of(&self.addr)
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

impl From<SocketAddr> for Candidate {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr)
    }
}

/// Turns a host name into addresses. Implementations must keep the order
/// the underlying facility returned.
pub trait NameResolver {
    /// Short label for logs
    fn name(&self) -> String;

    /// Resolve `host`; an empty result is allowed here and rejected by [`resolve`]
    fn lookup(&self, host: &str, port: u16) -> Result<Vec<SocketAddr>>;
}

/// Platform resolver (`getaddrinfo`)
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

impl NameResolver for SystemResolver {
    fn name(&self) -> String {
        "system".to_string()
    }

    fn lookup(&self, host: &str, port: u16) -> Result<Vec<SocketAddr>> {
        (host, port)
            .to_socket_addrs()
            .map(|addrs| addrs.collect())
            .map_err(|e| AppError::resolution(format!("Can't resolve {}: {}", host, e)))
    }
}

/// Resolver querying explicit name servers over UDP with TCP fallback
pub struct NameServerResolver {
    servers: Vec<IpAddr>,
    resolver: Resolver,
}

impl NameServerResolver {
    pub fn new(servers: &[IpAddr]) -> Result<Self> {
        if servers.is_empty() {
            return Err(AppError::config("No DNS servers provided"));
        }

        let mut config = ResolverConfig::new();
        for &server in servers {
            let socket_addr = SocketAddr::new(server, 53);
            config.add_name_server(NameServerConfig::new(socket_addr, Protocol::Udp));
            config.add_name_server(NameServerConfig::new(socket_addr, Protocol::Tcp));
        }

        let mut opts = ResolverOpts::default();
        // Both families, so that -6 still has candidates to pick from.
        opts.ip_strategy = LookupIpStrategy::Ipv4AndIpv6;

        let resolver = Resolver::new(config, opts)
            .map_err(|e| AppError::resolution(format!("Failed to create resolver: {}", e)))?;

        Ok(Self {
            servers: servers.to_vec(),
            resolver,
        })
    }
}

impl NameResolver for NameServerResolver {
    fn name(&self) -> String {
        DnsConfig::Custom { servers: self.servers.clone() }.name()
    }

    fn lookup(&self, host: &str, port: u16) -> Result<Vec<SocketAddr>> {
        let response = self
            .resolver
            .lookup_ip(host)
            .map_err(|e| AppError::resolution(format!("Can't resolve {}: {}", host, e)))?;
        Ok(response.iter().map(|ip| SocketAddr::new(ip, port)).collect())
    }
}

/// Fixed answers, for hosts known ahead of time
#[derive(Debug, Default, Clone)]
pub struct StaticResolver {
    entries: Vec<(String, Vec<IpAddr>)>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: &str, addrs: Vec<IpAddr>) -> Self {
        self.entries.push((host.to_string(), addrs));
        self
    }
}

impl NameResolver for StaticResolver {
    fn name(&self) -> String {
        "static".to_string()
    }

    fn lookup(&self, host: &str, port: u16) -> Result<Vec<SocketAddr>> {
        Ok(self
            .entries
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(host))
            .map(|(_, addrs)| addrs.iter().map(|&ip| SocketAddr::new(ip, port)).collect())
            .unwrap_or_default())
    }
}

/// Build the resolver a DNS configuration asks for
pub fn resolver_for(config: &DnsConfig) -> Result<Box<dyn NameResolver>> {
    match config {
        DnsConfig::System => Ok(Box::new(SystemResolver)),
        DnsConfig::Custom { servers } => Ok(Box::new(NameServerResolver::new(servers)?)),
    }
}

/// Resolve `host` into candidates in resolver order. IP literals, bracketed
/// or not, skip the lookup.
pub fn resolve(resolver: &dyn NameResolver, host: &str, port: u16) -> Result<Vec<Candidate>> {
    let literal = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = literal.parse::<IpAddr>() {
        return Ok(vec![Candidate::new(SocketAddr::new(ip, port))]);
    }

    let addrs = resolver.lookup(host, port)?;
    if addrs.is_empty() {
        return Err(AppError::resolution(format!("Can't resolve {}: no addresses", host)));
    }
    Ok(addrs.into_iter().map(Candidate::from).collect())
}
