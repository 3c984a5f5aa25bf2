//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    config::env::EnvManager,
    error::Result,
    models::ProbeConfig,
};

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<ProbeConfig> {
        let mut config = ProbeConfig::new(self.cli.url.clone());

        EnvManager::load_env_file(self.cli.debug)?;
        config.merge_from_env()?;

        self.apply_cli_overrides(&mut config)?;

        config.validate()?;

        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut ProbeConfig) -> Result<()> {
        let cli = &self.cli;

        if let Some(family) = cli.ip_family()? {
            config.ip_family = family;
        }
        if let Some(wait) = cli.wait_time {
            config.wait_time_seconds = wait;
        }
        if let Some(ref check) = cli.check_string {
            config.check_string = check.clone();
        }
        if cli.port.is_some() {
            config.port = cli.port;
        }
        if !cli.dns_servers.is_empty() {
            config.dns_servers = cli.dns_servers.clone();
        }
        if let Some(version) = cli.tls_version {
            config.tls_version = version;
        }
        if cli.insecure {
            config.insecure = true;
        }
        if cli.connect_timeout.is_some() {
            config.connect_timeout_seconds = cli.connect_timeout;
        }
        if cli.read_timeout.is_some() {
            config.read_timeout_seconds = cli.read_timeout;
        }
        if let Some(limit) = cli.max_content {
            config.max_content_bytes = limit;
        }
        if let Some(ref user_agent) = cli.user_agent {
            config.user_agent = user_agent.clone();
        }
        if let Some(format) = cli.format {
            config.output_format = format;
        }

        config.enable_color = config.enable_color && cli.use_colors();

        // CLI-only flags
        config.print_content = cli.print_content;
        config.debug = cli.debug;

        if config.debug {
            eprintln!("Applied CLI overrides to configuration");
            eprintln!("{}", display_config_summary(config));
        }

        Ok(())
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<ProbeConfig> {
    let parser = ConfigParser::new(cli);
    parser.parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &ProbeConfig) -> String {
    let mut summary = Vec::new();

    summary.push(format!("URL: {}", config.url));
    summary.push(format!("Address family: {:?}", config.ip_family));
    summary.push(format!("Wait time: {}s", config.wait_time_seconds));
    summary.push(format!("Check string: {:?}", config.check_string));
    summary.push(format!("Port override: {}", config.port.map_or_else(|| "none".to_string(), |p| p.to_string())));
    summary.push(format!("DNS: {}", config.dns_config().map(|d| d.name()).unwrap_or_else(|e| e.to_string())));
    summary.push(format!("TLS version: {}", config.tls_version));
    summary.push(format!("Verify certificates: {}", !config.insecure));
    summary.push(format!("Max content: {} bytes", config.max_content_bytes));
    summary.push(format!("User agent: {}", config.user_agent));

    summary.join("\n")
}
