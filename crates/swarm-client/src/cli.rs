use clap::{Parser, ValueEnum};
use std::net::IpAddr;
use std::path::PathBuf;
use swarm_common::{Config, ConfigError, ProtocolMode, Tuning};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProtocolArg {
    Raw,
    Http,
}

impl From<ProtocolArg> for ProtocolMode {
    fn from(p: ProtocolArg) -> Self {
        match p {
            ProtocolArg::Raw => ProtocolMode::Raw,
            ProtocolArg::Http => ProtocolMode::Http,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "swarm-client")]
#[command(about = "Opens and holds many rate-controlled TCP connections", long_about = None)]
pub struct Cli {
    /// Maximum number of live connections
    pub max_concurrent: usize,

    /// Comma separated destination addresses
    pub servers: String,

    /// Comma separated source addresses to bind, rotated per port sweep
    pub clients: Option<String>,

    /// YAML tuning file (load/flow sections)
    #[arg(short, long, env = "SWARM_CONFIG")]
    pub config: Option<PathBuf>,

    /// New connections per second
    #[arg(long)]
    pub rate: Option<u32>,

    /// Requests sent over each connection
    #[arg(long)]
    pub requests_per_flow: Option<u32>,

    /// Delay between requests on one connection, in milliseconds
    #[arg(long)]
    pub interval_ms: Option<u64>,

    #[arg(long, value_enum)]
    pub protocol: Option<ProtocolArg>,

    /// First destination port of the sweep
    #[arg(long)]
    pub min_port: Option<u16>,

    /// Last destination port of the sweep
    #[arg(long)]
    pub max_port: Option<u16>,

    /// Emit JSON log lines
    #[arg(long)]
    pub json_logs: bool,
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(|s| s.trim().to_string()).collect()
}

impl Cli {
    /// Merges defaults, the tuning file and flags, in that order, and
    /// validates the result.
    pub fn into_config(self) -> Result<Config, ConfigError> {
        let mut tuning = match &self.config {
            Some(path) => Tuning::from_file(path)?,
            None => Tuning::default(),
        };

        if let Some(rate) = self.rate {
            tuning.load.new_flows_per_sec = rate;
        }
        if let Some(port) = self.min_port {
            tuning.load.min_port = port;
        }
        if let Some(port) = self.max_port {
            tuning.load.max_port = port;
        }
        if let Some(n) = self.requests_per_flow {
            tuning.flow.requests_per_flow = n;
        }
        if let Some(ms) = self.interval_ms {
            tuning.flow.request_interval_ms = ms;
        }
        if let Some(p) = self.protocol {
            tuning.flow.protocol = p.into();
        }

        let clients = match &self.clients {
            Some(raw) => split_list(raw)
                .iter()
                .map(|s| {
                    s.parse::<IpAddr>().map_err(|e| {
                        ConfigError::Invalid(format!("bad client address {:?}: {}", s, e))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        let config = Config::new(
            self.max_concurrent,
            split_list(&self.servers),
            clients,
            tuning,
        );
        config.validate()?;
        Ok(config)
    }
}
