use std::net::IpAddr;

use clap::Parser;
use tracing::Level;

/// Prometheus exporter for the Slurm job queue.
#[derive(Debug, Clone, PartialEq, Parser)]
pub struct Args {
    /// Listen address, overrides the configured one.
    #[arg(long)]
    pub ip: Option<IpAddr>,
    /// Listen port, overrides the configured one.
    #[arg(long)]
    pub port: Option<u16>,
    /// Maximum log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<Level>,
}
