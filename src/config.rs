//! Server configuration and command-line interface.
//!
//! The server is deliberately knob-free: one optional `-p <port>` flag is the
//! entire external configuration surface. Everything else (worker count, pool
//! size) is derived from the host.

use std::net::SocketAddr;

use clap::Parser;

/// Port used when `-p` is not given.
pub const DEFAULT_PORT: u16 = 8080;

/// Command-line arguments.
///
/// Unknown flags and a missing port value are rejected by clap before the
/// process binds anything.
#[derive(Debug, Parser)]
#[command(name = "load-target", about = "HTTP stub server for load-testing clients")]
pub struct Cli {
    /// Listening port.
    #[arg(short = 'p', value_name = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

/// Resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP port to listen on.
    pub port: u16,

    /// Number of worker instances sharing the accept queue.
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            workers: default_workers(),
        }
    }
}

impl ServerConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            port: cli.port,
            ..Default::default()
        }
    }

    /// Address the listener binds to (all interfaces).
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

/// Two worker instances per core.
pub fn default_workers() -> usize {
    2 * std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
