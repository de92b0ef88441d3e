//! Command-line configuration for the server binary.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use argh::FromArgs;

const DEFAULT_PORT: u16 = 3000;

/// Serve the query extractor over HTTP.
#[derive(FromArgs, Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// address to bind, default: 127.0.0.1
    #[argh(option, short = 'a', default = "IpAddr::V4(Ipv4Addr::LOCALHOST)")]
    pub addr: IpAddr,

    /// port to bind, default: $PORT or 3000
    #[argh(option, short = 'p', default = "default_port()")]
    pub port: u16,

    /// log filter used when RUST_LOG is unset, default: info
    #[argh(option, short = 'l', default = "String::from(\"info\")")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.addr, self.port)
    }
}

/// `$PORT` when it holds a valid port number.
fn default_port() -> u16 {
    port_from(std::env::var("PORT").ok().as_deref())
}

fn port_from(value: Option<&str>) -> u16 {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_PORT)
}
