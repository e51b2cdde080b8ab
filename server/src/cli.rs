//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Command line interface

use crate::config::ServerConfig;
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Command line arguments for the honeypot binary.
#[derive(Parser, Debug)]
#[command(
    name = "honeywire",
    version,
    about = "Run a telnet login honeypot server"
)]
pub struct Cli {
    /// Host to bind the telnet listener to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to bind the telnet listener to
    #[arg(long, default_value_t = crate::config::DEFAULT_PORT)]
    pub port: u16,

    /// Banner line presented when a connection opens
    #[arg(long)]
    pub banner: Option<String>,

    /// Append-only audit log file
    #[arg(long, default_value = "telnet_honeypot.log")]
    pub log_file: PathBuf,

    /// Password attempts allowed before the peer is locked out
    #[arg(long, default_value_t = 3)]
    pub max_attempts: u32,

    /// Maximum simultaneous connections
    #[arg(long, default_value_t = 256)]
    pub max_connections: usize,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    /// Fold the parsed arguments into a [`ServerConfig`].
    pub fn to_config(&self) -> ServerConfig {
        let mut config = ServerConfig::new(SocketAddr::new(self.host, self.port))
            .with_log_path(self.log_file.clone())
            .with_max_attempts(self.max_attempts)
            .with_max_connections(self.max_connections);
        if let Some(banner) = &self.banner {
            config = config.with_banner(banner.clone());
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_stock_config() {
        let cli = Cli::parse_from(["honeywire"]);
        let config = cli.to_config();
        assert_eq!(config.bind_address, "0.0.0.0:2323".parse().unwrap());
        assert_eq!(config.banner, crate::config::DEFAULT_BANNER);
        assert_eq!(config.log_path, PathBuf::from("telnet_honeypot.log"));
        assert_eq!(config.max_attempts, 3);
    }

    #[test]
    fn overrides_are_applied() {
        let cli = Cli::parse_from([
            "honeywire",
            "--host",
            "127.0.0.1",
            "--port",
            "2222",
            "--banner",
            "login:",
            "--max-attempts",
            "5",
        ]);
        let config = cli.to_config();
        assert_eq!(config.bind_address, "127.0.0.1:2222".parse().unwrap());
        assert_eq!(config.banner, "login:");
        assert_eq!(config.max_attempts, 5);
    }
}
