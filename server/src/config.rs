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

//! Server configuration

use bytes::Bytes;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Banner presented when no override is configured.
pub const DEFAULT_BANNER: &str = "Welcome to the Telnet Honeypot!";

/// Default listen port. Telnet's 23 needs privileges; 2323 is the
/// conventional unprivileged stand-in and what scanners probe next.
pub const DEFAULT_PORT: u16 = 2323;

/// Honeypot server configuration
///
/// # Example
///
/// ```
/// use honeywire_server::ServerConfig;
///
/// let config = ServerConfig::new("127.0.0.1:0".parse().unwrap())
///     .with_banner("Ubuntu 14.04 LTS")
///     .with_max_attempts(3);
/// ```
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the listener binds to
    pub bind_address: SocketAddr,
    /// Banner text written when a connection opens
    pub banner: String,
    /// Path of the append-only audit log
    pub log_path: PathBuf,
    /// Password attempts allowed before lockout
    pub max_attempts: u32,
    /// Maximum simultaneous connections; extra ones are refused at accept
    pub max_connections: usize,
    /// Delay before the terminal-type request is sent
    pub terminal_type_delay: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            banner: DEFAULT_BANNER.to_string(),
            log_path: PathBuf::from("telnet_honeypot.log"),
            max_attempts: 3,
            max_connections: 256,
            terminal_type_delay: Duration::from_millis(150),
        }
    }
}

impl ServerConfig {
    /// Create a configuration listening on the given address.
    pub fn new(bind_address: SocketAddr) -> Self {
        Self {
            bind_address,
            ..Default::default()
        }
    }

    /// Set the banner text.
    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = banner.into();
        self
    }

    /// Set the audit log path.
    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = path.into();
        self
    }

    /// Set the number of password attempts before lockout.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the connection cap.
    pub fn with_max_connections(mut self, max_connections: usize) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// Set the delay before the terminal-type request.
    pub fn with_terminal_type_delay(mut self, delay: Duration) -> Self {
        self.terminal_type_delay = delay;
        self
    }

    /// The banner as wire bytes, forced to end with CRLF.
    pub fn banner_bytes(&self) -> Bytes {
        let trimmed = self.banner.trim_end_matches(['\r', '\n']);
        Bytes::from(format!("{trimmed}\r\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_gets_crlf_appended() {
        let config = ServerConfig::default().with_banner("hello");
        assert_eq!(&config.banner_bytes()[..], b"hello\r\n");
    }

    #[test]
    fn banner_line_endings_are_normalized() {
        for raw in ["hello\n", "hello\r\n", "hello\n\n"] {
            let config = ServerConfig::default().with_banner(raw);
            assert_eq!(&config.banner_bytes()[..], b"hello\r\n", "banner {raw:?}");
        }
    }

    #[test]
    fn default_matches_documented_values() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address.port(), DEFAULT_PORT);
        assert_eq!(config.banner, DEFAULT_BANNER);
        assert_eq!(config.max_attempts, 3);
    }
}
