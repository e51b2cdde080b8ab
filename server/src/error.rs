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

//! Error types for the honeypot server
//!
//! None of these ever reach the remote peer. A failed connection is torn
//! down and audited; the peer only ever sees normal protocol traffic.

use thiserror::Error;

/// Result type for server operations
pub type Result<T> = std::result::Result<T, HoneypotError>;

/// Honeypot server error types
#[derive(Debug, Error)]
pub enum HoneypotError {
    /// I/O error from the underlying TCP stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Protocol error from the codec layer
    #[error("Protocol error: {0}")]
    Codec(#[from] honeywire_telnetcodec::CodecError),

    /// A peer exceeded the line length limit without sending a line feed
    #[error("Line length limit exceeded")]
    LineTooLong,

    /// Server is already running
    #[error("Server already running")]
    AlreadyRunning,

    /// Server is not running
    #[error("Server not running")]
    ServerNotRunning,
}

impl HoneypotError {
    /// Whether this error came from the transport rather than from us.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, HoneypotError::Io(_) | HoneypotError::LineTooLong)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_are_connection_errors() {
        let error = HoneypotError::from(std::io::Error::from(std::io::ErrorKind::ConnectionReset));
        assert!(error.is_connection_error());
        assert!(!HoneypotError::ServerNotRunning.is_connection_error());
    }
}
