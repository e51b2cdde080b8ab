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

//! Telnet Login Honeypot
//!
//! A deception service that impersonates a telnet login server. It accepts
//! TCP connections, negotiates telnet options the way a real server would,
//! walks every peer through an endless username/password prompt loop, and
//! records each credential attempt and raw byte exchange to an append-only
//! audit log. No credentials ever succeed; after the attempt limit the peer
//! is locked out and disconnected.
//!
//! # Architecture
//!
//! ```text
//! HoneypotServer          accept loop, connection registry, shutdown
//!     ↓
//! ConnectionWorker        one task per connection: reads chunks, audits
//!     ↓                   them, decodes telnet, answers negotiation
//! LoginSession            username/password state machine
//!     ↓
//! AuditLog                bounded channel into a single writer task
//! ```
//!
//! Protocol framing and the negotiation reply policy live in the
//! `honeywire-telnetcodec` crate; this crate is everything that happens
//! after the bytes are de-interleaved.

#![warn(
    clippy::cargo,
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(
    clippy::option_if_let_else,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc
)]

mod audit;
mod cli;
mod config;
mod connection;
mod error;
mod metrics;
mod server;
mod session;

pub use audit::{AuditLog, AuditRecord, Direction, HEX_DUMP_LIMIT, format_record, hex_dump};
pub use cli::Cli;
pub use config::{DEFAULT_BANNER, DEFAULT_PORT, ServerConfig};
pub use connection::{ConnectionId, ConnectionWorker};
pub use error::{HoneypotError, Result};
pub use metrics::{MetricsSnapshot, ServerMetrics};
pub use server::HoneypotServer;
pub use session::{LoginSession, LoginState, LoginStep, SessionAction};
