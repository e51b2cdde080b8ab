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

//! Audit recorder
//!
//! The audit log is the honeypot's product: every connection, every raw byte
//! exchange and every credential attempt lands here as one line of
//! `[timestamp] TAG message`. Connection tasks never write the file
//! themselves; records go through a bounded channel into a single writer
//! task, which serializes appends (no interleaved partial lines) and keeps a
//! slow disk from ever stalling a connection. When the channel is full the
//! record is dropped and counted instead of blocking.

use chrono::{DateTime, SecondsFormat, Utc};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;
use tracing::error;

/// Raw byte dumps are truncated to this many bytes of hex.
pub const HEX_DUMP_LIMIT: usize = 2048;

const AUDIT_CHANNEL_CAPACITY: usize = 10_000;

/// Which way raw bytes were travelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Peer to honeypot
    Inbound,
    /// Honeypot to peer
    Outbound,
}

/// One auditable event on a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditRecord {
    /// A connection was accepted
    ConnectionOpen,
    /// A raw chunk crossed the wire
    RawBytes {
        /// Transfer direction
        direction: Direction,
        /// The chunk as read or written, before/after telnet framing
        bytes: Vec<u8>,
    },
    /// A line arrived at the username prompt
    UsernameAttempt {
        /// The line, CR/LF already stripped
        line: Vec<u8>,
    },
    /// A line arrived at the password prompt
    PasswordAttempt {
        /// The line, CR/LF already stripped
        line: Vec<u8>,
    },
    /// The peer used up its password attempts
    MaxAttemptsReached,
    /// The peer reported its terminal type
    TerminalType {
        /// Reported terminal name
        name: String,
    },
    /// The peer reported its window size
    WindowSize {
        /// Stored columns after the report (0 if never reported)
        cols: u16,
        /// Stored rows after the report (0 if never reported)
        rows: u16,
    },
    /// The connection ended cleanly
    ConnectionClosed,
    /// The connection ended on a transport failure
    ConnectionLost {
        /// What the transport reported
        reason: String,
    },
}

impl AuditRecord {
    /// The fixed tag written after the timestamp.
    pub fn tag(&self) -> &'static str {
        match self {
            AuditRecord::ConnectionOpen => "CONNECT",
            AuditRecord::RawBytes {
                direction: Direction::Inbound,
                ..
            } => "RX",
            AuditRecord::RawBytes {
                direction: Direction::Outbound,
                ..
            } => "TX",
            AuditRecord::UsernameAttempt { .. } => "USERNAME",
            AuditRecord::PasswordAttempt { .. } => "PASSWORD",
            AuditRecord::MaxAttemptsReached => "LOCKOUT",
            AuditRecord::TerminalType { .. } => "TTYPE",
            AuditRecord::WindowSize { .. } => "NAWS",
            AuditRecord::ConnectionClosed => "CLOSE",
            AuditRecord::ConnectionLost { .. } => "LOST",
        }
    }

    fn message(&self, peer: SocketAddr) -> String {
        match self {
            AuditRecord::ConnectionOpen => {
                format!("client host {} port {}", peer.ip(), peer.port())
            }
            AuditRecord::RawBytes { bytes, .. } => {
                format!("{} {} bytes: {}", peer, bytes.len(), hex_dump(bytes))
            }
            AuditRecord::UsernameAttempt { line } => {
                format!("{} username attempt: {:?}", peer, String::from_utf8_lossy(line))
            }
            AuditRecord::PasswordAttempt { line } => {
                format!("{} password attempt: {:?}", peer, String::from_utf8_lossy(line))
            }
            AuditRecord::MaxAttemptsReached => {
                format!("{peer} maximum attempts reached, disconnecting")
            }
            AuditRecord::TerminalType { name } => {
                format!("{peer} terminal type: {name:?}")
            }
            AuditRecord::WindowSize { cols, rows } => {
                format!("{peer} window size: {cols}x{rows}")
            }
            AuditRecord::ConnectionClosed => format!("{peer} connection closed"),
            AuditRecord::ConnectionLost { reason } => {
                format!("{peer} connection lost: {reason}")
            }
        }
    }
}

struct Entry {
    peer: SocketAddr,
    record: AuditRecord,
}

/// Handle to the audit writer task.
///
/// Cheap to clone via `Arc`; one handle is created at startup and passed to
/// every connection worker.
pub struct AuditLog {
    sender: mpsc::Sender<Entry>,
    dropped: AtomicU64,
}

impl AuditLog {
    /// Open (append/create) the log file and spawn the writer task.
    pub async fn open(path: &Path) -> std::io::Result<Arc<AuditLog>> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        let (sender, receiver) = mpsc::channel(AUDIT_CHANNEL_CAPACITY);
        tokio::spawn(writer_task(receiver, BufWriter::new(file)));
        Ok(Arc::new(AuditLog {
            sender,
            dropped: AtomicU64::new(0),
        }))
    }

    /// Queue a record for the writer task. Never blocks; a full channel drops
    /// the record and bumps the counter.
    pub fn record(&self, peer: SocketAddr, record: AuditRecord) {
        if self.sender.try_send(Entry { peer, record }).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Number of records dropped due to channel overflow.
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

async fn writer_task(mut receiver: mpsc::Receiver<Entry>, mut writer: BufWriter<File>) {
    while let Some(entry) = receiver.recv().await {
        let line = format_record(Utc::now(), entry.peer, &entry.record);
        if let Err(error) = writer.write_all(line.as_bytes()).await {
            error!("audit write failed: {error}");
            break;
        }
        // Flush per record so the log is tailable and survives a crash.
        if let Err(error) = writer.flush().await {
            error!("audit flush failed: {error}");
            break;
        }
    }
    let _ = writer.flush().await;
}

/// Render one audit line. Pure so the format is testable.
pub fn format_record(timestamp: DateTime<Utc>, peer: SocketAddr, record: &AuditRecord) -> String {
    format!(
        "[{}] {} {}\n",
        timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        record.tag(),
        record.message(peer)
    )
}

/// Hex-encode up to [`HEX_DUMP_LIMIT`] bytes, appending a truncation marker
/// carrying the true length when the input is longer.
pub fn hex_dump(bytes: &[u8]) -> String {
    let shown = &bytes[..bytes.len().min(HEX_DUMP_LIMIT)];
    let mut out = String::with_capacity(shown.len() * 2 + 32);
    for byte in shown {
        out.push_str(&format!("{byte:02x}"));
    }
    if bytes.len() > HEX_DUMP_LIMIT {
        out.push_str(&format!(" ... truncated, {} bytes total", bytes.len()));
    }
    out
}
