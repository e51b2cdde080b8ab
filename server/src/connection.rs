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

//! Connection worker
//!
//! One worker task per accepted connection, owning everything mutable about
//! it: the stream halves, the telnet codec state, the line buffer and the
//! login session. That exclusive ownership is the whole concurrency story:
//! chunks of one connection are processed strictly in arrival order, and no
//! lock is ever taken.
//!
//! The worker reads raw chunks itself (rather than through a `Framed`
//! stream) because each chunk must be hex-dumped to the audit log before the
//! codec consumes it. The delayed terminal-type request is a sleep armed
//! inside the `select!` loop, so it dies with the worker and its firing goes
//! through the worker's own write path.

use crate::audit::{AuditLog, AuditRecord, Direction};
use crate::config::ServerConfig;
use crate::error::{HoneypotError, Result};
use crate::metrics::ServerMetrics;
use crate::session::{LoginSession, LoginStep, SessionAction};
use bytes::{BufMut, Bytes, BytesMut};
use honeywire_telnetcodec::{
    NegotiationPolicy, TelnetArgument, TelnetCodec, TelnetEvent, TelnetFrame, protocol,
};
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::{Sleep, sleep};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, info, warn};

/// Maximum bytes buffered while waiting for a line feed. A peer that streams
/// forever without one is dropped, matching the classic line-reader limit.
const MAX_LINE_LENGTH: usize = 16 * 1024;

/// Identifier for one accepted connection, unique for the server's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Wrap a raw id. The server's accept loop allocates these sequentially.
    pub fn new(id: u64) -> Self {
        ConnectionId(id)
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

enum Wake {
    Read(usize),
    TerminalType,
}

enum Flow {
    Continue,
    Disconnect,
}

/// Worker that runs one connection from accept to teardown.
pub struct ConnectionWorker {
    id: ConnectionId,
    peer: SocketAddr,
    reader: OwnedReadHalf,
    writer: OwnedWriteHalf,
    decoder: TelnetCodec,
    encoder: TelnetCodec,
    read_buffer: BytesMut,
    line_buffer: BytesMut,
    outbound: BytesMut,
    session: LoginSession,
    banner: Bytes,
    terminal_type_delay: Duration,
    terminal_type_timer: Option<Pin<Box<Sleep>>>,
    audit: Arc<AuditLog>,
    metrics: Arc<ServerMetrics>,
}

impl ConnectionWorker {
    /// Build a worker around an accepted stream.
    pub fn new(
        id: ConnectionId,
        stream: TcpStream,
        peer: SocketAddr,
        config: &ServerConfig,
        audit: Arc<AuditLog>,
        metrics: Arc<ServerMetrics>,
    ) -> Self {
        let (reader, writer) = stream.into_split();
        Self {
            id,
            peer,
            reader,
            writer,
            decoder: TelnetCodec::new(),
            encoder: TelnetCodec::new(),
            read_buffer: BytesMut::with_capacity(4096),
            line_buffer: BytesMut::new(),
            outbound: BytesMut::new(),
            session: LoginSession::new(config.max_attempts),
            banner: config.banner_bytes(),
            terminal_type_delay: config.terminal_type_delay,
            terminal_type_timer: None,
            audit,
            metrics,
        }
    }

    /// Run the connection to completion, auditing how it ended.
    pub async fn run(mut self) {
        self.metrics.connection_opened();
        self.audit.record(self.peer, AuditRecord::ConnectionOpen);
        info!("{} opened from {}", self.id, self.peer);

        match self.event_loop().await {
            Ok(()) => {
                self.audit.record(self.peer, AuditRecord::ConnectionClosed);
                info!("{} closed", self.id);
            }
            Err(error) => {
                self.audit.record(
                    self.peer,
                    AuditRecord::ConnectionLost {
                        reason: error.to_string(),
                    },
                );
                warn!("{} lost: {error}", self.id);
            }
        }
        self.metrics.connection_closed();
    }

    async fn event_loop(&mut self) -> Result<()> {
        // Front-load negotiation, then banner and the first prompt, in one
        // outbound write. The terminal-type request follows after its delay.
        for frame in NegotiationPolicy::opening_announcement() {
            self.queue_frame(frame)?;
        }
        let step = self.session.on_connect(&self.banner);
        if let Flow::Disconnect = self.apply_step(step).await? {
            return Ok(());
        }
        self.flush_outbound().await?;
        self.terminal_type_timer = Some(Box::pin(sleep(self.terminal_type_delay)));

        loop {
            let wake = tokio::select! {
                read = self.reader.read_buf(&mut self.read_buffer) => Wake::Read(read?),
                () = armed(&mut self.terminal_type_timer) => Wake::TerminalType,
            };
            match wake {
                Wake::Read(0) => return Ok(()),
                Wake::Read(chunk_len) => {
                    let chunk = self.read_buffer[self.read_buffer.len() - chunk_len..].to_vec();
                    self.audit.record(
                        self.peer,
                        AuditRecord::RawBytes {
                            direction: Direction::Inbound,
                            bytes: chunk,
                        },
                    );
                    if let Flow::Disconnect = self.process_inbound().await? {
                        return Ok(());
                    }
                }
                Wake::TerminalType => {
                    self.terminal_type_timer = None;
                    self.queue_frame(NegotiationPolicy::terminal_type_request())?;
                    self.flush_outbound().await?;
                }
            }
        }
    }

    /// Drain every decodable event out of the read buffer, then flush
    /// whatever replies accumulated in one write.
    async fn process_inbound(&mut self) -> Result<Flow> {
        while let Some(event) = self.decoder.decode(&mut self.read_buffer)? {
            match event {
                TelnetEvent::Data(byte) => {
                    if let Flow::Disconnect = self.on_data_byte(byte).await? {
                        return Ok(Flow::Disconnect);
                    }
                }
                TelnetEvent::Subnegotiate(TelnetArgument::WindowSize(size)) => {
                    if let Some(record) = self.session.apply_window_size(size) {
                        self.audit.record(self.peer, record);
                    }
                }
                TelnetEvent::Subnegotiate(TelnetArgument::TerminalType(ttype)) => {
                    if let Some(record) = self.session.apply_terminal_type(&ttype) {
                        self.audit.record(self.peer, record);
                    }
                }
                TelnetEvent::Subnegotiate(TelnetArgument::Unknown(option, _payload)) => {
                    // Consumed for stream alignment, otherwise ignored.
                    debug!("{} ignoring subnegotiation for {option}", self.id);
                }
                negotiation => {
                    if NegotiationPolicy::requests_terminal_type(&negotiation) {
                        self.terminal_type_timer =
                            Some(Box::pin(sleep(self.terminal_type_delay)));
                    }
                    if let Some(reply) = NegotiationPolicy::reply(&negotiation) {
                        self.queue_frame(reply)?;
                    }
                }
            }
        }
        self.flush_outbound().await?;
        Ok(Flow::Continue)
    }

    /// Line discipline: split on LF, strip one trailing CR, cap the buffer.
    async fn on_data_byte(&mut self, byte: u8) -> Result<Flow> {
        if byte == protocol::LF {
            let mut line = self.line_buffer.split();
            if line.last() == Some(&protocol::CR) {
                line.truncate(line.len() - 1);
            }
            let step = self.session.on_line(&line);
            return self.apply_step(step).await;
        }
        if self.line_buffer.len() >= MAX_LINE_LENGTH {
            warn!("{} exceeded line length limit", self.id);
            return Err(HoneypotError::LineTooLong);
        }
        self.line_buffer.put_u8(byte);
        Ok(Flow::Continue)
    }

    /// Execute a session transition: audit its records, queue its writes,
    /// and perform the graceful close if it asked for one.
    async fn apply_step(&mut self, step: LoginStep) -> Result<Flow> {
        for record in step.records {
            match record {
                AuditRecord::UsernameAttempt { .. } | AuditRecord::PasswordAttempt { .. } => {
                    self.metrics.credential_attempt();
                }
                AuditRecord::MaxAttemptsReached => self.metrics.lockout(),
                _ => {}
            }
            self.audit.record(self.peer, record);
        }
        let mut disconnect = false;
        for action in step.actions {
            match action {
                SessionAction::Send(bytes) => self.queue_bytes(&bytes)?,
                SessionAction::SendFrame(frame) => self.queue_frame(frame)?,
                SessionAction::Disconnect => disconnect = true,
            }
        }
        if disconnect {
            self.flush_outbound().await?;
            self.writer.shutdown().await?;
            return Ok(Flow::Disconnect);
        }
        Ok(Flow::Continue)
    }

    fn queue_frame(&mut self, frame: TelnetFrame) -> Result<()> {
        self.encoder.encode(frame, &mut self.outbound)?;
        Ok(())
    }

    fn queue_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.encoder.encode(bytes, &mut self.outbound)?;
        Ok(())
    }

    async fn flush_outbound(&mut self) -> Result<()> {
        if self.outbound.is_empty() {
            return Ok(());
        }
        let chunk = self.outbound.split();
        self.audit.record(
            self.peer,
            AuditRecord::RawBytes {
                direction: Direction::Outbound,
                bytes: chunk.to_vec(),
            },
        );
        self.writer.write_all(&chunk).await?;
        Ok(())
    }
}

/// Await the timer if one is armed; otherwise stay pending so the other
/// `select!` branch always wins.
async fn armed(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(sleep) => sleep.as_mut().await,
        None => std::future::pending().await,
    }
}
