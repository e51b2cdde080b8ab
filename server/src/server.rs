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

//! Honeypot server
//!
//! Binds the listener, runs the accept loop in a spawned task, and tracks
//! live connection tasks in a registry so shutdown can abort them. Each
//! accepted socket gets its own [`ConnectionWorker`] task; a slow or silent
//! peer only ever occupies its own task.

use crate::audit::AuditLog;
use crate::config::ServerConfig;
use crate::connection::{ConnectionId, ConnectionWorker};
use crate::error::{HoneypotError, Result};
use crate::metrics::{MetricsSnapshot, ServerMetrics};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio::task::{AbortHandle, JoinHandle};

/// The honeypot server.
///
/// # Example
///
/// ```no_run
/// use honeywire_server::{AuditLog, HoneypotServer, ServerConfig};
///
/// #[tokio::main]
/// async fn main() -> honeywire_server::Result<()> {
///     let config = ServerConfig::default();
///     let audit = AuditLog::open(&config.log_path).await?;
///     let server = HoneypotServer::new(config, audit).await?;
///     server.start().await?;
///     tokio::signal::ctrl_c().await?;
///     server.shutdown().await?;
///     Ok(())
/// }
/// ```
pub struct HoneypotServer {
    /// Server configuration
    config: Arc<ServerConfig>,
    /// Audit sink shared by every connection
    audit: Arc<AuditLog>,
    /// Server metrics
    metrics: Arc<ServerMetrics>,
    /// Listener, taken by the accept loop on start
    listener: tokio::sync::Mutex<Option<TcpListener>>,
    /// Actual bind address
    bind_address: SocketAddr,
    /// Live connection tasks, for the cap and for shutdown
    connections: Arc<DashMap<ConnectionId, AbortHandle>>,
    /// Next connection id
    next_id: Arc<AtomicU64>,
    /// Running flag
    running: Arc<AtomicBool>,
    /// Shutdown notification
    shutdown_notify: Arc<Notify>,
    /// Accept loop task handle
    accept_handle: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl HoneypotServer {
    /// Bind the configured address. Accepting starts with [`start`](Self::start).
    pub async fn new(config: ServerConfig, audit: Arc<AuditLog>) -> Result<Self> {
        let listener = TcpListener::bind(config.bind_address).await?;
        let bind_address = listener.local_addr()?;

        tracing::info!("telnet honeypot bound to {}", bind_address);

        Ok(Self {
            config: Arc::new(config),
            audit,
            metrics: Arc::new(ServerMetrics::new()),
            listener: tokio::sync::Mutex::new(Some(listener)),
            bind_address,
            connections: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(1)),
            running: Arc::new(AtomicBool::new(false)),
            shutdown_notify: Arc::new(Notify::new()),
            accept_handle: tokio::sync::Mutex::new(None),
        })
    }

    /// Start accepting connections.
    pub async fn start(&self) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(HoneypotError::AlreadyRunning);
        }
        let listener = self
            .listener
            .lock()
            .await
            .take()
            .ok_or(HoneypotError::AlreadyRunning)?;

        tracing::info!("accepting connections on {}", self.bind_address);

        let handle = self.spawn_accept_loop(listener);
        *self.accept_handle.lock().await = Some(handle);
        Ok(())
    }

    fn spawn_accept_loop(&self, listener: TcpListener) -> JoinHandle<()> {
        let config = self.config.clone();
        let audit = self.audit.clone();
        let metrics = self.metrics.clone();
        let connections = self.connections.clone();
        let next_id = self.next_id.clone();
        let running = self.running.clone();
        let shutdown_notify = self.shutdown_notify.clone();

        tokio::spawn(async move {
            loop {
                if !running.load(Ordering::SeqCst) {
                    break;
                }

                let accept_result = tokio::select! {
                    result = listener.accept() => result,
                    _ = shutdown_notify.notified() => break,
                };

                match accept_result {
                    Ok((socket, peer_addr)) => {
                        if connections.len() >= config.max_connections {
                            tracing::warn!(
                                "connection limit reached ({}), refusing {}",
                                config.max_connections,
                                peer_addr
                            );
                            metrics.connection_refused();
                            drop(socket);
                            continue;
                        }

                        let id = ConnectionId::new(next_id.fetch_add(1, Ordering::Relaxed));
                        let worker = ConnectionWorker::new(
                            id,
                            socket,
                            peer_addr,
                            &config,
                            audit.clone(),
                            metrics.clone(),
                        );

                        let registry = connections.clone();
                        let task = tokio::spawn(async move {
                            worker.run().await;
                            registry.remove(&id);
                        });
                        connections.insert(id, task.abort_handle());
                        if task.is_finished() {
                            // The worker already finished and its own removal
                            // may have raced our insert.
                            connections.remove(&id);
                        }
                    }
                    Err(error) => {
                        tracing::error!("failed to accept connection: {error}");
                        // Back off so a persistent accept error can't spin.
                        tokio::time::sleep(Duration::from_millis(100)).await;
                    }
                }
            }

            tracing::info!("accept loop terminated");
        })
    }

    /// Stop accepting and abort live connections.
    pub async fn shutdown(&self) -> Result<()> {
        if !self.running.swap(false, Ordering::SeqCst) {
            return Err(HoneypotError::ServerNotRunning);
        }

        tracing::info!("shutting down telnet honeypot");

        self.shutdown_notify.notify_waiters();
        if let Some(handle) = self.accept_handle.lock().await.take() {
            let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        }

        for entry in self.connections.iter() {
            entry.value().abort();
        }
        self.connections.clear();

        tracing::info!("telnet honeypot shutdown complete");
        Ok(())
    }

    /// Whether the accept loop is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// The address the listener actually bound (port 0 resolves here).
    pub fn bind_address(&self) -> SocketAddr {
        self.bind_address
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Counter snapshot.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// The server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

impl std::fmt::Debug for HoneypotServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HoneypotServer")
            .field("bind_address", &self.bind_address())
            .field("running", &self.is_running())
            .field("connection_count", &self.connection_count())
            .finish()
    }
}

impl Drop for HoneypotServer {
    fn drop(&mut self) {
        if self.running.load(Ordering::SeqCst) {
            tracing::warn!("HoneypotServer dropped while still running");
            self.running.store(false, Ordering::SeqCst);
            self.shutdown_notify.notify_waiters();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_server() -> (HoneypotServer, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig::new("127.0.0.1:0".parse().unwrap())
            .with_log_path(dir.path().join("audit.log"));
        let audit = AuditLog::open(&config.log_path).await.unwrap();
        let server = HoneypotServer::new(config, audit).await.unwrap();
        (server, dir)
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn server_lifecycle() {
        let (server, _dir) = test_server().await;
        assert!(!server.is_running());

        server.start().await.unwrap();
        assert!(server.is_running());
        assert!(logs_contain("accepting connections"));

        server.shutdown().await.unwrap();
        assert!(!server.is_running());
    }

    #[tokio::test]
    async fn double_start_fails() {
        let (server, _dir) = test_server().await;
        server.start().await.unwrap();
        assert!(server.start().await.is_err());
        server.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_without_start_fails() {
        let (server, _dir) = test_server().await;
        assert!(server.shutdown().await.is_err());
    }
}
