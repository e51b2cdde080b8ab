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

//! Honeypot binary: parse arguments, open the audit log, run until ctrl-c.

use clap::Parser;
use honeywire_server::{AuditLog, Cli, HoneypotServer};
use tracing_subscriber::EnvFilter;

fn init_tracing(level_override: Option<&str>) {
    let filter = match level_override {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> honeywire_server::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let config = cli.to_config();
    let audit = AuditLog::open(&config.log_path).await?;

    let server = HoneypotServer::new(config, audit).await?;
    tracing::info!("telnet honeypot active on {}", server.bind_address());
    tracing::info!(
        "all attempts will be logged in {}",
        server.config().log_path.display()
    );

    server.start().await?;
    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");
    server.shutdown().await?;
    Ok(())
}
