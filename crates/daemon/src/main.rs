// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! lwf Daemon (lwfd)
//!
//! Long-running process that owns the middleware: the store, the event
//! processor, and the site bridge. Workflows talk to it through the
//! boundary transport; the daemon itself only hosts the core.

use lwf_daemon::lifecycle::{self, Config, LifecycleError};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("lwfd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("lwfd {}", env!("CARGO_PKG_VERSION"));
                println!("lwf daemon - hosts the workflow middleware for one user");
                println!();
                println!("USAGE:");
                println!("    lwfd");
                println!();
                println!("State lives under ~/.lwf; delete the directory to reset.");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: lwfd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = Config::load();
    std::fs::create_dir_all(&config.state_dir)?;
    let _log_guard = setup_logging(&config)?;

    let daemon = match lifecycle::startup(config) {
        Ok(daemon) => daemon,
        Err(LifecycleError::LockFailed(path)) => {
            let pid = std::fs::read_to_string(&path).unwrap_or_default();
            eprintln!("lwfd is already running");
            if !pid.trim().is_empty() {
                eprintln!("  pid: {}", pid.trim());
            }
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    // The CLI-visible readiness marker.
    println!("READY");
    info!("lwfd ready");

    shutdown_signal().await;
    daemon.shutdown();
    Ok(())
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, std::io::Error> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let file_appender = tracing_appender::rolling::never(
        config
            .log_path
            .parent()
            .unwrap_or(&config.state_dir)
            .to_path_buf(),
        config
            .log_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "lwfd.log".into()),
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();
    Ok(guard)
}

async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    let mut term = match signal(SignalKind::terminate()) {
        Ok(term) => term,
        Err(_) => {
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = term.recv() => {}
    }
}
