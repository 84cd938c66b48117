use std::process::ExitCode;

use anyhow::{anyhow, Context};
use clap::Parser;
use statectl_repo::CancelToken;
use tracing::{info, warn};

mod cli;
mod commands;
mod logging;
mod output;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    logging::init(cli.log_level, cli.log_format);

    let name = cli.command.name();
    match run(cli).await {
        Ok(()) => {
            info!("exiting");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{:#}", err.context(format!("{name} command failed")));
            ExitCode::FAILURE
        }
    }
}

/// Run the command on a blocking thread. A termination signal trips the
/// cancellation token and the command's own result is still awaited, so a
/// transfer in flight is abandoned rather than left half done.
async fn run(cli: cli::Cli) -> anyhow::Result<()> {
    let cancel = CancelToken::new();
    let mut worker = tokio::task::spawn_blocking({
        let cancel = cancel.clone();
        move || commands::run_command(cli, cancel)
    });

    tokio::select! {
        res = &mut worker => res.context("command task failed")?,
        () = interrupt() => {
            cancel.cancel();
            let res = worker.await.context("command task failed")?;
            res.and_then(|()| Err(anyhow!("canceled")))
        }
    }
}

/// Resolves on SIGINT or SIGTERM. Never resolves if the handlers cannot be
/// installed.
async fn interrupt() {
    match wait_for_signal().await {
        Ok(signal) => info!(signal, "caught signal, exiting"),
        Err(err) => {
            warn!(error = %err, "cannot listen for termination signals");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res.map(|()| "SIGINT"),
        _ = term.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|()| "ctrl-c")
}
