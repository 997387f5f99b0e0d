//! `keeperd`: the connection-dispatch supervisor binary. Dispatches to one
//! of four roles depending on the hidden flags a re-exec carries (§9
//! "exec-with-handoff"): a plain invocation boots the supervisor itself;
//! `--worker-handoff`/`--aux-handoff`/`--startup-handoff` mean this process
//! is a freshly re-exec'd child taking over a role the supervisor spawned
//! it for.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::path::Path;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use keeper_daemon::{aux_proc, startup_proc, worker_proc, Cli, Config, LifecycleError, Supervisor};
use keeper_storage::{LockFile, OptionsRecord, SpawnPayload};

/// Env var read for the `tracing` `EnvFilter` (§2.1); falls back to `info`.
const LOG_ENV: &str = "RUST_LOG";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.worker_handoff.is_some() || cli.aux_handoff.is_some() || cli.startup_handoff {
        init_stderr_logging();
        std::process::exit(run_handoff_child(&cli).await);
    }

    let config = match Config::resolve(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("keeperd: {err}");
            std::process::exit(err.exit_code());
        }
    };

    let _log_guard = match setup_logging(&config) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("keeperd: {err}");
            std::process::exit(err.exit_code());
        }
    };

    std::process::exit(run_supervisor(&config).await);
}

/// Dispatches a re-exec'd child to its role and returns its exit code.
async fn run_handoff_child(cli: &Cli) -> i32 {
    if let Some(path) = &cli.worker_handoff {
        return run_worker_handoff(path).await;
    }
    if let Some(path) = &cli.aux_handoff {
        return run_aux_handoff(path).await;
    }
    startup_proc::run().await
}

async fn run_worker_handoff(path: &Path) -> i32 {
    let payload = match keeper_storage::read_and_delete(path) {
        Ok(payload) => payload,
        Err(err) => {
            error!(%err, "failed to read worker handoff file");
            return 1;
        }
    };
    let worker_id = match &payload {
        SpawnPayload::Worker { worker_id, .. } => *worker_id,
        SpawnPayload::Auxiliary { .. } => {
            error!("worker handoff file did not contain a worker payload");
            return 1;
        }
    };
    worker_proc::run(worker_id, payload).await
}

async fn run_aux_handoff(path: &Path) -> i32 {
    match keeper_storage::read_and_delete(path) {
        Ok(payload) => aux_proc::run(payload).await,
        Err(err) => {
            error!(%err, "failed to read auxiliary handoff file");
            1
        }
    }
}

/// Boots and runs the supervisor itself: acquires the lock, persists the
/// options record and external pid file, then hands off to [`Supervisor`].
async fn run_supervisor(config: &Config) -> i32 {
    info!(pid = std::process::id(), port = config.port, "keeperd starting");

    let lock = match LockFile::acquire(&config.lock_path, std::process::id(), Some(config.port)) {
        Ok(lock) => lock,
        Err(err) => {
            error!(%err, "failed to acquire the lock file");
            return LifecycleError::from(err).exit_code();
        }
    };

    if let Err(err) = OptionsRecord::from_current_process().write(&config.options_record_path) {
        warn!(%err, "failed to write options record");
    }

    if let Some(pid_path) = config.external_pid_file() {
        if let Err(err) = keeper_storage::pidfile::write(pid_path, std::process::id()) {
            warn!(%err, "failed to write external pid file");
        }
    }

    let exe = match std::env::current_exe() {
        Ok(exe) => exe,
        Err(err) => {
            error!(%err, "failed to resolve the current executable path");
            return 1;
        }
    };

    let supervisor = match Supervisor::boot(config, exe).await {
        Ok(supervisor) => supervisor,
        Err(err) => {
            error!(%err, "failed to boot supervisor");
            return err.exit_code();
        }
    };

    let code = supervisor.run().await;

    if let Some(pid_path) = config.external_pid_file() {
        keeper_storage::pidfile::remove_if_present(pid_path);
    }
    drop(lock);
    let _ = std::fs::remove_file(&config.lock_path);

    info!("keeperd stopped");
    code
}

/// Installs `tracing` once, before the resolved [`Config`] is used for
/// anything else (§2.1). In silent/detached mode the supervisor's own log
/// lines go to the configured log file; otherwise they go to stderr like
/// any other foreground process. Redirected worker/auxiliary stderr is a
/// separate concern, owned by the logger auxiliary (§4.6).
fn setup_logging(config: &Config) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>, LifecycleError> {
    let filter = || EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    if !config.silent {
        tracing_subscriber::registry().with(filter()).with(fmt::layer()).init();
        return Ok(None);
    }

    let log_path = config.log_path();
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file_appender = tracing_appender::rolling::never(
        log_path.parent().ok_or(LifecycleError::NoDataDir)?,
        log_path.file_name().ok_or(LifecycleError::NoDataDir)?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry().with(filter()).with(fmt::layer().with_writer(non_blocking)).init();
    Ok(Some(guard))
}

/// Minimal stderr-only logging for a re-exec'd handoff child: it has no
/// [`Config`] of its own, only the handoff path, so there is no log file to
/// redirect to.
fn init_stderr_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer()).init();
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
