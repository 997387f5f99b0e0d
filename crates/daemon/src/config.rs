//! CLI surface and resolved configuration (§6 "CLI surface (supervisor
//! invocation)").

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::error::LifecycleError;

/// Environment variable that may substitute for `--data-directory` (§6
/// "Environment").
const DATA_DIR_ENV: &str = "KEEPER_DATA_DIR";

#[derive(Debug, Parser)]
#[command(name = "keeperd", version, about = "Connection-dispatch supervisor")]
pub struct Cli {
    /// Data directory holding the lock file, options record, and pid file.
    #[arg(long = "data-directory", short = 'D')]
    pub data_directory: Option<PathBuf>,

    /// Comma/whitespace-separated list of listen addresses; `*` means all.
    #[arg(long = "listen-addresses", default_value = "127.0.0.1")]
    pub listen_addresses: String,

    /// Port shared by every network listen address.
    #[arg(long, default_value_t = 5432)]
    pub port: u16,

    /// Directory holding the local-domain-socket endpoint, if any.
    #[arg(long = "local-socket-directory")]
    pub local_socket_directory: Option<PathBuf>,

    /// Configured maximum connections (the true cap; see §4.3's soft cap).
    #[arg(long = "max-connections", default_value_t = 100)]
    pub max_connections: u32,

    /// Shared buffer count, forwarded to workers but otherwise opaque here.
    #[arg(long = "buffers", default_value_t = 128)]
    pub buffer_count: u32,

    /// Enable secure-transport negotiation on network endpoints.
    #[arg(long = "secure-transport")]
    pub secure_transport: bool,

    /// Run detached, without inheriting the invoking terminal.
    #[arg(long = "silent")]
    pub silent: bool,

    /// Opaque string forwarded verbatim to each spawned worker.
    #[arg(long = "extra-worker-options", default_value = "")]
    pub extra_worker_options: String,

    /// Preserve core dumps on worker crash: signal `stop` instead of `quit`
    /// when entering crash recovery (§4.8).
    #[arg(long = "preserve-core-dumps")]
    pub preserve_core_dumps: bool,

    /// Named configuration assignments (`name=value`), repeatable.
    #[arg(short = 'c', value_parser = parse_name_value)]
    pub settings: Vec<(String, String)>,

    /// Hidden: this process is a re-exec'd worker reading its handoff file.
    #[arg(long = "worker-handoff", hide = true)]
    pub worker_handoff: Option<PathBuf>,

    /// Hidden: this process is a re-exec'd auxiliary reading its handoff file.
    #[arg(long = "aux-handoff", hide = true)]
    pub aux_handoff: Option<PathBuf>,

    /// Hidden: this process is the re-exec'd startup/recovery child.
    #[arg(long = "startup-handoff", hide = true)]
    pub startup_handoff: bool,
}

fn parse_name_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected name=value, got {raw:?}"))
}

/// Resolved configuration, derived once from [`Cli`] plus environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub listen_addresses: Vec<ListenAddress>,
    pub port: u16,
    pub local_socket_directory: Option<PathBuf>,
    pub max_connections: u32,
    pub buffer_count: u32,
    pub extra_worker_options: String,
    pub secure_transport: bool,
    pub preserve_core_dumps: bool,
    pub silent: bool,
    pub settings: Vec<(String, String)>,
    pub lock_path: PathBuf,
    pub options_record_path: PathBuf,
    pub pid_file_path: Option<PathBuf>,
}

impl Config {
    /// Looks up a `name=value` setting passed via `-c` (§6). There is no
    /// dedicated flag for archiving or log redirection; like real
    /// configuration GUCs, they are named settings rather than first-class
    /// CLI options.
    pub fn setting(&self, name: &str) -> Option<&str> {
        self.settings.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    pub fn archiving_enabled(&self) -> bool {
        self.setting("archive_mode") == Some("on")
    }

    pub fn log_redirection_enabled(&self) -> bool {
        self.setting("logging_collector") == Some("on")
    }

    /// The optional external pid file (§6 "Persisted state"), named like
    /// any other setting rather than given a dedicated flag, matching real
    /// Postgres's `external_pid_file` GUC. Resolved once in [`Config::resolve`].
    pub fn external_pid_file(&self) -> Option<&PathBuf> {
        self.pid_file_path.as_ref()
    }

    /// Log file used in silent/detached mode; the supervisor's own
    /// `tracing` output goes here, separate from the redirected
    /// worker/auxiliary stderr the logger auxiliary collects.
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("log").join("keeper.log")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenAddress {
    Wildcard,
    Specific(IpAddr),
}

impl Config {
    pub fn resolve(cli: &Cli) -> Result<Self, LifecycleError> {
        let data_dir = cli
            .data_directory
            .clone()
            .or_else(|| std::env::var(DATA_DIR_ENV).ok().map(PathBuf::from))
            .ok_or(LifecycleError::NoDataDir)?;
        if !data_dir.is_dir() {
            return Err(LifecycleError::DataDirUnreadable(data_dir));
        }

        let listen_addresses = cli
            .listen_addresses
            .split([',', ' ', '\t'])
            .filter(|s| !s.is_empty())
            .map(parse_listen_address)
            .collect();

        let pid_file_path = cli
            .settings
            .iter()
            .find(|(name, _)| name == "external_pid_file")
            .map(|(_, value)| PathBuf::from(value));

        Ok(Self {
            lock_path: data_dir.join("keeper.lock"),
            options_record_path: data_dir.join("keeper.options.json"),
            pid_file_path,
            data_dir,
            listen_addresses,
            port: cli.port,
            local_socket_directory: cli.local_socket_directory.clone(),
            max_connections: cli.max_connections,
            buffer_count: cli.buffer_count,
            extra_worker_options: cli.extra_worker_options.clone(),
            secure_transport: cli.secure_transport,
            preserve_core_dumps: cli.preserve_core_dumps,
            silent: cli.silent,
            settings: cli.settings.clone(),
        })
    }
}

fn parse_listen_address(raw: &str) -> ListenAddress {
    if raw == "*" {
        ListenAddress::Wildcard
    } else {
        raw.parse::<IpAddr>().map(ListenAddress::Specific).unwrap_or(ListenAddress::Wildcard)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
