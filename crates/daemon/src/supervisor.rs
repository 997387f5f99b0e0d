//! The main event loop: ties C1 through C10 together (§5 "a single main
//! thread runs the event loop"). Every suspension point is either the
//! listener's bounded "wait for ready" or a real OS signal; no other
//! operation blocks.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::{Child, Command};
use tracing::{error, info, warn};

use keeper_core::{
    reap, ready_to_restart_startup, step, AdmissionLimits, AuxiliaryKind, ChildRole, ChildSignal,
    ConnectionContext, Effect, JitterEntropy, ReaperPolicy, ShutdownRequest, SignalInput,
    SupervisorState, SystemClock, WorkerId, WorkerRegistry,
};

use crate::aux::{self, AuxiliaryConfig, AuxiliaryTable};
use crate::cancel_router::handle_cancel;
use crate::config::Config;
use crate::error::LifecycleError;
use crate::handshake::{self, HandshakeOutcome};
use crate::listener::{Accepted, ListenerSet, MAX_WAIT};
use crate::reaper::poll_one_exit;
use crate::signals::{deliver, SignalListeners};
use crate::spawn::{handoff_dir, spawn_worker};

/// Everything the main loop owns. Constructed once at boot, after the
/// lock file is held and before the life phase leaves `Booting`.
pub struct Supervisor {
    exe: PathBuf,
    data_dir: PathBuf,
    aux_config: AuxiliaryConfig,
    reaper_policy: ReaperPolicy,
    max_connections: u32,
    secure_transport: bool,

    state: SupervisorState,
    shutdown: ShutdownRequest,
    registry: WorkerRegistry,
    worker_pids: HashMap<WorkerId, u32>,
    worker_children: HashMap<WorkerId, Child>,
    aux_table: AuxiliaryTable,
    startup_child: Option<(WorkerId, Child)>,
    next_worker_id: u32,

    listeners: ListenerSet,
    signals: SignalListeners,
    entropy: JitterEntropy<SystemClock>,
    clock: SystemClock,
}

impl Supervisor {
    pub async fn boot(config: &Config, exe: PathBuf) -> Result<Self, LifecycleError> {
        let listeners = ListenerSet::bind(config).await?;
        let signals = SignalListeners::install()?;
        std::fs::create_dir_all(handoff_dir(&config.data_dir))?;

        let mut supervisor = Self {
            exe,
            data_dir: config.data_dir.clone(),
            aux_config: AuxiliaryConfig {
                archiving_enabled: config.archiving_enabled(),
                log_redirection_enabled: config.log_redirection_enabled(),
            },
            reaper_policy: ReaperPolicy { core_dump_preservation: config.preserve_core_dumps },
            max_connections: config.max_connections,
            secure_transport: config.secure_transport,
            state: SupervisorState::booting(),
            shutdown: ShutdownRequest::none(),
            registry: WorkerRegistry::new(),
            worker_pids: HashMap::new(),
            worker_children: HashMap::new(),
            aux_table: AuxiliaryTable::new(),
            startup_child: None,
            next_worker_id: 1,
            listeners,
            signals,
            entropy: JitterEntropy::new(SystemClock),
            clock: SystemClock,
        };

        supervisor.launch_startup_child().await;
        Ok(supervisor)
    }

    /// Runs until an `ExitSupervisor` effect is produced, then returns the
    /// process exit code.
    pub async fn run(mut self) -> i32 {
        loop {
            tokio::select! {
                accepted = self.listeners.wait_for_ready(MAX_WAIT) => {
                    match accepted {
                        Some(accepted) => self.handle_accept(accepted).await,
                        None => self.handle_tick().await,
                    }
                }
                input = self.signals.next() => {
                    if self.handle_signal(input).await {
                        return 0;
                    }
                }
            }
            self.listeners.touch();
            if self.drain_exits().await {
                return 0;
            }
            self.reconcile_auxiliaries().await;
            self.maybe_restart_startup().await;
        }
    }

    async fn handle_accept(&mut self, accepted: Accepted) {
        let listener = accepted.descriptor;
        let secure_available = self.secure_transport;
        let live_workers = self.registry.len() as u32;
        let limits = AdmissionLimits { max_connections: self.max_connections };

        let (mut reader, mut writer) = accepted.stream.split();
        let outcome = handshake::process(
            &mut reader,
            &mut writer,
            listener,
            secure_available,
            limits,
            || live_workers,
            &self.state,
        )
        .await;

        match outcome {
            HandshakeOutcome::Cancel(request) => {
                let outcome = handle_cancel(&self.registry, &self.worker_pids, request);
                info!(?outcome, "cancel request routed");
            }
            HandshakeOutcome::Admitted(context) => {
                self.spawn_client_worker(context).await;
            }
            HandshakeOutcome::Rejected | HandshakeOutcome::Violation => {
                // The handshake processor already wrote any reply; nothing
                // further to do, the stream is dropped here.
            }
        }
    }

    async fn spawn_client_worker(&mut self, context: ConnectionContext) {
        let worker_id = self.allocate_worker_id();
        let handoff_dir = handoff_dir(&self.data_dir);
        match spawn_worker(&mut self.registry, &self.entropy, &self.clock, &handoff_dir, &self.exe, worker_id, context).await {
            Ok(spawned) => {
                if let Some(pid) = spawned.child.id() {
                    self.worker_pids.insert(worker_id, pid);
                }
                self.worker_children.insert(worker_id, spawned.child);
            }
            Err(err) => warn!(%err, "failed to spawn worker"),
        }
    }

    async fn handle_tick(&mut self) {
        let effects = step(&mut self.state, &mut self.shutdown, self.registry.is_empty(), SignalInput::Tick);
        self.apply_effects(effects).await;
    }

    /// Returns `true` if the supervisor should exit.
    async fn handle_signal(&mut self, input: SignalInput) -> bool {
        let effects = step(&mut self.state, &mut self.shutdown, self.registry.is_empty(), input);
        self.apply_effects(effects).await
    }

    async fn apply_effects(&mut self, effects: Vec<Effect>) -> bool {
        let mut exit = false;
        for effect in effects {
            match effect {
                Effect::RereadConfiguration => info!("configuration reread requested"),
                Effect::SignalAllWorkers(signal) => self.signal_all_workers(signal),
                Effect::SignalAuxiliary(kind, signal) => self.signal_auxiliary(kind, signal),
                Effect::SignalAuxiliariesExceptStats(signal) => {
                    for kind in [AuxiliaryKind::PageWriter, AuxiliaryKind::Archiver, AuxiliaryKind::Logger] {
                        self.signal_auxiliary(kind, signal);
                    }
                }
                Effect::InvokeReaper => {
                    // `drain_exits` itself calls back into `apply_effects`;
                    // boxing this edge keeps the mutual recursion from
                    // producing an infinitely-sized future type.
                    Box::pin(self.drain_exits()).await;
                }
                Effect::ExitSupervisor => exit = true,
                Effect::RetryStartup => self.launch_startup_child().await,
                Effect::SchedulePageWriter | Effect::ConditionallyScheduleArchiverAndStats => {
                    self.reconcile_auxiliaries().await;
                }
                Effect::RestartAuxiliary(kind) => self.restart_auxiliary(kind).await,
            }
        }
        exit
    }

    fn signal_all_workers(&self, signal: ChildSignal) {
        for &pid in self.worker_pids.values() {
            deliver(pid, signal);
        }
    }

    fn signal_auxiliary(&self, kind: AuxiliaryKind, signal: ChildSignal) {
        if let Some(pid) = self.aux_table.pid(kind) {
            deliver(pid, signal);
        }
    }

    async fn restart_auxiliary(&mut self, kind: AuxiliaryKind) {
        if aux::required(kind, &self.state, self.aux_config) && !self.aux_table.is_present(kind) {
            self.spawn_auxiliary(kind).await;
        }
    }

    /// Drains every pending child exit (a single `SIGCHLD` can coalesce
    /// several). Returns `true` if an `ExitSupervisor` effect fired while
    /// reaping.
    async fn drain_exits(&mut self) -> bool {
        loop {
            let Some((role, outcome)) =
                poll_one_exit(&mut self.startup_child, &mut self.aux_table, &mut self.worker_children)
            else {
                return false;
            };
            if let ChildRole::Worker(id) = role {
                self.worker_pids.remove(&id);
            }
            let effects = reap(&mut self.state, &mut self.registry, self.reaper_policy, role, outcome);
            if self.apply_effects(effects).await {
                return true;
            }
        }
    }

    async fn reconcile_auxiliaries(&mut self) {
        for kind in aux::missing(&self.state, self.aux_config, &self.aux_table) {
            self.spawn_auxiliary(kind).await;
        }
    }

    async fn spawn_auxiliary(&mut self, kind: AuxiliaryKind) {
        let worker_id = self.allocate_worker_id();
        let handoff_dir = handoff_dir(&self.data_dir);
        if let Err(err) = aux::spawn_auxiliary(&mut self.aux_table, &handoff_dir, &self.exe, worker_id, kind).await {
            warn!(?kind, %err, "failed to spawn auxiliary");
        }
    }

    async fn maybe_restart_startup(&mut self) {
        let page_writer_present = self.aux_table.is_present(AuxiliaryKind::PageWriter);
        if ready_to_restart_startup(&self.state, &self.registry, page_writer_present) {
            self.launch_startup_child().await;
        }
    }

    async fn launch_startup_child(&mut self) {
        if self.startup_child.is_some() {
            return;
        }
        let worker_id = self.allocate_worker_id();
        match Command::new(&self.exe).arg("--startup-handoff").stdin(Stdio::null()).spawn() {
            Ok(child) => {
                self.state.startup_child = Some(worker_id);
                self.startup_child = Some((worker_id, child));
            }
            Err(err) => {
                error!(%err, "failed to launch startup/recovery child");
            }
        }
    }

    fn allocate_worker_id(&mut self) -> WorkerId {
        let id = WorkerId::new(self.next_worker_id);
        self.next_worker_id += 1;
        id
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
