//! Reaper (C8): classifies drained child-exit notifications and drives
//! crash recovery or normal cleanup. `keeper-daemon` owns the actual
//! non-blocking `waitpid`-equivalent loop and the worker-id-to-pid table;
//! this module is the pure classification and state-transition logic so
//! it can be driven by tests without any real child processes (§9).

use crate::ids::WorkerId;
use crate::registry::WorkerRegistry;
use crate::state::{LifePhase, SupervisorState};
use crate::statemachine::{AuxiliaryKind, ChildSignal, Effect};

/// Which child exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildRole {
    StartupChild,
    Auxiliary(AuxiliaryKind),
    Worker(WorkerId),
}

/// Its exit status, collapsed to the only distinction §4.8 cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Zero,
    NonZero,
}

/// Whether core-dump preservation mode is configured (§4.8: "signal every
/// other worker with quit (or stop if core-dump preservation mode is
/// configured)").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaperPolicy {
    pub core_dump_preservation: bool,
}

/// Classifies one child exit and applies the resulting state mutation,
/// returning the effects `keeper-daemon` must carry out.
pub fn reap(
    state: &mut SupervisorState,
    registry: &mut WorkerRegistry,
    policy: ReaperPolicy,
    role: ChildRole,
    outcome: ExitOutcome,
) -> Vec<Effect> {
    match role {
        ChildRole::StartupChild => reap_startup_child(state, outcome),
        ChildRole::Auxiliary(AuxiliaryKind::PageWriter) => reap_page_writer(state, registry, policy, outcome),
        ChildRole::Auxiliary(kind) => vec![Effect::RestartAuxiliary(kind)],
        ChildRole::Worker(id) => reap_worker(state, registry, policy, id, outcome),
    }
}

fn reap_startup_child(state: &mut SupervisorState, outcome: ExitOutcome) -> Vec<Effect> {
    match outcome {
        ExitOutcome::NonZero => match state.life_phase {
            LifePhase::Booting => vec![Effect::ExitSupervisor],
            _ => vec![Effect::RetryStartup],
        },
        ExitOutcome::Zero => {
            state.fatal_error = false;
            state.startup_child = None;
            if matches!(state.life_phase, LifePhase::Booting | LifePhase::CrashRecovery) {
                state.life_phase = LifePhase::Running;
            }
            vec![Effect::SchedulePageWriter, Effect::ConditionallyScheduleArchiverAndStats]
        }
    }
}

fn reap_page_writer(
    state: &mut SupervisorState,
    registry: &WorkerRegistry,
    policy: ReaperPolicy,
    outcome: ExitOutcome,
) -> Vec<Effect> {
    let clean_shutdown_exit =
        outcome == ExitOutcome::Zero && state.life_phase.is_shutting_down() && registry.is_empty() && state.startup_child.is_none();
    if clean_shutdown_exit {
        vec![Effect::ExitSupervisor]
    } else {
        enter_crash_recovery(state, policy)
    }
}

fn reap_worker(
    state: &mut SupervisorState,
    registry: &mut WorkerRegistry,
    policy: ReaperPolicy,
    id: WorkerId,
    outcome: ExitOutcome,
) -> Vec<Effect> {
    registry.remove(id);
    match outcome {
        ExitOutcome::Zero => Vec::new(),
        ExitOutcome::NonZero => enter_crash_recovery(state, policy),
    }
}

/// Marks `FatalError`, enters `CrashRecovery`, and signals every remaining
/// worker and the non-logger auxiliaries to quit (the logger is retained
/// so crash diagnostics are not lost, §4.8).
fn enter_crash_recovery(state: &mut SupervisorState, policy: ReaperPolicy) -> Vec<Effect> {
    state.fatal_error = true;
    state.life_phase = LifePhase::CrashRecovery;
    let worker_signal = if policy.core_dump_preservation { ChildSignal::Stop } else { ChildSignal::Quit };
    vec![
        Effect::SignalAllWorkers(worker_signal),
        Effect::SignalAuxiliary(AuxiliaryKind::PageWriter, ChildSignal::Quit),
        Effect::SignalAuxiliary(AuxiliaryKind::Archiver, ChildSignal::Quit),
        Effect::SignalAuxiliary(AuxiliaryKind::Stats, ChildSignal::Quit),
    ]
}

/// Whether it is time to launch a new startup child during crash recovery:
/// only once the worker registry and the page writer are both drained
/// (§4.8: "do not restart the startup child until the registry and page
/// writer are both drained").
pub fn ready_to_restart_startup(
    state: &SupervisorState,
    registry: &WorkerRegistry,
    page_writer_present: bool,
) -> bool {
    state.life_phase == LifePhase::CrashRecovery
        && state.startup_child.is_none()
        && registry.is_empty()
        && !page_writer_present
}

#[cfg(test)]
#[path = "reaper_tests.rs"]
mod tests;
