//! Signal/state machine (C7): an explicit finite-state machine over a
//! small input alphabet, driven synchronously and without involving real
//! signals (§9 Design Notes). `keeper-daemon` is responsible for turning
//! real `SIGHUP`/`SIGTERM`/... delivery (via `tokio::signal::unix`, itself
//! self-pipe based) into [`SignalInput`] values fed to [`step`], and for
//! turning the returned [`Effect`]s into real `kill()` calls and process
//! exits.

use crate::shutdown::{ShutdownLevel, ShutdownRequest};
use crate::state::{LifePhase, SupervisorState};
use serde::{Deserialize, Serialize};

/// The input alphabet C7 reacts to (§9: `{Reload, SmartStop, FastStop,
/// ImmediateStop, ChildExit, Tick}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalInput {
    Reload,
    SmartStop,
    FastStop,
    ImmediateStop,
    ChildExit,
    Tick,
}

/// The logical signal vocabulary emitted to workers and auxiliaries
/// (§6 "Signals emitted to workers/auxiliaries"). `keeper-daemon` maps
/// each variant to a concrete `nix::sys::signal::Signal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildSignal {
    Reload,
    Terminate,
    Quit,
    Stop,
    Interrupt,
    UserDefined1,
    UserDefined2,
}

/// The five auxiliaries of §4.6, named so effects can target one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuxiliaryKind {
    PageWriter,
    Archiver,
    Stats,
    Logger,
}

/// An instruction for `keeper-daemon` to carry out. The state machine
/// never performs I/O itself; it only describes what must happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    RereadConfiguration,
    SignalAllWorkers(ChildSignal),
    SignalAuxiliary(AuxiliaryKind, ChildSignal),
    /// Every auxiliary except the stats collector (§4.7 reload).
    SignalAuxiliariesExceptStats(ChildSignal),
    InvokeReaper,
    ExitSupervisor,
    /// The startup child must be launched again (§4.8, during
    /// `CrashRecovery` or after a drained crash).
    RetryStartup,
    /// The startup child exited zero; the page writer may now start.
    SchedulePageWriter,
    /// The startup child exited zero; the archiver and stats collector
    /// may start if their own preconditions hold (§4.6).
    ConditionallyScheduleArchiverAndStats,
    /// An auxiliary died outside of a crash; restart it on the next tick
    /// (§4.6: archiver, stats collector, system logger).
    RestartAuxiliary(AuxiliaryKind),
}

/// Runs one step of C7. `registry_empty`/`page_writer_present` reflect the
/// caller's current view of C5/C6 and are consulted only to decide whether
/// a pending shutdown has finished draining (§4.7 "once the registry
/// drains...").
pub fn step(
    state: &mut SupervisorState,
    shutdown: &mut ShutdownRequest,
    registry_empty: bool,
    input: SignalInput,
) -> Vec<Effect> {
    let mut effects = Vec::new();
    match input {
        SignalInput::Reload => {
            if state.life_phase <= LifePhase::SmartShutdown {
                effects.push(Effect::RereadConfiguration);
                effects.push(Effect::SignalAllWorkers(ChildSignal::Reload));
                effects.push(Effect::SignalAuxiliariesExceptStats(ChildSignal::Reload));
            }
        }
        SignalInput::SmartStop => {
            if state.life_phase == LifePhase::Running && shutdown.escalate(ShutdownLevel::Smart) {
                state.life_phase = LifePhase::SmartShutdown;
            }
            effects.extend(maybe_finish_draining(state, registry_empty));
        }
        SignalInput::FastStop => {
            let eligible = matches!(state.life_phase, LifePhase::Running | LifePhase::SmartShutdown);
            if eligible && shutdown.escalate(ShutdownLevel::Fast) {
                state.life_phase = LifePhase::FastShutdown;
                effects.push(Effect::SignalAllWorkers(ChildSignal::Terminate));
            }
            effects.extend(maybe_finish_draining(state, registry_empty));
        }
        SignalInput::ImmediateStop => {
            if shutdown.escalate(ShutdownLevel::Immediate) {
                state.life_phase = LifePhase::ImmediateShutdown;
                effects.push(Effect::SignalAllWorkers(ChildSignal::Quit));
                effects.push(Effect::SignalAuxiliary(AuxiliaryKind::PageWriter, ChildSignal::Quit));
                effects.push(Effect::SignalAuxiliary(AuxiliaryKind::Archiver, ChildSignal::Quit));
                effects.push(Effect::SignalAuxiliary(AuxiliaryKind::Stats, ChildSignal::Quit));
                effects.push(Effect::SignalAuxiliary(AuxiliaryKind::Logger, ChildSignal::Quit));
                effects.push(Effect::ExitSupervisor);
            }
        }
        SignalInput::ChildExit => {
            effects.push(Effect::InvokeReaper);
        }
        SignalInput::Tick => {
            effects.extend(maybe_finish_draining(state, registry_empty));
        }
    }
    effects
}

/// Once a shutdown is in progress, the registry has drained, and the
/// startup child is absent: tell the page writer to checkpoint and exit,
/// and tell the archiver/stats collector to exit (§4.7).
fn maybe_finish_draining(state: &SupervisorState, registry_empty: bool) -> Vec<Effect> {
    if state.life_phase.is_shutting_down() && registry_empty && state.startup_child.is_none() {
        vec![
            Effect::SignalAuxiliary(AuxiliaryKind::PageWriter, ChildSignal::Terminate),
            Effect::SignalAuxiliary(AuxiliaryKind::Archiver, ChildSignal::Terminate),
            Effect::SignalAuxiliary(AuxiliaryKind::Stats, ChildSignal::Terminate),
        ]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
#[path = "statemachine_tests.rs"]
mod tests;
