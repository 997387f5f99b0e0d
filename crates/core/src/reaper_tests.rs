use super::*;
use crate::ids::CancelSecret;
use crate::registry::{new_entry, WorkerEntry};

fn policy(core_dump_preservation: bool) -> ReaperPolicy {
    ReaperPolicy { core_dump_preservation }
}

fn entry(id: u32) -> WorkerEntry {
    WorkerEntry {
        worker_id: WorkerId::new(id),
        cancel_secret: CancelSecret::new(1),
        created_at_epoch_ms: 0,
    }
}

#[test]
fn startup_child_nonzero_exit_while_booting_aborts_the_supervisor() {
    let mut state = SupervisorState::booting();
    let mut registry = WorkerRegistry::new();
    let effects = reap(&mut state, &mut registry, policy(false), ChildRole::StartupChild, ExitOutcome::NonZero);
    assert_eq!(effects, vec![Effect::ExitSupervisor]);
}

#[test]
fn startup_child_nonzero_exit_during_crash_recovery_retries() {
    let mut state = SupervisorState::booting();
    state.life_phase = LifePhase::CrashRecovery;
    let mut registry = WorkerRegistry::new();
    let effects = reap(&mut state, &mut registry, policy(false), ChildRole::StartupChild, ExitOutcome::NonZero);
    assert_eq!(effects, vec![Effect::RetryStartup]);
}

#[test]
fn startup_child_zero_exit_clears_fatal_error_and_schedules_auxiliaries() {
    let mut state = SupervisorState::booting();
    state.fatal_error = true;
    state.life_phase = LifePhase::CrashRecovery;
    let mut registry = WorkerRegistry::new();
    let effects = reap(&mut state, &mut registry, policy(false), ChildRole::StartupChild, ExitOutcome::Zero);
    assert!(!state.fatal_error);
    assert_eq!(state.life_phase, LifePhase::Running);
    assert!(effects.contains(&Effect::SchedulePageWriter));
    assert!(effects.contains(&Effect::ConditionallyScheduleArchiverAndStats));
}

#[test]
fn page_writer_clean_exit_during_drained_shutdown_is_supervisor_terminal() {
    let mut state = SupervisorState::booting();
    state.life_phase = LifePhase::FastShutdown;
    let mut registry = WorkerRegistry::new();
    let effects = reap(
        &mut state,
        &mut registry,
        policy(false),
        ChildRole::Auxiliary(AuxiliaryKind::PageWriter),
        ExitOutcome::Zero,
    );
    assert_eq!(effects, vec![Effect::ExitSupervisor]);
}

#[test]
fn page_writer_exit_while_running_is_a_crash() {
    let mut state = SupervisorState::booting();
    state.life_phase = LifePhase::Running;
    let mut registry = WorkerRegistry::new();
    registry.insert(entry(9)).unwrap();
    let effects = reap(
        &mut state,
        &mut registry,
        policy(false),
        ChildRole::Auxiliary(AuxiliaryKind::PageWriter),
        ExitOutcome::Zero,
    );
    assert!(state.fatal_error);
    assert_eq!(state.life_phase, LifePhase::CrashRecovery);
    assert!(effects.contains(&Effect::SignalAllWorkers(ChildSignal::Quit)));
}

#[test]
fn archiver_stats_logger_death_is_just_a_restart() {
    for kind in [AuxiliaryKind::Archiver, AuxiliaryKind::Stats, AuxiliaryKind::Logger] {
        let mut state = SupervisorState::booting();
        state.life_phase = LifePhase::Running;
        let mut registry = WorkerRegistry::new();
        let effects = reap(&mut state, &mut registry, policy(false), ChildRole::Auxiliary(kind), ExitOutcome::NonZero);
        assert_eq!(effects, vec![Effect::RestartAuxiliary(kind)]);
        assert!(!state.fatal_error);
    }
}

#[test]
fn worker_zero_exit_just_removes_it_from_the_registry() {
    let mut state = SupervisorState::booting();
    state.life_phase = LifePhase::Running;
    let mut registry = WorkerRegistry::new();
    registry.insert(entry(1)).unwrap();
    let effects = reap(&mut state, &mut registry, policy(false), ChildRole::Worker(WorkerId::new(1)), ExitOutcome::Zero);
    assert!(effects.is_empty());
    assert!(registry.find(WorkerId::new(1)).is_none());
    assert!(!state.fatal_error);
}

#[test]
fn worker_nonzero_exit_enters_crash_recovery_and_signals_the_rest() {
    let mut state = SupervisorState::booting();
    state.life_phase = LifePhase::Running;
    let mut registry = WorkerRegistry::new();
    registry.insert(entry(1)).unwrap();
    registry.insert(entry(2)).unwrap();
    let effects = reap(&mut state, &mut registry, policy(false), ChildRole::Worker(WorkerId::new(1)), ExitOutcome::NonZero);
    assert!(state.fatal_error);
    assert_eq!(state.life_phase, LifePhase::CrashRecovery);
    assert!(registry.find(WorkerId::new(1)).is_none());
    assert!(registry.find(WorkerId::new(2)).is_some());
    assert!(effects.contains(&Effect::SignalAllWorkers(ChildSignal::Quit)));
}

#[test]
fn worker_crash_signals_stop_instead_of_quit_under_core_dump_preservation() {
    let mut state = SupervisorState::booting();
    state.life_phase = LifePhase::Running;
    let mut registry = WorkerRegistry::new();
    registry.insert(entry(1)).unwrap();
    let effects = reap(&mut state, &mut registry, policy(true), ChildRole::Worker(WorkerId::new(1)), ExitOutcome::NonZero);
    assert!(effects.contains(&Effect::SignalAllWorkers(ChildSignal::Stop)));
}

#[test]
fn ready_to_restart_startup_requires_crash_recovery_drained_registry_and_no_page_writer() {
    let mut state = SupervisorState::booting();
    state.life_phase = LifePhase::CrashRecovery;
    let registry = WorkerRegistry::new();
    assert!(ready_to_restart_startup(&state, &registry, false));
    assert!(!ready_to_restart_startup(&state, &registry, true));

    state.life_phase = LifePhase::Running;
    assert!(!ready_to_restart_startup(&state, &registry, false));
}

#[test]
fn new_entry_helper_is_reachable_from_reaper_tests() {
    // Exercises the re-export path used throughout this module's fixtures.
    let clock = crate::clock::FakeClock::new();
    let built = new_entry(WorkerId::new(5), CancelSecret::new(1), &clock);
    assert_eq!(built.worker_id, WorkerId::new(5));
}
