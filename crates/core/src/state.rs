//! Process-wide supervisor state (§3 SupervisorState).

use crate::ids::WorkerId;

/// The supervisor's top-level phase. Ordered by severity: transitions only
/// ever move right, never left, except the terminal `CrashRecovery` ->
/// `Running` edge taken when the startup child's retry succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifePhase {
    Booting,
    Running,
    SmartShutdown,
    FastShutdown,
    ImmediateShutdown,
    CrashRecovery,
}

impl LifePhase {
    /// Severity used for the "strictly monotonic" shutdown-escalation rule
    /// (§4.7). `CrashRecovery` is orthogonal to the shutdown ladder so it
    /// is not compared against shutdown levels by callers; this ordering
    /// exists only to satisfy `Ord` for the enum derive's sake.
    pub fn is_shutting_down(self) -> bool {
        matches!(
            self,
            LifePhase::SmartShutdown | LifePhase::FastShutdown | LifePhase::ImmediateShutdown
        )
    }
}

/// Which live worker id, if any, occupies a fixed auxiliary role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxiliarySlot {
    Absent,
    Present(WorkerId),
}

impl AuxiliarySlot {
    pub fn is_present(self) -> bool {
        matches!(self, AuxiliarySlot::Present(_))
    }

    pub fn worker_id(self) -> Option<WorkerId> {
        match self {
            AuxiliarySlot::Present(id) => Some(id),
            AuxiliarySlot::Absent => None,
        }
    }
}

/// The five auxiliary subsystems of §4.6, each independently tracked.
#[derive(Debug, Clone, Copy, Default)]
pub struct Auxiliaries {
    pub page_writer: Option<WorkerId>,
    pub archiver: Option<WorkerId>,
    pub stats_collector: Option<WorkerId>,
    pub system_logger: Option<WorkerId>,
}

/// Singleton, process-wide supervisor state (§3).
#[derive(Debug, Clone)]
pub struct SupervisorState {
    pub life_phase: LifePhase,
    /// Present only during Booting and CrashRecovery.
    pub startup_child: Option<WorkerId>,
    pub auxiliaries: Auxiliaries,
    /// Latched on any crash while Running; cleared only when recovery
    /// completes (startup child exits zero).
    pub fatal_error: bool,
}

impl SupervisorState {
    pub fn booting() -> Self {
        Self {
            life_phase: LifePhase::Booting,
            startup_child: None,
            auxiliaries: Auxiliaries::default(),
            fatal_error: false,
        }
    }

    /// New client workers are admissible iff life-phase = Running AND
    /// FatalError = false AND startup child = Absent.
    pub fn clients_admissible(&self) -> bool {
        self.life_phase == LifePhase::Running && !self.fatal_error && self.startup_child.is_none()
    }

    /// Auxiliary "page writer" must be present iff life-phase in {Running,
    /// SmartShutdown, FastShutdown} AND FatalError = false.
    pub fn page_writer_required(&self) -> bool {
        matches!(
            self.life_phase,
            LifePhase::Running | LifePhase::SmartShutdown | LifePhase::FastShutdown
        ) && !self.fatal_error
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
