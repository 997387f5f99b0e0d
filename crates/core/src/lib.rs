// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! keeper-core: pure data model and decision logic for the connection-
//! dispatch supervisor. Nothing in this crate touches the network, a
//! process table, or a real clock/RNG unless explicitly asked to via the
//! `SystemClock`/`JitterEntropy` constructors — every decision function is
//! a plain function of its inputs so it can be driven directly from tests.

pub mod admission;
pub mod cancel;
pub mod clock;
pub mod connection;
pub mod entropy;
pub mod ids;
pub mod reaper;
pub mod registry;
pub mod shutdown;
pub mod state;
pub mod statemachine;

pub use admission::{admit, AdmissionLimits, AdmissionVerdict, RejectionCategory};
pub use cancel::{route, CancelOutcome, CancelRequest};
pub use clock::{Clock, SystemClock};
#[cfg(any(test, feature = "test-support"))]
pub use clock::FakeClock;
pub use connection::{AddressFamily, ConnectionContext, ConnectionOption, ListenerDescriptor, ProtocolVersion};
pub use entropy::{EntropySource, JitterEntropy};
#[cfg(any(test, feature = "test-support"))]
pub use entropy::FakeEntropy;
pub use ids::{CancelSecret, WorkerId};
pub use reaper::{reap, ready_to_restart_startup, ChildRole, ExitOutcome, ReaperPolicy};
pub use registry::{new_entry, RegistryError, WorkerEntry, WorkerRegistry};
pub use shutdown::{ShutdownLevel, ShutdownRequest};
pub use state::{Auxiliaries, AuxiliarySlot, LifePhase, SupervisorState};
pub use statemachine::{step, AuxiliaryKind, ChildSignal, Effect, SignalInput};
