// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! keeper-daemon: the `keeperd` binary's library half. Wires the pure
//! decision logic in `keeper-core` to real sockets, real signals, and
//! real child processes.

pub mod aux;
pub mod aux_proc;
pub mod cancel_router;
pub mod config;
pub mod error;
pub mod handshake;
pub mod listener;
pub mod reaper;
pub mod signals;
pub mod spawn;
pub mod startup_proc;
pub mod supervisor;
pub mod worker_proc;

pub use config::{Cli, Config};
pub use error::LifecycleError;
pub use supervisor::Supervisor;
