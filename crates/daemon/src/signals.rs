//! Real OS signal delivery: maps incoming `SIGHUP`/`SIGTERM`/... to
//! [`SignalInput`] for C7, and maps outgoing [`ChildSignal`] effects to
//! real `kill(2)` calls (§6 "Signals consumed" / "Signals emitted").

use keeper_core::{ChildSignal, SignalInput};
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::signal::unix::{signal as unix_signal, SignalKind};
use tracing::warn;

/// The six real-signal listeners the main loop selects over. `Tick` has no
/// corresponding OS signal; it is produced by the main loop's own
/// bounded-wait timeout (§5).
pub struct SignalListeners {
    pub reload: tokio::signal::unix::Signal,
    pub smart_stop: tokio::signal::unix::Signal,
    pub fast_stop: tokio::signal::unix::Signal,
    pub immediate_stop: tokio::signal::unix::Signal,
    pub child_exit: tokio::signal::unix::Signal,
}

impl SignalListeners {
    pub fn install() -> std::io::Result<Self> {
        Ok(Self {
            reload: unix_signal(SignalKind::hangup())?,
            smart_stop: unix_signal(SignalKind::terminate())?,
            fast_stop: unix_signal(SignalKind::interrupt())?,
            immediate_stop: unix_signal(SignalKind::quit())?,
            child_exit: unix_signal(SignalKind::child())?,
        })
    }

    /// Waits for the next real signal and maps it to C7's input alphabet.
    pub async fn next(&mut self) -> SignalInput {
        tokio::select! {
            _ = self.reload.recv() => SignalInput::Reload,
            _ = self.smart_stop.recv() => SignalInput::SmartStop,
            _ = self.fast_stop.recv() => SignalInput::FastStop,
            _ = self.immediate_stop.recv() => SignalInput::ImmediateStop,
            _ = self.child_exit.recv() => SignalInput::ChildExit,
        }
    }
}

pub(crate) fn to_os_signal(signal: ChildSignal) -> Signal {
    match signal {
        ChildSignal::Reload => Signal::SIGHUP,
        ChildSignal::Terminate => Signal::SIGTERM,
        ChildSignal::Quit => Signal::SIGQUIT,
        ChildSignal::Stop => Signal::SIGSTOP,
        ChildSignal::Interrupt => Signal::SIGINT,
        ChildSignal::UserDefined1 => Signal::SIGUSR1,
        ChildSignal::UserDefined2 => Signal::SIGUSR2,
    }
}

/// Delivers a logical [`ChildSignal`] to a real process by pid. Best-effort:
/// a child that already exited produces `ESRCH`, which is not logged as a
/// failure since it is the expected race between reaper and signal delivery.
pub fn deliver(pid: u32, child_signal: ChildSignal) {
    let os_signal = to_os_signal(child_signal);
    let target = Pid::from_raw(pid as i32);
    if let Err(err) = signal::kill(target, os_signal) {
        if err != nix::errno::Errno::ESRCH {
            warn!(pid, ?child_signal, %err, "failed to deliver signal");
        }
    }
}

#[cfg(test)]
#[path = "signals_tests.rs"]
mod tests;
