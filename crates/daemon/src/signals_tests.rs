use super::*;

#[yare::parameterized(
    reload = { ChildSignal::Reload, Signal::SIGHUP },
    terminate = { ChildSignal::Terminate, Signal::SIGTERM },
    quit = { ChildSignal::Quit, Signal::SIGQUIT },
    stop = { ChildSignal::Stop, Signal::SIGSTOP },
    interrupt = { ChildSignal::Interrupt, Signal::SIGINT },
    user_defined_1 = { ChildSignal::UserDefined1, Signal::SIGUSR1 },
    user_defined_2 = { ChildSignal::UserDefined2, Signal::SIGUSR2 },
)]
fn maps_each_child_signal_to_its_fixed_os_signal(child_signal: ChildSignal, expected: Signal) {
    assert_eq!(to_os_signal(child_signal), expected);
}

#[test]
fn delivering_to_a_nonexistent_pid_does_not_panic() {
    // A large, almost certainly unallocated pid; never -1 (which `kill`
    // interprets as "every process this caller may signal").
    deliver(999_999, ChildSignal::Terminate);
}
