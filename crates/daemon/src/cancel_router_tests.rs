use super::*;
use keeper_core::{new_entry, CancelSecret, FakeClock};

#[test]
fn a_matching_request_is_delivered_and_reported() {
    let clock = FakeClock::new();
    let mut registry = WorkerRegistry::new();
    let worker_id = WorkerId::new(1);
    registry.insert(new_entry(worker_id, CancelSecret::new(0xABCD), &clock)).unwrap();
    let mut pids = HashMap::new();
    pids.insert(worker_id, 999_999);

    let request = CancelRequest { worker_id, cancel_secret: CancelSecret::new(0xABCD) };
    let outcome = handle_cancel(&registry, &pids, request);

    assert_eq!(outcome, CancelOutcome::Delivered(worker_id));
}

#[test]
fn a_secret_mismatch_is_silent() {
    let clock = FakeClock::new();
    let mut registry = WorkerRegistry::new();
    let worker_id = WorkerId::new(2);
    registry.insert(new_entry(worker_id, CancelSecret::new(0xABCD), &clock)).unwrap();
    let pids = HashMap::new();

    let request = CancelRequest { worker_id, cancel_secret: CancelSecret::new(0x1234) };
    assert_eq!(handle_cancel(&registry, &pids, request), CancelOutcome::Silent);
}

#[test]
fn an_unknown_worker_id_is_silent() {
    let registry = WorkerRegistry::new();
    let pids = HashMap::new();
    let request = CancelRequest { worker_id: WorkerId::new(77), cancel_secret: CancelSecret::new(1) };
    assert_eq!(handle_cancel(&registry, &pids, request), CancelOutcome::Silent);
}
