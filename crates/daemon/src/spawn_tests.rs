use super::*;
use keeper_core::{AddressFamily, FakeClock, FakeEntropy, ListenerDescriptor, ProtocolVersion};
use tempfile::tempdir;

fn context() -> ConnectionContext {
    ConnectionContext::new(ListenerDescriptor { family: AddressFamily::Inet4 }, ProtocolVersion::new(3, 0))
}

#[tokio::test]
async fn successful_spawn_binds_the_cancel_secret_into_the_registry() {
    let dir = tempdir().unwrap();
    let mut registry = WorkerRegistry::new();
    let entropy = FakeEntropy::new(vec![0xDEAD_BEEF]);
    let clock = FakeClock::new();

    // `/bin/true` (or its closest equivalent) stands in for `keeperd` here:
    // the test only cares that something ends up registered with the
    // drawn secret, not that a real worker reads the handoff file.
    let exe = PathBuf::from(if cfg!(target_os = "macos") { "/usr/bin/true" } else { "/bin/true" });

    let spawned = spawn_worker(
        &mut registry,
        &entropy,
        &clock,
        dir.path(),
        &exe,
        WorkerId::new(1),
        context(),
    )
    .await
    .unwrap();

    let entry = registry.find(spawned.worker_id).unwrap();
    assert_eq!(entry.cancel_secret.get(), 0xDEAD_BEEF);
    let _ = spawned.child.wait_with_output().await;
}

#[tokio::test]
async fn spawn_failure_frees_the_preallocated_registry_row() {
    let dir = tempdir().unwrap();
    let mut registry = WorkerRegistry::new();
    let entropy = FakeEntropy::new(vec![7]);
    let clock = FakeClock::new();
    let exe = PathBuf::from("/no/such/executable-for-keeper-tests");

    let result =
        spawn_worker(&mut registry, &entropy, &clock, dir.path(), &exe, WorkerId::new(2), context())
            .await;

    assert!(result.is_err());
    assert!(registry.find(WorkerId::new(2)).is_none());
}

#[tokio::test]
async fn duplicate_worker_id_is_rejected_before_any_spawn_attempt() {
    let dir = tempdir().unwrap();
    let mut registry = WorkerRegistry::new();
    let entropy = FakeEntropy::new(vec![1, 2]);
    let clock = FakeClock::new();
    registry.insert(keeper_core::new_entry(WorkerId::new(3), CancelSecret::new(1), &clock)).unwrap();

    let exe = PathBuf::from("/bin/true");
    let result =
        spawn_worker(&mut registry, &entropy, &clock, dir.path(), &exe, WorkerId::new(3), context())
            .await;

    assert!(matches!(result, Err(SpawnError::AlreadyRegistered)));
}
