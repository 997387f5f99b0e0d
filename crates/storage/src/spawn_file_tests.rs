use super::*;
use keeper_core::{AddressFamily, ListenerDescriptor, ProtocolVersion, WorkerId};
use tempfile::tempdir;

#[test]
fn worker_payload_round_trips_and_is_deleted_after_reading() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("spawn-abc123.json");
    let context = ConnectionContext::new(
        ListenerDescriptor { family: AddressFamily::Inet4 },
        ProtocolVersion::new(3, 0),
    );
    let payload = SpawnPayload::Worker { worker_id: WorkerId::new(7), context };
    write(&path, &payload).unwrap();
    assert!(path.exists());

    let read_back = read_and_delete(&path).unwrap();
    assert!(!path.exists());
    match read_back {
        SpawnPayload::Worker { worker_id, .. } => assert_eq!(worker_id, WorkerId::new(7)),
        SpawnPayload::Auxiliary { .. } => panic!("expected Worker payload"),
    }
}

#[test]
fn auxiliary_payload_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("spawn-xyz.json");
    write(&path, &SpawnPayload::Auxiliary { kind: AuxiliaryKind::Archiver }).unwrap();
    match read_and_delete(&path).unwrap() {
        SpawnPayload::Auxiliary { kind } => assert_eq!(kind, AuxiliaryKind::Archiver),
        SpawnPayload::Worker { .. } => panic!("expected Auxiliary payload"),
    }
}
