//! Black-box specs for `keeperd`: boot a real supervisor against a private
//! data directory and drive it over real sockets and real signals.
//!
//! Scenarios 2 ("cancel round-trip") and 3 ("worker crash recovery") are
//! covered at the unit level instead, in `keeper-core`'s `cancel_tests.rs`/
//! `reaper_tests.rs`/`state_tests.rs` and `keeper-daemon`'s
//! `cancel_router_tests.rs`: discovering an internally-generated cancel
//! secret, or a spawned worker's OS pid in order to kill it, isn't something
//! a client can observe over the wire without an admin/introspection channel
//! this supervisor doesn't have.

mod harness;

use std::io::{Read, Write};
use std::time::Duration;

use harness::*;

/// Scenario 1: a well-formed handshake on a freshly booted supervisor is
/// admitted silently — no rejection frame comes back.
#[test]
fn clean_boot_then_admission() {
    let daemon = Daemon::boot();
    let mut stream = daemon.connect();
    send_all(&mut stream, &version_packet(3, 0, &[("user", "alice")]));
    let reply = read_reply(&mut stream, Duration::from_millis(500));
    assert!(reply.is_empty(), "admitted connections get no reply frame, got {reply:?}");
}

/// Scenario 4: SIGTERM starts a smart shutdown (let in-flight work finish,
/// refuse new connections); a follow-up SIGINT escalates to a fast stop.
/// Either way the process exits cleanly and cleans up its own lock file.
#[test]
fn smart_then_fast_shutdown() {
    let mut daemon = Daemon::boot();
    let lock_path = daemon_lock_path(&daemon);

    daemon.send_signal(nix::sys::signal::Signal::SIGTERM);
    std::thread::sleep(Duration::from_millis(100));
    daemon.send_signal(nix::sys::signal::Signal::SIGINT);

    let code = daemon.wait_for_exit(SPEC_WAIT_MAX_MS);
    assert_eq!(code, Some(0), "keeperd should exit 0 after a smart-then-fast shutdown");
    assert!(!lock_path.exists(), "the lock file should be removed on exit");
}

/// Scenario 5: a startup packet naming an unsupported protocol version gets
/// a one-shot `UNSUPPORTED_PROTOCOL` reply and the connection is dropped.
#[test]
fn unsupported_protocol_gets_a_categorized_reply() {
    let daemon = Daemon::boot();
    let mut stream = daemon.connect();
    send_all(&mut stream, &version_packet(4, 0, &[("user", "dave")]));
    let reply = read_reply(&mut stream, Duration::from_millis(500));
    assert_eq!(&reply[4..], b"UNSUPPORTED_PROTOCOL");
}

/// Scenario 6: a burst of concurrent secure-negotiation requests on a local
/// (unix-socket) listener all get `N` — secure transport is never offered
/// over a local endpoint — and the connection then proceeds normally.
#[test]
fn rapid_secure_negotiation_storm_on_a_local_endpoint() {
    let dir = tempfile::tempdir().expect("create socket dir");
    let daemon = Daemon::boot_with(&["--local-socket-directory", dir.path().to_str().unwrap()]);

    let socket_path = dir.path().join(".s.KEEPER.sock");
    assert!(
        wait_for(SPEC_WAIT_MAX_MS, || socket_path.exists()),
        "keeperd did not create its local socket in time"
    );

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let socket_path = socket_path.clone();
            std::thread::spawn(move || {
                let mut stream = std::os::unix::net::UnixStream::connect(&socket_path)
                    .unwrap_or_else(|err| panic!("connect #{i}: {err}"));
                stream.write_all(&secure_negotiate_packet()).expect("write secure negotiate");
                let mut reply_byte = [0u8; 1];
                stream.read_exact(&mut reply_byte).expect("read secure negotiate reply");
                assert_eq!(reply_byte[0], b'N', "a local endpoint never offers secure transport");

                stream.write_all(&version_packet(3, 0, &[("user", "erin")])).expect("write startup packet");
                stream.set_read_timeout(Some(Duration::from_millis(500))).expect("set read timeout");
                let mut buf = [0u8; 64];
                let n = match stream.read(&mut buf) {
                    Ok(n) => n,
                    Err(_) => 0,
                };
                assert_eq!(n, 0, "an admitted connection gets no reply frame");
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("secure negotiate client thread panicked");
    }
}

fn daemon_lock_path(daemon: &Daemon) -> std::path::PathBuf {
    daemon.data_dir_path().join("keeper.lock")
}
