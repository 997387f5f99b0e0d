//! Shared scaffolding for the `keeperd` binary-level specs: spawning a real
//! supervisor in an isolated data directory and speaking its wire format
//! by hand.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::process::{Child, Command};
use std::time::{Duration, Instant};

pub const SPEC_WAIT_MAX_MS: u64 = 5_000;

/// A `keeperd` process running against a private, temporary data directory.
/// Killed on drop so a failing assertion never leaves an orphan supervisor
/// behind.
pub struct Daemon {
    pub child: Child,
    pub port: u16,
    _data_dir: tempfile::TempDir,
}

impl Daemon {
    /// Boots `keeperd` with a wildcard-free loopback listener on a free
    /// port, waiting until its lock file appears before returning.
    pub fn boot() -> Self {
        Self::boot_with(&[])
    }

    pub fn boot_with(extra_args: &[&str]) -> Self {
        let data_dir = tempfile::tempdir().expect("create temp data dir");
        let port = free_port();

        let bin = assert_cmd::cargo::cargo_bin("keeperd");
        let mut command = Command::new(bin);
        command
            .arg("--data-directory")
            .arg(data_dir.path())
            .arg("--listen-addresses")
            .arg("127.0.0.1")
            .arg("--port")
            .arg(port.to_string())
            .args(extra_args);
        let child = command.spawn().expect("spawn keeperd");

        let lock_path = data_dir.path().join("keeper.lock");
        let ready = wait_for(SPEC_WAIT_MAX_MS, || lock_path.exists());
        assert!(ready, "keeperd did not create its lock file in time");
        // Give the listener a moment past lock acquisition to finish
        // `bind()`; the lock file is written before the listeners are up.
        std::thread::sleep(Duration::from_millis(100));

        Self { child, port, _data_dir: data_dir }
    }

    pub fn connect(&self) -> TcpStream {
        TcpStream::connect(("127.0.0.1", self.port)).expect("connect to keeperd")
    }

    pub fn data_dir_path(&self) -> &std::path::Path {
        self._data_dir.path()
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    pub fn send_signal(&self, signal: nix::sys::signal::Signal) {
        let pid = nix::unistd::Pid::from_raw(self.pid() as i32);
        nix::sys::signal::kill(pid, signal).expect("signal keeperd");
    }

    /// Waits for the process to exit on its own, returning its exit code.
    pub fn wait_for_exit(&mut self, max_ms: u64) -> Option<i32> {
        let deadline = Instant::now() + Duration::from_millis(max_ms);
        while Instant::now() < deadline {
            if let Ok(Some(status)) = self.child.try_wait() {
                return status.code();
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        None
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Polls `condition` until it is true or `max_ms` elapses, matching the
/// teacher's own spec-harness polling style.
pub fn wait_for(max_ms: u64, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_millis(max_ms);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    condition()
}

fn free_port() -> u16 {
    std::net::TcpListener::bind(("127.0.0.1", 0))
        .expect("bind ephemeral port")
        .local_addr()
        .expect("read local addr")
        .port()
}

/// Frames a body with the 4-byte big-endian length prefix (§6).
pub fn frame(body: &[u8]) -> Vec<u8> {
    let mut framed = Vec::new();
    framed.extend_from_slice(&((body.len() + 4) as u32).to_be_bytes());
    framed.extend_from_slice(body);
    framed
}

/// Builds a version-N startup packet body with the given name/value pairs.
pub fn version_packet(major: u16, minor: u16, pairs: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&(((major as u32) << 16) | minor as u32).to_be_bytes());
    for (name, value) in pairs {
        body.extend_from_slice(name.as_bytes());
        body.push(0);
        body.extend_from_slice(value.as_bytes());
        body.push(0);
    }
    body.push(0);
    frame(&body)
}

pub fn secure_negotiate_packet() -> Vec<u8> {
    frame(&80_877_103u32.to_be_bytes())
}

/// Reads whatever bytes the peer sends within `timeout`, returning an empty
/// vector on timeout (taken to mean "no reply", i.e. the handshake was
/// admitted and no rejection frame was written).
pub fn read_reply(stream: &mut TcpStream, timeout: Duration) -> Vec<u8> {
    stream.set_read_timeout(Some(timeout)).expect("set read timeout");
    let mut buf = vec![0u8; 256];
    match stream.read(&mut buf) {
        Ok(0) | Err(_) => Vec::new(),
        Ok(n) => buf[..n].to_vec(),
    }
}

pub fn send_all(stream: &mut TcpStream, bytes: &[u8]) {
    stream.write_all(bytes).expect("write to keeperd");
}
