//! Listener set (C1): owns bound listening endpoints and produces
//! accepted raw connections (§4.1).

use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use keeper_core::{AddressFamily, ListenerDescriptor};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream, UnixListener, UnixStream};
use tracing::{info, warn};

use crate::config::{Config, ListenAddress};
use crate::error::LifecycleError;

/// The main loop never blocks longer than this in "wait for ready", so
/// periodic maintenance (auxiliary restart, socket touch) always runs.
pub const MAX_WAIT: Duration = Duration::from_secs(60);

/// How often the local-socket and lock files are touched so external
/// cleaners do not unlink them (§4.1).
pub const TOUCH_INTERVAL: Duration = Duration::from_secs(10 * 60);

enum Endpoint {
    Tcp { listener: TcpListener, family: AddressFamily },
    Local { listener: UnixListener, path: PathBuf },
}

/// Either half of an accepted connection, generalized so the handshake
/// processor can treat network and local-domain clients uniformly.
pub enum AcceptedStream {
    Tcp(TcpStream),
    Local(UnixStream),
}

impl AcceptedStream {
    pub fn split(
        self,
    ) -> (Box<dyn AsyncRead + Unpin + Send>, Box<dyn AsyncWrite + Unpin + Send>) {
        match self {
            AcceptedStream::Tcp(stream) => {
                let (r, w) = stream.into_split();
                (Box::new(r), Box::new(w))
            }
            AcceptedStream::Local(stream) => {
                let (r, w) = stream.into_split();
                (Box::new(r), Box::new(w))
            }
        }
    }
}

pub struct Accepted {
    pub stream: AcceptedStream,
    pub descriptor: ListenerDescriptor,
    pub remote_addr: Option<SocketAddr>,
}

pub struct ListenerSet {
    endpoints: Vec<Endpoint>,
    local_socket_path: Option<PathBuf>,
    lock_path: PathBuf,
}

impl ListenerSet {
    /// Binds every configured endpoint. Fails startup if none binds
    /// (§4.1, §7 BindFailure).
    pub async fn bind(config: &Config) -> Result<Self, LifecycleError> {
        let mut endpoints = Vec::new();

        for addr in &config.listen_addresses {
            let host = match addr {
                ListenAddress::Wildcard => "0.0.0.0".to_string(),
                ListenAddress::Specific(ip) => ip.to_string(),
            };
            let bind_addr = format!("{host}:{port}", port = config.port);
            match TcpListener::bind(&bind_addr).await {
                Ok(listener) => {
                    let family = match addr {
                        ListenAddress::Specific(std::net::IpAddr::V6(_)) => AddressFamily::Inet6,
                        _ => AddressFamily::Inet4,
                    };
                    info!(%bind_addr, "listening");
                    endpoints.push(Endpoint::Tcp { listener, family });
                }
                Err(err) => warn!(%bind_addr, %err, "failed to bind listen address"),
            }
        }

        let local_socket_path = if let Some(dir) = &config.local_socket_directory {
            let path = dir.join(".s.KEEPER.sock");
            let _ = std::fs::remove_file(&path);
            match UnixListener::bind(&path) {
                Ok(listener) => {
                    info!(path = %path.display(), "listening on local socket");
                    endpoints.push(Endpoint::Local { listener, path: path.clone() });
                    Some(path)
                }
                Err(err) => {
                    warn!(path = %path.display(), %err, "failed to bind local socket");
                    None
                }
            }
        } else {
            None
        };

        if endpoints.is_empty() {
            return Err(LifecycleError::BindFailed);
        }

        Ok(Self { endpoints, local_socket_path, lock_path: config.lock_path.clone() })
    }

    /// Waits up to `timeout` for any endpoint to accept a connection.
    /// Returns `None` on timeout, which the caller treats as a tick.
    pub async fn wait_for_ready(&self, timeout: Duration) -> Option<Accepted> {
        let futures: Vec<std::pin::Pin<Box<dyn std::future::Future<Output = Option<Accepted>> + Send + '_>>> =
            self.endpoints.iter().map(|endpoint| Box::pin(Self::accept_one(endpoint)) as _).collect();

        tokio::time::timeout(timeout, select_first(futures)).await.ok().flatten()
    }

    async fn accept_one(endpoint: &Endpoint) -> Option<Accepted> {
        match endpoint {
            Endpoint::Tcp { listener, family } => match listener.accept().await {
                Ok((stream, remote_addr)) => Some(Accepted {
                    stream: AcceptedStream::Tcp(stream),
                    descriptor: ListenerDescriptor { family: *family },
                    remote_addr: Some(remote_addr),
                }),
                Err(err) => {
                    warn!(%err, "accept error on network listener");
                    None
                }
            },
            Endpoint::Local { listener, .. } => match listener.accept().await {
                Ok((stream, _addr)) => Some(Accepted {
                    stream: AcceptedStream::Local(stream),
                    descriptor: ListenerDescriptor { family: AddressFamily::Local },
                    remote_addr: None,
                }),
                Err(err) => {
                    warn!(%err, "accept error on local listener");
                    None
                }
            },
        }
    }

    /// Touches the local-socket and lock files (§4.1 periodic liveness).
    pub fn touch(&self) {
        if let Some(path) = &self.local_socket_path {
            let _ = filetime_touch(path);
        }
        let _ = filetime_touch(&self.lock_path);
    }
}

fn filetime_touch(path: &std::path::Path) -> std::io::Result<()> {
    let now = std::time::SystemTime::now();
    let file = std::fs::OpenOptions::new().write(true).open(path)?;
    drop(file);
    // `set_modified` is a best-effort liveness marker; some filesystems
    // reject it for sockets, which is fine — the open() above already
    // refreshes atime on most platforms.
    let _ = std::fs::File::open(path).and_then(|f| f.set_modified(now));
    Ok(())
}

/// Races an arbitrary number of same-shaped futures and returns the first
/// to complete. `tokio::select!` can't take a runtime-sized list, so each
/// endpoint's accept is polled by hand over a vector of boxed futures.
async fn select_first<T>(
    mut futures: Vec<std::pin::Pin<Box<dyn std::future::Future<Output = Option<T>> + Send + '_>>>,
) -> Option<T> {
    std::future::poll_fn(move |cx| {
        for fut in futures.iter_mut() {
            if let std::task::Poll::Ready(value) = fut.as_mut().poll(cx) {
                return std::task::Poll::Ready(value);
            }
        }
        std::task::Poll::Pending
    })
    .await
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
