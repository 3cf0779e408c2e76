//! # Server Lifecycle
//!
//! Drives the node through its phases:
//!
//! ```text
//! Idle -> Connecting -> Listening -> Draining -> Stopped
//! ```
//!
//! - **Connecting**: open the store within `store.connect_timeout`
//! - **Listening**: accept connections, each served on its own task
//! - **Draining**: after a shutdown signal, stop accepting and give in-flight
//!   requests up to `http.write_timeout` to finish
//! - **Stopped**: every connection task has been joined or aborted
//!
//! Failures before or during `Listening` are fatal and carry distinct exit
//! codes (see [`LifecycleError::exit_code`]).

mod shutdown;

pub use shutdown::ShutdownSignal;

use axum::Router;
use cardbox_storage::{connect, ConnectionError, StoreHandle};
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use hyper_util::service::TowerToHyperService;
use std::io::ErrorKind;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::api::{create_router, AppState};
use crate::config::Config;

/// Exit status for an invalid configuration.
pub const EXIT_CONFIG: i32 = 2;
/// Exit status for a failed store connection.
pub const EXIT_STORE: i32 = 5;
/// Exit status for a listener failure.
pub const EXIT_LISTENER: i32 = 6;

/// Lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Connecting,
    /// Accepting connections on the bound address.
    Listening(SocketAddr),
    Draining,
    Stopped,
}

/// Fatal lifecycle errors.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The store could not be reached at startup.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// The listen address could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The listener stopped accepting after startup.
    #[error("listener failed: {0}")]
    Listener(String),
}

impl LifecycleError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            LifecycleError::Connection(_) => EXIT_STORE,
            LifecycleError::Bind { .. } | LifecycleError::Listener(_) => EXIT_LISTENER,
        }
    }
}

/// The Cardbox HTTP server.
pub struct Server {
    config: Config,
    store: Option<StoreHandle>,
    phase: watch::Sender<Phase>,
}

impl Server {
    /// Creates a server in the `Idle` phase.
    pub fn new(config: Config) -> Self {
        let (phase, _) = watch::channel(Phase::Idle);
        Self {
            config,
            store: None,
            phase,
        }
    }

    /// Serves `store` instead of opening `config.store.uri`.
    ///
    /// The store is still pinged while `Connecting`.
    pub fn with_store(mut self, store: StoreHandle) -> Self {
        self.store = Some(store);
        self
    }

    /// Subscribes to phase changes.
    pub fn phase(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    fn enter(&self, phase: Phase) {
        tracing::info!(phase = ?phase, "Lifecycle phase");
        self.phase.send_replace(phase);
    }

    /// Connects to the store configured for this server.
    async fn connect_store(&self) -> Result<StoreHandle, ConnectionError> {
        let store = &self.config.store;

        if let Some(handle) = &self.store {
            return match tokio::time::timeout(store.connect_timeout(), handle.ping()).await {
                Ok(Ok(())) => Ok(handle.clone()),
                Ok(Err(e)) => {
                    tracing::debug!(error = %e, "Store ping failed");
                    Err(ConnectionError)
                }
                Err(_) => {
                    tracing::debug!("Store ping timed out");
                    Err(ConnectionError)
                }
            };
        }

        let handle = connect(
            &store.uri,
            &store.database,
            &store.collection,
            store.connect_timeout(),
        )
        .await?;
        Ok(handle.with_operation_timeout(store.operation_timeout()))
    }

    /// Runs the server until `shutdown` fires, then drains.
    pub async fn run(self, shutdown: ShutdownSignal) -> Result<(), LifecycleError> {
        self.enter(Phase::Connecting);
        let store = match self.connect_store().await {
            Ok(store) => store,
            Err(e) => {
                tracing::error!(uri = %self.config.store.uri, error = %e, "Database connect failed");
                self.enter(Phase::Stopped);
                return Err(e.into());
            }
        };

        let result = self.serve(store.clone(), shutdown).await;
        store.close().await;
        self.enter(Phase::Stopped);
        result
    }

    async fn serve(
        &self,
        store: StoreHandle,
        shutdown: ShutdownSignal,
    ) -> Result<(), LifecycleError> {
        let http = &self.config.http;
        let router = create_router(AppState::new(store), http);

        let listener = TcpListener::bind(&http.listen_addr)
            .await
            .map_err(|source| LifecycleError::Bind {
                addr: http.listen_addr.clone(),
                source,
            })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| LifecycleError::Bind {
                addr: http.listen_addr.clone(),
                source,
            })?;

        tracing::info!(addr = %local_addr, "HTTP server listening");
        self.enter(Phase::Listening(local_addr));

        let mut connections = JoinSet::new();
        let mut stop = std::pin::pin!(shutdown.recv());
        loop {
            tokio::select! {
                _ = &mut stop => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote)) => {
                        connections.spawn(serve_connection(
                            stream,
                            remote,
                            router.clone(),
                            shutdown.clone(),
                        ));
                    }
                    Err(e) if is_connection_error(&e) => {
                        tracing::debug!(error = %e, "Dropped connection during accept");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "HTTP listener failed");
                        connections.shutdown().await;
                        return Err(LifecycleError::Listener(e.to_string()));
                    }
                },
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        }
        drop(listener);

        self.enter(Phase::Draining);
        let deadline = http.write_timeout();
        let drain = async {
            while connections.join_next().await.is_some() {}
        };
        if tokio::time::timeout(deadline, drain).await.is_err() {
            tracing::warn!(
                deadline = ?deadline,
                open = connections.len(),
                "Drain deadline reached, closing connections"
            );
            connections.shutdown().await;
        } else {
            tracing::info!("In-flight requests drained");
        }

        Ok(())
    }
}

/// Errors that concern a single accepted connection, not the listener.
fn is_connection_error(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::ConnectionAborted
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionRefused
            | ErrorKind::Interrupted
    )
}

/// Serves one HTTP/1.1 connection. Once `shutdown` fires the connection
/// finishes its current request and closes.
async fn serve_connection(
    stream: TcpStream,
    remote: SocketAddr,
    router: Router,
    shutdown: ShutdownSignal,
) {
    let service = TowerToHyperService::new(router);
    let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
    tokio::pin!(conn);

    let mut graceful = std::pin::pin!(shutdown.recv());
    let mut closing = false;
    let result = loop {
        tokio::select! {
            result = conn.as_mut() => break result,
            _ = &mut graceful, if !closing => {
                closing = true;
                conn.as_mut().graceful_shutdown();
            }
        }
    };

    if let Err(e) = result {
        tracing::debug!(remote = %remote, error = %e, "Connection closed with error");
    }
}
