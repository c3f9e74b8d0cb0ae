//! TCP Server
//!
//! Accepts connections, registers peers and hands each to its own thread.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::Connection;
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::registry::PeerRegistry;

/// State shared by the acceptor and every connection thread
pub struct RouterContext {
    pub config: Config,
    pub registry: PeerRegistry,
    pub dispatcher: Dispatcher,
    pub shutdown: AtomicBool,
}

impl RouterContext {
    pub fn new(config: Config) -> Self {
        let dispatcher = Dispatcher::new(config.router_version.clone());
        Self {
            config,
            registry: PeerRegistry::new(),
            dispatcher,
            shutdown: AtomicBool::new(false),
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.config.poll_interval_ms)
    }
}

/// TCP server for the router
pub struct Server {
    listener: TcpListener,
    context: Arc<RouterContext>,
}

impl Server {
    /// Validate the config and bind the listener
    pub fn bind(config: Config) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(&config.listen_addr)?;
        // Non-blocking so the accept loop can notice shutdown
        listener.set_nonblocking(true)?;

        Ok(Self {
            listener,
            context: Arc::new(RouterContext::new(config)),
        })
    }

    /// The address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Shared router state, including the peer registry
    pub fn context(&self) -> Arc<RouterContext> {
        Arc::clone(&self.context)
    }

    /// Start the server (blocking until `shutdown`)
    pub fn run(&self) -> Result<()> {
        tracing::info!("Router listening on {}", self.local_addr()?);

        let mut workers: Vec<JoinHandle<()>> = Vec::new();

        while !self.context.is_shutting_down() {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    if let Some(worker) = self.admit(stream, addr) {
                        workers.push(worker);
                    }
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                    workers.retain(|w| !w.is_finished());
                    thread::sleep(self.context.poll_interval());
                }
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    thread::sleep(self.context.poll_interval());
                }
            }
        }

        tracing::info!("Shutting down, waiting for {} connections", workers.len());
        for worker in workers {
            let _ = worker.join();
        }

        Ok(())
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.context.shutdown.store(true, Ordering::Relaxed);
    }

    /// Register an accepted peer and spawn its connection thread
    fn admit(&self, stream: TcpStream, addr: SocketAddr) -> Option<JoinHandle<()>> {
        let registry = &self.context.registry;
        let (entry, outbox) =
            match registry.register_with_limit(addr, self.context.config.max_connections) {
                Ok(registered) => registered,
                Err(e) => {
                    tracing::warn!("Rejected connection from {}: {}", addr, e);
                    return None;
                }
            };

        let peer_id = entry.id;
        let mut connection =
            match Connection::new(stream, entry, outbox, Arc::clone(&self.context)) {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!("Failed to set up connection from {}: {}", addr, e);
                    registry.remove(peer_id);
                    return None;
                }
            };

        tracing::info!("{} connected.", addr);

        let context = Arc::clone(&self.context);
        let spawned = thread::Builder::new()
            .name(peer_id.to_string())
            .spawn(move || {
                if let Err(e) = connection.handle() {
                    tracing::warn!("Connection {} ended with error: {}", connection.endpoint(), e);
                }
                context.registry.remove(peer_id);
                tracing::info!("{} disconnected.", connection.endpoint());
            });

        match spawned {
            Ok(worker) => Some(worker),
            Err(e) => {
                tracing::warn!("Failed to spawn connection thread for {}: {}", addr, e);
                registry.remove(peer_id);
                None
            }
        }
    }
}
