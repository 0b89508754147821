//! TCP Server
//!
//! Accepts connections and dispatches them to worker threads.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, Receiver};

use super::Session;
use crate::config::Config;
use crate::engine::Engine;
use crate::error::{DbError, Result};

/// How long the acceptor sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Pending connections queued per worker before accept blocks
const QUEUE_DEPTH_PER_WORKER: usize = 4;

/// TCP server for MiniDB
pub struct Server {
    config: Config,
    engine: Arc<Engine>,
    listener: TcpListener,
    shutdown: Arc<AtomicBool>,
}

impl Server {
    /// Bind the configured listen address
    ///
    /// Use port 0 to let the OS pick one; see `local_addr`.
    pub fn bind(config: Config, engine: Arc<Engine>) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr).map_err(|e| {
            DbError::Network(format!("Failed to bind {}: {}", config.listen_addr, e))
        })?;
        listener.set_nonblocking(true)?;

        Ok(Self {
            config,
            engine,
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Address the server is listening on
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Flag that stops `run` when set
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Signal the server to stop accepting connections
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Serve until shutdown is signalled (blocking)
    ///
    /// Sessions already handed to a worker run to completion.
    pub fn run(&self) -> Result<()> {
        let workers = self.config.worker_threads;
        let (sender, receiver) = channel::bounded::<TcpStream>(workers * QUEUE_DEPTH_PER_WORKER);

        for id in 0..workers {
            let receiver = receiver.clone();
            let engine = Arc::clone(&self.engine);
            let config = self.config.clone();
            thread::Builder::new()
                .name(format!("minidb-worker-{}", id))
                .spawn(move || worker_loop(receiver, engine, config))?;
        }
        drop(receiver);

        tracing::info!(
            "Listening on {} with {} workers",
            self.local_addr()?,
            workers
        );

        while !self.shutdown.load(Ordering::SeqCst) {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    tracing::trace!("Accepted connection from {}", addr);
                    if let Err(e) = stream.set_nonblocking(false) {
                        tracing::warn!("Dropping connection from {}: {}", addr, e);
                        continue;
                    }
                    if sender.send(stream).is_err() {
                        return Err(DbError::Network("worker pool is gone".to_string()));
                    }
                }
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }
        }

        // Closing the channel lets idle workers exit
        drop(sender);
        tracing::info!("Server shut down");
        Ok(())
    }
}

fn worker_loop(receiver: Receiver<TcpStream>, engine: Arc<Engine>, config: Config) {
    for stream in receiver.iter() {
        let mut session = match Session::new(stream, Arc::clone(&engine)) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Failed to set up session: {}", e);
                continue;
            }
        };

        if let Err(e) = session.set_timeouts(config.read_timeout_ms, config.write_timeout_ms) {
            tracing::warn!("Failed to set timeouts for {}: {}", session.peer_addr(), e);
            continue;
        }

        if let Err(e) = session.handle() {
            tracing::warn!("Session {} ended with error: {}", session.peer_addr(), e);
        }
    }
}
