//! Network Module
//!
//! TCP server and client session handling.
//!
//! ## Architecture
//! - Single acceptor thread
//! - Worker thread pool, one session per worker at a time
//! - Statements routed through Engine

mod server;
mod connection;

pub use server::Server;
pub use connection::Session;
