//! # MiniDB
//!
//! A small relational database over per-table append-only files with:
//! - Typed schemas (INT, FLOAT, TEXT, BOOL, SERIAL) and value coercion
//! - A minimal SQL dialect with boolean WHERE expressions
//! - Tombstone deletes and last-entry-wins reads
//! - Per-table locking for safe concurrent sessions
//! - A line-delimited JSON protocol over TCP
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │              (Worker pool, one session each)                 │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ statement text
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   Query Engine                               │
//! │        (parse → dispatch → filter / sort / project)          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  SQL / Expr │          │   Storage   │
//!   │  (parsing)  │          │ (per table) │
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                                   ▼
//!                           ┌─────────────┐
//!                           │ table_*.db  │
//!                           │  (append)   │
//!                           └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod types;
pub mod format;
pub mod storage;
pub mod sql;
pub mod expr;
pub mod network;
pub mod protocol;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{DbError, Result};
pub use config::Config;
pub use engine::Engine;
pub use protocol::QueryResult;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of MiniDB
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
