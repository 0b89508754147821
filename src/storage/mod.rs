//! Storage Module
//!
//! Append-only table files and the registry of open table handles.
//!
//! ## Responsibilities
//! - Create, open and destroy table files
//! - Append live entries and tombstones, never rewriting in place
//! - Rebuild current row state by replaying the log (last entry wins,
//!   tombstone = absent)
//! - Serialize every operation on a table behind that table's lock
//!
//! ## Concurrency
//! ```text
//!   Engine ──► TableRegistry (RwLock<HashMap<name, Arc<Table>>>)
//!                    │
//!                    ▼
//!               Table (ReentrantMutex) ──► table_<name>.db
//! ```
//! Tables never contend with each other; every operation on one table holds
//! its re-entrant lock, so a statement may take the lock once and call
//! `read_all`/`update`/`delete` inside it.

mod reader;
mod registry;
mod table;

pub use reader::EntryReader;
pub use registry::TableRegistry;
pub use table::{parse_id, Table};
