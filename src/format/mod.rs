//! Binary File Format Module
//!
//! Framing and primitive encodings for table files. This is the only
//! on-disk compatibility surface of MiniDB.
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Header (written once at creation)                       │
//! │   Magic: "MINIDB\0\0" (8) | Version: u8 (1)             │
//! │   SchemaLen: u32 BE (4) | Schema JSON (SchemaLen)       │
//! ├─────────────────────────────────────────────────────────┤
//! │ Entry (append-only, repeated)                           │
//! │   Flag: u8 (0 = live, 1 = tombstone) | Id: 16 bytes     │
//! │   live only: one value per non-_id column, in order     │
//! │     INT   → i64 BE (8)                                  │
//! │     FLOAT → f64 BE (8)                                  │
//! │     BOOL  → u8 (1)                                      │
//! │     TEXT  → u32 BE length (4) + UTF-8 bytes             │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no checksum: corruption is only detected through length and
//! structure mismatches.

mod header;
mod record;

pub use header::{read_header, write_header};
pub use record::{encode_entry, read_entry, StoredEntry};

// =============================================================================
// Shared Constants
// =============================================================================

/// Magic bytes identifying a MiniDB table file
pub const MAGIC: &[u8; 8] = b"MINIDB\0\0";

/// Current table format version
pub const VERSION: u8 = 1;

/// Fixed header prefix: Magic (8) + Version (1) + SchemaLen (4) = 13 bytes
pub const HEADER_PREFIX_SIZE: u64 = 13;

/// Entry prefix: Flag (1) + Id (16) = 17 bytes
pub const ENTRY_PREFIX_SIZE: usize = 17;

/// Flag byte of a live entry
pub const LIVE_FLAG: u8 = 0;

/// Flag byte of a tombstone entry
pub const TOMBSTONE_FLAG: u8 = 1;
