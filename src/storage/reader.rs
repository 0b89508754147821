//! Entry Reader
//!
//! Sequential scan over the entries of a table file.

use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::Path;

use parking_lot::ReentrantMutexGuard;

use crate::error::Result;
use crate::format::{read_entry, StoredEntry};
use crate::types::Schema;

/// Iterates entries from the data offset to end of file, in append order
///
/// Stops after the first error. Holds the table lock until dropped.
pub struct EntryReader<'a> {
    reader: BufReader<File>,
    schema: &'a Schema,
    done: bool,
    _guard: ReentrantMutexGuard<'a, ()>,
}

impl<'a> EntryReader<'a> {
    /// Open `path` positioned at `data_offset`
    pub(crate) fn open(
        path: &Path,
        schema: &'a Schema,
        data_offset: u64,
        guard: ReentrantMutexGuard<'a, ()>,
    ) -> Result<Self> {
        let mut file = File::open(path)?;
        file.seek(SeekFrom::Start(data_offset))?;

        Ok(Self {
            reader: BufReader::new(file),
            schema,
            done: false,
            _guard: guard,
        })
    }

    /// Read the next entry, `Ok(None)` at end of log
    pub fn next_entry(&mut self) -> Result<Option<StoredEntry>> {
        if self.done {
            return Ok(None);
        }
        let entry = read_entry(&mut self.reader, self.schema);
        if !matches!(entry, Ok(Some(_))) {
            self.done = true;
        }
        entry
    }
}

impl Iterator for EntryReader<'_> {
    type Item = Result<StoredEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().transpose()
    }
}
