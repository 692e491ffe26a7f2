//! Scoped acquisition: open on entry, close on every exit path.

use super::handle::SqliteDb;
use super::DbResult;
use log::warn;
use std::ops::{Deref, DerefMut};

/// Open handle that closes itself when dropped, including during unwinding.
///
/// Close errors during drop are logged; call [`OpenGuard::close`] to see them.
#[must_use = "dropping the guard closes the database immediately"]
pub struct OpenGuard<'db> {
    db: &'db mut SqliteDb,
}

impl OpenGuard<'_> {
    /// Closes the handle now and reports the engine's answer.
    pub fn close(self) -> DbResult<()> {
        self.db.close()
    }
}

impl Deref for OpenGuard<'_> {
    type Target = SqliteDb;

    fn deref(&self) -> &Self::Target {
        self.db
    }
}

impl DerefMut for OpenGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.db
    }
}

impl Drop for OpenGuard<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.db.close() {
            warn!("event=db_close module=db status=error scope=guard error={err}");
        }
    }
}

impl SqliteDb {
    /// Opens the handle and returns a guard that closes it when dropped.
    pub fn open_scoped(&mut self) -> DbResult<OpenGuard<'_>> {
        self.open()?;
        Ok(OpenGuard { db: self })
    }

    /// Opens the handle, runs `body`, and closes the handle whatever `body` returns.
    ///
    /// A failure from `body` wins over a failure to close.
    pub fn with_open<T, F>(&mut self, body: F) -> DbResult<T>
    where
        F: FnOnce(&mut SqliteDb) -> DbResult<T>,
    {
        let mut guard = self.open_scoped()?;
        let result = body(&mut *guard);
        let closed = guard.close();
        let value = result?;
        closed?;
        Ok(value)
    }
}
