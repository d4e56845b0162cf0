pub mod changes;
pub mod error;
pub mod notifications;
pub mod users;

pub use error::StoreError;

use std::path::Path;

use redb::TableDefinition;

use crate::error::backend;

pub(crate) const CHANGE_REQUESTS: TableDefinition<&[u8], &[u8]> =
    TableDefinition::new("change_requests");
pub(crate) const USERS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("users");
pub(crate) const NOTIFICATIONS: TableDefinition<&[u8], &[u8]> =
    TableDefinition::new("notifications");

/// Document store for every persisted entity, one redb table per kind.
/// Keys are the raw 12-byte record ids, values are JSON documents.
pub struct KanriStore {
    db: redb::Database,
}

impl KanriStore {
    /// Open the database file, creating it (and the tables) if absent.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = redb::Database::create(path).map_err(backend)?;
        let store = Self { db };
        store.ensure_tables()?;
        Ok(store)
    }

    /// Tables are created up front so read transactions never have to
    /// handle a missing table.
    fn ensure_tables(&self) -> Result<(), StoreError> {
        let txn = self.db.begin_write().map_err(backend)?;
        txn.open_table(CHANGE_REQUESTS).map_err(backend)?;
        txn.open_table(USERS).map_err(backend)?;
        txn.open_table(NOTIFICATIONS).map_err(backend)?;
        txn.commit().map_err(backend)?;
        Ok(())
    }

    pub(crate) fn db(&self) -> &redb::Database {
        &self.db
    }
}
