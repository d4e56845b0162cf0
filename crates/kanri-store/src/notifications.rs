use redb::ReadableTable;

use kanri_core::id::{NotificationId, UserId};
use kanri_core::types::Notification;

use crate::error::{backend, decode, encode};
use crate::{KanriStore, StoreError, NOTIFICATIONS};

impl KanriStore {
    pub fn insert_notification(&self, n: &Notification) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(n).map_err(encode)?;
        let txn = self.db().begin_write().map_err(backend)?;
        {
            let mut table = txn.open_table(NOTIFICATIONS).map_err(backend)?;
            table
                .insert(n.id.as_bytes().as_slice(), bytes.as_slice())
                .map_err(backend)?;
        }
        txn.commit().map_err(backend)?;
        Ok(())
    }

    pub fn get_notification(
        &self,
        id: &NotificationId,
    ) -> Result<Option<Notification>, StoreError> {
        let txn = self.db().begin_read().map_err(backend)?;
        let table = txn.open_table(NOTIFICATIONS).map_err(backend)?;
        let Some(value) = table.get(id.as_bytes().as_slice()).map_err(backend)? else {
            return Ok(None);
        };
        let n = serde_json::from_slice(value.value()).map_err(decode)?;
        Ok(Some(n))
    }

    pub fn list_notifications_for(
        &self,
        recipient: &UserId,
    ) -> Result<Vec<Notification>, StoreError> {
        let txn = self.db().begin_read().map_err(backend)?;
        let table = txn.open_table(NOTIFICATIONS).map_err(backend)?;
        let mut results: Vec<Notification> = Vec::new();
        for entry in table.iter().map_err(backend)? {
            let (_, value) = entry.map_err(backend)?;
            let n: Notification = serde_json::from_slice(value.value()).map_err(decode)?;
            if n.recipient == *recipient {
                results.push(n);
            }
        }
        results.sort_by_key(|n| std::cmp::Reverse(n.created_at_ms));
        Ok(results)
    }

    /// Returns whether the notification existed.
    pub fn mark_notification_read(&self, id: &NotificationId) -> Result<bool, StoreError> {
        let Some(mut n) = self.get_notification(id)? else {
            return Ok(false);
        };
        n.read = true;
        let bytes = serde_json::to_vec(&n).map_err(encode)?;
        let txn = self.db().begin_write().map_err(backend)?;
        {
            let mut table = txn.open_table(NOTIFICATIONS).map_err(backend)?;
            table
                .insert(id.as_bytes().as_slice(), bytes.as_slice())
                .map_err(backend)?;
        }
        txn.commit().map_err(backend)?;
        Ok(true)
    }
}
