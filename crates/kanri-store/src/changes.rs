use redb::ReadableTable;

use kanri_core::id::{ChangeRequestId, UserId};
use kanri_core::types::ChangeRequest;

use crate::error::{backend, decode, encode};
use crate::{KanriStore, StoreError, CHANGE_REQUESTS};

impl KanriStore {
    pub fn insert_change_request(&self, cr: &ChangeRequest) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(cr).map_err(encode)?;
        let txn = self.db().begin_write().map_err(backend)?;
        {
            let mut table = txn.open_table(CHANGE_REQUESTS).map_err(backend)?;
            table
                .insert(cr.id.as_bytes().as_slice(), bytes.as_slice())
                .map_err(backend)?;
        }
        txn.commit().map_err(backend)?;
        Ok(())
    }

    pub fn get_change_request(
        &self,
        id: &ChangeRequestId,
    ) -> Result<Option<ChangeRequest>, StoreError> {
        let txn = self.db().begin_read().map_err(backend)?;
        let table = txn.open_table(CHANGE_REQUESTS).map_err(backend)?;
        let Some(value) = table.get(id.as_bytes().as_slice()).map_err(backend)? else {
            return Ok(None);
        };
        let cr = serde_json::from_slice(value.value()).map_err(decode)?;
        Ok(Some(cr))
    }

    /// Unconditional overwrite; last writer wins at document granularity.
    pub fn put_change_request(&self, cr: &ChangeRequest) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(cr).map_err(encode)?;
        let txn = self.db().begin_write().map_err(backend)?;
        {
            let mut table = txn.open_table(CHANGE_REQUESTS).map_err(backend)?;
            let existed = table
                .insert(cr.id.as_bytes().as_slice(), bytes.as_slice())
                .map_err(backend)?
                .is_some();
            if !existed {
                return Err(StoreError::RecordNotFound(cr.id.to_hex()));
            }
        }
        txn.commit().map_err(backend)?;
        Ok(())
    }

    /// Hard delete. Returns whether the document existed.
    pub fn delete_change_request(&self, id: &ChangeRequestId) -> Result<bool, StoreError> {
        let txn = self.db().begin_write().map_err(backend)?;
        let existed;
        {
            let mut table = txn.open_table(CHANGE_REQUESTS).map_err(backend)?;
            existed = table
                .remove(id.as_bytes().as_slice())
                .map_err(backend)?
                .is_some();
        }
        txn.commit().map_err(backend)?;
        Ok(existed)
    }

    /// Full scan, optionally constrained to one owner. The owner
    /// constraint is how regular users are restricted to their own
    /// records (the route layer's filtering contract).
    pub fn list_change_requests(
        &self,
        owner: Option<&UserId>,
    ) -> Result<Vec<ChangeRequest>, StoreError> {
        let txn = self.db().begin_read().map_err(backend)?;
        let table = txn.open_table(CHANGE_REQUESTS).map_err(backend)?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(backend)? {
            let (_, value) = entry.map_err(backend)?;
            let cr: ChangeRequest = serde_json::from_slice(value.value()).map_err(decode)?;
            if owner.map_or(true, |o| cr.owner == *o) {
                results.push(cr);
            }
        }
        Ok(results)
    }

    pub fn count_change_requests(&self, owner: Option<&UserId>) -> Result<u64, StoreError> {
        Ok(self.list_change_requests(owner)?.len() as u64)
    }
}
