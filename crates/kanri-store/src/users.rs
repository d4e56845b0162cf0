use redb::ReadableTable;

use kanri_core::id::UserId;
use kanri_core::types::{Role, User};

use crate::error::{backend, decode, encode};
use crate::{KanriStore, StoreError, USERS};

impl KanriStore {
    pub fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(user).map_err(encode)?;
        let txn = self.db().begin_write().map_err(backend)?;
        {
            let mut table = txn.open_table(USERS).map_err(backend)?;
            table
                .insert(user.id.as_bytes().as_slice(), bytes.as_slice())
                .map_err(backend)?;
        }
        txn.commit().map_err(backend)?;
        Ok(())
    }

    pub fn get_user(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let txn = self.db().begin_read().map_err(backend)?;
        let table = txn.open_table(USERS).map_err(backend)?;
        let Some(value) = table.get(id.as_bytes().as_slice()).map_err(backend)? else {
            return Ok(None);
        };
        let user = serde_json::from_slice(value.value()).map_err(decode)?;
        Ok(Some(user))
    }

    pub fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let txn = self.db().begin_read().map_err(backend)?;
        let table = txn.open_table(USERS).map_err(backend)?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(backend)? {
            let (_, value) = entry.map_err(backend)?;
            results.push(serde_json::from_slice(value.value()).map_err(decode)?);
        }
        Ok(results)
    }

    /// The user-directory lookup behind notification recipient resolution.
    pub fn find_users_by_role(&self, roles: &[Role]) -> Result<Vec<User>, StoreError> {
        Ok(self
            .list_users()?
            .into_iter()
            .filter(|u| roles.contains(&u.role))
            .collect())
    }
}
