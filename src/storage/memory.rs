//! In-memory [`ItemStore`] used by tests and `STORAGE_BACKEND=memory`.
//!
//! A single `RwLock` serializes writers, so every write is validated and applied
//! while holding the lock: readers never observe a half-applied reorder.

use crate::domain::ordering::{compare_sets, dense_positions, display_key, next_display_order};
use crate::domain::{Collection, ItemId, OwnerId, PersonalInfo, PersonalInfoPayload};
use crate::storage::{ItemStore, StoreError, StoreResult, StoredItem};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
struct MemoryState {
    next_id: ItemId,
    items: HashMap<Collection, BTreeMap<ItemId, StoredItem>>,
    personal_info: HashMap<OwnerId, PersonalInfo>,
}

impl MemoryState {
    fn table(&self, collection: Collection) -> Option<&BTreeMap<ItemId, StoredItem>> {
        self.items.get(&collection)
    }

    fn table_mut(&mut self, collection: Collection) -> &mut BTreeMap<ItemId, StoredItem> {
        self.items.entry(collection).or_default()
    }

    fn owner_ids(&self, collection: Collection, owner_id: OwnerId) -> Vec<ItemId> {
        self.table(collection)
            .map(|rows| {
                rows.values()
                    .filter(|item| item.owner_id == owner_id)
                    .map(|item| item.id)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Validates then applies `order`; nothing changes on error.
    fn write_order(
        &mut self,
        collection: Collection,
        owner_id: OwnerId,
        order: &[ItemId],
    ) -> StoreResult<()> {
        let current = self.owner_ids(collection, owner_id);
        if !compare_sets(&current, order).is_empty() {
            return Err(StoreError::OrderSetChanged);
        }
        let now = Utc::now();
        let rows = self.table_mut(collection);
        for (id, position) in dense_positions(order) {
            if let Some(item) = rows.get_mut(&id) {
                item.display_order = position;
                item.updated_at = now;
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryItemStore {
    state: RwLock<MemoryState>,
    fail_writes: AtomicBool,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail with [`StoreError::Unavailable`].
    #[cfg(test)]
    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn list(&self, collection: Collection, owner_id: OwnerId) -> StoreResult<Vec<StoredItem>> {
        let state = self.state.read().await;
        let mut items: Vec<StoredItem> = state
            .table(collection)
            .map(|rows| {
                rows.values()
                    .filter(|item| item.owner_id == owner_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        items.sort_by_key(|item| display_key(item.display_order, item.id));
        Ok(items)
    }

    async fn get(&self, collection: Collection, id: ItemId) -> StoreResult<Option<StoredItem>> {
        let state = self.state.read().await;
        Ok(state.table(collection).and_then(|rows| rows.get(&id)).cloned())
    }

    async fn find_owner(&self, collection: Collection, id: ItemId) -> StoreResult<Option<OwnerId>> {
        let state = self.state.read().await;
        Ok(state
            .table(collection)
            .and_then(|rows| rows.get(&id))
            .map(|item| item.owner_id))
    }

    async fn insert_appended(
        &self,
        collection: Collection,
        owner_id: OwnerId,
        payload: JsonValue,
    ) -> StoreResult<StoredItem> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        let display_order = next_display_order(
            state
                .table(collection)
                .into_iter()
                .flat_map(|rows| rows.values())
                .filter(|item| item.owner_id == owner_id)
                .map(|item| item.display_order),
        );
        state.next_id += 1;
        let now = Utc::now();
        let item = StoredItem {
            id: state.next_id,
            owner_id,
            display_order,
            payload,
            created_at: now,
            updated_at: now,
        };
        state.table_mut(collection).insert(item.id, item.clone());
        Ok(item)
    }

    async fn apply_order(
        &self,
        collection: Collection,
        owner_id: OwnerId,
        order: &[ItemId],
    ) -> StoreResult<()> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        state.write_order(collection, owner_id, order)
    }

    async fn update_payload(
        &self,
        collection: Collection,
        owner_id: OwnerId,
        id: ItemId,
        payload: JsonValue,
        order: Option<&[ItemId]>,
    ) -> StoreResult<Option<StoredItem>> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        let owned = state
            .table(collection)
            .and_then(|rows| rows.get(&id))
            .is_some_and(|item| item.owner_id == owner_id);
        if !owned {
            return Ok(None);
        }
        if let Some(order) = order {
            state.write_order(collection, owner_id, order)?;
        }
        let rows = state.table_mut(collection);
        Ok(rows.get_mut(&id).map(|item| {
            item.payload = payload;
            item.updated_at = Utc::now();
            item.clone()
        }))
    }

    async fn delete(
        &self,
        collection: Collection,
        owner_id: OwnerId,
        id: ItemId,
    ) -> StoreResult<Option<StoredItem>> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        let rows = state.table_mut(collection);
        let owned = rows.get(&id).is_some_and(|item| item.owner_id == owner_id);
        if owned {
            Ok(rows.remove(&id))
        } else {
            Ok(None)
        }
    }

    async fn personal_info(&self, owner_id: OwnerId) -> StoreResult<Option<PersonalInfo>> {
        let state = self.state.read().await;
        Ok(state.personal_info.get(&owner_id).cloned())
    }

    async fn upsert_personal_info(
        &self,
        owner_id: OwnerId,
        details: &PersonalInfoPayload,
    ) -> StoreResult<PersonalInfo> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        let info = PersonalInfo {
            owner_id,
            details: details.clone(),
            updated_at: Utc::now(),
        };
        state.personal_info.insert(owner_id, info.clone());
        Ok(info)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
