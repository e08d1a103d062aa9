//! Persistence for ordered collections and personal info.
//!
//! The [`ItemStore`] trait is the only seam between the application layer and
//! a concrete backend. Items cross it with their payload as raw JSON; typed
//! (de)serialization happens in the collection manager.

pub mod images;
pub mod memory;
pub mod postgres;

use crate::domain::{Collection, ItemId, OwnerId, PersonalInfo, PersonalInfoPayload};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use thiserror::Error;

pub use images::{ImageError, ImageStore, ImageUpload};
pub use memory::MemoryItemStore;
pub use postgres::PostgresItemStore;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("payload serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The owner's item set changed between validation and commit.
    #[error("item set changed while applying the new order")]
    OrderSetChanged,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// One row of an ordered collection.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredItem {
    pub id: ItemId,
    pub owner_id: OwnerId,
    pub display_order: i32,
    pub payload: JsonValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Owner's items sorted by `display_order`, then id.
    async fn list(&self, collection: Collection, owner_id: OwnerId) -> StoreResult<Vec<StoredItem>>;

    /// Looks an item up regardless of owner.
    async fn get(&self, collection: Collection, id: ItemId) -> StoreResult<Option<StoredItem>>;

    async fn find_owner(&self, collection: Collection, id: ItemId) -> StoreResult<Option<OwnerId>>;

    /// Inserts with `display_order = max + 1` (0 when empty), computed atomically
    /// with the insert.
    async fn insert_appended(
        &self,
        collection: Collection,
        owner_id: OwnerId,
        payload: JsonValue,
    ) -> StoreResult<StoredItem>;

    /// Sets `display_order = index` for every id in `order`, in one transaction.
    ///
    /// `order` must be exactly the owner's current id set; otherwise nothing is
    /// written and [`StoreError::OrderSetChanged`] is returned.
    async fn apply_order(
        &self,
        collection: Collection,
        owner_id: OwnerId,
        order: &[ItemId],
    ) -> StoreResult<()>;

    /// Replaces the payload of an owned item. When `order` is given it is
    /// applied in the same transaction, with the same rules as [`apply_order`].
    ///
    /// [`apply_order`]: ItemStore::apply_order
    async fn update_payload(
        &self,
        collection: Collection,
        owner_id: OwnerId,
        id: ItemId,
        payload: JsonValue,
        order: Option<&[ItemId]>,
    ) -> StoreResult<Option<StoredItem>>;

    /// Removes an owned item and returns it. Remaining items keep their values.
    async fn delete(
        &self,
        collection: Collection,
        owner_id: OwnerId,
        id: ItemId,
    ) -> StoreResult<Option<StoredItem>>;

    async fn personal_info(&self, owner_id: OwnerId) -> StoreResult<Option<PersonalInfo>>;

    async fn upsert_personal_info(
        &self,
        owner_id: OwnerId,
        details: &PersonalInfoPayload,
    ) -> StoreResult<PersonalInfo>;

    /// Cheap liveness probe used by `/health`.
    async fn ping(&self) -> StoreResult<()>;
}
