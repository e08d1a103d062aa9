//! PostgreSQL-backed [`ItemStore`].
//!
//! Each collection lives in its own table with the same shape: ordering
//! columns plus an opaque `payload JSONB`. Reorders run in one transaction that
//! locks the owner's rows, re-checks the id set and applies every position with
//! a single `UPDATE ... FROM UNNEST(...)` statement.

use crate::domain::ordering::{compare_sets, dense_positions};
use crate::domain::{Collection, ItemId, OwnerId, PersonalInfo, PersonalInfoPayload};
use crate::storage::{ItemStore, StoreError, StoreResult, StoredItem};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgConnection, PgPool, Row};
use tracing::debug;

const ITEM_COLUMNS: &str = "id, owner_id, display_order, payload, created_at, updated_at";

#[derive(Clone)]
pub struct PostgresItemStore {
    pool: PgPool,
}

impl PostgresItemStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a pool of `max_connections` to `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the collection tables and `personal_info` if they are missing.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        for collection in Collection::ALL {
            let table = collection.table_name();
            sqlx::query(&format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    id BIGSERIAL PRIMARY KEY,
                    owner_id BIGINT NOT NULL,
                    display_order INTEGER NOT NULL DEFAULT 0 CHECK (display_order >= 0),
                    payload JSONB NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
                )"
            ))
            .execute(&self.pool)
            .await?;

            sqlx::query(&format!(
                "CREATE INDEX IF NOT EXISTS {table}_owner_order_idx
                 ON {table} (owner_id, display_order, id)"
            ))
            .execute(&self.pool)
            .await?;
        }

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS personal_info (
                owner_id BIGINT PRIMARY KEY,
                name TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                about_content TEXT NOT NULL,
                email TEXT NOT NULL,
                phone TEXT NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn item_from_row(row: &PgRow) -> StoreResult<StoredItem> {
    Ok(StoredItem {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        display_order: row.try_get("display_order")?,
        payload: row.try_get("payload")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn personal_info_from_row(row: &PgRow) -> StoreResult<PersonalInfo> {
    Ok(PersonalInfo {
        owner_id: row.try_get("owner_id")?,
        details: PersonalInfoPayload {
            name: row.try_get("name")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            about_content: row.try_get("about_content")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
        },
        updated_at: row.try_get("updated_at")?,
    })
}

/// Locks the owner's rows, checks `order` against them and writes dense
/// positions. Must run inside a transaction.
async fn write_order(
    conn: &mut PgConnection,
    collection: Collection,
    owner_id: OwnerId,
    order: &[ItemId],
) -> StoreResult<()> {
    let table = collection.table_name();
    let current: Vec<ItemId> = sqlx::query_scalar(&format!(
        "SELECT id FROM {table} WHERE owner_id = $1 ORDER BY id FOR UPDATE"
    ))
    .bind(owner_id)
    .fetch_all(&mut *conn)
    .await?;

    if !compare_sets(&current, order).is_empty() {
        return Err(StoreError::OrderSetChanged);
    }
    if order.is_empty() {
        return Ok(());
    }

    let (ids, positions): (Vec<ItemId>, Vec<i32>) = dense_positions(order).into_iter().unzip();
    let result = sqlx::query(&format!(
        "UPDATE {table} AS t
         SET display_order = v.position, updated_at = now()
         FROM UNNEST($1::BIGINT[], $2::INT4[]) AS v(id, position)
         WHERE t.id = v.id AND t.owner_id = $3"
    ))
    .bind(ids)
    .bind(positions)
    .bind(owner_id)
    .execute(&mut *conn)
    .await?;

    debug!(
        collection = %collection,
        owner_id,
        rows = result.rows_affected(),
        "applied display order"
    );
    Ok(())
}

#[async_trait]
impl ItemStore for PostgresItemStore {
    async fn list(&self, collection: Collection, owner_id: OwnerId) -> StoreResult<Vec<StoredItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM {} WHERE owner_id = $1 ORDER BY display_order, id",
            collection.table_name()
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(item_from_row).collect()
    }

    async fn get(&self, collection: Collection, id: ItemId) -> StoreResult<Option<StoredItem>> {
        let row = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM {} WHERE id = $1",
            collection.table_name()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(item_from_row).transpose()
    }

    async fn find_owner(&self, collection: Collection, id: ItemId) -> StoreResult<Option<OwnerId>> {
        let owner: Option<OwnerId> = sqlx::query_scalar(&format!(
            "SELECT owner_id FROM {} WHERE id = $1",
            collection.table_name()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(owner)
    }

    async fn insert_appended(
        &self,
        collection: Collection,
        owner_id: OwnerId,
        payload: JsonValue,
    ) -> StoreResult<StoredItem> {
        let table = collection.table_name();
        // The aggregate always yields one row, so an empty collection starts at 0.
        let row = sqlx::query(&format!(
            "INSERT INTO {table} (owner_id, display_order, payload)
             SELECT $1, COALESCE(MAX(display_order) + 1, 0), $2
             FROM {table} WHERE owner_id = $1
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(owner_id)
        .bind(payload)
        .fetch_one(&self.pool)
        .await?;
        item_from_row(&row)
    }

    async fn apply_order(
        &self,
        collection: Collection,
        owner_id: OwnerId,
        order: &[ItemId],
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        if let Err(e) = write_order(&mut *tx, collection, owner_id, order).await {
            tx.rollback().await?;
            return Err(e);
        }
        tx.commit().await?;
        Ok(())
    }

    async fn update_payload(
        &self,
        collection: Collection,
        owner_id: OwnerId,
        id: ItemId,
        payload: JsonValue,
        order: Option<&[ItemId]>,
    ) -> StoreResult<Option<StoredItem>> {
        let mut tx = self.pool.begin().await?;

        if let Some(order) = order {
            if let Err(e) = write_order(&mut *tx, collection, owner_id, order).await {
                tx.rollback().await?;
                return Err(e);
            }
        }

        let row = sqlx::query(&format!(
            "UPDATE {} SET payload = $1, updated_at = now()
             WHERE id = $2 AND owner_id = $3
             RETURNING {ITEM_COLUMNS}",
            collection.table_name()
        ))
        .bind(payload)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };
        let item = item_from_row(&row)?;
        tx.commit().await?;
        Ok(Some(item))
    }

    async fn delete(
        &self,
        collection: Collection,
        owner_id: OwnerId,
        id: ItemId,
    ) -> StoreResult<Option<StoredItem>> {
        let row = sqlx::query(&format!(
            "DELETE FROM {} WHERE id = $1 AND owner_id = $2 RETURNING {ITEM_COLUMNS}",
            collection.table_name()
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(item_from_row).transpose()
    }

    async fn personal_info(&self, owner_id: OwnerId) -> StoreResult<Option<PersonalInfo>> {
        let row = sqlx::query(
            "SELECT owner_id, name, title, description, about_content, email, phone, updated_at
             FROM personal_info WHERE owner_id = $1",
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(personal_info_from_row).transpose()
    }

    async fn upsert_personal_info(
        &self,
        owner_id: OwnerId,
        details: &PersonalInfoPayload,
    ) -> StoreResult<PersonalInfo> {
        let row = sqlx::query(
            "INSERT INTO personal_info
                (owner_id, name, title, description, about_content, email, phone, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, now())
             ON CONFLICT (owner_id) DO UPDATE SET
                name = EXCLUDED.name,
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                about_content = EXCLUDED.about_content,
                email = EXCLUDED.email,
                phone = EXCLUDED.phone,
                updated_at = now()
             RETURNING owner_id, name, title, description, about_content, email, phone, updated_at",
        )
        .bind(owner_id)
        .bind(&details.name)
        .bind(&details.title)
        .bind(&details.description)
        .bind(&details.about_content)
        .bind(&details.email)
        .bind(&details.phone)
        .fetch_one(&self.pool)
        .await?;
        personal_info_from_row(&row)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
