//! The ordered collection manager.
//!
//! One manager per payload type. It owns the ordering rules (append at the end,
//! atomic validated reorder, single-item moves) and the owner checks; the store
//! only persists what it is told.

use crate::app::error::{CollectionError, CollectionResult};
use crate::domain::ordering::{compare_sets, move_to};
use crate::domain::{ItemId, ItemPayload, OrderedItem, OwnerId};
use crate::storage::{ItemStore, StoreError, StoredItem};
use serde_json::Value as JsonValue;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct OrderedCollectionManager<P> {
    store: Arc<dyn ItemStore>,
    _payload: PhantomData<fn() -> P>,
}

impl<P> Clone for OrderedCollectionManager<P> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _payload: PhantomData,
        }
    }
}

impl<P: ItemPayload> OrderedCollectionManager<P> {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self {
            store,
            _payload: PhantomData,
        }
    }

    /// Owner's items in display order. An owner with no items gets an empty vec.
    pub async fn list(&self, owner_id: OwnerId) -> CollectionResult<Vec<OrderedItem<P>>> {
        let items = self.store.list(P::COLLECTION, owner_id).await?;
        items.into_iter().map(decode).collect()
    }

    pub async fn get(&self, owner_id: OwnerId, id: ItemId) -> CollectionResult<OrderedItem<P>> {
        match self.store.get(P::COLLECTION, id).await? {
            None => Err(self.not_found(id)),
            Some(item) if item.owner_id != owner_id => Err(self.ownership(owner_id, id)),
            Some(item) => decode(item),
        }
    }

    /// Validates and stores `payload` after the owner's last item.
    pub async fn append(&self, owner_id: OwnerId, payload: P) -> CollectionResult<OrderedItem<P>> {
        payload.validate()?;
        let item = self
            .store
            .insert_appended(P::COLLECTION, owner_id, encode(&payload)?)
            .await?;
        info!(
            collection = %P::COLLECTION,
            owner_id,
            id = item.id,
            display_order = item.display_order,
            "appended item"
        );
        decode(item)
    }

    /// Replaces the owner's whole order with `ordered_ids`.
    ///
    /// All checks happen before anything is written, and the store applies the
    /// new positions in one transaction.
    pub async fn reorder(&self, owner_id: OwnerId, ordered_ids: &[ItemId]) -> CollectionResult<()> {
        let current: Vec<ItemId> = self
            .store
            .list(P::COLLECTION, owner_id)
            .await?
            .iter()
            .map(|item| item.id)
            .collect();

        let mismatch = compare_sets(&current, ordered_ids);
        self.resolve_unknown(owner_id, &mismatch.unknown).await?;
        if !mismatch.is_empty() {
            return Err(CollectionError::IncompleteSet {
                collection: P::COLLECTION,
                missing: mismatch.missing,
                duplicates: mismatch.duplicates,
            });
        }

        self.store
            .apply_order(P::COLLECTION, owner_id, ordered_ids)
            .await
            .map_err(|e| self.write_failed(owner_id, e))?;
        info!(
            collection = %P::COLLECTION,
            owner_id,
            items = ordered_ids.len(),
            "reordered items"
        );
        Ok(())
    }

    /// Removes an item. Remaining items keep their `display_order` values.
    pub async fn delete(&self, owner_id: OwnerId, id: ItemId) -> CollectionResult<OrderedItem<P>> {
        self.ensure_owned(owner_id, id).await?;
        let removed = self
            .store
            .delete(P::COLLECTION, owner_id, id)
            .await?
            .ok_or_else(|| self.not_found(id))?;
        info!(collection = %P::COLLECTION, owner_id, id, "deleted item");
        decode(removed)
    }

    /// Replaces payload fields. With `reposition`, the item also moves to that
    /// index (clamped to the end) and the collection is renumbered `0..N-1` in
    /// the same transaction.
    pub async fn replace_payload(
        &self,
        owner_id: OwnerId,
        id: ItemId,
        payload: P,
        reposition: Option<u32>,
    ) -> CollectionResult<OrderedItem<P>> {
        payload.validate()?;
        self.ensure_owned(owner_id, id).await?;

        let order = match reposition {
            Some(index) => {
                let current: Vec<ItemId> = self
                    .store
                    .list(P::COLLECTION, owner_id)
                    .await?
                    .iter()
                    .map(|item| item.id)
                    .collect();
                let moved =
                    move_to(&current, id, index as usize).ok_or_else(|| self.not_found(id))?;
                Some(moved)
            }
            None => None,
        };

        let updated = self
            .store
            .update_payload(P::COLLECTION, owner_id, id, encode(&payload)?, order.as_deref())
            .await
            .map_err(|e| self.write_failed(owner_id, e))?
            .ok_or_else(|| self.not_found(id))?;
        if let Some(index) = reposition {
            info!(collection = %P::COLLECTION, owner_id, id, index, "moved item");
        }
        decode(updated)
    }

    /// Loads an item, lets `change` edit its payload and saves it in place.
    pub async fn modify<F>(&self, owner_id: OwnerId, id: ItemId, change: F) -> CollectionResult<OrderedItem<P>>
    where
        F: FnOnce(&mut P),
    {
        let mut payload = self.get(owner_id, id).await?.payload;
        change(&mut payload);
        self.replace_payload(owner_id, id, payload, None).await
    }

    async fn ensure_owned(&self, owner_id: OwnerId, id: ItemId) -> CollectionResult<()> {
        match self.store.find_owner(P::COLLECTION, id).await? {
            None => Err(self.not_found(id)),
            Some(owner) if owner != owner_id => Err(self.ownership(owner_id, id)),
            Some(_) => Ok(()),
        }
    }

    /// Ids outside the owner's set: another owner's id is an ownership error,
    /// an id nobody owns is not found. Ownership is reported first.
    async fn resolve_unknown(&self, owner_id: OwnerId, unknown: &[ItemId]) -> CollectionResult<()> {
        let mut nonexistent = None;
        for id in unknown {
            match self.store.find_owner(P::COLLECTION, *id).await? {
                Some(owner) if owner != owner_id => return Err(self.ownership(owner_id, *id)),
                Some(_) => {}
                None => {
                    nonexistent.get_or_insert(*id);
                }
            }
        }
        match nonexistent {
            Some(id) => Err(self.not_found(id)),
            None => Ok(()),
        }
    }

    fn not_found(&self, id: ItemId) -> CollectionError {
        CollectionError::NotFound {
            collection: P::COLLECTION,
            id,
        }
    }

    fn ownership(&self, owner_id: OwnerId, id: ItemId) -> CollectionError {
        warn!(collection = %P::COLLECTION, owner_id, id, "cross-owner access rejected");
        CollectionError::Ownership {
            collection: P::COLLECTION,
            id,
        }
    }

    fn write_failed(&self, owner_id: OwnerId, err: StoreError) -> CollectionError {
        match err {
            StoreError::OrderSetChanged => CollectionError::IncompleteSet {
                collection: P::COLLECTION,
                missing: Vec::new(),
                duplicates: Vec::new(),
            },
            other => {
                error!(collection = %P::COLLECTION, owner_id, error = %other, "order write failed");
                CollectionError::Storage(other)
            }
        }
    }
}

fn encode<P: ItemPayload>(payload: &P) -> CollectionResult<JsonValue> {
    serde_json::to_value(payload).map_err(|e| CollectionError::Storage(e.into()))
}

fn decode<P: ItemPayload>(item: StoredItem) -> CollectionResult<OrderedItem<P>> {
    let payload: P =
        serde_json::from_value(item.payload).map_err(|e| CollectionError::Storage(e.into()))?;
    Ok(OrderedItem {
        id: item.id,
        owner_id: item.owner_id,
        display_order: item.display_order,
        payload,
        created_at: item.created_at,
        updated_at: item.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ordering::duplicate_positions;
    use crate::domain::{ProjectPayload, SocialLinkPayload};
    use crate::storage::MemoryItemStore;
    use proptest::prelude::*;

    const OWNER: OwnerId = 1;
    const OTHER: OwnerId = 2;

    fn link(name: &str) -> SocialLinkPayload {
        SocialLinkPayload {
            name: name.to_string(),
            url: format!("https://example.com/{}", name.to_lowercase()),
            icon: name.to_lowercase(),
        }
    }

    fn setup() -> (Arc<MemoryItemStore>, OrderedCollectionManager<SocialLinkPayload>) {
        let store = Arc::new(MemoryItemStore::new());
        let manager = OrderedCollectionManager::new(store.clone());
        (store, manager)
    }

    async fn seed(
        manager: &OrderedCollectionManager<SocialLinkPayload>,
        owner: OwnerId,
        names: &[&str],
    ) -> Vec<ItemId> {
        let mut ids = Vec::new();
        for name in names {
            ids.push(manager.append(owner, link(name)).await.unwrap().id);
        }
        ids
    }

    async fn listed(manager: &OrderedCollectionManager<SocialLinkPayload>, owner: OwnerId) -> Vec<(ItemId, i32)> {
        manager
            .list(owner)
            .await
            .unwrap()
            .iter()
            .map(|item| (item.id, item.display_order))
            .collect()
    }

    async fn listed_ids(manager: &OrderedCollectionManager<SocialLinkPayload>, owner: OwnerId) -> Vec<ItemId> {
        listed(manager, owner).await.into_iter().map(|(id, _)| id).collect()
    }

    #[tokio::test]
    async fn test_list_empty_owner() {
        let (_, manager) = setup();
        assert!(manager.list(OWNER).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_assigns_increasing_positions() {
        let (_, manager) = setup();
        let ids = seed(&manager, OWNER, &["GitHub", "LinkedIn", "Twitter"]).await;
        assert_eq!(
            listed(&manager, OWNER).await,
            vec![(ids[0], 0), (ids[1], 1), (ids[2], 2)]
        );
    }

    #[tokio::test]
    async fn test_append_rejects_invalid_payload() {
        let (_, manager) = setup();
        let mut bad = link("GitHub");
        bad.url = "not-a-url".to_string();

        let err = manager.append(OWNER, bad).await.unwrap_err();
        match err {
            CollectionError::Validation(errors) => assert_eq!(errors.fields()[0].field, "url"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(manager.list(OWNER).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reorder_concrete_scenario() {
        let (_, manager) = setup();
        let ids = seed(&manager, OWNER, &["A", "B", "C"]).await;
        let (a, b, c) = (ids[0], ids[1], ids[2]);

        manager.reorder(OWNER, &[c, a, b]).await.unwrap();

        assert_eq!(listed(&manager, OWNER).await, vec![(c, 0), (a, 1), (b, 2)]);
    }

    #[tokio::test]
    async fn test_reorder_is_idempotent() {
        let (_, manager) = setup();
        let ids = seed(&manager, OWNER, &["A", "B", "C", "D"]).await;
        let order = vec![ids[3], ids[1], ids[0], ids[2]];

        manager.reorder(OWNER, &order).await.unwrap();
        let once = listed(&manager, OWNER).await;
        manager.reorder(OWNER, &order).await.unwrap();
        let twice = listed(&manager, OWNER).await;

        assert_eq!(once, twice);
        assert_eq!(listed_ids(&manager, OWNER).await, order);
    }

    #[tokio::test]
    async fn test_reorder_subset_is_incomplete_and_changes_nothing() {
        let (_, manager) = setup();
        let ids = seed(&manager, OWNER, &["A", "B", "C"]).await;

        let err = manager.reorder(OWNER, &[ids[1], ids[0]]).await.unwrap_err();
        match err {
            CollectionError::IncompleteSet { missing, duplicates, .. } => {
                assert_eq!(missing, vec![ids[2]]);
                assert!(duplicates.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(listed_ids(&manager, OWNER).await, ids);
    }

    #[tokio::test]
    async fn test_reorder_with_duplicates_is_incomplete() {
        let (_, manager) = setup();
        let ids = seed(&manager, OWNER, &["A", "B"]).await;

        let err = manager.reorder(OWNER, &[ids[0], ids[0], ids[1]]).await.unwrap_err();
        assert!(matches!(
            err,
            CollectionError::IncompleteSet { ref duplicates, .. } if duplicates == &vec![ids[0]]
        ));
    }

    #[tokio::test]
    async fn test_reorder_with_foreign_id_is_ownership_error() {
        let (_, manager) = setup();
        let mine = seed(&manager, OWNER, &["A", "B"]).await;
        let theirs = seed(&manager, OTHER, &["X"]).await;

        let err = manager
            .reorder(OWNER, &[mine[1], theirs[0], mine[0]])
            .await
            .unwrap_err();
        assert!(matches!(err, CollectionError::Ownership { id, .. } if id == theirs[0]));

        assert_eq!(listed_ids(&manager, OWNER).await, mine);
        assert_eq!(listed(&manager, OTHER).await, vec![(theirs[0], 0)]);
    }

    #[tokio::test]
    async fn test_reorder_with_unknown_id_is_not_found() {
        let (_, manager) = setup();
        let ids = seed(&manager, OWNER, &["A"]).await;

        let err = manager.reorder(OWNER, &[ids[0], 999]).await.unwrap_err();
        assert!(matches!(err, CollectionError::NotFound { id: 999, .. }));
    }

    #[tokio::test]
    async fn test_reorder_storage_failure_keeps_previous_order() {
        let (store, manager) = setup();
        let ids = seed(&manager, OWNER, &["A", "B", "C"]).await;

        store.fail_writes(true);
        let err = manager
            .reorder(OWNER, &[ids[2], ids[1], ids[0]])
            .await
            .unwrap_err();
        assert!(matches!(err, CollectionError::Storage(_)));

        store.fail_writes(false);
        assert_eq!(
            listed(&manager, OWNER).await,
            vec![(ids[0], 0), (ids[1], 1), (ids[2], 2)]
        );
    }

    #[tokio::test]
    async fn test_delete_then_append_keeps_gap() {
        let (_, manager) = setup();
        let ids = seed(&manager, OWNER, &["A", "B", "C"]).await;
        let (a, b, c) = (ids[0], ids[1], ids[2]);

        manager.delete(OWNER, b).await.unwrap();
        let d = manager.append(OWNER, link("D")).await.unwrap();

        assert_eq!(d.display_order, 3);
        assert_eq!(listed(&manager, OWNER).await, vec![(a, 0), (c, 2), (d.id, 3)]);
    }

    #[tokio::test]
    async fn test_reorder_after_delete_normalizes_positions() {
        let (_, manager) = setup();
        let ids = seed(&manager, OWNER, &["A", "B", "C"]).await;
        manager.delete(OWNER, ids[0]).await.unwrap();

        manager.reorder(OWNER, &[ids[2], ids[1]]).await.unwrap();
        assert_eq!(listed(&manager, OWNER).await, vec![(ids[2], 0), (ids[1], 1)]);
    }

    #[tokio::test]
    async fn test_get_and_delete_distinguish_ownership_from_missing() {
        let (_, manager) = setup();
        let theirs = seed(&manager, OTHER, &["X"]).await;

        assert!(matches!(
            manager.get(OWNER, theirs[0]).await.unwrap_err(),
            CollectionError::Ownership { .. }
        ));
        assert!(matches!(
            manager.delete(OWNER, theirs[0]).await.unwrap_err(),
            CollectionError::Ownership { .. }
        ));
        assert!(matches!(
            manager.delete(OWNER, 12345).await.unwrap_err(),
            CollectionError::NotFound { id: 12345, .. }
        ));
        assert_eq!(listed_ids(&manager, OTHER).await, theirs);
    }

    #[tokio::test]
    async fn test_replace_payload_keeps_position() {
        let (_, manager) = setup();
        let ids = seed(&manager, OWNER, &["A", "B", "C"]).await;

        let updated = manager
            .replace_payload(OWNER, ids[1], link("Mastodon"), None)
            .await
            .unwrap();
        assert_eq!(updated.payload.name, "Mastodon");
        assert_eq!(updated.display_order, 1);
        assert_eq!(listed_ids(&manager, OWNER).await, ids);
    }

    #[tokio::test]
    async fn test_replace_payload_with_reposition_moves_single_item() {
        let (_, manager) = setup();
        let ids = seed(&manager, OWNER, &["A", "B", "C", "D"]).await;
        // Leave a gap so the move has to renumber.
        manager.delete(OWNER, ids[1]).await.unwrap();

        let moved = manager
            .replace_payload(OWNER, ids[3], link("D2"), Some(0))
            .await
            .unwrap();

        assert_eq!(moved.display_order, 0);
        assert_eq!(moved.payload.name, "D2");
        assert_eq!(
            listed(&manager, OWNER).await,
            vec![(ids[3], 0), (ids[0], 1), (ids[2], 2)]
        );

        // Past-the-end indexes clamp to the last slot.
        manager
            .replace_payload(OWNER, ids[3], link("D3"), Some(42))
            .await
            .unwrap();
        assert_eq!(
            listed(&manager, OWNER).await,
            vec![(ids[0], 0), (ids[2], 1), (ids[3], 2)]
        );
    }

    #[tokio::test]
    async fn test_replace_payload_on_foreign_item_is_rejected() {
        let (_, manager) = setup();
        let theirs = seed(&manager, OTHER, &["X"]).await;

        let err = manager
            .replace_payload(OWNER, theirs[0], link("Y"), Some(0))
            .await
            .unwrap_err();
        assert!(matches!(err, CollectionError::Ownership { .. }));
        assert_eq!(manager.get(OTHER, theirs[0]).await.unwrap().payload.name, "X");
    }

    #[tokio::test]
    async fn test_modify_toggles_project_flag() {
        let store: Arc<dyn ItemStore> = Arc::new(MemoryItemStore::new());
        let projects = OrderedCollectionManager::<ProjectPayload>::new(store);
        let created = projects
            .append(
                OWNER,
                ProjectPayload {
                    title: "Portfolio Website".to_string(),
                    description: "This site".to_string(),
                    image: None,
                    tags: vec!["Rust".to_string()],
                    demo_url: None,
                    repo_url: None,
                    is_featured: false,
                },
            )
            .await
            .unwrap();

        let toggled = projects
            .modify(OWNER, created.id, |p| p.is_featured = !p.is_featured)
            .await
            .unwrap();
        assert!(toggled.payload.is_featured);
        assert_eq!(toggled.display_order, created.display_order);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Append,
        Delete(usize),
        Reorder(usize, bool),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => Just(Op::Append),
            1 => any::<usize>().prop_map(Op::Delete),
            2 => (any::<usize>(), any::<bool>()).prop_map(|(shift, flip)| Op::Reorder(shift, flip)),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_list_stays_sorted_without_duplicate_positions(ops in proptest::collection::vec(op_strategy(), 1..40)) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            runtime.block_on(async {
                let (_, manager) = setup();
                let mut last_order: Option<Vec<ItemId>> = None;

                for (step, op) in ops.iter().enumerate() {
                    let ids = listed_ids(&manager, OWNER).await;
                    match op {
                        Op::Append => {
                            manager.append(OWNER, link(&format!("L{step}"))).await.unwrap();
                            last_order = None;
                        }
                        Op::Delete(pick) if !ids.is_empty() => {
                            manager.delete(OWNER, ids[pick % ids.len()]).await.unwrap();
                            last_order = None;
                        }
                        Op::Delete(_) => {}
                        Op::Reorder(shift, flip) => {
                            let mut order = ids.clone();
                            if !order.is_empty() {
                                let shift = shift % order.len();
                                order.rotate_left(shift);
                            }
                            if *flip {
                                order.reverse();
                            }
                            manager.reorder(OWNER, &order).await.unwrap();
                            last_order = Some(order);
                        }
                    }

                    let items = listed(&manager, OWNER).await;
                    assert!(items.windows(2).all(|w| w[0].1 < w[1].1), "not strictly ascending: {items:?}");
                    assert_eq!(duplicate_positions(items.iter().map(|(_, order)| *order)), 0);
                    if let Some(order) = &last_order {
                        let ids: Vec<ItemId> = items.iter().map(|(id, _)| *id).collect();
                        assert_eq!(&ids, order);
                        let positions: Vec<i32> = items.iter().map(|(_, p)| *p).collect();
                        assert_eq!(positions, (0..items.len() as i32).collect::<Vec<_>>());
                    }
                }
            });
        }
    }
}
