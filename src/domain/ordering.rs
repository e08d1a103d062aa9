//! Pure ordering rules for owner-scoped collections.
//!
//! Everything here works on ids and `display_order` values only; payloads never
//! influence presentation order.

use std::collections::HashSet;

pub type ItemId = i64;
pub type OwnerId = i64;

/// Sort key used everywhere items are presented: `display_order`, then id.
pub fn display_key(display_order: i32, id: ItemId) -> (i32, ItemId) {
    (display_order, id)
}

/// `max + 1`, or 0 for an empty collection.
pub fn next_display_order<I>(existing: I) -> i32
where
    I: IntoIterator<Item = i32>,
{
    existing
        .into_iter()
        .max()
        .map(|max| max.saturating_add(1))
        .unwrap_or(0)
}

/// How a requested order differs from the owner's current item set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetMismatch {
    /// Current ids absent from the request.
    pub missing: Vec<ItemId>,
    /// Ids requested more than once.
    pub duplicates: Vec<ItemId>,
    /// Requested ids that are not part of the current set.
    pub unknown: Vec<ItemId>,
}

impl SetMismatch {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.duplicates.is_empty() && self.unknown.is_empty()
    }
}

/// Compares a requested order against the current set.
///
/// Returned id lists follow request order (`duplicates`, `unknown`) or current
/// display order (`missing`) so error messages are stable.
pub fn compare_sets(current: &[ItemId], requested: &[ItemId]) -> SetMismatch {
    let current_set: HashSet<ItemId> = current.iter().copied().collect();
    let mut seen: HashSet<ItemId> = HashSet::with_capacity(requested.len());
    let mut mismatch = SetMismatch::default();

    for id in requested {
        if !seen.insert(*id) {
            if !mismatch.duplicates.contains(id) {
                mismatch.duplicates.push(*id);
            }
            continue;
        }
        if !current_set.contains(id) {
            mismatch.unknown.push(*id);
        }
    }

    mismatch.missing = current
        .iter()
        .copied()
        .filter(|id| !seen.contains(id))
        .collect();
    mismatch
}

/// `(id, display_order)` pairs that realise `order` as a dense `0..N-1` sequence.
pub fn dense_positions(order: &[ItemId]) -> Vec<(ItemId, i32)> {
    order
        .iter()
        .enumerate()
        .map(|(index, id)| (*id, index as i32))
        .collect()
}

/// Moves `id` to `index` (clamped to the last slot). Returns `None` when `id`
/// is not part of `order`.
pub fn move_to(order: &[ItemId], id: ItemId, index: usize) -> Option<Vec<ItemId>> {
    let current = order.iter().position(|candidate| *candidate == id)?;
    let mut moved = order.to_vec();
    moved.remove(current);
    let target = index.min(moved.len());
    moved.insert(target, id);
    Some(moved)
}

/// Turns client-supplied `(id, display_order)` entries into an id sequence.
///
/// The sort is stable, so equal `display_order` values keep request order.
pub fn order_from_entries(entries: &[(ItemId, i64)]) -> Vec<ItemId> {
    let mut sorted: Vec<(usize, ItemId, i64)> = entries
        .iter()
        .enumerate()
        .map(|(position, (id, order))| (position, *id, *order))
        .collect();
    sorted.sort_by_key(|(position, _, order)| (*order, *position));
    sorted.into_iter().map(|(_, id, _)| id).collect()
}

/// Number of items sharing a `display_order` with another item.
#[cfg(test)]
pub(crate) fn duplicate_positions<I>(orders: I) -> usize
where
    I: IntoIterator<Item = i32>,
{
    let mut counts: std::collections::HashMap<i32, usize> = Default::default();
    for order in orders {
        *counts.entry(order).or_default() += 1;
    }
    counts.values().filter(|count| **count > 1).map(|count| count - 1).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_next_display_order() {
        assert_eq!(next_display_order(Vec::<i32>::new()), 0);
        assert_eq!(next_display_order(vec![0, 1, 2]), 3);
        // Gaps are tolerated: max + 1, not len.
        assert_eq!(next_display_order(vec![0, 2]), 3);
    }

    #[test]
    fn test_compare_sets_exact_match() {
        let mismatch = compare_sets(&[1, 2, 3], &[3, 1, 2]);
        assert!(mismatch.is_empty());
    }

    #[test]
    fn test_compare_sets_subset() {
        let mismatch = compare_sets(&[1, 2, 3], &[2, 1]);
        assert_eq!(mismatch.missing, vec![3]);
        assert!(mismatch.duplicates.is_empty());
        assert!(mismatch.unknown.is_empty());
    }

    #[test]
    fn test_compare_sets_duplicates_and_unknown() {
        let mismatch = compare_sets(&[1, 2], &[1, 1, 2, 9]);
        assert_eq!(mismatch.duplicates, vec![1]);
        assert_eq!(mismatch.unknown, vec![9]);
        assert!(mismatch.missing.is_empty());
    }

    #[test]
    fn test_move_to() {
        assert_eq!(move_to(&[1, 2, 3, 4], 4, 0), Some(vec![4, 1, 2, 3]));
        assert_eq!(move_to(&[1, 2, 3, 4], 1, 2), Some(vec![2, 3, 1, 4]));
        assert_eq!(move_to(&[1, 2, 3], 1, 99), Some(vec![2, 3, 1]));
        assert_eq!(move_to(&[1, 2, 3], 7, 0), None);
    }

    #[test]
    fn test_order_from_entries_is_stable() {
        let ids = order_from_entries(&[(10, 2), (11, 0), (12, 2), (13, 1)]);
        assert_eq!(ids, vec![11, 13, 10, 12]);
    }

    #[test]
    fn test_duplicate_positions() {
        assert_eq!(duplicate_positions(vec![0, 1, 2]), 0);
        assert_eq!(duplicate_positions(vec![0, 0, 1, 1, 1]), 3);
    }

    proptest! {
        #[test]
        fn prop_move_to_is_a_permutation(
            len in 1usize..20,
            pick in 0usize..20,
            target in 0usize..25,
        ) {
            let order: Vec<ItemId> = (1..=len as i64).collect();
            let id = order[pick % len];
            let moved = move_to(&order, id, target).unwrap();

            let mut sorted = moved.clone();
            sorted.sort();
            prop_assert_eq!(sorted, order.clone());
            prop_assert_eq!(moved[target.min(len - 1)], id);
        }

        #[test]
        fn prop_dense_positions_are_contiguous(ids in proptest::collection::hash_set(any::<i64>(), 0..30)) {
            let ids: Vec<ItemId> = ids.into_iter().collect();
            let positions = dense_positions(&ids);
            for (index, (id, order)) in positions.iter().enumerate() {
                prop_assert_eq!(*id, ids[index]);
                prop_assert_eq!(*order as usize, index);
            }
        }
    }
}
