use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, trace};
use xxhash_rust::xxh3::xxh3_64;

use crate::layout::error::LayoutError;
use crate::layout::row_builder::{RowBuilder, RowPlan};
use crate::models::{ContentItem, ContentKind, Row};

/// Maximum number of cached layouts to keep in memory.
const MAX_CACHE_ENTRIES: usize = 8;

/// Key for the row cache, combining row width and list hash.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
struct CacheKey {
    row_width: u32,
    list_hash: u64,
}

/// Cached layout data: the row plans that can reconstruct the full rows.
#[derive(Debug, Clone)]
struct CachedLayout {
    plans: Vec<RowPlan>,
    /// Number of items this layout was computed for
    item_count: usize,
}

/// Row cache for storing and retrieving row plans.
///
/// Caches plans keyed by (row_width, list_hash). Only the pattern choice and
/// consumed indices are stored; layouts and box trees are rebuilt on a hit,
/// which is cheap compared to re-running the pattern search.
///
/// The list_hash covers every field the engine reads (id, aspect ratio,
/// rating, kind) in sequence order, so reordering or re-rating invalidates it.
pub struct RowCache {
    cache: Mutex<LruCache<CacheKey, CachedLayout>>,
}

impl RowCache {
    pub fn new() -> Self {
        Self::with_capacity(MAX_CACHE_ENTRIES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Computes a fast hash of the item list.
    pub fn compute_list_hash(items: &[ContentItem]) -> u64 {
        let mut hasher_input = Vec::with_capacity(items.len() * 32);

        for item in items {
            hasher_input.extend_from_slice(item.id.as_bytes());
            // Separator so ids cannot run into the numeric fields
            hasher_input.push(0xff);
            hasher_input.extend_from_slice(&item.aspect_ratio.to_bits().to_le_bytes());
            hasher_input.push(item.rating);
            hasher_input.push(match item.kind {
                ContentKind::Photo => 0,
                ContentKind::Collection => 1,
            });
        }

        xxh3_64(&hasher_input)
    }

    /// Returns cached plans without touching recency. `None` on a miss.
    pub fn get_plans(&self, row_width: u32, list_hash: u64) -> Option<Vec<RowPlan>> {
        let key = CacheKey {
            row_width,
            list_hash,
        };
        self.cache.lock().peek(&key).map(|entry| entry.plans.clone())
    }

    /// Retrieves cached rows, rebuilding them from plans. `None` on a miss.
    pub fn get(
        &self,
        row_width: u32,
        list_hash: u64,
        items: &[ContentItem],
        builder: &RowBuilder,
    ) -> Option<Vec<Row>> {
        let key = CacheKey {
            row_width,
            list_hash,
        };

        let plans = {
            let mut cache = self.cache.lock();
            let entry = cache.get(&key)?;
            if entry.item_count != items.len() {
                return None;
            }
            entry.plans.clone()
        };

        builder.rows_from_plans(items, &plans).ok()
    }

    pub fn set(&self, row_width: u32, list_hash: u64, plans: Vec<RowPlan>, item_count: usize) {
        let key = CacheKey {
            row_width,
            list_hash,
        };
        let evicted = self
            .cache
            .lock()
            .push(key, CachedLayout { plans, item_count });
        if let Some((old, _)) = evicted.filter(|(old, _)| *old != key) {
            trace!(row_width = old.row_width, "Evicted cached layout");
        }
    }

    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }
}

impl Default for RowCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Combines row building with caching.
pub struct CachedRowBuilder {
    pub cache: RowCache,
}

impl CachedRowBuilder {
    pub fn new() -> Self {
        Self {
            cache: RowCache::new(),
        }
    }

    /// Builds rows, using cached plans when the width and item list match a
    /// previous call.
    pub fn compute(&self, items: &[ContentItem], row_width: u32) -> Result<Vec<Row>, LayoutError> {
        if row_width == 0 {
            return Err(LayoutError::InvalidRowWidth(row_width));
        }
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let builder = RowBuilder::new(row_width);
        let list_hash = RowCache::compute_list_hash(items);

        if let Some(rows) = self.cache.get(row_width, list_hash, items, &builder) {
            trace!(row_width, "Row cache hit");
            return Ok(rows);
        }

        debug!(row_width, items = items.len(), "Row cache miss, planning rows");
        let plans = builder.plan(items)?;
        let rows = builder.rows_from_plans(items, &plans)?;
        self.cache.set(row_width, list_hash, plans, items.len());

        Ok(rows)
    }

    /// Invalidates the cache, forcing recomputation on next call.
    pub fn invalidate(&self) {
        self.cache.clear();
    }
}

impl Default for CachedRowBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::patterns::PatternName;

    fn make_item(id: &str, aspect_ratio: f64, rating: u8) -> ContentItem {
        ContentItem::new(id, aspect_ratio, rating)
    }

    fn sample_items(count: usize) -> Vec<ContentItem> {
        (0..count)
            .map(|i| make_item(&format!("{}.jpg", i), 16.0 / 9.0, (i % 6) as u8))
            .collect()
    }

    #[test]
    fn test_list_hash_consistency() {
        let items = sample_items(4);
        assert_eq!(
            RowCache::compute_list_hash(&items),
            RowCache::compute_list_hash(&items)
        );
    }

    #[test]
    fn test_list_hash_changes_on_rating() {
        let items1 = vec![make_item("a.jpg", 1.5, 3)];
        let items2 = vec![make_item("a.jpg", 1.5, 4)];
        assert_ne!(
            RowCache::compute_list_hash(&items1),
            RowCache::compute_list_hash(&items2)
        );
    }

    #[test]
    fn test_list_hash_changes_on_order() {
        let items1 = vec![make_item("a.jpg", 1.5, 3), make_item("b.jpg", 0.5, 3)];
        let items2 = vec![make_item("b.jpg", 0.5, 3), make_item("a.jpg", 1.5, 3)];
        assert_ne!(
            RowCache::compute_list_hash(&items1),
            RowCache::compute_list_hash(&items2)
        );
    }

    #[test]
    fn test_list_hash_changes_on_kind() {
        let photo = vec![make_item("trips", 1.0, 3)];
        let folder = vec![ContentItem::new_collection("trips", 3)];
        assert_ne!(
            RowCache::compute_list_hash(&photo),
            RowCache::compute_list_hash(&folder)
        );
    }

    #[test]
    fn test_cache_miss_then_hit() {
        let cache = RowCache::new();
        assert!(cache.get_plans(5, 12345).is_none());

        let plans = vec![RowPlan {
            pattern: PatternName::Hero,
            used_indices: vec![0],
            main: None,
        }];
        cache.set(5, 12345, plans.clone(), 1);

        assert_eq!(cache.get_plans(5, 12345), Some(plans));
        assert!(cache.get_plans(4, 12345).is_none());
    }

    #[test]
    fn test_item_count_mismatch_is_a_miss() {
        let cache = RowCache::new();
        let items = sample_items(3);
        let builder = RowBuilder::new(5);
        let plans = builder.plan(&items).unwrap();
        cache.set(5, 1, plans, items.len() + 1);
        assert!(cache.get(5, 1, &items, &builder).is_none());
    }

    #[test]
    fn test_cache_eviction() {
        let cache = RowCache::new();
        for i in 0..(MAX_CACHE_ENTRIES + 5) {
            cache.set(i as u32, i as u64, Vec::new(), 0);
        }
        assert_eq!(cache.len(), MAX_CACHE_ENTRIES);
        // Oldest entries went first.
        assert!(cache.get_plans(0, 0).is_none());
        assert!(cache.get_plans(12, 12).is_some());
    }

    #[test]
    fn test_cached_row_builder() {
        let computer = CachedRowBuilder::new();
        let items = sample_items(10);

        let rows1 = computer.compute(&items, 5).unwrap();
        assert!(!rows1.is_empty());
        assert_eq!(computer.cache.len(), 1);

        let rows2 = computer.compute(&items, 5).unwrap();
        assert_eq!(rows1.len(), rows2.len());
        for (a, b) in rows1.iter().zip(&rows2) {
            assert_eq!(a.used_indices, b.used_indices);
            assert_eq!(a.box_tree, b.box_tree);
        }
        assert_eq!(computer.cache.len(), 1);
    }

    #[test]
    fn test_different_widths_are_cached_separately() {
        let computer = CachedRowBuilder::new();
        let items = sample_items(10);

        computer.compute(&items, 5).unwrap();
        computer.compute(&items, 3).unwrap();
        assert_eq!(computer.cache.len(), 2);

        computer.invalidate();
        assert!(computer.cache.is_empty());
    }

    #[test]
    fn test_empty_items() {
        let computer = CachedRowBuilder::new();
        assert!(computer.compute(&[], 5).unwrap().is_empty());
        assert!(computer.cache.is_empty());
    }

    #[test]
    fn test_errors_are_not_cached() {
        let computer = CachedRowBuilder::new();
        let items = sample_items(3);
        assert!(computer.compute(&items, 0).is_err());
        assert!(computer.cache.is_empty());
    }
}
