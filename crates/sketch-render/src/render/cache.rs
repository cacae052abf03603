use std::collections::HashMap;

use crate::shape::ShapeKey;

/// GPU buffers uploaded for one shape.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CacheEntry<B> {
    pub vertex_buffer: B,
    pub index_buffer: B,
    /// Index count drawn for the shape (`faces * 3`).
    pub element_count: i32,
}

/// Shape fingerprint → uploaded buffers.
///
/// Entries are never evicted; they live until the owning renderer drains the
/// cache during cleanup.
#[derive(Debug)]
pub struct BufferCache<B> {
    entries: HashMap<ShapeKey, CacheEntry<B>>,
}

impl<B> Default for BufferCache<B> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<B: Copy> BufferCache<B> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, key: ShapeKey) -> Option<CacheEntry<B>> {
        self.entries.get(&key).copied()
    }

    #[inline]
    pub fn contains(&self, key: ShapeKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Returns the previous entry for `key`, which the caller must release.
    pub fn insert(&mut self, key: ShapeKey, entry: CacheEntry<B>) -> Option<CacheEntry<B>> {
        self.entries.insert(key, entry)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every entry, handing them back for release.
    pub fn drain(&mut self) -> impl Iterator<Item = CacheEntry<B>> + '_ {
        self.entries.drain().map(|(_, e)| e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(v: u32, i: u32, n: i32) -> CacheEntry<u32> {
        CacheEntry {
            vertex_buffer: v,
            index_buffer: i,
            element_count: n,
        }
    }

    #[test]
    fn insert_then_get() {
        let mut cache = BufferCache::new();
        assert!(cache.insert(ShapeKey(7), entry(1, 2, 6)).is_none());
        assert!(cache.contains(ShapeKey(7)));
        assert_eq!(cache.get(ShapeKey(7)), Some(entry(1, 2, 6)));
        assert_eq!(cache.get(ShapeKey(8)), None);
    }

    #[test]
    fn reinsert_returns_replaced_entry() {
        let mut cache = BufferCache::new();
        cache.insert(ShapeKey(1), entry(1, 2, 3));
        let old = cache.insert(ShapeKey(1), entry(4, 5, 3));
        assert_eq!(old, Some(entry(1, 2, 3)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn drain_empties_cache() {
        let mut cache = BufferCache::new();
        cache.insert(ShapeKey(1), entry(1, 2, 3));
        cache.insert(ShapeKey(2), entry(3, 4, 6));
        let mut drained: Vec<_> = cache.drain().map(|e| e.vertex_buffer).collect();
        drained.sort();
        assert_eq!(drained, vec![1, 3]);
        assert!(cache.is_empty());
    }
}
