use crate::Blackwood;

struct MapEntry<K: Ord, V> {
    key: K,
    value: Option<V>,
}

impl<K: Default + Ord, V> Default for MapEntry<K, V> {
    fn default() -> Self {
        Self {
            key: K::default(),
            value: Option::default(),
        }
    }
}

impl<K: Ord, V> PartialEq for MapEntry<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<K: Ord, V> Eq for MapEntry<K, V> {}

impl<K: Ord, V> PartialOrd for MapEntry<K, V> {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.key.cmp(&other.key))
    }
}

impl<K: Ord, V> Ord for MapEntry<K, V> {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.key.cmp(&other.key)
    }
}

/// An associative array, storing key-value pairs.
///
/// Uses a Blackwood red-black tree with a specialized key type that only
/// compares the key half of every entry.
pub struct BlackwoodMap<K: Ord, V> {
    tree: Blackwood<MapEntry<K, V>>,
}

impl<K: Default + Ord, V> BlackwoodMap<K, V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: Blackwood::new(),
        }
    }

    pub fn contains_key(&self, key: K) -> bool {
        self.tree.contains(&MapEntry { key, value: None })
    }

    /// Maps `key` to `value`. An already-bound key keeps its existing
    /// value; returns whether the entry was inserted.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.tree.insert_key(MapEntry {
            key,
            value: Some(value),
        })
    }

    /// Unbinds `key`, handing back the value it was mapped to.
    pub fn remove(&mut self, key: K) -> Option<V> {
        self.tree
            .take(&MapEntry { key, value: None })
            .and_then(|entry| entry.value)
    }

    pub fn get(&self, key: K) -> Option<&V> {
        let dummy_entry = MapEntry { key, value: None };

        self.tree.get(&dummy_entry)?.value.as_ref()
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        let dummy_entry = MapEntry { key, value: None };

        self.tree.get_mut(&dummy_entry)?.value.as_mut()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.len() == 0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }
}

impl<K: Default + Ord, V> Default for BlackwoodMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::BlackwoodMap;

    #[test]
    pub fn map_entry_multi_insertion() {
        let mut map = BlackwoodMap::<usize, usize>::new();

        map.insert(3, 17);
        map.insert(2, 12);
        map.insert(1, 7);

        assert!(map.contains_key(2));
        assert!(map.contains_key(1));
        assert!(map.contains_key(3));

        assert!(!map.insert(3, 19));
        assert_eq!(*map.get(3).unwrap(), 17);
    }

    #[test]
    pub fn map_update_entry() {
        let mut map = BlackwoodMap::<usize, usize>::new();

        map.insert(3, 17);
        *map.get_mut(3).unwrap() = 5;

        assert_eq!(*map.get(3).unwrap(), 5);
    }

    #[test]
    pub fn map_entry_removal() {
        let mut map = BlackwoodMap::<usize, &str>::new();

        map.insert(1, "one");
        map.insert(2, "two");

        assert_eq!(map.remove(1), Some("one"));
        assert_eq!(map.remove(1), None);
        assert!(!map.contains_key(1));
        assert_eq!(map.len(), 1);
    }
}
