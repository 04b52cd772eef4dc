//! Persistent collections with structural sharing.
//!
//! A thin wrapper around the `im` crate's ordered map, used wherever a string
//! key maps to an ordered list of values and cheap snapshots are needed.

use std::fmt;
use std::iter::FromIterator;

/// Persistent multimap from string keys to ordered value lists.
///
/// Cloning is O(1), so a clone doubles as an exact snapshot. Keys iterate
/// in sorted order; values under one key keep insertion order. A key with
/// no values is never stored.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListMultimap<V>(im::OrdMap<String, im::Vector<V>>)
where
    V: Clone;

impl<V: Clone> ListMultimap<V> {
    /// Creates an empty multimap.
    #[must_use]
    pub fn new() -> Self {
        Self(im::OrdMap::new())
    }

    /// Total number of values across all keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.values().map(im::Vector::len).sum()
    }

    /// Returns true if no values are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.0.len()
    }

    /// Values stored under `key`, in insertion order.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&im::Vector<V>> {
        self.0.get(key)
    }

    /// Returns true if at least one value is stored under `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns a new multimap with `value` appended under `key`.
    #[must_use]
    pub fn insert(&self, key: impl Into<String>, value: V) -> Self {
        let key = key.into();
        let mut values = self.0.get(&key).cloned().unwrap_or_default();
        values.push_back(value);
        Self(self.0.update(key, values))
    }

    /// Returns a new multimap without any values under `key`.
    #[must_use]
    pub fn remove_key(&self, key: &str) -> Self {
        Self(self.0.without(key))
    }

    /// Returns a new multimap keeping only the values that satisfy `keep`.
    ///
    /// Keys left without values are dropped.
    #[must_use]
    pub fn retain(&self, mut keep: impl FnMut(&str, &V) -> bool) -> Self {
        let mut map = im::OrdMap::new();
        for (key, values) in &self.0 {
            let kept: im::Vector<V> = values.iter().filter(|v| keep(key, *v)).cloned().collect();
            if !kept.is_empty() {
                map.insert(key.clone(), kept);
            }
        }
        Self(map)
    }

    /// Iterates over keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterates over `(key, value)` pairs, one per stored value.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0
            .iter()
            .flat_map(|(key, values)| values.iter().map(move |v| (key.as_str(), v)))
    }

    /// Iterates over every stored value.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.0.values().flat_map(im::Vector::iter)
    }
}

impl<V: Clone> Default for ListMultimap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + fmt::Debug> fmt::Debug for ListMultimap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

impl<V: Clone + PartialEq> PartialEq for ListMultimap<V> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<K: Into<String>, V: Clone> FromIterator<(K, V)> for ListMultimap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |map, (key, value)| map.insert(key, value))
    }
}
