//! Frequency tables for categorical data
//!
//! A [`FrequencyTable`] counts how often each distinct key occurs. Tables built
//! from disjoint datasets can be merged by key-wise summation, which makes the
//! merge commutative and associative.
//!
//! # Examples
//!
//! ```
//! use relstreak_stats::frequency::FrequencyTable;
//!
//! let mut colors = FrequencyTable::new();
//! colors.add("red");
//! colors.add("blue");
//! colors.add("red");
//!
//! assert_eq!(colors.get(&"red"), 2);
//! assert_eq!(colors.get(&"green"), 0);
//! assert_eq!(colors.total(), 3);
//! ```

use std::collections::{BTreeMap, btree_map};

/// Occurrence counts keyed by a totally ordered key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable<K> {
    counts: BTreeMap<K, usize>,
}

impl<K> Default for FrequencyTable<K> {
    fn default() -> Self {
        Self {
            counts: BTreeMap::new(),
        }
    }
}

impl<K> FrequencyTable<K>
where
    K: Ord,
{
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one occurrence of `key`.
    pub fn add(&mut self, key: K) {
        self.add_n(key, 1);
    }

    /// Records `n` occurrences of `key`.
    ///
    /// Adding zero occurrences still creates the entry.
    pub fn add_n(&mut self, key: K, n: usize) {
        *self.counts.entry(key).or_default() += n;
    }

    /// Returns the number of occurrences of `key`, or 0 if it was never seen.
    #[must_use]
    pub fn get(&self, key: &K) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Returns the sum of all counts.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Returns the number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Returns the share of `key` relative to `denominator` in percent.
    ///
    /// Returns `None` when `denominator` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use relstreak_stats::frequency::FrequencyTable;
    ///
    /// let mut table = FrequencyTable::new();
    /// table.add_n(1_u32, 3);
    /// table.add(2_u32);
    ///
    /// assert_eq!(table.percentage(&1, table.total()), Some(75.0));
    /// assert_eq!(table.percentage(&1, 0), None);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn percentage(&self, key: &K, denominator: usize) -> Option<f64> {
        if denominator == 0 {
            return None;
        }
        Some(self.get(key) as f64 / denominator as f64 * 100.0)
    }

    /// Adds every count of `other` into `self`.
    pub fn merge(&mut self, other: Self) {
        for (key, count) in other.counts {
            self.add_n(key, count);
        }
    }

    /// Iterates over `(key, count)` pairs in ascending key order.
    pub fn iter(&self) -> btree_map::Iter<'_, K, usize> {
        self.counts.iter()
    }

    /// Returns the entries sorted by descending count.
    ///
    /// Entries with equal counts keep ascending key order.
    #[must_use]
    pub fn sorted_by_count(&self) -> Vec<(&K, usize)> {
        let mut entries = self
            .counts
            .iter()
            .map(|(key, count)| (key, *count))
            .collect::<Vec<_>>();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }
}

impl<'a, K> IntoIterator for &'a FrequencyTable<K> {
    type Item = (&'a K, &'a usize);
    type IntoIter = btree_map::Iter<'a, K, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.iter()
    }
}

impl<K> FromIterator<K> for FrequencyTable<K>
where
    K: Ord,
{
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut table = Self::new();
        for key in iter {
            table.add(key);
        }
        table
    }
}

impl<K> Extend<K> for FrequencyTable<K>
where
    K: Ord,
{
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.add(key);
        }
    }
}
