//! Keyed data join
//!
//! Compares two generations of drawn items by key and splits them into
//! entering, updating and exiting sets, so charts redraw by difference.

use std::collections::HashSet;
use std::hash::Hash;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join<K> {
    /// In `next` only, in `next` order
    pub enter: Vec<K>,
    /// In both, in `next` order
    pub update: Vec<K>,
    /// In `prev` only, in `prev` order
    pub exit: Vec<K>,
}

impl<K> Join<K> {
    /// Same set of keys on both sides
    pub fn is_stable(&self) -> bool {
        self.enter.is_empty() && self.exit.is_empty()
    }
}

pub fn join<T, K, F>(prev: &[T], next: &[T], key: F) -> Join<K>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    let prev_keys: HashSet<K> = prev.iter().map(&key).collect();
    let next_keys: HashSet<K> = next.iter().map(&key).collect();

    let (update, enter): (Vec<K>, Vec<K>) = next
        .iter()
        .map(&key)
        .partition(|k| prev_keys.contains(k));
    let exit = prev
        .iter()
        .map(&key)
        .filter(|k| !next_keys.contains(k))
        .collect();

    Join { enter, update, exit }
}
