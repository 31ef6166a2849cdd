// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-track keyframe storage.
//!
//! Keyframes are kept in insertion order, not chronological order. A move
//! rewrites the frame of a record in place, so the record keeps its slot.
//! Anything that needs chronological order sorts explicitly via
//! [`KeyframeStore::active_sorted`].

use crate::keyframe::Keyframe;
use indexmap::IndexMap;

/// Result of writing a value into the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreWrite {
    /// A new record was appended
    Inserted,
    /// An existing record was overwritten in place
    Updated,
}

/// Result of a successful move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreMove {
    /// Whether a record already at the destination was discarded
    pub replaced: bool,
}

/// Insertion-ordered keyframe collection with unique frames
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeStore<V> {
    keyframes: IndexMap<u32, Keyframe<V>>,
}

impl<V> KeyframeStore<V> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            keyframes: IndexMap::new(),
        }
    }

    /// Insert a value at `frame`, overwriting any existing value there
    pub fn upsert(&mut self, frame: u32, value: V) -> StoreWrite {
        match self.keyframes.get_mut(&frame) {
            Some(existing) => {
                existing.value = value;
                StoreWrite::Updated
            }
            None => {
                self.keyframes.insert(frame, Keyframe::new(frame, value));
                StoreWrite::Inserted
            }
        }
    }

    /// Remove the keyframe at `frame`
    pub fn remove(&mut self, frame: u32) -> Option<Keyframe<V>> {
        self.keyframes.shift_remove(&frame)
    }

    /// Move the keyframe at `from` to `to`, keeping its position in store order.
    ///
    /// Returns `None` when `from == to` or nothing is stored at `from`. A record
    /// already at `to` is discarded.
    pub fn move_frame(&mut self, from: u32, to: u32) -> Option<StoreMove> {
        if from == to || !self.keyframes.contains_key(&from) {
            return None;
        }

        let replaced = self.keyframes.shift_remove(&to).is_some();
        // Index is taken after the collision removal so it still points at the source slot
        let (index, _, mut keyframe) = self.keyframes.shift_remove_full(&from)?;
        keyframe.frame = to;
        self.keyframes.shift_insert(index, to, keyframe);

        Some(StoreMove { replaced })
    }

    /// Remove every keyframe
    pub fn clear(&mut self) {
        self.keyframes.clear();
    }

    /// Frames in store order
    pub fn frames(&self) -> Vec<u32> {
        self.keyframes.keys().copied().collect()
    }

    /// Keyframes in store order
    pub fn iter(&self) -> impl Iterator<Item = &Keyframe<V>> {
        self.keyframes.values()
    }

    /// Get the keyframe at `frame`
    pub fn get(&self, frame: u32) -> Option<&Keyframe<V>> {
        self.keyframes.get(&frame)
    }

    /// Check if a keyframe exists at `frame`
    pub fn contains(&self, frame: u32) -> bool {
        self.keyframes.contains_key(&frame)
    }

    /// Keyframe count
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Keyframes with `frame < duration`, sorted chronologically
    pub fn active_sorted(&self, duration: u32) -> Vec<&Keyframe<V>> {
        let mut active: Vec<_> = self
            .keyframes
            .values()
            .filter(|k| k.frame < duration)
            .collect();
        active.sort_by_key(|k| k.frame);
        active
    }
}

impl<V> Default for KeyframeStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(frames: &[u32]) -> KeyframeStore<char> {
        let mut store = KeyframeStore::new();
        for (i, frame) in frames.iter().enumerate() {
            store.upsert(*frame, (b'a' + i as u8) as char);
        }
        store
    }

    #[test]
    fn test_upsert_overwrites_in_place() {
        let mut store = store_with(&[30, 10, 20]);
        assert_eq!(store.upsert(10, 'z'), StoreWrite::Updated);
        assert_eq!(store.frames(), vec![30, 10, 20]);
        assert_eq!(store.get(10).map(|k| k.value), Some('z'));
        assert_eq!(store.upsert(5, 'y'), StoreWrite::Inserted);
        assert_eq!(store.frames(), vec![30, 10, 20, 5]);
    }

    #[test]
    fn test_move_preserves_store_order() {
        let mut store = store_with(&[30, 10, 20]);
        let moved = store.move_frame(10, 40);
        assert_eq!(moved, Some(StoreMove { replaced: false }));
        assert_eq!(store.frames(), vec![30, 40, 20]);
        assert_eq!(store.get(40).map(|k| (k.frame, k.value)), Some((40, 'b')));
    }

    #[test]
    fn test_move_onto_occupied_frame() {
        let mut store = store_with(&[30, 10, 20]);
        // Occupant at 30 sits before the source slot
        let moved = store.move_frame(20, 30);
        assert_eq!(moved, Some(StoreMove { replaced: true }));
        assert_eq!(store.frames(), vec![10, 30]);
        assert_eq!(store.get(30).map(|k| k.value), Some('c'));
    }

    #[test]
    fn test_move_noops() {
        let mut store = store_with(&[1, 2]);
        let before = store.clone();
        assert_eq!(store.move_frame(1, 1), None);
        assert_eq!(store.move_frame(9, 1), None);
        assert_eq!(store, before);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut store = store_with(&[4, 2]);
        let before = store.clone();
        assert!(store.remove(3).is_none());
        assert_eq!(store, before);
    }

    #[test]
    fn test_active_sorted_filters_and_sorts() {
        let store = store_with(&[50, 0, 120, 25]);
        let active: Vec<u32> = store.active_sorted(100).iter().map(|k| k.frame).collect();
        assert_eq!(active, vec![0, 25, 50]);
        assert_eq!(store.frames(), vec![50, 0, 120, 25]);
    }
}
