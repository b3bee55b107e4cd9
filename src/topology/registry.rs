use std::collections::{HashMap, HashSet};

use slotmap::SlotMap;

use super::{MeshPart, PartKey};

slotmap::new_key_type! {
    /// Stable handle to editor-side state for one part.
    pub struct PartHandle;
}

/// Persistent per-part state that outlives part rebuilds.
///
/// Parts are regenerated after every edit, so gizmos and widgets that need a
/// stable identity look their state up here by [`PartKey`]. Handles stay
/// valid until [`PartRegistry::sync`] finds their part gone.
#[derive(Debug)]
pub struct PartRegistry<T> {
    states: SlotMap<PartHandle, (PartKey, T)>,
    by_key: HashMap<PartKey, PartHandle>,
}

impl<T> Default for PartRegistry<T> {
    fn default() -> Self {
        Self {
            states: SlotMap::with_key(),
            by_key: HashMap::new(),
        }
    }
}

impl<T> PartRegistry<T> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handle for `key`, creating default state on first use.
    pub fn handle(&mut self, key: PartKey) -> PartHandle
    where
        T: Default,
    {
        if let Some(&handle) = self.by_key.get(&key) {
            return handle;
        }
        let handle = self.states.insert((key, T::default()));
        self.by_key.insert(key, handle);
        handle
    }

    /// Returns the handle for `key` without creating one.
    #[must_use]
    pub fn lookup(&self, key: &PartKey) -> Option<PartHandle> {
        self.by_key.get(key).copied()
    }

    /// The key a handle was issued for.
    #[must_use]
    pub fn key(&self, handle: PartHandle) -> Option<PartKey> {
        self.states.get(handle).map(|(key, _)| *key)
    }

    #[must_use]
    pub fn get(&self, handle: PartHandle) -> Option<&T> {
        self.states.get(handle).map(|(_, state)| state)
    }

    pub fn get_mut(&mut self, handle: PartHandle) -> Option<&mut T> {
        self.states.get_mut(handle).map(|(_, state)| state)
    }

    /// Drops state for every key not present in `parts`.
    ///
    /// Returns the number of entries removed.
    pub fn sync(&mut self, parts: &[MeshPart]) -> usize {
        let live: HashSet<PartKey> = parts.iter().map(MeshPart::key).collect();
        let before = self.states.len();
        self.states.retain(|_, entry| live.contains(&entry.0));
        self.by_key.retain(|key, _| live.contains(key));
        before - self.states.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::topology::PartKind;

    #[derive(Debug, Default, PartialEq)]
    struct Hover {
        hovered: bool,
    }

    #[test]
    fn same_key_same_handle() {
        let mut registry: PartRegistry<Hover> = PartRegistry::new();
        let a = registry.handle(PartKind::Edge([3, 1]).key());
        let b = registry.handle(PartKind::Edge([1, 3]).key());
        assert_eq!(a, b);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn state_survives_until_part_disappears() {
        let mut registry: PartRegistry<Hover> = PartRegistry::new();
        let face = MeshPart::new(PartKind::Face([0, 1, 2, 3]));
        let vertex = MeshPart::new(PartKind::Vertex([9]));
        let face_handle = registry.handle(face.key());
        let vertex_handle = registry.handle(vertex.key());
        registry.get_mut(face_handle).unwrap().hovered = true;

        assert_eq!(registry.sync(&[face]), 1);
        assert_eq!(registry.get(face_handle), Some(&Hover { hovered: true }));
        assert!(registry.get(vertex_handle).is_none());
        assert!(registry.lookup(&vertex.key()).is_none());
    }

    #[test]
    fn stale_handle_is_not_reused_for_new_key() {
        let mut registry: PartRegistry<Hover> = PartRegistry::new();
        let old = registry.handle(PartKey::Vertex(1));
        registry.sync(&[]);
        let new = registry.handle(PartKey::Vertex(2));
        assert_ne!(old, new);
        assert!(registry.key(old).is_none());
        assert_eq!(registry.key(new), Some(PartKey::Vertex(2)));
    }
}
