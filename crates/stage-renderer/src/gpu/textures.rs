//! Handle table of the textures shared between backends.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::backend::GpuTextureHandle;

struct Table<V> {
    views: HashMap<GpuTextureHandle, V>,
    next_handle: u64,
}

/// Maps raw texture handles to texture views.
///
/// Clones share the same table, so a handle registered by the 2D backend
/// resolves in the 3D backend of the same [`GpuContext`](super::GpuContext).
pub struct TextureTable<V> {
    inner: Arc<Mutex<Table<V>>>,
}

/// Table of the views of one GPU context.
pub type SharedTextures = TextureTable<Arc<wgpu::TextureView>>;

impl<V> Clone for TextureTable<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> Default for TextureTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> TextureTable<V> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Table {
                views: HashMap::new(),
                next_handle: 1,
            })),
        }
    }

    /// Registers `view` under a fresh handle.
    pub fn insert(&self, view: V) -> GpuTextureHandle {
        let mut table = self.inner.lock();
        let handle = GpuTextureHandle(table.next_handle);
        table.next_handle += 1;
        table.views.insert(handle, view);
        handle
    }

    pub fn remove(&self, handle: GpuTextureHandle) -> Option<V> {
        self.inner.lock().views.remove(&handle)
    }

    pub fn contains(&self, handle: GpuTextureHandle) -> bool {
        self.inner.lock().views.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().views.is_empty()
    }
}

impl<V: Clone> TextureTable<V> {
    /// View registered under `handle`.
    pub fn get(&self, handle: GpuTextureHandle) -> Option<V> {
        self.inner.lock().views.get(&handle).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_unique() {
        let table = TextureTable::new();
        let first = table.insert("first");
        let second = table.insert("second");

        assert_ne!(first, second);
        assert_eq!(table.get(first), Some("first"));
        assert_eq!(table.get(second), Some("second"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_removed_handle_no_longer_resolves() {
        let table = TextureTable::new();
        let handle = table.insert(1u32);

        assert_eq!(table.remove(handle), Some(1));
        assert!(table.get(handle).is_none());
        assert!(!table.contains(handle));
        assert!(table.is_empty());

        // Handles are never reused.
        assert_ne!(table.insert(2u32), handle);
    }

    #[test]
    fn test_clones_share_entries() {
        let table = TextureTable::new();
        let other = table.clone();
        let handle = table.insert("target");

        assert_eq!(other.get(handle), Some("target"));
        other.remove(handle);
        assert!(!table.contains(handle));
    }
}
