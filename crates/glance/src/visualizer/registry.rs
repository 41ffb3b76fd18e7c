//! Registered geometries and their renderers.

use std::collections::HashMap;

use glance_core::{AxisAlignedBoundingBox, GeometryId, SharedGeometry};
use glance_render::GeometryRenderer;

/// A registered geometry and the renderer bound to it.
pub(crate) struct GeometryEntry {
    pub geometry: SharedGeometry,
    pub renderer: Box<dyn GeometryRenderer>,
}

/// Geometries keyed by identity, each owning exactly one renderer.
///
/// Holding the renderer inside the entry keeps the renderer count equal to
/// the geometry count. Iteration order is unspecified.
#[derive(Default)]
pub(crate) struct GeometryRegistry {
    entries: HashMap<GeometryId, GeometryEntry>,
}

impl GeometryRegistry {
    pub fn contains(&self, id: GeometryId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Inserts an entry. The caller has checked that `id` is not present.
    pub fn insert(&mut self, id: GeometryId, entry: GeometryEntry) {
        self.entries.insert(id, entry);
    }

    pub fn remove(&mut self, id: GeometryId) -> Option<GeometryEntry> {
        self.entries.remove(&id)
    }

    pub fn get_mut(&mut self, id: GeometryId) -> Option<&mut GeometryEntry> {
        self.entries.get_mut(&id)
    }

    pub fn drain(&mut self) -> impl Iterator<Item = GeometryEntry> + '_ {
        self.entries.drain().map(|(_, entry)| entry)
    }

    pub fn values(&self) -> impl Iterator<Item = &GeometryEntry> {
        self.entries.values()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut GeometryEntry> {
        self.entries.values_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn renderer_count(&self) -> usize {
        self.entries.values().filter(|e| e.renderer.geometry().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merges the bounding boxes of every 3D geometry.
    pub fn bounding_box(&self) -> AxisAlignedBoundingBox {
        let mut bbox = AxisAlignedBoundingBox::empty();
        for entry in self.entries.values() {
            let Ok(geometry) = entry.geometry.read() else {
                continue;
            };
            if geometry.kind().is_2d() {
                continue;
            }
            if let Some(b) = geometry.bounding_box() {
                bbox.merge(&b);
            }
        }
        bbox
    }
}
