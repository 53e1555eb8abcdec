//! Bounding-box spatial index over opaque payloads.
//!
//! Backed by an R-tree (`rstar`). Queries return every entry whose box
//! intersects the query box; callers confirm candidates with a distance
//! test.

use rstar::{AABB, RTree, RTreeObject};

use crate::extent::Extent;

/// One indexed payload with its bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry<P> {
    pub extent: Extent,
    pub payload: P,
}

impl<P> IndexEntry<P> {
    pub fn new(extent: Extent, payload: P) -> Self {
        Self { extent, payload }
    }
}

impl<P> RTreeObject for IndexEntry<P> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        to_aabb(&self.extent)
    }
}

fn to_aabb(extent: &Extent) -> AABB<[f64; 2]> {
    AABB::from_corners(extent.min(), extent.max())
}

/// Mutable R-tree index mapping extents to payloads.
pub struct SpatialIndex<P> {
    tree: RTree<IndexEntry<P>>,
}

impl<P> Default for SpatialIndex<P> {
    fn default() -> Self {
        Self { tree: RTree::new() }
    }
}

impl<P> std::fmt::Debug for SpatialIndex<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("size", &self.tree.size())
            .finish()
    }
}

impl<P: Clone + PartialEq> SpatialIndex<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Insert a single entry. O(log n).
    pub fn insert(&mut self, extent: Extent, payload: P) {
        self.tree.insert(IndexEntry::new(extent, payload));
    }

    /// Insert a batch of entries.
    ///
    /// An empty tree is packed directly. A populated tree takes the entries
    /// one at a time, so the cost follows the batch size and not the tree.
    pub fn bulk_load(&mut self, entries: Vec<(Extent, P)>) {
        let new: Vec<IndexEntry<P>> = entries
            .into_iter()
            .map(|(extent, payload)| IndexEntry::new(extent, payload))
            .collect();

        if self.is_empty() {
            self.tree = RTree::bulk_load(new);
        } else {
            for entry in new {
                self.tree.insert(entry);
            }
        }
    }

    /// All payloads whose box intersects `extent`. Order is unspecified.
    pub fn query_extent(&self, extent: &Extent) -> Vec<&IndexEntry<P>> {
        if extent.is_empty() {
            return Vec::new();
        }
        self.tree
            .locate_in_envelope_intersecting(&to_aabb(extent))
            .collect()
    }

    /// Remove every entry intersecting `extent` whose payload matches
    /// `predicate`, returning the removed payloads.
    ///
    /// Correctness relies on `extent` covering every entry that should go.
    pub fn remove_where(
        &mut self,
        extent: &Extent,
        mut predicate: impl FnMut(&P) -> bool,
    ) -> Vec<P> {
        if extent.is_empty() {
            return Vec::new();
        }
        let doomed: Vec<IndexEntry<P>> = self
            .tree
            .locate_in_envelope_intersecting(&to_aabb(extent))
            .filter(|entry| predicate(&entry.payload))
            .cloned()
            .collect();

        let mut removed = Vec::with_capacity(doomed.len());
        for entry in doomed.iter().rev() {
            if let Some(entry) = self.tree.remove(entry) {
                removed.push(entry.payload);
            }
        }
        removed
    }

    /// Iterate over every entry.
    pub fn iter(&self) -> impl Iterator<Item = &IndexEntry<P>> {
        self.tree.iter()
    }

    pub fn clear(&mut self) {
        self.tree = RTree::new();
    }
}
