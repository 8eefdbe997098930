// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tolerance-aware containers for deduplicating geometric values.
//!
//! Floating-point arithmetic produces coordinates that are mathematically
//! identical but bit-different. [`ToleranceSet`] and [`ToleranceMap`] treat
//! two values as equal when they match within an epsilon, and keep insertion
//! order for iteration.
//!
//! Lookups go through a grid-based spatial hash with cubic cells of side
//! `epsilon`: each value is bucketed by an anchor point and a query checks
//! the 27 neighbouring cells (3x3x3 neighbourhood), so dedup stays O(1) on
//! average instead of a linear scan.

use rustc_hash::FxHashMap;

use crate::geometry::{centroid, Vec3};

/// Default coordinate tolerance.
pub const DEFAULT_EPSILON: f64 = 1e-5;

/// A value that can be compared within a tolerance.
///
/// Implementations must guarantee that two approximately equal values have
/// anchors differing by less than `epsilon` in every component, which is
/// what lets the grid only look at neighbouring cells.
pub trait Approx {
    /// Representative point used to bucket the value.
    fn anchor(&self) -> Vec3;

    /// Approximate equality under `epsilon`.
    fn approx_eq(&self, other: &Self, epsilon: f64) -> bool;
}

impl Approx for Vec3 {
    fn anchor(&self) -> Vec3 {
        *self
    }

    fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self - other).iter().all(|d| d.abs() < epsilon)
    }
}

/// The corner coordinates of a polygon, compared as an unordered point set.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceOutline {
    pub corners: Vec<Vec3>,
}

impl FaceOutline {
    pub fn new(corners: Vec<Vec3>) -> Self {
        Self { corners }
    }
}

impl Approx for FaceOutline {
    fn anchor(&self) -> Vec3 {
        centroid(self.corners.iter()).unwrap_or_else(Vec3::zeros)
    }

    fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.corners.len() == other.corners.len()
            && self
                .corners
                .iter()
                .all(|c| other.corners.iter().any(|o| c.approx_eq(o, epsilon)))
            && other
                .corners
                .iter()
                .all(|o| self.corners.iter().any(|c| c.approx_eq(o, epsilon)))
    }
}

/// Spatial hash from grid cells to item indices.
#[derive(Debug, Clone)]
struct BucketGrid {
    cell_size: f64,
    cells: FxHashMap<(i64, i64, i64), Vec<usize>>,
}

impl BucketGrid {
    fn new(cell_size: f64) -> Self {
        assert!(
            cell_size.is_finite() && cell_size > 0.0,
            "tolerance must be positive and finite, got {cell_size}"
        );
        Self {
            cell_size,
            cells: FxHashMap::default(),
        }
    }

    fn insert(&mut self, anchor: &Vec3, index: usize) {
        let cell = self.cell_coords(anchor);
        self.cells.entry(cell).or_default().push(index);
    }

    /// Candidate indices in the 3x3x3 neighbourhood of `anchor`.
    fn candidates<'a>(&'a self, anchor: &Vec3) -> impl Iterator<Item = usize> + 'a {
        let (cx, cy, cz) = self.cell_coords(anchor);
        (-1..=1)
            .flat_map(move |dx| (-1..=1).flat_map(move |dy| (-1..=1).map(move |dz| (dx, dy, dz))))
            .filter_map(move |(dx, dy, dz)| {
                self.cells
                    .get(&(cx.saturating_add(dx), cy.saturating_add(dy), cz.saturating_add(dz)))
            })
            .flat_map(|bucket| bucket.iter().copied())
    }

    /// Cell of `p`. Float-to-int casts saturate, so far-out points share the
    /// edge cells and are told apart by the exact comparison.
    fn cell_coords(&self, p: &Vec3) -> (i64, i64, i64) {
        (
            (p.x / self.cell_size).floor() as i64,
            (p.y / self.cell_size).floor() as i64,
            (p.z / self.cell_size).floor() as i64,
        )
    }
}

/// An insertion-ordered set under approximate equality.
///
/// # Example
///
/// ```
/// use chaikin3d_topology::tolerance::ToleranceSet;
/// use chaikin3d_topology::Vec3;
///
/// let mut set = ToleranceSet::new();
/// assert!(set.add(Vec3::new(1.0, 2.0, 3.0)));
/// assert!(!set.add(Vec3::new(1.0, 2.0, 3.000_001)));
/// assert_eq!(set.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ToleranceSet<T> {
    epsilon: f64,
    items: Vec<T>,
    grid: BucketGrid,
}

impl<T: Approx> ToleranceSet<T> {
    /// Creates an empty set with [`DEFAULT_EPSILON`].
    pub fn new() -> Self {
        Self::with_epsilon(DEFAULT_EPSILON)
    }

    /// Creates an empty set with the given tolerance.
    ///
    /// # Panics
    ///
    /// Panics if `epsilon` is not a positive finite number.
    pub fn with_epsilon(epsilon: f64) -> Self {
        Self {
            epsilon,
            items: Vec::new(),
            grid: BucketGrid::new(epsilon),
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Index of the element approximately equal to `item`, if any.
    ///
    /// When several stored elements match, the earliest inserted wins.
    pub fn position(&self, item: &T) -> Option<usize> {
        self.grid
            .candidates(&item.anchor())
            .filter(|&i| self.items[i].approx_eq(item, self.epsilon))
            .min()
    }

    pub fn contains(&self, item: &T) -> bool {
        self.position(item).is_some()
    }

    /// Inserts `item` unless an approximately equal element exists.
    ///
    /// Returns `true` if the item was inserted.
    pub fn add(&mut self, item: T) -> bool {
        if self.contains(&item) {
            return false;
        }
        self.grid.insert(&item.anchor(), self.items.len());
        self.items.push(item);
        true
    }

    /// Adds every element of `other` that is not already represented.
    pub fn merge_with(&mut self, other: ToleranceSet<T>) {
        for item in other.items {
            self.add(item);
        }
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T: Approx> Default for ToleranceSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Approx> FromIterator<T> for ToleranceSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for item in iter {
            set.add(item);
        }
        set
    }
}

impl<'a, T> IntoIterator for &'a ToleranceSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// An insertion-ordered map whose keys compare under approximate equality.
#[derive(Debug, Clone)]
pub struct ToleranceMap<K, V> {
    epsilon: f64,
    entries: Vec<(K, V)>,
    grid: BucketGrid,
}

impl<K: Approx, V> ToleranceMap<K, V> {
    /// Creates an empty map with [`DEFAULT_EPSILON`].
    pub fn new() -> Self {
        Self::with_epsilon(DEFAULT_EPSILON)
    }

    /// Creates an empty map with the given tolerance.
    ///
    /// # Panics
    ///
    /// Panics if `epsilon` is not a positive finite number.
    pub fn with_epsilon(epsilon: f64) -> Self {
        Self {
            epsilon,
            entries: Vec::new(),
            grid: BucketGrid::new(epsilon),
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    fn position(&self, key: &K) -> Option<usize> {
        self.grid
            .candidates(&key.anchor())
            .filter(|&i| self.entries[i].0.approx_eq(key, self.epsilon))
            .min()
    }

    /// Associates `value` with `key`.
    ///
    /// If an approximately equal key exists its value is overwritten (the
    /// stored key is kept) and the previous value is returned.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.position(&key) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.grid.insert(&key.anchor(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Returns the value for `key`, inserting `make()` first if absent.
    pub fn get_or_insert_with(&mut self, key: K, make: impl FnOnce() -> V) -> &mut V {
        let index = match self.position(&key) {
            Some(i) => i,
            None => {
                let i = self.entries.len();
                self.grid.insert(&key.anchor(), i);
                self.entries.push((key, make()));
                i
            }
        };
        &mut self.entries[index].1
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.position(key).map(move |i| &mut self.entries[i].1)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.position(key).is_some()
    }

    /// Unions `other` into this map, keeping one entry per equality class.
    ///
    /// Entries already present here win over those of `other`.
    pub fn merge_with(&mut self, other: ToleranceMap<K, V>) {
        for (key, value) in other.entries {
            if !self.contains_key(&key) {
                self.grid.insert(&key.anchor(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl<K: Approx, V> Default for ToleranceMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_dedups_within_epsilon() {
        let mut set = ToleranceSet::new();
        assert!(set.add(Vec3::new(0.0, 0.0, 0.0)));
        assert!(!set.add(Vec3::new(9e-6, -9e-6, 0.0)));
        assert!(set.add(Vec3::new(1e-5, 0.0, 0.0)));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn tolerance_law_holds_for_other_epsilons() {
        for &eps in &[1e-9, 1e-3, 0.5, 10.0] {
            let mut set = ToleranceSet::with_epsilon(eps);
            let base = Vec3::new(3.25, -7.5, 100.0);
            set.add(base);
            assert!(set.contains(&(base + Vec3::new(0.9 * eps, -0.9 * eps, 0.5 * eps))));
            assert!(!set.contains(&(base + Vec3::new(0.0, 0.0, 1.01 * eps))));
            assert!(!set.contains(&(base - Vec3::new(1.01 * eps, 0.0, 0.0))));
        }
    }

    #[test]
    fn set_matches_across_cell_boundaries() {
        // 0.99e-5 and 1.01e-5 fall in different cells but are within epsilon.
        let mut set = ToleranceSet::new();
        set.add(Vec3::new(0.99e-5, 0.0, 0.0));
        assert!(set.contains(&Vec3::new(1.01e-5, 0.0, 0.0)));
    }

    #[test]
    fn coordinates_beyond_the_cell_range() {
        // 1e14 / 1e-5 does not fit an i64 cell index.
        let mut set = ToleranceSet::with_epsilon(1e-5);
        assert!(set.add(Vec3::new(1e14, 0.0, 0.0)));
        assert!(set.add(Vec3::new(1e14 + 1.0, 0.0, 0.0)));
        assert!(set.add(Vec3::new(-1e14, -1e14, 1e14)));
        assert!(!set.add(Vec3::new(1e14, 0.0, 0.0)));
        assert!(set.contains(&Vec3::new(-1e14, -1e14, 1e14)));
        assert_eq!(set.len(), 3);

        let mut map = ToleranceMap::with_epsilon(1e-12);
        map.insert(Vec3::new(1e7, 1e7, 1e7), 1);
        assert_eq!(map.get(&Vec3::new(1e7, 1e7, 1e7)), Some(&1));
    }

    #[test]
    fn set_keeps_insertion_order() {
        let set: ToleranceSet<Vec3> = vec![
            Vec3::new(3.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(3.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
        ]
        .into_iter()
        .collect();
        let xs: Vec<f64> = set.iter().map(|v| v.x).collect();
        assert_eq!(xs, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn face_outline_ignores_corner_order() {
        let a = FaceOutline::new(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]);
        let b = FaceOutline::new(vec![
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 0.000_001),
            Vec3::new(1.0, 0.0, 0.0),
        ]);
        let c = FaceOutline::new(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 2.0, 0.0),
        ]);
        assert!(a.approx_eq(&b, DEFAULT_EPSILON));
        assert!(!a.approx_eq(&c, DEFAULT_EPSILON));
    }

    #[test]
    fn map_overwrites_existing_key() {
        let mut map = ToleranceMap::new();
        assert_eq!(map.insert(Vec3::new(1.0, 1.0, 1.0), "a"), None);
        assert_eq!(map.insert(Vec3::new(1.0, 1.0, 1.000_002), "b"), Some("a"));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&Vec3::new(1.0, 1.0, 1.0)), Some(&"b"));
        // The first key is kept as the representative.
        assert_eq!(map.keys().next().unwrap().z, 1.0);
    }

    #[test]
    fn map_merge_keeps_receiver_entries() {
        let mut left = ToleranceMap::new();
        left.insert(Vec3::new(0.0, 0.0, 0.0), 1);
        left.insert(Vec3::new(1.0, 0.0, 0.0), 2);

        let mut right = ToleranceMap::new();
        right.insert(Vec3::new(0.0, 0.0, 1e-7), 10);
        right.insert(Vec3::new(5.0, 0.0, 0.0), 30);

        left.merge_with(right);
        let values: Vec<i32> = left.values().copied().collect();
        assert_eq!(values, vec![1, 2, 30]);
    }

    #[test]
    fn map_get_or_insert_with() {
        let mut map: ToleranceMap<Vec3, Vec<u32>> = ToleranceMap::new();
        map.get_or_insert_with(Vec3::zeros(), Vec::new).push(1);
        map.get_or_insert_with(Vec3::new(1e-6, 0.0, 0.0), Vec::new).push(2);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&Vec3::zeros()).unwrap(), &vec![1, 2]);
        assert!(map.get_mut(&Vec3::new(2.0, 0.0, 0.0)).is_none());
    }
}
