// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planar face search around a node.
//!
//! Recovers candidate faces from connectivity and geometry alone, for meshes
//! whose face lists are unavailable. For every pair `(second, end)` of main
//! partners of a node, walks main edges from `second` over nodes on the plane
//! `(node, second, end)` until `end` is reached. The walk uses an explicit
//! stack, so long face boundaries cannot overflow the call stack.

use rustc_hash::FxHashSet;

use crate::arena::MeshArena;
use crate::error::{Error, Result};
use crate::geometry::Plane;
use crate::keys::*;
use crate::polyhedron::Polyhedron;

impl MeshArena {
    /// Finds every planar cycle of main edges passing through `node`.
    ///
    /// Each cycle is returned as `[node, second, .., end]`, where `second`
    /// and `end` are main partners of `node`. Cycles over the same node set
    /// are reported once. Cost grows exponentially with local vertex degree
    /// in the worst case.
    pub fn find_chaikin_groups_for(&self, node: NodeKey) -> Result<Vec<Vec<NodeKey>>> {
        let origin = self.node_coords(node)?;
        let partners = self.partners(node, EdgeFilter::Main)?;

        let mut found = Vec::new();
        let mut seen: FxHashSet<Vec<NodeKey>> = FxHashSet::default();

        for (i, &second) in partners.iter().enumerate() {
            for (j, &end) in partners.iter().enumerate() {
                if i == j {
                    continue;
                }
                let plane = match Plane::from_points(
                    &origin,
                    &self.node_coords(second)?,
                    &self.node_coords(end)?,
                ) {
                    Ok(plane) => plane,
                    Err(Error::DegeneratePlane) => continue,
                    Err(err) => return Err(err),
                };

                for cycle in self.planar_paths(node, second, end, &plane)? {
                    let mut key = cycle.clone();
                    key.sort();
                    if seen.insert(key) {
                        found.push(cycle);
                    }
                }
            }
        }

        tracing::trace!(?node, groups = found.len(), "planar group search");
        Ok(found)
    }

    /// Simple main-edge paths from `second` to `end` staying on `plane`,
    /// each prefixed with `node`.
    fn planar_paths(
        &self,
        node: NodeKey,
        second: NodeKey,
        end: NodeKey,
        plane: &Plane,
    ) -> Result<Vec<Vec<NodeKey>>> {
        let eps = self.epsilon();
        let mut cycles = Vec::new();

        // (current, path so far). The path holds node and second up front.
        let mut stack: Vec<(NodeKey, Vec<NodeKey>)> = Vec::new();
        let mut first = self.partners(second, EdgeFilter::Main)?;
        first.reverse();
        for next in first {
            stack.push((next, vec![node, second]));
        }

        while let Some((current, mut path)) = stack.pop() {
            if current == end {
                path.push(end);
                cycles.push(path);
                continue;
            }
            if path.contains(&current) || !plane.point_on_plane(&self.node_coords(current)?, eps) {
                continue;
            }

            path.push(current);
            let mut next = self.partners(current, EdgeFilter::Main)?;
            next.reverse();
            for partner in next {
                stack.push((partner, path.clone()));
            }
        }

        Ok(cycles)
    }
}

impl Polyhedron {
    /// Finds every planar cycle of main edges passing through `node`.
    pub fn find_chaikin_groups_for(&self, node: NodeKey) -> Result<Vec<Vec<NodeKey>>> {
        self.arena.find_chaikin_groups_for(node)
    }
}
