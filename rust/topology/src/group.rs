// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Groups: the planar faces of a mesh.
//!
//! A group starts as an unordered node set. Ordering arranges it into the
//! cycle its main edges describe; once ordered, it can be triangulated with
//! a small number of graphical edges and its triangles enumerated.

use rustc_hash::FxHashSet;

use crate::arena::*;
use crate::error::{Error, Result};
use crate::geometry::{centroid, Plane, Vec3};
use crate::keys::*;
use crate::tolerance::{Approx, ToleranceSet};

/// A triangle of mutually connected nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub nodes: [NodeKey; 3],
    pub corners: [Vec3; 3],
}

impl Approx for Triangle {
    fn anchor(&self) -> Vec3 {
        (self.corners[0] + self.corners[1] + self.corners[2]) / 3.0
    }

    /// Corners match pairwise in some order.
    fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.corners
            .iter()
            .all(|c| other.corners.iter().any(|o| c.approx_eq(o, epsilon)))
            && other
                .corners
                .iter()
                .all(|o| self.corners.iter().any(|c| c.approx_eq(o, epsilon)))
    }
}

impl MeshArena {
    /// Creates an unordered group over the given nodes.
    ///
    /// Repeated keys are kept once, at their first position.
    pub fn add_group(&mut self, nodes: impl IntoIterator<Item = NodeKey>) -> Result<GroupKey> {
        let mut seen = FxHashSet::default();
        let mut members = Vec::new();
        for key in nodes {
            if !self.nodes.contains_key(key) {
                return Err(Error::NodeNotFound(key));
            }
            if seen.insert(key) {
                members.push(key);
            }
        }

        Ok(self.groups.insert(GroupData {
            nodes: members,
            ..GroupData::default()
        }))
    }

    /// Coordinates of the group's nodes in sequence order.
    pub fn group_coords(&self, group: GroupKey) -> Result<Vec<Vec3>> {
        self.group_data(group)?
            .sequence()
            .iter()
            .map(|&n| self.node_coords(n))
            .collect()
    }

    /// Orders the group into the cycle described by its main edges.
    ///
    /// No-op if already ordered, unless `force` is set. Groups with fewer
    /// than 3 nodes keep their insertion order. Fails with
    /// [`Error::BrokenGroup`] if the walk gets stuck before placing every
    /// node; the group is then left unordered.
    pub fn order_group(&mut self, group: GroupKey, force: bool) -> Result<()> {
        let data = self.group_data(group)?;
        if data.is_ordered() && !force {
            return Ok(());
        }

        let ogroup = if data.size() < 3 {
            data.nodes.clone()
        } else {
            let mut remaining = data.nodes.clone();
            let mut ordered = Vec::with_capacity(remaining.len());
            // Non-empty: size >= 3.
            let mut current = remaining.pop().ok_or(Error::GroupNotFound(group))?;
            ordered.push(current);

            while !remaining.is_empty() {
                let next = remaining
                    .iter()
                    .position(|&n| self.are_connected(current, n, EdgeFilter::Main));
                match next {
                    Some(index) => {
                        current = remaining.remove(index);
                        ordered.push(current);
                    }
                    None => {
                        tracing::debug!(
                            ?group,
                            placed = ordered.len(),
                            unreached = remaining.len(),
                            "group main edges do not form a single cycle"
                        );
                        return Err(Error::BrokenGroup {
                            group,
                            ordered,
                            unreached: remaining,
                        });
                    }
                }
            }
            ordered
        };

        self.group_data_mut(group)?.ogroup = Some(ogroup);
        Ok(())
    }

    /// Marks the group as ordered along `sequence`, without checking edges.
    ///
    /// `sequence` must be a permutation of the group's nodes.
    pub(crate) fn set_group_order(&mut self, group: GroupKey, sequence: Vec<NodeKey>) -> Result<()> {
        let data = self.group_data_mut(group)?;
        debug_assert_eq!(data.nodes.len(), sequence.len());
        data.ogroup = Some(sequence);
        Ok(())
    }

    /// Connects consecutive nodes of the group, last back to first.
    ///
    /// Follows the cyclic order when ordered, the insertion order otherwise.
    pub fn cycle_connect(&mut self, group: GroupKey, kind: EdgeKind) -> Result<()> {
        let sequence = self.group_data(group)?.sequence().to_vec();
        if sequence.len() < 2 {
            return Ok(());
        }
        for (i, &node) in sequence.iter().enumerate() {
            let next = sequence[(i + 1) % sequence.len()];
            self.connect(node, next, kind)?;
        }
        Ok(())
    }

    /// Adds the edges triangulating an ordered group.
    ///
    /// Uses a doubling ladder: for step = 2, 4, 8, ... while step < size,
    /// chain `ogroup[0] -> ogroup[step] -> ogroup[2*step] -> ...` and close
    /// back to `ogroup[0]`. Every pass halves the remaining polygon, so an
    /// n-gon gets n - 3 new edges instead of a fan's worth of long slivers.
    /// Pairs that are already joined by any edge are skipped.
    pub fn inter_connect(&mut self, group: GroupKey, kind: EdgeKind, order_first: bool) -> Result<()> {
        if order_first {
            self.order_group(group, true)?;
        }
        let data = self.group_data(group)?;
        let Some(sequence) = data.ogroup.clone() else {
            return Err(Error::TriangulationPrecondition {
                group,
                reason: "group must be ordered before inter-connecting",
            });
        };

        let size = sequence.len();
        let mut step = 2;
        while step < size {
            let mut prev = sequence[0];
            for i in (step..size).step_by(step) {
                let current = sequence[i];
                self.connect_unless_joined(prev, current, kind)?;
                prev = current;
            }
            self.connect_unless_joined(sequence[0], prev, kind)?;
            step *= 2;
        }

        self.group_data_mut(group)?.interconnected = true;
        Ok(())
    }

    fn connect_unless_joined(&mut self, x: NodeKey, y: NodeKey, kind: EdgeKind) -> Result<()> {
        if x != y && !self.are_connected(x, y, EdgeFilter::Any) {
            self.connect(x, y, kind)?;
        }
        Ok(())
    }

    /// Enumerates the triangles of mutually connected nodes in the group.
    ///
    /// Only edges passing `filter` count as connections. Triangles are
    /// deduplicated under the arena tolerance.
    pub fn enumerate_triangles(&self, group: GroupKey, filter: EdgeFilter) -> Result<Vec<Triangle>> {
        let data = self.group_data(group)?;
        let members: FxHashSet<NodeKey> = data.nodes.iter().copied().collect();
        let mut triangles = ToleranceSet::with_epsilon(self.epsilon());

        for &n1 in &data.nodes {
            let n1_partners: Vec<NodeKey> = self
                .partners(n1, filter)?
                .into_iter()
                .filter(|n| members.contains(n))
                .collect();
            for &n2 in &n1_partners {
                for n3 in self.partners(n2, filter)? {
                    if n3 == n1 || !members.contains(&n3) || !n1_partners.contains(&n3) {
                        continue;
                    }
                    triangles.add(Triangle {
                        nodes: [n1, n2, n3],
                        corners: [
                            self.node_coords(n1)?,
                            self.node_coords(n2)?,
                            self.node_coords(n3)?,
                        ],
                    });
                }
            }
        }

        Ok(triangles.into_vec())
    }

    /// Calculates and caches the group's triangles over all edge kinds.
    ///
    /// May be called once per group. Groups with more than 3 nodes must
    /// have been inter-connected first.
    pub fn calc_triangles(&mut self, group: GroupKey) -> Result<()> {
        let data = self.group_data(group)?;
        if data.triangles.is_some() {
            return Err(Error::TrianglesAlreadyCalculated(group));
        }
        if data.size() > 3 && !data.interconnected {
            return Err(Error::TriangulationPrecondition {
                group,
                reason: "group must be inter-connected before calculating triangles",
            });
        }

        let triangles = self.enumerate_triangles(group, EdgeFilter::Any)?;
        self.group_data_mut(group)?.triangles = Some(triangles);
        Ok(())
    }

    /// Returns the cached triangles of a group.
    pub fn group_triangles(&self, group: GroupKey) -> Result<&[Triangle]> {
        self.group_data(group)?
            .triangles
            .as_deref()
            .ok_or(Error::TriangulationPrecondition {
                group,
                reason: "triangles have not been calculated",
            })
    }

    /// Returns `true` if every node of the group lies on one plane.
    ///
    /// Groups without three non-collinear nodes are trivially planar.
    pub fn group_is_planar(&self, group: GroupKey) -> Result<bool> {
        let coords = self.group_coords(group)?;
        let Some(plane) = fit_plane(&coords) else {
            return Ok(true);
        };
        let eps = self.epsilon();
        Ok(coords.iter().all(|p| plane.point_on_plane(p, eps)))
    }

    /// Centroid of the group's nodes.
    pub fn group_centroid(&self, group: GroupKey) -> Result<Option<Vec3>> {
        Ok(centroid(self.group_coords(group)?.iter()))
    }
}

/// Plane through the first non-collinear triple of points.
pub(crate) fn fit_plane(points: &[Vec3]) -> Option<Plane> {
    let first = points.first()?;
    let (i, second) = points
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, p)| (*p - first).norm_squared() > 0.0)?;
    points[i + 1..]
        .iter()
        .find_map(|third| Plane::from_points(first, second, third).ok())
}
