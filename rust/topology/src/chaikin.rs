// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The Chaikin3D corner-cutting pass.
//!
//! One pass truncates every corner of the mesh and rebuilds every face:
//!
//! 1. **Corner truncation.** Each main edge `(v, p)` of a node `v` gets a new
//!    node at `p + ratio * (v - p)` and is repointed onto it, in place. The
//!    new nodes of `v` become one corner group, cycle-connected in angular
//!    order around the corner.
//! 2. **Resurfacing.** Each old face is rebuilt from, for every boundary pair
//!    `(a, b)`, the new node of `a` nearest to `b` and the new node of `b`
//!    nearest to `a`. The two must be joined by the repointed main edge;
//!    when they are not, that edge's endpoints are used.
//! 3. Old nodes (with their graphical edges) and old groups are dropped.
//!
//! A node with exactly two main edges is cut into a two-node segment group.
//! A node with a single main edge cannot be cut and fails the pass.

use std::time::Instant;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::arena::MeshArena;
use crate::error::{Error, Result};
use crate::geometry::{angular_order, centroid, distance, newell_normal, Vec3};
use crate::group::fit_plane;
use crate::keys::*;
use crate::polyhedron::Polyhedron;
use crate::tolerance::{FaceOutline, ToleranceSet};

/// Progress is traced every this many nodes.
pub const VERBOSE_STEP: usize = 10;

/// Default Chaikin coefficient.
pub const DEFAULT_COEFFICIENT: u32 = 4;

/// Parameters of one Chaikin3D pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaikinOptions {
    /// How far each corner is cut; larger values cut less. At least 3.
    pub coefficient: u32,
    /// Drop faces whose boundary cannot be rebuilt instead of failing.
    pub skip_unresolved_faces: bool,
}

impl ChaikinOptions {
    pub fn new(coefficient: u32) -> Result<Self> {
        if coefficient < 3 {
            return Err(Error::InvalidCoefficient(coefficient));
        }
        Ok(Self {
            coefficient,
            ..Self::default()
        })
    }

    /// Ratio used toward an untouched partner: `(n - 1) / n`.
    pub fn base_ratio(&self) -> f64 {
        let n = f64::from(self.coefficient);
        (n - 1.0) / n
    }

    /// Ratio used toward a partner cut earlier in the same pass:
    /// `(n - 2) / (n - 1)`.
    ///
    /// The partner already sits `1/n` of the edge away from its corner, so
    /// this puts the new node `1/n` away from this corner.
    pub fn special_ratio(&self) -> f64 {
        let n = f64::from(self.coefficient);
        (n - 2.0) / (n - 1.0)
    }
}

impl Default for ChaikinOptions {
    fn default() -> Self {
        Self {
            coefficient: DEFAULT_COEFFICIENT,
            skip_unresolved_faces: false,
        }
    }
}

/// What a pass produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChaikinReport {
    /// One per old node with at least 3 main edges.
    pub corner_groups: usize,
    /// One per old face rebuilt.
    pub resurfaced_groups: usize,
    /// Old faces dropped because their boundary could not be rebuilt.
    pub skipped_faces: usize,
    /// New groups dropped because an identical outline already existed.
    pub duplicate_groups: usize,
    /// Boundary pairs taken from the linking main edge because the nearest
    /// nodes were not joined.
    pub reselected_pairs: usize,
}

impl Polyhedron {
    /// Runs one Chaikin3D pass with coefficient `n`.
    ///
    /// Consumes the mesh: its main edges are repointed onto the new nodes.
    /// Clone first to keep the original.
    pub fn chaikin3d(self, n: u32) -> Result<Polyhedron> {
        let options = ChaikinOptions::new(n)?;
        self.chaikin3d_with(&options).map(|(poly, _)| poly)
    }

    /// Runs one Chaikin3D pass, returning the new mesh and a report.
    pub fn chaikin3d_with(self, options: &ChaikinOptions) -> Result<(Polyhedron, ChaikinReport)> {
        if options.coefficient < 3 {
            return Err(Error::InvalidCoefficient(options.coefficient));
        }
        let started = Instant::now();
        let Polyhedron {
            mut arena,
            nodes: old_nodes,
            groups: old_groups,
        } = self;

        let mut report = ChaikinReport::default();
        let mut outlines = ToleranceSet::with_epsilon(arena.epsilon());
        let mut new_groups = Vec::with_capacity(old_nodes.len() + old_groups.len());

        // 1. Corner truncation.
        let total = old_nodes.len();
        tracing::debug!(nodes = total, "truncating corners");
        let (new_nodes, corners) = truncate_corners(&mut arena, &old_nodes, options)?;

        for &old in &old_nodes {
            let cut = corners.get(&old).map(Vec::as_slice).unwrap_or_default();
            let group = match cut.len() {
                0 => {
                    tracing::warn!(?old, "isolated node has no corner to cut");
                    continue;
                }
                1 => return Err(Error::DanglingCorner(old)),
                2 => segment_group(&mut arena, cut)?,
                _ => corner_group(&mut arena, old, cut)?,
            };
            if keep_unique(&arena, &mut outlines, group, &mut report)? {
                new_groups.push(group);
                report.corner_groups += 1;
            }
        }

        // 2. Resurfacing.
        tracing::debug!(groups = old_groups.len(), "resurfacing faces");
        for (index, &old_group) in old_groups.iter().enumerate() {
            if index % VERBOSE_STEP == 0 {
                tracing::trace!(index, total = old_groups.len(), "resurfacing");
            }
            arena.order_group(old_group, false)?;
            let boundary = match resurface(&arena, old_group, &corners) {
                Ok((boundary, reselected)) => {
                    report.reselected_pairs += reselected;
                    boundary
                }
                Err(err @ Error::UnresolvedResurfacing { .. }) if options.skip_unresolved_faces => {
                    tracing::warn!(error = %err, "skipping face");
                    report.skipped_faces += 1;
                    continue;
                }
                Err(err) => return Err(err),
            };

            let group = arena.add_group(boundary.iter().copied())?;
            arena.set_group_order(group, boundary)?;
            arena.inter_connect(group, EdgeKind::Graphical, false)?;
            if keep_unique(&arena, &mut outlines, group, &mut report)? {
                new_groups.push(group);
                report.resurfaced_groups += 1;
            }
        }

        // 3. Drop the old mesh.
        for &group in &old_groups {
            arena.remove_group(group);
        }
        for &node in &old_nodes {
            arena.remove_node(node);
        }

        tracing::info!(
            coefficient = options.coefficient,
            nodes = new_nodes.len(),
            groups = new_groups.len(),
            skipped = report.skipped_faces,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "chaikin3d pass finished"
        );

        let poly = Polyhedron::from_parts(arena, new_nodes, new_groups)?;
        Ok((poly, report))
    }
}

/// Cuts every corner, returning the new nodes in creation order and, per old
/// node, the new nodes cut from its corner.
fn truncate_corners(
    arena: &mut MeshArena,
    old_nodes: &[NodeKey],
    options: &ChaikinOptions,
) -> Result<(Vec<NodeKey>, FxHashMap<NodeKey, Vec<NodeKey>>)> {
    let old_set: FxHashSet<NodeKey> = old_nodes.iter().copied().collect();
    let base_ratio = options.base_ratio();
    let special_ratio = options.special_ratio();

    let mut new_nodes = Vec::new();
    let mut corners = FxHashMap::default();

    for (index, &node) in old_nodes.iter().enumerate() {
        if index % VERBOSE_STEP == 0 {
            tracing::trace!(index, total = old_nodes.len(), "truncating");
        }
        let v = arena.node_coords(node)?;
        let mut cut = Vec::new();

        for edge in arena.edges_of_type(node, EdgeFilter::Main)? {
            let partner = arena.partner(node, edge)?;
            let p = arena.node_coords(partner)?;
            let ratio = if old_set.contains(&partner) {
                base_ratio
            } else {
                special_ratio
            };

            let sub = arena.add_node(p + (v - p) * ratio);
            arena.update_node(edge, node, sub)?;
            cut.push(sub);
        }

        new_nodes.extend_from_slice(&cut);
        corners.insert(node, cut);
    }

    Ok((new_nodes, corners))
}

/// Joins the two cut nodes of a corner with only two main edges.
///
/// The corner of such a node (a vertex along a straight edge, or on the rim
/// of a flat sheet) is a segment: a two-node group, so both faces through the
/// corner stay closed.
fn segment_group(arena: &mut MeshArena, cut: &[NodeKey]) -> Result<GroupKey> {
    let group = arena.add_group(cut.iter().copied())?;
    arena.set_group_order(group, cut.to_vec())?;
    arena.cycle_connect(group, EdgeKind::Main)?;
    arena.group_data_mut(group)?.interconnected = true;
    Ok(group)
}

/// Builds the corner group of `old` over its cut nodes, in angular order.
fn corner_group(arena: &mut MeshArena, old: NodeKey, cut: &[NodeKey]) -> Result<GroupKey> {
    let coords = cut
        .iter()
        .map(|&n| arena.node_coords(n))
        .collect::<Result<Vec<_>>>()?;
    let corner = arena.node_coords(old)?;

    let order = match corner_normal(&corner, &coords) {
        Some(normal) => angular_order(&coords, &normal),
        None => (0..cut.len()).collect(),
    };

    let group = arena.add_group(order.iter().map(|&i| cut[i]))?;
    arena.cycle_connect(group, EdgeKind::Main)?;
    arena.inter_connect(group, EdgeKind::Graphical, true)?;
    Ok(group)
}

/// Axis to sort a corner's cut nodes around.
///
/// Points from the cut nodes' centroid to the old corner. Flat corners fall
/// back to the plane through the cut nodes.
fn corner_normal(corner: &Vec3, cut: &[Vec3]) -> Option<Vec3> {
    let center = centroid(cut.iter())?;
    let axis = corner - center;
    if axis.norm() > 1e-12 {
        return Some(axis);
    }
    fit_plane(cut)
        .map(|plane| plane.normal)
        .or_else(|| newell_normal(cut))
}

/// New boundary of an old face, walking its cycle.
///
/// For each boundary pair `(a, b)` emits the new node of `a` nearest to `b`
/// and the new node of `b` nearest to `a`. Where a short cut edge next to a
/// long one makes the nearest pair miss, the pair is taken from the main edge
/// linking the two corners instead; the count of such pairs is returned.
fn resurface(
    arena: &MeshArena,
    old_group: GroupKey,
    corners: &FxHashMap<NodeKey, Vec<NodeKey>>,
) -> Result<(Vec<NodeKey>, usize)> {
    let cycle = arena.group_data(old_group)?.sequence().to_vec();
    let mut boundary = Vec::with_capacity(cycle.len() * 2);
    let mut reselected = 0;

    for i in 0..cycle.len() {
        let a = cycle[(i + cycle.len() - 1) % cycle.len()];
        let b = cycle[i];
        let unresolved = || Error::UnresolvedResurfacing {
            group: old_group,
            a,
            b,
        };
        let cut_a = corners.get(&a).map(Vec::as_slice).unwrap_or_default();
        let cut_b = corners.get(&b).map(Vec::as_slice).unwrap_or_default();

        let near_b = nearest(arena, cut_a, &arena.node_coords(b)?)?;
        let near_a = nearest(arena, cut_b, &arena.node_coords(a)?)?;
        let (x, y) = match (near_b, near_a) {
            (Some(x), Some(y)) if arena.are_connected(x, y, EdgeFilter::Main) => (x, y),
            _ => {
                let pair = linking_edge(arena, cut_a, cut_b)?.ok_or_else(unresolved)?;
                tracing::debug!(?old_group, "nearest pair is not joined, using the linking edge");
                reselected += 1;
                pair
            }
        };
        boundary.push(x);
        boundary.push(y);
    }

    // A segment yields the same pair from both directions.
    if cycle.len() == 2 {
        boundary.truncate(2);
    }
    Ok((boundary, reselected))
}

/// The endpoints of a main edge joining `from` to `to`, if any.
fn linking_edge(arena: &MeshArena, from: &[NodeKey], to: &[NodeKey]) -> Result<Option<(NodeKey, NodeKey)>> {
    for &x in from {
        if let Some(y) = arena
            .partners(x, EdgeFilter::Main)?
            .into_iter()
            .find(|y| to.contains(y))
        {
            return Ok(Some((x, y)));
        }
    }
    Ok(None)
}

/// The node in `candidates` nearest to `target`; the first one on ties.
fn nearest(arena: &MeshArena, candidates: &[NodeKey], target: &Vec3) -> Result<Option<NodeKey>> {
    let mut best: Option<(f64, NodeKey)> = None;
    for &node in candidates {
        let d = distance(&arena.node_coords(node)?, target);
        if best.map_or(true, |(min, _)| d < min) {
            best = Some((d, node));
        }
    }
    Ok(best.map(|(_, node)| node))
}

/// Registers the group outline, returning `false` for a duplicate.
fn keep_unique(
    arena: &MeshArena,
    outlines: &mut ToleranceSet<FaceOutline>,
    group: GroupKey,
    report: &mut ChaikinReport,
) -> Result<bool> {
    let outline = FaceOutline::new(arena.group_coords(group)?);
    if outlines.add(outline) {
        Ok(true)
    } else {
        tracing::debug!(?group, "dropping duplicate group");
        report.duplicate_groups += 1;
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_shapes::{cube, tetrahedron};
    use approx::assert_relative_eq;

    #[test]
    fn ratios_for_default_coefficient() {
        let options = ChaikinOptions::default();
        assert_relative_eq!(options.base_ratio(), 0.75);
        assert_relative_eq!(options.special_ratio(), 2.0 / 3.0);
    }

    #[test]
    fn coefficient_below_three_is_rejected() {
        assert!(matches!(ChaikinOptions::new(2), Err(Error::InvalidCoefficient(2))));
        let (v, f) = tetrahedron();
        let poly = Polyhedron::from_vertex_lists(&v, &f).unwrap();
        assert!(matches!(poly.chaikin3d(1), Err(Error::InvalidCoefficient(1))));
    }

    #[test]
    fn tetrahedron_pass_counts() {
        let (v, f) = tetrahedron();
        let poly = Polyhedron::from_vertex_lists(&v, &f).unwrap();
        let (cut, report) = poly.chaikin3d_with(&ChaikinOptions::default()).unwrap();

        assert_eq!(cut.node_count(), 12);
        assert_eq!(cut.group_count(), 8);
        assert_eq!(report.corner_groups, 4);
        assert_eq!(report.resurfaced_groups, 4);
        assert_eq!(report.skipped_faces, 0);
        // 6 repointed edges + 4 corner triangles * 3.
        assert_eq!(cut.edge_count(EdgeFilter::Main), 18);
        assert!(cut.is_closed());
    }

    #[test]
    fn old_mesh_is_dropped_from_the_arena() {
        let (v, f) = cube();
        let poly = Polyhedron::from_vertex_lists(&v, &f).unwrap();
        let cut = poly.chaikin3d(4).unwrap();

        assert_eq!(cut.arena().node_count(), cut.node_count());
        assert_eq!(cut.arena().group_count(), cut.group_count());
        let live: FxHashSet<NodeKey> = cut.nodes().iter().copied().collect();
        for (_, edge) in cut.arena().edges() {
            assert!(live.contains(&edge.a) && live.contains(&edge.b));
        }
    }

    #[test]
    fn corner_groups_are_cycles_of_main_edges() {
        let (v, f) = cube();
        let cut = Polyhedron::from_vertex_lists(&v, &f)
            .unwrap()
            .chaikin3d(3)
            .unwrap();
        for &g in cut.groups() {
            let seq = cut.arena().group(g).unwrap().sequence().to_vec();
            for i in 0..seq.len() {
                assert!(cut
                    .arena()
                    .are_connected(seq[i], seq[(i + 1) % seq.len()], EdgeFilter::Main));
            }
            assert!(cut.arena().group_is_planar(g).unwrap());
        }
    }

    #[test]
    fn unresolved_face_can_be_skipped() {
        // A lone triangle with a stray vertex face: the stray corner has no
        // main edges, so the face through it cannot be rebuilt.
        let vertices = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [5.0, 5.0, 5.0],
        ];
        let faces = [[0usize, 1, 2]];
        let mut poly = Polyhedron::from_vertex_lists(&vertices, &faces).unwrap();
        let face = vec![poly.nodes()[0], poly.nodes()[1], poly.nodes()[3]];
        let group = poly.arena.add_group(face.iter().copied()).unwrap();
        poly.arena.set_group_order(group, face).unwrap();
        poly.groups.push(group);

        let strict = poly.clone().chaikin3d(4);
        assert!(matches!(strict, Err(Error::UnresolvedResurfacing { .. })));

        let options = ChaikinOptions {
            skip_unresolved_faces: true,
            ..ChaikinOptions::default()
        };
        let (cut, report) = poly.chaikin3d_with(&options).unwrap();
        assert_eq!(report.skipped_faces, 1);
        assert_eq!(report.resurfaced_groups, 1);
        assert_eq!(cut.node_count(), 6);
    }
}
