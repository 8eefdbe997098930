// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The polyhedron: a mesh of nodes and planar groups.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::arena::MeshArena;
use crate::error::{Error, Result};
use crate::geometry::Vec3;
use crate::group::Triangle;
use crate::keys::*;
use crate::tolerance::{ToleranceMap, ToleranceSet, DEFAULT_EPSILON};

/// Options controlling mesh construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshOptions {
    /// Coordinate tolerance for every geometric comparison on the mesh.
    pub epsilon: f64,
    /// Merge input vertices that coincide within `epsilon` into one node.
    pub weld_vertices: bool,
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            weld_vertices: false,
        }
    }
}

impl MeshOptions {
    /// Rejects a tolerance that is not positive and finite.
    pub fn validate(&self) -> Result<()> {
        check_epsilon(self.epsilon)
    }
}

pub(crate) fn check_epsilon(epsilon: f64) -> Result<()> {
    if epsilon.is_finite() && epsilon > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidEpsilon(epsilon))
    }
}

/// Node, edge and group counts of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MeshStats {
    pub nodes: usize,
    pub main_edges: usize,
    pub graphical_edges: usize,
    pub groups: usize,
}

impl std::fmt::Display for MeshStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} nodes, {} main edges, {} graphical edges, {} groups",
            self.nodes, self.main_edges, self.graphical_edges, self.groups
        )
    }
}

/// An edge with its endpoint coordinates, as handed to renderers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeSegment {
    pub key: EdgeKey,
    pub kind: EdgeKind,
    pub a: Vec3,
    pub b: Vec3,
}

/// A polyhedral mesh: nodes, the edges between them, and planar groups.
///
/// # Example
///
/// ```
/// use chaikin3d_topology::Polyhedron;
///
/// let vertices = [
///     [0.0, 0.0, 0.0],
///     [1.0, 0.0, 0.0],
///     [0.0, 1.0, 0.0],
///     [0.0, 0.0, 1.0],
/// ];
/// let faces = [[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]];
///
/// let tetra = Polyhedron::from_vertex_lists(&vertices, &faces).unwrap();
/// assert_eq!(tetra.stats().main_edges, 6);
///
/// let cut = tetra.chaikin3d(4).unwrap();
/// assert_eq!(cut.node_count(), 12);
/// assert_eq!(cut.group_count(), 8);
/// ```
#[derive(Debug, Clone)]
pub struct Polyhedron {
    pub(crate) arena: MeshArena,
    pub(crate) nodes: Vec<NodeKey>,
    pub(crate) groups: Vec<GroupKey>,
}

impl Polyhedron {
    /// Assembles a polyhedron from an arena and the keys that make it up.
    pub fn from_parts(arena: MeshArena, nodes: Vec<NodeKey>, groups: Vec<GroupKey>) -> Result<Self> {
        check_epsilon(arena.epsilon())?;
        if let Some(&missing) = nodes.iter().find(|&&n| !arena.contains_node(n)) {
            return Err(Error::NodeNotFound(missing));
        }
        if let Some(&missing) = groups.iter().find(|&&g| arena.group(g).is_none()) {
            return Err(Error::GroupNotFound(missing));
        }
        Ok(Self {
            arena,
            nodes,
            groups,
        })
    }

    /// Builds a polyhedron from vertex coordinates and 0-based face index
    /// lists, with default [`MeshOptions`].
    pub fn from_vertex_lists<F: AsRef<[usize]>>(vertices: &[[f64; 3]], faces: &[F]) -> Result<Self> {
        Self::from_vertex_lists_with(vertices, faces, MeshOptions::default())
    }

    /// Builds a polyhedron from vertex coordinates and 0-based face index
    /// lists.
    ///
    /// Each face is stamped with main edges along its given cycle, ordered,
    /// and (for more than 3 vertices) triangulated with graphical edges once
    /// every face boundary exists.
    pub fn from_vertex_lists_with<F: AsRef<[usize]>>(
        vertices: &[[f64; 3]],
        faces: &[F],
        options: MeshOptions,
    ) -> Result<Self> {
        let (mut arena, nodes, vertex_keys) = Self::build_nodes(vertices, options)?;

        let mut groups = Vec::with_capacity(faces.len());
        let mut to_connect = Vec::new();
        for (face_index, face) in faces.iter().enumerate() {
            let group = Self::face_group(&mut arena, &vertex_keys, face_index, face.as_ref())?;
            arena.cycle_connect(group, EdgeKind::Main)?;
            arena.order_group(group, false)?;
            if arena.group_data(group)?.size() > 3 {
                to_connect.push(group);
            }
            groups.push(group);
        }

        for &group in &to_connect {
            arena.inter_connect(group, EdgeKind::Graphical, true)?;
        }

        tracing::debug!(
            vertices = vertices.len(),
            nodes = nodes.len(),
            groups = groups.len(),
            "built polyhedron from vertex lists"
        );
        Ok(Self {
            arena,
            nodes,
            groups,
        })
    }

    /// Builds a polyhedron from explicit main edges and unordered faces.
    ///
    /// Unlike [`Polyhedron::from_vertex_lists`], faces are plain vertex sets
    /// (for example the output of a planar group search): each one is
    /// ordered by following the given edges, so a face whose edges do not
    /// form a single cycle fails with [`Error::BrokenGroup`].
    pub fn from_edge_lists<F: AsRef<[usize]>>(
        vertices: &[[f64; 3]],
        edges: &[[usize; 2]],
        faces: &[F],
        options: MeshOptions,
    ) -> Result<Self> {
        let (mut arena, nodes, vertex_keys) = Self::build_nodes(vertices, options)?;

        for (edge_index, &[i, j]) in edges.iter().enumerate() {
            let lookup = |index: usize| {
                vertex_keys
                    .get(index)
                    .copied()
                    .ok_or(Error::EdgeIndexOutOfRange {
                        edge: edge_index,
                        index,
                        vertex_count: vertex_keys.len(),
                    })
            };
            arena.connect(lookup(i)?, lookup(j)?, EdgeKind::Main)?;
        }

        let mut groups = Vec::with_capacity(faces.len());
        for (face_index, face) in faces.iter().enumerate() {
            let group = Self::face_group(&mut arena, &vertex_keys, face_index, face.as_ref())?;
            arena.order_group(group, false)?;
            groups.push(group);
        }
        for &group in &groups {
            if arena.group_data(group)?.size() > 3 {
                arena.inter_connect(group, EdgeKind::Graphical, false)?;
            }
        }

        Ok(Self {
            arena,
            nodes,
            groups,
        })
    }

    /// Creates the arena and one node per vertex (or per welded vertex).
    ///
    /// Returns the arena, the unique node keys, and the vertex -> node map.
    fn build_nodes(
        vertices: &[[f64; 3]],
        options: MeshOptions,
    ) -> Result<(MeshArena, Vec<NodeKey>, Vec<NodeKey>)> {
        options.validate()?;
        let mut arena = MeshArena::with_epsilon(options.epsilon);
        let mut nodes = Vec::with_capacity(vertices.len());

        let vertex_keys: Vec<NodeKey> = if options.weld_vertices {
            let mut welded: ToleranceMap<Vec3, NodeKey> = ToleranceMap::with_epsilon(options.epsilon);
            vertices
                .iter()
                .map(|&v| {
                    let coords = Vec3::from(v);
                    *welded.get_or_insert_with(coords, || {
                        let key = arena.add_node(coords);
                        nodes.push(key);
                        key
                    })
                })
                .collect()
        } else {
            vertices
                .iter()
                .map(|&v| {
                    let key = arena.add_node(Vec3::from(v));
                    nodes.push(key);
                    key
                })
                .collect()
        };

        if nodes.len() != vertices.len() {
            tracing::debug!(
                vertices = vertices.len(),
                nodes = nodes.len(),
                "welded coincident vertices"
            );
        }
        Ok((arena, nodes, vertex_keys))
    }

    fn vertex_key(vertex_keys: &[NodeKey], face: usize, index: usize) -> Result<NodeKey> {
        vertex_keys
            .get(index)
            .copied()
            .ok_or(Error::VertexIndexOutOfRange {
                face,
                index,
                vertex_count: vertex_keys.len(),
            })
    }

    fn face_group(
        arena: &mut MeshArena,
        vertex_keys: &[NodeKey],
        face_index: usize,
        face: &[usize],
    ) -> Result<GroupKey> {
        if face.len() < 3 {
            return Err(Error::MalformedFace {
                face: face_index,
                count: face.len(),
            });
        }
        let keys = face
            .iter()
            .map(|&i| Self::vertex_key(vertex_keys, face_index, i))
            .collect::<Result<Vec<_>>>()?;

        let group = arena.add_group(keys)?;
        let size = arena.group_data(group)?.size();
        if size < 3 {
            // Repeated or welded vertices collapsed the face.
            return Err(Error::MalformedFace {
                face: face_index,
                count: size,
            });
        }
        Ok(group)
    }

    // --- Accessors ---

    pub fn arena(&self) -> &MeshArena {
        &self.arena
    }

    pub fn nodes(&self) -> &[NodeKey] {
        &self.nodes
    }

    pub fn groups(&self) -> &[GroupKey] {
        &self.groups
    }

    pub fn epsilon(&self) -> f64 {
        self.arena.epsilon()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of distinct edges passing `filter` that touch the mesh nodes.
    pub fn edge_count(&self, filter: EdgeFilter) -> usize {
        self.edge_keys(filter).len()
    }

    pub fn stats(&self) -> MeshStats {
        MeshStats {
            nodes: self.node_count(),
            main_edges: self.edge_count(EdgeFilter::Main),
            graphical_edges: self.edge_count(EdgeFilter::Graphical),
            groups: self.group_count(),
        }
    }

    /// Deduplicated edge keys passing `filter`, in node order.
    fn edge_keys(&self, filter: EdgeFilter) -> Vec<EdgeKey> {
        let mut seen = FxHashSet::default();
        let mut keys = Vec::new();
        for &node in &self.nodes {
            let Some(data) = self.arena.node(node) else {
                continue;
            };
            for &ek in &data.edges {
                let passes = self
                    .arena
                    .edge(ek)
                    .is_some_and(|e| filter.accepts(e.kind));
                if passes && seen.insert(ek) {
                    keys.push(ek);
                }
            }
        }
        keys
    }

    /// Deduplicated edges passing `filter`, with endpoint coordinates.
    pub fn edges_of_type(&self, filter: EdgeFilter) -> Result<Vec<EdgeSegment>> {
        self.edge_keys(filter)
            .into_iter()
            .map(|key| {
                let edge = self.arena.edge(key).ok_or(Error::EdgeNotFound(key))?;
                Ok(EdgeSegment {
                    key,
                    kind: edge.kind,
                    a: self.arena.node_coords(edge.a)?,
                    b: self.arena.node_coords(edge.b)?,
                })
            })
            .collect()
    }

    /// All unique triangles whose three sides pass `filter`.
    ///
    /// Triangles are looked up inside each group, so only face triangles are
    /// reported, deduplicated under the mesh tolerance.
    pub fn triangles(&self, filter: EdgeFilter) -> Result<Vec<Triangle>> {
        let mut set = ToleranceSet::with_epsilon(self.epsilon());
        for &group in &self.groups {
            for triangle in self.arena.enumerate_triangles(group, filter)? {
                set.add(triangle);
            }
        }
        Ok(set.into_vec())
    }

    /// Returns `true` if every main edge is shared by exactly two faces.
    ///
    /// Two-node groups, left where a pass cuts a corner of only two edges,
    /// are not faces and are ignored.
    pub fn is_closed(&self) -> bool {
        let mut uses: FxHashMap<EdgeKey, usize> = FxHashMap::default();
        for &group in &self.groups {
            let Some(data) = self.arena.group(group) else {
                return false;
            };
            let seq = data.sequence();
            // Two-node groups are cut edges, not surfaces.
            if seq.len() < 3 {
                continue;
            }
            for (i, &node) in seq.iter().enumerate() {
                let next = seq[(i + 1) % seq.len()];
                match self.arena.find_edge(node, next, EdgeFilter::Main) {
                    Some(ek) => *uses.entry(ek).or_default() += 1,
                    None => return false,
                }
            }
        }
        let main = self.edge_keys(EdgeFilter::Main);
        main.len() == uses.len() && main.iter().all(|ek| uses.get(ek) == Some(&2))
    }

    /// Converts back to vertex coordinates and 0-based face index lists.
    ///
    /// Faces follow each group's cyclic order. Two-node groups are left out.
    pub fn to_vertex_lists(&self) -> Result<(Vec<[f64; 3]>, Vec<Vec<usize>>)> {
        let mut index_of = FxHashMap::default();
        let mut vertices = Vec::with_capacity(self.nodes.len());
        for (i, &node) in self.nodes.iter().enumerate() {
            let c = self.arena.node_coords(node)?;
            vertices.push([c.x, c.y, c.z]);
            index_of.insert(node, i);
        }

        let faces = self
            .groups
            .iter()
            .filter(|&&group| self.arena.group(group).is_some_and(|g| g.size() >= 3))
            .map(|&group| {
                self.arena
                    .group_data(group)?
                    .sequence()
                    .iter()
                    .map(|n| index_of.get(n).copied().ok_or(Error::NodeNotFound(*n)))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        Ok((vertices, faces))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_shapes::{cube, tetrahedron};

    #[test]
    fn cube_has_twelve_main_edges_and_six_quads() {
        let (v, f) = cube();
        let poly = Polyhedron::from_vertex_lists(&v, &f).unwrap();

        assert_eq!(poly.node_count(), 8);
        assert_eq!(poly.edge_count(EdgeFilter::Main), 12);
        assert_eq!(poly.edge_count(EdgeFilter::Graphical), 6);
        assert_eq!(poly.group_count(), 6);

        for &g in poly.groups() {
            let data = poly.arena().group(g).unwrap();
            assert_eq!(data.size(), 4);
            let seq = data.sequence();
            for i in 0..4 {
                assert!(poly
                    .arena()
                    .are_connected(seq[i], seq[(i + 1) % 4], EdgeFilter::Main));
            }
        }
        assert!(poly.is_closed());
    }

    #[test]
    fn cube_triangles_by_type() {
        let (v, f) = cube();
        let poly = Polyhedron::from_vertex_lists(&v, &f).unwrap();
        assert_eq!(poly.triangles(EdgeFilter::Any).unwrap().len(), 12);
        assert!(poly.triangles(EdgeFilter::Main).unwrap().is_empty());
        assert!(poly.triangles(EdgeFilter::Graphical).unwrap().is_empty());
    }

    #[test]
    fn tetrahedron_needs_no_graphical_edges() {
        let (v, f) = tetrahedron();
        let poly = Polyhedron::from_vertex_lists(&v, &f).unwrap();
        let stats = poly.stats();
        assert_eq!(stats.main_edges, 6);
        assert_eq!(stats.graphical_edges, 0);
        assert_eq!(poly.triangles(EdgeFilter::Main).unwrap().len(), 4);
    }

    #[test]
    fn short_face_is_malformed() {
        let (v, _) = tetrahedron();
        let faces = vec![vec![0usize, 1, 2], vec![0, 1]];
        match Polyhedron::from_vertex_lists(&v, &faces) {
            Err(Error::MalformedFace { face, count }) => {
                assert_eq!(face, 1);
                assert_eq!(count, 2);
            }
            other => panic!("expected MalformedFace, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let (v, _) = tetrahedron();
        let faces = [[0usize, 1, 7]];
        assert!(matches!(
            Polyhedron::from_vertex_lists(&v, &faces),
            Err(Error::VertexIndexOutOfRange { index: 7, .. })
        ));
    }

    #[test]
    fn welding_merges_coincident_vertices() {
        let vertices = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [1.0, 0.000_001, 0.0],
            [1.0, 1.0, 0.0],
        ];
        let faces = [[0usize, 1, 2], [3, 4, 2]];
        let options = MeshOptions {
            weld_vertices: true,
            ..MeshOptions::default()
        };
        let welded = Polyhedron::from_vertex_lists_with(&vertices, &faces, options).unwrap();
        assert_eq!(welded.node_count(), 4);
        // The shared diagonal 1-2 exists once.
        assert_eq!(welded.edge_count(EdgeFilter::Main), 5);

        let plain = Polyhedron::from_vertex_lists(&vertices, &faces).unwrap();
        assert_eq!(plain.node_count(), 5);
        assert_eq!(plain.edge_count(EdgeFilter::Main), 6);
    }

    #[test]
    fn edge_lists_with_disjoint_edges_break_the_face() {
        let vertices = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ];
        let edges = [[0, 1], [2, 3]];
        let faces = [[0usize, 1, 2, 3]];
        let result = Polyhedron::from_edge_lists(&vertices, &edges, &faces, MeshOptions::default());
        match result {
            Err(Error::BrokenGroup {
                ordered, unreached, ..
            }) => {
                assert_eq!(ordered.len(), 2);
                assert_eq!(unreached.len(), 2);
            }
            other => panic!("expected BrokenGroup, got {other:?}"),
        }
    }

    #[test]
    fn edge_lists_order_unordered_faces() {
        let vertices = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ];
        let edges = [[0, 1], [1, 2], [2, 3], [3, 0]];
        let faces = [[2usize, 0, 3, 1]];
        let poly =
            Polyhedron::from_edge_lists(&vertices, &edges, &faces, MeshOptions::default()).unwrap();
        let (_, out_faces) = poly.to_vertex_lists().unwrap();
        let face = &out_faces[0];
        for i in 0..4 {
            let (a, b) = (face[i], face[(i + 1) % 4]);
            assert!(edges.iter().any(|e| (e[0] == a && e[1] == b) || (e[0] == b && e[1] == a)));
        }
        assert_eq!(poly.edge_count(EdgeFilter::Graphical), 1);
    }

    #[test]
    fn vertex_lists_round_trip_counts() {
        let (v, f) = cube();
        let poly = Polyhedron::from_vertex_lists(&v, &f).unwrap();
        let (vertices, faces) = poly.to_vertex_lists().unwrap();
        assert_eq!(vertices, v.to_vec());
        assert_eq!(faces.len(), 6);
        assert!(faces.iter().all(|f| f.len() == 4));
    }

    #[test]
    fn edges_of_type_are_unique() {
        let (v, f) = cube();
        let poly = Polyhedron::from_vertex_lists(&v, &f).unwrap();
        let main = poly.edges_of_type(EdgeFilter::Main).unwrap();
        assert_eq!(main.len(), 12);
        assert!(main.iter().all(|s| s.kind == EdgeKind::Main));
        for s in &main {
            assert!((s.a - s.b).norm() > 0.99 && (s.a - s.b).norm() < 1.01);
        }
    }

    #[test]
    fn non_positive_epsilon_is_rejected() {
        let (v, f) = cube();
        for epsilon in [0.0, -1e-5, f64::NAN, f64::INFINITY] {
            let options = MeshOptions {
                epsilon,
                weld_vertices: true,
            };
            assert!(matches!(
                Polyhedron::from_vertex_lists_with(&v, &f, options),
                Err(Error::InvalidEpsilon(_))
            ));
            assert!(matches!(
                Polyhedron::from_edge_lists(&v, &[[0, 1]], &[[0usize, 1, 2]], options),
                Err(Error::InvalidEpsilon(_))
            ));
        }

        let arena = MeshArena::with_epsilon(0.0);
        assert!(matches!(
            Polyhedron::from_parts(arena, Vec::new(), Vec::new()),
            Err(Error::InvalidEpsilon(_))
        ));
    }
}
