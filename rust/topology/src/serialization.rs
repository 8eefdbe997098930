// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON serialization for polyhedra.
//!
//! Provides a full round trip of nodes, typed edges and groups (with their
//! cyclic order), plus a flat [`RenderData`] export for renderers that only
//! need coordinates.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::arena::MeshArena;
use crate::error::{Error, Result};
use crate::keys::*;
use crate::polyhedron::{check_epsilon, MeshStats, Polyhedron};

/// Serializable representation of a polyhedron.
#[derive(Debug, Serialize, Deserialize)]
pub struct MeshSnapshot {
    pub epsilon: f64,
    pub nodes: Vec<NodeSnapshot>,
    pub edges: Vec<EdgeSnapshot>,
    pub groups: Vec<GroupSnapshot>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: usize,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub id: usize,
    pub a: usize,
    pub b: usize,
    pub kind: EdgeKind,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GroupSnapshot {
    pub id: usize,
    /// Node ids in cyclic order when `ordered`, insertion order otherwise.
    pub nodes: Vec<usize>,
    pub ordered: bool,
    #[serde(default)]
    pub interconnected: bool,
}

/// Coordinates a renderer needs to draw a mesh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderData {
    pub triangles: Vec<[[f64; 3]; 3]>,
    pub main_edges: Vec<[[f64; 3]; 2]>,
    pub graphical_edges: Vec<[[f64; 3]; 2]>,
    pub stats: MeshStats,
}

impl Polyhedron {
    /// Serializes the polyhedron to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        let snapshot = self.to_snapshot()?;
        serde_json::to_string_pretty(&snapshot).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Creates a serializable snapshot.
    ///
    /// Slot map keys are mapped to sequential ids for portability.
    pub fn to_snapshot(&self) -> Result<MeshSnapshot> {
        let mut node_ids = FxHashMap::default();
        let mut nodes = Vec::with_capacity(self.nodes.len());
        for (i, &key) in self.nodes.iter().enumerate() {
            let c = self.arena.node_coords(key)?;
            node_ids.insert(key, i);
            nodes.push(NodeSnapshot {
                id: i,
                x: c.x,
                y: c.y,
                z: c.z,
            });
        }
        let id_of = |key: &NodeKey| node_ids.get(key).copied().ok_or(Error::NodeNotFound(*key));

        let edges = self
            .edges_of_type(EdgeFilter::Any)?
            .iter()
            .enumerate()
            .map(|(i, segment)| {
                let edge = self
                    .arena
                    .edge(segment.key)
                    .ok_or(Error::EdgeNotFound(segment.key))?;
                Ok(EdgeSnapshot {
                    id: i,
                    a: id_of(&edge.a)?,
                    b: id_of(&edge.b)?,
                    kind: edge.kind,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let groups = self
            .groups
            .iter()
            .enumerate()
            .map(|(i, &key)| {
                let data = self.arena.group_data(key)?;
                Ok(GroupSnapshot {
                    id: i,
                    nodes: data.sequence().iter().map(&id_of).collect::<Result<_>>()?,
                    ordered: data.is_ordered(),
                    interconnected: data.interconnected,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(MeshSnapshot {
            epsilon: self.epsilon(),
            nodes,
            edges,
            groups,
        })
    }

    /// Deserializes a polyhedron from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: MeshSnapshot =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        Self::from_snapshot(&snapshot)
    }

    /// Reconstructs a polyhedron from a snapshot.
    pub fn from_snapshot(snap: &MeshSnapshot) -> Result<Self> {
        check_epsilon(snap.epsilon)?;
        let mut arena = MeshArena::with_epsilon(snap.epsilon);

        let nodes: Vec<NodeKey> = snap
            .nodes
            .iter()
            .map(|n| arena.add_node([n.x, n.y, n.z].into()))
            .collect();
        let key_of = |id: usize| {
            nodes
                .get(id)
                .copied()
                .ok_or_else(|| Error::Serialization(format!("unknown node id {id}")))
        };

        for es in &snap.edges {
            arena.connect(key_of(es.a)?, key_of(es.b)?, es.kind)?;
        }

        let mut groups = Vec::with_capacity(snap.groups.len());
        for gs in &snap.groups {
            let members = gs.nodes.iter().map(|&id| key_of(id)).collect::<Result<Vec<_>>>()?;
            let group = arena.add_group(members.iter().copied())?;
            if arena.group_data(group)?.size() != members.len() {
                return Err(Error::Serialization(format!(
                    "group {} lists a node twice",
                    gs.id
                )));
            }
            if gs.ordered {
                arena.set_group_order(group, members)?;
            }
            arena.group_data_mut(group)?.interconnected = gs.interconnected;
            groups.push(group);
        }

        Polyhedron::from_parts(arena, nodes, groups)
    }

    /// Flattens the mesh into coordinates for a renderer.
    pub fn render_data(&self) -> Result<RenderData> {
        let triangles = self
            .triangles(EdgeFilter::Any)?
            .into_iter()
            .map(|t| t.corners.map(|c| [c.x, c.y, c.z]))
            .collect();

        let mut main_edges = Vec::new();
        let mut graphical_edges = Vec::new();
        for segment in self.edges_of_type(EdgeFilter::Any)? {
            let line = [
                [segment.a.x, segment.a.y, segment.a.z],
                [segment.b.x, segment.b.y, segment.b.z],
            ];
            match segment.kind {
                EdgeKind::Main => main_edges.push(line),
                EdgeKind::Graphical => graphical_edges.push(line),
            }
        }

        Ok(RenderData {
            triangles,
            main_edges,
            graphical_edges,
            stats: self.stats(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_shapes::cube;

    #[test]
    fn roundtrip_cube() {
        let (v, f) = cube();
        let poly = Polyhedron::from_vertex_lists(&v, &f).unwrap();

        let json = poly.to_json().unwrap();
        let restored = Polyhedron::from_json(&json).unwrap();

        assert_eq!(restored.stats(), poly.stats());
        assert!(restored.is_closed());
        for &g in restored.groups() {
            let data = restored.arena().group(g).unwrap();
            assert!(data.is_ordered());
            assert!(data.interconnected);
        }
    }

    #[test]
    fn edge_kinds_serialize_lowercase() {
        let (v, f) = cube();
        let poly = Polyhedron::from_vertex_lists(&v, &f).unwrap();
        let json = poly.to_json().unwrap();
        assert!(json.contains("\"main\""));
        assert!(json.contains("\"graphical\""));
    }

    #[test]
    fn unknown_edge_kind_is_rejected() {
        let json = r#"{
            "epsilon": 1e-5,
            "nodes": [{"id": 0, "x": 0, "y": 0, "z": 0}, {"id": 1, "x": 1, "y": 0, "z": 0}],
            "edges": [{"id": 0, "a": 0, "b": 1, "kind": "dashed"}],
            "groups": []
        }"#;
        assert!(matches!(
            Polyhedron::from_json(json),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn dangling_node_id_is_rejected() {
        let json = r#"{
            "epsilon": 1e-5,
            "nodes": [{"id": 0, "x": 0, "y": 0, "z": 0}],
            "edges": [{"id": 0, "a": 0, "b": 4, "kind": "main"}],
            "groups": []
        }"#;
        assert!(matches!(
            Polyhedron::from_json(json),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn zero_epsilon_is_rejected() {
        let json = r#"{"epsilon": 0.0, "nodes": [], "edges": [], "groups": []}"#;
        assert!(matches!(
            Polyhedron::from_json(json),
            Err(Error::InvalidEpsilon(_))
        ));
    }

    #[test]
    fn render_data_of_cube() {
        let (v, f) = cube();
        let poly = Polyhedron::from_vertex_lists(&v, &f).unwrap();
        let data = poly.render_data().unwrap();

        assert_eq!(data.triangles.len(), 12);
        assert_eq!(data.main_edges.len(), 12);
        assert_eq!(data.graphical_edges.len(), 6);
        assert_eq!(data.stats.groups, 6);
    }
}
