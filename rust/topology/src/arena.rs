// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena-based storage for mesh nodes, edges and groups.
//!
//! The [`MeshArena`] is the single owner of all mesh data. Nodes and edges
//! reference each other cyclically (a node lists its incident edges, an edge
//! names its two endpoint nodes), so both sides hold stable slot map keys
//! instead of pointers. Groups hold node keys only.

use slotmap::SlotMap;

use crate::error::{Error, Result};
use crate::geometry::Vec3;
use crate::group::Triangle;
use crate::keys::*;
use crate::tolerance::DEFAULT_EPSILON;

/// Data stored for a node: a coordinate and its incident edges.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub coords: Vec3,
    /// Incident edges, in no particular order.
    pub edges: Vec<EdgeKey>,
}

/// Data stored for an edge: an unordered endpoint pair and its kind.
#[derive(Debug, Clone)]
pub struct EdgeData {
    pub a: NodeKey,
    pub b: NodeKey,
    pub kind: EdgeKind,
}

impl EdgeData {
    /// Returns the endpoint opposite to `node`, or `None` if the edge does
    /// not touch `node`.
    pub fn other(&self, node: NodeKey) -> Option<NodeKey> {
        if self.a == node {
            Some(self.b)
        } else if self.b == node {
            Some(self.a)
        } else {
            None
        }
    }

    /// Returns `true` if the edge joins `x` and `y`, in either direction.
    pub fn joins(&self, x: NodeKey, y: NodeKey) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }
}

/// Data stored for a group: the nodes bounding one planar face.
#[derive(Debug, Clone, Default)]
pub struct GroupData {
    /// Member nodes in insertion order, without duplicates.
    pub nodes: Vec<NodeKey>,
    /// Cyclic order following main edges, once ordered.
    pub ogroup: Option<Vec<NodeKey>>,
    /// Set once graphical triangulation edges have been added.
    pub interconnected: bool,
    pub(crate) triangles: Option<Vec<Triangle>>,
}

impl GroupData {
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_ordered(&self) -> bool {
        self.ogroup.is_some()
    }

    /// The cyclic order if ordered, otherwise the insertion order.
    pub fn sequence(&self) -> &[NodeKey] {
        self.ogroup.as_deref().unwrap_or(&self.nodes)
    }
}

/// The central arena owning all nodes, edges and groups of a mesh.
///
/// # Example
///
/// ```
/// use chaikin3d_topology::{EdgeKind, MeshArena, Vec3};
///
/// let mut arena = MeshArena::new();
/// let a = arena.add_node(Vec3::new(0.0, 0.0, 0.0));
/// let b = arena.add_node(Vec3::new(1.0, 0.0, 0.0));
/// arena.connect(a, b, EdgeKind::Main).unwrap();
///
/// assert_eq!(arena.node_count(), 2);
/// assert_eq!(arena.edge_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MeshArena {
    pub(crate) nodes: SlotMap<NodeKey, NodeData>,
    pub(crate) edges: SlotMap<EdgeKey, EdgeData>,
    pub(crate) groups: SlotMap<GroupKey, GroupData>,
    epsilon: f64,
}

impl MeshArena {
    /// Creates an empty arena using [`DEFAULT_EPSILON`].
    pub fn new() -> Self {
        Self::with_epsilon(DEFAULT_EPSILON)
    }

    /// Creates an empty arena with the given coordinate tolerance.
    pub fn with_epsilon(epsilon: f64) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            edges: SlotMap::with_key(),
            groups: SlotMap::with_key(),
            epsilon,
        }
    }

    /// Coordinate tolerance used by all geometric comparisons in this arena.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    // --- Node operations ---

    /// Adds an unconnected node at the given coordinates.
    pub fn add_node(&mut self, coords: Vec3) -> NodeKey {
        self.nodes.insert(NodeData {
            coords,
            edges: Vec::new(),
        })
    }

    /// Returns the node data for the given key, or `None` if not found.
    pub fn node(&self, key: NodeKey) -> Option<&NodeData> {
        self.nodes.get(key)
    }

    /// Returns the coordinates of a node.
    pub fn node_coords(&self, key: NodeKey) -> Result<Vec3> {
        self.nodes
            .get(key)
            .map(|n| n.coords)
            .ok_or(Error::NodeNotFound(key))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains_node(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    // --- Edge operations ---

    /// Returns the edge data for the given key, or `None` if not found.
    pub fn edge(&self, key: EdgeKey) -> Option<&EdgeData> {
        self.edges.get(key)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Iterates over all edges of the arena.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeKey, &EdgeData)> {
        self.edges.iter()
    }

    // --- Group operations ---

    /// Returns the group data for the given key, or `None` if not found.
    pub fn group(&self, key: GroupKey) -> Option<&GroupData> {
        self.groups.get(key)
    }

    pub(crate) fn group_data(&self, key: GroupKey) -> Result<&GroupData> {
        self.groups.get(key).ok_or(Error::GroupNotFound(key))
    }

    pub(crate) fn group_data_mut(&mut self, key: GroupKey) -> Result<&mut GroupData> {
        self.groups.get_mut(key).ok_or(Error::GroupNotFound(key))
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Removes a group. Its nodes and edges are left untouched.
    pub(crate) fn remove_group(&mut self, key: GroupKey) -> Option<GroupData> {
        self.groups.remove(key)
    }
}

impl Default for MeshArena {
    fn default() -> Self {
        Self::new()
    }
}
