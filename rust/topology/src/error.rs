// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for mesh construction and subdivision.

use crate::keys::{EdgeKey, GroupKey, NodeKey};

/// Result type alias for mesh operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or transforming a mesh.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A face references fewer than 3 vertices.
    #[error("face {face} references {count} vertices, at least 3 are required")]
    MalformedFace { face: usize, count: usize },

    /// A face references a vertex index that does not exist.
    #[error("face {face} references vertex {index}, but only {vertex_count} vertices exist")]
    VertexIndexOutOfRange {
        face: usize,
        index: usize,
        vertex_count: usize,
    },

    /// An explicit edge references a vertex index that does not exist.
    #[error("edge {edge} references vertex {index}, but only {vertex_count} vertices exist")]
    EdgeIndexOutOfRange {
        edge: usize,
        index: usize,
        vertex_count: usize,
    },

    /// The main edges of a group do not form a single cycle over its nodes.
    #[error(
        "broken group {group:?}: main edges stop after {} of {} nodes ({} unreached)",
        .ordered.len(),
        .ordered.len() + .unreached.len(),
        .unreached.len()
    )]
    BrokenGroup {
        group: GroupKey,
        /// The partial cycle built before the walk got stuck.
        ordered: Vec<NodeKey>,
        /// Nodes no main edge led to.
        unreached: Vec<NodeKey>,
    },

    /// An edge type name outside of `main` / `graphical`.
    #[error("unknown edge type: {0:?}")]
    UnknownEdgeType(String),

    /// The nearest-node search could not rebuild a face boundary pair.
    #[error("cannot resurface group {group:?}: no truncated edge joins the corners of {a:?} and {b:?}")]
    UnresolvedResurfacing {
        group: GroupKey,
        a: NodeKey,
        b: NodeKey,
    },

    /// Triangulation was requested on a group that is not ready for it.
    #[error("triangulation precondition failed for group {group:?}: {reason}")]
    TriangulationPrecondition {
        group: GroupKey,
        reason: &'static str,
    },

    /// `calc_triangles` was called twice on the same group.
    #[error("triangles of group {0:?} were already calculated")]
    TrianglesAlreadyCalculated(GroupKey),

    /// A node ends a single main edge, so its corner has nothing to cut.
    #[error("node {0:?} ends a single main edge, its corner cannot be truncated")]
    DanglingCorner(NodeKey),

    /// The coordinate tolerance must be positive and finite.
    #[error("tolerance must be positive and finite, got {0}")]
    InvalidEpsilon(f64),

    /// The Chaikin coefficient must be at least 3.
    #[error("chaikin coefficient must be >= 3, got {0}")]
    InvalidCoefficient(u32),

    /// Three points do not span a plane.
    #[error("points are collinear, no plane passes through them uniquely")]
    DegeneratePlane,

    /// An edge cannot connect a node to itself.
    #[error("edge endpoints must differ, got {0:?} twice")]
    SelfLoop(NodeKey),

    /// An edge is not incident to the node it was queried from.
    #[error("edge {edge:?} is not incident to node {node:?}")]
    NotIncident { edge: EdgeKey, node: NodeKey },

    /// Node key not found in the arena.
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeKey),

    /// Edge key not found in the arena.
    #[error("edge not found: {0:?}")]
    EdgeNotFound(EdgeKey),

    /// Group key not found in the arena.
    #[error("group not found: {0:?}")]
    GroupNotFound(GroupKey),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}
