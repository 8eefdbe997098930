// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Chaikin3D Topology
//!
//! Mesh topology engine and Chaikin3D corner-cutting subdivision for closed
//! polyhedral meshes.
//!
//! A [`Polyhedron`] is a set of nodes joined by typed edges and grouped into
//! planar faces. Main edges carry the mesh topology; graphical edges only
//! triangulate faces with more than three sides for rendering. All data lives
//! in a [`MeshArena`] and is referenced through slot map keys, so the
//! node/edge cross references need no shared ownership.
//!
//! Geometric comparisons use an explicit per-mesh tolerance instead of exact
//! float equality; see [`ToleranceSet`] and [`ToleranceMap`].
//!
//! ```
//! use chaikin3d_topology::{EdgeFilter, Polyhedron};
//!
//! let vertices = [
//!     [0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0],
//!     [0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0],
//! ];
//! let faces = [
//!     [0usize, 3, 2, 1], [4, 5, 6, 7], [0, 1, 5, 4],
//!     [2, 3, 7, 6], [0, 4, 7, 3], [1, 2, 6, 5],
//! ];
//!
//! let cube = Polyhedron::from_vertex_lists(&vertices, &faces).unwrap();
//! let cut = cube.chaikin3d(4).unwrap();
//!
//! // One new node per directed main edge.
//! assert_eq!(cut.node_count(), 24);
//! // One corner group per old node plus one face per old face.
//! assert_eq!(cut.group_count(), 14);
//! assert!(cut.is_closed());
//! assert_eq!(cut.edge_count(EdgeFilter::Main), 36);
//! ```

pub mod arena;
pub mod chaikin;
pub mod construction;
pub mod error;
pub mod geometry;
pub mod group;
pub mod keys;
pub mod polyhedron;
pub mod search;
pub mod serialization;
pub mod tolerance;

#[cfg(test)]
mod test_shapes;

pub use arena::{EdgeData, GroupData, MeshArena, NodeData};
pub use chaikin::{ChaikinOptions, ChaikinReport, DEFAULT_COEFFICIENT, VERBOSE_STEP};
pub use error::{Error, Result};
pub use geometry::{Plane, Vec3};
pub use group::Triangle;
pub use keys::{EdgeFilter, EdgeKey, EdgeKind, GroupKey, NodeKey};
pub use polyhedron::{EdgeSegment, MeshOptions, MeshStats, Polyhedron};
pub use serialization::{MeshSnapshot, RenderData};
pub use tolerance::{Approx, FaceOutline, ToleranceMap, ToleranceSet, DEFAULT_EPSILON};
