// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Handle types for arena-based mesh storage.
//!
//! Nodes, edges and groups are stored in slot maps and referenced by
//! generational keys. A key stays valid while its entity lives, and a stale
//! key (for example a node released after a Chaikin pass) is detected
//! instead of aliasing a new entity.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use crate::error::Error;

new_key_type! {
    /// Key for a node (mesh vertex).
    pub struct NodeKey;

    /// Key for an edge between two nodes.
    pub struct EdgeKey;

    /// Key for a group (planar face).
    pub struct GroupKey;
}

/// The role of an edge in the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Topological mesh edge, part of a face boundary.
    Main,
    /// Helper edge that only triangulates a face for rendering.
    Graphical,
}

impl EdgeKind {
    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Main => "main",
            EdgeKind::Graphical => "graphical",
        }
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EdgeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main" => Ok(EdgeKind::Main),
            "graphical" => Ok(EdgeKind::Graphical),
            other => Err(Error::UnknownEdgeType(other.to_string())),
        }
    }
}

/// Selects edges by kind when querying the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EdgeFilter {
    Main,
    Graphical,
    #[default]
    Any,
}

impl EdgeFilter {
    /// Returns `true` if an edge of the given kind passes this filter.
    pub fn accepts(&self, kind: EdgeKind) -> bool {
        match self {
            EdgeFilter::Main => kind == EdgeKind::Main,
            EdgeFilter::Graphical => kind == EdgeKind::Graphical,
            EdgeFilter::Any => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeFilter::Main => "main",
            EdgeFilter::Graphical => "graphical",
            EdgeFilter::Any => "any",
        }
    }
}

impl From<EdgeKind> for EdgeFilter {
    fn from(kind: EdgeKind) -> Self {
        match kind {
            EdgeKind::Main => EdgeFilter::Main,
            EdgeKind::Graphical => EdgeFilter::Graphical,
        }
    }
}

impl std::fmt::Display for EdgeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EdgeFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any" => Ok(EdgeFilter::Any),
            other => other.parse::<EdgeKind>().map(EdgeFilter::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_kind_names() {
        assert_eq!(EdgeKind::Main.as_str(), "main");
        assert_eq!(EdgeKind::Graphical.to_string(), "graphical");
        assert_eq!("main".parse::<EdgeKind>().unwrap(), EdgeKind::Main);
    }

    #[test]
    fn unknown_edge_type_is_rejected() {
        let err = "diagonal".parse::<EdgeKind>().unwrap_err();
        assert!(matches!(err, Error::UnknownEdgeType(ref name) if name == "diagonal"));
        assert!("diagonal".parse::<EdgeFilter>().is_err());
    }

    #[test]
    fn filter_accepts_kinds() {
        assert!(EdgeFilter::Any.accepts(EdgeKind::Main));
        assert!(EdgeFilter::Any.accepts(EdgeKind::Graphical));
        assert!(EdgeFilter::Main.accepts(EdgeKind::Main));
        assert!(!EdgeFilter::Main.accepts(EdgeKind::Graphical));
        assert!(!EdgeFilter::Graphical.accepts(EdgeKind::Main));
        assert_eq!("any".parse::<EdgeFilter>().unwrap(), EdgeFilter::Any);
        assert_eq!("graphical".parse::<EdgeFilter>().unwrap(), EdgeFilter::Graphical);
    }
}
