// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Node and edge operations.
//!
//! Edges are created and repointed through the arena, which keeps the
//! endpoint nodes' edge lists in sync with the edge data.

use crate::arena::*;
use crate::error::{Error, Result};
use crate::keys::*;

impl MeshArena {
    /// Returns the incident edges of `node` that pass `filter`.
    pub fn edges_of_type(&self, node: NodeKey, filter: EdgeFilter) -> Result<Vec<EdgeKey>> {
        let data = self.nodes.get(node).ok_or(Error::NodeNotFound(node))?;
        Ok(data
            .edges
            .iter()
            .copied()
            .filter(|&ek| self.edges.get(ek).is_some_and(|e| filter.accepts(e.kind)))
            .collect())
    }

    /// Returns the other endpoint of `edge`, seen from `node`.
    pub fn partner(&self, node: NodeKey, edge: EdgeKey) -> Result<NodeKey> {
        let data = self.edges.get(edge).ok_or(Error::EdgeNotFound(edge))?;
        data.other(node).ok_or(Error::NotIncident { edge, node })
    }

    /// Returns the nodes joined to `node` by an edge passing `filter`.
    pub fn partners(&self, node: NodeKey, filter: EdgeFilter) -> Result<Vec<NodeKey>> {
        self.edges_of_type(node, filter)?
            .into_iter()
            .map(|ek| self.partner(node, ek))
            .collect()
    }

    /// Finds an edge joining `x` and `y` that passes `filter`.
    pub fn find_edge(&self, x: NodeKey, y: NodeKey, filter: EdgeFilter) -> Option<EdgeKey> {
        let data = self.nodes.get(x)?;
        data.edges.iter().copied().find(|&ek| {
            self.edges
                .get(ek)
                .is_some_and(|e| filter.accepts(e.kind) && e.joins(x, y))
        })
    }

    /// Returns `true` if `x` and `y` are joined by an edge passing `filter`.
    pub fn are_connected(&self, x: NodeKey, y: NodeKey, filter: EdgeFilter) -> bool {
        self.find_edge(x, y, filter).is_some()
    }

    /// Connects two nodes with an edge of the given kind.
    ///
    /// Idempotent: if an edge of the same kind already joins the nodes, it
    /// is returned instead of creating a second one.
    pub fn connect(&mut self, x: NodeKey, y: NodeKey, kind: EdgeKind) -> Result<EdgeKey> {
        if x == y {
            return Err(Error::SelfLoop(x));
        }
        if !self.nodes.contains_key(x) {
            return Err(Error::NodeNotFound(x));
        }
        if !self.nodes.contains_key(y) {
            return Err(Error::NodeNotFound(y));
        }
        if let Some(existing) = self.find_edge(x, y, kind.into()) {
            return Ok(existing);
        }

        let key = self.edges.insert(EdgeData { a: x, b: y, kind });
        self.nodes[x].edges.push(key);
        self.nodes[y].edges.push(key);
        Ok(key)
    }

    /// Repoints the `old` endpoint of `edge` to `new`, in place.
    ///
    /// The edge leaves `old`'s edge list and joins `new`'s. Used by the
    /// Chaikin transform to hand an edge over to a truncation node.
    pub fn update_node(&mut self, edge: EdgeKey, old: NodeKey, new: NodeKey) -> Result<()> {
        if !self.nodes.contains_key(new) {
            return Err(Error::NodeNotFound(new));
        }
        let data = self.edges.get_mut(edge).ok_or(Error::EdgeNotFound(edge))?;
        let other = data.other(old).ok_or(Error::NotIncident { edge, node: old })?;
        if other == new {
            return Err(Error::SelfLoop(new));
        }

        if data.a == old {
            data.a = new;
        } else {
            data.b = new;
        }

        if let Some(old_data) = self.nodes.get_mut(old) {
            old_data.edges.retain(|&ek| ek != edge);
        }
        self.nodes[new].edges.push(edge);
        Ok(())
    }

    /// Removes a node together with every edge still incident to it.
    pub(crate) fn remove_node(&mut self, node: NodeKey) -> Option<NodeData> {
        let data = self.nodes.remove(node)?;
        for &ek in &data.edges {
            if let Some(edge) = self.edges.remove(ek) {
                if let Some(other) = edge.other(node) {
                    if let Some(other_data) = self.nodes.get_mut(other) {
                        other_data.edges.retain(|&k| k != ek);
                    }
                }
            }
        }
        Some(data)
    }
}
