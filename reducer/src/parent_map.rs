// parent_map.rs — Point-in-time parent index over one translation unit
//
// Nodes do not hold back-references; this map is rebuilt on demand instead.
// It is keyed by `NodeId`, so it stays meaningful while nodes move, but it
// does not see nodes added after `build`; rebuild it after every structural edit.

use std::collections::HashMap;

use crate::ast::{Expr, TranslationUnit};
use crate::error::ReduceError;
use crate::id::NodeId;
use crate::walk::{self, NodeMut, NodeRef, Slot};

/// The structural parent of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent {
    /// The translation unit itself (for top-level declarations).
    Root,
    Node(NodeId),
}

/// Where a node sits: its parent and the slot it occupies there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentLink {
    pub parent: Parent,
    pub slot: Slot,
}

#[derive(Debug, Clone, Default)]
pub struct ParentMap {
    links: HashMap<NodeId, ParentLink>,
}

impl ParentMap {
    /// Index every node reachable from the unit's top-level declarations.
    pub fn build(tu: &TranslationUnit) -> Self {
        let mut map = ParentMap::default();
        let mut stack: Vec<(ParentLink, NodeRef<'_>)> = walk::roots(tu)
            .into_iter()
            .map(|(slot, node)| {
                (
                    ParentLink {
                        parent: Parent::Root,
                        slot,
                    },
                    node,
                )
            })
            .collect();
        while let Some((link, node)) = stack.pop() {
            let id = node.id();
            map.links.insert(id, link);
            for (slot, child) in walk::children(node) {
                let link = ParentLink {
                    parent: Parent::Node(id),
                    slot,
                };
                stack.push((link, child));
            }
        }
        map
    }

    pub fn parent_of(&self, node: NodeId) -> Result<ParentLink, ReduceError> {
        self.links
            .get(&node)
            .copied()
            .ok_or(ReduceError::NodeNotFound(node))
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.links.contains_key(&node)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Put `replacement` into the slot that holds `node`, returning the
    /// replaced expression. The parent keeps the slot's position and role.
    ///
    /// `tu` must be the unit this map was built from; a node that is absent
    /// from the map, or whose parent is absent from `tu`, is `NodeNotFound`.
    pub fn replace(
        &self,
        tu: &mut TranslationUnit,
        node: NodeId,
        replacement: Expr,
    ) -> Result<Expr, ReduceError> {
        let link = self.parent_of(node)?;
        let Parent::Node(parent_id) = link.parent else {
            return Err(ReduceError::NotAnExpression(node));
        };
        let parent = walk::find_mut(tu, parent_id).ok_or(ReduceError::NodeNotFound(node))?;
        let (_, child) = walk::children_mut(parent)
            .into_iter()
            .find(|(slot, _)| *slot == link.slot)
            .ok_or(ReduceError::NodeNotFound(node))?;
        match child {
            NodeMut::Expr(expr) if expr.id == node => Ok(std::mem::replace(expr, replacement)),
            NodeMut::Expr(_) => Err(ReduceError::NodeNotFound(node)),
            NodeMut::Decl(_) | NodeMut::Stmt(_) => Err(ReduceError::NotAnExpression(node)),
        }
    }
}
