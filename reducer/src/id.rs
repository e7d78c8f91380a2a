// id.rs — Stable node identifiers for shader ASTs
//
// Every declaration, statement and expression carries a `NodeId`. Identity of
// a node is its id, never its value: two `1.0` literals are distinct nodes.
// Ids are allocated from one allocator per shader job, so they never collide
// across stages and survive cloning the job.

use std::fmt;

/// Stable identifier for an AST node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Placeholder carried by freshly parsed nodes until they are numbered.
    pub const UNASSIGNED: NodeId = NodeId(u32::MAX);

    pub fn is_assigned(self) -> bool {
        self != Self::UNASSIGNED
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Allocator for node ids. Produces monotonically increasing ids in
/// allocation order, ensuring deterministic assignment.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    pub fn allocated(&self) -> u32 {
        self.next
    }
}
