//! Control-flow graphs for a single function.
//!
//! The graph is an arena of [`ControlFlowNode`]s addressed by [`CfgNodeId`].
//! Node ids follow creation order: ENTRY first, then the function body in
//! source order, EXIT last.
//!
//! Default edge layout:
//! - each node of a block links to the next node of that block, except IF
//!   and RETURN nodes, which receive no appended successor;
//! - IF nodes list the true-branch head first and the false-branch head
//!   second, skipping an empty branch;
//! - loop nodes list the body head first and their successor second;
//! - EXIT hangs under the deepest-last node reachable from ENTRY, and has
//!   no successors.
//!
//! Every edge points at a later node, so the default graph is acyclic and
//! nodes cut off by an IF or RETURN stay in the arena unreachable.
//!
//! [`CfgBuilder::with_joins`] builds the joined layout instead: branch tails
//! continue into the statement after the IF (an empty branch slot takes the
//! fall-through), the last node of a loop body links back to the loop, and
//! RETURN nodes link only to EXIT.

mod builder;

use std::fmt;

use crate::ast::NodeId;

pub use builder::{CfgBuilder, build_cfg};

/// Identifier of a node within one control-flow graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CfgNodeId(usize);

impl CfgNodeId {
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    pub fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for CfgNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// The kind of a control-flow node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CfgNodeKind {
    Entry,
    Exit,
    If,
    Call,
    Return,
    Statement,
    While,
    For,
}

impl CfgNodeKind {
    /// Returns the upper-case display name of this kind.
    pub fn name(&self) -> &'static str {
        match self {
            CfgNodeKind::Entry => "ENTRY",
            CfgNodeKind::Exit => "EXIT",
            CfgNodeKind::If => "IF",
            CfgNodeKind::Call => "CALL",
            CfgNodeKind::Return => "RETURN",
            CfgNodeKind::Statement => "STATEMENT",
            CfgNodeKind::While => "WHILE",
            CfgNodeKind::For => "FOR",
        }
    }

    /// Returns true for nodes that choose between successors.
    pub fn is_decision(&self) -> bool {
        matches!(self, CfgNodeKind::If | CfgNodeKind::While | CfgNodeKind::For)
    }

    /// Returns true for loop headers.
    pub fn is_loop(&self) -> bool {
        matches!(self, CfgNodeKind::While | CfgNodeKind::For)
    }
}

impl fmt::Display for CfgNodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A node of the control-flow graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlFlowNode {
    pub id: CfgNodeId,
    pub kind: CfgNodeKind,
    /// Raw condition text for IF and loop nodes.
    pub condition: Option<String>,
    /// Short source rendering of the statement.
    pub label: String,
    /// Successors in edge order.
    pub children: Vec<CfgNodeId>,
    /// The syntax node this node was built from.
    pub syntax: Option<NodeId>,
}

impl fmt::Display for ControlFlowNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            CfgNodeKind::Entry | CfgNodeKind::Exit => f.write_str(self.kind.name()),
            _ => write!(f, "{}({})", self.kind, self.label),
        }
    }
}

/// Control-flow graph of one function, from ENTRY to EXIT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlFlowGraph {
    nodes: Vec<ControlFlowNode>,
    entry: CfgNodeId,
    exit: CfgNodeId,
    function: String,
}

impl ControlFlowGraph {
    /// Name of the analyzed function.
    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn entry(&self) -> CfgNodeId {
        self.entry
    }

    pub fn exit(&self) -> CfgNodeId {
        self.exit
    }

    /// Returns all nodes in id order.
    pub fn nodes(&self) -> &[ControlFlowNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks up a node by id.
    pub fn node(&self, id: CfgNodeId) -> Option<&ControlFlowNode> {
        self.nodes.get(id.0)
    }

    /// Returns the successors of `id`, or nothing for an unknown id.
    pub fn successors(&self, id: CfgNodeId) -> &[CfgNodeId] {
        self.node(id).map_or(&[], |node| node.children.as_slice())
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|node| node.children.len()).sum()
    }

    /// Returns the ids reachable from ENTRY in depth-first discovery order.
    pub fn reachable_from_entry(&self) -> Vec<CfgNodeId> {
        let mut visited = vec![false; self.nodes.len()];
        let mut order = Vec::new();
        let mut stack = vec![self.entry];

        while let Some(id) = stack.pop() {
            let Some(seen) = visited.get_mut(id.0) else {
                continue;
            };
            if *seen {
                continue;
            }
            *seen = true;
            order.push(id);
            stack.extend(self.successors(id).iter().rev().copied());
        }
        order
    }

    /// Returns true if `id` can be reached from ENTRY.
    pub fn is_reachable(&self, id: CfgNodeId) -> bool {
        self.reachable_from_entry().contains(&id)
    }

    /// Counts IF and loop nodes.
    pub fn decision_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| node.kind.is_decision())
            .count()
    }

    /// Returns the nodes of the given kind.
    pub fn nodes_of_kind(&self, kind: CfgNodeKind) -> impl Iterator<Item = &ControlFlowNode> + '_ {
        self.nodes.iter().filter(move |node| node.kind == kind)
    }

    /// Renders one `from -> to` line per edge, in node and edge order.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            for child in &node.children {
                if let Some(target) = self.node(*child) {
                    out.push_str(&format!("{node} -> {target}\n"));
                }
            }
        }
        out
    }
}
