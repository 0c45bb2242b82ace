//! Construction of a [`ControlFlowGraph`] from a function body.
//!
//! The default build chains each block into a flat sequence: every node gets
//! the next node of its block appended as a child, except IF and RETURN nodes,
//! which keep only their own children. EXIT is hung under the deepest-last
//! node reachable from ENTRY. The result is acyclic and every edge points at
//! a node created later.
//!
//! With joins enabled, branch tails continue into the statement after the IF,
//! loop bodies link back to their header and RETURN nodes link to EXIT.

use crate::ast::{NodeId, SyntaxKind, SyntaxNode, SyntaxTree};
use crate::error::PipelineError;

use super::{CfgNodeId, CfgNodeKind, ControlFlowGraph, ControlFlowNode};

/// A dangling edge waiting for the next node in program order.
#[derive(Debug, Clone, Copy)]
enum Tail {
    /// Appended after the node's existing successors.
    Next(CfgNodeId),
    /// Inserted first: the true branch of this IF was empty.
    Fallthrough(CfgNodeId),
}

/// A built statement or block: where control enters, and the edges that
/// continue with whatever follows.
struct Fragment {
    head: CfgNodeId,
    tails: Vec<Tail>,
}

/// Builds control-flow graphs over a syntax tree.
pub struct CfgBuilder<'a> {
    tree: &'a SyntaxTree,
    joins: bool,
    nodes: Vec<ControlFlowNode>,
    returns: Vec<CfgNodeId>,
}

impl<'a> CfgBuilder<'a> {
    pub fn new(tree: &'a SyntaxTree) -> Self {
        Self {
            tree,
            joins: false,
            nodes: Vec::new(),
            returns: Vec::new(),
        }
    }

    /// Joins branches and loops back into the surrounding code.
    pub fn with_joins(mut self, enabled: bool) -> Self {
        self.joins = enabled;
        self
    }

    /// Builds the graph of the named function.
    ///
    /// Returns `Ok(None)` if the program declares no such function. A
    /// definition with a body is preferred over a prototype.
    pub fn build(mut self, function: &str) -> Result<Option<ControlFlowGraph>, PipelineError> {
        let tree = self.tree;
        let mut candidates = tree
            .functions()
            .filter(|node| node.text() == function)
            .peekable();
        let Some(first) = candidates.peek().copied() else {
            return Ok(None);
        };
        let declaration = candidates
            .find(|node| {
                tree.child_of_kind(node.id, SyntaxKind::FunctionBody)
                    .is_some()
            })
            .unwrap_or(first);
        let body = tree
            .child_of_kind(declaration.id, SyntaxKind::FunctionBody)
            .map(|node| node.id);

        let entry = self.push(CfgNodeKind::Entry, None, "ENTRY".to_string(), Some(declaration.id));
        let exit = if self.joins {
            self.build_joined(entry, body)?
        } else {
            self.build_chained(entry, body)?
        };

        Ok(Some(ControlFlowGraph {
            nodes: self.nodes,
            entry,
            exit,
            function: function.to_string(),
        }))
    }

    fn build_chained(
        &mut self,
        entry: CfgNodeId,
        body: Option<NodeId>,
    ) -> Result<CfgNodeId, PipelineError> {
        let head = match body {
            Some(body) => self.build_sequence(body)?,
            None => None,
        };
        if let Some(head) = head {
            self.add_edge(entry, head);
        }

        let exit = self.push(CfgNodeKind::Exit, None, "EXIT".to_string(), None);
        let last = self.deepest_last(entry);
        self.add_edge(last, exit);
        Ok(exit)
    }

    fn build_joined(
        &mut self,
        entry: CfgNodeId,
        body: Option<NodeId>,
    ) -> Result<CfgNodeId, PipelineError> {
        let fragment = match body {
            Some(body) => self.build_block(body)?,
            None => None,
        };
        let exit = self.push(CfgNodeKind::Exit, None, "EXIT".to_string(), None);

        match fragment {
            Some(fragment) => {
                self.add_edge(entry, fragment.head);
                self.link(fragment.tails, exit);
            }
            None => self.add_edge(entry, exit),
        }
        for id in std::mem::take(&mut self.returns) {
            self.add_edge(id, exit);
        }
        Ok(exit)
    }

    fn push(
        &mut self,
        kind: CfgNodeKind,
        condition: Option<String>,
        label: String,
        syntax: Option<NodeId>,
    ) -> CfgNodeId {
        let id = CfgNodeId(self.nodes.len());
        self.nodes.push(ControlFlowNode {
            id,
            kind,
            condition,
            label,
            children: Vec::new(),
            syntax,
        });
        id
    }

    /// Pushes a RETURN, CALL or STATEMENT node.
    fn push_simple(&mut self, statement: &SyntaxNode) -> CfgNodeId {
        let kind = match statement.kind {
            SyntaxKind::Return => CfgNodeKind::Return,
            SyntaxKind::FunctionCall => CfgNodeKind::Call,
            _ => CfgNodeKind::Statement,
        };
        let label = statement_label(self.tree, statement);
        self.push(kind, None, label, Some(statement.id))
    }

    /// Pushes an IF or loop header carrying its raw condition.
    fn push_header(&mut self, kind: CfgNodeKind, statement: &SyntaxNode) -> CfgNodeId {
        let condition = self
            .tree
            .child_of_kind(statement.id, SyntaxKind::Condition)
            .map(|condition| self.tree.leaf_text(condition.id));
        let keyword = match kind {
            CfgNodeKind::For => "for",
            CfgNodeKind::While => "while",
            _ => "if",
        };
        let label = format!("{keyword} ({})", condition.as_deref().unwrap_or(""));
        self.push(kind, condition, label, Some(statement.id))
    }

    fn add_edge(&mut self, from: CfgNodeId, to: CfgNodeId) {
        if let Some(node) = self.nodes.get_mut(from.0) {
            node.children.push(to);
        }
    }

    /// Follows last children from `from` until a node without successors.
    fn deepest_last(&self, from: CfgNodeId) -> CfgNodeId {
        let mut current = from;
        while let Some(&next) = self.nodes.get(current.0).and_then(|node| node.children.last()) {
            current = next;
        }
        current
    }

    /// Builds a block as a chained sequence and returns its first node.
    fn build_sequence(&mut self, block: NodeId) -> Result<Option<CfgNodeId>, PipelineError> {
        let tree = self.tree;
        let node = tree.node(block)?;

        let mut head = None;
        let mut previous: Option<CfgNodeId> = None;
        for &child in &node.children {
            let id = self.build_chained_statement(tree.node(child)?)?;
            match previous {
                None => head = Some(id),
                Some(previous) => {
                    let chains = self
                        .nodes
                        .get(previous.0)
                        .is_some_and(|node| !matches!(node.kind, CfgNodeKind::If | CfgNodeKind::Return));
                    if chains {
                        self.add_edge(previous, id);
                    }
                }
            }
            previous = Some(id);
        }
        Ok(head)
    }

    fn build_chained_statement(&mut self, statement: &SyntaxNode) -> Result<CfgNodeId, PipelineError> {
        let tree = self.tree;
        let (kind, branches): (CfgNodeKind, &[SyntaxKind]) = match statement.kind {
            SyntaxKind::IfStatement => (CfgNodeKind::If, &[SyntaxKind::IfBody, SyntaxKind::Else]),
            SyntaxKind::ForStatement => (CfgNodeKind::For, &[SyntaxKind::LoopBody]),
            SyntaxKind::WhileStatement => (CfgNodeKind::While, &[SyntaxKind::LoopBody]),
            _ => return Ok(self.push_simple(statement)),
        };

        let id = self.push_header(kind, statement);
        for &branch in branches {
            let head = match tree.child_of_kind(statement.id, branch) {
                Some(block) => self.build_sequence(block.id)?,
                None => None,
            };
            if let Some(head) = head {
                self.add_edge(id, head);
            }
        }
        Ok(id)
    }

    /// Connects every dangling edge to `target`.
    fn link(&mut self, tails: Vec<Tail>, target: CfgNodeId) {
        for tail in tails {
            match tail {
                Tail::Next(id) => self.add_edge(id, target),
                Tail::Fallthrough(id) => {
                    if let Some(node) = self.nodes.get_mut(id.0) {
                        node.children.insert(0, target);
                    }
                }
            }
        }
    }

    /// Chains the statements of a block. Returns `None` for an empty block.
    fn build_block(&mut self, block: NodeId) -> Result<Option<Fragment>, PipelineError> {
        let tree = self.tree;
        let node = tree.node(block)?;

        let mut head = None;
        let mut tails = Vec::new();
        for &child in &node.children {
            let fragment = self.build_statement(tree.node(child)?)?;
            match head {
                None => head = Some(fragment.head),
                Some(_) => self.link(std::mem::take(&mut tails), fragment.head),
            }
            tails = fragment.tails;
        }

        Ok(head.map(|head| Fragment { head, tails }))
    }

    fn build_statement(&mut self, statement: &SyntaxNode) -> Result<Fragment, PipelineError> {
        match statement.kind {
            SyntaxKind::IfStatement => self.build_if(statement),
            SyntaxKind::ForStatement => self.build_loop(CfgNodeKind::For, statement),
            SyntaxKind::WhileStatement => self.build_loop(CfgNodeKind::While, statement),
            SyntaxKind::Return => {
                let id = self.push_simple(statement);
                self.returns.push(id);
                Ok(Fragment {
                    head: id,
                    tails: Vec::new(),
                })
            }
            _ => {
                let id = self.push_simple(statement);
                Ok(Fragment {
                    head: id,
                    tails: vec![Tail::Next(id)],
                })
            }
        }
    }

    fn build_if(&mut self, statement: &SyntaxNode) -> Result<Fragment, PipelineError> {
        let tree = self.tree;
        let id = self.push_header(CfgNodeKind::If, statement);

        let true_branch = match tree.child_of_kind(statement.id, SyntaxKind::IfBody) {
            Some(body) => self.build_block(body.id)?,
            None => None,
        };
        let false_branch = match tree.child_of_kind(statement.id, SyntaxKind::Else) {
            Some(branch) => self.build_block(branch.id)?,
            None => None,
        };

        let mut tails = Vec::new();
        match (true_branch, false_branch) {
            (Some(then), Some(other)) => {
                self.add_edge(id, then.head);
                self.add_edge(id, other.head);
                tails.extend(then.tails);
                tails.extend(other.tails);
            }
            (Some(then), None) => {
                self.add_edge(id, then.head);
                tails.extend(then.tails);
                tails.push(Tail::Next(id));
            }
            (None, Some(other)) => {
                self.add_edge(id, other.head);
                tails.push(Tail::Fallthrough(id));
                tails.extend(other.tails);
            }
            (None, None) => tails.push(Tail::Next(id)),
        }

        Ok(Fragment { head: id, tails })
    }

    fn build_loop(
        &mut self,
        kind: CfgNodeKind,
        statement: &SyntaxNode,
    ) -> Result<Fragment, PipelineError> {
        let tree = self.tree;
        let id = self.push_header(kind, statement);

        let body = match tree.child_of_kind(statement.id, SyntaxKind::LoopBody) {
            Some(body) => self.build_block(body.id)?,
            None => None,
        };
        if let Some(body) = body {
            self.add_edge(id, body.head);
            self.link(body.tails, id);
        }

        Ok(Fragment {
            head: id,
            tails: vec![Tail::Next(id)],
        })
    }
}

/// Renders a statement node as a short line of source.
fn statement_label(tree: &SyntaxTree, statement: &SyntaxNode) -> String {
    let expression = tree
        .child_of_kind(statement.id, SyntaxKind::Expression)
        .map(|expr| tree.leaf_text(expr.id));
    let identifier = tree
        .child_of_kind(statement.id, SyntaxKind::Identifier)
        .map_or("", SyntaxNode::text);

    match statement.kind {
        SyntaxKind::VariableDeclaration => {
            let ty = tree
                .child_of_kind(statement.id, SyntaxKind::Type)
                .map_or("", SyntaxNode::text);
            match expression {
                Some(value) => format!("{ty} {identifier} = {value}"),
                None => format!("{ty} {identifier}"),
            }
        }
        SyntaxKind::Assignment => format!(
            "{identifier} {} {}",
            statement.text(),
            expression.unwrap_or_default()
        ),
        SyntaxKind::FunctionCall => {
            let arguments = tree
                .child_of_kind(statement.id, SyntaxKind::Arguments)
                .map(|args| {
                    tree.children(args.id)
                        .map(SyntaxNode::text)
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_default();
            format!("{}({arguments})", statement.text())
        }
        SyntaxKind::Return => match expression {
            Some(value) => format!("return {value}"),
            None => "return".to_string(),
        },
        kind => kind.name().to_lowercase(),
    }
}

/// Builds the graph of `function`, or `None` if the program has no such
/// function.
pub fn build_cfg(
    tree: &SyntaxTree,
    function: &str,
) -> Result<Option<ControlFlowGraph>, PipelineError> {
    CfgBuilder::new(tree).build(function)
}
