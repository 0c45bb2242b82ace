//! Scope resolution over the syntax tree.
//!
//! One root scope is built per function body, with a child scope for every
//! IF_BODY, ELSE and LOOP_BODY block. Variable collection is a depth-first
//! walk: by default a declaration inside a nested block is recorded both in the
//! block's own scope and in every enclosing scope, and no usage pass runs, so
//! every declaration is reported as unused. [`CompilerConfig`] switches enable
//! isolated block scopes and usage tracking.

use std::collections::HashSet;

use smol_str::SmolStr;

use crate::ast::{NodeId, Span, SyntaxKind, SyntaxNode, SyntaxTree};
use crate::config::CompilerConfig;
use crate::diag::Diag;
use crate::error::PipelineError;
use crate::lexer::token::TokenKind;

use super::scope::{Scope, ScopeKind, VariableInfo};

/// Output of scope resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeResolution {
    /// One root scope per function with a body, in source order.
    pub scopes: Vec<Scope>,

    /// Unused-variable warnings.
    pub diagnostics: Vec<Diag>,
}

impl ScopeResolution {
    /// Iterates over every scope in pre-order, function by function.
    pub fn all_scopes(&self) -> impl Iterator<Item = &Scope> + '_ {
        self.scopes.iter().flat_map(Scope::walk)
    }

    /// Returns the root scope of the named function.
    pub fn function(&self, name: &str) -> Option<&Scope> {
        self.scopes.iter().find(|scope| scope.name == name)
    }
}

/// Declarations, references and nested blocks found directly in one block.
#[derive(Default)]
struct BlockContents {
    variables: Vec<VariableInfo>,
    references: Vec<SmolStr>,
    blocks: Vec<(ScopeKind, NodeId)>,
}

/// Builds the scope tree for a syntax tree.
pub struct ScopeResolver<'a> {
    tree: &'a SyntaxTree,
    config: &'a CompilerConfig,
}

impl<'a> ScopeResolver<'a> {
    pub fn new(tree: &'a SyntaxTree, config: &'a CompilerConfig) -> Self {
        Self { tree, config }
    }

    /// Resolves scopes for every function and derives unused-variable
    /// diagnostics.
    pub fn resolve(&self) -> Result<ScopeResolution, PipelineError> {
        let mut scopes = Vec::new();
        for function in self.tree.functions() {
            let Some(body) = self.tree.child_of_kind(function.id, SyntaxKind::FunctionBody) else {
                continue;
            };
            let (mut scope, unresolved) =
                self.build_scope(function.text().to_string(), ScopeKind::Function, body.id)?;
            if self.config.track_variable_usage && !self.config.isolate_block_scopes {
                share_usage(&mut scope);
            }
            if !unresolved.is_empty() {
                tracing::trace!(
                    function = function.text(),
                    count = unresolved.len(),
                    "references without a declaration"
                );
            }
            scopes.push(scope);
        }

        let diagnostics = unused_variable_diagnostics(&scopes);
        tracing::debug!(
            scopes = scopes.len(),
            warnings = diagnostics.len(),
            "resolved scopes"
        );
        Ok(ScopeResolution {
            scopes,
            diagnostics,
        })
    }

    /// Builds the scope for `block` and its nested scopes.
    ///
    /// Returns the scope together with the referenced names none of its
    /// scopes declare, so the caller can resolve them further out.
    fn build_scope(
        &self,
        name: String,
        kind: ScopeKind,
        block: NodeId,
    ) -> Result<(Scope, Vec<SmolStr>), PipelineError> {
        let node = self.tree.node(block)?;
        let mut scope = Scope::new(name, kind, node.start.line, node.end.line);

        let mut contents = BlockContents::default();
        self.collect(block, false, &mut contents)?;
        scope.variables = contents.variables;

        let mut references = contents.references;
        for (child_kind, child_block) in contents.blocks {
            let (child, unresolved) =
                self.build_scope(child_kind.block_name().to_string(), child_kind, child_block)?;
            scope.children.push(child);
            references.extend(unresolved);
        }

        let mut unresolved = Vec::new();
        if self.config.track_variable_usage {
            for reference in references {
                if !scope.mark_used(&reference) {
                    unresolved.push(reference);
                }
            }
        }
        Ok((scope, unresolved))
    }

    /// Walks the children of `id`, recording what belongs to the scope being
    /// built. `nested` is set below a nested block when its declarations are
    /// also counted into the enclosing scope.
    fn collect(
        &self,
        id: NodeId,
        nested: bool,
        out: &mut BlockContents,
    ) -> Result<(), PipelineError> {
        let node = self.tree.node(id)?;
        for &child_id in &node.children {
            let child = self.tree.node(child_id)?;
            match child.kind {
                SyntaxKind::VariableDeclaration => {
                    if let Some(variable) = self.variable(child) {
                        tracing::trace!(
                            name = %variable.name,
                            ty = %variable.declared_type,
                            line = variable.declaration_line,
                            "collected variable declaration"
                        );
                        out.variables.push(variable);
                    }
                }
                kind if kind.opens_scope() => {
                    if !nested {
                        out.blocks.push((block_scope_kind(node.kind, kind), child_id));
                    }
                    if !self.config.isolate_block_scopes {
                        self.collect(child_id, true, out)?;
                    }
                    continue;
                }
                SyntaxKind::Leaf(TokenKind::Identifier) if !nested => {
                    if let Some(name) = &child.value {
                        out.references.push(name.clone());
                    }
                }
                SyntaxKind::Assignment if !nested => {
                    if let Some(target) = self.tree.child_of_kind(child_id, SyntaxKind::Identifier) {
                        out.references.push(SmolStr::new(target.text()));
                    }
                }
                _ => {}
            }
            self.collect(child_id, nested, out)?;
        }
        Ok(())
    }

    fn variable(&self, declaration: &SyntaxNode) -> Option<VariableInfo> {
        let ty = self.tree.child_of_kind(declaration.id, SyntaxKind::Type)?;
        let name = self
            .tree
            .child_of_kind(declaration.id, SyntaxKind::Identifier)?;
        Some(VariableInfo {
            name: SmolStr::new(name.text()),
            declared_type: SmolStr::new(ty.text()),
            declaration_line: name.start.line,
            declaration_column: name.start.column,
            span: name.span.clone(),
            used: false,
        })
    }
}

/// Marks every copy of a used declaration. Without isolated block scopes a
/// nested declaration is also recorded in each enclosing scope, and the copies
/// share the declared name's span.
fn share_usage(scope: &mut Scope) {
    let used: HashSet<Span> = scope
        .walk()
        .flat_map(|scope| scope.variables.iter())
        .filter(|var| var.used)
        .map(|var| var.span.clone())
        .collect();
    if !used.is_empty() {
        mark_declarations(scope, &used);
    }
}

fn mark_declarations(scope: &mut Scope, used: &HashSet<Span>) {
    for var in &mut scope.variables {
        if used.contains(&var.span) {
            var.used = true;
        }
    }
    for child in &mut scope.children {
        mark_declarations(child, used);
    }
}

fn block_scope_kind(parent: SyntaxKind, block: SyntaxKind) -> ScopeKind {
    match block {
        SyntaxKind::Else => ScopeKind::Else,
        SyntaxKind::LoopBody if parent == SyntaxKind::ForStatement => ScopeKind::For,
        SyntaxKind::LoopBody => ScopeKind::While,
        _ => ScopeKind::If,
    }
}

/// Produces one warning per variable never marked used, in scope pre-order.
fn unused_variable_diagnostics(scopes: &[Scope]) -> Vec<Diag> {
    scopes
        .iter()
        .flat_map(Scope::walk)
        .flat_map(|scope| {
            scope
                .variables
                .iter()
                .filter(|var| !var.used)
                .map(move |var| unused_variable(scope, var))
        })
        .collect()
}

fn unused_variable(scope: &Scope, var: &VariableInfo) -> Diag {
    Diag::warning(format!("Variable '{}' is declared but never used", var.name))
        .at(var.declaration_line, var.declaration_column)
        .with_span(var.span.clone())
        .with_context(format!("declared in scope '{}'", scope.name))
        .with_suggestion(format!("Remove the declaration of '{}'", var.name))
        .with_suggestion(format!(
            "Use '{}' after its declaration or drop its initializer",
            var.name
        ))
        .with_code("W0001")
}

/// Resolves scopes with the given configuration.
pub fn resolve_scopes(
    tree: &SyntaxTree,
    config: &CompilerConfig,
) -> Result<ScopeResolution, PipelineError> {
    ScopeResolver::new(tree, config).resolve()
}
