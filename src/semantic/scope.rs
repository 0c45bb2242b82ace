//! Lexical scopes and the variables declared in them.

use std::fmt;

use smol_str::SmolStr;

use crate::ast::Span;

/// Kind of scope boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// A function body.
    Function,

    /// The true branch of an `if`.
    If,

    /// The false branch of an `if`.
    Else,

    /// The body of a `for` loop.
    For,

    /// The body of a `while` loop.
    While,
}

impl ScopeKind {
    /// Returns the scope name used for blocks of this kind.
    ///
    /// Function scopes are named after their function instead.
    pub fn block_name(self) -> &'static str {
        match self {
            ScopeKind::Function => "function",
            ScopeKind::If => "if",
            ScopeKind::Else => "else",
            ScopeKind::For => "for",
            ScopeKind::While => "while",
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.block_name())
    }
}

/// A declared variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableInfo {
    /// Variable name.
    pub name: SmolStr,

    /// Declared type text, including any array suffix (e.g. `int[10]`).
    pub declared_type: SmolStr,

    /// Line of the declared name.
    pub declaration_line: usize,

    /// Column of the declared name.
    pub declaration_column: usize,

    /// Byte span of the declared name.
    pub span: Span,

    /// Whether any read or assignment of the variable was seen.
    pub used: bool,
}

/// A lexical scope with its declarations and nested scopes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    /// Function name for function scopes, otherwise the block keyword.
    pub name: String,

    /// Kind of scope.
    pub kind: ScopeKind,

    /// Line of the opening brace.
    pub start_line: usize,

    /// Line of the closing brace.
    pub end_line: usize,

    /// Variables in declaration order.
    pub variables: Vec<VariableInfo>,

    /// Nested scopes in source order.
    pub children: Vec<Scope>,
}

impl Scope {
    /// Creates an empty scope.
    pub fn new(name: impl Into<String>, kind: ScopeKind, start_line: usize, end_line: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            start_line,
            end_line,
            variables: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Finds a variable declared in this scope.
    pub fn variable(&self, name: &str) -> Option<&VariableInfo> {
        self.variables.iter().find(|var| var.name.as_str() == name)
    }

    /// Checks if a variable is declared in this scope.
    pub fn declares(&self, name: &str) -> bool {
        self.variable(name).is_some()
    }

    /// Marks every declaration of `name` in this scope as used.
    ///
    /// Returns false if the scope does not declare `name`.
    pub fn mark_used(&mut self, name: &str) -> bool {
        let mut found = false;
        for var in self.variables.iter_mut().filter(|var| var.name.as_str() == name) {
            var.used = true;
            found = true;
        }
        found
    }

    /// Iterates over this scope and all nested scopes in pre-order.
    pub fn walk(&self) -> ScopeWalk<'_> {
        ScopeWalk { stack: vec![self] }
    }

    /// Returns true if `line` falls within this scope's bounds.
    pub fn contains_line(&self, line: usize) -> bool {
        (self.start_line..=self.end_line).contains(&line)
    }
}

/// Pre-order iterator over a scope tree.
pub struct ScopeWalk<'a> {
    stack: Vec<&'a Scope>,
}

impl<'a> Iterator for ScopeWalk<'a> {
    type Item = &'a Scope;

    fn next(&mut self) -> Option<Self::Item> {
        let scope = self.stack.pop()?;
        self.stack.extend(scope.children.iter().rev());
        Some(scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variable(name: &str) -> VariableInfo {
        VariableInfo {
            name: name.into(),
            declared_type: "int".into(),
            declaration_line: 1,
            declaration_column: 1,
            span: 0..1,
            used: false,
        }
    }

    #[test]
    fn mark_used_reports_missing_names() {
        let mut scope = Scope::new("main", ScopeKind::Function, 1, 3);
        scope.variables.push(variable("x"));
        assert!(scope.mark_used("x"));
        assert!(!scope.mark_used("y"));
        assert!(scope.variable("x").is_some_and(|var| var.used));
    }

    #[test]
    fn walk_visits_children_in_order() {
        let mut root = Scope::new("main", ScopeKind::Function, 1, 10);
        let mut branch = Scope::new("if", ScopeKind::If, 2, 4);
        branch.children.push(Scope::new("while", ScopeKind::While, 3, 3));
        root.children.push(branch);
        root.children.push(Scope::new("else", ScopeKind::Else, 4, 6));

        let names: Vec<&str> = root.walk().map(|scope| scope.name.as_str()).collect();
        assert_eq!(names, vec!["main", "if", "while", "else"]);
    }

    #[test]
    fn line_bounds_are_inclusive() {
        let scope = Scope::new("if", ScopeKind::If, 2, 4);
        assert!(scope.contains_line(2));
        assert!(scope.contains_line(4));
        assert!(!scope.contains_line(5));
    }
}
