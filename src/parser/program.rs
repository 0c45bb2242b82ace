//! Program-level parsing: function declarations and parameter lists.

use crate::ast::{NodeId, Position, SyntaxKind};
use crate::error::PipelineError;
use crate::lexer::keywords;
use crate::lexer::token::{Token, TokenKind};

use super::Parser;

impl<'t> Parser<'t> {
    /// Parses the whole token sequence into a PROGRAM node.
    pub(super) fn parse_program(&mut self) -> Result<NodeId, PipelineError> {
        let root = self
            .builder
            .alloc(SyntaxKind::Program, None, Position::start(), 0..0);

        while let Some(token) = self.cursor.current() {
            match self.function_start() {
                Some((return_type, name)) => {
                    let function = self.parse_function(return_type, name)?;
                    self.builder.push_child(root, function);
                }
                None => {
                    tracing::trace!(%token, "skipping token outside of a function");
                    self.cursor.advance();
                }
            }
        }

        self.close(root);
        Ok(root)
    }

    /// Recognizes `KEYWORD(type) IDENTIFIER (` at the cursor.
    fn function_start(&self) -> Option<(&'t Token, &'t Token)> {
        let return_type = self.cursor.peek(0).filter(|token| is_type_token(token))?;
        let name = self
            .cursor
            .peek(1)
            .filter(|token| token.kind == TokenKind::Identifier)?;
        self.cursor.peek(2).filter(|token| token.is_punct("("))?;
        Some((return_type, name))
    }

    fn parse_function(
        &mut self,
        return_type: &'t Token,
        name: &'t Token,
    ) -> Result<NodeId, PipelineError> {
        let function = self.open(
            SyntaxKind::FunctionDeclaration,
            Some(name.text.clone()),
            return_type,
        );
        let type_node = self.leaf_as(SyntaxKind::Type, return_type);
        self.builder.push_child(function, type_node);
        let name_node = self.leaf_as(SyntaxKind::Identifier, name);
        self.builder.push_child(function, name_node);

        self.cursor.advance();
        self.cursor.advance();
        if let Some(open_paren) = self.cursor.current() {
            let parameters = self.parse_parameters(open_paren);
            self.builder.push_child(function, parameters);
        }

        match self.cursor.current() {
            Some(brace) if brace.is_punct("{") => {
                let body = self.parse_block(SyntaxKind::FunctionBody, brace)?;
                self.builder.push_child(function, body);
            }
            _ => {
                // Prototype without a body.
                self.cursor.consume_punct(";");
            }
        }

        self.close(function);
        Ok(function)
    }

    /// Scans a parameter list up to its matching `)`.
    ///
    /// Every type-name/identifier pair at the outer level becomes a PARAMETER;
    /// anything else is skipped.
    fn parse_parameters(&mut self, open_paren: &'t Token) -> NodeId {
        let parameters = self.open(SyntaxKind::Parameters, None, open_paren);
        self.cursor.advance();

        let mut depth = 1usize;
        while let Some(token) = self.cursor.current() {
            if token.is_punct("(") {
                depth += 1;
            } else if token.is_punct(")") {
                depth -= 1;
                if depth == 0 {
                    self.cursor.advance();
                    break;
                }
            } else if depth == 1 && is_type_token(token) {
                let name = self
                    .cursor
                    .peek(1)
                    .filter(|next| next.kind == TokenKind::Identifier);
                if let Some(name) = name {
                    let parameter = self.open(SyntaxKind::Parameter, None, token);
                    let type_node = self.leaf_as(SyntaxKind::Type, token);
                    self.builder.push_child(parameter, type_node);
                    let name_node = self.leaf_as(SyntaxKind::Identifier, name);
                    self.builder.push_child(parameter, name_node);
                    self.close_at(parameter, name);
                    self.builder.push_child(parameters, parameter);

                    self.cursor.advance();
                    self.cursor.advance();
                    self.cursor.consume_punct(",");
                    continue;
                }
            }
            self.cursor.advance();
        }

        self.close(parameters);
        parameters
    }
}

fn is_type_token(token: &Token) -> bool {
    token.kind == TokenKind::Keyword && keywords::is_type_name(&token.text)
}

#[cfg(test)]
mod tests {
    use crate::ast::{SyntaxKind, SyntaxTree};
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn parse_source(source: &str) -> SyntaxTree {
        parse(&tokenize(source).tokens).expect("parse should succeed")
    }

    fn parameter_pairs(tree: &SyntaxTree, function: &str) -> Vec<(String, String)> {
        let function = tree.find_function(function).expect("function");
        let params = tree
            .child_of_kind(function.id, SyntaxKind::Parameters)
            .expect("parameters");
        tree.children(params.id)
            .map(|param| {
                let texts: Vec<String> = tree
                    .children(param.id)
                    .map(|child| child.text().to_string())
                    .collect();
                (texts[0].clone(), texts[1].clone())
            })
            .collect()
    }

    #[test]
    fn function_declaration_shape() {
        let tree = parse_source("int main() { return 0; }");
        let main = tree.find_function("main").expect("main");
        let kinds: Vec<SyntaxKind> = tree.children(main.id).map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::Type,
                SyntaxKind::Identifier,
                SyntaxKind::Parameters,
                SyntaxKind::FunctionBody,
            ]
        );
        assert_eq!(tree.children(main.id).next().map(|n| n.text()), Some("int"));
    }

    #[test]
    fn multiple_functions_are_siblings() {
        let tree = parse_source("void a() {} int b(int x) { return x; } char c() {}");
        let names: Vec<&str> = tree.functions().map(|f| f.text()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn parameters_are_collected() {
        let tree = parse_source("int add(int a, float b) { return a; }");
        assert_eq!(
            parameter_pairs(&tree, "add"),
            vec![
                ("int".to_string(), "a".to_string()),
                ("float".to_string(), "b".to_string())
            ]
        );
    }

    #[test]
    fn unrecognized_parameter_tokens_are_skipped() {
        let tree = parse_source("int f(void, int * p, 3, char c) { }");
        assert_eq!(
            parameter_pairs(&tree, "f"),
            vec![("char".to_string(), "c".to_string())]
        );
    }

    #[test]
    fn prototype_has_no_body() {
        let tree = parse_source("int helper(int n); int main() { }");
        let helper = tree.find_function("helper").expect("helper");
        assert!(tree
            .child_of_kind(helper.id, SyntaxKind::FunctionBody)
            .is_none());
        assert!(tree.find_function("main").is_some());
    }

    #[test]
    fn top_level_noise_is_skipped() {
        let tree = parse_source("int x = 3; ; } { main() int main() { }");
        let names: Vec<&str> = tree.functions().map(|f| f.text()).collect();
        assert_eq!(names, vec!["main"]);
    }

    #[test]
    fn unterminated_body_runs_to_end_of_input() {
        let tree = parse_source("int main() { int x = 1;");
        let main = tree.find_function("main").expect("main");
        let body = tree
            .child_of_kind(main.id, SyntaxKind::FunctionBody)
            .expect("body");
        assert_eq!(body.children.len(), 1);
    }
}
