//! Block and statement parsing.
//!
//! A block is delimited by braces and tracked with an explicit depth counter:
//! every `{` not consumed by a nested construct raises the depth, every `}`
//! lowers it, and the block ends at the `}` that returns the depth to the
//! block's own opening brace. Statements found inside such bare braces are
//! flattened into the enclosing block.
//!
//! At each position the statement shapes are tried in priority order:
//! variable declaration, `if`, loop, function call, `return`, assignment.
//! Every shape is recognized by lookahead before any node is allocated, so a
//! failed match leaves no trace in the tree.

use crate::ast::{NodeId, SyntaxKind};
use crate::error::PipelineError;
use crate::lexer::keywords;
use crate::lexer::token::{Token, TokenKind};

use super::Parser;

const ASSIGNMENT_OPERATORS: &[&str] = &["=", "+=", "-=", "*=", "/=", "%="];

/// `KEYWORD IDENTIFIER [ '[' ... ']' ] [ '=' expression ] ';'`
struct Declaration<'t> {
    ty: &'t Token,
    name: &'t Token,
    array_suffix: &'t [Token],
    initializer: &'t [Token],
    end: usize,
}

/// `keyword '(' raw tokens ')' '{'`, shared by `if`, `for` and `while`.
struct Conditional<'t> {
    keyword: &'t Token,
    open_paren: &'t Token,
    condition: &'t [Token],
    close_paren: &'t Token,
    body_brace: &'t Token,
    body_index: usize,
}

/// `IDENTIFIER '(' [ arg { ',' arg } ] ')' ';'`
struct Call<'t> {
    name: &'t Token,
    open_paren: &'t Token,
    arguments: Vec<&'t Token>,
    close_paren: &'t Token,
    end: usize,
}

/// `'return' [ expression ] ';'`
struct ReturnShape<'t> {
    keyword: &'t Token,
    value: &'t [Token],
    end: usize,
}

/// `IDENTIFIER assignment-operator expression ';'`
struct Assignment<'t> {
    target: &'t Token,
    operator: &'t Token,
    value: &'t [Token],
    end: usize,
}

impl<'t> Parser<'t> {
    /// Parses a brace-delimited block into a node of `kind` starting at
    /// `start`. The cursor must be on the opening `{`.
    pub(super) fn parse_block(
        &mut self,
        kind: SyntaxKind,
        start: &'t Token,
    ) -> Result<NodeId, PipelineError> {
        self.enter(start)?;
        let block = self.open(kind, None, start);
        self.cursor.consume_punct("{");

        let mut depth = 0usize;
        while let Some(token) = self.cursor.current() {
            if token.is_punct("{") {
                depth += 1;
                self.cursor.advance();
                continue;
            }
            if token.is_punct("}") {
                self.cursor.advance();
                if depth == 0 {
                    break;
                }
                depth -= 1;
                continue;
            }

            match self.parse_statement()? {
                Some(statement) => self.builder.push_child(block, statement),
                None => {
                    tracing::trace!(%token, "skipping unrecognized token");
                    self.cursor.advance();
                }
            }
        }

        self.close(block);
        self.leave();
        Ok(block)
    }

    /// Parses one statement at the cursor, or returns `None` without moving
    /// when no statement shape matches.
    fn parse_statement(&mut self) -> Result<Option<NodeId>, PipelineError> {
        let pos = self.cursor.position();

        if let Some(shape) = self.declaration_shape(pos) {
            return Ok(Some(self.parse_declaration(shape)));
        }
        if let Some(shape) = self.conditional_shape(pos, "if") {
            return self.parse_if(shape).map(Some);
        }
        if let Some(shape) = self.conditional_shape(pos, "for") {
            return self.parse_loop(SyntaxKind::ForStatement, shape).map(Some);
        }
        if let Some(shape) = self.conditional_shape(pos, "while") {
            return self.parse_loop(SyntaxKind::WhileStatement, shape).map(Some);
        }
        if let Some(shape) = self.call_shape(pos) {
            return Ok(Some(self.parse_call(shape)));
        }
        if let Some(shape) = self.return_shape(pos) {
            return Ok(Some(self.parse_return(shape)));
        }
        if let Some(shape) = self.assignment_shape(pos) {
            return Ok(Some(self.parse_assignment(shape)));
        }
        Ok(None)
    }

    fn declaration_shape(&self, pos: usize) -> Option<Declaration<'t>> {
        let ty = self
            .cursor
            .at(pos)
            .filter(|token| token.kind == TokenKind::Keyword && keywords::is_type_name(&token.text))?;
        let name = self
            .cursor
            .at(pos + 1)
            .filter(|token| token.kind == TokenKind::Identifier)?;

        let mut next = pos + 2;
        let mut array_suffix: &'t [Token] = &[];
        if self.cursor.punct_at(next, "[") {
            let mut close = next + 1;
            loop {
                let token = self.cursor.at(close)?;
                if token.is_punct("]") {
                    break;
                }
                if token.kind == TokenKind::Punctuation {
                    return None;
                }
                close += 1;
            }
            array_suffix = self.cursor.slice(next..close + 1);
            next = close + 1;
        }

        let mut initializer: &'t [Token] = &[];
        if self.cursor.at(next)?.is(TokenKind::Operator, "=") {
            let start = next + 1;
            let end = self.cursor.expression_end(start);
            if end == start {
                return None;
            }
            initializer = self.cursor.slice(start..end);
            next = end;
        }

        if !self.cursor.punct_at(next, ";") {
            return None;
        }
        Some(Declaration {
            ty,
            name,
            array_suffix,
            initializer,
            end: next,
        })
    }

    fn parse_declaration(&mut self, shape: Declaration<'t>) -> NodeId {
        let declaration = self.open(SyntaxKind::VariableDeclaration, None, shape.ty);

        let type_node = match shape.array_suffix.last() {
            Some(last) => {
                let mut text = shape.ty.text.to_string();
                for token in shape.array_suffix {
                    text.push_str(&token.text);
                }
                let node = self.open(SyntaxKind::Type, Some(text.into()), shape.ty);
                self.close_at(node, last);
                node
            }
            None => self.leaf_as(SyntaxKind::Type, shape.ty),
        };
        self.builder.push_child(declaration, type_node);

        let name_node = self.leaf_as(SyntaxKind::Identifier, shape.name);
        self.builder.push_child(declaration, name_node);

        if let Some(value) = self.expression(shape.initializer) {
            self.builder.push_child(declaration, value);
        }

        self.cursor.set_position(shape.end + 1);
        self.close(declaration);
        declaration
    }

    fn conditional_shape(&self, pos: usize, keyword: &str) -> Option<Conditional<'t>> {
        let keyword = self.cursor.at(pos).filter(|token| token.is_keyword(keyword))?;
        let open = pos + 1;
        let open_paren = self.cursor.at(open)?;
        let close = self.cursor.matching_paren(open)?;
        let close_paren = self.cursor.at(close)?;
        let body_brace = self
            .cursor
            .at(close + 1)
            .filter(|token| token.is_punct("{"))?;

        Some(Conditional {
            keyword,
            open_paren,
            condition: self.cursor.slice(open + 1..close),
            close_paren,
            body_brace,
            body_index: close + 1,
        })
    }

    /// Allocates the CONDITION node of an `if` or loop header.
    fn condition(&mut self, shape: &Conditional<'t>) -> NodeId {
        self.raw_node(
            SyntaxKind::Condition,
            shape.open_paren,
            shape.condition,
            shape.close_paren,
        )
    }

    fn parse_if(&mut self, shape: Conditional<'t>) -> Result<NodeId, PipelineError> {
        let statement = self.open(SyntaxKind::IfStatement, None, shape.keyword);
        let condition = self.condition(&shape);
        self.builder.push_child(statement, condition);

        self.cursor.set_position(shape.body_index);
        let body = self.parse_block(SyntaxKind::IfBody, shape.body_brace)?;
        self.builder.push_child(statement, body);

        if let Some(else_token) = self.cursor.current().filter(|token| token.is_keyword("else")) {
            let next = self.cursor.position() + 1;
            if self.cursor.punct_at(next, "{") {
                self.cursor.set_position(next);
                let branch = self.parse_block(SyntaxKind::Else, else_token)?;
                self.builder.push_child(statement, branch);
            } else if let Some(nested) = self.conditional_shape(next, "if") {
                // Each link of an else-if chain nests one level deeper.
                self.enter(else_token)?;
                let branch = self.open(SyntaxKind::Else, None, else_token);
                self.cursor.set_position(next);
                let nested_if = self.parse_if(nested)?;
                self.builder.push_child(branch, nested_if);
                self.close(branch);
                self.builder.push_child(statement, branch);
                self.leave();
            }
        }

        self.close(statement);
        Ok(statement)
    }

    fn parse_loop(
        &mut self,
        kind: SyntaxKind,
        shape: Conditional<'t>,
    ) -> Result<NodeId, PipelineError> {
        let statement = self.open(kind, None, shape.keyword);
        let condition = self.condition(&shape);
        self.builder.push_child(statement, condition);

        self.cursor.set_position(shape.body_index);
        let body = self.parse_block(SyntaxKind::LoopBody, shape.body_brace)?;
        self.builder.push_child(statement, body);

        self.close(statement);
        Ok(statement)
    }

    fn call_shape(&self, pos: usize) -> Option<Call<'t>> {
        let name = self
            .cursor
            .at(pos)
            .filter(|token| token.kind == TokenKind::Identifier)?;
        let open_paren = self.cursor.at(pos + 1).filter(|token| token.is_punct("("))?;

        let mut arguments = Vec::new();
        let mut index = pos + 2;
        if !self.cursor.punct_at(index, ")") {
            loop {
                let argument = self.cursor.at(index).filter(|token| token.kind.is_argument())?;
                arguments.push(argument);
                index += 1;
                if self.cursor.punct_at(index, ",") {
                    index += 1;
                } else if self.cursor.punct_at(index, ")") {
                    break;
                } else {
                    return None;
                }
            }
        }

        let close_paren = self.cursor.at(index)?;
        if !self.cursor.punct_at(index + 1, ";") {
            return None;
        }
        Some(Call {
            name,
            open_paren,
            arguments,
            close_paren,
            end: index + 1,
        })
    }

    fn parse_call(&mut self, shape: Call<'t>) -> NodeId {
        let call = self.open(SyntaxKind::FunctionCall, Some(shape.name.text.clone()), shape.name);
        let name_node = self.leaf_as(SyntaxKind::Identifier, shape.name);
        self.builder.push_child(call, name_node);

        let arguments = self.open(SyntaxKind::Arguments, None, shape.open_paren);
        for argument in &shape.arguments {
            let leaf = self.leaf(argument);
            self.builder.push_child(arguments, leaf);
        }
        self.close_at(arguments, shape.close_paren);
        self.builder.push_child(call, arguments);

        self.cursor.set_position(shape.end + 1);
        self.close(call);
        call
    }

    fn return_shape(&self, pos: usize) -> Option<ReturnShape<'t>> {
        let keyword = self.cursor.at(pos).filter(|token| token.is_keyword("return"))?;
        let start = pos + 1;
        if self.cursor.punct_at(start, ";") {
            return Some(ReturnShape {
                keyword,
                value: &[],
                end: start,
            });
        }

        let end = self.cursor.expression_end(start);
        if end == start || !self.cursor.punct_at(end, ";") {
            return None;
        }
        Some(ReturnShape {
            keyword,
            value: self.cursor.slice(start..end),
            end,
        })
    }

    fn parse_return(&mut self, shape: ReturnShape<'t>) -> NodeId {
        let statement = self.open(SyntaxKind::Return, None, shape.keyword);
        if let Some(value) = self.expression(shape.value) {
            self.builder.push_child(statement, value);
        }
        self.cursor.set_position(shape.end + 1);
        self.close(statement);
        statement
    }

    fn assignment_shape(&self, pos: usize) -> Option<Assignment<'t>> {
        let target = self
            .cursor
            .at(pos)
            .filter(|token| token.kind == TokenKind::Identifier)?;
        let operator = self.cursor.at(pos + 1).filter(|token| {
            token.kind == TokenKind::Operator && ASSIGNMENT_OPERATORS.contains(&token.text.as_str())
        })?;

        let start = pos + 2;
        let end = self.cursor.expression_end(start);
        if end == start || !self.cursor.punct_at(end, ";") {
            return None;
        }
        Some(Assignment {
            target,
            operator,
            value: self.cursor.slice(start..end),
            end,
        })
    }

    fn parse_assignment(&mut self, shape: Assignment<'t>) -> NodeId {
        let statement = self.open(
            SyntaxKind::Assignment,
            Some(shape.operator.text.clone()),
            shape.target,
        );
        let target = self.leaf_as(SyntaxKind::Identifier, shape.target);
        self.builder.push_child(statement, target);
        if let Some(value) = self.expression(shape.value) {
            self.builder.push_child(statement, value);
        }
        self.cursor.set_position(shape.end + 1);
        self.close(statement);
        statement
    }
}
