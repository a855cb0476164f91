//! Statement and declaration parsing.
//!
//! Blocks are indentation-driven: after a `:` that opens a block, the first
//! non-blank line's indent width defines the block, lines at the same width
//! belong to it, and a shallower line ends it (its indent token is left for
//! the enclosing scope). Statements always consume their trailing newline, so
//! between statements the cursor sits at a line-start indent token or at the
//! end of the stream.

use tracing::trace;
use veld_scanner::{token_kind_desc, OperatorKind, Token, TokenKind};

use super::base::{NodeId, TokenId};
use super::node::{BinaryOp, NodeData, NodeKind, StaticDecl, StaticDeclKind};
use super::spelling;
use super::state::{PResult, Parser};

const EMPTY_BLOCK_MSG: &str =
    "Block requires at least one statement. Use the `pass` statement as a placeholder.";

impl Parser {
    // =========================================================================
    // Root and block structure
    // =========================================================================

    /// Root production: a chain of top-level statements at column 0.
    pub(crate) fn parse_root(&mut self) -> PResult<NodeId> {
        self.push_block();
        let root_start = TokenId(0);
        let head = match self.next_content_line()? {
            None => NodeId::NONE,
            Some(tok) => {
                if tok.indent_width() != 0 {
                    return self.report_at(tok.start, "Unexpected indentation.");
                }
                self.next_token();
                self.parse_statements(0)?
            }
        };
        self.pop_block();
        Ok(self.push_node(NodeKind::Root, root_start, NodeData::Children { head }))
    }

    /// Skip blank lines and return the indent token of the next content
    /// line, without consuming it. `None` at end of input.
    pub(crate) fn next_content_line(&mut self) -> PResult<Option<Token>> {
        loop {
            match self.token() {
                TokenKind::None => return Ok(None),
                TokenKind::NewLine => self.next_token(),
                TokenKind::Indent => match self.peek_ahead(1).kind {
                    TokenKind::NewLine => {
                        self.next_token();
                        self.next_token();
                    }
                    TokenKind::None => {
                        self.next_token();
                        return Ok(None);
                    }
                    _ => return Ok(Some(self.peek())),
                },
                _ => return self.report_expected("indentation"),
            }
        }
    }

    /// Sibling indentation markers must not switch between tabs and spaces.
    fn check_indent_mixing(&mut self, tok: &Token) -> PResult<()> {
        if tok.indent_width() == 0 {
            return Ok(());
        }
        let is_tabs = tok.indent_is_tabs();
        match self.indent_is_tabs {
            None => {
                self.indent_is_tabs = Some(is_tabs);
                Ok(())
            }
            Some(established) if established == is_tabs => Ok(()),
            Some(_) => {
                self.report_at(tok.start, "Can not mix tabs and spaces for indentation.")
            }
        }
    }

    /// After a block-opening `:` and its newline, establish the block indent.
    fn begin_indented_block(&mut self, parent_indent: u32) -> PResult<u32> {
        if self.is_token(TokenKind::None) {
            return self.report(EMPTY_BLOCK_MSG);
        }
        self.parse_expected(TokenKind::NewLine)?;
        match self.next_content_line()? {
            None => self.report(EMPTY_BLOCK_MSG),
            Some(tok) => {
                self.check_indent_mixing(&tok)?;
                let width = tok.indent_width();
                if width <= parent_indent {
                    return self.report_at(tok.start, EMPTY_BLOCK_MSG);
                }
                self.next_token();
                Ok(width)
            }
        }
    }

    /// After an item in an indented block, decide whether another item at
    /// `indent` follows; consumes the indent token when continuing. A
    /// shallower line ends the block with its indent token unconsumed.
    fn continue_block(&mut self, indent: u32) -> PResult<bool> {
        match self.next_content_line()? {
            None => Ok(false),
            Some(tok) => {
                let width = tok.indent_width();
                if width == indent {
                    self.check_indent_mixing(&tok)?;
                    self.next_token();
                    Ok(true)
                } else if width < indent {
                    Ok(false)
                } else {
                    self.report_at(tok.start, "Unexpected indentation.")
                }
            }
        }
    }

    fn parse_statements(&mut self, indent: u32) -> PResult<NodeId> {
        let mut head = NodeId::NONE;
        let mut tail = NodeId::NONE;
        loop {
            let stmt = self.parse_statement(indent)?;
            self.chain(&mut head, &mut tail, stmt);
            if !self.continue_block(indent)? {
                break;
            }
        }
        Ok(head)
    }

    /// Block body after `:`: a single inline statement, or an indented
    /// statement chain.
    fn parse_block(&mut self, parent_indent: u32) -> PResult<NodeId> {
        if !self.is_token(TokenKind::NewLine) && !self.is_token(TokenKind::None) {
            return self.parse_statement(parent_indent);
        }
        let indent = self.begin_indented_block(parent_indent)?;
        self.parse_statements(indent)
    }

    // =========================================================================
    // Statement dispatch
    // =========================================================================

    fn parse_statement(&mut self, indent: u32) -> PResult<NodeId> {
        match self.token() {
            TokenKind::Ident if self.peek_ahead(1).kind == TokenKind::Colon => {
                self.parse_label_decl(indent)
            }
            TokenKind::At => self.parse_at_stmt(),
            TokenKind::TypeKeyword => self.parse_type_decl(indent),
            TokenKind::FuncKeyword => {
                if self.peek_ahead(1).kind == TokenKind::Ident {
                    self.parse_func_decl(indent)
                } else {
                    let start = self.token_id();
                    let lambda = self.parse_multiline_lambda(indent)?;
                    Ok(self.push_node(NodeKind::ExprStmt, start, NodeData::Child { child: lambda }))
                }
            }
            TokenKind::IfKeyword => self.parse_if_stmt(indent),
            TokenKind::MatchKeyword => self.parse_match_stmt(indent),
            TokenKind::ForKeyword => self.parse_for_stmt(indent),
            TokenKind::WhileKeyword => self.parse_while_stmt(indent),
            TokenKind::ImportKeyword => self.parse_import_stmt(),
            TokenKind::PassKeyword => self.parse_simple_stmt(NodeKind::PassStmt),
            TokenKind::ContinueKeyword => self.parse_simple_stmt(NodeKind::ContinueStmt),
            TokenKind::BreakKeyword => self.parse_simple_stmt(NodeKind::BreakStmt),
            TokenKind::ReturnKeyword => self.parse_return_stmt(),
            TokenKind::TryKeyword if self.peek_ahead(1).kind == TokenKind::Colon => {
                self.parse_try_stmt(indent)
            }
            TokenKind::VarKeyword => self.parse_var_decl(indent),
            TokenKind::CaptureKeyword => self.parse_local_decl(indent, NodeKind::CaptureDecl),
            TokenKind::StaticKeyword => self.parse_local_decl(indent, NodeKind::StaticDecl),
            _ => self.parse_expr_statement(indent),
        }
    }

    fn parse_simple_stmt(&mut self, kind: NodeKind) -> PResult<NodeId> {
        let start = self.token_id();
        self.next_token();
        let stmt = self.push_node(kind, start, NodeData::Empty);
        self.expect_end_of_line()?;
        Ok(stmt)
    }

    fn parse_return_stmt(&mut self) -> PResult<NodeId> {
        let start = self.token_id();
        self.next_token();
        let stmt = if self.is_token(TokenKind::NewLine) || self.is_token(TokenKind::None) {
            self.push_node(NodeKind::ReturnStmt, start, NodeData::Empty)
        } else {
            let expr = self.parse_expr()?;
            self.push_node(NodeKind::ReturnExprStmt, start, NodeData::Child { child: expr })
        };
        self.expect_end_of_line()?;
        Ok(stmt)
    }

    /// `name: <block>` labeled block.
    fn parse_label_decl(&mut self, indent: u32) -> PResult<NodeId> {
        let start = self.token_id();
        let name = self.parse_ident_node(false)?;
        self.parse_expected(TokenKind::Colon)?;
        let body = self.parse_block(indent)?;
        Ok(self.push_node(
            NodeKind::LabelDecl,
            start,
            NodeData::Label { name, body_head: body },
        ))
    }

    /// `@expr(...)` statement; the wrapped expression must be a call.
    fn parse_at_stmt(&mut self) -> PResult<NodeId> {
        let start = self.token_id();
        self.next_token();
        let expr = self.parse_tight_term()?;
        if self.node_kind(expr) != NodeKind::CallExpr {
            let pos = self.node_pos(expr);
            return self.report_at(pos, "Expected call expression after `@`.");
        }
        let stmt = self.push_node(NodeKind::AtStmt, start, NodeData::Child { child: expr });
        self.expect_end_of_line()?;
        Ok(stmt)
    }

    // =========================================================================
    // Expression and assignment statements
    // =========================================================================

    fn parse_expr_statement(&mut self, _indent: u32) -> PResult<NodeId> {
        let start = self.token_id();
        let first_tok = self.peek();
        let left = self.parse_expr()?;

        let stmt = match self.token() {
            TokenKind::Equal => {
                self.check_assignable(left)?;
                self.next_token();
                let rhs = self.parse_expr()?;
                self.bind_assigned_name(left);
                self.push_node(
                    NodeKind::AssignStmt,
                    start,
                    NodeData::Assign { left, right: rhs },
                )
            }
            TokenKind::Operator
                if self.peek_ahead(1).kind == TokenKind::Equal
                    && op_assign_binary_op(self.peek().operator()).is_some() =>
            {
                let op = match op_assign_binary_op(self.peek().operator()) {
                    Some(op) => op,
                    None => return self.report_expected("assignment operator"),
                };
                self.check_assignable(left)?;
                self.next_token();
                self.next_token();
                let rhs = self.parse_expr()?;
                self.push_node(
                    NodeKind::OpAssignStmt,
                    start,
                    NodeData::OpAssign { left, op, right: rhs },
                )
            }
            _ => {
                // No-paren call form: `print a b` etc.
                let expr = if matches!(
                    self.node_kind(left),
                    NodeKind::Ident | NodeKind::AccessExpr
                ) && self.token_starts_no_paren_arg()
                {
                    self.parse_no_paren_call(start, left)?
                } else {
                    left
                };
                self.push_node(NodeKind::ExprStmt, start, NodeData::Child { child: expr })
            }
        };
        self.expect_statement_end(first_tok)?;
        Ok(stmt)
    }

    /// Like `expect_end_of_line`, plus a keyword spelling suggestion when the
    /// statement began with an identifier close to a keyword (`fnc`, `whle`).
    fn expect_statement_end(&mut self, first_tok: Token) -> PResult<()> {
        match self.token() {
            TokenKind::NewLine => {
                self.next_token();
                Ok(())
            }
            TokenKind::None => Ok(()),
            _ => {
                let tok = self.peek();
                let mut msg = format!(
                    "Expected end of line, found {} at position {}.",
                    token_kind_desc(tok.kind),
                    tok.start
                );
                if first_tok.kind == TokenKind::Ident {
                    let text = &self.src[first_tok.start as usize..first_tok.end() as usize];
                    if let Some(suggestion) = spelling::suggest_keyword(text) {
                        msg.push_str(&format!(" Did you mean `{suggestion}`?"));
                    }
                }
                self.report_at(tok.start, msg)
            }
        }
    }

    fn check_assignable(&mut self, left: NodeId) -> PResult<()> {
        match self.node_kind(left) {
            NodeKind::Ident | NodeKind::AccessExpr | NodeKind::IndexExpr => Ok(()),
            _ => {
                let pos = self.node_pos(left);
                self.report_at(pos, "Left-hand side of assignment is not assignable.")
            }
        }
    }

    /// A plain-identifier assignment binds the name in the current block and
    /// retracts the dependency entry its own left-hand side introduced.
    fn bind_assigned_name(&mut self, left: NodeId) {
        if self.node_kind(left) != NodeKind::Ident {
            return;
        }
        let tok = self.tokens[self.nodes[left.index()].start_token.index()];
        let atom = self.intern_token(tok);
        self.retract_name_ref(atom, left);
        self.declare_name(atom);
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    /// `var name [type]: rhs`.
    fn parse_var_decl(&mut self, indent: u32) -> PResult<NodeId> {
        let start = self.token_id();
        self.next_token();
        let name_tok = self.peek();
        let name = self.parse_ident_node(false)?;
        let type_spec = self.parse_optional_type_spec()?;
        self.parse_expected(TokenKind::Colon)?;
        let rhs = self.parse_decl_rhs(indent)?;
        let atom = self.intern_token(name_tok);
        self.declare_name(atom);
        let decl = self.push_node(
            NodeKind::VarDecl,
            start,
            NodeData::VarDecl { name, type_spec, rhs },
        );
        self.static_decls.push(StaticDecl {
            kind: StaticDeclKind::Var,
            node: decl,
        });
        Ok(decl)
    }

    /// `capture name [= rhs]` / `static name [= rhs]`.
    fn parse_local_decl(&mut self, indent: u32, kind: NodeKind) -> PResult<NodeId> {
        let start = self.token_id();
        self.next_token();
        let name_tok = self.peek();
        let name = self.parse_ident_node(false)?;
        let rhs = if self.parse_optional(TokenKind::Equal) {
            self.parse_decl_rhs(indent)?
        } else {
            self.expect_end_of_line()?;
            NodeId::NONE
        };
        let atom = self.intern_token(name_tok);
        self.declare_name(atom);
        Ok(self.push_node(kind, start, NodeData::LocalDecl { name, rhs }))
    }

    /// Right-hand side of a binding: an expression, a `match` statement, or a
    /// multi-line lambda. Consumes through the end of its last line.
    fn parse_decl_rhs(&mut self, indent: u32) -> PResult<NodeId> {
        match self.token() {
            TokenKind::MatchKeyword => self.parse_match_stmt(indent),
            TokenKind::FuncKeyword if self.peek_ahead(1).kind == TokenKind::LeftParen => {
                self.parse_multiline_lambda(indent)
            }
            _ => {
                let expr = self.parse_expr()?;
                self.expect_end_of_line()?;
                Ok(expr)
            }
        }
    }

    /// `type Name enum: ...` / `type Name object: ...` / `type Name Spec`.
    fn parse_type_decl(&mut self, indent: u32) -> PResult<NodeId> {
        let start = self.token_id();
        trace!(pos = self.token_pos(), "parse_type_decl");
        self.next_token();
        let name_tok = self.peek();
        let name = self.parse_ident_node(false)?;
        let decl = match self.token() {
            TokenKind::EnumKeyword => {
                self.next_token();
                self.parse_expected(TokenKind::Colon)?;
                let members = self.parse_enum_members(indent)?;
                let decl = self.push_node(
                    NodeKind::EnumDecl,
                    start,
                    NodeData::EnumDecl { name, members_head: members },
                );
                self.static_decls.push(StaticDecl {
                    kind: StaticDeclKind::Enum,
                    node: decl,
                });
                decl
            }
            TokenKind::ObjectKeyword => {
                self.next_token();
                self.parse_expected(TokenKind::Colon)?;
                let (fields, funcs) = self.parse_object_body(indent)?;
                let decl = self.push_node(
                    NodeKind::ObjectDecl,
                    start,
                    NodeData::ObjectDecl { name, fields_head: fields, funcs_head: funcs },
                );
                self.static_decls.push(StaticDecl {
                    kind: StaticDeclKind::Object,
                    node: decl,
                });
                decl
            }
            _ => {
                let type_spec = self.parse_type_spec()?;
                self.expect_end_of_line()?;
                let decl = self.push_node(
                    NodeKind::TypeAliasDecl,
                    start,
                    NodeData::TypeAlias { name, type_spec },
                );
                self.static_decls.push(StaticDecl {
                    kind: StaticDeclKind::TypeAlias,
                    node: decl,
                });
                decl
            }
        };
        let atom = self.intern_token(name_tok);
        self.declare_name(atom);
        Ok(decl)
    }

    /// Enum members: one bare identifier per line.
    fn parse_enum_members(&mut self, parent_indent: u32) -> PResult<NodeId> {
        let indent = self.begin_indented_block(parent_indent)?;
        let mut head = NodeId::NONE;
        let mut tail = NodeId::NONE;
        loop {
            let start = self.token_id();
            self.parse_expected(TokenKind::Ident)?;
            let member = self.push_node(NodeKind::TagMember, start, NodeData::Empty);
            self.expect_end_of_line()?;
            self.chain(&mut head, &mut tail, member);
            if !self.continue_block(indent)? {
                break;
            }
        }
        Ok(head)
    }

    /// Object body: `name [type]` field lines, then `func` methods.
    fn parse_object_body(&mut self, parent_indent: u32) -> PResult<(NodeId, NodeId)> {
        let indent = self.begin_indented_block(parent_indent)?;
        self.push_block();
        let mut fields_head = NodeId::NONE;
        let mut fields_tail = NodeId::NONE;
        let mut funcs_head = NodeId::NONE;
        let mut funcs_tail = NodeId::NONE;
        let mut seen_func = false;
        loop {
            if self.is_token(TokenKind::FuncKeyword) {
                seen_func = true;
                let prev = self.in_object_decl;
                self.in_object_decl = true;
                let method = self.parse_func_decl(indent);
                self.in_object_decl = prev;
                let method = method?;
                self.chain(&mut funcs_head, &mut funcs_tail, method);
            } else {
                if seen_func {
                    return self.report("Expected `func` declaration.");
                }
                let start = self.token_id();
                let name = self.parse_ident_node(false)?;
                let type_spec = self.parse_optional_type_spec()?;
                self.expect_end_of_line()?;
                let field = self.push_node(
                    NodeKind::ObjectField,
                    start,
                    NodeData::Param { name, type_spec },
                );
                self.chain(&mut fields_head, &mut fields_tail, field);
            }
            if !self.continue_block(indent)? {
                break;
            }
        }
        self.pop_block();
        Ok((fields_head, funcs_head))
    }

    /// `func name(params) [ret]: body` or `func name(params) [ret] = expr`.
    fn parse_func_decl(&mut self, indent: u32) -> PResult<NodeId> {
        let start = self.token_id();
        trace!(pos = self.token_pos(), "parse_func_decl");
        self.next_token();
        let name_tok = self.peek();
        let name = self.parse_ident_node(false)?;
        // Declared in the enclosing block first, so recursive references are
        // not counted as free variables.
        let atom = self.intern_token(name_tok);
        self.declare_name(atom);

        self.push_block();
        let (params_head, num_params) = self.parse_params()?;
        let ret = self.parse_optional_type_spec()?;
        match self.token() {
            TokenKind::Colon => {
                self.next_token();
                let body = self.parse_block(indent)?;
                self.pop_block();
                let decl = self.push_node(
                    NodeKind::FuncDecl,
                    start,
                    NodeData::Func { name, params_head, num_params, ret, body_head: body },
                );
                if !self.in_object_decl {
                    self.static_decls.push(StaticDecl {
                        kind: StaticDeclKind::Func,
                        node: decl,
                    });
                }
                Ok(decl)
            }
            TokenKind::Equal => {
                self.next_token();
                let init = self.parse_expr()?;
                self.pop_block();
                self.expect_end_of_line()?;
                let decl = self.push_node(
                    NodeKind::FuncDeclInit,
                    start,
                    NodeData::FuncInit { name, params_head, num_params, ret, init },
                );
                if !self.in_object_decl {
                    self.static_decls.push(StaticDecl {
                        kind: StaticDeclKind::FuncInit,
                        node: decl,
                    });
                }
                Ok(decl)
            }
            _ => self.report_expected("`:` or `=`"),
        }
    }

    /// `func (params) [ret]: body` multi-line lambda.
    pub(crate) fn parse_multiline_lambda(&mut self, indent: u32) -> PResult<NodeId> {
        let start = self.token_id();
        self.next_token();
        self.push_block();
        let (params_head, num_params) = self.parse_params()?;
        let ret = self.parse_optional_type_spec()?;
        self.parse_expected(TokenKind::Colon)?;
        let body = self.parse_block(indent)?;
        self.pop_block();
        Ok(self.push_node(
            NodeKind::LambdaMulti,
            start,
            NodeData::Func {
                name: NodeId::NONE,
                params_head,
                num_params,
                ret,
                body_head: body,
            },
        ))
    }

    /// `import name "path"`. The specifier must be a plain string literal.
    fn parse_import_stmt(&mut self) -> PResult<NodeId> {
        let start = self.token_id();
        self.next_token();
        let name_tok = self.peek();
        let name = self.parse_ident_node(false)?;
        let spec = self.parse_expr()?;
        if self.node_kind(spec) != NodeKind::String {
            let pos = self.node_pos(spec);
            return self.report_at(pos, "Expected string literal for import specifier.");
        }
        let atom = self.intern_token(name_tok);
        self.declare_name(atom);
        let decl = self.push_node(NodeKind::ImportStmt, start, NodeData::Import { name, spec });
        self.static_decls.push(StaticDecl {
            kind: StaticDeclKind::Import,
            node: decl,
        });
        self.expect_end_of_line()?;
        Ok(decl)
    }

    // =========================================================================
    // Control flow
    // =========================================================================

    /// `if cond: body` with an optional else chain, or the `if cond then a
    /// [else b]` expression used as a statement.
    fn parse_if_stmt(&mut self, indent: u32) -> PResult<NodeId> {
        let start = self.token_id();
        self.next_token();
        let cond = self.parse_binary_expr(0)?;

        if self.is_token(TokenKind::ThenKeyword) {
            let expr = self.parse_if_expr_tail(start, cond)?;
            let stmt = self.push_node(NodeKind::ExprStmt, start, NodeData::Child { child: expr });
            self.expect_end_of_line()?;
            return Ok(stmt);
        }

        self.parse_expected(TokenKind::Colon)?;
        let body = self.parse_block(indent)?;
        let if_node = self.push_node(
            NodeKind::IfStmt,
            start,
            NodeData::If { cond, body_head: body, else_clause: NodeId::NONE },
        );

        // Else clauses attach only when their `else` sits at the same indent
        // as the `if`.
        let mut prev = if_node;
        loop {
            let save = self.next_pos;
            let Some(tok) = self.next_content_line()? else {
                break;
            };
            if tok.indent_width() == indent
                && self.peek_ahead(1).kind == TokenKind::ElseKeyword
            {
                self.check_indent_mixing(&tok)?;
                self.next_token();
                let else_start = self.token_id();
                self.next_token();
                let else_cond = if self.is_token(TokenKind::Colon) {
                    NodeId::NONE
                } else {
                    self.parse_binary_expr(0)?
                };
                self.parse_expected(TokenKind::Colon)?;
                let else_body = self.parse_block(indent)?;
                let clause = self.push_node(
                    NodeKind::ElseClause,
                    else_start,
                    NodeData::If {
                        cond: else_cond,
                        body_head: else_body,
                        else_clause: NodeId::NONE,
                    },
                );
                self.set_else_clause(prev, clause);
                prev = clause;
                if else_cond.is_none() {
                    break;
                }
            } else {
                self.next_pos = save;
                break;
            }
        }
        Ok(if_node)
    }

    /// `while: body` / `while cond: body` / `while opt some v: body`.
    fn parse_while_stmt(&mut self, indent: u32) -> PResult<NodeId> {
        let start = self.token_id();
        self.next_token();
        if self.parse_optional(TokenKind::Colon) {
            let body = self.parse_block(indent)?;
            return Ok(self.push_node(
                NodeKind::WhileStmt,
                start,
                NodeData::While { cond: NodeId::NONE, body_head: body },
            ));
        }
        let cond = self.parse_expr()?;
        if self.parse_optional(TokenKind::SomeKeyword) {
            let cap_tok = self.peek();
            let capture = self.parse_ident_node(false)?;
            let atom = self.intern_token(cap_tok);
            self.declare_name(atom);
            self.parse_expected(TokenKind::Colon)?;
            let body = self.parse_block(indent)?;
            return Ok(self.push_node(
                NodeKind::WhileOptStmt,
                start,
                NodeData::WhileOpt { opt: cond, capture, body_head: body },
            ));
        }
        self.parse_expected(TokenKind::Colon)?;
        let body = self.parse_block(indent)?;
        Ok(self.push_node(
            NodeKind::WhileStmt,
            start,
            NodeData::While { cond, body_head: body },
        ))
    }

    /// `for x: ...` / `for x..y: ...` with optional `each v` / `each k, v`
    /// bindings.
    fn parse_for_stmt(&mut self, indent: u32) -> PResult<NodeId> {
        let start = self.token_id();
        self.next_token();
        let first = self.parse_expr()?;
        let (clause, is_range) = if self.is_token(TokenKind::DotDot) {
            let range_start = self.nodes[first.index()].start_token;
            self.next_token();
            let end = self.parse_expr()?;
            let clause = self.push_node(
                NodeKind::RangeClause,
                range_start,
                NodeData::Range { start: first, end },
            );
            (clause, true)
        } else {
            (first, false)
        };

        let each_clause = if self.is_token(TokenKind::EachKeyword) {
            self.next_token();
            let each_start = self.token_id();
            let first_tok = self.peek();
            let first_bind = self.parse_ident_node(false)?;
            let first_atom = self.intern_token(first_tok);
            let (value, key) = if self.parse_optional(TokenKind::Comma) {
                let second_tok = self.peek();
                let second_bind = self.parse_ident_node(false)?;
                let second_atom = self.intern_token(second_tok);
                self.declare_name(first_atom);
                self.declare_name(second_atom);
                (second_bind, first_bind)
            } else {
                self.declare_name(first_atom);
                (first_bind, NodeId::NONE)
            };
            self.push_node(NodeKind::EachClause, each_start, NodeData::Each { value, key })
        } else {
            NodeId::NONE
        };

        self.parse_expected(TokenKind::Colon)?;
        let body = self.parse_block(indent)?;
        let kind = if is_range {
            NodeKind::ForRangeStmt
        } else {
            NodeKind::ForIterStmt
        };
        Ok(self.push_node(
            kind,
            start,
            NodeData::For { clause, each_clause, body_head: body },
        ))
    }

    /// `match expr:` with one case per line.
    pub(crate) fn parse_match_stmt(&mut self, indent: u32) -> PResult<NodeId> {
        let start = self.token_id();
        self.next_token();
        let expr = self.parse_expr()?;
        self.parse_expected(TokenKind::Colon)?;
        let case_indent = self.begin_indented_block(indent)?;
        let mut head = NodeId::NONE;
        let mut tail = NodeId::NONE;
        loop {
            let case = self.parse_case_clause(case_indent)?;
            self.chain(&mut head, &mut tail, case);
            if !self.continue_block(case_indent)? {
                break;
            }
        }
        Ok(self.push_node(NodeKind::MatchStmt, start, NodeData::Match { expr, cases_head: head }))
    }

    /// One match case: `cond[, cond]*: body` or `else: body`.
    fn parse_case_clause(&mut self, indent: u32) -> PResult<NodeId> {
        let start = self.token_id();
        let conds_head = if self.parse_optional(TokenKind::ElseKeyword) {
            NodeId::NONE
        } else {
            let mut head = NodeId::NONE;
            let mut tail = NodeId::NONE;
            loop {
                let cond = self.parse_expr()?;
                self.chain(&mut head, &mut tail, cond);
                if !self.parse_optional(TokenKind::Comma) {
                    break;
                }
            }
            head
        };
        self.parse_expected(TokenKind::Colon)?;
        let body = self.parse_block(indent)?;
        Ok(self.push_node(
            NodeKind::CaseClause,
            start,
            NodeData::Case { conds_head, body_head: body },
        ))
    }

    /// `try: body` followed by `catch [v]: body` at the same indent.
    fn parse_try_stmt(&mut self, indent: u32) -> PResult<NodeId> {
        let start = self.token_id();
        self.next_token();
        self.parse_expected(TokenKind::Colon)?;
        let body = self.parse_block(indent)?;

        let Some(tok) = self.next_content_line()? else {
            return self.report("Expected `catch` block.");
        };
        if tok.indent_width() != indent || self.peek_ahead(1).kind != TokenKind::CatchKeyword {
            return self.report_at(tok.start, "Expected `catch` block.");
        }
        self.check_indent_mixing(&tok)?;
        self.next_token();
        self.next_token();
        let catch_param = if self.is_token(TokenKind::Ident) {
            let cap_tok = self.peek();
            let param = self.parse_ident_node(false)?;
            let atom = self.intern_token(cap_tok);
            self.declare_name(atom);
            param
        } else {
            NodeId::NONE
        };
        self.parse_expected(TokenKind::Colon)?;
        let catch_body = self.parse_block(indent)?;
        Ok(self.push_node(
            NodeKind::TryStmt,
            start,
            NodeData::Try { body_head: body, catch_param, catch_body_head: catch_body },
        ))
    }
}

fn op_assign_binary_op(op: OperatorKind) -> Option<BinaryOp> {
    match op {
        OperatorKind::Plus => Some(BinaryOp::Plus),
        OperatorKind::Minus => Some(BinaryOp::Minus),
        OperatorKind::Star => Some(BinaryOp::Star),
        OperatorKind::Slash => Some(BinaryOp::Slash),
        _ => None,
    }
}
