//! Expression parsing.
//!
//! Three layers: a tight term is an atom plus postfix member/index/call/
//! initializer operators; a term adds the prefix forms (`not`, `throw`,
//! `try`, the coroutine keywords, unary `-` `~` `!`); binary expressions use
//! precedence climbing, where the right operand is parsed at one precedence
//! level higher so equal-precedence operators fold left.

use veld_scanner::{token_kind_desc, OperatorKind, TokenKind};

use super::base::{NodeId, TokenId};
use super::node::{BinaryOp, NodeData, NodeKind, UnaryOp};
use super::state::{PResult, Parser};

/// Binding power table, higher binds tighter. `as` casts sit between the
/// arithmetic and comparison rows.
enum PendingOp {
    Bin { op: BinaryOp, prec: u8, tokens: usize },
    Cast { prec: u8 },
}

impl Parser {
    // =========================================================================
    // Entry points
    // =========================================================================

    pub(crate) fn parse_expr(&mut self) -> PResult<NodeId> {
        if self.is_token(TokenKind::IfKeyword) {
            return self.parse_if_expr();
        }
        self.parse_binary_expr(0)
    }

    /// `if cond then a [else b]` expression.
    fn parse_if_expr(&mut self) -> PResult<NodeId> {
        let start = self.token_id();
        self.next_token();
        let cond = self.parse_binary_expr(0)?;
        self.parse_if_expr_tail(start, cond)
    }

    /// The `then ...` part; the statement parser calls this after discovering
    /// that an `if` is the expression form.
    pub(crate) fn parse_if_expr_tail(&mut self, start: TokenId, cond: NodeId) -> PResult<NodeId> {
        self.parse_expected(TokenKind::ThenKeyword)?;
        let then_expr = self.parse_expr()?;
        let else_clause = if self.is_token(TokenKind::ElseKeyword) {
            let else_start = self.token_id();
            self.next_token();
            let else_expr = self.parse_expr()?;
            self.push_node(
                NodeKind::ElseClause,
                else_start,
                NodeData::If {
                    cond: NodeId::NONE,
                    body_head: else_expr,
                    else_clause: NodeId::NONE,
                },
            )
        } else {
            NodeId::NONE
        };
        Ok(self.push_node(
            NodeKind::IfExpr,
            start,
            NodeData::If { cond, body_head: then_expr, else_clause },
        ))
    }

    // =========================================================================
    // Binary expressions
    // =========================================================================

    pub(crate) fn parse_binary_expr(&mut self, min_prec: u8) -> PResult<NodeId> {
        self.enter_recursion()?;
        let result = self.parse_binary_expr_inner(min_prec);
        self.exit_recursion();
        result
    }

    fn parse_binary_expr_inner(&mut self, min_prec: u8) -> PResult<NodeId> {
        let start = self.token_id();
        let mut left = self.parse_term_expr()?;
        loop {
            // An operator after a line break continues the expression, but
            // only while parsing a right operand or inside a group; at
            // statement level the newline ends it.
            if min_prec > 0 || self.group_depth > 0 {
                self.skip_line_break_before_operator();
            }
            let Some(pending) = self.peek_binary_op() else {
                break;
            };
            match pending {
                PendingOp::Cast { prec } => {
                    if prec < min_prec {
                        break;
                    }
                    self.next_token();
                    let type_spec = self.parse_type_spec()?;
                    left = self.push_node(
                        NodeKind::CastExpr,
                        start,
                        NodeData::Cast { expr: left, type_spec },
                    );
                }
                PendingOp::Bin { op, prec, tokens } => {
                    if prec < min_prec {
                        break;
                    }
                    for _ in 0..tokens {
                        self.next_token();
                    }
                    if self.group_depth > 0 {
                        self.skip_group_line_breaks();
                    }
                    let right = self.parse_binary_expr(prec + 1)?;
                    left = self.push_node(
                        NodeKind::BinExpr,
                        start,
                        NodeData::Bin { left, op, right },
                    );
                }
            }
        }
        Ok(left)
    }

    fn peek_binary_op(&self) -> Option<PendingOp> {
        match self.token() {
            TokenKind::Operator => {
                let op = self.peek().operator();
                // `+=` and friends lex as operator followed by `=`; those
                // belong to op-assign statements, not binary expressions.
                if matches!(
                    op,
                    OperatorKind::Plus
                        | OperatorKind::Minus
                        | OperatorKind::Star
                        | OperatorKind::Slash
                ) && self.peek_ahead(1).kind == TokenKind::Equal
                {
                    return None;
                }
                let (op, prec) = match op {
                    OperatorKind::LessLess => (BinaryOp::ShiftLeft, 9),
                    OperatorKind::GreaterGreater => (BinaryOp::ShiftRight, 9),
                    OperatorKind::Ampersand => (BinaryOp::BitwiseAnd, 8),
                    OperatorKind::VerticalBar => (BinaryOp::BitwiseOr, 7),
                    OperatorKind::DoubleVerticalBar => (BinaryOp::BitwiseXor, 7),
                    OperatorKind::Caret => (BinaryOp::Caret, 6),
                    OperatorKind::Star => (BinaryOp::Star, 5),
                    OperatorKind::Slash => (BinaryOp::Slash, 5),
                    OperatorKind::Percent => (BinaryOp::Percent, 5),
                    OperatorKind::Plus => (BinaryOp::Plus, 4),
                    OperatorKind::Minus => (BinaryOp::Minus, 4),
                    OperatorKind::Less => (BinaryOp::Less, 2),
                    OperatorKind::LessEqual => (BinaryOp::LessEqual, 2),
                    OperatorKind::Greater => (BinaryOp::Greater, 2),
                    OperatorKind::GreaterEqual => (BinaryOp::GreaterEqual, 2),
                    OperatorKind::EqualEqual => (BinaryOp::EqualEqual, 2),
                    OperatorKind::BangEqual => (BinaryOp::BangEqual, 2),
                    OperatorKind::Bang | OperatorKind::Tilde => return None,
                };
                Some(PendingOp::Bin { op, prec, tokens: 1 })
            }
            TokenKind::AsKeyword => Some(PendingOp::Cast { prec: 3 }),
            TokenKind::IsKeyword => {
                if self.peek_ahead(1).kind == TokenKind::NotKeyword {
                    Some(PendingOp::Bin { op: BinaryOp::BangEqual, prec: 2, tokens: 2 })
                } else {
                    Some(PendingOp::Bin { op: BinaryOp::EqualEqual, prec: 2, tokens: 1 })
                }
            }
            TokenKind::AndKeyword => Some(PendingOp::Bin { op: BinaryOp::And, prec: 1, tokens: 1 }),
            TokenKind::OrKeyword => Some(PendingOp::Bin { op: BinaryOp::Or, prec: 0, tokens: 1 }),
            _ => None,
        }
    }

    fn skip_line_break_before_operator(&mut self) {
        if !self.is_token(TokenKind::NewLine) {
            return;
        }
        let save = self.next_pos;
        while matches!(self.token(), TokenKind::NewLine | TokenKind::Indent) {
            self.next_token();
        }
        if self.peek_binary_op().is_none() {
            self.next_pos = save;
        }
    }

    // =========================================================================
    // Term expressions (prefix forms)
    // =========================================================================

    pub(crate) fn parse_term_expr(&mut self) -> PResult<NodeId> {
        let start = self.token_id();
        match self.token() {
            TokenKind::NotKeyword => {
                self.next_token();
                let child = self.parse_term_expr()?;
                Ok(self.push_node(
                    NodeKind::UnaryExpr,
                    start,
                    NodeData::Unary { child, op: UnaryOp::Not },
                ))
            }
            TokenKind::ThrowKeyword => {
                self.next_token();
                let child = self.parse_term_expr()?;
                Ok(self.push_node(NodeKind::ThrowExpr, start, NodeData::Child { child }))
            }
            TokenKind::TryKeyword => {
                self.next_token();
                let expr = self.parse_term_expr()?;
                let else_expr = if self.parse_optional(TokenKind::ElseKeyword) {
                    self.parse_term_expr()?
                } else {
                    NodeId::NONE
                };
                Ok(self.push_node(NodeKind::TryExpr, start, NodeData::TryExpr { expr, else_expr }))
            }
            TokenKind::CoresumeKeyword => {
                self.next_token();
                let child = self.parse_term_expr()?;
                Ok(self.push_node(NodeKind::CoresumeExpr, start, NodeData::Child { child }))
            }
            TokenKind::CoinitKeyword => {
                self.next_token();
                let child = self.parse_term_expr()?;
                Ok(self.push_node(NodeKind::CoinitExpr, start, NodeData::Child { child }))
            }
            TokenKind::CoyieldKeyword => {
                self.next_token();
                let child = if self.token_starts_term() {
                    self.parse_term_expr()?
                } else {
                    NodeId::NONE
                };
                Ok(self.push_node(NodeKind::CoyieldExpr, start, NodeData::Child { child }))
            }
            TokenKind::Operator => match self.peek().operator() {
                OperatorKind::Minus => {
                    self.next_token();
                    let child = self.parse_term_expr()?;
                    Ok(self.push_node(
                        NodeKind::UnaryExpr,
                        start,
                        NodeData::Unary { child, op: UnaryOp::Minus },
                    ))
                }
                OperatorKind::Bang => {
                    self.next_token();
                    let child = self.parse_term_expr()?;
                    Ok(self.push_node(
                        NodeKind::UnaryExpr,
                        start,
                        NodeData::Unary { child, op: UnaryOp::Not },
                    ))
                }
                OperatorKind::Tilde => {
                    self.next_token();
                    let child = self.parse_term_expr()?;
                    Ok(self.push_node(
                        NodeKind::UnaryExpr,
                        start,
                        NodeData::Unary { child, op: UnaryOp::BitwiseNot },
                    ))
                }
                _ => self.report_expected("expression"),
            },
            _ => self.parse_tight_term(),
        }
    }

    fn token_starts_term(&self) -> bool {
        match self.token() {
            TokenKind::Ident
            | TokenKind::Number
            | TokenKind::NonDecimalInt
            | TokenKind::String
            | TokenKind::TemplateString
            | TokenKind::Symbol
            | TokenKind::TrueKeyword
            | TokenKind::FalseKeyword
            | TokenKind::NoneKeyword
            | TokenKind::ErrorKeyword
            | TokenKind::LeftParen
            | TokenKind::LeftBracket
            | TokenKind::LeftBrace
            | TokenKind::At
            | TokenKind::NotKeyword
            | TokenKind::ThrowKeyword
            | TokenKind::TryKeyword
            | TokenKind::CoinitKeyword
            | TokenKind::CoyieldKeyword
            | TokenKind::CoresumeKeyword => true,
            TokenKind::Operator => matches!(
                self.peek().operator(),
                OperatorKind::Minus | OperatorKind::Bang | OperatorKind::Tilde
            ),
            _ => false,
        }
    }

    // =========================================================================
    // Tight terms (atom + postfix chain)
    // =========================================================================

    pub(crate) fn parse_tight_term(&mut self) -> PResult<NodeId> {
        let start = self.token_id();
        let mut left = self.parse_atom()?;
        loop {
            match self.token() {
                TokenKind::Dot => {
                    self.next_token();
                    let member = self.parse_ident_node(false)?;
                    left = self.push_node(
                        NodeKind::AccessExpr,
                        start,
                        NodeData::Access { left, right: member },
                    );
                }
                TokenKind::LeftBracket => {
                    left = self.parse_index_or_slice(start, left)?;
                }
                TokenKind::LeftParen => {
                    left = self.parse_call_args(start, left)?;
                }
                TokenKind::LeftBrace
                    if matches!(self.node_kind(left), NodeKind::Ident | NodeKind::AccessExpr) =>
                {
                    left = self.parse_object_init(start, left)?;
                }
                _ => break,
            }
        }
        Ok(left)
    }

    /// `left[index]` or `left[a..b]` with either slice bound optional.
    fn parse_index_or_slice(&mut self, start: TokenId, left: NodeId) -> PResult<NodeId> {
        self.next_token();
        self.group_depth += 1;
        self.skip_group_line_breaks();
        let node = if self.is_token(TokenKind::DotDot) {
            self.next_token();
            let end = if self.is_token(TokenKind::RightBracket) {
                NodeId::NONE
            } else {
                self.parse_expr()?
            };
            self.push_node(
                NodeKind::SliceExpr,
                start,
                NodeData::SliceOp { left, start: NodeId::NONE, end },
            )
        } else {
            let first = self.parse_expr()?;
            if self.is_token(TokenKind::DotDot) {
                self.next_token();
                let end = if self.is_token(TokenKind::RightBracket) {
                    NodeId::NONE
                } else {
                    self.parse_expr()?
                };
                self.push_node(
                    NodeKind::SliceExpr,
                    start,
                    NodeData::SliceOp { left, start: first, end },
                )
            } else {
                self.push_node(NodeKind::IndexExpr, start, NodeData::IndexOp { left, index: first })
            }
        };
        self.skip_group_line_breaks();
        self.parse_expected(TokenKind::RightBracket)?;
        self.group_depth -= 1;
        Ok(node)
    }

    /// Parenthesized call arguments, with `ident:` named-argument form.
    fn parse_call_args(&mut self, start: TokenId, callee: NodeId) -> PResult<NodeId> {
        self.next_token();
        self.group_depth += 1;
        self.skip_group_line_breaks();
        let mut head = NodeId::NONE;
        let mut tail = NodeId::NONE;
        let mut num_args: u8 = 0;
        let mut has_named_arg = false;
        while !self.is_token(TokenKind::RightParen) {
            let arg = if self.is_token(TokenKind::Ident)
                && self.peek_ahead(1).kind == TokenKind::Colon
            {
                let arg_start = self.token_id();
                let name = self.parse_ident_node(false)?;
                self.next_token();
                let value = self.parse_expr()?;
                has_named_arg = true;
                self.push_node(NodeKind::NamedArg, arg_start, NodeData::NamedArg { name, value })
            } else {
                self.parse_expr()?
            };
            self.chain(&mut head, &mut tail, arg);
            num_args = num_args.saturating_add(1);
            self.skip_group_line_breaks();
            if !self.parse_optional(TokenKind::Comma) {
                break;
            }
            self.skip_group_line_breaks();
        }
        self.parse_expected(TokenKind::RightParen)?;
        self.group_depth -= 1;
        Ok(self.push_node(
            NodeKind::CallExpr,
            start,
            NodeData::Call { callee, args_head: head, num_args, has_named_arg },
        ))
    }

    /// `Type{field: value, ...}` initializer; the left side is an identifier
    /// or access path.
    fn parse_object_init(&mut self, start: TokenId, name: NodeId) -> PResult<NodeId> {
        self.next_token();
        self.group_depth += 1;
        self.skip_group_line_breaks();
        let entries = self.parse_map_entries(TokenKind::RightBrace)?;
        self.parse_expected(TokenKind::RightBrace)?;
        self.group_depth -= 1;
        Ok(self.push_node(
            NodeKind::ObjectInit,
            start,
            NodeData::ObjectInit { name, entries_head: entries },
        ))
    }

    /// Comma-separated `key: value` entries, shared by map literals and
    /// object initializers. Stops before `close`.
    fn parse_map_entries(&mut self, close: TokenKind) -> PResult<NodeId> {
        let mut head = NodeId::NONE;
        let mut tail = NodeId::NONE;
        while !self.is_token(close) {
            let entry_start = self.token_id();
            let key = if self.is_token(TokenKind::Ident) {
                self.parse_ident_node(false)?
            } else {
                self.parse_expr()?
            };
            self.parse_expected(TokenKind::Colon)?;
            let value = self.parse_expr()?;
            let entry =
                self.push_node(NodeKind::MapEntry, entry_start, NodeData::MapEntry { key, value });
            self.chain(&mut head, &mut tail, entry);
            self.skip_group_line_breaks();
            if !self.parse_optional(TokenKind::Comma) {
                break;
            }
            self.skip_group_line_breaks();
        }
        Ok(head)
    }

    // =========================================================================
    // Atoms
    // =========================================================================

    fn parse_atom(&mut self) -> PResult<NodeId> {
        let start = self.token_id();
        match self.token() {
            TokenKind::Ident => {
                if self.peek_ahead(1).kind == TokenKind::EqualGreater {
                    return self.parse_ident_lambda();
                }
                let tok = self.peek();
                let id = self.push_node(NodeKind::Ident, start, NodeData::Empty);
                self.next_token();
                let atom = self.intern_token(tok);
                self.record_name_ref(atom, id);
                Ok(id)
            }
            TokenKind::Number => self.parse_literal(NodeKind::Number),
            TokenKind::NonDecimalInt => self.parse_literal(NodeKind::NonDecimalInt),
            TokenKind::String => self.parse_literal(NodeKind::String),
            TokenKind::Symbol => self.parse_literal(NodeKind::Symbol),
            TokenKind::TrueKeyword => self.parse_literal(NodeKind::TrueLiteral),
            TokenKind::FalseKeyword => self.parse_literal(NodeKind::FalseLiteral),
            TokenKind::NoneKeyword => self.parse_literal(NodeKind::NoneLiteral),
            TokenKind::TemplateString => self.parse_template_string(),
            TokenKind::ErrorKeyword => {
                self.next_token();
                self.parse_expected(TokenKind::Dot)?;
                let name = self.parse_ident_node(false)?;
                Ok(self.push_node(NodeKind::ErrorSymbol, start, NodeData::Child { child: name }))
            }
            TokenKind::At => {
                self.next_token();
                let child = self.parse_tight_term()?;
                Ok(self.push_node(NodeKind::AtExpr, start, NodeData::Child { child }))
            }
            TokenKind::LeftParen => self.parse_group_or_lambda(),
            TokenKind::LeftBracket => self.parse_list_literal(),
            TokenKind::LeftBrace => self.parse_map_literal(),
            _ => {
                let tok = self.peek();
                let msg = format!(
                    "Unknown token: {} at position {}.",
                    token_kind_desc(tok.kind),
                    tok.start
                );
                self.report_at(tok.start, msg)
            }
        }
    }

    fn parse_literal(&mut self, kind: NodeKind) -> PResult<NodeId> {
        let id = self.push_node(kind, self.token_id(), NodeData::Empty);
        self.next_token();
        Ok(id)
    }

    /// Interleaved template parts: string segments and interpolated
    /// expressions, chained in source order.
    fn parse_template_string(&mut self) -> PResult<NodeId> {
        let start = self.token_id();
        let mut head = NodeId::NONE;
        let mut tail = NodeId::NONE;
        let seg = self.push_node(NodeKind::String, self.token_id(), NodeData::Empty);
        self.next_token();
        self.chain(&mut head, &mut tail, seg);
        loop {
            match self.token() {
                TokenKind::TemplateExprStart => {
                    self.next_token();
                    let expr = self.parse_expr()?;
                    self.parse_expected(TokenKind::RightBrace)?;
                    self.chain(&mut head, &mut tail, expr);
                }
                TokenKind::TemplateString => {
                    let seg = self.push_node(NodeKind::String, self.token_id(), NodeData::Empty);
                    self.next_token();
                    self.chain(&mut head, &mut tail, seg);
                }
                _ => break,
            }
        }
        Ok(self.push_node(NodeKind::TemplateString, start, NodeData::Children { head }))
    }

    /// `[a, b, c]` list literal.
    fn parse_list_literal(&mut self) -> PResult<NodeId> {
        let start = self.token_id();
        self.next_token();
        self.group_depth += 1;
        self.skip_group_line_breaks();
        let mut head = NodeId::NONE;
        let mut tail = NodeId::NONE;
        while !self.is_token(TokenKind::RightBracket) {
            let elem = self.parse_expr()?;
            self.chain(&mut head, &mut tail, elem);
            self.skip_group_line_breaks();
            if !self.parse_optional(TokenKind::Comma) {
                break;
            }
            self.skip_group_line_breaks();
        }
        self.parse_expected(TokenKind::RightBracket)?;
        self.group_depth -= 1;
        Ok(self.push_node(NodeKind::ListLiteral, start, NodeData::Children { head }))
    }

    /// `{key: value, ...}` map literal.
    fn parse_map_literal(&mut self) -> PResult<NodeId> {
        let start = self.token_id();
        self.next_token();
        self.group_depth += 1;
        self.skip_group_line_breaks();
        let entries = self.parse_map_entries(TokenKind::RightBrace)?;
        self.parse_expected(TokenKind::RightBrace)?;
        self.group_depth -= 1;
        Ok(self.push_node(NodeKind::MapLiteral, start, NodeData::Children { head: entries }))
    }

    // =========================================================================
    // Lambdas and groups
    // =========================================================================

    /// `ident => expr` single-parameter lambda.
    fn parse_ident_lambda(&mut self) -> PResult<NodeId> {
        let start = self.token_id();
        let name_tok = self.peek();
        self.push_block();
        let name = self.push_node(NodeKind::Ident, start, NodeData::Empty);
        let param = self.push_node(
            NodeKind::FuncParam,
            start,
            NodeData::Param { name, type_spec: NodeId::NONE },
        );
        self.next_token();
        let atom = self.intern_token(name_tok);
        self.declare_name(atom);
        self.next_token(); // =>
        let body = self.parse_expr()?;
        self.pop_block();
        Ok(self.push_node(
            NodeKind::LambdaExpr,
            start,
            NodeData::Lambda { params_head: param, num_params: 1, body },
        ))
    }

    /// `(` either opens a group or a lambda parameter list. The expression
    /// attempt wins unless a comma (or a parameter type) appears, or the
    /// closing paren is followed by `=>`; then the parser rewinds to the
    /// opening paren and re-parses as parameters.
    fn parse_group_or_lambda(&mut self) -> PResult<NodeId> {
        let start = self.token_id();
        let paren_pos = self.next_pos;
        let node_len = self.nodes.len();
        self.next_token();

        if self.is_token(TokenKind::RightParen) {
            // `() => expr`
            self.next_token();
            self.parse_expected(TokenKind::EqualGreater)?;
            self.push_block();
            let body = self.parse_expr()?;
            self.pop_block();
            return Ok(self.push_node(
                NodeKind::LambdaExpr,
                start,
                NodeData::Lambda { params_head: NodeId::NONE, num_params: 0, body },
            ));
        }

        self.group_depth += 1;
        self.skip_group_line_breaks();
        let expr = self.parse_expr()?;
        self.skip_group_line_breaks();
        match self.token() {
            TokenKind::Comma | TokenKind::Ident => {
                self.group_depth -= 1;
                self.next_pos = paren_pos;
                self.rewind_nodes(node_len);
                self.parse_paren_lambda(start)
            }
            TokenKind::RightParen => {
                self.next_token();
                self.group_depth -= 1;
                if self.is_token(TokenKind::EqualGreater) {
                    self.next_pos = paren_pos;
                    self.rewind_nodes(node_len);
                    self.parse_paren_lambda(start)
                } else {
                    Ok(self.push_node(NodeKind::Group, start, NodeData::Child { child: expr }))
                }
            }
            _ => self.report_expected("`)`"),
        }
    }

    /// `(params) => expr`, after rewinding to the opening paren.
    fn parse_paren_lambda(&mut self, start: TokenId) -> PResult<NodeId> {
        self.push_block();
        let (params_head, num_params) = self.parse_params()?;
        self.parse_expected(TokenKind::EqualGreater)?;
        let body = self.parse_expr()?;
        self.pop_block();
        Ok(self.push_node(
            NodeKind::LambdaExpr,
            start,
            NodeData::Lambda { params_head, num_params, body },
        ))
    }

    /// Parenthesized parameter list: `(name [type], ...)`. Declares each
    /// parameter into the innermost block.
    pub(crate) fn parse_params(&mut self) -> PResult<(NodeId, u8)> {
        self.parse_expected(TokenKind::LeftParen)?;
        self.group_depth += 1;
        self.skip_group_line_breaks();
        let mut head = NodeId::NONE;
        let mut tail = NodeId::NONE;
        let mut num: u8 = 0;
        while !self.is_token(TokenKind::RightParen) {
            let param_start = self.token_id();
            let name_tok = self.peek();
            let name = self.parse_ident_node(false)?;
            let atom = self.intern_token(name_tok);
            self.declare_name(atom);
            let type_spec = self.parse_optional_type_spec()?;
            let param = self.push_node(
                NodeKind::FuncParam,
                param_start,
                NodeData::Param { name, type_spec },
            );
            self.chain(&mut head, &mut tail, param);
            num = num.saturating_add(1);
            self.skip_group_line_breaks();
            if !self.parse_optional(TokenKind::Comma) {
                break;
            }
            self.skip_group_line_breaks();
        }
        self.parse_expected(TokenKind::RightParen)?;
        self.group_depth -= 1;
        Ok((head, num))
    }

    // =========================================================================
    // Shared helpers
    // =========================================================================

    /// Identifier node; records a free-name reference when `record_dep` is
    /// set (expression leaves), and not for binding or member positions.
    pub(crate) fn parse_ident_node(&mut self, record_dep: bool) -> PResult<NodeId> {
        if !self.is_token(TokenKind::Ident) {
            return self.report_expected("identifier");
        }
        let tok = self.peek();
        let id = self.push_node(NodeKind::Ident, self.token_id(), NodeData::Empty);
        self.next_token();
        if record_dep {
            let atom = self.intern_token(tok);
            self.record_name_ref(atom, id);
        }
        Ok(id)
    }

    /// Type specifier: identifier or dotted access path.
    pub(crate) fn parse_type_spec(&mut self) -> PResult<NodeId> {
        let start = self.token_id();
        if !self.is_token(TokenKind::Ident) {
            return self.report_expected("type name");
        }
        let mut left = self.push_node(NodeKind::Ident, start, NodeData::Empty);
        self.next_token();
        while self.is_token(TokenKind::Dot) {
            self.next_token();
            let member = self.parse_ident_node(false)?;
            left = self.push_node(
                NodeKind::AccessExpr,
                start,
                NodeData::Access { left, right: member },
            );
        }
        Ok(left)
    }

    pub(crate) fn parse_optional_type_spec(&mut self) -> PResult<NodeId> {
        if self.is_token(TokenKind::Ident) {
            self.parse_type_spec()
        } else {
            Ok(NodeId::NONE)
        }
    }

    /// Whether the current token can begin a no-paren call argument.
    pub(crate) fn token_starts_no_paren_arg(&self) -> bool {
        matches!(
            self.token(),
            TokenKind::Ident
                | TokenKind::Number
                | TokenKind::NonDecimalInt
                | TokenKind::String
                | TokenKind::TemplateString
                | TokenKind::Symbol
                | TokenKind::TrueKeyword
                | TokenKind::FalseKeyword
                | TokenKind::NoneKeyword
                | TokenKind::ErrorKeyword
                | TokenKind::LeftBracket
        )
    }

    /// `callee arg arg ...` call form, terminated by the end of the line.
    pub(crate) fn parse_no_paren_call(
        &mut self,
        start: TokenId,
        callee: NodeId,
    ) -> PResult<NodeId> {
        let mut head = NodeId::NONE;
        let mut tail = NodeId::NONE;
        let mut num_args: u8 = 0;
        loop {
            let arg = self.parse_tight_term()?;
            self.chain(&mut head, &mut tail, arg);
            num_args = num_args.saturating_add(1);
            if !self.token_starts_no_paren_arg() {
                break;
            }
        }
        Ok(self.push_node(
            NodeKind::CallExpr,
            start,
            NodeData::Call { callee, args_head: head, num_args, has_named_arg: false },
        ))
    }

    pub(crate) fn skip_group_line_breaks(&mut self) {
        while matches!(self.token(), TokenKind::NewLine | TokenKind::Indent) {
            self.next_token();
        }
    }
}
