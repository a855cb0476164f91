//! Parser state and result views.
//!
//! The parser is long-lived: it owns growable buffers for tokens, nodes, the
//! block stack, the dependency map, and the static-declaration list, and
//! clears-but-retains them between `parse` calls. `ParseResult` borrows those
//! buffers; `dupe` deep-copies a result for callers that outlive the parser.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;
use veld_common::limits::MAX_PARSE_RECURSION_DEPTH;
use veld_common::{Atom, Diagnostic, Interner};
use veld_scanner::{token_kind_desc, Token, TokenKind, TokenizeOptions, Tokenizer};

use super::base::{NodeId, TokenId};
use super::node::{Node, NodeData, NodeKind, StaticDecl};

/// Error sentinel for parser productions. The diagnostic itself is recorded
/// on the parser (first error wins); productions just unwind with `?`.
#[derive(Debug)]
pub(crate) struct ParseFailure;

pub(crate) type PResult<T> = Result<T, ParseFailure>;

/// One lexical scope: the set of names declared in it.
#[derive(Default)]
pub(crate) struct BlockFrame {
    pub(crate) vars: FxHashSet<Atom>,
}

// =============================================================================
// Parser
// =============================================================================

/// Recursive-descent parser for Veld source.
///
/// Not safe for concurrent `parse` calls, but safe to reuse sequentially; a
/// parse either runs to completion or stops at the first error.
pub struct Parser {
    pub(crate) src: String,
    pub(crate) name: String,
    pub(crate) tokens: Vec<Token>,
    pub(crate) nodes: Vec<Node>,
    /// Token cursor.
    pub(crate) next_pos: usize,
    pub(crate) block_stack: Vec<BlockFrame>,
    /// Free name -> node id of its first reference.
    pub(crate) deps: FxHashMap<Atom, NodeId>,
    pub(crate) static_decls: Vec<StaticDecl>,
    pub(crate) interner: Interner,
    // Error state; `err_msg` is a retained buffer.
    pub(crate) err_msg: String,
    pub(crate) err_pos: u32,
    pub(crate) has_err: bool,
    pub(crate) is_token_err: bool,
    // Parse-local context.
    pub(crate) recursion_depth: u32,
    /// Established indentation style, once a nonzero indent has been seen.
    pub(crate) indent_is_tabs: Option<bool>,
    /// Nesting inside parens/brackets, where line breaks are tolerated.
    pub(crate) group_depth: u32,
    /// Set while parsing methods of an object declaration.
    pub(crate) in_object_decl: bool,
}

impl Parser {
    pub fn new() -> Parser {
        Parser {
            src: String::new(),
            name: String::new(),
            tokens: Vec::with_capacity(256),
            nodes: Vec::with_capacity(256),
            next_pos: 0,
            block_stack: Vec::with_capacity(8),
            deps: FxHashMap::default(),
            static_decls: Vec::new(),
            interner: Interner::new(),
            err_msg: String::with_capacity(64),
            err_pos: 0,
            has_err: false,
            is_token_err: false,
            recursion_depth: 0,
            indent_is_tabs: None,
            group_depth: 0,
            in_object_decl: false,
        }
    }

    /// Parse `src`, producing a result view that borrows this parser.
    ///
    /// The previous parse's buffers are cleared and reused.
    pub fn parse(&mut self, name: &str, src: &str) -> ParseResult<'_> {
        trace!(name, src_len = src.len(), "parse");
        self.reset(name, src);

        let mut tokenizer = Tokenizer::new(&self.src);
        if let Err(diag) = tokenizer.tokenize(&mut self.tokens, TokenizeOptions::default()) {
            self.has_err = true;
            self.is_token_err = true;
            self.err_pos = diag.pos;
            self.err_msg.push_str(&diag.message);
            return self.make_result(NodeId::NONE);
        }
        trace!(tokens = self.tokens.len(), "tokenize complete");

        let root = match self.parse_root() {
            Ok(id) => id,
            Err(ParseFailure) => NodeId::NONE,
        };
        self.make_result(root)
    }

    /// Like `parse`, but converts a recorded error into a failure.
    pub fn parse_no_err(&mut self, name: &str, src: &str) -> Result<ParseResult<'_>, Diagnostic> {
        let has_err = self.parse(name, src).has_error;
        if has_err {
            let diag = if self.is_token_err {
                Diagnostic::tokenizer(self.err_pos, self.err_msg.clone())
            } else {
                Diagnostic::parser(self.err_pos, self.err_msg.clone())
            };
            return Err(diag);
        }
        let root = self.root_node_id();
        Ok(self.make_result(root))
    }

    fn root_node_id(&self) -> NodeId {
        // The root node is pushed last, after its statement chain.
        match self.nodes.last() {
            Some(node) if node.kind == NodeKind::Root => NodeId(self.nodes.len() as u32 - 1),
            _ => NodeId::NONE,
        }
    }

    fn reset(&mut self, name: &str, src: &str) {
        self.src.clear();
        self.src.push_str(src);
        self.name.clear();
        self.name.push_str(name);
        self.tokens.clear();
        self.nodes.clear();
        self.next_pos = 0;
        self.block_stack.clear();
        self.deps.clear();
        self.static_decls.clear();
        self.interner.clear();
        self.err_msg.clear();
        self.err_pos = 0;
        self.has_err = false;
        self.is_token_err = false;
        self.recursion_depth = 0;
        self.indent_is_tabs = None;
        self.group_depth = 0;
        self.in_object_decl = false;
    }

    fn make_result(&self, root: NodeId) -> ParseResult<'_> {
        ParseResult {
            has_error: self.has_err,
            is_token_error: self.is_token_err,
            err_msg: &self.err_msg,
            err_pos: self.err_pos,
            root_id: root,
            nodes: &self.nodes,
            tokens: &self.tokens,
            src: &self.src,
            name: &self.name,
            static_decls: &self.static_decls,
            deps: &self.deps,
            interner: &self.interner,
        }
    }

    // =========================================================================
    // Token utilities
    // =========================================================================

    /// Current token, or a `None`-kind sentinel past the end of the stream.
    #[inline]
    pub(crate) fn peek(&self) -> Token {
        self.peek_ahead(0)
    }

    #[inline]
    pub(crate) fn peek_ahead(&self, n: usize) -> Token {
        match self.tokens.get(self.next_pos + n) {
            Some(&tok) => tok,
            None => Token::new(
                TokenKind::None,
                self.src.len() as u32,
                veld_scanner::TokenPayload::None,
            ),
        }
    }

    /// Current token kind.
    #[inline]
    pub(crate) fn token(&self) -> TokenKind {
        self.peek().kind
    }

    #[inline]
    pub(crate) fn is_token(&self, kind: TokenKind) -> bool {
        self.token() == kind
    }

    #[inline]
    pub(crate) fn next_token(&mut self) {
        self.next_pos += 1;
    }

    /// Index of the current token.
    #[inline]
    pub(crate) fn token_id(&self) -> TokenId {
        TokenId(self.next_pos as u32)
    }

    /// Start byte of the current token.
    #[inline]
    pub(crate) fn token_pos(&self) -> u32 {
        self.peek().start
    }

    /// Consume the current token if it has the given kind.
    pub(crate) fn parse_optional(&mut self, kind: TokenKind) -> bool {
        if self.is_token(kind) {
            self.next_token();
            true
        } else {
            false
        }
    }

    /// Consume a token of the given kind or report an error.
    pub(crate) fn parse_expected(&mut self, kind: TokenKind) -> PResult<()> {
        if self.is_token(kind) {
            self.next_token();
            Ok(())
        } else {
            self.report_expected(token_kind_desc(kind))
        }
    }

    /// Consume the end of the current line (newline or end of file).
    pub(crate) fn expect_end_of_line(&mut self) -> PResult<()> {
        match self.token() {
            TokenKind::NewLine => {
                self.next_token();
                Ok(())
            }
            TokenKind::None => Ok(()),
            _ => self.report_expected("end of line"),
        }
    }

    /// Byte position of a node, via its start token.
    pub(crate) fn node_pos(&self, id: NodeId) -> u32 {
        let tok = self.nodes[id.index()].start_token;
        match self.tokens.get(tok.index()) {
            Some(t) => t.start,
            None => self.src.len() as u32,
        }
    }

    pub(crate) fn node_kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id.index()].kind
    }

    // =========================================================================
    // Error reporting
    // =========================================================================

    pub(crate) fn report<T>(&mut self, message: impl Into<String>) -> PResult<T> {
        let pos = self.token_pos();
        self.report_at(pos, message)
    }

    pub(crate) fn report_at<T>(&mut self, pos: u32, message: impl Into<String>) -> PResult<T> {
        if !self.has_err {
            self.has_err = true;
            self.is_token_err = false;
            self.err_pos = pos;
            self.err_msg.push_str(&message.into());
        }
        Err(ParseFailure)
    }

    pub(crate) fn report_expected<T>(&mut self, expected: &str) -> PResult<T> {
        let tok = self.peek();
        let msg = format!(
            "Expected {expected}, found {} at position {}.",
            token_kind_desc(tok.kind),
            tok.start
        );
        self.report_at(tok.start, msg)
    }

    // =========================================================================
    // Recursion guard
    // =========================================================================

    pub(crate) fn enter_recursion(&mut self) -> PResult<()> {
        self.recursion_depth += 1;
        if self.recursion_depth > MAX_PARSE_RECURSION_DEPTH {
            return self.report("Maximum expression nesting depth exceeded.");
        }
        Ok(())
    }

    pub(crate) fn exit_recursion(&mut self) {
        self.recursion_depth = self.recursion_depth.saturating_sub(1);
    }

    // =========================================================================
    // Node construction
    // =========================================================================

    pub(crate) fn push_node(
        &mut self,
        kind: NodeKind,
        start_token: TokenId,
        data: NodeData,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(kind, start_token, data));
        id
    }

    /// Append `id` to a sibling chain.
    pub(crate) fn chain(&mut self, head: &mut NodeId, tail: &mut NodeId, id: NodeId) {
        if head.is_none() {
            *head = id;
        } else {
            self.nodes[tail.index()].next = id;
        }
        *tail = id;
    }

    /// Link the next clause of an if/else chain.
    pub(crate) fn set_else_clause(&mut self, id: NodeId, clause: NodeId) {
        if let NodeData::If { else_clause, .. } = &mut self.nodes[id.index()].data {
            *else_clause = clause;
        }
    }

    // =========================================================================
    // Blocks and dependency tracking
    // =========================================================================

    pub(crate) fn push_block(&mut self) {
        self.block_stack.push(BlockFrame::default());
    }

    pub(crate) fn pop_block(&mut self) {
        self.block_stack.pop();
    }

    /// Declare a name in the innermost block.
    pub(crate) fn declare_name(&mut self, atom: Atom) {
        if let Some(frame) = self.block_stack.last_mut() {
            frame.vars.insert(atom);
        }
    }

    /// Top-down search of the block stack.
    pub(crate) fn is_name_declared(&self, atom: Atom) -> bool {
        self.block_stack
            .iter()
            .rev()
            .any(|frame| frame.vars.contains(&atom))
    }

    pub(crate) fn intern_token(&mut self, tok: Token) -> Atom {
        self.interner
            .intern(&self.src[tok.start as usize..tok.end() as usize])
    }

    /// Record a free-name reference unless some enclosing block declares it.
    /// Only the first reference is kept.
    pub(crate) fn record_name_ref(&mut self, atom: Atom, node: NodeId) {
        if !self.is_name_declared(atom) {
            self.deps.entry(atom).or_insert(node);
        }
    }

    /// Retract a dependency entry, but only when `node` is the entry's exact
    /// first reference; a later shadow must not cancel a real dependency.
    pub(crate) fn retract_name_ref(&mut self, atom: Atom, node: NodeId) {
        if self.deps.get(&atom) == Some(&node) {
            self.deps.remove(&atom);
        }
    }

    /// Drop backtracked nodes and any dependency entries they introduced.
    /// Used when a parenthesized expression is re-parsed as a lambda
    /// parameter list.
    pub(crate) fn rewind_nodes(&mut self, node_len: usize) {
        self.nodes.truncate(node_len);
        let limit = node_len as u32;
        self.deps.retain(|_, id| id.0 < limit);
    }
}

impl Default for Parser {
    fn default() -> Parser {
        Parser::new()
    }
}

// =============================================================================
// Results
// =============================================================================

/// A parse result borrowing the parser's buffers.
///
/// Valid until the next `parse` call on the same parser; use `dupe` to
/// outlive it.
pub struct ParseResult<'p> {
    pub has_error: bool,
    /// Whether the error came from the tokenizer rather than the parser.
    pub is_token_error: bool,
    pub err_msg: &'p str,
    pub err_pos: u32,
    pub root_id: NodeId,
    pub nodes: &'p [Node],
    pub tokens: &'p [Token],
    pub src: &'p str,
    pub name: &'p str,
    pub static_decls: &'p [StaticDecl],
    deps: &'p FxHashMap<Atom, NodeId>,
    interner: &'p Interner,
}

impl<'p> ParseResult<'p> {
    /// Node id of the first reference to a free name, if the name is free.
    pub fn dep(&self, name: &str) -> Option<NodeId> {
        let atom = self.interner.lookup(name)?;
        self.deps.get(&atom).copied()
    }

    /// All free names with their first-reference node ids.
    pub fn deps(&self) -> impl Iterator<Item = (&'p str, NodeId)> + '_ {
        self.deps
            .iter()
            .map(|(&atom, &node)| (self.interner.resolve(atom), node))
    }

    pub fn deps_len(&self) -> usize {
        self.deps.len()
    }

    /// Lexeme text of a variable-length token.
    pub fn token_text(&self, tok: &Token) -> &'p str {
        &self.src[tok.start as usize..tok.end() as usize]
    }

    /// Deep-copy into freshly owned storage, independent of the parser.
    pub fn dupe(&self) -> OwnedParseResult {
        OwnedParseResult {
            has_error: self.has_error,
            is_token_error: self.is_token_error,
            err_msg: self.err_msg.to_string(),
            err_pos: self.err_pos,
            root_id: self.root_id,
            nodes: self.nodes.to_vec(),
            tokens: self.tokens.to_vec(),
            src: self.src.to_string(),
            name: self.name.to_string(),
            static_decls: self.static_decls.to_vec(),
            deps: self.deps.clone(),
            interner: self.interner.clone(),
        }
    }
}

/// A parse result with owned storage, produced by `ParseResult::dupe`.
pub struct OwnedParseResult {
    pub has_error: bool,
    pub is_token_error: bool,
    pub err_msg: String,
    pub err_pos: u32,
    pub root_id: NodeId,
    pub nodes: Vec<Node>,
    pub tokens: Vec<Token>,
    pub src: String,
    pub name: String,
    pub static_decls: Vec<StaticDecl>,
    deps: FxHashMap<Atom, NodeId>,
    interner: Interner,
}

impl OwnedParseResult {
    pub fn dep(&self, name: &str) -> Option<NodeId> {
        let atom = self.interner.lookup(name)?;
        self.deps.get(&atom).copied()
    }

    pub fn deps(&self) -> impl Iterator<Item = (&str, NodeId)> + '_ {
        self.deps
            .iter()
            .map(|(&atom, &node)| (self.interner.resolve(atom), node))
    }

    pub fn deps_len(&self) -> usize {
        self.deps.len()
    }

    pub fn token_text(&self, tok: &Token) -> &str {
        &self.src[tok.start as usize..tok.end() as usize]
    }
}
