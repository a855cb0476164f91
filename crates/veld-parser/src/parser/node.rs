//! Flat AST node model.
//!
//! Each node is a packed record: kind tag, the index of the first token that
//! produced it, a sibling link, and a payload whose active shape is
//! determined by the kind. All child and sibling references are `NodeId`
//! indices into the same append-only array, so the tree is cycle-free by
//! construction and traversal stays cache-friendly.

use serde::Serialize;

use super::base::{NodeId, TokenId};

/// Node kind. See `NodeData` for the payload shape each kind carries.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    Root = 0,
    // Statements
    ExprStmt,
    AssignStmt,
    OpAssignStmt,
    StaticDecl,
    CaptureDecl,
    VarDecl,
    IfStmt,
    ElseClause,
    WhileStmt,
    WhileOptStmt,
    ForRangeStmt,
    ForIterStmt,
    EachClause,
    RangeClause,
    MatchStmt,
    CaseClause,
    LabelDecl,
    ImportStmt,
    TryStmt,
    AtStmt,
    BreakStmt,
    ContinueStmt,
    PassStmt,
    ReturnStmt,
    ReturnExprStmt,
    // Declarations
    FuncDecl,
    FuncDeclInit,
    FuncParam,
    LambdaExpr,
    LambdaMulti,
    ObjectDecl,
    ObjectField,
    EnumDecl,
    TagMember,
    TypeAliasDecl,
    // Expressions
    Ident,
    Number,
    NonDecimalInt,
    String,
    TemplateString,
    TrueLiteral,
    FalseLiteral,
    NoneLiteral,
    Symbol,
    ErrorSymbol,
    ListLiteral,
    MapLiteral,
    MapEntry,
    ObjectInit,
    Group,
    BinExpr,
    UnaryExpr,
    AccessExpr,
    IndexExpr,
    SliceExpr,
    CastExpr,
    CallExpr,
    NamedArg,
    IfExpr,
    TryExpr,
    ThrowExpr,
    CoinitExpr,
    CoyieldExpr,
    CoresumeExpr,
    AtExpr,
}

/// Binary operator tag for `BinExpr` nodes.
///
/// `is` and `is not` are folded into `EqualEqual` / `BangEqual` during
/// parsing; `as` produces a `CastExpr` node instead.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOp {
    Plus = 0,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    ShiftLeft,
    ShiftRight,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    EqualEqual,
    BangEqual,
    And,
    Or,
}

/// Unary operator tag for `UnaryExpr` nodes. `not` and `!` both map to `Not`.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOp {
    Minus = 0,
    Not,
    BitwiseNot,
}

/// Payload shapes, shared across node kinds.
///
/// Kinds with no payload (literals, `pass`, `break`, ...) use `Empty`.
/// `*_head` fields start a sibling chain linked through `Node::next`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum NodeData {
    Empty,
    /// One child: expression statements, groups, `throw`/`coinit`/`coyield`/
    /// `coresume`, `return expr`, at-expressions/statements, error symbols.
    Child { child: NodeId },
    /// A sibling chain: root statements, list/map literal entries, template
    /// string parts.
    Children { head: NodeId },
    Unary { child: NodeId, op: UnaryOp },
    Bin { left: NodeId, op: BinaryOp, right: NodeId },
    Access { left: NodeId, right: NodeId },
    IndexOp { left: NodeId, index: NodeId },
    /// `left[start..end]`; either bound may be `NONE`.
    SliceOp { left: NodeId, start: NodeId, end: NodeId },
    Call { callee: NodeId, args_head: NodeId, num_args: u8, has_named_arg: bool },
    NamedArg { name: NodeId, value: NodeId },
    Assign { left: NodeId, right: NodeId },
    OpAssign { left: NodeId, op: BinaryOp, right: NodeId },
    MapEntry { key: NodeId, value: NodeId },
    /// `Type{...}` initializer: `name` is the identifier or access path.
    ObjectInit { name: NodeId, entries_head: NodeId },
    /// `if`/`if-expr`/`else` clauses. For `else` without a condition `cond`
    /// is `NONE`; `else_clause` links the next clause of the chain.
    If { cond: NodeId, body_head: NodeId, else_clause: NodeId },
    /// `cond == NONE` encodes the infinite `while: ...` form.
    While { cond: NodeId, body_head: NodeId },
    WhileOpt { opt: NodeId, capture: NodeId, body_head: NodeId },
    /// `clause` is a `RangeClause` (for-range) or an iterable expression
    /// (for-iter); `each_clause` is `NONE` when the loop binds nothing.
    For { clause: NodeId, each_clause: NodeId, body_head: NodeId },
    Each { value: NodeId, key: NodeId },
    Range { start: NodeId, end: NodeId },
    Match { expr: NodeId, cases_head: NodeId },
    /// `conds_head == NONE` encodes the `else:` case.
    Case { conds_head: NodeId, body_head: NodeId },
    Try { body_head: NodeId, catch_param: NodeId, catch_body_head: NodeId },
    TryExpr { expr: NodeId, else_expr: NodeId },
    /// `func` declarations and multi-line lambdas (`name == NONE`).
    Func {
        name: NodeId,
        params_head: NodeId,
        num_params: u8,
        ret: NodeId,
        body_head: NodeId,
    },
    /// `func name(params) = expr` initializer form.
    FuncInit {
        name: NodeId,
        params_head: NodeId,
        num_params: u8,
        ret: NodeId,
        init: NodeId,
    },
    Lambda { params_head: NodeId, num_params: u8, body: NodeId },
    /// Function parameters and object fields: `name [type]`.
    Param { name: NodeId, type_spec: NodeId },
    VarDecl { name: NodeId, type_spec: NodeId, rhs: NodeId },
    /// `capture name [= rhs]` / `static name [= rhs]`.
    LocalDecl { name: NodeId, rhs: NodeId },
    ObjectDecl { name: NodeId, fields_head: NodeId, funcs_head: NodeId },
    EnumDecl { name: NodeId, members_head: NodeId },
    TypeAlias { name: NodeId, type_spec: NodeId },
    Import { name: NodeId, spec: NodeId },
    Label { name: NodeId, body_head: NodeId },
    Cast { expr: NodeId, type_spec: NodeId },
}

/// A packed AST node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    /// Index of the first token that produced this node.
    pub start_token: TokenId,
    /// Next sibling, or `NodeId::NONE`.
    pub next: NodeId,
    pub data: NodeData,
}

impl Node {
    #[inline]
    pub fn new(kind: NodeKind, start_token: TokenId, data: NodeData) -> Node {
        Node {
            kind,
            start_token,
            next: NodeId::NONE,
            data,
        }
    }
}

// =============================================================================
// Static declarations
// =============================================================================

/// Kind tag for a top-level static declaration entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum StaticDeclKind {
    Var,
    TypeAlias,
    Enum,
    Object,
    Func,
    FuncInit,
    Import,
}

/// One top-level declaration discovered during parsing, in source order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StaticDecl {
    pub kind: StaticDeclKind,
    pub node: NodeId,
}
