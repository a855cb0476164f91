//! Integration tests for the parser.
//!
//! Covers the end-to-end pipeline: tokenize, build the AST, track free-name
//! dependencies, and accumulate static declarations.

use veld_parser::{
    BinaryOp, Node, NodeData, NodeId, NodeKind, OwnedParseResult, ParseResult, Parser,
    StaticDeclKind,
};

fn parse_ok<'p>(parser: &'p mut Parser, src: &str) -> ParseResult<'p> {
    let result = parser.parse("test.veld", src);
    assert!(
        !result.has_error,
        "unexpected parse error: {} (at byte {})",
        result.err_msg, result.err_pos
    );
    result
}

fn parse_err(src: &str) -> (String, bool) {
    let mut parser = Parser::new();
    let result = parser.parse("test.veld", src);
    assert!(result.has_error, "expected a parse error for {src:?}");
    (result.err_msg.to_string(), result.is_token_error)
}

fn node<'p>(result: &ParseResult<'p>, id: NodeId) -> &'p Node {
    &result.nodes[id.index()]
}

/// Collect a sibling chain into a vector.
fn chain(result: &ParseResult<'_>, head: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut cur = head;
    while cur.is_some() {
        out.push(cur);
        cur = node(result, cur).next;
    }
    out
}

fn root_stmts(result: &ParseResult<'_>) -> Vec<NodeId> {
    let root = node(result, result.root_id);
    assert_eq!(root.kind, NodeKind::Root);
    match root.data {
        NodeData::Children { head } => chain(result, head),
        _ => panic!("root should hold a statement chain"),
    }
}

/// All node-id edges leaving a node's payload (sibling links excluded).
fn data_children(data: &NodeData) -> Vec<NodeId> {
    match *data {
        NodeData::Empty => vec![],
        NodeData::Child { child } => vec![child],
        NodeData::Children { head } => vec![head],
        NodeData::Unary { child, .. } => vec![child],
        NodeData::Bin { left, right, .. } => vec![left, right],
        NodeData::Access { left, right } => vec![left, right],
        NodeData::IndexOp { left, index } => vec![left, index],
        NodeData::SliceOp { left, start, end } => vec![left, start, end],
        NodeData::Call { callee, args_head, .. } => vec![callee, args_head],
        NodeData::NamedArg { name, value } => vec![name, value],
        NodeData::Assign { left, right } => vec![left, right],
        NodeData::OpAssign { left, right, .. } => vec![left, right],
        NodeData::MapEntry { key, value } => vec![key, value],
        NodeData::ObjectInit { name, entries_head } => vec![name, entries_head],
        NodeData::If { cond, body_head, else_clause } => vec![cond, body_head, else_clause],
        NodeData::While { cond, body_head } => vec![cond, body_head],
        NodeData::WhileOpt { opt, capture, body_head } => vec![opt, capture, body_head],
        NodeData::For { clause, each_clause, body_head } => vec![clause, each_clause, body_head],
        NodeData::Each { value, key } => vec![value, key],
        NodeData::Range { start, end } => vec![start, end],
        NodeData::Match { expr, cases_head } => vec![expr, cases_head],
        NodeData::Case { conds_head, body_head } => vec![conds_head, body_head],
        NodeData::Try { body_head, catch_param, catch_body_head } => {
            vec![body_head, catch_param, catch_body_head]
        }
        NodeData::TryExpr { expr, else_expr } => vec![expr, else_expr],
        NodeData::Func { name, params_head, ret, body_head, .. } => {
            vec![name, params_head, ret, body_head]
        }
        NodeData::FuncInit { name, params_head, ret, init, .. } => {
            vec![name, params_head, ret, init]
        }
        NodeData::Lambda { params_head, body, .. } => vec![params_head, body],
        NodeData::Param { name, type_spec } => vec![name, type_spec],
        NodeData::VarDecl { name, type_spec, rhs } => vec![name, type_spec, rhs],
        NodeData::LocalDecl { name, rhs } => vec![name, rhs],
        NodeData::ObjectDecl { name, fields_head, funcs_head } => {
            vec![name, fields_head, funcs_head]
        }
        NodeData::EnumDecl { name, members_head } => vec![name, members_head],
        NodeData::TypeAlias { name, type_spec } => vec![name, type_spec],
        NodeData::Import { name, spec } => vec![name, spec],
        NodeData::Label { name, body_head } => vec![name, body_head],
        NodeData::Cast { expr, type_spec } => vec![expr, type_spec],
    }
}

// =============================================================================
// Seed scenarios
// =============================================================================

#[test]
fn test_number_statement() {
    let mut parser = Parser::new();
    let result = parse_ok(&mut parser, "1");
    let stmts = root_stmts(&result);
    assert_eq!(stmts.len(), 1);
    let stmt = node(&result, stmts[0]);
    assert_eq!(stmt.kind, NodeKind::ExprStmt);
    let NodeData::Child { child } = stmt.data else {
        panic!("expression statement holds one child");
    };
    assert_eq!(node(&result, child).kind, NodeKind::Number);
    assert_eq!(result.deps_len(), 0);
}

#[test]
fn test_free_identifier_is_a_dependency() {
    let mut parser = Parser::new();
    let result = parse_ok(&mut parser, "foo");
    let first_ref = result.dep("foo").expect("foo should be free");
    assert_eq!(node(&result, first_ref).kind, NodeKind::Ident);
    assert_eq!(result.deps_len(), 1);
}

#[test]
fn test_assignment_binds_before_reference() {
    let mut parser = Parser::new();
    let result = parse_ok(&mut parser, "foo = 123\nfoo");
    assert_eq!(result.deps_len(), 0);
    let stmts = root_stmts(&result);
    assert_eq!(stmts.len(), 2);
    assert_eq!(node(&result, stmts[0]).kind, NodeKind::AssignStmt);
    assert_eq!(node(&result, stmts[1]).kind, NodeKind::ExprStmt);
}

#[test]
fn test_call_of_free_name() {
    let mut parser = Parser::new();
    let result = parse_ok(&mut parser, "foo()");
    assert!(result.dep("foo").is_some());
    let stmts = root_stmts(&result);
    let NodeData::Child { child } = node(&result, stmts[0]).data else {
        panic!();
    };
    let call = node(&result, child);
    assert_eq!(call.kind, NodeKind::CallExpr);
    let NodeData::Call { num_args, has_named_arg, .. } = call.data else {
        panic!();
    };
    assert_eq!(num_args, 0);
    assert!(!has_named_arg);
}

#[test]
fn test_function_declaration_binds_name() {
    let mut parser = Parser::new();
    let result = parse_ok(&mut parser, "func foo():\n  pass\nfoo()");
    assert_eq!(result.deps_len(), 0);
    assert_eq!(result.static_decls.len(), 1);
    assert_eq!(result.static_decls[0].kind, StaticDeclKind::Func);
}

#[test]
fn test_template_string_parts() {
    let mut parser = Parser::new();
    let result = parse_ok(&mut parser, "'abc{1+2}def'");
    let stmts = root_stmts(&result);
    let NodeData::Child { child } = node(&result, stmts[0]).data else {
        panic!();
    };
    let template = node(&result, child);
    assert_eq!(template.kind, NodeKind::TemplateString);
    let NodeData::Children { head } = template.data else {
        panic!();
    };
    let parts: Vec<NodeKind> = chain(&result, head)
        .iter()
        .map(|&id| node(&result, id).kind)
        .collect();
    assert_eq!(
        parts,
        vec![NodeKind::String, NodeKind::BinExpr, NodeKind::String]
    );
}

// =============================================================================
// Operator precedence
// =============================================================================

/// Destructure a binary expression into (left, op, right).
fn bin(result: &ParseResult<'_>, id: NodeId) -> (NodeId, BinaryOp, NodeId) {
    let n = node(result, id);
    assert_eq!(n.kind, NodeKind::BinExpr, "expected a binary expr");
    let NodeData::Bin { left, op, right } = n.data else {
        panic!();
    };
    (left, op, right)
}

fn parse_expr_node<'p>(parser: &'p mut Parser, src: &str) -> (ParseResult<'p>, NodeId) {
    let result = parser.parse("test.veld", src);
    assert!(!result.has_error, "parse error: {}", result.err_msg);
    let root = &result.nodes[result.root_id.index()];
    let NodeData::Children { head } = root.data else {
        panic!();
    };
    let NodeData::Child { child } = result.nodes[head.index()].data else {
        panic!("expected an expression statement");
    };
    (result, child)
}

#[test]
fn test_equal_precedence_folds_left() {
    let mut parser = Parser::new();
    let (result, expr) = parse_expr_node(&mut parser, "a + b - c");
    let (left, op, _) = bin(&result, expr);
    assert_eq!(op, BinaryOp::Minus);
    let (_, inner_op, _) = bin(&result, left);
    assert_eq!(inner_op, BinaryOp::Plus);
}

#[test]
fn test_higher_precedence_binds_right_operand() {
    // a + b * c * d parses as a + ((b * c) * d)
    let mut parser = Parser::new();
    let (result, expr) = parse_expr_node(&mut parser, "a + b * c * d");
    let (left, op, right) = bin(&result, expr);
    assert_eq!(op, BinaryOp::Plus);
    assert_eq!(node(&result, left).kind, NodeKind::Ident);
    let (rl, rop, rr) = bin(&result, right);
    assert_eq!(rop, BinaryOp::Star);
    assert_eq!(node(&result, rr).kind, NodeKind::Ident);
    let (_, rlop, _) = bin(&result, rl);
    assert_eq!(rlop, BinaryOp::Star);
}

#[test]
fn test_comparison_binds_loosest_of_arithmetic() {
    // a < b * c - d parses as a < ((b * c) - d)
    let mut parser = Parser::new();
    let (result, expr) = parse_expr_node(&mut parser, "a < b * c - d");
    let (left, op, right) = bin(&result, expr);
    assert_eq!(op, BinaryOp::Less);
    assert_eq!(node(&result, left).kind, NodeKind::Ident);
    let (rl, rop, _) = bin(&result, right);
    assert_eq!(rop, BinaryOp::Minus);
    let (_, rlop, _) = bin(&result, rl);
    assert_eq!(rlop, BinaryOp::Star);
}

#[test]
fn test_and_binds_tighter_than_or() {
    let mut parser = Parser::new();
    let (result, expr) = parse_expr_node(&mut parser, "x and y or z");
    let (left, op, _) = bin(&result, expr);
    assert_eq!(op, BinaryOp::Or);
    let (_, lop, _) = bin(&result, left);
    assert_eq!(lop, BinaryOp::And);
}

#[test]
fn test_is_and_is_not_emit_equality_ops() {
    let mut parser = Parser::new();
    let (result, expr) = parse_expr_node(&mut parser, "a is b");
    assert_eq!(bin(&result, expr).1, BinaryOp::EqualEqual);

    let (result, expr) = parse_expr_node(&mut parser, "a is not b");
    assert_eq!(bin(&result, expr).1, BinaryOp::BangEqual);
}

#[test]
fn test_bitwise_rows() {
    // The bitwise-or row sits above caret, so a | b ^ c parses as (a | b) ^ c.
    let mut parser = Parser::new();
    let (result, expr) = parse_expr_node(&mut parser, "a | b ^ c");
    let (left, op, _) = bin(&result, expr);
    assert_eq!(op, BinaryOp::Caret);
    assert_eq!(bin(&result, left).1, BinaryOp::BitwiseOr);

    // << binds tighter than &.
    let (result, expr) = parse_expr_node(&mut parser, "a & b << c");
    let (_, op, right) = bin(&result, expr);
    assert_eq!(op, BinaryOp::BitwiseAnd);
    assert_eq!(bin(&result, right).1, BinaryOp::ShiftLeft);
}

#[test]
fn test_cast_expression() {
    let mut parser = Parser::new();
    let (result, expr) = parse_expr_node(&mut parser, "a as Float + 1");
    let (left, op, _) = bin(&result, expr);
    assert_eq!(op, BinaryOp::Plus);
    assert_eq!(node(&result, left).kind, NodeKind::CastExpr);
}

// =============================================================================
// Universal properties
// =============================================================================

#[test]
fn test_token_round_trip() {
    let src = "func add(a, b):\n  return a + b\nadd(1, 2.5)";
    let mut parser = Parser::new();
    let result = parse_ok(&mut parser, src);
    for tok in result.tokens {
        let text = result.token_text(tok);
        assert_eq!(&src[tok.start as usize..tok.start as usize + text.len()], text);
    }
}

#[test]
fn test_ast_acyclic_and_fully_reachable() {
    let src = "\
type Point object:
  x Float
  y Float
  func len(self):
    return self.x * self.x + self.y * self.y

func main():
  var p: Point{x: 1, y: 2}
  if p.len() > 2:
    print 'big {p.len()}'
  else:
    pass
";
    let mut parser = Parser::new();
    let result = parse_ok(&mut parser, src);

    let mut visited = vec![false; result.nodes.len()];
    let mut stack = vec![result.root_id];
    let mut steps = 0usize;
    while let Some(id) = stack.pop() {
        if id.is_none() {
            continue;
        }
        steps += 1;
        assert!(steps <= result.nodes.len() * 2, "traversal did not terminate");
        assert!(!visited[id.index()], "node {id:?} reached twice");
        visited[id.index()] = true;
        let n = node(&result, id);
        stack.extend(data_children(&n.data));
        stack.push(n.next);
    }
    let unreachable = visited.iter().filter(|&&v| !v).count();
    assert_eq!(unreachable, 0, "every node should be reachable from the root");
}

#[test]
fn test_sibling_order_is_source_order() {
    let mut parser = Parser::new();
    let result = parse_ok(&mut parser, "a = 1\nb = 2\nc = 3");
    let stmts = root_stmts(&result);
    for pair in stmts.windows(2) {
        let a = node(&result, pair[0]).start_token;
        let b = node(&result, pair[1]).start_token;
        assert!(a.0 < b.0, "siblings out of source order");
    }
}

#[test]
fn test_dependency_soundness() {
    let mut parser = Parser::new();
    // Params, locals, and declarations are bound; everything else is free.
    let result = parse_ok(
        &mut parser,
        "func f(a):\n  return a + g(b)\nx = f(1)\nx",
    );
    assert!(result.dep("a").is_none(), "parameter is bound");
    assert!(result.dep("f").is_none(), "function name is bound");
    assert!(result.dep("x").is_none(), "assigned name is bound");
    assert!(result.dep("g").is_some());
    assert!(result.dep("b").is_some());
    assert_eq!(result.deps_len(), 2);

    let mut names: Vec<&str> = result.deps().map(|(name, _)| name).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["b", "g"]);
}

#[test]
fn test_shadow_does_not_cancel_real_dependency() {
    // `n` is referenced free first, then a later assignment binds it; the
    // dependency from the first reference must survive.
    let mut parser = Parser::new();
    let result = parse_ok(&mut parser, "print n\nn = 1");
    let first = result.dep("n").expect("first reference was free");
    // The retained entry is the first reference, which precedes the binding.
    let stmts = root_stmts(&result);
    assert!(node(&result, first).start_token.0 < node(&result, stmts[1]).start_token.0);
}

#[test]
fn test_reparse_is_deterministic() {
    let src = "func f(a):\n  return a * 2\nvar x: f(21)";
    let mut parser = Parser::new();
    let (tokens1, nodes1) = {
        let r = parse_ok(&mut parser, src);
        (r.tokens.to_vec(), r.nodes.to_vec())
    };
    let r2 = parse_ok(&mut parser, src);
    assert_eq!(r2.tokens, &tokens1[..]);
    assert_eq!(r2.nodes, &nodes1[..]);
}

#[test]
fn test_dupe_outlives_parser_reuse() {
    let mut parser = Parser::new();
    let owned: OwnedParseResult = {
        let result = parse_ok(&mut parser, "foo");
        result.dupe()
    };
    // Re-parse something else on the same parser; the dupe must be unaffected.
    let _ = parse_ok(&mut parser, "bar = 1\nbar");
    assert_eq!(owned.src, "foo");
    assert_eq!(owned.name, "test.veld");
    assert!(owned.dep("foo").is_some());
    assert_eq!(owned.deps_len(), 1);
    assert!(!owned.has_error);
    let root = &owned.nodes[owned.root_id.index()];
    assert_eq!(root.kind, NodeKind::Root);
}

// =============================================================================
// Statements and declarations
// =============================================================================

#[test]
fn test_static_declarations_in_source_order() {
    let src = "\
import os 'std/os'
var limit: 100
type Id Float
type Color enum:
  red
  green
type Point object:
  x Float
func main():
  pass
func twice(n) = n * 2
";
    let mut parser = Parser::new();
    let result = parse_ok(&mut parser, src);
    let kinds: Vec<StaticDeclKind> = result.static_decls.iter().map(|d| d.kind).collect();
    assert_eq!(
        kinds,
        vec![
            StaticDeclKind::Import,
            StaticDeclKind::Var,
            StaticDeclKind::TypeAlias,
            StaticDeclKind::Enum,
            StaticDeclKind::Object,
            StaticDeclKind::Func,
            StaticDeclKind::FuncInit,
        ]
    );
    // Entries point at the right node kinds, in source order.
    let mut last_token = 0;
    for decl in result.static_decls {
        let n = node(&result, decl.node);
        assert!(n.start_token.0 >= last_token);
        last_token = n.start_token.0;
    }
    assert_eq!(result.deps_len(), 0);
}

#[test]
fn test_if_else_chain() {
    let src = "\
if a:
  pass
else b:
  pass
else:
  pass
";
    let mut parser = Parser::new();
    let result = parse_ok(&mut parser, src);
    let stmts = root_stmts(&result);
    assert_eq!(stmts.len(), 1);
    let NodeData::If { cond, else_clause, .. } = node(&result, stmts[0]).data else {
        panic!();
    };
    assert!(cond.is_some());
    let first_else = node(&result, else_clause);
    assert_eq!(first_else.kind, NodeKind::ElseClause);
    let NodeData::If { cond, else_clause, .. } = first_else.data else {
        panic!();
    };
    assert!(cond.is_some(), "`else b:` keeps its condition");
    let last_else = node(&result, else_clause);
    let NodeData::If { cond, else_clause, .. } = last_else.data else {
        panic!();
    };
    assert!(cond.is_none(), "plain `else:` has no condition");
    assert!(else_clause.is_none());
}

#[test]
fn test_else_at_other_indent_is_not_attached() {
    let src = "\
if a:
  if b:
    pass
  else:
    pass
else:
  pass
";
    let mut parser = Parser::new();
    let result = parse_ok(&mut parser, src);
    let stmts = root_stmts(&result);
    assert_eq!(stmts.len(), 1);
    let NodeData::If { body_head, else_clause, .. } = node(&result, stmts[0]).data else {
        panic!();
    };
    assert!(else_clause.is_some(), "outer else attaches to outer if");
    let NodeData::If { else_clause: inner_else, .. } = node(&result, body_head).data else {
        panic!();
    };
    assert!(inner_else.is_some(), "inner else attaches to inner if");
}

#[test]
fn test_while_forms() {
    let mut parser = Parser::new();

    let result = parse_ok(&mut parser, "while:\n  pass");
    let NodeData::While { cond, .. } = node(&result, root_stmts(&result)[0]).data else {
        panic!();
    };
    assert!(cond.is_none(), "bare while is the infinite loop");

    let result = parse_ok(&mut parser, "while x < 10:\n  pass");
    assert_eq!(node(&result, root_stmts(&result)[0]).kind, NodeKind::WhileStmt);

    let result = parse_ok(&mut parser, "while queue.pop() some item:\n  print item");
    let stmt = node(&result, root_stmts(&result)[0]);
    assert_eq!(stmt.kind, NodeKind::WhileOptStmt);
    assert!(result.dep("item").is_none(), "option binding is bound");
    assert!(result.dep("queue").is_some());
}

#[test]
fn test_for_forms() {
    let mut parser = Parser::new();

    let result = parse_ok(&mut parser, "for items:\n  pass");
    assert_eq!(node(&result, root_stmts(&result)[0]).kind, NodeKind::ForIterStmt);

    let result = parse_ok(&mut parser, "for 0..10 each i:\n  print i");
    let stmt = node(&result, root_stmts(&result)[0]);
    assert_eq!(stmt.kind, NodeKind::ForRangeStmt);
    let NodeData::For { clause, each_clause, .. } = stmt.data else {
        panic!();
    };
    assert_eq!(node(&result, clause).kind, NodeKind::RangeClause);
    assert!(each_clause.is_some());
    assert!(result.dep("i").is_none());

    let result = parse_ok(&mut parser, "for map each k, v:\n  print v");
    let NodeData::For { each_clause, .. } = node(&result, root_stmts(&result)[0]).data else {
        panic!();
    };
    let NodeData::Each { value, key } = node(&result, each_clause).data else {
        panic!();
    };
    assert!(value.is_some());
    assert!(key.is_some());
    assert!(result.dep("k").is_none());
    assert!(result.dep("v").is_none());
}

#[test]
fn test_match_statement() {
    let src = "\
match x:
  1, 2: pass
  else: pass
";
    let mut parser = Parser::new();
    let result = parse_ok(&mut parser, src);
    let stmt = node(&result, root_stmts(&result)[0]);
    assert_eq!(stmt.kind, NodeKind::MatchStmt);
    let NodeData::Match { cases_head, .. } = stmt.data else {
        panic!();
    };
    let cases = chain(&result, cases_head);
    assert_eq!(cases.len(), 2);
    let NodeData::Case { conds_head, .. } = node(&result, cases[0]).data else {
        panic!();
    };
    assert_eq!(chain(&result, conds_head).len(), 2);
    let NodeData::Case { conds_head, .. } = node(&result, cases[1]).data else {
        panic!();
    };
    assert!(conds_head.is_none(), "else case has no conditions");
}

#[test]
fn test_try_statement_and_expression() {
    let src = "\
try:
  risky()
catch err:
  print err
";
    let mut parser = Parser::new();
    let result = parse_ok(&mut parser, src);
    let stmt = node(&result, root_stmts(&result)[0]);
    assert_eq!(stmt.kind, NodeKind::TryStmt);
    let NodeData::Try { catch_param, .. } = stmt.data else {
        panic!();
    };
    assert!(catch_param.is_some());
    assert!(result.dep("err").is_none(), "catch binding is bound");

    let result = parse_ok(&mut parser, "x = try risky() else 0");
    let NodeData::Assign { right, .. } = node(&result, root_stmts(&result)[0]).data else {
        panic!();
    };
    let try_expr = node(&result, right);
    assert_eq!(try_expr.kind, NodeKind::TryExpr);
    let NodeData::TryExpr { else_expr, .. } = try_expr.data else {
        panic!();
    };
    assert!(else_expr.is_some());
}

#[test]
fn test_var_capture_static_declarations() {
    let mut parser = Parser::new();
    let result = parse_ok(&mut parser, "var x Float: 1.5");
    let decl = node(&result, root_stmts(&result)[0]);
    assert_eq!(decl.kind, NodeKind::VarDecl);
    let NodeData::VarDecl { type_spec, rhs, .. } = decl.data else {
        panic!();
    };
    assert!(type_spec.is_some());
    assert!(rhs.is_some());

    let result = parse_ok(&mut parser, "capture c = 1\nstatic s\nc + s");
    let stmts = root_stmts(&result);
    assert_eq!(node(&result, stmts[0]).kind, NodeKind::CaptureDecl);
    assert_eq!(node(&result, stmts[1]).kind, NodeKind::StaticDecl);
    assert_eq!(result.deps_len(), 0, "declared locals are bound");
}

#[test]
fn test_var_rhs_lambda_and_match() {
    let src = "\
var handler: func (a):
  return a
var flag: match x:
  1: pass
  else: pass
";
    let mut parser = Parser::new();
    let result = parse_ok(&mut parser, src);
    let stmts = root_stmts(&result);
    let NodeData::VarDecl { rhs, .. } = node(&result, stmts[0]).data else {
        panic!();
    };
    assert_eq!(node(&result, rhs).kind, NodeKind::LambdaMulti);
    let NodeData::VarDecl { rhs, .. } = node(&result, stmts[1]).data else {
        panic!();
    };
    assert_eq!(node(&result, rhs).kind, NodeKind::MatchStmt);
}

#[test]
fn test_labeled_block() {
    let mut parser = Parser::new();
    let result = parse_ok(&mut parser, "setup:\n  pass");
    let stmt = node(&result, root_stmts(&result)[0]);
    assert_eq!(stmt.kind, NodeKind::LabelDecl);
}

#[test]
fn test_at_statement_requires_call() {
    let mut parser = Parser::new();
    let result = parse_ok(&mut parser, "@host(1)");
    assert_eq!(node(&result, root_stmts(&result)[0]).kind, NodeKind::AtStmt);

    let (msg, _) = parse_err("@host");
    assert!(msg.contains("call expression"), "got: {msg}");
}

#[test]
fn test_import_requires_string_literal() {
    let mut parser = Parser::new();
    let result = parse_ok(&mut parser, "import os 'std/os'");
    assert_eq!(result.static_decls[0].kind, StaticDeclKind::Import);
    assert!(result.dep("os").is_none(), "imported name is bound");

    let (msg, is_token) = parse_err("import os 123");
    assert!(!is_token);
    assert!(msg.contains("string literal"), "got: {msg}");
}

#[test]
fn test_object_declaration_shape() {
    let src = "\
type Point object:
  x Float
  y Float
  func mag(self):
    return self.x
";
    let mut parser = Parser::new();
    let result = parse_ok(&mut parser, src);
    let decl = node(&result, root_stmts(&result)[0]);
    assert_eq!(decl.kind, NodeKind::ObjectDecl);
    let NodeData::ObjectDecl { fields_head, funcs_head, .. } = decl.data else {
        panic!();
    };
    assert_eq!(chain(&result, fields_head).len(), 2);
    assert_eq!(chain(&result, funcs_head).len(), 1);
    // Methods are not separate static declarations.
    assert_eq!(result.static_decls.len(), 1);
    assert_eq!(result.deps_len(), 0, "self is a bound parameter");
}

#[test]
fn test_enum_members() {
    let src = "type Color enum:\n  red\n  green\n  blue";
    let mut parser = Parser::new();
    let result = parse_ok(&mut parser, src);
    let NodeData::EnumDecl { members_head, .. } = node(&result, root_stmts(&result)[0]).data
    else {
        panic!();
    };
    let members = chain(&result, members_head);
    assert_eq!(members.len(), 3);
    for id in members {
        assert_eq!(node(&result, id).kind, NodeKind::TagMember);
    }
}

// =============================================================================
// Expressions
// =============================================================================

#[test]
fn test_no_paren_call() {
    let mut parser = Parser::new();
    let result = parse_ok(&mut parser, "print 1 'two' x");
    let NodeData::Child { child } = node(&result, root_stmts(&result)[0]).data else {
        panic!();
    };
    let call = node(&result, child);
    assert_eq!(call.kind, NodeKind::CallExpr);
    let NodeData::Call { num_args, args_head, .. } = call.data else {
        panic!();
    };
    assert_eq!(num_args, 3);
    let kinds: Vec<NodeKind> = chain(&result, args_head)
        .iter()
        .map(|&id| node(&result, id).kind)
        .collect();
    assert_eq!(kinds, vec![NodeKind::Number, NodeKind::String, NodeKind::Ident]);
    assert!(result.dep("print").is_some());
    assert!(result.dep("x").is_some());
}

#[test]
fn test_named_arguments() {
    let mut parser = Parser::new();
    let (result, expr) = parse_expr_node(&mut parser, "foo(width: 10, 2)");
    let NodeData::Call { num_args, has_named_arg, args_head, .. } = node(&result, expr).data
    else {
        panic!();
    };
    assert_eq!(num_args, 2);
    assert!(has_named_arg);
    let first = node(&result, chain(&result, args_head)[0]);
    assert_eq!(first.kind, NodeKind::NamedArg);
    assert!(result.dep("width").is_none(), "argument names are not references");
}

#[test]
fn test_lambda_forms() {
    let mut parser = Parser::new();

    let (result, expr) = parse_expr_node(&mut parser, "x => x + 1");
    let lambda = node(&result, expr);
    assert_eq!(lambda.kind, NodeKind::LambdaExpr);
    let NodeData::Lambda { num_params, .. } = lambda.data else {
        panic!();
    };
    assert_eq!(num_params, 1);
    assert_eq!(result.deps_len(), 0, "lambda parameter is bound in its body");

    let (result, expr) = parse_expr_node(&mut parser, "() => 42");
    let NodeData::Lambda { num_params, params_head, .. } = node(&result, expr).data else {
        panic!();
    };
    assert_eq!(num_params, 0);
    assert!(params_head.is_none());

    let (result, expr) = parse_expr_node(&mut parser, "(a, b) => a + b");
    let NodeData::Lambda { num_params, .. } = node(&result, expr).data else {
        panic!();
    };
    assert_eq!(num_params, 2);
    assert_eq!(result.deps_len(), 0);
}

#[test]
fn test_group_is_not_a_lambda() {
    let mut parser = Parser::new();
    let (result, expr) = parse_expr_node(&mut parser, "(a + b) * c");
    let (left, op, _) = bin(&result, expr);
    assert_eq!(op, BinaryOp::Star);
    assert_eq!(node(&result, left).kind, NodeKind::Group);
}

#[test]
fn test_postfix_chain() {
    let mut parser = Parser::new();
    let (result, expr) = parse_expr_node(&mut parser, "a.b[0](1).c");
    let access = node(&result, expr);
    assert_eq!(access.kind, NodeKind::AccessExpr);
    let NodeData::Access { left, .. } = access.data else {
        panic!();
    };
    assert_eq!(node(&result, left).kind, NodeKind::CallExpr);
}

#[test]
fn test_slice_forms() {
    let mut parser = Parser::new();
    let (result, expr) = parse_expr_node(&mut parser, "xs[1..3]");
    let NodeData::SliceOp { start, end, .. } = node(&result, expr).data else {
        panic!();
    };
    assert!(start.is_some());
    assert!(end.is_some());

    let (result, expr) = parse_expr_node(&mut parser, "xs[..3]");
    let NodeData::SliceOp { start, end, .. } = node(&result, expr).data else {
        panic!();
    };
    assert!(start.is_none());
    assert!(end.is_some());

    let (result, expr) = parse_expr_node(&mut parser, "xs[1..]");
    let NodeData::SliceOp { start, end, .. } = node(&result, expr).data else {
        panic!();
    };
    assert!(start.is_some());
    assert!(end.is_none());

    let (result, expr) = parse_expr_node(&mut parser, "xs[1]");
    assert_eq!(node(&result, expr).kind, NodeKind::IndexExpr);
}

#[test]
fn test_object_initializer() {
    let mut parser = Parser::new();
    let (result, expr) = parse_expr_node(&mut parser, "Point{x: 1, y: 2}");
    let init = node(&result, expr);
    assert_eq!(init.kind, NodeKind::ObjectInit);
    let NodeData::ObjectInit { entries_head, .. } = init.data else {
        panic!();
    };
    assert_eq!(chain(&result, entries_head).len(), 2);
}

#[test]
fn test_list_and_map_literals() {
    let mut parser = Parser::new();
    let (result, expr) = parse_expr_node(&mut parser, "[1, 2, 3]");
    let NodeData::Children { head } = node(&result, expr).data else {
        panic!();
    };
    assert_eq!(chain(&result, head).len(), 3);

    let (result, expr) = parse_expr_node(&mut parser, "{a: 1, b: 2}");
    let map = node(&result, expr);
    assert_eq!(map.kind, NodeKind::MapLiteral);
    let NodeData::Children { head } = map.data else {
        panic!();
    };
    assert_eq!(chain(&result, head).len(), 2);
}

#[test]
fn test_if_then_expression() {
    let mut parser = Parser::new();
    let result = parse_ok(&mut parser, "y = if a then 1 else 2");
    let NodeData::Assign { right, .. } = node(&result, root_stmts(&result)[0]).data else {
        panic!();
    };
    let if_expr = node(&result, right);
    assert_eq!(if_expr.kind, NodeKind::IfExpr);
    let NodeData::If { else_clause, .. } = if_expr.data else {
        panic!();
    };
    assert!(else_clause.is_some());
}

#[test]
fn test_coroutine_and_throw_terms() {
    let mut parser = Parser::new();
    let (result, expr) = parse_expr_node(&mut parser, "coinit task()");
    assert_eq!(node(&result, expr).kind, NodeKind::CoinitExpr);

    let (result, expr) = parse_expr_node(&mut parser, "coresume fiber");
    assert_eq!(node(&result, expr).kind, NodeKind::CoresumeExpr);

    let (result, expr) = parse_expr_node(&mut parser, "coyield");
    let NodeData::Child { child } = node(&result, expr).data else {
        panic!();
    };
    assert!(child.is_none(), "bare coyield has no operand");

    let (result, expr) = parse_expr_node(&mut parser, "throw error.Timeout");
    let throw = node(&result, expr);
    assert_eq!(throw.kind, NodeKind::ThrowExpr);
    let NodeData::Child { child } = throw.data else {
        panic!();
    };
    assert_eq!(node(&result, child).kind, NodeKind::ErrorSymbol);
}

#[test]
fn test_op_assign_statement() {
    let mut parser = Parser::new();
    let result = parse_ok(&mut parser, "x += 1");
    let stmt = node(&result, root_stmts(&result)[0]);
    assert_eq!(stmt.kind, NodeKind::OpAssignStmt);
    let NodeData::OpAssign { op, .. } = stmt.data else {
        panic!();
    };
    assert_eq!(op, BinaryOp::Plus);
    // Op-assign reads the name; an unbound target stays a dependency.
    assert!(result.dep("x").is_some());
}

#[test]
fn test_line_breaks_around_operators_in_groups() {
    // Break before the operator.
    let mut parser = Parser::new();
    let (result, expr) = parse_expr_node(&mut parser, "(a\n  + b)");
    let group = node(&result, expr);
    assert_eq!(group.kind, NodeKind::Group);
    let NodeData::Child { child } = group.data else {
        panic!();
    };
    assert_eq!(bin(&result, child).1, BinaryOp::Plus);

    // Break after the operator.
    let (result, expr) = parse_expr_node(&mut parser, "(a +\n  b)");
    let NodeData::Child { child } = node(&result, expr).data else {
        panic!();
    };
    assert_eq!(bin(&result, child).1, BinaryOp::Plus);
}

#[test]
fn test_newline_ends_statement_expression() {
    // At statement level a line break terminates the expression; the next
    // line is its own statement.
    let mut parser = Parser::new();
    let result = parse_ok(&mut parser, "a\nb");
    assert_eq!(root_stmts(&result).len(), 2);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_leading_indent_is_an_error() {
    let (msg, is_token) = parse_err("  foo");
    assert!(!is_token);
    assert_eq!(msg, "Unexpected indentation.");
}

#[test]
fn test_deeper_sibling_line_is_an_error() {
    let (msg, _) = parse_err("pass\n  pass");
    assert_eq!(msg, "Unexpected indentation.");
}

#[test]
fn test_empty_block_is_an_error() {
    let expected =
        "Block requires at least one statement. Use the `pass` statement as a placeholder.";
    let (msg, _) = parse_err("if x:\n");
    assert_eq!(msg, expected);
    let (msg, _) = parse_err("if x:\npass");
    assert_eq!(msg, expected);
}

#[test]
fn test_mixed_tabs_and_spaces() {
    let (msg, _) = parse_err("if a:\n\tpass\nif b:\n  pass");
    assert_eq!(msg, "Can not mix tabs and spaces for indentation.");
}

#[test]
fn test_bad_assignment_target() {
    let (msg, _) = parse_err("1 = 2");
    assert_eq!(msg, "Left-hand side of assignment is not assignable.");
}

#[test]
fn test_lexer_error_flag() {
    let (msg, is_token) = parse_err("x = 'unterminated");
    assert!(is_token, "string errors come from the tokenizer");
    assert_eq!(msg, "Unterminated string.");
}

#[test]
fn test_parse_no_err_converts_error() {
    let mut parser = Parser::new();
    let err = parser
        .parse_no_err("test.veld", "1 = 2")
        .err()
        .expect("should fail");
    assert!(!err.is_token_error());
    assert_eq!(err.message, "Left-hand side of assignment is not assignable.");

    assert!(parser.parse_no_err("test.veld", "x = 2").is_ok());
}

#[test]
fn test_keyword_spelling_suggestion() {
    // `whle` parses as a no-paren call; the statement then fails at `:` and
    // the error suggests the keyword.
    let (msg, _) = parse_err("whle x:\n  pass");
    assert!(msg.contains("Did you mean `while`?"), "got: {msg}");
}
