//! Shared bottom-up traversal used by every optimizer pass.
//!
//! Each pass cares about a different subset of node kinds, so rather than
//! dispatching through the generic callback table in `crate::walker` (which
//! is shaped for single-purpose collaborators like the garbage collector),
//! passes are given two closures: one invoked after an expression node's
//! operands have been visited, one invoked after a statement node's bodies
//! have been visited. A pass that only cares about, say, BINOP nodes simply
//! ignores every other kind in its closure.

use crate::compiler::Compiler;
use crate::node::{NodeId, NodeKind, Payload};

pub fn walk_stmt(
    compiler: &mut Compiler,
    id: NodeId,
    on_expr: &mut dyn FnMut(&mut Compiler, NodeId),
    on_stmt: &mut dyn FnMut(&mut Compiler, NodeId),
) {
    let kind = compiler.pool.get(id).kind;

    match kind {
        NodeKind::Compound => {
            if let Some(body) = compiler.pool.get(id).single_child() {
                walk_stmt(compiler, body, on_expr, on_stmt);
            }
        }
        NodeKind::Expr | NodeKind::Return | NodeKind::Print => {
            if let Some(expr) = compiler.pool.get(id).single_child() {
                walk_expr(compiler, expr, on_expr);
            }
        }
        NodeKind::Asgn => {
            if let Payload::Asgn(a) = compiler.pool.get(id).payload.clone() {
                walk_expr(compiler, a.expr, on_expr);
            }
        }
        NodeKind::VarDecl => {
            if let Payload::VarDecl(d) = compiler.pool.get(id).payload.clone() {
                walk_expr(compiler, d.init, on_expr);
            }
        }
        NodeKind::FncDecl => {
            if let Payload::FncDecl(d) = compiler.pool.get(id).payload.clone() {
                walk_stmt(compiler, d.body, on_expr, on_stmt);
            }
        }
        NodeKind::Iteration => {
            if let Payload::Iteration(it) = compiler.pool.get(id).payload.clone() {
                walk_expr(compiler, it.cond, on_expr);
                walk_stmt(compiler, it.body, on_expr, on_stmt);
            }
        }
        NodeKind::Condition => {
            if let Payload::Condition(c) = compiler.pool.get(id).payload.clone() {
                walk_expr(compiler, c.cond, on_expr);
                walk_stmt(compiler, c.then_branch, on_expr, on_stmt);
                if let Some(else_branch) = c.else_branch {
                    walk_stmt(compiler, else_branch, on_expr, on_stmt);
                }
            }
        }
        NodeKind::Jump | NodeKind::Noop => {}
        NodeKind::Unop | NodeKind::Binop | NodeKind::Const | NodeKind::Var | NodeKind::Call => {
            walk_expr(compiler, id, on_expr);
            return;
        }
    }

    // `on_stmt` fires for this statement before its right-chained successor
    // is visited, so passes that build up state as they go (constant
    // propagation's substitution table, in particular) see statements in
    // program order rather than having the whole rest of the chain rewrite
    // itself before this node's own effects are recorded.
    on_stmt(compiler, id);

    if let Some(next) = compiler.pool.get(id).right {
        walk_stmt(compiler, next, on_expr, on_stmt);
    }
}

pub fn walk_expr(compiler: &mut Compiler, id: NodeId, on_expr: &mut dyn FnMut(&mut Compiler, NodeId)) {
    let kind = compiler.pool.get(id).kind;

    match kind {
        NodeKind::Binop => {
            if let Some(left) = compiler.pool.get(id).left {
                walk_expr(compiler, left, on_expr);
            }
            if let Some(right) = compiler.pool.get(id).right {
                walk_expr(compiler, right, on_expr);
            }
        }
        NodeKind::Unop => {
            if let Some(left) = compiler.pool.get(id).left {
                walk_expr(compiler, left, on_expr);
            }
        }
        NodeKind::Call => {
            if let Payload::Call(call) = compiler.pool.get(id).payload.clone() {
                for arg in &call.args {
                    walk_expr(compiler, *arg, on_expr);
                }
            }
        }
        NodeKind::Const | NodeKind::Var => {}
        other => unreachable!("walk_expr reached statement-only kind {:?}", other),
    }

    on_expr(compiler, id);
}
