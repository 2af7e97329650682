//! Generic post-order tree walker.
//!
//! A pass supplies a table of per-kind callbacks; the walker recurses over
//! a node's children first and invokes the callback for the node's own
//! kind last (post-order), so a callback always sees already-rewritten
//! children. Closed node-kind set, so dispatch is a flat array indexed by
//! discriminant rather than a `HashMap` lookup.

use crate::compiler::Compiler;
use crate::node::{NodeId, NodeKind};

pub type Callback = fn(&mut Compiler, NodeId);

/// One callback slot per [`NodeKind`], in declaration order.
pub struct CallbackTable {
    entries: [Option<Callback>; NodeKind::COUNT],
}

impl CallbackTable {
    pub fn new() -> Self {
        CallbackTable {
            entries: [None; NodeKind::COUNT],
        }
    }

    pub fn set(&mut self, kind: NodeKind, callback: Callback) -> &mut Self {
        self.entries[kind.index()] = Some(callback);
        self
    }

    /// Builds a table that invokes the same callback for every kind, the
    /// shape `crate::gc` uses to mark every node it reaches.
    pub fn uniform(callback: Callback) -> Self {
        CallbackTable {
            entries: [Some(callback); NodeKind::COUNT],
        }
    }

    fn get(&self, kind: NodeKind) -> Option<Callback> {
        self.entries[kind.index()]
    }
}

impl Default for CallbackTable {
    fn default() -> Self {
        CallbackTable::new()
    }
}

/// Walks `root` (and, via `right`, every statement chained after it) in
/// post order, dispatching through `table`.
pub fn traverse(compiler: &mut Compiler, root: Option<NodeId>, table: &CallbackTable) {
    let Some(id) = root else { return };
    traverse_stmt(compiler, id, table);
}

/// Statement-position recursion: descends into a node's children following
/// the rules for the kind at hand, then walks `right` as the next
/// statement in the chain, then invokes the callback for this node.
fn traverse_stmt(compiler: &mut Compiler, id: NodeId, table: &CallbackTable) {
    let kind = compiler.pool.get(id).kind;

    match kind {
        NodeKind::Compound | NodeKind::Expr | NodeKind::Return | NodeKind::Print => {
            if let Some(child) = compiler.pool.get(id).single_child() {
                traverse_expr_or_stmt(compiler, child, table, kind);
            }
        }
        NodeKind::Asgn => {
            if let crate::node::Payload::Asgn(asgn) = compiler.pool.get(id).payload.clone() {
                traverse_expr(compiler, asgn.expr, table);
            }
        }
        NodeKind::VarDecl => {
            if let crate::node::Payload::VarDecl(decl) = compiler.pool.get(id).payload.clone() {
                traverse_expr(compiler, decl.init, table);
            }
        }
        NodeKind::FncDecl => {
            if let crate::node::Payload::FncDecl(decl) = compiler.pool.get(id).payload.clone() {
                traverse_stmt(compiler, decl.body, table);
            }
        }
        NodeKind::Iteration => {
            if let crate::node::Payload::Iteration(it) = compiler.pool.get(id).payload.clone() {
                traverse_expr(compiler, it.cond, table);
                traverse_stmt(compiler, it.body, table);
            }
        }
        NodeKind::Condition => {
            if let crate::node::Payload::Condition(cond) = compiler.pool.get(id).payload.clone() {
                traverse_expr(compiler, cond.cond, table);
                traverse_stmt(compiler, cond.then_branch, table);
                if let Some(else_branch) = cond.else_branch {
                    traverse_stmt(compiler, else_branch, table);
                }
            }
        }
        NodeKind::Jump | NodeKind::Noop => {}
        NodeKind::Unop | NodeKind::Binop | NodeKind::Const | NodeKind::Var | NodeKind::Call => {
            traverse_expr(compiler, id, table);
            return;
        }
    }

    if let Some(next) = compiler.pool.get(id).right {
        traverse_stmt(compiler, next, table);
    }

    if let Some(callback) = table.get(kind) {
        callback(compiler, id);
    }
}

/// A single dispatch point used by the COMPOUND/EXPR/RETURN/PRINT family,
/// whose lone child may itself be a statement (COMPOUND's body) or an
/// expression (EXPR/RETURN/PRINT's operand).
fn traverse_expr_or_stmt(
    compiler: &mut Compiler,
    child: NodeId,
    table: &CallbackTable,
    parent_kind: NodeKind,
) {
    match parent_kind {
        NodeKind::Compound => traverse_stmt(compiler, child, table),
        _ => traverse_expr(compiler, child, table),
    }
}

/// Expression-position recursion: BINOP walks both `left` and `right` as
/// operands (not as a statement chain); UNOP and CALL walk their single
/// operand / argument list; CONST and VAR are leaves.
fn traverse_expr(compiler: &mut Compiler, id: NodeId, table: &CallbackTable) {
    let kind = compiler.pool.get(id).kind;

    match kind {
        NodeKind::Binop => {
            if let Some(left) = compiler.pool.get(id).left {
                traverse_expr(compiler, left, table);
            }
            if let Some(right) = compiler.pool.get(id).right {
                traverse_expr(compiler, right, table);
            }
        }
        NodeKind::Unop => {
            if let Some(left) = compiler.pool.get(id).left {
                traverse_expr(compiler, left, table);
            }
        }
        NodeKind::Call => {
            if let crate::node::Payload::Call(call) = compiler.pool.get(id).payload.clone() {
                for arg in &call.args {
                    traverse_expr(compiler, *arg, table);
                }
            }
        }
        NodeKind::Const | NodeKind::Var => {}
        other => unreachable!("traverse_expr reached statement-only kind {:?}", other),
    }

    if let Some(callback) = table.get(kind) {
        callback(compiler, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{Compiler, Verbosity};
    use crate::node::Payload;
    use std::cell::RefCell;

    thread_local! {
        static VISITED: RefCell<Vec<u32>> = RefCell::new(Vec::new());
    }

    fn record(compiler: &mut Compiler, id: NodeId) {
        VISITED.with(|v| v.borrow_mut().push(compiler.pool.get(id).node_id));
    }

    #[test]
    fn visits_every_node_in_post_order() {
        VISITED.with(|v| v.borrow_mut().clear());
        let mut compiler = Compiler::new(Verbosity::QUIET, 0);
        let a = compiler.pool.add_node(NodeKind::Const, Payload::Const { value: 1 });
        let b = compiler.pool.add_node(NodeKind::Const, Payload::Const { value: 2 });
        let add = compiler.pool.add_node(NodeKind::Binop, Payload::Binop { op: crate::node::Opcode::Add });
        compiler.pool.get_mut(add).left = Some(a);
        compiler.pool.get_mut(add).right = Some(b);
        let stmt = compiler.pool.add_node(NodeKind::Expr, Payload::Single { child: Some(add) });

        let table = CallbackTable::uniform(record);
        traverse(&mut compiler, Some(stmt), &table);

        let visited = VISITED.with(|v| v.borrow().clone());
        let a_id = compiler.pool.get(a).node_id;
        let b_id = compiler.pool.get(b).node_id;
        let add_id = compiler.pool.get(add).node_id;
        let stmt_id = compiler.pool.get(stmt).node_id;
        assert_eq!(visited, vec![a_id, b_id, add_id, stmt_id]);
    }
}
