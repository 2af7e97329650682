//! Pass 2: constant folding, algebraic simplification, short-circuit
//! simplification, and self-assignment elimination.
//!
//! Division is folded only when the left operand's value is strictly
//! greater than the right operand's — a guard clearly meant to dodge
//! division by zero and truncating one-returning divisions, but which,
//! read literally, also skips perfectly safe folds like `6 / 3`.
//! Reproduced as specified rather than generalized.

use super::walk::walk_stmt;
use crate::compiler::Compiler;
use crate::node::{NodeId, NodeKind, Opcode, Payload};

fn eval_binop(op: Opcode, left: i64, right: i64) -> Option<i64> {
    match op {
        Opcode::Add => Some(left.wrapping_add(right)),
        Opcode::Sub => Some(left.wrapping_sub(right)),
        Opcode::Mul => Some(left.wrapping_mul(right)),
        Opcode::Div => {
            if left > right {
                Some(left.wrapping_div(right))
            } else {
                None
            }
        }
        Opcode::And => Some(((left != 0) && (right != 0)) as i64),
        Opcode::Or => Some(((left != 0) || (right != 0)) as i64),
        Opcode::Eq => Some((left == right) as i64),
        Opcode::Ne => Some((left != right) as i64),
        Opcode::Lt => Some((left < right) as i64),
        Opcode::Gt => Some((left > right) as i64),
        Opcode::Le => Some((left <= right) as i64),
        Opcode::Ge => Some((left >= right) as i64),
        Opcode::Neg | Opcode::Not => unreachable!("NEG/NOT cannot appear as a BINOP opcode"),
    }
}

fn replace_with_const(compiler: &mut Compiler, id: NodeId, value: i64) {
    let node = compiler.pool.get_mut(id);
    node.kind = NodeKind::Const;
    node.left = None;
    node.right = None;
    node.payload = Payload::Const { value };
}

/// Replaces `id` with a copy of `source`'s payload and children, for
/// `1 && sub → sub`.
fn replace_with_copy_of(compiler: &mut Compiler, id: NodeId, source: NodeId) {
    let copy = compiler.pool.get(source).clone();
    let node = compiler.pool.get_mut(id);
    node.kind = copy.kind;
    node.left = copy.left;
    node.right = copy.right;
    node.payload = copy.payload;
}

fn fold_binop(compiler: &mut Compiler, id: NodeId, count: &mut u32) {
    let Some(op) = compiler.pool.get(id).as_binop() else {
        return;
    };
    let (Some(left_id), Some(right_id)) = (compiler.pool.get(id).left, compiler.pool.get(id).right)
    else {
        return;
    };
    let left_const = compiler.pool.get(left_id).as_const();
    let right_const = compiler.pool.get(right_id).as_const();
    let right_kind = compiler.pool.get(right_id).kind;

    if let (Some(left), Some(right)) = (left_const, right_const) {
        if let Some(value) = eval_binop(op, left, right) {
            replace_with_const(compiler, id, value);
            *count += 1;
            if compiler.verbosity.rewrites() {
                log::debug!("pass2: folded node {:?} to {}", id, value);
            }
        }
        return;
    }

    if let (Some(left), NodeKind::Var) = (left_const, right_kind) {
        match (op, left) {
            (Opcode::Add, 0) => {
                replace_with_copy_of(compiler, id, right_id);
                *count += 1;
            }
            (Opcode::Mul, 0) => {
                replace_with_const(compiler, id, 0);
                *count += 1;
            }
            (Opcode::Mul, 1) => {
                replace_with_copy_of(compiler, id, right_id);
                *count += 1;
            }
            _ => {}
        }
        return;
    }

    if let (Some(left), NodeKind::Binop) = (left_const, right_kind) {
        if left != 0 && matches!(op, Opcode::And | Opcode::Or) {
            match op {
                Opcode::And => {
                    replace_with_copy_of(compiler, id, right_id);
                    *count += 1;
                }
                Opcode::Or => {
                    replace_with_const(compiler, id, 1);
                    *count += 1;
                }
                _ => unreachable!(),
            }
        }
    }
}

fn fold_unop(compiler: &mut Compiler, id: NodeId, count: &mut u32) {
    let Payload::Unop { op } = compiler.pool.get(id).payload else {
        return;
    };
    let Some(operand) = compiler.pool.get(id).left else {
        return;
    };
    let Some(value) = compiler.pool.get(operand).as_const() else {
        return;
    };

    let folded = match op {
        Opcode::Neg => value.wrapping_neg(),
        Opcode::Not => (value == 0) as i64,
        other => unreachable!("unexpected unary opcode {:?}", other),
    };

    replace_with_const(compiler, id, folded);
    *count += 1;
    if compiler.verbosity.rewrites() {
        log::debug!("pass2: folded unary node {:?} to {}", id, folded);
    }
}

/// `x = x` is replaced with a NOOP statement: the assignment has no
/// observable effect once both sides name the same symbol. The right-chain
/// link is left untouched so the statement sequence stays intact.
fn eliminate_self_assignment(compiler: &mut Compiler, id: NodeId, count: &mut u32) {
    if compiler.pool.get(id).kind != NodeKind::Asgn {
        return;
    }
    let Payload::Asgn(asgn) = compiler.pool.get(id).payload.clone() else {
        return;
    };
    if compiler.pool.get(asgn.expr).as_var() == Some(asgn.symbol) {
        let node = compiler.pool.get_mut(id);
        node.kind = NodeKind::Noop;
        node.payload = Payload::Noop;
        *count += 1;
        if compiler.verbosity.rewrites() {
            log::debug!("pass2: eliminated self-assignment at node {:?}", id);
        }
    }
}

pub fn run(compiler: &mut Compiler) -> u32 {
    let mut count = 0;
    if let Some(root) = compiler.root {
        let mut on_expr = |compiler: &mut Compiler, id: NodeId| match compiler.pool.get(id).kind {
            NodeKind::Binop => fold_binop(compiler, id, &mut count),
            NodeKind::Unop => fold_unop(compiler, id, &mut count),
            _ => {}
        };
        let mut on_stmt = |compiler: &mut Compiler, id: NodeId| {
            eliminate_self_assignment(compiler, id, &mut count);
        };
        walk_stmt(compiler, root, &mut on_expr, &mut on_stmt);
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{Compiler, Verbosity};
    use crate::node::Asgn;
    use crate::symbol::Qualifier;

    fn wrap_as_program(compiler: &mut Compiler, expr: NodeId) -> NodeId {
        let stmt = compiler.pool.add_node(NodeKind::Expr, Payload::Single { child: Some(expr) });
        compiler.root = Some(stmt);
        stmt
    }

    #[test]
    fn folds_fully_constant_addition() {
        let mut compiler = Compiler::new(Verbosity::QUIET, 1);
        let a = compiler.pool.add_node(NodeKind::Const, Payload::Const { value: 2 });
        let b = compiler.pool.add_node(NodeKind::Const, Payload::Const { value: 3 });
        let add = compiler.pool.add_node(NodeKind::Binop, Payload::Binop { op: Opcode::Add });
        compiler.pool.get_mut(add).left = Some(a);
        compiler.pool.get_mut(add).right = Some(b);
        wrap_as_program(&mut compiler, add);

        let count = run(&mut compiler);
        assert_eq!(count, 1);
        assert_eq!(compiler.pool.get(add).as_const(), Some(5));
    }

    #[test]
    fn division_is_not_folded_when_left_does_not_exceed_right() {
        let mut compiler = Compiler::new(Verbosity::QUIET, 1);
        let a = compiler.pool.add_node(NodeKind::Const, Payload::Const { value: 3 });
        let b = compiler.pool.add_node(NodeKind::Const, Payload::Const { value: 6 });
        let div = compiler.pool.add_node(NodeKind::Binop, Payload::Binop { op: Opcode::Div });
        compiler.pool.get_mut(div).left = Some(a);
        compiler.pool.get_mut(div).right = Some(b);
        wrap_as_program(&mut compiler, div);

        let count = run(&mut compiler);
        assert_eq!(count, 0);
        assert_eq!(compiler.pool.get(div).kind, NodeKind::Binop);
    }

    #[test]
    fn self_assignment_becomes_noop() {
        let mut compiler = Compiler::new(Verbosity::QUIET, 1);
        let sym = compiler.symbols.put_var("x", Qualifier::Global, 0, None);
        let rhs = compiler.pool.add_node(NodeKind::Var, Payload::Var { symbol: sym });
        let asgn = compiler
            .pool
            .add_node(NodeKind::Asgn, Payload::Asgn(Asgn { symbol: sym, expr: rhs }));
        compiler.root = Some(asgn);

        let count = run(&mut compiler);
        assert_eq!(count, 1);
        assert_eq!(compiler.pool.get(asgn).kind, NodeKind::Noop);
    }
}
