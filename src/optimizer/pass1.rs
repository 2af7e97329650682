//! Pass 1: operand sorting.
//!
//! Runs on BINOP nodes during a post-order walk, so operands are already
//! normalized by the time a node is visited. Three rules apply in order,
//! each only when the previous one did not already rewrite the node:
//!
//! 1. If `right` is CONST and `left` is not: move the constant to `left`.
//!    Commutative operators swap outright; `SUB` swaps and negates the
//!    constant while rewriting the opcode to `ADD` (`x - 5` becomes
//!    `-5 + x`); `DIV` and the ordered comparisons are left alone, since
//!    neither can be swapped without changing what the expression means.
//! 2. Left-transpose: `left` is `MUL(C, _)` and `right` is CONST, with the
//!    outer opcode `MUL` or `DIV` — rotates `C1 * X / C2` into
//!    `(C1 / C2) * X` by swapping the outer/inner opcodes and the two
//!    "right" operands.
//! 3. Right-transpose: `right` is a same-family BINOP — regroups `left`
//!    with `right`'s own left operand under a new node and rotates, e.g.
//!    `C1 + (C2 - V)` becomes `(C1 + C2) - V`. Applies on family match
//!    alone; any constant folding of the regrouped pair is pass 2's job.

use super::walk::walk_stmt;
use crate::compiler::Compiler;
use crate::node::{NodeId, NodeKind, Opcode, Payload};

fn is_const(compiler: &Compiler, id: NodeId) -> bool {
    compiler.pool.get(id).as_const().is_some()
}

fn family(op: Opcode) -> Option<u8> {
    match op {
        Opcode::Add | Opcode::Sub => Some(0),
        Opcode::Mul | Opcode::Div => Some(1),
        _ => None,
    }
}

fn is_commutative(op: Opcode) -> bool {
    matches!(
        op,
        Opcode::Add | Opcode::Mul | Opcode::And | Opcode::Or | Opcode::Eq | Opcode::Ne
    )
}

/// Rule 1: moves a lone constant from `right` to `left`.
fn move_const_left(compiler: &mut Compiler, id: NodeId) -> bool {
    let op = compiler.pool.get(id).as_binop().unwrap();
    let (left, right) = (
        compiler.pool.get(id).left.unwrap(),
        compiler.pool.get(id).right.unwrap(),
    );
    if !is_const(compiler, right) || is_const(compiler, left) {
        return false;
    }

    if is_commutative(op) {
        let node = compiler.pool.get_mut(id);
        std::mem::swap(&mut node.left, &mut node.right);
        return true;
    }

    if op == Opcode::Sub {
        let node = compiler.pool.get_mut(id);
        std::mem::swap(&mut node.left, &mut node.right);
        node.payload = Payload::Binop { op: Opcode::Add };
        let new_left = node.left.unwrap();
        let value = compiler.pool.get(new_left).as_const().unwrap();
        compiler.pool.get_mut(new_left).payload = Payload::Const {
            value: value.wrapping_neg(),
        };
        return true;
    }

    // DIV and the ordered comparisons are left exactly as written.
    false
}

/// Rule 2: `C1 * X / C2` → `(C1 / C2) * X`.
fn left_transpose(compiler: &mut Compiler, id: NodeId) -> bool {
    let op = compiler.pool.get(id).as_binop().unwrap();
    if !matches!(op, Opcode::Mul | Opcode::Div) {
        return false;
    }
    let Some(left) = compiler.pool.get(id).left else {
        return false;
    };
    let Some(right) = compiler.pool.get(id).right else {
        return false;
    };
    if !is_const(compiler, right) {
        return false;
    }
    let Some(inner_op) = compiler.pool.get(left).as_binop() else {
        return false;
    };
    if inner_op != Opcode::Mul {
        return false;
    }
    let Some(inner_left) = compiler.pool.get(left).left else {
        return false;
    };
    if !is_const(compiler, inner_left) {
        return false;
    }

    if let Payload::Binop { op: outer } = &mut compiler.pool.get_mut(id).payload {
        *outer = inner_op;
    }
    if let Payload::Binop { op: inner } = &mut compiler.pool.get_mut(left).payload {
        *inner = op;
    }
    let inner_right = compiler.pool.get(left).right;
    compiler.pool.get_mut(left).right = Some(right);
    compiler.pool.get_mut(id).right = inner_right;
    true
}

/// Rule 3: `C1 + (C2 ± V)` → `(C1 + C2) ± V`, and the multiplicative analog.
fn right_transpose(compiler: &mut Compiler, id: NodeId) -> bool {
    let op = compiler.pool.get(id).as_binop().unwrap();
    let Some(outer_family) = family(op) else {
        return false;
    };
    let Some(left) = compiler.pool.get(id).left else {
        return false;
    };
    let Some(right) = compiler.pool.get(id).right else {
        return false;
    };
    let Some(inner_op) = compiler.pool.get(right).as_binop() else {
        return false;
    };
    if family(inner_op) != Some(outer_family) {
        return false;
    }
    let Some(inner_left) = compiler.pool.get(right).left else {
        return false;
    };
    let Some(inner_right) = compiler.pool.get(right).right else {
        return false;
    };

    let final_top_op = if matches!(op, Opcode::Add | Opcode::Mul) {
        inner_op
    } else {
        inner_op.invert()
    };

    let grouped = compiler.pool.add_node(NodeKind::Binop, Payload::Binop { op });
    compiler.pool.get_mut(grouped).left = Some(left);
    compiler.pool.get_mut(grouped).right = Some(inner_left);

    compiler.pool.get_mut(id).left = Some(grouped);
    compiler.pool.get_mut(id).right = Some(inner_right);
    if let Payload::Binop { op } = &mut compiler.pool.get_mut(id).payload {
        *op = final_top_op;
    }
    true
}

fn rewrite_binop(compiler: &mut Compiler, id: NodeId, count: &mut u32) {
    if compiler.pool.get(id).as_binop().is_none() {
        return;
    }
    if move_const_left(compiler, id) {
        *count += 1;
        if compiler.verbosity.rewrites() {
            log::debug!("pass1: moved constant operand left at node {:?}", id);
        }
        return;
    }
    if left_transpose(compiler, id) {
        *count += 1;
        if compiler.verbosity.rewrites() {
            log::debug!("pass1: left-transposed node {:?}", id);
        }
        return;
    }
    if right_transpose(compiler, id) {
        *count += 1;
        if compiler.verbosity.rewrites() {
            log::debug!("pass1: right-transposed node {:?}", id);
        }
    }
}

pub fn run(compiler: &mut Compiler) -> u32 {
    let mut count = 0;
    if let Some(root) = compiler.root {
        let mut on_expr = |compiler: &mut Compiler, id: NodeId| {
            if compiler.pool.get(id).kind == NodeKind::Binop {
                rewrite_binop(compiler, id, &mut count);
            }
        };
        let mut on_stmt = |_: &mut Compiler, _: NodeId| {};
        walk_stmt(compiler, root, &mut on_expr, &mut on_stmt);
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{Compiler, Verbosity};
    use crate::node::NodeKind;

    fn binop(compiler: &mut Compiler, op: Opcode, left: NodeId, right: NodeId) -> NodeId {
        let id = compiler.pool.add_node(NodeKind::Binop, Payload::Binop { op });
        let node = compiler.pool.get_mut(id);
        node.left = Some(left);
        node.right = Some(right);
        id
    }

    fn wrap_as_program(compiler: &mut Compiler, expr: NodeId) {
        let stmt = compiler.pool.add_node(NodeKind::Expr, Payload::Single { child: Some(expr) });
        compiler.root = Some(stmt);
    }

    #[test]
    fn move_const_left_swaps_commutative_operand() {
        let mut compiler = Compiler::new(Verbosity::QUIET, 1);
        let sym = compiler.symbols.put_var("x", crate::symbol::Qualifier::Global, 0, None);
        let x = compiler.pool.add_node(NodeKind::Var, Payload::Var { symbol: sym });
        let c = compiler.pool.add_node(NodeKind::Const, Payload::Const { value: 5 });
        let add = binop(&mut compiler, Opcode::Add, x, c);
        wrap_as_program(&mut compiler, add);

        let count = run(&mut compiler);
        assert_eq!(count, 1);
        let node = compiler.pool.get(add);
        assert_eq!(node.left, Some(c));
        assert_eq!(node.right, Some(x));
    }

    #[test]
    fn move_const_left_on_sub_negates_and_becomes_add() {
        let mut compiler = Compiler::new(Verbosity::QUIET, 1);
        let sym = compiler.symbols.put_var("x", crate::symbol::Qualifier::Global, 0, None);
        let x = compiler.pool.add_node(NodeKind::Var, Payload::Var { symbol: sym });
        let c = compiler.pool.add_node(NodeKind::Const, Payload::Const { value: 5 });
        let sub = binop(&mut compiler, Opcode::Sub, x, c);
        wrap_as_program(&mut compiler, sub);

        run(&mut compiler);
        let node = compiler.pool.get(sub);
        assert_eq!(node.as_binop(), Some(Opcode::Add));
        assert_eq!(node.right, Some(x));
        let left = node.left.unwrap();
        assert_eq!(compiler.pool.get(left).as_const(), Some(-5));
    }
}
