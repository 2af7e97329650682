//! Pass 5: constant-conditional elimination.
//!
//! Once a CONDITION node's test has folded to a constant, the branch that
//! can never run is dead and the branch that always runs can simply take
//! the CONDITION's place in the enclosing statement chain. This is done by
//! splicing the taken branch's own statement chain in where the CONDITION
//! node used to sit: the branch's trailing `right` is pointed at whatever
//! followed the CONDITION, and the CONDITION's slot in the chain is
//! replaced by the branch's head.

use super::walk::walk_stmt;
use crate::compiler::Compiler;
use crate::node::{NodeId, NodeKind, Payload};

fn last_in_chain(compiler: &Compiler, mut id: NodeId) -> NodeId {
    while let Some(next) = compiler.pool.get(id).right {
        id = next;
    }
    id
}

/// Replaces the CONDITION node at `id` with whichever branch its constant
/// test selects, splicing that branch's statement chain into the spot the
/// CONDITION occupied. Returns `true` if a rewrite was made.
fn eliminate_constant_condition(compiler: &mut Compiler, id: NodeId) -> bool {
    if compiler.pool.get(id).kind != NodeKind::Condition {
        return false;
    }
    let Payload::Condition(cond) = compiler.pool.get(id).payload.clone() else {
        return false;
    };
    let Some(test) = compiler.pool.get(cond.cond).as_const() else {
        return false;
    };

    let taken = if test != 0 {
        Some(cond.then_branch)
    } else {
        cond.else_branch
    };

    let after = compiler.pool.get(id).right;

    match taken {
        Some(branch) => {
            let tail = last_in_chain(compiler, branch);
            compiler.pool.get_mut(tail).right = after;
            let node = compiler.pool.get_mut(id);
            node.kind = NodeKind::Noop;
            node.payload = Payload::Noop;
            node.right = Some(branch);
        }
        None => {
            let node = compiler.pool.get_mut(id);
            node.kind = NodeKind::Noop;
            node.payload = Payload::Noop;
            // `right` already points at `after`; nothing else to splice.
        }
    }
    true
}

pub fn run(compiler: &mut Compiler) -> u32 {
    let mut count = 0;
    if let Some(root) = compiler.root {
        let mut on_expr = |_: &mut Compiler, _: NodeId| {};
        let mut on_stmt = |compiler: &mut Compiler, id: NodeId| {
            if eliminate_constant_condition(compiler, id) {
                count += 1;
                if compiler.verbosity.rewrites() {
                    log::debug!("pass5: eliminated constant condition at node {:?}", id);
                }
            }
        };
        walk_stmt(compiler, root, &mut on_expr, &mut on_stmt);
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{Compiler, Verbosity};
    use crate::node::Condition;

    #[test]
    fn true_condition_splices_in_the_then_branch() {
        let mut compiler = Compiler::new(Verbosity::QUIET, 2);
        let test = compiler.pool.add_node(NodeKind::Const, Payload::Const { value: 1 });
        let then_branch = compiler.pool.add_node(NodeKind::Noop, Payload::Noop);
        let else_branch = compiler.pool.add_node(NodeKind::Noop, Payload::Noop);
        let cond = compiler.pool.add_node(
            NodeKind::Condition,
            Payload::Condition(Condition {
                cond: test,
                then_branch,
                else_branch: Some(else_branch),
            }),
        );
        let after = compiler.pool.add_node(NodeKind::Noop, Payload::Noop);
        compiler.pool.get_mut(cond).right = Some(after);
        compiler.root = Some(cond);

        let count = run(&mut compiler);
        assert_eq!(count, 1);
        assert_eq!(compiler.pool.get(cond).kind, NodeKind::Noop);
        assert_eq!(compiler.pool.get(cond).right, Some(then_branch));
        assert_eq!(compiler.pool.get(then_branch).right, Some(after));
    }

    #[test]
    fn false_condition_with_no_else_leaves_only_a_noop() {
        let mut compiler = Compiler::new(Verbosity::QUIET, 2);
        let test = compiler.pool.add_node(NodeKind::Const, Payload::Const { value: 0 });
        let then_branch = compiler.pool.add_node(NodeKind::Noop, Payload::Noop);
        let cond = compiler.pool.add_node(
            NodeKind::Condition,
            Payload::Condition(Condition {
                cond: test,
                then_branch,
                else_branch: None,
            }),
        );
        let after = compiler.pool.add_node(NodeKind::Noop, Payload::Noop);
        compiler.pool.get_mut(cond).right = Some(after);
        compiler.root = Some(cond);

        let count = run(&mut compiler);
        assert_eq!(count, 1);
        assert_eq!(compiler.pool.get(cond).kind, NodeKind::Noop);
        assert_eq!(compiler.pool.get(cond).right, Some(after));
    }
}
