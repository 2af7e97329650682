//! Pass 3: constant propagation.
//!
//! Every VAR_DECL and ASGN writes its initializer/rhs expression node into
//! the symbol's `entry_point`, unconditionally — not only when that
//! expression happens to be constant. A VAR read then checks whatever node
//! `entry_point` currently names: if it is a CONST, the read is replaced by
//! a copy of that constant.
//!
//! Because the walk is post-order and a statement chain is walked in
//! source order, the last write along a straight-line path wins. Nothing
//! resets `entry_point` when control re-enters a loop body or takes the
//! other side of a branch, so a value written in one iteration or branch
//! can be read back in another where it no longer holds — a known
//! unsoundness of this pass, not a bug to paper over.

use super::walk::walk_stmt;
use crate::compiler::Compiler;
use crate::node::{NodeId, NodeKind, Payload};
use crate::symbol::SymbolId;

fn record_entry_point(compiler: &mut Compiler, symbol: SymbolId, expr: NodeId) {
    if let Some(var) = compiler.symbols.get_mut(symbol).as_var_mut() {
        var.entry_point = Some(expr);
    }
}

fn substitute_var(compiler: &mut Compiler, id: NodeId, count: &mut u32) {
    let Some(symbol) = compiler.pool.get(id).as_var() else {
        return;
    };
    let Some(source) = compiler.symbols.get(symbol).as_var().and_then(|v| v.entry_point) else {
        return;
    };
    let Some(value) = compiler.pool.get(source).as_const() else {
        return;
    };

    let node = compiler.pool.get_mut(id);
    node.kind = NodeKind::Const;
    node.payload = Payload::Const { value };
    *count += 1;
    if compiler.verbosity.rewrites() {
        log::debug!("pass3: propagated constant {} into node {:?}", value, id);
    }
}

pub fn run(compiler: &mut Compiler) -> u32 {
    let mut count = 0;
    if let Some(root) = compiler.root {
        let mut on_expr = |compiler: &mut Compiler, id: NodeId| {
            if compiler.pool.get(id).kind == NodeKind::Var {
                substitute_var(compiler, id, &mut count);
            }
        };
        let mut on_stmt = |compiler: &mut Compiler, id: NodeId| match compiler.pool.get(id).kind {
            NodeKind::VarDecl => {
                if let Payload::VarDecl(decl) = compiler.pool.get(id).payload.clone() {
                    record_entry_point(compiler, decl.symbol, decl.init);
                }
            }
            NodeKind::Asgn => {
                if let Payload::Asgn(asgn) = compiler.pool.get(id).payload.clone() {
                    record_entry_point(compiler, asgn.symbol, asgn.expr);
                }
            }
            _ => {}
        };
        walk_stmt(compiler, root, &mut on_expr, &mut on_stmt);
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{Compiler, Verbosity};
    use crate::node::VarDecl;
    use crate::symbol::Qualifier;

    #[test]
    fn propagates_constant_from_decl_into_later_read() {
        let mut compiler = Compiler::new(Verbosity::QUIET, 1);
        let sym = compiler.symbols.put_var("x", Qualifier::Auto, 1, None);
        let init = compiler.pool.add_node(NodeKind::Const, Payload::Const { value: 7 });
        let decl = compiler
            .pool
            .add_node(NodeKind::VarDecl, Payload::VarDecl(VarDecl { symbol: sym, init }));
        let read = compiler.pool.add_node(NodeKind::Var, Payload::Var { symbol: sym });
        let print_stmt = compiler.pool.add_node(NodeKind::Print, Payload::Single { child: Some(read) });
        compiler.pool.get_mut(decl).right = Some(print_stmt);
        compiler.root = Some(decl);

        let count = run(&mut compiler);
        assert_eq!(count, 1);
        assert_eq!(compiler.pool.get(read).as_const(), Some(7));
    }

    #[test]
    fn does_not_substitute_a_non_constant_entry_point() {
        let mut compiler = Compiler::new(Verbosity::QUIET, 1);
        let sym = compiler.symbols.put_var("x", Qualifier::Auto, 1, None);
        let other = compiler.symbols.put_var("y", Qualifier::Auto, 1, None);
        let init = compiler.pool.add_node(NodeKind::Var, Payload::Var { symbol: other });
        let decl = compiler
            .pool
            .add_node(NodeKind::VarDecl, Payload::VarDecl(VarDecl { symbol: sym, init }));
        let read = compiler.pool.add_node(NodeKind::Var, Payload::Var { symbol: sym });
        let print_stmt = compiler.pool.add_node(NodeKind::Print, Payload::Single { child: Some(read) });
        compiler.pool.get_mut(decl).right = Some(print_stmt);
        compiler.root = Some(decl);

        let count = run(&mut compiler);
        assert_eq!(count, 0);
        assert_eq!(compiler.pool.get(read).kind, NodeKind::Var);
    }
}
