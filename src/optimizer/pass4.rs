//! Pass 4: dead-variable elimination.
//!
//! Two sub-passes. The first walks every expression counting VAR reads per
//! symbol, resetting any count left over from a previous run first. The
//! second walks every VAR_DECL and replaces it with a NOOP wherever the
//! declared symbol's read count came back zero — the declaration's
//! initializer is dropped along with it, so this only fires once pass 3 has
//! already had a chance to consume that initializer's value.

use super::walk::walk_stmt;
use crate::compiler::Compiler;
use crate::node::{NodeId, NodeKind, Payload};

fn reset_ref_counts(compiler: &mut Compiler) {
    for symbol in compiler.symbols.variables().collect::<Vec<_>>() {
        compiler.symbols.get_mut(symbol).ref_count = 0;
    }
}

fn count_var_reads(compiler: &mut Compiler) {
    if let Some(root) = compiler.root {
        let mut on_expr = |compiler: &mut Compiler, id: NodeId| {
            if let Some(symbol) = compiler.pool.get(id).as_var() {
                compiler.symbols.get_mut(symbol).ref_count += 1;
            }
        };
        let mut on_stmt = |compiler: &mut Compiler, id: NodeId| {
            if compiler.pool.get(id).kind == NodeKind::Asgn {
                if let Payload::Asgn(asgn) = compiler.pool.get(id).payload.clone() {
                    compiler.symbols.get_mut(asgn.symbol).ref_count += 1;
                }
            }
        };
        walk_stmt(compiler, root, &mut on_expr, &mut on_stmt);
    }
}

fn eliminate_unused_decls(compiler: &mut Compiler) -> u32 {
    let mut count = 0;
    if let Some(root) = compiler.root {
        let mut on_expr = |_: &mut Compiler, _: NodeId| {};
        let mut on_stmt = |compiler: &mut Compiler, id: NodeId| {
            if compiler.pool.get(id).kind != NodeKind::VarDecl {
                return;
            }
            let Payload::VarDecl(decl) = compiler.pool.get(id).payload.clone() else {
                return;
            };
            if compiler.symbols.get(decl.symbol).ref_count == 0 {
                let node = compiler.pool.get_mut(id);
                node.kind = NodeKind::Noop;
                node.payload = Payload::Noop;
                count += 1;
                if compiler.verbosity.rewrites() {
                    log::debug!("pass4: eliminated unused declaration at node {:?}", id);
                }
            }
        };
        walk_stmt(compiler, root, &mut on_expr, &mut on_stmt);
    }
    count
}

pub fn run(compiler: &mut Compiler) -> u32 {
    reset_ref_counts(compiler);
    count_var_reads(compiler);
    eliminate_unused_decls(compiler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{Compiler, Verbosity};
    use crate::node::VarDecl;
    use crate::symbol::Qualifier;

    #[test]
    fn unread_declaration_becomes_noop() {
        let mut compiler = Compiler::new(Verbosity::QUIET, 2);
        let sym = compiler.symbols.put_var("x", Qualifier::Auto, 1, None);
        let init = compiler.pool.add_node(NodeKind::Const, Payload::Const { value: 1 });
        let decl = compiler
            .pool
            .add_node(NodeKind::VarDecl, Payload::VarDecl(VarDecl { symbol: sym, init }));
        compiler.root = Some(decl);

        let count = run(&mut compiler);
        assert_eq!(count, 1);
        assert_eq!(compiler.pool.get(decl).kind, NodeKind::Noop);
    }

    #[test]
    fn declaration_read_by_a_later_statement_survives() {
        let mut compiler = Compiler::new(Verbosity::QUIET, 2);
        let sym = compiler.symbols.put_var("x", Qualifier::Auto, 1, None);
        let init = compiler.pool.add_node(NodeKind::Const, Payload::Const { value: 1 });
        let decl = compiler
            .pool
            .add_node(NodeKind::VarDecl, Payload::VarDecl(VarDecl { symbol: sym, init }));
        let read = compiler.pool.add_node(NodeKind::Var, Payload::Var { symbol: sym });
        let print_stmt = compiler.pool.add_node(NodeKind::Print, Payload::Single { child: Some(read) });
        compiler.pool.get_mut(decl).right = Some(print_stmt);
        compiler.root = Some(decl);

        let count = run(&mut compiler);
        assert_eq!(count, 0);
        assert_eq!(compiler.pool.get(decl).kind, NodeKind::VarDecl);
    }
}
