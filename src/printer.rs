//! Stdout transcript: banners, tree dumps, and the symbol table dump.
//!
//! Printed directly via `print!`/`println!`, not through the `log` crate:
//! this output is a tested contract with an exact format, not a diagnostic
//! trail, so it stays independent of whatever verbosity `log` itself is
//! configured at.

use crate::compiler::Compiler;
use crate::node::{Node, NodeId, NodeKind, Payload};

const NIL: &str = "NIL";

fn id_field(id: Option<NodeId>, compiler: &Compiler) -> String {
    match id {
        Some(id) => format!("{:04}", compiler.pool.get(id).node_id),
        None => NIL.to_owned(),
    }
}

fn describe_payload(node: &Node) -> String {
    match &node.payload {
        Payload::Noop => String::new(),
        Payload::Unop { op } => op.mnemonic().to_owned(),
        Payload::Binop { op } => op.mnemonic().to_owned(),
        Payload::Const { value } => value.to_string(),
        Payload::Var { symbol } => format!("sym#{}", symbol_display(*symbol)),
        Payload::Call(call) => format!("sym#{} ({} arg(s))", symbol_display(call.symbol), call.args.len()),
        Payload::Asgn(asgn) => format!("sym#{}", symbol_display(asgn.symbol)),
        Payload::Single { .. } => String::new(),
        Payload::Jump(jump) => format!("{:?} level {}", jump.kind, jump.level),
        Payload::Iteration(_) => String::new(),
        Payload::Condition(cond) => format!("has_else={}", cond.else_branch.is_some()),
        Payload::VarDecl(decl) => format!("sym#{}", symbol_display(decl.symbol)),
        Payload::FncDecl(decl) => format!("sym#{}", symbol_display(decl.symbol)),
    }
}

fn symbol_display(symbol: crate::symbol::SymbolId) -> String {
    format!("{:?}", symbol)
}

fn print_node_line(compiler: &Compiler, id: NodeId) {
    let node = compiler.pool.get(id);
    let self_field = format!("{:04}", node.node_id);
    let left_field = id_field(node.left, compiler);
    let right_field = id_field(node.right, compiler);
    let payload = describe_payload(node);
    if payload.is_empty() {
        println!("{}\t{}\t{}\t{}", self_field, left_field, right_field, node.kind.name());
    } else {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            self_field,
            left_field,
            right_field,
            node.kind.name(),
            payload
        );
    }
}

/// Dumps a node in statement position: prints the node itself, then
/// descends into whatever the node's kind actually holds its children in
/// (the payload, for every kind but BINOP/UNOP), then walks `right` as the
/// next statement in the chain. Mirrors `walker::traverse_stmt`'s dispatch,
/// but pre-order (self first) instead of post-order.
fn print_stmt(compiler: &Compiler, id: NodeId) {
    print_node_line(compiler, id);
    let kind = compiler.pool.get(id).kind;

    match kind {
        NodeKind::Compound | NodeKind::Expr | NodeKind::Return | NodeKind::Print => {
            if let Some(child) = compiler.pool.get(id).single_child() {
                print_stmt_or_expr(compiler, child, kind);
            }
        }
        NodeKind::Asgn => {
            if let Payload::Asgn(asgn) = compiler.pool.get(id).payload.clone() {
                print_expr(compiler, asgn.expr);
            }
        }
        NodeKind::VarDecl => {
            if let Payload::VarDecl(decl) = compiler.pool.get(id).payload.clone() {
                print_expr(compiler, decl.init);
            }
        }
        NodeKind::FncDecl => {
            if let Payload::FncDecl(decl) = compiler.pool.get(id).payload.clone() {
                print_stmt(compiler, decl.body);
            }
        }
        NodeKind::Iteration => {
            if let Payload::Iteration(it) = compiler.pool.get(id).payload.clone() {
                print_expr(compiler, it.cond);
                print_stmt(compiler, it.body);
            }
        }
        NodeKind::Condition => {
            if let Payload::Condition(cond) = compiler.pool.get(id).payload.clone() {
                print_expr(compiler, cond.cond);
                print_stmt(compiler, cond.then_branch);
                if let Some(else_branch) = cond.else_branch {
                    print_stmt(compiler, else_branch);
                }
            }
        }
        NodeKind::Jump | NodeKind::Noop => {}
        NodeKind::Unop | NodeKind::Binop | NodeKind::Const | NodeKind::Var | NodeKind::Call => {
            // Already printed above; just walk its operands, not `right`
            // as a chain link.
            print_expr_children(compiler, id);
            return;
        }
    }

    if let Some(next) = compiler.pool.get(id).right {
        print_stmt(compiler, next);
    }
}

/// A single dispatch point used by the COMPOUND/EXPR/RETURN/PRINT family,
/// whose lone child may itself be a statement (COMPOUND's body) or an
/// expression (EXPR/RETURN/PRINT's operand).
fn print_stmt_or_expr(compiler: &Compiler, child: NodeId, parent_kind: NodeKind) {
    match parent_kind {
        NodeKind::Compound => print_stmt(compiler, child),
        _ => print_expr(compiler, child),
    }
}

/// Dumps a node in expression position: prints the node, then its
/// operands — BINOP's `left`/`right`, UNOP's `left`, CALL's argument list.
/// CONST and VAR are leaves.
fn print_expr(compiler: &Compiler, id: NodeId) {
    print_node_line(compiler, id);
    print_expr_children(compiler, id);
}

fn print_expr_children(compiler: &Compiler, id: NodeId) {
    let kind = compiler.pool.get(id).kind;
    match kind {
        NodeKind::Binop => {
            if let Some(left) = compiler.pool.get(id).left {
                print_expr(compiler, left);
            }
            if let Some(right) = compiler.pool.get(id).right {
                print_expr(compiler, right);
            }
        }
        NodeKind::Unop => {
            if let Some(left) = compiler.pool.get(id).left {
                print_expr(compiler, left);
            }
        }
        NodeKind::Call => {
            if let Payload::Call(call) = compiler.pool.get(id).payload.clone() {
                for arg in &call.args {
                    print_expr(compiler, *arg);
                }
            }
        }
        NodeKind::Const | NodeKind::Var => {}
        other => unreachable!("print_expr_children reached statement-only kind {:?}", other),
    }
}

pub fn print_parse_tree(compiler: &Compiler) {
    println!("=== The parse tree ({} nodes) ===", compiler.pool.live_count());
    if let Some(root) = compiler.root {
        print_stmt(compiler, root);
    }
}

pub fn print_after_optimization(compiler: &Compiler) {
    println!("=== After optimization ===");
    if let Some(root) = compiler.root {
        print_stmt(compiler, root);
    }
}

pub fn print_pass_banner(pass: u32) {
    println!("=== Optimization pass {} ===", pass);
}

pub fn print_after_pass(compiler: &Compiler, pass: u32) {
    println!("=== After optimization pass {} ===", pass);
    if let Some(root) = compiler.root {
        print_stmt(compiler, root);
    }
}

pub fn print_symbol_table(compiler: &Compiler) {
    println!("=== Symbol table ===");
    for id in compiler.symbols.functions() {
        let symbol = compiler.symbols.get(id);
        let fnc = symbol.as_fnc().expect("functions() yields only function symbols");
        println!(
            "{}\tFNC\tnparam={}\tnauto={}",
            symbol.name, fnc.nparam, fnc.nauto
        );
    }
    for id in compiler.symbols.variables() {
        let symbol = compiler.symbols.get(id);
        let var = symbol.as_var().expect("variables() yields only variable symbols");
        println!(
            "{}\tVAR\t{:?}\taddr={}",
            symbol.name, var.qualifier, var.rel_address
        );
    }
}

pub fn print_compilation_result(passed: bool) {
    if passed {
        println!("Compilation: Passed");
    } else {
        println!("Compilation: Failed");
    }
}

