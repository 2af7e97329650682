use tinycc_mid::compiler::{Compiler, Verbosity};
use tinycc_mid::{frontend, layout, optimizer};

fn compile(source: &str, opt_level: u32) -> Compiler {
    let mut compiler = Compiler::new(Verbosity::QUIET, opt_level);
    frontend::parse_program(&mut compiler, "<test>", source).expect("parse failed");
    optimizer::optimize_tree(&mut compiler);
    layout::compute_layout(&mut compiler);
    compiler
}

#[test]
fn constant_expression_folds_to_a_single_literal() {
    let compiler = compile(
        r#"
        fn main() {
            print 2 + 3 * 4;
        }
        "#,
        2,
    );
    let main = compiler.symbols.find_fnc("main").expect("main not declared");
    let fnc = compiler.symbols.get(main).as_fnc().unwrap();
    let body = fnc.entry_point.expect("function body missing");
    let print_stmt = compiler.pool.get(body).single_child().expect("empty body");
    let print_node = compiler.pool.get(print_stmt);
    let expr = print_node.single_child().expect("print has no operand");
    assert_eq!(compiler.pool.get(expr).as_const(), Some(14));
}

#[test]
fn unused_local_is_eliminated_at_opt_level_two() {
    let compiler = compile(
        r#"
        fn main() {
            auto unused = 5;
            print 1;
        }
        "#,
        2,
    );
    let main = compiler.symbols.find_fnc("main").expect("main not declared");
    let fnc = compiler.symbols.get(main).as_fnc().unwrap();
    let body = fnc.entry_point.unwrap();
    let first_stmt = compiler.pool.get(body).single_child().unwrap();
    assert_eq!(
        compiler.pool.get(first_stmt).kind,
        tinycc_mid::node::NodeKind::Noop,
        "declaration with no reads should have been turned into a NOOP"
    );
}

#[test]
fn opt_level_zero_leaves_the_tree_untouched() {
    let compiler = compile(
        r#"
        fn main() {
            print 2 + 3;
        }
        "#,
        0,
    );
    let main = compiler.symbols.find_fnc("main").expect("main not declared");
    let fnc = compiler.symbols.get(main).as_fnc().unwrap();
    let body = fnc.entry_point.unwrap();
    let print_stmt = compiler.pool.get(body).single_child().unwrap();
    let expr = compiler.pool.get(print_stmt).single_child().unwrap();
    assert_eq!(compiler.pool.get(expr).kind, tinycc_mid::node::NodeKind::Binop);
}

#[test]
fn parameters_and_globals_receive_distinct_addresses() {
    let compiler = compile(
        r#"
        var total;
        fn add(a, b) {
            return a + b;
        }
        "#,
        1,
    );
    let add = compiler.symbols.find_fnc("add").unwrap();
    let fnc = compiler.symbols.get(add).as_fnc().unwrap();
    assert_eq!(fnc.nparam, 2);
    let a = fnc.params[0];
    let b = fnc.params[1];
    assert_eq!(compiler.symbols.get(a).as_var().unwrap().rel_address, 2);
    assert_eq!(compiler.symbols.get(b).as_var().unwrap().rel_address, 1);

    let total = compiler.symbols.find_var("total").unwrap();
    assert_eq!(compiler.symbols.get(total).as_var().unwrap().rel_address, 1);
}

#[test]
fn undeclared_identifier_is_a_syntax_error() {
    let mut compiler = Compiler::new(Verbosity::QUIET, 1);
    let result = frontend::parse_program(&mut compiler, "<test>", "fn main() { print missing; }");
    assert!(result.is_err());
}
