//! Stack and global layout computation.
//!
//! Assigns each variable's `rel_address`: function parameters are numbered
//! downward from `nparam` to 1 (the caller pushes arguments in declared
//! order, so the first parameter ends up deepest on the stack), per-
//! function autos are numbered upward from 1 in declaration order, and
//! globals are numbered upward from 1 in declaration order across the
//! whole symbol table.

use crate::compiler::Compiler;
use crate::symbol::Qualifier;

pub fn compute_layout(compiler: &mut Compiler) {
    compute_stack_layout(compiler);
    compute_global_layout(compiler);
}

fn compute_stack_layout(compiler: &mut Compiler) {
    let functions: Vec<_> = compiler.symbols.functions().collect();
    for func in functions {
        let (params, nparam) = {
            let fnc = compiler
                .symbols
                .get(func)
                .as_fnc()
                .expect("functions() yields only function symbols");
            (fnc.params.clone(), fnc.nparam)
        };

        for (position, &param) in params.iter().enumerate() {
            let rel_address = nparam as i32 - position as i32;
            if let Some(var) = compiler.symbols.get_mut(param).as_var_mut() {
                var.rel_address = rel_address;
            }
        }

        let mut next_auto = 1;
        for var_id in compiler.symbols.variables().collect::<Vec<_>>() {
            // Linear scan against each variable's `owner`, acceptable
            // because function bodies here are small by construction; it
            // mirrors a straightforward declared-order scan rather than a
            // hash lookup.
            let is_auto_of_this_function = {
                let var = compiler
                    .symbols
                    .get(var_id)
                    .as_var()
                    .expect("variables() yields only variable symbols");
                var.qualifier == Qualifier::Auto
                    && var.owner == Some(func)
                    && !params.contains(&var_id)
            };
            if is_auto_of_this_function {
                if let Some(var) = compiler.symbols.get_mut(var_id).as_var_mut() {
                    var.rel_address = next_auto;
                    next_auto += 1;
                }
            }
        }
    }
}

fn compute_global_layout(compiler: &mut Compiler) {
    let mut next_global = 1;
    for var_id in compiler.symbols.variables().collect::<Vec<_>>() {
        let is_global = compiler
            .symbols
            .get(var_id)
            .as_var()
            .map(|v| v.qualifier == Qualifier::Global)
            .unwrap_or(false);
        if is_global {
            if let Some(var) = compiler.symbols.get_mut(var_id).as_var_mut() {
                var.rel_address = next_global;
                next_global += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{Compiler, Verbosity};
    use crate::node::FncDecl;
    use crate::node::{NodeKind, Payload};

    #[test]
    fn parameters_are_numbered_downward_and_autos_upward_per_function() {
        let mut compiler = Compiler::new(Verbosity::QUIET, 0);
        let func = compiler.symbols.put_fnc("f");
        let p0 = compiler.symbols.put_var("a", Qualifier::Parameter, 1, Some(func));
        let p1 = compiler.symbols.put_var("b", Qualifier::Parameter, 1, Some(func));
        let auto0 = compiler.symbols.put_var("t", Qualifier::Auto, 1, Some(func));

        if let Some(fnc) = compiler.symbols.get_mut(func).as_fnc_mut() {
            fnc.nparam = 2;
            fnc.params = vec![p0, p1];
        }
        let body = compiler.pool.add_node(NodeKind::Compound, Payload::Single { child: None });
        compiler
            .pool
            .add_node(NodeKind::FncDecl, Payload::FncDecl(FncDecl { symbol: func, body }));

        compute_layout(&mut compiler);

        assert_eq!(compiler.symbols.get(p0).as_var().unwrap().rel_address, 2);
        assert_eq!(compiler.symbols.get(p1).as_var().unwrap().rel_address, 1);
        assert_eq!(compiler.symbols.get(auto0).as_var().unwrap().rel_address, 1);
    }

    #[test]
    fn globals_are_numbered_upward_across_the_whole_table() {
        let mut compiler = Compiler::new(Verbosity::QUIET, 0);
        let g0 = compiler.symbols.put_var("g0", Qualifier::Global, 0, None);
        let g1 = compiler.symbols.put_var("g1", Qualifier::Global, 0, None);

        compute_layout(&mut compiler);

        assert_eq!(compiler.symbols.get(g1).as_var().unwrap().rel_address, 1);
        assert_eq!(compiler.symbols.get(g0).as_var().unwrap().rel_address, 2);
    }
}
