//! The five in-place tree-rewriting optimization passes and the
//! fixed-point loop that drives them.
//!
//! Passes 1-3 interact (a fold in pass 2 can create an operand pass 1
//! would want to reorder; a propagated constant in pass 3 can create a
//! fold pass 2 would want to make), so they run together in a loop until
//! none of them report a rewrite. Passes 4 and 5 are each a single sweep
//! run once afterward: dead-variable elimination depends on a stable
//! reference count, and constant-conditional elimination changes tree
//! shape in a way that would otherwise have to re-enter the fixed-point
//! loop for no benefit.

mod pass1;
mod pass2;
mod pass3;
mod pass4;
mod pass5;
mod walk;

use crate::compiler::Compiler;
use crate::gc;
use crate::printer;

fn run_pass(compiler: &mut Compiler, pass: u32, run: impl FnOnce(&mut Compiler) -> u32) -> u32 {
    if compiler.verbosity.banners() {
        printer::print_pass_banner(pass);
    }
    let count = run(compiler);
    gc::collect(compiler);
    if compiler.verbosity.tree_dumps() {
        printer::print_after_pass(compiler, pass);
    }
    count
}

/// Runs every pass appropriate for `compiler.opt_level`. Level 0 means "no
/// optimization"; level 1 runs the fixed-point folding/propagation passes;
/// level 2 (the default) additionally runs dead-variable elimination and
/// constant-conditional elimination. Mark-and-sweep runs after every single
/// pass, reclaiming whatever that pass just orphaned.
pub fn optimize_tree(compiler: &mut Compiler) {
    if compiler.opt_level == 0 {
        return;
    }

    loop {
        run_pass(compiler, 1, pass1::run);

        // `optcnt` only counts pass 2 and 3's constant-producing rewrites;
        // pass 1 always runs a sweep but never gates the outer loop.
        let mut optcnt = 0;
        optcnt += run_pass(compiler, 2, pass2::run);
        optcnt += run_pass(compiler, 3, pass3::run);

        if compiler.verbosity.rewrites() {
            log::debug!("optimizer: fixed-point sweep made {} rewrite(s)", optcnt);
        }
        if optcnt == 0 {
            break;
        }
    }

    if compiler.opt_level >= 2 {
        run_pass(compiler, 4, pass4::run);
        run_pass(compiler, 5, pass5::run);
    }
}
