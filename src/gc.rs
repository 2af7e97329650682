//! Mark-and-sweep collection over the node pool.
//!
//! No mark bit is stored on any node; reachability is tracked purely by
//! list membership, moving nodes from `live` to a transient `tmp` list as
//! they are reached from the root, then sweeping whatever is left in
//! `live` onto `free` and swapping `tmp` back in as the new `live`.

use crate::compiler::Compiler;
use crate::node::NodeId;
use crate::walker::{self, CallbackTable};

/// Moves `id` from `live` onto `tmp`, acting as the mark step for every
/// node kind.
fn mark(compiler: &mut Compiler, id: NodeId) {
    compiler.pool.mark(id);
}

/// Reclaims every node unreachable from `root`. Nodes reachable from
/// `root` survive; everything else is pushed onto the free list for
/// `add_node` to recycle.
pub fn collect(compiler: &mut Compiler) {
    compiler.pool.begin_mark();

    let table = CallbackTable::uniform(mark);
    let root = compiler.root;
    walker::traverse(compiler, root, &table);

    let freed = compiler.pool.sweep();
    if compiler.verbosity.rewrites() {
        log::debug!("gc: reclaimed {} node(s)", freed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{Compiler, Verbosity};
    use crate::node::{NodeKind, Payload};

    #[test]
    fn collect_reclaims_nodes_unreachable_from_root() {
        let mut compiler = Compiler::new(Verbosity::QUIET, 0);
        let orphan = compiler.pool.add_node(NodeKind::Const, Payload::Const { value: 1 });
        let kept = compiler.pool.add_node(NodeKind::Const, Payload::Const { value: 2 });
        let stmt = compiler.pool.add_node(NodeKind::Expr, Payload::Single { child: Some(kept) });
        compiler.root = Some(stmt);

        assert_eq!(compiler.pool.live_count(), 3);
        collect(&mut compiler);
        assert_eq!(compiler.pool.live_count(), 2);

        // The orphan's slot is recyclable; the next allocation reuses its
        // handle even though it gets a fresh diagnostic identifier.
        let orphan_node_id = compiler.pool.get(orphan).node_id;
        let reused = compiler.pool.add_node(NodeKind::Const, Payload::Const { value: 3 });
        assert_eq!(reused, orphan);
        assert_ne!(compiler.pool.get(reused).node_id, orphan_node_id);
    }
}
