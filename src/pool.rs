//! The node pool: an arena of node storage plus an explicit free list.
//!
//! A [`Node`] never owns another node directly; all structural links are
//! [`NodeId`] handles into this pool. Every slot is, at any moment, a
//! member of exactly one of three intrusive doubly-linked lists: `live`
//! (resident until the next collection proves otherwise), `free`
//! (available for reuse by `add_node`), or `tmp` (used transiently during
//! mark-and-sweep, see `crate::gc`). The lists are doubly linked so a slot
//! can be unlinked from the middle of `live` in O(1) during marking,
//! without needing any per-node "visited" flag: membership in `tmp`
//! instead of `live` *is* the mark.

use crate::node::{Node, NodeId, NodeKind, Payload};

struct Slot {
    node: Node,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

fn list_append(slots: &mut [Slot], head: &mut Option<NodeId>, id: NodeId) {
    slots[id.slot()].prev = None;
    slots[id.slot()].next = *head;
    if let Some(old_head) = *head {
        slots[old_head.slot()].prev = Some(id);
    }
    *head = Some(id);
}

fn list_remove(slots: &mut [Slot], head: &mut Option<NodeId>, id: NodeId) {
    let prev = slots[id.slot()].prev;
    let next = slots[id.slot()].next;
    match prev {
        Some(p) => slots[p.slot()].next = next,
        None => *head = next,
    }
    if let Some(n) = next {
        slots[n.slot()].prev = prev;
    }
    slots[id.slot()].prev = None;
    slots[id.slot()].next = None;
}

pub struct NodePool {
    slots: Vec<Slot>,
    live: Option<NodeId>,
    free: Option<NodeId>,
    tmp: Option<NodeId>,
    live_count: usize,
    next_node_id: u32,
}

impl Default for NodePool {
    fn default() -> Self {
        NodePool::new()
    }
}

impl NodePool {
    pub fn new() -> Self {
        NodePool {
            slots: Vec::new(),
            live: None,
            free: None,
            tmp: None,
            live_count: 0,
            next_node_id: 1,
        }
    }

    pub fn live_count(&self) -> usize {
        self.live_count
    }

    fn fresh_node_id(&mut self) -> u32 {
        let id = self.next_node_id;
        self.next_node_id += 1;
        id
    }

    /// Allocates a node, taking a slot off the free list if one is
    /// available and growing the backing storage otherwise. The returned
    /// `NodeId` is pushed onto the head of `live`.
    pub fn add_node(&mut self, kind: NodeKind, payload: Payload) -> NodeId {
        let node_id = self.fresh_node_id();
        let node = Node::new(node_id, kind, payload);

        let id = match self.free {
            Some(reused) => {
                list_remove(&mut self.slots, &mut self.free, reused);
                self.slots[reused.slot()].node = node;
                reused
            }
            None => {
                let id = NodeId::from_slot(self.slots.len());
                self.slots.push(Slot {
                    node,
                    prev: None,
                    next: None,
                });
                id
            }
        };

        list_append(&mut self.slots, &mut self.live, id);
        self.live_count += 1;
        id
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.slots[id.slot()].node
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.slots[id.slot()].node
    }

    pub fn live_head(&self) -> Option<NodeId> {
        self.live
    }

    /// Releases a single node back onto the free list. Calling this twice
    /// on the same `id` without an intervening `add_node` corrupts the
    /// free list, exactly as double-freeing a pointer would; the pool does
    /// not guard against it.
    pub fn free_node(&mut self, id: NodeId) {
        list_remove(&mut self.slots, &mut self.live, id);
        list_append(&mut self.slots, &mut self.free, id);
        self.live_count -= 1;
    }

    /// Starts a new mark phase: `tmp` begins empty, nodes are moved into it
    /// one at a time as the walker reaches them.
    pub(crate) fn begin_mark(&mut self) {
        debug_assert!(self.tmp.is_none());
    }

    /// Moves `id` from `live` to `tmp`, the mark step for every node kind.
    /// A strict tree has exactly one path to each node from the root, so a
    /// node is never visited (and so never moved) twice in the same
    /// collection.
    pub(crate) fn mark(&mut self, id: NodeId) {
        list_remove(&mut self.slots, &mut self.live, id);
        list_append(&mut self.slots, &mut self.tmp, id);
    }

    /// Sweeps whatever remains in `live` (nodes no root reached) onto
    /// `free`, then promotes `tmp` to be the new `live`. Returns how many
    /// nodes were reclaimed.
    pub(crate) fn sweep(&mut self) -> usize {
        let mut reclaimed = 0;
        while let Some(id) = self.live {
            list_remove(&mut self.slots, &mut self.live, id);
            list_append(&mut self.slots, &mut self.free, id);
            self.live_count -= 1;
            reclaimed += 1;
        }
        self.live = self.tmp.take();
        reclaimed
    }

    /// Tears down the pool, asserting every node has already been freed.
    /// A non-zero `live_count` here means some node was reachable from no
    /// root and never collected — a structural bug upstream, not a normal
    /// error, so it is surfaced as a hard failure rather than an `Err`.
    pub fn free_all(self) {
        if self.live_count != 0 {
            log::error!(
                "node pool torn down with {} node(s) still live",
                self.live_count
            );
            panic!("{} node(s) not freed", self.live_count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Payload;

    #[test]
    fn add_then_free_recycles_slot() {
        let mut pool = NodePool::new();
        let a = pool.add_node(NodeKind::Const, Payload::Const { value: 1 });
        assert_eq!(pool.live_count(), 1);
        pool.free_node(a);
        assert_eq!(pool.live_count(), 0);
        let b = pool.add_node(NodeKind::Const, Payload::Const { value: 2 });
        assert_eq!(pool.live_count(), 1);
        assert_eq!(pool.get(b).as_const(), Some(2));
    }

    #[test]
    fn node_ids_are_never_reused_across_recycled_slots() {
        let mut pool = NodePool::new();
        let a = pool.add_node(NodeKind::Const, Payload::Const { value: 1 });
        let first_node_id = pool.get(a).node_id;
        pool.free_node(a);
        let b = pool.add_node(NodeKind::Const, Payload::Const { value: 2 });
        let second_node_id = pool.get(b).node_id;
        assert_ne!(first_node_id, second_node_id);
    }
}
