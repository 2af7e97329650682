//! Tree node representation.
//!
//! A node is referenced through a [`NodeId`]: an index into the pool's
//! backing storage (see [`crate::pool`]). Unlike the `node_id` field stored
//! *inside* each [`Node`] (a diagnostic counter, monotonic and never
//! reused), the `NodeId` handle itself *is* recycled by the free list, the
//! same way a freed-and-reallocated pointer is recycled by `addnode`/
//! `freenode` in a malloc-backed pool. A `NodeId` is only meaningful while
//! the pool keeps the slot it names on the live list.

use crate::symbol::SymbolId;
use std::num::NonZeroU32;

/// A reference to a node's storage slot. Reused across free/realloc cycles,
/// so holding one past the node's lifetime is a logic error the pool does
/// not protect against (mirrors the original's raw-pointer reuse).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(NonZeroU32);

impl NodeId {
    pub(crate) fn from_slot(slot: usize) -> Self {
        NodeId(NonZeroU32::new(slot as u32 + 1).expect("slot index overflow"))
    }

    pub(crate) fn slot(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// The closed set of node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Noop,
    Unop,
    Binop,
    Const,
    Var,
    Call,
    Asgn,
    Expr,
    Return,
    Print,
    Jump,
    Compound,
    Iteration,
    Condition,
    VarDecl,
    FncDecl,
}

impl NodeKind {
    /// All kinds in declaration order, used to size callback tables.
    pub const COUNT: usize = 16;

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Noop => "NODE_NOOP",
            NodeKind::Unop => "NODE_UNOP",
            NodeKind::Binop => "NODE_BINOP",
            NodeKind::Const => "NODE_CONST",
            NodeKind::Var => "NODE_VAR",
            NodeKind::Call => "NODE_CALL",
            NodeKind::Asgn => "NODE_ASGN",
            NodeKind::Expr => "NODE_EXPR",
            NodeKind::Return => "NODE_RETURN",
            NodeKind::Print => "NODE_PRINT",
            NodeKind::Jump => "NODE_JUMP",
            NodeKind::Compound => "NODE_COMPOUND",
            NodeKind::Iteration => "NODE_ITERATION",
            NodeKind::Condition => "NODE_CONDITION",
            NodeKind::VarDecl => "NODE_VAR_DECL",
            NodeKind::FncDecl => "NODE_FNC_DECL",
        }
    }
}

/// Binary and unary opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Add,
    Sub,
    Mul,
    Div,
    Neg,
    And,
    Not,
    Or,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl Opcode {
    /// `Ge` is deliberately printed as `OPCODE_GT`; this reproduces a
    /// long-standing typo rather than a guess at intended behavior.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Add => "OPCODE_ADD",
            Opcode::Sub => "OPCODE_SUB",
            Opcode::Mul => "OPCODE_MUL",
            Opcode::Div => "OPCODE_DIV",
            Opcode::Neg => "OPCODE_NEG",
            Opcode::And => "OPCODE_AND",
            Opcode::Not => "OPCODE_NOT",
            Opcode::Or => "OPCODE_OR",
            Opcode::Eq => "OPCODE_EQ",
            Opcode::Ne => "OPCODE_NE",
            Opcode::Lt => "OPCODE_LT",
            Opcode::Gt => "OPCODE_GT",
            Opcode::Le => "OPCODE_LE",
            Opcode::Ge => "OPCODE_GT",
        }
    }

    pub(crate) fn invert(self) -> Self {
        match self {
            Opcode::Add => Opcode::Sub,
            Opcode::Sub => Opcode::Add,
            Opcode::Mul => Opcode::Div,
            Opcode::Div => Opcode::Mul,
            other => unreachable!("invert_opcode: unexpected opcode {:?}", other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpKind {
    Break,
    Continue,
}

/// A function-call payload: the target symbol and its argument list.
///
/// Arguments are only ever walked and individually rewritten in place,
/// never spliced or reordered as a list, so a plain `Vec<NodeId>` is the
/// right-sized representation.
#[derive(Debug, Clone)]
pub struct Call {
    pub symbol: SymbolId,
    pub args: Vec<NodeId>,
}

#[derive(Debug, Clone, Copy)]
pub struct Asgn {
    pub symbol: SymbolId,
    pub expr: NodeId,
}

#[derive(Debug, Clone, Copy)]
pub struct Jump {
    pub kind: JumpKind,
    pub level: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct Iteration {
    pub cond: NodeId,
    pub body: NodeId,
}

#[derive(Debug, Clone, Copy)]
pub struct Condition {
    pub cond: NodeId,
    pub then_branch: NodeId,
    pub else_branch: Option<NodeId>,
}

#[derive(Debug, Clone, Copy)]
pub struct VarDecl {
    pub symbol: SymbolId,
    pub init: NodeId,
}

#[derive(Debug, Clone, Copy)]
pub struct FncDecl {
    pub symbol: SymbolId,
    pub body: NodeId,
}

/// The kind-discriminated payload of a node.
#[derive(Debug, Clone)]
pub enum Payload {
    Noop,
    Unop { op: Opcode },
    Binop { op: Opcode },
    Const { value: i64 },
    Var { symbol: SymbolId },
    Call(Call),
    Asgn(Asgn),
    /// EXPR, RETURN, PRINT, COMPOUND: a single child expression/statement.
    /// The real kind is carried by `Node::kind`, not by this payload shape.
    Single { child: Option<NodeId> },
    Jump(Jump),
    Iteration(Iteration),
    Condition(Condition),
    VarDecl(VarDecl),
    FncDecl(FncDecl),
}

/// A tree node. `left`/`right` double as binary-operator operands and as
/// the right-chained statement-list links.
#[derive(Debug, Clone)]
pub struct Node {
    /// Monotonic, never-reused diagnostic identifier. Printed by the tree
    /// dump; unrelated to the [`NodeId`] handle naming this slot, which
    /// *is* reused once the node is freed.
    pub node_id: u32,
    pub kind: NodeKind,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    pub payload: Payload,
}

impl Node {
    pub(crate) fn new(node_id: u32, kind: NodeKind, payload: Payload) -> Self {
        Node {
            node_id,
            kind,
            left: None,
            right: None,
            payload,
        }
    }

    pub fn as_const(&self) -> Option<i64> {
        match self.payload {
            Payload::Const { value } => Some(value),
            _ => None,
        }
    }

    pub fn as_var(&self) -> Option<SymbolId> {
        match self.payload {
            Payload::Var { symbol } => Some(symbol),
            _ => None,
        }
    }

    pub fn as_binop(&self) -> Option<Opcode> {
        match self.payload {
            Payload::Binop { op } => Some(op),
            _ => None,
        }
    }

    pub fn single_child(&self) -> Option<NodeId> {
        match self.payload {
            Payload::Single { child } => child,
            _ => None,
        }
    }
}
