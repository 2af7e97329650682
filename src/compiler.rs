//! The compiler state threaded through every pass: node pool, symbol
//! table, current root, and the verbosity/optimization settings read from
//! the command line. Kept as one plain struct passed by `&mut self` rather
//! than as process-global statics, so nothing here prevents running the
//! pipeline more than once in a test process.

use crate::node::NodeId;
use crate::pool::NodePool;
use crate::symbol::SymbolTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Verbosity(pub u8);

impl Verbosity {
    pub const QUIET: Verbosity = Verbosity(0);

    pub fn banners(self) -> bool {
        self.0 >= 1
    }

    pub fn rewrites(self) -> bool {
        self.0 >= 2
    }

    pub fn tree_dumps(self) -> bool {
        self.0 >= 3
    }
}

pub struct Compiler {
    pub pool: NodePool,
    pub symbols: SymbolTable,
    pub root: Option<NodeId>,
    pub verbosity: Verbosity,
    pub opt_level: u32,
}

impl Compiler {
    pub fn new(verbosity: Verbosity, opt_level: u32) -> Self {
        Compiler {
            pool: NodePool::new(),
            symbols: SymbolTable::new(),
            root: None,
            verbosity,
            opt_level,
        }
    }
}
