mod block;
mod offset;
mod program;
mod ty;

use std::sync::Arc;

pub use block::*;
pub use offset::*;
pub use program::*;
use rustc_hash::FxHashMap;
pub use ty::*;

#[cfg(test)]
mod test;
