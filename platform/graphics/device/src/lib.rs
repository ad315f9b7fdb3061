mod backend;
mod binding;
mod context;
mod device;
mod resource;

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub use backend::*;
pub use binding::*;
pub use context::*;
pub use device::*;
use parking_lot::Mutex;
pub use peregrine_shader_reflection::*;
pub use resource::*;
use rustc_hash::FxHashMap;
