//! Stores that answer docql queries.

pub mod eval;
mod memory;

pub use memory::MemoryStore;
