pub mod cli;
pub mod config;
pub mod future;
pub mod store;

pub use docql_core::*;
pub use config::{Config, Preset};
pub use future::{callback_future, CallbackFuture};
pub use store::MemoryStore;
