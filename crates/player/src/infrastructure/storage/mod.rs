//! HandleStore adapters.

mod file;
mod memory;
mod query;

pub use file::FileHandleStore;
pub use memory::MemoryHandleStore;
pub use query::QueryStringHandleStore;
