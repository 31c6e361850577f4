//! Message store and scratch memory implementations for toolloop.

pub mod in_memory;
pub mod file_backend;
pub mod scratch;

pub use in_memory::InMemoryStore;
pub use file_backend::FileStore;
pub use scratch::InMemoryScratch;
