mod memory;
mod sqlite;

pub use memory::MemoryStore;
