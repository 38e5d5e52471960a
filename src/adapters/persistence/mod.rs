//! StoragePort implementations.

pub mod json_file;
pub mod memory;
pub mod sqlite_kv;

pub use json_file::JsonFileStorage;
pub use memory::MemoryStorage;
pub use sqlite_kv::SqliteStorage;
