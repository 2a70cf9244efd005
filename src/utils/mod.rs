pub mod constants;
pub mod jwt;
pub mod storage;

pub use constants::API_BASE;
pub use storage::{LocalStorage, MemoryStorage, StorageBackend};
