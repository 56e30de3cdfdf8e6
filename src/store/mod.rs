//! Local key/value storage and the typed profile repository.

pub mod libsql_backend;
pub mod memory;
pub mod repository;
pub mod traits;

pub use libsql_backend::LibSqlStore;
pub use memory::MemoryStore;
pub use repository::{PersistOutcome, ProfileRepository};
pub use traits::KeyValueStore;
