//! Adapters implementing the `files_core::ports` traits.
//!
//! * [`MongoDriver`] / [`RedisDriver`] talk to real servers.
//! * [`MemoryDocumentStore`] / [`MemoryKeyValueStore`] keep everything in
//!   process and can simulate an unreachable or dropped store.

mod memory_documents;
pub use memory_documents::*;

mod moka_kv;
pub use moka_kv::*;

mod mongo;
pub use mongo::*;

mod redis_kv;
pub use redis_kv::*;
