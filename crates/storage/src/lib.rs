//! Swapflow Storage
//!
//! Caching and deduplication primitives plus the in-memory key-value store.
//! Everything here is explicit-instance: caches are constructed and injected,
//! never reached through module-level state.

pub mod batcher;
pub mod block_cache;
pub mod long_term;
pub mod memory_store;
pub mod single_flight;
pub mod ttl_guard;

pub use batcher::Batcher;
pub use block_cache::BlockCache;
pub use long_term::LongTermCache;
pub use memory_store::MemoryStore;
pub use single_flight::SingleFlight;
pub use ttl_guard::TtlGuard;
