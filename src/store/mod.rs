//! Local persistent tier.
//!
//! Durable string key/value storage used as the default backend and as the
//! universal cache for every remote backend. One entry per collection under a
//! primary key plus a mirrored cache key, one entry per backend credential set,
//! and one entry for the active mode flag.

pub mod backend;

pub use backend::{
    FileKeyValueStore, KeyValueStore, KeyValueStoreExt, MemoryKeyValueStore, StorageError,
    StorageResult, StoreBuilder,
};
