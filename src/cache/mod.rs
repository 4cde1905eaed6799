//! Cache module for query results
//!
//! This module provides an in-memory read-through cache with a per-entry TTL.
//! Entries for a single user and for the full user list are kept under
//! separate keys and never affect one another.

mod manager;

pub use manager::{
    user_key, CachedData, CachedValue, Cacheable, ReadThroughCache, ALL_USERS_KEY, DEFAULT_TTL,
};
