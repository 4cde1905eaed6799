//! ReqRes users client library
//!
//! Fetches users from the ReqRes API with bounded retry and an in-memory
//! read-through cache. [`UserQueryService`] is the entry point.

pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod retry;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use data::UserRecord;
pub use error::ApiFailure;
pub use service::UserQueryService;
