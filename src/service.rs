//! User query service
//!
//! The public entry point: every call goes through the read-through cache,
//! whose fetch runs the retry-wrapped user source.

use std::time::Duration;

use tracing::instrument;

use crate::cache::{user_key, ReadThroughCache, ALL_USERS_KEY};
use crate::config::{CacheSettings, Settings};
use crate::data::{HttpTransport, RemoteUserSource, UserRecord, UserSource};
use crate::error::{ConfigError, Result};
use crate::retry::{RetryPolicy, Retrying};

/// Cached, retrying access to users
#[derive(Debug)]
pub struct UserQueryService<S> {
    cache: ReadThroughCache,
    source: Retrying<S>,
    ttl: Duration,
}

impl UserQueryService<RemoteUserSource> {
    /// Wires the HTTP-backed service from settings
    pub fn from_settings(settings: &Settings) -> std::result::Result<Self, ConfigError> {
        settings.validate()?;
        let transport = HttpTransport::new(&settings.api_settings)?;
        Ok(Self::new(
            RemoteUserSource::new(transport),
            RetryPolicy::from_settings(&settings.retry_policy_settings),
            &settings.cache_settings,
        ))
    }
}

impl<S: UserSource> UserQueryService<S> {
    /// Composes a service around any user source
    pub fn new(source: S, retry: RetryPolicy, cache_settings: &CacheSettings) -> Self {
        Self {
            cache: ReadThroughCache::new(),
            source: Retrying::new(source, retry),
            ttl: cache_settings.ttl(),
        }
    }

    /// Returns one user, from cache when fresh
    #[instrument(skip(self))]
    pub async fn get_user(&self, id: u32) -> Result<UserRecord> {
        self.cache
            .get_or_fetch(&user_key(id), self.ttl, || self.source.fetch_user_by_id(id))
            .await
    }

    /// Returns every user, from cache when fresh
    #[instrument(skip(self))]
    pub async fn get_all_users(&self) -> Result<Vec<UserRecord>> {
        self.cache
            .get_or_fetch(ALL_USERS_KEY, self.ttl, || self.source.fetch_all_users())
            .await
    }

    /// The underlying cache
    pub fn cache(&self) -> &ReadThroughCache {
        &self.cache
    }

    /// Time-to-live applied to new entries
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
