//! Remote user source backed by the ReqRes API
//!
//! Fetches single users and drains the paginated user list. This is the only
//! place transport and JSON errors are seen; everything leaving this module is
//! an `ApiFailure`.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::transport::{HttpTransport, RawResponse};
use super::{PageEnvelope, UserEnvelope, UserRecord};
use crate::error::{ApiFailure, Result};

/// Anything that can produce users by id or as a full list
#[async_trait]
pub trait UserSource: Send + Sync {
    /// Fetches one user by id
    async fn fetch_user_by_id(&self, id: u32) -> Result<UserRecord>;

    /// Fetches every user across all pages, in page order
    async fn fetch_all_users(&self) -> Result<Vec<UserRecord>>;
}

#[async_trait]
impl<S: UserSource + ?Sized> UserSource for Arc<S> {
    async fn fetch_user_by_id(&self, id: u32) -> Result<UserRecord> {
        (**self).fetch_user_by_id(id).await
    }

    async fn fetch_all_users(&self) -> Result<Vec<UserRecord>> {
        (**self).fetch_all_users().await
    }
}

/// User source that calls the remote API over HTTP
#[derive(Debug, Clone)]
pub struct RemoteUserSource {
    transport: HttpTransport,
}

impl RemoteUserSource {
    /// Creates a source using the given transport
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }

    /// Path for a single user
    fn user_path(id: u32) -> String {
        format!("users/{}", id)
    }

    /// Path for one page of the user list
    fn page_path(page: u32) -> String {
        format!("users?page={}", page)
    }

    /// Issues a GET, translating transport failures
    async fn get(&self, path: &str) -> Result<RawResponse> {
        Ok(self.transport.get(path).await?)
    }

    /// Fetches a single page of the user list
    async fn fetch_page(&self, page: u32) -> Result<PageEnvelope> {
        let response = self.get(&Self::page_path(page)).await?;

        if !response.status.is_success() {
            return Err(ApiFailure::RemoteError {
                context: format!("fetch users page {}", page),
                status: response.status.as_u16(),
                reason: response.reason(),
            });
        }

        parse_body(&response.body)
    }
}

/// Parses a JSON body, translating parse errors
fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T> {
    Ok(serde_json::from_str(body)?)
}

#[async_trait]
impl UserSource for RemoteUserSource {
    async fn fetch_user_by_id(&self, id: u32) -> Result<UserRecord> {
        let response = self.get(&Self::user_path(id)).await?;

        if response.status == StatusCode::NOT_FOUND {
            return Err(ApiFailure::NotFound(id));
        }
        if !response.status.is_success() {
            return Err(ApiFailure::RemoteError {
                context: format!("fetch user {}", id),
                status: response.status.as_u16(),
                reason: response.reason(),
            });
        }

        let envelope: UserEnvelope = parse_body(&response.body)?;
        envelope
            .data
            .ok_or_else(|| ApiFailure::InvalidPayload("user data".to_string()))
    }

    async fn fetch_all_users(&self) -> Result<Vec<UserRecord>> {
        let mut users = Vec::new();
        let mut page = 1;

        loop {
            let envelope = self.fetch_page(page).await?;
            let data = envelope
                .data
                .ok_or_else(|| ApiFailure::InvalidPayload("user list data".to_string()))?;

            debug!(page, items = data.len(), total_pages = envelope.total_pages, "Page fetched");
            users.extend(data);

            // The server's bound is re-read on every page.
            let total_pages = envelope.total_pages;
            page += 1;

            if page > total_pages {
                break;
            }
        }

        info!(pages = page - 1, users = users.len(), "User list drained");
        Ok(users)
    }
}
