//! Data models and remote access for the ReqRes users API
//!
//! This module contains the wire types returned by the API, the HTTP
//! transport, and the remote user source that turns responses into records.

pub mod transport;
pub mod users;

pub use transport::{HttpTransport, RawResponse};
pub use users::{RemoteUserSource, UserSource};

use serde::{Deserialize, Serialize};

/// A single user as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Unique identifier for the user
    pub id: u32,
    /// Email address
    pub email: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Avatar image URL
    #[serde(rename = "avatar")]
    pub avatar_url: String,
}

impl UserRecord {
    /// One-line summary, `"<id>: <first> <last> - <email>"`
    pub fn summary(&self) -> String {
        format!(
            "{}: {} {} - {}",
            self.id, self.first_name, self.last_name, self.email
        )
    }
}

/// Advisory block attached to every API response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Support {
    pub url: String,
    pub text: String,
}

/// Response body of `GET users/{id}`
#[derive(Debug, Deserialize)]
pub struct UserEnvelope {
    /// The user, if the API returned one
    pub data: Option<UserRecord>,
    #[serde(default)]
    pub support: Option<Support>,
}

/// Response body of `GET users?page={n}`
#[derive(Debug, Deserialize)]
pub struct PageEnvelope {
    /// Page number of this response
    #[serde(default)]
    pub page: u32,
    /// Page size used by the server
    #[serde(default)]
    pub per_page: u32,
    /// Total number of users across all pages
    #[serde(default)]
    pub total: u32,
    /// Number of pages the server declares
    #[serde(default)]
    pub total_pages: u32,
    /// Users on this page
    pub data: Option<Vec<UserRecord>>,
    #[serde(default)]
    pub support: Option<Support>,
}
