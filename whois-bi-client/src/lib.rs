//! # whois-bi-client
//!
//! Typed async client for the whois-bi domain monitoring REST API.
//!
//! ## Feature Flags
//!
//! - **`native-tls`** *(default)*: Use the platform's native TLS implementation.
//! - **`rustls`**: Use rustls. Recommended for cross-compilation.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use whois_bi_client::{ApiClient, ClientConfig, Credentials, MonitorApi};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::new(&ClientConfig {
//!         base_url: "https://whois.example".to_string(),
//!         ..ClientConfig::default()
//!     })?;
//!
//!     client
//!         .login(&Credentials::new("me@example.com", "secret"))
//!         .await?;
//!
//!     for domain in client.list_domains().await? {
//!         println!("{} (last checked {})", domain.name, domain.last_job_at);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every call returns [`ClientError`]. A body of the form `{"Error": "..."}`
//! (or `{"error": "..."}`) is always an [`ClientError::Api`] failure, whatever
//! the HTTP status; other non-2xx responses are [`ClientError::Transport`].

mod client;
mod config;
mod error;
mod http_client;
mod traits;
mod types;
pub mod utils;

pub use client::ApiClient;
pub use config::{ClientConfig, JobsRoute};
pub use error::{ClientError, Result};
pub use http_client::{HttpUtils, RawResponse};
pub use traits::MonitorApi;
pub use types::{
    AddRecordResponse, BatchItem, BatchOutcome, Credentials, Domain, DomainDetail, Job, Record,
    Whois,
};
