//! whois-bi Core Library
//!
//! Client-side state for the domain monitor:
//! - Auth service (session flag, registration checks)
//! - Domain store (domains, records, WHOIS snapshots, search query)
//! - Job store (job history and per-domain polling until jobs finish)
//!
//! Stores talk to the server only through the [`MonitorApi`] trait, so any
//! transport (or a test double) can be injected via [`StoreContext`].

pub mod config;
pub mod error;
pub mod search;
pub mod services;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use config::{JobHistoryPolicy, RecordsRefreshPolicy, StoreConfig};
pub use error::{CoreError, CoreResult};
pub use services::{
    AuthService, DomainJobs, DomainStore, DomainsState, JobStore, JobWatch, JobsState, PollState,
    StoreContext,
};
pub use whois_bi_client::MonitorApi;
