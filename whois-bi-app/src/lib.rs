//! Application bootstrap for the whois-bi client.
//!
//! Provides `AppState` (store container), `AppStateBuilder` (API injection)
//! and `AppConfig` (TOML + environment configuration).

pub mod config;

use std::sync::Arc;

use whois_bi_client::{ApiClient, MonitorApi};
use whois_bi_core::error::CoreResult;
use whois_bi_core::services::{AuthService, DomainStore, JobStore, JobWatch, StoreContext};

pub use config::AppConfig;

/// Application state.
///
/// Holds every store and the shared `StoreContext`. Frontends construct
/// this once at startup via `AppStateBuilder`.
pub struct AppState {
    /// Store context (API and store settings)
    pub ctx: Arc<StoreContext>,
    /// Session service
    pub auth: AuthService,
    /// Domain store
    pub domains: Arc<DomainStore>,
    /// Job store
    pub jobs: Arc<JobStore>,
}

impl AppState {
    /// Check the session and, when logged in, load the domain list.
    ///
    /// Returns whether the session is valid.
    pub async fn run_startup(&self) -> CoreResult<bool> {
        if !self.auth.check_status().await? {
            log::info!("Not logged in");
            return Ok(false);
        }
        let domains = self.domains.list_domains().await?;
        log::info!("Session restored, {} domains loaded", domains.len());
        Ok(true)
    }

    /// Start polling jobs of `name`; see [`JobStore::watch`].
    pub fn watch_domain(&self, name: &str) -> JobWatch {
        self.jobs.watch(name)
    }

    /// Stop every background poll.
    pub fn shutdown(&self) {
        self.jobs.shutdown();
    }
}

/// Builder for constructing `AppState`.
///
/// # Optional
/// - `api`: defaults to an [`ApiClient`] built from `config.client`
pub struct AppStateBuilder {
    config: AppConfig,
    api: Option<Arc<dyn MonitorApi>>,
}

impl AppStateBuilder {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self { config, api: None }
    }

    #[must_use]
    pub fn api(mut self, api: Arc<dyn MonitorApi>) -> Self {
        self.api = Some(api);
        self
    }

    /// Build the `AppState`.
    ///
    /// # Errors
    /// Returns `CoreError::ConfigError` for invalid settings, or the client
    /// error if the HTTP client cannot be created.
    pub fn build(self) -> CoreResult<AppState> {
        self.config.validate()?;

        let api: Arc<dyn MonitorApi> = match self.api {
            Some(api) => api,
            None => Arc::new(ApiClient::new(&self.config.client)?),
        };

        let ctx = Arc::new(StoreContext::new(api, self.config.store));
        let auth = AuthService::new(Arc::clone(&ctx));
        let domains = Arc::new(DomainStore::new(Arc::clone(&ctx)));
        let jobs = Arc::new(JobStore::new(Arc::clone(&ctx), Arc::clone(&domains)));

        Ok(AppState {
            ctx,
            auth,
            domains,
            jobs,
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}
