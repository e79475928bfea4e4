use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    AddRecordResponse, BatchItem, BatchOutcome, Credentials, Domain, DomainDetail, Job, Record,
    Whois,
};

/// whois-bi API Trait
///
/// Everything the stores need from the server. [`ApiClient`](crate::ApiClient)
/// implements it over HTTP; tests substitute an in-memory double.
#[async_trait]
pub trait MonitorApi: Send + Sync {
    // ===== Session =====

    /// Succeeds while the session cookie is valid.
    async fn status(&self) -> Result<()>;

    /// Start a session.
    async fn login(&self, credentials: &Credentials) -> Result<()>;

    /// End the session.
    async fn logout(&self) -> Result<()>;

    /// Create a pending account; the server emails a verification code.
    async fn register(&self, credentials: &Credentials) -> Result<()>;

    /// Activate an account with the emailed code.
    async fn verify(&self, code: &str) -> Result<()>;

    // ===== Domains =====

    /// List all domains of the authenticated user.
    async fn list_domains(&self) -> Result<Vec<Domain>>;

    /// Fetch one domain, plus embedded records/whois when the server sends them.
    async fn get_domain(&self, name: &str) -> Result<DomainDetail>;

    /// Start monitoring a domain.
    async fn create_domain(&self, name: &str) -> Result<Domain>;

    /// Stop monitoring a domain.
    async fn delete_domain(&self, name: &str) -> Result<()>;

    /// Create several domains
    ///
    /// 默认实现并发调用 `create_domain()`，按输入顺序返回每个域名的结果。
    /// 部分失败不会影响其他域名。
    async fn create_domains(&self, names: &[String]) -> Vec<BatchItem> {
        let futures: Vec<_> = names.iter().map(|name| self.create_domain(name)).collect();
        let results = futures::future::join_all(futures).await;

        names
            .iter()
            .zip(results)
            .map(|(name, result)| BatchItem {
                name: name.clone(),
                outcome: match result {
                    Ok(domain) => BatchOutcome::Created(domain),
                    Err(e) => BatchOutcome::Failed {
                        reason: e.user_message().to_string(),
                    },
                },
            })
            .collect()
    }

    // ===== Records =====

    /// All records of a domain, current and historical.
    async fn list_records(&self, name: &str) -> Result<Vec<Record>>;

    /// Submit raw record text (one record or a zone-file block) for parsing.
    async fn add_record(&self, name: &str, raw: &str) -> Result<AddRecordResponse>;

    // ===== Whois =====

    /// WHOIS snapshots of a domain, newest first.
    async fn list_whois(&self, name: &str) -> Result<Vec<Whois>>;

    // ===== Jobs =====

    /// Full job history of a domain.
    async fn list_jobs(&self, name: &str) -> Result<Vec<Job>>;

    /// Queue a check job for a domain.
    async fn create_job(&self, name: &str) -> Result<Job>;
}
