//! 测试辅助模块
//!
//! 提供 mock 实现和便捷的测试工厂方法。

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use whois_bi_client::{
    AddRecordResponse, ClientError, Credentials, Domain, DomainDetail, Job, MonitorApi, Record,
    Result, Whois,
};

use crate::config::StoreConfig;
use crate::services::StoreContext;

// ===== Factories =====

pub fn domain(id: i64, name: &str) -> Domain {
    Domain {
        id,
        name: name.to_string(),
        ..Domain::default()
    }
}

pub fn record(
    id: i64,
    domain_id: i64,
    name: &str,
    rr_type: &str,
    ttl: u32,
    fields: &str,
    removed_at: &str,
) -> Record {
    Record {
        id,
        domain_id,
        name: name.to_string(),
        rr_type: rr_type.to_string(),
        ttl,
        fields: fields.to_string(),
        removed_at: removed_at.to_string(),
        ..Record::default()
    }
}

pub fn job(id: i64, domain_id: i64, finished: bool) -> Job {
    Job {
        id,
        domain_id,
        created_at: "2024-05-01T12:00:00Z".to_string(),
        finished_at: if finished {
            "2024-05-01T12:00:05Z".to_string()
        } else {
            String::new()
        },
        ..Job::default()
    }
}

pub fn whois(id: i64, domain_id: i64, expiration_date: &str) -> Whois {
    Whois {
        id,
        domain_id,
        expiration_date: expiration_date.to_string(),
        ..Whois::default()
    }
}

pub fn api_error(message: &str) -> ClientError {
    ClientError::Api {
        status: 400,
        message: message.to_string(),
    }
}

pub fn connection_error() -> ClientError {
    ClientError::Transport {
        status: None,
        detail: "connection refused".to_string(),
    }
}

pub fn context(api: Arc<MockApi>, config: StoreConfig) -> Arc<StoreContext> {
    Arc::new(StoreContext::new(api, config))
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap()
}

// ===== MockApi =====

/// In-memory [`MonitorApi`] with scripted responses and call counters.
#[derive(Default)]
pub struct MockApi {
    calls: Mutex<HashMap<&'static str, usize>>,
    next_id: AtomicI64,

    status: Mutex<Option<ClientError>>,
    login_error: Mutex<Option<ClientError>>,
    logout_error: Mutex<Option<ClientError>>,

    domains: Mutex<Vec<Domain>>,
    list_domains_error: Mutex<Option<ClientError>>,
    details: Mutex<HashMap<String, DomainDetail>>,
    rejected: Mutex<HashSet<String>>,

    records: Mutex<HashMap<String, Vec<Record>>>,
    add_record: Mutex<HashMap<String, AddRecordResponse>>,
    whois: Mutex<HashMap<String, Vec<Whois>>>,

    /// Responses for `list_jobs`, consumed front to back; the last one sticks.
    jobs: Mutex<VecDeque<Result<Vec<Job>>>>,
    created_job: Mutex<Option<Job>>,
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicI64::new(100),
            ..Self::default()
        })
    }

    fn hit(&self, method: &'static str) {
        *lock(&self.calls).entry(method).or_default() += 1;
    }

    pub fn calls(&self, method: &str) -> usize {
        lock(&self.calls).get(method).copied().unwrap_or(0)
    }

    pub fn set_status(&self, result: Option<ClientError>) {
        *lock(&self.status) = result;
    }

    pub fn set_login_error(&self, err: Option<ClientError>) {
        *lock(&self.login_error) = err;
    }

    pub fn set_logout_error(&self, err: Option<ClientError>) {
        *lock(&self.logout_error) = err;
    }

    pub fn set_domains(&self, domains: Vec<Domain>) {
        *lock(&self.domains) = domains;
    }

    pub fn set_list_domains_error(&self, err: Option<ClientError>) {
        *lock(&self.list_domains_error) = err;
    }

    pub fn set_detail(&self, name: &str, detail: DomainDetail) {
        lock(&self.details).insert(name.to_string(), detail);
    }

    pub fn reject(&self, name: &str) {
        lock(&self.rejected).insert(name.to_string());
    }

    pub fn set_records(&self, name: &str, records: Vec<Record>) {
        lock(&self.records).insert(name.to_string(), records);
    }

    pub fn set_add_record(&self, name: &str, response: AddRecordResponse) {
        lock(&self.add_record).insert(name.to_string(), response);
    }

    pub fn set_whois(&self, name: &str, history: Vec<Whois>) {
        lock(&self.whois).insert(name.to_string(), history);
    }

    pub fn push_jobs(&self, response: Result<Vec<Job>>) {
        lock(&self.jobs).push_back(response);
    }

    pub fn set_created_job(&self, job: Job) {
        *lock(&self.created_job) = Some(job);
    }

    fn find_domain(&self, name: &str) -> Option<Domain> {
        lock(&self.domains).iter().find(|d| d.name == name).cloned()
    }
}

#[async_trait]
impl MonitorApi for MockApi {
    async fn status(&self) -> Result<()> {
        self.hit("status");
        lock(&self.status).clone().map_or(Ok(()), Err)
    }

    async fn login(&self, _credentials: &Credentials) -> Result<()> {
        self.hit("login");
        lock(&self.login_error).clone().map_or(Ok(()), Err)
    }

    async fn logout(&self) -> Result<()> {
        self.hit("logout");
        lock(&self.logout_error).clone().map_or(Ok(()), Err)
    }

    async fn register(&self, _credentials: &Credentials) -> Result<()> {
        self.hit("register");
        Ok(())
    }

    async fn verify(&self, code: &str) -> Result<()> {
        self.hit("verify");
        if code == "000000" {
            return Err(api_error("Invalid verification code"));
        }
        Ok(())
    }

    async fn list_domains(&self) -> Result<Vec<Domain>> {
        self.hit("list_domains");
        if let Some(err) = lock(&self.list_domains_error).clone() {
            return Err(err);
        }
        Ok(lock(&self.domains).clone())
    }

    async fn get_domain(&self, name: &str) -> Result<DomainDetail> {
        self.hit("get_domain");
        if let Some(detail) = lock(&self.details).get(name) {
            return Ok(detail.clone());
        }
        self.find_domain(name)
            .map(|domain| DomainDetail {
                domain,
                records: None,
                whois: None,
            })
            .ok_or_else(|| api_error("Not found"))
    }

    async fn create_domain(&self, name: &str) -> Result<Domain> {
        self.hit("create_domain");
        if lock(&self.rejected).contains(name) {
            return Err(api_error(&format!("Invalid Domain: '{name}'")));
        }
        let created = domain(self.next_id.fetch_add(1, Ordering::Relaxed), name);
        lock(&self.domains).push(created.clone());
        Ok(created)
    }

    async fn delete_domain(&self, name: &str) -> Result<()> {
        self.hit("delete_domain");
        let mut domains = lock(&self.domains);
        let before = domains.len();
        domains.retain(|d| d.name != name);
        if domains.len() == before {
            return Err(api_error("Not found"));
        }
        Ok(())
    }

    async fn list_records(&self, name: &str) -> Result<Vec<Record>> {
        self.hit("list_records");
        Ok(lock(&self.records).get(name).cloned().unwrap_or_default())
    }

    async fn add_record(&self, name: &str, _raw: &str) -> Result<AddRecordResponse> {
        self.hit("add_record");
        Ok(lock(&self.add_record).get(name).cloned().unwrap_or_default())
    }

    async fn list_whois(&self, name: &str) -> Result<Vec<Whois>> {
        self.hit("list_whois");
        Ok(lock(&self.whois).get(name).cloned().unwrap_or_default())
    }

    async fn list_jobs(&self, _name: &str) -> Result<Vec<Job>> {
        self.hit("list_jobs");
        let mut queue = lock(&self.jobs);
        if queue.len() > 1 {
            return queue.pop_front().unwrap_or_else(|| Ok(Vec::new()));
        }
        queue.front().cloned().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn create_job(&self, name: &str) -> Result<Job> {
        self.hit("create_job");
        if let Some(job) = lock(&self.created_job).clone() {
            return Ok(job);
        }
        let domain_id = self.find_domain(name).map_or(0, |d| d.id);
        Ok(job(self.next_id.fetch_add(1, Ordering::Relaxed), domain_id, false))
    }
}
