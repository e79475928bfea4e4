//! 域名状态管理
//!
//! Keeps the domain list, per-domain records and WHOIS snapshots, and the
//! search query. Every successful operation publishes a new
//! [`DomainsState`] snapshot; failed operations leave the state untouched.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::watch;
use whois_bi_client::{AddRecordResponse, BatchItem, Domain, DomainDetail, Record, Whois};

use crate::config::RecordsRefreshPolicy;
use crate::error::{CoreError, CoreResult};
use crate::search;
use crate::services::StoreContext;

/// 域名状态快照
#[derive(Debug, Clone, Default)]
pub struct DomainsState {
    domains: Vec<Domain>,
    by_name: HashMap<String, Domain>,
    /// domain id -> all records, current and historical
    records: HashMap<i64, Vec<Record>>,
    /// domain id -> active WHOIS snapshot
    whois: HashMap<i64, Whois>,
    /// domain id -> WHOIS history, newest first
    whois_history: HashMap<i64, Vec<Whois>>,
    query: String,
}

impl DomainsState {
    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    pub fn domain(&self, name: &str) -> Option<&Domain> {
        self.by_name.get(name)
    }

    /// Like [`Self::domain`], failing with [`CoreError::DomainNotFound`].
    pub fn require(&self, name: &str) -> CoreResult<&Domain> {
        self.by_name
            .get(name)
            .ok_or_else(|| CoreError::DomainNotFound(name.to_string()))
    }

    pub fn records(&self, domain_id: i64) -> &[Record] {
        self.records.get(&domain_id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn whois(&self, domain_id: i64) -> Option<&Whois> {
        self.whois.get(&domain_id)
    }

    pub fn whois_history(&self, domain_id: i64) -> &[Whois] {
        self.whois_history.get(&domain_id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Domains matching the current query.
    pub fn filtered_domains(&self) -> Cow<'_, [Domain]> {
        search::filter(&self.domains, &self.query)
    }

    /// Current records of a domain matching the current query.
    pub fn current_records(&self, domain_id: i64) -> Vec<Record> {
        let (current, _) = search::partition_records(self.records(domain_id));
        search::filter(&current, &self.query).into_owned()
    }

    /// Removed records of a domain matching the current query.
    pub fn historical_records(&self, domain_id: i64) -> Vec<Record> {
        let (_, historical) = search::partition_records(self.records(domain_id));
        search::filter(&historical, &self.query).into_owned()
    }

    /// Store id of `name`, falling back to what the payload says.
    fn domain_id(&self, name: &str, fallback: Option<i64>) -> Option<i64> {
        self.by_name.get(name).map(|d| d.id).or(fallback)
    }

    fn set_domains(&mut self, domains: Vec<Domain>) {
        self.domains = domains;
        self.rebuild_index();
    }

    /// Replace in place when the id is known, append otherwise.
    fn upsert(&mut self, domain: Domain) {
        match self.domains.iter_mut().find(|d| d.id == domain.id) {
            Some(slot) => *slot = domain,
            None => self.domains.push(domain),
        }
        self.rebuild_index();
    }

    fn remove(&mut self, name: &str) {
        let Some(id) = self.by_name.get(name).map(|d| d.id) else {
            return;
        };
        self.domains.retain(|d| d.id != id);
        self.records.remove(&id);
        self.whois.remove(&id);
        self.whois_history.remove(&id);
        self.rebuild_index();
    }

    fn rebuild_index(&mut self) {
        self.by_name = self
            .domains
            .iter()
            .map(|d| (d.name.clone(), d.clone()))
            .collect();
    }
}

/// 域名 Store
pub struct DomainStore {
    ctx: Arc<StoreContext>,
    state: watch::Sender<Arc<DomainsState>>,
}

impl DomainStore {
    /// 创建域名 Store
    #[must_use]
    pub fn new(ctx: Arc<StoreContext>) -> Self {
        let (state, _) = watch::channel(Arc::new(DomainsState::default()));
        Self { ctx, state }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<DomainsState> {
        Arc::clone(&self.state.borrow())
    }

    /// Receiver notified after every state change.
    pub fn subscribe(&self) -> watch::Receiver<Arc<DomainsState>> {
        self.state.subscribe()
    }

    fn update(&self, f: impl FnOnce(&mut DomainsState)) {
        self.state.send_modify(|current| {
            let mut next = DomainsState::clone(current);
            f(&mut next);
            *current = Arc::new(next);
        });
    }

    /// 刷新域名列表
    pub async fn list_domains(&self) -> CoreResult<Vec<Domain>> {
        let domains = self.ctx.api.list_domains().await?;
        log::debug!("Loaded {} domains", domains.len());
        self.update(|s| s.set_domains(domains.clone()));
        Ok(domains)
    }

    /// 获取域名详情
    ///
    /// Embedded records and WHOIS, when present, replace the stored ones.
    pub async fn get_domain(&self, name: &str) -> CoreResult<DomainDetail> {
        let detail = self.ctx.api.get_domain(name).await?;
        self.update(|s| {
            let id = detail.domain.id;
            s.upsert(detail.domain.clone());
            if let Some(records) = &detail.records {
                s.records.insert(id, records.clone());
            }
            if let Some(whois) = &detail.whois {
                s.whois.insert(id, whois.clone());
                // 最新的 WHOIS 也是历史的第一条
                let history = s.whois_history.entry(id).or_default();
                if history.first().map(|w| w.id) != Some(whois.id) {
                    history.retain(|w| w.id != whois.id);
                    history.insert(0, whois.clone());
                }
            }
        });
        Ok(detail)
    }

    /// 刷新解析记录
    pub async fn get_records(&self, name: &str) -> CoreResult<Vec<Record>> {
        let records = self.ctx.api.list_records(name).await?;

        if records.is_empty() && self.ctx.config.records_policy == RecordsRefreshPolicy::KeepOnEmpty
        {
            log::debug!("Empty record list for {name}, keeping stored records");
            return Ok(records);
        }

        let snapshot = self.snapshot();
        let Some(id) = snapshot.domain_id(name, records.first().map(|r| r.domain_id)) else {
            log::debug!("Records for unknown domain {name} not stored");
            return Ok(records);
        };
        self.update(|s| {
            s.records.insert(id, records.clone());
        });
        Ok(records)
    }

    /// 刷新 WHOIS 历史
    ///
    /// The newest snapshot becomes the active one.
    pub async fn get_whois(&self, name: &str) -> CoreResult<Vec<Whois>> {
        let history = self.ctx.api.list_whois(name).await?;
        let Some(newest) = history.first().cloned() else {
            log::debug!("No WHOIS snapshots for {name}");
            return Ok(history);
        };

        let snapshot = self.snapshot();
        let Some(id) = snapshot.domain_id(name, Some(newest.domain_id)) else {
            return Ok(history);
        };
        self.update(|s| {
            s.whois.insert(id, newest);
            s.whois_history.insert(id, history.clone());
        });
        Ok(history)
    }

    /// 添加监控域名
    pub async fn create_domain(&self, name: &str) -> CoreResult<Domain> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::ValidationError(
                "Domain name is empty".to_string(),
            ));
        }
        let domain = self.ctx.api.create_domain(name).await?;
        log::info!("Added domain {} (id {})", domain.name, domain.id);
        self.update(|s| s.upsert(domain.clone()));
        Ok(domain)
    }

    /// 批量添加域名
    ///
    /// `batch_text` holds one domain per line; blank lines are ignored.
    /// Returns one item per name in input order. Only the created domains
    /// are added to the list.
    pub async fn create_domains(&self, batch_text: &str) -> CoreResult<Vec<BatchItem>> {
        let names = parse_batch(batch_text);
        if names.is_empty() {
            return Err(CoreError::ValidationError(
                "No domain names given".to_string(),
            ));
        }

        let results = self.ctx.api.create_domains(&names).await;
        let created: Vec<Domain> = results
            .iter()
            .filter_map(BatchItem::domain)
            .cloned()
            .collect();
        log::info!(
            "Batch add: {} created, {} failed",
            created.len(),
            results.len() - created.len()
        );

        if !created.is_empty() {
            self.update(|s| {
                for domain in created {
                    s.upsert(domain);
                }
            });
        }
        Ok(results)
    }

    /// 删除监控域名
    pub async fn delete_domain(&self, name: &str) -> CoreResult<()> {
        self.ctx.api.delete_domain(name).await?;
        log::info!("Deleted domain {name}");
        self.update(|s| s.remove(name));
        Ok(())
    }

    /// 提交原始记录文本
    ///
    /// Exactly the records the server accepted are appended; per-record
    /// parse errors come back in the response.
    pub async fn add_record(&self, name: &str, raw: &str) -> CoreResult<AddRecordResponse> {
        if raw.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "Record text is empty".to_string(),
            ));
        }

        let response = self.ctx.api.add_record(name, raw).await?;
        if !response.errors.is_empty() {
            log::warn!(
                "{} of the submitted records for {name} were rejected",
                response.errors.len()
            );
        }
        if response.records.is_empty() {
            return Ok(response);
        }

        let snapshot = self.snapshot();
        match snapshot.domain_id(name, response.records.first().map(|r| r.domain_id)) {
            Some(id) => self.update(|s| {
                s.records
                    .entry(id)
                    .or_default()
                    .extend(response.records.iter().cloned());
            }),
            None => log::debug!("Records for unknown domain {name} not stored"),
        }
        Ok(response)
    }

    /// 设置搜索关键字
    pub fn set_query(&self, query: &str) {
        let query = query.to_string();
        self.update(|s| s.query = query);
    }

    /// 清空搜索关键字
    pub fn reset_query(&self) {
        self.update(|s| s.query.clear());
    }
}

/// Non-blank trimmed lines of `text`.
fn parse_batch(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
