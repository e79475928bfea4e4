//! 业务逻辑服务层

mod auth_service;
mod domain_store;
mod job_store;

pub use auth_service::AuthService;
pub use domain_store::{DomainStore, DomainsState};
pub use job_store::{DomainJobs, JobStore, JobWatch, JobsState, PollState};

use std::sync::Arc;

use whois_bi_client::MonitorApi;

use crate::config::StoreConfig;

/// 服务上下文 - 持有所有依赖
///
/// 平台层创建此上下文，并注入 API 实现（HTTP 客户端或测试替身）。
pub struct StoreContext {
    /// 服务端 API
    pub api: Arc<dyn MonitorApi>,
    /// Store 行为配置
    pub config: StoreConfig,
}

impl StoreContext {
    /// 创建服务上下文
    #[must_use]
    pub fn new(api: Arc<dyn MonitorApi>, config: StoreConfig) -> Self {
        Self { api, config }
    }
}
