//! HTTP implementation of [`MonitorApi`].

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::config::{ClientConfig, JobsRoute};
use crate::error::{ClientError, Result};
use crate::http_client::HttpUtils;
use crate::traits::MonitorApi;
use crate::types::{
    AddRecordRequest, AddRecordResponse, CreateDomainRequest, Credentials, Domain, DomainDetail,
    Job, Record, Whois,
};
use crate::utils::log_sanitizer::redact_body;

/// REST client for the whois-bi API.
///
/// Holds the connection pool and an in-memory cookie jar carrying the
/// session; nothing is written to disk.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    jobs_route: JobsRoute,
}

impl ApiClient {
    /// Build a client from configuration.
    ///
    /// Fails with [`ClientError::InvalidUrl`] if `base_url` is not an absolute URL.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let parsed = Url::parse(&config.base_url).map_err(|e| ClientError::InvalidUrl {
            detail: format!("{}: {e}", config.base_url),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl {
                detail: format!("{} cannot be used as a base URL", config.base_url),
            });
        }

        let client = Client::builder()
            .cookie_store(true)
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Transport {
                status: None,
                detail: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            jobs_route: config.jobs_route,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(&self, request: RequestBuilder, method: &str, url: &str) -> Result<Value> {
        let response = HttpUtils::execute_request(request, method, url).await?;
        HttpUtils::classify_response(&response).inspect_err(|e| {
            if e.is_expected() {
                log::warn!("{method} {url} failed: {e}");
            } else {
                log::error!("{method} {url} failed: {e}");
            }
        })
    }

    /// 执行 GET 请求
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let value = self.send(self.client.get(&url), "GET", &url).await?;
        HttpUtils::parse_json(value)
    }

    /// 执行 POST 请求（JSON body）
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.url(path);
        let body = serde_json::to_value(body).map_err(|e| ClientError::Serialization {
            detail: e.to_string(),
        })?;
        log::debug!("Request Body: {}", redact_body(&body));

        let value = self
            .send(self.client.post(&url).json(&body), "POST", &url)
            .await?;
        HttpUtils::parse_json(value)
    }

    /// 执行 DELETE 请求
    pub async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path);
        self.send(self.client.delete(&url), "DELETE", &url).await?;
        Ok(())
    }
}

/// Percent-encode one path segment.
fn segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

/// Empty JSON object body.
fn empty_body() -> Value {
    Value::Object(serde_json::Map::new())
}

#[async_trait]
impl MonitorApi for ApiClient {
    async fn status(&self) -> Result<()> {
        self.get::<Value>("/api/user/status").await.map(|_| ())
    }

    async fn login(&self, credentials: &Credentials) -> Result<()> {
        self.post::<Value, _>("/api/login", credentials)
            .await
            .map(|_| ())
    }

    async fn logout(&self) -> Result<()> {
        self.get::<Value>("/api/logout").await.map(|_| ())
    }

    async fn register(&self, credentials: &Credentials) -> Result<()> {
        self.post::<Value, _>("/api/register", credentials)
            .await
            .map(|_| ())
    }

    async fn verify(&self, code: &str) -> Result<()> {
        self.post::<Value, _>(&format!("/api/verify/{}", segment(code)), &empty_body())
            .await
            .map(|_| ())
    }

    async fn list_domains(&self) -> Result<Vec<Domain>> {
        let domains: Option<Vec<Domain>> = self.get("/api/user/domains").await?;
        Ok(domains.unwrap_or_default())
    }

    async fn get_domain(&self, name: &str) -> Result<DomainDetail> {
        self.get(&format!("/api/user/domain/{}", segment(name)))
            .await
    }

    async fn create_domain(&self, name: &str) -> Result<Domain> {
        self.post("/api/user/domain", &CreateDomainRequest { domain: name })
            .await
    }

    async fn delete_domain(&self, name: &str) -> Result<()> {
        self.delete(&format!("/api/user/domain/{}", segment(name)))
            .await
    }

    async fn list_records(&self, name: &str) -> Result<Vec<Record>> {
        let records: Option<Vec<Record>> = self
            .get(&format!("/api/user/domain/{}/records", segment(name)))
            .await?;
        Ok(records.unwrap_or_default())
    }

    async fn add_record(&self, name: &str, raw: &str) -> Result<AddRecordResponse> {
        self.post(
            &format!("/api/user/domain/{}/record", segment(name)),
            &AddRecordRequest { raw },
        )
        .await
    }

    async fn list_whois(&self, name: &str) -> Result<Vec<Whois>> {
        let whois: Option<Vec<Whois>> = self
            .get(&format!("/api/user/domain/{}/whois", segment(name)))
            .await?;
        Ok(whois.unwrap_or_default())
    }

    async fn list_jobs(&self, name: &str) -> Result<Vec<Job>> {
        let jobs: Option<Vec<Job>> = self
            .get(&self.jobs_route.history_path(&segment(name)))
            .await?;
        Ok(jobs.unwrap_or_default())
    }

    async fn create_job(&self, name: &str) -> Result<Job> {
        self.post(&format!("/api/user/jobs/{}", segment(name)), &empty_body())
            .await
    }
}
