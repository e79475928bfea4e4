//! 共享测试工具和辅助函数

#![allow(dead_code)]

use whois_bi_client::{ApiClient, ClientConfig, Credentials};

/// 跳过测试的宏（当环境变量缺失时）
#[macro_export]
macro_rules! skip_if_no_server {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("跳过测试: 缺少环境变量 {}", $var);
                return;
            }
        )+
    };
}

/// 断言 `Result` 为 `Ok`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// Client pointed at `WHOIS_BI_TEST_URL`.
pub fn create_test_client() -> Option<ApiClient> {
    let base_url = std::env::var("WHOIS_BI_TEST_URL").ok()?;
    ApiClient::new(&ClientConfig {
        base_url,
        ..ClientConfig::default()
    })
    .ok()
}

/// Credentials of a verified account on the test server.
pub fn test_credentials() -> Option<Credentials> {
    let email = std::env::var("WHOIS_BI_TEST_EMAIL").ok()?;
    let password = std::env::var("WHOIS_BI_TEST_PASSWORD").ok()?;
    Some(Credentials::new(email, password))
}

/// Unique domain name for a test run.
pub fn generate_test_domain() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or_default();
    format!("test-{nanos:08x}.example.com")
}
