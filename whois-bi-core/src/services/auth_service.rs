//! 会话服务

use std::sync::Arc;

use tokio::sync::watch;
use whois_bi_client::{ClientError, Credentials};

use crate::error::{CoreError, CoreResult};
use crate::services::StoreContext;

/// 会话服务
///
/// Tracks whether the cookie session is valid. The flag is observable via
/// [`AuthService::subscribe`].
pub struct AuthService {
    ctx: Arc<StoreContext>,
    logged_in: watch::Sender<bool>,
}

impl AuthService {
    #[must_use]
    pub fn new(ctx: Arc<StoreContext>) -> Self {
        let (logged_in, _) = watch::channel(false);
        Self { ctx, logged_in }
    }

    pub fn is_logged_in(&self) -> bool {
        *self.logged_in.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.logged_in.subscribe()
    }

    fn set_logged_in(&self, value: bool) {
        self.logged_in.send_if_modified(|current| {
            let changed = *current != value;
            *current = value;
            changed
        });
    }

    /// 检查会话是否有效
    ///
    /// Any HTTP response other than success means logged out. Errors that
    /// never reached the server are returned and leave the flag alone.
    pub async fn check_status(&self) -> CoreResult<bool> {
        match self.ctx.api.status().await {
            Ok(()) => {
                self.set_logged_in(true);
                Ok(true)
            }
            Err(e @ (ClientError::Api { .. } | ClientError::Transport { status: Some(_), .. })) => {
                log::debug!("Session not valid: {e}");
                self.set_logged_in(false);
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// 登录
    pub async fn login(&self, email: &str, password: &str) -> CoreResult<()> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(CoreError::ValidationError(
                "Email and password are required".to_string(),
            ));
        }

        match self.ctx.api.login(&Credentials::new(email, password)).await {
            Ok(()) => {
                log::info!("Logged in as {email}");
                self.set_logged_in(true);
                Ok(())
            }
            Err(e) => {
                self.set_logged_in(false);
                Err(e.into())
            }
        }
    }

    /// 登出
    ///
    /// The local session ends even if the server call fails.
    pub async fn logout(&self) {
        if let Err(e) = self.ctx.api.logout().await {
            log::warn!("Logout request failed: {e}");
        }
        self.set_logged_in(false);
    }

    /// 注册账号
    pub async fn register(&self, email: &str, password: &str, confirm: &str) -> CoreResult<()> {
        let email = email.trim();
        if email.is_empty() {
            return Err(CoreError::ValidationError("Email is required".to_string()));
        }
        if password.is_empty() {
            return Err(CoreError::ValidationError(
                "Password is required".to_string(),
            ));
        }
        if password != confirm {
            return Err(CoreError::ValidationError(
                "Passwords do not match".to_string(),
            ));
        }

        self.ctx
            .api
            .register(&Credentials::new(email, password))
            .await?;
        log::info!("Registered {email}, waiting for verification");
        Ok(())
    }

    /// 验证邮箱
    pub async fn verify(&self, code: &str) -> CoreResult<()> {
        let code = code.trim();
        if code.is_empty() {
            return Err(CoreError::ValidationError(
                "Verification code is required".to_string(),
            ));
        }
        self.ctx.api.verify(code).await?;
        Ok(())
    }
}
