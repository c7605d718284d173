use crate::domain::model::Identity;
use crate::domain::ports::{AuthorizationPolicy, SessionResolver};
use crate::utils::error::{AppError, Result};
use axum::http::HeaderMap;
use std::collections::HashSet;
use std::sync::Arc;

/// 固定的 email 允許清單
#[derive(Debug, Clone)]
pub struct AllowListPolicy {
    emails: HashSet<String>,
}

impl AllowListPolicy {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            emails: emails
                .into_iter()
                .map(|e| e.as_ref().trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}

impl AuthorizationPolicy for AllowListPolicy {
    fn is_authorized(&self, identity: &Identity) -> bool {
        self.emails.contains(&identity.normalized_email())
    }

    fn name(&self) -> &'static str {
        "allow_list"
    }
}

pub const DEVELOPER_IDENTITY: &str = "developer@localhost";

/// 完全略過授權檢查，只能在非正式環境的設定中選用
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAllowPolicy;

impl AuthorizationPolicy for AlwaysAllowPolicy {
    fn is_authorized(&self, _identity: &Identity) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "always_allow"
    }

    fn anonymous_identity(&self) -> Option<Identity> {
        Some(Identity::new(DEVELOPER_IDENTITY))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Unauthenticated,
    NotAllowListed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    Authorized(Identity),
    Rejected(RejectReason),
}

/// 每個寫入請求都重新判斷，沒有狀態
pub struct AuthorizationGate {
    sessions: Arc<dyn SessionResolver>,
    policy: Arc<dyn AuthorizationPolicy>,
}

impl AuthorizationGate {
    pub fn new(sessions: Arc<dyn SessionResolver>, policy: Arc<dyn AuthorizationPolicy>) -> Self {
        Self { sessions, policy }
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    pub fn evaluate(&self, headers: &HeaderMap) -> AuthDecision {
        let identity = match self
            .sessions
            .resolve(headers)
            .or_else(|| self.policy.anonymous_identity())
        {
            Some(identity) => identity,
            None => return AuthDecision::Rejected(RejectReason::Unauthenticated),
        };
        if !self.policy.is_authorized(&identity) {
            return AuthDecision::Rejected(RejectReason::NotAllowListed);
        }
        AuthDecision::Authorized(identity)
    }

    /// 拒絕時對外一律回傳 Unauthorized，原因只寫進日誌
    pub fn authorize(&self, headers: &HeaderMap) -> Result<Identity> {
        match self.evaluate(headers) {
            AuthDecision::Authorized(identity) => Ok(identity),
            AuthDecision::Rejected(RejectReason::Unauthenticated) => {
                tracing::warn!("⛔ Rejected mutation: no session identity");
                Err(AppError::Unauthorized)
            }
            AuthDecision::Rejected(RejectReason::NotAllowListed) => {
                tracing::warn!(
                    "⛔ Rejected mutation: identity not permitted by {} policy",
                    self.policy.name()
                );
                Err(AppError::Unauthorized)
            }
        }
    }
}
