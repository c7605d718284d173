use crate::domain::model::Identity;
use crate::domain::ports::SessionResolver;
use crate::utils::error::{AppError, Result};
use axum::http::{HeaderMap, HeaderName};

pub const DEFAULT_SESSION_HEADER: &str = "x-auth-email";

/// 信任上游驗證代理寫入的 header 作為登入身分
#[derive(Debug, Clone)]
pub struct HeaderSessionResolver {
    header: HeaderName,
}

impl HeaderSessionResolver {
    pub fn new(header: &str) -> Result<Self> {
        let header = HeaderName::from_bytes(header.trim().to_ascii_lowercase().as_bytes())
            .map_err(|e| AppError::InvalidConfigValueError {
                field: "auth.session_header".to_string(),
                value: header.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self { header })
    }
}

impl Default for HeaderSessionResolver {
    fn default() -> Self {
        Self {
            header: HeaderName::from_static(DEFAULT_SESSION_HEADER),
        }
    }
}

impl SessionResolver for HeaderSessionResolver {
    fn resolve(&self, headers: &HeaderMap) -> Option<Identity> {
        let value = headers.get(&self.header)?.to_str().ok()?.trim();
        if value.is_empty() {
            return None;
        }
        Some(Identity::new(value))
    }
}
