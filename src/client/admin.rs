use crate::adapters::session::DEFAULT_SESSION_HEADER;
use crate::app::payload::{ReorderRequest, ReorderResponse, SuccessResponse, VersionResponse};
use crate::domain::model::Collection;
use crate::utils::error::{AppError, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

/// 管理後台 API 的 HTTP client
#[derive(Debug, Clone)]
pub struct AdminClient {
    client: Client,
    base_url: Url,
    session_header: String,
    email: String,
}

#[derive(Debug, Deserialize)]
struct RemoteErrorBody {
    error: RemoteErrorDetail,
}

#[derive(Debug, Deserialize)]
struct RemoteErrorDetail {
    message: String,
}

impl AdminClient {
    pub fn new(base_url: &str, email: impl Into<String>) -> Result<Self> {
        let mut base_url = Url::parse(base_url).map_err(|e| AppError::InvalidConfigValueError {
            field: "base_url".to_string(),
            value: base_url.to_string(),
            reason: e.to_string(),
        })?;
        // 確保 join 時保留原本的路徑前綴
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            client: Client::new(),
            base_url,
            session_header: DEFAULT_SESSION_HEADER.to_string(),
            email: email.into(),
        })
    }

    pub fn with_session_header(mut self, header: impl Into<String>) -> Self {
        self.session_header = header.into();
        self
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::InvalidConfigValueError {
                field: "path".to_string(),
                value: path.to_string(),
                reason: e.to_string(),
            })
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(self.session_header.as_str(), self.email.as_str())
    }

    /// 非 2xx 回應轉成 RemoteError，訊息取自錯誤 body
    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        tracing::debug!("Admin API response status: {}", status);
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<RemoteErrorBody>(&text)
            .map(|body| body.error.message)
            .unwrap_or(text);
        Err(AppError::RemoteError {
            status: status.as_u16(),
            message,
        })
    }

    pub async fn list<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>> {
        let url = self.url(&format!("admin/{}", collection))?;
        let response = self.authed(self.client.get(url)).send().await?;
        Self::read_json(response).await
    }

    pub async fn create<P, T>(&self, collection: Collection, payload: &P) -> Result<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(&format!("admin/{}", collection))?;
        let response = self
            .authed(self.client.post(url))
            .json(payload)
            .send()
            .await?;
        Self::read_json(response).await
    }

    pub async fn update<P, T>(&self, collection: Collection, id: &str, payload: &P) -> Result<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(&format!("admin/{}/{}", collection, id))?;
        let response = self
            .authed(self.client.put(url))
            .json(payload)
            .send()
            .await?;
        Self::read_json(response).await
    }

    pub async fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        let url = self.url(&format!("admin/{}/{}", collection, id))?;
        let response = self.authed(self.client.delete(url)).send().await?;
        let _: SuccessResponse = Self::read_json(response).await?;
        Ok(())
    }

    /// 送出完整排列，回傳新的集合版本
    pub async fn reorder(
        &self,
        collection: Collection,
        ids: Vec<String>,
        expected_version: Option<u64>,
    ) -> Result<u64> {
        let url = self.url(&format!("admin/{}/reorder", collection))?;
        tracing::debug!("📤 Submitting {} ids for {} reorder", ids.len(), collection);
        let response = self
            .authed(self.client.put(url))
            .json(&ReorderRequest {
                ids,
                expected_version,
            })
            .send()
            .await?;
        let body: ReorderResponse = Self::read_json(response).await?;
        Ok(body.version)
    }

    pub async fn version(&self, collection: Collection) -> Result<u64> {
        let url = self.url(&format!("admin/{}/version", collection))?;
        let response = self.authed(self.client.get(url)).send().await?;
        let body: VersionResponse = Self::read_json(response).await?;
        Ok(body.version)
    }
}
