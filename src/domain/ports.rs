use crate::domain::model::{Identity, OrderedEntity};
use crate::utils::error::Result;
use async_trait::async_trait;
use axum::http::HeaderMap;

/// 單一排序集合的持久層
#[async_trait]
pub trait CollectionRepository<E: OrderedEntity>: Send + Sync {
    /// 依 order 由小到大
    async fn list_ordered(&self) -> Result<Vec<E>>;
    async fn find(&self, id: &str) -> Result<Option<E>>;
    /// 指派新 id 並排到最後
    async fn insert(&self, draft: E::Draft) -> Result<E>;
    /// 整筆取代可編輯欄位，order 不變；找不到回傳 None
    async fn update(&self, id: &str, draft: E::Draft) -> Result<Option<E>>;
    /// 不重新編號
    async fn delete(&self, id: &str) -> Result<bool>;
    /// 以單一交易套用完整排列，回傳新的集合版本
    async fn reorder(&self, ids: Vec<String>, expected_version: Option<u64>) -> Result<u64>;
    async fn version(&self) -> Result<u64>;
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// 寫入物件並回傳公開網址
    async fn put_object(
        &self,
        bucket: &str,
        path: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String>;
}

/// 公開頁面的渲染快取，以頁面路徑為鍵
///
/// 每個路徑帶一個世代號，`invalidate` 會遞增它。讀取端在查詢資料前先取得世代號，
/// 寫回時若世代號已變動就放棄寫入，避免把失效前讀到的舊資料存回快取。
pub trait PageCache: Send + Sync {
    fn get(&self, path: &str) -> Option<String>;
    fn generation(&self, path: &str) -> u64;
    /// 世代號不符時不寫入並回傳 false
    fn put(&self, path: &str, generation: u64, body: String) -> bool;
    fn invalidate(&self, path: &str);
}

pub trait AuthorizationPolicy: Send + Sync {
    fn is_authorized(&self, identity: &Identity) -> bool;
    fn name(&self) -> &'static str;

    /// 沒有 session 時代用的身分；只有開發用的放行策略會提供
    fn anonymous_identity(&self) -> Option<Identity> {
        None
    }
}

/// 從外部管理的 session 取得呼叫者身分
pub trait SessionResolver: Send + Sync {
    fn resolve(&self, headers: &HeaderMap) -> Option<Identity>;
}
