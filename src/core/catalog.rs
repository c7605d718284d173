use crate::domain::model::OrderedEntity;
use crate::domain::ports::{CollectionRepository, PageCache};
use crate::utils::error::{AppError, Result};
use std::sync::Arc;

/// 單一排序集合的 CRUD 與排序服務
///
/// 授權由上層 (HTTP middleware) 處理；這裡負責持久化與頁面快取失效。
pub struct CollectionService<E: OrderedEntity> {
    repository: Arc<dyn CollectionRepository<E>>,
    cache: Arc<dyn PageCache>,
}

impl<E: OrderedEntity> CollectionService<E> {
    pub fn new(repository: Arc<dyn CollectionRepository<E>>, cache: Arc<dyn PageCache>) -> Self {
        Self { repository, cache }
    }

    /// 公開列表，經過頁面快取
    pub async fn list_public(&self) -> Result<String> {
        let page = E::COLLECTION.public_listing_page();
        if let Some(body) = self.cache.get(page) {
            tracing::debug!("Serving {} from page cache", E::COLLECTION);
            return Ok(body);
        }

        // 世代號必須在查詢之前取得
        let generation = self.cache.generation(page);
        let items: Vec<E> = self
            .repository
            .list_ordered()
            .await?
            .iter()
            .map(E::public_view)
            .collect();
        let body = serde_json::to_string(&items)?;
        self.cache.put(page, generation, body.clone());
        Ok(body)
    }

    pub async fn list(&self) -> Result<Vec<E>> {
        self.repository.list_ordered().await
    }

    pub async fn get(&self, id: &str) -> Result<E> {
        self.repository
            .find(id)
            .await?
            .ok_or_else(|| AppError::not_found(E::LABEL, id))
    }

    /// 單筆公開頁，有詳細頁的集合才會快取
    pub async fn get_public(&self, id: &str) -> Result<String> {
        let page = E::COLLECTION.detail_page(id);
        if let Some(body) = page.as_deref().and_then(|p| self.cache.get(p)) {
            return Ok(body);
        }

        let generation = page.as_deref().map(|p| self.cache.generation(p));
        let item = self.get(id).await?.public_view();
        let body = serde_json::to_string(&item)?;
        if let (Some(page), Some(generation)) = (page, generation) {
            self.cache.put(&page, generation, body.clone());
        }
        Ok(body)
    }

    pub async fn create(&self, draft: E::Draft) -> Result<E> {
        let created = self.repository.insert(draft).await?;
        tracing::info!(
            "✅ Created {} {} at position {}",
            E::LABEL,
            created.id(),
            created.order()
        );
        self.invalidate(Some(created.id()));
        Ok(created)
    }

    pub async fn update(&self, id: &str, draft: E::Draft) -> Result<E> {
        let updated = self
            .repository
            .update(id, draft)
            .await?
            .ok_or_else(|| AppError::not_found(E::LABEL, id))?;
        tracing::info!("✅ Updated {} {}", E::LABEL, id);
        self.invalidate(Some(id));
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        if !self.repository.delete(id).await? {
            return Err(AppError::not_found(E::LABEL, id));
        }
        tracing::info!("🗑️ Deleted {} {}", E::LABEL, id);
        self.invalidate(Some(id));
        Ok(())
    }

    /// 套用完整排列，回傳新的集合版本
    pub async fn reorder(&self, ids: Vec<String>, expected_version: Option<u64>) -> Result<u64> {
        let count = ids.len();
        let version = self.repository.reorder(ids, expected_version).await?;
        tracing::info!(
            "🔀 Reordered {} ({} items), version is now {}",
            E::COLLECTION,
            count,
            version
        );
        self.invalidate(None);
        Ok(version)
    }

    pub async fn version(&self) -> Result<u64> {
        self.repository.version().await
    }

    fn invalidate(&self, id: Option<&str>) {
        for page in E::COLLECTION.listing_pages() {
            self.cache.invalidate(page);
        }
        if let Some(page) = id.and_then(|id| E::COLLECTION.detail_page(id)) {
            self.cache.invalidate(&page);
        }
    }
}
