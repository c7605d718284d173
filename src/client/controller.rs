use crate::client::admin::AdminClient;
use crate::client::reorder_state::{Effect, ReorderEvent, ReorderState};
use crate::domain::model::OrderedEntity;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

/// 排序控制器需要的遠端操作
#[async_trait]
pub trait ReorderClient<T>: Send + Sync {
    /// 目前的排序清單與集合版本
    async fn fetch(&self) -> Result<(Vec<T>, u64)>;
    async fn submit_reorder(&self, ids: Vec<String>, expected_version: Option<u64>) -> Result<u64>;
}

/// 把 [`AdminClient`] 綁定到單一集合
pub struct CollectionReorderClient<T> {
    client: AdminClient,
    _entity: PhantomData<fn() -> T>,
}

impl<T> CollectionReorderClient<T> {
    pub fn new(client: AdminClient) -> Self {
        Self {
            client,
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<T> ReorderClient<T> for CollectionReorderClient<T>
where
    T: OrderedEntity + DeserializeOwned,
{
    async fn fetch(&self) -> Result<(Vec<T>, u64)> {
        let version = self.client.version(T::COLLECTION).await?;
        let items = self.client.list(T::COLLECTION).await?;
        Ok((items, version))
    }

    async fn submit_reorder(&self, ids: Vec<String>, expected_version: Option<u64>) -> Result<u64> {
        self.client
            .reorder(T::COLLECTION, ids, expected_version)
            .await
    }
}

/// 執行 reducer 產生的副作用，並把結果回饋給狀態機
pub struct ReorderController<T, C> {
    client: C,
    state: ReorderState<T>,
}

impl<T, C> ReorderController<T, C>
where
    T: OrderedEntity,
    C: ReorderClient<T>,
{
    pub fn new(client: C) -> Self {
        Self {
            client,
            state: ReorderState::default(),
        }
    }

    pub fn state(&self) -> &ReorderState<T> {
        &self.state
    }

    pub async fn load(&mut self) -> Result<()> {
        let (items, version) = self.client.fetch().await?;
        tracing::debug!("Loaded {} {} items at version {}", items.len(), T::COLLECTION, version);
        self.state.apply(ReorderEvent::Loaded {
            items,
            version: Some(version),
        });
        Ok(())
    }

    /// 樂觀套用拖曳結果並送出；失敗時還原並留下提示
    ///
    /// 版本衝突代表別人先改過排序，此時重新讀取伺服器狀態，下一次拖曳才會帶新的版本。
    pub async fn drag(&mut self, from: usize, to: usize) {
        let Some(effect) = self.state.apply(ReorderEvent::DragEnded { from, to }) else {
            return;
        };
        let (event, conflict) = self.run(effect).await;
        self.state.apply(event);
        if conflict {
            self.refresh().await;
        }
    }

    async fn refresh(&mut self) {
        match self.client.fetch().await {
            Ok((items, version)) => {
                tracing::info!("🔄 Reloaded {} at version {}", T::COLLECTION, version);
                self.state.apply(ReorderEvent::Refreshed { items, version });
            }
            Err(e) => {
                tracing::warn!("⚠️ Failed to reload {} after conflict: {}", T::COLLECTION, e);
            }
        }
    }

    pub fn dismiss_notice(&mut self) {
        self.state.apply(ReorderEvent::NoticeDismissed);
    }

    /// 回傳要回饋的事件，以及是否為版本衝突
    async fn run(&self, effect: Effect) -> (ReorderEvent<T>, bool) {
        match effect {
            Effect::SubmitReorder {
                ids,
                expected_version,
            } => match self.client.submit_reorder(ids, expected_version).await {
                Ok(version) => {
                    tracing::info!("🔀 {} reorder saved (version {})", T::COLLECTION, version);
                    (ReorderEvent::ReorderSucceeded { version }, false)
                }
                Err(e) => {
                    tracing::error!("❌ {} reorder failed: {}", T::COLLECTION, e);
                    let event = ReorderEvent::ReorderFailed {
                        message: format!("Failed to reorder: {}", e.user_friendly_message()),
                    };
                    (event, e.is_conflict())
                }
            },
        }
    }
}
