//! 拖曳排序的樂觀更新狀態機。
//!
//! reducer 本身不做網路呼叫，只回傳需要送出的 [`Effect`]；
//! 呼叫端負責送出請求並把結果以事件回饋。

use crate::domain::model::OrderedEntity;
use crate::domain::ordering::move_item;

#[derive(Debug, Clone, PartialEq)]
pub enum ReorderPhase<T> {
    Stable,
    /// 已樂觀套用 `submitted`，等待伺服器回應
    Pending {
        submitted: Vec<String>,
        last_good: Vec<T>,
    },
    /// 送出失敗，畫面已還原為 `last_good`
    Failed { last_good: Vec<T>, notice: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReorderState<T> {
    pub items: Vec<T>,
    pub phase: ReorderPhase<T>,
    /// 最後一次確認的集合版本，送出排序時作為 expectedVersion
    pub version: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReorderEvent<T> {
    Loaded { items: Vec<T>, version: Option<u64> },
    DragEnded { from: usize, to: usize },
    ReorderSucceeded { version: u64 },
    ReorderFailed { message: String },
    /// 失敗後重新讀取伺服器狀態；保留提示訊息
    Refreshed { items: Vec<T>, version: u64 },
    NoticeDismissed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SubmitReorder {
        ids: Vec<String>,
        expected_version: Option<u64>,
    },
}

impl<T> Default for ReorderState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            phase: ReorderPhase::Stable,
            version: None,
        }
    }
}

impl<T: OrderedEntity> ReorderState<T> {
    pub fn new(items: Vec<T>, version: Option<u64>) -> Self {
        Self {
            items,
            phase: ReorderPhase::Stable,
            version,
        }
    }

    pub fn ids(&self) -> Vec<String> {
        self.items.iter().map(|item| item.id().to_string()).collect()
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.phase, ReorderPhase::Pending { .. })
    }

    pub fn notice(&self) -> Option<&str> {
        match &self.phase {
            ReorderPhase::Failed { notice, .. } => Some(notice),
            _ => None,
        }
    }

    /// 套用事件，必要時回傳要執行的副作用
    pub fn apply(&mut self, event: ReorderEvent<T>) -> Option<Effect> {
        match event {
            ReorderEvent::Loaded { items, version } => {
                self.items = items;
                self.version = version;
                self.phase = ReorderPhase::Stable;
                None
            }
            ReorderEvent::DragEnded { from, to } => self.drag(from, to),
            ReorderEvent::ReorderSucceeded { version } => {
                if self.is_pending() {
                    // 伺服器已把 order 改寫為位置索引
                    for (index, item) in self.items.iter_mut().enumerate() {
                        item.set_order(index as i64);
                    }
                    self.version = Some(version);
                    self.phase = ReorderPhase::Stable;
                }
                None
            }
            ReorderEvent::ReorderFailed { message } => {
                let phase = std::mem::replace(&mut self.phase, ReorderPhase::Stable);
                self.phase = match phase {
                    ReorderPhase::Pending { last_good, .. } => {
                        self.items = last_good.clone();
                        ReorderPhase::Failed {
                            last_good,
                            notice: message,
                        }
                    }
                    other => other,
                };
                None
            }
            ReorderEvent::Refreshed { items, version } => {
                if self.is_pending() {
                    tracing::debug!("Ignoring refresh while reorder is pending");
                    return None;
                }
                if let ReorderPhase::Failed { last_good, .. } = &mut self.phase {
                    *last_good = items.clone();
                }
                self.items = items;
                self.version = Some(version);
                None
            }
            ReorderEvent::NoticeDismissed => {
                if matches!(self.phase, ReorderPhase::Failed { .. }) {
                    self.phase = ReorderPhase::Stable;
                }
                None
            }
        }
    }

    fn drag(&mut self, from: usize, to: usize) -> Option<Effect> {
        // 上一次排序還沒回應前不接受新的拖曳
        if self.is_pending() {
            tracing::debug!("Ignoring drag {} -> {} while reorder is pending", from, to);
            return None;
        }
        let reordered = move_item(&self.items, from, to)?;
        let last_good = std::mem::replace(&mut self.items, reordered);
        let submitted = self.ids();
        self.phase = ReorderPhase::Pending {
            submitted: submitted.clone(),
            last_good,
        };
        Some(Effect::SubmitReorder {
            ids: submitted,
            expected_version: self.version,
        })
    }
}
