use crate::adapters::object_storage::{LocalObjectStorage, MemoryObjectStorage};
use crate::adapters::page_cache::InMemoryPageCache;
use crate::adapters::session::HeaderSessionResolver;
use crate::adapters::sqlite::SqliteDatabase;
use crate::app::state::AppState;
use crate::config::toml_config::{AuthConfig, PolicyKind, ServerConfig, StorageBackend, StorageConfig};
use crate::core::auth::{AllowListPolicy, AlwaysAllowPolicy, AuthorizationGate};
use crate::core::catalog::CollectionService;
use crate::core::upload::{BucketLayout, UploadService};
use crate::domain::ports::{AuthorizationPolicy, ObjectStorage, PageCache};
use crate::utils::error::{AppError, Result};
use std::sync::Arc;
use std::time::Duration;

/// 依配置組裝資料庫、儲存、快取與授權
pub async fn build_state(config: &ServerConfig) -> Result<AppState> {
    let db = SqliteDatabase::open(&config.database.path)?;
    tracing::info!("📂 Database opened at {}", config.database.path);

    let storage = build_storage(&config.storage).await?;
    let gate = build_gate(&config.auth)?;
    tracing::info!("🔐 Authorization policy: {}", gate.policy_name());

    let cache = Arc::new(InMemoryPageCache::new(Duration::from_secs(
        config.cache.ttl_seconds,
    )));
    let buckets = BucketLayout {
        projects_bucket: config.storage.projects_bucket.clone(),
        team_bucket: config.storage.team_bucket.clone(),
    };

    Ok(assemble_state(db, storage, buckets, gate, cache))
}

pub fn assemble_state(
    db: SqliteDatabase,
    storage: Arc<dyn ObjectStorage>,
    buckets: BucketLayout,
    gate: AuthorizationGate,
    cache: Arc<dyn PageCache>,
) -> AppState {
    AppState {
        projects: Arc::new(CollectionService::new(
            Arc::new(db.projects()),
            Arc::clone(&cache),
        )),
        team: Arc::new(CollectionService::new(Arc::new(db.team()), cache)),
        uploads: Arc::new(UploadService::new(storage, buckets)),
        gate: Arc::new(gate),
    }
}

async fn build_storage(config: &StorageConfig) -> Result<Arc<dyn ObjectStorage>> {
    match config.backend {
        StorageBackend::Local => {
            let root = config
                .local_root
                .clone()
                .ok_or_else(|| AppError::MissingConfigError {
                    field: "storage.local_root".to_string(),
                })?;
            tracing::info!("🗄️ Local object storage at {}", root);
            Ok(Arc::new(LocalObjectStorage::new(
                root,
                config.public_base_url.clone(),
            )))
        }
        StorageBackend::Memory => {
            tracing::warn!("Memory object storage selected, uploads are lost on restart");
            Ok(Arc::new(MemoryObjectStorage::new(
                config.public_base_url.clone(),
            )))
        }
        StorageBackend::S3 => build_s3_storage(config).await,
    }
}

#[cfg(feature = "s3")]
async fn build_s3_storage(config: &StorageConfig) -> Result<Arc<dyn ObjectStorage>> {
    use crate::adapters::s3::S3ObjectStorage;

    let region = config
        .s3_region
        .as_deref()
        .ok_or_else(|| AppError::MissingConfigError {
            field: "storage.s3_region".to_string(),
        })?;
    tracing::info!("☁️ S3 object storage in {}", region);
    let storage = S3ObjectStorage::connect(
        region,
        config.s3_endpoint.as_deref(),
        config.public_base_url.clone(),
    )
    .await;
    Ok(Arc::new(storage))
}

#[cfg(not(feature = "s3"))]
async fn build_s3_storage(_config: &StorageConfig) -> Result<Arc<dyn ObjectStorage>> {
    Err(AppError::InvalidConfigValueError {
        field: "storage.backend".to_string(),
        value: "s3".to_string(),
        reason: "binary was built without the `s3` feature".to_string(),
    })
}

fn build_gate(config: &AuthConfig) -> Result<AuthorizationGate> {
    let sessions = Arc::new(HeaderSessionResolver::new(&config.session_header)?);
    let policy: Arc<dyn AuthorizationPolicy> = match config.policy {
        PolicyKind::AllowList => Arc::new(AllowListPolicy::new(config.allow_list.iter())),
        PolicyKind::AlwaysAllow => {
            tracing::warn!("⚠️ always_allow policy active: admin routes are open");
            Arc::new(AlwaysAllowPolicy)
        }
    };
    Ok(AuthorizationGate::new(sessions, policy))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config(policy: &str) -> ServerConfig {
        let toml = format!(
            r#"
[database]
path = ":memory:"

[storage]
backend = "memory"
public_base_url = "http://localhost:3000/assets"

[auth]
environment = "development"
policy = "{policy}"
allow_list = ["Ada@Studio.test"]
"#
        );
        ServerConfig::from_toml_str(&toml).unwrap()
    }

    #[tokio::test]
    async fn test_build_state_with_allow_list() {
        let state = build_state(&memory_config("allow_list")).await.unwrap();
        assert_eq!(state.gate.policy_name(), "allow_list");
        assert!(state.projects.list().await.unwrap().is_empty());
        assert_eq!(state.team.version().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_build_state_with_always_allow() {
        let state = build_state(&memory_config("always_allow")).await.unwrap();
        let identity = state
            .gate
            .authorize(&axum::http::HeaderMap::new())
            .unwrap();
        assert_eq!(identity.email, crate::core::auth::DEVELOPER_IDENTITY);
    }

    #[cfg(not(feature = "s3"))]
    #[tokio::test]
    async fn test_s3_backend_requires_feature() {
        let mut config = memory_config("allow_list");
        config.storage.backend = StorageBackend::S3;
        config.storage.s3_region = Some("eu-west-1".to_string());
        assert!(build_state(&config).await.is_err());
    }
}
