#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::Arc;
use studio_cms::adapters::object_storage::MemoryObjectStorage;
use studio_cms::adapters::page_cache::InMemoryPageCache;
use studio_cms::adapters::session::{HeaderSessionResolver, DEFAULT_SESSION_HEADER};
use studio_cms::adapters::sqlite::SqliteDatabase;
use studio_cms::app::bootstrap::assemble_state;
use studio_cms::core::auth::{AllowListPolicy, AuthorizationGate};
use studio_cms::core::upload::BucketLayout;
use studio_cms::router;
use tokio::net::TcpListener;

pub const ADMIN_EMAIL: &str = "ada@studio.test";
pub const OUTSIDER_EMAIL: &str = "mallory@elsewhere.test";
pub const ASSET_BASE_URL: &str = "https://cdn.studio.test";

/// 在隨機埠上啟動完整的 router，資料庫與物件儲存都在記憶體中
pub struct TestApp {
    pub base_url: String,
    pub storage: Arc<MemoryObjectStorage>,
    pub http: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let db = SqliteDatabase::open_in_memory().expect("in-memory database");
        let storage = Arc::new(MemoryObjectStorage::new(ASSET_BASE_URL));
        let gate = AuthorizationGate::new(
            Arc::new(HeaderSessionResolver::default()),
            Arc::new(AllowListPolicy::new([ADMIN_EMAIL])),
        );
        let state = assemble_state(
            db,
            storage.clone(),
            BucketLayout::default(),
            gate,
            Arc::new(InMemoryPageCache::default()),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.expect("server");
        });

        Self {
            base_url: format!("http://{}", addr),
            storage,
            http: reqwest::Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn admin(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header(DEFAULT_SESSION_HEADER, ADMIN_EMAIL)
    }

    pub async fn get_json(&self, path: &str) -> Value {
        self.http
            .get(self.url(path))
            .send()
            .await
            .expect("request")
            .json()
            .await
            .expect("json body")
    }

    /// 以管理者身分新增作品並回傳建立的 JSON
    pub async fn create_project(&self, name: &str) -> Value {
        let response = self
            .admin(reqwest::Method::POST, "/admin/projects")
            .json(&project_payload(name))
            .send()
            .await
            .expect("request");
        assert_eq!(response.status(), 201, "create {} failed", name);
        response.json().await.expect("json body")
    }

    pub async fn create_member(&self, name: &str) -> Value {
        let response = self
            .admin(reqwest::Method::POST, "/admin/team")
            .json(&member_payload(name))
            .send()
            .await
            .expect("request");
        assert_eq!(response.status(), 201, "create {} failed", name);
        response.json().await.expect("json body")
    }

    pub async fn public_names(&self, path: &str) -> Vec<String> {
        names(&self.get_json(path).await)
    }
}

pub fn project_payload(name: &str) -> Value {
    json!({
        "name": name,
        "client": format!("{} Client", name),
        "summary": "Brand and product work",
        "startYear": "2022",
        "endYear": 2023,
        "services": ["UX Design", "UI Design"],
        "industry": ["Fintech"],
        "website": "https://example.com",
        "heroImage": "https://cdn.studio.test/projects/hero.png",
        "deviceMockup": "https://cdn.studio.test/projects/mock.png",
        "deviceType": "laptop",
        "layoutVariant": "A"
    })
}

pub fn member_payload(name: &str) -> Value {
    json!({
        "name": name,
        "role": "Designer",
        "babyPhoto": "https://cdn.studio.test/team/baby.png",
        "adultPhoto": "https://cdn.studio.test/team/adult.png",
        "email": format!("{}@studio.test", name.to_lowercase())
    })
}

pub fn names(list: &Value) -> Vec<String> {
    list.as_array()
        .expect("array body")
        .iter()
        .map(|item| item["name"].as_str().unwrap_or_default().to_string())
        .collect()
}

pub fn orders(list: &Value) -> Vec<i64> {
    list.as_array()
        .expect("array body")
        .iter()
        .map(|item| item["order"].as_i64().unwrap_or(-1))
        .collect()
}

pub fn id_of(item: &Value) -> String {
    item["id"].as_str().expect("id").to_string()
}
