use crate::domain::model::{
    Collection, DeviceType, LayoutVariant, OrderedEntity, Project, ProjectDraft, TeamMember,
    TeamMemberDraft,
};
use crate::domain::ordering::{check_permutation, next_order};
use crate::domain::ports::CollectionRepository;
use crate::domain::string_list::{decode_string_list, encode_string_list};
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, Transaction};
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    client TEXT NOT NULL,
    summary TEXT,
    start_year INTEGER NOT NULL,
    end_year INTEGER,
    services TEXT NOT NULL DEFAULT '[]',
    industry TEXT NOT NULL DEFAULT '[]',
    website TEXT,
    hero_image TEXT NOT NULL,
    device_mockup TEXT NOT NULL,
    device_type TEXT NOT NULL,
    layout_variant TEXT NOT NULL,
    case_study TEXT,
    case_study_slug TEXT,
    coming_soon INTEGER NOT NULL DEFAULT 0,
    sort_order INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_projects_sort_order ON projects(sort_order);

CREATE TABLE IF NOT EXISTS team_members (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    role TEXT NOT NULL,
    baby_photo TEXT NOT NULL,
    adult_photo TEXT NOT NULL,
    email TEXT,
    linkedin TEXT,
    cv_link TEXT,
    sort_order INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_team_members_sort_order ON team_members(sort_order);

CREATE TABLE IF NOT EXISTS collection_versions (
    collection TEXT PRIMARY KEY,
    version INTEGER NOT NULL
);
"#;

/// 共用的 SQLite 連線，所有存取經由 mutex 序列化並在 blocking 執行緒上執行
#[derive(Clone)]
pub struct SqliteDatabase {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDatabase {
    pub fn open(path: &str) -> Result<Self> {
        if path == ":memory:" {
            return Self::open_in_memory();
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        tracing::debug!("SQLite schema ready");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn projects(&self) -> SqliteRepository<Project> {
        SqliteRepository::new(self.clone())
    }

    pub fn team(&self) -> SqliteRepository<TeamMember> {
        SqliteRepository::new(self.clone())
    }

    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| AppError::StorageError {
                message: "database connection mutex poisoned".to_string(),
            })?;
            f(&mut *guard)
        })
        .await?
    }
}

/// 實體與資料表欄位的對應
pub trait SqlRecord: OrderedEntity {
    const TABLE: &'static str;
    /// 可編輯欄位，順序與 draft_values 一致
    const COLUMNS: &'static [&'static str];

    /// 讀取 `SELECT id, COLUMNS.., sort_order` 的一列
    fn from_row(row: &Row<'_>) -> Result<Self>;
    fn draft_values(draft: &Self::Draft) -> Vec<Value>;
}

fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

fn optional_text(value: &Option<String>) -> Value {
    match value {
        Some(v) => Value::Text(v.clone()),
        None => Value::Null,
    }
}

fn corrupt(table: &str, message: String) -> AppError {
    AppError::CorruptRecordError {
        table: table.to_string(),
        message,
    }
}

impl SqlRecord for Project {
    const TABLE: &'static str = "projects";
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "client",
        "summary",
        "start_year",
        "end_year",
        "services",
        "industry",
        "website",
        "hero_image",
        "device_mockup",
        "device_type",
        "layout_variant",
        "case_study",
        "case_study_slug",
        "coming_soon",
    ];

    fn from_row(row: &Row<'_>) -> Result<Self> {
        let services: String = row.get(6)?;
        let industry: String = row.get(7)?;
        let device_type: String = row.get(11)?;
        let layout_variant: String = row.get(12)?;

        Ok(Project {
            id: row.get(0)?,
            name: row.get(1)?,
            client: row.get(2)?,
            summary: row.get(3)?,
            start_year: row.get(4)?,
            end_year: row.get(5)?,
            services: decode_string_list(&services),
            industry: decode_string_list(&industry),
            website: row.get(8)?,
            hero_image: row.get(9)?,
            device_mockup: row.get(10)?,
            device_type: device_type
                .parse::<DeviceType>()
                .map_err(|e| corrupt(Self::TABLE, e))?,
            layout_variant: layout_variant
                .parse::<LayoutVariant>()
                .map_err(|e| corrupt(Self::TABLE, e))?,
            case_study: row.get(13)?,
            case_study_slug: row.get(14)?,
            coming_soon: row.get(15)?,
            order: row.get(16)?,
        })
    }

    fn draft_values(draft: &ProjectDraft) -> Vec<Value> {
        vec![
            text(&draft.name),
            text(&draft.client),
            optional_text(&draft.summary),
            Value::Integer(i64::from(draft.start_year)),
            draft
                .end_year
                .map(|y| Value::Integer(i64::from(y)))
                .unwrap_or(Value::Null),
            Value::Text(encode_string_list(&draft.services)),
            Value::Text(encode_string_list(&draft.industry)),
            optional_text(&draft.website),
            text(&draft.hero_image),
            text(&draft.device_mockup),
            text(draft.device_type.as_str()),
            text(draft.layout_variant.as_str()),
            optional_text(&draft.case_study),
            optional_text(&draft.case_study_slug),
            Value::Integer(i64::from(draft.coming_soon)),
        ]
    }
}

impl SqlRecord for TeamMember {
    const TABLE: &'static str = "team_members";
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "role",
        "baby_photo",
        "adult_photo",
        "email",
        "linkedin",
        "cv_link",
    ];

    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(TeamMember {
            id: row.get(0)?,
            name: row.get(1)?,
            role: row.get(2)?,
            baby_photo: row.get(3)?,
            adult_photo: row.get(4)?,
            email: row.get(5)?,
            linkedin: row.get(6)?,
            cv_link: row.get(7)?,
            order: row.get(8)?,
        })
    }

    fn draft_values(draft: &TeamMemberDraft) -> Vec<Value> {
        vec![
            text(&draft.name),
            text(&draft.role),
            text(&draft.baby_photo),
            text(&draft.adult_photo),
            optional_text(&draft.email),
            optional_text(&draft.linkedin),
            optional_text(&draft.cv_link),
        ]
    }
}

fn select_sql<E: SqlRecord>() -> String {
    format!(
        "SELECT id, {}, sort_order FROM {}",
        E::COLUMNS.join(", "),
        E::TABLE
    )
}

fn fetch_one<E: SqlRecord>(conn: &Connection, id: &str) -> Result<Option<E>> {
    let sql = format!("{} WHERE id = ?1", select_sql::<E>());
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params![id])?;
    match rows.next()? {
        Some(row) => Ok(Some(E::from_row(row)?)),
        None => Ok(None),
    }
}

fn read_version(tx: &Transaction<'_>, collection: Collection) -> Result<u64> {
    let version: Option<i64> = tx
        .query_row(
            "SELECT version FROM collection_versions WHERE collection = ?1",
            params![collection.as_str()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(version.unwrap_or(0) as u64)
}

pub struct SqliteRepository<E> {
    db: SqliteDatabase,
    _entity: PhantomData<fn() -> E>,
}

impl<E> SqliteRepository<E> {
    pub fn new(db: SqliteDatabase) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<E: SqlRecord> CollectionRepository<E> for SqliteRepository<E> {
    async fn list_ordered(&self) -> Result<Vec<E>> {
        self.db
            .with_conn(|conn| {
                let sql = format!("{} ORDER BY sort_order ASC, rowid ASC", select_sql::<E>());
                let mut stmt = conn.prepare(&sql)?;
                let mut rows = stmt.query([])?;
                let mut items = Vec::new();
                while let Some(row) = rows.next()? {
                    items.push(E::from_row(row)?);
                }
                Ok(items)
            })
            .await
    }

    async fn find(&self, id: &str) -> Result<Option<E>> {
        let id = id.to_string();
        self.db.with_conn(move |conn| fetch_one::<E>(conn, &id)).await
    }

    async fn insert(&self, draft: E::Draft) -> Result<E> {
        self.db
            .with_conn(move |conn| {
                let tx = conn.transaction()?;
                let current_max: Option<i64> = tx.query_row(
                    &format!("SELECT MAX(sort_order) FROM {}", E::TABLE),
                    [],
                    |row| row.get(0),
                )?;
                let order = next_order(current_max);
                let id = uuid::Uuid::new_v4().to_string();

                let mut values = vec![Value::Text(id.clone())];
                values.extend(E::draft_values(&draft));
                values.push(Value::Integer(order));

                let placeholders = (1..=values.len())
                    .map(|i| format!("?{}", i))
                    .collect::<Vec<_>>()
                    .join(", ");
                let sql = format!(
                    "INSERT INTO {} (id, {}, sort_order) VALUES ({})",
                    E::TABLE,
                    E::COLUMNS.join(", "),
                    placeholders
                );
                tx.execute(&sql, params_from_iter(values.iter()))?;
                tx.commit()?;

                Ok(E::from_draft(id, order, draft))
            })
            .await
    }

    async fn update(&self, id: &str, draft: E::Draft) -> Result<Option<E>> {
        let id = id.to_string();
        self.db
            .with_conn(move |conn| {
                let assignments = E::COLUMNS
                    .iter()
                    .enumerate()
                    .map(|(i, column)| format!("{} = ?{}", column, i + 1))
                    .collect::<Vec<_>>()
                    .join(", ");
                let sql = format!(
                    "UPDATE {} SET {} WHERE id = ?{}",
                    E::TABLE,
                    assignments,
                    E::COLUMNS.len() + 1
                );

                let mut values = E::draft_values(&draft);
                values.push(Value::Text(id.clone()));

                let changed = conn.execute(&sql, params_from_iter(values.iter()))?;
                if changed == 0 {
                    return Ok(None);
                }
                fetch_one::<E>(conn, &id)
            })
            .await
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let id = id.to_string();
        self.db
            .with_conn(move |conn| {
                let sql = format!("DELETE FROM {} WHERE id = ?1", E::TABLE);
                Ok(conn.execute(&sql, params![id])? > 0)
            })
            .await
    }

    async fn reorder(&self, ids: Vec<String>, expected_version: Option<u64>) -> Result<u64> {
        self.db
            .with_conn(move |conn| {
                // 任何錯誤都會在 tx drop 時整批回滾
                let tx = conn.transaction()?;
                let collection = E::COLLECTION;

                let current_version = read_version(&tx, collection)?;
                if let Some(expected) = expected_version {
                    if expected != current_version {
                        return Err(AppError::VersionConflictError {
                            collection: collection.to_string(),
                            expected,
                            actual: current_version,
                        });
                    }
                }

                let current_ids: Vec<String> = {
                    let mut stmt = tx.prepare(&format!("SELECT id FROM {}", E::TABLE))?;
                    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
                    rows.collect::<std::result::Result<_, _>>()?
                };
                check_permutation(&current_ids, &ids)?;

                {
                    let mut stmt = tx.prepare(&format!(
                        "UPDATE {} SET sort_order = ?1 WHERE id = ?2",
                        E::TABLE
                    ))?;
                    for (position, id) in ids.iter().enumerate() {
                        stmt.execute(params![position as i64, id])?;
                    }
                }

                let next_version = current_version + 1;
                tx.execute(
                    "INSERT INTO collection_versions (collection, version) VALUES (?1, ?2) \
                     ON CONFLICT(collection) DO UPDATE SET version = excluded.version",
                    params![collection.as_str(), next_version as i64],
                )?;
                tx.commit()?;

                Ok(next_version)
            })
            .await
    }

    async fn version(&self) -> Result<u64> {
        self.db
            .with_conn(|conn| {
                let tx = conn.transaction()?;
                read_version(&tx, E::COLLECTION)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str) -> ProjectDraft {
        ProjectDraft {
            name: name.to_string(),
            client: format!("{} Client", name),
            summary: None,
            start_year: 2022,
            end_year: None,
            services: vec!["UX Design".to_string(), "UI Design".to_string()],
            industry: vec!["Fintech".to_string()],
            website: Some("https://example.com".to_string()),
            hero_image: "https://cdn.example.com/hero.png".to_string(),
            device_mockup: "https://cdn.example.com/mock.png".to_string(),
            device_type: DeviceType::Laptop,
            layout_variant: LayoutVariant::B,
            case_study: None,
            case_study_slug: None,
            coming_soon: false,
        }
    }

    fn member(name: &str) -> TeamMemberDraft {
        TeamMemberDraft {
            name: name.to_string(),
            role: "Designer".to_string(),
            baby_photo: "baby.png".to_string(),
            adult_photo: "adult.png".to_string(),
            email: None,
            linkedin: None,
            cv_link: None,
        }
    }

    fn names(projects: &[Project]) -> Vec<&str> {
        projects.iter().map(|p| p.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_insert_assigns_next_order() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        let repo = db.projects();

        let a = repo.insert(draft("A")).await.unwrap();
        let b = repo.insert(draft("B")).await.unwrap();
        assert_eq!(a.order, 0);
        assert_eq!(b.order, 1);

        // 刪除後不重新編號，新成員仍接在最大值之後
        assert!(repo.delete(&a.id).await.unwrap());
        let c = repo.insert(draft("C")).await.unwrap();
        assert_eq!(c.order, 2);

        // 清空後重新從 0 開始
        assert!(repo.delete(&b.id).await.unwrap());
        assert!(repo.delete(&c.id).await.unwrap());
        let d = repo.insert(draft("D")).await.unwrap();
        assert_eq!(d.order, 0);
    }

    #[tokio::test]
    async fn test_round_trips_every_field() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        let repo = db.projects();

        let mut d = draft("Harbor");
        d.summary = Some("Banking app".to_string());
        d.end_year = Some(2024);
        d.case_study = Some("# Harbor".to_string());
        d.case_study_slug = Some("harbor-bank".to_string());
        d.coming_soon = true;
        d.device_type = DeviceType::Mobile;

        let created = repo.insert(d).await.unwrap();
        let loaded = repo.find(&created.id).await.unwrap().unwrap();
        assert_eq!(loaded, created);
        assert_eq!(loaded.services, vec!["UX Design", "UI Design"]);
    }

    #[tokio::test]
    async fn test_reads_legacy_comma_separated_services() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        let repo = db.projects();
        let created = repo.insert(draft("Legacy")).await.unwrap();

        let id = created.id.clone();
        db.with_conn(move |conn| {
            conn.execute(
                "UPDATE projects SET services = 'UX Design, UI Design', industry = 'Retail' WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .unwrap();

        let loaded = repo.find(&created.id).await.unwrap().unwrap();
        assert_eq!(loaded.services, vec!["UX Design", "UI Design"]);
        assert_eq!(loaded.industry, vec!["Retail"]);
    }

    #[tokio::test]
    async fn test_update_keeps_order() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        let repo = db.projects();
        repo.insert(draft("A")).await.unwrap();
        let b = repo.insert(draft("B")).await.unwrap();

        let updated = repo.update(&b.id, draft("B2")).await.unwrap().unwrap();
        assert_eq!(updated.name, "B2");
        assert_eq!(updated.order, 1);

        assert!(repo.update("missing", draft("X")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reorder_writes_dense_ranks_and_bumps_version() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        let repo = db.projects();
        let a = repo.insert(draft("A")).await.unwrap();
        let b = repo.insert(draft("B")).await.unwrap();
        let c = repo.insert(draft("C")).await.unwrap();
        assert_eq!(repo.version().await.unwrap(), 0);

        let version = repo
            .reorder(vec![c.id.clone(), a.id.clone(), b.id.clone()], None)
            .await
            .unwrap();
        assert_eq!(version, 1);

        let listed = repo.list_ordered().await.unwrap();
        assert_eq!(names(&listed), vec!["C", "A", "B"]);
        let orders: Vec<i64> = listed.iter().map(|p| p.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_rejected_reorder_writes_nothing() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        let repo = db.projects();
        let a = repo.insert(draft("A")).await.unwrap();
        let b = repo.insert(draft("B")).await.unwrap();

        let err = repo
            .reorder(vec![b.id.clone(), "ghost".to_string()], None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError { .. }));

        let listed = repo.list_ordered().await.unwrap();
        assert_eq!(listed[0].id, a.id);
        assert_eq!(listed[1].id, b.id);
        assert_eq!(repo.version().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_stale_version_is_rejected() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        let repo = db.projects();
        let a = repo.insert(draft("A")).await.unwrap();
        let b = repo.insert(draft("B")).await.unwrap();

        repo.reorder(vec![b.id.clone(), a.id.clone()], Some(0))
            .await
            .unwrap();
        let err = repo
            .reorder(vec![a.id.clone(), b.id.clone()], Some(0))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::VersionConflictError {
                expected: 0,
                actual: 1,
                ..
            }
        ));

        // 不帶版本號則後寫者勝
        assert_eq!(
            repo.reorder(vec![a.id.clone(), b.id.clone()], None)
                .await
                .unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn test_collections_are_independent() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        let projects = db.projects();
        let team = db.team();

        projects.insert(draft("A")).await.unwrap();
        let ada = team.insert(member("Ada")).await.unwrap();
        let grace = team.insert(member("Grace")).await.unwrap();
        assert_eq!(ada.order, 0);

        team.reorder(vec![grace.id.clone(), ada.id.clone()], None)
            .await
            .unwrap();
        assert_eq!(team.version().await.unwrap(), 1);
        assert_eq!(projects.version().await.unwrap(), 0);

        let listed = team.list_ordered().await.unwrap();
        assert_eq!(listed[0].name, "Grace");
    }

    #[tokio::test]
    async fn test_corrupt_enum_column_surfaces_as_error() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        let repo = db.projects();
        let created = repo.insert(draft("A")).await.unwrap();

        let id = created.id.clone();
        db.with_conn(move |conn| {
            conn.execute(
                "UPDATE projects SET device_type = 'tablet' WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .unwrap();

        let err = repo.find(&created.id).await.unwrap_err();
        assert!(matches!(err, AppError::CorruptRecordError { .. }));
    }
}
