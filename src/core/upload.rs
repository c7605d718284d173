use crate::domain::ports::ObjectStorage;
use crate::utils::error::{AppError, Result};
use chrono::Utc;
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// 單檔上限 10 MiB
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub const DEFAULT_FOLDER: &str = "projects";
pub const TEAM_FOLDER: &str = "team";

#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: Option<String>,
    pub content_type: String,
    pub folder: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadResult {
    pub url: String,
    pub path: String,
}

/// folder 為 team 的檔案放進團隊 bucket，其餘放作品 bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketLayout {
    pub projects_bucket: String,
    pub team_bucket: String,
}

impl BucketLayout {
    pub fn bucket_for(&self, folder: &str) -> &str {
        if folder == TEAM_FOLDER {
            &self.team_bucket
        } else {
            &self.projects_bucket
        }
    }
}

impl Default for BucketLayout {
    fn default() -> Self {
        Self {
            projects_bucket: "projects".to_string(),
            team_bucket: "team".to_string(),
        }
    }
}

/// 在寫入儲存之前擋掉非圖片與過大的檔案
pub fn check_upload(content_type: &str, size: usize) -> Result<()> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if !essence.starts_with("image/") || essence.len() == "image/".len() {
        return Err(AppError::UnsupportedMediaTypeError {
            content_type: content_type.to_string(),
        });
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(AppError::PayloadTooLargeError {
            size,
            limit: MAX_UPLOAD_BYTES,
        });
    }
    Ok(())
}

/// folder 只允許小寫英數、`-` 與 `_`，未提供時為 projects
pub fn normalize_folder(folder: Option<&str>) -> Result<String> {
    let folder = folder.map(str::trim).unwrap_or_default().to_ascii_lowercase();
    if folder.is_empty() {
        return Ok(DEFAULT_FOLDER.to_string());
    }
    let valid = folder
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if !valid {
        return Err(AppError::validation(
            "folder",
            "may only contain letters, digits, '-' and '_'",
        ));
    }
    Ok(folder)
}

fn extension_for(file_name: Option<&str>, content_type: &str) -> String {
    let from_name = file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));
    if let Some(ext) = from_name {
        return ext;
    }

    let subtype = content_type
        .split(';')
        .next()
        .and_then(|essence| essence.trim().split('/').nth(1))
        .unwrap_or("bin")
        .to_ascii_lowercase();
    match subtype.as_str() {
        "jpeg" => "jpg".to_string(),
        "svg+xml" => "svg".to_string(),
        other => other
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>(),
    }
}

/// 產生不重複的檔名: {毫秒時間戳}-{8 碼亂數}.{副檔名}
///
/// 同一行程內時間戳保證嚴格遞增。
#[derive(Debug, Default)]
pub struct FileNameGenerator {
    last_millis: AtomicI64,
}

impl FileNameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_stamp(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let mut last = self.last_millis.load(Ordering::Relaxed);
        loop {
            let next = if now > last { now } else { last + 1 };
            match self.last_millis.compare_exchange_weak(
                last,
                next,
                Ordering::SeqCst,
                Ordering::Relaxed,
            ) {
                Ok(_) => return next,
                Err(actual) => last = actual,
            }
        }
    }

    pub fn generate(&self, file_name: Option<&str>, content_type: &str) -> String {
        let random: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(char::from)
            .collect::<String>()
            .to_ascii_lowercase();
        format!(
            "{}-{}.{}",
            self.next_stamp(),
            random,
            extension_for(file_name, content_type)
        )
    }
}

pub struct UploadService {
    storage: Arc<dyn ObjectStorage>,
    buckets: BucketLayout,
    names: FileNameGenerator,
}

impl UploadService {
    pub fn new(storage: Arc<dyn ObjectStorage>, buckets: BucketLayout) -> Self {
        Self {
            storage,
            buckets,
            names: FileNameGenerator::new(),
        }
    }

    pub async fn upload(&self, request: UploadRequest) -> Result<UploadResult> {
        check_upload(&request.content_type, request.data.len())?;
        let folder = normalize_folder(request.folder.as_deref())?;

        let file_name = self
            .names
            .generate(request.file_name.as_deref(), &request.content_type);
        let path = format!("{}/{}", folder, file_name);
        let bucket = self.buckets.bucket_for(&folder);
        let size = request.data.len();

        let url = self
            .storage
            .put_object(bucket, &path, request.data, &request.content_type)
            .await?;

        tracing::info!("📤 Uploaded {} ({} bytes) to bucket {}", path, size, bucket);
        Ok(UploadResult { url, path })
    }
}
