use crate::app::extract::ApiJson;
use crate::app::payload::{ReorderRequest, ReorderResponse, SuccessResponse, VersionResponse};
use crate::app::state::{AppState, Resource};
use crate::core::upload::{check_upload, UploadRequest, UploadResult, MAX_UPLOAD_BYTES};
use crate::domain::case_study::{resolve_case_study, CaseStudyView};
use crate::domain::model::{Identity, OrderedEntity};
use crate::utils::error::AppError;
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{Multipart, Path, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde_json::json;

/// 公開列表回應的快取標頭 (24 小時重新驗證)
pub const PUBLIC_CACHE_CONTROL: &str = "public, s-maxage=86400, stale-while-revalidate";

fn cached_json(body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CACHE_CONTROL, PUBLIC_CACHE_CONTROL),
        ],
        body,
    )
        .into_response()
}

/// 所有 /admin 路由的授權檢查，在讀取 body 之前執行
pub async fn require_authorized(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = state.gate.authorize(request.headers())?;
    tracing::debug!(
        "Authorized {} {} for {}",
        request.method(),
        request.uri().path(),
        identity.email
    );
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

// =============================================================================
// 公開讀取
// =============================================================================

pub async fn list_public<R: Resource>(State(state): State<AppState>) -> Result<Response, AppError> {
    let body = R::service(&state).list_public().await?;
    Ok(cached_json(body))
}

pub async fn project_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let body = state.projects.get_public(&id).await?;
    Ok(cached_json(body))
}

pub async fn case_study(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CaseStudyView>, AppError> {
    let project = state.projects.get(&id).await?;
    resolve_case_study(&project)
        .map(Json)
        .ok_or_else(|| AppError::not_found("Case study", id))
}

// =============================================================================
// 管理後台
// =============================================================================

pub async fn list_admin<R: Resource>(State(state): State<AppState>) -> Result<Json<Vec<R>>, AppError> {
    Ok(Json(R::service(&state).list().await?))
}

pub async fn create<R: Resource>(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiJson(payload): ApiJson<R::Payload>,
) -> Result<(StatusCode, Json<R>), AppError> {
    let draft = R::validate(payload)?;
    let created = R::service(&state).create(draft).await?;
    tracing::info!("{} {} created by {}", R::LABEL, created.id(), identity.email);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update<R: Resource>(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<R::Payload>,
) -> Result<Json<R>, AppError> {
    let draft = R::validate(payload)?;
    let updated = R::service(&state).update(&id, draft).await?;
    tracing::info!("{} {} updated by {}", R::LABEL, id, identity.email);
    Ok(Json(updated))
}

pub async fn delete<R: Resource>(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    R::service(&state).delete(&id).await?;
    tracing::info!("{} {} deleted by {}", R::LABEL, id, identity.email);
    Ok(Json(SuccessResponse { success: true }))
}

pub async fn reorder<R: Resource>(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiJson(request): ApiJson<ReorderRequest>,
) -> Result<Json<ReorderResponse>, AppError> {
    let version = R::service(&state)
        .reorder(request.ids, request.expected_version)
        .await?;
    tracing::info!("{} reordered by {}", R::COLLECTION, identity.email);
    Ok(Json(ReorderResponse {
        success: true,
        version,
    }))
}

pub async fn version<R: Resource>(
    State(state): State<AppState>,
) -> Result<Json<VersionResponse>, AppError> {
    let version = R::service(&state).version().await?;
    Ok(Json(VersionResponse {
        collection: R::COLLECTION.to_string(),
        version,
    }))
}

// =============================================================================
// 上傳
// =============================================================================

fn multipart_error(err: MultipartError, received: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLargeError {
            size: received,
            limit: MAX_UPLOAD_BYTES,
        }
    } else {
        AppError::validation("file", err.body_text())
    }
}

/// 逐塊讀取檔案；超過上限後只計數不保留，讀完再回報
async fn read_limited(field: &mut Field<'_>) -> Result<Vec<u8>, AppError> {
    let mut data = Vec::new();
    let mut received = 0usize;
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(e, received))?
    {
        received += chunk.len();
        if received <= MAX_UPLOAD_BYTES {
            data.extend_from_slice(&chunk);
        }
    }
    if received > MAX_UPLOAD_BYTES {
        return Err(AppError::PayloadTooLargeError {
            size: received,
            limit: MAX_UPLOAD_BYTES,
        });
    }
    Ok(data)
}

pub async fn upload(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    mut multipart: Multipart,
) -> Result<Json<UploadResult>, AppError> {
    let mut file: Option<(Option<String>, String, Vec<u8>)> = None;
    let mut folder: Option<String> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, 0))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                // 非圖片直接拒絕，不讀內容
                check_upload(&content_type, 0)?;
                let data = read_limited(&mut field).await?;
                file = Some((file_name, content_type, data));
            }
            Some("folder") => {
                folder = Some(field.text().await.map_err(|e| multipart_error(e, 0))?);
            }
            _ => {}
        }
    }

    let (file_name, content_type, data) =
        file.ok_or_else(|| AppError::validation("file", "is required"))?;

    let result = state
        .uploads
        .upload(UploadRequest {
            file_name,
            content_type,
            folder,
            data,
        })
        .await?;
    tracing::info!("Upload {} by {}", result.path, identity.email);
    Ok(Json(result))
}
