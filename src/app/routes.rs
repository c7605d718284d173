use crate::app::handlers::{
    case_study, create, delete, health, list_admin, list_public, project_detail, reorder,
    require_authorized, update, upload, version,
};
use crate::app::state::AppState;
use crate::core::upload::MAX_UPLOAD_BYTES;
use crate::domain::model::{Project, TeamMember};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::{middleware, Router};

/// multipart 邊界與表單欄位的額外空間
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

pub fn router(state: AppState) -> Router {
    let admin = Router::new()
        .route(
            "/projects",
            get(list_admin::<Project>).post(create::<Project>),
        )
        .route("/projects/reorder", put(reorder::<Project>))
        .route("/projects/version", get(version::<Project>))
        .route(
            "/projects/{id}",
            put(update::<Project>).delete(delete::<Project>),
        )
        .route(
            "/team",
            get(list_admin::<TeamMember>).post(create::<TeamMember>),
        )
        .route("/team/reorder", put(reorder::<TeamMember>))
        .route("/team/version", get(version::<TeamMember>))
        .route(
            "/team/{id}",
            put(update::<TeamMember>).delete(delete::<TeamMember>),
        )
        .route(
            "/upload",
            post(upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD)),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_authorized,
        ));

    Router::new()
        .route("/health", get(health))
        .route("/projects", get(list_public::<Project>))
        .route("/projects/{id}", get(project_detail))
        .route("/projects/{id}/case-study", get(case_study))
        .route("/team", get(list_public::<TeamMember>))
        .nest("/admin", admin)
        .with_state(state)
}
