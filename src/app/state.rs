use crate::app::payload::{ProjectPayload, TeamMemberPayload};
use crate::core::auth::AuthorizationGate;
use crate::core::catalog::CollectionService;
use crate::core::upload::UploadService;
use crate::domain::model::{OrderedEntity, Project, TeamMember};
use crate::utils::error::Result;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// 所有 handler 共用的相依物件
#[derive(Clone)]
pub struct AppState {
    pub projects: Arc<CollectionService<Project>>,
    pub team: Arc<CollectionService<TeamMember>>,
    pub uploads: Arc<UploadService>,
    pub gate: Arc<AuthorizationGate>,
}

/// 透過 HTTP 管理的集合，讓泛型 handler 找到自己的服務與表單格式
pub trait Resource: OrderedEntity {
    type Payload: DeserializeOwned + Send + 'static;

    fn service(state: &AppState) -> &CollectionService<Self>;
    fn validate(payload: Self::Payload) -> Result<Self::Draft>;
}

impl Resource for Project {
    type Payload = ProjectPayload;

    fn service(state: &AppState) -> &CollectionService<Self> {
        &state.projects
    }

    fn validate(payload: ProjectPayload) -> Result<Self::Draft> {
        payload.into_draft()
    }
}

impl Resource for TeamMember {
    type Payload = TeamMemberPayload;

    fn service(state: &AppState) -> &CollectionService<Self> {
        &state.team
    }

    fn validate(payload: TeamMemberPayload) -> Result<Self::Draft> {
        payload.into_draft()
    }
}
