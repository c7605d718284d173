pub mod auth;
pub mod catalog;
pub mod upload;

pub use crate::domain::model::{OrderedEntity, Project, TeamMember};
pub use crate::domain::ports::{CollectionRepository, ObjectStorage, PageCache};
pub use crate::utils::error::Result;
