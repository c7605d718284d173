pub mod adapters;
pub mod app;
pub mod client;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::ServerConfig;

pub use app::{build_state, router, AppState};
pub use client::{AdminClient, ReorderController};
pub use domain::model::{Collection, Identity, OrderedEntity, Project, TeamMember};
pub use utils::error::{AppError, Result};
