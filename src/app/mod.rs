// HTTP layer: axum router, handlers and state wiring.

pub mod bootstrap;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod payload;
pub mod routes;
pub mod state;

pub use bootstrap::build_state;
pub use routes::router;
pub use state::AppState;
