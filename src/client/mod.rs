// Admin-side client: HTTP access to the admin API and the optimistic reorder state machine.

pub mod admin;
pub mod controller;
pub mod reorder_state;

pub use admin::AdminClient;
pub use controller::{CollectionReorderClient, ReorderClient, ReorderController};
pub use reorder_state::{Effect, ReorderEvent, ReorderPhase, ReorderState};
