// Adapters layer: concrete implementations of the domain ports (database, object storage, cache, session).

pub mod object_storage;
pub mod page_cache;
#[cfg(feature = "s3")]
pub mod s3;
pub mod session;
pub mod sqlite;
