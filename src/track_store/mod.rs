mod models;
mod schema;
mod store;
mod trait_def;

pub use models::{AudioAttributes, Track, NUMERIC_ATTRIBUTES};
pub use schema::TRACKS_SCHEMA_VERSION;
pub use store::SqliteTrackStore;
pub use trait_def::TrackStore;
