//! SQLite schema for the track metadata database.
//!
//! The tracks table is produced by the external ingestion collaborator
//! (cleaning, NA-dropping and deduplication happen there). The store only
//! creates the schema for brand-new databases, otherwise it verifies the
//! version and reads.

use anyhow::{bail, Result};
use rusqlite::Connection;

/// Current schema version, stored in `PRAGMA user_version`.
pub const TRACKS_SCHEMA_VERSION: i64 = 1;

const CREATE_TRACKS_TABLE: &str = "
CREATE TABLE tracks (
    rowid INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    artist TEXT NOT NULL,
    album TEXT,
    genre TEXT,
    tags TEXT,
    year INTEGER,
    spotify_id TEXT,
    popularity REAL NOT NULL,
    duration_ms REAL NOT NULL,
    danceability REAL NOT NULL,
    energy REAL NOT NULL,
    key REAL NOT NULL,
    loudness REAL NOT NULL,
    mode REAL NOT NULL,
    speechiness REAL NOT NULL,
    acousticness REAL NOT NULL,
    instrumentalness REAL NOT NULL,
    liveness REAL NOT NULL,
    valence REAL NOT NULL,
    tempo REAL NOT NULL,
    UNIQUE (name, artist)
)";

const CREATE_TRACKS_NAME_INDEX: &str = "CREATE INDEX idx_tracks_name ON tracks (name)";

/// Create the schema on a brand-new database, or verify the version of an
/// existing one. Refuses to open databases with an unknown schema version.
pub fn init_schema(conn: &Connection) -> Result<()> {
    let table_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |r| r.get(0),
    )?;

    if table_count == 0 {
        conn.execute(CREATE_TRACKS_TABLE, [])?;
        conn.execute(CREATE_TRACKS_NAME_INDEX, [])?;
        conn.pragma_update(None, "user_version", TRACKS_SCHEMA_VERSION)?;
        return Ok(());
    }

    let version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    if version != TRACKS_SCHEMA_VERSION {
        bail!(
            "Unsupported track db schema version {} (expected {})",
            version,
            TRACKS_SCHEMA_VERSION
        );
    }
    Ok(())
}
