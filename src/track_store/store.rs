//! SQLite-backed track store implementation.

use super::models::{AudioAttributes, Track};
use super::schema::init_schema;
use super::trait_def::TrackStore;
use anyhow::{bail, Context, Result};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

/// SQLite-backed store for track metadata.
pub struct SqliteTrackStore {
    conn: Mutex<Connection>,
}

impl SqliteTrackStore {
    pub fn new(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open track db at {:?}", db_path))?;
        init_schema(&conn)?;
        Ok(SqliteTrackStore {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        // A poisoned lock means a reader panicked mid-query; the connection
        // itself is still usable for the next read.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TrackStore for SqliteTrackStore {
    fn load_all(&self) -> Result<Vec<Track>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT name, artist, album, genre, tags, year, spotify_id,
                    popularity, duration_ms, danceability, energy, key, loudness,
                    mode, speechiness, acousticness, instrumentalness, liveness,
                    valence, tempo
             FROM tracks ORDER BY rowid",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, Option<i64>>(5)?,
                row.get::<_, Option<String>>(6)?,
                AudioAttributes {
                    popularity: row.get::<_, f64>(7)? as f32,
                    duration_ms: row.get::<_, f64>(8)? as f32,
                    danceability: row.get::<_, f64>(9)? as f32,
                    energy: row.get::<_, f64>(10)? as f32,
                    key: row.get::<_, f64>(11)? as f32,
                    loudness: row.get::<_, f64>(12)? as f32,
                    mode: row.get::<_, f64>(13)? as f32,
                    speechiness: row.get::<_, f64>(14)? as f32,
                    acousticness: row.get::<_, f64>(15)? as f32,
                    instrumentalness: row.get::<_, f64>(16)? as f32,
                    liveness: row.get::<_, f64>(17)? as f32,
                    valence: row.get::<_, f64>(18)? as f32,
                    tempo: row.get::<_, f64>(19)? as f32,
                },
            ))
        })?;

        let mut tracks = Vec::new();
        for row in rows {
            let (name, artist, album, genre, tags, year, spotify_id, attributes) = row?;
            if !attributes.is_finite() {
                bail!(
                    "Track '{}' by '{}' has non-finite audio attributes",
                    name,
                    artist
                );
            }
            tracks.push(Track {
                row_id: tracks.len(),
                name,
                artist,
                album,
                genre,
                tags,
                year,
                spotify_id,
                attributes,
            });
        }

        info!("Loaded {} tracks from metadata store", tracks.len());
        Ok(tracks)
    }

    fn count(&self) -> Result<usize> {
        let conn = self.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM tracks", [], |r| r.get(0))?;
        Ok(count as usize)
    }
}
