//! Content-based song recommendation service.
//!
//! Tracks and their audio attributes live in a SQLite catalog. An offline
//! pipeline encodes each track into a feature vector (min-max scaled audio
//! attributes plus TF-IDF blocks for artist, genre, album and tags),
//! optionally projects it into a low-rank embedding, and builds cosine
//! nearest-neighbor indexes over the result. The server loads those
//! artifacts, pins them behind an atomically swappable snapshot and serves
//! song- and mood-based recommendations over HTTP.

pub mod config;
pub mod features;
pub mod index;
pub mod model;
pub mod mood;
pub mod recommender;
pub mod reducer;
pub mod server;
pub mod track_store;
