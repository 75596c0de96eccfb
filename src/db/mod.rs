// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Data access layer.
//!
//! This module handles all interactions with the SQLite database, including
//! schema creation, catalog lookups and playlist persistence. It uses cached
//! statements to optimize frequently executed queries.
//!
//! # Tables
//!
//! * `artists` - Stores unique artist names.
//! * `albums` - Groups tracks under titles, linked to artists.
//! * `tracks` - Individual audio files with metadata and file paths.
//! * `playlists` - Playlist identities, names and their display order.
//! * `playlist_items` - The ordered contents of each playlist.
//!
//! # Performance
//!
//! Most functions in this module use [`rusqlite::Connection::prepare_cached`]
//! to reduce SQL parsing overhead.

mod model;
pub mod scan;

use anyhow::Context;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::{
    error::Result,
    model::{PlaylistId, Song, SongId},
    playlist::PlaylistItem,
};

/// Opens a connection to the SQLite database and configures performance settings.
///
/// This function performs the following setup:
/// * **WAL Mode**: Enables Write-Ahead Logging for better concurrency.
/// * **Performance Tuning**: Sets synchronous mode to `NORMAL` and increases the cache size.
/// * **Constraints**: Enforces foreign key integrity.
/// * **Schema**: Executes [`create_schema`] to ensure all tables and indices exist.
///
/// # Errors
///
/// Returns an error if:
/// * The database file cannot be opened.
/// * The initial PRAGMA configurations fail.
/// * The schema initialization fails.
pub fn init_db(path: &str) -> anyhow::Result<Connection> {
    let conn = Connection::open(path).with_context(|| format!("Failed to open {}", path))?;

    let journal_mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |r| r.get(0))?;
    if journal_mode != "wal" {
        anyhow::bail!(
            "Failed to switch to WAL mode. Current mode: {}",
            journal_mode
        );
    }

    conn.execute_batch(
        "
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA cache_size = -64000; -- Use 64MB of RAM for cache
    ",
    )?;

    conn.set_prepared_statement_cache_capacity(100);

    create_schema(&conn)?;

    Ok(conn)
}

/// Opens a private in-memory database with the full schema.
///
/// In-memory databases cannot use WAL, so only the constraint pragmas are
/// applied. Used by tests and by the `--in-memory` command line option.
pub fn init_memory_db() -> anyhow::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    create_schema(&conn)?;

    Ok(conn)
}

/// Create the database schema.
///
/// This operation is wrapped in a single SQL transaction to ensure the schema
/// is updated atomically. Deleting a playlist cascades to its items.
fn create_schema(conn: &Connection) -> anyhow::Result<()> {
    conn.execute_batch(
        "BEGIN;

        CREATE TABLE IF NOT EXISTS artists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL COLLATE NOCASE UNIQUE
        );

        CREATE TABLE IF NOT EXISTS albums (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            artist_id INTEGER NOT NULL,
            title TEXT NOT NULL COLLATE NOCASE,
            UNIQUE (artist_id, title),
            FOREIGN KEY (artist_id) REFERENCES artists (id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_albums_artist_id ON albums (artist_id);

        CREATE TABLE IF NOT EXISTS tracks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            album_id INTEGER NOT NULL,
            track_number INTEGER,
            title TEXT NOT NULL COLLATE NOCASE,
            duration INTEGER NOT NULL,
            genre TEXT,
            year INTEGER,
            filename TEXT NOT NULL UNIQUE,
            FOREIGN KEY (album_id) REFERENCES albums (id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_tracks_album_id ON tracks (album_id);

        CREATE TABLE IF NOT EXISTS playlists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            sort_order INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS playlist_items (
            playlist_id INTEGER NOT NULL,
            position INTEGER NOT NULL,
            source TEXT NOT NULL,
            library_id INTEGER,
            title TEXT NOT NULL,
            artist TEXT NOT NULL,
            album TEXT NOT NULL,
            track_number INTEGER,
            duration INTEGER NOT NULL,
            filename TEXT NOT NULL,
            PRIMARY KEY (playlist_id, position),
            FOREIGN KEY (playlist_id) REFERENCES playlists (id) ON DELETE CASCADE
        );

        COMMIT;",
    )
    .context("Failed to create schema")
}

/// Fetches the catalog record for a file, if the catalog knows it.
pub fn fetch_song_by_filename(conn: &Connection, filename: &str) -> Result<Option<Song>> {
    let sql = "
        SELECT tr.id, tr.title, ar.name, al.title, tr.track_number, tr.duration, tr.filename
        FROM tracks tr
        JOIN albums al ON tr.album_id = al.id
        JOIN artists ar ON al.artist_id = ar.id
        WHERE tr.filename = ?
    ";

    let mut stmt = conn.prepare_cached(sql)?;
    let song = stmt.query_row([filename], Song::from_row).optional()?;

    Ok(song)
}

/// Fetches a catalog record by id.
pub fn fetch_song(conn: &Connection, song_id: SongId) -> Result<Option<Song>> {
    let sql = "
        SELECT tr.id, tr.title, ar.name, al.title, tr.track_number, tr.duration, tr.filename
        FROM tracks tr
        JOIN albums al ON tr.album_id = al.id
        JOIN artists ar ON al.artist_id = ar.id
        WHERE tr.id = ?
    ";

    let mut stmt = conn.prepare_cached(sql)?;
    let song = stmt.query_row([song_id], Song::from_row).optional()?;

    Ok(song)
}

/// A playlist identity as recorded by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPlaylist {
    pub id: PlaylistId,
    pub name: String,
}

/// Durable record of playlist identities, names, ordering and contents.
///
/// Methods take `&self`: a store is shared between the coordinator and every
/// playlist it owns.
#[cfg_attr(test, mockall::automock)]
pub trait PlaylistStore {
    /// Allocates a new, empty playlist and returns its id.
    fn create_playlist(&self, name: &str) -> Result<PlaylistId>;

    fn remove_playlist(&self, id: PlaylistId) -> Result<()>;

    fn rename_playlist(&self, id: PlaylistId, name: &str) -> Result<()>;

    /// Records the display order; `ids` lists playlists first to last.
    fn set_playlist_order(&self, ids: &[PlaylistId]) -> Result<()>;

    /// Every playlist, in display order.
    fn get_all_playlists(&self) -> Result<Vec<StoredPlaylist>>;

    fn get_playlist_items(&self, id: PlaylistId) -> Result<Vec<PlaylistItem>>;

    /// Replaces the persisted contents of a playlist.
    fn set_playlist_items(&self, id: PlaylistId, items: &[PlaylistItem]) -> Result<()>;
}

/// SQLite implementation of [`PlaylistStore`].
pub struct SqlitePlaylistStore {
    conn: Connection,
}

impl SqlitePlaylistStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

impl PlaylistStore for SqlitePlaylistStore {
    fn create_playlist(&self, name: &str) -> Result<PlaylistId> {
        let sql = "
            INSERT INTO playlists (name, sort_order)
            VALUES (?1, (SELECT COALESCE(MAX(sort_order), -1) + 1 FROM playlists))";

        let mut stmt = self.conn.prepare_cached(sql)?;
        stmt.execute(params![name])?;

        let id = self.conn.last_insert_rowid();
        debug!(id, name, "Stored new playlist");

        Ok(id)
    }

    fn remove_playlist(&self, id: PlaylistId) -> Result<()> {
        let mut stmt = self.conn.prepare_cached("DELETE FROM playlists WHERE id = ?")?;
        stmt.execute([id])?;

        Ok(())
    }

    fn rename_playlist(&self, id: PlaylistId, name: &str) -> Result<()> {
        let mut stmt = self
            .conn
            .prepare_cached("UPDATE playlists SET name = ?1 WHERE id = ?2")?;
        stmt.execute(params![name, id])?;

        Ok(())
    }

    fn set_playlist_order(&self, ids: &[PlaylistId]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached("UPDATE playlists SET sort_order = ?1 WHERE id = ?2")?;
            for (position, id) in ids.iter().enumerate() {
                stmt.execute(params![position as i64, id])?;
            }
        }
        tx.commit()?;

        Ok(())
    }

    fn get_all_playlists(&self) -> Result<Vec<StoredPlaylist>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT id, name FROM playlists ORDER BY sort_order, id")?;
        let results = stmt
            .query_map([], |row| {
                Ok(StoredPlaylist {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(results)
    }

    fn get_playlist_items(&self, id: PlaylistId) -> Result<Vec<PlaylistItem>> {
        let sql = "
            SELECT source, library_id, title, artist, album, track_number, duration, filename
            FROM playlist_items
            WHERE playlist_id = ?
            ORDER BY position";

        let mut stmt = self.conn.prepare_cached(sql)?;
        let results = stmt
            .query_map([id], PlaylistItem::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(results)
    }

    fn set_playlist_items(&self, id: PlaylistId, items: &[PlaylistItem]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute("DELETE FROM playlist_items WHERE playlist_id = ?", [id])?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO playlist_items
                    (playlist_id, position, source, library_id, title, artist, album, track_number, duration, filename)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;

            for (position, item) in items.iter().enumerate() {
                let song = item.original();
                stmt.execute(params![
                    id,
                    position as i64,
                    item.source().as_str(),
                    item.library_id(),
                    song.title,
                    song.artist,
                    song.album,
                    song.track_number,
                    song.duration,
                    song.filename,
                ])?;
            }
        }

        tx.commit()?;

        Ok(())
    }
}
