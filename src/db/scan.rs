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

//! Media library indexing and database persistence.
//!
//! This module handles the discovery of audio files on the local filesystem
//! and the management of associated database records.
//!
//! It utilizes `WalkDir` for efficient directory traversal and `Lofty` for
//! metadata extraction.
//!
//! # Stable ids
//!
//! Tracks are upserted by file name rather than rebuilt from scratch, so a
//! rescan keeps the ids that playlist items already reference. The songs
//! returned from a scan are what the catalog announces as discovered.
//!
//! # Performance
//!
//! Large library scans are performed within an atomic SQLite transaction to
//! maximize write throughput and ensure database integrity. Internal caching
//! is used during processing to minimize redundant database lookups for
//! existing artist and album entries.

use std::{collections::HashMap, path::Path};

use anyhow::{Context, Result};
use lofty::{prelude::*, probe::Probe};
use rusqlite::{Connection, params};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::{error::Error, model::Song};

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "opus", "m4a", "wav"];

const UNKNOWN_ARTIST: &str = "Unknown Artist";
const UNKNOWN_ALBUM: &str = "Unknown Album";

pub(crate) fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| AUDIO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Reads tag metadata from an audio file.
///
/// Missing tags fall back to the file name for the title and to placeholder
/// artist and album names. The returned song has no catalog id.
///
/// # Errors
///
/// Returns [`Error::Tags`] if the file cannot be probed or has no tags.
pub fn read_song(path: &Path) -> crate::error::Result<Song> {
    let tagged_file = Probe::open(path)
        .and_then(|p| p.read())
        .map_err(|e| Error::Tags(format!("{}: {}", path.display(), e)))?;

    let tag = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag())
        .ok_or_else(|| Error::Tags(format!("{}: no tags", path.display())))?;

    let filename = path.to_string_lossy().to_string();
    let fallback_title = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| filename.clone());

    Ok(Song {
        id: None,
        title: tag.title().map(|t| t.to_string()).unwrap_or(fallback_title),
        artist: tag
            .artist()
            .map(|a| a.to_string())
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
        album: tag
            .album()
            .map(|a| a.to_string())
            .unwrap_or_else(|| UNKNOWN_ALBUM.to_string()),
        track_number: tag.track(),
        duration: i64::try_from(tagged_file.properties().duration().as_secs()).unwrap_or(-1),
        filename,
    })
}

/// Recursively scans the media directories and synchronizes the database.
///
/// Every audio file with readable tags is inserted, or updated in place when
/// its file name is already known.
///
/// # Returns
///
/// The catalog record of every track seen during the scan, with ids set.
///
/// # Errors
///
/// Returns an error if the transaction fails or if database constraints are
/// violated during insertion. Unreadable files are skipped.
pub(crate) fn process_music_library(conn: &mut Connection, dirs: &[String]) -> Result<Vec<Song>> {
    let mut artist_cache: HashMap<String, i64> = HashMap::new();
    let mut album_cache: HashMap<(i64, String), i64> = HashMap::new();
    let mut discovered = Vec::new();

    let tx = conn.transaction()?;

    for dir in dirs {
        info!(dir = %dir, "Scanning media directory");

        for entry in WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && is_audio_file(e.path()))
        {
            let path = entry.path();

            let mut song = match read_song(path) {
                Ok(song) => song,
                Err(e) => {
                    debug!("Skipping {}", e);
                    continue;
                }
            };

            let artist_id = if let Some(&id) = artist_cache.get(&song.artist) {
                id
            } else {
                tx.execute("INSERT OR IGNORE INTO artists (name) VALUES (?)", params![song.artist])?;
                let id: i64 = tx.query_row("SELECT id FROM artists WHERE name = ?", params![song.artist], |r| r.get(0))?;
                artist_cache.insert(song.artist.clone(), id);
                id
            };

            let album_key = (artist_id, song.album.clone());
            let album_id = if let Some(&id) = album_cache.get(&album_key) {
                id
            } else {
                tx.execute("INSERT OR IGNORE INTO albums (artist_id, title) VALUES (?, ?)", params![artist_id, song.album])?;
                let id: i64 = tx.query_row("SELECT id FROM albums WHERE artist_id = ? AND title = ?", params![artist_id, song.album], |r| r.get(0))?;
                album_cache.insert(album_key, id);
                id
            };

            let id: i64 = tx
                .query_row(
                    "INSERT INTO tracks (album_id, track_number, title, duration, filename)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT (filename) DO UPDATE SET
                         album_id = excluded.album_id,
                         track_number = excluded.track_number,
                         title = excluded.title,
                         duration = excluded.duration
                     RETURNING id",
                    params![album_id, song.track_number, song.title, song.duration, song.filename],
                    |r| r.get(0),
                )
                .with_context(|| format!("Failed to store {}", song.filename))?;

            song.id = Some(id);
            discovered.push(song);
        }
    }

    tx.commit().context("Failed to commit transaction")?;

    info!(count = discovered.len(), "Media scan finished");

    Ok(discovered)
}
