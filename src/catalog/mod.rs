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

//! Media catalog.
//!
//! The catalog owns the canonical song records. Whenever records are
//! (re)discovered, for example by a library scan, every subscriber receives a
//! [`CatalogEvent::SongsDiscovered`] so it can refresh its own copies.

use std::sync::mpsc::{self, Receiver, Sender};

use rusqlite::Connection;
use tracing::debug;

use crate::{
    db::{self, scan},
    error::Result,
    model::{Song, SongId},
};

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEvent {
    SongsDiscovered(Vec<Song>),
}

pub struct Catalog {
    conn: Connection,
    subscribers: Vec<Sender<CatalogEvent>>,
}

impl Catalog {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            subscribers: vec![],
        }
    }

    /// Registers a new listener for catalog notifications.
    pub fn subscribe(&mut self) -> Receiver<CatalogEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Announces songs to every subscriber. Subscribers whose receiver has
    /// been dropped are forgotten.
    pub fn publish(&mut self, songs: Vec<Song>) {
        if songs.is_empty() {
            return;
        }

        debug!(count = songs.len(), subscribers = self.subscribers.len(), "Publishing discovered songs");

        self.subscribers
            .retain(|tx| tx.send(CatalogEvent::SongsDiscovered(songs.clone())).is_ok());
    }

    /// Scans the media directories and announces every song found.
    ///
    /// # Errors
    ///
    /// Returns an error if the scan transaction fails.
    pub fn rescan(&mut self, dirs: &[String]) -> anyhow::Result<usize> {
        let songs = scan::process_music_library(&mut self.conn, dirs)?;
        let count = songs.len();

        self.publish(songs);

        Ok(count)
    }

    pub fn song(&self, id: SongId) -> Result<Option<Song>> {
        db::fetch_song(&self.conn, id)
    }

    /// Resolves a file on disk to its catalog record, if it has been scanned.
    pub fn song_by_filename(&self, filename: &str) -> Result<Option<Song>> {
        db::fetch_song_by_filename(&self.conn, filename)
    }

    /// Attaches catalog ids and metadata to songs that the catalog knows.
    ///
    /// Songs read from playlist files only carry a path; this turns those that
    /// have been scanned into library songs so later rescans refresh them.
    pub fn resolve(&self, songs: Vec<Song>) -> Result<Vec<Song>> {
        songs
            .into_iter()
            .map(|song| {
                if song.id.is_some() || song.is_stream() {
                    return Ok(song);
                }
                Ok(self.song_by_filename(&song.filename)?.unwrap_or(song))
            })
            .collect()
    }
}
