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

//! Domain models and core data structures.
//!
//! This module defines the central entities shared by the catalog, the
//! playlist store and the playlist coordinator: songs, playlist identities,
//! row selections and playback states.

use serde::{Deserialize, Serialize};

/// Identifier assigned to a playlist by the store.
pub type PlaylistId = i64;

/// Identifier of a song record in the catalog.
pub type SongId = i64;

/// A song, either a catalog record or metadata read from a playlist file.
///
/// Only songs that came from the catalog carry an `id`; that id is the key
/// used to refresh playlist items when the catalog rediscovers the song.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Song {
    pub id: Option<SongId>,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub track_number: Option<u32>,
    /// Length in seconds, zero or negative when unknown.
    pub duration: i64,
    pub filename: String,
}

impl Song {
    pub fn from_file(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Self::default()
        }
    }

    pub fn is_stream(&self) -> bool {
        self.filename.starts_with("http://") || self.filename.starts_with("https://")
    }

    /// Title to display, falling back to the file name when there is no tag.
    pub fn display_title(&self) -> &str {
        if !self.title.is_empty() {
            return &self.title;
        }

        self.filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.filename)
    }
}

/// An inclusive range of selected rows, as reported by a table view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRange {
    pub top: usize,
    pub bottom: usize,
}

impl SelectionRange {
    pub fn new(top: usize, bottom: usize) -> Self {
        Self {
            top: top.min(bottom),
            bottom: top.max(bottom),
        }
    }

    pub fn single(row: usize) -> Self {
        Self::new(row, row)
    }

    pub fn len(&self) -> usize {
        self.bottom - self.top + 1
    }

    pub fn rows(&self) -> impl Iterator<Item = usize> {
        self.top..=self.bottom
    }
}

/// Represents the playback status reported for the active playlist.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlayingState {
    Playing,
    Paused,
    #[default]
    Stopped,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepeatMode {
    #[default]
    Off,
    Track,
    Playlist,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShuffleMode {
    #[default]
    Off,
    All,
}
