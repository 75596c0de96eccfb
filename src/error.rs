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

//! Error types shared by the playlist store, parsers and coordinator.

use thiserror::Error;

use crate::model::PlaylistId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An operation named a playlist that is not in the index.
    #[error("Unknown playlist: {0}")]
    UnknownPlaylist(PlaylistId),

    /// The store could not allocate an id for a new playlist.
    #[error("Couldn't create playlist '{0}'")]
    CreationFailed(String),

    #[error("Unsupported playlist format: {0}")]
    UnsupportedFormat(String),

    #[error("Malformed playlist: {0}")]
    Malformed(String),

    #[error("Failed to read tags: {0}")]
    Tags(String),
}

pub type Result<T> = std::result::Result<T, Error>;
