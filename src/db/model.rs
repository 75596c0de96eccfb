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

//! Database row mapping for domain models.
//!
//! This module provides the conversion logic between raw SQLite result rows
//! and high-level domain models, ensuring type-safe extraction of model
//! attributes from database queries.

use rusqlite::{
    Row,
    types::{FromSql, FromSqlError, FromSqlResult, ValueRef},
};

use crate::{
    model::Song,
    playlist::{ItemSource, PlaylistItem},
};

impl Song {
    /// Maps a catalog row to a [`Song`] instance.
    ///
    /// Expects the columns `id, title, artist, album, track_number, duration,
    /// filename` in that order.
    ///
    /// # Errors
    ///
    /// Returns a [`rusqlite::Error`] if:
    /// * The row does not contain enough columns.
    /// * The data in a column cannot be converted to the required Rust type.
    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            artist: row.get(2)?,
            album: row.get(3)?,
            track_number: row.get(4)?,
            duration: row.get(5)?,
            filename: row.get(6)?,
        })
    }
}

impl PlaylistItem {
    /// Maps a `playlist_items` row to a [`PlaylistItem`].
    ///
    /// The cached metadata is restored as-is; library items are refreshed
    /// from the catalog the next time it rediscovers them.
    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let source: ItemSource = row.get(0)?;

        let song = Song {
            id: row.get(1)?,
            title: row.get(2)?,
            artist: row.get(3)?,
            album: row.get(4)?,
            track_number: row.get(5)?,
            duration: row.get(6)?,
            filename: row.get(7)?,
        };

        Ok(PlaylistItem::new(source, song))
    }
}

impl FromSql for ItemSource {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        ItemSource::parse(value.as_str()?).ok_or(FromSqlError::InvalidType)
    }
}
