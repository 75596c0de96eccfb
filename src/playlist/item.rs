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

use crate::model::{Song, SongId};

/// Where a playlist item's song came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemSource {
    /// A catalog record, refreshed whenever the catalog rediscovers it.
    Library,
    /// A local file that is not (yet) known to the catalog.
    File,
    /// A network stream; its metadata may change while it plays.
    Stream,
}

impl ItemSource {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            ItemSource::Library => "library",
            ItemSource::File => "file",
            ItemSource::Stream => "stream",
        }
    }

    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value {
            "library" => Some(ItemSource::Library),
            "file" => Some(ItemSource::File),
            "stream" => Some(ItemSource::Stream),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaylistItem {
    source: ItemSource,
    song: Song,
    stream_metadata: Option<Song>,
}

impl PlaylistItem {
    pub fn new(source: ItemSource, song: Song) -> Self {
        Self {
            source,
            song,
            stream_metadata: None,
        }
    }

    /// Classifies a song by whether it has a catalog id or a stream url.
    pub fn from_song(song: Song) -> Self {
        let source = if song.id.is_some() {
            ItemSource::Library
        } else if song.is_stream() {
            ItemSource::Stream
        } else {
            ItemSource::File
        };

        Self::new(source, song)
    }

    pub fn source(&self) -> ItemSource {
        self.source
    }

    /// The catalog id this item tracks, only for library items.
    pub fn library_id(&self) -> Option<SongId> {
        match self.source {
            ItemSource::Library => self.song.id,
            _ => None,
        }
    }

    pub fn url(&self) -> &str {
        &self.song.filename
    }

    /// The song as it should be displayed, including live stream metadata.
    pub fn metadata(&self) -> &Song {
        self.stream_metadata.as_ref().unwrap_or(&self.song)
    }

    /// The song as it was inserted, without any stream overrides.
    pub fn original(&self) -> &Song {
        &self.song
    }

    pub fn duration(&self) -> i64 {
        self.metadata().duration
    }

    /// Refreshes the song from a newer catalog record. The url of the item
    /// is kept when the record has none.
    pub fn set_metadata(&mut self, song: &Song) {
        let filename = std::mem::take(&mut self.song.filename);
        self.song = Song {
            filename: if song.filename.is_empty() {
                filename
            } else {
                song.filename.clone()
            },
            ..song.clone()
        };
    }

    /// Replaces the song wholesale after the user edited it.
    pub(crate) fn set_song(&mut self, song: Song) {
        self.song = song;
    }

    pub(crate) fn set_stream_metadata(&mut self, song: Song) {
        self.stream_metadata = Some(song);
    }

    pub(crate) fn clear_stream_metadata(&mut self) {
        self.stream_metadata = None;
    }
}
