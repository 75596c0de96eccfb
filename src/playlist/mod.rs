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

//! A single playlist and its track sequence state.
//!
//! A [`Playlist`] is an ordered list of items bound to a store id. It keeps
//! the row that is currently playing, persists its contents through the
//! shared [`PlaylistStore`] after every edit, and reports what happened to it
//! as [`PlaylistEvent`]s tagged with its id.
//!
//! Events are sent down a channel rather than handled inline, so the owner of
//! a playlist decides when, and in which order, to react to them.

mod item;
mod sequence;

pub use item::{ItemSource, PlaylistItem};
pub use sequence::PlaylistSequence;

use std::{rc::Rc, sync::mpsc::Sender};

use rand::{rng, seq::SliceRandom};
use tracing::{debug, warn};

use crate::{
    db::PlaylistStore,
    model::{PlayingState, PlaylistId, RepeatMode, ShuffleMode, Song, SongId},
};

#[derive(Debug, Clone, PartialEq)]
pub enum PlaylistEvent {
    /// Rows were added, removed, reordered or edited.
    Changed,
    CurrentSongChanged(Song),
    PlayingRowChanged(Option<usize>),
    EditingFinished(usize),
    LoadTracksStarted,
    LoadTracksFinished,
    LoadTracksError(String),
    PlayRequested(usize),
    /// The store rejected the new contents.
    SaveFailed(String),
}

/// Sending half used by playlists to report events to their owner.
pub type PlaylistEventSender = Sender<(PlaylistId, PlaylistEvent)>;

pub struct Playlist {
    id: PlaylistId,
    items: Vec<PlaylistItem>,
    playing_row: Option<usize>,
    playing_state: PlayingState,
    store: Rc<dyn PlaylistStore>,
    sequence: Rc<PlaylistSequence>,
    event_tx: PlaylistEventSender,
}

impl Playlist {
    pub fn new(
        id: PlaylistId,
        store: Rc<dyn PlaylistStore>,
        sequence: Rc<PlaylistSequence>,
        event_tx: PlaylistEventSender,
    ) -> Self {
        Self {
            id,
            items: vec![],
            playing_row: None,
            playing_state: PlayingState::Stopped,
            store,
            sequence,
            event_tx,
        }
    }

    pub fn id(&self) -> PlaylistId {
        self.id
    }

    /// Replaces the contents with whatever the store has recorded.
    pub fn restore(&mut self) {
        self.emit(PlaylistEvent::LoadTracksStarted);

        match self.store.get_playlist_items(self.id) {
            Ok(items) => {
                debug!(id = self.id, count = items.len(), "Restored playlist");
                self.items = items;
                self.playing_row = None;
                self.emit(PlaylistEvent::Changed);
                self.emit(PlaylistEvent::LoadTracksFinished);
            }
            Err(e) => {
                warn!(id = self.id, "Failed to restore playlist: {}", e);
                self.emit(PlaylistEvent::LoadTracksError(e.to_string()));
            }
        }
    }

    /// Inserts songs before `position`, or appends them when it is `None` or
    /// past the end.
    pub fn insert_songs(&mut self, songs: Vec<Song>, position: Option<usize>) {
        if songs.is_empty() {
            return;
        }

        let position = position.unwrap_or(self.items.len()).min(self.items.len());
        let count = songs.len();

        self.items.splice(
            position..position,
            songs.into_iter().map(PlaylistItem::from_song),
        );

        if let Some(row) = self.playing_row {
            if row >= position {
                self.playing_row = Some(row + count);
            }
        }

        self.content_changed();
    }

    /// Removes the given rows. Rows out of range are ignored.
    pub fn remove_rows(&mut self, rows: &[usize]) {
        let mut rows: Vec<usize> = rows.iter().copied().filter(|&r| r < self.items.len()).collect();
        rows.sort_unstable();
        rows.dedup();

        if rows.is_empty() {
            return;
        }

        for &row in rows.iter().rev() {
            self.items.remove(row);
        }

        if let Some(playing) = self.playing_row {
            if rows.binary_search(&playing).is_ok() {
                self.playing_row = None;
                self.emit(PlaylistEvent::PlayingRowChanged(None));
            } else {
                let shift = rows.iter().filter(|&&r| r < playing).count();
                self.playing_row = Some(playing - shift);
            }
        }

        self.content_changed();
    }

    pub fn clear(&mut self) {
        self.items.clear();

        if self.playing_row.take().is_some() {
            self.emit(PlaylistEvent::PlayingRowChanged(None));
        }

        self.content_changed();
    }

    /// Shuffles the rows. The playing item, if any, moves to the top so the
    /// rest of the playlist follows it.
    pub fn shuffle(&mut self) {
        if self.items.len() < 2 {
            return;
        }

        let mut rng = rng();

        match self.playing_row {
            Some(row) => {
                let playing = self.items.remove(row);
                self.items.shuffle(&mut rng);
                self.items.insert(0, playing);
                self.playing_row = Some(0);
            }
            None => self.items.shuffle(&mut rng),
        }

        self.content_changed();
    }

    pub fn playing_state(&self) -> PlayingState {
        self.playing_state
    }

    pub fn set_playing_state(&mut self, state: PlayingState) {
        self.playing_state = state;
    }

    pub fn playing_row(&self) -> Option<usize> {
        self.playing_row
    }

    /// Marks `row` as the one being played, or clears the marker.
    ///
    /// Rows out of range are ignored.
    pub fn set_playing_row(&mut self, row: Option<usize>) {
        if row.is_some_and(|r| r >= self.items.len()) || row == self.playing_row {
            return;
        }

        if let Some(old) = self.playing_row.and_then(|r| self.items.get_mut(r)) {
            old.clear_stream_metadata();
        }

        self.playing_row = row;
        self.emit(PlaylistEvent::PlayingRowChanged(row));

        if let Some(song) = row.and_then(|r| self.items.get(r)).map(|i| i.metadata().clone()) {
            self.emit(PlaylistEvent::CurrentSongChanged(song));
        }
    }

    /// Updates the live metadata of the playing stream.
    ///
    /// Ignored unless the playing item is a stream with the given url.
    pub fn set_stream_metadata(&mut self, url: &str, song: &Song) {
        let Some(item) = self.playing_row.and_then(|r| self.items.get_mut(r)) else {
            return;
        };

        if item.source() != ItemSource::Stream || item.url() != url {
            return;
        }

        item.set_stream_metadata(Song {
            filename: url.to_string(),
            ..song.clone()
        });

        let song = item.metadata().clone();
        self.emit(PlaylistEvent::CurrentSongChanged(song));
    }

    pub fn row_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all known item lengths, in seconds.
    pub fn total_duration(&self) -> u64 {
        self.items
            .iter()
            .map(|i| i.duration())
            .filter(|&d| d > 0)
            .map(|d| d as u64)
            .sum()
    }

    pub fn item(&self, row: usize) -> Option<&PlaylistItem> {
        self.items.get(row)
    }

    pub fn all_items(&self) -> &[PlaylistItem] {
        &self.items
    }

    pub fn all_songs(&self) -> Vec<Song> {
        self.items.iter().map(|i| i.metadata().clone()).collect()
    }

    /// Library items referencing the catalog song `id`.
    pub fn library_items_by_id(&mut self, id: SongId) -> impl Iterator<Item = &mut PlaylistItem> {
        self.items
            .iter_mut()
            .filter(move |item| item.library_id() == Some(id))
    }

    /// Replaces the song of a row after the user edited it.
    pub fn set_item_song(&mut self, row: usize, song: Song) {
        let Some(item) = self.items.get_mut(row) else {
            return;
        };

        item.set_song(song);

        self.content_changed();
        self.emit(PlaylistEvent::EditingFinished(row));
    }

    /// Asks whoever drives playback to start playing `row`.
    pub fn request_play(&self, row: usize) {
        if row < self.items.len() {
            self.emit(PlaylistEvent::PlayRequested(row));
        }
    }

    /// The row to play after the playing one, following the shared sequence.
    pub fn next_row(&self) -> Option<usize> {
        let count = self.items.len();
        if count == 0 {
            return None;
        }

        let repeat = self.sequence.repeat_mode();

        if let (Some(row), RepeatMode::Track) = (self.playing_row, repeat) {
            return Some(row);
        }

        if self.sequence.shuffle_mode() == ShuffleMode::All {
            let mut candidates: Vec<usize> =
                (0..count).filter(|&r| Some(r) != self.playing_row).collect();
            if candidates.is_empty() {
                return (repeat == RepeatMode::Playlist).then_some(self.playing_row).flatten();
            }
            candidates.shuffle(&mut rng());
            return candidates.first().copied();
        }

        match self.playing_row {
            None => Some(0),
            Some(row) if row + 1 < count => Some(row + 1),
            Some(_) => (repeat == RepeatMode::Playlist).then_some(0),
        }
    }

    /// The row to play before the playing one.
    pub fn previous_row(&self) -> Option<usize> {
        let count = self.items.len();
        let row = self.playing_row?;

        match self.sequence.repeat_mode() {
            RepeatMode::Track => Some(row),
            repeat if row == 0 => (repeat == RepeatMode::Playlist).then(|| count - 1),
            _ => Some(row - 1),
        }
    }

    /// Saves the current contents after items were refreshed in place.
    pub(crate) fn persist(&mut self) {
        self.content_changed();
    }

    fn content_changed(&mut self) {
        self.emit(PlaylistEvent::Changed);
        self.save();
    }

    fn save(&self) {
        if let Err(e) = self.store.set_playlist_items(self.id, &self.items) {
            warn!(id = self.id, "Failed to save playlist: {}", e);
            self.emit(PlaylistEvent::SaveFailed(e.to_string()));
        }
    }

    fn emit(&self, event: PlaylistEvent) {
        // The owner may already be gone during teardown.
        self.event_tx.send((self.id, event)).ok();
    }
}
