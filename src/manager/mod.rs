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

//! Coordination of every open playlist.
//!
//! The [`PlaylistManager`] owns all [`Playlist`]s keyed by their store id and
//! tracks two cursors:
//!
//! * the *current* playlist, which the user is looking at and editing;
//! * the *active* playlist, which playback is driven from.
//!
//! Both cursors always name an open playlist once [`PlaylistManager::init`]
//! has returned, and there is never less than one playlist open.
//!
//! Everything the manager and its playlists do is reported as a
//! [`ManagerEvent`] on the channel handed to `init`. Events raised by a
//! playlist are forwarded before the operation that caused them returns, so
//! listeners see them in the order they happened.

mod summary;

use std::{
    collections::BTreeMap,
    path::Path,
    rc::Rc,
    sync::mpsc::{self, Receiver, Sender},
};

use tracing::{debug, info, warn};

use crate::{
    catalog::{Catalog, CatalogEvent},
    db::PlaylistStore,
    error::{Error, Result},
    model::{PlayingState, PlaylistId, SelectionRange, Song},
    parser::PlaylistParser,
    playlist::{Playlist, PlaylistEvent, PlaylistEventSender, PlaylistSequence},
};

#[derive(Debug, Clone, PartialEq)]
pub enum ManagerEvent {
    PlaylistAdded { id: PlaylistId, name: String },
    PlaylistRemoved(PlaylistId),
    PlaylistRenamed { id: PlaylistId, name: String },
    CurrentChanged(PlaylistId),
    ActiveChanged(PlaylistId),
    /// Status line for the current playlist and selection.
    SummaryChanged(String),
    PlaylistChanged(PlaylistId),
    EditingFinished { id: PlaylistId, row: usize },
    LoadTracksStarted(PlaylistId),
    LoadTracksFinished(PlaylistId),
    LoadTracksError { id: PlaylistId, message: String },
    PlayRequested { id: PlaylistId, row: usize },
    CurrentSongChanged(Song),
    PlayingRowChanged { id: PlaylistId, row: Option<usize> },
    /// A recoverable failure the user should be told about.
    Error(String),
}

struct PlaylistEntry {
    name: String,
    playlist: Playlist,
}

pub struct PlaylistManager {
    store: Rc<dyn PlaylistStore>,
    sequence: Rc<PlaylistSequence>,
    parser: PlaylistParser,
    playlists: BTreeMap<PlaylistId, PlaylistEntry>,
    current: Option<PlaylistId>,
    active: Option<PlaylistId>,
    selection: Vec<SelectionRange>,
    event_tx: Sender<ManagerEvent>,
    playlist_tx: PlaylistEventSender,
    playlist_rx: Receiver<(PlaylistId, PlaylistEvent)>,
    catalog_rx: Receiver<CatalogEvent>,
}

impl PlaylistManager {
    /// Opens every playlist the store knows about.
    ///
    /// If the store has none, a playlist called `default_name` is created.
    /// The first playlist in store order becomes both current and active.
    ///
    /// # Errors
    ///
    /// Fails if the store cannot be read or the default playlist cannot be
    /// created.
    pub fn init(
        catalog: &mut Catalog,
        store: Rc<dyn PlaylistStore>,
        sequence: Rc<PlaylistSequence>,
        event_tx: Sender<ManagerEvent>,
        default_name: &str,
    ) -> Result<Self> {
        let (playlist_tx, playlist_rx) = mpsc::channel();

        let mut manager = Self {
            store,
            sequence,
            parser: PlaylistParser::default(),
            playlists: BTreeMap::new(),
            current: None,
            active: None,
            selection: vec![],
            event_tx,
            playlist_tx,
            playlist_rx,
            catalog_rx: catalog.subscribe(),
        };

        let stored = manager.store.get_all_playlists()?;

        for playlist in &stored {
            manager.register(playlist.id, &playlist.name)?;
        }

        if manager.playlists.is_empty() {
            manager.create(default_name, vec![])?;
        }

        info!(count = manager.playlists.len(), "Playlists opened");

        Ok(manager)
    }

    pub fn with_parser(mut self, parser: PlaylistParser) -> Self {
        self.parser = parser;
        self
    }

    /// Opens a playlist that already exists in the store.
    ///
    /// Its contents are restored and it becomes current and active if
    /// nothing else is yet.
    pub fn register(&mut self, id: PlaylistId, name: &str) -> Result<&mut Playlist> {
        if self.playlists.contains_key(&id) {
            warn!(id, "Playlist is already open");
            return self.playlist_mut(id);
        }

        let playlist = Playlist::new(
            id,
            self.store.clone(),
            self.sequence.clone(),
            self.playlist_tx.clone(),
        );

        self.playlists.insert(
            id,
            PlaylistEntry {
                name: name.to_string(),
                playlist,
            },
        );
        self.emit(ManagerEvent::PlaylistAdded {
            id,
            name: name.to_string(),
        });

        if let Some(entry) = self.playlists.get_mut(&id) {
            entry.playlist.restore();
        }
        self.dispatch_playlist_events();

        if self.current.is_none() {
            self.set_current(id)?;
        }
        if self.active.is_none() {
            self.set_active(id)?;
        }

        self.playlist_mut(id)
    }

    /// Creates a new playlist holding `songs` and makes it current.
    pub fn create(&mut self, name: &str, songs: Vec<Song>) -> Result<PlaylistId> {
        let id = self.store.create_playlist(name).map_err(|e| {
            warn!("Failed to create playlist {}: {}", name, e);
            Error::CreationFailed(name.to_string())
        })?;

        self.register(id, name)?.insert_songs(songs, None);
        self.dispatch_playlist_events();

        self.set_current(id)?;

        info!(id, name, "Created playlist");

        Ok(id)
    }

    pub fn rename(&mut self, id: PlaylistId, name: &str) -> Result<()> {
        self.ensure_open(id)?;
        self.store.rename_playlist(id, name)?;

        if let Some(entry) = self.playlists.get_mut(&id) {
            entry.name = name.to_string();
        }

        self.emit(ManagerEvent::PlaylistRenamed {
            id,
            name: name.to_string(),
        });

        Ok(())
    }

    /// Closes a playlist and deletes it from the store.
    ///
    /// The last remaining playlist is never removed. If the removed playlist
    /// was active or current, those cursors move to the open playlist with the
    /// lowest id first.
    pub fn remove(&mut self, id: PlaylistId) -> Result<()> {
        self.ensure_open(id)?;

        if self.playlists.len() <= 1 {
            debug!(id, "Not removing the last playlist");
            return Ok(());
        }

        self.store.remove_playlist(id)?;

        if let Some(next) = self.playlists.keys().copied().find(|&other| other != id) {
            if self.active == Some(id) {
                self.set_active(next)?;
            }
            if self.current == Some(id) {
                self.set_current(next)?;
            }
        }

        self.playlists.remove(&id);
        self.emit(ManagerEvent::PlaylistRemoved(id));

        info!(id, "Removed playlist");

        Ok(())
    }

    pub fn set_current(&mut self, id: PlaylistId) -> Result<()> {
        self.ensure_open(id)?;

        self.current = Some(id);
        self.emit(ManagerEvent::CurrentChanged(id));
        self.update_summary();

        Ok(())
    }

    /// Moves playback to another playlist.
    ///
    /// The previously active playlist loses its playing row first, so
    /// listeners see its `PlayingRowChanged` before `ActiveChanged`.
    pub fn set_active(&mut self, id: PlaylistId) -> Result<()> {
        self.ensure_open(id)?;

        if let Some(previous) = self.active.filter(|&active| active != id) {
            if let Some(entry) = self.playlists.get_mut(&previous) {
                entry.playlist.set_playing_row(None);
            }
            self.dispatch_playlist_events();
        }

        self.active = Some(id);
        self.emit(ManagerEvent::ActiveChanged(id));

        Ok(())
    }

    /// Records the user's preferred playlist order.
    pub fn reorder(&mut self, ids: &[PlaylistId]) -> Result<()> {
        self.store.set_playlist_order(ids)
    }

    /// Stores the selection of the current playlist's view and refreshes the
    /// summary.
    pub fn selection_changed(&mut self, selection: Vec<SelectionRange>) {
        self.selection = selection;
        self.update_summary();
    }

    pub fn update_summary(&mut self) {
        let Some(playlist) = self.current.and_then(|id| self.playlist(id).ok()) else {
            return;
        };

        let summary = summary::summary_text(playlist, &self.selection);
        self.emit(ManagerEvent::SummaryChanged(summary));
    }

    /// Refreshes every library item that refers to one of `songs`.
    ///
    /// Playlists with changed items are saved again so the fresh metadata
    /// survives a restart.
    pub fn songs_discovered(&mut self, songs: &[Song]) {
        let mut updated = 0;

        for entry in self.playlists.values_mut() {
            let mut changed = false;

            for song in songs {
                let Some(song_id) = song.id else {
                    continue;
                };

                for item in entry.playlist.library_items_by_id(song_id) {
                    let before = item.clone();
                    item.set_metadata(song);
                    if *item != before {
                        changed = true;
                        updated += 1;
                    }
                }
            }

            if changed {
                entry.playlist.persist();
            }
        }

        debug!(songs = songs.len(), updated, "Applied catalog updates");

        self.dispatch_playlist_events();
    }

    /// Handles everything queued by the catalog and the playlists.
    pub fn process_events(&mut self) {
        while let Ok(event) = self.catalog_rx.try_recv() {
            match event {
                CatalogEvent::SongsDiscovered(songs) => self.songs_discovered(&songs),
            }
        }

        self.dispatch_playlist_events();
    }

    pub fn clear_current(&mut self) {
        if let Some(playlist) = self.current_mut() {
            playlist.clear();
        }
        self.dispatch_playlist_events();
    }

    pub fn shuffle_current(&mut self) {
        if let Some(playlist) = self.current_mut() {
            playlist.shuffle();
        }
        self.dispatch_playlist_events();
    }

    pub fn set_active_playing(&mut self) {
        self.set_active_state(PlayingState::Playing);
    }

    pub fn set_active_paused(&mut self) {
        self.set_active_state(PlayingState::Paused);
    }

    pub fn set_active_stopped(&mut self) {
        self.set_active_state(PlayingState::Stopped);
    }

    pub fn set_active_stream_metadata(&mut self, url: &str, song: &Song) {
        if let Some(playlist) = self.active_mut() {
            playlist.set_stream_metadata(url, song);
        }
        self.dispatch_playlist_events();
    }

    /// Imports a playlist file as a new playlist named after the file.
    ///
    /// A file that cannot be read or has no entries is reported with an
    /// [`ManagerEvent::Error`] and `Ok(None)` is returned.
    pub fn load_from_file(&mut self, path: &Path) -> Result<Option<PlaylistId>> {
        let songs = self.parser.load(path).unwrap_or_else(|e| {
            warn!(path = %path.display(), "Failed to load playlist: {}", e);
            vec![]
        });

        if songs.is_empty() {
            let name = path.file_stem().unwrap_or_default().to_string_lossy();
            self.emit(ManagerEvent::Error(format!(
                "The playlist '{}' was empty or could not be loaded.",
                name
            )));
            return Ok(None);
        }

        let id = self.create(&base_name(path), songs)?;

        Ok(Some(id))
    }

    /// Exports a playlist. Write failures are reported as an
    /// [`ManagerEvent::Error`] rather than returned.
    pub fn save_to_file(&mut self, id: PlaylistId, path: &Path) -> Result<()> {
        let songs = self.playlist(id)?.all_songs();

        match self.parser.save(&songs, path) {
            Ok(()) => info!(id, path = %path.display(), "Saved playlist"),
            Err(e) => {
                warn!(id, path = %path.display(), "Failed to save playlist: {}", e);
                self.emit(ManagerEvent::Error(format!(
                    "Failed to save playlist to {}: {}",
                    path.display(),
                    e
                )));
            }
        }

        Ok(())
    }

    pub fn current(&self) -> Option<&Playlist> {
        self.current.and_then(|id| self.playlist(id).ok())
    }

    pub fn current_id(&self) -> Option<PlaylistId> {
        self.current
    }

    pub fn active(&self) -> Option<&Playlist> {
        self.active.and_then(|id| self.playlist(id).ok())
    }

    pub fn active_id(&self) -> Option<PlaylistId> {
        self.active
    }

    pub fn playlist(&self, id: PlaylistId) -> Result<&Playlist> {
        self.playlists
            .get(&id)
            .map(|entry| &entry.playlist)
            .ok_or(Error::UnknownPlaylist(id))
    }

    pub fn playlist_mut(&mut self, id: PlaylistId) -> Result<&mut Playlist> {
        self.playlists
            .get_mut(&id)
            .map(|entry| &mut entry.playlist)
            .ok_or(Error::UnknownPlaylist(id))
    }

    pub fn name(&self, id: PlaylistId) -> Option<&str> {
        self.playlists.get(&id).map(|entry| entry.name.as_str())
    }

    /// Ids of all open playlists, lowest first.
    pub fn ids(&self) -> Vec<PlaylistId> {
        self.playlists.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.playlists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.playlists.is_empty()
    }

    pub fn selection(&self) -> &[SelectionRange] {
        &self.selection
    }

    pub fn sequence(&self) -> &PlaylistSequence {
        &self.sequence
    }

    fn current_mut(&mut self) -> Option<&mut Playlist> {
        self.current.and_then(|id| self.playlist_mut(id).ok())
    }

    fn active_mut(&mut self) -> Option<&mut Playlist> {
        self.active.and_then(|id| self.playlist_mut(id).ok())
    }

    fn set_active_state(&mut self, state: PlayingState) {
        if let Some(playlist) = self.active_mut() {
            playlist.set_playing_state(state);
        }
    }

    fn ensure_open(&self, id: PlaylistId) -> Result<()> {
        if self.playlists.contains_key(&id) {
            Ok(())
        } else {
            Err(Error::UnknownPlaylist(id))
        }
    }

    fn dispatch_playlist_events(&mut self) {
        while let Ok((id, event)) = self.playlist_rx.try_recv() {
            match event {
                PlaylistEvent::Changed => {
                    self.emit(ManagerEvent::PlaylistChanged(id));
                    self.update_summary();
                }
                PlaylistEvent::CurrentSongChanged(song) => {
                    self.emit(ManagerEvent::CurrentSongChanged(song))
                }
                PlaylistEvent::PlayingRowChanged(row) => {
                    self.emit(ManagerEvent::PlayingRowChanged { id, row })
                }
                PlaylistEvent::EditingFinished(row) => {
                    self.emit(ManagerEvent::EditingFinished { id, row })
                }
                PlaylistEvent::LoadTracksStarted => self.emit(ManagerEvent::LoadTracksStarted(id)),
                PlaylistEvent::LoadTracksFinished => {
                    self.emit(ManagerEvent::LoadTracksFinished(id))
                }
                PlaylistEvent::LoadTracksError(message) => {
                    self.emit(ManagerEvent::LoadTracksError {
                        id,
                        message: message.clone(),
                    });
                    self.emit(ManagerEvent::Error(message));
                }
                PlaylistEvent::PlayRequested(row) => {
                    self.emit(ManagerEvent::PlayRequested { id, row })
                }
                PlaylistEvent::SaveFailed(message) => self.emit(ManagerEvent::Error(format!(
                    "Failed to save playlist: {}",
                    message
                ))),
            }
        }
    }

    fn emit(&self, event: ManagerEvent) {
        self.event_tx.send(event).ok();
    }
}

/// File name up to its first dot, so `party.mix.m3u` names a playlist `party`.
fn base_name(path: &Path) -> String {
    let file_name = path.file_name().unwrap_or_default().to_string_lossy();

    match file_name.split_once('.') {
        Some((base, _)) => base.to_string(),
        None => file_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::{
        db::{MockPlaylistStore, SqlitePlaylistStore, StoredPlaylist, init_memory_db},
        parser::m3u::M3uFormat,
    };

    struct Fixture {
        manager: PlaylistManager,
        catalog: Catalog,
        events: Receiver<ManagerEvent>,
    }

    impl Fixture {
        fn drain(&self) -> Vec<ManagerEvent> {
            self.events.try_iter().collect()
        }
    }

    fn setup_with_store(store: Rc<dyn PlaylistStore>) -> Fixture {
        let mut catalog = Catalog::new(init_memory_db().unwrap());
        let (tx, events) = mpsc::channel();
        let manager = PlaylistManager::init(
            &mut catalog,
            store,
            Rc::new(PlaylistSequence::default()),
            tx,
            "Playlist",
        )
        .unwrap();

        Fixture {
            manager,
            catalog,
            events,
        }
    }

    fn setup() -> Fixture {
        setup_with_store(Rc::new(SqlitePlaylistStore::new(init_memory_db().unwrap())))
    }

    fn song(title: &str, duration: i64) -> Song {
        Song {
            title: title.to_string(),
            duration,
            filename: format!("/music/{}.mp3", title),
            ..Song::default()
        }
    }

    fn library_song(id: i64, title: &str) -> Song {
        Song {
            id: Some(id),
            ..song(title, 100)
        }
    }

    #[test]
    fn test_init_creates_default_playlist() {
        let fixture = setup();
        let manager = &fixture.manager;

        assert_eq!(manager.len(), 1);
        let id = manager.ids()[0];
        assert_eq!(manager.name(id), Some("Playlist"));
        assert_eq!(manager.current_id(), Some(id));
        assert_eq!(manager.active_id(), Some(id));
    }

    #[test]
    fn test_init_restores_stored_playlists() {
        let store = Rc::new(SqlitePlaylistStore::new(init_memory_db().unwrap()));
        let first = store.create_playlist("First").unwrap();
        let second = store.create_playlist("Second").unwrap();
        store.set_playlist_order(&[second, first]).unwrap();

        let fixture = setup_with_store(store);
        let manager = &fixture.manager;

        assert_eq!(manager.len(), 2);
        assert_eq!(manager.current_id(), Some(second));
        assert_eq!(manager.active_id(), Some(second));
        assert_eq!(manager.name(first), Some("First"));
    }

    #[test]
    fn test_create_makes_playlist_current() {
        let mut fixture = setup();
        let first = fixture.manager.current_id().unwrap();
        fixture.drain();

        let id = fixture
            .manager
            .create("Road trip", vec![song("a", 10), song("b", 20)])
            .unwrap();

        assert_ne!(id, first);
        assert_eq!(fixture.manager.current_id(), Some(id));
        assert_eq!(fixture.manager.active_id(), Some(first));
        assert_eq!(fixture.manager.playlist(id).unwrap().row_count(), 2);

        let events = fixture.drain();
        assert_eq!(
            events.first(),
            Some(&ManagerEvent::PlaylistAdded {
                id,
                name: "Road trip".to_string()
            })
        );
        assert!(events.contains(&ManagerEvent::CurrentChanged(id)));
        assert_eq!(
            events.last(),
            Some(&ManagerEvent::SummaryChanged("2 tracks - [ 0:30 ]".to_string()))
        );
    }

    #[test]
    fn test_create_failure() {
        let mut store = MockPlaylistStore::new();
        store.expect_get_all_playlists().returning(|| {
            Ok(vec![StoredPlaylist {
                id: 1,
                name: "Existing".to_string(),
            }])
        });
        store.expect_get_playlist_items().returning(|_| Ok(vec![]));
        store
            .expect_create_playlist()
            .returning(|_| Err(Error::Malformed("store is read only".to_string())));

        let mut fixture = setup_with_store(Rc::new(store));

        assert!(matches!(
            fixture.manager.create("New", vec![]),
            Err(Error::CreationFailed(name)) if name == "New"
        ));
        assert_eq!(fixture.manager.len(), 1);
    }

    #[test]
    fn test_rename() {
        let mut fixture = setup();
        let id = fixture.manager.current_id().unwrap();
        fixture.drain();

        fixture.manager.rename(id, "Favourites").unwrap();

        assert_eq!(fixture.manager.name(id), Some("Favourites"));
        assert_eq!(
            fixture.drain(),
            vec![ManagerEvent::PlaylistRenamed {
                id,
                name: "Favourites".to_string()
            }]
        );
    }

    #[test]
    fn test_unknown_playlist() {
        let mut fixture = setup();

        assert!(matches!(fixture.manager.rename(99, "x"), Err(Error::UnknownPlaylist(99))));
        assert!(matches!(fixture.manager.remove(99), Err(Error::UnknownPlaylist(99))));
        assert!(matches!(fixture.manager.set_current(99), Err(Error::UnknownPlaylist(99))));
        assert!(matches!(fixture.manager.set_active(99), Err(Error::UnknownPlaylist(99))));
        assert!(matches!(
            fixture.manager.save_to_file(99, Path::new("/tmp/x.m3u")),
            Err(Error::UnknownPlaylist(99))
        ));
    }

    #[test]
    fn test_remove_last_playlist_is_ignored() {
        let mut fixture = setup();
        let id = fixture.manager.current_id().unwrap();
        fixture.drain();

        fixture.manager.remove(id).unwrap();

        assert_eq!(fixture.manager.len(), 1);
        assert!(fixture.drain().is_empty());
    }

    #[test]
    fn test_remove_current_and_active_moves_cursors() {
        let mut fixture = setup();
        let first = fixture.manager.current_id().unwrap();
        let second = fixture.manager.create("Second", vec![]).unwrap();
        let third = fixture.manager.create("Third", vec![]).unwrap();
        fixture.manager.set_active(third).unwrap();
        fixture.drain();

        fixture.manager.remove(third).unwrap();

        assert_eq!(fixture.manager.ids(), vec![first, second]);
        assert_eq!(fixture.manager.current_id(), Some(first));
        assert_eq!(fixture.manager.active_id(), Some(first));

        let events = fixture.drain();
        assert!(events.contains(&ManagerEvent::ActiveChanged(first)));
        assert!(events.contains(&ManagerEvent::CurrentChanged(first)));
        assert_eq!(events.last(), Some(&ManagerEvent::PlaylistRemoved(third)));
    }

    #[test]
    fn test_remove_other_playlist_keeps_cursors() {
        let mut fixture = setup();
        let first = fixture.manager.current_id().unwrap();
        let second = fixture.manager.create("Second", vec![]).unwrap();
        fixture.manager.set_current(first).unwrap();
        fixture.drain();

        fixture.manager.remove(second).unwrap();

        assert_eq!(fixture.manager.current_id(), Some(first));
        assert_eq!(fixture.manager.active_id(), Some(first));
        assert_eq!(fixture.drain(), vec![ManagerEvent::PlaylistRemoved(second)]);
    }

    #[test]
    fn test_set_active_clears_previous_playing_row() {
        let mut fixture = setup();
        let first = fixture.manager.current_id().unwrap();
        fixture
            .manager
            .playlist_mut(first)
            .unwrap()
            .insert_songs(vec![song("a", 1), song("b", 1)], None);
        fixture.manager.playlist_mut(first).unwrap().set_playing_row(Some(1));
        let second = fixture.manager.create("Second", vec![]).unwrap();
        fixture.drain();

        fixture.manager.set_active(second).unwrap();

        assert_eq!(fixture.manager.playlist(first).unwrap().playing_row(), None);
        assert_eq!(
            fixture.drain(),
            vec![
                ManagerEvent::PlayingRowChanged {
                    id: first,
                    row: None
                },
                ManagerEvent::ActiveChanged(second),
            ]
        );
    }

    #[test]
    fn test_selection_drives_summary() {
        let mut fixture = setup();
        fixture.manager.create(
            "Five",
            vec![song("a", 30), song("b", 35), song("c", 40), song("d", 40), song("e", 40)],
        )
        .unwrap();
        fixture.drain();

        fixture.manager.selection_changed(vec![SelectionRange::new(0, 2)]);

        assert_eq!(
            fixture.drain(),
            vec![ManagerEvent::SummaryChanged(
                "3 selected of 5 tracks - [ 1:45 ]".to_string()
            )]
        );
        assert_eq!(fixture.manager.selection(), &[SelectionRange::new(0, 2)]);
    }

    #[test]
    fn test_clear_and_shuffle_current() {
        let mut fixture = setup();
        let id = fixture
            .manager
            .create("Mix", vec![song("a", 1), song("b", 1), song("c", 1)])
            .unwrap();
        fixture.drain();

        fixture.manager.shuffle_current();
        assert_eq!(fixture.manager.playlist(id).unwrap().row_count(), 3);
        assert!(fixture.drain().contains(&ManagerEvent::PlaylistChanged(id)));

        fixture.manager.clear_current();
        assert!(fixture.manager.playlist(id).unwrap().is_empty());
        assert_eq!(
            fixture.drain(),
            vec![
                ManagerEvent::PlaylistChanged(id),
                ManagerEvent::SummaryChanged("0 tracks".to_string()),
            ]
        );
    }

    #[test]
    fn test_playing_state_follows_active() {
        let mut fixture = setup();
        let active = fixture.manager.active_id().unwrap();
        let other = fixture.manager.create("Other", vec![]).unwrap();

        fixture.manager.set_active_playing();
        assert_eq!(fixture.manager.active().unwrap().playing_state(), PlayingState::Playing);
        assert_eq!(fixture.manager.playlist(other).unwrap().playing_state(), PlayingState::Stopped);

        fixture.manager.set_active_paused();
        assert_eq!(fixture.manager.playlist(active).unwrap().playing_state(), PlayingState::Paused);

        fixture.manager.set_active_stopped();
        assert_eq!(fixture.manager.playlist(active).unwrap().playing_state(), PlayingState::Stopped);
    }

    #[test]
    fn test_stream_metadata_reaches_listeners() {
        let mut fixture = setup();
        let id = fixture.manager.active_id().unwrap();
        let url = "http://radio.example/live";
        fixture
            .manager
            .playlist_mut(id)
            .unwrap()
            .insert_songs(vec![Song::from_file(url)], None);
        fixture.manager.playlist_mut(id).unwrap().set_playing_row(Some(0));
        fixture.manager.process_events();
        fixture.drain();

        let now_playing = Song {
            title: "Now Playing".to_string(),
            ..Song::default()
        };
        fixture.manager.set_active_stream_metadata(url, &now_playing);

        match fixture.drain().as_slice() {
            [ManagerEvent::CurrentSongChanged(song)] => {
                assert_eq!(song.title, "Now Playing");
                assert_eq!(song.filename, url);
            }
            other => panic!("unexpected events {:?}", other),
        }
    }

    #[test]
    fn test_catalog_updates_library_items() {
        let mut fixture = setup();
        let id = fixture
            .manager
            .create("Library", vec![library_song(7, "old"), song("file", 5)])
            .unwrap();

        let renamed = library_song(7, "new");
        fixture.catalog.publish(vec![renamed.clone()]);
        fixture.manager.process_events();

        let playlist = fixture.manager.playlist(id).unwrap();
        assert_eq!(playlist.item(0).unwrap().metadata(), &renamed);
        assert_eq!(playlist.item(1).unwrap().metadata().title, "file");

        fixture.catalog.publish(vec![renamed.clone()]);
        fixture.manager.process_events();
        assert_eq!(
            fixture.manager.playlist(id).unwrap().item(0).unwrap().metadata(),
            &renamed
        );
    }

    #[test]
    fn test_catalog_updates_are_saved() {
        let store = Rc::new(SqlitePlaylistStore::new(init_memory_db().unwrap()));
        let mut fixture = setup_with_store(store.clone());
        let id = fixture
            .manager
            .create("Library", vec![library_song(7, "old")])
            .unwrap();
        fixture.drain();

        fixture.catalog.publish(vec![library_song(7, "new")]);
        fixture.manager.process_events();

        let stored = store.get_playlist_items(id).unwrap();
        assert_eq!(stored[0].metadata().title, "new");
        assert!(fixture.drain().contains(&ManagerEvent::PlaylistChanged(id)));

        fixture.catalog.publish(vec![library_song(7, "new")]);
        fixture.manager.process_events();
        assert!(fixture.drain().is_empty());
    }

    #[test]
    fn test_change_in_other_playlist_refreshes_summary() {
        let mut fixture = setup();
        let first = fixture.manager.current_id().unwrap();
        fixture.manager.create("Second", vec![song("x", 60)]).unwrap();
        fixture.drain();

        fixture
            .manager
            .playlist_mut(first)
            .unwrap()
            .insert_songs(vec![song("a", 10)], None);
        fixture.manager.process_events();

        assert_eq!(
            fixture.drain(),
            vec![
                ManagerEvent::PlaylistChanged(first),
                ManagerEvent::SummaryChanged("1 track - [ 1:00 ]".to_string()),
            ]
        );
    }

    #[test]
    fn test_play_request_is_forwarded() {
        let mut fixture = setup();
        let id = fixture
            .manager
            .create("Queue", vec![song("a", 1), song("b", 1)])
            .unwrap();
        fixture.drain();

        fixture.manager.playlist_mut(id).unwrap().request_play(1);
        fixture.manager.process_events();

        assert_eq!(fixture.drain(), vec![ManagerEvent::PlayRequested { id, row: 1 }]);
    }

    #[test]
    fn test_edit_is_forwarded() {
        let mut fixture = setup();
        let id = fixture
            .manager
            .create("Edits", vec![song("a", 30), song("b", 30)])
            .unwrap();
        fixture.drain();

        fixture.manager.playlist_mut(id).unwrap().set_item_song(1, song("c", 45));
        fixture.manager.process_events();

        assert_eq!(
            fixture.drain(),
            vec![
                ManagerEvent::PlaylistChanged(id),
                ManagerEvent::SummaryChanged("2 tracks - [ 1:15 ]".to_string()),
                ManagerEvent::EditingFinished { id, row: 1 },
            ]
        );
    }

    #[test]
    fn test_injected_parser_limits_formats() {
        let fixture = setup();
        let mut manager = fixture
            .manager
            .with_parser(PlaylistParser::new(vec![Box::new(M3uFormat)]));
        let id = manager.current_id().unwrap();
        fixture.events.try_iter().for_each(drop);

        manager.save_to_file(id, Path::new("/tmp/list.pls")).unwrap();

        match fixture.events.try_iter().collect::<Vec<_>>().as_slice() {
            [ManagerEvent::Error(message)] => assert!(message.contains("Unsupported playlist format: pls")),
            other => panic!("unexpected events {:?}", other),
        }
    }

    #[test]
    fn test_load_empty_file_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("party.mix.m3u");
        fs::write(&path, "#EXTM3U\n").unwrap();

        let mut fixture = setup();
        fixture.drain();

        assert_eq!(fixture.manager.load_from_file(&path).unwrap(), None);
        assert_eq!(fixture.manager.len(), 1);
        assert_eq!(
            fixture.drain(),
            vec![ManagerEvent::Error(
                "The playlist 'party.mix' was empty or could not be loaded.".to_string()
            )]
        );
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("party.mix.pls");

        let mut fixture = setup();
        let id = fixture
            .manager
            .create("Party", vec![song("a", 10), song("b", 20), song("c", 30)])
            .unwrap();
        fixture.manager.save_to_file(id, &path).unwrap();

        let loaded = fixture.manager.load_from_file(&path).unwrap().unwrap();

        assert_eq!(fixture.manager.name(loaded), Some("party"));
        assert_eq!(fixture.manager.current_id(), Some(loaded));
        let titles: Vec<String> = fixture
            .manager
            .playlist(loaded)
            .unwrap()
            .all_songs()
            .into_iter()
            .map(|s| s.title)
            .collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_save_failure_reports_error() {
        let mut fixture = setup();
        let id = fixture.manager.current_id().unwrap();
        fixture.drain();

        fixture
            .manager
            .save_to_file(id, Path::new("/no/such/dir/list.m3u"))
            .unwrap();

        assert!(matches!(fixture.drain().as_slice(), [ManagerEvent::Error(_)]));
    }

    #[test]
    fn test_store_write_failure_reports_error() {
        let mut store = MockPlaylistStore::new();
        store.expect_get_all_playlists().returning(|| {
            Ok(vec![StoredPlaylist {
                id: 3,
                name: "Broken".to_string(),
            }])
        });
        store.expect_get_playlist_items().returning(|_| Ok(vec![]));
        store
            .expect_set_playlist_items()
            .returning(|_, _| Err(Error::Malformed("disk full".to_string())));

        let mut fixture = setup_with_store(Rc::new(store));
        fixture.drain();

        fixture
            .manager
            .playlist_mut(3)
            .unwrap()
            .insert_songs(vec![song("a", 1)], None);
        fixture.manager.process_events();

        assert!(
            fixture
                .drain()
                .contains(&ManagerEvent::Error("Failed to save playlist: Malformed playlist: disk full".to_string()))
        );
    }

    #[test]
    fn test_restore_failure_reports_error() {
        let mut store = MockPlaylistStore::new();
        store.expect_get_all_playlists().returning(|| {
            Ok(vec![StoredPlaylist {
                id: 4,
                name: "Unreadable".to_string(),
            }])
        });
        store
            .expect_get_playlist_items()
            .returning(|_| Err(Error::Malformed("bad row".to_string())));

        let fixture = setup_with_store(Rc::new(store));

        let events = fixture.drain();
        assert!(events.contains(&ManagerEvent::LoadTracksStarted(4)));
        assert!(events.iter().any(|e| matches!(e, ManagerEvent::LoadTracksError { id: 4, .. })));
        assert!(events.iter().any(|e| matches!(e, ManagerEvent::Error(_))));
        assert_eq!(fixture.manager.current_id(), Some(4));
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name(Path::new("/lists/party.mix.m3u")), "party");
        assert_eq!(base_name(Path::new("plain")), "plain");
    }
}
