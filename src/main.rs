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

//! # Playlist manager command line.
//!
//! Opens the playlist store named in the configuration, runs one command
//! against it and prints every notification the command produced.

use std::{
    path::PathBuf,
    rc::Rc,
    sync::mpsc::{self, Receiver},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use tracing::debug;

use chooui_playlists::{
    ManagerEvent, PlaylistManager,
    catalog::Catalog,
    config::{self, AppConfig},
    db::{self, SqlitePlaylistStore},
    logging,
    model::{PlaylistId, Song, SongId},
    parser::PlaylistParser,
    playlist::PlaylistSequence,
    util::format::format_time,
};

#[derive(Parser, Debug)]
#[command(name = "chooui-playlists")]
#[command(about = "Manage several playlists backed by a music catalog")]
#[command(version)]
struct Cli {
    /// Database file, instead of the one in the configuration
    #[arg(long, global = true)]
    database: Option<String>,

    /// Use a throwaway in-memory database
    #[arg(long, global = true, conflicts_with = "database")]
    in_memory: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every playlist
    List,
    /// Create an empty playlist
    New { name: String },
    Rename { id: PlaylistId, name: String },
    Remove { id: PlaylistId },
    /// Append files, or catalog songs by id, to a playlist
    Add {
        id: PlaylistId,
        files: Vec<String>,
        #[arg(long = "song")]
        songs: Vec<SongId>,
    },
    /// Import an M3U or PLS file as a new playlist
    Import { file: PathBuf },
    /// Export a playlist to an M3U or PLS file
    Export { id: PlaylistId, file: PathBuf },
    /// Show the tracks of a playlist
    Show { id: PlaylistId },
    Shuffle { id: PlaylistId },
    Clear { id: PlaylistId },
    /// List the playlist file extensions understood by import and export
    Formats,
    /// Rescan the configured media directories
    Scan,
    /// Print the summary line of the current playlist
    Summary,
}

/// The entry point of the application.
///
/// Loads the configuration, opens the store and catalog, runs the requested
/// command and returns an error if any part of the execution fails.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load_config();

    logging::init_logging(&config.log_filter);

    let (catalog_conn, store_conn) = open_databases(&cli, &config)?;

    let mut catalog = Catalog::new(catalog_conn);
    let store = Rc::new(SqlitePlaylistStore::new(store_conn));
    let sequence = Rc::new(PlaylistSequence::new(config.repeat_mode, config.shuffle_mode));

    let (event_tx, event_rx) = mpsc::channel();

    let mut manager = PlaylistManager::init(
        &mut catalog,
        store,
        sequence,
        event_tx,
        &config.default_playlist_name,
    )
    .context("Failed to initialise playlists")?;

    // Start-up notifications are not interesting on the command line
    event_rx.try_iter().for_each(drop);

    let res = run(cli.command, &mut manager, &mut catalog, &config);
    manager.process_events();
    print_events(&event_rx);

    res.context("Command failed")
}

/// Opens one connection for the catalog and one for the playlist store.
fn open_databases(cli: &Cli, config: &AppConfig) -> Result<(Connection, Connection)> {
    if cli.in_memory {
        return Ok((db::init_memory_db()?, db::init_memory_db()?));
    }

    let path = cli.database.as_deref().unwrap_or(&config.database_file);
    debug!(path, "Opening database");

    Ok((db::init_db(path)?, db::init_db(path)?))
}

fn run(
    command: Command,
    manager: &mut PlaylistManager,
    catalog: &mut Catalog,
    config: &AppConfig,
) -> Result<()> {
    match command {
        Command::List => {
            for id in manager.ids() {
                let marker = match (manager.current_id() == Some(id), manager.active_id() == Some(id)) {
                    (true, true) => "*>",
                    (true, false) => "* ",
                    (false, true) => " >",
                    (false, false) => "  ",
                };
                let tracks = manager.playlist(id)?.row_count();
                println!("{} {:>4}  {}  ({} tracks)", marker, id, manager.name(id).unwrap_or_default(), tracks);
            }
        }
        Command::New { name } => {
            let id = manager.create(&name, vec![])?;
            println!("Created playlist {}", id);
        }
        Command::Rename { id, name } => manager.rename(id, &name)?,
        Command::Remove { id } => manager.remove(id)?,
        Command::Add { id, files, songs } => {
            let mut resolved = catalog.resolve(files.into_iter().map(Song::from_file).collect())?;
            for song_id in songs {
                let song = catalog
                    .song(song_id)?
                    .with_context(|| format!("No song with id {} in the catalog", song_id))?;
                resolved.push(song);
            }
            manager.playlist_mut(id)?.insert_songs(resolved, None);
        }
        Command::Import { file } => {
            if let Some(id) = manager.load_from_file(&file)? {
                println!("Imported playlist {}", id);
            }
        }
        Command::Export { id, file } => manager.save_to_file(id, &file)?,
        Command::Show { id } => {
            let playlist = manager.playlist(id)?;
            for (row, item) in playlist.all_items().iter().enumerate() {
                let song = item.metadata();
                let marker = if playlist.playing_row() == Some(row) { ">" } else { " " };
                let length = if song.duration > 0 {
                    format_time(song.duration as u64)
                } else {
                    "--:--".to_string()
                };
                println!("{}{:>4}  {}  {}  {}", marker, row + 1, length, song.artist, song.display_title());
            }
        }
        Command::Shuffle { id } => {
            manager.set_current(id)?;
            manager.shuffle_current();
        }
        Command::Clear { id } => {
            manager.set_current(id)?;
            manager.clear_current();
        }
        Command::Formats => {
            for extension in PlaylistParser::default().file_extensions() {
                println!("{}", extension);
            }
        }
        Command::Scan => {
            let count = catalog
                .rescan(&config.media_dirs)
                .context("Failed to scan media directories")?;
            println!("Scanned {} songs", count);
        }
        Command::Summary => manager.update_summary(),
    }

    Ok(())
}

fn print_events(event_rx: &Receiver<ManagerEvent>) {
    for event in event_rx.try_iter() {
        match event {
            ManagerEvent::SummaryChanged(summary) => println!("{}", summary),
            ManagerEvent::Error(message) => eprintln!("{}", message),
            ManagerEvent::PlaylistRenamed { id, name } => println!("Renamed playlist {} to '{}'", id, name),
            ManagerEvent::PlaylistRemoved(id) => println!("Removed playlist {}", id),
            other => debug!(?other, "Event"),
        }
    }
}
