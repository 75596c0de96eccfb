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

//! Playlist file import and export.
//!
//! [`PlaylistParser`] picks a [`PlaylistFormat`] from the file extension and
//! converts between playlist files and [`Song`] lists.
//!
//! # Formats
//!
//! * [`m3u::M3uFormat`] (`.m3u`, `.m3u8`) keeps the path, length, artist and
//!   title of every entry.
//! * [`pls::PlsFormat`] (`.pls`) keeps the path, length and title.
//!
//! Neither format records the album, track number or catalog id, so those are
//! lost on a save/load round trip. M3U joins artist and title with `" - "`, so
//! a title containing `" - "` with no artist reads back split into both.
//!
//! Paths below the playlist's own directory are written relative to it and
//! resolved against it again on load, unless the relative form would start
//! with `#`.

pub mod m3u;
pub mod pls;

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    db::scan,
    error::{Error, Result},
    model::Song,
};

pub trait PlaylistFormat {
    fn name(&self) -> &'static str;

    /// Lower case extensions, without the dot.
    fn file_extensions(&self) -> &'static [&'static str];

    /// Reads songs, resolving relative entries against `dir`.
    fn load(&self, reader: &mut dyn BufRead, dir: &Path) -> Result<Vec<Song>>;

    /// Writes songs, making entries below `dir` relative to it.
    fn save(&self, songs: &[Song], writer: &mut dyn Write, dir: &Path) -> Result<()>;
}

pub struct PlaylistParser {
    formats: Vec<Box<dyn PlaylistFormat>>,
}

impl Default for PlaylistParser {
    fn default() -> Self {
        Self {
            formats: vec![Box::new(m3u::M3uFormat), Box::new(pls::PlsFormat)],
        }
    }
}

impl PlaylistParser {
    pub fn new(formats: Vec<Box<dyn PlaylistFormat>>) -> Self {
        Self { formats }
    }

    pub fn format_for(&self, path: &Path) -> Result<&dyn PlaylistFormat> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        self.formats
            .iter()
            .find(|f| f.file_extensions().contains(&extension.as_str()))
            .map(|f| f.as_ref())
            .ok_or(Error::UnsupportedFormat(extension))
    }

    /// Every extension that [`PlaylistParser::load`] understands.
    pub fn file_extensions(&self) -> Vec<&'static str> {
        self.formats
            .iter()
            .flat_map(|f| f.file_extensions().iter().copied())
            .collect()
    }

    /// Loads a playlist file.
    ///
    /// Local entries without a known length are completed from their tags
    /// when the file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the format is not supported, the file cannot be
    /// read, or its contents are malformed.
    pub fn load(&self, path: &Path) -> Result<Vec<Song>> {
        let format = self.format_for(path)?;
        let mut reader = BufReader::new(File::open(path)?);

        let songs = format.load(&mut reader, parent_dir(path))?;
        debug!(path = %path.display(), format = format.name(), count = songs.len(), "Loaded playlist file");

        Ok(songs.into_iter().map(complete_from_tags).collect())
    }

    /// Writes `songs` to `path` in the format matching its extension.
    pub fn save(&self, songs: &[Song], path: &Path) -> Result<()> {
        let format = self.format_for(path)?;
        let mut writer = BufWriter::new(File::create(path)?);

        format.save(songs, &mut writer, parent_dir(path))?;
        writer.flush()?;

        debug!(path = %path.display(), format = format.name(), count = songs.len(), "Saved playlist file");

        Ok(())
    }
}

fn parent_dir(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new("."))
}

fn complete_from_tags(song: Song) -> Song {
    if song.duration > 0 || song.is_stream() {
        return song;
    }

    match scan::read_song(Path::new(&song.filename)) {
        Ok(tagged) => Song {
            title: if song.title.is_empty() { tagged.title } else { song.title },
            artist: if song.artist.is_empty() { tagged.artist } else { song.artist },
            album: tagged.album,
            track_number: tagged.track_number,
            duration: tagged.duration,
            ..song
        },
        Err(_) => song,
    }
}

/// Turns a playlist entry into a file name, joining relative paths to `dir`.
pub(crate) fn resolve_entry(entry: &str, dir: &Path) -> String {
    if entry.contains("://") {
        return entry.to_string();
    }

    let path = Path::new(entry);
    if path.is_absolute() {
        entry.to_string()
    } else {
        dir.join(path).to_string_lossy().to_string()
    }
}

/// Inverse of [`resolve_entry`]: files below `dir` are written relative.
pub(crate) fn entry_for(filename: &str, dir: &Path) -> String {
    if filename.contains("://") || dir.as_os_str().is_empty() {
        return filename.to_string();
    }

    match PathBuf::from(filename).strip_prefix(dir) {
        // A leading '#' would read back as a comment
        Ok(relative) if !relative.to_string_lossy().starts_with('#') => {
            relative.to_string_lossy().to_string()
        }
        _ => filename.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_for_extension() {
        let parser = PlaylistParser::default();
        assert_eq!(parser.format_for(Path::new("a.m3u")).unwrap().name(), "M3U");
        assert_eq!(parser.format_for(Path::new("a.M3U8")).unwrap().name(), "M3U");
        assert_eq!(parser.format_for(Path::new("a.pls")).unwrap().name(), "PLS");
        assert!(matches!(
            parser.format_for(Path::new("a.xspf")),
            Err(Error::UnsupportedFormat(ext)) if ext == "xspf"
        ));
    }

    #[test]
    fn test_entry_paths_round_trip() {
        let dir = Path::new("/music/lists");
        assert_eq!(resolve_entry("a/b.mp3", dir), "/music/lists/a/b.mp3");
        assert_eq!(resolve_entry("/abs/c.mp3", dir), "/abs/c.mp3");
        assert_eq!(resolve_entry("http://radio/live", dir), "http://radio/live");

        assert_eq!(entry_for("/music/lists/a/b.mp3", dir), "a/b.mp3");
        assert_eq!(entry_for("/abs/c.mp3", dir), "/abs/c.mp3");
        assert_eq!(entry_for("http://radio/live", dir), "http://radio/live");
        assert_eq!(entry_for("/music/lists/#1 hit.mp3", dir), "/music/lists/#1 hit.mp3");
    }

    #[test]
    fn test_file_extensions() {
        assert_eq!(PlaylistParser::default().file_extensions(), vec!["m3u", "m3u8", "pls"]);
        assert_eq!(
            PlaylistParser::new(vec![Box::new(pls::PlsFormat)]).file_extensions(),
            vec!["pls"]
        );
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mix.m3u");
        let songs = vec![
            Song {
                title: "One".to_string(),
                artist: "Band".to_string(),
                duration: 61,
                filename: dir.path().join("one.mp3").to_string_lossy().to_string(),
                ..Song::default()
            },
            Song {
                title: "Live".to_string(),
                duration: 10,
                filename: "http://radio.example/live".to_string(),
                ..Song::default()
            },
        ];

        let parser = PlaylistParser::default();
        parser.save(&songs, &path).unwrap();

        assert_eq!(parser.load(&path).unwrap(), songs);
    }

    #[test]
    fn test_load_missing_file() {
        let parser = PlaylistParser::default();
        assert!(matches!(
            parser.load(Path::new("/no/such/list.m3u")),
            Err(Error::Io(_))
        ));
    }
}
