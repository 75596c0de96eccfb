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

//! Extended M3U playlists.
//!
//! ```text
//! #EXTM3U
//! #EXTINF:185,Artist - Title
//! relative/or/absolute/path.mp3
//! ```

use std::{
    io::{BufRead, Write},
    path::Path,
};

use crate::{
    error::Result,
    model::Song,
    parser::{PlaylistFormat, entry_for, resolve_entry},
};

const HEADER: &str = "#EXTM3U";
const EXTINF: &str = "#EXTINF:";

pub struct M3uFormat;

impl PlaylistFormat for M3uFormat {
    fn name(&self) -> &'static str {
        "M3U"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["m3u", "m3u8"]
    }

    fn load(&self, reader: &mut dyn BufRead, dir: &Path) -> Result<Vec<Song>> {
        let mut songs = Vec::new();
        let mut pending: Option<Song> = None;

        for line in reader.lines() {
            let line = line?;
            let line = line.trim_start_matches('\u{feff}').trim();

            if line.is_empty() {
                continue;
            }

            if let Some(info) = line.strip_prefix(EXTINF) {
                pending = Some(parse_extinf(info));
                continue;
            }

            if line.starts_with('#') {
                continue;
            }

            let mut song = pending.take().unwrap_or_default();
            song.filename = resolve_entry(line, dir);
            songs.push(song);
        }

        Ok(songs)
    }

    fn save(&self, songs: &[Song], writer: &mut dyn Write, dir: &Path) -> Result<()> {
        writeln!(writer, "{}", HEADER)?;

        for song in songs {
            if song.duration > 0 || !song.title.is_empty() {
                let duration = if song.duration > 0 { song.duration } else { -1 };
                let label = if song.artist.is_empty() {
                    song.title.clone()
                } else {
                    format!("{} - {}", song.artist, song.title)
                };
                writeln!(writer, "{}{},{}", EXTINF, duration, label)?;
            }
            writeln!(writer, "{}", entry_for(&song.filename, dir))?;
        }

        Ok(())
    }
}

fn parse_extinf(info: &str) -> Song {
    let (duration, label) = info.split_once(',').unwrap_or((info, ""));

    let (artist, title) = match label.split_once(" - ") {
        Some((artist, title)) => (artist.trim(), title.trim()),
        None => ("", label.trim()),
    };

    Song {
        title: title.to_string(),
        artist: artist.to_string(),
        duration: duration.trim().parse().unwrap_or(-1),
        ..Song::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_extended_m3u() {
        let data = "\u{feff}#EXTM3U\n\
                    #EXTINF:185,Some Band - First Song\n\
                    first.mp3\n\
                    \n\
                    # a comment\n\
                    /abs/second.flac\n\
                    #EXTINF:-1,Radio\n\
                    http://radio.example/stream\n";

        let songs = M3uFormat
            .load(&mut data.as_bytes(), Path::new("/lists"))
            .unwrap();

        assert_eq!(songs.len(), 3);
        assert_eq!(songs[0].filename, "/lists/first.mp3");
        assert_eq!(songs[0].artist, "Some Band");
        assert_eq!(songs[0].title, "First Song");
        assert_eq!(songs[0].duration, 185);
        assert_eq!(songs[1], Song::from_file("/abs/second.flac"));
        assert_eq!(songs[2].title, "Radio");
        assert_eq!(songs[2].duration, -1);
    }

    #[test]
    fn test_round_trip_keeps_names_starting_with_hash() {
        let dir = Path::new("/lists");
        let songs = vec![
            Song::from_file("/lists/#1 hit.mp3"),
            Song::from_file("/lists/b.mp3"),
        ];

        let mut out = Vec::new();
        M3uFormat.save(&songs, &mut out, dir).unwrap();
        let loaded = M3uFormat.load(&mut out.as_slice(), dir).unwrap();

        assert_eq!(loaded, songs);
    }

    #[test]
    fn test_title_with_separator_splits_on_load() {
        let songs = vec![Song {
            title: "Side A - Intro".to_string(),
            duration: 30,
            filename: "/lists/a.mp3".to_string(),
            ..Song::default()
        }];

        let mut out = Vec::new();
        M3uFormat.save(&songs, &mut out, Path::new("/lists")).unwrap();
        let loaded = M3uFormat.load(&mut out.as_slice(), Path::new("/lists")).unwrap();

        assert_eq!(loaded[0].artist, "Side A");
        assert_eq!(loaded[0].title, "Intro");
    }

    #[test]
    fn test_save_writes_relative_entries() {
        let songs = vec![
            Song {
                title: "Song".to_string(),
                artist: "Band".to_string(),
                duration: 90,
                filename: "/lists/sub/song.mp3".to_string(),
                ..Song::default()
            },
            Song::from_file("/elsewhere/untagged.mp3"),
        ];

        let mut out = Vec::new();
        M3uFormat.save(&songs, &mut out, Path::new("/lists")).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "#EXTM3U\n#EXTINF:90,Band - Song\nsub/song.mp3\n/elsewhere/untagged.mp3\n"
        );
    }
}
