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

//! PLS (version 2) playlists.

use std::{
    collections::BTreeMap,
    io::{BufRead, Write},
    path::Path,
};

use crate::{
    error::{Error, Result},
    model::Song,
    parser::{PlaylistFormat, entry_for, resolve_entry},
};

pub struct PlsFormat;

impl PlaylistFormat for PlsFormat {
    fn name(&self) -> &'static str {
        "PLS"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["pls"]
    }

    fn load(&self, reader: &mut dyn BufRead, dir: &Path) -> Result<Vec<Song>> {
        let mut entries: BTreeMap<usize, Song> = BTreeMap::new();

        for line in reader.lines() {
            let line = line?;
            let Some((key, value)) = line.trim().split_once('=') else {
                continue;
            };

            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();

            let (field, index) = if let Some(n) = key.strip_prefix("file") {
                ("file", n)
            } else if let Some(n) = key.strip_prefix("title") {
                ("title", n)
            } else if let Some(n) = key.strip_prefix("length") {
                ("length", n)
            } else {
                continue;
            };

            let index: usize = index
                .parse()
                .map_err(|_| Error::Malformed(format!("bad PLS key '{}'", key)))?;
            let song = entries.entry(index).or_default();

            match field {
                "file" => song.filename = resolve_entry(value, dir),
                "title" => song.title = value.to_string(),
                _ => song.duration = value.parse().unwrap_or(-1),
            }
        }

        Ok(entries
            .into_values()
            .filter(|song| !song.filename.is_empty())
            .collect())
    }

    fn save(&self, songs: &[Song], writer: &mut dyn Write, dir: &Path) -> Result<()> {
        writeln!(writer, "[playlist]")?;

        for (n, song) in songs.iter().enumerate().map(|(i, s)| (i + 1, s)) {
            writeln!(writer, "File{}={}", n, entry_for(&song.filename, dir))?;
            if !song.title.is_empty() {
                writeln!(writer, "Title{}={}", n, song.title)?;
            }
            writeln!(writer, "Length{}={}", n, if song.duration > 0 { song.duration } else { -1 })?;
        }

        writeln!(writer, "NumberOfEntries={}", songs.len())?;
        writeln!(writer, "Version=2")?;

        Ok(())
    }
}
