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

//! Application configuration.
//!
//! This module manages the application configuration file.

use serde::{Deserialize, Serialize};

use crate::model::{RepeatMode, ShuffleMode};

const CONFIG_NAME: &str = "chooui-playlists";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub version: u32,
    pub media_dirs: Vec<String>,
    pub database_file: String,
    /// Name given to the playlist created when the store has none.
    pub default_playlist_name: String,
    /// A `tracing` filter directive, overridden by `RUST_LOG` when set.
    pub log_filter: String,
    pub repeat_mode: RepeatMode,
    pub shuffle_mode: ShuffleMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            media_dirs: vec![],
            database_file: "music.db".to_string(),
            default_playlist_name: "Playlist".to_string(),
            log_filter: "info".to_string(),
            repeat_mode: RepeatMode::Off,
            shuffle_mode: ShuffleMode::Off,
        }
    }
}

pub fn load_config() -> AppConfig {
    confy::load(CONFIG_NAME, None).unwrap_or_default()
}
