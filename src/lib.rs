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

//! # Multi-playlist management.
//!
//! A library for keeping several named playlists open at once, backed by a
//! SQLite store and kept in step with a scanned media catalog.
//!
//! ## Architecture
//!
//! * [`manager::PlaylistManager`] owns every open [`playlist::Playlist`],
//!   tracks which one is *current* (being edited) and which is *active*
//!   (being played), and reports everything that happens as
//!   [`manager::ManagerEvent`]s.
//! * [`db::PlaylistStore`] persists playlist names, order and contents.
//! * [`catalog::Catalog`] scans media directories and announces the songs it
//!   finds so library items in open playlists can be refreshed.
//! * [`parser::PlaylistParser`] imports and exports M3U and PLS files.
//!
//! Communication between these parts is handled via `std::sync::mpsc`
//! channels that the manager drains synchronously; nothing here spawns
//! threads.

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod manager;
pub mod model;
pub mod parser;
pub mod playlist;
pub mod util;

pub use error::{Error, Result};
pub use manager::{ManagerEvent, PlaylistManager};
