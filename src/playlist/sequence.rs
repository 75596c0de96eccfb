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

//! Repeat and shuffle policy shared by every playlist.

use std::cell::Cell;

use crate::model::{RepeatMode, ShuffleMode};

/// Playback ordering policy.
///
/// One instance is shared (behind an `Rc`) between all playlists, so changing
/// the repeat or shuffle mode affects whichever playlist is active.
#[derive(Debug, Default)]
pub struct PlaylistSequence {
    repeat_mode: Cell<RepeatMode>,
    shuffle_mode: Cell<ShuffleMode>,
}

impl PlaylistSequence {
    pub fn new(repeat_mode: RepeatMode, shuffle_mode: ShuffleMode) -> Self {
        Self {
            repeat_mode: Cell::new(repeat_mode),
            shuffle_mode: Cell::new(shuffle_mode),
        }
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat_mode.get()
    }

    pub fn shuffle_mode(&self) -> ShuffleMode {
        self.shuffle_mode.get()
    }

    pub fn set_repeat_mode(&self, mode: RepeatMode) {
        self.repeat_mode.set(mode);
    }

    pub fn set_shuffle_mode(&self, mode: ShuffleMode) {
        self.shuffle_mode.set(mode);
    }
}
