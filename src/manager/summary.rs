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

use crate::{model::SelectionRange, playlist::Playlist, util::format::wordy_time};

/// Builds the status line for a playlist, e.g. `3 selected of 5 tracks - [ 1:45 ]`.
///
/// With fewer than two rows selected the whole playlist's length is shown.
/// Unknown lengths are left out of the sums and the time part is omitted
/// when nothing is known.
pub(crate) fn summary_text(playlist: &Playlist, selection: &[SelectionRange]) -> String {
    let tracks = playlist.row_count();

    let mut selected = 0;
    let mut seconds: u64 = 0;

    for range in selection {
        selected += range.len();
        seconds += range
            .rows()
            .filter_map(|row| playlist.item(row))
            .map(|item| item.duration())
            .filter(|&d| d > 0)
            .map(|d| d as u64)
            .sum::<u64>();
    }

    let mut summary = String::new();

    if selected > 1 {
        summary.push_str(&format!("{} selected of ", selected));
    } else {
        seconds = playlist.total_duration();
    }

    if tracks == 1 {
        summary.push_str("1 track");
    } else {
        summary.push_str(&format!("{} tracks", tracks));
    }

    if seconds > 0 {
        summary.push_str(&format!(" - [ {} ]", wordy_time(seconds)));
    }

    summary
}
