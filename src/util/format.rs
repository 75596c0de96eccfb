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

const SECONDS_PER_DAY: u64 = 60 * 60 * 24;

/// Formats a duration in seconds into a human-readable `MM:SS` string.
///
/// # Examples
///
/// ```
/// use chooui_playlists::util::format::format_time;
///
/// assert_eq!(format_time(65), "01:05");
/// assert_eq!(format_time(3600), "60:00");
/// ```
pub fn format_time(total_seconds: u64) -> String {
    let mins = total_seconds / 60;
    let secs = total_seconds % 60;
    format!("{:02}:{:02}", mins, secs)
}

/// Formats a duration as `H:MM:SS`, or `M:SS` when it is less than an hour.
///
/// # Examples
///
/// ```
/// use chooui_playlists::util::format::pretty_time;
///
/// assert_eq!(pretty_time(185), "3:05");
/// assert_eq!(pretty_time(3661), "1:01:01");
/// ```
pub fn pretty_time(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let mins = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{}:{:02}", mins, secs)
    }
}

/// Formats a duration for playlist summaries, prefixing whole days.
///
/// Durations shorter than a day are rendered exactly as [`pretty_time`].
///
/// # Examples
///
/// ```
/// use chooui_playlists::util::format::wordy_time;
///
/// assert_eq!(wordy_time(185), "3:05");
/// assert_eq!(wordy_time(90_000), "1 day 1:00:00");
/// ```
pub fn wordy_time(total_seconds: u64) -> String {
    let days = total_seconds / SECONDS_PER_DAY;
    let remainder = pretty_time(total_seconds % SECONDS_PER_DAY);

    match days {
        0 => remainder,
        1 => format!("1 day {}", remainder),
        _ => format!("{} days {}", days, remainder),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_time_under_an_hour() {
        assert_eq!(pretty_time(0), "0:00");
        assert_eq!(pretty_time(59), "0:59");
        assert_eq!(pretty_time(105), "1:45");
    }

    #[test]
    fn test_wordy_time_days() {
        assert_eq!(wordy_time(2 * SECONDS_PER_DAY + 61), "2 days 1:01");
        assert_eq!(wordy_time(SECONDS_PER_DAY), "1 day 0:00");
    }
}
