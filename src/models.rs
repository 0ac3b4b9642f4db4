//! Domain models shared by the catalog loader, the recorder, and the TUI.
//! These stay plain data holders so the other layers can focus on fetching,
//! bookkeeping, and presentation. The recorder owns all mutation; nothing in
//! here knows about terminals or HTTP.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer};

use crate::timecode::{format_optional, seconds_between};

/// A single row of the remote album catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogEntry {
    /// Studio or live album the song appears on.
    pub album_title: String,
    /// Song title as listed on that album.
    pub song_name: String,
    /// Wire name is `islive`, sent as `0` or `1`.
    #[serde(rename = "islive", deserialize_with = "flag_from_int")]
    pub is_live: bool,
}

fn flag_from_int<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = i64::deserialize(deserializer)?;
    Ok(value != 0)
}

/// Album title to ordered song names, sorted by album title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    albums: BTreeMap<String, Vec<String>>,
}

impl Catalog {
    /// Wrap an already grouped map. Only `build_catalog` creates these.
    pub(crate) fn from_map(albums: BTreeMap<String, Vec<String>>) -> Self {
        Self { albums }
    }

    /// True after a failed fetch or with `--offline`.
    pub fn is_empty(&self) -> bool {
        self.albums.is_empty()
    }

    /// Number of albums that have at least one studio song.
    pub fn album_count(&self) -> usize {
        self.albums.len()
    }

    /// Album titles in ascending order.
    pub fn albums(&self) -> impl Iterator<Item = &str> {
        self.albums.keys().map(String::as_str)
    }

    /// Songs for `album` in the order the catalog first listed them.
    /// Songs of `album` in catalog order; empty for an unknown album.
    pub fn songs(&self, album: &str) -> &[String] {
        self.albums.get(album).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Album title at `index` in sorted order.
    pub fn album_at(&self, index: usize) -> Option<&str> {
        self.albums.keys().nth(index).map(String::as_str)
    }
}

/// How a song ended: into the next song, or by closing a set or the show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transition {
    #[default]
    FinishSong,
    Segue,
    SmoothSegue,
    EndSet,
    EndLastSet,
    EndShow,
}

impl Transition {
    /// Every transition, in the order the forms offer them.
    pub const ALL: [Transition; 6] = [
        Transition::FinishSong,
        Transition::Segue,
        Transition::SmoothSegue,
        Transition::EndSet,
        Transition::EndLastSet,
        Transition::EndShow,
    ];

    /// Display label, as written into the listing.
    pub fn label(self) -> &'static str {
        match self {
            Transition::FinishSong => "Finish song",
            Transition::Segue => "Segue",
            Transition::SmoothSegue => "Smooth segue",
            Transition::EndSet => "End Set",
            Transition::EndLastSet => "End Last Set",
            Transition::EndShow => "End Show",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-song notes captured alongside a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMetadata {
    /// 1-based set the song belongs to.
    pub set_number: u32,
    /// Free-form note printed under the listing line.
    pub footnote: Option<String>,
    /// Community "jamchart" flag for a notable performance.
    pub is_jamchart: bool,
    /// Why the performance earned the jamchart flag.
    pub jamchart_notes: Option<String>,
    /// The performance was an extended jam.
    pub is_jam: bool,
}

impl Default for EntryMetadata {
    fn default() -> Self {
        Self {
            set_number: 1,
            footnote: None,
            is_jamchart: false,
            jamchart_notes: None,
            is_jam: false,
        }
    }
}

/// One performed song. Only the recorder creates these; `position` is fixed
/// at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetlistEntry {
    /// Never empty.
    pub song_name: String,
    /// `None` when cleared through an edit; shown as `N/A`.
    pub start_time: Option<NaiveTime>,
    /// `None` when cleared through an edit; shown as `N/A`.
    pub end_time: Option<NaiveTime>,
    pub set_number: u32,
    /// 1-based order of recording. Read through `position()`.
    pub(crate) position: u32,
    /// How the song ended.
    pub transition: Transition,
    pub footnote: Option<String>,
    pub is_jamchart: bool,
    pub jamchart_notes: Option<String>,
    pub is_jam: bool,
}

impl SetlistEntry {
    pub fn position(&self) -> u32 {
        self.position
    }

    /// Seconds from start to end, or `None` while either time is unset.
    pub fn duration_seconds(&self) -> Option<i64> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some(seconds_between(start, end)),
            _ => None,
        }
    }

    /// `"282 seconds"` or `"N/A"`.
    pub fn duration_label(&self) -> String {
        match self.duration_seconds() {
            Some(seconds) => format!("{seconds} seconds"),
            None => "N/A".to_string(),
        }
    }

    /// Label used in the edit picker, e.g. `3. Rattlesnake`.
    pub fn picker_label(&self) -> String {
        format!("{}. {}", self.position, self.song_name)
    }

    /// The plain chronological listing line.
    pub fn listing_line(&self) -> String {
        format!(
            "{}. {} ({}-{} [{}]) - {}",
            self.position,
            self.song_name,
            format_optional(self.start_time),
            format_optional(self.end_time),
            self.duration_label(),
            self.transition
        )
    }
}

/// Field-by-field changes for an existing entry. `None` leaves the field
/// alone; the time fields use `Some(None)` to clear a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryEdit {
    pub song_name: Option<String>,
    pub start_time: Option<Option<NaiveTime>>,
    pub end_time: Option<Option<NaiveTime>>,
    pub set_number: Option<u32>,
    pub transition: Option<Transition>,
    pub footnote: Option<Option<String>>,
    pub is_jamchart: Option<bool>,
    pub jamchart_notes: Option<Option<String>>,
    pub is_jam: Option<bool>,
}

/// Show format as the setlist site classifies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetType {
    #[default]
    Type1,
    Type2,
}

impl fmt::Display for SetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetType::Type1 => f.write_str("Type 1"),
            SetType::Type2 => f.write_str("Type 2"),
        }
    }
}

/// Facts about the show that are entered once per session. Purely
/// informational; the recorder never reads them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowDetails {
    /// Defaults to today.
    pub show_date: NaiveDate,
    /// Optional name such as a festival day.
    pub show_title: String,
    pub set_type: SetType,
    /// Pre-filled from `default_artist` in the config.
    pub artist: String,
    /// Identifier used by the setlist site, kept as text.
    pub venue_id: String,
    pub tour_name: String,
    pub soundcheck: bool,
    pub venue_name: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

impl ShowDetails {
    /// Blank details for today's show by `artist`.
    pub fn new(artist: impl Into<String>) -> Self {
        Self {
            show_date: Local::now().date_naive(),
            show_title: String::new(),
            set_type: SetType::Type1,
            artist: artist.into(),
            venue_id: String::new(),
            tour_name: String::new(),
            soundcheck: false,
            venue_name: String::new(),
            city: String::new(),
            state: String::new(),
            country: String::new(),
        }
    }

    /// One-line header such as `2026-10-18 · Artist @ Venue, City`.
    pub fn headline(&self) -> String {
        let mut line = format!("{} · {}", self.show_date.format("%Y-%m-%d"), self.artist);
        if !self.venue_name.trim().is_empty() {
            line.push_str(&format!(" @ {}", self.venue_name.trim()));
        }
        let place: Vec<&str> = [&self.city, &self.state, &self.country]
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        if !place.is_empty() {
            line.push_str(&format!(", {}", place.join(", ")));
        }
        if !self.show_title.trim().is_empty() {
            line.push_str(&format!(" - {}", self.show_title.trim()));
        }
        line
    }
}
