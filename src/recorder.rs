//! Setlist bookkeeping. `Session` holds everything a logging session knows
//! and exposes one method per user action, so any front end (the TUI, a test)
//! drives the same state machine.
//!
//! A session is either idle or has a song in progress. Starting a song while
//! one is running is ignored; recording a transition while idle is ignored.
//! Every time string goes through `timecode::parse_time`, and a bad string
//! aborts the action before anything is touched.

use chrono::NaiveTime;
use tracing::{debug, info};

use crate::error::SetlistError;
use crate::models::{Catalog, EntryEdit, EntryMetadata, SetlistEntry, Transition};
use crate::timecode::{format_optional, parse_time};

/// Whether a song is currently being timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecorderState {
    #[default]
    Idle,
    InProgress,
}

/// Caller-owned state for one logging session.
#[derive(Debug, Clone)]
pub struct Session {
    catalog: Catalog,
    /// Append-only; entries are edited in place, never removed.
    setlist: Vec<SetlistEntry>,
    /// Position the next recorded entry gets. Starts at 1.
    position_counter: u32,
    state: RecorderState,
    current_song: Option<String>,
    current_start_time: Option<NaiveTime>,
    current_end_time: Option<NaiveTime>,
    selected_edit_index: Option<usize>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Catalog::default())
    }
}

impl Session {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            setlist: Vec::new(),
            position_counter: 1,
            state: RecorderState::Idle,
            current_song: None,
            current_start_time: None,
            current_end_time: None,
            selected_edit_index: None,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn setlist(&self) -> &[SetlistEntry] {
        &self.setlist
    }

    pub fn position_counter(&self) -> u32 {
        self.position_counter
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn is_in_progress(&self) -> bool {
        self.state == RecorderState::InProgress
    }

    pub fn current_song(&self) -> Option<&str> {
        self.current_song.as_deref()
    }

    pub fn current_start_time(&self) -> Option<NaiveTime> {
        self.current_start_time
    }

    pub fn current_end_time(&self) -> Option<NaiveTime> {
        self.current_end_time
    }

    pub fn selected_edit_index(&self) -> Option<usize> {
        self.selected_edit_index
    }

    /// Begin timing `song_name` from `start_time`.
    ///
    /// Returns `Ok(false)` without touching anything when a song is already
    /// in progress.
    pub fn start_song(&mut self, song_name: &str, start_time: &str) -> Result<bool, SetlistError> {
        if self.is_in_progress() {
            debug!(song = song_name, "start ignored, a song is already in progress");
            return Ok(false);
        }
        let song = song_name.trim();
        if song.is_empty() {
            return Err(SetlistError::NoSongSelected);
        }
        let start = parse_time(start_time)?;

        self.current_song = Some(song.to_string());
        self.current_start_time = Some(start);
        self.current_end_time = None;
        self.state = RecorderState::InProgress;
        info!(song, start = %format_optional(Some(start)), "song started");
        Ok(true)
    }

    /// Replace the start time of the song in progress. Returns `Ok(false)`
    /// when idle.
    pub fn edit_start_time(&mut self, start_time: &str) -> Result<bool, SetlistError> {
        if !self.is_in_progress() {
            return Ok(false);
        }
        let start = parse_time(start_time)?;
        debug!(
            from = %format_optional(self.current_start_time),
            to = %format_optional(Some(start)),
            "start time adjusted"
        );
        self.current_start_time = Some(start);
        Ok(true)
    }

    /// Close out the song in progress and append it to the setlist.
    ///
    /// Returns the new entry, or `None` when no song was in progress.
    pub fn record_transition(
        &mut self,
        transition: Transition,
        end_time: &str,
        metadata: EntryMetadata,
    ) -> Result<Option<&SetlistEntry>, SetlistError> {
        if !self.is_in_progress() {
            debug!(%transition, "transition ignored, no song in progress");
            return Ok(None);
        }
        let song_name = match self.current_song.clone() {
            Some(song) => song,
            None => return Err(SetlistError::NoSongSelected),
        };
        let end = parse_time(end_time)?;

        let entry = SetlistEntry {
            song_name,
            start_time: self.current_start_time,
            end_time: Some(end),
            set_number: metadata.set_number.max(1),
            position: self.position_counter,
            transition,
            footnote: metadata.footnote,
            is_jamchart: metadata.is_jamchart,
            jamchart_notes: metadata.jamchart_notes,
            is_jam: metadata.is_jam,
        };
        info!(
            position = entry.position,
            song = %entry.song_name,
            %transition,
            duration = %entry.duration_label(),
            "setlist entry recorded"
        );

        self.position_counter += 1;
        self.current_end_time = Some(end);
        self.current_start_time = None;
        self.state = RecorderState::Idle;
        self.setlist.push(entry);
        Ok(self.setlist.last())
    }

    /// Mark an entry as the one being edited.
    pub fn select_entry(&mut self, index: usize) -> Result<&SetlistEntry, SetlistError> {
        let len = self.setlist.len();
        if index >= len {
            return Err(SetlistError::OutOfRange { index, len });
        }
        self.selected_edit_index = Some(index);
        Ok(&self.setlist[index])
    }

    pub fn clear_selection(&mut self) {
        self.selected_edit_index = None;
    }

    /// Apply the supplied fields to the entry at `index`. `position` cannot
    /// be changed.
    pub fn edit_entry(&mut self, index: usize, edit: EntryEdit) -> Result<&SetlistEntry, SetlistError> {
        let len = self.setlist.len();
        let entry = self
            .setlist
            .get_mut(index)
            .ok_or(SetlistError::OutOfRange { index, len })?;

        if let Some(song_name) = edit.song_name {
            let trimmed = song_name.trim();
            if trimmed.is_empty() {
                return Err(SetlistError::NoSongSelected);
            }
            entry.song_name = trimmed.to_string();
        }
        if let Some(start) = edit.start_time {
            entry.start_time = start;
        }
        if let Some(end) = edit.end_time {
            entry.end_time = end;
        }
        if let Some(set_number) = edit.set_number {
            entry.set_number = set_number.max(1);
        }
        if let Some(transition) = edit.transition {
            entry.transition = transition;
        }
        if let Some(footnote) = edit.footnote {
            entry.footnote = footnote;
        }
        if let Some(is_jamchart) = edit.is_jamchart {
            entry.is_jamchart = is_jamchart;
        }
        if let Some(notes) = edit.jamchart_notes {
            entry.jamchart_notes = notes;
        }
        if let Some(is_jam) = edit.is_jam {
            entry.is_jam = is_jam;
        }

        info!(position = entry.position, song = %entry.song_name, "setlist entry updated");
        Ok(entry)
    }

    /// Plain chronological listing, one block per entry.
    pub fn listing(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.setlist.len());
        for entry in &self.setlist {
            lines.push(entry.listing_line());
            if let Some(footnote) = entry.footnote.as_deref().filter(|f| !f.trim().is_empty()) {
                lines.push(format!("Footnote: {footnote}"));
            }
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timecode::parse_time;

    fn session_with_songs(songs: &[(&str, &str, &str)]) -> Session {
        let mut session = Session::default();
        for (song, start, end) in songs {
            session.start_song(song, start).unwrap();
            session
                .record_transition(Transition::FinishSong, end, EntryMetadata::default())
                .unwrap();
        }
        session
    }

    #[test]
    fn start_then_segue_appends_entry() {
        let mut session = Session::default();
        assert!(session.start_song("Magenta Mountain", "19:00:00").unwrap());
        assert_eq!(session.state(), RecorderState::InProgress);

        let entry = session
            .record_transition(Transition::Segue, "19:08:15", EntryMetadata::default())
            .unwrap()
            .cloned()
            .unwrap();
        assert_eq!(entry.position(), 1);
        assert_eq!(entry.start_time, Some(parse_time("19:00:00").unwrap()));
        assert_eq!(entry.end_time, Some(parse_time("19:08:15").unwrap()));
        assert_eq!(entry.duration_label(), "495 seconds");
        assert_eq!(entry.transition, Transition::Segue);
        assert_eq!(session.state(), RecorderState::Idle);
        assert_eq!(session.position_counter(), 2);
        assert_eq!(session.current_end_time(), Some(parse_time("19:08:15").unwrap()));
    }

    #[test]
    fn double_start_is_ignored() {
        let mut session = Session::default();
        session.start_song("Gila Monster", "21:00:00").unwrap();
        let before = session.clone();
        assert!(!session.start_song("Robot Stop", "21:01:00").unwrap());
        assert_eq!(session.current_song(), before.current_song());
        assert_eq!(session.current_start_time(), before.current_start_time());
        assert!(session.setlist().is_empty());
    }

    #[test]
    fn transition_while_idle_is_ignored() {
        let mut session = Session::default();
        let result = session
            .record_transition(Transition::FinishSong, "20:00:00", EntryMetadata::default())
            .unwrap();
        assert!(result.is_none());
        assert_eq!(session.position_counter(), 1);
    }

    #[test]
    fn malformed_times_block_actions() {
        let mut session = Session::default();
        assert!(matches!(
            session.start_song("Rattlesnake", "8:00:00"),
            Err(SetlistError::Format(_))
        ));
        assert_eq!(session.state(), RecorderState::Idle);

        session.start_song("Rattlesnake", "20:00:00").unwrap();
        assert!(matches!(
            session.record_transition(Transition::Segue, "20:05", EntryMetadata::default()),
            Err(SetlistError::Format(_))
        ));
        assert!(session.is_in_progress());
        assert!(session.setlist().is_empty());
        assert_eq!(session.position_counter(), 1);
    }

    #[test]
    fn start_requires_a_song() {
        let mut session = Session::default();
        assert!(matches!(
            session.start_song("  ", "20:00:00"),
            Err(SetlistError::NoSongSelected)
        ));
    }

    #[test]
    fn start_clears_previous_end_time() {
        let mut session = session_with_songs(&[("Rattlesnake", "20:00:00", "20:07:00")]);
        assert!(session.current_end_time().is_some());
        session.start_song("Billabong Valley", "20:07:05").unwrap();
        assert_eq!(session.current_end_time(), None);
    }

    #[test]
    fn edit_start_time_only_while_in_progress() {
        let mut session = Session::default();
        assert!(!session.edit_start_time("20:00:00").unwrap());

        session.start_song("The River", "20:00:00").unwrap();
        assert!(session.edit_start_time("19:59:30").is_ok());
        assert!(session.edit_start_time("later").is_err());
        assert_eq!(session.current_start_time(), Some(parse_time("19:59:30").unwrap()));
    }

    #[test]
    fn positions_increase_regardless_of_edits() {
        let mut session = session_with_songs(&[
            ("Rattlesnake", "20:00:00", "20:07:00"),
            ("Melting", "20:07:00", "20:15:00"),
        ]);
        session
            .edit_entry(
                0,
                EntryEdit {
                    song_name: Some("Rattlesnake (reprise)".to_string()),
                    ..EntryEdit::default()
                },
            )
            .unwrap();
        session.start_song("Open Water", "20:15:00").unwrap();
        session
            .record_transition(Transition::EndSet, "20:30:00", EntryMetadata::default())
            .unwrap();

        let positions: Vec<u32> = session.setlist().iter().map(|e| e.position()).collect();
        assert_eq!(positions, [1, 2, 3]);
        assert_eq!(session.position_counter(), 4);
    }

    #[test]
    fn edit_touches_only_supplied_fields_of_target() {
        let mut session = session_with_songs(&[
            ("Rattlesnake", "20:00:00", "20:07:00"),
            ("Melting", "20:07:00", "20:15:00"),
        ]);
        let untouched = session.setlist()[0].clone();
        let before = session.setlist()[1].clone();

        let edited = session
            .edit_entry(
                1,
                EntryEdit {
                    end_time: Some(Some(parse_time("20:16:00").unwrap())),
                    footnote: Some(Some("with flute".to_string())),
                    ..EntryEdit::default()
                },
            )
            .unwrap()
            .clone();

        assert_eq!(session.setlist()[0], untouched);
        assert_eq!(edited.position(), before.position());
        assert_eq!(edited.song_name, before.song_name);
        assert_eq!(edited.start_time, before.start_time);
        assert_eq!(edited.transition, before.transition);
        assert_eq!(edited.duration_label(), "540 seconds");
        assert_eq!(edited.footnote.as_deref(), Some("with flute"));
    }

    #[test]
    fn clearing_a_time_makes_duration_unknown() {
        let mut session = session_with_songs(&[("Rattlesnake", "20:00:00", "20:07:00")]);
        let entry = session
            .edit_entry(
                0,
                EntryEdit {
                    start_time: Some(None),
                    ..EntryEdit::default()
                },
            )
            .unwrap();
        assert_eq!(entry.duration_seconds(), None);
    }

    #[test]
    fn out_of_range_edit_is_reported() {
        let mut session = session_with_songs(&[("Rattlesnake", "20:00:00", "20:07:00")]);
        assert!(matches!(
            session.edit_entry(1, EntryEdit::default()),
            Err(SetlistError::OutOfRange { index: 1, len: 1 })
        ));
        assert!(matches!(
            session.select_entry(5),
            Err(SetlistError::OutOfRange { index: 5, len: 1 })
        ));
        assert_eq!(session.selected_edit_index(), None);
    }

    #[test]
    fn negative_duration_is_reported_as_is() {
        let session = session_with_songs(&[("Head On/Pill", "20:10:00", "20:05:00")]);
        assert_eq!(session.setlist()[0].duration_seconds(), Some(-300));
        assert_eq!(session.setlist()[0].duration_label(), "-300 seconds");
    }

    #[test]
    fn listing_includes_footnotes() {
        let mut session = Session::default();
        session.start_song("Rattlesnake", "20:15:00").unwrap();
        session
            .record_transition(
                Transition::Segue,
                "20:19:42",
                EntryMetadata {
                    footnote: Some("Teased Gamma Knife".to_string()),
                    ..EntryMetadata::default()
                },
            )
            .unwrap();
        assert_eq!(
            session.listing(),
            [
                "1. Rattlesnake (20:15:00-20:19:42 [282 seconds]) - Segue",
                "Footnote: Teased Gamma Knife"
            ]
        );
    }
}
