use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{EntryEdit, EntryMetadata, SetlistEntry, SetType, ShowDetails, Transition};
use crate::timecode::{format_optional, parse_optional_time, parse_time};

/// Input behaviour of a single form field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum FieldValue {
    /// Free text. `required` only changes the placeholder.
    Text { value: String, required: bool },
    /// Digits only.
    Number(String),
    /// `HH:MM:SS` text; the placeholder says what blank means.
    Time { value: String, blank: &'static str },
    Toggle(bool),
    Choice { options: Vec<String>, index: usize },
}

#[derive(Clone, Debug)]
pub(crate) struct Field {
    pub(crate) label: &'static str,
    pub(crate) value: FieldValue,
}

impl Field {
    fn text(label: &'static str, value: impl Into<String>, required: bool) -> Self {
        Self {
            label,
            value: FieldValue::Text {
                value: value.into(),
                required,
            },
        }
    }

    fn number(label: &'static str, value: u32) -> Self {
        Self {
            label,
            value: FieldValue::Number(value.to_string()),
        }
    }

    fn time(label: &'static str, value: impl Into<String>, blank: &'static str) -> Self {
        Self {
            label,
            value: FieldValue::Time {
                value: value.into(),
                blank,
            },
        }
    }

    fn toggle(label: &'static str, value: bool) -> Self {
        Self {
            label,
            value: FieldValue::Toggle(value),
        }
    }

    fn choice(label: &'static str, options: Vec<String>, index: usize) -> Self {
        Self {
            label,
            value: FieldValue::Choice { options, index },
        }
    }

    fn is_editable_text(&self) -> bool {
        matches!(
            self.value,
            FieldValue::Text { .. } | FieldValue::Number(_) | FieldValue::Time { .. }
        )
    }
}

/// Ordered fields plus focus. Every modal form in the console is one of
/// these wrapped in a typed front.
#[derive(Clone, Debug)]
pub(crate) struct FieldSet {
    pub(crate) fields: Vec<Field>,
    pub(crate) active: usize,
    pub(crate) error: Option<String>,
}

impl FieldSet {
    fn new(fields: Vec<Field>) -> Self {
        Self {
            fields,
            active: 0,
            error: None,
        }
    }

    /// Move focus forward, wrapping at the end.
    pub(crate) fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.active = (self.active + 1) % self.fields.len();
        }
    }

    /// Move focus backward, wrapping at the start.
    pub(crate) fn previous_field(&mut self) {
        if !self.fields.is_empty() {
            self.active = (self.active + self.fields.len() - 1) % self.fields.len();
        }
    }

    /// Type into the focused field. Space flips toggles and advances choices.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        let on_choice = matches!(
            self.fields.get(self.active).map(|f| &f.value),
            Some(FieldValue::Choice { .. })
        );
        if on_choice {
            if ch == ' ' {
                self.cycle(1);
                return true;
            }
            return false;
        }
        let Some(field) = self.fields.get_mut(self.active) else {
            return false;
        };
        let accepted = match &mut field.value {
            FieldValue::Text { value, .. } => {
                value.push(ch);
                true
            }
            FieldValue::Number(value) => {
                if ch.is_ascii_digit() {
                    value.push(ch);
                    true
                } else {
                    false
                }
            }
            FieldValue::Time { value, .. } => {
                if (ch.is_ascii_digit() || ch == ':' || ch.is_ascii_alphabetic() || ch == '/')
                    && value.len() < 8
                {
                    value.push(ch);
                    true
                } else {
                    false
                }
            }
            FieldValue::Toggle(flag) => {
                if ch == ' ' {
                    *flag = !*flag;
                    true
                } else {
                    false
                }
            }
            FieldValue::Choice { .. } => false,
        };
        if accepted {
            self.error = None;
        }
        accepted
    }

    pub(crate) fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.active) {
            match &mut field.value {
                FieldValue::Text { value, .. }
                | FieldValue::Number(value)
                | FieldValue::Time { value, .. } => {
                    value.pop();
                }
                _ => {}
            }
        }
    }

    /// Left/Right on a choice or toggle field.
    pub(crate) fn cycle(&mut self, offset: isize) {
        if let Some(field) = self.fields.get_mut(self.active) {
            match &mut field.value {
                FieldValue::Choice { options, index } if !options.is_empty() => {
                    let len = options.len() as isize;
                    *index = (*index as isize + offset).rem_euclid(len) as usize;
                }
                FieldValue::Toggle(flag) => *flag = !*flag,
                _ => {}
            }
        }
    }

    pub(crate) fn text(&self, index: usize) -> &str {
        match self.fields.get(index).map(|f| &f.value) {
            Some(FieldValue::Text { value, .. })
            | Some(FieldValue::Number(value))
            | Some(FieldValue::Time { value, .. }) => value,
            _ => "",
        }
    }

    pub(crate) fn flag(&self, index: usize) -> bool {
        matches!(
            self.fields.get(index).map(|f| &f.value),
            Some(FieldValue::Toggle(true))
        )
    }

    pub(crate) fn choice(&self, index: usize) -> usize {
        match self.fields.get(index).map(|f| &f.value) {
            Some(FieldValue::Choice { index, .. }) => *index,
            _ => 0,
        }
    }

    /// Render one styled line per field.
    pub(crate) fn build_lines(&self) -> Vec<Line<'static>> {
        self.fields
            .iter()
            .enumerate()
            .map(|(idx, field)| self.build_line(idx, field))
            .collect()
    }

    fn build_line(&self, idx: usize, field: &Field) -> Line<'static> {
        let is_active = idx == self.active;
        let (display, empty) = match &field.value {
            FieldValue::Text { value, required } => {
                if value.is_empty() {
                    let placeholder = if *required { "<required>" } else { "<optional>" };
                    (placeholder.to_string(), true)
                } else {
                    (value.clone(), false)
                }
            }
            FieldValue::Number(value) => {
                if value.is_empty() {
                    ("<required>".to_string(), true)
                } else {
                    (value.clone(), false)
                }
            }
            FieldValue::Time { value, blank } => {
                if value.is_empty() {
                    (format!("<{blank}>"), true)
                } else {
                    (value.clone(), false)
                }
            }
            FieldValue::Toggle(flag) => (if *flag { "[x]" } else { "[ ]" }.to_string(), false),
            FieldValue::Choice { options, index } => (
                format!("< {} >", options.get(*index).cloned().unwrap_or_default()),
                false,
            ),
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if empty {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label)),
            Span::styled(display, style),
        ])
    }

    /// Cursor column and row offsets for the focused field, or `None` when
    /// the field does not take typed input.
    pub(crate) fn cursor_offset(&self) -> Option<(u16, u16)> {
        let field = self.fields.get(self.active)?;
        if !field.is_editable_text() {
            return None;
        }
        let prefix = field.label.chars().count() + 2;
        let typed = self.text(self.active).chars().count();
        Some(((prefix + typed) as u16, self.active as u16))
    }

    pub(crate) fn len(&self) -> usize {
        self.fields.len()
    }
}

fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_set_number(raw: &str) -> Result<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(anyhow!("Set number is required."));
    }
    let number = raw
        .parse::<u32>()
        .map_err(|_| anyhow!("Set number must be a positive integer."))?;
    if number == 0 {
        return Err(anyhow!("Set number must be at least 1."));
    }
    Ok(number)
}

fn transition_options() -> Vec<String> {
    Transition::ALL.iter().map(|t| t.label().to_string()).collect()
}

fn transition_index(transition: Transition) -> usize {
    Transition::ALL
        .iter()
        .position(|t| *t == transition)
        .unwrap_or(0)
}

/// The "frequently updated" song details that ride along with every
/// recorded transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SongDetails {
    pub(crate) set_number: u32,
    /// Blank means "use the current time".
    pub(crate) track_time: String,
    pub(crate) transition: Transition,
    pub(crate) footnote: String,
    pub(crate) is_jamchart: bool,
    pub(crate) jamchart_notes: String,
    pub(crate) is_jam: bool,
}

impl Default for SongDetails {
    fn default() -> Self {
        Self {
            set_number: 1,
            track_time: String::new(),
            transition: Transition::FinishSong,
            footnote: String::new(),
            is_jamchart: false,
            jamchart_notes: String::new(),
            is_jam: false,
        }
    }
}

impl SongDetails {
    /// The track time to stamp an action with.
    pub(crate) fn effective_track_time(&self, now: impl FnOnce() -> String) -> String {
        let trimmed = self.track_time.trim();
        if trimmed.is_empty() {
            now()
        } else {
            trimmed.to_string()
        }
    }

    pub(crate) fn metadata(&self) -> EntryMetadata {
        EntryMetadata {
            set_number: self.set_number,
            footnote: optional_text(&self.footnote),
            is_jamchart: self.is_jamchart,
            jamchart_notes: optional_text(&self.jamchart_notes),
            is_jam: self.is_jam,
        }
    }

    /// Forget the per-song notes once they have been written to an entry.
    /// Set number and transition carry over.
    pub(crate) fn reset_after_record(&mut self) {
        self.track_time.clear();
        self.footnote.clear();
        self.is_jamchart = false;
        self.jamchart_notes.clear();
        self.is_jam = false;
    }
}

const DETAIL_SET: usize = 0;
const DETAIL_TRACK_TIME: usize = 1;
const DETAIL_TRANSITION: usize = 2;
const DETAIL_FOOTNOTE: usize = 3;
const DETAIL_JAMCHART: usize = 4;
const DETAIL_NOTES: usize = 5;
const DETAIL_JAM: usize = 6;

/// Modal editor for `SongDetails`.
#[derive(Clone, Debug)]
pub(crate) struct DetailsForm {
    pub(crate) fields: FieldSet,
}

impl DetailsForm {
    pub(crate) fn from_details(details: &SongDetails) -> Self {
        Self {
            fields: FieldSet::new(vec![
                Field::number("Set Number", details.set_number),
                Field::time("Track Time", details.track_time.clone(), "now"),
                Field::choice(
                    "Transition",
                    transition_options(),
                    transition_index(details.transition),
                ),
                Field::text("Footnote", details.footnote.clone(), false),
                Field::toggle("Is Jamchart?", details.is_jamchart),
                Field::text("Jamchart Notes", details.jamchart_notes.clone(), false),
                Field::toggle("Is Jam?", details.is_jam),
            ]),
        }
    }

    pub(crate) fn parse_inputs(&self) -> Result<SongDetails> {
        let f = &self.fields;
        let set_number = parse_set_number(f.text(DETAIL_SET))?;
        let track_time = f.text(DETAIL_TRACK_TIME).trim().to_string();
        if !track_time.is_empty() {
            parse_time(&track_time)?;
        }
        Ok(SongDetails {
            set_number,
            track_time,
            transition: Transition::ALL[f.choice(DETAIL_TRANSITION) % Transition::ALL.len()],
            footnote: f.text(DETAIL_FOOTNOTE).trim().to_string(),
            is_jamchart: f.flag(DETAIL_JAMCHART),
            jamchart_notes: f.text(DETAIL_NOTES).trim().to_string(),
            is_jam: f.flag(DETAIL_JAM),
        })
    }
}

/// Single time field with Confirm (Enter) and Cancel (Esc).
#[derive(Clone, Debug)]
pub(crate) struct TimeForm {
    pub(crate) fields: FieldSet,
}

impl TimeForm {
    pub(crate) fn new(label: &'static str, value: String) -> Self {
        Self {
            fields: FieldSet::new(vec![Field::time(label, value, "HH:MM:SS")]),
        }
    }

    pub(crate) fn value(&self) -> &str {
        self.fields.text(0)
    }
}

const ENTRY_SONG: usize = 0;
const ENTRY_START: usize = 1;
const ENTRY_END: usize = 2;
const ENTRY_SET: usize = 3;
const ENTRY_TRANSITION: usize = 4;
const ENTRY_FOOTNOTE: usize = 5;
const ENTRY_JAMCHART: usize = 6;
const ENTRY_NOTES: usize = 7;
const ENTRY_JAM: usize = 8;

/// Edit form for a recorded entry. Position is shown in the title and never
/// editable.
#[derive(Clone, Debug)]
pub(crate) struct EntryForm {
    pub(crate) position: u32,
    original: SetlistEntry,
    pub(crate) fields: FieldSet,
}

impl EntryForm {
    pub(crate) fn from_entry(entry: &SetlistEntry) -> Self {
        Self {
            position: entry.position(),
            original: entry.clone(),
            fields: FieldSet::new(vec![
                Field::text("Song", entry.song_name.clone(), true),
                Field::time("Start Time", format_optional(entry.start_time), "N/A"),
                Field::time("End Time", format_optional(entry.end_time), "N/A"),
                Field::number("Set Number", entry.set_number),
                Field::choice(
                    "Transition",
                    transition_options(),
                    transition_index(entry.transition),
                ),
                Field::text("Footnote", entry.footnote.clone().unwrap_or_default(), false),
                Field::toggle("Is Jamchart?", entry.is_jamchart),
                Field::text(
                    "Jamchart Notes",
                    entry.jamchart_notes.clone().unwrap_or_default(),
                    false,
                ),
                Field::toggle("Is Jam?", entry.is_jam),
            ]),
        }
    }

    /// Validate the form and return only the fields that differ from the
    /// entry as it was when the form opened.
    pub(crate) fn parse_inputs(&self) -> Result<EntryEdit> {
        let f = &self.fields;
        let original = &self.original;

        let song = f.text(ENTRY_SONG).trim().to_string();
        if song.is_empty() {
            return Err(anyhow!("Song name is required."));
        }
        let start = parse_optional_time(f.text(ENTRY_START))?;
        let end = parse_optional_time(f.text(ENTRY_END))?;
        let set_number = parse_set_number(f.text(ENTRY_SET))?;
        let transition = Transition::ALL[f.choice(ENTRY_TRANSITION) % Transition::ALL.len()];
        let footnote = optional_text(f.text(ENTRY_FOOTNOTE));
        let is_jamchart = f.flag(ENTRY_JAMCHART);
        let notes = optional_text(f.text(ENTRY_NOTES));
        let is_jam = f.flag(ENTRY_JAM);

        Ok(EntryEdit {
            song_name: (song != original.song_name).then_some(song),
            start_time: (start != original.start_time).then_some(start),
            end_time: (end != original.end_time).then_some(end),
            set_number: (set_number != original.set_number).then_some(set_number),
            transition: (transition != original.transition).then_some(transition),
            footnote: (footnote != original.footnote).then_some(footnote),
            is_jamchart: (is_jamchart != original.is_jamchart).then_some(is_jamchart),
            jamchart_notes: (notes != original.jamchart_notes).then_some(notes),
            is_jam: (is_jam != original.is_jam).then_some(is_jam),
        })
    }
}

const SHOW_DATE: usize = 0;
const SHOW_TITLE: usize = 1;
const SHOW_SET_TYPE: usize = 2;
const SHOW_ARTIST: usize = 3;
const SHOW_VENUE_ID: usize = 4;
const SHOW_TOUR: usize = 5;
const SHOW_SOUNDCHECK: usize = 6;
const SHOW_VENUE: usize = 7;
const SHOW_CITY: usize = 8;
const SHOW_STATE: usize = 9;
const SHOW_COUNTRY: usize = 10;

/// The "set once" show details.
#[derive(Clone, Debug)]
pub(crate) struct ShowForm {
    pub(crate) fields: FieldSet,
}

impl ShowForm {
    pub(crate) fn from_show(show: &ShowDetails) -> Self {
        let set_types = vec![SetType::Type1.to_string(), SetType::Type2.to_string()];
        let set_index = match show.set_type {
            SetType::Type1 => 0,
            SetType::Type2 => 1,
        };
        Self {
            fields: FieldSet::new(vec![
                Field::text("Show Date", show.show_date.format("%Y-%m-%d").to_string(), true),
                Field::text("Show Title", show.show_title.clone(), false),
                Field::choice("Set Type", set_types, set_index),
                Field::text("Artist", show.artist.clone(), true),
                Field::text("Venue ID", show.venue_id.clone(), false),
                Field::text("Tour Name", show.tour_name.clone(), false),
                Field::toggle("Soundcheck?", show.soundcheck),
                Field::text("Venue Name", show.venue_name.clone(), false),
                Field::text("City", show.city.clone(), false),
                Field::text("State", show.state.clone(), false),
                Field::text("Country", show.country.clone(), false),
            ]),
        }
    }

    pub(crate) fn parse_inputs(&self) -> Result<ShowDetails> {
        let f = &self.fields;
        let date_raw = f.text(SHOW_DATE).trim();
        let show_date = NaiveDate::parse_from_str(date_raw, "%Y-%m-%d")
            .map_err(|_| anyhow!("Show date {date_raw:?} must be YYYY-MM-DD."))?;
        let artist = f.text(SHOW_ARTIST).trim();
        if artist.is_empty() {
            return Err(anyhow!("Artist is required."));
        }
        Ok(ShowDetails {
            show_date,
            show_title: f.text(SHOW_TITLE).trim().to_string(),
            set_type: if f.choice(SHOW_SET_TYPE) == 1 {
                SetType::Type2
            } else {
                SetType::Type1
            },
            artist: artist.to_string(),
            venue_id: f.text(SHOW_VENUE_ID).trim().to_string(),
            tour_name: f.text(SHOW_TOUR).trim().to_string(),
            soundcheck: f.flag(SHOW_SOUNDCHECK),
            venue_name: f.text(SHOW_VENUE).trim().to_string(),
            city: f.text(SHOW_CITY).trim().to_string(),
            state: f.text(SHOW_STATE).trim().to_string(),
            country: f.text(SHOW_COUNTRY).trim().to_string(),
        })
    }
}
