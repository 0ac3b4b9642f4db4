use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use tracing::{debug, warn};

use crate::error::SetlistError;
use crate::models::{ShowDetails, Transition};
use crate::recorder::Session;
use crate::timecode::{format_optional, format_time, now, now_text, seconds_between};
use crate::timeline::{group_by_set, project};

use super::forms::{DetailsForm, EntryForm, FieldSet, ShowForm, SongDetails, TimeForm};
use super::helpers::{centered_rect, clock_span, duration_bar, surface_error};
use super::screens::{PickerState, SetlistScreen, TimelineScreen};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
const HEADER_HEIGHT: u16 = 3;
/// Rows for the song details and now-playing panels.
const DETAILS_HEIGHT: u16 = 11;

/// Top-level views.
enum Screen {
    Console,
    Setlist(SetlistScreen),
    Timeline(TimelineScreen),
}

/// Modal state layered over the current screen.
enum Mode {
    Normal,
    PickingAlbum(PickerState),
    PickingSong(PickerState),
    EditingDetails(DetailsForm),
    EditingStartTime(TimeForm),
    EditingEntry { index: usize, form: EntryForm },
    EditingShow(ShowForm),
    /// Quitting would drop recorded entries or a song in progress.
    ConfirmingQuit,
}

/// What a key press meant to an open form.
enum FormKey {
    Submit,
    Cancel,
    Handled,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
#[derive(Clone, Copy, PartialEq, Eq)]
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state: the recorder session plus everything the
/// console needs to drive it.
pub struct App {
    session: Session,
    show: ShowDetails,
    details: SongDetails,
    selected_album: Option<String>,
    selected_song: Option<String>,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(session: Session, show: ShowDetails) -> Self {
        let selected_album = session.catalog().album_at(0).map(str::to_string);
        let selected_song = selected_album
            .as_deref()
            .and_then(|album| session.catalog().songs(album).first().cloned());
        Self {
            session,
            show,
            details: SongDetails::default(),
            selected_album,
            selected_song,
            screen: Screen::Console,
            mode: Mode::Normal,
            status: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn show(&self) -> &ShowDetails {
        &self.show
    }

    pub fn selected_song(&self) -> Option<&str> {
        self.selected_song.as_deref()
    }

    pub fn status_text(&self) -> Option<&str> {
        self.status.as_ref().map(|s| s.text.as_str())
    }

    /// Put an error in the footer, e.g. a failed catalog fetch at start-up.
    pub fn report_error(&mut self, message: impl Into<String>) {
        self.set_status(message, StatusKind::Error);
    }

    /// Handle one key press. Returns `Ok(true)` when the user asked to quit;
    /// an `Err` means the session cannot continue.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::PickingAlbum(picker) => self.handle_album_picker(code, picker),
            Mode::PickingSong(picker) => self.handle_song_picker(code, picker),
            Mode::EditingDetails(form) => self.handle_details_form(code, form),
            Mode::EditingStartTime(form) => self.handle_start_time_form(code, form),
            Mode::EditingEntry { index, form } => self.handle_entry_form(code, index, form)?,
            Mode::EditingShow(form) => self.handle_show_form(code, form),
            Mode::ConfirmingQuit => self.handle_confirm_quit(code, &mut exit),
        };

        Ok(exit)
    }

    /// Ctrl+T pins the track time to the current second.
    pub(crate) fn handle_ctrl_t(&mut self) {
        if !matches!(self.mode, Mode::Normal) {
            return;
        }
        self.details.track_time = now_text();
        let message = format!("Track time pinned to {}.", self.details.track_time);
        self.set_status(message, StatusKind::Info);
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match self.screen {
            Screen::Console => Ok(self.handle_console_key(code, exit)),
            Screen::Setlist(_) => self.handle_setlist_key(code, exit),
            Screen::Timeline(_) => Ok(self.handle_timeline_key(code, exit)),
        }
    }

    fn handle_console_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') => return self.request_quit(exit),
            KeyCode::Char('a') | KeyCode::Char('A') => {
                if self.session.catalog().is_empty() {
                    self.set_status("No albums loaded.", StatusKind::Error);
                } else {
                    self.clear_status();
                    let albums = self.session.catalog().albums().map(str::to_string).collect();
                    let picker = PickerState::new("Select Album", albums)
                        .with_current(self.selected_album.as_deref());
                    return Mode::PickingAlbum(picker);
                }
            }
            KeyCode::Char('s') | KeyCode::Char('S') => match self.selected_album.clone() {
                Some(album) => {
                    self.clear_status();
                    return Mode::PickingSong(self.song_picker(&album));
                }
                None => self.set_status("Select an album first.", StatusKind::Error),
            },
            KeyCode::Char('d') | KeyCode::Char('D') => {
                self.clear_status();
                return Mode::EditingDetails(DetailsForm::from_details(&self.details));
            }
            KeyCode::Char('i') | KeyCode::Char('I') => {
                self.clear_status();
                return Mode::EditingShow(ShowForm::from_show(&self.show));
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.details.track_time.clear();
                self.set_status("Track time follows the clock.", StatusKind::Info);
            }
            KeyCode::Enter | KeyCode::Char('b') | KeyCode::Char('B') => self.start_song(),
            KeyCode::Char('f') | KeyCode::Char('F') => self.record(Transition::FinishSong),
            KeyCode::Char('g') | KeyCode::Char('G') => self.record(Transition::Segue),
            KeyCode::Char('m') | KeyCode::Char('M') => self.record(Transition::SmoothSegue),
            KeyCode::Char('x') | KeyCode::Char('X') => self.record(self.details.transition),
            KeyCode::Char('e') | KeyCode::Char('E') => {
                if self.session.is_in_progress() {
                    self.clear_status();
                    let current = format_optional(self.session.current_start_time());
                    return Mode::EditingStartTime(TimeForm::new("Start Time", current));
                }
                self.set_status("No song in progress.", StatusKind::Error);
            }
            KeyCode::Char('l') | KeyCode::Char('L') => {
                self.clear_status();
                let mut screen = SetlistScreen::default();
                let len = self.session.setlist().len();
                screen.selected = self.session.selected_edit_index().unwrap_or(len.saturating_sub(1));
                screen.ensure_in_bounds(len);
                self.screen = Screen::Setlist(screen);
            }
            KeyCode::Char('v') | KeyCode::Char('V') => {
                self.clear_status();
                self.screen = Screen::Timeline(TimelineScreen::default());
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_setlist_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        let len = self.session.setlist().len();
        let Screen::Setlist(screen) = &mut self.screen else {
            return Ok(Mode::Normal);
        };
        match code {
            KeyCode::Char('q') => return Ok(self.request_quit(exit)),
            KeyCode::Esc | KeyCode::Char('l') | KeyCode::Char('L') => {
                self.session.clear_selection();
                self.screen = Screen::Console;
            }
            KeyCode::Up => screen.move_selection(-1, len),
            KeyCode::Down => screen.move_selection(1, len),
            KeyCode::PageUp => screen.move_selection(-5, len),
            KeyCode::PageDown => screen.move_selection(5, len),
            KeyCode::Home => screen.selected = 0,
            KeyCode::End => screen.selected = len.saturating_sub(1),
            KeyCode::Enter | KeyCode::Char('e') | KeyCode::Char('E') => {
                if len == 0 {
                    self.set_status("No songs in the setlist.", StatusKind::Error);
                } else {
                    let index = screen.selected;
                    let entry = self.session.select_entry(index)?;
                    let form = EntryForm::from_entry(entry);
                    self.clear_status();
                    return Ok(Mode::EditingEntry { index, form });
                }
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_timeline_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        let len = project(self.session.setlist()).len();
        let Screen::Timeline(screen) = &mut self.screen else {
            return Mode::Normal;
        };
        match code {
            KeyCode::Char('q') => return self.request_quit(exit),
            KeyCode::Esc | KeyCode::Char('v') | KeyCode::Char('V') => {
                self.screen = Screen::Console;
            }
            KeyCode::Up => screen.move_selection(-1, len),
            KeyCode::Down => screen.move_selection(1, len),
            _ => {}
        }
        Mode::Normal
    }

    fn handle_album_picker(&mut self, code: KeyCode, mut picker: PickerState) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Album selection cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Enter => {
                if let Some(album) = picker.current().map(str::to_string) {
                    debug!(album = %album, "album selected");
                    let songs = self.session.catalog().songs(&album);
                    self.selected_song = songs.first().cloned();
                    let song_picker = self.song_picker(&album);
                    self.selected_album = Some(album);
                    return Mode::PickingSong(song_picker);
                }
            }
            other => route_picker_key(&mut picker, other),
        }
        Mode::PickingAlbum(picker)
    }

    fn handle_song_picker(&mut self, code: KeyCode, mut picker: PickerState) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Song selection cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Enter => {
                if let Some(song) = picker.current().map(str::to_string) {
                    debug!(song = %song, "song selected");
                    self.set_status(format!("Selected {song}."), StatusKind::Info);
                    self.selected_song = Some(song);
                    return Mode::Normal;
                }
            }
            other => route_picker_key(&mut picker, other),
        }
        Mode::PickingSong(picker)
    }

    fn handle_details_form(&mut self, code: KeyCode, mut form: DetailsForm) -> Mode {
        match route_form_key(&mut form.fields, code) {
            FormKey::Cancel => {
                self.set_status("Song details unchanged.", StatusKind::Info);
                Mode::Normal
            }
            FormKey::Submit => match form.parse_inputs() {
                Ok(details) => {
                    self.details = details;
                    self.set_status("Song details saved.", StatusKind::Info);
                    Mode::Normal
                }
                Err(err) => {
                    self.form_error(&mut form.fields, &err);
                    Mode::EditingDetails(form)
                }
            },
            FormKey::Handled => Mode::EditingDetails(form),
        }
    }

    fn handle_start_time_form(&mut self, code: KeyCode, mut form: TimeForm) -> Mode {
        match route_form_key(&mut form.fields, code) {
            FormKey::Cancel => {
                self.set_status("Start time unchanged.", StatusKind::Info);
                Mode::Normal
            }
            FormKey::Submit => match self.session.edit_start_time(form.value().trim()) {
                Ok(true) => {
                    let message = format!(
                        "Start time changed to {}.",
                        format_optional(self.session.current_start_time())
                    );
                    self.set_status(message, StatusKind::Info);
                    Mode::Normal
                }
                Ok(false) => {
                    self.set_status("No song in progress.", StatusKind::Error);
                    Mode::Normal
                }
                Err(err) => {
                    warn!(error = %err, "start time rejected");
                    self.form_error(&mut form.fields, &anyhow::Error::from(err));
                    Mode::EditingStartTime(form)
                }
            },
            FormKey::Handled => Mode::EditingStartTime(form),
        }
    }

    fn handle_entry_form(&mut self, code: KeyCode, index: usize, mut form: EntryForm) -> Result<Mode> {
        match route_form_key(&mut form.fields, code) {
            FormKey::Cancel => {
                self.session.clear_selection();
                self.set_status("Edit cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            FormKey::Submit => {
                let edit = match form.parse_inputs() {
                    Ok(edit) => edit,
                    Err(err) => {
                        self.form_error(&mut form.fields, &err);
                        return Ok(Mode::EditingEntry { index, form });
                    }
                };
                match self.session.edit_entry(index, edit) {
                    Ok(entry) => {
                        let message = format!("Updated {}.", entry.picker_label());
                        self.session.clear_selection();
                        self.set_status(message, StatusKind::Info);
                        Ok(Mode::Normal)
                    }
                    Err(err @ SetlistError::OutOfRange { .. }) => Err(err.into()),
                    Err(err) => {
                        self.form_error(&mut form.fields, &anyhow::Error::from(err));
                        Ok(Mode::EditingEntry { index, form })
                    }
                }
            }
            FormKey::Handled => Ok(Mode::EditingEntry { index, form }),
        }
    }

    fn handle_show_form(&mut self, code: KeyCode, mut form: ShowForm) -> Mode {
        match route_form_key(&mut form.fields, code) {
            FormKey::Cancel => {
                self.set_status("Show details unchanged.", StatusKind::Info);
                Mode::Normal
            }
            FormKey::Submit => match form.parse_inputs() {
                Ok(show) => {
                    self.show = show;
                    self.set_status("Show details saved.", StatusKind::Info);
                    Mode::Normal
                }
                Err(err) => {
                    self.form_error(&mut form.fields, &err);
                    Mode::EditingShow(form)
                }
            },
            FormKey::Handled => Mode::EditingShow(form),
        }
    }

    /// Quit straight away only when there is nothing to lose.
    fn request_quit(&mut self, exit: &mut bool) -> Mode {
        if self.session.setlist().is_empty() && !self.session.is_in_progress() {
            *exit = true;
            return Mode::Normal;
        }
        self.clear_status();
        Mode::ConfirmingQuit
    }

    fn handle_confirm_quit(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                *exit = true;
                Mode::Normal
            }
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Quit cancelled.", StatusKind::Info);
                Mode::Normal
            }
            _ => Mode::ConfirmingQuit,
        }
    }

    fn start_song(&mut self) {
        let Some(song) = self.selected_song.clone() else {
            self.set_status("Select a song first.", StatusKind::Error);
            return;
        };
        let time = self.details.effective_track_time(now_text);
        match self.session.start_song(&song, &time) {
            Ok(true) => {
                self.details.track_time.clear();
                self.set_status(format!("Started {song} at {time}."), StatusKind::Info);
            }
            Ok(false) => {
                let current = self.session.current_song().unwrap_or_default().to_string();
                self.set_status(format!("{current} is already in progress."), StatusKind::Error);
            }
            Err(err) => {
                warn!(error = %err, song = %song, "start rejected");
                self.set_status(err.to_string(), StatusKind::Error);
            }
        }
    }

    fn record(&mut self, transition: Transition) {
        if !self.session.is_in_progress() {
            self.set_status("No song in progress.", StatusKind::Error);
            return;
        }
        let time = self.details.effective_track_time(now_text);
        let metadata = self.details.metadata();
        match self.session.record_transition(transition, &time, metadata) {
            Ok(Some(entry)) => {
                let message = format!("Recorded {}", entry.listing_line());
                self.details.reset_after_record();
                self.set_status(message, StatusKind::Info);
            }
            Ok(None) => self.set_status("No song in progress.", StatusKind::Error),
            Err(err) => {
                warn!(error = %err, %transition, "transition rejected");
                self.set_status(err.to_string(), StatusKind::Error);
            }
        }
    }

    fn song_picker(&self, album: &str) -> PickerState {
        let songs = self.session.catalog().songs(album).to_vec();
        PickerState::new(format!("Select Song - {album}"), songs)
            .with_current(self.selected_song.as_deref())
    }

    fn form_error(&mut self, fields: &mut FieldSet, err: &anyhow::Error) {
        let message = surface_error(err);
        fields.error = Some(message.clone());
        self.set_status(message, StatusKind::Error);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Console => self.draw_console(frame, content_area),
            Screen::Setlist(screen) => self.draw_setlist(frame, content_area, screen),
            Screen::Timeline(screen) => self.draw_timeline(frame, content_area, screen),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::PickingAlbum(picker) | Mode::PickingSong(picker) => {
                self.draw_picker(frame, area, picker)
            }
            Mode::EditingDetails(form) => self.draw_form(frame, area, "Song Details", &form.fields),
            Mode::EditingStartTime(form) => {
                self.draw_form(frame, area, "Edit Start Time", &form.fields)
            }
            Mode::EditingEntry { form, .. } => {
                let title = format!("Edit Song #{}", form.position);
                self.draw_form(frame, area, &title, &form.fields)
            }
            Mode::EditingShow(form) => self.draw_form(frame, area, "Show Details", &form.fields),
            Mode::ConfirmingQuit => self.draw_confirm_quit(frame, area),
            Mode::Normal => {}
        }
    }

    fn draw_console(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Length(DETAILS_HEIGHT),
                Constraint::Min(0),
            ])
            .split(area);

        let header = Paragraph::new(self.show.headline())
            .block(Block::default().borders(Borders::ALL).title("Setlist Console"))
            .alignment(Alignment::Center);
        frame.render_widget(header, chunks[0]);

        let panels = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[1]);
        self.draw_song_details(frame, panels[0]);
        self.draw_now_playing(frame, panels[1]);
        self.draw_live_setlist(frame, chunks[2]);
    }

    fn draw_song_details(&self, frame: &mut Frame, area: Rect) {
        let label = Style::default().fg(Color::Gray);
        let muted = Style::default().fg(Color::DarkGray);
        let d = &self.details;
        let track_time = if d.track_time.is_empty() {
            Span::styled(format!("{} (live)", now_text()), muted)
        } else {
            Span::styled(d.track_time.clone(), Style::default().fg(Color::Yellow))
        };
        let yes_no = |flag: bool| if flag { "yes" } else { "no" };

        let lines = vec![
            Line::from(vec![
                Span::styled("Album: ", label),
                Span::raw(self.selected_album.clone().unwrap_or_else(|| "None".to_string())),
            ]),
            Line::from(vec![
                Span::styled("Song: ", label),
                Span::styled(
                    self.selected_song.clone().unwrap_or_else(|| "None".to_string()),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::styled("Set Number: ", label),
                Span::raw(d.set_number.to_string()),
                Span::styled("   Next Position: ", label),
                Span::raw(self.session.position_counter().to_string()),
            ]),
            Line::from(vec![Span::styled("Track Time: ", label), track_time]),
            Line::from(vec![
                Span::styled("Transition: ", label),
                Span::raw(d.transition.label()),
            ]),
            Line::from(vec![Span::styled("Footnote: ", label), Span::raw(d.footnote.clone())]),
            Line::from(vec![
                Span::styled("Jamchart: ", label),
                Span::raw(yes_no(d.is_jamchart)),
                Span::styled("   Jam: ", label),
                Span::raw(yes_no(d.is_jam)),
            ]),
            Line::from(vec![
                Span::styled("Jamchart Notes: ", label),
                Span::raw(d.jamchart_notes.clone()),
            ]),
        ];

        let block = Block::default().borders(Borders::ALL).title("Song Details");
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_now_playing(&self, frame: &mut Frame, area: Rect) {
        let label = Style::default().fg(Color::Gray);
        let session = &self.session;
        let in_progress = session.is_in_progress();

        let current = session
            .current_song()
            .or(self.selected_song.as_deref())
            .unwrap_or("None")
            .to_string();
        let start = if in_progress {
            format_optional(session.current_start_time())
        } else {
            "Not Started".to_string()
        };
        let end = session
            .current_end_time()
            .map(format_time)
            .unwrap_or_else(|| "Not Ended".to_string());
        let elapsed = match (in_progress, session.current_start_time()) {
            (true, Some(start)) => clock_span(seconds_between(start, now())),
            _ => "-".to_string(),
        };
        let (state_text, state_style) = if in_progress {
            ("IN PROGRESS", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        } else {
            ("IDLE", Style::default().fg(Color::DarkGray))
        };
        let catalog = if session.catalog().is_empty() {
            "not loaded".to_string()
        } else {
            format!("{} albums", session.catalog().album_count())
        };

        let lines = vec![
            Line::from(Span::styled(state_text, state_style)),
            Line::from(vec![
                Span::styled("Current Song: ", label),
                Span::styled(current, Style::default().add_modifier(Modifier::BOLD)),
            ]),
            Line::from(vec![Span::styled("Start Time: ", label), Span::raw(start)]),
            Line::from(vec![Span::styled("Elapsed: ", label), Span::raw(elapsed)]),
            Line::from(vec![Span::styled("End Time: ", label), Span::raw(end)]),
            Line::from(""),
            Line::from(vec![Span::styled("Catalog: ", label), Span::raw(catalog)]),
        ];

        let block = Block::default().borders(Borders::ALL).title("Now");
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_live_setlist(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Live Setlist");
        let inner_height = block.inner(area).height as usize;
        let listing = self.session.listing();
        if listing.is_empty() {
            let message = Paragraph::new("No songs in the setlist.")
                .block(block)
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(message, area);
            return;
        }

        // Keep the newest lines visible.
        let skip = listing.len().saturating_sub(inner_height);
        let lines: Vec<Line> = listing
            .into_iter()
            .skip(skip)
            .map(|line| {
                if line.starts_with("Footnote: ") {
                    Line::from(Span::styled(format!("   {line}"), Style::default().fg(Color::Gray)))
                } else {
                    Line::from(line)
                }
            })
            .collect();
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_setlist(&self, frame: &mut Frame, area: Rect, screen: &SetlistScreen) {
        let setlist = self.session.setlist();
        let outer = Block::default().borders(Borders::ALL).title("Edit Previous Songs");
        if setlist.is_empty() {
            let message = Paragraph::new("No songs in the setlist.")
                .alignment(Alignment::Center)
                .block(outer)
                .wrap(Wrap { trim: true });
            frame.render_widget(message, area);
            return;
        }

        let panels = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(area);

        let items: Vec<ListItem> = setlist
            .iter()
            .map(|entry| ListItem::new(entry.picker_label()))
            .collect();
        let list = List::new(items)
            .block(outer)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        state.select(Some(screen.selected.min(setlist.len() - 1)));
        frame.render_stateful_widget(list, panels[0], &mut state);

        let entry = &setlist[screen.selected.min(setlist.len() - 1)];
        let label = Style::default().fg(Color::Gray);
        let flags = [("Jamchart", entry.is_jamchart), ("Jam", entry.is_jam)]
            .iter()
            .filter(|(_, on)| *on)
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(", ");
        let lines = vec![
            Line::from(Span::styled(
                entry.song_name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![
                Span::styled("Position: ", label),
                Span::raw(entry.position().to_string()),
                Span::styled("   Set: ", label),
                Span::raw(entry.set_number.to_string()),
            ]),
            Line::from(vec![
                Span::styled("Start: ", label),
                Span::raw(format_optional(entry.start_time)),
                Span::styled("   End: ", label),
                Span::raw(format_optional(entry.end_time)),
            ]),
            Line::from(vec![Span::styled("Duration: ", label), Span::raw(entry.duration_label())]),
            Line::from(vec![
                Span::styled("Transition: ", label),
                Span::raw(entry.transition.label()),
            ]),
            Line::from(vec![
                Span::styled("Footnote: ", label),
                Span::raw(entry.footnote.clone().unwrap_or_default()),
            ]),
            Line::from(vec![
                Span::styled("Flags: ", label),
                Span::raw(if flags.is_empty() { "-".to_string() } else { flags }),
            ]),
            Line::from(vec![
                Span::styled("Jamchart Notes: ", label),
                Span::raw(entry.jamchart_notes.clone().unwrap_or_default()),
            ]),
        ];
        let detail = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Entry"))
            .wrap(Wrap { trim: true });
        frame.render_widget(detail, panels[1]);
    }

    fn draw_timeline(&self, frame: &mut Frame, area: Rect, screen: &TimelineScreen) {
        let events = project(self.session.setlist());
        let block = Block::default().borders(Borders::ALL).title("Timeline");
        if events.is_empty() {
            let message = Paragraph::new("No timed songs yet.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(4)])
            .split(area);

        let inner_width = block.inner(chunks[0]).width as usize;
        let bar_width = inner_width.saturating_sub(48).max(4);
        let longest = events.iter().map(|e| e.seconds()).max().unwrap_or(0);
        let selected = screen.selected.min(events.len() - 1);

        let mut lines = Vec::new();
        let mut index = 0usize;
        for (set, members) in group_by_set(&events) {
            lines.push(Line::from(Span::styled(
                format!("Set {set}"),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )));
            for event in members {
                let style = if index == selected {
                    Style::default().add_modifier(Modifier::REVERSED)
                } else {
                    Style::default()
                };
                lines.push(Line::from(vec![
                    Span::styled(
                        format!(
                            "  {}-{} ",
                            format_time(event.start),
                            format_time(event.end)
                        ),
                        Style::default().fg(Color::Gray),
                    ),
                    Span::styled(
                        format!("{:<width$} ", duration_bar(event.seconds(), longest, bar_width), width = bar_width),
                        Style::default().fg(Color::Green),
                    ),
                    Span::styled(
                        format!("{} ({})", event.headline, clock_span(event.seconds())),
                        style,
                    ),
                ]));
                index += 1;
            }
        }
        frame.render_widget(Paragraph::new(lines).block(block), chunks[0]);

        let body = Paragraph::new(events[selected].body.replace(" / ", "\n"))
            .block(Block::default().borders(Borders::ALL).title(events[selected].headline.clone()));
        frame.render_widget(body, chunks[1]);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let keys: &[(&'static str, &'static str)] = match (&self.screen, &self.mode) {
            (_, Mode::PickingAlbum(_)) | (_, Mode::PickingSong(_)) => &[
                ("[↑↓]", "Navigate"),
                ("[type]", "Filter"),
                ("[Enter]", "Select"),
                ("[Esc]", "Cancel"),
            ],
            (_, Mode::EditingStartTime(_)) => &[("[Enter]", "Confirm"), ("[Esc]", "Cancel")],
            (_, Mode::ConfirmingQuit) => &[("[y]", "Quit"), ("[n/Esc]", "Stay")],
            (_, Mode::EditingEntry { .. }) => &[
                ("[Tab]", "Next Field"),
                ("[←→/Space]", "Change"),
                ("[Enter]", "Save Changes"),
                ("[Esc]", "Cancel"),
            ],
            (_, Mode::EditingDetails(_)) | (_, Mode::EditingShow(_)) => &[
                ("[Tab]", "Next Field"),
                ("[←→/Space]", "Change"),
                ("[Enter]", "Save"),
                ("[Esc]", "Cancel"),
            ],
            (Screen::Setlist(_), _) => &[
                ("[↑↓]", "Select"),
                ("[Enter]", "Edit"),
                ("[Esc]", "Back"),
                ("[q]", "Quit"),
            ],
            (Screen::Timeline(_), _) => &[("[↑↓]", "Select"), ("[Esc]", "Back"), ("[q]", "Quit")],
            (Screen::Console, _) => &[
                ("[a/s]", "Album/Song"),
                ("[d]", "Details"),
                ("[Enter]", "Start"),
                ("[f]", "Finish"),
                ("[g]", "Segue"),
                ("[m]", "Smooth"),
                ("[x]", "Transition"),
                ("[e]", "Edit Start"),
                ("[^T/n]", "Pin/Live Time"),
                ("[l]", "Edit Songs"),
                ("[v]", "Timeline"),
                ("[i]", "Show"),
                ("[q]", "Quit"),
            ],
        };

        let mut spans = Vec::with_capacity(keys.len() * 2);
        for (key, action) in keys {
            spans.push(Span::styled(*key, key_style));
            spans.push(Span::raw(format!(" {action}   ")));
        }
        Line::from(spans)
    }

    fn draw_picker(&self, frame: &mut Frame, area: Rect, picker: &PickerState) {
        let popup_area = centered_rect(60, 70, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(picker.title.clone())
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(inner);

        let filter_line = Line::from(vec![
            Span::styled("Filter: ", Style::default().fg(Color::Gray)),
            Span::styled(picker.filter.clone(), Style::default().fg(Color::Yellow)),
        ]);
        frame.render_widget(Paragraph::new(filter_line), chunks[0]);

        let items: Vec<ListItem> = picker
            .visible_items()
            .map(|item| ListItem::new(item.to_string()))
            .collect();
        if items.is_empty() {
            frame.render_widget(
                Paragraph::new("No matches.").style(Style::default().fg(Color::DarkGray)),
                chunks[1],
            );
        } else {
            let list = List::new(items)
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
                .highlight_symbol("> ");
            let mut state = ListState::default();
            state.select(Some(picker.selected));
            frame.render_stateful_widget(list, chunks[1], &mut state);
        }

        let cursor_x = chunks[0].x + "Filter: ".len() as u16 + picker.filter.chars().count() as u16;
        frame.set_cursor_position((cursor_x, chunks[0].y));
    }

    fn draw_confirm_quit(&self, frame: &mut Frame, area: Rect) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Quit?").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let recorded = self.session.setlist().len();
        let mut lines = vec![Line::from(format!(
            "{recorded} recorded {} will be lost.",
            if recorded == 1 { "entry" } else { "entries" }
        ))];
        if let Some(song) = self.session.current_song().filter(|_| self.session.is_in_progress()) {
            lines.push(Line::from(format!("{song} is still in progress.")));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Press Y to quit or N / Esc to keep recording.",
            Style::default().fg(Color::Gray),
        )));

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect, title: &str, fields: &FieldSet) {
        let percent_y = if fields.len() > 4 { 70 } else { 30 };
        let popup_area = centered_rect(70, percent_y, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = fields.build_lines();
        lines.push(Line::from(""));
        if let Some(error) = &fields.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        frame.render_widget(Paragraph::new(lines), inner);

        if let Some((dx, dy)) = fields.cursor_offset() {
            frame.set_cursor_position((inner.x + dx, inner.y + dy));
        }
    }
}

/// Navigation and filter keys shared by the pickers.
fn route_picker_key(picker: &mut PickerState, code: KeyCode) {
    match code {
        KeyCode::Up => picker.move_selection(-1),
        KeyCode::Down => picker.move_selection(1),
        KeyCode::PageUp => picker.move_selection(-10),
        KeyCode::PageDown => picker.move_selection(10),
        KeyCode::Home => picker.select_first(),
        KeyCode::End => picker.select_last(),
        KeyCode::Backspace => picker.pop_filter(),
        KeyCode::Char(ch) => picker.push_filter(ch),
        _ => {}
    }
}

/// Editing keys shared by every modal form.
fn route_form_key(fields: &mut FieldSet, code: KeyCode) -> FormKey {
    match code {
        KeyCode::Esc => return FormKey::Cancel,
        KeyCode::Enter => return FormKey::Submit,
        KeyCode::Tab | KeyCode::Down => fields.next_field(),
        KeyCode::BackTab | KeyCode::Up => fields.previous_field(),
        KeyCode::Left => fields.cycle(-1),
        KeyCode::Right => fields.cycle(1),
        KeyCode::Backspace => fields.backspace(),
        KeyCode::Char(ch) => {
            fields.push_char(ch);
        }
        _ => {}
    }
    FormKey::Handled
}
