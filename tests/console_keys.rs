use chrono::NaiveTime;
use crossterm::event::KeyCode;
use setlist_console::{
    build_catalog, parse_catalog_response, App, RecorderState, Session, ShowDetails, Transition,
};

const BODY: &str = r#"{"data": [
    {"album_title": "Polygondwanaland", "song_name": "Crumbling Castle", "islive": 0},
    {"album_title": "Butterfly 3000", "song_name": "Magenta Mountain", "islive": 0},
    {"album_title": "Butterfly 3000", "song_name": "Yours", "islive": 0}
]}"#;

fn app() -> App {
    let catalog = build_catalog(parse_catalog_response(BODY).unwrap());
    App::new(Session::new(catalog), ShowDetails::new("King Gizzard & the Lizard Wizard"))
}

fn press(app: &mut App, code: KeyCode) -> bool {
    app.handle_key(code).unwrap()
}

fn type_text(app: &mut App, text: &str) {
    for ch in text.chars() {
        press(app, KeyCode::Char(ch));
    }
}

fn backspace(app: &mut App, count: usize) {
    for _ in 0..count {
        press(app, KeyCode::Backspace);
    }
}

/// Open the details form, move to Track Time, and pin it.
fn set_track_time(app: &mut App, time: &str) {
    press(app, KeyCode::Char('d'));
    press(app, KeyCode::Tab);
    backspace(app, 8);
    type_text(app, time);
    press(app, KeyCode::Enter);
}

fn t(text: &str) -> NaiveTime {
    NaiveTime::parse_from_str(text, "%H:%M:%S").unwrap()
}

#[test]
fn starts_on_first_song_of_first_album() {
    let app = app();
    assert_eq!(app.selected_song(), Some("Magenta Mountain"));
}

#[test]
fn song_picker_filters_and_selects() {
    let mut app = app();
    press(&mut app, KeyCode::Char('s'));
    type_text(&mut app, "your");
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.selected_song(), Some("Yours"));

    press(&mut app, KeyCode::Char('a'));
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Enter);
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.selected_song(), Some("Crumbling Castle"));
}

#[test]
fn start_and_segue_from_the_keyboard() {
    let mut app = app();
    set_track_time(&mut app, "19:00:00");
    press(&mut app, KeyCode::Enter);
    assert!(app.session().is_in_progress());
    assert_eq!(app.session().current_song(), Some("Magenta Mountain"));
    assert_eq!(app.session().current_start_time(), Some(t("19:00:00")));

    set_track_time(&mut app, "19:08:15");
    press(&mut app, KeyCode::Char('g'));

    let session = app.session();
    assert_eq!(session.state(), RecorderState::Idle);
    assert_eq!(session.position_counter(), 2);
    let entry = &session.setlist()[0];
    assert_eq!(entry.position(), 1);
    assert_eq!(entry.duration_label(), "495 seconds");
    assert_eq!(entry.transition, Transition::Segue);
}

#[test]
fn bad_track_time_keeps_the_form_open() {
    let mut app = app();
    set_track_time(&mut app, "9:00");
    assert!(app.status_text().unwrap().contains("HH:MM:SS"));

    // Still in the form: Esc closes it without saving.
    press(&mut app, KeyCode::Esc);
    assert_eq!(app.status_text(), Some("Song details unchanged."));
    assert!(!app.session().is_in_progress());
}

#[test]
fn transition_while_idle_is_reported() {
    let mut app = app();
    press(&mut app, KeyCode::Char('f'));
    assert_eq!(app.status_text(), Some("No song in progress."));
    assert!(app.session().setlist().is_empty());
}

#[test]
fn edit_start_time_of_song_in_progress() {
    let mut app = app();
    set_track_time(&mut app, "20:15:00");
    press(&mut app, KeyCode::Enter);

    press(&mut app, KeyCode::Char('e'));
    backspace(&mut app, 8);
    type_text(&mut app, "20:14:30");
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.session().current_start_time(), Some(t("20:14:30")));

    press(&mut app, KeyCode::Char('e'));
    backspace(&mut app, 8);
    type_text(&mut app, "nonsense");
    press(&mut app, KeyCode::Esc);
    assert_eq!(app.session().current_start_time(), Some(t("20:14:30")));
}

#[test]
fn edit_previous_song_from_setlist_screen() {
    let mut app = app();
    set_track_time(&mut app, "19:00:00");
    press(&mut app, KeyCode::Enter);
    set_track_time(&mut app, "19:08:15");
    press(&mut app, KeyCode::Char('f'));

    press(&mut app, KeyCode::Char('l'));
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.session().selected_edit_index(), Some(0));

    press(&mut app, KeyCode::Tab);
    backspace(&mut app, 8);
    type_text(&mut app, "19:01:00");
    press(&mut app, KeyCode::Enter);

    let entry = &app.session().setlist()[0];
    assert_eq!(entry.duration_label(), "435 seconds");
    assert_eq!(entry.position(), 1);
    assert_eq!(app.session().selected_edit_index(), None);
    assert_eq!(app.status_text(), Some("Updated 1. Magenta Mountain."));

    press(&mut app, KeyCode::Esc);
    assert!(!press(&mut app, KeyCode::Char('q')));
    assert!(press(&mut app, KeyCode::Char('y')));
}

#[test]
fn quits_at_once_with_nothing_recorded() {
    let mut app = app();
    assert!(!press(&mut app, KeyCode::Esc));
    assert!(press(&mut app, KeyCode::Char('q')));
}

#[test]
fn repeated_esc_never_drops_the_setlist() {
    let mut app = app();
    set_track_time(&mut app, "19:00:00");
    press(&mut app, KeyCode::Enter);
    set_track_time(&mut app, "19:08:15");
    press(&mut app, KeyCode::Char('f'));

    press(&mut app, KeyCode::Char('d'));
    assert!(!press(&mut app, KeyCode::Esc));
    assert!(!press(&mut app, KeyCode::Esc));
    assert!(!press(&mut app, KeyCode::Esc));
    assert_eq!(app.session().setlist().len(), 1);
}

#[test]
fn quit_asks_first_while_a_song_is_playing() {
    let mut app = app();
    set_track_time(&mut app, "19:00:00");
    press(&mut app, KeyCode::Enter);

    assert!(!press(&mut app, KeyCode::Char('q')));
    // Keys other than y/n leave the question open.
    assert!(!press(&mut app, KeyCode::Char('f')));
    assert!(app.session().is_in_progress());
    assert!(!press(&mut app, KeyCode::Char('n')));
    assert_eq!(app.status_text(), Some("Quit cancelled."));
    assert!(app.session().is_in_progress());

    press(&mut app, KeyCode::Char('v'));
    assert!(!press(&mut app, KeyCode::Char('q')));
    assert!(!press(&mut app, KeyCode::Esc));
    assert!(!press(&mut app, KeyCode::Char('q')));
    assert!(press(&mut app, KeyCode::Char('Y')));
}

#[test]
fn show_details_are_editable() {
    let mut app = app();
    press(&mut app, KeyCode::Char('i'));
    for _ in 0..8 {
        press(&mut app, KeyCode::Tab);
    }
    type_text(&mut app, "Morrison");
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.show().city, "Morrison");
}
