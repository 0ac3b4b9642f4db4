use chrono::NaiveTime;
use setlist_console::{
    build_catalog, load_catalog, parse_catalog_response, timeline, EntryEdit, EntryMetadata,
    RecorderState, Session, SetlistError, StaticCatalogSource, Transition,
};

const BODY: &str = r#"{"error": false, "data": [
    {"album_title": "Butterfly 3000", "song_name": "Yours", "islive": 0},
    {"album_title": "Butterfly 3000", "song_name": "Magenta Mountain", "islive": 0},
    {"album_title": "Live in Milwaukee", "song_name": "Magenta Mountain", "islive": 1},
    {"album_title": "Polygondwanaland", "song_name": "Crumbling Castle", "islive": 0}
]}"#;

fn t(text: &str) -> NaiveTime {
    NaiveTime::parse_from_str(text, "%H:%M:%S").unwrap()
}

fn session() -> Session {
    let entries = parse_catalog_response(BODY).unwrap();
    let (catalog, error) = load_catalog(&StaticCatalogSource::new(entries));
    assert!(error.is_none());
    Session::new(catalog)
}

#[test]
fn catalog_drops_live_albums_and_sorts_titles() {
    let catalog = build_catalog(parse_catalog_response(BODY).unwrap());
    assert_eq!(
        catalog.albums().collect::<Vec<_>>(),
        ["Butterfly 3000", "Polygondwanaland"]
    );
    assert_eq!(catalog.songs("Butterfly 3000"), ["Yours", "Magenta Mountain"]);
    assert!(catalog.songs("Live in Milwaukee").is_empty());
}

#[test]
fn segue_records_entry_and_returns_to_idle() {
    let mut session = session();
    assert!(session.start_song("Magenta Mountain", "19:00:00").unwrap());

    let entry = session
        .record_transition(Transition::Segue, "19:08:15", EntryMetadata::default())
        .unwrap()
        .cloned()
        .unwrap();

    assert_eq!(entry.position(), 1);
    assert_eq!(entry.start_time, Some(t("19:00:00")));
    assert_eq!(entry.end_time, Some(t("19:08:15")));
    assert_eq!(entry.duration_label(), "495 seconds");
    assert_eq!(entry.transition, Transition::Segue);
    assert_eq!(session.state(), RecorderState::Idle);
    assert_eq!(session.position_counter(), 2);
    assert_eq!(session.current_end_time(), Some(t("19:08:15")));
}

#[test]
fn full_set_with_edits_keeps_positions() {
    let mut session = session();
    let steps = [
        ("Yours", "20:15:00", "20:19:42", Transition::Segue),
        ("Magenta Mountain", "20:19:42", "20:31:00", Transition::SmoothSegue),
        ("Crumbling Castle", "20:31:05", "20:42:10", Transition::EndSet),
    ];
    for (song, start, end, transition) in steps {
        session.start_song(song, start).unwrap();
        session
            .record_transition(transition, end, EntryMetadata::default())
            .unwrap();
    }
    assert_eq!(session.setlist()[0].duration_label(), "282 seconds");

    session.select_entry(1).unwrap();
    session
        .edit_entry(
            1,
            EntryEdit {
                end_time: Some(None),
                footnote: Some(Some("with flute".to_string())),
                ..EntryEdit::default()
            },
        )
        .unwrap();

    let positions: Vec<u32> = session.setlist().iter().map(|e| e.position()).collect();
    assert_eq!(positions, [1, 2, 3]);
    assert_eq!(session.setlist()[1].duration_label(), "N/A");
    assert_eq!(session.setlist()[0].duration_label(), "282 seconds");

    let listing = session.listing();
    assert_eq!(listing[1], "2. Magenta Mountain (20:19:42-N/A [N/A]) - Smooth segue");
    assert_eq!(listing[2], "Footnote: with flute");

    let events = timeline::project(session.setlist());
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.headline != "Magenta Mountain"));

    session.start_song("Yours", "21:00:00").unwrap();
    session
        .record_transition(Transition::EndShow, "21:05:00", EntryMetadata::default())
        .unwrap();
    assert_eq!(session.setlist()[3].position(), 4);
}

#[test]
fn malformed_times_leave_session_untouched() {
    let mut session = session();
    assert!(matches!(
        session.start_song("Yours", "7:00 pm"),
        Err(SetlistError::Format(_))
    ));
    assert_eq!(session.state(), RecorderState::Idle);

    session.start_song("Yours", "19:00:00").unwrap();
    assert!(session.edit_start_time("19:60:00").is_err());
    assert_eq!(session.current_start_time(), Some(t("19:00:00")));
    assert!(session
        .record_transition(Transition::FinishSong, "", EntryMetadata::default())
        .is_err());
    assert!(session.is_in_progress());
    assert!(session.setlist().is_empty());
    assert_eq!(session.position_counter(), 1);
}

#[test]
fn out_of_range_selection_is_an_error() {
    let mut session = session();
    assert!(matches!(
        session.select_entry(0),
        Err(SetlistError::OutOfRange { index: 0, len: 0 })
    ));
    assert!(session.edit_entry(3, EntryEdit::default()).is_err());
}
