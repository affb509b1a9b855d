use calendar_events::{
    PersistenceError, Schedule, load_schedule_from_json, load_schedule_from_text,
    save_schedule_to_json, save_schedule_to_text,
};
use std::fs;
use tempfile::NamedTempFile;

fn build_sample_schedule() -> Schedule {
    Schedule::parse(
        "Mon..Fri *-*-* 09:30 Europe/Paris\n\
         Sat,Sun *-*-1,15 12:00\n\
         *-02-29 00:00:00 UTC\n\
         *-*-* *:0/15 America/New_York",
    )
    .unwrap()
}

#[test]
fn json_round_trip_preserves_schedule() {
    let schedule = build_sample_schedule();
    let file = NamedTempFile::new().unwrap();

    save_schedule_to_json(&schedule, file.path()).unwrap();
    let loaded = load_schedule_from_json(file.path()).unwrap();
    assert_eq!(loaded, schedule);

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(file.path()).unwrap()).unwrap();
    assert_eq!(
        json["expressions"][0],
        serde_json::json!("Mon..Fri *-*-* 09:30:00 Europe/Paris")
    );
}

#[test]
fn text_round_trip_writes_canonical_lines() {
    let schedule = build_sample_schedule();
    let file = NamedTempFile::new().unwrap();

    save_schedule_to_text(&schedule, file.path()).unwrap();
    let text = fs::read_to_string(file.path()).unwrap();
    assert_eq!(
        text,
        "Mon..Fri *-*-* 09:30:00 Europe/Paris\n\
         Sat,Sun *-*-01,15 12:00:00\n\
         *-02-29 00:00:00 UTC\n\
         *-*-* *:00/15:00 America/New_York\n"
    );

    let loaded = load_schedule_from_text(file.path()).unwrap();
    assert_eq!(loaded, schedule);
}

#[test]
fn hand_written_text_files_are_accepted() {
    let file = NamedTempFile::new().unwrap();
    fs::write(file.path(), "\nmonday 8:00 UTC\n\n*-*-1\n").unwrap();

    let loaded = load_schedule_from_text(file.path()).unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded.to_string(), "Mon *-*-* 08:00:00 UTC\n*-*-01 00:00:00");
}

#[test]
fn invalid_stored_expressions_are_reported() {
    let file = NamedTempFile::new().unwrap();
    fs::write(file.path(), "Mon 12:00 UTC\nMon 25:00 UTC\n").unwrap();
    match load_schedule_from_text(file.path()) {
        Err(PersistenceError::Parse(err)) => assert!(err.to_string().starts_with("parsing expression 1")),
        other => panic!("expected parse error, got {other:?}"),
    }

    fs::write(file.path(), r#"{"expressions": ["Mon 12:00 Mars/Olympus"]}"#).unwrap();
    assert!(matches!(
        load_schedule_from_json(file.path()),
        Err(PersistenceError::Serialization(_))
    ));
}

#[test]
fn missing_files_are_io_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    assert!(matches!(
        load_schedule_from_json(&missing),
        Err(PersistenceError::Io(_))
    ));
    assert!(matches!(
        load_schedule_from_text(&missing),
        Err(PersistenceError::Io(_))
    ));
}
