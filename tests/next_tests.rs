use calendar_events::{Expression, RolloverConfig};
use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
}

fn reference() -> DateTime<Utc> {
    utc(2006, 1, 2, 15, 4, 5)
}

fn next_utc(expression: &str, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
    Expression::parse(expression)
        .unwrap()
        .next(&from)
        .map(|found| found.with_timezone(&Utc))
}

#[test]
fn next_occurrence_scenarios() {
    let cases = [
        ("*-01-01 00:00:00 UTC", Some(utc(2007, 1, 1, 0, 0, 0))),
        ("*-*-01 00:00:00 UTC", Some(utc(2006, 2, 1, 0, 0, 0))),
        ("*-*-* 00:00:00 UTC", Some(utc(2006, 1, 3, 0, 0, 0))),
        ("2005-*-* 00:00:00 UTC", None),
        ("Mon 00:00:00 UTC", Some(utc(2006, 1, 9, 0, 0, 0))),
        ("Sun 00:00:00 UTC", Some(utc(2006, 1, 8, 0, 0, 0))),
        ("*-*-* 15:04:05 UTC", Some(utc(2006, 1, 3, 15, 4, 5))),
        ("*-*-* 15:04:06 UTC", Some(utc(2006, 1, 2, 15, 4, 6))),
        ("*-*-* *:0/15 UTC", Some(utc(2006, 1, 2, 15, 15, 0))),
        ("*-*-* *:*:* UTC", Some(utc(2006, 1, 2, 15, 4, 6))),
        ("2006-01-02 15:04:05 UTC", None),
    ];
    for (expression, expected) in cases {
        assert_eq!(
            next_utc(expression, reference()),
            expected,
            "expression {expression:?}"
        );
    }
}

#[test]
fn carries_through_every_unit_at_year_end() {
    let from = utc(2006, 12, 31, 23, 59, 59);
    assert_eq!(
        next_utc("*-*-* 23:59:59 UTC", from),
        Some(utc(2007, 1, 1, 23, 59, 59))
    );
    assert_eq!(
        next_utc("*-*-* *:*:* UTC", from),
        Some(utc(2007, 1, 1, 0, 0, 0))
    );
}

#[test]
fn february_29th_only_exists_in_leap_years() {
    assert_eq!(
        next_utc("*-02-29 00:00:00 UTC", utc(2021, 1, 1, 0, 0, 0)),
        Some(utc(2024, 2, 29, 0, 0, 0))
    );
    assert_eq!(
        next_utc("*-02-29 00:00:00 UTC", utc(2096, 3, 1, 0, 0, 0)),
        Some(utc(2104, 2, 29, 0, 0, 0))
    );
    // 2100 is not a leap year: the last day of February is the 28th.
    assert_eq!(
        next_utc("2100-02-28..29 12:00 UTC", utc(2100, 2, 28, 12, 0, 0)),
        None
    );
}

#[test]
fn days_beyond_the_month_roll_into_the_next_month() {
    assert_eq!(
        next_utc("*-*-31 UTC", utc(2006, 4, 5, 0, 0, 0)),
        Some(utc(2006, 5, 31, 0, 0, 0))
    );
    assert_eq!(
        next_utc("*-*-30,31 UTC", utc(2006, 2, 1, 0, 0, 0)),
        Some(utc(2006, 3, 30, 0, 0, 0))
    );
}

#[test]
fn weekday_filter_combines_with_dates() {
    // Friday the 13th.
    assert_eq!(
        next_utc("Fri *-*-13 UTC", utc(2024, 1, 1, 0, 0, 0)),
        Some(utc(2024, 9, 13, 0, 0, 0))
    );
    // Weekdays only: from a Saturday the next match is Monday.
    assert_eq!(
        next_utc("Mon..Fri 09:30 UTC", utc(2024, 3, 2, 12, 0, 0)),
        Some(utc(2024, 3, 4, 9, 30, 0))
    );
}

#[test]
fn no_occurrence_after_the_last_supported_year() {
    assert_eq!(next_utc("*-*-* UTC", utc(2199, 12, 31, 12, 0, 0)), None);
    assert_eq!(
        next_utc("*-*-* UTC", utc(2199, 12, 30, 12, 0, 0)),
        Some(utc(2199, 12, 31, 0, 0, 0))
    );
}

#[test]
fn instants_before_the_first_supported_year_start_in_1970() {
    assert_eq!(
        next_utc("*-*-* 06:00 UTC", utc(1960, 6, 1, 0, 0, 0)),
        Some(utc(1970, 1, 1, 6, 0, 0))
    );
}

#[test]
fn evaluates_in_the_expression_timezone() {
    let expression = Expression::parse("*-*-* 09:00 Europe/Paris").unwrap();
    let found = expression.next(&reference()).unwrap();
    assert_eq!(found.to_rfc3339(), "2006-01-03T09:00:00+01:00");
    assert_eq!(found.with_timezone(&Utc), utc(2006, 1, 3, 8, 0, 0));

    // The input instant's own offset does not matter.
    let from_paris = reference().with_timezone(&chrono_tz::Europe::Paris);
    assert_eq!(expression.next(&from_paris), Some(found));
}

#[test]
fn weekday_is_taken_from_the_local_date() {
    // 2006-01-08 23:30 UTC is already Monday in Tokyo.
    let found = next_utc("Mon 08:45 Asia/Tokyo", utc(2006, 1, 8, 23, 30, 0));
    assert_eq!(found, Some(utc(2006, 1, 8, 23, 45, 0)));
}

#[test]
fn wall_clock_times_skipped_by_dst_land_after_the_jump() {
    // Paris skips 02:00..03:00 on 2024-03-31.
    assert_eq!(
        next_utc("*-*-* 02:30 Europe/Paris", utc(2024, 3, 31, 0, 0, 0)),
        Some(utc(2024, 3, 31, 1, 30, 0))
    );
}

#[test]
fn repeated_wall_clock_times_pick_the_first_mapping_after_the_input() {
    // Paris repeats 02:00..03:00 on 2024-10-27 (00:00 to 02:00 UTC).
    assert_eq!(
        next_utc("*-*-* 02:30 Europe/Paris", utc(2024, 10, 27, 0, 0, 0)),
        Some(utc(2024, 10, 27, 0, 30, 0))
    );
    assert_eq!(
        next_utc("*-*-* 02:30 Europe/Paris", utc(2024, 10, 27, 1, 10, 0)),
        Some(utc(2024, 10, 27, 1, 30, 0))
    );
}

#[test]
fn results_are_strictly_after_and_match_the_expression() {
    let expression = Expression::parse("Tue,Thu *-1..6-10..20 7..9:15,45:30 UTC").unwrap();
    let mut from = utc(2010, 5, 17, 8, 15, 30);
    for _ in 0..50 {
        let found = expression.next(&from).unwrap().with_timezone(&Utc);
        assert!(found > from);
        assert!((1..=6).contains(&found.month()));
        assert!((10..=20).contains(&found.day()));
        assert!(expression.weekdays().contains_weekday(found.weekday()));
        assert!((7..=9).contains(&found.hour()));
        assert!([15, 45].contains(&found.minute()));
        assert_eq!(found.second(), 30);
        from = found;
    }
}

#[test]
fn occurrences_iterate_forward() {
    let expression = Expression::parse("*-*-* *:00/20 UTC").unwrap();
    let found: Vec<_> = expression
        .occurrences(&reference())
        .take(3)
        .map(|found| found.with_timezone(&Utc))
        .collect();
    assert_eq!(
        found,
        vec![
            utc(2006, 1, 2, 15, 20, 0),
            utc(2006, 1, 2, 15, 40, 0),
            utc(2006, 1, 2, 16, 0, 0),
        ]
    );

    let finite = Expression::parse("2006-01-02..03 12:00 UTC").unwrap();
    assert_eq!(finite.occurrences(&reference()).count(), 1);
}

#[test_log::test]
fn restart_ceiling_turns_into_not_found() {
    let expression = Expression::parse("Sun *-02-29 UTC").unwrap();
    let from = utc(2006, 1, 1, 0, 0, 0);

    // 2032-02-29 is the next leap day falling on a Sunday.
    assert_eq!(
        expression.next(&from).map(|found| found.with_timezone(&Utc)),
        Some(utc(2032, 2, 29, 0, 0, 0))
    );

    let tight = RolloverConfig { max_passes: 5 };
    assert_eq!(expression.next_with(&tight, &from), None);
}

#[test]
fn rollover_config_defaults_when_fields_are_missing() {
    let config: RolloverConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, RolloverConfig::default());
    let config: RolloverConfig = serde_json::from_str(r#"{"max_passes": 42}"#).unwrap();
    assert_eq!(config.max_passes, 42);
}
