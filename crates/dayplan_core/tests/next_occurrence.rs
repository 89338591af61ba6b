use chrono::{Datelike, Days, NaiveDate, Weekday};
use dayplan_core::{next_date, next_occurrence, parse_day, RecurrenceError, RecurrenceRule};

fn day(text: &str) -> NaiveDate {
    parse_day(text).unwrap()
}

fn next(now: &str, date: &str, rule: &str) -> String {
    next_date(day(now), date, rule).unwrap()
}

#[test]
fn anchor_after_now_is_returned_unchanged() {
    for rule in ["y", "d 3", "w 1", "m 10", "m 10 1"] {
        assert_eq!(next("20250101", "20250601", rule), "20250601", "rule `{rule}`");
    }
}

#[test]
fn empty_rule_returns_anchor() {
    assert_eq!(next("20250101", "20240101", ""), "20240101");
}

#[test]
fn yearly_steps_whole_years_strictly_past_now() {
    assert_eq!(next("20240301", "20200115", "y"), "20250115");
    assert_eq!(next("20250115", "20200115", "y"), "20260115");
}

#[test]
fn yearly_leap_day_falls_on_march_first_in_common_years() {
    assert_eq!(next("20250101", "20240229", "y"), "20250301");
    assert_eq!(next("20250301", "20240229", "y"), "20260301");
    assert_eq!(next("20270301", "20240229", "y"), "20280229");
}

#[test]
fn every_day_short_circuits_to_now() {
    assert_eq!(next("20240315", "20240101", "d 1"), "20240315");
    assert_eq!(next("20240315", "20240315", "d 1"), "20240316");
}

#[test]
fn every_n_days_lands_strictly_after_now() {
    assert_eq!(next("20240120", "20240101", "d 7"), "20240122");
    assert_eq!(next("20240122", "20240101", "d 7"), "20240129");
    assert_eq!(next("20240301", "20240101", "d 400"), "20250204");
}

#[test]
fn weekly_picks_first_listed_weekday_after_now() {
    // 2024-01-03 is a Wednesday.
    assert_eq!(next("20240105", "20240103", "w 1,3"), "20240108");
    assert_eq!(next("20240108", "20240103", "w 1,3"), "20240110");
    assert_eq!(next("20240101", "20240101", "w 7"), "20240107");
}

#[test]
fn weekly_result_has_a_selected_weekday() {
    let rule: RecurrenceRule = "w 2,5".parse().unwrap();
    let anchor = day("20230301");
    let mut now = anchor;
    for _ in 0..60 {
        let result = next_occurrence(now, anchor, &rule).unwrap();
        assert!(result > now);
        assert!(matches!(result.weekday(), Weekday::Tue | Weekday::Fri));
        assert!((result - now).num_days() <= 7);
        now = now.checked_add_days(Days::new(1)).unwrap();
    }
}

#[test]
fn monthly_last_day_tracks_month_length() {
    assert_eq!(next("20240215", "20240131", "m -1"), "20240229");
    assert_eq!(next("20230210", "20230131", "m -1"), "20230228");
    assert_eq!(next("20240229", "20240131", "m -1"), "20240331");
    assert_eq!(next("20240405", "20240331", "m -1"), "20240430");
}

#[test]
fn monthly_second_to_last_day() {
    assert_eq!(next("20230220", "20230115", "m -2"), "20230227");
    assert_eq!(next("20240220", "20240115", "m -2"), "20240228");
}

#[test]
fn monthly_skips_months_without_the_selected_day() {
    assert_eq!(next("20240405", "20240401", "m 31"), "20240531");
    assert_eq!(next("20230201", "20230130", "m 30"), "20230330");
}

#[test]
fn monthly_takes_earliest_selector_and_carries_year() {
    assert_eq!(next("20240110", "20240110", "m 1,15"), "20240115");
    assert_eq!(next("20231220", "20231210", "m 5"), "20240105");
}

#[test]
fn monthly_in_months_only_uses_listed_months() {
    assert_eq!(next("20240310", "20240101", "m 15 1,6"), "20240615");
    assert_eq!(next("20240701", "20240101", "m 15 1,6"), "20250115");
    assert_eq!(next("20230301", "20230101", "m -1 2"), "20240229");
    assert_eq!(next("20240301", "20230101", "m -1 2"), "20250228");
    assert_eq!(next("20240301", "20230101", "m 29 2"), "20280229");
    assert_eq!(next("20240101", "20240101", "m 31 2,3"), "20240331");
}

#[test]
fn monthly_in_months_never_selects_unlisted_month() {
    let rule: RecurrenceRule = "m 15 1,6".parse().unwrap();
    let anchor = day("20220301");
    let mut now = anchor;
    for _ in 0..800 {
        let result = next_occurrence(now, anchor, &rule).unwrap();
        assert!(matches!(result.month(), 1 | 6), "{result} for now {now}");
        assert_eq!(result.day(), 15);
        now = now.checked_add_days(Days::new(1)).unwrap();
    }
}

#[test]
fn invalid_inputs_surface_typed_errors() {
    let now = day("20240101");
    assert!(matches!(
        next_date(now, "2024-01-01", "d 1"),
        Err(RecurrenceError::InvalidDate(_))
    ));
    assert!(matches!(
        next_date(now, "20240101", "d 401"),
        Err(RecurrenceError::InvalidRule(_))
    ));
    // Rule errors are reported even when the anchor needs no advancing.
    assert!(matches!(
        next_date(now, "20250101", "z"),
        Err(RecurrenceError::InvalidRule(_))
    ));
}

#[test]
fn hand_built_rule_without_selectors_reports_no_occurrence() {
    let err = next_occurrence(day("20240301"), day("20240101"), &RecurrenceRule::WeeklyOn(vec![]))
        .unwrap_err();
    assert!(matches!(err, RecurrenceError::NoOccurrence { .. }));
}

#[test]
fn result_is_after_now_or_unchanged_anchor_for_all_rules() {
    let rules = [
        "y", "d 1", "d 2", "d 30", "d 400", "w 1", "w 3,6", "w 1,2,3,4,5,6,7", "m 1", "m 31",
        "m -1", "m -2,10", "m 29 2", "m -1 2,11", "m 31 1,4,12",
    ];
    let base = day("20230101");
    let anchors = (0..24).map(|step| base + Days::new(step * 29));
    let anchors = anchors.collect::<Vec<_>>();

    for text in rules {
        let rule: RecurrenceRule = text.parse().unwrap();
        for &anchor in &anchors {
            for offset in (0..24).map(|step| step * 31) {
                let now = base + Days::new(offset);
                let result = next_occurrence(now, anchor, &rule).unwrap();

                if anchor > now {
                    assert_eq!(result, anchor, "rule `{text}` anchor {anchor} now {now}");
                } else if text == "d 1" && now > anchor {
                    assert_eq!(result, now, "rule `{text}` anchor {anchor} now {now}");
                } else {
                    assert!(result > now, "rule `{text}` anchor {anchor} now {now} -> {result}");
                }
            }
        }
    }
}

#[test]
fn last_calendar_day_has_no_next_occurrence() {
    let last = day("99991231");
    for text in ["y", "d 1", "d 7", "w 1", "w 1,5,7", "m -1", "m 1,31", "m 1 1", "m -1 2,12"] {
        let rule: RecurrenceRule = text.parse().unwrap();
        let err = next_occurrence(last, last, &rule).unwrap_err();
        assert_eq!(
            err,
            RecurrenceError::NoOccurrence {
                anchor: last,
                now: last
            },
            "rule `{text}`"
        );
        assert!(matches!(
            next_date(last, "99991231", text),
            Err(RecurrenceError::NoOccurrence { .. })
        ));
    }
}

#[test]
fn candidates_up_to_year_9999_are_still_found() {
    assert_eq!(next("99991230", "99991230", "d 1"), "99991231");
    assert_eq!(next("99991231", "99991201", "d 1"), "99991231");
    assert_eq!(next("99991230", "99991201", "m 5,31"), "99991231");
    // 9999-12-27 is a Monday; Friday is still in range, Monday is not.
    assert_eq!(next("99991227", "99991227", "w 1,5"), "99991231");
    assert_eq!(next("99990101", "99980101", "m -1 12"), "99991231");
}

#[test]
fn every_n_days_jumps_over_long_gaps() {
    assert_eq!(next("99990101", "00000101", "d 2").len(), 8);
    let rule: RecurrenceRule = "d 400".parse().unwrap();
    let result = next_occurrence(day("99990101"), day("00000101"), &rule).unwrap();
    assert!(result > day("99990101"));
    assert!((result - day("99990101")).num_days() <= 400);
    assert_eq!((result - day("00000101")).num_days() % 400, 0);
}
