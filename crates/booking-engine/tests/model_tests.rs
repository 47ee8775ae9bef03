//! Tests for `SlotTime` parsing and block stepping.

use booking_engine::model::{ServiceDuration, SlotTime};

fn parse(s: &str) -> Option<String> {
    s.parse::<SlotTime>().ok().map(|t| t.to_string())
}

#[test]
fn accepts_short_and_padded_hours() {
    assert_eq!(parse("9:00").as_deref(), Some("09:00"));
    assert_eq!(parse("09:05").as_deref(), Some("09:05"));
    assert_eq!(parse(" 23:59 ").as_deref(), Some("23:59"));
}

#[test]
fn one_seconds_suffix_is_ignored() {
    assert_eq!(parse("09:00:30").as_deref(), Some("09:00"));
    assert_eq!(parse("14:00:00").as_deref(), Some("14:00"));
}

#[test]
fn malformed_seconds_are_rejected() {
    for raw in ["09:00:60", "09:00:5", "09:00:xx", "09:00:00:00", "09:00:xx:yy", "09:00:"] {
        assert_eq!(parse(raw), None, "{raw} should be rejected");
    }
}

#[test]
fn out_of_range_or_loose_fields_are_rejected() {
    for raw in ["24:00", "12:60", "9h", "9:0", "+9:00", "123:00", ":30", ""] {
        assert_eq!(parse(raw), None, "{raw} should be rejected");
    }
}

#[test]
fn blocks_step_by_the_hour() {
    let start: SlotTime = "09:30".parse().unwrap();
    let blocks: Vec<String> = start
        .blocks(ServiceDuration::from_minutes(150).unwrap())
        .map(|t| t.to_string())
        .collect();
    assert_eq!(blocks, ["09:30", "10:30", "11:30"]);
}

#[test]
fn blocks_never_reach_midnight() {
    let late: SlotTime = "22:00".parse().unwrap();
    let blocks: Vec<String> = late
        .blocks(ServiceDuration::from_minutes(240).unwrap())
        .map(|t| t.to_string())
        .collect();
    assert_eq!(blocks, ["22:00", "23:00"]);
}
