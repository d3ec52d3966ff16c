use bigdecimal::BigDecimal;
use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
use sdlang::{
    from_str, tag, to_string, to_string_with_options, to_writer, Error, Quote, Tag, TimeSpan,
    Value, WriterOptions,
};
use std::str::FromStr;

fn assert_round_trip(text: &str) {
    let root = from_str(text).unwrap();
    let written = to_string(&root).unwrap();
    let reread = from_str(&written)
        .unwrap_or_else(|e| panic!("written text does not parse: {}\n{}", e, written));
    assert_eq!(root, reread, "round trip of {:?} through {:?}", text, written);
}

fn literal(value: Value) -> String {
    let mut tag = Tag::new("v").unwrap();
    tag.add_value(value);
    let text = to_string(&tag).unwrap();
    text.strip_prefix("v ")
        .and_then(|t| t.strip_suffix('\n'))
        .unwrap()
        .to_string()
}

#[test]
fn test_literal_forms() {
    assert_eq!(literal(Value::Null), "null");
    assert_eq!(literal(Value::Bool(true)), "true");
    assert_eq!(literal(Value::from("a\"b\\c\nd\te")), "\"a\\\"b\\\\c\\nd\\te\"");
    assert_eq!(literal(Value::Char('\'')), "'\\''");
    assert_eq!(literal(Value::Char('日')), "'日'");
    assert_eq!(literal(Value::Int32(-7)), "-7");
    assert_eq!(literal(Value::Int64(7)), "7L");
    assert_eq!(literal(Value::Float32(1.5)), "1.5F");
    assert_eq!(literal(Value::Float64(2.0)), "2.0D");
    assert_eq!(
        literal(Value::Decimal(BigDecimal::from_str("12.50").unwrap())),
        "12.50BD"
    );
    assert_eq!(
        literal(Value::Date(NaiveDate::from_ymd_opt(2010, 7, 14).unwrap())),
        "2010/07/14"
    );
    assert_eq!(
        literal(Value::TimeSpan(TimeSpan::new(1, 2, 3, 4, 5))),
        "1d:02:03:04.005"
    );
    assert_eq!(literal(Value::TimeSpan(TimeSpan::new(0, -1, 0, 0, 0))), "-01:00:00");
    assert_eq!(literal(Value::Binary(vec![1, 2, 3])), "[AQID]");
}

#[test]
fn test_date_time_forms() {
    let utc = Utc.with_ymd_and_hms(2010, 7, 14, 1, 2, 3).unwrap();
    assert_eq!(literal(Value::from(utc)), "2010/07/14 01:02:03");

    let tokyo = FixedOffset::east_opt(9 * 3600)
        .unwrap()
        .with_ymd_and_hms(2015, 12, 5, 14, 12, 23)
        .unwrap();
    assert_eq!(literal(Value::from(tokyo)), "2015/12/05 14:12:23-GMT+09:00");

    let west = FixedOffset::west_opt(8 * 3600 + 30 * 60)
        .unwrap()
        .with_ymd_and_hms(1807, 11, 11, 22, 28, 13)
        .unwrap()
        + chrono::Duration::milliseconds(888);
    assert_eq!(literal(Value::from(west)), "1807/11/11 22:28:13.888-GMT-08:30");
}

#[test]
fn test_canonical_document() {
    let root = from_str(
        "server \"alpha\"   zeta=1 alpha=2 {\n  // comment\n  path \"/\"\n}\n\n\n1 2 3\n",
    )
    .unwrap();
    assert_eq!(
        to_string(&root).unwrap(),
        "server \"alpha\" alpha=2 zeta=1 {\n\tpath \"/\"\n}\n1 2 3\n"
    );
}

#[test]
fn test_round_trips() {
    assert_round_trip("");
    assert_round_trip("tag1");
    assert_round_trip("ns:tag1 ns:attr=1");
    assert_round_trip("tag1 \"with \\\"quotes\\\"\" `raw \\ text` 'c' '\\n'");
    assert_round_trip("numbers 1 2L 3.5F 4.25D 5.125BD -6 12345678901234567890BD");
    assert_round_trip("dates 2008/06/01 2008/06/01 12:34 2008/06/01 12:34:56.789-JST");
    assert_round_trip("spans 12:00:00 -00:00:01.500 3d:04:05:06");
    assert_round_trip("mixed 2008/06/01 5d:12:34 2008/06/01 00:30:00");
    assert_round_trip("nothing null on=on off=off");
    assert_round_trip("a {\n\tb {\n\t\tc 1\n\t}\n\t1 2\n\t3 4\n}\n");
    assert_round_trip("content x=1");
    assert_round_trip("tag1 `multi\nline\n\nstring`");
    assert_round_trip(&format!("blob [{}]", "QUJD".repeat(40)));
}

#[test]
fn test_date_then_time_span_stays_two_values() {
    let mut tag = Tag::new("t").unwrap();
    tag.add_value(NaiveDate::from_ymd_opt(2020, 1, 2).unwrap());
    tag.add_value(TimeSpan::new(0, 1, 30, 0, 0));
    let text = to_string(&tag).unwrap();
    assert_eq!(text, "t 2020/01/02 0d:01:30:00\n");
    assert_eq!(from_str(&text).unwrap().children()[0], tag);
}

#[test]
fn test_anonymous_tags_written_without_name() {
    let root = tag!("root" => [tag!("content", 1, 2), tag!("content"; "a" = 1)]).unwrap();
    assert_eq!(to_string(&root).unwrap(), "1 2\ncontent a=1\n");
}

#[test]
fn test_root_with_values_is_usage_error() {
    let mut root = Tag::root();
    root.add_value(1);
    assert!(matches!(to_string(&root), Err(Error::Usage(_))));
}

#[test]
fn test_non_finite_float_is_usage_error() {
    let mut tag = Tag::new("f").unwrap();
    tag.add_value(f64::INFINITY);
    assert!(matches!(to_string(&tag), Err(Error::Usage(_))));
}

#[test]
fn test_options() {
    let root = from_str("a \"x\" {\n\tb \"y`z\"\n}\n").unwrap();
    let options = WriterOptions::new()
        .with_indent("    ")
        .with_eol("\r\n")
        .with_quote(Quote::Backquote);
    assert_eq!(
        to_string_with_options(&root, options).unwrap(),
        "a `x` {\r\n    b \"y`z\"\r\n}\r\n"
    );
}

#[test]
fn test_to_writer_non_root() {
    let tag = tag!("greeting", "hi" => [tag!("to", "you")]).unwrap();
    let mut buffer = Vec::new();
    to_writer(&mut buffer, &tag).unwrap();
    assert_eq!(
        String::from_utf8(buffer).unwrap(),
        "greeting \"hi\" {\n\tto \"you\"\n}\n"
    );
}

#[test]
fn test_display_matches_to_string() {
    let root = from_str("a 1 {\n\tb 2\n}\nc").unwrap();
    assert_eq!(root.to_string(), to_string(&root).unwrap());
    assert_eq!(root.children()[1].to_string(), "c\n");
}

#[test]
fn test_keyword_names_cannot_enter_a_tree() {
    assert!(matches!(Tag::new("true"), Err(Error::InvalidIdentifier(_))));
    let mut tag = Tag::new("t").unwrap();
    assert!(matches!(tag.set_attribute("null", 1), Err(Error::InvalidIdentifier(_))));
    assert!(tag!("list" => [tag!("off")]).is_err());

    // names that merely start with a keyword are fine
    let root = tag!("root" => [tag!("trueness"; "nullable" = 1, "online" = true)]).unwrap();
    let text = to_string(&root).unwrap();
    assert_eq!(text, "trueness nullable=1 online=true\n");
    assert_eq!(from_str(&text).unwrap(), root);
}

#[test]
fn test_date_time_precision_is_checked_before_writing() {
    let date = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    let utc = FixedOffset::east_opt(0).unwrap();

    let mut fine = Tag::new("t").unwrap();
    fine.add_value(Value::DateTime(
        date.and_hms_nano_opt(3, 4, 5, 123_456_789)
            .unwrap()
            .and_local_timezone(utc)
            .unwrap(),
    ));
    assert!(matches!(to_string(&fine), Err(Error::Usage(_))));

    let mut odd_offset = Tag::new("t").unwrap();
    odd_offset.add_value(Value::DateTime(
        date.and_hms_opt(3, 4, 5)
            .unwrap()
            .and_local_timezone(FixedOffset::east_opt(45).unwrap())
            .unwrap(),
    ));
    assert!(matches!(to_string(&odd_offset), Err(Error::Usage(_))));

    // conversions from chrono keep only what can be written
    let converted = Value::from(
        date.and_hms_nano_opt(3, 4, 5, 123_456_789)
            .unwrap()
            .and_local_timezone(utc)
            .unwrap(),
    );
    let mut tag = Tag::new("t").unwrap();
    tag.add_value(converted);
    let text = to_string(&tag).unwrap();
    assert_eq!(text, "t 2020/01/02 03:04:05.123\n");
    assert_eq!(from_str(&text).unwrap().children()[0], tag);
}
