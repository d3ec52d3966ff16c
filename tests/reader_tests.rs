use chrono::FixedOffset;
use sdlang::{from_reader, from_slice, Error, Event, FixedZoneResolver, Reader, Value};
use std::io::Cursor;

const DOCUMENT: &str = r#"
// a small catalog
catalog "spring" year=2024 {
    item "boots" price=129.99D
    item "scarf" price=19.5D {
        color "red"
        color "blue"
    }
}
shipping 2024/04/01 08:00-CET
"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn describe(event: &Event) -> String {
    match event {
        Event::Start(element) => format!(
            "{}{}{}",
            "  ".repeat(element.depth() - 1),
            element.name(),
            if element.is_self_closing() { "/" } else { "" }
        ),
        Event::End => "end".to_string(),
    }
}

#[test]
fn test_event_sequence() {
    init_tracing();
    let events: Vec<String> = Reader::from_str(DOCUMENT)
        .map(|event| describe(&event.unwrap()))
        .collect();
    assert_eq!(
        events,
        vec![
            "catalog",
            "  item/",
            "  item",
            "    color/",
            "    color/",
            "end",
            "end",
            "shipping/",
        ]
    );
}

#[test]
fn test_element_contents() {
    let mut reader = Reader::from_str(DOCUMENT);
    let Some(Event::Start(catalog)) = reader.read().unwrap() else {
        panic!("expected catalog");
    };
    assert_eq!(catalog.value(), Some(&Value::from("spring")));
    assert_eq!(catalog.attribute("year"), Some(&Value::Int32(2024)));
    assert!(!catalog.is_anonymous());

    let Some(Event::Start(boots)) = reader.read().unwrap() else {
        panic!("expected item");
    };
    assert_eq!(boots.attribute("price"), Some(&Value::Float64(129.99)));
    assert_eq!(boots.attribute_count(), 1);
}

#[test]
fn test_default_zone_abbreviations() {
    let root = sdlang::from_str(DOCUMENT).unwrap();
    let shipping = root.child("shipping").and_then(|t| t.value()).unwrap();
    let offset = shipping.as_date_time().map(|dt| dt.offset().local_minus_utc());
    assert_eq!(offset, Some(3600));
}

#[test]
fn test_custom_zone_table() {
    let resolver = FixedZoneResolver::new().with_zone("HQ", -180);
    let root = Reader::from_str("meeting 2024/04/01 09:00-HQ")
        .with_zone_resolver(resolver)
        .read_tag()
        .unwrap();
    let at = root.children()[0].value().and_then(|v| v.as_date_time()).unwrap();
    assert_eq!(at.offset(), &FixedOffset::west_opt(3 * 3600).unwrap());
}

#[test]
fn test_closure_zone_resolver() {
    let mut reader = Reader::from_str("x 2024/04/01 09:00-LOCAL")
        .with_zone_resolver(|zone: &str| (zone == "LOCAL").then(|| FixedOffset::east_opt(3600)).flatten());
    assert!(reader.read_tag().is_ok());

    let err = Reader::from_str("x 2024/04/01 09:00-JST")
        .with_zone_resolver(|_: &str| -> Option<FixedOffset> { None })
        .read_tag()
        .unwrap_err();
    assert!(matches!(err, Error::Literal { line: 1, .. }));
}

#[test]
fn test_each_tag_streams_top_level() {
    let mut names = Vec::new();
    Reader::from_str(DOCUMENT)
        .each_tag(true, |tag| {
            names.push((tag.name().to_string(), tag.child_count()));
            Ok(())
        })
        .unwrap();
    assert_eq!(
        names,
        vec![("catalog".to_string(), 2), ("shipping".to_string(), 0)]
    );
}

#[test]
fn test_read_tag_after_pull_at_top_level() {
    let mut reader = Reader::from_str("first 1\nsecond 2\nthird 3");
    reader.read().unwrap();
    let rest = reader.read_tag().unwrap();
    let names: Vec<_> = rest.children().iter().map(|t| t.name()).collect();
    assert_eq!(names, vec!["second", "third"]);
}

#[test]
fn test_read_tag_inside_body_is_usage_error() {
    let mut reader = Reader::from_str("a {\n b\n}");
    reader.read().unwrap();
    assert!(matches!(reader.read_tag(), Err(Error::Usage(_))));
}

#[test]
fn test_from_reader_and_slice() {
    let root = from_reader(Cursor::new(DOCUMENT.as_bytes())).unwrap();
    assert_eq!(root.child_count(), 2);
    assert_eq!(root, from_slice(DOCUMENT.as_bytes()).unwrap());
    assert!(from_slice(&[0x66, 0xff, 0xfe]).is_err());
}

#[test]
fn test_error_stops_iteration() {
    let results: Vec<_> = Reader::from_str("a\nb }\nc").collect();
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(results[1].is_ok());
    let err = results[2].as_ref().unwrap_err();
    assert_eq!((err.line(), err.column()), (Some(2), Some(3)));
}
