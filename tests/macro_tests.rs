use chrono::NaiveDate;
use sdlang::{from_str, tag, to_string, Error, TimeSpan, Value};

#[test]
fn test_tag_macro_matches_parsed_document() {
    let built = tag!("root" => [
        tag!("window", "main"; "width" = 640, "height" = 480 => [
            tag!("title", "Editor"),
            tag!("ui:button", "OK"; "ui:default" = true),
        ]),
        tag!("content", 1, 2, 3),
    ])
    .unwrap();

    let parsed = from_str(
        "window \"main\" width=640 height=480 {\n\
         \ttitle \"Editor\"\n\
         \tui:button \"OK\" ui:default=true\n\
         }\n\
         1 2 3\n",
    )
    .unwrap();

    assert_eq!(built.children(), parsed.children());
}

#[test]
fn test_tag_macro_value_conversions() {
    let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    let tag = tag!("mixed", 1, 2i64, 1.5f32, 2.5, "s", 'c', true, Value::Null, date, TimeSpan::new(0, 1, 0, 0, 0))
        .unwrap();
    assert_eq!(
        tag.values(),
        &[
            Value::Int32(1),
            Value::Int64(2),
            Value::Float32(1.5),
            Value::Float64(2.5),
            Value::from("s"),
            Value::Char('c'),
            Value::Bool(true),
            Value::Null,
            Value::Date(date),
            Value::TimeSpan(TimeSpan::new(0, 1, 0, 0, 0)),
        ]
    );
}

#[test]
fn test_tag_macro_trailing_commas() {
    let tag = tag!("a"; "x" = 1, "y" = 2, => [tag!("b"), tag!("c"),]).unwrap();
    assert_eq!(tag.attributes().len(), 2);
    assert_eq!(tag.child_count(), 2);
}

#[test]
fn test_tag_macro_with_runtime_names() {
    let names = ["alpha", "beta"];
    let mut root = tag!("root").unwrap();
    for (i, name) in names.iter().enumerate() {
        root.add_child(tag!(*name, i as i32).unwrap());
    }
    assert_eq!(to_string(&root).unwrap(), "alpha 0\nbeta 1\n");
}

#[test]
fn test_tag_macro_reports_first_invalid_child() {
    let result = tag!("list" => [tag!("ok"), tag!("bad name"), tag!("9lives")]);
    match result {
        Err(Error::InvalidIdentifier(msg)) => assert!(msg.starts_with("' ' is not a legal character")),
        other => panic!("expected an identifier error, got {:?}", other),
    }
}

#[test]
fn test_tag_macro_accepts_any_result_child() {
    let child = from_str("inner 1").map(|mut root| root.remove_child(0).unwrap());
    let outer = tag!("outer" => [child]).unwrap();
    assert_eq!(outer.children()[0].value(), Some(&Value::Int32(1)));
}
