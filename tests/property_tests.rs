//! Property-based tests for the writer/reader round trip.
//!
//! Random tag trees are written to text and read back; the result must equal
//! the original tree, and writing it again must give the same text.

use bigdecimal::BigDecimal;
use chrono::{FixedOffset, NaiveDate, TimeZone};
use num_bigint::BigInt;
use proptest::prelude::*;
use sdlang::{from_str, is_valid_identifier, to_string, Tag, TimeSpan, Value};

fn roundtrip(root: &Tag) -> bool {
    match to_string(root) {
        Ok(written) => match from_str(&written) {
            Ok(reread) => {
                if *root != reread {
                    eprintln!("Mismatch after reading back: {}", written);
                    return false;
                }
                true
            }
            Err(e) => {
                eprintln!("Read failed: {}", e);
                eprintln!("Written was: {}", written);
                false
            }
        },
        Err(e) => {
            eprintln!("Write failed: {}", e);
            false
        }
    }
}

fn identifier() -> impl Strategy<Value = String> {
    "[a-zA-Z_][a-zA-Z0-9_.$-]{0,8}".prop_filter("rejected by Tag", |s| is_valid_identifier(s))
}

fn namespace() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), identifier()]
}

fn date() -> impl Strategy<Value = NaiveDate> {
    (1i32..=9999, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        "\\PC{0,20}".prop_map(Value::String),
        any::<char>().prop_map(Value::Char),
        any::<i32>().prop_map(Value::Int32),
        any::<i64>().prop_map(Value::Int64),
        (any::<i64>(), 0i64..8).prop_map(|(m, scale)| Value::Decimal(BigDecimal::new(BigInt::from(m), scale))),
        any::<f32>().prop_filter("finite", |f| f.is_finite()).prop_map(Value::Float32),
        any::<f64>().prop_filter("finite", |f| f.is_finite()).prop_map(Value::Float64),
    ]
}

fn temporal_or_binary() -> impl Strategy<Value = Value> {
    prop_oneof![
        date().prop_map(Value::Date),
        (date(), 0u32..86_400_000, -720i32..=840).prop_map(|(d, ms, offset)| {
            let time = chrono::NaiveTime::from_num_seconds_from_midnight_opt(ms / 1000, (ms % 1000) * 1_000_000)
                .unwrap();
            let zone = FixedOffset::east_opt(offset * 60).unwrap();
            Value::DateTime(zone.from_local_datetime(&d.and_time(time)).unwrap())
        }),
        (-100_000_000_000i64..100_000_000_000).prop_map(|ms| Value::TimeSpan(TimeSpan::from_milliseconds(ms))),
        prop::collection::vec(any::<u8>(), 0..120).prop_map(Value::Binary),
    ]
}

fn value() -> impl Strategy<Value = Value> {
    prop_oneof![3 => scalar(), 1 => temporal_or_binary()]
}

fn leaf() -> impl Strategy<Value = Tag> {
    (
        namespace(),
        identifier(),
        prop::collection::vec(value(), 0..4),
        prop::collection::vec((namespace(), identifier(), value()), 0..3),
    )
        .prop_map(|(ns, name, values, attributes)| {
            let mut tag = Tag::with_namespace(ns, name).unwrap();
            tag.set_values(values);
            for (ns, name, value) in attributes {
                tag.set_attribute_ns(&ns, &name, value).unwrap();
            }
            tag
        })
}

fn tree() -> impl Strategy<Value = Tag> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        (leaf(), prop::collection::vec(inner, 0..4)).prop_map(|(mut tag, children)| {
            for child in children {
                tag.add_child(child);
            }
            tag
        })
    })
}

fn document() -> impl Strategy<Value = Tag> {
    prop::collection::vec(tree(), 0..4).prop_map(|tags| {
        let mut root = Tag::root();
        for tag in tags {
            root.add_child(tag);
        }
        root
    })
}

proptest! {
    #[test]
    fn prop_single_value(v in value()) {
        let mut root = Tag::root();
        root.new_child("v").unwrap().add_value(v);
        prop_assert!(roundtrip(&root));
    }

    #[test]
    fn prop_anonymous_values(values in prop::collection::vec(value(), 1..6)) {
        let mut root = Tag::root();
        let mut tag = Tag::anonymous();
        tag.set_values(values);
        root.add_child(tag);
        prop_assert!(roundtrip(&root));
    }

    #[test]
    fn prop_document(root in document()) {
        prop_assert!(roundtrip(&root));
    }

    #[test]
    fn prop_writing_is_idempotent(root in document()) {
        let first = to_string(&root).unwrap();
        let second = to_string(&from_str(&first).unwrap()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_names_read_back_as_names(name in "[a-z]{1,5}") {
        // keywords are refused up front; every accepted name survives
        if let Ok(tag) = Tag::new(name.clone()) {
            let mut root = Tag::root();
            root.add_child(tag);
            let reread = from_str(&to_string(&root).unwrap()).unwrap();
            prop_assert_eq!(reread.children()[0].name(), name.as_str());
        } else {
            prop_assert!(matches!(name.as_str(), "true" | "false" | "on" | "off" | "null"));
        }
    }

    #[test]
    fn prop_reader_never_panics(text in "\\PC{0,64}") {
        let _ = from_str(&text);
    }
}
