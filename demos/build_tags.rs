//! Assembling tag trees: the `Tag` API, the `tag!` macro, `TagBuilder`, and
//! values coerced from serde types.
//!
//! Run with: cargo run --example build_tags

use chrono::NaiveDate;
use sdlang::{coerce, tag, to_string, ElementWriter, Tag, TagBuilder, TimeSpan, Value};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    // Step by step
    let mut root = Tag::root();
    let person = root.new_child("person")?;
    person.add_value("Akiko");
    person.set_attribute("born", NaiveDate::from_ymd_opt(1990, 5, 17).ok_or("bad date")?)?;
    person.set_attribute_ns("contact", "email", "akiko@example.com")?;
    person.new_child("pet")?.add_value("cat").add_value(TimeSpan::new(730, 0, 0, 0, 0));

    println!("Tag API:");
    println!("{}", to_string(&root)?);

    // Declaratively
    let matrix = tag!("matrix" => [
        tag!("content", 1, 0, 0),
        tag!("content", 0, 1, 0),
        tag!("content", 0, 0, 1),
    ])?;

    println!("tag! macro:");
    println!("{}", to_string(&matrix)?);

    // Through the writing protocol
    let mut builder = TagBuilder::new();
    builder.element("", "server", |b| {
        b.value(&Value::from("alpha"))?;
        b.attribute("", "port", &Value::from(8080))?;
        b.element("net", "bind", |b| b.values(&[Value::from("0.0.0.0"), Value::from("::")]))
    })?;
    let built = builder.into_root()?;

    println!("TagBuilder:");
    println!("{}", to_string(&built)?);

    // From serde values
    let coerced = vec![coerce(&42u8)?, coerce(&Some(2.5f64))?, coerce(&())?, coerce("text")?];
    println!("Coerced values: {:?}", coerced);

    let mut samples = Tag::new("samples")?;
    for reading in [1.5f32, 2.25, 3.0] {
        samples.try_add_value(&reading)?;
    }
    println!("{}", to_string(&samples)?);

    Ok(())
}
