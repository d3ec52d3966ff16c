//! Parse an SDL document, walk the tree, and write it back.
//!
//! Run with: cargo run --example simple

use sdlang::{from_str, to_string};
use std::error::Error;

const CONFIG: &str = r#"
// application settings
app "inventory" version=3 {
    database "postgres" host="db.local" port=5432 pool=16L
    cache ttl=00:05:00 enabled=on
    started 2024/03/01 09:30:00-GMT+01:00
    key [c2VjcmV0LWtleQ==]
}
"#;

fn main() -> Result<(), Box<dyn Error>> {
    let root = from_str(CONFIG)?;

    let app = root.child("app").ok_or("no app tag")?;
    println!("App: {}", app.value().and_then(|v| v.as_str()).unwrap_or("?"));
    println!("Version: {}", app.attribute("version").map(|v| v.to_string()).unwrap_or_default());

    for child in app.children() {
        println!("  {} ({} values, {} attributes)", child.name(), child.values().len(), child.attributes().len());
        for value in child.values() {
            println!("    value: {} [{}]", value, value.type_name());
        }
    }

    if let Some(ttl) = app
        .child("cache")
        .and_then(|t| t.attribute("ttl"))
        .and_then(|v| v.as_time_span())
    {
        println!("Cache ttl: {} seconds", ttl.total_milliseconds() / 1000);
    }

    let written = to_string(&root)?;
    println!("\nCanonical form:\n{}", written);

    assert_eq!(from_str(&written)?, root);
    println!("✓ Round-trip successful");

    Ok(())
}
