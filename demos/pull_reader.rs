//! Streaming a document as events, without building the whole tree.
//!
//! Run with: cargo run --example pull_reader

use sdlang::{Event, Reader};
use std::error::Error;

const LOG: &str = r#"
entry 2024/04/01 08:00:00 level="info" { message "service started" }
entry 2024/04/01 08:00:05 level="warn" {
    message "slow response"
    elapsed 00:00:02.350
}
entry 2024/04/01 08:01:00 level="info" { message "request served" }
"#;

fn main() -> Result<(), Box<dyn Error>> {
    println!("Events:");
    for event in Reader::from_str(LOG) {
        match event? {
            Event::Start(element) => {
                let indent = "  ".repeat(element.depth() - 1);
                let values: Vec<String> = element.values().iter().map(|v| v.to_string()).collect();
                println!(
                    "{}start {} [{}]{}",
                    indent,
                    element.name(),
                    values.join(", "),
                    if element.is_self_closing() { " (self-closing)" } else { "" }
                );
            }
            Event::End => println!("end"),
        }
    }

    // Only warnings, one top-level tag at a time
    println!("\nWarnings:");
    Reader::from_str(LOG).each_tag(true, |tag| {
        if tag.attribute("level").and_then(|v| v.as_str()) == Some("warn") {
            let message = tag
                .child("message")
                .and_then(|m| m.value())
                .and_then(|v| v.as_str())
                .unwrap_or("");
            println!("  {}", message);
        }
        Ok(())
    })?;

    // Errors carry their position
    let broken = "entry 2024/04/01 level=\"info\" {\n    message \"unterminated\n}\n";
    if let Err(err) = Reader::from_str(broken).read_tag() {
        println!("\nError at {:?}:{:?}: {}", err.line(), err.column(), err);
    }

    Ok(())
}
