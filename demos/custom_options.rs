//! Customizing SDL output with WriterOptions.
//!
//! Run with: cargo run --example custom_options

use sdlang::{from_str, to_string, to_string_with_options, Quote, WriterOptions};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let root = from_str(
        r#"
        project "sdlang" {
            path "C:\\tools\\bin"
            motto "say \"hello\""
        }
        "#,
    )?;

    // Default format (tab indent, \n, double quotes)
    println!("Default:");
    println!("{}", to_string(&root)?);

    // Four spaces
    let options = WriterOptions::new().with_indent("    ");
    println!("Four-space indent:");
    println!("{}", to_string_with_options(&root, options)?);

    // Backquoted strings where the text allows it
    let options = WriterOptions::new().with_quote(Quote::Backquote);
    println!("Backquotes:");
    println!("{}", to_string_with_options(&root, options)?);

    // Windows line endings
    let options = WriterOptions::new().with_eol("\r\n");
    let text = to_string_with_options(&root, options)?;
    println!("CRLF output is {} bytes, {} lines", text.len(), text.matches("\r\n").count());
    assert_eq!(from_str(&text)?, root);

    Ok(())
}
