//! Watching the tokenizer and reader through `tracing`.
//!
//! Run with: RUST_LOG=sdlang=trace cargo run --example trace_tokens

use sdlang::token::TokenKind;
use sdlang::tokenizer::Tokenizer;
use std::error::Error;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sdlang=debug")))
        .init();

    let text = "size 10 20 unit=\"px\" /* inline */ {\n  border 1.5F\n}\n";

    println!("Tokens:");
    let mut tokenizer = Tokenizer::from_str(text);
    loop {
        let token = tokenizer.next()?;
        if token.is(TokenKind::Eof) {
            break;
        }
        println!("  {}:{} {:?} {:?}", token.line, token.column, token.kind, token.text);
    }

    println!("\nTree:");
    let root = sdlang::from_str(text)?;
    print!("{}", root);

    Ok(())
}
