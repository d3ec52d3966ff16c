//! Line-oriented SDL tokenizer.
//!
//! The input is consumed one physical line at a time. Every line is
//! normalized to end with a single `\n` (a final line without a line break is
//! left as is), and tokens are matched against an ordered list of patterns
//! that depends on the current [`Mode`]. The first pattern that matches at
//! the current position wins, so the order of each list encodes precedence:
//! `456L` is tried as an integer before the float patterns see it, and a time
//! such as `12:30` is tried before the plain integer `12`.
//!
//! Constructs that span lines (block comments, backquote strings,
//! double-quote strings continued with `\`, and binary literals) switch the
//! tokenizer into a dedicated mode until their closing token is found. Modes
//! do not nest.
//!
//! ## Examples
//!
//! ```rust
//! use sdlang::tokenizer::Tokenizer;
//! use sdlang::token::TokenKind;
//!
//! let mut tokenizer = Tokenizer::from_str("size 12L");
//! assert_eq!(tokenizer.next().unwrap().kind, TokenKind::Identifier);
//! assert_eq!(tokenizer.next().unwrap().kind, TokenKind::Whitespace);
//!
//! let number = tokenizer.next().unwrap();
//! assert_eq!(number.kind, TokenKind::Integer);
//! assert_eq!(number.text, "12L");
//! assert_eq!(number.column, 6);
//!
//! assert_eq!(tokenizer.next().unwrap().kind, TokenKind::Eof);
//! ```

use crate::token::{Token, TokenKind};
use crate::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::BufRead;
use tracing::{debug, trace};

/// Lexical mode of the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Top,
    MultilineComment,
    MultilineBackquoteString,
    MultilineDoubleQuoteString,
    MultilineBinary,
}

impl Mode {
    fn matchers(self) -> &'static [Matcher] {
        match self {
            Mode::Top => &TOP_MATCHERS,
            Mode::MultilineComment => &COMMENT_MATCHERS,
            Mode::MultilineBackquoteString => &BACKQUOTE_MATCHERS,
            Mode::MultilineDoubleQuoteString => &DOUBLE_QUOTE_MATCHERS,
            Mode::MultilineBinary => &BINARY_MATCHERS,
        }
    }
}

struct Matcher {
    kind: TokenKind,
    regex: Regex,
    next_mode: Option<Mode>,
    /// Give the line break back when the match swallowed it, so that EOL is
    /// still delivered as its own token.
    push_back_eol: bool,
    /// Only match on a word boundary (`on` must not match the start of `office`).
    keyword: bool,
    error: Option<&'static str>,
    process: fn(&str) -> String,
}

impl Matcher {
    fn new(kind: TokenKind, pattern: &str) -> Self {
        Matcher {
            kind,
            regex: Regex::new(pattern).expect("token pattern must compile"),
            next_mode: None,
            push_back_eol: false,
            keyword: false,
            error: None,
            process: keep,
        }
    }

    fn next_mode(mut self, mode: Mode) -> Self {
        self.next_mode = Some(mode);
        self
    }

    fn push_back_eol(mut self) -> Self {
        self.push_back_eol = true;
        self
    }

    fn keyword(mut self) -> Self {
        self.keyword = true;
        self
    }

    fn error(mut self, msg: &'static str) -> Self {
        self.error = Some(msg);
        self
    }

    fn process(mut self, process: fn(&str) -> String) -> Self {
        self.process = process;
        self
    }
}

const BINARY_CHARS: &str = r"[\sA-Za-z0-9/=+]";

static TOP_MATCHERS: Lazy<Vec<Matcher>> = Lazy::new(|| {
    use TokenKind::*;
    vec![
        Matcher::new(Eol, r"^\n"),
        Matcher::new(Whitespace, r"^\s+").push_back_eol(),
        Matcher::new(Semicolon, r"^;"),
        Matcher::new(Colon, r"^:"),
        Matcher::new(Equal, r"^="),
        Matcher::new(BlockStart, r"^\{"),
        Matcher::new(BlockEnd, r"^\}"),
        Matcher::new(Boolean, r"^(?:true|false|on|off)").keyword(),
        Matcher::new(Null, r"^null").keyword(),
        Matcher::new(OneLineComment, r"^(?:#|--|//)[^\n]*").process(strip_comment_marker),
        Matcher::new(InlineComment, r"^/\*(?s:.*?)\*/").process(|s| s[2..s.len() - 2].to_string()),
        Matcher::new(MultilineCommentStart, r"^/\*[^\n]*")
            .next_mode(Mode::MultilineComment)
            .process(|s| s[2..].to_string()),
        Matcher::new(Character, r"^'(?:[^\\']|\\.)'").process(strip_delimiters),
        Matcher::new(InlineBackquoteString, r"^`[^`]*`").process(strip_delimiters),
        Matcher::new(InlineDoubleQuoteString, r#"^"(?:[^\\"]|\\.)*""#).process(strip_delimiters),
        Matcher::new(MultilineBackquoteStringStart, r"^`[^`]*\z")
            .next_mode(Mode::MultilineBackquoteString)
            .process(|s| s[1..].to_string()),
        Matcher::new(MultilineDoubleQuoteStringStart, r#"^"(?:[^\\"]|\\\S)*\\\s*\z"#)
            .next_mode(Mode::MultilineDoubleQuoteString)
            .push_back_eol()
            .process(|s| strip_continuation(&s[1..])),
        Matcher::new(InlineBinary, &format!(r"^\[{}*\]", BINARY_CHARS)).process(strip_binary),
        Matcher::new(MultilineBinaryStart, &format!(r"^\[{}*\z", BINARY_CHARS))
            .next_mode(Mode::MultilineBinary)
            .push_back_eol()
            .process(strip_binary),
        Matcher::new(Identifier, r"^[\p{Alphabetic}_][\p{Alphabetic}\p{Nd}_\-.$]*"),
        Matcher::new(Date, r"^-?[0-9]+/[0-9]+/[0-9]+"),
        Matcher::new(
            TimeOrTimespan,
            r"(?i)^(?:-?[0-9]+d:)?-?[0-9]+:[0-9]+(?::[0-9]+(?:\.[0-9]+)?)?(?:-[a-z/]+(?:[+-][0-9]+(?::[0-9]+)?)?)?",
        ),
        // before the float patterns, so that 456L is not a float
        Matcher::new(Integer, r"(?i)^[+-]?[0-9]+L"),
        // also catches malformed floats such as 1.2.2 so they can be reported
        Matcher::new(Float, r"(?i)^[+-]?(?:[0-9]+(?:F|D|BD)|[0-9]*\.[0-9.]+(?:F|D|BD)?)"),
        Matcher::new(Integer, r"^[+-]?[0-9]+"),
        Matcher::new(LineContinuation, r"^\\\s*\z"),
        Matcher::new(UnclosedString, r#"^"(?:[^\\"]|\\\S)*"#).error("unclosed string"),
    ]
});

static COMMENT_MATCHERS: Lazy<Vec<Matcher>> = Lazy::new(|| {
    use TokenKind::*;
    vec![
        Matcher::new(Eol, r"^\n"),
        Matcher::new(MultilineCommentEnd, r"^(?s:.*?)\*/")
            .next_mode(Mode::Top)
            .process(|s| s[..s.len() - 2].to_string()),
        Matcher::new(MultilineCommentPart, r"^[^\n]+"),
    ]
});

static BACKQUOTE_MATCHERS: Lazy<Vec<Matcher>> = Lazy::new(|| {
    use TokenKind::*;
    vec![
        Matcher::new(Eol, r"^\n"),
        Matcher::new(MultilineBackquoteStringEnd, r"^[^`]*`")
            .next_mode(Mode::Top)
            .process(|s| s[..s.len() - 1].to_string()),
        // keeps its line break: the string is verbatim
        Matcher::new(MultilineBackquoteStringPart, r"^[^`]*\z"),
    ]
});

static DOUBLE_QUOTE_MATCHERS: Lazy<Vec<Matcher>> = Lazy::new(|| {
    use TokenKind::*;
    vec![
        Matcher::new(Eol, r"^\n"),
        Matcher::new(MultilineDoubleQuoteStringEnd, r#"^(?:[^\\"]|\\\S)*""#)
            .next_mode(Mode::Top)
            .process(|s| {
                let s = s.trim_start();
                s.strip_suffix('"').unwrap_or(s).to_string()
            }),
        Matcher::new(MultilineDoubleQuoteStringPart, r#"^(?:[^\\"]|\\\S)*\\\s*\z"#)
            .push_back_eol()
            .process(|s| strip_continuation(s.trim_start())),
        Matcher::new(UnclosedString, r#"^(?:[^\\"]|\\\S)*\z"#).error("unclosed multiline string"),
    ]
});

static BINARY_MATCHERS: Lazy<Vec<Matcher>> = Lazy::new(|| {
    use TokenKind::*;
    vec![
        Matcher::new(Eol, r"^\n"),
        Matcher::new(MultilineBinaryEnd, &format!(r"^{}*\]", BINARY_CHARS))
            .next_mode(Mode::Top)
            .process(strip_binary),
        Matcher::new(MultilineBinaryPart, &format!(r"^{}*\z", BINARY_CHARS))
            .push_back_eol()
            .process(strip_binary),
    ]
});

fn keep(s: &str) -> String {
    s.to_string()
}

fn strip_delimiters(s: &str) -> String {
    s[1..s.len() - 1].to_string()
}

fn strip_comment_marker(s: &str) -> String {
    let body = s
        .strip_prefix('#')
        .or_else(|| s.strip_prefix("--"))
        .or_else(|| s.strip_prefix("//"))
        .unwrap_or(s);
    body.to_string()
}

/// Drops the trailing `\` of a continued string line and what follows it.
fn strip_continuation(s: &str) -> String {
    let trimmed = s.trim_end();
    trimmed.strip_suffix('\\').unwrap_or(trimmed).to_string()
}

fn strip_binary(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace() && *c != '[' && *c != ']')
        .collect()
}

static IDENTIFIER_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{Alphabetic}_]$").expect("identifier pattern must compile"));

static IDENTIFIER_PART: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\p{Alphabetic}\p{Nd}_\-.$]$").expect("identifier pattern must compile")
});

/// Returns `true` if `c` may appear after the first character of an identifier.
#[must_use]
pub fn is_identifier_part(c: char) -> bool {
    let mut buf = [0u8; 4];
    IDENTIFIER_PART.is_match(c.encode_utf8(&mut buf))
}

/// Returns `true` if `c` may start an identifier.
#[must_use]
pub fn is_identifier_start(c: char) -> bool {
    let mut buf = [0u8; 4];
    IDENTIFIER_START.is_match(c.encode_utf8(&mut buf))
}

/// Turns SDL text into a stream of [`Token`]s.
///
/// Supports exactly one level of push-back through [`Tokenizer::unread`].
pub struct Tokenizer<R> {
    input: R,
    line: String,
    line_no: usize,
    pos: usize,
    exhausted: bool,
    mode: Mode,
    current: Option<Token>,
    pushed_back: Option<Token>,
}

impl<'a> Tokenizer<&'a [u8]> {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &'a str) -> Self {
        Tokenizer::new(input.as_bytes())
    }
}

impl<R: BufRead> Tokenizer<R> {
    pub fn new(input: R) -> Self {
        Tokenizer {
            input,
            line: String::new(),
            line_no: 0,
            pos: 0,
            exhausted: false,
            mode: Mode::Top,
            current: None,
            pushed_back: None,
        }
    }

    /// The current lexical mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The 1-based number of the line being tokenized (0 before the first read).
    #[must_use]
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    /// The text of line `line_no`, if it is the line currently held.
    #[must_use]
    pub fn source_line(&self, line_no: usize) -> Option<&str> {
        if line_no == self.line_no && line_no > 0 {
            Some(&self.line)
        } else {
            None
        }
    }

    /// Advances and returns the next token.
    ///
    /// Once the input is exhausted every call returns an [`TokenKind::Eof`]
    /// token at the same position.
    ///
    /// # Errors
    ///
    /// Returns a lexical error on an unexpected character or an unclosed
    /// string, and an I/O error if the underlying reader fails.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Token> {
        if let Some(token) = self.pushed_back.take() {
            self.current = Some(token.clone());
            return Ok(token);
        }

        let token = self.scan()?;
        trace!(kind = ?token.kind, line = token.line, column = token.column, text = %token.text, "token");
        self.current = Some(token.clone());
        Ok(token)
    }

    /// Pushes the last returned token back so that the next call to
    /// [`Tokenizer::next`] delivers it again.
    ///
    /// # Errors
    ///
    /// Only one token can be pushed back: calling `unread` twice without an
    /// intervening `next`, or before any token was read, is a usage error.
    pub fn unread(&mut self) -> Result<()> {
        if self.pushed_back.is_some() {
            return Err(Error::usage("only one token can be pushed back"));
        }
        match self.current.take() {
            Some(token) => {
                self.pushed_back = Some(token);
                Ok(())
            }
            None => Err(Error::usage("no token to push back")),
        }
    }

    fn scan(&mut self) -> Result<Token> {
        if self.pos >= self.line.len() && !self.read_line()? {
            let column = self.line.trim_end_matches('\n').chars().count() + 1;
            return Ok(Token::new(TokenKind::Eof, "", self.line_no.max(1), column));
        }

        let rest = &self.line[self.pos..];
        let column = self.column_at(self.pos);

        for matcher in self.mode.matchers() {
            let Some(found) = matcher.regex.find(rest) else {
                continue;
            };
            if found.end() == 0 {
                continue;
            }
            if matcher.keyword && rest[found.end()..].chars().next().map_or(false, is_identifier_part)
            {
                continue;
            }

            if let Some(msg) = matcher.error {
                let end = self.column_at(self.pos + found.end());
                return Err(Error::lexical(self.line_no, end, msg).with_source_line(Some(&self.line)));
            }

            let mut consumed = found.end();
            if matcher.push_back_eol && found.as_str().ends_with('\n') {
                consumed -= 1;
            }
            let text = (matcher.process)(&rest[..consumed]);

            self.pos += consumed;
            if let Some(mode) = matcher.next_mode {
                debug!(from = ?self.mode, to = ?mode, line = self.line_no, "tokenizer mode");
                self.mode = mode;
            }
            return Ok(Token::new(matcher.kind, text, self.line_no, column));
        }

        let c = rest.chars().next().unwrap_or('\n');
        Err(
            Error::lexical(self.line_no, column, &format!("unexpected char: <{}>", c))
                .with_source_line(Some(&self.line)),
        )
    }

    fn column_at(&self, byte: usize) -> usize {
        self.line[..byte].chars().count() + 1
    }

    fn read_line(&mut self) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }

        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            self.exhausted = true;
            return Ok(false);
        }

        if buf.ends_with("\r\n") {
            buf.truncate(buf.len() - 2);
            buf.push('\n');
        } else if buf.ends_with('\r') {
            buf.pop();
            buf.push('\n');
        }

        self.line = buf;
        self.line_no += 1;
        self.pos = 0;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TokenKind::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        let mut tokenizer = Tokenizer::from_str(input);
        let mut kinds = Vec::new();
        loop {
            let token = tokenizer.next().unwrap();
            if token.kind == Eof {
                break;
            }
            kinds.push(token.kind);
        }
        kinds
    }

    fn texts(input: &str) -> Vec<(TokenKind, String)> {
        let mut tokenizer = Tokenizer::from_str(input);
        let mut tokens = Vec::new();
        loop {
            let token = tokenizer.next().unwrap();
            if token.kind == Eof {
                break;
            }
            if token.kind != Whitespace && token.kind != Eol {
                tokens.push((token.kind, token.text));
            }
        }
        tokens
    }

    #[test]
    fn test_simple_tag() {
        assert_eq!(
            kinds("ns:tag1 1 a=true;\n"),
            vec![
                Identifier, Colon, Identifier, Whitespace, Integer, Whitespace, Identifier, Equal,
                Boolean, Semicolon, Eol
            ]
        );
    }

    #[test]
    fn test_numbers_precedence() {
        assert_eq!(
            texts("456L 1.2F 3D 10BD 1.5 7 -3 +4"),
            vec![
                (Integer, "456L".to_string()),
                (Float, "1.2F".to_string()),
                (Float, "3D".to_string()),
                (Float, "10BD".to_string()),
                (Float, "1.5".to_string()),
                (Integer, "7".to_string()),
                (Integer, "-3".to_string()),
                (Integer, "+4".to_string()),
            ]
        );
        assert_eq!(texts("1.2.2"), vec![(Float, "1.2.2".to_string())]);
    }

    #[test]
    fn test_dates_and_times() {
        assert_eq!(
            texts("2008/06/01 12:34 5d:12:34:56.789 -10:20-JST+2"),
            vec![
                (Date, "2008/06/01".to_string()),
                (TimeOrTimespan, "12:34".to_string()),
                (TimeOrTimespan, "5d:12:34:56.789".to_string()),
                (TimeOrTimespan, "-10:20-JST+2".to_string()),
            ]
        );
    }

    #[test]
    fn test_keywords_need_word_boundary() {
        assert_eq!(
            texts("on office nullable null true_value false"),
            vec![
                (Boolean, "on".to_string()),
                (Identifier, "office".to_string()),
                (Identifier, "nullable".to_string()),
                (Null, "null".to_string()),
                (Identifier, "true_value".to_string()),
                (Boolean, "false".to_string()),
            ]
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            texts("# one\n-- two\n// three\na /* inline */ b"),
            vec![
                (OneLineComment, " one".to_string()),
                (OneLineComment, " two".to_string()),
                (OneLineComment, " three".to_string()),
                (Identifier, "a".to_string()),
                (InlineComment, " inline ".to_string()),
                (Identifier, "b".to_string()),
            ]
        );
    }

    #[test]
    fn test_multiline_comment_mode() {
        let mut tokenizer = Tokenizer::from_str("/* start\nmiddle\nend */ x");
        assert_eq!(tokenizer.next().unwrap().kind, MultilineCommentStart);
        assert_eq!(tokenizer.mode(), Mode::MultilineComment);
        assert_eq!(tokenizer.next().unwrap().kind, Eol);
        assert_eq!(tokenizer.next().unwrap().kind, MultilineCommentPart);
        assert_eq!(tokenizer.next().unwrap().kind, Eol);
        let end = tokenizer.next().unwrap();
        assert_eq!(end.kind, MultilineCommentEnd);
        assert_eq!(end.text, "end ");
        assert_eq!(tokenizer.mode(), Mode::Top);
        assert_eq!(tokenizer.next().unwrap().kind, Whitespace);
        assert_eq!(tokenizer.next().unwrap().kind, Identifier);
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            texts(r#"'x' '\n' `raw \n` "esc \" aped""#),
            vec![
                (Character, "x".to_string()),
                (Character, r"\n".to_string()),
                (InlineBackquoteString, r"raw \n".to_string()),
                (InlineDoubleQuoteString, r#"esc \" aped"#.to_string()),
            ]
        );
    }

    #[test]
    fn test_multiline_backquote_keeps_line_breaks() {
        assert_eq!(
            texts("`first\nsecond\nthird`"),
            vec![
                (MultilineBackquoteStringStart, "first\n".to_string()),
                (MultilineBackquoteStringPart, "second\n".to_string()),
                (MultilineBackquoteStringEnd, "third".to_string()),
            ]
        );
    }

    #[test]
    fn test_multiline_double_quote() {
        assert_eq!(
            texts("\"abc \\\n    def\\\n  ghi\""),
            vec![
                (MultilineDoubleQuoteStringStart, "abc ".to_string()),
                (MultilineDoubleQuoteStringPart, "def".to_string()),
                (MultilineDoubleQuoteStringEnd, "ghi".to_string()),
            ]
        );
    }

    #[test]
    fn test_binary() {
        assert_eq!(
            texts("[aGVs bG8=] [\n  aGVs\n  bG8=\n]"),
            vec![
                (InlineBinary, "aGVsbG8=".to_string()),
                (MultilineBinaryStart, String::new()),
                (MultilineBinaryPart, "aGVs".to_string()),
                (MultilineBinaryPart, "bG8=".to_string()),
                (MultilineBinaryEnd, String::new()),
            ]
        );
    }

    #[test]
    fn test_line_continuation() {
        assert_eq!(
            kinds("a 1 \\\n 2"),
            vec![Identifier, Whitespace, Integer, Whitespace, LineContinuation, Whitespace, Integer]
        );
    }

    #[test]
    fn test_crlf_is_normalized() {
        assert_eq!(
            kinds("a\r\nb\r\nc\r"),
            vec![Identifier, Eol, Identifier, Eol, Identifier, Eol]
        );
    }

    #[test]
    fn test_eof_is_idempotent() {
        let mut tokenizer = Tokenizer::from_str("a");
        assert_eq!(tokenizer.next().unwrap().kind, Identifier);
        let eof = tokenizer.next().unwrap();
        assert_eq!(eof.kind, Eof);
        assert_eq!((eof.line, eof.column), (1, 2));
        assert_eq!(tokenizer.next().unwrap(), eof);
        assert_eq!(tokenizer.next().unwrap(), eof);
    }

    #[test]
    fn test_empty_input() {
        let mut tokenizer = Tokenizer::from_str("");
        let eof = tokenizer.next().unwrap();
        assert_eq!(eof.kind, Eof);
        assert_eq!((eof.line, eof.column), (1, 1));
    }

    #[test]
    fn test_unread() {
        let mut tokenizer = Tokenizer::from_str("a b");
        let first = tokenizer.next().unwrap();
        tokenizer.unread().unwrap();
        assert!(matches!(tokenizer.unread(), Err(Error::Usage(_))));
        assert_eq!(tokenizer.next().unwrap(), first);
        assert_eq!(tokenizer.next().unwrap().kind, Whitespace);
    }

    #[test]
    fn test_unread_before_read_fails() {
        let mut tokenizer = Tokenizer::from_str("a");
        assert!(matches!(tokenizer.unread(), Err(Error::Usage(_))));
    }

    #[test]
    fn test_unexpected_char() {
        let mut tokenizer = Tokenizer::from_str("a *");
        tokenizer.next().unwrap();
        tokenizer.next().unwrap();
        let err = tokenizer.next().unwrap_err();
        assert!(matches!(err, Error::Lexical { .. }));
        assert_eq!((err.line(), err.column()), (Some(1), Some(3)));
        assert_eq!(err.source_line(), Some("a *"));
        assert!(err.to_string().contains("unexpected char: <*>"));
    }

    #[test]
    fn test_unclosed_string_points_past_the_text() {
        let mut tokenizer = Tokenizer::from_str("tag1 \"text\\\"");
        tokenizer.next().unwrap();
        tokenizer.next().unwrap();
        let err = tokenizer.next().unwrap_err();
        assert_eq!((err.line(), err.column()), (Some(1), Some(13)));
    }

    #[test]
    fn test_columns_count_characters() {
        let mut tokenizer = Tokenizer::from_str("漢字 x");
        assert_eq!(tokenizer.next().unwrap().column, 1);
        assert_eq!(tokenizer.next().unwrap().column, 3);
        assert_eq!(tokenizer.next().unwrap().column, 4);
    }
}
