//! Token types produced by the [`Tokenizer`](crate::tokenizer::Tokenizer).

use std::fmt;

/// The kind of a token.
///
/// Numeric and string tokens keep their raw text (suffixes, escapes); typed
/// conversion happens later in [`literal`](crate::literal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Structure
    /// End of a physical line
    Eol,
    /// Horizontal whitespace
    Whitespace,
    /// `;`
    Semicolon,
    /// `:` between a namespace and a name
    Colon,
    /// `=` between an attribute name and its value
    Equal,
    /// `{`
    BlockStart,
    /// `}`
    BlockEnd,
    /// `\` at the end of a line, outside of any literal
    LineContinuation,

    // Words
    /// Tag, namespace or attribute name
    Identifier,
    /// `true`, `false`, `on` or `off`
    Boolean,
    /// `null`
    Null,

    // Comments
    /// `#`, `--` or `//` up to the end of the line
    OneLineComment,
    /// `/* ... */` closed on the same line
    InlineComment,
    /// `/*` left open at the end of the line
    MultilineCommentStart,
    /// A full line inside a multi-line comment
    MultilineCommentPart,
    /// The line closing a multi-line comment
    MultilineCommentEnd,

    // Literals
    /// `'x'`
    Character,
    /// `` `...` `` closed on the same line
    InlineBackquoteString,
    /// `` ` `` left open at the end of the line
    MultilineBackquoteStringStart,
    /// A full line inside a multi-line backquote string
    MultilineBackquoteStringPart,
    /// The line closing a multi-line backquote string
    MultilineBackquoteStringEnd,
    /// `"..."` closed on the same line
    InlineDoubleQuoteString,
    /// `"...\` continued on the next line
    MultilineDoubleQuoteStringStart,
    /// A continued line inside a multi-line double-quote string
    MultilineDoubleQuoteStringPart,
    /// The line closing a multi-line double-quote string
    MultilineDoubleQuoteStringEnd,
    /// `[base64]` closed on the same line
    InlineBinary,
    /// `[` left open at the end of the line
    MultilineBinaryStart,
    /// A full line inside a multi-line binary literal
    MultilineBinaryPart,
    /// The line closing a multi-line binary literal
    MultilineBinaryEnd,
    /// `2008/06/01`
    Date,
    /// `12:30:00`, `5d:12:30`, `12:30-JST`
    TimeOrTimespan,
    /// `123`, `123L`
    Integer,
    /// `1.5`, `1.5F`, `2D`, `10BD`
    Float,

    /// A double-quoted string reaching the end of its line unclosed.
    /// Never delivered: matching it aborts tokenizing.
    UnclosedString,

    /// End of input
    Eof,
}

impl TokenKind {
    /// Whether this token can start a value.
    #[must_use]
    pub const fn is_value_start(&self) -> bool {
        matches!(
            self,
            TokenKind::Boolean
                | TokenKind::Null
                | TokenKind::Character
                | TokenKind::InlineBackquoteString
                | TokenKind::MultilineBackquoteStringStart
                | TokenKind::InlineDoubleQuoteString
                | TokenKind::MultilineDoubleQuoteStringStart
                | TokenKind::InlineBinary
                | TokenKind::MultilineBinaryStart
                | TokenKind::Date
                | TokenKind::TimeOrTimespan
                | TokenKind::Integer
                | TokenKind::Float
        )
    }

    /// Whether this token starts or is a comment.
    #[must_use]
    pub const fn is_comment(&self) -> bool {
        matches!(
            self,
            TokenKind::OneLineComment | TokenKind::InlineComment | TokenKind::MultilineCommentStart
        )
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            TokenKind::Eol => "end of line",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Semicolon => "';'",
            TokenKind::Colon => "':'",
            TokenKind::Equal => "'='",
            TokenKind::BlockStart => "'{'",
            TokenKind::BlockEnd => "'}'",
            TokenKind::LineContinuation => "line continuation",
            TokenKind::Identifier => "identifier",
            TokenKind::Boolean => "boolean",
            TokenKind::Null => "null",
            TokenKind::OneLineComment
            | TokenKind::InlineComment
            | TokenKind::MultilineCommentStart
            | TokenKind::MultilineCommentPart
            | TokenKind::MultilineCommentEnd => "comment",
            TokenKind::Character => "character",
            TokenKind::InlineBackquoteString
            | TokenKind::MultilineBackquoteStringStart
            | TokenKind::MultilineBackquoteStringPart
            | TokenKind::MultilineBackquoteStringEnd
            | TokenKind::InlineDoubleQuoteString
            | TokenKind::MultilineDoubleQuoteStringStart
            | TokenKind::MultilineDoubleQuoteStringPart
            | TokenKind::MultilineDoubleQuoteStringEnd => "string",
            TokenKind::UnclosedString => "unclosed string",
            TokenKind::InlineBinary
            | TokenKind::MultilineBinaryStart
            | TokenKind::MultilineBinaryPart
            | TokenKind::MultilineBinaryEnd => "binary",
            TokenKind::Date => "date",
            TokenKind::TimeOrTimespan => "time",
            TokenKind::Integer => "integer",
            TokenKind::Float => "float",
            TokenKind::Eof => "end of input",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A token with its kind, processed text and 1-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Text with delimiters stripped (quotes, comment markers, brackets).
    pub text: String,
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Token {
            text: text.into(),
            kind,
            line,
            column,
        }
    }

    #[inline]
    #[must_use]
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.text.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{} {:?}", self.kind, self.text)
        }
    }
}
