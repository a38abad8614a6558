//! SQL token types.
//!
//! This module defines the [`Token`] type produced by the lexer. Only the
//! keywords the statement classifier keys on are recognized; every other word
//! is an identifier.

use std::fmt;

use super::error::Span;

/// A SQL token with its span in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The token kind.
    pub kind: TokenKind,
    /// The span of this token in the source.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns true if this is an end-of-file token.
    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Returns true if this token is the given keyword.
    pub fn is_keyword(&self, kw: Keyword) -> bool {
        self.kind == TokenKind::Keyword(kw)
    }

    /// The name this token spells, if it can name a table or column.
    ///
    /// Non-reserved keywords (`KEY`, `DESC`, ...) count, spelled as in `input`.
    pub fn name<'a>(&'a self, input: &'a str) -> Option<&'a str> {
        match &self.kind {
            TokenKind::Identifier(name) | TokenKind::QuotedIdentifier(name) => Some(name),
            TokenKind::Keyword(kw) if !kw.is_reserved() => Some(self.span.slice(input)),
            _ => None,
        }
    }
}

/// The kind of a SQL token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    /// Numeric literal, kept as written (e.g., `42`, `3.14`, `1e10`).
    Number(String),
    /// String literal with `''` unescaped (e.g., `'it''s'` → `it's`).
    String(String),

    // Identifiers and keywords
    /// Unquoted identifier (e.g., `USERS`, `RDB$DATABASE`).
    Identifier(String),
    /// Double-quoted identifier.
    QuotedIdentifier(String),
    Keyword(Keyword),
    /// Parameter marker `?`.
    Parameter,

    // Operators and punctuation
    /// `*`
    Asterisk,
    /// `=`
    Eq,
    /// Any other operator (`+`, `<>`, `||`, ...).
    Operator(String),
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `.`
    Dot,

    /// Lexical error (e.g., unterminated string literal).
    Error(String),
    /// End of input.
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "number '{n}'"),
            TokenKind::String(s) => write!(f, "string '{s}'"),
            TokenKind::Identifier(s) => write!(f, "identifier '{s}'"),
            TokenKind::QuotedIdentifier(s) => write!(f, "identifier '\"{s}\"'"),
            TokenKind::Keyword(kw) => write!(f, "keyword '{}'", kw.as_str()),
            TokenKind::Parameter => f.write_str("'?'"),
            TokenKind::Asterisk => f.write_str("'*'"),
            TokenKind::Eq => f.write_str("'='"),
            TokenKind::Operator(op) => write!(f, "'{op}'"),
            TokenKind::LParen => f.write_str("'('"),
            TokenKind::RParen => f.write_str("')'"),
            TokenKind::LBrace => f.write_str("'{'"),
            TokenKind::RBrace => f.write_str("'}'"),
            TokenKind::Comma => f.write_str("','"),
            TokenKind::Semicolon => f.write_str("';'"),
            TokenKind::Dot => f.write_str("'.'"),
            TokenKind::Error(msg) => f.write_str(msg),
            TokenKind::Eof => f.write_str("end of input"),
        }
    }
}

macro_rules! keywords {
    ($($variant:ident = $text:literal),* $(,)?) => {
        /// Words the statement classifier keys on, matched case-insensitively.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Keyword {
            $($variant,)*
        }

        impl Keyword {
            const ALL: &'static [Keyword] = &[$(Keyword::$variant,)*];

            /// Uppercase spelling of this keyword.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Keyword::$variant => $text,)*
                }
            }
        }
    };
}

keywords! {
    Create = "CREATE", Table = "TABLE", Drop = "DROP", If = "IF", Not = "NOT", Exists = "EXISTS",
    Select = "SELECT", Insert = "INSERT", Update = "UPDATE", Delete = "DELETE",
    Into = "INTO", Values = "VALUES", Set = "SET", From = "FROM", Where = "WHERE",
    As = "AS", Order = "ORDER", By = "BY", Asc = "ASC", Desc = "DESC",
    In = "IN", Null = "NULL", Cast = "CAST",
    // Column and table constraints, skipped by CREATE TABLE.
    Primary = "PRIMARY", Key = "KEY", Unique = "UNIQUE", References = "REFERENCES",
    Foreign = "FOREIGN", Check = "CHECK", Default = "DEFAULT", Constraint = "CONSTRAINT",
}

impl Keyword {
    /// Looks up a keyword, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kw| kw.as_str().eq_ignore_ascii_case(s))
    }

    /// Statement-structure words. Every other keyword may also name a table or column.
    pub fn is_reserved(&self) -> bool {
        matches!(
            self,
            Keyword::Select
                | Keyword::Insert
                | Keyword::Update
                | Keyword::Delete
                | Keyword::Create
                | Keyword::Drop
                | Keyword::Table
                | Keyword::Into
                | Keyword::Values
                | Keyword::From
                | Keyword::Where
        )
    }
}
