//! SQL lexer/tokenizer.
//!
//! The [`Lexer`] converts a SQL string into a stream of [`Token`]s.

use super::error::Span;
use super::token::{Keyword, Token, TokenKind};

/// SQL lexer that tokenizes input strings.
///
/// The lexer implements `Iterator<Item = Token>`. It handles:
/// - Keywords (case-insensitive)
/// - Identifiers (unquoted, with `$` and `#` allowed after the first
///   character, and double-quoted)
/// - Numeric literals
/// - String literals (single-quoted with '' escape)
/// - Parameter markers, operators and punctuation
/// - Comments (-- line comments and /* */ block comments)
///
/// Lexical errors are returned as `TokenKind::Error` tokens rather than
/// being accumulated separately.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    /// Whether EOF has been returned.
    eof_returned: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            eof_returned: false,
        }
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.input[self.pos..].starts_with(prefix)
    }

    /// Returns the character at `pos + offset` without consuming it.
    fn peek(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    /// Advances the position by `n` characters.
    fn advance(&mut self, n: usize) {
        for _ in 0..n {
            if let Some(ch) = self.peek(0) {
                self.pos += ch.len_utf8();
            }
        }
    }

    fn advance_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek(0).is_some_and(&pred) {
            self.advance(1);
        }
    }

    /// Skips whitespace and comments.
    ///
    /// Returns an error token for an unterminated block comment.
    fn skip_whitespace_and_comments(&mut self) -> Option<Token> {
        loop {
            self.advance_while(char::is_whitespace);
            if self.starts_with("--") {
                self.advance_while(|ch| ch != '\n');
                continue;
            }
            if self.starts_with("/*") {
                let start = self.pos;
                match self.input[self.pos + 2..].find("*/") {
                    Some(end) => self.pos += 2 + end + 2,
                    None => {
                        self.pos = self.input.len();
                        return Some(Token::new(
                            TokenKind::Error("unterminated block comment".to_string()),
                            Span::new(start, self.pos),
                        ));
                    }
                }
                continue;
            }
            return None;
        }
    }

    /// Scans the next token from the input.
    fn scan_token(&mut self) -> Token {
        if let Some(error_token) = self.skip_whitespace_and_comments() {
            return error_token;
        }

        let start = self.pos;
        let Some(ch) = self.peek(0) else {
            return Token::new(TokenKind::Eof, Span::at(start));
        };

        if ch == '\'' {
            return self.scan_quoted('\'');
        }
        if ch == '"' {
            return self.scan_quoted('"');
        }
        if ch.is_ascii_digit() || (ch == '.' && self.peek(1).is_some_and(|c| c.is_ascii_digit())) {
            return self.scan_number();
        }
        if is_ident_start(ch) {
            return self.scan_identifier_or_keyword();
        }
        self.scan_operator_or_punctuation()
    }

    /// Scans a `'string'` or `"identifier"`, unescaping doubled quotes.
    fn scan_quoted(&mut self, quote: char) -> Token {
        let start = self.pos;
        self.advance(1);

        let mut value = String::new();
        let mut terminated = false;
        while let Some(ch) = self.peek(0) {
            self.advance(1);
            if ch == quote {
                if self.peek(0) == Some(quote) {
                    value.push(quote);
                    self.advance(1);
                } else {
                    terminated = true;
                    break;
                }
            } else {
                value.push(ch);
            }
        }

        let span = Span::new(start, self.pos);
        match (terminated, quote) {
            (false, '\'') => Token::new(
                TokenKind::Error("unterminated string literal".to_string()),
                span,
            ),
            (false, _) => Token::new(
                TokenKind::Error("unterminated quoted identifier".to_string()),
                span,
            ),
            (true, '\'') => Token::new(TokenKind::String(value), span),
            (true, _) => Token::new(TokenKind::QuotedIdentifier(value), span),
        }
    }

    fn scan_number(&mut self) -> Token {
        let start = self.pos;
        self.advance_while(|c| c.is_ascii_digit());
        if self.peek(0) == Some('.') {
            self.advance(1);
            self.advance_while(|c| c.is_ascii_digit());
        }
        if matches!(self.peek(0), Some('e' | 'E'))
            && (self.peek(1).is_some_and(|c| c.is_ascii_digit())
                || (matches!(self.peek(1), Some('+' | '-'))
                    && self.peek(2).is_some_and(|c| c.is_ascii_digit())))
        {
            self.advance(2);
            self.advance_while(|c| c.is_ascii_digit());
        }
        let span = Span::new(start, self.pos);
        Token::new(TokenKind::Number(self.input[start..self.pos].to_string()), span)
    }

    fn scan_identifier_or_keyword(&mut self) -> Token {
        let start = self.pos;
        self.advance_while(is_ident_continue);

        let ident = &self.input[start..self.pos];
        let span = Span::new(start, self.pos);
        match Keyword::parse(ident) {
            Some(kw) => Token::new(TokenKind::Keyword(kw), span),
            None => Token::new(TokenKind::Identifier(ident.to_string()), span),
        }
    }

    fn scan_operator_or_punctuation(&mut self) -> Token {
        let start = self.pos;

        for op in ["<>", "!=", "<=", ">=", "||"] {
            if self.starts_with(op) {
                self.pos += 2;
                return Token::new(
                    TokenKind::Operator(op.to_string()),
                    Span::new(start, self.pos),
                );
            }
        }

        let Some(ch) = self.peek(0) else {
            return Token::new(TokenKind::Eof, Span::at(start));
        };
        self.advance(1);
        let kind = match ch {
            '?' => TokenKind::Parameter,
            '*' => TokenKind::Asterisk,
            '=' => TokenKind::Eq,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '.' => TokenKind::Dot,
            '+' | '-' | '/' | '%' | '<' | '>' | '!' | '@' | ':' | '&' | '|' | '^' | '~' => {
                TokenKind::Operator(ch.to_string())
            }
            _ => TokenKind::Error(format!("unexpected character '{ch}'")),
        };

        Token::new(kind, Span::new(start, self.pos))
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.eof_returned {
            return None;
        }

        let token = self.scan_token();
        if token.is_eof() {
            self.eof_returned = true;
        }
        Some(token)
    }
}

/// Returns true if the character can start an identifier.
fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

/// Returns true if the character can continue an identifier.
fn is_ident_continue(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '$' | '#')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<TokenKind> {
        Lexer::new(input).map(|t| t.kind).collect()
    }

    fn ident(s: &str) -> TokenKind {
        TokenKind::Identifier(s.to_string())
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(lex(""), vec![TokenKind::Eof]);
        assert_eq!(lex("  \n\t  "), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_keywords_case_insensitive() {
        assert_eq!(
            lex("select FROM WhErE"),
            vec![
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Keyword(Keyword::From),
                TokenKind::Keyword(Keyword::Where),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_identifiers_with_dollar() {
        assert_eq!(
            lex("RDB$DATABASE user_id #tmp"),
            vec![
                ident("RDB$DATABASE"),
                ident("user_id"),
                TokenKind::Error("unexpected character '#'".to_string()),
                ident("tmp"),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_quoted() {
        assert_eq!(
            lex(r#"'it''s' "my col""#),
            vec![
                TokenKind::String("it's".to_string()),
                TokenKind::QuotedIdentifier("my col".to_string()),
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            lex("'open"),
            vec![
                TokenKind::Error("unterminated string literal".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            lex("42 3.14 .5 1e10"),
            vec![
                TokenKind::Number("42".to_string()),
                TokenKind::Number("3.14".to_string()),
                TokenKind::Number(".5".to_string()),
                TokenKind::Number("1e10".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_operators_and_punctuation() {
        assert_eq!(
            lex("( ? , * = <> ) ; {"),
            vec![
                TokenKind::LParen,
                TokenKind::Parameter,
                TokenKind::Comma,
                TokenKind::Asterisk,
                TokenKind::Eq,
                TokenKind::Operator("<>".to_string()),
                TokenKind::RParen,
                TokenKind::Semicolon,
                TokenKind::LBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            lex("SELECT -- trailing\n/* block */ 1"),
            vec![
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Number("1".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_spans() {
        let tokens: Vec<Token> = Lexer::new("SELECT  x").collect();
        assert_eq!(tokens[0].span, Span::new(0, 6));
        assert_eq!(tokens[1].span, Span::new(8, 9));
        assert_eq!(tokens[2].span, Span::at(9));
    }
}
