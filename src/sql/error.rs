//! Classifier errors with byte spans into the (preprocessed) statement text.

use thiserror::Error;

/// Half-open byte range `start..end` in the statement text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Empty span at `pos`, used for end of input.
    pub fn at(pos: usize) -> Self {
        Self::new(pos, pos)
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// The covered text of `input`.
    pub fn slice(self, input: &str) -> &str {
        input.get(self.start..self.end).unwrap_or_default()
    }
}

/// A statement the classifier cannot extract. Reported as SQLSTATE 42000.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at position {}", .span.start + 1)]
pub struct SyntaxError {
    pub message: String,
    pub span: Span,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }

    /// `expected X, found Y` at the offending token.
    pub fn expected(expected: &str, found: impl std::fmt::Display, span: Span) -> Self {
        Self::new(format!("expected {expected}, found {found}"), span)
    }

    /// Input ended while `expected` was still required.
    pub fn truncated(expected: &str, len: usize) -> Self {
        Self::new(format!("unexpected end of input, expected {expected}"), Span::at(len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_cover_and_slice() {
        let sql = "SELECT a FROM t";
        let span = Span::new(7, 8).to(Span::new(14, 15));
        assert_eq!(span, Span::new(7, 15));
        assert_eq!(span.slice(sql), "a FROM t");
        assert_eq!(Span::new(10, 99).slice(sql), "");
    }

    #[test]
    fn test_display_is_one_based() {
        let err = SyntaxError::expected("INTO", "identifier 'USERS'", Span::at(7));
        assert_eq!(err.to_string(), "expected INTO, found identifier 'USERS' at position 8");
        assert_eq!(
            SyntaxError::truncated("')'", 4).to_string(),
            "unexpected end of input, expected ')' at position 5"
        );
    }
}
