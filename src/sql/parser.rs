//! SQL statement classifier.
//!
//! The [`Parser`] classifies a statement by its leading keyword and extracts
//! the pieces each kind needs. It is deliberately shallow: select-list
//! expressions, WHERE and ORDER BY tails are sliced out of the source text by
//! token span rather than parsed into expression trees.

use super::error::{Span, SyntaxError};
use super::escape::{count_parameters, preprocess};
use super::lexer::Lexer;
use super::query::*;
use super::token::{Keyword, Token, TokenKind};
use crate::eval::parse_literal;

/// Pseudo-tables that stand in for "no table" in literal SELECTs.
const PSEUDO_TABLES: &[&str] = &["DUAL", "RDB$DATABASE"];

/// Preprocesses escape sequences in `sql` and classifies the result.
///
/// # Errors
///
/// Returns a [`SyntaxError`] for empty input, unsupported statement kinds and
/// statements missing a required clause (INTO, VALUES, FROM, ...).
pub fn parse_sql(sql: &str) -> Result<ParsedQuery, SyntaxError> {
    let sql = preprocess(sql);
    Parser::new(&sql).parse()
}

/// SQL statement classifier over a token vector.
pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    input: &'a str,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given (already preprocessed) SQL.
    pub fn new(input: &'a str) -> Self {
        Self {
            tokens: Lexer::new(input).collect(),
            pos: 0,
            input,
        }
    }

    /// Classifies the input.
    pub fn parse(&mut self) -> Result<ParsedQuery, SyntaxError> {
        if self.is_eof() {
            return Err(SyntaxError::new("empty statement", Span::at(0)));
        }
        let query = self.parse_statement()?;
        Ok(ParsedQuery {
            query,
            param_count: count_parameters(self.input),
        })
    }

    fn parse_statement(&mut self) -> Result<Query, SyntaxError> {
        let span = self.current_span();
        match self.peek_kind() {
            Some(TokenKind::Keyword(Keyword::Create)) => {
                self.advance();
                self.expect_keyword(Keyword::Table)?;
                self.parse_create_table_stmt()
            }
            Some(TokenKind::Keyword(Keyword::Drop)) => {
                self.advance();
                self.expect_keyword(Keyword::Table)?;
                self.parse_drop_table_stmt()
            }
            Some(TokenKind::Keyword(Keyword::Select)) => {
                self.advance();
                self.parse_select_stmt()
            }
            Some(TokenKind::Keyword(Keyword::Insert)) => {
                self.advance();
                self.parse_insert_stmt()
            }
            Some(TokenKind::Keyword(Keyword::Update)) => {
                self.advance();
                let table = self.parse_object_name()?;
                let filter = self.where_tail();
                Ok(Query::Update(MutationStmt { table, filter }))
            }
            Some(TokenKind::Keyword(Keyword::Delete)) => {
                self.advance();
                self.expect_keyword(Keyword::From)?;
                let table = self.parse_object_name()?;
                let filter = self.where_tail();
                Ok(Query::Delete(MutationStmt { table, filter }))
            }
            Some(TokenKind::Error(msg)) => Err(SyntaxError::new(msg.clone(), span)),
            _ => Err(SyntaxError::new(
                format!("unsupported statement starting with {}", self.current_token_name()),
                span,
            )),
        }
    }

    // ==================== CREATE / DROP ====================

    fn parse_create_table_stmt(&mut self) -> Result<Query, SyntaxError> {
        let if_not_exists = if self.consume_keyword(Keyword::If) {
            self.expect_keyword(Keyword::Not)?;
            self.expect_keyword(Keyword::Exists)?;
            true
        } else {
            false
        };
        let name = self.parse_object_name()?;
        self.expect_token(TokenKind::LParen)?;

        let mut columns = Vec::new();
        loop {
            if self.at_table_constraint() {
                self.skip_definition()?;
            } else {
                columns.push(self.parse_column_def()?);
            }
            if !self.consume_token(TokenKind::Comma) {
                break;
            }
        }
        self.expect_token(TokenKind::RParen)?;

        Ok(Query::CreateTable(CreateTableStmt {
            name,
            columns,
            if_not_exists,
        }))
    }

    /// A definition opening with `PRIMARY KEY`, `FOREIGN KEY`, `UNIQUE (`, `CHECK (`
    /// or `CONSTRAINT name`. A lone `KEY` or `CHECK` is a column name.
    fn at_table_constraint(&self) -> bool {
        let kind = |n: usize| self.tokens.get(self.pos + n).map(|t| &t.kind);
        match kind(0) {
            Some(TokenKind::Keyword(Keyword::Primary | Keyword::Foreign)) => {
                matches!(kind(1), Some(TokenKind::Keyword(Keyword::Key)))
            }
            Some(TokenKind::Keyword(Keyword::Unique | Keyword::Check)) => {
                matches!(kind(1), Some(TokenKind::LParen))
            }
            Some(TokenKind::Keyword(Keyword::Constraint)) => {
                matches!(kind(2), Some(TokenKind::Keyword(_)))
            }
            _ => false,
        }
    }

    /// Parses `name type[(p[, s])] [constraints...]`. Constraints are skipped.
    fn parse_column_def(&mut self) -> Result<ColumnDef, SyntaxError> {
        let name = self.expect_identifier()?;

        let mut type_name = match self.peek_kind() {
            Some(TokenKind::Identifier(word)) => word.to_ascii_uppercase(),
            _ => {
                return Err(SyntaxError::expected(
                    "type name",
                    self.current_token_name(),
                    self.current_span(),
                ));
            }
        };
        self.advance();
        while let Some(TokenKind::Identifier(word)) = self.peek_kind() {
            let word = word.to_ascii_uppercase();
            if word != "PRECISION" && word != "VARYING" {
                break;
            }
            type_name.push(' ');
            type_name.push_str(&word);
            self.advance();
        }

        let mut type_params = Vec::new();
        if self.consume_token(TokenKind::LParen) {
            loop {
                type_params.push(self.expect_size()?);
                if !self.consume_token(TokenKind::Comma) {
                    break;
                }
            }
            self.expect_token(TokenKind::RParen)?;
        }

        self.skip_definition()?;
        Ok(ColumnDef {
            name,
            type_name,
            type_params,
        })
    }

    /// Skips to the next top-level `,` or the closing `)` of a definition list.
    fn skip_definition(&mut self) -> Result<(), SyntaxError> {
        let mut depth = 0usize;
        loop {
            match self.peek_kind() {
                None | Some(TokenKind::Eof) => {
                    return Err(SyntaxError::truncated("')'", self.input.len()));
                }
                Some(TokenKind::Comma | TokenKind::RParen) if depth == 0 => return Ok(()),
                Some(TokenKind::LParen) => depth += 1,
                Some(TokenKind::RParen) => depth -= 1,
                _ => {}
            }
            self.advance();
        }
    }

    fn parse_drop_table_stmt(&mut self) -> Result<Query, SyntaxError> {
        let if_exists = if self.consume_keyword(Keyword::If) {
            self.expect_keyword(Keyword::Exists)?;
            true
        } else {
            false
        };
        let name = self.parse_object_name()?;
        Ok(Query::DropTable(DropTableStmt { name, if_exists }))
    }

    // ==================== SELECT ====================

    fn parse_select_stmt(&mut self) -> Result<Query, SyntaxError> {
        let list_start = self.pos;
        let end = self.statement_end();

        let Some(from) = self.find_keyword(list_start, Keyword::From) else {
            return self.parse_literal_select(list_start, end);
        };

        self.pos = from + 1;
        let table = self.parse_object_name()?;
        if PSEUDO_TABLES.iter().any(|t| t.eq_ignore_ascii_case(&table)) {
            return self.parse_literal_select(list_start, from);
        }

        let projection = self.parse_projection(list_start, from)?;
        let filter = self.where_tail().or_else(|| {
            self.find_keyword(self.pos, Keyword::Order)
                .map(|i| self.tail_text(self.tokens[i].span.start))
        });

        Ok(Query::Select(SelectStmt {
            table,
            projection,
            filter,
        }))
    }

    fn parse_literal_select(&self, start: usize, end: usize) -> Result<Query, SyntaxError> {
        let mut items = Vec::new();
        for (n, (a, b)) in self.split_items(start, end)?.into_iter().enumerate() {
            let (expr_end, alias) = match self.find_alias(a, b)? {
                Some((as_pos, alias)) => (as_pos, alias),
                None => (b, format!("EXPR_{}", n + 1)),
            };
            let expr = self.slice(a, expr_end);
            let parameter = if parse_literal(&expr).is_parameter {
                self.first_parameter_ordinal(a, expr_end)
            } else {
                None
            };
            items.push(LiteralItem {
                expr,
                alias,
                parameter,
            });
        }
        Ok(Query::LiteralSelect(LiteralSelectStmt { items }))
    }

    fn parse_projection(&self, start: usize, end: usize) -> Result<Projection, SyntaxError> {
        let kinds: Vec<&TokenKind> = self.tokens[start..end].iter().map(|t| &t.kind).collect();
        match kinds.as_slice() {
            [TokenKind::Asterisk] => return Ok(Projection::All),
            [TokenKind::Identifier(f), TokenKind::LParen, TokenKind::Asterisk, TokenKind::RParen, ..]
                if f.eq_ignore_ascii_case("COUNT") =>
            {
                return Ok(Projection::CountStar);
            }
            _ => {}
        }

        let mut columns = Vec::new();
        for (a, b) in self.split_items(start, end)? {
            let (name_end, alias) = match self.find_alias(a, b)? {
                Some((as_pos, alias)) => (as_pos, Some(alias)),
                None => (b, None),
            };
            let name = match &self.tokens[a..name_end] {
                [token] => self.name_of(token).unwrap_or_else(|| self.slice(a, name_end)),
                [qualifier, dot, column]
                    if self.name_of(qualifier).is_some() && dot.kind == TokenKind::Dot =>
                {
                    self.name_of(column).unwrap_or_else(|| self.slice(a, name_end))
                }
                _ => self.slice(a, name_end),
            };
            columns.push(SelectColumn { name, alias });
        }
        Ok(Projection::Columns(columns))
    }

    // ==================== INSERT ====================

    fn parse_insert_stmt(&mut self) -> Result<Query, SyntaxError> {
        self.expect_keyword(Keyword::Into)?;
        let table = self.parse_object_name()?;

        let mut columns = Vec::new();
        if self.consume_token(TokenKind::LParen) {
            columns.push(self.expect_identifier()?);
            while self.consume_token(TokenKind::Comma) {
                columns.push(self.expect_identifier()?);
            }
            self.expect_token(TokenKind::RParen)?;
        }

        self.expect_keyword(Keyword::Values)?;
        self.expect_token(TokenKind::LParen)?;
        let start = self.pos;
        let mut depth = 0usize;
        let close = loop {
            match self.peek_kind() {
                None | Some(TokenKind::Eof) => {
                    return Err(SyntaxError::truncated("')'", self.input.len()));
                }
                Some(TokenKind::RParen) if depth == 0 => break self.pos,
                Some(TokenKind::LParen) => depth += 1,
                Some(TokenKind::RParen) => depth -= 1,
                _ => {}
            }
            self.advance();
        };

        let mut values = Vec::new();
        for (a, b) in self.split_items(start, close)? {
            let literal = parse_literal(&self.slice(a, b));
            let value = match self.first_parameter_ordinal(a, b) {
                Some(ordinal) if literal.is_parameter => InsertValue::Parameter(ordinal),
                _ => InsertValue::Literal(literal.value),
            };
            values.push(value);
        }
        self.pos = close + 1;

        Ok(Query::Insert(InsertStmt {
            table,
            columns,
            values,
        }))
    }

    // ==================== Token-range helpers ====================

    /// Returns the index one past the last meaningful token (trailing `;`
    /// and EOF excluded).
    fn statement_end(&self) -> usize {
        let mut end = self
            .tokens
            .iter()
            .position(Token::is_eof)
            .unwrap_or(self.tokens.len());
        while end > self.pos && self.tokens[end - 1].kind == TokenKind::Semicolon {
            end -= 1;
        }
        end
    }

    /// Finds `kw` at parenthesis depth 0, scanning from token index `from`.
    fn find_keyword(&self, from: usize, kw: Keyword) -> Option<usize> {
        let mut depth = 0i32;
        for (i, token) in self.tokens.iter().enumerate().skip(from) {
            match &token.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => depth -= 1,
                TokenKind::Keyword(k) if *k == kw && depth == 0 => return Some(i),
                TokenKind::Eof => return None,
                _ => {}
            }
        }
        None
    }

    /// Splits tokens `[start, end)` at top-level commas into non-empty ranges.
    fn split_items(&self, start: usize, end: usize) -> Result<Vec<(usize, usize)>, SyntaxError> {
        let mut items = Vec::new();
        let mut depth = 0i32;
        let mut item_start = start;
        for i in start..=end {
            let at_end = i == end;
            if !at_end {
                match self.tokens[i].kind {
                    TokenKind::LParen => depth += 1,
                    TokenKind::RParen => depth -= 1,
                    _ => {}
                }
            }
            if at_end || (depth == 0 && self.tokens[i].kind == TokenKind::Comma) {
                if i == item_start {
                    let span = self.tokens.get(i).map_or(Span::at(self.input.len()), |t| t.span);
                    return Err(SyntaxError::new("expected expression", span));
                }
                items.push((item_start, i));
                item_start = i + 1;
            }
        }
        Ok(items)
    }

    /// Finds a top-level `AS alias` in `[start, end)`. Returns the position of
    /// `AS` and the alias.
    fn find_alias(&self, start: usize, end: usize) -> Result<Option<(usize, String)>, SyntaxError> {
        let mut depth = 0i32;
        for i in start..end {
            match self.tokens[i].kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => depth -= 1,
                TokenKind::Keyword(Keyword::As) if depth == 0 => {
                    let alias = self
                        .tokens
                        .get(i + 1)
                        .filter(|_| i + 1 < end)
                        .and_then(|t| match &t.kind {
                            TokenKind::String(s) => Some(s.clone()),
                            _ => self.name_of(t),
                        });
                    return match alias {
                        Some(alias) => Ok(Some((i, alias))),
                        None => {
                            let span = self.tokens.get(i + 1).map_or(Span::at(self.input.len()), |t| t.span);
                            Err(SyntaxError::new("expected alias after AS", span))
                        }
                    };
                }
                _ => {}
            }
        }
        Ok(None)
    }

    /// Returns the 1-based ordinal of the first `?` within `[start, end)`.
    fn first_parameter_ordinal(&self, start: usize, end: usize) -> Option<usize> {
        let first = (start..end).find(|&i| self.tokens[i].kind == TokenKind::Parameter)?;
        let before = self.tokens[..first]
            .iter()
            .filter(|t| t.kind == TokenKind::Parameter)
            .count();
        Some(before + 1)
    }

    /// Returns the source text spanned by tokens `[start, end)`.
    fn slice(&self, start: usize, end: usize) -> String {
        if start >= end {
            return String::new();
        }
        self.tokens[start]
            .span
            .to(self.tokens[end - 1].span)
            .slice(self.input)
            .to_string()
    }

    /// Returns the source text from byte offset `from` to the end of the
    /// statement, without a trailing `;`.
    fn tail_text(&self, from: usize) -> String {
        self.input[from..].trim().trim_end_matches(';').trim_end().to_string()
    }

    /// Returns the raw text after a top-level WHERE at or after the cursor.
    fn where_tail(&self) -> Option<String> {
        self.find_keyword(self.pos, Keyword::Where)
            .map(|i| self.tail_text(self.tokens[i].span.end))
    }

    // ==================== Helper methods ====================

    /// Returns true if at end of tokens.
    fn is_eof(&self) -> bool {
        self.peek().is_none_or(|t| t.is_eof())
    }

    /// Peeks at the current token.
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// Peeks at the kind of the current token.
    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    /// Returns the span of the current token.
    fn current_span(&self) -> Span {
        self.peek().map_or(Span::at(self.input.len()), |t| t.span)
    }

    /// Returns a display name for the current token.
    fn current_token_name(&self) -> String {
        self.peek()
            .map_or("end of input".to_string(), |t| t.kind.to_string())
    }

    /// Consumes the current token if it's a specific keyword.
    fn consume_keyword(&mut self, kw: Keyword) -> bool {
        if self.peek().is_some_and(|t| t.is_keyword(kw)) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expects a specific keyword, returning an error if not found.
    fn expect_keyword(&mut self, kw: Keyword) -> Result<(), SyntaxError> {
        if self.consume_keyword(kw) {
            Ok(())
        } else {
            Err(SyntaxError::expected(
                &format!("keyword '{}'", kw.as_str()),
                self.current_token_name(),
                self.current_span(),
            ))
        }
    }

    /// Consumes the current token if it matches.
    fn consume_token(&mut self, kind: TokenKind) -> bool {
        if self.peek_kind() == Some(&kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expects a specific token, returning an error if not found.
    fn expect_token(&mut self, kind: TokenKind) -> Result<(), SyntaxError> {
        if self.consume_token(kind.clone()) {
            Ok(())
        } else {
            Err(SyntaxError::expected(
                &kind.to_string(),
                self.current_token_name(),
                self.current_span(),
            ))
        }
    }

    fn name_of(&self, token: &Token) -> Option<String> {
        token.name(self.input).map(str::to_string)
    }

    /// Expects an identifier or non-reserved keyword, returning its name.
    fn expect_identifier(&mut self) -> Result<String, SyntaxError> {
        match self.peek().and_then(|t| self.name_of(t)) {
            Some(name) => {
                self.advance();
                Ok(name)
            }
            None => Err(SyntaxError::expected(
                "identifier",
                self.current_token_name(),
                self.current_span(),
            )),
        }
    }

    /// Parses a possibly qualified name (`schema.table`), keeping the last part.
    fn parse_object_name(&mut self) -> Result<String, SyntaxError> {
        let mut name = self.expect_identifier()?;
        while self.consume_token(TokenKind::Dot) {
            name = self.expect_identifier()?;
        }
        Ok(name)
    }

    /// Expects an unsigned integer size argument.
    fn expect_size(&mut self) -> Result<usize, SyntaxError> {
        let span = self.current_span();
        match self.peek_kind() {
            Some(TokenKind::Number(n)) => {
                let size = n
                    .parse::<usize>()
                    .map_err(|_| SyntaxError::new(format!("invalid size '{n}'"), span))?;
                self.advance();
                Ok(size)
            }
            _ => Err(SyntaxError::expected(
                "size",
                self.current_token_name(),
                span,
            )),
        }
    }
}
