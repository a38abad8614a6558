//! WHERE and ORDER BY interpretation.
//!
//! The classifier keeps the WHERE tail as raw text. Only two predicate shapes
//! are understood:
//!
//! - `col = value` (spaces optional)
//! - `col IN (v1, v2, ...)`
//!
//! followed optionally by `ORDER BY col [ASC|DESC]`. Anything else, including
//! references to unknown columns, applies no filtering.

use crate::catalog::Table;
use crate::cell::{Cell, Row};
use crate::sql::{Keyword, Lexer, Token, TokenKind};

/// An equality or IN-list filter on one column.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Column position in the table.
    pub column: usize,
    /// Accepted values; a row matches when its cell equals any of them.
    pub values: Vec<Cell>,
}

impl Filter {
    pub fn matches(&self, row: &Row) -> bool {
        row.get(self.column)
            .is_some_and(|cell| self.values.contains(cell))
    }
}

/// An ORDER BY key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub column: usize,
    pub descending: bool,
}

/// The interpreted WHERE tail of a SELECT.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    pub filter: Option<Filter>,
    pub order: Option<SortKey>,
}

impl Predicate {
    /// Interprets `clause` against `table`'s columns.
    pub fn parse(clause: &str, table: &Table) -> Self {
        let tokens: Vec<Token> = Lexer::new(clause)
            .take_while(|t| !t.is_eof() && t.kind != TokenKind::Semicolon)
            .collect();

        let split = order_by_position(&tokens);
        let (where_part, order_part) = match split {
            Some(i) => (&tokens[..i], Some(&tokens[i + 2..])),
            None => (&tokens[..], None),
        };

        Self {
            filter: parse_filter(where_part, clause, table),
            order: order_part.and_then(|tokens| parse_order(tokens, clause, table)),
        }
    }

    /// Filters then sorts `rows` in place.
    pub fn apply(&self, rows: &mut Vec<Row>) {
        if let Some(filter) = &self.filter {
            rows.retain(|row| filter.matches(row));
        }
        if let Some(key) = self.order {
            // `sort_by` is stable, so equal keys keep their source order.
            rows.sort_by(|a, b| {
                let ord = a.get(key.column).cmp(&b.get(key.column));
                if key.descending { ord.reverse() } else { ord }
            });
        }
    }
}

/// Position of a top-level `ORDER` immediately followed by `BY`.
fn order_by_position(tokens: &[Token]) -> Option<usize> {
    let mut depth = 0i32;
    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => depth -= 1,
            TokenKind::Keyword(Keyword::Order)
                if depth == 0 && tokens.get(i + 1).is_some_and(|t| t.is_keyword(Keyword::By)) =>
            {
                return Some(i);
            }
            _ => {}
        }
    }
    None
}

/// Resolves a possibly qualified column reference at the front of `tokens`,
/// returning its position and the number of tokens consumed.
fn column_ref(tokens: &[Token], clause: &str, table: &Table) -> Option<(usize, usize)> {
    let mut consumed = 1;
    let mut name = tokens.first()?.name(clause)?;
    while let (Some(dot), Some(next)) = (tokens.get(consumed), tokens.get(consumed + 1))
        && dot.kind == TokenKind::Dot
    {
        name = next.name(clause)?;
        consumed += 2;
    }
    table.column_index(name).map(|i| (i, consumed))
}

fn parse_filter(tokens: &[Token], clause: &str, table: &Table) -> Option<Filter> {
    let (column, consumed) = column_ref(tokens, clause, table)?;
    let rest = &tokens[consumed..];

    let (values, used) = match rest.first().map(|t| &t.kind) {
        Some(TokenKind::Eq) => {
            let (value, used) = value(&rest[1..])?;
            (vec![value], used + 1)
        }
        Some(TokenKind::Keyword(Keyword::In)) => {
            let (values, used) = value_list(&rest[1..])?;
            (values, used + 1)
        }
        _ => return None,
    };

    // A recognized predicate followed by more text (AND, OR, ...) is not
    // one of the supported shapes.
    if used != rest.len() {
        return None;
    }
    Some(Filter { column, values })
}

/// Parses `( v1, v2, ... )`, returning the values and tokens consumed.
fn value_list(tokens: &[Token]) -> Option<(Vec<Cell>, usize)> {
    if tokens.first()?.kind != TokenKind::LParen {
        return None;
    }
    let mut pos = 1;
    let mut values = Vec::new();
    loop {
        let (v, used) = value(&tokens[pos..])?;
        values.push(v);
        pos += used;
        match tokens.get(pos).map(|t| &t.kind) {
            Some(TokenKind::Comma) => pos += 1,
            Some(TokenKind::RParen) => return Some((values, pos + 1)),
            _ => return None,
        }
    }
}

/// Parses one comparison value, returning it and the tokens consumed.
///
/// Quoted strings compare as text. Numbers compare as integers when they
/// parse cleanly, else as reals; anything else compares as its source text.
fn value(tokens: &[Token]) -> Option<(Cell, usize)> {
    match &tokens.first()?.kind {
        TokenKind::String(s) => Some((Cell::text(s.clone()), 1)),
        TokenKind::Number(raw) => Some((number(raw), 1)),
        TokenKind::Operator(op) if op == "-" || op == "+" => match &tokens.get(1)?.kind {
            TokenKind::Number(raw) => Some((number(&format!("{op}{raw}")), 2)),
            _ => None,
        },
        TokenKind::Keyword(Keyword::Null) => Some((Cell::Null, 1)),
        TokenKind::Identifier(s) => Some((Cell::text(s.clone()), 1)),
        _ => None,
    }
}

fn number(raw: &str) -> Cell {
    if let Ok(n) = raw.parse::<i64>() {
        Cell::Integer(n)
    } else if let Ok(x) = raw.parse::<f64>() {
        Cell::Real(x)
    } else {
        Cell::text(raw)
    }
}

fn parse_order(tokens: &[Token], clause: &str, table: &Table) -> Option<SortKey> {
    let (column, consumed) = column_ref(tokens, clause, table)?;
    let descending = tokens
        .get(consumed)
        .is_some_and(|t| t.is_keyword(Keyword::Desc));
    Some(SortKey { column, descending })
}
