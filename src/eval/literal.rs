//! Literal expression parsing.

use crate::cell::{Cell, SqlType, TypeSpec};
use crate::sql::split_top_level;

use super::function::{as_f64, as_i64, evaluate_scalar_function, is_known_function};

/// GUID returned by `UUID()` and `GEN_UUID()`.
pub const MOCK_GUID: &str = "A0EEBC99-9C0B-4EF8-BB6D-6BB9BD380A11";

/// A literal expression resolved to a value and its declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralValue {
    pub value: Cell,
    pub type_spec: TypeSpec,
    /// True for `?` (and casts of `?`); the value is a NULL placeholder.
    pub is_parameter: bool,
}

impl LiteralValue {
    fn new(value: Cell, type_spec: TypeSpec) -> Self {
        Self {
            value,
            type_spec,
            is_parameter: false,
        }
    }

    fn text(s: String, sql_type: SqlType) -> Self {
        let size = s.chars().count().max(1);
        Self::new(Cell::Text(s), TypeSpec::new(sql_type, size, 0))
    }
}

/// Parses a literal expression.
///
/// Forms are tried in order: `CAST(expr AS type)`, `NULL`, `?`, `N'...'`,
/// `X'...'`, `DATE`/`TIME`/`TIMESTAMP '...'`, `UUID()`/`GEN_UUID()`, a known
/// scalar function call, a quoted string, a number. Anything else is opaque
/// text, so `1+0` stays the three characters `1+0`.
pub fn parse_literal(expr: &str) -> LiteralValue {
    let s = expr.trim();
    let upper = s.to_ascii_uppercase();

    if let Some(literal) = parse_cast(s) {
        return literal;
    }
    if upper == "NULL" {
        return LiteralValue::new(Cell::Null, TypeSpec::new(SqlType::Varchar, 255, 0));
    }
    if s == "?" {
        return LiteralValue {
            is_parameter: true,
            ..LiteralValue::new(Cell::Null, TypeSpec::new(SqlType::Varchar, 255, 0))
        };
    }
    if upper.starts_with("N'")
        && let Some(text) = unquote(&s[1..])
    {
        return LiteralValue::text(text, SqlType::WVarchar);
    }
    if upper.starts_with("X'")
        && let Some(hex) = unquote(&s[1..])
    {
        let bytes = decode_hex(&hex);
        let size = bytes.len().max(1);
        return LiteralValue::new(
            Cell::Text(String::from_utf8_lossy(&bytes).into_owned()),
            TypeSpec::new(SqlType::VarBinary, size, 0),
        );
    }
    for (prefix, type_name) in [("TIMESTAMP", "TIMESTAMP"), ("DATE", "DATE"), ("TIME", "TIME")] {
        if upper.starts_with(prefix)
            && let Some(text) = unquote(s[prefix.len()..].trim_start())
        {
            return LiteralValue::new(Cell::Text(text), TypeSpec::from_type_name(type_name, &[]));
        }
    }
    if matches!(upper.as_str(), "UUID()" | "GEN_UUID()") {
        return LiteralValue::new(Cell::text(MOCK_GUID), TypeSpec::new(SqlType::Guid, 36, 0));
    }
    if let Some(value) = parse_function_call(s) {
        let type_spec = type_of(&value);
        return LiteralValue::new(value, type_spec);
    }
    if let Some(text) = unquote(s) {
        return LiteralValue::text(text, SqlType::Varchar);
    }
    if let Some(value) = parse_number(s) {
        let type_spec = type_of(&value);
        return LiteralValue::new(value, type_spec);
    }
    LiteralValue::text(s.to_string(), SqlType::Varchar)
}

/// Converts a cell to the representation of `sql_type`. Values that do not
/// convert are kept as they are.
pub fn coerce(value: Cell, sql_type: SqlType) -> Cell {
    match sql_type {
        _ if value.is_null() => value,
        SqlType::TinyInt | SqlType::SmallInt | SqlType::Integer | SqlType::BigInt | SqlType::Bit => {
            match as_i64(&value) {
                Some(n) => Cell::Integer(n),
                None => value,
            }
        }
        SqlType::Decimal | SqlType::Numeric | SqlType::Real | SqlType::Float | SqlType::Double => {
            match as_f64(&value) {
                Some(x) => Cell::Real(x),
                None => value,
            }
        }
        _ => match value.to_text() {
            Some(s) => Cell::Text(s),
            None => value,
        },
    }
}

/// Returns the contents of a single-quoted string literal with `''`
/// unescaped, or `None` if `s` is not exactly one quoted literal.
pub fn unquote(s: &str) -> Option<String> {
    let inner = s.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '\'' {
            // A lone quote inside means this is not one literal.
            if chars.next() != Some('\'') {
                return None;
            }
        }
        out.push(ch);
    }
    Some(out)
}

/// Parses an integer or real literal with an optional sign.
pub fn parse_number(s: &str) -> Option<Cell> {
    let first = s.chars().next()?;
    if !(first.is_ascii_digit() || matches!(first, '+' | '-' | '.')) {
        return None;
    }
    if s.contains(['.', 'e', 'E']) {
        s.parse::<f64>().ok().filter(|x| x.is_finite()).map(Cell::Real)
    } else {
        s.parse::<i64>().ok().map(Cell::Integer)
    }
}

fn parse_cast(s: &str) -> Option<LiteralValue> {
    let head = s.get(..4)?;
    if !head.eq_ignore_ascii_case("CAST") {
        return None;
    }
    let inner = s[4..].trim_start().strip_prefix('(')?.strip_suffix(')')?;
    let (expr, type_text) = split_cast(inner)?;

    let inner = parse_literal(expr);
    let (type_name, params) = match type_text.find('(') {
        Some(open) => {
            let params = type_text[open + 1..]
                .trim_end_matches(')')
                .split(',')
                .filter_map(|p| p.trim().parse().ok())
                .collect::<Vec<usize>>();
            (&type_text[..open], params)
        }
        None => (type_text, Vec::new()),
    };
    let type_spec = TypeSpec::from_type_name(type_name, &params);
    Some(LiteralValue {
        value: coerce(inner.value, type_spec.sql_type),
        type_spec,
        is_parameter: inner.is_parameter,
    })
}

/// Splits `expr AS type` at the last top-level `AS`.
fn split_cast(inner: &str) -> Option<(&str, &str)> {
    let bytes = inner.as_bytes();
    let mut depth = 0i32;
    let mut quoted = false;
    let mut split = None;
    for i in 0..bytes.len() {
        match bytes[i] {
            b'\'' => quoted = !quoted,
            b'(' if !quoted => depth += 1,
            b')' if !quoted => depth -= 1,
            b'A' | b'a'
                if !quoted
                    && depth == 0
                    && i > 0
                    && bytes[i - 1].is_ascii_whitespace()
                    && bytes.get(i + 1).is_some_and(|b| b.eq_ignore_ascii_case(&b's'))
                    && bytes.get(i + 2).is_some_and(u8::is_ascii_whitespace) =>
            {
                split = Some(i);
            }
            _ => {}
        }
    }
    let i = split?;
    Some((inner[..i].trim(), inner[i + 2..].trim()))
}

/// Evaluates `NAME(args)` when `NAME` is a known scalar function.
fn parse_function_call(s: &str) -> Option<Cell> {
    let open = s.find('(')?;
    let name = s[..open].trim();
    if !s.ends_with(')') || !is_known_function(name) {
        return None;
    }
    let args: Vec<Cell> = split_top_level(&s[open + 1..s.len() - 1])
        .into_iter()
        .map(|arg| parse_literal(arg).value)
        .collect();
    Some(evaluate_scalar_function(name, &args))
}

/// Decodes pairs of hex digits. An odd trailing nibble and non-hex pairs are
/// dropped.
fn decode_hex(hex: &str) -> Vec<u8> {
    hex.as_bytes()
        .chunks_exact(2)
        .filter_map(|pair| {
            let pair = std::str::from_utf8(pair).ok()?;
            u8::from_str_radix(pair, 16).ok()
        })
        .collect()
}

/// Declared type of a computed value.
fn type_of(value: &Cell) -> TypeSpec {
    match value {
        Cell::Integer(n) if i32::try_from(*n).is_ok() => TypeSpec::new(SqlType::Integer, 10, 0),
        Cell::Integer(_) => TypeSpec::new(SqlType::BigInt, 19, 0),
        Cell::Real(_) => TypeSpec::new(SqlType::Double, 15, 0),
        Cell::Text(s) => TypeSpec::new(SqlType::Varchar, s.chars().count().max(1), 0),
        Cell::Null => TypeSpec::new(SqlType::Varchar, 255, 0),
    }
}
