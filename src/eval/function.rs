//! Scalar function evaluation.
//!
//! Implements the ODBC scalar functions reachable through `{fn ...}` escapes
//! and bare calls in literal SELECTs. Names are case-insensitive. Unknown
//! names evaluate to their argument text unchanged.

use chrono::{Datelike, Local, NaiveDate};

use crate::cell::Cell;

/// Database name reported by `DATABASE()`.
pub const MOCK_DATABASE: &str = "MOCKDB";

/// User name reported by `USER()`.
pub const MOCK_USER: &str = "mock_user";

static NULL: Cell = Cell::Null;

const KNOWN_FUNCTIONS: &[&str] = &[
    "UCASE",
    "UPPER",
    "LCASE",
    "LOWER",
    "LENGTH",
    "LEN",
    "CHAR_LENGTH",
    "CHARACTER_LENGTH",
    "LTRIM",
    "RTRIM",
    "CONCAT",
    "SUBSTRING",
    "SUBSTR",
    "ABS",
    "MOD",
    "FLOOR",
    "CEILING",
    "CEIL",
    "SQRT",
    "ROUND",
    "CURDATE",
    "CURRENT_DATE",
    "CURTIME",
    "CURRENT_TIME",
    "NOW",
    "CURRENT_TIMESTAMP",
    "YEAR",
    "MONTH",
    "DAYOFMONTH",
    "DAYOFWEEK",
    "DATABASE",
    "USER",
];

/// Returns true if `name` is a scalar function this evaluator implements.
pub fn is_known_function(name: &str) -> bool {
    KNOWN_FUNCTIONS
        .iter()
        .any(|f| f.eq_ignore_ascii_case(name.trim()))
}

/// Evaluates a scalar function over already-evaluated arguments.
///
/// Missing arguments behave as NULL. An unknown function returns its
/// arguments' text joined with `", "`.
pub fn evaluate_scalar_function(name: &str, args: &[Cell]) -> Cell {
    let name = name.trim().to_ascii_uppercase();
    let arg = |i: usize| args.get(i).unwrap_or(&NULL);
    let text = |i: usize| arg(i).to_text();

    match name.as_str() {
        "UCASE" | "UPPER" => map_text(text(0), |s| s.to_uppercase()),
        "LCASE" | "LOWER" => map_text(text(0), |s| s.to_lowercase()),
        "LTRIM" => map_text(text(0), |s| s.trim_start().to_string()),
        "RTRIM" => map_text(text(0), |s| s.trim_end().to_string()),
        "LENGTH" | "LEN" | "CHAR_LENGTH" | "CHARACTER_LENGTH" => match text(0) {
            Some(s) => Cell::Integer(s.chars().count() as i64),
            None => Cell::Null,
        },
        "CONCAT" => Cell::Text(args.iter().filter_map(Cell::to_text).collect()),
        "SUBSTRING" | "SUBSTR" => substring(text(0), as_i64(arg(1)), args.get(2).map(as_i64)),
        "ABS" => match arg(0) {
            Cell::Integer(n) => Cell::Integer(n.wrapping_abs()),
            other => map_real(other, f64::abs),
        },
        "MOD" => match (as_i64(arg(0)), as_i64(arg(1))) {
            (Some(_), Some(0)) => Cell::Integer(0),
            (Some(a), Some(b)) => Cell::Integer(a.wrapping_rem(b)),
            _ => Cell::Null,
        },
        "FLOOR" => to_integer(arg(0), f64::floor),
        "CEILING" | "CEIL" => to_integer(arg(0), f64::ceil),
        "SQRT" => match as_f64(arg(0)) {
            Some(x) if x >= 0.0 => Cell::Real(x.sqrt()),
            _ => Cell::Null,
        },
        "ROUND" => round(arg(0), args.get(1).and_then(as_i64).unwrap_or(0)),
        "CURDATE" | "CURRENT_DATE" => Cell::Text(Local::now().format("%Y-%m-%d").to_string()),
        "CURTIME" | "CURRENT_TIME" => Cell::Text(Local::now().format("%H:%M:%S").to_string()),
        "NOW" | "CURRENT_TIMESTAMP" => {
            Cell::Text(Local::now().format("%Y-%m-%d %H:%M:%S").to_string())
        }
        "YEAR" => date_field(text(0), 0),
        "MONTH" => date_field(text(0), 1),
        "DAYOFMONTH" => date_field(text(0), 2),
        "DAYOFWEEK" => match text(0).as_deref().and_then(parse_date) {
            Some(date) => Cell::Integer(i64::from(date.weekday().number_from_sunday())),
            None => Cell::Null,
        },
        "DATABASE" => Cell::text(MOCK_DATABASE),
        "USER" => Cell::text(MOCK_USER),
        _ => Cell::Text(
            args.iter()
                .map(|a| a.to_text().unwrap_or_else(|| "NULL".to_string()))
                .collect::<Vec<_>>()
                .join(", "),
        ),
    }
}

fn map_text(value: Option<String>, f: impl FnOnce(&str) -> String) -> Cell {
    match value {
        Some(s) => Cell::Text(f(&s)),
        None => Cell::Null,
    }
}

fn map_real(value: &Cell, f: impl FnOnce(f64) -> f64) -> Cell {
    match as_f64(value) {
        Some(x) => Cell::Real(f(x)),
        None => Cell::Null,
    }
}

fn to_integer(value: &Cell, f: impl FnOnce(f64) -> f64) -> Cell {
    match value {
        Cell::Integer(n) => Cell::Integer(*n),
        other => match as_f64(other) {
            Some(x) => Cell::Integer(f(x) as i64),
            None => Cell::Null,
        },
    }
}

fn round(value: &Cell, digits: i64) -> Cell {
    match value {
        Cell::Integer(n) if digits >= 0 => Cell::Integer(*n),
        other => {
            let scale = 10f64.powi(digits.clamp(-15, 15) as i32);
            map_real(other, |x| (x * scale).round() / scale)
        }
    }
}

/// 1-based SUBSTRING. A start outside the string yields an empty string.
fn substring(value: Option<String>, start: Option<i64>, len: Option<Option<i64>>) -> Cell {
    let Some(s) = value else {
        return Cell::Null;
    };
    let chars: Vec<char> = s.chars().collect();
    let start = start.unwrap_or(1);
    if start < 1 || start as usize > chars.len() {
        return Cell::Text(String::new());
    }
    let from = start as usize - 1;
    let take = match len {
        None => chars.len() - from,
        Some(Some(n)) if n > 0 => (n as usize).min(chars.len() - from),
        Some(_) => 0,
    };
    Cell::Text(chars[from..from + take].iter().collect())
}

/// Numeric view of a cell. Text is parsed leniently.
pub(crate) fn as_f64(value: &Cell) -> Option<f64> {
    match value {
        Cell::Integer(n) => Some(*n as f64),
        Cell::Real(x) => Some(*x),
        Cell::Text(s) => s.trim().parse().ok(),
        Cell::Null => None,
    }
}

pub(crate) fn as_i64(value: &Cell) -> Option<i64> {
    match value {
        Cell::Integer(n) => Some(*n),
        Cell::Real(x) => Some(*x as i64),
        Cell::Text(s) => {
            let s = s.trim();
            s.parse()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|x| x as i64))
        }
        Cell::Null => None,
    }
}

/// Strips an optional `DATE` prefix and surrounding quotes from a date string.
fn date_text(s: &str) -> &str {
    let s = s.trim();
    let s = match s.get(..4) {
        Some(prefix) if prefix.eq_ignore_ascii_case("DATE") => s[4..].trim_start(),
        _ => s,
    };
    s.trim_matches('\'')
}

fn date_field(value: Option<String>, index: usize) -> Cell {
    let Some(s) = value else {
        return Cell::Null;
    };
    date_text(&s)
        .split(['-', ' '])
        .nth(index)
        .and_then(|field| field.parse::<i64>().ok())
        .map_or(Cell::Null, Cell::Integer)
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = date_text(s);
    NaiveDate::parse_from_str(s.get(..10).unwrap_or(s), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(name: &str, args: &[Cell]) -> Cell {
        evaluate_scalar_function(name, args)
    }

    #[test]
    fn test_string_functions() {
        assert_eq!(eval("ucase", &[Cell::text("abc")]), Cell::text("ABC"));
        assert_eq!(eval("LOWER", &[Cell::text("AbC")]), Cell::text("abc"));
        assert_eq!(eval("LENGTH", &[Cell::text("hello")]), Cell::Integer(5));
        assert_eq!(eval("LTRIM", &[Cell::text("  x ")]), Cell::text("x "));
        assert_eq!(eval("RTRIM", &[Cell::text("  x ")]), Cell::text("  x"));
        assert_eq!(
            eval("CONCAT", &[Cell::text("a"), Cell::Integer(1), Cell::text("b")]),
            Cell::text("a1b")
        );
        assert_eq!(eval("UPPER", &[Cell::Null]), Cell::Null);
    }

    #[test]
    fn test_substring() {
        let s = Cell::text("Hello World");
        assert_eq!(
            eval("SUBSTRING", &[s.clone(), Cell::Integer(1), Cell::Integer(5)]),
            Cell::text("Hello")
        );
        assert_eq!(
            eval("SUBSTR", &[s.clone(), Cell::Integer(7)]),
            Cell::text("World")
        );
        assert_eq!(
            eval("SUBSTRING", &[s.clone(), Cell::Integer(99), Cell::Integer(2)]),
            Cell::text("")
        );
        assert_eq!(
            eval("SUBSTRING", &[s.clone(), Cell::Integer(0)]),
            Cell::text("")
        );
        assert_eq!(
            eval("SUBSTRING", &[s, Cell::Integer(10), Cell::Integer(50)]),
            Cell::text("ld")
        );
    }

    #[test]
    fn test_numeric_functions() {
        assert_eq!(eval("ABS", &[Cell::Integer(-5)]), Cell::Integer(5));
        assert_eq!(eval("ABS", &[Cell::Real(-2.5)]), Cell::Real(2.5));
        assert_eq!(
            eval("MOD", &[Cell::Integer(10), Cell::Integer(3)]),
            Cell::Integer(1)
        );
        assert_eq!(
            eval("MOD", &[Cell::Integer(10), Cell::Integer(0)]),
            Cell::Integer(0)
        );
        assert_eq!(eval("FLOOR", &[Cell::Real(3.7)]), Cell::Integer(3));
        assert_eq!(eval("CEILING", &[Cell::Real(3.2)]), Cell::Integer(4));
        assert_eq!(eval("SQRT", &[Cell::Integer(16)]), Cell::Real(4.0));
        assert_eq!(eval("SQRT", &[Cell::Integer(-1)]), Cell::Null);
        assert_eq!(
            eval("ROUND", &[Cell::Real(3.14159), Cell::Integer(2)]),
            Cell::Real(3.14)
        );
        assert_eq!(eval("ROUND", &[Cell::Real(2.5)]), Cell::Real(3.0));
    }

    #[test]
    fn test_date_functions() {
        assert_eq!(eval("YEAR", &[Cell::text("2024-03-15")]), Cell::Integer(2024));
        assert_eq!(
            eval("MONTH", &[Cell::text("DATE '2024-03-15'")]),
            Cell::Integer(3)
        );
        // 2024-01-07 was a Sunday.
        assert_eq!(
            eval("DAYOFWEEK", &[Cell::text("2024-01-07")]),
            Cell::Integer(1)
        );
        assert_eq!(
            eval("DAYOFWEEK", &[Cell::text("2024-01-13 12:00:00")]),
            Cell::Integer(7)
        );
        assert_eq!(eval("YEAR", &[Cell::text("garbage")]), Cell::Null);

        let Cell::Text(today) = eval("CURDATE", &[]) else {
            panic!("CURDATE should return text");
        };
        assert_eq!(today.len(), 10);
        let Cell::Text(now) = eval("NOW", &[]) else {
            panic!("NOW should return text");
        };
        assert_eq!(now.len(), 19);
    }

    #[test]
    fn test_system_functions() {
        assert_eq!(eval("DATABASE", &[]), Cell::text("MOCKDB"));
        assert_eq!(eval("user", &[]), Cell::text("mock_user"));
    }

    #[test]
    fn test_unknown_function_returns_arguments() {
        assert!(!is_known_function("SOUNDEX"));
        assert_eq!(
            eval("SOUNDEX", &[Cell::text("abc"), Cell::Integer(2)]),
            Cell::text("abc, 2")
        );
    }
}
