//! ODBC escape sequence preprocessing.
//!
//! Rewrites `{...}` escape clauses into plain SQL before classification.
//! Quoted regions are copied through untouched, so braces inside string
//! literals are never mistaken for escapes.

use crate::eval::{evaluate_scalar_function, is_known_function, parse_literal};

/// Rewrites every recognized ODBC escape sequence in `sql`.
///
/// - `{fn NAME(args)}` is evaluated and replaced by its SQL literal
///   (unknown functions become a plain `NAME(args)` call)
/// - `{d '...'}`, `{t '...'}`, `{ts '...'}` and `{guid '...'}` become the bare literal
/// - `{oj ...}` is unwrapped; `{escape ...}`, `{call ...}`, `{?=call ...}` and
///   `{interval ...}` keep their keyword
/// - anything else is copied verbatim
///
/// Nested escapes are rewritten innermost first. Output without braces is a
/// fixed point: `preprocess(preprocess(s)) == preprocess(s)`.
pub fn preprocess(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut rest = sql;

    while let Some(i) = rest.find(['{', '\'', '"']) {
        out.push_str(&rest[..i]);
        let tail = &rest[i..];
        if tail.starts_with('{') {
            match matching_brace(tail) {
                Some(end) => {
                    let inner = preprocess(&tail[1..end]);
                    out.push_str(&rewrite(&inner));
                    rest = &tail[end + 1..];
                }
                None => {
                    out.push_str(tail);
                    return out;
                }
            }
        } else {
            let len = quoted_len(tail);
            out.push_str(&tail[..len]);
            rest = &tail[len..];
        }
    }
    out.push_str(rest);
    out
}

/// Counts `?` parameter markers outside quoted regions.
pub fn count_parameters(sql: &str) -> usize {
    let mut count = 0;
    let mut rest = sql;
    while let Some(i) = rest.find(['?', '\'', '"']) {
        let tail = &rest[i..];
        if tail.starts_with('?') {
            count += 1;
            rest = &tail[1..];
        } else {
            rest = &tail[quoted_len(tail)..];
        }
    }
    count
}

/// Returns the byte length of the quoted region at the start of `s`,
/// including both quotes. Doubled quotes are escapes. An unterminated region
/// runs to the end of input.
fn quoted_len(s: &str) -> usize {
    let Some(quote) = s.chars().next() else {
        return 0;
    };
    let bytes = s.as_bytes();
    let q = quote as u8;
    let mut i = 1;
    while i < bytes.len() {
        if bytes[i] == q {
            if bytes.get(i + 1) == Some(&q) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

/// Returns the byte index of the `}` closing the `{` at the start of `s`.
fn matching_brace(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' => {
                i += quoted_len(&s[i..]);
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Splits off the leading keyword of an escape body.
fn split_keyword(body: &str) -> (String, &str) {
    let body = body.trim_start();
    let end = body
        .find(|c: char| c.is_whitespace() || c == '\'' || c == '(')
        .unwrap_or(body.len());
    (body[..end].to_ascii_lowercase(), body[end..].trim())
}

fn rewrite(body: &str) -> String {
    let trimmed = body.trim();
    if let Some(call) = trimmed.strip_prefix('?') {
        let call = call.trim_start();
        if let Some(call) = call.strip_prefix('=') {
            let (kw, rest) = split_keyword(call);
            if kw == "call" {
                return format!("? = CALL {rest}");
            }
        }
    }

    let (kw, rest) = split_keyword(trimmed);
    match kw.as_str() {
        "fn" => rewrite_function(rest),
        "d" | "t" | "ts" | "guid" => rest.to_string(),
        "oj" => rest.to_string(),
        "escape" => format!("ESCAPE {rest}"),
        "call" => format!("CALL {rest}"),
        "interval" => format!("INTERVAL {rest}"),
        _ => format!("{{{body}}}"),
    }
}

/// Evaluates `NAME(args)` from a `{fn ...}` escape.
fn rewrite_function(call: &str) -> String {
    let (name, args) = match call.find('(') {
        Some(open) if call.ends_with(')') => (call[..open].trim(), &call[open + 1..call.len() - 1]),
        _ => (call.trim(), ""),
    };

    if !is_known_function(name) {
        return format!("{name}({args})");
    }

    let values: Vec<_> = split_top_level(args)
        .into_iter()
        .map(|arg| parse_literal(arg).value)
        .collect();
    evaluate_scalar_function(name, &values).to_sql_literal()
}

/// Splits `s` at commas outside parentheses and quotes. Empty input yields
/// no parts.
pub fn split_top_level(s: &str) -> Vec<&str> {
    if s.trim().is_empty() {
        return Vec::new();
    }
    let bytes = s.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' => {
                i += quoted_len(&s[i..]);
                continue;
            }
            b'(' => depth += 1,
            b')' => depth -= 1,
            b',' if depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(s[start..].trim());
    parts
}

/// Splits a script into statements at `;` outside quotes. Blank
/// statements are dropped.
pub fn split_statements(script: &str) -> Vec<&str> {
    let bytes = script.as_bytes();
    let mut statements = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' => {
                i += quoted_len(&script[i..]);
                continue;
            }
            b';' => {
                statements.push(script[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    statements.push(script[start..].trim());
    statements.retain(|s| !s.is_empty());
    statements
}
