//! Connection string tokenization.

use std::collections::HashMap;

/// Splits `key=value;...` into a map keyed by lowercased key.
///
/// A `;` inside `{...}` does not end a pair, and a value wrapped in braces
/// is unwrapped. Segments without `=` are ignored; later keys win.
pub fn parse_pairs(conn_str: &str) -> HashMap<String, String> {
    let mut pairs = HashMap::new();
    let mut current = String::new();
    let mut in_braces = false;

    for c in conn_str.chars() {
        match c {
            '{' => {
                in_braces = true;
                current.push(c);
            }
            '}' => {
                in_braces = false;
                current.push(c);
            }
            ';' if !in_braces => {
                insert_pair(&mut pairs, &current);
                current.clear();
            }
            _ => current.push(c),
        }
    }
    insert_pair(&mut pairs, &current);

    pairs
}

fn insert_pair(pairs: &mut HashMap<String, String>, segment: &str) {
    let Some((key, value)) = segment.split_once('=') else {
        return;
    };
    let value = value.trim();
    let value = value
        .strip_prefix('{')
        .and_then(|v| v.strip_suffix('}'))
        .unwrap_or(value);
    pairs.insert(key.trim().to_ascii_lowercase(), value.to_string());
}

/// Parses the leading integer of `s` the way C's `stoi` does: optional
/// whitespace, an optional sign, then at least one digit. Trailing text is
/// ignored.
pub fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let digits_start = usize::from(s.starts_with(['+', '-']));
    let digits = s[digits_start..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }
    s[..digits_start + digits].parse().ok()
}
