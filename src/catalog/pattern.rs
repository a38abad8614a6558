//! SQL LIKE-style pattern matching for catalog lookups.

/// Matches `value` against a LIKE pattern, case-insensitively.
///
/// `%` matches any run of characters (including none) and `_` matches exactly
/// one. An empty pattern matches everything, as ODBC catalog functions treat
/// an empty pattern argument as "no filter".
pub fn matches_pattern(value: &str, pattern: &str) -> bool {
    if pattern.is_empty() {
        return true;
    }
    let value: Vec<char> = value.chars().flat_map(char::to_uppercase).collect();
    let pattern: Vec<char> = pattern.chars().flat_map(char::to_uppercase).collect();
    match_from(&value, &pattern)
}

fn match_from(value: &[char], pattern: &[char]) -> bool {
    match pattern.split_first() {
        None => value.is_empty(),
        Some((&'%', rest)) => {
            // Collapse runs of '%' before backtracking.
            let rest = rest
                .iter()
                .position(|&c| c != '%')
                .map_or(&[][..], |i| &rest[i..]);
            if rest.is_empty() {
                return true;
            }
            (0..=value.len()).any(|skip| match_from(&value[skip..], rest))
        }
        Some((&'_', rest)) => !value.is_empty() && match_from(&value[1..], rest),
        Some((&c, rest)) => value.first() == Some(&c) && match_from(&value[1..], rest),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcards() {
        assert!(matches_pattern("USERS", "%"));
        assert!(matches_pattern("USERS", "US%"));
        assert!(matches_pattern("USERS", "U_ERS"));
        assert!(!matches_pattern("USERS", "X%"));
        assert!(matches_pattern("ORDER_ITEMS", "%ITEM%"));
        assert!(matches_pattern("USERS", "%S"));
        assert!(!matches_pattern("USERS", "%X"));
        // `\` is an ordinary character, so `_` stays a wildcard after it.
        assert!(!matches_pattern("ORDER_ITEMS", "ORDER\\_ITEMS"));
        assert!(matches_pattern("ORDER\\XITEMS", "ORDER\\_ITEMS"));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(matches_pattern("users", "USERS"));
        assert!(matches_pattern("Users", "u%"));
    }

    #[test]
    fn test_boundaries() {
        assert!(matches_pattern("", ""));
        assert!(matches_pattern("ANY", ""));
        assert!(matches_pattern("", "%"));
        assert!(matches_pattern("", "%%%"));
        assert!(matches_pattern("ABC", "%%%"));
        assert!(!matches_pattern("AB", "ABC"));
        assert!(!matches_pattern("ABC", "AB"));
        assert!(!matches_pattern("AB", "A__"));
        assert!(matches_pattern("AB", "AB%"));
        assert!(!matches_pattern("", "_"));
    }
}
