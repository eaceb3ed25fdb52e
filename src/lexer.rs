//! Tokenization of one command line.
//!
//! Splitting is purely whitespace-driven: any run of delimiter characters
//! counts as a single separator, and no quoting or escaping is recognized.

/// Characters that separate tokens.
const DELIMITERS: [char; 5] = [' ', '\t', '\r', '\n', '\x07'];

/// Split a line into whitespace-delimited tokens.
///
/// Tokens borrow from `line`, so the token list lives at most as long as the
/// line it was carved from. Consecutive delimiters never produce empty
/// tokens; an empty or all-whitespace line yields an empty vector.
pub fn split_line(line: &str) -> Vec<&str> {
    line.split(&DELIMITERS[..])
        .filter(|token| !token.is_empty())
        .collect()
}
