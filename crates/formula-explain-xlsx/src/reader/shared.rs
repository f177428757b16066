//! Shared formula expansion
//!
//! A shared formula is stored once, on its anchor cell; every other cell of
//! the shared block only carries the group id. Each follower's formula is
//! the anchor's text with every relative cell reference moved by the
//! follower's offset from the anchor.

use formula_explain_core::CellAddress;

/// Shift the relative cell references of `formula` by `rows`/`cols`
///
/// String literals and quoted sheet names are copied untouched. References
/// pushed off the sheet become `#REF!`.
pub(crate) fn shift_formula(formula: &str, rows: i64, cols: i64) -> String {
    let chars: Vec<char> = formula.chars().collect();
    let mut result = String::with_capacity(formula.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '"' || c == '\'' {
            let end = quoted_end(&chars, i);
            result.extend(&chars[i..end]);
            i = end;
            continue;
        }

        let starts_token = i == 0 || !is_name_char(chars[i - 1]);
        if starts_token && (c == '$' || c.is_ascii_alphabetic()) {
            let end = token_end(&chars, i);
            let token: String = chars[i..end].iter().collect();

            match shift_reference(&token, chars.get(end).copied(), rows, cols) {
                Some(shifted) => result.push_str(&shifted),
                None => result.push_str(&token),
            }
            i = end;
            continue;
        }

        result.push(c);
        i += 1;
    }

    result
}

/// Shift a single token if it is a cell reference
fn shift_reference(token: &str, next: Option<char>, rows: i64, cols: i64) -> Option<String> {
    // Function calls (`LOG10(`) and sheet prefixes (`Q1!`) look like references
    if matches!(next, Some('(') | Some('!')) {
        return None;
    }

    let addr = CellAddress::parse(token).ok()?;
    Some(match addr.offset(rows, cols) {
        Some(moved) => moved.to_a1_string(),
        None => "#REF!".to_string(),
    })
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '$'
}

fn token_end(chars: &[char], start: usize) -> usize {
    let mut end = start;
    while end < chars.len() && is_name_char(chars[end]) {
        end += 1;
    }
    end
}

/// Index just past the closing quote; doubled quotes are escapes
fn quoted_end(chars: &[char], start: usize) -> usize {
    let quote = chars[start];
    let mut i = start + 1;
    while i < chars.len() {
        if chars[i] == quote {
            if chars.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    chars.len()
}
