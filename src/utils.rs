//! Shared helpers for field checks and violation presentation

use crate::error::Violation;

/// A field passes the content check if it contains at least one letter or digit.
pub fn has_alphanumeric(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_alphanumeric())
}

/// Title-case a part code the way the catalog stores it: the first letter of
/// every alphabetic run uppercased, the rest lowercased.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Render a violation list for the caller: a single violation is shown as-is,
/// multiple violations are numbered 1..N on separate lines.
pub fn format_violations(violations: &[Violation]) -> String {
    if violations.len() == 1 {
        return violations[0].to_string();
    }
    violations
        .iter()
        .enumerate()
        .map(|(i, v)| format!("{}. {}", i + 1, v))
        .collect::<Vec<_>>()
        .join("\n")
}
